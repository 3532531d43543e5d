//! The fixed B3/S23 rule, tabulated over every 4x4 block of leaves.
//!
//! # Representation
//! A 4x4 block is packed into a `u16`, row-major from the north-west corner, most significant
//! bit first:
//! ```notrust
//!  x: 0  1  2  3
//!    15 14 13 12   y: 0
//!    11 10  9  8   y: 1
//!     7  6  5  4   y: 2
//!     3  2  1  0   y: 3
//! ```
//! The next generation of a block only ever has its inner 2x2 (bits 10, 9, 6 and 5) defined,
//! since the outer ring is missing neighbors.

/// Neighborhood of bit 5, the south-east inner cell.
const NBHD_MASK: u16 = 0b0000_0111_0101_0111;
const CELL_MASK: u16 = 0b0000_0000_0010_0000;

/// Neighbor counts, as set bits, for which a dead cell is born.
const BIRTHS: u16 = 1 << 3;

/// Neighbor counts, as set bits, for which a live cell survives.
const SURVIVALS: u16 = 1 << 2 | 1 << 3;

/// Inner cells of a block, in quadrant order.
pub const NW: u16 = CELL_MASK << 5;
pub const NE: u16 = CELL_MASK << 4;
pub const SW: u16 = CELL_MASK << 1;
pub const SE: u16 = CELL_MASK;

/// Bit of the leaf at column `x`, row `y` of a 4x4 block.
pub const fn bit(x: usize, y: usize) -> u16 {
    assert!(x < 4 && y < 4);

    1 << (15 - (y * 4 + x))
}

// Count the bits using Brian Kernighan's way
// See: http://graphics.stanford.edu/~seander/bithacks.html#CountBitsSetKernighan
fn count_bits(mut x: u16) -> u8 {
    let mut n = 0;

    while x != 0 {
        x &= x - 1;
        n += 1;
    }

    n
}

/// Compute the next generation of every possible 4x4 block.
///
/// Indexing into the returned table with a packed block yields the block with only its inner
/// 2x2 set, one generation later.
pub fn compute_rules() -> Vec<u16> {
    let mut rules = vec![0; (u16::MAX as usize) + 1];

    for block in 0..=u16::MAX {
        rules[block as usize] = next(block);
    }

    rules
}

fn next(block: u16) -> u16 {
    let mut res: u16 = 0;

    // se, sw, ne, nw
    let shifts = [0, 1, 4, 5];

    for shift in shifts {
        let nbhd_mask = NBHD_MASK << shift;
        let cell_mask = CELL_MASK << shift;

        let dead = (block & cell_mask) == 0;
        let num_neighbors = 1u16 << count_bits(block & nbhd_mask);

        let rule = if dead { BIRTHS } else { SURVIVALS };

        if num_neighbors & rule == num_neighbors {
            res |= cell_mask;
        }
    }

    res
}
