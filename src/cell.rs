use std::fmt::Debug;

use tracing::trace;

use crate::cellspace::Cellspace;
use crate::cellspace::SpaceId;
use crate::rules;

/// Index of a cell in its [`Cellspace`].
pub type CellIndex = u32;

/// A canonical cell of a [`Cellspace`].
///
/// A cell is either a leaf, a single alive or dead automaton cell, or a macro-cell made of four
/// quadrants of the same level. The level of a cell is never stored: it is always known from
/// context.
///
/// Cells are hash-consed, so two cells are structurally equal exactly when they are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    space: SpaceId,
    index: CellIndex,
}

/// The four quadrants of a macro-cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Quadrants {
    pub nw: Cell,
    pub ne: Cell,
    pub sw: Cell,
    pub se: Cell,
}

impl Quadrants {
    pub const fn to_array(self) -> [Cell; 4] {
        [self.nw, self.ne, self.sw, self.se]
    }
}

impl Cell {
    pub(crate) const fn new(space: SpaceId, index: CellIndex) -> Self {
        Self { space, index }
    }

    pub const fn index(&self) -> CellIndex {
        self.index
    }

    pub const fn space(&self) -> SpaceId {
        self.space
    }

    /// Compute the result of this cell, a `2^level` macro-cell with `level >= 2`.
    ///
    /// The result is the `2^{level - 1}` cell at the center of this one, `2^{level - 2}`
    /// generations later. It is computed at most once per cell, later calls return the memoized
    /// future.
    pub fn result(self, space: &mut Cellspace, level: u32) -> Cell {
        assert!(level >= 2, "cannot compute the result of a level {level} cell");

        if let Some(res) = space.future(self) {
            return res;
        }

        let res = if level == 2 {
            self.block_res(space)
        } else {
            self.node_res(space, level)
        };

        trace!(cell = ?self, level, ?res, "computed result");

        space.memoize(self, res);

        res
    }

    /// For a 4x4 cell, this computes its result directly from the rules.
    ///
    ///   nw.nw nw.ne ne.nw ne.ne
    ///   nw.sw nw.se ne.sw ne.se
    ///   sw.nw sw.ne se.nw se.ne
    ///   sw.sw sw.se se.sw se.se
    ///
    fn block_res(self, space: &mut Cellspace) -> Cell {
        let q = space.node(self);

        let mut block = 0;
        for (quadrant, qx, qy) in [(q.nw, 0, 0), (q.ne, 2, 0), (q.sw, 0, 2), (q.se, 2, 2)] {
            let leaves = space.node(quadrant);

            for (leaf, lx, ly) in [
                (leaves.nw, 0, 0),
                (leaves.ne, 1, 0),
                (leaves.sw, 0, 1),
                (leaves.se, 1, 1),
            ] {
                if space.is_alive(leaf) {
                    block |= rules::bit(qx + lx, qy + ly);
                }
            }
        }

        let next = space.rule(block);

        let nw = space.leaf(next & rules::NW != 0);
        let ne = space.leaf(next & rules::NE != 0);
        let sw = space.leaf(next & rules::SW != 0);
        let se = space.leaf(next & rules::SE != 0);

        space.get_or_create(nw, ne, sw, se)
    }

    /// For a 2^n cell with n > 2, this computes its result from the results of smaller cells.
    fn node_res(self, space: &mut Cellspace, level: u32) -> Cell {
        let q = space.node(self);

        //  n00 n01 n02
        //  n10 n11 n12
        //  n20 n21 n22
        let n01 = cell_utils::h_center(space, q.nw, q.ne);
        let n10 = cell_utils::v_center(space, q.nw, q.sw);
        let n11 = cell_utils::center(space, self);
        let n12 = cell_utils::v_center(space, q.ne, q.se);
        let n21 = cell_utils::h_center(space, q.sw, q.se);

        // Each of these is 2^{level - 3} generations ahead
        let [r00, r01, r02, r10, r11, r12, r20, r21, r22] =
            [q.nw, n01, q.ne, n10, n11, n12, q.sw, n21, q.se].map(|n| n.result(space, level - 1));

        let nw = space.get_or_create(r00, r01, r10, r11);
        let ne = space.get_or_create(r01, r02, r11, r12);
        let sw = space.get_or_create(r10, r11, r20, r21);
        let se = space.get_or_create(r11, r12, r21, r22);

        // And these another 2^{level - 3} generations
        let [nw, ne, sw, se] = [nw, ne, sw, se].map(|n| n.result(space, level - 1));

        space.get_or_create(nw, ne, sw, se)
    }
}

impl Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cell({}:{})", self.space, self.index)
    }
}

/// Sub-cells straddling the quadrants of macro-cells. All of these take 2^n cells, n >= 2, and
/// return a 2^{n - 1} cell.
mod cell_utils {
    use super::Cell;
    use crate::cellspace::Cellspace;

    /// Given an n-cell, returns the n/2 cell at its center
    pub fn center(space: &mut Cellspace, c: Cell) -> Cell {
        let q = space.node(c);

        let nw = space.node(q.nw).se;
        let ne = space.node(q.ne).sw;
        let sw = space.node(q.sw).ne;
        let se = space.node(q.se).nw;

        space.get_or_create(nw, ne, sw, se)
    }

    /// Given two n-cells with `w` to the left and `e` to the right, this returns the n/2 cell
    /// centered on their boundary
    pub fn h_center(space: &mut Cellspace, w: Cell, e: Cell) -> Cell {
        let (w, e) = (space.node(w), space.node(e));

        let nw = space.node(w.ne).se;
        let ne = space.node(e.nw).sw;
        let sw = space.node(w.se).ne;
        let se = space.node(e.sw).nw;

        space.get_or_create(nw, ne, sw, se)
    }

    /// Given two n-cells with `n` above and `s` below, this returns the n/2 cell centered on
    /// their boundary
    pub fn v_center(space: &mut Cellspace, n: Cell, s: Cell) -> Cell {
        let (n, s) = (space.node(n), space.node(s));

        let nw = space.node(n.sw).se;
        let ne = space.node(n.se).sw;
        let sw = space.node(s.nw).ne;
        let se = space.node(s.ne).nw;

        space.get_or_create(nw, ne, sw, se)
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::Cell;
    use crate::cellspace::Cellspace;
    use crate::rules;

    /// Build a 4x4 cell from a packed block.
    fn block_cell(space: &mut Cellspace, block: u16) -> Cell {
        space.build(2, |x, y| block & rules::bit(x as usize, y as usize) != 0)
    }

    /// One generation of the inner 2x2 of a 4x4 grid, cell by cell.
    fn naive_inner(block: u16) -> [bool; 4] {
        let alive = |x: i32, y: i32| {
            (0..4).contains(&x) && (0..4).contains(&y) && block & rules::bit(x as usize, y as usize) != 0
        };

        [(1, 1), (2, 1), (1, 2), (2, 2)].map(|(x, y)| {
            let mut n = 0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if (dx, dy) != (0, 0) && alive(x + dx, y + dy) {
                        n += 1;
                    }
                }
            }

            n == 3 || (n == 2 && alive(x, y))
        })
    }

    #[test]
    fn every_block_matches_naive_rule() {
        let mut space = Cellspace::new();

        for block in 0..=u16::MAX {
            let cell = block_cell(&mut space, block);
            let res = cell.result(&mut space, 2);

            let q = space.quadrants(res).unwrap();
            let got = q.to_array().map(|c| space.is_alive(c));

            assert_eq!(got, naive_inner(block), "block {block:016b}");
        }
    }

    #[test]
    fn result_is_memoized() {
        let mut space = Cellspace::new();
        let glider = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];
        let cell = space.build(5, |x, y| glider.contains(&(x as i32 - 12, y as i32 - 12)));

        let a = cell.result(&mut space, 5);
        let before = space.stats();
        let len = space.len();

        let b = cell.result(&mut space, 5);
        let after = space.stats();

        assert_eq!(a, b);
        assert_eq!(space.len(), len);
        assert_eq!(after.results, before.results);
        assert_eq!(after.interned, before.interned);
        assert_eq!(after.intern_hits, before.intern_hits);
        assert_eq!(after.result_hits, before.result_hits + 1);
    }

    #[test]
    fn empty_stays_empty() {
        let mut space = Cellspace::new();

        for level in 2..=40 {
            let e = space.empty(level);
            let res = e.result(&mut space, level);

            assert_eq!(res, space.empty(level - 1), "level {level}");
        }
    }

    #[test]
    fn huge_empty_cells_are_cheap() {
        let mut space = Cellspace::new();
        let e = space.empty(200);

        let res = e.result(&mut space, 200);

        assert_eq!(res, space.empty(199));

        // Every level only ever sees the one empty cell
        assert_eq!(space.stats().results, 199);
    }

    #[test]
    fn block_stays_put() {
        let mut space = Cellspace::new();
        let cell = space.build(4, |x, y| (7..9).contains(&x) && (7..9).contains(&y));

        let res = cell.result(&mut space, 4);
        let want = space.build(3, |x, y| (3..5).contains(&x) && (3..5).contains(&y));

        assert_eq!(res, want);
    }

    #[test]
    #[should_panic(expected = "level 1")]
    fn level_one_has_no_result() {
        let mut space = Cellspace::new();
        let l = space.live_leaf();
        let cell = space.get_or_create(l, l, l, l);

        cell.result(&mut space, 1);
    }

    #[test]
    #[should_panic(expected = "is a leaf")]
    fn leaves_have_no_result() {
        let mut space = Cellspace::new();
        let l = space.live_leaf();

        l.result(&mut space, 2);
    }

    proptest! {
        #[test]
        fn identical_regions_share_results(bits in any::<u16>()) {
            let mut space = Cellspace::new();
            let a = block_cell(&mut space, bits);
            let b = block_cell(&mut space, bits);

            prop_assert_eq!(a, b);
            prop_assert_eq!(a.result(&mut space, 2), b.result(&mut space, 2));
            prop_assert_eq!(space.stats().results, 1);
        }
    }
}
