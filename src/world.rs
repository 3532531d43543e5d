use std::fmt::Display;

use thiserror::Error;
use tracing::debug;

use crate::WorldOffset;
use crate::cell::Cell;
use crate::cellspace::Cellspace;

/// Smallest world whose root can be advanced.
pub const MIN_LEVEL: u32 = 1;

/// Largest world whose coordinates fit a [`WorldOffset`].
pub const MAX_LEVEL: u32 = 62;

/// Worlds larger than this are rendered as a summary.
const MAX_RENDER_LEVEL: u32 = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("World level must be between {MIN_LEVEL} and {MAX_LEVEL}, got {level}")]
    InvalidLevel { level: u32 },

    #[error("({x}, {y}) is outside of the world, which spans [-{half}, {half}) on both axes")]
    OutOfBounds {
        x: WorldOffset,
        y: WorldOffset,
        half: WorldOffset,
    },
}

/// A square, bounded universe on top of a [`Cellspace`].
///
/// Coordinates are centered: a world of level `n` spans `[-2^(n-1), 2^(n-1))` on both axes,
/// `x` growing to the east and `y` to the south.
pub struct World<'s> {
    space: &'s mut Cellspace,

    /// The whole universe, a `2^level` cell
    root: Cell,

    /// World depth, where `0` would be a single leaf
    level: u32,

    /// Generations elapsed since creation
    generation: u128,
}

impl<'s> World<'s> {
    /// Create an empty world of sidelength `2^level`.
    pub fn new(space: &'s mut Cellspace, level: u32) -> Result<Self, WorldError> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            return Err(WorldError::InvalidLevel { level });
        }

        let root = space.empty(level);

        debug!(level, ?root, "created world");

        Ok(Self {
            space,
            root,
            level,
            generation: 0,
        })
    }

    pub fn root(&self) -> Cell {
        self.root
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn generation(&self) -> u128 {
        self.generation
    }

    pub fn space(&self) -> &Cellspace {
        &*self.space
    }

    pub fn space_mut(&mut self) -> &mut Cellspace {
        &mut *self.space
    }

    /// Turn the cell at `(x, y)` on or off.
    pub fn set(&mut self, x: WorldOffset, y: WorldOffset, alive: bool) -> Result<(), WorldError> {
        let (x, y) = self.to_corner(x, y)?;

        self.root = set_at(self.space, self.root, self.level, x, y, alive);

        Ok(())
    }

    /// Whether the cell at `(x, y)` is alive.
    pub fn get(&self, x: WorldOffset, y: WorldOffset) -> Result<bool, WorldError> {
        let (mut x, mut y) = self.to_corner(x, y)?;
        let mut cell = self.root;

        for level in (1..=self.level).rev() {
            let half = 1 << (level - 1);
            let q = self.space.node(cell);

            cell = match (x >= half, y >= half) {
                (false, false) => q.nw,
                (true, false) => q.ne,
                (false, true) => q.sw,
                (true, true) => q.se,
            };

            x &= half - 1;
            y &= half - 1;
        }

        Ok(self.space.is_alive(cell))
    }

    /// Number of live cells in the world.
    pub fn population(&self) -> u64 {
        self.space.population(self.root)
    }

    /// Advance the world by `2^(level - 1)` generations, returning how many generations
    /// passed.
    ///
    /// The world is surrounded by dead cells: anything that leaves it is lost.
    pub fn advance(&mut self) -> u64 {
        let e = self.space.empty(self.level - 1);
        let q = self.space.node(self.root);

        // Center the root in a world twice as large
        let nw = self.space.get_or_create(e, e, e, q.nw);
        let ne = self.space.get_or_create(e, e, q.ne, e);
        let sw = self.space.get_or_create(e, q.sw, e, e);
        let se = self.space.get_or_create(q.se, e, e, e);
        let padded = self.space.get_or_create(nw, ne, sw, se);

        self.root = padded.result(self.space, self.level + 1);

        let steps = 1 << (self.level - 1);
        self.generation += steps as u128;

        debug!(
            level = self.level,
            generation = self.generation,
            cells = self.space.len(),
            "advanced world"
        );

        steps
    }

    /// Draw the world, one line per row. Live cells are `#`, dead cells `.`.
    pub fn render(&self) -> String {
        if self.level > MAX_RENDER_LEVEL {
            return format!("<level {} world, {} alive>", self.level, self.population());
        }

        let side = 1usize << self.level;
        let mut grid = vec![b'.'; side * side];

        self.space.for_each_alive(self.root, self.level, |x, y| {
            grid[y as usize * side + x as usize] = b'#';
        });

        grid.chunks(side)
            .map(|row| String::from_utf8_lossy(row).into_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Convert centered coordinates to coordinates relative to the north-west corner.
    fn to_corner(&self, x: WorldOffset, y: WorldOffset) -> Result<(u64, u64), WorldError> {
        let half: WorldOffset = 1 << (self.level - 1);
        let range = -half..half;

        if !range.contains(&x) || !range.contains(&y) {
            return Err(WorldError::OutOfBounds { x, y, half });
        }

        Ok(((x + half) as u64, (y + half) as u64))
    }
}

impl Display for World<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Rebuild `cell`, a `2^level` cell, with its leaf at `(x, y)` replaced.
fn set_at(space: &mut Cellspace, cell: Cell, level: u32, x: u64, y: u64, alive: bool) -> Cell {
    if level == 0 {
        return space.leaf(alive);
    }

    let half = 1 << (level - 1);
    let mut q = space.node(cell);
    let (lx, ly) = (x & (half - 1), y & (half - 1));

    match (x >= half, y >= half) {
        (false, false) => q.nw = set_at(space, q.nw, level - 1, lx, ly, alive),
        (true, false) => q.ne = set_at(space, q.ne, level - 1, lx, ly, alive),
        (false, true) => q.sw = set_at(space, q.sw, level - 1, lx, ly, alive),
        (true, true) => q.se = set_at(space, q.se, level - 1, lx, ly, alive),
    }

    space.get_or_create(q.nw, q.ne, q.sw, q.se)
}
