use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::cell::Cell;
use crate::cell::CellIndex;
use crate::cell::Quadrants;
use crate::rules;

/// Identifies a [`Cellspace`], so that cells from one store are never handed to another.
pub type SpaceId = u32;

static NEXT_SPACE_ID: AtomicU32 = AtomicU32::new(0);

/// Arena indices of the two leaves. Every `Cellspace` registers them before anything else.
const DEAD_LEAF: CellIndex = 0;
const LIVE_LEAF: CellIndex = 1;

enum Entry {
    Leaf {
        alive: bool,
    },
    Node {
        quadrants: Quadrants,

        /// The result of this cell, once computed.
        ///
        /// The result of a 2^n cell is a 2^{n - 1} cell, specifically it's what the center of
        /// this cell will look like in 2^{n - 2} generations.
        future: Option<Cell>,
    },
}

/// Counters describing how much work a [`Cellspace`] has done, and how much it avoided.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Macro-cells created
    pub interned: u64,

    /// Requests for a macro-cell which already existed
    pub intern_hits: u64,

    /// Results computed from scratch
    pub results: u64,

    /// Results answered from a cell's memoized future
    pub result_hits: u64,
}

/// The canonical store of every cell of a simulation.
///
/// Macro-cells are hash-consed: asking for the same four quadrants twice yields the same
/// [`Cell`]. Nothing is ever removed, all cells live exactly as long as the store.
pub struct Cellspace {
    id: SpaceId,

    /// This is where all of our memory goes
    entries: Vec<Entry>,

    /// Interning table, keyed on the quadrants of every macro-cell in `entries`
    index: FxHashMap<Quadrants, Cell>,

    /// Canonical all-dead cells, indexed by level
    empties: Vec<Cell>,

    /// Life rules
    ///
    /// Indexing into this array with a packed 4x4 block yields its next generation.
    rules: Vec<u16>,

    stats: Stats,
}

impl Default for Cellspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Cellspace {
    pub fn new() -> Self {
        let id = NEXT_SPACE_ID.fetch_add(1, Ordering::Relaxed);

        let entries = vec![Entry::Leaf { alive: false }, Entry::Leaf { alive: true }];
        let empties = vec![Cell::new(id, DEAD_LEAF)];

        debug!(space = id, "created cellspace");

        Self {
            id,
            entries,
            index: FxHashMap::default(),
            empties,
            rules: rules::compute_rules(),
            stats: Stats::default(),
        }
    }

    pub fn live_leaf(&self) -> Cell {
        Cell::new(self.id, LIVE_LEAF)
    }

    pub fn dead_leaf(&self) -> Cell {
        Cell::new(self.id, DEAD_LEAF)
    }

    pub fn leaf(&self, alive: bool) -> Cell {
        if alive {
            self.live_leaf()
        } else {
            self.dead_leaf()
        }
    }

    /// Return the unique macro-cell made of the given quadrants, creating it on first request.
    ///
    /// All four quadrants must be cells of this store, and of the same level.
    pub fn get_or_create(&mut self, nw: Cell, ne: Cell, sw: Cell, se: Cell) -> Cell {
        let quadrants = Quadrants { nw, ne, sw, se };

        let leaves = quadrants.to_array().map(|c| self.is_leaf(c));
        assert!(
            leaves.iter().all(|&l| l == leaves[0]),
            "quadrants must all be of the same level, got {quadrants:?}"
        );

        if let Some(&cell) = self.index.get(&quadrants) {
            self.stats.intern_hits += 1;
            return cell;
        }

        let index = CellIndex::try_from(self.entries.len())
            .ok()
            .filter(|&i| i != CellIndex::MAX)
            .unwrap_or_else(|| panic!("cellspace {} is out of cell indices", self.id));

        let cell = Cell::new(self.id, index);

        self.entries.push(Entry::Node {
            quadrants,
            future: None,
        });
        self.index.insert(quadrants, cell);
        self.stats.interned += 1;

        cell
    }

    /// Return the canonical all-dead cell of the given level.
    pub fn empty(&mut self, level: u32) -> Cell {
        while self.empties.len() <= level as usize {
            let Some(&e) = self.empties.last() else {
                unreachable!("the dead leaf is always registered")
            };

            let next = self.get_or_create(e, e, e, e);
            self.empties.push(next);
        }

        self.empties[level as usize]
    }

    /// Build the cell of the given level whose leaf at `(x, y)` is alive when `f(x, y)` is.
    ///
    /// Coordinates are relative to the north-west corner of the cell, and grow to the east and
    /// south.
    pub fn build<F>(&mut self, level: u32, f: F) -> Cell
    where
        F: Fn(u64, u64) -> bool,
    {
        self.build_at(level, 0, 0, &f)
    }

    fn build_at<F>(&mut self, level: u32, x: u64, y: u64, f: &F) -> Cell
    where
        F: Fn(u64, u64) -> bool,
    {
        if level == 0 {
            return self.leaf(f(x, y));
        }

        let half = 1 << (level - 1);

        let nw = self.build_at(level - 1, x, y, f);
        let ne = self.build_at(level - 1, x + half, y, f);
        let sw = self.build_at(level - 1, x, y + half, f);
        let se = self.build_at(level - 1, x + half, y + half, f);

        self.get_or_create(nw, ne, sw, se)
    }

    /// Call `f(x, y)` for every live leaf of `cell`, a cell of the given level. Coordinates are
    /// as in [`Cellspace::build`].
    pub fn for_each_alive<F>(&self, cell: Cell, level: u32, mut f: F)
    where
        F: FnMut(u64, u64),
    {
        self.for_each_alive_at(cell, level, 0, 0, &mut f)
    }

    fn for_each_alive_at<F>(&self, cell: Cell, level: u32, x: u64, y: u64, f: &mut F)
    where
        F: FnMut(u64, u64),
    {
        if self.empties.get(level as usize) == Some(&cell) {
            return;
        }

        let Some(q) = self.quadrants(cell) else {
            if self.is_alive(cell) {
                f(x, y);
            }

            return;
        };

        let half = 1 << (level - 1);

        self.for_each_alive_at(q.nw, level - 1, x, y, f);
        self.for_each_alive_at(q.ne, level - 1, x + half, y, f);
        self.for_each_alive_at(q.sw, level - 1, x, y + half, f);
        self.for_each_alive_at(q.se, level - 1, x + half, y + half, f);
    }

    /// Number of live leaves in `cell`.
    pub fn population(&self, cell: Cell) -> u64 {
        fn count(space: &Cellspace, cell: Cell, memo: &mut FxHashMap<Cell, u64>) -> u64 {
            if let Some(&n) = memo.get(&cell) {
                return n;
            }

            let n = match space.quadrants(cell) {
                None => space.is_alive(cell) as u64,
                Some(q) => q.to_array().iter().map(|&c| count(space, c, memo)).sum(),
            };

            memo.insert(cell, n);
            n
        }

        count(self, cell, &mut FxHashMap::default())
    }

    /// The quadrants of `cell`, or `None` for a leaf.
    pub fn quadrants(&self, cell: Cell) -> Option<Quadrants> {
        match self.entry(cell) {
            Entry::Leaf { .. } => None,
            Entry::Node { quadrants, .. } => Some(*quadrants),
        }
    }

    pub fn is_leaf(&self, cell: Cell) -> bool {
        matches!(self.entry(cell), Entry::Leaf { .. })
    }

    /// Whether the leaf `cell` is alive.
    ///
    /// Panics if `cell` is a macro-cell.
    pub fn is_alive(&self, cell: Cell) -> bool {
        match self.entry(cell) {
            Entry::Leaf { alive } => *alive,
            Entry::Node { .. } => panic!("{cell:?} is a macro-cell, not a leaf"),
        }
    }

    /// Number of cells in the store, leaves included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Like [`Cellspace::quadrants`], for cells which must be macro-cells.
    pub(crate) fn node(&self, cell: Cell) -> Quadrants {
        let Some(quadrants) = self.quadrants(cell) else {
            panic!("{cell:?} is a leaf, expected a macro-cell");
        };

        quadrants
    }

    /// The memoized future of a macro-cell, if it was already computed.
    pub(crate) fn future(&mut self, cell: Cell) -> Option<Cell> {
        let Entry::Node { future, .. } = self.entry(cell) else {
            panic!("{cell:?} is a leaf, it has no future");
        };

        let future = *future;
        if future.is_some() {
            self.stats.result_hits += 1;
        }

        future
    }

    /// Record the future of a macro-cell. A future is only ever written once.
    pub(crate) fn memoize(&mut self, cell: Cell, res: Cell) {
        self.check(res);

        let i = self.check(cell);
        let Entry::Node { future, .. } = &mut self.entries[i] else {
            panic!("{cell:?} is a leaf, it has no future");
        };

        assert!(future.is_none(), "future of {cell:?} was already computed");

        *future = Some(res);
        self.stats.results += 1;
    }

    /// Next generation of a packed 4x4 block. See [`rules`].
    pub(crate) fn rule(&self, block: u16) -> u16 {
        self.rules[block as usize]
    }

    fn entry(&self, cell: Cell) -> &Entry {
        &self.entries[self.check(cell)]
    }

    /// Assert that `cell` was handed out by this store, returning its arena index.
    fn check(&self, cell: Cell) -> usize {
        assert_eq!(
            cell.space(),
            self.id,
            "{cell:?} belongs to cellspace {}, not {}",
            cell.space(),
            self.id
        );

        let i = cell.index() as usize;
        assert!(i < self.entries.len(), "{cell:?} is not in cellspace {}", self.id);

        i
    }
}
