//! The DySECT engine: owns `T` subtables, tracks their combined size
//! against the size-constraint factor alpha, and dispatches insert/find/
//! erase through the hash splitter, the buckets, and a displacement
//! strategy. `B` (bucket size), `T` (subtable count) and `H` (hash
//! fan-out) are compile-time constants; `D` is the displacement
//! strategy, generic so BFS and random-walk share this engine without
//! duplicating it.

use std::ops::{Index, IndexMut};

use crate::bucket::{Bucket, Cell, Probe as BucketProbe};
use crate::config::EngineConfig;
use crate::displace::{DisplaceOutcome, Displacer, EngineView};
use crate::error::{DysectError, Result};
use crate::hash::KeyHasher;
use crate::key::{Key, Value};
use crate::splitter::{HashSplitter, Probe};
use crate::subtable::Subtable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Active,
    Growing,
    Shrinking,
}

enum PlaceOutcome {
    AlreadyPresent,
    Inserted,
    Failed,
}

/// The minimal read/write slice of the engine a displacer gets: two
/// subtable-sized fields, borrowed independently of `displacer` itself
/// so a displacer can hold `&mut self.displacer` and this view at once
/// without aliasing `self`.
struct Core<'a, const B: usize, const T: usize, const H: usize, K: Key, V: Value> {
    subtables: &'a mut Vec<Subtable<B, K, V>>,
    hasher: &'a KeyHasher,
    splitter: &'a HashSplitter<T, H>,
}

impl<'a, const B: usize, const T: usize, const H: usize, K: Key, V: Value> EngineView<B, H, K, V>
    for Core<'a, B, T, H, K, V>
{
    fn hash(&self, key: &K) -> u64 {
        self.hasher.hash(key)
    }

    fn probes(&self, hashed: u64, key: &K) -> [Probe; H] {
        self.splitter.split(hashed, self.hasher, key)
    }

    fn bucket_mut(&mut self, tab: usize, loc: u64) -> &mut Bucket<B, K, V> {
        self.subtables[tab].bucket_mut(loc)
    }

    fn same_bucket(&self, a: &Probe, b: &Probe) -> bool {
        a.tab == b.tab
            && (a.loc & self.subtables[a.tab].mask()) == (b.loc & self.subtables[b.tab].mask())
    }
}

/// A growable, memory-bounded cuckoo hash table.
///
/// `B` cells per bucket, `T` subtables, `H` candidate buckets per key.
/// `D` is the displacement strategy used when all `H` candidates are
/// full; [`crate::displace::BfsDisplacer`] (the default) and
/// [`crate::displace::RandomWalkDisplacer`] both work here.
pub struct DysectEngine<
    const B: usize,
    const T: usize,
    const H: usize,
    K: Key,
    V: Value,
    D: Displacer<B, H, K, V> = crate::displace::BfsDisplacer,
> {
    subtables: Vec<Subtable<B, K, V>>,
    /// Size of the currently-small subtables; large ones hold double
    /// this. Doubles every time `l` wraps through `T`.
    size_small: usize,
    /// Number of subtables already doubled this growth cycle; these
    /// occupy indices `[0, l)`.
    l: usize,
    n: usize,
    capacity_cells: usize,
    grow_threshold: usize,
    shrink_threshold: usize,
    alpha: f64,
    step_budget: u32,
    fix_errors: bool,
    hasher: KeyHasher,
    splitter: HashSplitter<T, H>,
    displacer: D,
    state: State,
}

fn plan<const B: usize, const T: usize>(cap: usize, alpha: f64) -> (usize, usize, usize) {
    let avg = (cap as f64) * alpha / ((T * B) as f64);
    let mut size_small = 1usize;
    while avg > (2 * size_small) as f64 {
        size_small *= 2;
    }
    let mut l = if (size_small as f64) < avg {
        (((cap as f64) * alpha) / ((size_small * B) as f64)).floor() as isize - T as isize
    } else {
        0
    }
    .max(0) as usize;
    if l >= T {
        l = 0;
        size_small *= 2;
    }
    let capacity_cells = (l + T) * size_small * B;
    (size_small, l, capacity_cells)
}

fn build_subtables<const B: usize, K: Key, V: Value>(
    t: usize,
    size_small: usize,
    l: usize,
) -> Vec<Subtable<B, K, V>> {
    (0..t)
        .map(|i| {
            let size = if i < l { size_small * 2 } else { size_small };
            Subtable::with_size(size)
        })
        .collect()
}

impl<const B: usize, const T: usize, const H: usize, K: Key, V: Value, D: Displacer<B, H, K, V>>
    DysectEngine<B, T, H, K, V, D>
{
    /// Builds an engine with an explicit displacer instance. `cap` may
    /// be 0, in which case the engine starts at its minimum footprint.
    pub fn with_displacer(cap: usize, config: EngineConfig, displacer: D) -> Self {
        assert!(config.alpha > 1.0, "size constraint factor alpha must exceed 1.0");
        let (size_small, l, capacity_cells) = plan::<B, T>(cap, config.alpha);
        let subtables = build_subtables::<B, K, V>(T, size_small, l);
        let grow_threshold =
            (((capacity_cells + 2 * size_small * B) as f64) / config.alpha).ceil() as usize;
        Self {
            subtables,
            size_small,
            l,
            n: 0,
            capacity_cells,
            grow_threshold,
            shrink_threshold: 0,
            alpha: config.alpha,
            step_budget: config.step_budget,
            fix_errors: config.fix_errors,
            hasher: KeyHasher::with_seed(config.seed),
            splitter: HashSplitter::new(true, true),
            displacer,
            state: State::Active,
        }
    }

    fn recompute_thresholds(&mut self) {
        let span = 2 * self.size_small * B;
        self.grow_threshold = (((self.capacity_cells + span) as f64) / self.alpha).ceil() as usize;
        self.shrink_threshold = if self.capacity_cells > span {
            (((self.capacity_cells - span) as f64) / self.alpha).ceil() as usize
        } else {
            0
        };
    }

    fn place(&mut self, key: K, value: V) -> PlaceOutcome {
        let hashed = self.hasher.hash(&key);
        let probes = self.splitter.split(hashed, &self.hasher, &key);

        let mut best: Option<(usize, usize)> = None;
        for (i, p) in probes.iter().enumerate() {
            match self.subtables[p.tab].bucket_mut(p.loc).probe(&key) {
                BucketProbe::Occupied(_) => return PlaceOutcome::AlreadyPresent,
                BucketProbe::Vacant { free_slots, .. } => {
                    if best.map_or(true, |(_, f)| free_slots > f) {
                        best = Some((i, free_slots));
                    }
                }
            }
        }

        if let Some((i, free)) = best {
            if free > 0 {
                let p = probes[i];
                let inserted = self.subtables[p.tab].bucket_mut(p.loc).insert(Cell { key, value });
                debug_assert!(inserted, "bucket reported free slots but insert failed");
                self.n += 1;
                return PlaceOutcome::Inserted;
            }
        }

        let step_budget = self.step_budget;
        let cell = Cell { key, value };
        let outcome = {
            let DysectEngine {
                ref mut subtables,
                ref hasher,
                ref splitter,
                ref mut displacer,
                ..
            } = *self;
            let mut core = Core {
                subtables,
                hasher,
                splitter,
            };
            displacer.insert(&mut core, &probes, cell, step_budget)
        };
        match outcome {
            DisplaceOutcome::Success { .. } => {
                self.n += 1;
                PlaceOutcome::Inserted
            }
            DisplaceOutcome::Failure => PlaceOutcome::Failed,
        }
    }

    /// Inserts `(key, value)`. Returns `true` iff no cell for `key`
    /// existed already; on a duplicate key the existing value is left
    /// untouched.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        debug_assert!(!key.is_sentinel(), "the sentinel key must never be inserted");
        if self.n > self.grow_threshold {
            self.grow();
        }
        match self.place(key, value) {
            PlaceOutcome::Inserted => true,
            PlaceOutcome::AlreadyPresent => false,
            PlaceOutcome::Failed => {
                if self.fix_errors {
                    self.grow();
                    matches!(self.place(key, value), PlaceOutcome::Inserted)
                } else {
                    false
                }
            }
        }
    }

    /// Removes `key`. Returns the number of cells removed (0 or 1).
    pub fn erase(&mut self, key: &K) -> usize {
        let hashed = self.hasher.hash(key);
        let probes = self.splitter.split(hashed, &self.hasher, key);
        for p in probes.iter() {
            if self.subtables[p.tab].bucket_mut(p.loc).remove(key) {
                self.n -= 1;
                if self.n < self.shrink_threshold {
                    self.shrink();
                }
                return 1;
            }
        }
        0
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let hashed = self.hasher.hash(key);
        let probes = self.splitter.split(hashed, &self.hasher, key);
        for p in probes.iter() {
            if let Some(cell) = self.subtables[p.tab].bucket(p.loc).find(key) {
                return Some(&cell.value);
            }
        }
        None
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hashed = self.hasher.hash(key);
        let probes = self.splitter.split(hashed, &self.hasher, key);
        for p in probes.iter() {
            if self.subtables[p.tab].bucket(p.loc).find(key).is_some() {
                return self.subtables[p.tab]
                    .bucket_mut(p.loc)
                    .find_mut(key)
                    .map(|cell| &mut cell.value);
            }
        }
        None
    }

    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn count(&self, key: &K) -> usize {
        self.contains(key) as usize
    }

    /// As [`Self::get_mut`], but returns a recoverable error on a miss
    /// instead of `None`.
    pub fn at(&mut self, key: &K) -> Result<&mut V> {
        self.get_mut(key).ok_or(DysectError::KeyAbsent)
    }

    /// Inserts `V::default()` for `key` if absent, then returns a
    /// reference to its value. Used by [`IndexMut`].
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V {
        if !self.contains(&key) {
            self.insert(key, V::default());
        }
        self.get_mut(&key).expect("key was just inserted")
    }

    /// The probe index at which `key` currently resides, or `-1` if
    /// absent. A debug/observability hook, not part of the dictionary
    /// contract.
    pub fn displacement(&self, key: &K) -> i32 {
        let hashed = self.hasher.hash(key);
        let probes = self.splitter.split(hashed, &self.hasher, key);
        for (i, p) in probes.iter().enumerate() {
            if self.subtables[p.tab].bucket(p.loc).find(key).is_some() {
                return i as i32;
            }
        }
        -1
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity_cells
    }

    pub fn load_factor(&self) -> f64 {
        if self.capacity_cells == 0 {
            0.0
        } else {
            self.n as f64 / self.capacity_cells as f64
        }
    }

    /// Forgets every element and returns to the minimum footprint for
    /// the engine's alpha.
    pub fn clear(&mut self) {
        let (size_small, l, capacity_cells) = plan::<B, T>(0, self.alpha);
        self.subtables = build_subtables::<B, K, V>(T, size_small, l);
        self.size_small = size_small;
        self.l = l;
        self.capacity_cells = capacity_cells;
        self.n = 0;
        self.recompute_thresholds();
        self.shrink_threshold = 0;
    }

    /// Grows ahead of time so that at least `additional` more elements
    /// can be inserted without crossing the growth threshold.
    pub fn reserve(&mut self, additional: usize) {
        while self.n + additional > self.grow_threshold {
            self.grow();
        }
    }

    /// Iterates live `(key, value)` pairs. Forward-only, not
    /// restartable, invalidated by any mutating call made before it is
    /// dropped.
    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.subtables
            .iter()
            .flat_map(|st| st.iter())
            .flat_map(|bucket| bucket.iter())
            .map(|cell| (cell.key, cell.value))
    }

    /// Doubles the next small subtable in place, the core DySECT growth
    /// step. Non-reentrant.
    pub fn grow(&mut self) {
        debug_assert_eq!(self.state, State::Active, "grow is not reentrant");
        self.state = State::Growing;
        self.grow_one();
        self.state = State::Active;
    }

    fn grow_one(&mut self) {
        let target = self.l;
        let old_size = self.size_small;
        let bits_small = old_size - 1;
        let mut grown = Subtable::<B, K, V>::with_size(old_size * 2);

        for i in 0..old_size {
            for cell in self.subtables[target].bucket(i as u64).iter().copied().collect::<Vec<_>>() {
                let hashed = self.hasher.hash(&cell.key);
                let probes = self.splitter.split(hashed, &self.hasher, &cell.key);
                // First-matching-candidate rule (the element belongs to
                // whichever candidate chose this subtable and base
                // offset; that is where it must land post-migration).
                for p in probes.iter() {
                    if p.tab == target && (p.loc as usize & bits_small) == i {
                        let flag_set = p.loc & (old_size as u64) != 0;
                        let dest = if flag_set { i + old_size } else { i };
                        let inserted = grown.bucket_mut(dest as u64).insert(cell);
                        debug_assert!(inserted, "doubled subtable must have room for every migrated cell");
                        break;
                    }
                }
            }
        }

        self.subtables[target] = grown;
        self.capacity_cells += old_size * B;
        self.l += 1;
        if self.l == T {
            self.l = 0;
            self.size_small *= 2;
        }
        self.recompute_thresholds();
    }

    /// Halves the most recently grown subtable, the inverse of
    /// [`Self::grow`]. Elements that no longer fit their merged bucket
    /// spill into a temporary buffer and are reinserted afterward;
    /// spill reinsertion is never allowed to recurse into another
    /// shrink, only (if truly necessary) a single extra growth.
    pub fn shrink(&mut self) {
        debug_assert_eq!(self.state, State::Active, "shrink is not reentrant");
        self.state = State::Shrinking;
        self.shrink_one();
        self.state = State::Active;
    }

    fn shrink_one(&mut self) {
        let (target, size_small) = if self.l > 0 {
            (self.l - 1, self.size_small)
        } else {
            (T - 1, self.size_small / 2)
        };

        let mut merged = Subtable::<B, K, V>::with_size(size_small);
        let mut spill: Vec<Cell<K, V>> = Vec::new();

        for i in 0..size_small {
            for cell in self.subtables[target].bucket(i as u64).iter().copied() {
                if !merged.bucket_mut(i as u64).insert(cell) {
                    spill.push(cell);
                }
            }
            let hi = i + size_small;
            for cell in self.subtables[target].bucket(hi as u64).iter().copied() {
                if !merged.bucket_mut(i as u64).insert(cell) {
                    spill.push(cell);
                }
            }
        }

        self.subtables[target] = merged;
        if self.l > 0 {
            self.l -= 1;
        } else {
            self.l = T - 1;
            self.size_small = size_small;
        }
        self.capacity_cells -= size_small * B;
        self.recompute_thresholds();
        if self.size_small == 1 && self.l == 0 {
            self.shrink_threshold = 0;
        }

        let mut pending = spill;
        while !pending.is_empty() {
            let mut still_pending = Vec::new();
            for cell in pending.drain(..) {
                if let PlaceOutcome::Failed = self.place(cell.key, cell.value) {
                    still_pending.push(cell);
                }
            }
            if still_pending.is_empty() {
                break;
            }
            self.grow_one();
            pending = still_pending;
        }
    }
}

impl<const B: usize, const T: usize, const H: usize, K: Key, V: Value, D> DysectEngine<B, T, H, K, V, D>
where
    D: Displacer<B, H, K, V> + Default,
{
    pub fn new(cap: usize, config: EngineConfig) -> Self {
        Self::with_displacer(cap, config, D::default())
    }
}

impl<const B: usize, const T: usize, const H: usize, K: Key, V: Value, D: Displacer<B, H, K, V>> Index<K>
    for DysectEngine<B, T, H, K, V, D>
{
    type Output = V;

    fn index(&self, key: K) -> &V {
        self.get(&key).expect("no entry found for key")
    }
}

impl<const B: usize, const T: usize, const H: usize, K: Key, V: Value, D: Displacer<B, H, K, V>> IndexMut<K>
    for DysectEngine<B, T, H, K, V, D>
{
    fn index_mut(&mut self, key: K) -> &mut V {
        self.get_or_insert_default(key)
    }
}
