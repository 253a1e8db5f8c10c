//! Displacement strategies: given a key and its probe set, either place
//! it by displacing resident elements or report failure within a step
//! budget.
//!
//! The source couples the engine and its displacer via mutual friendship
//! and CRTP-style static dispatch. Here that seam is a trait instead:
//! the displacer takes a minimal view of the engine (read-only: probe
//! locations, hasher; read/write on buckets via the bucket interface),
//! with no ownership cycle needed. [`EngineView`] is exactly that
//! interface;
//! [`BfsDisplacer`] and [`RandomWalkDisplacer`] are generic over any type
//! that implements it, so both the independent and in-place engines
//! (`crate::engine`, `crate::inplace`) can reuse the same displacer code.

pub mod bfs;
pub mod random_walk;

pub use bfs::BfsDisplacer;
pub use random_walk::RandomWalkDisplacer;

use crate::bucket::{Bucket, Cell};
use crate::key::{Key, Value};
use crate::splitter::Probe;

/// The read/write slice of an engine a displacer needs: enough to
/// re-hash a resident key, re-split it into candidates, and read/write
/// the buckets along a displacement chain. Nothing about subtable count,
/// growth state, or bucket size leaks through beyond what a displacer
/// actually touches.
pub trait EngineView<const B: usize, const H: usize, K: Key, V: Value> {
    fn hash(&self, key: &K) -> u64;
    fn probes(&self, hashed: u64, key: &K) -> [Probe; H];
    /// Bucket at subtable `tab`, already masked by that subtable's
    /// current bitmask — the mask depends on whether `tab` is currently
    /// large or small, which only the engine knows.
    fn bucket_mut(&mut self, tab: usize, loc: u64) -> &mut Bucket<B, K, V>;

    /// True if two probes resolve to the same physical bucket once each
    /// subtable's current bitmask is applied (the "continuous bucket
    /// problem": two candidates can alias even when their raw `loc`
    /// fields differ, because the mask discards high bits). Only the
    /// engine knows each subtable's current mask, so this can't be
    /// computed from the probes alone.
    fn same_bucket(&self, a: &Probe, b: &Probe) -> bool;
}

/// Outcome of a displacement attempt.
pub enum DisplaceOutcome<K: Key, V: Value> {
    /// Displacement succeeded after `steps` chain links; `cell` is the
    /// vacated slot the caller's key now occupies.
    Success { steps: u32, cell: Cell<K, V> },
    /// The step budget was exhausted without finding room. The data
    /// model is unchanged unless the concrete displacer documents
    /// otherwise (the random-walk displacer's "optimistic" variant).
    Failure,
}

/// Common interface implemented by `BfsDisplacer` and
/// `RandomWalkDisplacer`.
pub trait Displacer<const B: usize, const H: usize, K: Key, V: Value> {
    fn insert<E: EngineView<B, H, K, V>>(
        &mut self,
        engine: &mut E,
        probes: &[Probe; H],
        incoming: Cell<K, V>,
        step_budget: u32,
    ) -> DisplaceOutcome<K, V>;
}
