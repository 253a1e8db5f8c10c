//! The random-walk displacer.
//!
//! Defaults to the "cyclic with explicit cycle detection" sub-variant:
//! the walk is recorded as a list and nothing is mutated until a target
//! bucket with space is actually found, at which point the whole chain
//! is applied in reverse. For parity with a safe-by-default engine, that
//! is the default here; `optimistic` below is an opt-in for the
//! immediate-swap variant, which can silently drop the incoming key on
//! step exhaustion.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{DisplaceOutcome, Displacer, EngineView};
use crate::bucket::Cell;
use crate::key::{Key, Value};
use crate::splitter::Probe;

/// One step of the walk: the bucket we are standing in, and the key we
/// picked out of it to carry forward.
struct Step<K: Key> {
    bucket: Probe,
    carried_key: K,
}

/// Cuckoo-style random-walk displacement with a deterministic PRNG.
pub struct RandomWalkDisplacer {
    rng: SmallRng,
    /// When true, the very first swap is applied immediately instead of
    /// being deferred until the walk succeeds ("optimistic" mode). Off
    /// by default.
    pub optimistic: bool,
}

impl RandomWalkDisplacer {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            optimistic: false,
        }
    }

    pub fn optimistic(mut self, optimistic: bool) -> Self {
        self.optimistic = optimistic;
        self
    }
}

impl<const B: usize, const H: usize, K: Key, V: Value> Displacer<B, H, K, V>
    for RandomWalkDisplacer
{
    fn insert<E: EngineView<B, H, K, V>>(
        &mut self,
        engine: &mut E,
        probes: &[Probe; H],
        incoming: Cell<K, V>,
        step_budget: u32,
    ) -> DisplaceOutcome<K, V> {
        debug_assert!(H > 0);
        let start = probes[self.rng.gen_range(0, H)];

        if self.optimistic {
            return self.walk_optimistic(engine, start, incoming, step_budget);
        }

        let mut path: Vec<Step<K>> = Vec::new();
        let mut current = start;
        let mut steps = 0u32;

        loop {
            if steps >= step_budget {
                return DisplaceOutcome::Failure;
            }

            let slot = self.rng.gen_range(0, B);
            let carried_key = engine.bucket_mut(current.tab, current.loc).get(slot).key;

            let hashed = engine.hash(&carried_key);
            let candidates = engine.probes(hashed, &carried_key);
            let mut other = candidates[pick_other(&mut self.rng, H, &candidates, &current, engine)];
            if engine.same_bucket(&other, &current) {
                other = candidates[H - 1];
            }

            // Cycle detection: if `other` is already on the path,
            // truncate back to that point.
            if let Some(pos) = path.iter().position(|s| engine.same_bucket(&s.bucket, &other)) {
                path.truncate(pos);
                current = other;
                steps += 1;
                continue;
            }

            path.push(Step {
                bucket: current,
                carried_key,
            });

            if engine.bucket_mut(other.tab, other.loc).space() {
                // Success: apply the whole chain in reverse, then drop
                // the incoming cell into the now-vacant start bucket.
                let mut dest = other;
                for step in path.iter().rev() {
                    let value = engine
                        .bucket_mut(step.bucket.tab, step.bucket.loc)
                        .pop(&step.carried_key)
                        .expect("carried key was read from this bucket moments ago");
                    let inserted = engine.bucket_mut(dest.tab, dest.loc).insert(Cell {
                        key: step.carried_key,
                        value,
                    });
                    debug_assert!(inserted);
                    dest = step.bucket;
                }
                let inserted = engine.bucket_mut(start.tab, start.loc).insert(incoming);
                debug_assert!(inserted);
                return DisplaceOutcome::Success {
                    steps: path.len() as u32,
                    cell: incoming,
                };
            }

            current = other;
            steps += 1;
        }
    }
}

impl RandomWalkDisplacer {
    /// Immediate-swap ("optimistic") variant: mutates the table as it
    /// walks, and simply loses the incoming key if the budget runs out
    /// before a vacancy is found.
    fn walk_optimistic<const B: usize, const H: usize, K: Key, V: Value, E: EngineView<B, H, K, V>>(
        &mut self,
        engine: &mut E,
        start: Probe,
        incoming: Cell<K, V>,
        step_budget: u32,
    ) -> DisplaceOutcome<K, V> {
        let slot = self.rng.gen_range(0, B);
        let mut carried = engine.bucket_mut(start.tab, start.loc).replace(slot, incoming);
        let mut current = start;

        for step in 0..step_budget {
            let hashed = engine.hash(&carried.key);
            let candidates = engine.probes(hashed, &carried.key);
            let mut other = candidates[pick_other(&mut self.rng, H, &candidates, &current, engine)];
            if engine.same_bucket(&other, &current) {
                other = candidates[H - 1];
            }

            if engine.bucket_mut(other.tab, other.loc).space() {
                let inserted = engine.bucket_mut(other.tab, other.loc).insert(carried);
                debug_assert!(inserted);
                return DisplaceOutcome::Success {
                    steps: step + 1,
                    cell: incoming,
                };
            }

            let victim_slot = self.rng.gen_range(0, B);
            carried = engine.bucket_mut(other.tab, other.loc).replace(victim_slot, carried);
            current = other;
        }

        DisplaceOutcome::Failure
    }
}

/// Picks a candidate index other than the one matching `current`,
/// substituting the last candidate if the random pick lands on
/// `current`.
fn pick_other<const B: usize, const H: usize, K: Key, V: Value, E: EngineView<B, H, K, V>>(
    rng: &mut SmallRng,
    h: usize,
    candidates: &[Probe; H],
    current: &Probe,
    engine: &E,
) -> usize {
    let idx = rng.gen_range(0, h);
    if engine.same_bucket(&candidates[idx], current) {
        h - 1
    } else {
        idx
    }
}
