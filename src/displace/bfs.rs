//! The BFS displacer, "keys-only" variant: the roll-back walk pops each
//! displaced key by value and re-inserts it, rather than carrying raw
//! cell pointers through the queue. The source allows either; the
//! pointer-carrying variant would need two simultaneous mutable borrows
//! into the same bucket array during roll-back, which safe Rust can't
//! express without extra unsafe machinery this crate doesn't otherwise
//! need.

use super::{DisplaceOutcome, Displacer, EngineView};
use crate::bucket::Cell;
use crate::key::{Key, Value};
use crate::splitter::Probe;

/// One queue entry: the bucket this record refers to, and — for every
/// record except the `H` seeds — which key would move out of the
/// *parent* record's bucket into this one, were this bucket chosen.
struct Record<K: Key> {
    bucket: Probe,
    moving: Option<Moving<K>>,
}

struct Moving<K: Key> {
    key: K,
    parent: usize,
}

/// Bounded-depth breadth-first displacement search.
#[derive(Debug, Default, Clone, Copy)]
pub struct BfsDisplacer;

impl<const B: usize, const H: usize, K: Key, V: Value> Displacer<B, H, K, V> for BfsDisplacer {
    fn insert<E: EngineView<B, H, K, V>>(
        &mut self,
        engine: &mut E,
        probes: &[Probe; H],
        incoming: Cell<K, V>,
        step_budget: u32,
    ) -> DisplaceOutcome<K, V> {
        let mut records: Vec<Record<K>> = probes
            .iter()
            .map(|p| Record {
                bucket: *p,
                moving: None,
            })
            .collect();

        let mut head = 0usize;
        let mut success_idx = None;

        'search: while head < records.len() {
            let current = records[head].bucket;
            let resident_keys: Vec<K> = {
                let bucket = engine.bucket_mut(current.tab, current.loc);
                bucket.iter().map(|c| c.key).collect()
            };

            for key in resident_keys {
                let hashed = engine.hash(&key);
                let candidates = engine.probes(hashed, &key);
                for cand in candidates.iter() {
                    // "continuous bucket problem": skip a candidate that
                    // aliases the bucket we are expanding from —
                    // displacing into it would be a no-op.
                    if engine.same_bucket(cand, &current) {
                        continue;
                    }
                    if records.len() as u32 >= step_budget {
                        break 'search;
                    }
                    let target_has_space = engine.bucket_mut(cand.tab, cand.loc).space();
                    let child_idx = records.len();
                    records.push(Record {
                        bucket: *cand,
                        moving: Some(Moving { key, parent: head }),
                    });
                    if target_has_space {
                        success_idx = Some(child_idx);
                        break 'search;
                    }
                }
            }
            head += 1;
        }

        let Some(tail) = success_idx else {
            return DisplaceOutcome::Failure;
        };

        // Walk the chain from tail to root, popping each displaced key
        // from its parent's bucket and re-inserting it into the bucket
        // that referenced it.
        let mut idx = tail;
        let mut steps = 0u32;
        loop {
            let Moving { key, parent } = match &records[idx].moving {
                Some(m) => Moving {
                    key: m.key,
                    parent: m.parent,
                },
                None => break,
            };
            let parent_bucket = records[parent].bucket;
            let this_bucket = records[idx].bucket;

            let value = engine
                .bucket_mut(parent_bucket.tab, parent_bucket.loc)
                .pop(&key)
                .expect("key observed during BFS scan must still be present");
            let inserted = engine
                .bucket_mut(this_bucket.tab, this_bucket.loc)
                .insert(Cell { key, value });
            debug_assert!(inserted, "target bucket was checked to have space");

            steps += 1;
            idx = parent;
        }

        let root_bucket = records[idx].bucket;
        let inserted = engine
            .bucket_mut(root_bucket.tab, root_bucket.loc)
            .insert(incoming);
        debug_assert!(inserted, "root bucket was vacated by the roll-back above");

        DisplaceOutcome::Success {
            steps,
            cell: incoming,
        }
    }
}
