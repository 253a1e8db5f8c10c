//! The hash primitive: `hash(key) -> u64`.
//!
//! `britt-marie::index::hash` hangs its default `BuildHasher` straight off
//! the `fxhash` crate (`pub type DefaultHashBuilder = fxhash::FxBuildHasher`)
//! because "most keys tend to be small". We keep `fxhash` for the same
//! reason, but build our own thin wrapper instead of using
//! `FxBuildHasher` directly: multiple independent hashers need to be
//! instantiable with distinct seeds, and stock `FxBuildHasher` always
//! starts from the same fixed constant. We get a seeded hash out of the
//! stock hasher by feeding the seed through it as a prefix before the
//! key, which keeps us on the crate's public, stable `Default`/`Hasher`
//! surface while staying deterministic, stateless aside from the
//! construction seed, and infallible.

use std::hash::{Hash, Hasher};

use crate::key::Key;

/// `hash(K) -> u64`, deterministic given a construction seed.
#[derive(Debug, Clone, Copy)]
pub struct KeyHasher {
    seed: u64,
}

impl KeyHasher {
    #[inline]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Derives an independent hasher from this one, for use sites that
    /// need a second hash function decorrelated from the first (the
    /// single-pair hash splitter re-hashes per candidate using exactly
    /// this).
    #[inline]
    pub fn derive(&self, salt: u64) -> Self {
        // A cheap odd-multiplier mix is enough here: the splitter only
        // needs the *derived* seed to differ, not to itself be
        // high-quality-random.
        Self {
            seed: self.seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15),
        }
    }

    #[inline]
    pub fn hash<K: Key>(&self, key: &K) -> u64 {
        let mut hasher = fxhash::FxHasher::default();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        hasher.finish()
    }
}
