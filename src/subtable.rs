//! One of the engine's subtables: a contiguous, power-of-two-sized run
//! of buckets, addressed by masking an in-table offset.

use crate::bucket::Bucket;
use crate::key::{Key, Value};

pub struct Subtable<const B: usize, K: Key, V: Value> {
    buckets: Vec<Bucket<B, K, V>>,
    bits: u64,
}

impl<const B: usize, K: Key, V: Value> Subtable<B, K, V> {
    pub fn with_size(size: usize) -> Self {
        debug_assert!(size.is_power_of_two());
        Self {
            buckets: vec![Bucket::empty(); size],
            bits: (size - 1) as u64,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    /// The mask currently applied to offsets addressed into this
    /// subtable; depends only on this subtable's own size, not on its
    /// neighbors or the engine's large/small bookkeeping.
    #[inline]
    pub fn mask(&self) -> u64 {
        self.bits
    }

    #[inline]
    pub fn bucket(&self, offset: u64) -> &Bucket<B, K, V> {
        &self.buckets[(offset & self.bits) as usize]
    }

    #[inline]
    pub fn bucket_mut(&mut self, offset: u64) -> &mut Bucket<B, K, V> {
        &mut self.buckets[(offset & self.bits) as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bucket<B, K, V>> {
        self.buckets.iter()
    }
}
