#![cfg_attr(
    feature = "nightly",
    feature(
        alloc_layout_extra,
        allocator_api,
        ptr_offset_from,
        test,
        core_intrinsics,
        dropck_eyepatch,
        specialization,
    )
)]

//! A space-efficient, growable cuckoo hash table.
//!
//! The core engine, [`DysectEngine`], holds its memory footprint within
//! a user-chosen factor of the number of live elements by growing one
//! subtable at a time instead of the whole table at once. [`InplaceEngine`]
//! is the same algorithm backed by a single over-reserved memory
//! mapping, so growth never needs a second full allocation.

/// The hash primitive.
pub mod hash;
/// Splits a hashed key into candidate bucket locations.
pub mod splitter;
/// The dense-left bucket.
pub mod bucket;
/// A growable array of buckets.
pub mod subtable;
/// Displacement strategies used when every candidate bucket is full.
pub mod displace;
/// Runtime-tunable engine configuration.
pub mod config;
/// The `Key`/`Value` contracts an engine stores.
pub mod key;
/// Error types surfaced by the public API.
pub mod error;
/// The heap-allocated DySECT engine.
pub mod engine;
/// The memory-mapped, in-place DySECT engine.
pub mod inplace;

pub use config::{DisplacerKind, EngineConfig};
pub use displace::{BfsDisplacer, Displacer, RandomWalkDisplacer};
pub use engine::DysectEngine;
pub use error::{DysectError, Result};
pub use inplace::InplaceEngine;
pub use key::{Key, Value};
