use thiserror::Error;

/// Recoverable and fatal failure modes of a `DysectEngine`.
///
/// Capacity-exceeded-after-displacement and misuse/invariant-violation
/// conditions are *not* represented here: the former is routed through
/// `insert`'s `bool` return and the latter through `debug_assert!`, so
/// introducing error variants for them would model failure the engine
/// is not meant to surface at runtime.
#[derive(Error, Debug)]
pub enum DysectError {
    /// `at`/`at_mut` was called with a key that is not present.
    #[error("key absent")]
    KeyAbsent,
    /// The in-place engine could not reserve its virtual memory region.
    #[error("failed to reserve in-place storage: {0}")]
    AllocationFailure(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DysectError>;
