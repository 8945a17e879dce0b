//! Heap error types.
//!
//! Mirrors §7 of the spec one-for-one. Recoverable errors never corrupt
//! heap state: a call that returns `Err` leaves every child list, string
//! chain, and counter exactly as it was before the call began.

use thiserror::Error;

/// Errors the heap can report to its host.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The cell pool is at capacity; no free slot is available.
    #[error("out of memory: cell pool exhausted")]
    OutOfMemory,

    /// `lock` was called on a cell already holding `LOCK_MAX` locks.
    #[error("lock count saturated")]
    LockSaturation,

    /// An operation was invoked on a cell of an incompatible variant.
    #[error("type mismatch")]
    TypeMismatch,

    /// An array-buffer access (or similar bounds-checked operation) was
    /// out of range.
    #[error("index out of range")]
    IndexOutOfRange,

    /// A cooperatively cancelled long-running operation was interrupted.
    #[error("interrupted")]
    Interrupted,
}

/// Result type for fallible heap operations.
pub type HeapResult<T> = Result<T, HeapError>;
