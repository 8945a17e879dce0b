//! # mcujs-heap
//!
//! The variable heap for an embedded JavaScript interpreter: a
//! fixed-capacity arena of tagged, refcounted cells standing in for the
//! packed-union `JsVar` design used by microcontroller-class engines.
//!
//! - [`Heap`] is the single entry point; every operation in the module list
//!   below is a method on it, split across sibling files by concern.
//! - [`Ref`] is a small integer index into the pool, never a pointer —
//!   stable across a pool resize or a flash save/restore round trip.
//! - Freeing is two-counter (`refs` for graph edges, `locks` for transient
//!   stack holders) and happens the instant both reach zero; [`Heap::garbage_collect`]
//!   exists only to reclaim the cycles that scheme cannot.
#![warn(clippy::all)]

mod array_buffer;
mod cell;
mod children;
mod error;
mod gc;
mod heap;
mod iter;
mod maths;
mod pool;
mod ref_;
mod refcount;
mod string_chain;
mod value;

pub use cell::{ArrayBufferView, CellKind, InlineBytes, ViewType, DATA_STRING_EXT_LEN, DATA_STRING_LEN, LOCK_MAX};
pub use error::{HeapError, HeapResult};
pub use heap::Heap;
pub use iter::{ArrayBufferIterator, ArrayIterator, Iter, ObjectIterator};
pub use maths::MathsOp;
pub use pool::{CellPool, HeapConfig};
pub use ref_::Ref;
pub use string_chain::StringIterator;
