//! The `Heap`: owns the cell pool and is the single entry point for every
//! operation described in §4 of the spec. Individual components are
//! implemented as `impl Heap` blocks spread across sibling modules
//! (`refcount.rs`, `string_chain.rs`, `children.rs`, `array_buffer.rs`,
//! `iter.rs`, `gc.rs`, `maths.rs`) rather than as separate owning structs,
//! because every one of them ultimately mutates the same pool of uniform
//! cells — the arena-and-index design the spec calls for natively.

use crate::cell::CellKind;
use crate::pool::{CellPool, HeapConfig};
use crate::ref_::Ref;

/// A fixed-capacity, refcounted variable heap.
///
/// `Heap` is `!Send`/`!Sync` by construction (it owns a plain `Vec`, no
/// internal synchronization) — the scheduling model is single-threaded and
/// cooperative, per §5.
pub struct Heap {
    pub(crate) pool: CellPool,
    /// The ref of the singleton root object, created by `init` and never
    /// freed before `kill`.
    root: Ref,
}

impl Heap {
    /// `jsvInit`: create a fresh heap with its root object already
    /// allocated and locked.
    pub fn init(config: HeapConfig) -> Self {
        let mut pool = CellPool::new(config);
        let root = pool
            .alloc(CellKind::Root)
            .expect("fresh pool must have room for the root cell");
        Self { pool, root }
    }

    /// Convenience constructor using `HeapConfig::default()`.
    pub fn new(capacity: usize) -> Self {
        Self::init(HeapConfig { capacity })
    }

    /// `jsvKill`: release the root handle. Any cell still reachable only
    /// through locks held elsewhere stays alive until those locks drop;
    /// this matches the host-driven teardown order used by the original.
    pub fn kill(mut self) {
        self.unlock(self.root);
    }

    /// `jsvSoftInit`: reattach to a heap restored from persisted storage
    /// without re-running `init`'s allocation of a fresh root. The caller
    /// is expected to have already rebuilt `pool` out-of-band (e.g. from a
    /// flash image) and supplies the root ref it recovered.
    pub fn soft_init(pool: CellPool, root: Ref) -> Self {
        Self { pool, root }
    }

    /// `jsvSoftKill`: the mirror operation — hands back the pool and root
    /// ref for persistence, without dropping anything.
    pub fn soft_kill(self) -> (CellPool, Ref) {
        (self.pool, self.root)
    }

    /// The ref of the singleton root object.
    #[inline]
    pub fn root(&self) -> Ref {
        self.root
    }

    /// `jsvGetMemoryUsage`.
    pub fn mem_used(&self) -> usize {
        self.pool.mem_used()
    }

    /// `jsvGetMemoryTotal`.
    pub fn mem_total(&self) -> usize {
        self.pool.mem_total()
    }

    /// `jsvIsMemoryFull`.
    pub fn is_memory_full(&self) -> bool {
        self.pool.mem_used() >= self.pool.mem_total()
    }

    /// `jsvSetMemoryTotal` — only ever grows the pool; see `pool::set_total`.
    pub fn set_memory_total(&mut self, capacity: usize) {
        self.pool.set_total(capacity);
    }

    /// Tag name of the variant behind `r`, for debugging/tracing.
    pub fn type_name(&self, r: Ref) -> &'static str {
        if r.is_null() {
            "UNDEFINED"
        } else {
            self.pool.get(r).kind.tag_name()
        }
    }
}
