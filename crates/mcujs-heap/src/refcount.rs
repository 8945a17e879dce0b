//! Component C — the reference/lock protocol.
//!
//! `refs` tracks logical graph edges (how many other cells name or contain
//! this one); `locks` tracks transient, stack-like holders. A cell is freed
//! the instant both counters reach zero. See §4.C and the invariants in §3.

use std::collections::VecDeque;

use crate::cell::CellKind;
use crate::error::{HeapError, HeapResult};
use crate::heap::Heap;
use crate::ref_::Ref;

impl Heap {
    /// `jsvLock`. Increments the lock count and returns the same ref for
    /// chaining. Saturates at `LOCK_MAX` and reports `LockSaturation`
    /// rather than silently dropping the request (§9 open question:
    /// "prefer explicit error reporting").
    pub fn lock(&mut self, r: Ref) -> HeapResult<Ref> {
        debug_assert!(!r.is_null(), "lock() is unsafe for the null ref");
        let cell = self.pool.get_mut(r);
        if cell.locks == crate::cell::LOCK_MAX {
            return Err(HeapError::LockSaturation);
        }
        cell.locks += 1;
        Ok(r)
    }

    /// `jsvLockAgain` — same as `lock` but named for the "I already hold a
    /// copy of this handle" call site.
    pub fn lock_again(&mut self, r: Ref) -> HeapResult<Ref> {
        self.lock(r)
    }

    /// `jsvUnLock`. Safe on `Ref::NULL`. Decrements the lock count; if both
    /// counters are now zero, recursively frees the cell.
    pub fn unlock(&mut self, r: Ref) {
        if r.is_null() {
            return;
        }
        let cell = self.pool.get_mut(r);
        debug_assert!(cell.locks > 0, "unlock() called more times than lock()");
        cell.locks = cell.locks.saturating_sub(1);
        if cell.locks == 0 && cell.refs == 0 {
            self.free_recursive(r);
        }
    }

    /// `jsvRef`. Increments the logical reference count.
    pub fn reff(&mut self, r: Ref) {
        if r.is_null() {
            return;
        }
        debug_assert!(
            !self.pool.get(r).kind.is_string_ext(),
            "refs is repurposed as string bytes on extension cells"
        );
        self.pool.get_mut(r).refs += 1;
    }

    /// `jsvUnRef`. Decrements the logical reference count; frees the cell
    /// if both counters are now zero.
    pub fn unref(&mut self, r: Ref) {
        if r.is_null() {
            return;
        }
        let cell = self.pool.get_mut(r);
        debug_assert!(cell.refs > 0, "unref() called more times than reff()");
        cell.refs = cell.refs.saturating_sub(1);
        if cell.refs == 0 && cell.locks == 0 {
            self.free_recursive(r);
        }
    }

    /// Recursively unref/free a cell's dependents, using an explicit work
    /// queue rather than Rust call-stack recursion so that a deep object
    /// graph (e.g. a long linked list built out of single-child objects)
    /// cannot overflow the stack on a microcontroller.
    pub(crate) fn free_recursive(&mut self, start: Ref) {
        let mut queue: VecDeque<Ref> = VecDeque::new();
        queue.push_back(start);
        while let Some(r) = queue.pop_front() {
            if r.is_null() {
                continue;
            }
            // Another reference may have appeared before we got to this
            // entry (e.g. the same cell reachable via two edges that were
            // both queued); re-check liveness before freeing it.
            let cell = self.pool.get(r);
            if cell.locks != 0 || cell.refs != 0 {
                continue;
            }
            self.unlink_and_queue(r, &mut queue);
            self.pool.free(r);
        }
    }

    /// Detach `r`'s outgoing edges (value pointer for a name, children for
    /// a composite, string-chain continuation) and push whatever they
    /// pointed to onto the teardown queue, mirroring `jsvFreePtr`.
    pub(crate) fn unlink_and_queue(&mut self, r: Ref, queue: &mut VecDeque<Ref>) {
        let kind_is_name = self.pool.get(r).kind.is_name();
        if kind_is_name {
            let value = self.pool.get(r).first_child;
            if !value.is_null() {
                self.unref_into_queue(value, queue);
            }
        }

        if self.pool.get(r).kind.has_children() {
            // Detach every child name from the parent list and queue it.
            let mut child = self.pool.get(r).first_child;
            while !child.is_null() {
                let next = self.pool.get(child).next_sibling;
                self.unref_into_queue(child, queue);
                child = next;
            }
        }

        if self.pool.get(r).kind.is_string_head() {
            let mut ext = self.pool.get(r).first_child;
            while !ext.is_null() {
                let next_ext = self.pool.get(ext).last_child;
                self.unlock_into_queue(ext, queue);
                ext = next_ext;
            }
        }

        if matches!(self.pool.get(r).kind, CellKind::NameString(_)) {
            // A name's overflow chain for a key too long to fit inline is
            // rooted at its own `last_child`, not `first_child` (which
            // already holds the value pointer) — see `spill_name_key`.
            let mut ext = self.pool.get(r).last_child;
            while !ext.is_null() {
                let next_ext = self.pool.get(ext).last_child;
                self.unlock_into_queue(ext, queue);
                ext = next_ext;
            }
        }
    }

    /// Decrement `target`'s refcount on behalf of a detached edge; queue it
    /// for teardown if that was its last reference.
    fn unref_into_queue(&mut self, target: Ref, queue: &mut VecDeque<Ref>) {
        let cell = self.pool.get_mut(target);
        debug_assert!(cell.refs > 0);
        cell.refs = cell.refs.saturating_sub(1);
        if cell.refs == 0 && cell.locks == 0 {
            queue.push_back(target);
        }
    }

    /// String-extension cells are chained via locks, not refs (mirroring
    /// the original's "refs is just extra characters" repurposing); drop
    /// the implicit lock the head/previous extension held on them.
    fn unlock_into_queue(&mut self, target: Ref, queue: &mut VecDeque<Ref>) {
        let cell = self.pool.get_mut(target);
        debug_assert!(cell.locks > 0);
        cell.locks -= 1;
        if cell.locks == 0 && cell.refs == 0 {
            queue.push_back(target);
        }
    }

}

#[cfg(test)]
pub(crate) fn is_freed(heap: &Heap, r: Ref) -> bool {
    if r.is_null() {
        return false;
    }
    matches!(heap.pool.get(r).kind, CellKind::Unused)
}
