//! Component H — mark-and-sweep cycle collection.
//!
//! Refcounting alone reclaims everything in the common acyclic case; GC
//! exists solely to reclaim cycles (§4.H). It never runs implicitly —
//! hosts call `garbage_collect()` when they choose to (e.g. under memory
//! pressure).

use std::collections::VecDeque;

use crate::heap::Heap;
use crate::ref_::Ref;

impl Heap {
    /// Phase 1-4 of §4.H. Returns whether anything was reclaimed.
    pub fn garbage_collect(&mut self) -> bool {
        let targets: Vec<Ref> = self.pool.live_refs().collect();

        #[cfg(feature = "gc_logging")]
        tracing::debug!(live = targets.len(), "gc: starting mark phase");

        // Phase 1 + 2: clear marks, seed the worklist with every locked
        // cell (stack-held handles) and the singleton root.
        let mut marked = vec![false; self.pool.len()];
        let mut queue: VecDeque<Ref> = VecDeque::new();

        let root = self.root();
        marked[root.index()] = true;
        queue.push_back(root);

        for &r in &targets {
            if self.pool.get(r).locks > 0 && !marked[r.index()] {
                marked[r.index()] = true;
                queue.push_back(r);
            }
        }

        // Phase 3: BFS over every link field. Fields unused by a given
        // variant are always `Ref::NULL` and contribute nothing.
        while let Some(r) = queue.pop_front() {
            let cell = self.pool.get(r);
            for n in [cell.first_child, cell.last_child, cell.next_sibling, cell.prev_sibling] {
                if !n.is_null() && !marked[n.index()] {
                    marked[n.index()] = true;
                    queue.push_back(n);
                }
            }
        }

        #[cfg(feature = "gc_logging")]
        tracing::debug!(marked = marked.iter().filter(|m| **m).count(), "gc: mark phase complete");

        // Phase 4: sweep. Anything left unmarked with no lock is garbage;
        // detach its real (refs-counted) outgoing edges before reclaiming
        // it, so neighbours that do survive keep an accurate count.
        let mut reclaimed = false;
        for r in targets {
            if marked[r.index()] {
                continue;
            }
            let cell = self.pool.get(r);
            if !cell.is_live() || cell.locks != 0 {
                continue;
            }

            let mut freed = VecDeque::new();
            self.unlink_and_queue(r, &mut freed);
            self.pool.free_forced(r);
            reclaimed = true;

            while let Some(next) = freed.pop_front() {
                if next.is_null() {
                    continue;
                }
                let c = self.pool.get(next);
                if c.is_live() && c.locks == 0 && c.refs == 0 {
                    self.free_recursive(next);
                }
            }
        }

        #[cfg(feature = "gc_logging")]
        if reclaimed {
            tracing::info!("gc: reclaimed a reference cycle");
        } else {
            tracing::debug!("gc: nothing to reclaim");
        }

        reclaimed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::HeapConfig;
    use crate::refcount::is_freed;

    fn heap() -> Heap {
        Heap::init(HeapConfig { capacity: 64 })
    }

    #[test]
    fn test_gc_reclaims_an_unreachable_cycle() {
        let mut h = heap();
        let a = h.new_object().unwrap();
        let b = h.new_object().unwrap();
        h.object_set_child(a, b"next", b).unwrap();
        h.object_set_child(b, b"next", a).unwrap();
        // Drop the stack's locks; each object is still kept alive only by
        // the other's `refs` edge, so refcounting alone can't free either.
        h.unlock(a);
        h.unlock(b);
        assert!(!is_freed(&h, a));
        assert!(!is_freed(&h, b));

        assert!(h.garbage_collect());
        assert!(is_freed(&h, a));
        assert!(is_freed(&h, b));
    }

    #[test]
    fn test_gc_does_not_reclaim_a_locked_cell() {
        let mut h = heap();
        let a = h.new_object().unwrap();
        assert!(!h.garbage_collect());
        assert!(!is_freed(&h, a));
        h.unlock(a);
    }

    #[test]
    fn test_gc_is_a_no_op_on_an_empty_heap() {
        let mut h = heap();
        assert!(!h.garbage_collect());
    }

    #[test]
    fn test_gc_reclaims_cycle_reachable_only_via_array() {
        let mut h = heap();
        let arr = h.new_array().unwrap();
        let obj = h.new_object().unwrap();
        h.array_push(arr, obj).unwrap();
        h.object_set_child(obj, b"self", arr).unwrap();
        h.unlock(arr);
        h.unlock(obj);
        assert!(h.garbage_collect());
        assert!(is_freed(&h, arr));
        assert!(is_freed(&h, obj));
    }
}
