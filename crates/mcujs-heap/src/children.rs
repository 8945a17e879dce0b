//! Component E — child lists for objects, arrays, and functions.
//!
//! A composite cell's children are a doubly linked list of name cells,
//! `first_child`/`last_child` on the parent pointing at the head/tail and
//! `next_sibling`/`prev_sibling` on each name threading the list. Objects
//! preserve insertion order; arrays are kept ordered by numeric key because
//! `array_push`/`array_insert_before` are the only ways elements are added
//! at a specific position.

use crate::cell::CellKind;
use crate::error::HeapResult;
use crate::heap::Heap;
use crate::ref_::Ref;

impl Heap {
    /// `jsvAddName`: link an already-constructed name cell onto the tail
    /// of `parent`'s child list. The parent contributes one `refs` edge to
    /// the name cell. Returns a freshly locked handle to `name`.
    pub fn add_name(&mut self, parent: Ref, name: Ref) -> HeapResult<Ref> {
        debug_assert!(self.pool.get(parent).kind.has_children());
        debug_assert!(self.pool.get(name).kind.is_name());
        self.reff(name);
        let tail = self.pool.get(parent).last_child;
        self.pool.get_mut(name).prev_sibling = tail;
        self.pool.get_mut(name).next_sibling = Ref::NULL;
        if tail.is_null() {
            self.pool.get_mut(parent).first_child = name;
        } else {
            self.pool.get_mut(tail).next_sibling = name;
        }
        self.pool.get_mut(parent).last_child = name;
        self.lock(name)
    }

    fn insert_name_before(&mut self, parent: Ref, pivot: Ref, name: Ref) -> HeapResult<Ref> {
        self.reff(name);
        let prev = self.pool.get(pivot).prev_sibling;
        self.pool.get_mut(name).prev_sibling = prev;
        self.pool.get_mut(name).next_sibling = pivot;
        self.pool.get_mut(pivot).prev_sibling = name;
        if prev.is_null() {
            self.pool.get_mut(parent).first_child = name;
        } else {
            self.pool.get_mut(prev).next_sibling = name;
        }
        self.lock(name)
    }

    /// `jsvAddNamedChild`: builds a fresh name cell for `key -> value` and
    /// appends it. Does not check for an existing child with the same
    /// key — callers that need dedup use `set_named_child`.
    pub fn add_named_child(&mut self, parent: Ref, value: Ref, key: &[u8]) -> HeapResult<Ref> {
        let raw = self.pool.alloc(CellKind::Null)?;
        let name = match self.make_into_name(raw, value, key) {
            Ok(n) => n,
            Err(e) => {
                self.unlock(raw);
                return Err(e);
            }
        };
        let result = self.add_name(parent, name);
        self.unlock(name);
        result
    }

    /// `jsvSetNamedChild`: like `add_named_child`, but overwrites the
    /// value of an existing child with a matching key instead of adding a
    /// duplicate.
    pub fn set_named_child(&mut self, parent: Ref, value: Ref, key: &[u8]) -> HeapResult<Ref> {
        let existing = self.find_child_from_string(parent, key, false)?;
        if !existing.is_null() {
            self.set_value_of_name(existing, value);
            Ok(existing)
        } else {
            self.add_named_child(parent, value, key)
        }
    }

    /// `jsvSetValueOfName`: repoints a name cell at a new value, adjusting
    /// refcounts on both the old and new value.
    pub fn set_value_of_name(&mut self, name: Ref, value: Ref) {
        debug_assert!(self.pool.get(name).kind.is_name());
        let old = self.pool.get(name).first_child;
        if old == value {
            return;
        }
        if !value.is_null() {
            self.reff(value);
        }
        self.pool.get_mut(name).first_child = value;
        if !old.is_null() {
            self.unref(old);
        }
    }

    /// `jsvFindChildFromString`: linear scan of `parent`'s children for a
    /// name cell whose key matches `key`. With `create`, appends a new
    /// name bound to `Ref::NULL` (undefined) when none is found.
    pub fn find_child_from_string(&mut self, parent: Ref, key: &[u8], create: bool) -> HeapResult<Ref> {
        let mut child = self.pool.get(parent).first_child;
        while !child.is_null() {
            if self.name_key_bytes(child) == key {
                return self.lock(child);
            }
            child = self.pool.get(child).next_sibling;
        }
        if create {
            self.add_named_child(parent, Ref::NULL, key)
        } else {
            Ok(Ref::NULL)
        }
    }

    /// `jsvFindChildFromVar`: same as `find_child_from_string`, using
    /// another name cell's key as the lookup key (the template cell does
    /// not itself need to be a child of `parent`).
    pub fn find_child_from_var(&mut self, parent: Ref, name_template: Ref, create: bool) -> HeapResult<Ref> {
        let key = self.name_key_bytes(name_template);
        self.find_child_from_string(parent, &key, create)
    }

    /// `jsvRemoveChild`: unlinks `name` from `parent`'s child list and
    /// drops the parent's `refs` edge, which may free `name` (and cascade
    /// into its value) if nothing else holds it.
    pub fn remove_child(&mut self, parent: Ref, name: Ref) {
        let (prev, next) = {
            let c = self.pool.get(name);
            (c.prev_sibling, c.next_sibling)
        };
        if prev.is_null() {
            self.pool.get_mut(parent).first_child = next;
        } else {
            self.pool.get_mut(prev).next_sibling = next;
        }
        if next.is_null() {
            self.pool.get_mut(parent).last_child = prev;
        } else {
            self.pool.get_mut(next).prev_sibling = prev;
        }
        self.pool.get_mut(name).next_sibling = Ref::NULL;
        self.pool.get_mut(name).prev_sibling = Ref::NULL;
        self.unref(name);
    }

    /// `jsvRemoveAllChildren`.
    pub fn remove_all_children(&mut self, parent: Ref) {
        let mut child = self.pool.get(parent).first_child;
        while !child.is_null() {
            let next = self.pool.get(child).next_sibling;
            self.unref(child);
            child = next;
        }
        self.pool.get_mut(parent).first_child = Ref::NULL;
        self.pool.get_mut(parent).last_child = Ref::NULL;
    }

    /// `jsvGetChildren`: count of direct children.
    pub fn get_children(&self, parent: Ref) -> usize {
        let mut count = 0;
        let mut child = self.pool.get(parent).first_child;
        while !child.is_null() {
            count += 1;
            child = self.pool.get(child).next_sibling;
        }
        count
    }

    /// `jsvIsChild`.
    pub fn is_child(&self, parent: Ref, name: Ref) -> bool {
        let mut child = self.pool.get(parent).first_child;
        while !child.is_null() {
            if child == name {
                return true;
            }
            child = self.pool.get(child).next_sibling;
        }
        false
    }

    /// `jsvObjectGetChild`: convenience wrapper returning the child's
    /// value directly (not the name cell), or `Ref::NULL` if absent or the
    /// lock count is saturated.
    pub fn object_get_child(&mut self, parent: Ref, key: &[u8]) -> Ref {
        match self.find_child_from_string(parent, key, false) {
            Ok(name) if !name.is_null() => self.skip_name_and_unlock(name),
            _ => Ref::NULL,
        }
    }

    /// `jsvObjectSetChild`: convenience wrapper over `set_named_child`.
    pub fn object_set_child(&mut self, parent: Ref, key: &[u8], value: Ref) -> HeapResult<Ref> {
        self.set_named_child(parent, value, key)
    }

    // ---- arrays --------------------------------------------------------

    fn name_key_as_index(&self, name: Ref) -> Option<usize> {
        match &self.pool.get(name).kind {
            CellKind::NameInt(n) if *n >= 0 => Some(*n as usize),
            CellKind::NameString(_) => {
                let bytes = self.name_key_bytes(name);
                std::str::from_utf8(&bytes).ok()?.parse::<usize>().ok()
            }
            _ => None,
        }
    }

    fn rekey_numeric(&mut self, name: Ref, new_idx: usize) {
        self.pool.get_mut(name).kind = CellKind::NameInt(new_idx as i32);
    }

    /// Last numeric-keyed child, walking backward from the tail. Per the
    /// open question in the design notes, array length for a sparse array
    /// is "greatest numeric key + 1" — this is also the element `pop`
    /// removes.
    fn last_numeric_child(&self, arr: Ref) -> Ref {
        let mut child = self.pool.get(arr).last_child;
        while !child.is_null() {
            if self.name_key_as_index(child).is_some() {
                return child;
            }
            child = self.pool.get(child).prev_sibling;
        }
        Ref::NULL
    }

    fn find_array_index(&self, arr: Ref, idx: usize) -> Ref {
        let mut child = self.pool.get(arr).first_child;
        while !child.is_null() {
            if self.name_key_as_index(child) == Some(idx) {
                return child;
            }
            child = self.pool.get(child).next_sibling;
        }
        Ref::NULL
    }

    /// `jsvGetArrayLength`.
    pub fn array_length(&self, arr: Ref) -> usize {
        let child = self.last_numeric_child(arr);
        if child.is_null() {
            0
        } else {
            self.name_key_as_index(child).unwrap() + 1
        }
    }

    /// `jsvArrayPush`. Returns the new length.
    pub fn array_push(&mut self, arr: Ref, value: Ref) -> HeapResult<usize> {
        let idx = self.array_length(arr);
        let key = idx.to_string();
        let name = self.add_named_child(arr, value, key.as_bytes())?;
        self.unlock(name);
        Ok(idx + 1)
    }

    /// `jsvArrayPushWithInitialSize`. The original used the size hint to
    /// preallocate its native backing array; this chain-of-names
    /// representation has no equivalent fast path, so it behaves exactly
    /// like `array_push`.
    pub fn array_push_with_initial_size(
        &mut self,
        arr: Ref,
        value: Ref,
        _initial_size: usize,
    ) -> HeapResult<usize> {
        self.array_push(arr, value)
    }

    /// `jsvArrayPop`: removes and returns the highest-indexed element.
    pub fn array_pop(&mut self, arr: Ref) -> Ref {
        let name = self.last_numeric_child(arr);
        if name.is_null() {
            return Ref::NULL;
        }
        let value = self.skip_name(name);
        self.remove_child(arr, name);
        value
    }

    /// `jsvArrayPopFirst`: removes index 0 and reindexes every remaining
    /// element down by one, keeping the array dense.
    pub fn array_pop_first(&mut self, arr: Ref) -> Ref {
        let first = self.pool.get(arr).first_child;
        if first.is_null() {
            return Ref::NULL;
        }
        let value = self.skip_name(first);
        let mut child = self.pool.get(first).next_sibling;
        self.remove_child(arr, first);
        while !child.is_null() {
            let next = self.pool.get(child).next_sibling;
            if let Some(idx) = self.name_key_as_index(child) {
                if idx > 0 {
                    self.rekey_numeric(child, idx - 1);
                }
            }
            child = next;
        }
        value
    }

    /// `jsvArrayGetLast`: the highest-indexed element, without removing it.
    pub fn array_get_last(&mut self, arr: Ref) -> Ref {
        let name = self.last_numeric_child(arr);
        self.skip_name(name)
    }

    /// `jsvGetArrayItem`.
    pub fn array_get(&mut self, arr: Ref, i: usize) -> Ref {
        let name = self.find_array_index(arr, i);
        self.skip_name(name)
    }

    /// `jsvGetArrayIndexOf`. `exact` compares by cell identity; otherwise
    /// by `basic_equal` value comparison.
    pub fn array_index_of(&self, arr: Ref, value: Ref, exact: bool) -> i32 {
        let mut child = self.pool.get(arr).first_child;
        while !child.is_null() {
            let candidate = self.pool.get(child).first_child;
            let matches = if exact {
                candidate == value
            } else {
                self.basic_equal(candidate, value)
            };
            if matches {
                if let Some(idx) = self.name_key_as_index(child) {
                    return idx as i32;
                }
            }
            child = self.pool.get(child).next_sibling;
        }
        -1
    }

    /// `jsvArrayInsertBefore`: inserts `element` at `pivot`'s index,
    /// shifting `pivot` and everything after it up by one. `pivot ==
    /// Ref::NULL` appends at the end (equivalent to `array_push`).
    pub fn array_insert_before(&mut self, arr: Ref, pivot: Ref, element: Ref) -> HeapResult<Ref> {
        let insert_idx = if pivot.is_null() {
            self.array_length(arr)
        } else {
            self.name_key_as_index(pivot).unwrap_or(0)
        };

        // Allocate (and key) the new name cell before touching any existing
        // child's index: if this fails with OOM, the array must come back
        // out untouched rather than half-reindexed.
        let raw = self.pool.alloc(CellKind::Null)?;
        let name = match self.make_into_name(raw, element, insert_idx.to_string().as_bytes()) {
            Ok(n) => n,
            Err(e) => {
                self.unlock(raw);
                return Err(e);
            }
        };

        let mut child = self.pool.get(arr).last_child;
        while !child.is_null() {
            let prev = self.pool.get(child).prev_sibling;
            if let Some(idx) = self.name_key_as_index(child) {
                if idx >= insert_idx {
                    self.rekey_numeric(child, idx + 1);
                }
            }
            child = prev;
        }

        let result = if pivot.is_null() {
            self.add_name(arr, name)
        } else {
            self.insert_name_before(arr, pivot, name)
        };
        self.unlock(name);
        result
    }

    /// `jsvArrayJoin`.
    pub fn array_join(&mut self, arr: Ref, separator: &[u8]) -> HeapResult<Ref> {
        let len = self.array_length(arr);
        let out = self.new_string(b"")?;
        for i in 0..len {
            if i > 0 {
                self.append_bytes(out, separator)?;
            }
            let value = self.array_get(arr, i);
            if !value.is_null() {
                let s = self.as_string(value, true)?;
                let n = self.string_length(s);
                let mut buf = vec![0u8; n + 1];
                let written = self.get_string(s, &mut buf);
                self.append_bytes(out, &buf[..written])?;
                self.unlock(s);
            }
        }
        Ok(out)
    }

    /// `jsvArrayIsEmpty`.
    pub fn array_is_empty(&self, arr: Ref) -> bool {
        self.pool.get(arr).first_child.is_null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::HeapConfig;

    fn heap() -> Heap {
        Heap::init(HeapConfig { capacity: 256 })
    }

    #[test]
    fn test_object_set_and_get_child() {
        let mut h = heap();
        let obj = h.new_object().unwrap();
        let v = h.new_int(5).unwrap();
        h.object_set_child(obj, b"x", v).unwrap();
        let got = h.object_get_child(obj, b"x");
        assert_eq!(got, v);
        h.unlock(got);
        h.unlock(v);
        h.unlock(obj);
    }

    #[test]
    fn test_set_named_child_overwrites_existing_key() {
        let mut h = heap();
        let obj = h.new_object().unwrap();
        let v1 = h.new_int(1).unwrap();
        let v2 = h.new_int(2).unwrap();
        h.set_named_child(obj, v1, b"k").unwrap();
        h.set_named_child(obj, v2, b"k").unwrap();
        assert_eq!(h.get_children(obj), 1);
        let got = h.object_get_child(obj, b"k");
        assert_eq!(got, v2);
        h.unlock(got);
        h.unlock(v1);
        h.unlock(v2);
        h.unlock(obj);
    }

    #[test]
    fn test_object_get_child_missing_key_is_undefined() {
        let mut h = heap();
        let obj = h.new_object().unwrap();
        assert_eq!(h.object_get_child(obj, b"nope"), Ref::NULL);
        h.unlock(obj);
    }

    #[test]
    fn test_array_push_and_length() {
        let mut h = heap();
        let arr = h.new_array().unwrap();
        let v1 = h.new_int(10).unwrap();
        let v2 = h.new_int(20).unwrap();
        assert_eq!(h.array_push(arr, v1).unwrap(), 1);
        assert_eq!(h.array_push(arr, v2).unwrap(), 2);
        assert_eq!(h.array_length(arr), 2);
        h.unlock(v1);
        h.unlock(v2);
        h.unlock(arr);
    }

    #[test]
    fn test_array_pop_from_empty_is_undefined() {
        let mut h = heap();
        let arr = h.new_array().unwrap();
        assert_eq!(h.array_pop(arr), Ref::NULL);
        h.unlock(arr);
    }

    #[test]
    fn test_array_pop_returns_highest_index() {
        let mut h = heap();
        let arr = h.new_array().unwrap();
        let v1 = h.new_int(1).unwrap();
        let v2 = h.new_int(2).unwrap();
        h.array_push(arr, v1).unwrap();
        h.array_push(arr, v2).unwrap();
        let popped = h.array_pop(arr);
        assert_eq!(popped, v2);
        assert_eq!(h.array_length(arr), 1);
        h.unlock(popped);
        h.unlock(v1);
        h.unlock(v2);
        h.unlock(arr);
    }

    #[test]
    fn test_array_pop_first_reindexes_remaining() {
        let mut h = heap();
        let arr = h.new_array().unwrap();
        let vals: Vec<Ref> = (0..3).map(|i| h.new_int(i).unwrap()).collect();
        for &v in &vals {
            h.array_push(arr, v).unwrap();
        }
        let first = h.array_pop_first(arr);
        assert_eq!(first, vals[0]);
        assert_eq!(h.array_length(arr), 2);
        assert_eq!(h.array_get(arr, 0), vals[1]);
        assert_eq!(h.array_get(arr, 1), vals[2]);
        h.unlock(first);
        for v in vals {
            h.unlock(v);
        }
        h.unlock(arr);
    }

    #[test]
    fn test_array_length_is_greatest_index_plus_one_with_sparse_deletions() {
        let mut h = heap();
        let arr = h.new_array().unwrap();
        let vals: Vec<Ref> = (0..3).map(|i| h.new_int(i).unwrap()).collect();
        for &v in &vals {
            h.array_push(arr, v).unwrap();
        }
        // Remove the middle element directly (not via pop); length should
        // still reflect the surviving highest index, not the element count.
        let middle_name = {
            let mut child = h.pool.get(arr).first_child;
            loop {
                let v = h.skip_name(child);
                let is_middle = v == vals[1];
                h.unlock(v);
                if is_middle {
                    break child;
                }
                child = h.pool.get(child).next_sibling;
            }
        };
        h.remove_child(arr, middle_name);
        assert_eq!(h.array_length(arr), 3);
        assert_eq!(h.get_children(arr), 2);
        for v in vals {
            h.unlock(v);
        }
        h.unlock(arr);
    }

    #[test]
    fn test_array_index_of_value_equality_vs_exact() {
        let mut h = heap();
        let arr = h.new_array().unwrap();
        let a = h.new_int(7).unwrap();
        let b = h.new_int(7).unwrap();
        h.array_push(arr, a).unwrap();
        assert_eq!(h.array_index_of(arr, b, false), 0);
        assert_eq!(h.array_index_of(arr, b, true), -1);
        h.unlock(a);
        h.unlock(b);
        h.unlock(arr);
    }

    #[test]
    fn test_array_insert_before_shifts_indices() {
        let mut h = heap();
        let arr = h.new_array().unwrap();
        let v0 = h.new_int(0).unwrap();
        let v1 = h.new_int(1).unwrap();
        h.array_push(arr, v0).unwrap();
        h.array_push(arr, v1).unwrap();
        let pivot = {
            let mut child = h.pool.get(arr).first_child;
            h.lock(child).unwrap()
        };
        let inserted = h.new_int(99).unwrap();
        h.array_insert_before(arr, pivot, inserted).unwrap();
        assert_eq!(h.array_length(arr), 3);
        assert_eq!(h.array_get(arr, 0), inserted);
        assert_eq!(h.array_get(arr, 1), v0);
        assert_eq!(h.array_get(arr, 2), v1);
        h.unlock(pivot);
        h.unlock(v0);
        h.unlock(v1);
        h.unlock(inserted);
        h.unlock(arr);
    }
}
