//! Component G — the iterator family.
//!
//! Every iterator here owns a lock on whatever cell it is currently
//! positioned at, so a structural mutation elsewhere (removing a child,
//! appending to a string) can never free that cell out from under an
//! in-progress walk (§4.G, §5).

use crate::array_buffer::{decode_float, decode_int, encode_float, encode_int};
use crate::cell::ViewType;
use crate::error::HeapResult;
use crate::heap::Heap;
use crate::ref_::Ref;
use crate::string_chain::StringIterator;

/// Walks a parent's child list one name cell at a time.
pub struct ArrayIterator {
    cell: Ref,
}

impl ArrayIterator {
    pub fn new(heap: &mut Heap, parent: Ref) -> HeapResult<Self> {
        let first = heap.pool.get(parent).first_child;
        let cell = if first.is_null() { Ref::NULL } else { heap.lock(first)? };
        Ok(Self { cell })
    }

    #[inline]
    pub fn has_current(&self) -> bool {
        !self.cell.is_null()
    }

    /// `jsvArrayIteratorGetElement` / `jsvObjectIteratorGetValue`.
    pub fn get_element(&self, heap: &mut Heap) -> Ref {
        heap.skip_name(self.cell)
    }

    /// `jsvArrayIteratorSetElement`.
    pub fn set_element(&self, heap: &mut Heap, value: Ref) {
        heap.set_value_of_name(self.cell, value);
    }

    /// `jsvArrayIteratorGetIndex` / `jsvObjectIteratorGetKey`: the name
    /// cell itself (an array's "index" and an object's "key" are both
    /// just the name's key).
    pub fn get_name(&self) -> Ref {
        self.cell
    }

    pub fn next(&mut self, heap: &mut Heap) -> HeapResult<()> {
        if self.cell.is_null() {
            return Ok(());
        }
        let next = heap.pool.get(self.cell).next_sibling;
        heap.unlock(self.cell);
        self.cell = if next.is_null() { Ref::NULL } else { heap.lock(next)? };
        Ok(())
    }

    /// `jsvArrayIteratorRemoveAndGotoNext` / the object-iterator
    /// equivalent: detaches the current name from `parent` and advances
    /// to what was the next sibling.
    pub fn remove_and_goto_next(&mut self, heap: &mut Heap, parent: Ref) {
        if self.cell.is_null() {
            return;
        }
        let old = self.cell;
        let next = heap.pool.get(old).next_sibling;
        self.cell = if next.is_null() { Ref::NULL } else { heap.lock(next).unwrap_or(next) };
        heap.remove_child(parent, old);
        heap.unlock(old);
    }

    pub fn free(self, heap: &mut Heap) {
        heap.unlock(self.cell);
    }

    pub fn clone_locked(&self, heap: &mut Heap) -> Self {
        let cell = if self.cell.is_null() { Ref::NULL } else { heap.lock(self.cell).unwrap_or(self.cell) };
        Self { cell }
    }
}

/// Same shape as `ArrayIterator`; kept as a distinct type so call sites
/// read `.get_key()` rather than `.get_name()` for object property walks.
pub struct ObjectIterator(ArrayIterator);

impl ObjectIterator {
    pub fn new(heap: &mut Heap, parent: Ref) -> HeapResult<Self> {
        Ok(Self(ArrayIterator::new(heap, parent)?))
    }

    #[inline]
    pub fn has_current(&self) -> bool {
        self.0.has_current()
    }

    pub fn get_value(&self, heap: &mut Heap) -> Ref {
        self.0.get_element(heap)
    }

    pub fn set_value(&self, heap: &mut Heap, value: Ref) {
        self.0.set_element(heap, value)
    }

    pub fn get_key(&self) -> Ref {
        self.0.get_name()
    }

    pub fn next(&mut self, heap: &mut Heap) -> HeapResult<()> {
        self.0.next(heap)
    }

    pub fn remove_and_goto_next(&mut self, heap: &mut Heap, parent: Ref) {
        self.0.remove_and_goto_next(heap, parent)
    }

    pub fn free(self, heap: &mut Heap) {
        self.0.free(heap)
    }

    pub fn clone_locked(&self, heap: &mut Heap) -> Self {
        Self(self.0.clone_locked(heap))
    }
}

/// Walks an array-buffer's elements. Composes a `StringIterator` over the
/// backing bytes (which is what owns the lock keeping the backing string
/// alive) plus the offset/length/type state needed to decode each
/// element.
pub struct ArrayBufferIterator {
    view: ViewType,
    remaining: usize,
    bytes: StringIterator,
}

impl ArrayBufferIterator {
    pub fn new(heap: &mut Heap, ab: Ref) -> Self {
        let (backing, offset, length, view) = heap.array_buffer_parts(ab);
        let bytes = StringIterator::new(heap, backing, offset);
        Self { view, remaining: length, bytes }
    }

    #[inline]
    pub fn has_current(&self) -> bool {
        self.remaining > 0
    }

    fn peek_bytes(&self, heap: &mut Heap) -> [u8; 8] {
        let mut it = self.bytes.clone_locked(heap);
        let mut out = [0u8; 8];
        for slot in out.iter_mut().take(self.view.size_of()) {
            *slot = if it.has_char(heap) { it.get_char(heap) } else { 0 };
            it.advance(heap);
        }
        it.free(heap);
        out
    }

    fn poke_bytes(&self, heap: &mut Heap, bytes: [u8; 8]) {
        let mut it = self.bytes.clone_locked(heap);
        for &b in bytes.iter().take(self.view.size_of()) {
            it.set_char(heap, b);
            it.advance(heap);
        }
        it.free(heap);
    }

    /// `jsvArrayBufferIteratorGetValue`: decode the element at the cursor
    /// without advancing.
    pub fn get_value(&self, heap: &mut Heap) -> HeapResult<Ref> {
        let bytes = self.peek_bytes(heap);
        if self.view.is_float() {
            heap.new_float(decode_float(self.view, &bytes))
        } else {
            heap.new_int(decode_int(self.view, &bytes) as i32)
        }
    }

    /// Alias kept for parity with the original's two-name API; this
    /// iterator's `get_value` already never advances, so the "rewind" is
    /// a no-op here.
    pub fn get_value_and_rewind(&self, heap: &mut Heap) -> HeapResult<Ref> {
        self.get_value(heap)
    }

    /// `jsvArrayBufferIteratorSetValue`: write at the cursor without
    /// advancing. Reading via `get_value` does not write back, so the two
    /// are independent — a read-modify-write needs both calls explicitly.
    pub fn set_value(&self, heap: &mut Heap, value: Ref) {
        let bytes = if self.view.is_float() {
            encode_float(self.view, heap.get_float(value))
        } else {
            encode_int(self.view, heap.get_integer(value))
        };
        self.poke_bytes(heap, bytes);
    }

    pub fn next(&mut self, heap: &mut Heap) {
        if self.remaining == 0 {
            return;
        }
        for _ in 0..self.view.size_of() {
            self.bytes.advance(heap);
        }
        self.remaining -= 1;
    }

    pub fn free(self, heap: &mut Heap) {
        self.bytes.free(heap);
    }

    pub fn clone_locked(&self, heap: &mut Heap) -> Self {
        Self {
            view: self.view,
            remaining: self.remaining,
            bytes: self.bytes.clone_locked(heap),
        }
    }
}

enum IterKind {
    Array(ArrayIterator),
    Object(ObjectIterator),
    ArrayBuffer(ArrayBufferIterator),
    String(StringIterator),
}

/// `JsvIterator`: a tagged union dispatching on the category of the cell
/// it was constructed over.
pub struct Iter {
    kind: IterKind,
}

impl Iter {
    /// `jsvIteratorNew`: dispatches on `cell`'s variant.
    pub fn new(heap: &mut Heap, cell: Ref) -> HeapResult<Self> {
        let kind = if heap.is_array(cell) || heap.is_function(cell) {
            IterKind::Array(ArrayIterator::new(heap, cell)?)
        } else if heap.is_array_buffer(cell) {
            IterKind::ArrayBuffer(ArrayBufferIterator::new(heap, cell))
        } else if heap.is_string(cell) {
            IterKind::String(StringIterator::new(heap, cell, 0))
        } else {
            IterKind::Object(ObjectIterator::new(heap, cell)?)
        };
        Ok(Self { kind })
    }

    pub fn has_current(&self, heap: &Heap) -> bool {
        match &self.kind {
            IterKind::Array(it) => it.has_current(),
            IterKind::Object(it) => it.has_current(),
            IterKind::ArrayBuffer(it) => it.has_current(),
            IterKind::String(it) => it.has_char(heap),
        }
    }

    /// The current element as a value cell: an array/object child's
    /// value, an array-buffer's decoded element, or (for a string) a
    /// fresh one-byte string cell wrapping the current character.
    pub fn get_value(&self, heap: &mut Heap) -> HeapResult<Ref> {
        match &self.kind {
            IterKind::Array(it) => Ok(it.get_element(heap)),
            IterKind::Object(it) => Ok(it.get_value(heap)),
            IterKind::ArrayBuffer(it) => it.get_value(heap),
            IterKind::String(it) => {
                let ch = if it.has_char(heap) { it.get_char(heap) } else { 0 };
                heap.new_string(&[ch])
            }
        }
    }

    pub fn next(&mut self, heap: &mut Heap) -> HeapResult<()> {
        match &mut self.kind {
            IterKind::Array(it) => it.next(heap),
            IterKind::Object(it) => it.next(heap),
            IterKind::ArrayBuffer(it) => {
                it.next(heap);
                Ok(())
            }
            IterKind::String(it) => {
                it.advance(heap);
                Ok(())
            }
        }
    }

    pub fn free(self, heap: &mut Heap) {
        match self.kind {
            IterKind::Array(it) => it.free(heap),
            IterKind::Object(it) => it.free(heap),
            IterKind::ArrayBuffer(it) => it.free(heap),
            IterKind::String(it) => it.free(heap),
        }
    }

    /// `jsvIteratorClone`: O(1), re-locks the cursor cell.
    pub fn clone_locked(&self, heap: &mut Heap) -> Self {
        let kind = match &self.kind {
            IterKind::Array(it) => IterKind::Array(it.clone_locked(heap)),
            IterKind::Object(it) => IterKind::Object(it.clone_locked(heap)),
            IterKind::ArrayBuffer(it) => IterKind::ArrayBuffer(it.clone_locked(heap)),
            IterKind::String(it) => IterKind::String(it.clone_locked(heap)),
        };
        Self { kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ViewType;
    use crate::pool::HeapConfig;

    fn heap() -> Heap {
        Heap::init(HeapConfig { capacity: 256 })
    }

    #[test]
    fn test_array_iterator_walks_elements_in_order() {
        let mut h = heap();
        let arr = h.new_array().unwrap();
        let vals: Vec<Ref> = (0..3).map(|i| h.new_int(i * 10).unwrap()).collect();
        for &v in &vals {
            h.array_push(arr, v).unwrap();
        }
        let mut it = ArrayIterator::new(&mut h, arr).unwrap();
        let mut seen = Vec::new();
        while it.has_current() {
            let v = it.get_element(&mut h);
            seen.push(h.get_integer(v));
            h.unlock(v);
            it.next(&mut h).unwrap();
        }
        it.free(&mut h);
        assert_eq!(seen, vec![0, 10, 20]);
        for v in vals {
            h.unlock(v);
        }
        h.unlock(arr);
    }

    #[test]
    fn test_object_iterator_exposes_keys_and_values() {
        let mut h = heap();
        let obj = h.new_object().unwrap();
        let v = h.new_int(42).unwrap();
        h.object_set_child(obj, b"answer", v).unwrap();

        let mut it = ObjectIterator::new(&mut h, obj).unwrap();
        assert!(it.has_current());
        let key_bytes = h.name_key_bytes(it.get_key());
        assert_eq!(key_bytes, b"answer");
        let got = it.get_value(&mut h);
        assert_eq!(h.get_integer(got), 42);
        h.unlock(got);
        it.next(&mut h).unwrap();
        assert!(!it.has_current());
        it.free(&mut h);

        h.unlock(v);
        h.unlock(obj);
    }

    #[test]
    fn test_iterator_remove_and_goto_next_skips_removed_element() {
        let mut h = heap();
        let arr = h.new_array().unwrap();
        let vals: Vec<Ref> = (0..3).map(|i| h.new_int(i).unwrap()).collect();
        for &v in &vals {
            h.array_push(arr, v).unwrap();
        }
        let mut it = ArrayIterator::new(&mut h, arr).unwrap();
        // Remove element 0, landing on element 1.
        it.remove_and_goto_next(&mut h, arr);
        let v = it.get_element(&mut h);
        assert_eq!(h.get_integer(v), 1);
        h.unlock(v);
        it.free(&mut h);
        assert_eq!(h.array_length(arr), 2);
        for v in vals {
            h.unlock(v);
        }
        h.unlock(arr);
    }

    #[test]
    fn test_array_buffer_iterator_decodes_each_element() {
        let mut h = heap();
        let backing = h.new_string_of_length(4).unwrap();
        let ab = h.new_array_buffer(backing, 0, 4, ViewType::U8).unwrap();
        for i in 0..4u8 {
            let v = h.new_int(i as i32 * 2).unwrap();
            h.array_buffer_set(ab, i as usize, v).unwrap();
            h.unlock(v);
        }
        let mut it = ArrayBufferIterator::new(&mut h, ab);
        let mut seen = Vec::new();
        while it.has_current() {
            let v = it.get_value(&mut h).unwrap();
            seen.push(h.get_integer(v));
            h.unlock(v);
            it.next(&mut h);
        }
        it.free(&mut h);
        assert_eq!(seen, vec![0, 2, 4, 6]);
        h.unlock(ab);
        h.unlock(backing);
    }

    #[test]
    fn test_generic_iter_dispatches_on_cell_kind() {
        let mut h = heap();
        let s = h.new_string(b"ab").unwrap();
        let mut it = Iter::new(&mut h, s).unwrap();
        let mut out = Vec::new();
        while it.has_current(&h) {
            let v = it.get_value(&mut h).unwrap();
            let mut buf = [0u8; 2];
            let n = h.get_string(v, &mut buf);
            out.push(buf[0..n][0]);
            h.unlock(v);
            it.next(&mut h).unwrap();
        }
        it.free(&mut h);
        assert_eq!(out, b"ab");
        h.unlock(s);
    }
}
