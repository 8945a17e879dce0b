//! Component D — strings as singly linked chains of cells.
//!
//! A string's total length is never stored; every length-dependent
//! operation derives it by walking the chain (§4.D). The head caches a
//! pointer to the tail extension cell in `last_child` so appends are O(1)
//! instead of needing a full walk first.

use crate::cell::{CellKind, InlineBytes, DATA_STRING_EXT_LEN, DATA_STRING_LEN};
use crate::error::HeapResult;
use crate::heap::Heap;
use crate::ref_::Ref;

impl Heap {
    /// `jsvNewFromString`.
    pub fn new_string(&mut self, bytes: &[u8]) -> HeapResult<Ref> {
        let head = self.pool.alloc(CellKind::StringHead(InlineBytes::empty()))?;
        if let Err(e) = self.append_bytes(head, bytes) {
            self.unlock(head);
            return Err(e);
        }
        Ok(head)
    }

    /// `jsvNewStringOfLength`: a zero-filled string of exactly `n` bytes.
    pub fn new_string_of_length(&mut self, n: usize) -> HeapResult<Ref> {
        let zeros = vec![0u8; n];
        self.new_string(&zeros)
    }

    /// `jsvNewFromStringVar`: copy up to `max` chars of `src` starting at
    /// `start` into a brand new string.
    pub fn new_substring(&mut self, src: Ref, start: usize, max: usize) -> HeapResult<Ref> {
        let head = self.pool.alloc(CellKind::StringHead(InlineBytes::empty()))?;
        if let Err(e) = self.append_from(head, src, start, max) {
            self.unlock(head);
            return Err(e);
        }
        Ok(head)
    }

    /// Total length of the string chain rooted at `r`, computed by walking.
    pub fn string_length(&self, r: Ref) -> usize {
        if r.is_null() {
            return 0;
        }
        let head = self.pool.get(r);
        let CellKind::StringHead(inline) = &head.kind else {
            debug_assert!(false, "string_length on a non-string cell");
            return 0;
        };
        let mut total = inline.len();
        let mut ext = head.first_child;
        while !ext.is_null() {
            let cell = self.pool.get(ext);
            let CellKind::StringExt(inline) = &cell.kind else {
                break;
            };
            total += inline.len();
            ext = cell.last_child;
        }
        total
    }

    /// `jsvIsEmptyString`.
    pub fn is_empty_string(&self, r: Ref) -> bool {
        if r.is_null() {
            return true;
        }
        let head = self.pool.get(r);
        matches!(&head.kind, CellKind::StringHead(inline) if inline.is_empty())
            && head.first_child.is_null()
    }

    /// `jsvAppendStringBuf`.
    pub fn append_bytes(&mut self, r: Ref, bytes: &[u8]) -> HeapResult<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let head = self.pool.get(r);
        let mut tail = head.last_child;
        let head_has_room = matches!(&head.kind, CellKind::StringHead(inline) if inline.len() < DATA_STRING_LEN)
            && tail.is_null();

        let mut written = 0usize;
        if head_has_room {
            let head = self.pool.get_mut(r);
            if let CellKind::StringHead(inline) = &mut head.kind {
                written = inline.push_bytes(bytes);
            }
        } else if tail.is_null() {
            // Head is full but has no extensions yet; nothing to write
            // inline, fall through to allocating the first extension.
        } else {
            let tail_cell = self.pool.get_mut(tail);
            if let CellKind::StringExt(inline) = &mut tail_cell.kind {
                written = inline.push_bytes(bytes);
            }
        }

        let mut remaining = &bytes[written..];
        while !remaining.is_empty() {
            let ext = self.pool.alloc(CellKind::StringExt(InlineBytes::empty()))?;
            // Extension cells are owned by the chain via a lock, not a
            // ref — mirrors the original's "refs is just extra
            // characters" repurposing on STRING_EXT cells.
            if tail.is_null() {
                self.pool.get_mut(r).first_child = ext;
            } else {
                self.pool.get_mut(tail).last_child = ext;
            }
            self.pool.get_mut(r).last_child = ext;
            let n = {
                let cell = self.pool.get_mut(ext);
                let CellKind::StringExt(inline) = &mut cell.kind else {
                    unreachable!()
                };
                inline.push_bytes(remaining)
            };
            remaining = &remaining[n..];
            tail = ext;
        }
        Ok(())
    }

    /// `jsvAppendCharacter`.
    pub fn append_char(&mut self, r: Ref, ch: u8) -> HeapResult<()> {
        self.append_bytes(r, &[ch])
    }

    /// Chains `overflow` onto a name cell's key via `last_child`, the one
    /// link field free on a name (its `first_child` already holds the
    /// value pointer). Unlike a string head's `last_child`, which caches
    /// the chain's tail for O(1) append, a name's `last_child` is simply
    /// the head of its key-overflow chain — key lengths are fixed at
    /// creation, so there is no repeated-append case to optimize for.
    pub(crate) fn spill_name_key(&mut self, name: Ref, overflow: &[u8]) -> HeapResult<()> {
        let mut tail = Ref::NULL;
        let mut remaining = overflow;
        while !remaining.is_empty() {
            let ext = self.pool.alloc(CellKind::StringExt(InlineBytes::empty()))?;
            if tail.is_null() {
                self.pool.get_mut(name).last_child = ext;
            } else {
                self.pool.get_mut(tail).last_child = ext;
            }
            let n = {
                let cell = self.pool.get_mut(ext);
                let CellKind::StringExt(inline) = &mut cell.kind else {
                    unreachable!()
                };
                inline.push_bytes(remaining)
            };
            remaining = &remaining[n..];
            tail = ext;
        }
        Ok(())
    }

    /// Reassembles a name cell's full key (inline bytes plus any
    /// overflow chain) into an owned buffer.
    pub(crate) fn name_key_bytes(&self, name: Ref) -> Vec<u8> {
        match &self.pool.get(name).kind {
            CellKind::NameInt(n) => n.to_string().into_bytes(),
            CellKind::ArrayBufferName(n) => n.to_string().into_bytes(),
            CellKind::NameString(inline) => {
                let mut out = inline.as_slice().to_vec();
                let mut ext = self.pool.get(name).last_child;
                while !ext.is_null() {
                    let cell = self.pool.get(ext);
                    let CellKind::StringExt(inline) = &cell.kind else {
                        break;
                    };
                    out.extend_from_slice(inline.as_slice());
                    ext = cell.last_child;
                }
                out
            }
            _ => Vec::new(),
        }
    }

    /// `jsvAppendPrintf`: append a host-formatted string (Rust's
    /// `format_args!` stands in for the original's C varargs printf).
    pub fn append_printf(&mut self, r: Ref, args: std::fmt::Arguments) -> HeapResult<()> {
        use std::fmt::Write;
        let mut buf = String::new();
        let _ = buf.write_fmt(args);
        self.append_bytes(r, buf.as_bytes())
    }

    /// `jsvAppendStringVar`: append up to `max_len` chars of `src` (from
    /// `start`) onto `dst`.
    pub fn append_from(&mut self, dst: Ref, src: Ref, start: usize, max_len: usize) -> HeapResult<()> {
        let mut it = StringIterator::new(self, src, start);
        let mut buf = Vec::new();
        let mut count = 0;
        while it.has_char(self) && count < max_len {
            buf.push(it.get_char(self));
            it.advance(self);
            count += 1;
        }
        it.free(self);
        self.append_bytes(dst, &buf)
    }

    /// `jsvGetString`: copy at most `dst.len()` bytes (reserving the last
    /// slot for a nul terminator when there's room), returning the number
    /// of string bytes written (not counting the terminator).
    pub fn get_string(&self, r: Ref, dst: &mut [u8]) -> usize {
        if dst.is_empty() {
            return 0;
        }
        let cap = dst.len() - 1;
        let mut it = StringIterator::new_const(self, r, 0);
        let mut n = 0;
        while n < cap && it.has_char(self) {
            dst[n] = it.get_char(self);
            it.advance_const(self);
            n += 1;
        }
        dst[n] = 0;
        n
    }

    /// `jsvSetString`: overwrite the chain's existing bytes in place.
    /// Never grows or shrinks the chain; `bytes.len()` must equal the
    /// current length.
    pub fn set_string(&mut self, r: Ref, bytes: &[u8]) {
        debug_assert_eq!(bytes.len(), self.string_length(r));
        let n = bytes.len().min(self.string_length(r));
        let mut it = StringIterator::new(self, r, 0);
        for &b in &bytes[..n] {
            it.set_char(self, b);
            it.advance(self);
        }
        it.free(self);
    }

    /// `jsvGetCharInString`.
    pub fn char_at(&self, r: Ref, i: usize) -> u8 {
        let mut it = StringIterator::new_const(self, r, i);
        let c = if it.has_char(self) { it.get_char(self) } else { 0 };
        it.free_const(self);
        c
    }

    /// `jsvStringTrimRight`: drop trailing spaces/tabs on every line.
    pub fn trim_right_multiline(&mut self, r: Ref) -> HeapResult<Ref> {
        let len = self.string_length(r);
        let mut raw = vec![0u8; len + 1];
        let n = self.get_string(r, &mut raw);
        raw.truncate(n);

        let mut out = Vec::with_capacity(n);
        for line in raw.split(|&b| b == b'\n') {
            let trimmed_len = line
                .iter()
                .rposition(|&b| b != b' ' && b != b'\t')
                .map_or(0, |p| p + 1);
            if !out.is_empty() {
                out.push(b'\n');
            }
            out.extend_from_slice(&line[..trimmed_len]);
        }
        self.new_string(&out)
    }

    /// `jsvIsStringNumericInt`.
    pub fn is_numeric_int(&self, r: Ref, allow_decimal_point: bool) -> bool {
        let len = self.string_length(r);
        if len == 0 {
            return false;
        }
        let mut it = StringIterator::new_const(self, r, 0);
        let mut i = 0;
        let mut seen_digit = false;
        let mut seen_dot = false;
        while it.has_char(self) {
            let c = it.get_char(self);
            match c {
                b'-' if i == 0 => {}
                b'0'..=b'9' => seen_digit = true,
                b'.' if allow_decimal_point && !seen_dot => seen_dot = true,
                _ => {
                    it.free_const(self);
                    return false;
                }
            }
            it.advance_const(self);
            i += 1;
        }
        it.free_const(self);
        seen_digit
    }

    /// `jsvIsStringNumericStrict`: requires `int_to_string(string_to_int(s))
    /// == s`.
    pub fn is_numeric_strict(&self, r: Ref) -> bool {
        if !self.is_numeric_int(r, false) {
            return false;
        }
        let len = self.string_length(r);
        let mut buf = vec![0u8; len + 1];
        let n = self.get_string(r, &mut buf);
        let Ok(s) = std::str::from_utf8(&buf[..n]) else {
            return false;
        };
        match s.parse::<i64>() {
            Ok(v) => v.to_string() == s,
            Err(_) => false,
        }
    }

    /// `jsvGetLinesInString`.
    pub fn lines(&self, r: Ref) -> usize {
        let mut it = StringIterator::new_const(self, r, 0);
        let mut lines = 1;
        while it.has_char(self) {
            if it.get_char(self) == b'\n' {
                lines += 1;
            }
            it.advance_const(self);
        }
        it.free_const(self);
        lines
    }

    /// `jsvGetCharsOnLine` (lines are 1-indexed).
    pub fn chars_on_line(&self, r: Ref, line: usize) -> usize {
        let mut it = StringIterator::new_const(self, r, 0);
        let mut cur_line = 1;
        let mut count = 0;
        while it.has_char(self) {
            let c = it.get_char(self);
            if cur_line == line {
                if c == b'\n' {
                    break;
                }
                count += 1;
            } else if c == b'\n' {
                cur_line += 1;
            }
            it.advance_const(self);
        }
        it.free_const(self);
        count
    }

    /// `jsvGetLineAndCol` (both 1-indexed).
    pub fn line_col_of(&self, r: Ref, char_idx: usize) -> (usize, usize) {
        let mut it = StringIterator::new_const(self, r, 0);
        let mut line = 1;
        let mut col = 1;
        for _ in 0..char_idx {
            if !it.has_char(self) {
                break;
            }
            if it.get_char(self) == b'\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
            it.advance_const(self);
        }
        it.free_const(self);
        (line, col)
    }

    /// `jsvGetIndexFromLineAndCol`.
    pub fn index_of(&self, r: Ref, line: usize, col: usize) -> usize {
        let mut it = StringIterator::new_const(self, r, 0);
        let mut cur_line = 1;
        let mut cur_col = 1;
        let mut idx = 0;
        while it.has_char(self) {
            if cur_line == line && cur_col == col {
                break;
            }
            if it.get_char(self) == b'\n' {
                cur_line += 1;
                cur_col = 1;
            } else {
                cur_col += 1;
            }
            it.advance_const(self);
            idx += 1;
        }
        it.free_const(self);
        idx
    }

    /// `jsvCompareString`: compares raw bytes from `start_a`/`start_b`
    /// onward. `equal_at_end_of_string` controls whether reaching the end
    /// of one and not the other counts as a difference or an early-equal
    /// stop (`jsvCompareString`'s namesake flag).
    pub fn compare_string(
        &self,
        a: Ref,
        b: Ref,
        start_a: usize,
        start_b: usize,
        equal_at_end_of_string: bool,
    ) -> i32 {
        let mut ia = StringIterator::new_const(self, a, start_a);
        let mut ib = StringIterator::new_const(self, b, start_b);
        let result = loop {
            let ca = ia.has_char(self);
            let cb = ib.has_char(self);
            match (ca, cb) {
                (false, false) => break 0,
                (false, true) => {
                    break if equal_at_end_of_string { 0 } else { -1 };
                }
                (true, false) => {
                    break if equal_at_end_of_string { 0 } else { 1 };
                }
                (true, true) => {
                    let (xa, xb) = (ia.get_char(self), ib.get_char(self));
                    if xa != xb {
                        break (xa as i32) - (xb as i32);
                    }
                }
            }
            ia.advance_const(self);
            ib.advance_const(self);
        };
        ia.free_const(self);
        ib.free_const(self);
        result.signum()
    }
}

/// `JsvStringIterator`: walks a string chain one byte at a time.
///
/// Holds a lock on its current cell so structural mutation elsewhere (an
/// append, a GC sweep) can't free the cell out from under an in-progress
/// walk. `free`/`free_const` must be called when done to release it.
pub struct StringIterator {
    /// Currently locked cell (head or extension), or `Ref::NULL` at EOF.
    cell: Ref,
    /// Index of the next unread char within `cell`'s inline bytes.
    char_idx: usize,
    /// Total chars held by `cell`.
    chars_in_cell: usize,
    /// Global index of `cell`'s first char within the whole string.
    var_index: usize,
}

impl StringIterator {
    /// `jsvStringIteratorNew`: positions at `start_idx`, locking the cell
    /// that contains it.
    pub fn new(heap: &mut Heap, str_ref: Ref, start_idx: usize) -> Self {
        let locked = heap.lock(str_ref).unwrap_or(str_ref);
        Self::seek(heap, locked, start_idx)
    }

    /// Same as `new`, but for read-only walks where the caller doesn't
    /// need (or want) to mutate through `&Heap`; still takes and releases
    /// its own lock via interior calls to `&self` lock bookkeeping is not
    /// possible on a shared `&Heap`, so const walks simply borrow without
    /// locking — safe because the caller already holds `str_ref` locked
    /// for the duration of the walk.
    pub fn new_const(heap: &Heap, str_ref: Ref, start_idx: usize) -> Self {
        Self::seek_const(heap, str_ref, start_idx)
    }

    /// `heap.lock(head)` has already been taken by the caller, pinning
    /// `head` for the duration of the walk. If the walk lands back on
    /// `head` itself, that pin becomes the iterator's lock; otherwise we
    /// take a fresh lock on the landing cell and release the pin on
    /// `head` (or release it outright if the string is empty).
    fn seek(heap: &mut Heap, head: Ref, start_idx: usize) -> Self {
        let mut it = Self::seek_const(heap, head, start_idx);
        if it.cell != head {
            if !it.cell.is_null() {
                it.cell = heap.lock(it.cell).unwrap_or(it.cell);
            }
            heap.unlock(head);
        }
        it
    }

    fn seek_const(heap: &Heap, head: Ref, start_idx: usize) -> Self {
        if head.is_null() {
            return Self {
                cell: Ref::NULL,
                char_idx: 0,
                chars_in_cell: 0,
                var_index: 0,
            };
        }
        let head_cell = heap.pool.get(head);
        let CellKind::StringHead(inline) = &head_cell.kind else {
            return Self {
                cell: Ref::NULL,
                char_idx: 0,
                chars_in_cell: 0,
                var_index: 0,
            };
        };
        let mut cell = head;
        let mut chars_in_cell = inline.len();
        let mut var_index = 0usize;
        let mut next_ext = head_cell.first_child;

        while start_idx >= var_index + chars_in_cell && !next_ext.is_null() {
            var_index += chars_in_cell;
            cell = next_ext;
            let ext_cell = heap.pool.get(cell);
            let CellKind::StringExt(inline) = &ext_cell.kind else {
                break;
            };
            chars_in_cell = inline.len();
            next_ext = ext_cell.last_child;
        }

        Self {
            cell,
            char_idx: start_idx.saturating_sub(var_index).min(chars_in_cell),
            chars_in_cell,
            var_index,
        }
    }

    #[inline]
    pub fn has_char(&self, _heap: &Heap) -> bool {
        !self.cell.is_null() && self.char_idx < self.chars_in_cell
    }

    pub fn get_char(&self, heap: &Heap) -> u8 {
        if self.cell.is_null() {
            return 0;
        }
        let cell = heap.pool.get(self.cell);
        match &cell.kind {
            CellKind::StringHead(inline) | CellKind::NameString(inline) => {
                inline.as_slice().get(self.char_idx).copied().unwrap_or(0)
            }
            CellKind::StringExt(inline) => inline.as_slice().get(self.char_idx).copied().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn set_char(&mut self, heap: &mut Heap, value: u8) {
        if self.cell.is_null() {
            return;
        }
        let cell = heap.pool.get_mut(self.cell);
        match &mut cell.kind {
            CellKind::StringHead(inline) | CellKind::NameString(inline) => {
                if self.char_idx < inline.len() {
                    inline.bytes_mut()[self.char_idx] = value;
                }
            }
            CellKind::StringExt(inline) => {
                if self.char_idx < inline.len() {
                    inline.bytes_mut()[self.char_idx] = value;
                }
            }
            _ => {}
        }
    }

    /// Advance, relocking as we hop to the next extension cell. Use this
    /// form when the iterator was built with `new` (it owns a real lock).
    pub fn advance(&mut self, heap: &mut Heap) {
        self.char_idx += 1;
        if self.char_idx >= self.chars_in_cell && !self.cell.is_null() {
            let cell = heap.pool.get(self.cell);
            let next = match &cell.kind {
                CellKind::StringHead(_) => cell.first_child,
                CellKind::StringExt(_) => cell.last_child,
                _ => Ref::NULL,
            };
            self.var_index += self.chars_in_cell;
            heap.unlock(self.cell);
            if next.is_null() {
                self.cell = Ref::NULL;
                self.chars_in_cell = 0;
            } else {
                self.cell = heap.lock(next).unwrap_or(next);
                self.chars_in_cell = match &heap.pool.get(self.cell).kind {
                    CellKind::StringExt(inline) => inline.len(),
                    _ => 0,
                };
            }
            self.char_idx = 0;
        }
    }

    /// Advance without touching lock counts — used internally by
    /// `new_const` walks, which never took a lock in the first place.
    fn advance_const(&mut self, heap: &Heap) {
        self.char_idx += 1;
        if self.char_idx >= self.chars_in_cell && !self.cell.is_null() {
            let cell = heap.pool.get(self.cell);
            let next = match &cell.kind {
                CellKind::StringHead(_) => cell.first_child,
                CellKind::StringExt(_) => cell.last_child,
                _ => Ref::NULL,
            };
            self.var_index += self.chars_in_cell;
            if next.is_null() {
                self.cell = Ref::NULL;
                self.chars_in_cell = 0;
            } else {
                self.cell = next;
                self.chars_in_cell = match &heap.pool.get(next).kind {
                    CellKind::StringExt(inline) => inline.len(),
                    _ => 0,
                };
            }
            self.char_idx = 0;
        }
    }

    /// `jsvStringIteratorGotoEnd`: positions past the last char of the
    /// final cell so a subsequent append lands in the right place.
    pub fn goto_end(&mut self, heap: &mut Heap) {
        while self.has_char(heap) {
            self.advance(heap);
        }
    }

    /// Release the lock this iterator holds (no-op at EOF).
    pub fn free(self, heap: &mut Heap) {
        heap.unlock(self.cell);
    }

    pub(crate) fn free_const(self, _heap: &Heap) {
        // `new_const` walks never took a counted lock.
    }

    /// `jsvStringIteratorClone`: O(1), re-locks the cursor cell.
    pub fn clone_locked(&self, heap: &mut Heap) -> Self {
        let cell = if self.cell.is_null() {
            Ref::NULL
        } else {
            heap.lock(self.cell).unwrap_or(self.cell)
        };
        Self {
            cell,
            char_idx: self.char_idx,
            chars_in_cell: self.chars_in_cell,
            var_index: self.var_index,
        }
    }

    pub fn global_index(&self) -> usize {
        self.var_index + self.char_idx
    }
}

// DATA_STRING_EXT_LEN is re-exported for callers sizing their own buffers.
pub const EXT_CAPACITY: usize = DATA_STRING_EXT_LEN;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::HeapConfig;

    fn heap() -> Heap {
        Heap::init(HeapConfig { capacity: 256 })
    }

    fn read_all(h: &Heap, r: Ref) -> Vec<u8> {
        let len = h.string_length(r);
        let mut buf = vec![0u8; len + 1];
        let n = h.get_string(r, &mut buf);
        buf.truncate(n);
        buf
    }

    #[test]
    fn test_short_string_stays_inline() {
        let mut h = heap();
        let s = h.new_string(b"hi").unwrap();
        assert_eq!(h.string_length(s), 2);
        assert_eq!(read_all(&h, s), b"hi");
        h.unlock(s);
    }

    #[test]
    fn test_long_string_spills_into_extension_chain() {
        let mut h = heap();
        let long = b"this string is much longer than the inline capacity of a single head cell";
        let s = h.new_string(long).unwrap();
        assert_eq!(h.string_length(s), long.len());
        assert_eq!(read_all(&h, s), long);
        h.unlock(s);
    }

    #[test]
    fn test_append_bytes_across_many_calls() {
        let mut h = heap();
        let s = h.new_string(b"").unwrap();
        for _ in 0..20 {
            h.append_bytes(s, b"ab").unwrap();
        }
        assert_eq!(h.string_length(s), 40);
        assert_eq!(read_all(&h, s), "ab".repeat(20).as_bytes());
        h.unlock(s);
    }

    #[test]
    fn test_char_at_reads_across_chain_boundary() {
        let mut h = heap();
        let long = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let s = h.new_string(long).unwrap();
        for (i, &expected) in long.iter().enumerate() {
            assert_eq!(h.char_at(s, i), expected);
        }
        h.unlock(s);
    }

    #[test]
    fn test_compare_string_lexical_order() {
        let mut h = heap();
        let a = h.new_string(b"abc").unwrap();
        let b = h.new_string(b"abd").unwrap();
        assert_eq!(h.compare_string(a, b, 0, 0, true), -1);
        assert_eq!(h.compare_string(a, a, 0, 0, true), 0);
        assert_eq!(h.compare_string(b, a, 0, 0, true), 1);
        h.unlock(a);
        h.unlock(b);
    }

    #[test]
    fn test_is_empty_string() {
        let mut h = heap();
        let empty = h.new_string(b"").unwrap();
        let nonempty = h.new_string(b"x").unwrap();
        assert!(h.is_empty_string(empty));
        assert!(!h.is_empty_string(nonempty));
        h.unlock(empty);
        h.unlock(nonempty);
    }

    #[test]
    fn test_set_string_overwrites_in_place() {
        let mut h = heap();
        let s = h.new_string(b"xxxx").unwrap();
        h.set_string(s, b"yyyy");
        assert_eq!(read_all(&h, s), b"yyyy");
        h.unlock(s);
    }

    #[test]
    fn test_lines_and_chars_on_line() {
        let mut h = heap();
        let s = h.new_string(b"ab\ncde\nf").unwrap();
        assert_eq!(h.lines(s), 3);
        assert_eq!(h.chars_on_line(s, 1), 2);
        assert_eq!(h.chars_on_line(s, 2), 3);
        assert_eq!(h.chars_on_line(s, 3), 1);
        h.unlock(s);
    }
}
