//! Component F — typed views over a string-chain backing store.
//!
//! An `ARRAYBUFFER` cell doesn't hold any bytes itself; `first_child`
//! references the string head that does, and the cell just carries the
//! offset/length/element-type triple needed to interpret it (§4.F).

use crate::cell::{ArrayBufferView, CellKind, ViewType};
use crate::error::{HeapError, HeapResult};
use crate::heap::Heap;
use crate::ref_::Ref;
use crate::string_chain::StringIterator;

/// Decode up to 8 little-endian bytes per `view`'s sign/width rules.
pub(crate) fn decode_int(view: ViewType, bytes: &[u8; 8]) -> i64 {
    match view {
        ViewType::U8 => bytes[0] as i64,
        ViewType::I8 => bytes[0] as i8 as i64,
        ViewType::U16 => u16::from_le_bytes(bytes[..2].try_into().unwrap()) as i64,
        ViewType::I16 => i16::from_le_bytes(bytes[..2].try_into().unwrap()) as i64,
        ViewType::U32 => u32::from_le_bytes(bytes[..4].try_into().unwrap()) as i64,
        ViewType::I32 => i32::from_le_bytes(bytes[..4].try_into().unwrap()) as i64,
        ViewType::F32 | ViewType::F64 => unreachable!("decode_int on a float view"),
    }
}

pub(crate) fn decode_float(view: ViewType, bytes: &[u8; 8]) -> f64 {
    match view {
        ViewType::F32 => f32::from_le_bytes(bytes[..4].try_into().unwrap()) as f64,
        ViewType::F64 => f64::from_le_bytes(bytes[..8].try_into().unwrap()),
        _ => unreachable!("decode_float on an int view"),
    }
}

pub(crate) fn encode_int(view: ViewType, n: i32) -> [u8; 8] {
    let mut b = [0u8; 8];
    match view {
        ViewType::U8 => b[0] = n as u8,
        ViewType::I8 => b[0] = n as i8 as u8,
        ViewType::U16 => b[..2].copy_from_slice(&(n as u16).to_le_bytes()),
        ViewType::I16 => b[..2].copy_from_slice(&(n as i16).to_le_bytes()),
        ViewType::U32 => b[..4].copy_from_slice(&(n as u32).to_le_bytes()),
        ViewType::I32 => b[..4].copy_from_slice(&n.to_le_bytes()),
        ViewType::F32 | ViewType::F64 => unreachable!("encode_int on a float view"),
    }
    b
}

pub(crate) fn encode_float(view: ViewType, f: f64) -> [u8; 8] {
    let mut b = [0u8; 8];
    match view {
        ViewType::F32 => b[..4].copy_from_slice(&(f as f32).to_le_bytes()),
        ViewType::F64 => b[..8].copy_from_slice(&f.to_le_bytes()),
        _ => unreachable!("encode_float on an int view"),
    }
    b
}

impl Heap {
    /// Creates a typed view over `backing` (a string chain). `backing` is
    /// reffed, not consumed.
    pub fn new_array_buffer(
        &mut self,
        backing: Ref,
        byte_offset: u16,
        length: u16,
        view: ViewType,
    ) -> HeapResult<Ref> {
        debug_assert!(self.is_string(backing));
        let r = self.pool.alloc(CellKind::ArrayBuffer(ArrayBufferView {
            byte_offset,
            length,
            view,
        }))?;
        self.reff(backing);
        self.pool.get_mut(r).first_child = backing;
        Ok(r)
    }

    pub(crate) fn array_buffer_view(&self, ab: Ref) -> ArrayBufferView {
        match self.pool.get(ab).kind {
            CellKind::ArrayBuffer(v) => v,
            _ => {
                debug_assert!(false, "array-buffer op on a non-array-buffer cell");
                ArrayBufferView {
                    byte_offset: 0,
                    length: 0,
                    view: ViewType::U8,
                }
            }
        }
    }

    /// `(backing string head, byte offset of element 0, element count,
    /// element type)` — what `iter.rs`'s array-buffer iterator needs to
    /// walk the view without going through the per-call `array_buffer_*`
    /// API.
    pub(crate) fn array_buffer_parts(&self, ab: Ref) -> (Ref, usize, usize, ViewType) {
        let view = self.array_buffer_view(ab);
        let backing = self.pool.get(ab).first_child;
        (backing, view.byte_offset as usize, view.length as usize, view.view)
    }

    fn read_byte(&self, backing: Ref, pos: usize) -> u8 {
        let mut it = StringIterator::new_const(self, backing, pos);
        let b = if it.has_char(self) { it.get_char(self) } else { 0 };
        it.free_const(self);
        b
    }

    fn write_byte(&mut self, backing: Ref, pos: usize, value: u8) {
        let mut it = StringIterator::new(self, backing, pos);
        it.set_char(self, value);
        it.free(self);
    }

    fn byte_range(&self, ab: Ref, index: usize) -> Option<(Ref, usize, usize)> {
        let view = self.array_buffer_view(ab);
        if index >= view.length as usize {
            return None;
        }
        let backing = self.pool.get(ab).first_child;
        let start = view.byte_offset as usize + index * view.view.size_of();
        Some((backing, start, view.view.size_of()))
    }

    /// `jsvArrayBufferGet`: decode element `index` into a new numeric
    /// cell. Out-of-range returns `Ref::NULL` (undefined).
    pub fn array_buffer_get(&mut self, ab: Ref, index: usize) -> HeapResult<Ref> {
        let Some((backing, start, size)) = self.byte_range(ab, index) else {
            return Ok(Ref::NULL);
        };
        let mut bytes = [0u8; 8];
        for i in 0..size {
            bytes[i] = self.read_byte(backing, start + i);
        }
        let view = self.array_buffer_view(ab).view;
        if view.is_float() {
            self.new_float(decode_float(view, &bytes))
        } else {
            let n = decode_int(view, &bytes);
            // A Uint32 reading above i32::MAX can't round-trip through
            // CellKind::Int; fall back to a float cell, same as the
            // original representing all numbers as doubles above that
            // range.
            match i32::try_from(n) {
                Ok(n) => self.new_int(n),
                Err(_) => self.new_float(n as f64),
            }
        }
    }

    /// `jsvArrayBufferSet`: coerce `value` and write it back at `index`.
    /// Out of range is reported as `IndexOutOfRange` (typed views, unlike
    /// arrays, cannot grow on write — §7).
    pub fn array_buffer_set(&mut self, ab: Ref, index: usize, value: Ref) -> HeapResult<()> {
        let Some((backing, start, size)) = self.byte_range(ab, index) else {
            return Err(HeapError::IndexOutOfRange);
        };
        let view = self.array_buffer_view(ab).view;
        let bytes = if view.is_float() {
            encode_float(view, self.get_float(value))
        } else {
            encode_int(view, self.get_integer(value))
        };
        for i in 0..size {
            self.write_byte(backing, start + i, bytes[i]);
        }
        Ok(())
    }

    /// Element count of the view (distinct from the backing string's byte
    /// length).
    pub fn array_buffer_length(&self, ab: Ref) -> usize {
        self.array_buffer_view(ab).length as usize
    }
}
