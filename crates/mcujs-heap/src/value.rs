//! Component B — the variable model: constructors, type predicates, and
//! coercions/comparisons that don't need a whole module of their own.

use crate::cell::CellKind;
use crate::error::HeapResult;
use crate::heap::Heap;
use crate::ref_::Ref;

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if f == f.trunc() && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

impl Heap {
    /// `jsvNewFromInteger`. Returns a locked handle.
    pub fn new_int(&mut self, value: i32) -> HeapResult<Ref> {
        self.pool.alloc(CellKind::Int(value))
    }

    /// `jsvNewFromFloat`.
    pub fn new_float(&mut self, value: f64) -> HeapResult<Ref> {
        self.pool.alloc(CellKind::Float(value))
    }

    /// `jsvNewFromBool`.
    pub fn new_bool(&mut self, value: bool) -> HeapResult<Ref> {
        self.pool.alloc(CellKind::Bool(value))
    }

    /// `jsvNewNull`.
    pub fn new_null(&mut self) -> HeapResult<Ref> {
        self.pool.alloc(CellKind::Null)
    }

    /// `jsvNewWithFlags(JSV_UNDEFINED)` — there is no cell for `undefined`;
    /// it is represented by `Ref::NULL` throughout, matching
    /// `jsvIsUndefined(v) == (v == 0)` in the original.
    pub fn new_undefined(&self) -> Ref {
        Ref::NULL
    }

    /// `jsvNewFromPin`.
    pub fn new_from_pin(&mut self, pin: u16) -> HeapResult<Ref> {
        self.pool.alloc(CellKind::Pin(pin))
    }

    /// `jsvNewWithFlags(JSV_ARRAY)`.
    pub fn new_array(&mut self) -> HeapResult<Ref> {
        self.pool.alloc(CellKind::Array)
    }

    /// `jsvNewWithFlags(JSV_OBJECT)`.
    pub fn new_object(&mut self) -> HeapResult<Ref> {
        self.pool.alloc(CellKind::Object)
    }

    /// A new function cell; `native` marks it as wrapping a host callback
    /// rather than interpreted bytecode (the bytecode/AST side is out of
    /// scope here — see §1).
    pub fn new_function(&mut self, native: bool) -> HeapResult<Ref> {
        let r = self.pool.alloc(CellKind::Function)?;
        self.pool.get_mut(r).native = native;
        Ok(r)
    }

    /// `jsvMakeIntoVariableName`. Turns `var` into a name cell that points
    /// at `value_or_zero` (which may be `Ref::NULL`). No locking is
    /// performed — `var` is consumed in place exactly as the original does.
    /// Keys longer than `DATA_STRING_LEN` spill into an extension chain
    /// anchored at `last_child`, the one link field a name cell has free
    /// (see `children.rs`'s key helpers).
    pub fn make_into_name(&mut self, var: Ref, value_or_zero: Ref, key: &[u8]) -> HeapResult<Ref> {
        debug_assert!(!var.is_null());
        if !value_or_zero.is_null() {
            self.reff(value_or_zero);
        }
        let as_int = std::str::from_utf8(key).ok().and_then(|s| s.parse::<i32>().ok());
        if let Some(n) = as_int {
            let cell = self.pool.get_mut(var);
            cell.kind = CellKind::NameInt(n);
            cell.first_child = value_or_zero;
            return Ok(var);
        }
        let inline_len = key.len().min(crate::cell::DATA_STRING_LEN);
        let cell = self.pool.get_mut(var);
        cell.kind = CellKind::NameString(crate::cell::InlineBytes::from_slice(&key[..inline_len]));
        cell.first_child = value_or_zero;
        if key.len() > inline_len {
            self.spill_name_key(var, &key[inline_len..])?;
        }
        Ok(var)
    }

    // ---- predicates -----------------------------------------------------

    pub fn is_undefined(&self, r: Ref) -> bool {
        r.is_null()
    }

    pub fn is_null(&self, r: Ref) -> bool {
        !r.is_null() && matches!(self.pool.get(r).kind, CellKind::Null)
    }

    pub fn is_int(&self, r: Ref) -> bool {
        !r.is_null()
            && matches!(self.pool.get(r).kind, CellKind::Int(_) | CellKind::Pin(_))
    }

    pub fn is_float(&self, r: Ref) -> bool {
        !r.is_null() && matches!(self.pool.get(r).kind, CellKind::Float(_))
    }

    pub fn is_bool(&self, r: Ref) -> bool {
        !r.is_null() && matches!(self.pool.get(r).kind, CellKind::Bool(_))
    }

    pub fn is_numeric(&self, r: Ref) -> bool {
        !r.is_null() && self.pool.get(r).kind.is_numeric()
    }

    pub fn is_string(&self, r: Ref) -> bool {
        !r.is_null() && self.pool.get(r).kind.is_string_head()
    }

    pub fn is_array(&self, r: Ref) -> bool {
        !r.is_null() && matches!(self.pool.get(r).kind, CellKind::Array)
    }

    pub fn is_object(&self, r: Ref) -> bool {
        !r.is_null() && matches!(self.pool.get(r).kind, CellKind::Object | CellKind::Root)
    }

    pub fn is_function(&self, r: Ref) -> bool {
        !r.is_null() && matches!(self.pool.get(r).kind, CellKind::Function)
    }

    pub fn is_array_buffer(&self, r: Ref) -> bool {
        !r.is_null() && matches!(self.pool.get(r).kind, CellKind::ArrayBuffer(_))
    }

    pub fn is_name(&self, r: Ref) -> bool {
        !r.is_null() && self.pool.get(r).kind.is_name()
    }

    pub fn is_name_internal(&self, r: Ref) -> bool {
        if r.is_null() {
            return false;
        }
        if let CellKind::NameString(bytes) = &self.pool.get(r).kind {
            bytes.as_slice().first() == Some(&0xFFu8)
        } else {
            false
        }
    }

    pub fn is_iterable(&self, r: Ref) -> bool {
        !r.is_null() && self.pool.get(r).kind.is_iterable()
    }

    pub fn is_basic(&self, r: Ref) -> bool {
        self.is_numeric(r) || self.is_string(r)
    }

    // ---- name resolution --------------------------------------------

    /// `jsvSkipName`: if `r` is a name, lock and return the value it
    /// points to (which may itself require no further skipping — names
    /// never chain to other names). Otherwise re-lock and return `r`
    /// itself. Always returns a locked handle (or `Ref::NULL`).
    pub fn skip_name(&mut self, r: Ref) -> Ref {
        if r.is_null() {
            return Ref::NULL;
        }
        if self.pool.get(r).kind.is_name() {
            let value = self.pool.get(r).first_child;
            if value.is_null() {
                Ref::NULL
            } else {
                self.lock(value).unwrap_or(value)
            }
        } else {
            self.lock(r).unwrap_or(r)
        }
    }

    /// `jsvSkipNameAndUnLock`.
    pub fn skip_name_and_unlock(&mut self, r: Ref) -> Ref {
        let v = self.skip_name(r);
        self.unlock(r);
        v
    }

    // ---- coercions --------------------------------------------------

    pub fn get_integer(&self, r: Ref) -> i32 {
        if r.is_null() {
            return 0;
        }
        match &self.pool.get(r).kind {
            CellKind::Int(n) => *n,
            CellKind::Pin(p) => *p as i32,
            CellKind::Bool(b) => *b as i32,
            CellKind::Float(f) => *f as i32,
            CellKind::Null | CellKind::Array | CellKind::Object | CellKind::Function => 0,
            _ => 0,
        }
    }

    pub fn get_float(&self, r: Ref) -> f64 {
        if r.is_null() {
            return f64::NAN;
        }
        match &self.pool.get(r).kind {
            CellKind::Float(f) => *f,
            CellKind::Int(n) => *n as f64,
            CellKind::Pin(p) => *p as f64,
            CellKind::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellKind::Null => 0.0,
            _ => f64::NAN,
        }
    }

    pub fn get_bool(&self, r: Ref) -> bool {
        if r.is_null() {
            return false;
        }
        match &self.pool.get(r).kind {
            CellKind::Bool(b) => *b,
            CellKind::Int(n) => *n != 0,
            CellKind::Float(f) => *f != 0.0 && !f.is_nan(),
            CellKind::Null => false,
            CellKind::StringHead(_) => self.string_length(r) != 0,
            CellKind::Array | CellKind::Object | CellKind::Function | CellKind::ArrayBuffer(_) => {
                true
            }
            _ => false,
        }
    }

    /// `jsvGetConstString`: a handful of singleton values print as fixed
    /// strings without needing a real string cell.
    pub fn get_const_string(&self, r: Ref) -> Option<&'static str> {
        if r.is_null() {
            return Some("undefined");
        }
        match &self.pool.get(r).kind {
            CellKind::Null => Some("null"),
            CellKind::Bool(true) => Some("true"),
            CellKind::Bool(false) => Some("false"),
            _ => None,
        }
    }

    /// `jsvAsString`: a string cell representing `r`'s value. Strings are
    /// shared (returns another lock on the same chain), everything else is
    /// formatted fresh. `unlock_source` releases the caller's handle on
    /// `r` once the conversion is taken, for call sites that don't need it
    /// afterwards.
    pub fn as_string(&mut self, r: Ref, unlock_source: bool) -> HeapResult<Ref> {
        let result = if self.is_string(r) {
            self.lock(r)?
        } else if let Some(s) = self.get_const_string(r) {
            self.new_string(s.as_bytes())?
        } else if self.is_int(r) || matches!(self.pool.get(r).kind, CellKind::Pin(_)) {
            self.new_string(self.get_integer(r).to_string().as_bytes())?
        } else if self.is_float(r) {
            self.new_string(format_float(self.get_float(r)).as_bytes())?
        } else {
            self.new_string(b"[object Object]")?
        };
        if unlock_source {
            self.unlock(r);
        }
        Ok(result)
    }

    /// `jsvAsNumber`-ish helper used by `maths.rs`: numeric value as `f64`,
    /// promoting strings that parse cleanly.
    pub fn as_number(&self, r: Ref) -> f64 {
        if r.is_null() {
            return f64::NAN;
        }
        if self.is_string(r) {
            let mut buf = [0u8; 64];
            let n = self.get_string(r, &mut buf);
            std::str::from_utf8(&buf[..n])
                .ok()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .unwrap_or(f64::NAN)
        } else {
            self.get_float(r)
        }
    }

    // ---- comparisons --------------------------------------------------

    /// `jsvIsBasicVarEqual`: value equality for numbers/strings, identity
    /// for anything else (ignores what a name points to).
    pub fn basic_equal(&self, a: Ref, b: Ref) -> bool {
        if a == b {
            return true;
        }
        if a.is_null() || b.is_null() {
            return false;
        }
        let (ka, kb) = (&self.pool.get(a).kind, &self.pool.get(b).kind);
        match (ka, kb) {
            (CellKind::Int(x), CellKind::Int(y)) => x == y,
            (CellKind::Float(x), CellKind::Float(y)) => x == y,
            (CellKind::Bool(x), CellKind::Bool(y)) => x == y,
            (CellKind::Null, CellKind::Null) => true,
            _ if ka.is_numeric() && kb.is_numeric() => self.get_float(a) == self.get_float(b),
            _ if self.is_string(a) && self.is_string(b) => self.compare_string(a, b, 0, 0, true) == 0,
            _ => false,
        }
    }

    /// `jsvIsEqual`: like `basic_equal`, but composite values compare by
    /// identity (same ref).
    pub fn deep_equal(&self, a: Ref, b: Ref) -> bool {
        if self.is_basic(a) && self.is_basic(b) {
            self.basic_equal(a, b)
        } else {
            a == b
        }
    }

    /// `jsvCompareInteger`.
    pub fn compare_integer(&self, a: Ref, b: Ref) -> i32 {
        let (x, y) = (self.get_integer(a), self.get_integer(b));
        match x.cmp(&y) {
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::HeapConfig;

    fn heap() -> Heap {
        Heap::init(HeapConfig { capacity: 64 })
    }

    #[test]
    fn test_undefined_is_null_ref() {
        let h = heap();
        assert!(h.is_undefined(Ref::NULL));
        assert_eq!(h.get_const_string(Ref::NULL), Some("undefined"));
    }

    #[test]
    fn test_int_predicates() {
        let mut h = heap();
        let n = h.new_int(42).unwrap();
        assert!(h.is_int(n));
        assert!(h.is_numeric(n));
        assert!(!h.is_string(n));
        assert_eq!(h.get_integer(n), 42);
        h.unlock(n);
    }

    #[test]
    fn test_as_string_formats_numbers() {
        let mut h = heap();
        let n = h.new_int(7).unwrap();
        let s = h.as_string(n, false).unwrap();
        let mut buf = [0u8; 8];
        let written = h.get_string(s, &mut buf);
        assert_eq!(&buf[..written], b"7");
        h.unlock(n);
        h.unlock(s);
    }

    #[test]
    fn test_as_string_shares_existing_string() {
        let mut h = heap();
        let s = h.new_string(b"hi").unwrap();
        let s2 = h.as_string(s, false).unwrap();
        assert_eq!(s, s2);
        h.unlock(s);
        h.unlock(s2);
    }

    #[test]
    fn test_basic_equal_numeric_cross_kind() {
        let mut h = heap();
        let i = h.new_int(3).unwrap();
        let f = h.new_float(3.0).unwrap();
        assert!(h.basic_equal(i, f));
        h.unlock(i);
        h.unlock(f);
    }

    #[test]
    fn test_deep_equal_composite_is_identity_only() {
        let mut h = heap();
        let a = h.new_object().unwrap();
        let b = h.new_object().unwrap();
        assert!(!h.deep_equal(a, b));
        assert!(h.deep_equal(a, a));
        h.unlock(a);
        h.unlock(b);
    }

    #[test]
    fn test_skip_name_resolves_to_value() {
        let mut h = heap();
        let obj = h.new_object().unwrap();
        let val = h.new_int(9).unwrap();
        let name = h.set_named_child(obj, val, b"x").unwrap();
        let skipped = h.skip_name(name);
        assert_eq!(skipped, val);
        h.unlock(skipped);
        h.unlock(name);
        h.unlock(val);
        h.unlock(obj);
    }
}
