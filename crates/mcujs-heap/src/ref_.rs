//! `Ref`: a small integer identifying a cell in the pool.
//!
//! Refs are indices, not pointers, so the pool can be relocated (grown) or
//! persisted to flash without invalidating any handle a host holds — see
//! "Ref = small integer, not pointer" in `DESIGN.md`.

use std::fmt;

/// An index into the cell pool. `Ref::NULL` (zero) never names a live cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Ref(u32);

impl Ref {
    pub const NULL: Ref = Ref(0);

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        Ref(index as u32)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Ref(null)")
        } else {
            write!(f, "Ref({})", self.0)
        }
    }
}
