//! A `SmallLine` describes one line-sized granule of small-object
//! memory: nothing but a count of the live objects in the granule.
//! Descriptors locate themselves from their position in the owning
//! chunk's line array, so they carry no back pointer.
#[cfg(any(
    all(test, feature = "check_contracts_in_tests"),
    feature = "check_contracts"
))]
use contracts::*;
#[cfg(not(any(
    all(test, feature = "check_contracts_in_tests"),
    feature = "check_contracts"
)))]
use disabled_contracts::*;

use std::ffi::c_void;
use std::mem;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;

use crate::chunk::Chunk;
use crate::lock::LockToken;
use crate::sizes::SMALL_LINE_SIZE;

/// Descriptor for one `SMALL_LINE_SIZE` granule.
///
/// The refcount is atomic only so descriptors can be touched through
/// shared references; all mutation happens under the caller's heap
/// lock, so `Relaxed` suffices.
#[derive(Debug)]
#[repr(C)]
pub struct SmallLine {
    ref_count: AtomicU8,
}

impl SmallLine {
    #[inline]
    pub fn ref_count(&self) -> u8 {
        self.ref_count.load(Ordering::Relaxed)
    }

    /// Counts one more live occupant in this line.
    #[ensures(self.ref_count() > 0)]
    pub fn retain(&self, _lock: &LockToken<'_>) {
        let old = self.ref_count.fetch_add(1, Ordering::Relaxed);

        debug_assert!(old < u8::MAX, "line refcount overflow");
    }

    /// Drops one occupant; returns true when the line became empty.
    #[requires(self.ref_count() > 0)]
    pub fn release(&self, _lock: &LockToken<'_>) -> bool {
        let old = self.ref_count.fetch_sub(1, Ordering::Relaxed);

        debug_assert!(old > 0, "line refcount underflow");
        old == 1
    }

    /// Address of the granule this descriptor covers, derived from the
    /// descriptor's index in its chunk's line array.
    pub fn begin(&self) -> *mut u8 {
        let chunk = unsafe { &*Chunk::get(self as *const SmallLine as *const c_void).as_ptr() };
        let line_number = (self as *const SmallLine as usize - chunk.lines().as_ptr() as usize)
            / mem::size_of::<SmallLine>();

        chunk.object(line_number * SMALL_LINE_SIZE) as *mut u8
    }

    pub fn end(&self) -> *mut u8 {
        (self.begin() as usize + SMALL_LINE_SIZE) as *mut u8
    }
}
