//! A `SmallPage` describes a run of `SmallLine`s.  Multi-page runs are
//! owned by their first descriptor; later descriptors store a "slide",
//! the distance back to the owner, so any offset in the run resolves to
//! the same descriptor.
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
use crate::sizes::SMALL_PAGE_SIZE;

/// Descriptor for one `SMALL_PAGE_SIZE` page.
///
/// Zero-filled is valid: unreferenced, slide zero (owns itself), run
/// length unset.  Fields are atomic so descriptors can be reached
/// through shared references; the caller's heap lock orders mutation,
/// hence `Relaxed` everywhere.
#[derive(Debug)]
#[repr(C)]
pub struct SmallPage {
    ref_count: AtomicU8,
    /// Zero on the descriptor that owns its run; otherwise the distance
    /// back to the owner, in descriptors.
    slide: AtomicU8,
    /// Run length in pages.  Only meaningful on the owner.
    page_count: AtomicU8,
}

impl SmallPage {
    #[inline]
    pub fn ref_count(&self) -> u8 {
        self.ref_count.load(Ordering::Relaxed)
    }

    /// Counts one more referenced line in this page's run.
    #[ensures(self.ref_count() > 0)]
    pub fn retain(&self, _lock: &LockToken<'_>) {
        let old = self.ref_count.fetch_add(1, Ordering::Relaxed);

        debug_assert!(old < u8::MAX, "page refcount overflow");
    }

    /// Drops one referenced line; returns true when the run became empty.
    #[requires(self.ref_count() > 0)]
    pub fn release(&self, _lock: &LockToken<'_>) -> bool {
        let old = self.ref_count.fetch_sub(1, Ordering::Relaxed);

        debug_assert!(old > 0, "page refcount underflow");
        old == 1
    }

    #[inline]
    pub fn slide(&self) -> u8 {
        self.slide.load(Ordering::Relaxed)
    }

    pub fn set_slide(&self, slide: u8, _lock: &LockToken<'_>) {
        self.slide.store(slide, Ordering::Relaxed);
    }

    #[inline]
    pub fn page_count(&self) -> u8 {
        self.page_count.load(Ordering::Relaxed)
    }

    pub fn set_page_count(&self, page_count: u8, _lock: &LockToken<'_>) {
        debug_assert!(page_count > 0);
        self.page_count.store(page_count, Ordering::Relaxed);
    }

    /// Address of the first byte of this descriptor's run.  Only the
    /// owning (slide zero) descriptor of a run has a begin.
    pub fn begin(&self) -> *mut u8 {
        debug_assert_eq!(self.slide(), 0, "only the run owner has a begin");

        let chunk = unsafe { &*Chunk::get(self as *const SmallPage as *const c_void).as_ptr() };
        let page_number = (self as *const SmallPage as usize - chunk.pages().as_ptr() as usize)
            / mem::size_of::<SmallPage>();

        chunk.object(page_number * SMALL_PAGE_SIZE) as *mut u8
    }

    /// One past the last byte of the run: `page_count` pages from
    /// `begin`.  The run length must have been set by the small-object
    /// allocator that owns the run.
    pub fn end(&self) -> *mut u8 {
        debug_assert_eq!(self.slide(), 0, "only the run owner has an end");
        debug_assert!(self.page_count() > 0, "run length never set");

        (self.begin() as usize + self.page_count() as usize * SMALL_PAGE_SIZE) as *mut u8
    }
}
