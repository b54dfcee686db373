//! Boundary tags bracket every maximal contiguous large span in a
//! chunk: a `BeginTag` at the span's first granule, an `EndTag` at its
//! last.  Free/allocated state and `VMState` are duplicated in both
//! ends, so the deallocation path can inspect either neighbor of a span
//! with a single slot load, then coalesce without walking anything.
//!
//! Tags never store a pointer to their chunk or their span: the span
//! begin is kept as a compact offset in `LARGE_ALIGNMENT` units, and the
//! owning chunk is recovered by masking the tag's own address.
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
use std::ops::Deref;
use std::ops::DerefMut;
use std::ptr::NonNull;

use crate::chunk::Chunk;
use crate::range::Range;
use crate::sizes::CHUNK_SIZE;
use crate::sizes::LARGE_ALIGNMENT;
use crate::vm_state::VMState;

/// One slot in a chunk's boundary-tag array.
///
/// The zero value is a valid tag: allocated, empty range at the chunk
/// base, `Virtual`.  Chunk metadata is never initialised beyond the
/// slots the constructor touches, so this must stay true.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct BoundaryTag {
    /// Span begin, as an offset from the chunk base in units of
    /// `LARGE_ALIGNMENT`.
    compact_begin: u32,
    /// Span size in bytes.
    size: u32,
    free: bool,
    /// Set on slots playing the `EndTag` role.
    end: bool,
    vm_state: VMState,
}

#[allow(unused)]
extern "C" {
    fn unused_boundary_tag_is_zero_safe() -> BoundaryTag;
}

impl BoundaryTag {
    #[inline]
    pub fn is_free(&self) -> bool {
        self.free
    }

    #[inline]
    pub fn set_free(&mut self, free: bool) {
        self.free = free;
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.end
    }

    #[inline]
    pub fn vm_state(&self) -> VMState {
        self.vm_state
    }

    #[inline]
    pub fn set_vm_state(&mut self, vm_state: VMState) {
        self.vm_state = vm_state;
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Reconstructs the span this tag describes.  The chunk base comes
    /// from the tag's own address; tags only ever live inside the
    /// boundary-tag array of the chunk whose memory they describe.
    pub fn range(&self) -> Range {
        let chunk = Chunk::get(self as *const BoundaryTag as *const c_void);
        let begin = chunk.as_ptr() as usize + self.compact_begin as usize * LARGE_ALIGNMENT;

        Range::new(begin, self.size as usize)
    }

    /// Records `range` as the span this tag describes.  The begin must
    /// lie in the same chunk as the tag and be `LARGE_ALIGNMENT`-aligned.
    pub fn set_range(&mut self, range: Range) {
        let chunk = Chunk::get(self as *const BoundaryTag as *const c_void);
        debug_assert_eq!(
            chunk,
            Chunk::get(range.begin() as *const c_void),
            "span and tag must share a chunk"
        );
        debug_assert_eq!(range.begin() % LARGE_ALIGNMENT, 0);
        debug_assert!(range.size() <= CHUNK_SIZE);

        self.compact_begin = ((range.begin() - chunk.as_ptr() as usize) / LARGE_ALIGNMENT) as u32;
        self.size = range.size() as u32;
    }

    /// Turns this slot into a permanent sentinel: allocated forever,
    /// describing an empty span.  Merge scans stop on the allocated
    /// flag and never look past it.
    #[ensures(!self.is_free(), "sentinels are never free")]
    fn init_sentinel(&mut self) {
        self.compact_begin = 0;
        self.size = 0;
        self.free = false;
        self.vm_state = VMState::Virtual;
    }
}

/// The tag at a span's first granule.
#[derive(Debug)]
#[repr(transparent)]
pub struct BeginTag(BoundaryTag);

/// The tag at a span's last granule.
#[derive(Debug)]
#[repr(transparent)]
pub struct EndTag(BoundaryTag);

impl Deref for BeginTag {
    type Target = BoundaryTag;

    #[inline]
    fn deref(&self) -> &BoundaryTag {
        &self.0
    }
}

impl DerefMut for BeginTag {
    #[inline]
    fn deref_mut(&mut self) -> &mut BoundaryTag {
        &mut self.0
    }
}

impl Deref for EndTag {
    type Target = BoundaryTag;

    #[inline]
    fn deref(&self) -> &BoundaryTag {
        &self.0
    }
}

impl DerefMut for EndTag {
    #[inline]
    fn deref_mut(&mut self) -> &mut BoundaryTag {
        &mut self.0
    }
}

impl BeginTag {
    /// The `EndTag` one slot to the left: the tag describing whatever
    /// span precedes this one.
    ///
    /// The left sentinel guarantees the result stays inside the
    /// boundary-tag array, so callers dereference without a bounds
    /// check.
    #[inline]
    pub fn prev(&self) -> NonNull<EndTag> {
        let slot = self as *const BeginTag as *mut BoundaryTag;

        unsafe { NonNull::new_unchecked(slot.sub(1) as *mut EndTag) }
    }

    pub fn init_sentinel(&mut self) {
        self.0.init_sentinel();
        self.0.end = false;
    }
}

impl EndTag {
    /// Copies the span description from its `BeginTag`, so both ends
    /// agree on range, free state, and `VMState`.
    #[ensures(self.is_free() == begin.is_free())]
    #[ensures(self.size() == begin.size())]
    #[ensures(self.vm_state() == begin.vm_state())]
    pub fn init(&mut self, begin: &BeginTag) {
        self.0 = begin.0;
        self.0.end = true;
    }

    /// The `BeginTag` one slot to the right: the tag describing
    /// whatever span follows this one.  In-array by the right sentinel.
    #[inline]
    pub fn next(&self) -> NonNull<BeginTag> {
        let slot = self as *const EndTag as *mut BoundaryTag;

        unsafe { NonNull::new_unchecked(slot.add(1) as *mut BeginTag) }
    }

    pub fn init_sentinel(&mut self) {
        self.0.init_sentinel();
        self.0.end = true;
    }
}
