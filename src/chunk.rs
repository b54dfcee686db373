//! A `Chunk` is a `CHUNK_SIZE`-byte, `CHUNK_SIZE`-aligned slab of
//! address space that hosts its own bookkeeping: the first bytes of the
//! chunk hold the line, page, and boundary-tag descriptor arrays for
//! the memory that follows them.  Self-hosting keeps every
//! pointer-to-metadata lookup a mask, a shift, and an array index; no
//! global table, no locks on the fast path.
//!
//! The memory itself comes from an external virtual-memory provider
//! (reserved `CHUNK_SIZE`-aligned, zero-filled); the split/merge policy
//! that mutates the tags afterwards is an external collaborator too.
//! This module owns the layout and the addressing arithmetic.
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
use std::ptr;
use std::ptr::NonNull;

use crate::boundary_tag::BeginTag;
use crate::boundary_tag::BoundaryTag;
use crate::boundary_tag::EndTag;
use crate::lock::LockToken;
use crate::object::Object;
use crate::range::Range;
use crate::sizes::BOUNDARY_TAG_COUNT;
use crate::sizes::CHUNK_MASK;
use crate::sizes::CHUNK_SIZE;
use crate::sizes::LARGE_MIN;
use crate::sizes::LINE_COUNT;
use crate::sizes::PAGE_COUNT;
use crate::sizes::SMALL_LINE_SIZE;
use crate::sizes::SMALL_PAGE_SIZE;
use crate::small_line::SmallLine;
use crate::small_page::SmallPage;
use crate::vm_state::VMState;

/// Usable memory starts here, suitably aligned for large spans.  The
/// field is empty; it only pins the offset and alignment of the region
/// that follows the descriptor arrays.
#[repr(C, align(64))]
struct UsableMemory([u8; 0]);

/// The self-hosted chunk header.  An instance is never built by value:
/// the constructor reinterprets the first bytes of an aligned,
/// zero-filled reservation as a `Chunk` and initialises it in place.
#[repr(C)]
pub struct Chunk {
    lines: [SmallLine; LINE_COUNT],
    pages: [SmallPage; PAGE_COUNT],
    // The descriptor arrays occupy at least the first two LARGE_MIN
    // granules of the chunk, so the low boundary-tag slots never
    // describe real spans.  Combined with the `- 1` in the tag index
    // computation, that leaves a dead slot just below the first real
    // span's BeginTag for the left sentinel, and pushes the right
    // sentinel onto the array's otherwise-unreachable final slot.
    boundary_tags: [BoundaryTag; BOUNDARY_TAG_COUNT],
    memory: UsableMemory,
}

/// Largest single large object a chunk can hold: everything after the
/// metadata.
pub const LARGE_MAX: usize = CHUNK_SIZE - mem::size_of::<Chunk>();

// A sentinel on each side needs the array to hold more than the tags
// of one real span.
static_assertions::const_assert!(BOUNDARY_TAG_COUNT > 2);
// Room for at least one maximal large object after the metadata.
static_assertions::const_assert!(mem::size_of::<Chunk>() + LARGE_MAX <= CHUNK_SIZE);
// The left sentinel must land on an in-array slot: the metadata has to
// cover the first two tag granules.
static_assertions::const_assert!(mem::size_of::<Chunk>() >= 2 * LARGE_MIN);
static_assertions::const_assert_eq!(
    mem::align_of::<UsableMemory>(),
    crate::sizes::LARGE_ALIGNMENT
);
static_assertions::const_assert_eq!(mem::size_of::<Chunk>() % crate::sizes::LARGE_ALIGNMENT, 0);

impl Chunk {
    /// Returns the chunk owning `ptr` by masking the address bits below
    /// the chunk alignment.
    ///
    /// This is the crate's one address-masking primitive.  The result
    /// is only dereferenceable if `ptr` actually lies inside a
    /// constructed chunk; that precondition is the caller's, checked
    /// here only as a debug assertion.
    #[inline]
    pub fn get(ptr: *const c_void) -> NonNull<Chunk> {
        let base = ptr as usize & !CHUNK_MASK;

        debug_assert!(base != 0, "no chunk below the first aligned address");
        unsafe { NonNull::new_unchecked(base as *mut Chunk) }
    }

    /// Bytes of chunk header preceding usable memory.
    #[inline]
    pub const fn metadata_size() -> usize {
        mem::size_of::<Chunk>()
    }

    /// First byte of usable memory.
    #[inline]
    pub fn begin(&self) -> *mut u8 {
        ptr::addr_of!(self.memory) as *mut u8
    }

    /// One past the chunk's last byte.
    #[inline]
    pub fn end(&self) -> *mut u8 {
        (self as *const Chunk as usize + CHUNK_SIZE) as *mut u8
    }

    /// Base of the line descriptor array.
    #[inline]
    pub fn lines(&self) -> NonNull<SmallLine> {
        unsafe { NonNull::new_unchecked(ptr::addr_of!(self.lines) as *mut SmallLine) }
    }

    /// Base of the page descriptor array.
    #[inline]
    pub fn pages(&self) -> NonNull<SmallPage> {
        unsafe { NonNull::new_unchecked(ptr::addr_of!(self.pages) as *mut SmallPage) }
    }

    /// Byte offset of `ptr` from the chunk base.
    #[requires(ptr as usize >= self as *const Chunk as usize)]
    #[requires((ptr as usize) < self as *const Chunk as usize + CHUNK_SIZE)]
    #[inline]
    pub fn offset(&self, ptr: *const c_void) -> usize {
        ptr as usize - self as *const Chunk as usize
    }

    /// Inverse of `offset`.
    #[requires(offset < CHUNK_SIZE)]
    #[inline]
    pub fn object(&self, offset: usize) -> *mut c_void {
        (self as *const Chunk as usize + offset) as *mut c_void
    }

    /// The `BeginTag` slot for a span starting at `ptr`.
    ///
    /// `ptr` need not point at initialised tag data; this is pure
    /// addressing, used both to read live tags and to pick the slot a
    /// new span description is written to.
    #[inline]
    pub fn begin_tag(ptr: *const c_void) -> NonNull<BeginTag> {
        let chunk = Chunk::get(ptr);
        let offset = ptr as usize - chunk.as_ptr() as usize;

        debug_assert!(offset >= LARGE_MIN, "no tags below the metadata floor");

        // - 1 frees the final array slot for the right sentinel (see
        // the layout note on `boundary_tags`).
        let tag_number = offset / LARGE_MIN - 1;

        debug_assert!(tag_number < BOUNDARY_TAG_COUNT);
        unsafe {
            let tags = ptr::addr_of_mut!((*chunk.as_ptr()).boundary_tags) as *mut BoundaryTag;
            NonNull::new_unchecked(tags.add(tag_number) as *mut BeginTag)
        }
    }

    /// The `EndTag` slot for a span of `size` bytes starting at `ptr`.
    ///
    /// A span's size need not be a multiple of `LARGE_MIN`.
    /// Subtracting `LARGE_MIN` before dividing rounds down to the last
    /// tag granule the span occupies, never into the granule of the
    /// neighbor that follows it.
    #[inline]
    pub fn end_tag(ptr: *const c_void, size: usize) -> NonNull<EndTag> {
        let chunk = Chunk::get(ptr);
        let end = ptr as usize + size;

        debug_assert!(end - chunk.as_ptr() as usize >= 2 * LARGE_MIN);

        let tag_number = (end - LARGE_MIN - chunk.as_ptr() as usize) / LARGE_MIN - 1;

        debug_assert!(tag_number < BOUNDARY_TAG_COUNT);
        unsafe {
            let tags = ptr::addr_of_mut!((*chunk.as_ptr()).boundary_tags) as *mut BoundaryTag;
            NonNull::new_unchecked(tags.add(tag_number) as *mut EndTag)
        }
    }

    /// The line descriptor covering `offset`.
    #[requires(offset < CHUNK_SIZE)]
    #[inline]
    pub fn line(&self, offset: usize) -> NonNull<SmallLine> {
        let line_number = offset / SMALL_LINE_SIZE;

        unsafe { NonNull::new_unchecked(self.lines().as_ptr().add(line_number)) }
    }

    /// The page descriptor owning the run that covers `offset`: a
    /// non-zero slide on the covering descriptor points back at the
    /// run's first page.
    #[requires(offset < CHUNK_SIZE)]
    #[inline]
    pub fn page(&self, offset: usize) -> NonNull<SmallPage> {
        let page_number = offset / SMALL_PAGE_SIZE;

        unsafe {
            let page = self.pages().as_ptr().add(page_number);
            NonNull::new_unchecked(page.sub((*page).slide() as usize))
        }
    }

    /// Initialises a chunk in place over a fresh reservation,
    /// transitioning it from zero-filled address space to ready.  Runs
    /// exactly once per chunk; every step installs an invariant the
    /// fast paths rely on afterwards.
    ///
    /// # Safety
    ///
    /// `base` must be the start of a `CHUNK_SIZE`-aligned,
    /// `CHUNK_SIZE`-byte, zero-filled region with no other users, and
    /// the caller must hold the exclusion the `lock` token witnesses
    /// until this returns (plus a publication barrier before any other
    /// thread touches the chunk).
    pub unsafe fn init(base: NonNull<c_void>, lock: &LockToken<'_>) -> NonNull<Chunk> {
        assert_eq!(
            base.as_ptr() as usize % CHUNK_SIZE,
            0,
            "chunk base must be CHUNK_SIZE-aligned"
        );

        let chunk: NonNull<Chunk> = base.cast();
        let this = chunk.as_ptr();

        let usable = Range::new((*this).begin() as usize, CHUNK_SIZE - mem::size_of::<Chunk>());
        assert!(usable.size() <= LARGE_MAX);

        // One free span covering all usable memory.  Freshly reserved
        // address space has no physical backing yet.
        let begin_tag = Chunk::begin_tag(usable.begin() as *const c_void);
        {
            let tag = &mut *begin_tag.as_ptr();

            tag.set_range(usable);
            tag.set_free(true);
            tag.set_vm_state(VMState::Virtual);
        }

        let end_tag = Chunk::end_tag(usable.begin() as *const c_void, usable.size());
        (*end_tag.as_ptr()).init(&*begin_tag.as_ptr());

        // Permanently allocated tags at both edges.  A merge scan
        // walking left from any real span stops here instead of reading
        // into the descriptor arrays; walking right, it stops instead
        // of reading into the next chunk.
        let left_sentinel = (*begin_tag.as_ptr()).prev();
        debug_assert!(
            (*this).tag_index(left_sentinel.as_ptr() as *const BoundaryTag) < BOUNDARY_TAG_COUNT
        );
        (*left_sentinel.as_ptr()).init_sentinel();

        let right_sentinel = (*end_tag.as_ptr()).next();
        debug_assert!(
            (*this).tag_index(right_sentinel.as_ptr() as *const BoundaryTag) < BOUNDARY_TAG_COUNT
        );
        (*right_sentinel.as_ptr()).init_sentinel();

        // Pin the line and page descriptors that overlap the chunk's
        // own header by counting the header as live occupants, so the
        // small-object path can never hand that memory out.
        let mut slot = this as usize;
        while slot < usable.begin() {
            let object = Object::with_chunk(chunk, slot as *const c_void);

            object.line().as_ref().retain(lock);
            object.page().as_ref().retain(lock);
            slot += SMALL_LINE_SIZE;
        }

        chunk
    }

    /// Index of `tag` in the boundary-tag array; assertion support.
    fn tag_index(&self, tag: *const BoundaryTag) -> usize {
        let tags = ptr::addr_of!(self.boundary_tags) as usize;

        (tag as usize - tags) / mem::size_of::<BoundaryTag>()
    }
}
