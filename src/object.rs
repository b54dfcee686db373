//! An `Object` pairs a chunk with a byte offset inside it: the handle
//! the small-object path uses to reach the line and page descriptors
//! for an arbitrary address.  Objects are derived on the spot and
//! thrown away; nothing persists them.
use std::ffi::c_void;
use std::ptr::NonNull;

use crate::chunk::Chunk;
use crate::small_line::SmallLine;
use crate::small_page::SmallPage;

#[derive(Clone, Copy, Debug)]
pub struct Object {
    chunk: NonNull<Chunk>,
    offset: usize,
}

impl Object {
    /// Resolves the chunk owning `ptr` and the offset within it.
    ///
    /// # Safety
    ///
    /// `ptr` must lie inside a constructed chunk, and that chunk must
    /// stay live for as long as this `Object` is used.
    pub unsafe fn new(ptr: *const c_void) -> Object {
        let chunk = Chunk::get(ptr);

        Object {
            chunk,
            offset: chunk.as_ref().offset(ptr),
        }
    }

    /// Like `new`, for callers that already know the owning chunk.
    ///
    /// # Safety
    ///
    /// Same as `new`; additionally `chunk` must be the chunk that owns
    /// `ptr`.
    pub unsafe fn with_chunk(chunk: NonNull<Chunk>, ptr: *const c_void) -> Object {
        debug_assert_eq!(chunk, Chunk::get(ptr));

        Object {
            chunk,
            offset: chunk.as_ref().offset(ptr),
        }
    }

    #[inline]
    pub fn chunk(&self) -> NonNull<Chunk> {
        self.chunk
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The address this handle was derived from.
    pub fn begin(&self) -> *mut c_void {
        unsafe { self.chunk.as_ref() }.object(self.offset)
    }

    /// The line descriptor covering this address.
    pub fn line(&self) -> NonNull<SmallLine> {
        unsafe { self.chunk.as_ref() }.line(self.offset)
    }

    /// The page descriptor owning the run that covers this address.
    pub fn page(&self) -> NonNull<SmallPage> {
        unsafe { self.chunk.as_ref() }.page(self.offset)
    }
}
