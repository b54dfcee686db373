//! Quarry is the chunk-level metadata layer of a memory allocator: it
//! carves fixed-size, self-aligned chunks of address space, hosts all
//! bookkeeping for a chunk inside the chunk itself, and answers
//! "which chunk and which descriptor own this pointer" in O(1) with
//! nothing but masks, shifts, and array indexing.
//!
//! Large spans are tracked with boundary tags that support
//! coalesce/split without bounds checks, thanks to two permanently
//! allocated sentinel tags installed at construction.  Small-object
//! granules (lines, grouped into pages) are tracked by refcounted
//! descriptors that locate themselves from their array position.
//!
//! Acquiring the virtual memory, the lock guarding construction, and
//! the allocation policies that mutate the metadata afterwards all
//! belong to the embedding allocator; this crate defines the layout,
//! the addressing arithmetic, and the invariants that make them safe.
mod boundary_tag;
mod chunk;
mod lock;
mod object;
mod range;
mod sizes;
mod small_line;
mod small_page;
mod vm_state;

pub use boundary_tag::BeginTag;
pub use boundary_tag::BoundaryTag;
pub use boundary_tag::EndTag;
pub use chunk::Chunk;
pub use chunk::LARGE_MAX;
pub use lock::heap_lock;
pub use lock::LockToken;
pub use object::Object;
pub use range::Range;
pub use sizes::BOUNDARY_TAG_COUNT;
pub use sizes::CHUNK_MASK;
pub use sizes::CHUNK_SIZE;
pub use sizes::LARGE_ALIGNMENT;
pub use sizes::LARGE_MIN;
pub use sizes::LINE_COUNT;
pub use sizes::PAGE_COUNT;
pub use sizes::SMALL_LINE_SIZE;
pub use sizes::SMALL_PAGE_LINE_COUNT;
pub use sizes::SMALL_PAGE_SIZE;
pub use small_line::SmallLine;
pub use small_page::SmallPage;
pub use vm_state::VMState;
