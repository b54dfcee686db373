//! Build-time layout constants for the chunk geometry.
//!
//! Every address-arithmetic formula in the crate is derived from these
//! values, so they live in one place and the cross-constant conditions
//! are checked at compile time.  Changing any of them recomputes the
//! array capacities in `Chunk` and re-runs the static checks there.

/// Chunks are naturally aligned to their size.
#[cfg(not(feature = "test_only_small_constants"))]
pub const CHUNK_SIZE: usize = 2 << 20;

#[cfg(feature = "test_only_small_constants")]
pub const CHUNK_SIZE: usize = 1 << 18;

/// Masks the low bits of an address to recover its chunk base.
pub const CHUNK_MASK: usize = CHUNK_SIZE - 1;

/// Granule for small-object memory; one `SmallLine` descriptor each.
pub const SMALL_LINE_SIZE: usize = 256;

/// A page groups `SMALL_PAGE_LINE_COUNT` lines; one `SmallPage`
/// descriptor each.
pub const SMALL_PAGE_SIZE: usize = 4096;
pub const SMALL_PAGE_LINE_COUNT: usize = SMALL_PAGE_SIZE / SMALL_LINE_SIZE;

/// Large spans begin on `LARGE_ALIGNMENT` boundaries; boundary tags
/// store span begins compactly in units of this alignment.
pub const LARGE_ALIGNMENT: usize = 64;

/// Minimum size granularity for large objects.  The boundary-tag array
/// has one slot per `LARGE_MIN` bytes of chunk.
#[cfg(not(feature = "test_only_small_constants"))]
pub const LARGE_MIN: usize = 4096;

#[cfg(feature = "test_only_small_constants")]
pub const LARGE_MIN: usize = 512;

pub const LINE_COUNT: usize = CHUNK_SIZE / SMALL_LINE_SIZE;
pub const PAGE_COUNT: usize = CHUNK_SIZE / SMALL_PAGE_SIZE;
pub const BOUNDARY_TAG_COUNT: usize = CHUNK_SIZE / LARGE_MIN;

// The constants are tightly coupled.  Make sure they make sense.
static_assertions::const_assert!(CHUNK_SIZE.is_power_of_two());
static_assertions::const_assert!(SMALL_LINE_SIZE.is_power_of_two());
static_assertions::const_assert!(SMALL_PAGE_SIZE.is_power_of_two());
static_assertions::const_assert!(LARGE_MIN.is_power_of_two());
static_assertions::const_assert!(LARGE_ALIGNMENT.is_power_of_two());
static_assertions::const_assert_eq!(
    SMALL_PAGE_SIZE,
    SMALL_PAGE_LINE_COUNT * SMALL_LINE_SIZE
);
static_assertions::const_assert_eq!(CHUNK_SIZE % SMALL_PAGE_SIZE, 0);
static_assertions::const_assert_eq!(CHUNK_SIZE % LARGE_MIN, 0);
static_assertions::const_assert_eq!(LARGE_MIN % LARGE_ALIGNMENT, 0);

// Boundary tags store span sizes and compact begins in 32 bits.
static_assertions::const_assert!(CHUNK_SIZE <= u32::MAX as usize);

#[test]
fn consistent_geometry() {
    // One descriptor per granule, at every granularity.
    assert_eq!(LINE_COUNT * SMALL_LINE_SIZE, CHUNK_SIZE);
    assert_eq!(PAGE_COUNT * SMALL_PAGE_SIZE, CHUNK_SIZE);
    assert_eq!(BOUNDARY_TAG_COUNT * LARGE_MIN, CHUNK_SIZE);
    assert_eq!(LINE_COUNT, PAGE_COUNT * SMALL_PAGE_LINE_COUNT);
}
