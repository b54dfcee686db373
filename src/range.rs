//! A `Range` is a contiguous span of byte addresses.  It is a plain
//! value: two words, copied freely, no ownership implied.

/// A `(begin, size)` pair describing a contiguous byte span.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Range {
    begin: usize,
    size: usize,
}

impl Range {
    #[inline]
    pub const fn new(begin: usize, size: usize) -> Self {
        Self { begin, size }
    }

    /// Address of the first byte in the span.
    #[inline]
    pub fn begin(self) -> usize {
        self.begin
    }

    /// Address one past the last byte in the span.
    #[inline]
    pub fn end(self) -> usize {
        self.begin + self.size
    }

    #[inline]
    pub fn size(self) -> usize {
        self.size
    }
}

#[test]
fn end_is_exclusive() {
    let range = Range::new(4096, 512);

    assert_eq!(range.begin(), 4096);
    assert_eq!(range.size(), 512);
    assert_eq!(range.end(), 4608);

    let empty = Range::new(4096, 0);
    assert_eq!(empty.begin(), empty.end());
}
