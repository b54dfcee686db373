//! A `VMState` records whether the operating system currently backs a
//! free span with physical pages.  It rides along on the span's
//! `BeginTag`, so the allocation path knows whether a span needs to be
//! re-committed before it can be handed out.

/// Physical-backing state of a free span.
///
/// `Virtual` is the zero value on purpose: chunk metadata starts out as
/// zero-filled address space, and a freshly reserved span has no
/// physical pages behind it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum VMState {
    /// No physical pages committed; re-commit before reuse.
    Virtual = 0,
    /// Pages are resident.
    Physical = 1,
}

impl VMState {
    /// Combined state for a span coalesced from two neighbors.
    ///
    /// A merged span is only fully backed when both inputs were; any
    /// `Virtual` component makes the whole span a candidate for
    /// re-commit.
    #[inline]
    pub fn merge(self, other: VMState) -> VMState {
        match (self, other) {
            (VMState::Physical, VMState::Physical) => VMState::Physical,
            _ => VMState::Virtual,
        }
    }
}

impl Default for VMState {
    fn default() -> Self {
        VMState::Virtual
    }
}

#[test]
fn merge_is_conservative() {
    use VMState::*;

    assert_eq!(Physical.merge(Physical), Physical);
    assert_eq!(Physical.merge(Virtual), Virtual);
    assert_eq!(Virtual.merge(Physical), Virtual);
    assert_eq!(Virtual.merge(Virtual), Virtual);
}
