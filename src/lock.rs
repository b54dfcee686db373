//! Chunk construction and descriptor refcount updates require mutual
//! exclusion, but the lock itself belongs to the caller: this crate
//! never acquires or releases anything.  A `LockToken` is the evidence
//! a caller passes down to show the lock is held.
use std::marker::PhantomData;
use std::sync::Mutex;
use std::sync::MutexGuard;

/// Zero-sized witness that the caller holds the heap lock.
///
/// The borrow ties the token's lifetime to a live `MutexGuard`, so a
/// token cannot outlast the critical section it was forged in.
#[derive(Debug)]
pub struct LockToken<'a> {
    _held: PhantomData<&'a ()>,
}

impl<'a> LockToken<'a> {
    /// Derives a token from a held guard.
    #[inline]
    pub fn new<T>(_guard: &'a MutexGuard<'_, T>) -> Self {
        Self { _held: PhantomData }
    }

    /// Forges a token without a `MutexGuard`.
    ///
    /// # Safety
    ///
    /// The caller must hold an equivalent external exclusion primitive
    /// for as long as the token (and anything derived from it) lives.
    #[inline]
    pub unsafe fn assume_held() -> LockToken<'static> {
        LockToken { _held: PhantomData }
    }
}

/// Returns the process-wide heap lock.
///
/// Callers that have no lock of their own can serialize chunk
/// construction on this one; callers embedding the crate in a larger
/// allocator will usually substitute their own via
/// `LockToken::assume_held`.
pub fn heap_lock() -> &'static Mutex<()> {
    lazy_static::lazy_static! {
        static ref LOCK: Mutex<()> = Mutex::new(());
    }

    &LOCK
}

#[test]
fn token_from_guard() {
    let guard = heap_lock().lock().unwrap();
    let _token = LockToken::new(&guard);
}
