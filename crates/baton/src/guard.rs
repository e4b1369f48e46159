use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::semaphore::{FairSemaphore, SemaphoreReleaser};
use portable_atomic::{AtomicUsize, Ordering};

/// RAII guard proving ownership of the baton.
///
/// While the guard is alive its owner has exclusive access to the bus.
/// Dropping the guard hands the baton to the longest-waiting task.
pub struct BatonGuard<'a, M: RawMutex, B, const N: usize> {
    bus_ptr: *mut B,
    holders: &'a AtomicUsize,
    // Released after `Drop::drop` has decremented `holders`.
    _permit: SemaphoreReleaser<'a, FairSemaphore<M, N>>,
    _phantom: PhantomData<&'a mut B>,
}

impl<M: RawMutex, B, const N: usize> Deref for BatonGuard<'_, M, B, N> {
    type Target = B;

    #[inline]
    fn deref(&self) -> &B {
        // SAFETY: The guard owns the only permit of the semaphore, so no other
        // guard exists and the pointee is not aliased mutably elsewhere.
        unsafe { &*self.bus_ptr }
    }
}

impl<M: RawMutex, B, const N: usize> DerefMut for BatonGuard<'_, M, B, N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut B {
        // SAFETY: See `deref`. `&mut self` guarantees this is the only live
        // borrow derived from this guard.
        unsafe { &mut *self.bus_ptr }
    }
}

impl<M: RawMutex, B, const N: usize> Drop for BatonGuard<'_, M, B, N> {
    fn drop(&mut self) {
        self.holders.fetch_sub(1, Ordering::Release);
    }
}

// SAFETY: A BatonGuard is conceptually `&mut B`, which is Send iff B: Send.
unsafe impl<M: RawMutex + Sync, B: Send, const N: usize> Send
    for BatonGuard<'_, M, B, N>
{
}

// SAFETY: Shared access to the guard only yields `&B`.
unsafe impl<M: RawMutex + Sync, B: Sync, const N: usize> Sync
    for BatonGuard<'_, M, B, N>
{
}

impl<'a, M: RawMutex, B, const N: usize> BatonGuard<'a, M, B, N> {
    /// Create a new guard. Only called by `Baton`.
    pub(crate) fn new(
        bus_ptr: *mut B,
        holders: &'a AtomicUsize,
        permit: SemaphoreReleaser<'a, FairSemaphore<M, N>>,
    ) -> Self {
        Self { bus_ptr, holders, _permit: permit, _phantom: PhantomData }
    }

    /// Returns a mutable reference to the guarded bus.
    #[inline]
    pub fn bus(&mut self) -> &mut B {
        self
    }
}
