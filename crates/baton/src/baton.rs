use core::cell::UnsafeCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::semaphore::{FairSemaphore, Semaphore, SemaphoreReleaser};
use portable_atomic::{AtomicUsize, Ordering};

use crate::error::BatonError;
use crate::guard::BatonGuard;

/// Single-permit token serializing access to a non-reentrant bus.
///
/// Waiters are served strictly in arrival order, so a steady stream of
/// high-rate requesters cannot starve a slower one. `N` bounds the number of
/// tasks that may be queued at the same time.
pub struct Baton<M: RawMutex, B, const N: usize> {
    bus: UnsafeCell<B>,
    permit: FairSemaphore<M, N>,
    holders: AtomicUsize,
    acquisitions: AtomicUsize,
}

// SAFETY: `bus` is only reachable through a `BatonGuard`, and at most one
// guard exists at a time because the semaphore holds a single permit.
unsafe impl<M: RawMutex + Sync, B: Send, const N: usize> Sync
    for Baton<M, B, N>
{
}

impl<M: RawMutex, B, const N: usize> Baton<M, B, N> {
    /// Create a new baton guarding `bus`.
    pub const fn new(bus: B) -> Self {
        Self {
            bus: UnsafeCell::new(bus),
            permit: FairSemaphore::new(1),
            holders: AtomicUsize::new(0),
            acquisitions: AtomicUsize::new(0),
        }
    }

    /// Wait for the baton.
    ///
    /// Resolves once every task that asked earlier has had its turn and
    /// released the baton.
    pub async fn acquire(
        &self,
    ) -> Result<BatonGuard<'_, M, B, N>, BatonError> {
        let permit = self
            .permit
            .acquire(1)
            .await
            .map_err(|_| BatonError::WaitQueueFull)?;
        Ok(self.enter(permit))
    }

    /// Take the baton only if it is free and nobody is queued for it.
    pub fn try_acquire(&self) -> Option<BatonGuard<'_, M, B, N>> {
        self.permit.try_acquire(1).map(|permit| self.enter(permit))
    }

    fn enter<'a>(
        &'a self,
        permit: SemaphoreReleaser<'a, FairSemaphore<M, N>>,
    ) -> BatonGuard<'a, M, B, N> {
        let previous = self.holders.fetch_add(1, Ordering::Acquire);
        debug_assert_eq!(previous, 0, "baton handed to two owners");
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        BatonGuard::new(self.bus.get(), &self.holders, permit)
    }

    /// Returns the number of live guards. Never more than one.
    pub fn holder_count(&self) -> usize {
        self.holders.load(Ordering::Relaxed)
    }

    /// Returns `true` while some task owns the baton.
    pub fn is_held(&self) -> bool {
        self.holder_count() > 0
    }

    /// Total number of successful acquisitions since creation.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::Relaxed)
    }

    /// Direct access to the bus when no guard can exist.
    pub fn get_mut(&mut self) -> &mut B {
        self.bus.get_mut()
    }

    /// Consume the baton and return the bus.
    pub fn into_inner(self) -> B {
        self.bus.into_inner()
    }
}
