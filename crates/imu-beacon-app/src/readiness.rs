use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::waitqueue::AtomicWaker;
use portable_atomic::{AtomicU32, Ordering};

/// Marks the end of sensor calibration.
///
/// The counter starts at zero and only ever grows, so once the gate opens it
/// stays open for the life of the process.
pub struct ReadinessGate {
    count: AtomicU32,
    waker: AtomicWaker,
}

impl ReadinessGate {
    pub const fn new() -> Self {
        Self { count: AtomicU32::new(0), waker: AtomicWaker::new() }
    }

    /// Open the gate. Returns the new counter value.
    pub fn mark_ready(&self) -> u32 {
        let count = self.count.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.waker.wake();
        count
    }

    pub fn is_ready(&self) -> bool {
        self.count() > 0
    }

    pub fn count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    /// Resolve once the gate is open. Supports a single waiting task.
    pub async fn wait_ready(&self) {
        poll_fn(|cx| {
            if self.is_ready() {
                return Poll::Ready(());
            }
            self.waker.register(cx.waker());
            if self.is_ready() {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
        .await
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}
