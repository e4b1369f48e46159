use core::cell::RefCell;
use core::future::poll_fn;
use core::task::{Context, Poll};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::WakerRegistration;

/// Pending-work units above this collapse into "once more".
pub const MAX_PENDING: u32 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Posted {
    /// A new unit of work was recorded.
    Queued,
    /// The counter was saturated and the post merged into pending work.
    Coalesced,
}

struct SignalState {
    pending: u32,
    waker: WakerRegistration,
}

/// Counting wake-up signal with one consumer.
///
/// Producers (interrupt handlers, the clock tick, the receive callback)
/// `post`; the owning task `wait`s and consumes one unit per iteration.
/// Posting never blocks and is safe from interrupt context.
pub struct WorkSignal<M: RawMutex> {
    state: Mutex<M, RefCell<SignalState>>,
}

impl<M: RawMutex> WorkSignal<M> {
    pub const fn new() -> Self {
        Self::with_pending(0)
    }

    /// Create a signal that already holds `pending` units of work.
    pub const fn with_pending(pending: u32) -> Self {
        Self {
            state: Mutex::new(RefCell::new(SignalState {
                pending,
                waker: WakerRegistration::new(),
            })),
        }
    }

    pub fn post(&self) -> Posted {
        self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            let posted = if state.pending >= MAX_PENDING {
                Posted::Coalesced
            } else {
                state.pending += 1;
                Posted::Queued
            };
            state.waker.wake();
            posted
        })
    }

    /// Wait for and consume one unit of work.
    pub async fn wait(&self) {
        poll_fn(|cx| self.poll_wait(cx)).await
    }

    fn poll_wait(&self, cx: &mut Context<'_>) -> Poll<()> {
        self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            if state.pending > 0 {
                state.pending -= 1;
                Poll::Ready(())
            } else {
                state.waker.register(cx.waker());
                Poll::Pending
            }
        })
    }

    /// Consume one unit of work if any is pending.
    pub fn try_take(&self) -> bool {
        self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            if state.pending > 0 {
                state.pending -= 1;
                true
            } else {
                false
            }
        })
    }

    pub fn pending(&self) -> u32 {
        self.state.lock(|cell| cell.borrow().pending)
    }
}

impl<M: RawMutex> Default for WorkSignal<M> {
    fn default() -> Self {
        Self::new()
    }
}
