/// Errors that can occur while waiting for the baton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatonError {
    /// More tasks are waiting than the baton's wait queue can hold.
    WaitQueueFull,
}

impl core::fmt::Display for BatonError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BatonError::WaitQueueFull => write!(f, "baton wait queue is full"),
        }
    }
}
