use embedded_hal_async::delay::DelayNs;

use crate::prelude::*;

/// What one clock tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick {
    /// Watchdog cleared and a beacon requested.
    pub fed: bool,
    /// An armed receive was given up on and a restart requested.
    pub stalled: bool,
}

/// Periodic tick source. First tick after `tick_offset_ms`, then every
/// `tick_period_ms`.
pub async fn clock_task<B: Board, const K: usize, D: DelayNs>(
    node: &Node<B, K>,
    mut delay: D,
) -> ! {
    let config = node.config();
    delay.delay_ms(config.tick_offset_ms).await;
    loop {
        let tick = node.on_tick();
        if !tick.fed {
            trace!("Tick before calibration, watchdog left unfed");
        }
        delay.delay_ms(config.tick_period_ms).await;
    }
}
