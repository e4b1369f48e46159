use super::receive::Rearm;
use crate::prelude::*;

/// Sole owner of the transition into `Listening`.
pub async fn restart_task<B: Board, const K: usize>(node: &Node<B, K>) -> ! {
    let timeout = node.config().rx_timeout_ticks;
    loop {
        node.signals().restart.wait().await;
        // State changes and radio calls happen under the same lock as the
        // transmit path's cancel and abort.
        let mut radio = node.radio().lock().await;
        let rearm = node.with_receiver(|rx| rx.begin_listening());
        if rearm == Rearm::AlreadyListening {
            trace!("Restart while listening, ignored");
            continue;
        }

        if rearm == Rearm::AbortAndArm {
            if let Err(e) = radio.abort() {
                debug!("Abort of stalled receive: {:?}", e);
            }
        }
        if let Err(e) = radio.receive_async(timeout) {
            warn!("Receive arm failed: {:?}", e);
            node.with_receiver(|rx| rx.arm_failed());
        }
    }
}
