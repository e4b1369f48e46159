use crate::prelude::*;

/// Drains the beacon hand-off queue into the neighbour table. Every beacon
/// is followed by a restart request, whatever became of it.
pub async fn beacon_task<B: Board, const K: usize>(node: &Node<B, K>) -> ! {
    loop {
        let packet = node.next_beacon().await;
        match node.process_beacon(&packet) {
            Ok(Insertion::Added) => {
                debug!("{} neighbours", node.neighbors().len())
            }
            Ok(Insertion::Known | Insertion::Full) => {}
            Err(e) => debug!("Beacon discarded: {:?}", e),
        }
    }
}
