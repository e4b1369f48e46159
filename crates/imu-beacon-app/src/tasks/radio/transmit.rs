use crate::prelude::*;

async fn bring_up_radio<R: Radio>(
    radio: &mut R,
    config: &NodeConfig,
) -> Result<(), RadioError> {
    radio.init(config.phy).await?;
    radio.set_power(config.tx_power_dbm)?;
    radio.enable_address_filter(&config.address_filter())?;
    Ok(())
}

/// Cancel whatever receive is armed and send one beacon.
async fn send_beacon<B: Board, const K: usize>(
    node: &Node<B, K>,
) -> Result<(), RadioError> {
    let config = node.config();
    let mut radio = node.radio().lock().await;
    if node.with_receiver(|rx| rx.cancel()) {
        trace!("Armed receive cancelled for transmit");
    }
    if let Err(e) = radio.abort() {
        debug!("Abort before transmit: {:?}", e);
    }
    let beacon = Beacon::new(config.personal_address);
    let packet = beacon.to_packet(config.universal_address);
    radio.transmit(&packet).await
}

/// One transmit period. `Ok(false)` when the gate is still closed.
async fn transmit_period<B: Board, const K: usize>(
    node: &Node<B, K>,
) -> Result<bool, LinkError> {
    // Held for the whole period, released on every path out.
    let _baton = node.baton().acquire().await?;
    if !node.readiness().is_ready() {
        return Ok(false);
    }
    let sent = send_beacon(node).await;
    node.signals().restart.post();
    sent?;
    Ok(true)
}

/// Brings the radio up once, then sends a beacon on every transmit signal
/// while the node is ready.
pub async fn transmit_task<B: Board, const K: usize>(node: &Node<B, K>) -> ! {
    {
        let mut radio = node.radio().lock().await;
        if let Err(e) = bring_up_radio(&mut *radio, node.config()).await {
            error!("Radio bring-up failed: {:?}", e);
            fail_stop().await;
        }
    }
    info!("Radio up, filtering {:?}", node.config().address_filter());

    loop {
        node.signals().transmit.wait().await;
        match transmit_period(node).await {
            Ok(true) => trace!("Beacon sent"),
            Ok(false) => {}
            Err(LinkError::Radio(e)) => {
                warn!("Beacon transmit failed: {:?}", e);
                node.indicate(&[Led::Red, Led::Green]);
            }
            Err(LinkError::Baton(e)) => warn!("Transmit skipped: {:?}", e),
        }
    }
}
