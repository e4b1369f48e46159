//! Start-up chain: the initialization task brings the IMU up and hands over
//! to the calibration task, which opens the readiness gate.

use crate::prelude::*;
use crate::tasks::sampling::{sample_once, SensorKind};

async fn bring_up_sensor<S: ImuSensor>(
    baton: &SensorBaton<S>,
    config: &NodeConfig,
) -> Result<(), NodeError<S::Error>> {
    let mut sensor = baton.acquire().await?;
    sensor.begin().await.map_err(NodeError::Sensor)?;
    sensor
        .configure_interrupt(config.gyro_interrupt)
        .await
        .map_err(NodeError::Sensor)?;
    sensor
        .configure_interrupt(config.accel_interrupt)
        .await
        .map_err(NodeError::Sensor)?;
    Ok(())
}

pub async fn initialization_task<B: Board, const K: usize>(
    node: &Node<B, K>,
) -> ! {
    let signals = node.signals();
    loop {
        signals.initialization.wait().await;
        if let Err(e) = bring_up_sensor(node.baton(), node.config()).await {
            error!("IMU bring-up failed: {:?}", e);
            fail_stop().await;
        }
        info!("IMU up, interrupts routed");
        signals.calibration.post();
    }
}

async fn calibrate<S: ImuSensor>(
    baton: &SensorBaton<S>,
    config: &NodeConfig,
) -> Result<Axes, NodeError<S::Error>> {
    let mut sensor = baton.acquire().await?;
    sensor
        .calibrate(config.calibrate_auto_bias)
        .await
        .map_err(NodeError::Sensor)?;
    let reference = sensor.mag_initial().await.map_err(NodeError::Sensor)?;
    Ok(reference)
}

pub async fn calibration_task<B: Board, const K: usize>(
    node: &Node<B, K>,
) -> ! {
    loop {
        node.signals().calibration.wait().await;
        let reference = match calibrate(node.baton(), node.config()).await {
            Ok(reference) => reference,
            Err(e) => {
                // The gate stays shut and the watchdog starves.
                error!("IMU calibration failed: {:?}", e);
                fail_stop().await
            }
        };
        node.set_mag_reference(reference);
        let count = node.readiness().mark_ready();
        info!("Calibration complete, readiness {}", count);

        // Prime the data-ready lines with one read of each sensor.
        for kind in [SensorKind::Gyro, SensorKind::Accel, SensorKind::Mag] {
            match sample_once(node.baton(), node.readiness(), kind).await {
                Ok(Some(axes)) => node.record_reading(kind, axes),
                Ok(None) => {}
                Err(e) => warn!("{:?} priming read failed: {:?}", kind, e),
            }
        }
    }
}
