use super::*;
use crate::prelude::*;

/// Read `kind` once under the baton. `Ok(None)` when the gate is closed.
pub(crate) async fn sample_once<S: ImuSensor>(
    baton: &SensorBaton<S>,
    readiness: &ReadinessGate,
    kind: SensorKind,
) -> Result<Option<Axes>, NodeError<S::Error>> {
    // The guard drops on every path out of here, gate closed or not.
    let mut sensor = baton.acquire().await?;
    if !readiness.is_ready() {
        return Ok(None);
    }
    let axes = match kind {
        SensorKind::Gyro => sensor.read_gyro().await,
        SensorKind::Accel => sensor.read_accel().await,
        SensorKind::Mag => sensor.read_mag().await,
    }
    .map_err(NodeError::Sensor)?;
    Ok(Some(axes))
}

/// Wait on the sensor's own interrupt signal, then take the baton for a
/// single read.
pub async fn sampling_task<B: Board, const K: usize>(
    node: &Node<B, K>,
    kind: SensorKind,
) -> ! {
    let signal = node.signals().sensor(kind);
    loop {
        signal.wait().await;
        match sample_once(node.baton(), node.readiness(), kind).await {
            Ok(Some(axes)) => node.record_reading(kind, axes),
            Ok(None) => trace!("{:?} interrupt before calibration", kind),
            Err(e) => warn!("{:?} read failed: {:?}", kind, e),
        }
    }
}

pub async fn mag_task<B: Board, const K: usize>(node: &Node<B, K>) -> ! {
    sampling_task(node, SensorKind::Mag).await
}

pub async fn gyro_task<B: Board, const K: usize>(node: &Node<B, K>) -> ! {
    sampling_task(node, SensorKind::Gyro).await
}

pub async fn accel_task<B: Board, const K: usize>(node: &Node<B, K>) -> ! {
    sampling_task(node, SensorKind::Accel).await
}
