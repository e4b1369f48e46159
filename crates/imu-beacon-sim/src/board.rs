//! Simulated IMU, watchdog and LEDs.

use embassy_time::{Instant, Timer};
use imu_beacon_app::prelude::*;
use log::{debug, trace, warn};

use crate::ether::SimRadio;

pub struct SimBoard;

impl Board for SimBoard {
    type Sensor = SimImu;
    type Radio = SimRadio;
    type Watchdog = SimWatchdog;
    type Indicators = SimLeds;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimImuError {
    NotStarted,
}

/// Produces a slowly drifting signal on every axis.
pub struct SimImu {
    started: bool,
    step: i16,
}

impl SimImu {
    pub const fn new() -> Self {
        Self { started: false, step: 0 }
    }

    async fn sample(&mut self, scale: i16) -> Result<Axes, SimImuError> {
        if !self.started {
            return Err(SimImuError::NotStarted);
        }
        // One register burst on the bus.
        Timer::after_micros(200).await;
        self.step = self.step.wrapping_add(1);
        let s = self.step % 64;
        Ok(Axes::new(s * scale, -s * scale, 1000))
    }
}

impl ImuSensor for SimImu {
    type Error = SimImuError;

    async fn begin(&mut self) -> Result<(), SimImuError> {
        Timer::after_millis(10).await;
        self.started = true;
        Ok(())
    }

    async fn configure_interrupt(
        &mut self,
        config: InterruptConfig,
    ) -> Result<(), SimImuError> {
        debug!("IMU interrupt {:?} on {:?}", config.source, config.pin);
        Ok(())
    }

    async fn calibrate(&mut self, auto_bias: bool) -> Result<(), SimImuError> {
        if !self.started {
            return Err(SimImuError::NotStarted);
        }
        debug!("IMU calibrating, auto bias {}", auto_bias);
        Timer::after_millis(250).await;
        Ok(())
    }

    async fn read_gyro(&mut self) -> Result<Axes, SimImuError> {
        self.sample(3).await
    }

    async fn read_accel(&mut self) -> Result<Axes, SimImuError> {
        self.sample(5).await
    }

    async fn read_mag(&mut self) -> Result<Axes, SimImuError> {
        self.sample(7).await
    }

    async fn mag_initial(&mut self) -> Result<Axes, SimImuError> {
        self.sample(7).await
    }
}

/// Logs the time between clears against the reload period.
pub struct SimWatchdog {
    node: NodeAddress,
    reload_ticks: u32,
    last_clear: Option<Instant>,
}

impl SimWatchdog {
    pub const fn new(node: NodeAddress) -> Self {
        Self { node, reload_ticks: 0, last_clear: None }
    }
}

impl Watchdog for SimWatchdog {
    fn set_reload(&mut self, ticks: u32) {
        debug!("[{:#04x}] watchdog reload {} ticks", self.node, ticks);
        self.reload_ticks = ticks;
    }

    fn clear(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_clear {
            trace!(
                "[{:#04x}] watchdog cleared after {} ms",
                self.node,
                (now - last).as_millis()
            );
        } else if self.reload_ticks == 0 {
            warn!("[{:#04x}] watchdog cleared before it was armed", self.node);
        }
        self.last_clear = Some(now);
    }
}

pub struct SimLeds {
    node: NodeAddress,
}

impl SimLeds {
    pub const fn new(node: NodeAddress) -> Self {
        Self { node }
    }
}

impl Indicators for SimLeds {
    fn toggle(&self, led: Led) {
        trace!("[{:#04x}] {:?} LED toggled", self.node, led);
    }
}
