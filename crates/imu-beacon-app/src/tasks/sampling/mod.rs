pub(crate) mod events;

mod tasks;

pub use events::*;
pub use tasks::*;

use crate::hal::Axes;

/// Latest raw sample of each sensor plus the calibration reference.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImuReadings {
    pub gyro: Axes,
    pub accel: Axes,
    pub mag: Axes,
    pub mag_reference: Axes,
    /// Successful reads since start-up, all sensors together.
    pub samples: u32,
}

impl ImuReadings {
    pub fn record(&mut self, kind: SensorKind, axes: Axes) {
        match kind {
            SensorKind::Gyro => self.gyro = axes,
            SensorKind::Accel => self.accel = axes,
            SensorKind::Mag => self.mag = axes,
        }
        self.samples = self.samples.wrapping_add(1);
    }
}
