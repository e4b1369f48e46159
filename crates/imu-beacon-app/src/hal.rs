//! Interfaces of the collaborators the node drives but does not implement:
//! the IMU, the radio, the watchdog and the status LEDs.
//!
//! A concrete board bundles one implementation of each through [`Board`].

use imu_beacon_icd::{InterruptConfig, NodeAddress, PhyProfile, TxPacket};

use crate::util::Loggable;

/// One raw three-axis sample.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Axes {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Axes {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

/// 9-DoF IMU sitting on the shared sensor bus.
///
/// Every method performs bus traffic, so callers must hold the baton.
#[allow(async_fn_in_trait)]
pub trait ImuSensor {
    type Error: Loggable;

    /// Probe the device and load its default configuration.
    async fn begin(&mut self) -> Result<(), Self::Error>;
    async fn configure_interrupt(
        &mut self,
        config: InterruptConfig,
    ) -> Result<(), Self::Error>;
    /// Collect bias offsets while the node is at rest.
    async fn calibrate(&mut self, auto_bias: bool) -> Result<(), Self::Error>;
    async fn read_gyro(&mut self) -> Result<Axes, Self::Error>;
    async fn read_accel(&mut self) -> Result<Axes, Self::Error>;
    async fn read_mag(&mut self) -> Result<Axes, Self::Error>;
    /// Magnetic field reference captured after calibration.
    async fn mag_initial(&mut self) -> Result<Axes, Self::Error>;
}

/// Failure statuses a radio driver may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    Config,
    Param,
    Mem,
    Cmd,
    Tx,
    Rx,
    RxBuffer,
    Busy,
}

/// Low-power packet radio.
///
/// `receive_async` only arms the receiver. The driver reports the outcome of
/// every armed receive exactly once by calling
/// [`Node::on_rx_done`](crate::Node::on_rx_done) from its completion
/// context, and never has more than one completion in flight.
#[allow(async_fn_in_trait)]
pub trait Radio {
    async fn init(&mut self, phy: PhyProfile) -> Result<(), RadioError>;
    fn set_power(&mut self, dbm: i8) -> Result<(), RadioError>;
    fn enable_address_filter(
        &mut self,
        addresses: &[NodeAddress],
    ) -> Result<(), RadioError>;
    async fn transmit(&mut self, packet: &TxPacket) -> Result<(), RadioError>;
    /// Arm an asynchronous receive. A `timeout_ticks` of 0 waits forever.
    fn receive_async(&mut self, timeout_ticks: u32) -> Result<(), RadioError>;
    /// Cancel any armed receive without waiting for its completion.
    fn abort(&mut self) -> Result<(), RadioError>;
}

/// Hardware watchdog.
pub trait Watchdog {
    fn set_reload(&mut self, ticks: u32);
    fn clear(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Led {
    Red,
    Green,
}

/// Diagnostic outputs. Not needed for correctness.
pub trait Indicators {
    fn toggle(&self, led: Led);
}

impl Indicators for () {
    fn toggle(&self, _led: Led) {}
}

/// The set of concrete collaborators a node runs on.
pub trait Board {
    type Sensor: ImuSensor;
    type Radio: Radio;
    type Watchdog: Watchdog;
    type Indicators: Indicators;
}
