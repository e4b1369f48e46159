use serde::{Deserialize, Serialize};

use crate::{NodeAddress, PERSONAL_ADDRESS, UNIVERSAL_ADDRESS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    InvalidDiscriminant(u8),
}

define_config_enum!(
    /// Radio PHY settings selected at radio bring-up.
    PhyProfile {
        Custom = 0,
        Fsk50Kbps = 1,
        LongRange625Bps = 2,
    }
);

define_config_enum!(
    /// What the receive path does after the driver reports an error.
    RxErrorPolicy {
        /// Re-arm the receiver right away.
        Restart = 0,
        /// Leave the receiver idle until another path re-arms it.
        Stall = 1,
    }
);

define_config_enum!(
    /// IMU interrupt output pin.
    InterruptPin {
        Int1 = 0,
        Int2 = 1,
    }
);

define_config_enum!(
    InterruptSource {
        GyroDataReady = 0,
        AccelDataReady = 1,
        MagDataReady = 2,
    }
);

define_config_enum!(
    InterruptPolarity {
        ActiveHigh = 0,
        ActiveLow = 1,
    }
);

define_config_enum!(
    InterruptDrive {
        PushPull = 0,
        OpenDrain = 1,
    }
);

/// Routing of one IMU data-ready interrupt.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptConfig {
    pub pin: InterruptPin,
    pub source: InterruptSource,
    pub polarity: InterruptPolarity,
    pub drive: InterruptDrive,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeConfig {
    // Addressing
    pub personal_address: NodeAddress,
    pub universal_address: NodeAddress,

    // Radio
    pub phy: PhyProfile,
    pub tx_power_dbm: i8,
    pub rx_timeout_ticks: u32, // 0 disables the driver timeout
    pub rx_stall_ticks: u32,   // clock ticks a receive may stay armed
    pub rx_error_policy: RxErrorPolicy,

    // Clock
    pub tick_period_ms: u32,
    pub tick_offset_ms: u32,
    pub watchdog_reload_ticks: u32,

    // IMU
    pub calibrate_auto_bias: bool,
    pub gyro_interrupt: InterruptConfig,
    pub accel_interrupt: InterruptConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            personal_address: PERSONAL_ADDRESS,
            universal_address: UNIVERSAL_ADDRESS,

            phy: PhyProfile::Custom,
            tx_power_dbm: 12,
            rx_timeout_ticks: 0,
            // 20 ticks at 500 ms: ten seconds without any completion.
            rx_stall_ticks: 20,
            rx_error_policy: RxErrorPolicy::Restart,

            tick_period_ms: 500,
            tick_offset_ms: 5,
            watchdog_reload_ticks: 3_000_000,

            calibrate_auto_bias: true,
            gyro_interrupt: InterruptConfig {
                pin: InterruptPin::Int1,
                source: InterruptSource::GyroDataReady,
                polarity: InterruptPolarity::ActiveHigh,
                drive: InterruptDrive::PushPull,
            },
            accel_interrupt: InterruptConfig {
                pin: InterruptPin::Int2,
                source: InterruptSource::AccelDataReady,
                polarity: InterruptPolarity::ActiveHigh,
                drive: InterruptDrive::PushPull,
            },
        }
    }
}

impl NodeConfig {
    /// Addresses the receive filter accepts, universal first.
    pub fn address_filter(&self) -> [NodeAddress; 2] {
        [self.universal_address, self.personal_address]
    }
}

pub fn default_node_settings() -> NodeConfig {
    NodeConfig::default()
}
