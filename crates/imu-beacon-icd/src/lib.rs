#![no_std]
//! Interface control definitions shared by every node: addresses, the
//! over-the-air packet layout and the node configuration.

macro_rules! define_config_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),*
        }

        impl TryFrom<u8> for $name {
            type Error = ConfigError;
            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(Self::$variant),)*
                    _ => Err(ConfigError::InvalidDiscriminant(value)),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }
    };
}

mod config;
pub use config::*;

mod packet;
pub use packet::*;

/// One-byte node address as carried in the address filter and beacons.
pub type NodeAddress = u8;

/// Address every node accepts; beacons are sent here.
pub const UNIVERSAL_ADDRESS: NodeAddress = 0xaa;
/// Default personal address of a node.
pub const PERSONAL_ADDRESS: NodeAddress = 0xbb;

/// Size of the destination address field in a radio packet.
pub const DST_ADDR_LEN: usize = 8;
/// Largest payload the radio link carries.
pub const MAX_PAYLOAD_LENGTH: usize = 128;
/// Fixed payload length of a beacon.
pub const BEACON_PAYLOAD_LENGTH: usize = 29;

/// Payload byte 0 of a beacon.
pub const BEACON_TAG: u8 = 0x01;
