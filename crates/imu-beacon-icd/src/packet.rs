use heapless::Vec;

use crate::{
    NodeAddress, BEACON_PAYLOAD_LENGTH, BEACON_TAG, DST_ADDR_LEN,
    MAX_PAYLOAD_LENGTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Payload of the given length does not fit the radio buffer.
    PayloadTooLong(usize),
    /// Payload is shorter than the message kind requires.
    Truncated(usize),
    /// Payload carries a different message kind tag.
    NotABeacon(u8),
}

impl core::fmt::Display for PacketError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PacketError::PayloadTooLong(len) => {
                write!(
                    f,
                    "payload of {} bytes exceeds {}",
                    len, MAX_PAYLOAD_LENGTH
                )
            }
            PacketError::Truncated(len) => {
                write!(f, "payload of {} bytes is truncated", len)
            }
            PacketError::NotABeacon(tag) => {
                write!(f, "message tag 0x{:02x} is not a beacon", tag)
            }
        }
    }
}

/// Message kind carried in payload byte 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageKind {
    Beacon,
    Other(u8),
}

impl From<u8> for MessageKind {
    fn from(value: u8) -> Self {
        match value {
            BEACON_TAG => MessageKind::Beacon,
            other => MessageKind::Other(other),
        }
    }
}

impl From<MessageKind> for u8 {
    fn from(kind: MessageKind) -> u8 {
        match kind {
            MessageKind::Beacon => BEACON_TAG,
            MessageKind::Other(tag) => tag,
        }
    }
}

/// Outbound radio packet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxPacket {
    pub dst_addr: [u8; DST_ADDR_LEN],
    /// Absolute radio time to send at, 0 sends immediately.
    pub abs_time: u32,
    pub payload: Vec<u8, MAX_PAYLOAD_LENGTH>,
}

impl TxPacket {
    pub fn new(dst: NodeAddress, payload: &[u8]) -> Result<Self, PacketError> {
        let payload = Vec::from_slice(payload)
            .map_err(|_| PacketError::PayloadTooLong(payload.len()))?;
        let mut dst_addr = [0; DST_ADDR_LEN];
        dst_addr[0] = dst;
        Ok(Self { dst_addr, abs_time: 0, payload })
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn destination(&self) -> NodeAddress {
        self.dst_addr[0]
    }
}

/// Snapshot of a packet reported by the radio driver on receive completion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InboundPacket {
    pub dst_addr: [u8; DST_ADDR_LEN],
    pub rssi: i8,
    pub abs_time: u32,
    pub rx_timeout: u32,
    pub payload: Vec<u8, MAX_PAYLOAD_LENGTH>,
}

impl InboundPacket {
    pub fn new(dst: NodeAddress, payload: &[u8]) -> Result<Self, PacketError> {
        let TxPacket { dst_addr, payload, .. } = TxPacket::new(dst, payload)?;
        Ok(Self { dst_addr, rssi: 0, abs_time: 0, rx_timeout: 0, payload })
    }

    /// What a receiver sees of `packet` once it has crossed the air.
    pub fn from_air(packet: &TxPacket, rssi: i8, abs_time: u32) -> Self {
        Self {
            dst_addr: packet.dst_addr,
            rssi,
            abs_time,
            rx_timeout: 0,
            payload: packet.payload.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn destination(&self) -> NodeAddress {
        self.dst_addr[0]
    }

    /// Kind from the first payload byte, `None` for an empty payload.
    pub fn kind(&self) -> Option<MessageKind> {
        self.payload.first().copied().map(MessageKind::from)
    }

    pub fn is_beacon(&self) -> bool {
        self.kind() == Some(MessageKind::Beacon)
    }
}

/// Discovery message announcing its sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Beacon {
    pub sender: NodeAddress,
}

impl Beacon {
    pub const fn new(sender: NodeAddress) -> Self {
        Self { sender }
    }

    /// Fixed-length payload: tag, sender, zero padding.
    pub fn payload(&self) -> [u8; BEACON_PAYLOAD_LENGTH] {
        let mut payload = [0; BEACON_PAYLOAD_LENGTH];
        payload[0] = BEACON_TAG;
        payload[1] = self.sender;
        payload
    }

    pub fn to_packet(&self, dst: NodeAddress) -> TxPacket {
        let mut dst_addr = [0; DST_ADDR_LEN];
        dst_addr[0] = dst;
        let mut payload = Vec::new();
        // BEACON_PAYLOAD_LENGTH < MAX_PAYLOAD_LENGTH, the copy always fits.
        let _ = payload.extend_from_slice(&self.payload());
        TxPacket { dst_addr, abs_time: 0, payload }
    }
}

impl TryFrom<&InboundPacket> for Beacon {
    type Error = PacketError;

    fn try_from(packet: &InboundPacket) -> Result<Self, Self::Error> {
        match packet.payload.as_slice() {
            [BEACON_TAG, sender, ..] => Ok(Beacon::new(*sender)),
            [BEACON_TAG] | [] => Err(PacketError::Truncated(packet.len())),
            [tag, ..] => Err(PacketError::NotABeacon(*tag)),
        }
    }
}
