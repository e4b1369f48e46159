use heapless::Vec;
use imu_beacon_icd::NodeAddress;

/// Result of offering an address to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Insertion {
    Added,
    Known,
    /// New address, but no room left. The address is dropped.
    Full,
}

/// Append-only set of addresses heard in beacons, at most `K` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborTable<const K: usize> {
    entries: Vec<NodeAddress, K>,
}

impl<const K: usize> NeighborTable<K> {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn insert(&mut self, address: NodeAddress) -> Insertion {
        if self.contains(address) {
            return Insertion::Known;
        }
        match self.entries.push(address) {
            Ok(()) => Insertion::Added,
            Err(_) => Insertion::Full,
        }
    }

    pub fn contains(&self, address: NodeAddress) -> bool {
        self.entries.iter().any(|&known| known == address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }

    pub const fn capacity(&self) -> usize {
        K
    }

    /// Addresses in the order they were first heard.
    pub fn as_slice(&self) -> &[NodeAddress] {
        &self.entries
    }
}
