//! A shared broadcast medium connecting the simulated radios.
//!
//! A transmission reaches every other station that is armed and whose
//! address filter accepts the destination. Completions are queued in the
//! station's inbox and handed to its node by the radio interrupt task.

use std::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Instant, Timer};
use imu_beacon_app::prelude::*;
use log::{debug, info, trace, warn};

pub const INBOX_DEPTH: usize = 4;
/// Completions awaiting delivery to one node.
pub type Inbox = Channel<CriticalSectionRawMutex, RxOutcome, INBOX_DEPTH>;

/// Time a beacon spends on air.
const AIRTIME_MS: u64 = 2;

struct Station {
    address: NodeAddress,
    filter: Vec<NodeAddress>,
    armed: bool,
    inbox: &'static Inbox,
}

pub struct Ether {
    stations: BlockingMutex<CriticalSectionRawMutex, RefCell<Vec<Station>>>,
}

impl Ether {
    pub const fn new() -> Self {
        Self { stations: BlockingMutex::new(RefCell::new(Vec::new())) }
    }

    /// Add a station and return its radio.
    pub fn attach(
        &'static self,
        address: NodeAddress,
        inbox: &'static Inbox,
    ) -> SimRadio {
        let station = self.stations.lock(|stations| {
            let mut stations = stations.borrow_mut();
            stations.push(Station {
                address,
                filter: Vec::new(),
                armed: false,
                inbox,
            });
            stations.len() - 1
        });
        SimRadio { ether: self, station, power_dbm: 0 }
    }

    fn with_station<R>(
        &self,
        station: usize,
        f: impl FnOnce(&mut Station) -> R,
    ) -> R {
        self.stations.lock(|stations| f(&mut stations.borrow_mut()[station]))
    }

    /// Deliver `packet` to every listening station but the sender.
    fn broadcast(&self, from: usize, packet: &TxPacket, rssi: i8) -> usize {
        let abs_time = Instant::now().as_ticks() as u32;
        self.stations.lock(|stations| {
            let mut delivered = 0;
            let mut stations = stations.borrow_mut();
            for (index, station) in stations.iter_mut().enumerate() {
                if index == from || !station.armed {
                    continue;
                }
                if !station.filter.contains(&packet.destination()) {
                    trace!(
                        "[{:#04x}] filtered packet for {:#04x}",
                        station.address,
                        packet.destination()
                    );
                    continue;
                }
                station.armed = false;
                let heard = InboundPacket::from_air(packet, rssi, abs_time);
                let outcome = RxOutcome::Success(heard);
                if station.inbox.try_send(outcome).is_err() {
                    warn!("[{:#04x}] radio inbox full", station.address);
                }
                delivered += 1;
            }
            delivered
        })
    }
}

pub struct SimRadio {
    ether: &'static Ether,
    station: usize,
    power_dbm: i8,
}

impl SimRadio {
    fn address(&self) -> NodeAddress {
        self.ether.with_station(self.station, |s| s.address)
    }
}

impl Radio for SimRadio {
    async fn init(&mut self, phy: PhyProfile) -> Result<(), RadioError> {
        info!("[{:#04x}] radio up, {:?} PHY", self.address(), phy);
        Ok(())
    }

    fn set_power(&mut self, dbm: i8) -> Result<(), RadioError> {
        if !(-20..=14).contains(&dbm) {
            return Err(RadioError::Param);
        }
        self.power_dbm = dbm;
        Ok(())
    }

    fn enable_address_filter(
        &mut self,
        addresses: &[NodeAddress],
    ) -> Result<(), RadioError> {
        self.ether
            .with_station(self.station, |s| s.filter = addresses.to_vec());
        Ok(())
    }

    async fn transmit(&mut self, packet: &TxPacket) -> Result<(), RadioError> {
        Timer::after_millis(AIRTIME_MS).await;
        // Stronger transmitters are heard louder.
        let rssi = -90 + self.power_dbm * 2;
        let delivered = self.ether.broadcast(self.station, packet, rssi);
        debug!("[{:#04x}] beacon heard by {}", self.address(), delivered);
        Ok(())
    }

    fn receive_async(&mut self, _timeout_ticks: u32) -> Result<(), RadioError> {
        self.ether.with_station(self.station, |s| s.armed = true);
        Ok(())
    }

    fn abort(&mut self) -> Result<(), RadioError> {
        self.ether.with_station(self.station, |s| {
            if s.armed {
                s.armed = false;
                if s.inbox.try_send(RxOutcome::Aborted).is_err() {
                    warn!("[{:#04x}] radio inbox full", s.address);
                }
            }
        });
        Ok(())
    }
}
