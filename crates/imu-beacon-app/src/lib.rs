#![cfg_attr(not(test), no_std)]
//! Concurrency and protocol core of an IMU beacon node.
//!
//! A [`Node`] owns every piece of shared state. The task functions in
//! [`tasks`] each borrow the node and loop forever; a board crate spawns
//! them on its executor and forwards interrupts, clock ticks and radio
//! completions through the node's `on_*` methods.

#[macro_use]
mod util;

pub mod error;
pub mod hal;
mod node;
pub mod readiness;
pub mod signal;
pub mod tasks;

use baton::Baton;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

pub use error::*;
pub use node::{Node, Signals};
pub use util::Loggable;

/// Raw mutex for state shared with interrupt and driver contexts.
pub type NodeMutex = CriticalSectionRawMutex;

/// Tasks that may queue for the sensor bus at once.
pub const BATON_QUEUE_DEPTH: usize = 8;
/// Default neighbour table capacity.
pub const NEIGHBOR_CAPACITY: usize = 16;
/// Received beacons awaiting processing.
pub const BEACON_QUEUE_DEPTH: usize = 4;

/// The baton guarding the IMU bus.
pub type SensorBaton<S> = Baton<NodeMutex, S, BATON_QUEUE_DEPTH>;

/// Stop making progress. Used for unrecoverable bring-up failures; the
/// watchdog is no longer fed and resets the node.
pub async fn fail_stop() -> ! {
    error!("Fail-stop, waiting for watchdog reset");
    loop {
        core::future::pending::<()>().await;
    }
}

pub mod prelude {
    pub use super::{
        fail_stop, hal::*, readiness::ReadinessGate, signal::*, tasks::*,
        LinkError, Node, NodeError, NodeMutex, SensorBaton, Signals,
        BATON_QUEUE_DEPTH, BEACON_QUEUE_DEPTH, NEIGHBOR_CAPACITY,
    };
    pub use baton::{Baton, BatonError, BatonGuard};
    pub use embassy_sync::mutex::Mutex;

    pub use imu_beacon_icd::{self as icd, *};
}
