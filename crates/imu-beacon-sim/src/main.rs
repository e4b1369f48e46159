//! Runs several simulated beacon nodes sharing one radio medium.
//!
//! `RUST_LOG=debug cargo run -p imu-beacon-sim` shows the full task traffic.

mod board;
mod ether;
mod gps;

use embassy_executor::Spawner;
use embassy_time::{Delay, Duration, Ticker, Timer};
use env_logger::Builder;
use imu_beacon_app::prelude::*;
use log::{info, LevelFilter};
use static_cell::StaticCell;

use board::{SimBoard, SimImu, SimLeds, SimWatchdog};
use ether::{Ether, Inbox};
use gps::SimGps;

// Host critical-section implementation.
use critical_section as _;

const NODES: usize = 3;
const ADDRESSES: [NodeAddress; NODES] = [PERSONAL_ADDRESS, 0xbc, 0xbd];
/// Spreads the nodes' beacons over the period so they hear each other.
const TICK_STAGGER_MS: u32 = 150;

type SimNode = Node<SimBoard>;

static ETHER: StaticCell<Ether> = StaticCell::new();
static INBOXES: StaticCell<[Inbox; NODES]> = StaticCell::new();
static SIM_NODES: StaticCell<[SimNode; NODES]> = StaticCell::new();

#[embassy_executor::task(pool_size = 3)]
async fn initialization(node: &'static SimNode) -> ! {
    initialization_task(node).await
}

#[embassy_executor::task(pool_size = 3)]
async fn calibration(node: &'static SimNode) -> ! {
    calibration_task(node).await
}

#[embassy_executor::task(pool_size = 3)]
async fn mag(node: &'static SimNode) -> ! {
    mag_task(node).await
}

#[embassy_executor::task(pool_size = 3)]
async fn gyro(node: &'static SimNode) -> ! {
    gyro_task(node).await
}

#[embassy_executor::task(pool_size = 3)]
async fn accel(node: &'static SimNode) -> ! {
    accel_task(node).await
}

#[embassy_executor::task(pool_size = 3)]
async fn transmit(node: &'static SimNode) -> ! {
    transmit_task(node).await
}

#[embassy_executor::task(pool_size = 3)]
async fn restart(node: &'static SimNode) -> ! {
    restart_task(node).await
}

#[embassy_executor::task(pool_size = 3)]
async fn beacon(node: &'static SimNode) -> ! {
    beacon_task(node).await
}

#[embassy_executor::task(pool_size = 3)]
async fn clock(node: &'static SimNode) -> ! {
    clock_task(node, Delay).await
}

#[embassy_executor::task]
async fn console(node: &'static SimNode) -> ! {
    console_task(node, SimGps::new()).await
}

/// Radio completion context: hands queued outcomes to the node.
#[embassy_executor::task(pool_size = 3)]
async fn radio_irq(node: &'static SimNode, inbox: &'static Inbox) -> ! {
    loop {
        let outcome = inbox.receive().await;
        node.on_rx_done(outcome);
    }
}

/// IMU data-ready lines: gyro and accel at 50 Hz, mag at 10 Hz.
#[embassy_executor::task(pool_size = 3)]
async fn imu_pins(node: &'static SimNode) -> ! {
    let mut ticker = Ticker::every(Duration::from_millis(20));
    let mut count: u32 = 0;
    loop {
        ticker.next().await;
        node.on_pin(InterruptLine::Gyro as u8);
        node.on_pin(InterruptLine::Accel as u8);
        if count % 5 == 0 {
            node.on_pin(InterruptLine::Mag as u8);
        }
        count = count.wrapping_add(1);
    }
}

#[embassy_executor::task]
async fn report(nodes: &'static [SimNode; NODES]) -> ! {
    loop {
        Timer::after_secs(5).await;
        for node in nodes {
            let readings = node.readings();
            let neighbors = node.neighbors();
            info!(
                "[{:#04x}] neighbours {:02x?} ({}/{}), rx {:?}, {} samples, \
                 gyro {:?}",
                node.config().personal_address,
                neighbors.as_slice(),
                neighbors.len(),
                neighbors.capacity(),
                node.rx_state(),
                readings.samples,
                readings.gyro
            );
        }
    }
}

fn node_config(index: usize) -> NodeConfig {
    let mut config = default_node_settings();
    config.personal_address = ADDRESSES[index];
    config.tick_offset_ms += TICK_STAGGER_MS * index as u32;
    config
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let ether: &'static Ether = ETHER.init(Ether::new());
    let inboxes: &'static [Inbox; NODES] =
        INBOXES.init(core::array::from_fn(|_| Inbox::new()));
    let nodes: &'static [SimNode; NODES] =
        SIM_NODES.init(core::array::from_fn(|i| {
            let address = ADDRESSES[i];
            Node::new(
                node_config(i),
                SimImu::new(),
                ether.attach(address, &inboxes[i]),
                SimWatchdog::new(address),
                SimLeds::new(address),
            )
        }));

    for (node, inbox) in nodes.iter().zip(inboxes.iter()) {
        info!("Starting node {:#04x}", node.config().personal_address);
        spawner.must_spawn(radio_irq(node, inbox));
        spawner.must_spawn(initialization(node));
        spawner.must_spawn(calibration(node));
        spawner.must_spawn(mag(node));
        spawner.must_spawn(gyro(node));
        spawner.must_spawn(accel(node));
        spawner.must_spawn(transmit(node));
        spawner.must_spawn(restart(node));
        spawner.must_spawn(beacon(node));
        spawner.must_spawn(clock(node));
        spawner.must_spawn(imu_pins(node));
    }
    spawner.must_spawn(console(&nodes[0]));
    spawner.must_spawn(report(nodes));
}
