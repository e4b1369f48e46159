#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::future::Future;
use std::rc::Rc;

use embassy_futures::join::{join, join4};
use embassy_futures::select::{select, Either};
use embassy_futures::yield_now;
use imu_beacon_app::prelude::*;

// Host critical-section implementation for the node's blocking mutexes.
use critical_section as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFault;

pub const MAG_REFERENCE: Axes = Axes::new(120, -40, 380);

#[derive(Default)]
pub struct SensorLog {
    pub begun: bool,
    pub fail_begin: bool,
    pub interrupts: Vec<InterruptConfig>,
    pub calibrations: u32,
    pub reads: Vec<SensorKind>,
    pub in_flight: u32,
    pub max_in_flight: u32,
}

pub struct MockSensor(pub Rc<RefCell<SensorLog>>);

impl MockSensor {
    async fn bus_read(
        &mut self,
        kind: SensorKind,
        axes: Axes,
    ) -> Result<Axes, SensorFault> {
        {
            let mut log = self.0.borrow_mut();
            log.in_flight += 1;
            log.max_in_flight = log.max_in_flight.max(log.in_flight);
        }
        // Let any other task run mid-transaction.
        yield_now().await;
        let mut log = self.0.borrow_mut();
        log.in_flight -= 1;
        log.reads.push(kind);
        Ok(axes)
    }
}

impl ImuSensor for MockSensor {
    type Error = SensorFault;

    async fn begin(&mut self) -> Result<(), SensorFault> {
        let mut log = self.0.borrow_mut();
        if log.fail_begin {
            return Err(SensorFault);
        }
        log.begun = true;
        Ok(())
    }

    async fn configure_interrupt(
        &mut self,
        config: InterruptConfig,
    ) -> Result<(), SensorFault> {
        self.0.borrow_mut().interrupts.push(config);
        Ok(())
    }

    async fn calibrate(&mut self, _auto_bias: bool) -> Result<(), SensorFault> {
        self.0.borrow_mut().calibrations += 1;
        Ok(())
    }

    async fn read_gyro(&mut self) -> Result<Axes, SensorFault> {
        self.bus_read(SensorKind::Gyro, Axes::new(1, 2, 3)).await
    }

    async fn read_accel(&mut self) -> Result<Axes, SensorFault> {
        self.bus_read(SensorKind::Accel, Axes::new(0, 0, 1000)).await
    }

    async fn read_mag(&mut self) -> Result<Axes, SensorFault> {
        self.bus_read(SensorKind::Mag, Axes::new(7, 8, 9)).await
    }

    async fn mag_initial(&mut self) -> Result<Axes, SensorFault> {
        Ok(MAG_REFERENCE)
    }
}

#[derive(Default)]
pub struct RadioLog {
    pub phy: Option<PhyProfile>,
    pub power: Option<i8>,
    pub filter: Vec<NodeAddress>,
    pub sent: Vec<TxPacket>,
    pub arms: u32,
    pub aborts: u32,
    pub armed: bool,
    pub fail_transmit: bool,
}

pub struct MockRadio(pub Rc<RefCell<RadioLog>>);

impl Radio for MockRadio {
    async fn init(&mut self, phy: PhyProfile) -> Result<(), RadioError> {
        self.0.borrow_mut().phy = Some(phy);
        Ok(())
    }

    fn set_power(&mut self, dbm: i8) -> Result<(), RadioError> {
        self.0.borrow_mut().power = Some(dbm);
        Ok(())
    }

    fn enable_address_filter(
        &mut self,
        addresses: &[NodeAddress],
    ) -> Result<(), RadioError> {
        self.0.borrow_mut().filter = addresses.to_vec();
        Ok(())
    }

    async fn transmit(&mut self, packet: &TxPacket) -> Result<(), RadioError> {
        let mut log = self.0.borrow_mut();
        if log.fail_transmit {
            return Err(RadioError::Tx);
        }
        log.sent.push(packet.clone());
        Ok(())
    }

    fn receive_async(&mut self, _timeout_ticks: u32) -> Result<(), RadioError> {
        let mut log = self.0.borrow_mut();
        log.arms += 1;
        log.armed = true;
        Ok(())
    }

    fn abort(&mut self) -> Result<(), RadioError> {
        let mut log = self.0.borrow_mut();
        log.aborts += 1;
        log.armed = false;
        Ok(())
    }
}

#[derive(Default)]
pub struct WatchdogLog {
    pub reload: Option<u32>,
    pub clears: u32,
}

pub struct MockWatchdog(pub Rc<RefCell<WatchdogLog>>);

impl Watchdog for MockWatchdog {
    fn set_reload(&mut self, ticks: u32) {
        self.0.borrow_mut().reload = Some(ticks);
    }

    fn clear(&mut self) {
        self.0.borrow_mut().clears += 1;
    }
}

pub struct MockLeds(pub Rc<RefCell<Vec<Led>>>);

impl Indicators for MockLeds {
    fn toggle(&self, led: Led) {
        self.0.borrow_mut().push(led);
    }
}

pub struct MockBoard;

impl Board for MockBoard {
    type Sensor = MockSensor;
    type Radio = MockRadio;
    type Watchdog = MockWatchdog;
    type Indicators = MockLeds;
}

/// Handles onto the mocks moved into a node.
#[derive(Default, Clone)]
pub struct Mocks {
    pub sensor: Rc<RefCell<SensorLog>>,
    pub radio: Rc<RefCell<RadioLog>>,
    pub watchdog: Rc<RefCell<WatchdogLog>>,
    pub leds: Rc<RefCell<Vec<Led>>>,
}

pub fn node_with<const K: usize>(
    config: NodeConfig,
) -> (Node<MockBoard, K>, Mocks) {
    let mocks = Mocks::default();
    let node = Node::new(
        config,
        MockSensor(mocks.sensor.clone()),
        MockRadio(mocks.radio.clone()),
        MockWatchdog(mocks.watchdog.clone()),
        MockLeds(mocks.leds.clone()),
    );
    (node, mocks)
}

pub fn node() -> (Node<MockBoard>, Mocks) {
    node_with(default_node_settings())
}

/// Give every runnable task plenty of chances to reach its next wait.
pub async fn settle() {
    for _ in 0..64 {
        yield_now().await;
    }
}

/// Sampling, radio and beacon tasks; no bring-up.
pub async fn run_pipeline<const K: usize>(node: &Node<MockBoard, K>) {
    join(
        join4(
            mag_task(node),
            gyro_task(node),
            accel_task(node),
            transmit_task(node),
        ),
        join(restart_task(node), beacon_task(node)),
    )
    .await;
}

/// Every task, bring-up included.
pub async fn run_node<const K: usize>(node: &Node<MockBoard, K>) {
    join(
        run_pipeline(node),
        join(initialization_task(node), calibration_task(node)),
    )
    .await;
}

/// Run `scenario` while `tasks` keep the node going in the background.
pub async fn drive<T: Future, S: Future>(tasks: T, scenario: S) -> S::Output {
    match select(tasks, scenario).await {
        Either::First(_) => unreachable!("node tasks never return"),
        Either::Second(out) => out,
    }
}

#[derive(Default)]
pub struct UartIo {
    pub input: VecDeque<Vec<u8>>,
    pub output: Vec<u8>,
}

pub struct MockUart(pub Rc<RefCell<UartIo>>);

impl embedded_io_async::ErrorType for MockUart {
    type Error = Infallible;
}

impl embedded_io_async::Read for MockUart {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        loop {
            let chunk = self.0.borrow_mut().input.pop_front();
            match chunk {
                Some(chunk) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                None => yield_now().await,
            }
        }
    }
}

impl embedded_io_async::Write for MockUart {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
        self.0.borrow_mut().output.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// Delay that records each request and returns after one yield.
pub struct MockDelay(pub Rc<RefCell<Vec<u32>>>);

impl embedded_hal_async::delay::DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000).await
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().push(ms);
        yield_now().await;
    }
}
