use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_sync::mutex::Mutex;
use imu_beacon_icd::{Beacon, InboundPacket, NodeConfig, PacketError};

use crate::hal::{Axes, Board, Indicators, Led, Watchdog};
use crate::readiness::ReadinessGate;
use crate::signal::{Posted, WorkSignal};
use crate::tasks::radio::{
    Insertion, NeighborTable, ReceiveStateMachine, RxDispatch, RxOutcome,
    RxState,
};
use crate::tasks::sampling::{ImuReadings, InterruptLine, SensorKind};
use crate::tasks::Tick;
use crate::{
    NodeMutex, SensorBaton, BEACON_QUEUE_DEPTH, NEIGHBOR_CAPACITY,
};

/// Wake-up signals, one per consuming task.
pub struct Signals {
    pub initialization: WorkSignal<NodeMutex>,
    pub calibration: WorkSignal<NodeMutex>,
    pub mag: WorkSignal<NodeMutex>,
    pub gyro: WorkSignal<NodeMutex>,
    pub accel: WorkSignal<NodeMutex>,
    pub transmit: WorkSignal<NodeMutex>,
    pub restart: WorkSignal<NodeMutex>,
}

impl Signals {
    const fn new() -> Self {
        Self {
            // Bring-up runs once at start.
            initialization: WorkSignal::with_pending(1),
            calibration: WorkSignal::new(),
            mag: WorkSignal::new(),
            gyro: WorkSignal::new(),
            accel: WorkSignal::new(),
            transmit: WorkSignal::new(),
            restart: WorkSignal::new(),
        }
    }

    pub fn sensor(&self, kind: SensorKind) -> &WorkSignal<NodeMutex> {
        match kind {
            SensorKind::Mag => &self.mag,
            SensorKind::Gyro => &self.gyro,
            SensorKind::Accel => &self.accel,
        }
    }
}

/// All state of one node. Tasks borrow it; interrupt and driver contexts
/// enter through the `on_*` methods.
pub struct Node<B: Board, const K: usize = NEIGHBOR_CAPACITY> {
    config: NodeConfig,
    readiness: ReadinessGate,
    signals: Signals,
    baton: SensorBaton<B::Sensor>,
    radio: Mutex<NodeMutex, B::Radio>,
    rx: BlockingMutex<NodeMutex, RefCell<ReceiveStateMachine>>,
    beacons: Channel<NodeMutex, InboundPacket, BEACON_QUEUE_DEPTH>,
    // Written only by the beacon task.
    neighbors: BlockingMutex<NodeMutex, RefCell<NeighborTable<K>>>,
    readings: BlockingMutex<NodeMutex, RefCell<ImuReadings>>,
    watchdog: BlockingMutex<NodeMutex, RefCell<B::Watchdog>>,
    indicators: B::Indicators,
}

impl<B: Board, const K: usize> Node<B, K> {
    /// Assemble a node and arm its watchdog.
    pub fn new(
        config: NodeConfig,
        sensor: B::Sensor,
        radio: B::Radio,
        mut watchdog: B::Watchdog,
        indicators: B::Indicators,
    ) -> Self {
        watchdog.set_reload(config.watchdog_reload_ticks);
        info!(
            "Node {:#x} armed watchdog for {} ticks",
            config.personal_address,
            config.watchdog_reload_ticks
        );
        let rx = ReceiveStateMachine::new(
            config.rx_error_policy,
            config.rx_stall_ticks,
        );
        Self {
            readiness: ReadinessGate::new(),
            signals: Signals::new(),
            baton: SensorBaton::new(sensor),
            radio: Mutex::new(radio),
            rx: BlockingMutex::new(RefCell::new(rx)),
            beacons: Channel::new(),
            neighbors: BlockingMutex::new(RefCell::new(NeighborTable::new())),
            readings: BlockingMutex::new(RefCell::new(ImuReadings::default())),
            watchdog: BlockingMutex::new(RefCell::new(watchdog)),
            indicators,
            config,
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn readiness(&self) -> &ReadinessGate {
        &self.readiness
    }

    pub fn signals(&self) -> &Signals {
        &self.signals
    }

    pub fn baton(&self) -> &SensorBaton<B::Sensor> {
        &self.baton
    }

    pub fn radio(&self) -> &Mutex<NodeMutex, B::Radio> {
        &self.radio
    }

    /// Sensor data-ready interrupt.
    pub fn on_interrupt(&self, line: InterruptLine) -> Posted {
        let kind = SensorKind::from(line);
        let posted = self.signals.sensor(kind).post();
        if posted == Posted::Coalesced {
            debug!("{:?} interrupts coalesced", kind);
        }
        posted
    }

    /// Raw pin callback. Pins not wired to the IMU are ignored.
    pub fn on_pin(&self, pin: u8) -> Option<Posted> {
        InterruptLine::try_from(pin).ok().map(|line| self.on_interrupt(line))
    }

    /// Receive completion, called by the radio driver.
    pub fn on_rx_done(&self, outcome: RxOutcome) {
        let transition = self.with_receiver(|rx| rx.complete(outcome));
        self.indicate(transition.toggle);
        match transition.dispatch {
            RxDispatch::Beacon(packet) => {
                let sent = self.beacons.try_send(packet);
                if let Err(TrySendError::Full(_)) = sent {
                    warn!("Beacon queue full, beacon dropped");
                    self.with_receiver(|rx| rx.note_dropped());
                    self.signals.restart.post();
                }
            }
            RxDispatch::Restart => {
                self.signals.restart.post();
            }
            RxDispatch::Stay => {
                warn!("Receive error, receiver left idle");
            }
            RxDispatch::Stale => {
                trace!("Completion of a cancelled receive ignored");
            }
        }
    }

    /// Periodic clock tick: stall monitor, then gated watchdog feed and
    /// beacon request.
    pub fn on_tick(&self) -> Tick {
        let stalled = self.with_receiver(|rx| rx.note_tick());
        if stalled {
            warn!("Receive stalled, restarting");
            self.signals.restart.post();
        }
        let fed = self.readiness.is_ready();
        if fed {
            self.watchdog.lock(|wd| wd.borrow_mut().clear());
            self.signals.transmit.post();
        }
        Tick { fed, stalled }
    }

    pub(crate) async fn next_beacon(&self) -> InboundPacket {
        self.beacons.receive().await
    }

    /// Beacons handed off but not yet processed.
    pub fn pending_beacons(&self) -> usize {
        self.beacons.len()
    }

    /// Record the sender of `packet` and request a restart.
    pub fn process_beacon(
        &self,
        packet: &InboundPacket,
    ) -> Result<Insertion, PacketError> {
        let beacon = match Beacon::try_from(packet) {
            Ok(beacon) => beacon,
            Err(e) => {
                warn!("Malformed beacon: {:?}", e);
                self.signals.restart.post();
                return Err(e);
            }
        };
        let insertion = self
            .neighbors
            .lock(|table| table.borrow_mut().insert(beacon.sender));
        match insertion {
            Insertion::Added => info!("New neighbour {:#x}", beacon.sender),
            Insertion::Known => {
                trace!("Beacon from known neighbour {:#x}", beacon.sender)
            }
            Insertion::Full => {
                debug!("Neighbour table full, {:#x} dropped", beacon.sender)
            }
        }
        self.signals.restart.post();
        Ok(insertion)
    }

    pub fn neighbors(&self) -> NeighborTable<K> {
        self.neighbors.lock(|table| table.borrow().clone())
    }

    pub fn readings(&self) -> ImuReadings {
        self.readings.lock(|readings| *readings.borrow())
    }

    pub(crate) fn record_reading(&self, kind: SensorKind, axes: Axes) {
        self.readings.lock(|readings| readings.borrow_mut().record(kind, axes));
    }

    pub(crate) fn set_mag_reference(&self, reference: Axes) {
        self.readings
            .lock(|readings| readings.borrow_mut().mag_reference = reference);
    }

    pub fn rx_state(&self) -> RxState {
        self.with_receiver(|rx| rx.state())
    }

    pub fn last_packet(&self) -> Option<InboundPacket> {
        self.with_receiver(|rx| rx.last_packet().cloned())
    }

    pub fn dropped_beacons(&self) -> u32 {
        self.with_receiver(|rx| rx.dropped())
    }

    pub(crate) fn with_receiver<R>(
        &self,
        f: impl FnOnce(&mut ReceiveStateMachine) -> R,
    ) -> R {
        self.rx.lock(|rx| f(&mut rx.borrow_mut()))
    }

    pub(crate) fn indicate(&self, leds: &[Led]) {
        for &led in leds {
            self.indicators.toggle(led);
        }
    }
}
