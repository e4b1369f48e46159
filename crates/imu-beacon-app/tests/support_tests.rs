mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use embassy_futures::select::{select, Either};
use embassy_futures::yield_now;
use imu_beacon_app::prelude::*;

// ---------------------------------------------------------------------------
// Work signals and the readiness gate
// ---------------------------------------------------------------------------

#[futures_test::test]
async fn posts_are_drained_one_per_wait() {
    let signal: WorkSignal<NodeMutex> = WorkSignal::new();

    assert_eq!(signal.post(), Posted::Queued);
    assert_eq!(signal.post(), Posted::Queued);
    assert_eq!(signal.pending(), 2);

    signal.wait().await;
    assert_eq!(signal.pending(), 1);
    assert!(signal.try_take());
    assert!(!signal.try_take());
}

#[futures_test::test]
async fn saturated_signal_coalesces() {
    let signal: WorkSignal<NodeMutex> = WorkSignal::with_pending(MAX_PENDING);

    assert_eq!(signal.post(), Posted::Coalesced);
    assert_eq!(signal.pending(), MAX_PENDING);

    // Drains exactly what was counted.
    for _ in 0..MAX_PENDING {
        assert!(signal.try_take());
    }
    assert!(!signal.try_take());
}

#[futures_test::test]
async fn wait_blocks_until_posted() {
    let signal: WorkSignal<NodeMutex> = WorkSignal::new();

    match select(signal.wait(), yield_now()).await {
        Either::First(_) => panic!("wait returned with nothing pending"),
        Either::Second(_) => {}
    }

    signal.post();
    match select(signal.wait(), core::future::pending::<()>()).await {
        Either::First(_) => {}
        Either::Second(_) => unreachable!(),
    }
    assert_eq!(signal.pending(), 0);
}

#[futures_test::test]
async fn readiness_gate_stays_open() {
    let gate = ReadinessGate::new();
    assert!(!gate.is_ready());

    match select(gate.wait_ready(), yield_now()).await {
        Either::First(_) => panic!("gate open before calibration"),
        Either::Second(_) => {}
    }

    assert_eq!(gate.mark_ready(), 1);
    gate.wait_ready().await;
    assert!(gate.is_ready());
    // Waiting again on an open gate returns at once.
    gate.wait_ready().await;
    assert_eq!(gate.count(), 1);
}

// ---------------------------------------------------------------------------
// Neighbour table
// ---------------------------------------------------------------------------

#[test]
fn neighbor_table_never_duplicates_or_overflows() {
    let mut table: NeighborTable<5> = NeighborTable::new();
    let heard = [3u8, 1, 3, 4, 1, 5, 9, 2, 6, 5, 3, 5, 8, 9, 7];

    for address in heard {
        table.insert(address);
        let entries = table.as_slice();
        assert!(entries.len() <= table.capacity());
        for (i, a) in entries.iter().enumerate() {
            assert!(!entries[i + 1..].contains(a));
        }
    }

    // First five distinct addresses, in order heard.
    assert_eq!(table.as_slice(), &[3, 1, 4, 5, 9]);
    assert_eq!(table.insert(2), Insertion::Full);
    assert_eq!(table.insert(9), Insertion::Known);
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

#[futures_test::test]
async fn clock_ticks_after_offset_then_every_period() {
    let (node, mocks) = node();
    node.readiness().mark_ready();
    let delays = Rc::new(RefCell::new(Vec::new()));

    drive(clock_task(&node, MockDelay(delays.clone())), async {
        for _ in 0..4 {
            yield_now().await;
        }
    })
    .await;

    let delays = delays.borrow();
    assert_eq!(delays[0], 5);
    assert!(delays[1..].iter().all(|&ms| ms == 500));
    // The clock is parked in a delay, one tick behind its delay count.
    let ticks = delays.len() as u32 - 1;
    assert!(ticks >= 3);
    assert_eq!(mocks.watchdog.borrow().clears, ticks);
    assert_eq!(node.signals().transmit.pending(), ticks);
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

#[futures_test::test]
async fn echo_appends_line_ending() {
    let io = Rc::new(RefCell::new(UartIo::default()));
    io.borrow_mut().input.push_back(b"$GPGGA,1".to_vec());
    let mut uart = MockUart(io.clone());
    let mut buf = [0u8; CONSOLE_BUFFER_LEN];

    assert_eq!(echo_once(&mut uart, &mut buf).await, Ok(8));
    assert_eq!(io.borrow().output, b"$GPGGA,1\r\n");
}

#[futures_test::test]
async fn console_waits_for_the_gate() {
    let (node, _mocks) = node();
    let io = Rc::new(RefCell::new(UartIo::default()));
    io.borrow_mut().input.push_back(b"hello".to_vec());

    drive(console_task(&node, MockUart(io.clone())), async {
        settle().await;
        // Nothing read while calibration is pending.
        assert_eq!(io.borrow().input.len(), 1);
        assert!(io.borrow().output.is_empty());

        node.readiness().mark_ready();
        settle().await;
        io.borrow_mut().input.push_back(b"world".to_vec());
        settle().await;
    })
    .await;

    assert_eq!(io.borrow().output, b"hello\r\nworld\r\n");
}
