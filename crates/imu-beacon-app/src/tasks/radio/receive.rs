//! Receive state machine.
//!
//! The radio driver reports each armed receive exactly once as an
//! [`RxOutcome`]. [`dispatch`] maps the outcome to what the node must do
//! next; [`ReceiveStateMachine`] tracks whether a receive is armed and
//! supervises how long it stays that way.
//!
//! Every abort the node issues on an armed receive is counted. The
//! `Aborted` completion it produces belongs to a receive that is already
//! gone and is reported as [`RxDispatch::Stale`] without touching the
//! state.

use imu_beacon_icd::{InboundPacket, RxErrorPolicy};

use crate::hal::{Led, RadioError};

/// Completion status reported by the radio driver.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxOutcome {
    Success(InboundPacket),
    Aborted,
    /// The driver-level receive timeout expired.
    Timeout,
    Error(RadioError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completion {
    Success,
    Aborted,
    TimedOut,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxState {
    /// No receive armed.
    Idle,
    /// An asynchronous receive is armed.
    Listening,
    Completed(Completion),
}

/// Follow-up work a completion asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxDispatch {
    /// Hand the packet to beacon processing.
    Beacon(InboundPacket),
    /// Re-arm the receiver.
    Restart,
    /// Leave the receiver idle.
    Stay,
    /// Completion of a receive the node cancelled itself; nothing to do.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub completion: Completion,
    pub dispatch: RxDispatch,
    pub toggle: &'static [Led],
}

const RX_LED: &[Led] = &[Led::Red];
const ABORT_LED: &[Led] = &[Led::Green];
const ERROR_LEDS: &[Led] = &[Led::Green, Led::Red];

/// Map one driver completion to the node's next step.
pub fn dispatch(outcome: RxOutcome, policy: RxErrorPolicy) -> Transition {
    match outcome {
        RxOutcome::Success(packet) => {
            let dispatch = if packet.is_beacon() {
                RxDispatch::Beacon(packet)
            } else {
                RxDispatch::Restart
            };
            Transition {
                completion: Completion::Success,
                dispatch,
                toggle: RX_LED,
            }
        }
        RxOutcome::Aborted => Transition {
            completion: Completion::Aborted,
            dispatch: RxDispatch::Restart,
            toggle: ABORT_LED,
        },
        RxOutcome::Timeout => Transition {
            completion: Completion::TimedOut,
            dispatch: RxDispatch::Restart,
            toggle: &[],
        },
        RxOutcome::Error(_) => Transition {
            completion: Completion::Error,
            dispatch: match policy {
                RxErrorPolicy::Restart => RxDispatch::Restart,
                RxErrorPolicy::Stall => RxDispatch::Stay,
            },
            toggle: ERROR_LEDS,
        },
    }
}

/// What the restart task has to do with the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rearm {
    Arm,
    /// The previous receive was given up on; cancel it before arming.
    AbortAndArm,
    AlreadyListening,
}

pub struct ReceiveStateMachine {
    state: RxState,
    policy: RxErrorPolicy,
    stall_ticks: u32,
    listening_ticks: u32,
    abandoned: bool,
    // Aborts issued on an armed receive whose completion is still due.
    cancelled: u32,
    last_packet: Option<InboundPacket>,
    completions: u32,
    dropped: u32,
}

impl ReceiveStateMachine {
    /// `stall_ticks` of 0 disables the stall monitor.
    pub const fn new(policy: RxErrorPolicy, stall_ticks: u32) -> Self {
        Self {
            state: RxState::Idle,
            policy,
            stall_ticks,
            listening_ticks: 0,
            abandoned: false,
            cancelled: 0,
            last_packet: None,
            completions: 0,
            dropped: 0,
        }
    }

    pub fn state(&self) -> RxState {
        self.state
    }

    /// Enter `Listening` ahead of arming the radio.
    pub fn begin_listening(&mut self) -> Rearm {
        if self.state == RxState::Listening {
            return Rearm::AlreadyListening;
        }
        self.state = RxState::Listening;
        self.listening_ticks = 0;
        if core::mem::take(&mut self.abandoned) {
            self.cancelled = self.cancelled.saturating_add(1);
            Rearm::AbortAndArm
        } else {
            Rearm::Arm
        }
    }

    /// The driver refused to arm.
    pub fn arm_failed(&mut self) {
        if self.state == RxState::Listening {
            self.state = RxState::Idle;
        }
    }

    /// The node is about to abort the radio outside the restart task.
    ///
    /// Returns true when a receive was armed; the state drops to `Idle` so
    /// the next restart arms again.
    pub fn cancel(&mut self) -> bool {
        if self.state != RxState::Listening && !self.abandoned {
            return false;
        }
        self.state = RxState::Idle;
        self.abandoned = false;
        self.listening_ticks = 0;
        self.cancelled = self.cancelled.saturating_add(1);
        true
    }

    pub fn complete(&mut self, outcome: RxOutcome) -> Transition {
        if self.cancelled > 0 {
            if outcome == RxOutcome::Aborted {
                self.cancelled -= 1;
                self.completions = self.completions.wrapping_add(1);
                return Transition {
                    completion: Completion::Aborted,
                    dispatch: RxDispatch::Stale,
                    toggle: ABORT_LED,
                };
            }
            if self.state != RxState::Listening {
                // The receive finished before the abort reached it, so no
                // `Aborted` follows.
                self.cancelled -= 1;
            }
        }
        if let RxOutcome::Success(packet) = &outcome {
            self.last_packet = Some(packet.clone());
        }
        let transition = dispatch(outcome, self.policy);
        self.state = RxState::Completed(transition.completion);
        self.completions = self.completions.wrapping_add(1);
        transition
    }

    /// Advance the stall monitor by one clock tick.
    ///
    /// Returns true when the armed receive has been given up on; the state
    /// is then `Completed(TimedOut)` and the caller must request a restart.
    pub fn note_tick(&mut self) -> bool {
        if self.state != RxState::Listening || self.stall_ticks == 0 {
            return false;
        }
        self.listening_ticks = self.listening_ticks.saturating_add(1);
        if self.listening_ticks <= self.stall_ticks {
            return false;
        }
        self.state = RxState::Completed(Completion::TimedOut);
        self.abandoned = true;
        true
    }

    pub fn note_dropped(&mut self) {
        self.dropped = self.dropped.wrapping_add(1);
    }

    /// Most recent successfully received packet.
    pub fn last_packet(&self) -> Option<&InboundPacket> {
        self.last_packet.as_ref()
    }

    pub fn completions(&self) -> u32 {
        self.completions
    }

    /// Node-issued aborts still waiting for their completion.
    pub fn cancelled(&self) -> u32 {
        self.cancelled
    }

    /// Beacons discarded because beacon processing was backed up.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imu_beacon_icd::{Beacon, UNIVERSAL_ADDRESS};

    fn beacon_from(sender: u8) -> InboundPacket {
        let packet = Beacon::new(sender).to_packet(UNIVERSAL_ADDRESS);
        InboundPacket::from_air(&packet, -40, 0)
    }

    #[test]
    fn beacon_goes_to_processing() {
        let outcome = RxOutcome::Success(beacon_from(0x42));
        let t = dispatch(outcome, RxErrorPolicy::Restart);
        assert_eq!(t.completion, Completion::Success);
        assert_eq!(t.dispatch, RxDispatch::Beacon(beacon_from(0x42)));
        assert_eq!(t.toggle, &[Led::Red]);
    }

    #[test]
    fn other_traffic_restarts() {
        let packet =
            InboundPacket::new(UNIVERSAL_ADDRESS, &[0x07, 0x42]).unwrap();
        let t = dispatch(RxOutcome::Success(packet), RxErrorPolicy::Stall);
        assert_eq!(t.dispatch, RxDispatch::Restart);
    }

    #[test]
    fn error_follows_policy() {
        let error = || RxOutcome::Error(RadioError::Rx);
        let stall = dispatch(error(), RxErrorPolicy::Stall);
        assert_eq!(stall.dispatch, RxDispatch::Stay);
        assert_eq!(stall.toggle, &[Led::Green, Led::Red]);

        let restart = dispatch(error(), RxErrorPolicy::Restart);
        assert_eq!(restart.dispatch, RxDispatch::Restart);
    }

    #[test]
    fn restart_is_idempotent_while_listening() {
        let mut rx = ReceiveStateMachine::new(RxErrorPolicy::Restart, 0);
        assert_eq!(rx.begin_listening(), Rearm::Arm);
        assert_eq!(rx.begin_listening(), Rearm::AlreadyListening);

        rx.complete(RxOutcome::Aborted);
        assert_eq!(rx.state(), RxState::Completed(Completion::Aborted));
        assert_eq!(rx.begin_listening(), Rearm::Arm);
    }

    #[test]
    fn stalled_receive_is_abandoned_then_aborted() {
        let mut rx = ReceiveStateMachine::new(RxErrorPolicy::Restart, 2);
        rx.begin_listening();

        assert!(!rx.note_tick());
        assert!(!rx.note_tick());
        assert!(rx.note_tick());
        assert_eq!(rx.state(), RxState::Completed(Completion::TimedOut));
        assert!(!rx.note_tick());

        assert_eq!(rx.begin_listening(), Rearm::AbortAndArm);
        rx.arm_failed();
        assert_eq!(rx.state(), RxState::Idle);
        assert_eq!(rx.begin_listening(), Rearm::Arm);
    }

    #[test]
    fn cancel_drops_to_idle_and_swallows_its_abort() {
        let mut rx = ReceiveStateMachine::new(RxErrorPolicy::Restart, 0);
        assert!(!rx.cancel());

        rx.begin_listening();
        assert!(rx.cancel());
        assert_eq!(rx.state(), RxState::Idle);
        assert_eq!(rx.begin_listening(), Rearm::Arm);

        let late = rx.complete(RxOutcome::Aborted);
        assert_eq!(late.dispatch, RxDispatch::Stale);
        assert_eq!(rx.state(), RxState::Listening);
        assert_eq!(rx.cancelled(), 0);

        // A later abort nobody asked for restarts as usual.
        let t = rx.complete(RxOutcome::Aborted);
        assert_eq!(t.dispatch, RxDispatch::Restart);
    }

    #[test]
    fn completion_racing_a_cancel_settles_the_count() {
        let mut rx = ReceiveStateMachine::new(RxErrorPolicy::Restart, 0);
        rx.begin_listening();
        rx.cancel();

        let t = rx.complete(RxOutcome::Success(beacon_from(0x42)));
        assert_eq!(t.dispatch, RxDispatch::Beacon(beacon_from(0x42)));
        assert_eq!(rx.cancelled(), 0);
    }

    #[test]
    fn abandoned_receive_counts_its_abort() {
        let mut rx = ReceiveStateMachine::new(RxErrorPolicy::Restart, 1);
        rx.begin_listening();
        rx.note_tick();
        assert!(rx.note_tick());

        assert_eq!(rx.begin_listening(), Rearm::AbortAndArm);
        assert_eq!(rx.cancelled(), 1);
        assert_eq!(rx.complete(RxOutcome::Aborted).dispatch, RxDispatch::Stale);
        assert_eq!(rx.state(), RxState::Listening);
    }

    #[test]
    fn success_keeps_last_packet() {
        let mut rx = ReceiveStateMachine::new(RxErrorPolicy::Restart, 0);
        rx.begin_listening();
        rx.complete(RxOutcome::Success(beacon_from(0x43)));
        rx.complete(RxOutcome::Timeout);

        assert_eq!(rx.last_packet(), Some(&beacon_from(0x43)));
        assert_eq!(rx.completions(), 2);
    }
}
