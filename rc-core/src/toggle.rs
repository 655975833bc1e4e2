//! Toggle-confirm handshake for one-shot actions.
//!
//! An action is asserted (flag set, frame sent) and, once the vehicle
//! acknowledges, confirmed (flag cleared, frame sent again), so the vehicle
//! sees a discrete pulse instead of a level that could get stuck.
//!
//! ```text
//!  Idle --trigger--> Asserting --ack--> Confirming --sent--> Idle
//!                        |
//!                        +--no ack--> Asserting (armed, flag cleared)
//! ```
//!
//! An unacknowledged assert leaves the controller armed. It does not retry on
//! its own; the next trigger of the same action starts the cycle again.
//!
//! The controller only performs the state transitions. The
//! [`Transmitter`](crate::Transmitter) performs the sends in between.

use rc_proto::{Action, CommandState};

/// Handshake phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TogglePhase {
    #[default]
    Idle,
    /// Flag asserted, waiting for (or having missed) the acknowledgment.
    Asserting,
    /// Assert acknowledged, clear frame pending.
    Confirming,
}

/// Handshake state machine for one action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToggleConfirm {
    action: Action,
    phase: TogglePhase,
}

impl ToggleConfirm {
    #[must_use]
    pub const fn new(action: Action) -> Self {
        Self {
            action,
            phase: TogglePhase::Idle,
        }
    }

    #[inline]
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    #[inline]
    #[must_use]
    pub const fn phase(&self) -> TogglePhase {
        self.phase
    }

    /// True while an assert has gone out without a completed confirm.
    #[inline]
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        !matches!(self.phase, TogglePhase::Idle)
    }

    /// Start a cycle: set the action flag. The caller sends next.
    ///
    /// Also used to re-trigger an armed action.
    pub fn trigger(&mut self, state: &mut CommandState) {
        if self.phase == TogglePhase::Asserting {
            debug!("{:?} re-triggered while armed", self.action);
        }
        self.phase = TogglePhase::Asserting;
        state.set_action(self.action, true);
    }

    /// Apply the outcome of the assert send.
    ///
    /// The flag is cleared either way. Returns `true` if the caller must now
    /// send the confirm frame.
    pub fn assert_result(&mut self, state: &mut CommandState, acked: bool) -> bool {
        state.set_action(self.action, false);
        if self.phase != TogglePhase::Asserting {
            return false;
        }
        if acked {
            self.phase = TogglePhase::Confirming;
            true
        } else {
            warn!("{:?} assert not acknowledged, left armed", self.action);
            false
        }
    }

    /// The confirm frame went out (acknowledged or not).
    pub fn confirm_sent(&mut self) {
        if self.phase == TogglePhase::Confirming {
            self.phase = TogglePhase::Idle;
        }
    }
}
