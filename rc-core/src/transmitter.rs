//! Transmitter: the per-tick control loop.
//!
//! Owns the Command State and everything that touches it. One call to
//! [`Transmitter::tick`] does, in order:
//!
//! 1. run the encoder (which samples its inputs first)
//! 2. drain queued events: each action runs its full toggle-confirm
//!    handshake before the next one starts, option toggles are merged in
//! 3. the transmission gate: if the state is not quiescent, stamp the
//!    sequence and send exactly once
//!
//! Every send, gated or handshake, stamps `sequence` with the tick time
//! (never below the previous stamp) and, once acknowledged, clears the
//! single-edge fields so a click is delivered once. Hold flags survive sends.
//! Failed gate sends are not retried within the tick.

use crate::config::Config;
use crate::detect::needs_transmit;
use crate::encoder::CommandEncoder;
use crate::events::{ControlEvent, EventQueue, QueueFull};
use crate::link::{LinkError, LinkStats, RadioLink};
use crate::toggle::ToggleConfirm;
use rc_proto::{frame, Action, CommandState};

/// What one tick did on the link.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    pub frames_sent: u8,
    pub frames_acked: u8,
    /// Toggle-confirm handshakes started this tick.
    pub handshakes: u8,
}

/// Drives an encoder and a radio link from a single control loop.
pub struct Transmitter<E, L> {
    encoder: E,
    link: L,
    config: Config,
    state: CommandState,
    /// Indexed by [`action_slot`].
    toggles: [ToggleConfirm; 2],
    events: EventQueue,
    last_sequence: Option<u32>,
    stats: LinkStats,
}

#[inline]
const fn action_slot(action: Action) -> usize {
    match action {
        Action::Stop => 0,
        Action::Recenter => 1,
    }
}

impl<E: CommandEncoder, L: RadioLink> Transmitter<E, L> {
    pub fn new(encoder: E, link: L, config: Config) -> Self {
        Self {
            encoder,
            link,
            config,
            state: CommandState::quiescent(),
            toggles: [
                ToggleConfirm::new(Action::Stop),
                ToggleConfirm::new(Action::Recenter),
            ],
            events: EventQueue::new(),
            last_sequence: None,
            stats: LinkStats::default(),
        }
    }

    /// Queue an event for the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`QueueFull`] if the event queue is full; the event is dropped.
    pub fn post(&mut self, event: ControlEvent) -> Result<(), QueueFull> {
        self.events.push(event)
    }

    /// Run one control-loop iteration at tick time `now_ms`.
    pub async fn tick(&mut self, now_ms: u32) -> TickReport {
        let mut report = TickReport::default();

        self.encoder
            .encode(now_ms, &mut self.state, &mut self.events);

        while let Some(event) = self.events.pop() {
            match event {
                ControlEvent::Action(action) => {
                    self.handshake(action, now_ms, &mut report).await;
                }
                ControlEvent::ToggleOption(bits) => {
                    self.state.options |= bits;
                }
            }
        }

        if needs_transmit(&self.state) {
            let _ = self.transmit(now_ms, &mut report).await;
        }

        report
    }

    /// Toggle-confirm cycle for one action: assert, then confirm on ack.
    async fn handshake(&mut self, action: Action, now_ms: u32, report: &mut TickReport) {
        let slot = action_slot(action);
        report.handshakes = report.handshakes.saturating_add(1);

        self.toggles[slot].trigger(&mut self.state);
        let mut result = self.transmit(now_ms, report).await;
        if result.is_err() && self.config.retransmit_assert {
            debug!("{:?} assert retransmit", action);
            result = self.transmit(now_ms, report).await;
        }

        if self.toggles[slot].assert_result(&mut self.state, result.is_ok()) {
            let _ = self.transmit(now_ms, report).await;
            self.toggles[slot].confirm_sent();
            info!("{:?} confirmed", action);
        }
    }

    /// One send attempt of the current state.
    async fn transmit(&mut self, now_ms: u32, report: &mut TickReport) -> Result<(), LinkError> {
        let sequence = match self.last_sequence {
            Some(last) => next_sequence(now_ms, last),
            None => now_ms,
        };
        self.state.sequence = sequence;
        self.last_sequence = Some(sequence);

        let bytes = frame::encode(&self.state);
        let result = self.link.send(self.config.destination, &bytes).await;

        self.stats.record(&result);
        report.frames_sent = report.frames_sent.saturating_add(1);
        match result {
            Ok(()) => {
                report.frames_acked = report.frames_acked.saturating_add(1);
                trace!("frame {} acked", sequence);
                self.state.clear_edges();
            }
            Err(e) => {
                debug!("frame {} failed: {:?}", sequence, e);
            }
        }
        result
    }

    /// Current Command State.
    pub fn state(&self) -> &CommandState {
        &self.state
    }

    /// Handshake controller of `action`.
    pub fn toggle(&self, action: Action) -> &ToggleConfirm {
        &self.toggles[action_slot(action)]
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of events waiting for the next tick.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn encoder_mut(&mut self) -> &mut E {
        &mut self.encoder
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Decompose into encoder and link.
    pub fn into_parts(self) -> (E, L) {
        (self.encoder, self.link)
    }
}

/// `now_ms` unless it lies before `last` on the wrapping ms clock.
///
/// Both are read modulo 2^32, so the sequence keeps counting through the
/// roll-over after ~49.7 days instead of sticking at the pre-wrap value.
fn next_sequence(now_ms: u32, last: u32) -> u32 {
    if now_ms.wrapping_sub(last) < 1 << 31 {
        now_ms
    } else {
        last
    }
}
