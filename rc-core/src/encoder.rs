//! Command encoders: operator input to Command State mutations.
//!
//! Each encoder writes only the axis fields of [`CommandState`] (and may
//! queue events); it never transmits. Two implementations exist, one per
//! [`InputMode`](crate::InputMode), behind [`CommandEncoder`].
//!
//! # Button rules
//!
//! For each control, once per tick, first match wins:
//!
//! 1. down for at least the hold threshold: delta 0, hold set
//! 2. released on this tick after a short press: delta ±step, hold cleared
//! 3. released on this tick after a hold: delta 0, hold cleared
//! 4. up for the release-settle time, first tick only: delta 0, hold cleared
//!
//! Forward and reverse share the speed axis, right and left the turn axis.
//! Controls are evaluated forward, reverse, right, left and the last one to
//! write an axis wins that tick. An idle, already settled control writes
//! nothing.

use crate::config::{Config, InputMode};
use crate::events::{ControlEvent, EventQueue};
use crate::input::{InputChannel, InputError};
use heapless::Deque;
use rc_proto::{parse_line, Axis, CommandState, Direction, SerialCommand};

/// Turns operator input into Command State for one tick.
pub trait CommandEncoder {
    /// Sample inputs at `now_ms` and update `state`. Discrete triggers found
    /// along the way go into `events`.
    fn encode(&mut self, now_ms: u32, state: &mut CommandState, events: &mut EventQueue);
}

/// A physical direction control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Control {
    Forward,
    Reverse,
    Right,
    Left,
}

impl Control {
    /// Evaluation order within a tick.
    pub const ALL: [Control; 4] = [Self::Forward, Self::Reverse, Self::Right, Self::Left];

    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Forward | Self::Reverse => Axis::Speed,
            Self::Right | Self::Left => Axis::Turn,
        }
    }

    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Forward | Self::Right => Direction::Positive,
            Self::Reverse | Self::Left => Direction::Negative,
        }
    }
}

struct Binding<C> {
    control: Control,
    channel: C,
    /// The current press reached the hold threshold.
    held: bool,
    /// Released, settle not yet applied.
    settle_pending: bool,
}

impl<C: InputChannel> Binding<C> {
    const fn new(control: Control, channel: C) -> Self {
        Self {
            control,
            channel,
            held: false,
            settle_pending: false,
        }
    }

    fn evaluate(&mut self, step: i16, hold_ms: u32, settle_ms: u32, state: &mut CommandState) {
        let axis = self.control.axis();

        if self.channel.held_for(hold_ms) {
            if !self.held {
                trace!("{:?} held", self.control);
            }
            self.held = true;
            state.set_axis(axis, 0, true);
        } else if self.channel.just_released() {
            if self.held {
                state.set_axis(axis, 0, false);
            } else {
                state.set_axis(axis, self.control.direction().apply(step), false);
            }
            self.held = false;
            self.settle_pending = true;
        } else if self.settle_pending && self.channel.released_for(settle_ms) {
            state.set_axis(axis, 0, false);
            self.settle_pending = false;
        }
    }
}

/// Encoder for four physical direction buttons.
pub struct ButtonEncoder<C> {
    bindings: [Binding<C>; 4],
    speed_step: i16,
    turn_step: i16,
    hold_threshold_ms: u32,
    release_settle_ms: u32,
}

impl<C: InputChannel> ButtonEncoder<C> {
    #[must_use]
    pub fn new(forward: C, reverse: C, right: C, left: C, config: &Config) -> Self {
        Self {
            bindings: [
                Binding::new(Control::Forward, forward),
                Binding::new(Control::Reverse, reverse),
                Binding::new(Control::Right, right),
                Binding::new(Control::Left, left),
            ],
            speed_step: config.speed_step,
            turn_step: config.turn_step,
            hold_threshold_ms: config.hold_threshold_ms,
            release_settle_ms: config.release_settle_ms,
        }
    }

    /// Access the input channel bound to `control`.
    pub fn channel_mut(&mut self, control: Control) -> &mut C {
        &mut self.bindings[control as usize].channel
    }
}

impl<C: InputChannel> CommandEncoder for ButtonEncoder<C> {
    fn encode(&mut self, now_ms: u32, state: &mut CommandState, _events: &mut EventQueue) {
        for binding in &mut self.bindings {
            binding.channel.update(now_ms);
        }

        for binding in &mut self.bindings {
            let step = match binding.control.axis() {
                Axis::Speed => self.speed_step,
                Axis::Turn => self.turn_step,
            };
            binding.evaluate(step, self.hold_threshold_ms, self.release_settle_ms, state);
        }
    }
}

/// Commands that can wait between ticks in serial mode.
pub const SERIAL_BACKLOG: usize = 8;

/// Encoder driven by command lines from the debug UART.
///
/// A click's delta is cleared once the release-settle time has passed, the
/// same lifetime a button click gets.
pub struct SerialEncoder {
    pending: Deque<SerialCommand, SERIAL_BACKLOG>,
    /// Time of the last click per axis, indexed by `Axis as usize`.
    clicks: [Option<u32>; 2],
    speed_step: i16,
    turn_step: i16,
    release_settle_ms: u32,
}

impl SerialEncoder {
    #[must_use]
    pub const fn new(config: &Config) -> Self {
        Self {
            pending: Deque::new(),
            clicks: [None; 2],
            speed_step: config.speed_step,
            turn_step: config.turn_step,
            release_settle_ms: config.release_settle_ms,
        }
    }

    /// Queue a decoded command for the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::BufferOverflow`] if [`SERIAL_BACKLOG`] commands
    /// are already waiting.
    pub fn feed(&mut self, command: SerialCommand) -> Result<(), InputError> {
        self.pending
            .push_back(command)
            .map_err(|_| InputError::BufferOverflow)
    }

    /// Parse a raw line and queue it.
    ///
    /// # Errors
    ///
    /// Returns the parse or checksum error, or [`InputError::BufferOverflow`].
    pub fn feed_line(&mut self, line: &[u8]) -> Result<(), InputError> {
        let command = parse_line(line).inspect_err(|e| {
            warn!("serial line rejected: {:?}", e);
        })?;
        self.feed(command)
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn step(&self, axis: Axis) -> i16 {
        match axis {
            Axis::Speed => self.speed_step,
            Axis::Turn => self.turn_step,
        }
    }
}

impl CommandEncoder for SerialEncoder {
    fn encode(&mut self, now_ms: u32, state: &mut CommandState, events: &mut EventQueue) {
        for axis in [Axis::Speed, Axis::Turn] {
            let slot = &mut self.clicks[axis as usize];
            if let Some(at) = *slot {
                if now_ms.wrapping_sub(at) >= self.release_settle_ms {
                    state.set_axis(axis, 0, false);
                    *slot = None;
                }
            }
        }

        // Event commands wait in the backlog while the queue is full, and
        // everything behind them waits too so order is kept.
        while let Some(&command) = self.pending.front() {
            let is_event = matches!(
                command,
                SerialCommand::Action(_) | SerialCommand::Options(_)
            );
            if is_event && events.is_full() {
                debug!("event queue full, {} serial commands held", self.pending.len());
                break;
            }
            self.pending.pop_front();
            trace!("serial command {:?}", command);
            match command {
                SerialCommand::Click(axis, direction) => {
                    state.set_axis(axis, direction.apply(self.step(axis)), false);
                    self.clicks[axis as usize] = Some(now_ms);
                }
                SerialCommand::Hold(axis) => {
                    state.set_axis(axis, 0, true);
                    self.clicks[axis as usize] = None;
                }
                SerialCommand::Release(axis) => {
                    state.set_axis(axis, 0, false);
                    self.clicks[axis as usize] = None;
                }
                SerialCommand::Action(action) => {
                    let _ = events.push(ControlEvent::Action(action));
                }
                SerialCommand::Options(bits) => {
                    let _ = events.push(ControlEvent::ToggleOption(bits));
                }
            }
        }
    }
}

/// The encoder chosen at startup.
pub enum ModeEncoder<C> {
    Buttons(ButtonEncoder<C>),
    SerialDebug(SerialEncoder),
}

impl<C> ModeEncoder<C> {
    #[must_use]
    pub const fn input_mode(&self) -> InputMode {
        match self {
            Self::Buttons(_) => InputMode::Buttons,
            Self::SerialDebug(_) => InputMode::SerialDebug,
        }
    }
}

impl<C: InputChannel> CommandEncoder for ModeEncoder<C> {
    fn encode(&mut self, now_ms: u32, state: &mut CommandState, events: &mut EventQueue) {
        match self {
            Self::Buttons(encoder) => encoder.encode(now_ms, state, events),
            Self::SerialDebug(encoder) => encoder.encode(now_ms, state, events),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EVENT_QUEUE_DEPTH;
    use rc_proto::{Action, Options};

    /// Input channel whose level is set directly by the test.
    ///
    /// Tracks press/release times like a debounced button with no bounce.
    #[derive(Default)]
    struct Scripted {
        level: bool,
        pressed: bool,
        changed: bool,
        since: u32,
        now: u32,
    }

    impl InputChannel for Scripted {
        fn update(&mut self, now_ms: u32) {
            self.now = now_ms;
            self.changed = self.level != self.pressed;
            if self.changed {
                self.pressed = self.level;
                self.since = now_ms;
            }
        }

        fn pressed(&self) -> bool {
            self.pressed
        }

        fn held_for(&self, ms: u32) -> bool {
            self.pressed && self.now - self.since >= ms
        }

        fn just_released(&self) -> bool {
            !self.pressed && self.changed
        }

        fn released_for(&self, ms: u32) -> bool {
            !self.pressed && self.now - self.since >= ms
        }
    }

    const CONFIG: Config = Config::new().with_steps(10, 5).with_timing(400, 150);

    fn encoder() -> ButtonEncoder<Scripted> {
        ButtonEncoder::new(
            Scripted::default(),
            Scripted::default(),
            Scripted::default(),
            Scripted::default(),
            &CONFIG,
        )
    }

    fn run(enc: &mut impl CommandEncoder, now: u32, state: &mut CommandState) {
        let mut events = EventQueue::new();
        enc.encode(now, state, &mut events);
    }

    #[test]
    fn test_idle_controls_stay_quiescent() {
        let mut enc = encoder();
        let mut state = CommandState::quiescent();
        for now in (0..2000).step_by(20) {
            run(&mut enc, now, &mut state);
            assert!(state.is_quiescent());
        }
    }

    #[test]
    fn test_click_produces_step() {
        let mut enc = encoder();
        let mut state = CommandState::quiescent();

        enc.channel_mut(Control::Forward).level = true;
        run(&mut enc, 1000, &mut state);
        assert!(state.is_quiescent());

        enc.channel_mut(Control::Forward).level = false;
        run(&mut enc, 1100, &mut state);
        assert_eq!(state.axis(Axis::Speed), (10, false));
    }

    #[test]
    fn test_reverse_and_left_are_negative() {
        let mut enc = encoder();
        let mut state = CommandState::quiescent();

        enc.channel_mut(Control::Reverse).level = true;
        enc.channel_mut(Control::Left).level = true;
        run(&mut enc, 1000, &mut state);
        enc.channel_mut(Control::Reverse).level = false;
        enc.channel_mut(Control::Left).level = false;
        run(&mut enc, 1040, &mut state);

        assert_eq!(state.axis(Axis::Speed), (-10, false));
        assert_eq!(state.axis(Axis::Turn), (-5, false));
    }

    #[test]
    fn test_hold_suppresses_delta() {
        let mut enc = encoder();
        let mut state = CommandState::quiescent();

        enc.channel_mut(Control::Forward).level = true;
        run(&mut enc, 1000, &mut state);
        for now in (1400..2400).step_by(20) {
            run(&mut enc, now, &mut state);
            assert_eq!(state.axis(Axis::Speed), (0, true));
        }

        // Releasing after a hold does not add a step
        enc.channel_mut(Control::Forward).level = false;
        run(&mut enc, 2400, &mut state);
        assert_eq!(state.axis(Axis::Speed), (0, false));
    }

    #[test]
    fn test_release_settle_clears_axis() {
        let mut enc = encoder();
        let mut state = CommandState::quiescent();

        enc.channel_mut(Control::Right).level = true;
        run(&mut enc, 1000, &mut state);
        enc.channel_mut(Control::Right).level = false;
        run(&mut enc, 1060, &mut state);
        assert_eq!(state.axis(Axis::Turn), (5, false));

        run(&mut enc, 1200, &mut state);
        assert_eq!(state.axis(Axis::Turn), (5, false));

        run(&mut enc, 1210, &mut state);
        assert_eq!(state.axis(Axis::Turn), (0, false));
        assert!(state.is_quiescent());
    }

    #[test]
    fn test_settle_applies_once() {
        let mut enc = encoder();
        let mut state = CommandState::quiescent();

        enc.channel_mut(Control::Forward).level = true;
        run(&mut enc, 1000, &mut state);
        enc.channel_mut(Control::Forward).level = false;
        run(&mut enc, 1050, &mut state);
        run(&mut enc, 1300, &mut state);
        assert!(state.is_quiescent());

        // A later value on the axis is not clobbered by the settled control
        state.set_axis(Axis::Speed, 7, false);
        run(&mut enc, 1500, &mut state);
        assert_eq!(state.axis(Axis::Speed), (7, false));
    }

    #[test]
    fn test_axes_are_independent() {
        let mut enc = encoder();
        let mut state = CommandState::quiescent();

        enc.channel_mut(Control::Forward).level = true;
        run(&mut enc, 1000, &mut state);
        enc.channel_mut(Control::Right).level = true;
        run(&mut enc, 1420, &mut state);
        assert_eq!(state.axis(Axis::Speed), (0, true));

        enc.channel_mut(Control::Right).level = false;
        run(&mut enc, 1480, &mut state);
        assert_eq!(state.axis(Axis::Speed), (0, true));
        assert_eq!(state.axis(Axis::Turn), (5, false));
    }

    #[test]
    fn test_last_control_on_axis_wins() {
        let mut enc = encoder();
        let mut state = CommandState::quiescent();

        enc.channel_mut(Control::Forward).level = true;
        enc.channel_mut(Control::Reverse).level = true;
        run(&mut enc, 1000, &mut state);
        enc.channel_mut(Control::Forward).level = false;
        enc.channel_mut(Control::Reverse).level = false;
        run(&mut enc, 1100, &mut state);

        // Reverse is evaluated after forward
        assert_eq!(state.axis(Axis::Speed), (-10, false));
    }

    #[test]
    fn test_serial_click_and_settle() {
        let mut enc = SerialEncoder::new(&CONFIG);
        let mut state = CommandState::quiescent();

        enc.feed_line(b"CT+*").unwrap_err();
        enc.feed(SerialCommand::Click(Axis::Turn, Direction::Positive))
            .unwrap();
        run(&mut enc, 1000, &mut state);
        assert_eq!(state.axis(Axis::Turn), (5, false));

        run(&mut enc, 1100, &mut state);
        assert_eq!(state.axis(Axis::Turn), (5, false));

        run(&mut enc, 1150, &mut state);
        assert!(state.is_quiescent());
    }

    #[test]
    fn test_serial_hold_release() {
        let mut enc = SerialEncoder::new(&CONFIG);
        let mut state = CommandState::quiescent();

        enc.feed_line(b"HS*BE\n").unwrap();
        run(&mut enc, 0, &mut state);
        for now in (20..1000).step_by(20) {
            run(&mut enc, now, &mut state);
            assert_eq!(state.axis(Axis::Speed), (0, true));
        }

        enc.feed(SerialCommand::Release(Axis::Speed)).unwrap();
        run(&mut enc, 1000, &mut state);
        assert!(state.is_quiescent());
    }

    #[test]
    fn test_serial_actions_become_events() {
        let mut enc = SerialEncoder::new(&CONFIG);
        let mut state = CommandState::quiescent();
        let mut events = EventQueue::new();

        enc.feed_line(b"AS*BE").unwrap();
        enc.feed(SerialCommand::Options(Options::LIGHTS)).unwrap();
        enc.encode(0, &mut state, &mut events);

        assert!(state.is_quiescent());
        assert_eq!(events.pop(), Some(ControlEvent::Action(Action::Stop)));
        assert_eq!(
            events.pop(),
            Some(ControlEvent::ToggleOption(Options::LIGHTS))
        );
        assert_eq!(enc.pending(), 0);
    }

    #[test]
    fn test_serial_events_wait_while_queue_full() {
        let mut enc = SerialEncoder::new(&CONFIG);
        let mut state = CommandState::quiescent();
        let mut events = EventQueue::new();
        for _ in 0..EVENT_QUEUE_DEPTH {
            events.push(ControlEvent::Action(Action::Recenter)).unwrap();
        }

        enc.feed(SerialCommand::Action(Action::Stop)).unwrap();
        enc.feed(SerialCommand::Click(Axis::Speed, Direction::Positive))
            .unwrap();
        enc.encode(0, &mut state, &mut events);

        // Nothing is consumed, not even the click queued behind the stop.
        assert_eq!(enc.pending(), 2);
        assert!(state.is_quiescent());

        events.pop();
        enc.encode(20, &mut state, &mut events);
        assert_eq!(enc.pending(), 0);
        assert_eq!(state.axis(Axis::Speed), (10, false));
        for _ in 1..EVENT_QUEUE_DEPTH {
            assert_eq!(events.pop(), Some(ControlEvent::Action(Action::Recenter)));
        }
        assert_eq!(events.pop(), Some(ControlEvent::Action(Action::Stop)));
    }

    #[test]
    fn test_serial_backlog_limit() {
        let mut enc = SerialEncoder::new(&CONFIG);
        for _ in 0..SERIAL_BACKLOG {
            enc.feed(SerialCommand::Hold(Axis::Turn)).unwrap();
        }
        assert_eq!(
            enc.feed(SerialCommand::Hold(Axis::Turn)),
            Err(InputError::BufferOverflow)
        );
    }

    #[test]
    fn test_mode_encoder_dispatch() {
        let mut enc: ModeEncoder<Scripted> = ModeEncoder::SerialDebug(SerialEncoder::new(&CONFIG));
        let mut state = CommandState::quiescent();
        if let ModeEncoder::SerialDebug(serial) = &mut enc {
            serial
                .feed(SerialCommand::Click(Axis::Speed, Direction::Negative))
                .unwrap();
        }
        run(&mut enc, 0, &mut state);
        assert_eq!(state.axis(Axis::Speed), (-10, false));
    }

    #[test]
    fn test_mode_encoder_reports_input_mode() {
        let config = CONFIG.with_input_mode(InputMode::SerialDebug);
        let enc: ModeEncoder<Scripted> = match config.input_mode {
            InputMode::Buttons => ModeEncoder::Buttons(encoder()),
            InputMode::SerialDebug => ModeEncoder::SerialDebug(SerialEncoder::new(&config)),
        };
        assert_eq!(enc.input_mode(), InputMode::SerialDebug);
        assert_eq!(ModeEncoder::Buttons(encoder()).input_mode(), InputMode::Buttons);
    }
}
