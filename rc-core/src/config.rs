//! Startup configuration.

/// How the transmitter receives operator input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputMode {
    /// Physical direction buttons plus the analog action ladder.
    #[default]
    Buttons,
    /// Checksummed command lines on the debug UART.
    SerialDebug,
}

/// Tunables for the control loop, fixed once the loop starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub input_mode: InputMode,
    /// Speed increment sent for one click.
    pub speed_step: i16,
    /// Turn increment sent for one click.
    pub turn_step: i16,
    /// Press duration after which a control counts as held.
    pub hold_threshold_ms: u32,
    /// Time after release before an axis returns to quiescent.
    pub release_settle_ms: u32,
    /// Contact bounce filter for raw button levels.
    pub debounce_ms: u32,
    pub tick_period_ms: u32,
    /// Link-layer id of the vehicle.
    pub destination: u8,
    /// Retransmit an unacknowledged action assert frame once before
    /// leaving the action armed.
    pub retransmit_assert: bool,
}

impl Config {
    pub const DEFAULT: Self = Self::new();

    #[must_use]
    pub const fn new() -> Self {
        Self {
            input_mode: InputMode::Buttons,
            speed_step: 10,
            turn_step: 5,
            hold_threshold_ms: 400,
            release_settle_ms: 150,
            debounce_ms: 25,
            tick_period_ms: 20,
            destination: 1,
            retransmit_assert: false,
        }
    }

    #[must_use]
    pub const fn with_input_mode(mut self, mode: InputMode) -> Self {
        self.input_mode = mode;
        self
    }

    #[must_use]
    pub const fn with_steps(mut self, speed_step: i16, turn_step: i16) -> Self {
        self.speed_step = speed_step;
        self.turn_step = turn_step;
        self
    }

    #[must_use]
    pub const fn with_timing(mut self, hold_threshold_ms: u32, release_settle_ms: u32) -> Self {
        self.hold_threshold_ms = hold_threshold_ms;
        self.release_settle_ms = release_settle_ms;
        self
    }

    #[must_use]
    pub const fn with_destination(mut self, destination: u8) -> Self {
        self.destination = destination;
        self
    }

    #[must_use]
    pub const fn with_retransmit_assert(mut self, enabled: bool) -> Self {
        self.retransmit_assert = enabled;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
