//! Command State and the small enums used to address it.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Auxiliary feature toggle requests, one bit per feature.
///
/// A set bit asks the vehicle to flip that feature once. Bits are independent
/// and may be combined with the bitwise operators.
///
/// # Example
///
/// ```
/// use rc_proto::Options;
///
/// let opts = Options::LIGHTS | Options::HORN;
/// assert!(opts.contains(Options::LIGHTS));
/// assert!(!opts.contains(Options::HAZARD));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Options(pub u32);

impl Options {
    pub const LIGHTS: Self = Self(1 << 0);
    pub const HORN: Self = Self(1 << 1);
    pub const HAZARD: Self = Self(1 << 2);
    pub const AUX1: Self = Self(1 << 3);
    pub const AUX2: Self = Self(1 << 4);
    pub const AUX3: Self = Self(1 << 5);
    pub const AUX4: Self = Self(1 << 6);

    /// No toggles requested.
    pub const NONE: Self = Self(0);

    /// Check if all of the given bits are set.
    #[inline]
    #[must_use]
    pub const fn contains(self, bits: Options) -> bool {
        (self.0 & bits.0) == bits.0
    }

    /// Set or clear bit(s).
    #[inline]
    pub fn set(&mut self, bits: Options, on: bool) {
        if on {
            self.0 |= bits.0;
        } else {
            self.0 &= !bits.0;
        }
    }

    /// Flip bit(s).
    #[inline]
    pub fn toggle(&mut self, bits: Options) {
        self.0 ^= bits.0;
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Options {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Options {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Options {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Options {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for Options {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

/// Logical control axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    Speed,
    Turn,
}

/// Sign of a delta on an axis: forward/right is positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// Apply this direction to an unsigned step magnitude.
    #[inline]
    #[must_use]
    pub const fn apply(self, step: i16) -> i16 {
        match self {
            Self::Positive => step,
            Self::Negative => -step,
        }
    }
}

/// One-shot receiver action driven by the toggle-confirm handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Emergency stop.
    Stop,
    /// Re-center heading.
    Recenter,
}

/// The command record sent to the vehicle.
///
/// Everything except `sequence` is relative to the vehicle's current state:
/// deltas are increments, hold flags mean "keep the last commanded value".
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandState {
    /// Stamped with the tick clock at send time.
    pub sequence: u32,
    pub speed_delta: i16,
    pub speed_hold: bool,
    pub turn_delta: i16,
    pub turn_hold: bool,
    pub stop_requested: bool,
    pub recenter_requested: bool,
    pub options: Options,
}

impl CommandState {
    /// Baseline with nothing to command.
    #[must_use]
    pub const fn quiescent() -> Self {
        Self {
            sequence: 0,
            speed_delta: 0,
            speed_hold: false,
            turn_delta: 0,
            turn_hold: false,
            stop_requested: false,
            recenter_requested: false,
            options: Options::NONE,
        }
    }

    /// True if every field except `sequence` is at its quiescent value.
    #[must_use]
    pub const fn is_quiescent(&self) -> bool {
        self.speed_delta == 0
            && !self.speed_hold
            && self.turn_delta == 0
            && !self.turn_hold
            && !self.stop_requested
            && !self.recenter_requested
            && self.options.is_empty()
    }

    /// Set the delta and hold flag of one axis.
    #[inline]
    pub fn set_axis(&mut self, axis: Axis, delta: i16, hold: bool) {
        match axis {
            Axis::Speed => {
                self.speed_delta = delta;
                self.speed_hold = hold;
            }
            Axis::Turn => {
                self.turn_delta = delta;
                self.turn_hold = hold;
            }
        }
    }

    /// Current `(delta, hold)` of one axis.
    #[inline]
    #[must_use]
    pub const fn axis(&self, axis: Axis) -> (i16, bool) {
        match axis {
            Axis::Speed => (self.speed_delta, self.speed_hold),
            Axis::Turn => (self.turn_delta, self.turn_hold),
        }
    }

    /// Set or clear an action flag.
    #[inline]
    pub fn set_action(&mut self, action: Action, requested: bool) {
        match action {
            Action::Stop => self.stop_requested = requested,
            Action::Recenter => self.recenter_requested = requested,
        }
    }

    #[inline]
    #[must_use]
    pub const fn action(&self, action: Action) -> bool {
        match action {
            Action::Stop => self.stop_requested,
            Action::Recenter => self.recenter_requested,
        }
    }

    /// True if either axis is being held.
    #[inline]
    #[must_use]
    pub const fn any_hold(&self) -> bool {
        self.speed_hold || self.turn_hold
    }

    /// Clear the fields that describe a single edge: both deltas and the
    /// option toggles. Hold flags and action flags are left untouched.
    pub fn clear_edges(&mut self) {
        self.speed_delta = 0;
        self.turn_delta = 0;
        self.options = Options::NONE;
    }
}
