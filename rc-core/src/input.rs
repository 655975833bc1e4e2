//! Input channel trait, the debounced button built on it, and input errors.

use crate::debounce::Debouncer;
use rc_proto::SerialError;

/// Error type for input operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// UART/communication I/O error.
    Io,
    /// Malformed command line.
    Parse,
    /// Checksum mismatch.
    Checksum,
    /// Line too long, or too many commands pending.
    BufferOverflow,
    /// UART framing error.
    Framing,
}

impl From<SerialError> for InputError {
    fn from(err: SerialError) -> Self {
        match err {
            SerialError::Parse => InputError::Parse,
            SerialError::Checksum => InputError::Checksum,
            SerialError::BufferTooSmall => InputError::BufferOverflow,
        }
    }
}

impl core::fmt::Display for InputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "i/o error"),
            Self::Parse => write!(f, "parse error"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::BufferOverflow => write!(f, "buffer overflow"),
            Self::Framing => write!(f, "framing error"),
        }
    }
}

/// Debounced view of one physical control.
///
/// `update` must be called exactly once per tick before any of the queries;
/// the queries then describe the control as of that tick.
pub trait InputChannel {
    /// Sample the control at tick time `now_ms`.
    fn update(&mut self, now_ms: u32);

    /// The control is currently down.
    fn pressed(&self) -> bool;

    /// The control has been down for at least `ms`.
    fn held_for(&self, ms: u32) -> bool;

    /// The control went from down to up on this tick.
    fn just_released(&self) -> bool;

    /// The control has been up for at least `ms`.
    fn released_for(&self, ms: u32) -> bool;
}

/// Source of a raw, undebounced contact level.
pub trait RawLevel {
    /// True while the contact is closed.
    fn is_active(&mut self) -> bool;
}

/// A contact plus the debounce filter that turns it into an [`InputChannel`].
pub struct Button<P> {
    pin: P,
    debouncer: Debouncer,
}

impl<P: RawLevel> Button<P> {
    #[must_use]
    pub const fn new(pin: P, debounce_ms: u32) -> Self {
        Self {
            pin,
            debouncer: Debouncer::new(debounce_ms),
        }
    }

    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}

impl<P: RawLevel> InputChannel for Button<P> {
    fn update(&mut self, now_ms: u32) {
        let raw = self.pin.is_active();
        self.debouncer.update(raw, now_ms);
    }

    fn pressed(&self) -> bool {
        self.debouncer.pressed()
    }

    fn held_for(&self, ms: u32) -> bool {
        self.debouncer.held_for(ms)
    }

    fn just_released(&self) -> bool {
        self.debouncer.just_released()
    }

    fn released_for(&self, ms: u32) -> bool {
        self.debouncer.released_for(ms)
    }
}
