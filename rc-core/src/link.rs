//! Radio link trait, link errors and send counters.

use core::future::Future;

/// Error type for a single send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// The frame went out but the receiver never acknowledged it.
    NoAck,
    /// The radio did not report completion in time.
    Timeout,
    /// Bus or peripheral error talking to the radio.
    Io,
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoAck => write!(f, "not acknowledged"),
            Self::Timeout => write!(f, "link timeout"),
            Self::Io => write!(f, "radio i/o error"),
        }
    }
}

/// Point-to-point radio transport.
///
/// One call is one send attempt. `Ok` means the receiver acknowledged the
/// frame; any error means it may or may not have arrived.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait RadioLink {
    /// Send `frame` to the vehicle with link-layer id `destination`.
    fn send(&mut self, destination: u8, frame: &[u8])
        -> impl Future<Output = Result<(), LinkError>>;
}

/// Running totals of send attempts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    pub sent: u32,
    pub acked: u32,
    pub failed: u32,
}

impl LinkStats {
    /// Record the outcome of one attempt.
    pub fn record(&mut self, result: &Result<(), LinkError>) {
        self.sent = self.sent.wrapping_add(1);
        match result {
            Ok(()) => self.acked = self.acked.wrapping_add(1),
            Err(_) => self.failed = self.failed.wrapping_add(1),
        }
    }
}
