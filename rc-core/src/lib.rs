//! Platform-agnostic control core for the hand-held rc transmitter.
//!
//! Turns button presses (or serial debug commands) into relative speed/turn
//! commands and decides when a frame goes out on the radio. Nothing in here
//! touches hardware; the firmware crate supplies input channels and a
//! [`RadioLink`].
//!
//! # Overview
//!
//! - [`encoder`]: press/hold/release into deltas and hold flags ([`ButtonEncoder`],
//!   [`SerialEncoder`])
//! - [`detect`]: change detection ([`needs_transmit`])
//! - [`toggle`]: toggle-confirm handshake for stop and recenter ([`ToggleConfirm`])
//! - [`transmitter`]: the per-tick loop and transmission gate ([`Transmitter`])
//! - [`input`], [`debounce`], [`ladder`]: input channel trait and helpers
//! - [`events`]: bounded event queue between input handlers and the loop
//! - [`link`]: radio transport trait ([`RadioLink`])
//! - [`config`]: tuning constants ([`Config`])
//!
//! # Example
//!
//! ```rust
//! use rc_core::{Config, SerialEncoder};
//! use rc_proto::{CommandState, SerialCommand, Axis, Direction};
//! use rc_core::{CommandEncoder, EventQueue};
//!
//! let config = Config::DEFAULT;
//! let mut encoder = SerialEncoder::new(&config);
//! encoder.feed(SerialCommand::Click(Axis::Speed, Direction::Positive)).unwrap();
//!
//! let mut state = CommandState::quiescent();
//! let mut events = EventQueue::new();
//! encoder.encode(0, &mut state, &mut events);
//! assert_eq!(state.speed_delta, config.speed_step);
//! assert!(rc_core::needs_transmit(&state));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and route logging through defmt
//! - **`log`**: Route logging through the `log` facade
//!
//! Without `defmt` or `log` the logging calls compile to nothing.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Must come first so the macros are visible to every module below.
mod logging;

pub mod config;
pub mod debounce;
pub mod detect;
pub mod encoder;
pub mod events;
pub mod input;
pub mod ladder;
pub mod link;
pub mod toggle;
pub mod transmitter;

// Re-export main types at crate root
pub use config::{Config, InputMode};
pub use debounce::Debouncer;
pub use detect::needs_transmit;
pub use encoder::{ButtonEncoder, CommandEncoder, Control, ModeEncoder, SerialEncoder};
pub use events::{ControlEvent, EventQueue, QueueFull, EVENT_QUEUE_DEPTH};
pub use input::{Button, InputChannel, InputError, RawLevel};
pub use ladder::{AnalogLadder, LadderBand, LadderKey, DEFAULT_BANDS};
pub use link::{LinkError, LinkStats, RadioLink};
pub use toggle::{TogglePhase, ToggleConfirm};
pub use transmitter::{TickReport, Transmitter};
