//! Wire-level types for the hand-held rc transmitter.
//!
//! - **Types**: [`CommandState`] (the relative-delta command record),
//!   [`Options`] (auxiliary toggle bits), [`Axis`], [`Direction`], [`Action`]
//! - **Frame**: fixed 16-byte little-endian radio payload ([`frame::encode`],
//!   [`frame::decode`]); this layout is what the vehicle firmware expects
//! - **Serial**: checksummed ASCII line protocol used by the serial debug
//!   input mode ([`parse_line`], [`SerialCommand::write_line`])
//!
//! # Example
//!
//! ```
//! use rc_proto::{frame, CommandState, FRAME_SIZE};
//!
//! let state = CommandState {
//!     sequence: 42,
//!     speed_delta: 10,
//!     ..CommandState::quiescent()
//! };
//! let bytes = frame::encode(&state);
//! assert_eq!(bytes.len(), FRAME_SIZE);
//! assert_eq!(frame::decode(&bytes), Ok(state));
//! ```
//!
//! ```
//! use rc_proto::{parse_line, Action, SerialCommand};
//!
//! assert_eq!(parse_line(b"AS*BE\n"), Ok(SerialCommand::Action(Action::Stop)));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Derive `defmt::Format` on all public types

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod frame;
pub mod serial;
pub mod types;

pub use frame::{FrameError, FRAME_SIZE, MAX_LINK_PAYLOAD};
pub use serial::{parse_line, SerialCommand, SerialError, MAX_COMMAND_SIZE, MAX_LINE_LENGTH};
pub use types::{Action, Axis, CommandState, Direction, Options};
