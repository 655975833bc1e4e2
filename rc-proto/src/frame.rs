//! Fixed-size binary frame carried by the radio link.
//!
//! This layout is the interoperability contract with the vehicle firmware.
//! All multi-byte fields are little-endian, booleans are a single `0`/`1` byte.
//!
//! ```text
//! offset  size  field
//!      0     4  sequence            u32
//!      4     2  speed_delta         i16
//!      6     1  speed_hold          bool
//!      7     2  turn_delta          i16
//!      9     1  turn_hold           bool
//!     10     1  stop_requested      bool
//!     11     1  recenter_requested  bool
//!     12     4  options             u32
//! ```

use crate::types::{CommandState, Options};

/// Size of an encoded frame in bytes.
pub const FRAME_SIZE: usize = 16;

/// Largest payload the link layer accepts.
pub const MAX_LINK_PAYLOAD: usize = 32;

const _: () = assert!(FRAME_SIZE <= MAX_LINK_PAYLOAD);

const SEQUENCE: usize = 0;
const SPEED_DELTA: usize = 4;
const SPEED_HOLD: usize = 6;
const TURN_DELTA: usize = 7;
const TURN_HOLD: usize = 9;
const STOP: usize = 10;
const RECENTER: usize = 11;
const OPTIONS: usize = 12;

/// Error type for frame encoding and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// The output buffer cannot hold a frame.
    BufferTooSmall,
    /// The input is not exactly one frame long.
    InvalidLength,
    /// A boolean byte held something other than 0 or 1.
    InvalidFlag { offset: u8 },
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::InvalidLength => write!(f, "invalid frame length"),
            Self::InvalidFlag { offset } => write!(f, "invalid flag byte at offset {offset}"),
        }
    }
}

/// Encode a Command State into a frame.
#[must_use]
pub fn encode(state: &CommandState) -> [u8; FRAME_SIZE] {
    let mut buf = [0u8; FRAME_SIZE];
    buf[SEQUENCE..SEQUENCE + 4].copy_from_slice(&state.sequence.to_le_bytes());
    buf[SPEED_DELTA..SPEED_DELTA + 2].copy_from_slice(&state.speed_delta.to_le_bytes());
    buf[SPEED_HOLD] = state.speed_hold as u8;
    buf[TURN_DELTA..TURN_DELTA + 2].copy_from_slice(&state.turn_delta.to_le_bytes());
    buf[TURN_HOLD] = state.turn_hold as u8;
    buf[STOP] = state.stop_requested as u8;
    buf[RECENTER] = state.recenter_requested as u8;
    buf[OPTIONS..OPTIONS + 4].copy_from_slice(&state.options.raw().to_le_bytes());
    buf
}

/// Encode into a caller-provided buffer, returning the number of bytes written.
///
/// # Errors
///
/// Returns [`FrameError::BufferTooSmall`] if `buf` is shorter than [`FRAME_SIZE`].
pub fn encode_into(state: &CommandState, buf: &mut [u8]) -> Result<usize, FrameError> {
    let out = buf
        .get_mut(..FRAME_SIZE)
        .ok_or(FrameError::BufferTooSmall)?;
    out.copy_from_slice(&encode(state));
    Ok(FRAME_SIZE)
}

/// Decode a frame back into a Command State (the receiver's view).
///
/// # Errors
///
/// Returns [`FrameError::InvalidLength`] unless `bytes` is exactly one frame,
/// and [`FrameError::InvalidFlag`] for a boolean byte outside `0..=1`.
pub fn decode(bytes: &[u8]) -> Result<CommandState, FrameError> {
    let bytes: &[u8; FRAME_SIZE] = bytes.try_into().map_err(|_| FrameError::InvalidLength)?;

    Ok(CommandState {
        sequence: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        speed_delta: i16::from_le_bytes([bytes[SPEED_DELTA], bytes[SPEED_DELTA + 1]]),
        speed_hold: flag(bytes, SPEED_HOLD)?,
        turn_delta: i16::from_le_bytes([bytes[TURN_DELTA], bytes[TURN_DELTA + 1]]),
        turn_hold: flag(bytes, TURN_HOLD)?,
        stop_requested: flag(bytes, STOP)?,
        recenter_requested: flag(bytes, RECENTER)?,
        options: Options(u32::from_le_bytes([
            bytes[OPTIONS],
            bytes[OPTIONS + 1],
            bytes[OPTIONS + 2],
            bytes[OPTIONS + 3],
        ])),
    })
}

#[inline]
fn flag(bytes: &[u8; FRAME_SIZE], offset: usize) -> Result<bool, FrameError> {
    match bytes[offset] {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(FrameError::InvalidFlag {
            offset: offset as u8,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiescent_frame_is_zero() {
        assert_eq!(encode(&CommandState::quiescent()), [0u8; FRAME_SIZE]);
    }

    #[test]
    fn test_field_offsets() {
        let state = CommandState {
            sequence: 0x0403_0201,
            speed_delta: -2,
            speed_hold: true,
            turn_delta: 0x0105,
            turn_hold: false,
            stop_requested: true,
            recenter_requested: false,
            options: Options(0xAABB_CCDD),
        };
        let frame = encode(&state);
        assert_eq!(
            frame,
            [
                0x01, 0x02, 0x03, 0x04, // sequence
                0xFE, 0xFF, // speed_delta
                0x01, // speed_hold
                0x05, 0x01, // turn_delta
                0x00, // turn_hold
                0x01, // stop
                0x00, // recenter
                0xDD, 0xCC, 0xBB, 0xAA, // options
            ]
        );
        assert_eq!(decode(&frame), Ok(state));
    }

    #[test]
    fn test_encode_into_buffer_too_small() {
        let mut buf = [0u8; FRAME_SIZE - 1];
        assert_eq!(
            encode_into(&CommandState::quiescent(), &mut buf),
            Err(FrameError::BufferTooSmall)
        );
    }

    #[test]
    fn test_encode_into_larger_buffer() {
        let mut buf = [0xFFu8; MAX_LINK_PAYLOAD];
        let len = encode_into(&CommandState::quiescent(), &mut buf).unwrap();
        assert_eq!(len, FRAME_SIZE);
        assert!(buf[..len].iter().all(|&b| b == 0));
        assert_eq!(buf[len], 0xFF);
    }

    #[test]
    fn test_decode_rejects_bad_length() {
        assert_eq!(decode(&[0u8; 15]), Err(FrameError::InvalidLength));
        assert_eq!(decode(&[0u8; 17]), Err(FrameError::InvalidLength));
    }

    #[test]
    fn test_decode_rejects_bad_flag() {
        let mut frame = [0u8; FRAME_SIZE];
        frame[11] = 2;
        assert_eq!(decode(&frame), Err(FrameError::InvalidFlag { offset: 11 }));
    }
}
