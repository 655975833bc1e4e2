//! Line protocol for driving the transmitter from a serial console.
//!
//! Every line is `<prefix><body>*<checksum>\n` where the checksum is the
//! CRC-8/SMBUS of the body bytes (between prefix and `*`) as two hex digits.
//! A CR before the LF is ignored.
//!
//! | Line        | Command                                  |
//! |-------------|------------------------------------------|
//! | `CS+` `CS-` | click speed forward / reverse            |
//! | `CT+` `CT-` | click turn right / left                  |
//! | `HS` `HT`   | start holding speed / turn               |
//! | `RS` `RT`   | release speed / turn                     |
//! | `AS` `AC`   | action: emergency stop / re-center       |
//! | `O<8 hex>`  | option toggle request bits               |
//!
//! ```text
//! CS+*E2
//! AS*BE
//! O0000000A*A9
//! ```

use crate::types::{Action, Axis, Direction, Options};
use crc::{Crc, CRC_8_SMBUS};

/// Maximum accepted line length, including the line ending.
pub const MAX_LINE_LENGTH: usize = 32;

/// Longest line [`SerialCommand::write_line`] produces: `O` + 8 hex + `*XX` + `\n`.
pub const MAX_COMMAND_SIZE: usize = 13;

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// CRC-8/SMBUS of a line body.
#[inline]
#[must_use]
pub fn checksum(body: &[u8]) -> u8 {
    CRC8.checksum(body)
}

/// A single decoded console command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum SerialCommand {
    /// One step on an axis, like a short button press.
    Click(Axis, Direction),
    /// Start holding an axis.
    Hold(Axis),
    /// Stop holding an axis and return it to quiescent.
    Release(Axis),
    /// Trigger a one-shot action.
    Action(Action),
    /// Request option toggles.
    Options(Options),
}

/// Error type for the serial line protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// Malformed line.
    Parse,
    /// Checksum mismatch.
    Checksum,
    /// Output buffer too small.
    BufferTooSmall,
}

impl core::fmt::Display for SerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse => write!(f, "malformed line"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::BufferTooSmall => write!(f, "buffer too small"),
        }
    }
}

/// Parse one console line.
pub fn parse_line(line: &[u8]) -> Result<SerialCommand, SerialError> {
    let line = strip_line_ending(line);
    let (&prefix, _) = line.split_first().ok_or(SerialError::Parse)?;
    let body = verified_body(line)?;

    match (prefix, body) {
        (b'C', [axis, sign]) => {
            let direction = match sign {
                b'+' => Direction::Positive,
                b'-' => Direction::Negative,
                _ => return Err(SerialError::Parse),
            };
            Ok(SerialCommand::Click(parse_axis(*axis)?, direction))
        }
        (b'H', [axis]) => Ok(SerialCommand::Hold(parse_axis(*axis)?)),
        (b'R', [axis]) => Ok(SerialCommand::Release(parse_axis(*axis)?)),
        (b'A', [b'S']) => Ok(SerialCommand::Action(Action::Stop)),
        (b'A', [b'C']) => Ok(SerialCommand::Action(Action::Recenter)),
        (b'O', hex) => Ok(SerialCommand::Options(Options(parse_hex_u32(hex)?))),
        _ => Err(SerialError::Parse),
    }
}

impl SerialCommand {
    /// Write this command as a complete line, returning its length.
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::BufferTooSmall`] if `buf` is shorter than the line.
    pub fn write_line(&self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let mut body = [0u8; 8];
        let (prefix, body_len) = match *self {
            Self::Click(axis, direction) => {
                body[0] = axis_byte(axis);
                body[1] = match direction {
                    Direction::Positive => b'+',
                    Direction::Negative => b'-',
                };
                (b'C', 2)
            }
            Self::Hold(axis) => {
                body[0] = axis_byte(axis);
                (b'H', 1)
            }
            Self::Release(axis) => {
                body[0] = axis_byte(axis);
                (b'R', 1)
            }
            Self::Action(action) => {
                body[0] = match action {
                    Action::Stop => b'S',
                    Action::Recenter => b'C',
                };
                (b'A', 1)
            }
            Self::Options(opts) => {
                for (i, slot) in body.iter_mut().enumerate() {
                    let nibble = (opts.raw() >> (28 - 4 * i)) & 0xF;
                    *slot = HEX_DIGITS[nibble as usize];
                }
                (b'O', 8)
            }
        };
        let body = &body[..body_len];

        // prefix + body + '*' + 2 hex + '\n'
        let len = 1 + body.len() + 4;
        let out = buf.get_mut(..len).ok_or(SerialError::BufferTooSmall)?;
        let crc = checksum(body);

        out[0] = prefix;
        out[1..=body.len()].copy_from_slice(body);
        let tail = &mut out[body.len() + 1..];
        tail[0] = b'*';
        tail[1] = HEX_DIGITS[(crc >> 4) as usize];
        tail[2] = HEX_DIGITS[(crc & 0xF) as usize];
        tail[3] = b'\n';
        Ok(len)
    }
}

#[inline]
fn axis_byte(axis: Axis) -> u8 {
    match axis {
        Axis::Speed => b'S',
        Axis::Turn => b'T',
    }
}

#[inline]
fn parse_axis(b: u8) -> Result<Axis, SerialError> {
    match b {
        b'S' => Ok(Axis::Speed),
        b'T' => Ok(Axis::Turn),
        _ => Err(SerialError::Parse),
    }
}

/// Strip trailing CR and/or LF from a line.
#[inline]
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    if end > 0 && line[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && line[end - 1] == b'\r' {
        end -= 1;
    }
    &line[..end]
}

/// Split off `*XX`, verify it against the body and return the body.
fn verified_body(line: &[u8]) -> Result<&[u8], SerialError> {
    let star = line
        .iter()
        .rposition(|&b| b == b'*')
        .ok_or(SerialError::Parse)?;

    // At least the prefix before '*', exactly two digits after it.
    if star == 0 || line.len() != star + 3 {
        return Err(SerialError::Parse);
    }

    let body = &line[1..star];
    let received = parse_hex_u8(&line[star + 1..])?;
    if checksum(body) != received {
        return Err(SerialError::Checksum);
    }
    Ok(body)
}

#[inline]
fn parse_hex_u8(s: &[u8]) -> Result<u8, SerialError> {
    match s {
        [high, low] => Ok((hex_digit(*high)? << 4) | hex_digit(*low)?),
        _ => Err(SerialError::Parse),
    }
}

#[inline]
fn parse_hex_u32(s: &[u8]) -> Result<u32, SerialError> {
    if s.len() != 8 {
        return Err(SerialError::Parse);
    }
    s.iter()
        .try_fold(0u32, |acc, &b| Ok((acc << 4) | u32::from(hex_digit(b)?)))
}

#[inline]
fn hex_digit(b: u8) -> Result<u8, SerialError> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        _ => Err(SerialError::Parse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_check_value() {
        assert_eq!(checksum(b"123456789"), 0xF4);
    }

    #[test]
    fn test_parse_click() {
        assert_eq!(
            parse_line(b"CS+*E2\n"),
            Ok(SerialCommand::Click(Axis::Speed, Direction::Positive))
        );
        assert_eq!(
            parse_line(b"CT-*9B\r\n"),
            Ok(SerialCommand::Click(Axis::Turn, Direction::Negative))
        );
    }

    #[test]
    fn test_parse_hold_release() {
        assert_eq!(parse_line(b"HS*BE"), Ok(SerialCommand::Hold(Axis::Speed)));
        assert_eq!(parse_line(b"RT*AB"), Ok(SerialCommand::Release(Axis::Turn)));
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(parse_line(b"AS*BE"), Ok(SerialCommand::Action(Action::Stop)));
        assert_eq!(
            parse_line(b"AC*ce"),
            Ok(SerialCommand::Action(Action::Recenter))
        );
    }

    #[test]
    fn test_parse_options() {
        assert_eq!(
            parse_line(b"O0000000A*A9\n"),
            Ok(SerialCommand::Options(Options::HORN | Options::AUX1))
        );
    }

    #[test]
    fn test_parse_bad_checksum() {
        assert_eq!(parse_line(b"CS+*E3"), Err(SerialError::Checksum));
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(parse_line(b""), Err(SerialError::Parse));
        assert_eq!(parse_line(b"\n"), Err(SerialError::Parse));
        assert_eq!(parse_line(b"CS+"), Err(SerialError::Parse));
        assert_eq!(parse_line(b"*E2"), Err(SerialError::Parse));
        assert_eq!(parse_line(b"CS+*E"), Err(SerialError::Parse));
        assert_eq!(parse_line(b"CS+*E2F"), Err(SerialError::Parse));
        // Valid checksum, unknown axis
        let mut buf = [0u8; MAX_COMMAND_SIZE];
        buf[..2].copy_from_slice(b"HX");
        let crc = checksum(b"X");
        buf[2] = b'*';
        buf[3] = HEX_DIGITS[(crc >> 4) as usize];
        buf[4] = HEX_DIGITS[(crc & 0xF) as usize];
        assert_eq!(parse_line(&buf[..5]), Err(SerialError::Parse));
    }

    #[test]
    fn test_write_line_matches_parser() {
        let commands = [
            SerialCommand::Click(Axis::Turn, Direction::Positive),
            SerialCommand::Hold(Axis::Turn),
            SerialCommand::Release(Axis::Speed),
            SerialCommand::Action(Action::Recenter),
            SerialCommand::Options(Options(0xDEAD_BEEF)),
        ];
        for command in commands {
            let mut buf = [0u8; MAX_COMMAND_SIZE];
            let len = command.write_line(&mut buf).unwrap();
            assert_eq!(buf[len - 1], b'\n');
            assert_eq!(parse_line(&buf[..len]), Ok(command));
        }
    }

    #[test]
    fn test_write_line_exact_bytes() {
        let mut buf = [0u8; MAX_COMMAND_SIZE];
        let len = SerialCommand::Action(Action::Stop)
            .write_line(&mut buf)
            .unwrap();
        assert_eq!(&buf[..len], b"AS*BE\n");
    }

    #[test]
    fn test_write_line_buffer_too_small() {
        let mut buf = [0u8; 12];
        assert_eq!(
            SerialCommand::Options(Options::LIGHTS).write_line(&mut buf),
            Err(SerialError::BufferTooSmall)
        );
    }
}
