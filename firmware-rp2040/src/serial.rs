//! UART reader for serial debug commands.
//!
//! Reads checksummed lines (see [`rc_proto::serial`]) and parses them into
//! [`SerialCommand`]s. The control task drains the parsed commands once per
//! tick through [`COMMANDS`].
//!
//! # Pins
//!
//! Uses UART1 at 115200 8N1:
//! - GPIO 8: TX
//! - GPIO 9: RX

use embassy_rp::uart::{Async, Error as UartError, UartRx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;
use rc_core::InputError;
use rc_proto::{parse_line, SerialCommand, MAX_LINE_LENGTH};

/// Parsed commands not yet picked up by the control task.
pub const COMMAND_BACKLOG: usize = 8;

pub type CommandChannel = Channel<CriticalSectionRawMutex, SerialCommand, COMMAND_BACKLOG>;

/// Reader task to control task.
pub static COMMANDS: CommandChannel = Channel::new();

/// Convert UART errors to [`InputError`].
///
/// This is a helper function instead of a `From` impl to avoid orphan rule issues
/// (both `UartError` and `InputError` are defined in external crates).
#[inline]
fn uart_error_to_input_error(e: UartError) -> InputError {
    match e {
        UartError::Framing => InputError::Framing,
        UartError::Overrun => InputError::BufferOverflow,
        _ => InputError::Io,
    }
}

/// Line reader over the debug UART.
pub struct SerialCommandReader<'d> {
    rx: UartRx<'d, Async>,
    buffer: Vec<u8, MAX_LINE_LENGTH>,
}

impl<'d> SerialCommandReader<'d> {
    #[must_use]
    pub fn new(rx: UartRx<'d, Async>) -> Self {
        Self {
            rx,
            buffer: Vec::new(),
        }
    }

    /// Read bytes until a newline is found or buffer is full.
    ///
    /// If a line exceeds the buffer capacity, the rest of the line is
    /// discarded so the next read starts on a line boundary.
    async fn read_line(&mut self) -> Result<(), InputError> {
        self.buffer.clear();
        let mut byte = [0u8; 1];

        loop {
            self.rx
                .read(&mut byte)
                .await
                .map_err(uart_error_to_input_error)?;

            if byte[0] == b'\n' {
                return Ok(());
            }

            if self.buffer.push(byte[0]).is_err() {
                // Buffer overflow - discard rest of line until newline
                loop {
                    self.rx
                        .read(&mut byte)
                        .await
                        .map_err(uart_error_to_input_error)?;
                    if byte[0] == b'\n' {
                        break;
                    }
                }
                return Err(InputError::BufferOverflow);
            }
        }
    }

    /// Wait for the next valid command line.
    ///
    /// # Errors
    ///
    /// Returns the first UART, framing, or parse error encountered; the
    /// offending line is consumed.
    pub async fn receive(&mut self) -> Result<SerialCommand, InputError> {
        self.read_line().await?;
        Ok(parse_line(&self.buffer)?)
    }
}

/// Reads command lines forever and forwards them to [`COMMANDS`].
#[embassy_executor::task]
pub async fn serial_reader_task(mut reader: SerialCommandReader<'static>) {
    loop {
        match reader.receive().await {
            Ok(command) => {
                if COMMANDS.try_send(command).is_err() {
                    defmt::warn!("serial backlog full, dropped {:?}", command);
                }
            }
            Err(InputError::Parse) => {
                defmt::warn!("serial: unparsable line {=[u8]:a}", reader.buffer.as_slice());
            }
            Err(e) => {
                defmt::warn!("serial input error: {}", e);
            }
        }
    }
}
