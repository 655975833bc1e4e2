//! Hand-held rc transmitter firmware for RP2040.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Samples four direction buttons and an analog action ladder every tick
//!    (or, with the mode strap pulled low, reads command lines from UART)
//! 2. Runs the [`rc_core::Transmitter`] control loop on them
//! 3. Sends the resulting frames to the vehicle over an nRF24L01+
//!
//! # Hardware Configuration
//!
//! | Function   | GPIO       | Description |
//! |------------|------------|-------------|
//! | Buttons    | 2, 3, 4, 5 | Forward, reverse, right, left (active low) |
//! | Ladder     | 26         | Stop / recenter / lights / horn (ADC0) |
//! | Mode strap | 22         | Low at boot selects serial debug input |
//! | UART1 TX   | 8          | Serial transmit |
//! | UART1 RX   | 9          | Serial debug command input |
//! | SPI0       | 16-19      | nRF24L01+ (MISO, CSN, SCK, MOSI) |
//! | CE         | 20         | nRF24L01+ chip enable |
//! | LED        | 25         | On-board LED (link failure indicator) |
//!
//! # Architecture
//!
//! Two Embassy tasks:
//!
//! - **Control Task**: owns the transmitter; every tick it polls the ladder,
//!   drains serial commands, and runs one control-loop iteration
//! - **Serial Task** (serial debug mode only): reads UART lines and forwards
//!   parsed commands through an [`embassy_sync::channel::Channel`]
//!
//! # Modules
//!
//! - [`buttons`]: GPIO buttons ([`GpioButton`]) and the ADC ladder ([`LadderInput`])
//! - [`nrf24`]: radio driver ([`Nrf24`])
//! - [`serial`]: UART command reader ([`SerialCommandReader`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)

#![no_std]

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features");

pub mod buttons;
pub mod nrf24;
pub mod serial;

pub use buttons::{DirectionButton, GpioButton, LadderInput};
pub use nrf24::{Nrf24, RadioConfig, PAYLOAD_SIZE};
pub use serial::{serial_reader_task, SerialCommandReader, COMMANDS};
