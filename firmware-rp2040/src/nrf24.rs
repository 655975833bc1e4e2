//! nRF24L01+ transmit-only driver implementing [`RadioLink`].
//!
//! # Wiring
//!
//! | nRF24 Pin | Function                    | GPIO |
//! |-----------|-----------------------------|------|
//! | CSN       | SPI chip select (active low) | 17   |
//! | SCK       | SPI clock                   | 18   |
//! | MOSI      | SPI data in                 | 19   |
//! | MISO      | SPI data out                | 16   |
//! | CE        | TX enable pulse             | 20   |
//! | IRQ       | not used, STATUS is polled  | -    |
//!
//! # Link behavior
//!
//! Enhanced ShockBurst with auto-acknowledge on pipe 0 and a fixed
//! [`PAYLOAD_SIZE`]-byte payload. The hardware retransmits once
//! (`SETUP_RETR` ARC = 1) before reporting `MAX_RT`; the driver never retries
//! on its own. The vehicle address is `[destination, base_address..]`, so the
//! link-layer destination id selects the receiver.

use embassy_time::{with_timeout, Duration, Timer};
use embedded_hal::digital::OutputPin;
use embedded_hal_async::spi::SpiDevice;
use rc_core::{LinkError, RadioLink};
use rc_proto::FRAME_SIZE;

#[allow(dead_code)]
mod regs {
    pub const CONFIG: u8 = 0x00;
    pub const EN_AA: u8 = 0x01;
    pub const EN_RXADDR: u8 = 0x02;
    pub const SETUP_AW: u8 = 0x03;
    pub const SETUP_RETR: u8 = 0x04;
    pub const RF_CH: u8 = 0x05;
    pub const RF_SETUP: u8 = 0x06;
    pub const STATUS: u8 = 0x07;
    pub const OBSERVE_TX: u8 = 0x08;
    pub const RX_ADDR_P0: u8 = 0x0A;
    pub const TX_ADDR: u8 = 0x10;
    pub const RX_PW_P0: u8 = 0x11;
    pub const FIFO_STATUS: u8 = 0x17;
    pub const DYNPD: u8 = 0x1C;
    pub const FEATURE: u8 = 0x1D;
}

// SPI commands
const R_REGISTER: u8 = 0x00;
const W_REGISTER: u8 = 0x20;
const W_TX_PAYLOAD: u8 = 0xA0;
const FLUSH_TX: u8 = 0xE1;
const FLUSH_RX: u8 = 0xE2;

// CONFIG bits
const EN_CRC: u8 = 1 << 3;
const CRCO: u8 = 1 << 2;
const PWR_UP: u8 = 1 << 1;

// STATUS bits
const RX_DR: u8 = 1 << 6;
const TX_DS: u8 = 1 << 5;
const MAX_RT: u8 = 1 << 4;

/// 5-byte addresses.
const AW_5_BYTES: u8 = 0b11;
/// ARD = 500 us, ARC = 1.
const RETR_500US_ONCE: u8 = (1 << 4) | 0x01;
/// 1 Mbps, 0 dBm.
const RF_1MBPS_0DBM: u8 = 0b11 << 1;

pub const PAYLOAD_SIZE: usize = FRAME_SIZE;
const ADDRESS_WIDTH: usize = 5;

/// Radio settings applied at init.
#[derive(Clone, Copy, Debug, defmt::Format)]
pub struct RadioConfig {
    /// RF channel, 2400 + `channel` MHz. 0..=125.
    pub channel: u8,
    /// Address bytes 1..5, shared by all vehicles of this transmitter.
    pub base_address: [u8; ADDRESS_WIDTH - 1],
    /// Upper bound for one send including the hardware retransmit.
    pub send_timeout: Duration,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            channel: 76,
            base_address: *b"RCTX",
            send_timeout: Duration::from_millis(5),
        }
    }
}

pub struct Nrf24<SPI, CE> {
    spi: SPI,
    ce: CE,
    config: RadioConfig,
    /// Destination the TX/RX_P0 addresses are currently set to.
    addressed: Option<u8>,
}

impl<SPI, CE> Nrf24<SPI, CE>
where
    SPI: SpiDevice,
    CE: OutputPin,
{
    /// Configure the radio as a primary transmitter and power it up.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Io`] on SPI failure or if the address width does
    /// not read back, which almost always means bad wiring.
    pub async fn new(spi: SPI, mut ce: CE, config: RadioConfig) -> Result<Self, LinkError> {
        ce.set_low().map_err(|_| LinkError::Io)?;
        let mut radio = Self {
            spi,
            ce,
            config,
            addressed: None,
        };

        // Power-on reset
        Timer::after(Duration::from_millis(100)).await;

        radio.write_reg(regs::SETUP_AW, AW_5_BYTES).await?;
        let aw = radio.read_reg(regs::SETUP_AW).await?;
        if aw != AW_5_BYTES {
            defmt::error!("nRF24 SETUP_AW read back {=u8:#x}", aw);
            return Err(LinkError::Io);
        }

        radio.write_reg(regs::EN_AA, 0x01).await?;
        radio.write_reg(regs::EN_RXADDR, 0x01).await?;
        radio.write_reg(regs::SETUP_RETR, RETR_500US_ONCE).await?;
        radio.write_reg(regs::RF_CH, config.channel & 0x7F).await?;
        radio.write_reg(regs::RF_SETUP, RF_1MBPS_0DBM).await?;
        radio.write_reg(regs::RX_PW_P0, PAYLOAD_SIZE as u8).await?;
        radio.write_reg(regs::DYNPD, 0x00).await?;
        radio.write_reg(regs::FEATURE, 0x00).await?;
        radio.write_reg(regs::STATUS, RX_DR | TX_DS | MAX_RT).await?;
        radio.command(FLUSH_TX).await?;
        radio.command(FLUSH_RX).await?;

        // PRIM_RX = 0: primary transmitter
        radio.write_reg(regs::CONFIG, EN_CRC | CRCO | PWR_UP).await?;
        // Tpd2stby
        Timer::after(Duration::from_micros(1500)).await;

        defmt::info!("nRF24 ready on channel {}", config.channel);
        Ok(radio)
    }

    /// One send attempt with hardware auto-ack.
    ///
    /// # Errors
    ///
    /// - [`LinkError::NoAck`]: the retransmit budget ran out without an ack
    /// - [`LinkError::Timeout`]: the radio reported nothing within `send_timeout`
    /// - [`LinkError::Io`]: SPI/pin failure or a payload that is not exactly
    ///   [`PAYLOAD_SIZE`] bytes
    pub async fn transmit(&mut self, destination: u8, frame: &[u8]) -> Result<(), LinkError> {
        if frame.len() != PAYLOAD_SIZE {
            return Err(LinkError::Io);
        }
        self.address(destination).await?;

        self.write_reg(regs::STATUS, TX_DS | MAX_RT).await?;
        let mut buf = [0u8; PAYLOAD_SIZE + 1];
        buf[0] = W_TX_PAYLOAD;
        buf[1..].copy_from_slice(frame);
        self.spi.write(&buf).await.map_err(|_| LinkError::Io)?;

        // CE pulse >= 10 us starts the transmission
        self.ce.set_high().map_err(|_| LinkError::Io)?;
        Timer::after(Duration::from_micros(15)).await;
        self.ce.set_low().map_err(|_| LinkError::Io)?;

        let outcome = match with_timeout(self.config.send_timeout, self.wait_done()).await {
            Ok(result) => result,
            Err(_) => Err(LinkError::Timeout),
        };

        if outcome.is_err() {
            self.write_reg(regs::STATUS, TX_DS | MAX_RT).await?;
            self.command(FLUSH_TX).await?;
        }
        outcome
    }

    /// Poll STATUS until the packet is acknowledged or given up on.
    async fn wait_done(&mut self) -> Result<(), LinkError> {
        loop {
            let status = self.status().await?;
            if status & TX_DS != 0 {
                self.write_reg(regs::STATUS, TX_DS).await?;
                return Ok(());
            }
            if status & MAX_RT != 0 {
                return Err(LinkError::NoAck);
            }
            Timer::after(Duration::from_micros(100)).await;
        }
    }

    /// Point TX and pipe 0 (for the ack) at `destination`.
    async fn address(&mut self, destination: u8) -> Result<(), LinkError> {
        if self.addressed == Some(destination) {
            return Ok(());
        }
        let mut address = [0u8; ADDRESS_WIDTH];
        address[0] = destination;
        address[1..].copy_from_slice(&self.config.base_address);

        self.write_multi(regs::TX_ADDR, &address).await?;
        self.write_multi(regs::RX_ADDR_P0, &address).await?;
        self.addressed = Some(destination);
        defmt::debug!("nRF24 addressed to vehicle {}", destination);
        Ok(())
    }

    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Register access
    // -----------------------------------------------------------------------

    async fn status(&mut self) -> Result<u8, LinkError> {
        // NOP returns STATUS as the first byte
        let mut buf = [0xFF];
        self.spi
            .transfer_in_place(&mut buf)
            .await
            .map_err(|_| LinkError::Io)?;
        Ok(buf[0])
    }

    async fn command(&mut self, command: u8) -> Result<(), LinkError> {
        self.spi.write(&[command]).await.map_err(|_| LinkError::Io)
    }

    async fn read_reg(&mut self, reg: u8) -> Result<u8, LinkError> {
        let mut buf = [R_REGISTER | reg, 0x00];
        self.spi
            .transfer_in_place(&mut buf)
            .await
            .map_err(|_| LinkError::Io)?;
        Ok(buf[1])
    }

    async fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), LinkError> {
        self.spi
            .write(&[W_REGISTER | reg, value])
            .await
            .map_err(|_| LinkError::Io)
    }

    async fn write_multi(&mut self, reg: u8, bytes: &[u8; ADDRESS_WIDTH]) -> Result<(), LinkError> {
        let mut buf = [0u8; ADDRESS_WIDTH + 1];
        buf[0] = W_REGISTER | reg;
        buf[1..].copy_from_slice(bytes);
        self.spi.write(&buf).await.map_err(|_| LinkError::Io)
    }
}

impl<SPI, CE> RadioLink for Nrf24<SPI, CE>
where
    SPI: SpiDevice,
    CE: OutputPin,
{
    async fn send(&mut self, destination: u8, frame: &[u8]) -> Result<(), LinkError> {
        self.transmit(destination, frame).await
    }
}
