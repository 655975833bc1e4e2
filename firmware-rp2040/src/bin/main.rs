#![no_std]
#![no_main]

use defmt::{info, unwrap, warn};
use defmt_rtt as _;
use embassy_embedded_hal::shared_bus::asynch::spi::SpiDevice;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel as AdcChannel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::{DMA_CH0, DMA_CH1, DMA_CH2, DMA_CH3, SPI0, UART1};
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{Config as UartConfig, Uart};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Instant, Ticker, Timer};
use rc_core::encoder::SERIAL_BACKLOG;
use rc_core::{Button, ButtonEncoder, Config, InputMode, ModeEncoder, SerialEncoder, Transmitter};
use rc_transmitter_rp2040::{
    serial_reader_task, DirectionButton, GpioButton, LadderInput, Nrf24, RadioConfig,
    SerialCommandReader, COMMANDS,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
    DMA_IRQ_0 => embassy_rp::dma::InterruptHandler<DMA_CH0>,
                 embassy_rp::dma::InterruptHandler<DMA_CH1>,
                 embassy_rp::dma::InterruptHandler<DMA_CH2>,
                 embassy_rp::dma::InterruptHandler<DMA_CH3>;
});

type RadioSpi = Spi<'static, SPI0, spi::Async>;
type RadioDevice = SpiDevice<'static, NoopRawMutex, RadioSpi, Output<'static>>;
type Radio = Nrf24<RadioDevice, Output<'static>>;
type Encoder = ModeEncoder<DirectionButton<'static>>;

/// The radio is the only device on SPI0; the shared-bus wrapper owns CSN.
static SPI_BUS: StaticCell<Mutex<NoopRawMutex, RadioSpi>> = StaticCell::new();

/// Ticks between link statistics log lines.
const STATS_EVERY: u32 = 250;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("rc-transmitter starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Input mode strap ---
    let strap = Input::new(p.PIN_22, Pull::Up);
    Timer::after(Duration::from_micros(50)).await;
    let mode = if strap.is_low() {
        InputMode::SerialDebug
    } else {
        InputMode::Buttons
    };
    drop(strap);
    let config = Config::DEFAULT.with_input_mode(mode);

    // --- Radio Setup ---
    let mut spi_config = spi::Config::default();
    spi_config.frequency = 8_000_000;

    let spi = Spi::new(
        p.SPI0,
        p.PIN_18, // SCK
        p.PIN_19, // MOSI
        p.PIN_16, // MISO
        p.DMA_CH2,
        p.DMA_CH3,
        Irqs,
        spi_config,
    );
    let bus = SPI_BUS.init(Mutex::new(spi));
    let csn = Output::new(p.PIN_17, Level::High);
    let ce = Output::new(p.PIN_20, Level::Low);

    let radio: Radio = unwrap!(
        Nrf24::new(SpiDevice::new(bus, csn), ce, RadioConfig::default()).await
    );

    // --- Encoder Setup ---
    let encoder: Encoder = match config.input_mode {
        InputMode::Buttons => ModeEncoder::Buttons(ButtonEncoder::new(
            direction_button(Input::new(p.PIN_2, Pull::Up), &config),
            direction_button(Input::new(p.PIN_3, Pull::Up), &config),
            direction_button(Input::new(p.PIN_4, Pull::Up), &config),
            direction_button(Input::new(p.PIN_5, Pull::Up), &config),
            &config,
        )),
        InputMode::SerialDebug => {
            let mut uart_config = UartConfig::default();
            uart_config.baudrate = 115_200;

            let uart = Uart::new(
                p.UART1,
                p.PIN_8, // TX
                p.PIN_9, // RX
                Irqs,
                p.DMA_CH0,
                p.DMA_CH1,
                uart_config,
            );
            let (_tx, rx) = uart.split();
            spawner.spawn(serial_reader_task(SerialCommandReader::new(rx)).unwrap());
            ModeEncoder::SerialDebug(SerialEncoder::new(&config))
        }
    };
    info!("input mode: {:?}", encoder.input_mode());

    // --- Action ladder ---
    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let ladder_pin = AdcChannel::new_pin(p.PIN_26, Pull::None);
    let ladder = LadderInput::new(adc, ladder_pin);

    // Link failure indicator (on-board LED on Pico)
    let led = Output::new(p.PIN_25, Level::Low);

    let transmitter = Transmitter::new(encoder, radio, config);
    spawner.spawn(control_task(transmitter, ladder, led).unwrap());

    info!("rc-transmitter initialized, tick {} ms", config.tick_period_ms);
}

fn direction_button(input: Input<'static>, config: &Config) -> DirectionButton<'static> {
    Button::new(GpioButton::new(input), config.debounce_ms)
}

/// Control task - one control-loop iteration per tick.
#[embassy_executor::task]
async fn control_task(
    mut transmitter: Transmitter<Encoder, Radio>,
    mut ladder: LadderInput<'static>,
    mut led: Output<'static>,
) {
    let period = Duration::from_millis(u64::from(transmitter.config().tick_period_ms));
    let mut ticker = Ticker::every(period);
    let mut ticks: u32 = 0;

    loop {
        if let Some(key) = ladder.poll().await {
            if let Err(e) = transmitter.post(key.event()) {
                warn!("ladder {:?} dropped: {}", key, e);
            }
        }

        if let ModeEncoder::SerialDebug(serial) = transmitter.encoder_mut() {
            while serial.pending() < SERIAL_BACKLOG {
                let Ok(command) = COMMANDS.try_receive() else {
                    break;
                };
                if let Err(e) = serial.feed(command) {
                    warn!("serial command dropped: {}", e);
                }
            }
        }

        // Truncated to the core's wrapping u32 ms clock
        let now_ms = Instant::now().as_millis() as u32;
        let report = transmitter.tick(now_ms).await;

        // LED on while frames go unacknowledged
        if report.frames_sent > report.frames_acked {
            led.set_high();
        } else if report.frames_acked > 0 {
            led.set_low();
        }

        ticks = ticks.wrapping_add(1);
        if ticks % STATS_EVERY == 0 {
            info!("link: {}", transmitter.stats());
        }

        ticker.next().await;
    }
}
