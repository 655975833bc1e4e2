//! GPIO direction buttons and the analog action ladder.
//!
//! # Pins
//!
//! | Function       | GPIO | Wiring                              |
//! |----------------|------|-------------------------------------|
//! | Forward        | 2    | to GND, internal pull-up            |
//! | Reverse        | 3    | to GND, internal pull-up            |
//! | Right          | 4    | to GND, internal pull-up            |
//! | Left           | 5    | to GND, internal pull-up            |
//! | Action ladder  | 26   | ADC0, 10k pull-up to 3V3            |
//! | Mode strap     | 22   | to GND selects serial debug input   |

use embassy_rp::adc::{Adc, Async, Channel};
use embassy_rp::gpio::Input;
use rc_core::{AnalogLadder, Button, LadderKey, RawLevel};

/// Active-low push button on a pulled-up GPIO.
pub struct GpioButton<'d> {
    input: Input<'d>,
}

impl<'d> GpioButton<'d> {
    #[must_use]
    pub fn new(input: Input<'d>) -> Self {
        Self { input }
    }
}

impl RawLevel for GpioButton<'_> {
    #[inline]
    fn is_active(&mut self) -> bool {
        self.input.is_low()
    }
}

/// Debounced direction button as seen by the encoder.
pub type DirectionButton<'d> = Button<GpioButton<'d>>;

/// Samples the ladder pin and decodes key presses.
pub struct LadderInput<'d> {
    adc: Adc<'d, Async>,
    channel: Channel<'d>,
    ladder: AnalogLadder<'static>,
}

impl<'d> LadderInput<'d> {
    #[must_use]
    pub fn new(adc: Adc<'d, Async>, channel: Channel<'d>) -> Self {
        Self {
            adc,
            channel,
            ladder: AnalogLadder::default(),
        }
    }

    /// Take one sample; returns a key on its press edge.
    ///
    /// A failed conversion is treated as no key down.
    pub async fn poll(&mut self) -> Option<LadderKey> {
        match self.adc.read(&mut self.channel).await {
            Ok(raw) => self.ladder.sample(raw),
            Err(_) => {
                defmt::warn!("ladder ADC read failed");
                self.ladder.sample(u16::MAX)
            }
        }
    }
}
