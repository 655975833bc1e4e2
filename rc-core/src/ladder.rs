//! Resistor-ladder button decoding.
//!
//! Several momentary buttons share one ADC pin through a resistor ladder;
//! each button pulls the pin into its own voltage band. With no button down
//! the pull-up holds the pin near full scale.

use crate::events::ControlEvent;
use rc_proto::{Action, Options};

/// A button on the ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LadderKey {
    Stop,
    Recenter,
    Lights,
    Horn,
}

impl LadderKey {
    /// The event this key posts when pressed.
    #[must_use]
    pub const fn event(self) -> ControlEvent {
        match self {
            Self::Stop => ControlEvent::Action(Action::Stop),
            Self::Recenter => ControlEvent::Action(Action::Recenter),
            Self::Lights => ControlEvent::ToggleOption(Options::LIGHTS),
            Self::Horn => ControlEvent::ToggleOption(Options::HORN),
        }
    }
}

/// Inclusive raw ADC range belonging to one key.
#[derive(Clone, Copy, Debug)]
pub struct LadderBand {
    pub key: LadderKey,
    pub min: u16,
    pub max: u16,
}

/// Bands for a 12-bit ADC with a 10k pull-up and 0 / 2k2 / 4k7 / 10k legs.
pub const DEFAULT_BANDS: [LadderBand; 4] = [
    LadderBand { key: LadderKey::Stop, min: 0, max: 350 },
    LadderBand { key: LadderKey::Recenter, min: 500, max: 1000 },
    LadderBand { key: LadderKey::Lights, min: 1100, max: 1650 },
    LadderBand { key: LadderKey::Horn, min: 1750, max: 2350 },
];

/// Consecutive identical classifications required before a key counts.
pub const DEFAULT_STABLE_SAMPLES: u8 = 3;

/// Edge-detecting decoder over successive ADC samples.
pub struct AnalogLadder<'a> {
    bands: &'a [LadderBand],
    stable_samples: u8,
    candidate: Option<LadderKey>,
    stable: u8,
    active: Option<LadderKey>,
}

impl<'a> AnalogLadder<'a> {
    #[must_use]
    pub const fn new(bands: &'a [LadderBand], stable_samples: u8) -> Self {
        Self {
            bands,
            stable_samples,
            candidate: None,
            stable: 0,
            active: None,
        }
    }

    /// Map a raw reading to the key whose band contains it.
    #[must_use]
    pub fn classify(&self, raw: u16) -> Option<LadderKey> {
        self.bands
            .iter()
            .find(|band| (band.min..=band.max).contains(&raw))
            .map(|band| band.key)
    }

    /// Feed one sample. Returns a key only on the sample where it becomes the
    /// stable, newly pressed key.
    pub fn sample(&mut self, raw: u16) -> Option<LadderKey> {
        let key = self.classify(raw);
        if key == self.candidate {
            self.stable = self.stable.saturating_add(1);
        } else {
            self.candidate = key;
            self.stable = 1;
        }

        if self.stable < self.stable_samples || self.active == self.candidate {
            return None;
        }

        self.active = self.candidate;
        if let Some(key) = self.active {
            debug!("ladder key {:?} (raw {})", key, raw);
        }
        self.active
    }

    /// Key currently held down, if any.
    #[must_use]
    pub const fn active(&self) -> Option<LadderKey> {
        self.active
    }
}

impl Default for AnalogLadder<'static> {
    fn default() -> Self {
        Self::new(&DEFAULT_BANDS, DEFAULT_STABLE_SAMPLES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELEASED: u16 = 4095;

    #[test]
    fn test_classify_bands() {
        let ladder = AnalogLadder::default();
        assert_eq!(ladder.classify(0), Some(LadderKey::Stop));
        assert_eq!(ladder.classify(700), Some(LadderKey::Recenter));
        assert_eq!(ladder.classify(1650), Some(LadderKey::Lights));
        assert_eq!(ladder.classify(2000), Some(LadderKey::Horn));
        assert_eq!(ladder.classify(450), None);
        assert_eq!(ladder.classify(RELEASED), None);
    }

    #[test]
    fn test_press_reported_once_after_stable() {
        let mut ladder = AnalogLadder::default();
        assert_eq!(ladder.sample(RELEASED), None);
        assert_eq!(ladder.sample(10), None);
        assert_eq!(ladder.sample(12), None);
        assert_eq!(ladder.sample(9), Some(LadderKey::Stop));
        // Still held: no repeat
        assert_eq!(ladder.sample(11), None);
        assert_eq!(ladder.sample(11), None);
        assert_eq!(ladder.active(), Some(LadderKey::Stop));
    }

    #[test]
    fn test_glitch_does_not_trigger() {
        let mut ladder = AnalogLadder::default();
        for raw in [RELEASED, 800, RELEASED, 800, RELEASED] {
            assert_eq!(ladder.sample(raw), None);
        }
        assert_eq!(ladder.active(), None);
    }

    #[test]
    fn test_release_then_press_again() {
        let mut ladder = AnalogLadder::new(&DEFAULT_BANDS, 1);
        assert_eq!(ladder.sample(2000), Some(LadderKey::Horn));
        assert_eq!(ladder.sample(RELEASED), None);
        assert_eq!(ladder.active(), None);
        assert_eq!(ladder.sample(2000), Some(LadderKey::Horn));
    }

    #[test]
    fn test_key_events() {
        assert_eq!(
            LadderKey::Recenter.event(),
            ControlEvent::Action(Action::Recenter)
        );
        assert_eq!(
            LadderKey::Lights.event(),
            ControlEvent::ToggleOption(Options::LIGHTS)
        );
    }
}
