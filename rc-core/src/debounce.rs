//! Time-based contact debounce with press/hold/release queries.
//!
//! A level change is accepted only once the previous accepted change is at
//! least `debounce_ms` old; bounces inside that window are ignored. Times
//! are tick milliseconds and compared with wrapping arithmetic.

/// Debounce state for one contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debouncer {
    debounce_ms: u32,
    pressed: bool,
    changed: bool,
    /// Time of the last accepted change, `None` until the first one.
    last_change: Option<u32>,
    now: u32,
}

impl Debouncer {
    /// Create a released contact.
    #[must_use]
    pub const fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms,
            pressed: false,
            changed: false,
            last_change: None,
            now: 0,
        }
    }

    /// Feed the raw level seen at `now_ms`.
    pub fn update(&mut self, raw_pressed: bool, now_ms: u32) {
        self.now = now_ms;
        self.changed = false;

        if raw_pressed == self.pressed {
            return;
        }
        if let Some(last) = self.last_change {
            if now_ms.wrapping_sub(last) < self.debounce_ms {
                return;
            }
        }

        self.pressed = raw_pressed;
        self.changed = true;
        self.last_change = Some(now_ms);
    }

    #[inline]
    #[must_use]
    pub const fn pressed(&self) -> bool {
        self.pressed
    }

    /// Went down on the last update.
    #[inline]
    #[must_use]
    pub const fn just_pressed(&self) -> bool {
        self.pressed && self.changed
    }

    /// Went up on the last update.
    #[inline]
    #[must_use]
    pub const fn just_released(&self) -> bool {
        !self.pressed && self.changed
    }

    #[must_use]
    pub fn held_for(&self, ms: u32) -> bool {
        self.pressed && self.stable_for() >= ms
    }

    #[must_use]
    pub fn released_for(&self, ms: u32) -> bool {
        !self.pressed && self.stable_for() >= ms
    }

    /// Milliseconds since the last accepted change.
    fn stable_for(&self) -> u32 {
        match self.last_change {
            Some(last) => self.now.wrapping_sub(last),
            None => u32::MAX,
        }
    }
}
