//! Coarse horizontal position counter shared by the TIA's movable objects
//!
//! Players, missiles and the ball each own one of these. The counter is
//! clocked once per visible colour clock, but only advances on every fourth
//! clock, giving 40 positions across the 160-pixel line.

use rand::Rng;

/// Number of positions the counter cycles through
pub const COUNTER_PERIOD: u8 = 40;

/// Colour clocks per counter step
pub const TICKS_PER_STEP: u8 = 4;

/// Modulo-40 position counter with a divide-by-four clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovableObject {
    value: u8,
    divider: u8,
}

impl MovableObject {
    /// Create a counter in an undefined (random) power-on position
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            value: rng.gen_range(0..COUNTER_PERIOD),
            divider: 0,
        }
    }

    /// Current counter position, always in `0..40`
    pub fn value(&self) -> u8 {
        debug_assert!(self.value < COUNTER_PERIOD);
        self.value
    }

    /// Force the counter position, keeping the divider phase
    pub fn set_value(&mut self, value: u8) {
        debug_assert!(value < COUNTER_PERIOD, "counter value {} out of range", value);
        self.value = value % COUNTER_PERIOD;
    }

    /// Restart the counter at position 0 with a fresh divider
    pub fn reset(&mut self) {
        self.value = 0;
        self.divider = 0;
    }

    /// Clock the counter once
    ///
    /// Every fourth call advances the position (wrapping 39 to 0) and calls
    /// `on_counter_change` with the new position.
    pub fn tick<F: FnOnce(u8)>(&mut self, on_counter_change: F) {
        self.divider += 1;
        if self.divider < TICKS_PER_STEP {
            return;
        }

        self.divider = 0;
        self.value = (self.value + 1) % COUNTER_PERIOD;
        on_counter_change(self.value);
    }
}
