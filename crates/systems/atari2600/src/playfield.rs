//! Playfield phase generator
//!
//! The playfield is 20 bits wide and drawn twice per line, each bit covering
//! four pixels. The bits come from three registers read in different orders:
//!
//! ```text
//! PF0 bits 4..7 | PF1 bits 7..0 | PF2 bits 0..7     left half, and right half
//! PF2 bits 7..0 | PF1 bits 0..7 | PF0 bits 7..4     right half with CTRLPF reflect
//! ```
//!
//! The generator walks that order with a bit index and a direction, flipping
//! the direction whenever it runs off either end of a register.

use crate::registers::{RegisterFile, PF0};

/// Pixels per playfield half
pub const HALF_WIDTH: usize = 80;

/// Pixels per playfield bit
pub const PIXELS_PER_BIT: usize = 4;

/// Number of playfield registers (PF0, PF1, PF2)
const REGISTERS: i8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playfield {
    /// 0, 1 or 2 for PF0, PF1, PF2
    register: i8,
    bit: i8,
    direction: i8,
    register_step: i8,
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new()
    }
}

impl Playfield {
    /// Create a generator at the start of a line
    pub fn new() -> Self {
        Self {
            register: 0,
            bit: 4,
            direction: 1,
            register_step: 1,
        }
    }

    /// Go back to PF0 bit 4
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Continue into the right half backwards, from PF2 bit 7
    fn mirror(&mut self) {
        self.register = REGISTERS - 1;
        self.bit = 7;
        self.direction = -1;
        self.register_step = -1;
    }

    /// Address of the playfield register currently selected
    pub fn register_address(&self) -> usize {
        debug_assert!((0..REGISTERS).contains(&self.register));
        PF0 + self.register as usize
    }

    /// Bit index currently selected inside the register
    pub fn bit_index(&self) -> u8 {
        debug_assert!((0..8).contains(&self.bit));
        self.bit as u8
    }

    /// Sample the selected playfield bit
    pub fn bit(&self, registers: &RegisterFile) -> bool {
        registers.value(self.register_address()) & (1 << self.bit_index()) != 0
    }

    /// Advance past `pixel`, moving to the next bit on a bit boundary
    ///
    /// `reflect` is only consulted at the end of the left half.
    pub fn fetch(&mut self, pixel: usize, reflect: bool) {
        if pixel % HALF_WIDTH % PIXELS_PER_BIT != PIXELS_PER_BIT - 1 {
            return;
        }

        self.bit += self.direction;
        if self.bit == 8 || self.bit == -1 {
            self.flip_direction_and_register();
        }

        if self.register >= REGISTERS {
            if reflect {
                self.mirror();
            } else {
                self.reset();
            }
        }
    }

    fn flip_direction_and_register(&mut self) {
        self.direction = -self.direction;
        self.bit += self.direction;
        self.register += self.register_step;
    }
}
