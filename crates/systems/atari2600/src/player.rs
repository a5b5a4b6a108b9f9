//! Player (sprite) pixel generator
//!
//! Each player is an 8-bit graphic (GRPx) drawn in its own colour (COLUPx).
//! Its horizontal position is a [`MovableObject`] counter clocked once per
//! visible pixel; writing RESPx restarts the counter at the current beam
//! position. Copies are started when the counter reaches the positions that
//! NUSIZx decodes, and reach the screen after a fixed decode delay.
//!
//! Timing relative to a strobe, counting `pixel()` calls from 0:
//!
//! ```text
//! calls   0 ..        21 ..28 ..  37 ..  69 ..       165..172
//!         strobe      +16 copy    +32    +64         main copy
//! ```
//!
//! The main copy is only decoded when the counter wraps, so it never appears
//! on the line of the strobe.

use rand::Rng;

use crate::movable_object::MovableObject;
use crate::registers::{RegisterFile, COLUP0, GRP0, NUSIZ0, REFP0, REFP_REFLECT};

/// Colour clocks between a copy being decoded and its first pixel
pub const DECODE_DELAY: u8 = 5;

/// Number and size of player copies, from NUSIZx bits 0-2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    One,
    TwoClose,
    TwoMedium,
    ThreeClose,
    TwoWide,
    Double,
    ThreeMedium,
    Quad,
}

impl CopyMode {
    /// Decode the low three bits of a NUSIZx value
    pub fn from_nusiz(nusiz: u8) -> Self {
        match nusiz & 0x07 {
            0 => CopyMode::One,
            1 => CopyMode::TwoClose,
            2 => CopyMode::TwoMedium,
            3 => CopyMode::ThreeClose,
            4 => CopyMode::TwoWide,
            5 => CopyMode::Double,
            6 => CopyMode::ThreeMedium,
            _ => CopyMode::Quad,
        }
    }

    /// Counter positions that start a copy (4 pixels per position)
    pub fn copy_positions(self) -> &'static [u8] {
        match self {
            CopyMode::One | CopyMode::Double | CopyMode::Quad => &[0],
            CopyMode::TwoClose => &[0, 4],
            CopyMode::TwoMedium => &[0, 8],
            CopyMode::ThreeClose => &[0, 4, 8],
            CopyMode::TwoWide => &[0, 16],
            CopyMode::ThreeMedium => &[0, 8, 16],
        }
    }

    /// Pixels drawn per graphic bit
    pub fn scale(self) -> u8 {
        match self {
            CopyMode::Double => 2,
            CopyMode::Quad => 4,
            _ => 1,
        }
    }

    fn starts_copy_at(self, position: u8) -> bool {
        self.copy_positions().contains(&position)
    }
}

/// Sprite pixel generator for player 0 or player 1
#[derive(Debug, Clone)]
pub struct Player {
    registers: RegisterFile,
    index: usize,
    counter: MovableObject,
    /// Clocks left before a decoded copy starts drawing
    start_delay: Option<u8>,
    /// Pixel offset inside the copy being drawn
    scan: Option<u8>,
    /// Pixels per graphic bit, fixed when the copy starts drawing
    scale: u8,
}

impl Player {
    /// Create player `index` (0 or 1) reading its registers from `registers`
    pub fn new<R: Rng + ?Sized>(registers: RegisterFile, index: usize, rng: &mut R) -> Self {
        debug_assert!(index < 2, "the TIA has two players, not {}", index + 1);
        Self {
            registers,
            index,
            counter: MovableObject::new(rng),
            start_delay: None,
            scan: None,
            scale: 1,
        }
    }

    /// Which player this is
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current coarse counter position
    pub fn position(&self) -> u8 {
        self.counter.value()
    }

    /// Copy mode currently selected by NUSIZx
    pub fn copy_mode(&self) -> CopyMode {
        CopyMode::from_nusiz(self.register(NUSIZ0))
    }

    /// RESPx: restart the counter here and drop any copy in flight
    pub fn strobe(&mut self) {
        self.counter.reset();
        self.start_delay = None;
        self.scan = None;
    }

    /// Generate the next pixel: the player colour, or `None` if transparent
    pub fn pixel(&mut self) -> Option<u8> {
        let mode = self.copy_mode();
        match self.start_delay {
            Some(0) => {
                self.start_delay = None;
                self.scan = Some(0);
                self.scale = mode.scale();
            }
            Some(clocks) => self.start_delay = Some(clocks - 1),
            None => {}
        }

        let color = match self.scan {
            Some(offset) => self.draw(offset),
            None => None,
        };

        let start_delay = &mut self.start_delay;
        self.counter.tick(|position| {
            if mode.starts_copy_at(position) {
                *start_delay = Some(DECODE_DELAY);
            }
        });

        color
    }

    /// Emit the pixel at `offset` into the current copy and move the scan on
    ///
    /// The copy keeps the size it started with even if NUSIZx changes while
    /// it is on screen.
    fn draw(&mut self, offset: u8) -> Option<u8> {
        let scale = self.scale;
        let width = 8 * scale;
        debug_assert!(offset < width);

        let bit = offset / scale;
        let graphic = self.register(GRP0);
        let mask = if self.register(REFP0) & REFP_REFLECT != 0 {
            1 << bit
        } else {
            0x80 >> bit
        };

        let next = offset + 1;
        self.scan = (next < width).then_some(next);

        (graphic & mask != 0).then(|| self.register(COLUP0))
    }

    /// Read this player's copy of a per-player register (given by its P0 address)
    fn register(&self, player0_register: usize) -> u8 {
        self.registers.value(player0_register + self.index)
    }
}
