//! TIA register addresses and the shared register file
//!
//! The TIA decodes six address bits, so its register file has 64 slots. The
//! chip owns the file; the bus and the player generators hold cloned
//! [`RegisterFile`] handles that can only get and set values.
//!
//! Some addresses are strobes: the write itself triggers an action and the
//! value is irrelevant. Writing one of those sets a latch next to the stored
//! value, which the chip polls and clears.

use emu_core::logging::{log, LogCategory, LogLevel};
use rand::Rng;
use std::cell::Cell;
use std::rc::Rc;

/// Number of register slots the TIA decodes
pub const REGISTER_COUNT: usize = 0x40;

// Write registers
pub const VSYNC: usize = 0x00;
pub const VBLANK: usize = 0x01;
pub const WSYNC: usize = 0x02;
pub const RSYNC: usize = 0x03;
pub const NUSIZ0: usize = 0x04;
pub const NUSIZ1: usize = 0x05;
pub const COLUP0: usize = 0x06;
pub const COLUP1: usize = 0x07;
pub const COLUPF: usize = 0x08;
pub const COLUBK: usize = 0x09;
pub const CTRLPF: usize = 0x0A;
pub const REFP0: usize = 0x0B;
pub const REFP1: usize = 0x0C;
pub const PF0: usize = 0x0D;
pub const PF1: usize = 0x0E;
pub const PF2: usize = 0x0F;
pub const RESP0: usize = 0x10;
pub const RESP1: usize = 0x11;
pub const RESM0: usize = 0x12;
pub const RESM1: usize = 0x13;
pub const RESBL: usize = 0x14;
pub const AUDC0: usize = 0x15;
pub const AUDC1: usize = 0x16;
pub const AUDF0: usize = 0x17;
pub const AUDF1: usize = 0x18;
pub const AUDV0: usize = 0x19;
pub const AUDV1: usize = 0x1A;
pub const GRP0: usize = 0x1B;
pub const GRP1: usize = 0x1C;
pub const ENAM0: usize = 0x1D;
pub const ENAM1: usize = 0x1E;
pub const ENABL: usize = 0x1F;
pub const HMP0: usize = 0x20;
pub const HMP1: usize = 0x21;
pub const HMM0: usize = 0x22;
pub const HMM1: usize = 0x23;
pub const HMBL: usize = 0x24;
pub const VDELP0: usize = 0x25;
pub const VDELP1: usize = 0x26;
pub const VDELBL: usize = 0x27;
pub const RESMP0: usize = 0x28;
pub const RESMP1: usize = 0x29;
pub const HMOVE: usize = 0x2A;
pub const HMCLR: usize = 0x2B;
pub const CXCLR: usize = 0x2C;

/// CTRLPF: mirror the playfield on the right half
pub const CTRLPF_REFLECT: u8 = 0x01;
/// CTRLPF: colour each playfield half with its player's colour
pub const CTRLPF_SCORE: u8 = 0x02;
/// CTRLPF: draw the playfield above the players
pub const CTRLPF_PRIORITY: u8 = 0x04;
/// REFPx: draw the player graphic LSB first
pub const REFP_REFLECT: u8 = 0x08;

/// Addresses whose writes are strobes
pub const STROBES: [usize; 10] = [
    WSYNC, RSYNC, RESP0, RESP1, RESM0, RESM1, RESBL, HMOVE, HMCLR, CXCLR,
];

/// Check whether a write to `index` is a strobe
pub fn is_strobe(index: usize) -> bool {
    STROBES.contains(&index)
}

#[derive(Debug)]
struct Cells {
    values: [Cell<u8>; REGISTER_COUNT],
    latches: Cell<u64>,
}

/// Handle to the TIA register file
///
/// Cloning the handle shares the underlying registers. The file is
/// single-threaded (`!Send`), which matches how the chip is driven.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    cells: Rc<Cells>,
}

impl RegisterFile {
    /// Create a register file with every register cleared
    pub fn new() -> Self {
        Self {
            cells: Rc::new(Cells {
                values: std::array::from_fn(|_| Cell::new(0)),
                latches: Cell::new(0),
            }),
        }
    }

    /// Create a register file with undefined (random) power-on contents
    ///
    /// No strobe is latched, so the CPU is never held by WSYNC at power-on.
    pub fn power_on<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let registers = Self::new();
        for cell in registers.cells.values.iter() {
            cell.set(rng.gen());
        }
        registers
    }

    /// Read a register; `None` if `index` is outside the file
    pub fn get(&self, index: usize) -> Option<u8> {
        self.cells.values.get(index).map(Cell::get)
    }

    /// Read a register the chip itself consumes
    ///
    /// Only for indices known to be in range (the named register constants).
    pub(crate) fn value(&self, index: usize) -> u8 {
        debug_assert!(index < REGISTER_COUNT, "register {:#04X} out of range", index);
        self.get(index).unwrap_or(0)
    }

    /// Write a register, latching strobes; out-of-range writes are dropped
    pub fn set(&self, index: usize, value: u8) {
        let Some(cell) = self.cells.values.get(index) else {
            log(LogCategory::Stubs, LogLevel::Debug, || {
                format!("TIA: dropped write {:02X} to register {:#04X}", value, index)
            });
            return;
        };

        cell.set(value);
        if is_strobe(index) {
            self.cells.latches.set(self.cells.latches.get() | (1 << index));
        }
    }

    /// Check whether the strobe at `index` is latched
    pub fn is_latched(&self, index: usize) -> bool {
        index < REGISTER_COUNT && self.cells.latches.get() & (1 << index) != 0
    }

    /// Clear the strobe latch at `index`, returning whether it was set
    pub fn take_strobe(&self, index: usize) -> bool {
        let latched = self.is_latched(index);
        if latched {
            self.cells.latches.set(self.cells.latches.get() & !(1 << index));
        }
        latched
    }

    /// Check whether two handles share the same registers
    pub fn shares_with(&self, other: &RegisterFile) -> bool {
        Rc::ptr_eq(&self.cells, &other.cells)
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}
