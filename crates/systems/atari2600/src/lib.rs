//! Atari 2600 system implementation
//!
//! A cycle-exact TIA core: the chip generates one scanline per call and drives
//! the CPU in lock-step with the beam, while the bus routes the CPU's memory
//! accesses to the TIA registers, the RIOT and the cartridge.
//!
//! The CPU itself is a collaborator supplied by the host through
//! [`emu_core::Cpu`]; it performs its memory accesses through the
//! [`Atari2600Bus`] it is given in [`Atari2600::new`].

#![allow(clippy::upper_case_acronyms)]

mod bus;
mod cartridge;
mod config;
mod movable_object;
mod player;
mod playfield;
pub mod registers;
mod riot;
mod tia;

pub use bus::{Atari2600Bus, OPEN_BUS};
pub use cartridge::{Cartridge, CartridgeError};
pub use config::{Atari2600Config, LogSettings};
pub use movable_object::{MovableObject, COUNTER_PERIOD, TICKS_PER_STEP};
pub use player::{CopyMode, Player, DECODE_DELAY};
pub use playfield::Playfield;
pub use registers::RegisterFile;
pub use riot::Riot;
pub use tia::{Scanline, Tia, COLOR_CLOCKS_PER_LINE, HBLANK_CLOCKS, VISIBLE_PIXELS};

use emu_core::Cpu;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Atari2600Error {
    #[error("Cartridge error: {0}")]
    Cartridge(#[from] CartridgeError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Atari 2600: a TIA and the CPU it drives
pub struct Atari2600<C: Cpu> {
    tia: Tia,
    cpu: C,
}

impl<C: Cpu> Atari2600<C> {
    /// Power on a console with `rom` inserted
    ///
    /// `attach` builds the host's CPU around the bus; the CPU is reset before
    /// this returns.
    pub fn new<F>(config: &Atari2600Config, rom: Vec<u8>, attach: F) -> Result<Self, Atari2600Error>
    where
        F: FnOnce(Atari2600Bus) -> C,
    {
        let cartridge = Cartridge::new(rom)?;
        let tia = Tia::new(&mut config.power_on_rng());
        let bus = Atari2600Bus::new(tia.registers(), Riot::new(), cartridge);
        let cpu = bus.connect(attach);

        Ok(Self { tia, cpu })
    }

    /// Generate the next scanline
    pub fn scanline(&mut self) -> Scanline {
        self.tia.scanline(&mut self.cpu)
    }

    /// The TIA
    pub fn tia(&self) -> &Tia {
        &self.tia
    }

    /// The TIA, for direct register access
    pub fn tia_mut(&mut self) -> &mut Tia {
        &mut self.tia
    }

    /// The CPU
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    /// The CPU
    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }
}
