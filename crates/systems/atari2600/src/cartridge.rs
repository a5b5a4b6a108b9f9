//! Atari 2600 cartridge ROM
//!
//! The cartridge occupies $F000-$FFFF on the bus, which hands it offsets from
//! 0. Only unbanked images are supported:
//! - 2K: mirrored twice across the 4K window
//! - 4K: mapped straight through
//!
//! Larger images need bank switching, which lives outside this core.

use emu_core::logging::{log, LogCategory, LogLevel};
use thiserror::Error;

/// Size of the cartridge window on the bus
pub const WINDOW_SIZE: usize = 0x1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("ROM image is empty")]
    Empty,
    #[error("Invalid ROM size: {0} bytes (expected 2048 or 4096)")]
    InvalidSize(usize),
}

/// Read-only cartridge ROM
#[derive(Debug, Clone)]
pub struct Cartridge {
    rom: Vec<u8>,
}

impl Cartridge {
    /// Create a cartridge from a ROM image
    pub fn new(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        match rom.len() {
            0 => return Err(CartridgeError::Empty),
            2048 | WINDOW_SIZE => {}
            size => return Err(CartridgeError::InvalidSize(size)),
        }

        log(LogCategory::Cartridge, LogLevel::Info, || {
            format!("Cartridge: loaded {} byte ROM", rom.len())
        });

        Ok(Self { rom })
    }

    /// ROM size in bytes
    pub fn size(&self) -> usize {
        self.rom.len()
    }

    /// Read the byte at `offset` into the cartridge window
    pub fn read(&self, offset: u16) -> u8 {
        self.rom[offset as usize % self.rom.len()]
    }
}
