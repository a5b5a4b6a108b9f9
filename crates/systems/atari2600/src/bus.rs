//! Atari 2600 memory bus implementation
//!
//! Reads and writes decode differently, because the TIA answers more
//! addresses on writes (its strobes) than it exposes for reading:
//!
//! ```text
//! read   $0000-$000D: TIA registers
//!        $0080-$00FF: RIOT
//!        $F000-$FFFF: cartridge ROM (offset from $F000)
//!        elsewhere:   nothing drives the bus
//! write  $0000-$002C: TIA registers
//!        elsewhere:   RIOT
//! ```

use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::{Cpu, Memory};

use crate::cartridge::Cartridge;
use crate::registers::RegisterFile;
use crate::riot::Riot;

/// Value the CPU sees when it reads an address nothing answers
pub const OPEN_BUS: u8 = 0x00;

const CARTRIDGE_BASE: u16 = 0xF000;

/// Atari 2600 memory bus
#[derive(Debug)]
pub struct Atari2600Bus {
    tia: RegisterFile,
    riot: Riot,
    cartridge: Cartridge,
}

impl Atari2600Bus {
    /// Create a bus routing to the TIA registers behind `tia`
    pub fn new(tia: RegisterFile, riot: Riot, cartridge: Cartridge) -> Self {
        Self {
            tia,
            riot,
            cartridge,
        }
    }

    /// Hand the bus to a CPU as its memory and reset the CPU
    ///
    /// `attach` builds the CPU around the bus. The reset makes the CPU fetch
    /// its reset vector through the bus.
    pub fn connect<C, F>(self, attach: F) -> C
    where
        C: Cpu,
        F: FnOnce(Self) -> C,
    {
        let mut cpu = attach(self);
        log(LogCategory::CPU, LogLevel::Info, || {
            "CPU: attached to bus, resetting".to_string()
        });
        cpu.reset();
        cpu
    }

    /// Decode a read; `None` when no chip answers the address
    pub fn read(&self, address: u16) -> Option<u8> {
        match address {
            0x0000..=0x000D => self.tia.get(address as usize),
            0x0080..=0x00FF => Some(self.riot.read(address)),
            CARTRIDGE_BASE..=0xFFFF => Some(self.cartridge.read(address - CARTRIDGE_BASE)),
            _ => {
                log(LogCategory::Bus, LogLevel::Trace, || {
                    format!("Bus: undecoded read at {:04X}", address)
                });
                None
            }
        }
    }

    /// Decode a write
    pub fn write(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x002C => self.tia.set(address as usize, value),
            _ => self.riot.write(address, value),
        }
    }

    /// The RIOT behind the bus
    pub fn riot(&self) -> &Riot {
        &self.riot
    }

    /// The cartridge behind the bus
    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }
}

impl Memory for Atari2600Bus {
    fn read(&self, addr: u16) -> u8 {
        Atari2600Bus::read(self, addr).unwrap_or(OPEN_BUS)
    }

    fn write(&mut self, addr: u16, val: u8) {
        Atari2600Bus::write(self, addr, val);
    }
}
