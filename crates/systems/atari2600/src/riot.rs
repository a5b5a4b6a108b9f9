//! RIOT (6532) register array for Atari 2600
//!
//! Only the RIOT's register surface lives here: its 128 bytes of RAM and the
//! raw I/O and timer registers. The timer never counts and the ports are not
//! wired to any controller; those are the RIOT emulation's job, not the TIA
//! core's.
//!
//! # Memory Map (system addresses)
//!
//! ```text
//! $0000-$01FF:  RAM (128 bytes at $80-$FF, mirrored every $80)
//! $0280-$029F:  I/O and timer registers (SWCHA, SWACNT, SWCHB, SWBCNT, INTIM, ...)
//! ```
//!
//! The bus forwards every write it does not give to the TIA, so writes to
//! $0000-$007F land in the RAM mirror.

use emu_core::logging::{log, LogCategory, LogLevel};

/// Bytes of RAM in the RIOT
pub const RAM_SIZE: usize = 128;

/// Number of I/O and timer register slots
pub const IO_REGISTERS: usize = 0x20;

/// RIOT chip registers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Riot {
    ram: [u8; RAM_SIZE],
    io: [u8; IO_REGISTERS],
}

impl Default for Riot {
    fn default() -> Self {
        Self::new()
    }
}

impl Riot {
    /// Create a RIOT with cleared RAM and idle ports
    pub fn new() -> Self {
        let mut io = [0; IO_REGISTERS];
        // Joysticks and console switches read high (released)
        io[0x00] = 0xFF;
        io[0x02] = 0xFF;
        Self { ram: [0; RAM_SIZE], io }
    }

    /// Read the register behind a system address
    pub fn read(&self, addr: u16) -> u8 {
        match Self::decode(addr) {
            Some(Slot::Ram(index)) => self.ram[index],
            Some(Slot::Io(index)) => self.io[index],
            None => {
                log(LogCategory::RIOT, LogLevel::Trace, || {
                    format!("RIOT: read of undecoded address {:04X}", addr)
                });
                0
            }
        }
    }

    /// Write the register behind a system address
    pub fn write(&mut self, addr: u16, val: u8) {
        match Self::decode(addr) {
            Some(Slot::Ram(index)) => self.ram[index] = val,
            Some(Slot::Io(index)) => self.io[index] = val,
            None => log(LogCategory::RIOT, LogLevel::Trace, || {
                format!("RIOT: dropped write {:02X} to {:04X}", val, addr)
            }),
        }
    }

    fn decode(addr: u16) -> Option<Slot> {
        match addr {
            0x0000..=0x01FF => Some(Slot::Ram((addr & 0x7F) as usize)),
            0x0280..=0x029F => Some(Slot::Io((addr & 0x1F) as usize)),
            _ => None,
        }
    }
}

enum Slot {
    Ram(usize),
    Io(usize),
}
