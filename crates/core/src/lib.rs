//! Core emulator primitives and traits.

pub mod logging;

/// A CPU-like component that can be stepped; returns cycles consumed.
pub trait Cpu {
    fn reset(&mut self);
    fn step(&mut self) -> u32;
}

/// Memory interface a CPU performs all of its own reads and writes through.
///
/// Systems implement this on their bus so the CPU never needs to know which
/// chip sits behind an address.
pub trait Memory {
    /// Read a byte from memory at the given address
    fn read(&self, addr: u16) -> u8;

    /// Write a byte to memory at the given address
    fn write(&mut self, addr: u16, val: u8);
}

impl<C: Cpu + ?Sized> Cpu for &mut C {
    fn reset(&mut self) {
        (**self).reset();
    }

    fn step(&mut self) -> u32 {
        (**self).step()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlatMemory {
        ram: Vec<u8>,
    }

    impl Memory for FlatMemory {
        fn read(&self, addr: u16) -> u8 {
            self.ram[addr as usize]
        }

        fn write(&mut self, addr: u16, val: u8) {
            self.ram[addr as usize] = val;
        }
    }

    /// Stores its step count into memory so tests can see the CPU used it
    struct CountingCpu<M: Memory> {
        memory: M,
        steps: u8,
    }

    impl<M: Memory> Cpu for CountingCpu<M> {
        fn reset(&mut self) {
            self.steps = 0;
        }

        fn step(&mut self) -> u32 {
            self.steps = self.steps.wrapping_add(1);
            self.memory.write(0x0000, self.steps);
            2
        }
    }

    #[test]
    fn test_cpu_writes_through_memory() {
        let mut cpu = CountingCpu {
            memory: FlatMemory { ram: vec![0; 16] },
            steps: 0,
        };

        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.memory.read(0x0000), 2);

        cpu.reset();
        assert_eq!(cpu.steps, 0);
    }

    #[test]
    fn test_cpu_through_mutable_reference() {
        let mut cpu = CountingCpu {
            memory: FlatMemory { ram: vec![0; 16] },
            steps: 0,
        };

        fn step_twice<C: Cpu>(mut cpu: C) -> u32 {
            cpu.step() + cpu.step()
        }

        assert_eq!(step_twice(&mut cpu), 4);
        assert_eq!(cpu.memory.read(0x0000), 2);
    }
}
