//! TIA (Television Interface Adapter) - Video chip for Atari 2600
//!
//! The TIA has no framebuffer: it generates video one scanline at a time while
//! the CPU races the beam. A scanline is 228 colour clocks, the first 68 of
//! which are horizontal blank; the remaining 160 produce one pixel each.
//!
//! The CPU runs at a third of the colour clock. The chip drives it: every third
//! colour clock earns the CPU one cycle of credit, and while it has credit the
//! chip steps it and charges the cycles the instruction took. Writing WSYNC
//! latches a strobe that stops this until the next scanline starts.

use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::Cpu;
use rand::Rng;

use crate::player::Player;
use crate::playfield::{Playfield, HALF_WIDTH};
use crate::registers::{
    RegisterFile, COLUBK, COLUP0, COLUP1, COLUPF, CTRLPF, CTRLPF_PRIORITY, CTRLPF_REFLECT,
    CTRLPF_SCORE, RESP0, RESP1, WSYNC,
};

/// Colour clocks per scanline
pub const COLOR_CLOCKS_PER_LINE: usize = 228;

/// Colour clocks of horizontal blank at the start of each line
pub const HBLANK_CLOCKS: usize = 68;

/// Visible pixels per scanline
pub const VISIBLE_PIXELS: usize = COLOR_CLOCKS_PER_LINE - HBLANK_CLOCKS;

/// Colour clocks per CPU cycle
pub const CLOCKS_PER_CPU_CYCLE: usize = 3;

/// One line of colour register values, left to right
pub type Scanline = [u8; VISIBLE_PIXELS];

/// TIA chip state
#[derive(Debug)]
pub struct Tia {
    registers: RegisterFile,
    players: [Player; 2],
    playfield: Playfield,
    /// CPU cycles the chip owes (positive) or is owed (negative)
    cpu_credits: i32,
}

impl Default for Tia {
    fn default() -> Self {
        Self::new(&mut rand::thread_rng())
    }
}

impl Tia {
    /// Create a TIA in its undefined power-on state, drawn from `rng`
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let registers = RegisterFile::power_on(rng);
        let players = [
            Player::new(registers.clone(), 0, rng),
            Player::new(registers.clone(), 1, rng),
        ];

        Self {
            registers,
            players,
            playfield: Playfield::new(),
            cpu_credits: 0,
        }
    }

    /// Handle to the register file, for the bus
    pub fn registers(&self) -> RegisterFile {
        self.registers.clone()
    }

    /// Read a TIA register; `None` outside the register file
    pub fn read(&self, offset: usize) -> Option<u8> {
        self.registers.get(offset)
    }

    /// Write a TIA register
    pub fn write(&mut self, offset: usize, value: u8) {
        self.registers.set(offset, value);
        self.apply_strobes();
    }

    /// Player generator 0 or 1; `None` for any other index
    pub fn player(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    /// Check whether the CPU is halted until the next scanline
    pub fn waiting_for_sync(&self) -> bool {
        self.registers.is_latched(WSYNC)
    }

    /// Generate one scanline, stepping `cpu` in lock-step with the beam
    pub fn scanline<C: Cpu + ?Sized>(&mut self, cpu: &mut C) -> Scanline {
        self.reset_beam();
        let mut line = [0; VISIBLE_PIXELS];

        for color_clock in 0..COLOR_CLOCKS_PER_LINE {
            self.sync_cpu_with(color_clock, cpu);

            if color_clock >= HBLANK_CLOCKS {
                let pixel = color_clock - HBLANK_CLOCKS;
                line[pixel] = self.pixel_color(pixel);
                let reflect = self.registers.value(CTRLPF) & CTRLPF_REFLECT != 0;
                self.playfield.fetch(pixel, reflect);
            }
        }

        line
    }

    fn reset_beam(&mut self) {
        // A halted CPU does not bank the cycles it sat out
        if self.registers.take_strobe(WSYNC) {
            self.cpu_credits = 0;
        }
        self.playfield.reset();
    }

    fn sync_cpu_with<C: Cpu + ?Sized>(&mut self, color_clock: usize, cpu: &mut C) {
        if color_clock % CLOCKS_PER_CPU_CYCLE == 0 {
            self.cpu_credits += 1;
        }

        if self.cpu_credits > 0 && !self.waiting_for_sync() {
            let cycles = cpu.step();
            self.cpu_credits -= i32::try_from(cycles).unwrap_or(i32::MAX);
            self.apply_strobes();

            if self.waiting_for_sync() {
                log(LogCategory::TIA, LogLevel::Trace, || {
                    format!("TIA: WSYNC at colour clock {}", color_clock)
                });
            }
        }
    }

    /// Hand latched RESPx strobes to the players
    fn apply_strobes(&mut self) {
        for (player, strobe) in self.players.iter_mut().zip([RESP0, RESP1]) {
            if self.registers.take_strobe(strobe) {
                log(LogCategory::TIA, LogLevel::Debug, || {
                    format!("TIA: RESP{} strobe", player.index())
                });
                player.strobe();
            }
        }
    }

    /// Pick the colour of `pixel` from the playfield, both players and the background
    fn pixel_color(&mut self, pixel: usize) -> u8 {
        let ctrlpf = self.registers.value(CTRLPF);
        let p0 = self.players[0].pixel();
        let p1 = self.players[1].pixel();

        let pf = self.playfield.bit(&self.registers).then(|| {
            if ctrlpf & CTRLPF_SCORE == 0 {
                self.registers.value(COLUPF)
            } else if pixel < HALF_WIDTH {
                self.registers.value(COLUP0)
            } else {
                self.registers.value(COLUP1)
            }
        });

        let layered = if ctrlpf & CTRLPF_PRIORITY != 0 {
            pf.or(p0).or(p1)
        } else {
            p0.or(p1).or(pf)
        };

        layered.unwrap_or_else(|| self.registers.value(COLUBK))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{GRP0, GRP1, NUSIZ0, PF0, PF1, PF2, REFP0};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BACKGROUND: u8 = 0x80;
    const FOREGROUND: u8 = 0x1E;

    /// CPU that never touches the bus
    struct IdleCpu {
        cycles: u32,
        steps: usize,
    }

    impl Cpu for IdleCpu {
        fn reset(&mut self) {}

        fn step(&mut self) -> u32 {
            self.steps += 1;
            self.cycles
        }
    }

    /// CPU that writes WSYNC with every instruction
    struct SyncingCpu {
        registers: RegisterFile,
        steps: usize,
    }

    impl Cpu for SyncingCpu {
        fn reset(&mut self) {}

        fn step(&mut self) -> u32 {
            self.steps += 1;
            self.registers.set(WSYNC, 0);
            3
        }
    }

    /// CPU that writes WSYNC on its first instruction, then idles
    struct SyncOnceCpu {
        registers: RegisterFile,
        steps: usize,
    }

    impl Cpu for SyncOnceCpu {
        fn reset(&mut self) {}

        fn step(&mut self) -> u32 {
            if self.steps == 0 {
                self.registers.set(WSYNC, 0);
            }
            self.steps += 1;
            1
        }
    }

    /// CPU that runs a fixed list of register writes, one per 1-cycle step
    struct ScriptedCpu {
        registers: RegisterFile,
        script: Vec<Option<(usize, u8)>>,
        steps: usize,
    }

    impl Cpu for ScriptedCpu {
        fn reset(&mut self) {}

        fn step(&mut self) -> u32 {
            if let Some(Some((register, value))) = self.script.get(self.steps) {
                self.registers.set(*register, *value);
            }
            self.steps += 1;
            1
        }
    }

    fn tia() -> Tia {
        let tia = Tia::new(&mut StdRng::seed_from_u64(2600));
        let registers = tia.registers();
        for register in [GRP0, GRP1, CTRLPF, PF0, PF1, PF2] {
            registers.set(register, 0);
        }
        registers.set(COLUBK, BACKGROUND);
        registers.set(COLUPF, FOREGROUND);
        tia
    }

    fn idle_cpu() -> IdleCpu {
        IdleCpu { cycles: 1, steps: 0 }
    }

    #[test]
    fn test_scanline_has_160_pixels() {
        let mut tia = Tia::new(&mut StdRng::seed_from_u64(1));
        let line = tia.scanline(&mut idle_cpu());
        assert_eq!(line.len(), 160);
    }

    #[test]
    fn test_empty_playfield_is_background() {
        let mut tia = tia();
        let line = tia.scanline(&mut idle_cpu());
        assert!(line.iter().all(|&color| color == BACKGROUND));
    }

    #[test]
    fn test_playfield_bits_cover_four_pixels() {
        let mut tia = tia();
        tia.write(PF0, 0x10);

        let line = tia.scanline(&mut idle_cpu());

        assert_eq!(&line[0..4], &[FOREGROUND; 4]);
        assert_eq!(line[4], BACKGROUND);
        assert_eq!(&line[80..84], &[FOREGROUND; 4]);
        assert_eq!(line[84], BACKGROUND);
    }

    #[test]
    fn test_playfield_register_order() {
        let mut tia = tia();
        tia.write(PF1, 0x80); // leftmost PF1 bit: playfield bit 4
        tia.write(PF2, 0x80); // rightmost PF2 bit: playfield bit 19

        let line = tia.scanline(&mut idle_cpu());
        let lit: Vec<usize> = (0..80).filter(|&x| line[x] == FOREGROUND).collect();

        assert_eq!(lit, vec![16, 17, 18, 19, 76, 77, 78, 79]);
    }

    #[test]
    fn test_halves_repeat_and_lines_are_stable() {
        let mut tia = tia();
        tia.write(PF0, 0xA0);
        tia.write(PF1, 0x5A);
        tia.write(PF2, 0xC3);

        let first = tia.scanline(&mut idle_cpu());
        let second = tia.scanline(&mut idle_cpu());

        assert_eq!(first[..80], first[80..]);
        assert_eq!(first, second);
        assert!(first.contains(&FOREGROUND));
    }

    #[test]
    fn test_reflected_playfield_mirrors_right_half() {
        let mut tia = tia();
        tia.write(PF0, 0x30);
        tia.write(PF1, 0x81);
        tia.write(PF2, 0x06);
        tia.write(CTRLPF, CTRLPF_REFLECT);

        let line = tia.scanline(&mut idle_cpu());
        let mut right = line[80..].to_vec();
        right.reverse();

        assert_eq!(line[..80], right[..]);
    }

    #[test]
    fn test_score_mode_uses_player_colors() {
        let mut tia = tia();
        tia.write(PF0, 0xF0);
        tia.write(COLUP0, 0x44);
        tia.write(COLUP1, 0x88);
        tia.write(CTRLPF, CTRLPF_SCORE);

        let line = tia.scanline(&mut idle_cpu());

        assert_eq!(line[0], 0x44);
        assert_eq!(line[80], 0x88);
    }

    #[test]
    fn test_cpu_gets_one_step_per_three_clocks() {
        let mut tia = tia();
        let mut cpu = idle_cpu();

        tia.scanline(&mut cpu);
        assert_eq!(cpu.steps, 76);

        tia.scanline(&mut cpu);
        assert_eq!(cpu.steps, 152);
    }

    #[test]
    fn test_long_instructions_get_fewer_steps() {
        let mut tia = tia();
        let mut cpu = IdleCpu { cycles: 4, steps: 0 };

        for _ in 0..4 {
            tia.scanline(&mut cpu);
        }

        // 4 lines of 76 cycles at 4 cycles per instruction
        assert_eq!(cpu.steps, 76);
    }

    #[test]
    fn test_wsync_halts_cpu_until_next_line() {
        let mut tia = tia();
        let mut cpu = SyncingCpu {
            registers: tia.registers(),
            steps: 0,
        };

        tia.scanline(&mut cpu);
        assert_eq!(cpu.steps, 1);
        assert!(tia.waiting_for_sync());

        tia.scanline(&mut cpu);
        assert_eq!(cpu.steps, 2);
    }

    #[test]
    fn test_released_cpu_does_not_catch_up_on_halted_cycles() {
        let mut tia = tia();
        let mut cpu = SyncOnceCpu {
            registers: tia.registers(),
            steps: 0,
        };

        tia.scanline(&mut cpu);
        assert_eq!(cpu.steps, 1);

        tia.scanline(&mut cpu);
        assert_eq!(cpu.steps, 1 + 76);

        tia.scanline(&mut cpu);
        assert_eq!(cpu.steps, 1 + 2 * 76);
    }

    #[test]
    fn test_cpu_write_changes_rest_of_line() {
        let mut tia = tia();
        // Step n runs at colour clock 3n: step 54 is clock 162, pixel 94
        let mut script = vec![None; 54];
        script.push(Some((COLUBK, 0x22)));
        let mut cpu = ScriptedCpu {
            registers: tia.registers(),
            script,
            steps: 0,
        };

        let line = tia.scanline(&mut cpu);

        assert!(line[..94].iter().all(|&color| color == BACKGROUND));
        assert!(line[94..].iter().all(|&color| color == 0x22));
    }

    #[test]
    fn test_resp0_from_cpu_positions_player() {
        let mut tia = tia();
        tia.write(GRP0, 0xFF);
        tia.write(COLUP0, 0x56);
        tia.write(NUSIZ0, 0);
        tia.write(REFP0, 0);

        // Step 30 runs at colour clock 90, before pixel 22 is drawn
        let mut script = vec![None; 30];
        script.push(Some((RESP0, 0)));
        let mut cpu = ScriptedCpu {
            registers: tia.registers(),
            script,
            steps: 0,
        };

        tia.scanline(&mut cpu);
        let line = tia.scanline(&mut cpu);

        let drawn: Vec<usize> = (0..160).filter(|&x| line[x] == 0x56).collect();
        assert_eq!(drawn, (27..35).collect::<Vec<_>>());
    }

    #[test]
    fn test_players_cover_playfield_unless_priority() {
        let mut tia = tia();
        tia.write(PF0, 0xF0);
        tia.write(PF1, 0xFF);
        tia.write(PF2, 0xFF);
        tia.write(GRP0, 0xFF);
        tia.write(COLUP0, 0x56);
        tia.write(NUSIZ0, 0);
        tia.write(RESP0, 0);

        // Strobe is taken at once; the copy shows one full line later
        let mut cpu = idle_cpu();
        tia.scanline(&mut cpu);
        let line = tia.scanline(&mut cpu);
        assert!(line.contains(&0x56));

        tia.write(CTRLPF, CTRLPF_PRIORITY);
        let line = tia.scanline(&mut cpu);
        assert!(!line.contains(&0x56));
        assert!(line.iter().all(|&color| color == FOREGROUND));
    }

    #[test]
    fn test_write_applies_resp_strobe_immediately() {
        let mut tia = tia();
        tia.write(RESP1, 0);

        assert_eq!(tia.player(1).map(Player::position), Some(0));
        assert!(!tia.registers().is_latched(RESP1));
    }

    #[test]
    fn test_read_register_file() {
        let mut tia = tia();
        tia.write(0x05, 0x3C);

        assert_eq!(tia.read(0x05), Some(0x3C));
        assert_eq!(tia.read(0x40), None);
    }

    #[test]
    fn test_player_lookup() {
        let tia = tia();

        assert_eq!(tia.player(0).map(Player::index), Some(0));
        assert_eq!(tia.player(1).map(Player::index), Some(1));
        assert!(tia.player(2).is_none());
    }
}
