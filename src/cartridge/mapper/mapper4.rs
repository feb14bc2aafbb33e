//! Mapper 4 (MMC3): 8 KiB PRG / 1–2 KiB CHR banking, switchable mirroring, scanline IRQ.
//!
//! [MMC3](https://www.nesdev.org/wiki/MMC3): Bank select at $8000–$9FFE (even), bank data at
//! $8001–$9FFF (odd). R0/R1 = 2 KiB CHR, R2–R5 = 1 KiB CHR, R6/R7 = 8 KiB PRG. Mirroring at
//! $A000–$BFFE (even). IRQ latch $C000, reload $C001, acknowledge $E000, enable $E001.
//! The IRQ counter clocks on every rising edge of PPU A12 seen on pattern-table fetches.
//! Acknowledging drops the pending request only; once enabled, every later zero crossing
//! raises a new one.

use crate::cartridge::{
    banks::Banks,
    mapper::{Mirroring, mapper::Mapper},
};

/// MMC3 state: bank registers, IRQ counter/latch/enable and the last A12 level.
pub struct Mapper4 {
    /// Bank select ($8000): bits 0–2 = register index, bit 6 = PRG mode, bit 7 = CHR A12 invert.
    bank_select: u8,
    /// R0–R5 CHR, R6–R7 PRG.
    regs: [u8; 8],
    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    irq_pending: bool,
    last_a12: bool,
}

impl Mapper4 {
    pub fn new() -> Self {
        Self {
            bank_select: 0,
            regs: [0, 2, 4, 5, 6, 7, 0, 1],
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            irq_pending: false,
            last_a12: false,
        }
    }

    fn apply(&self, banks: &mut Banks) {
        let second_last = banks.prg_banks(0x2000).saturating_sub(2);
        let last = banks.prg_banks(0x2000) - 1;
        let r6 = self.regs[6] as usize;
        let r7 = self.regs[7] as usize;
        if self.bank_select & 0x40 == 0 {
            banks.map_prg(0x8000, 0x2000, r6);
            banks.map_prg(0xC000, 0x2000, second_last);
        } else {
            banks.map_prg(0x8000, 0x2000, second_last);
            banks.map_prg(0xC000, 0x2000, r6);
        }
        banks.map_prg(0xA000, 0x2000, r7);
        banks.map_prg(0xE000, 0x2000, last);

        // With inversion the 2 KiB pair moves to $1000 and the 1 KiB banks to $0000.
        let invert: u16 = if self.bank_select & 0x80 != 0 { 0x1000 } else { 0 };
        banks.map_chr(invert, 0x0800, (self.regs[0] >> 1) as usize);
        banks.map_chr(invert | 0x0800, 0x0800, (self.regs[1] >> 1) as usize);
        for (i, reg) in self.regs[2..6].iter().enumerate() {
            let addr = (invert ^ 0x1000) | (i as u16 * 0x0400);
            banks.map_chr(addr, 0x0400, *reg as usize);
        }
    }

    /// Clock the scanline counter (one A12 rising edge).
    fn clock_irq(&mut self) {
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }
        if self.irq_counter == 0 && self.irq_enabled {
            self.irq_pending = true;
        }
    }
}

impl Default for Mapper4 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper for Mapper4 {
    fn load(&mut self, banks: &mut Banks) {
        self.apply(banks);
    }

    fn write_prg(&mut self, banks: &mut Banks, addr: u16, data: u8) {
        match addr & 0xE001 {
            0x8000 => {
                self.bank_select = data;
                self.apply(banks);
            }
            0x8001 => {
                self.regs[(self.bank_select & 7) as usize] = data;
                self.apply(banks);
            }
            0xA000 => {
                if banks.mirroring != Mirroring::FourScreen {
                    banks.mirroring = if data & 1 == 0 {
                        Mirroring::Vertical
                    } else {
                        Mirroring::Horizontal
                    };
                }
            }
            // PRG RAM protect: not enforced (MMC6 boards rely on RAM staying writable).
            0xA001 => {}
            0xC000 => self.irq_latch = data,
            0xC001 => {
                self.irq_counter = 0;
                self.irq_reload = true;
            }
            0xE000 => self.irq_pending = false,
            _ => self.irq_enabled = true,
        }
    }

    fn on_chr_access(&mut self, addr: u16) {
        let a12 = addr & 0x1000 != 0;
        if a12 && !self.last_a12 {
            self.clock_irq();
        }
        self.last_a12 = a12;
    }

    fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    fn id(&self) -> u8 {
        4
    }

    fn name(&self) -> &'static str {
        "MMC3"
    }
}
