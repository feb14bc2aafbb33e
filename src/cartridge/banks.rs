//! Cartridge memory: raw PRG ROM, CHR ROM/RAM and PRG RAM, plus the bank windows mappers
//! point into them.
//!
//! The CPU sees $8000–$FFFF through four 8 KiB PRG windows; the PPU sees $0000–$1FFF through
//! eight 1 KiB CHR windows. Mappers with coarser banking fill several windows at once via
//! [`Banks::map_prg`] / [`Banks::map_chr`]. Every window offset is reduced modulo the array
//! length, so a window always addresses a valid slice no matter what a game writes.

use crate::cartridge::mapper::Mirroring;

/// Granularity of a PRG window ($8000–$FFFF is split into four).
pub const PRG_WINDOW: usize = 0x2000;
/// Granularity of a CHR window ($0000–$1FFF is split into eight).
pub const CHR_WINDOW: usize = 0x0400;

/// Raw banks plus the currently selected windows and nametable mirroring.
pub struct Banks {
    pub prg_rom: Vec<u8>,
    pub chr: Vec<u8>,
    /// True when the board has no CHR ROM and `chr` is 8 KiB of writable RAM.
    pub chr_is_ram: bool,
    pub prg_ram: Vec<u8>,
    pub mirroring: Mirroring,
    prg_windows: [usize; 4],
    chr_windows: [usize; 8],
}

impl Banks {
    pub fn new(
        prg_rom: Vec<u8>,
        chr: Vec<u8>,
        chr_is_ram: bool,
        prg_ram: Vec<u8>,
        mirroring: Mirroring,
    ) -> Self {
        Self {
            prg_rom,
            chr,
            chr_is_ram,
            prg_ram,
            mirroring,
            prg_windows: [0; 4],
            chr_windows: [0; 8],
        }
    }

    /// Number of PRG banks of `size` bytes (at least 1).
    pub fn prg_banks(&self, size: usize) -> usize {
        (self.prg_rom.len() / size).max(1)
    }

    /// Number of CHR banks of `size` bytes (at least 1).
    pub fn chr_banks(&self, size: usize) -> usize {
        (self.chr.len() / size).max(1)
    }

    /// Map PRG bank `bank` (in units of `size`) at CPU address `addr` ($8000–$FFFF).
    /// `size` is a multiple of 8 KiB; the bank number wraps around the ROM size.
    pub fn map_prg(&mut self, addr: u16, size: usize, bank: usize) {
        let first = (addr as usize >> 13) & 3;
        let base = (bank % self.prg_banks(size)) * size;
        for i in 0..size / PRG_WINDOW {
            let slot = (first + i) & 3;
            self.prg_windows[slot] = (base + i * PRG_WINDOW) % self.prg_rom.len();
        }
    }

    /// Map CHR bank `bank` (in units of `size`) at PPU address `addr` ($0000–$1FFF).
    pub fn map_chr(&mut self, addr: u16, size: usize, bank: usize) {
        let first = (addr as usize >> 10) & 7;
        let base = (bank % self.chr_banks(size)) * size;
        for i in 0..size / CHR_WINDOW {
            let slot = (first + i) & 7;
            self.chr_windows[slot] = (base + i * CHR_WINDOW) % self.chr.len();
        }
    }

    /// Read PRG ROM at $8000–$FFFF through the active windows.
    pub fn read_prg(&self, addr: u16) -> u8 {
        let window = self.prg_windows[(addr as usize >> 13) & 3];
        self.prg_rom[window + (addr as usize & (PRG_WINDOW - 1))]
    }

    /// Read pattern memory at $0000–$1FFF through the active windows.
    pub fn read_chr(&self, addr: u16) -> u8 {
        let window = self.chr_windows[(addr as usize >> 10) & 7];
        self.chr[window + (addr as usize & (CHR_WINDOW - 1))]
    }

    /// Write pattern memory; ignored unless the board carries CHR RAM.
    pub fn write_chr(&mut self, addr: u16, data: u8) {
        if self.chr_is_ram {
            let window = self.chr_windows[(addr as usize >> 10) & 7];
            self.chr[window + (addr as usize & (CHR_WINDOW - 1))] = data;
        }
    }

    /// Read PRG RAM at $6000–$7FFF. RAM larger or smaller than 8 KiB is mirrored.
    pub fn read_prg_ram(&self, addr: u16) -> u8 {
        if self.prg_ram.is_empty() {
            return 0;
        }
        self.prg_ram[(addr as usize - 0x6000) % self.prg_ram.len()]
    }

    pub fn write_prg_ram(&mut self, addr: u16, data: u8) {
        if self.prg_ram.is_empty() {
            return;
        }
        let len = self.prg_ram.len();
        self.prg_ram[(addr as usize - 0x6000) % len] = data;
    }

    /// Byte offset of the PRG window covering `addr`.
    #[cfg(test)]
    pub(crate) fn prg_window(&self, addr: u16) -> usize {
        self.prg_windows[(addr as usize >> 13) & 3]
    }

    /// Byte offset of the CHR window covering `addr`.
    #[cfg(test)]
    pub(crate) fn chr_window(&self, addr: u16) -> usize {
        self.chr_windows[(addr as usize >> 10) & 7]
    }
}
