//! Mapper 0 (NROM): no bank switching, 16/32 KiB PRG, 8 KiB CHR.

use crate::cartridge::{banks::Banks, mapper::mapper::Mapper};

/// NROM: first PRG bank at $8000, last at $C000 (the same bank on 16 KiB boards).
pub struct Mapper0;

impl Mapper for Mapper0 {
    fn load(&mut self, banks: &mut Banks) {
        let last = banks.prg_banks(0x4000) - 1;
        banks.map_prg(0x8000, 0x4000, 0);
        banks.map_prg(0xC000, 0x4000, last);
        banks.map_chr(0x0000, 0x2000, 0);
    }

    fn write_prg(&mut self, _banks: &mut Banks, _addr: u16, _data: u8) {}

    fn id(&self) -> u8 {
        0
    }

    fn name(&self) -> &'static str {
        "NROM"
    }
}
