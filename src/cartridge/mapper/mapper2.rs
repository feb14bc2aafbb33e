//! Mapper 2 (UxROM): switchable 16 KiB PRG bank at $8000, last bank fixed at $C000, CHR RAM.

use crate::cartridge::{banks::Banks, mapper::mapper::Mapper};

pub struct Mapper2;

impl Mapper for Mapper2 {
    fn load(&mut self, banks: &mut Banks) {
        let last = banks.prg_banks(0x4000) - 1;
        banks.map_prg(0x8000, 0x4000, 0);
        banks.map_prg(0xC000, 0x4000, last);
        banks.map_chr(0x0000, 0x2000, 0);
    }

    fn write_prg(&mut self, banks: &mut Banks, _addr: u16, data: u8) {
        banks.map_prg(0x8000, 0x4000, (data & 0x0F) as usize);
    }

    fn id(&self) -> u8 {
        2
    }

    fn name(&self) -> &'static str {
        "UxROM"
    }
}
