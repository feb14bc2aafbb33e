//! Mapper 3 (CNROM): fixed PRG, switchable 8 KiB CHR bank.

use crate::cartridge::{banks::Banks, mapper::mapper::Mapper};

pub struct Mapper3;

impl Mapper for Mapper3 {
    fn load(&mut self, banks: &mut Banks) {
        let last = banks.prg_banks(0x4000) - 1;
        banks.map_prg(0x8000, 0x4000, 0);
        banks.map_prg(0xC000, 0x4000, last);
        banks.map_chr(0x0000, 0x2000, 0);
    }

    fn write_prg(&mut self, banks: &mut Banks, _addr: u16, data: u8) {
        banks.map_chr(0x0000, 0x2000, (data & 0x03) as usize);
    }

    fn id(&self) -> u8 {
        3
    }

    fn name(&self) -> &'static str {
        "CNROM"
    }
}
