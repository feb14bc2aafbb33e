//! Mapper 1 (MMC1): bank switching via a 5-bit serial shift register.
//!
//! [MMC1](https://www.nesdev.org/wiki/MMC1): writes to $8000–$9FFF (control), $A000–$BFFF (CHR0),
//! $C000–$DFFF (CHR1), $E000–$FFFF (PRG bank). Any write with bit 7 set resets the shift register
//! and forces PRG mode 3. Otherwise bit 0 is shifted in (LSB first); the fifth write commits the
//! value to the register selected by the address of that write.
//!
//! Control: bits 0–1 mirroring, bits 2–3 PRG mode, bit 4 CHR mode (0 = one 8 KiB bank,
//! 1 = two 4 KiB banks).

use crate::cartridge::{
    banks::Banks,
    mapper::{Mirroring, mapper::Mapper},
};

const CONTROL_RESET: u8 = 0x0C;
const CHR_4K_MODE: u8 = 0x10;

/// MMC1 state: shift register, control byte and the three bank registers.
pub struct Mapper1 {
    shift: u8,
    writes: u8,
    control: u8,
    chr_bank0: u8,
    chr_bank1: u8,
    prg_bank: u8,
}

impl Mapper1 {
    pub fn new() -> Self {
        Self {
            shift: 0,
            writes: 0,
            control: CONTROL_RESET,
            chr_bank0: 0,
            chr_bank1: 0,
            prg_bank: 0,
        }
    }

    /// Recompute every window from the current registers.
    fn apply(&self, banks: &mut Banks) {
        banks.mirroring = match self.control & 0b11 {
            0 => Mirroring::OneScreenLower,
            1 => Mirroring::OneScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        };

        let prg = self.prg_bank as usize;
        match (self.control >> 2) & 0b11 {
            // 32 KiB: low bit of the bank number ignored.
            0 | 1 => banks.map_prg(0x8000, 0x8000, prg >> 1),
            // First bank fixed at $8000, switch $C000.
            2 => {
                banks.map_prg(0x8000, 0x4000, 0);
                banks.map_prg(0xC000, 0x4000, prg);
            }
            // Switch $8000, last bank fixed at $C000.
            _ => {
                let last = banks.prg_banks(0x4000) - 1;
                banks.map_prg(0x8000, 0x4000, prg);
                banks.map_prg(0xC000, 0x4000, last);
            }
        }

        if self.control & CHR_4K_MODE != 0 {
            banks.map_chr(0x0000, 0x1000, self.chr_bank0 as usize);
            banks.map_chr(0x1000, 0x1000, self.chr_bank1 as usize);
        } else {
            banks.map_chr(0x0000, 0x2000, (self.chr_bank0 >> 1) as usize);
        }
    }
}

impl Default for Mapper1 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper for Mapper1 {
    fn load(&mut self, banks: &mut Banks) {
        self.apply(banks);
    }

    fn write_prg(&mut self, banks: &mut Banks, addr: u16, data: u8) {
        if data & 0x80 != 0 {
            self.shift = 0;
            self.writes = 0;
            self.control |= CONTROL_RESET;
            self.apply(banks);
            return;
        }

        self.shift = (self.shift >> 1) | ((data & 1) << 4);
        self.writes += 1;
        if self.writes < 5 {
            return;
        }

        let value = self.shift;
        self.shift = 0;
        self.writes = 0;
        match addr {
            0x8000..=0x9FFF => self.control = value,
            0xA000..=0xBFFF => self.chr_bank0 = value,
            0xC000..=0xDFFF => self.chr_bank1 = value,
            // Bit 4 is the PRG RAM chip enable, not part of the bank number.
            _ => self.prg_bank = value & 0x0F,
        }
        self.apply(banks);
        log::debug!(
            "MMC1 commit ${:04X} <- {:05b} (control {:05b}, prg {}, chr {}/{})",
            addr,
            value,
            self.control,
            self.prg_bank,
            self.chr_bank0,
            self.chr_bank1
        );
    }

    fn id(&self) -> u8 {
        1
    }

    fn name(&self) -> &'static str {
        "MMC1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 256 KiB PRG, 128 KiB CHR; each byte holds its own 4 KiB (CHR) / 16 KiB (PRG) bank number.
    fn banks() -> Banks {
        let prg = (0..16 * 0x4000).map(|i| (i / 0x4000) as u8).collect();
        let chr = (0..32 * 0x1000).map(|i| (i / 0x1000) as u8).collect();
        Banks::new(prg, chr, false, vec![0; 0x2000], Mirroring::Horizontal)
    }

    fn serial_write(m: &mut Mapper1, b: &mut Banks, addr: u16, value: u8) {
        for i in 0..5 {
            m.write_prg(b, addr, (value >> i) & 1);
        }
    }

    #[test]
    fn power_on_fixes_last_bank_high() {
        let (mut m, mut b) = (Mapper1::new(), banks());
        m.load(&mut b);
        assert_eq!(b.read_prg(0x8000), 0);
        assert_eq!(b.read_prg(0xC000), 15);
    }

    #[test]
    fn fifth_write_commits_prg_bank() {
        let (mut m, mut b) = (Mapper1::new(), banks());
        m.load(&mut b);
        for i in 0..4 {
            m.write_prg(&mut b, 0xE000, (5 >> i) & 1);
            assert_eq!(b.read_prg(0x8000), 0, "write {} must not commit", i + 1);
        }
        m.write_prg(&mut b, 0xE000, 0);
        assert_eq!(b.read_prg(0x8000), 5);
        assert_eq!(b.read_prg(0xC000), 15);
    }

    #[test]
    fn reset_bit_clears_shift_register() {
        let (mut m, mut b) = (Mapper1::new(), banks());
        m.load(&mut b);
        m.write_prg(&mut b, 0xE000, 1);
        m.write_prg(&mut b, 0xE000, 1);
        m.write_prg(&mut b, 0x8000, 0x80);
        serial_write(&mut m, &mut b, 0xE000, 3);
        assert_eq!(b.read_prg(0x8000), 3);
    }

    #[test]
    fn control_selects_mirroring() {
        let (mut m, mut b) = (Mapper1::new(), banks());
        m.load(&mut b);
        for (value, expected) in [
            (0x0C, Mirroring::OneScreenLower),
            (0x0D, Mirroring::OneScreenUpper),
            (0x0E, Mirroring::Vertical),
            (0x0F, Mirroring::Horizontal),
        ] {
            serial_write(&mut m, &mut b, 0x8000, value);
            assert_eq!(b.mirroring, expected);
        }
    }

    #[test]
    fn prg_mode_2_fixes_first_bank() {
        let (mut m, mut b) = (Mapper1::new(), banks());
        m.load(&mut b);
        serial_write(&mut m, &mut b, 0x8000, 0x08);
        serial_write(&mut m, &mut b, 0xE000, 6);
        assert_eq!(b.read_prg(0x8000), 0);
        assert_eq!(b.read_prg(0xC000), 6);
    }

    #[test]
    fn prg_mode_0_switches_32k() {
        let (mut m, mut b) = (Mapper1::new(), banks());
        m.load(&mut b);
        serial_write(&mut m, &mut b, 0x8000, 0x00);
        serial_write(&mut m, &mut b, 0xE000, 5);
        assert_eq!(b.read_prg(0x8000), 4);
        assert_eq!(b.read_prg(0xC000), 5);
    }

    #[test]
    fn chr_4k_mode_uses_bit_4() {
        let (mut m, mut b) = (Mapper1::new(), banks());
        m.load(&mut b);
        serial_write(&mut m, &mut b, 0x8000, 0x1C);
        serial_write(&mut m, &mut b, 0xA000, 3);
        serial_write(&mut m, &mut b, 0xC000, 9);
        assert_eq!(b.read_chr(0x0000), 3);
        assert_eq!(b.read_chr(0x1000), 9);

        serial_write(&mut m, &mut b, 0x8000, 0x0C);
        assert_eq!(b.read_chr(0x0000), 2);
        assert_eq!(b.read_chr(0x1000), 3);
    }
}
