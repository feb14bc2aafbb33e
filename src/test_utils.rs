//! iNES image builders shared by the unit tests.
//!
//! Header layout used here: bytes 0..4 magic, 4 PRG size (16 KiB units), 5 CHR size (8 KiB
//! units, 0 = CHR RAM), 6 flags 6, 7 flags 7, 8 PRG RAM size (8 KiB units), 9..16 zero.

#![allow(dead_code)]

/// Build an iNES image with pattern-filled PRG (0xAA) and CHR (0xCC).
pub fn build_ines(
    prg_16k: usize,
    chr_8k: usize,
    flags6: u8,
    flags7: u8,
    prg_ram_8k: u8,
    trainer: Option<&[u8; 512]>,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(16 + 512 + prg_16k * 0x4000 + chr_8k * 0x2000);
    bytes.extend_from_slice(b"NES\x1A");
    bytes.push(prg_16k as u8);
    bytes.push(chr_8k as u8);
    bytes.push(flags6);
    bytes.push(flags7);
    bytes.push(prg_ram_8k);
    bytes.extend_from_slice(&[0u8; 7]);
    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }
    bytes.resize(bytes.len() + prg_16k * 0x4000, 0xAA);
    bytes.resize(bytes.len() + chr_8k * 0x2000, 0xCC);
    bytes
}

/// Build a 16 KiB NROM image with `program` at $8000 (mirrored at $C000) and all three
/// vectors pointing at the given addresses. `chr` (up to 8 KiB) seeds CHR ROM; `None` gives
/// CHR RAM.
pub fn build_nrom(program: &[u8], chr: Option<&[u8]>, vectors: (u16, u16, u16)) -> Vec<u8> {
    assert!(program.len() <= 0x4000 - 6, "program too large");
    let chr_banks = usize::from(chr.is_some());
    let mut rom = build_ines(1, chr_banks, 0x01, 0x00, 1, None);
    let prg = 16;
    rom[prg..prg + 0x4000].fill(0xEA);
    rom[prg..prg + program.len()].copy_from_slice(program);
    let (reset, nmi, irq) = vectors;
    for (offset, vector) in [(0x3FFA, nmi), (0x3FFC, reset), (0x3FFE, irq)] {
        rom[prg + offset] = vector as u8;
        rom[prg + offset + 1] = (vector >> 8) as u8;
    }
    if let Some(chr) = chr {
        let start = prg + 0x4000;
        rom[start..start + 0x2000].fill(0);
        rom[start..start + chr.len()].copy_from_slice(chr);
    }
    rom
}
