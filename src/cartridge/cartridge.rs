//! NES cartridge loading from iNES format (.nes files).
//!
//! Implements the [iNES](https://www.nesdev.org/wiki/INES) format: 16-byte header (magic "NES\x1A",
//! PRG size in 16 KiB units, CHR size in 8 KiB units, flags 6–7 for mapper and mirroring, byte 8
//! for PRG RAM size), an optional 512-byte trainer, then PRG ROM, then CHR ROM. A CHR size of 0
//! means the board carries 8 KiB of CHR RAM instead.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::cartridge::banks::Banks;
use crate::cartridge::mapper::{self, Mirroring, mapper::Mapper};

const MAGIC: &[u8; 4] = b"NES\x1A";
const HEADER_LEN: usize = 16;
const TRAINER_LEN: usize = 512;
const PRG_UNIT: usize = 16 * 1024;
const CHR_UNIT: usize = 8 * 1024;
const PRG_RAM_UNIT: usize = 8 * 1024;

/// Fatal problems found while loading a cartridge image.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read ROM: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing iNES magic")]
    BadMagic,
    #[error("image truncated: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("image has no PRG ROM")]
    NoPrgRom,
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),
}

/// Facts taken from the 16-byte iNES header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// PRG ROM size in 16 KiB units.
    pub prg_banks: u8,
    /// CHR ROM size in 8 KiB units (0 = CHR RAM).
    pub chr_banks: u8,
    pub mapper_id: u8,
    pub mirroring: Mirroring,
    pub trainer: bool,
    /// PRG RAM size in 8 KiB units as stored in byte 8 (0 is read as one unit).
    pub prg_ram_banks: u8,
}

impl Header {
    pub fn parse(bytes: &[u8]) -> Result<Self, LoadError> {
        if bytes.len() < HEADER_LEN {
            return Err(LoadError::Truncated {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        if &bytes[0..4] != MAGIC {
            return Err(LoadError::BadMagic);
        }
        let flags6 = bytes[6];
        let flags7 = bytes[7];
        // Bit 3 (four-screen) overrides the bit 0 solder pad.
        let mirroring = if flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        Ok(Self {
            prg_banks: bytes[4],
            chr_banks: bytes[5],
            mapper_id: (flags7 & 0xF0) | (flags6 >> 4),
            mirroring,
            trainer: flags6 & 0x04 != 0,
            prg_ram_banks: bytes[8],
        })
    }

    /// Total file size implied by the header.
    fn image_len(&self) -> usize {
        HEADER_LEN
            + if self.trainer { TRAINER_LEN } else { 0 }
            + self.prg_banks as usize * PRG_UNIT
            + self.chr_banks as usize * CHR_UNIT
    }
}

/// A loaded cartridge: header facts, bank memory and the mapper that drives the bank windows.
/// CPU reads PRG via the bus at $6000–$FFFF; the PPU reads CHR at $0000–$1FFF (pattern tables).
pub struct Cartridge {
    pub header: Header,
    pub banks: Banks,
    pub mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Load a cartridge from an iNES file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let data = fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse an in-memory iNES image, strip header and trainer, and hand the raw banks to the
    /// mapper selected by the header.
    pub fn from_bytes(data: &[u8]) -> Result<Self, LoadError> {
        let header = Header::parse(data)?;
        if header.prg_banks == 0 {
            return Err(LoadError::NoPrgRom);
        }
        let expected = header.image_len();
        if data.len() < expected {
            return Err(LoadError::Truncated {
                expected,
                actual: data.len(),
            });
        }
        let mut mapper =
            mapper::for_id(header.mapper_id).ok_or(LoadError::UnsupportedMapper(header.mapper_id))?;

        let prg_start = HEADER_LEN + if header.trainer { TRAINER_LEN } else { 0 };
        let prg_end = prg_start + header.prg_banks as usize * PRG_UNIT;
        let chr_end = prg_end + header.chr_banks as usize * CHR_UNIT;

        let prg_rom = data[prg_start..prg_end].to_vec();
        let chr_is_ram = header.chr_banks == 0;
        let chr = if chr_is_ram {
            vec![0; CHR_UNIT]
        } else {
            data[prg_end..chr_end].to_vec()
        };
        let prg_ram = vec![0; header.prg_ram_banks.max(1) as usize * PRG_RAM_UNIT];

        let mut banks = Banks::new(prg_rom, chr, chr_is_ram, prg_ram, header.mirroring);
        mapper.load(&mut banks);

        log::info!(
            "loaded {} (mapper {}): PRG {} KiB, CHR {} KiB{}, {:?} mirroring{}",
            mapper.name(),
            mapper.id(),
            banks.prg_rom.len() / 1024,
            banks.chr.len() / 1024,
            if chr_is_ram { " RAM" } else { "" },
            banks.mirroring,
            if header.trainer { ", trainer skipped" } else { "" },
        );

        Ok(Self {
            header,
            banks,
            mapper,
        })
    }

    /// CPU read at $8000–$FFFF.
    pub fn read_prg(&self, addr: u16) -> u8 {
        self.banks.read_prg(addr)
    }

    /// CPU write at $8000–$FFFF: PRG ROM is read-only, so the mapper sees every write.
    pub fn write_prg(&mut self, addr: u16, data: u8) {
        self.mapper.write_prg(&mut self.banks, addr, data);
    }

    pub fn read_prg_ram(&self, addr: u16) -> u8 {
        self.banks.read_prg_ram(addr)
    }

    pub fn write_prg_ram(&mut self, addr: u16, data: u8) {
        self.banks.write_prg_ram(addr, data);
    }

    /// PPU pattern read. The mapper observes the address first (MMC3 counts A12 edges).
    pub fn read_chr(&mut self, addr: u16) -> u8 {
        self.mapper.on_chr_access(addr);
        self.banks.read_chr(addr)
    }

    /// PPU pattern write (CHR RAM boards only).
    pub fn write_chr(&mut self, addr: u16, data: u8) {
        self.mapper.on_chr_access(addr);
        self.banks.write_chr(addr, data);
    }

    /// Current nametable mirroring, possibly changed by the mapper since load.
    pub fn mirroring(&self) -> Mirroring {
        self.banks.mirroring
    }

    /// Level of the cartridge IRQ line.
    pub fn irq_pending(&self) -> bool {
        self.mapper.irq_pending()
    }
}
