//! NES cartridge loading and mapper support.
//!
//! - **cartridge**: Parses iNES (.nes) images and owns the loaded board (banks + mapper).
//! - **banks**: Raw PRG/CHR/PRG-RAM storage and the active bank windows.
//! - **mapper**: NROM (0), MMC1 (1), UxROM (2), CNROM (3), MMC3 (4).

pub mod banks;
pub mod cartridge;
pub mod mapper;

pub use cartridge::{Cartridge, Header, LoadError};
