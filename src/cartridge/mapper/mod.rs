//! NES mappers: bank-window selection logic living on the cartridge board.
//!
//! Each mapper is a [`mapper::Mapper`] implementation selected by iNES number in [`for_id`].
//! Adding a board means adding a module here and one match arm; the bus and machine only ever
//! talk to the trait.

pub mod mapper;

pub mod mapper0;
pub mod mapper1;
pub mod mapper2;
pub mod mapper3;
pub mod mapper4;

use crate::cartridge::mapper::mapper::Mapper;

/// Nametable mirroring mode for the PPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    OneScreenLower,
    OneScreenUpper,
    FourScreen,
}

/// Create the mapper for an iNES mapper number, or `None` if the board is not supported.
pub fn for_id(id: u8) -> Option<Box<dyn Mapper>> {
    let mapper: Box<dyn Mapper> = match id {
        0 => Box::new(mapper0::Mapper0),
        1 => Box::new(mapper1::Mapper1::new()),
        2 => Box::new(mapper2::Mapper2),
        3 => Box::new(mapper3::Mapper3),
        4 => Box::new(mapper4::Mapper4::new()),
        _ => return None,
    };
    Some(mapper)
}
