//! Mapper trait: how a cartridge board reacts to the CPU and PPU buses.

use crate::cartridge::banks::Banks;

/// Trait for NES cartridge mappers. A mapper never owns ROM data; it only moves the bank
/// windows and mirroring held in [`Banks`].
pub trait Mapper {
    /// Install the power-on bank layout.
    fn load(&mut self, banks: &mut Banks);
    /// CPU write to $8000–$FFFF (mapper registers; PRG ROM itself is read-only).
    fn write_prg(&mut self, banks: &mut Banks, addr: u16, data: u8);
    /// Called with every PPU pattern-table address ($0000–$1FFF) the PPU puts on its bus.
    fn on_chr_access(&mut self, _addr: u16) {}
    /// Level of the cartridge IRQ line, sampled by the machine after every instruction.
    fn irq_pending(&self) -> bool {
        false
    }
    /// iNES mapper number.
    fn id(&self) -> u8;
    /// Board name for logs.
    fn name(&self) -> &'static str;
}
