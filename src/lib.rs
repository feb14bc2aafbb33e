//! nescore: a cycle-counted NES (Nintendo Entertainment System) emulator core.
//!
//! Implements the NES chipset as documented on the
//! [NESdev Wiki](https://www.nesdev.org/wiki/NES_reference_guide): Ricoh 2A03 (CPU and the
//! observable half of its APU), 2C02 PPU, cartridge mappers and controller I/O. Front ends
//! drive a [`machine::Machine`] one frame at a time.
//!
//! ## Modules (NESdev references)
//!
//! - **apu** – [APU](https://www.nesdev.org/wiki/APU): length counters and the
//!   [frame counter](https://www.nesdev.org/wiki/APU_Frame_Counter) with its IRQ
//! - **bus** – [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map): RAM, PPU, APU,
//!   controller, cartridge, OAM DMA; 3 PPU dots per CPU cycle
//! - **cartridge** – [iNES](https://www.nesdev.org/wiki/INES) loading; [mappers](https://www.nesdev.org/wiki/Mapper)
//!   NROM (0), MMC1 (1), UxROM (2), CNROM (3), MMC3 (4)
//! - **controller** – [Controller reading](https://www.nesdev.org/wiki/Controller_reading): $4016 latch, shift-out
//! - **cpu** – [6502](https://www.nesdev.org/wiki/CPU) / 2A03: official and undocumented opcodes
//! - **interrupts** – [NMI](https://www.nesdev.org/wiki/NMI) and [IRQ](https://www.nesdev.org/wiki/IRQ) scheduling
//! - **machine** – the stepping loop tying CPU, devices and interrupts together
//! - **ppu** – [PPU](https://www.nesdev.org/wiki/PPU), [PPU registers](https://www.nesdev.org/wiki/PPU_registers), OAM, nametables, 256×240

pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod interrupts;
pub mod machine;
pub mod ppu;

#[cfg(test)]
mod test_utils;
