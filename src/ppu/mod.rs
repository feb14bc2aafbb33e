//! PPU (Picture Processing Unit) emulation for the NES.
//!
//! See [PPU](https://www.nesdev.org/wiki/PPU), [PPU registers](https://www.nesdev.org/wiki/PPU_registers),
//! [PPU rendering](https://www.nesdev.org/wiki/PPU_rendering). Handles 341-dot scanlines, 262
//! scanlines per frame, the vblank flag and its read race, background and sprite pipelines,
//! OAM, nametable mirroring, palette and the 256×240 framebuffer.

pub mod frame;
pub mod ppu;
