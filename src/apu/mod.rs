//! NES APU (Audio Processing Unit) emulation, reduced to what the CPU can observe.
//!
//! - **Length counters**: pulse ×2, triangle and noise; loaded from a 32-entry table.
//! - **Frame counter**: 4-step or 5-step mode; clocks the length counters on half frames
//!   and raises the frame IRQ in 4-step mode.
//!
//! Waveform synthesis, mixing and DMC are not implemented.

pub mod apu;
