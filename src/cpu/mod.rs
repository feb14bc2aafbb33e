//! 6502 CPU emulation for the NES.
//!
//! Table-driven: every opcode, undocumented ones included, is an entry in
//! [`opcodes::OPCODES`]. Memory and I/O go through the [`Bus`](crate::bus::Bus) trait.

pub mod cpu;
pub mod decode;
pub mod flags;
pub mod opcodes;

#[cfg(test)]
mod tests;
