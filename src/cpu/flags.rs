//! 6502 processor status register (P) flag bits.

pub const CARRY: u8 = 1 << 0;
pub const ZERO: u8 = 1 << 1;
pub const INTERRUPT_DISABLE: u8 = 1 << 2;
/// Stored and restored, but the 2A03 has no decimal mode.
pub const DECIMAL: u8 = 1 << 3;
/// Only exists in the copy pushed by BRK/PHP.
pub const BREAK: u8 = 1 << 4;
/// Always reads as 1.
pub const UNUSED: u8 = 1 << 5;
pub const OVERFLOW: u8 = 1 << 6;
pub const NEGATIVE: u8 = 1 << 7;

/// Status value as pushed to the stack: bit 5 forced, B set only for software pushes.
pub const fn pushed(status: u8, brk: bool) -> u8 {
    let status = status | UNUSED;
    if brk { status | BREAK } else { status & !BREAK }
}

/// Status value after a pull (PLP/RTI): B discarded, bit 5 forced.
pub const fn pulled(value: u8) -> u8 {
    (value & !BREAK) | UNUSED
}
