//! NES controller input handling.
//!
//! Implements the standard NES controller shift register protocol:
//! write $01 to $4016 to latch current state; then read $4016 repeatedly
//! to get one bit per read (A, B, Select, Start, Up, Down, Left, Right).

pub const BUTTON_A: u8 = 1 << 0;
pub const BUTTON_B: u8 = 1 << 1;
pub const BUTTON_SELECT: u8 = 1 << 2;
pub const BUTTON_START: u8 = 1 << 3;
pub const BUTTON_UP: u8 = 1 << 4;
pub const BUTTON_DOWN: u8 = 1 << 5;
pub const BUTTON_LEFT: u8 = 1 << 6;
pub const BUTTON_RIGHT: u8 = 1 << 7;

/// Supplies the current button state (bit 0 = A ... bit 7 = Right) when the game latches.
pub trait InputSource {
    fn buttons(&mut self) -> u8;
}

impl<F: FnMut() -> u8> InputSource for F {
    fn buttons(&mut self) -> u8 {
        self()
    }
}

/// Input source with nothing pressed.
pub struct NoInput;

impl InputSource for NoInput {
    fn buttons(&mut self) -> u8 {
        0
    }
}

/// Represents a single NES controller connected to port 1 ($4016).
pub struct Controller {
    input: Box<dyn InputSource>,
    /// Latched from the input source on write; shifted out LSB-first on read.
    shift: u8,
    /// Reads taken since the last latch; past 8 the register reads back 1.
    reads: u8,
    strobe: bool,
}

impl Controller {
    pub fn new(input: Box<dyn InputSource>) -> Self {
        Self {
            input,
            shift: 0,
            reads: 0,
            strobe: false,
        }
    }

    /// Read one button state from $4016 (bit 0). Each read advances the shift
    /// (next read = next button) unless the strobe is held high.
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            self.latch();
            return self.shift & 1;
        }
        if self.reads >= 8 {
            return 1;
        }
        let bit = self.shift & 1;
        self.shift >>= 1;
        self.reads += 1;
        bit
    }

    /// Write to $4016. Bit 0 is the strobe: while it is 1 the state is re-latched.
    pub fn write(&mut self, data: u8) {
        self.strobe = data & 1 != 0;
        if self.strobe {
            self.latch();
        }
    }

    fn latch(&mut self) {
        self.shift = self.input.buttons();
        self.reads = 0;
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(Box::new(NoInput))
    }
}
