//! NES APU (Audio Processing Unit) bookkeeping.
//!
//! Implements the parts of the [APU](https://www.nesdev.org/wiki/APU) a program can observe
//! without listening: the [frame counter](https://www.nesdev.org/wiki/APU_Frame_Counter) (4-step
//! or 5-step), the [length counters](https://www.nesdev.org/wiki/APU_Length_Counter) of the
//! pulse, triangle and noise channels, channel enables and the frame interrupt. Registers
//! $4000–$4013, $4015, $4017. No waveform is generated.

/// Length counter lookup table: 5-bit index from register → count. APU_Length_Counter.
const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30,
];

/// Frame counter half-frame positions in CPU cycles after the sequence starts. Quarter
/// frames at 7457 and 22371 have no observable effect.
const STEP_2: u32 = 14913;
const STEP_4: u32 = 29829;
const STEP_5: u32 = 37281;

/// 4-step frame counter: resets every 29830 CPU cycles. IRQ (if not inhibited) at 29829.
const FRAME_4STEP_RESET: u32 = 29830;

/// 5-step frame counter: no IRQ; resets every 37282 cycles. Extra half-frame at 37281.
const FRAME_5STEP_RESET: u32 = 37282;

const STATUS_FRAME_IRQ: u8 = 0x40;

/// Length counter shared by every channel that has one. Loads are ignored while the
/// channel is disabled.
#[derive(Default, Debug)]
struct LengthCounter {
    enabled: bool,
    halt: bool,
    value: u8,
}

impl LengthCounter {
    fn load(&mut self, data: u8) {
        if self.enabled {
            self.value = LENGTH_TABLE[(data >> 3) as usize & 0x1F];
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.value = 0;
        }
    }

    fn clock(&mut self) {
        if !self.halt && self.value > 0 {
            self.value -= 1;
        }
    }

    fn active(&self) -> bool {
        self.value > 0
    }
}

/// Pulse channel ($4000–$4003 = pulse 1, $4004–$4007 = pulse 2).
#[derive(Default, Debug)]
struct Pulse {
    duty: u8,
    length: LengthCounter,
}

impl Pulse {
    /// $4000/$4004: duty, length halt. Volume and envelope bits are ignored.
    fn write_control(&mut self, data: u8) {
        self.duty = (data >> 6) & 3;
        self.length.halt = data & 0x20 != 0;
    }
}

/// The sound unit's observable state.
pub struct APU {
    pulse1: Pulse,
    pulse2: Pulse,
    /// Triangle ($4008–$400B): the control flag doubles as length halt.
    triangle: LengthCounter,
    /// Noise ($400C–$400F).
    noise: LengthCounter,
    frame_irq: bool,
    frame_irq_inhibit: bool,
    frame_4step: bool,
    frame_cycle: u32,
    /// CPU cycle the APU has been advanced to.
    cycle: u64,
}

impl Default for APU {
    fn default() -> Self {
        Self::new()
    }
}

impl APU {
    pub fn new() -> Self {
        Self {
            pulse1: Pulse::default(),
            pulse2: Pulse::default(),
            triangle: LengthCounter::default(),
            noise: LengthCounter::default(),
            frame_irq: false,
            frame_irq_inhibit: false,
            frame_4step: true,
            frame_cycle: 0,
            cycle: 0,
        }
    }

    /// Write to an APU register ($4000–$4013, $4015, $4017).
    pub fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x4000 => self.pulse1.write_control(data),
            0x4003 => self.pulse1.length.load(data),
            0x4004 => self.pulse2.write_control(data),
            0x4007 => self.pulse2.length.load(data),
            0x4008 => self.triangle.halt = data & 0x80 != 0,
            0x400B => self.triangle.load(data),
            0x400C => self.noise.halt = data & 0x20 != 0,
            0x400F => self.noise.load(data),
            0x4015 => {
                self.pulse1.length.set_enabled(data & 0x01 != 0);
                self.pulse2.length.set_enabled(data & 0x02 != 0);
                self.triangle.set_enabled(data & 0x04 != 0);
                self.noise.set_enabled(data & 0x08 != 0);
            }
            0x4017 => {
                self.frame_4step = data & 0x80 == 0;
                self.frame_irq_inhibit = data & 0x40 != 0;
                self.frame_cycle = 0;
                if self.frame_irq_inhibit {
                    self.frame_irq = false;
                }
                // Entering 5-step mode clocks a half frame immediately.
                if !self.frame_4step {
                    self.clock_half_frame();
                }
            }
            // Sweep, timers, envelopes and DMC registers carry no observable state here.
            _ => {}
        }
    }

    /// $4015 read: length counter status in bits 0–3, frame IRQ in bit 6. Clears the frame IRQ.
    pub fn read_status(&mut self) -> u8 {
        let mut r = 0;
        if self.pulse1.length.active() {
            r |= 0x01;
        }
        if self.pulse2.length.active() {
            r |= 0x02;
        }
        if self.triangle.active() {
            r |= 0x04;
        }
        if self.noise.active() {
            r |= 0x08;
        }
        if self.frame_irq {
            r |= STATUS_FRAME_IRQ;
        }
        self.frame_irq = false;
        r
    }

    /// Level of the frame interrupt line.
    pub fn irq_pending(&self) -> bool {
        self.frame_irq
    }

    /// Advance the frame counter up to `cpu_cycle`.
    pub fn catch_up(&mut self, cpu_cycle: u64) {
        while self.cycle < cpu_cycle {
            self.cycle += 1;
            self.tick();
        }
    }

    /// Half-frame: clock length counters. Quarter-frame units (envelope, linear counter)
    /// produce no observable state.
    fn clock_half_frame(&mut self) {
        self.pulse1.length.clock();
        self.pulse2.length.clock();
        self.triangle.clock();
        self.noise.clock();
    }

    fn tick(&mut self) {
        self.frame_cycle += 1;
        if self.frame_4step {
            match self.frame_cycle {
                STEP_2 => self.clock_half_frame(),
                STEP_4 => {
                    self.clock_half_frame();
                    if !self.frame_irq_inhibit {
                        self.frame_irq = true;
                    }
                }
                _ => {}
            }
            if self.frame_cycle >= FRAME_4STEP_RESET {
                self.frame_cycle = 0;
            }
        } else {
            // Steps 1, 3 and 4 only clock quarter-frame units.
            if matches!(self.frame_cycle, STEP_2 | STEP_5) {
                self.clock_half_frame();
            }
            if self.frame_cycle >= FRAME_5STEP_RESET {
                self.frame_cycle = 0;
            }
        }
    }
}
