//! The whole console: CPU stepping, device catch-up and interrupt delivery.
//!
//! One [`Machine::step`] runs a single instruction, brings the PPU and APU up to the
//! processor's cycle count and then polls the interrupt scheduler at the instruction
//! boundary. NMIs are always taken; IRQs wait behind the I flag.

use crate::{
    bus::NesBus,
    cartridge::cartridge::Cartridge,
    controller::InputSource,
    cpu::cpu::CPU,
    interrupts::Interrupt,
};

pub struct Machine {
    pub cpu: CPU<NesBus>,
}

impl Machine {
    /// Plug in a cartridge and controller and run the reset sequence.
    pub fn new(cart: Cartridge, input: Box<dyn InputSource>) -> Self {
        let mut cpu = CPU::new(NesBus::new(cart, input));
        cpu.reset();
        Self { cpu }
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        self.cpu.bus.catch_up();
    }

    /// Execute one instruction, plus an interrupt entry if one is due. Returns CPU cycles.
    pub fn step(&mut self) -> u64 {
        let start = self.cpu.cycles;
        self.cpu.step();
        self.cpu.bus.catch_up();

        // Maskable sources are level-triggered: while any holds the line a request stays
        // queued, so an unacknowledged source interrupts again after RTI.
        let irq_line = self.cpu.bus.irq_line();
        if irq_line {
            self.cpu.bus.interrupts.request_irq();
        }

        let disabled = self.cpu.interrupts_disabled();
        match self.cpu.bus.interrupts.poll(disabled, irq_line) {
            Some(Interrupt::Nmi) => self.cpu.nmi(),
            Some(Interrupt::Irq) => self.cpu.irq(),
            None => return self.cpu.cycles - start,
        }
        self.cpu.bus.catch_up();
        self.cpu.cycles - start
    }

    /// Run until the PPU finishes a frame and return the framebuffer.
    pub fn run_frame(&mut self) -> &[u32] {
        while !self.cpu.bus.frame_ready() {
            self.step();
        }
        self.cpu.bus.clear_frame_ready();
        self.frame()
    }

    /// Current framebuffer, 256×240 packed 0x00RRGGBB.
    pub fn frame(&self) -> &[u32] {
        &self.cpu.bus.ppu.framebuffer
    }
}
