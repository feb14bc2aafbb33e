//! Memory bus and address decoding for the NES.
//!
//! Maps CPU addresses to RAM, PPU registers, APU, controller and cartridge. The bus also
//! keeps the PPU (3 dots per CPU cycle) and APU in step with the processor: before any
//! access that can observe or change their state they are caught up to the cycle the
//! access lands on.

use crate::{
    apu::apu::APU,
    cartridge::cartridge::Cartridge,
    controller::{Controller, InputSource},
    interrupts::Interrupts,
    ppu::ppu::PPU,
};

/// PPU dots per CPU cycle (NTSC).
pub const PPU_DOTS_PER_CPU_CYCLE: u64 = 3;

/// CPU cycles an OAM DMA steals, before the odd-cycle alignment penalty.
const OAM_DMA_CYCLES: u64 = 513;

/// Trait for memory-mapped I/O and bus access used by the CPU.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    /// Processor cycle on which the next access happens.
    fn sync(&mut self, _cpu_cycle: u64) {}

    /// Cycles the CPU must stall for transfers started since the last call (OAM DMA).
    fn take_stall_cycles(&mut self) -> u64 {
        0
    }
}

/// Main NES bus: RAM, PPU, APU, cartridge, controller and the interrupt scheduler the
/// devices raise requests on.
pub struct NesBus {
    pub ram: [u8; 2048],
    pub cart: Cartridge,
    pub ppu: PPU,
    pub apu: APU,
    pub controller: Controller,
    pub interrupts: Interrupts,
    cpu_cycle: u64,
    stall_cycles: u64,
}

impl NesBus {
    /// Create a new bus with the given cartridge and controller input.
    pub fn new(cart: Cartridge, input: Box<dyn InputSource>) -> Self {
        Self {
            ram: [0; 2048],
            cart,
            ppu: PPU::new(),
            apu: APU::new(),
            controller: Controller::new(input),
            interrupts: Interrupts::new(),
            cpu_cycle: 0,
            stall_cycles: 0,
        }
    }

    /// Advance the PPU and APU to the current processor cycle.
    pub fn catch_up(&mut self) {
        self.catch_up_ppu();
        self.apu.catch_up(self.cpu_cycle);
    }

    fn catch_up_ppu(&mut self) {
        self.ppu.catch_up(
            self.cpu_cycle * PPU_DOTS_PER_CPU_CYCLE,
            &mut self.cart,
            &mut self.interrupts,
        );
    }

    /// Combined level of the maskable interrupt sources.
    pub fn irq_line(&self) -> bool {
        self.apu.irq_pending() || self.cart.irq_pending()
    }

    /// True when the PPU has entered vblank; framebuffer is complete.
    pub fn frame_ready(&self) -> bool {
        self.ppu.frame_ready
    }

    /// Clear frame_ready after presenting (so the next frame can set it at vblank).
    pub fn clear_frame_ready(&mut self) {
        self.ppu.frame_ready = false;
    }

    /// Copy a 256-byte CPU page into OAM starting at the current OAM address.
    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        for i in 0..256u16 {
            let data = self.read(base + i);
            self.ppu.write_oam_dma(data);
        }
        // One extra alignment cycle when the transfer starts on an odd cycle.
        self.stall_cycles += OAM_DMA_CYCLES + self.cpu_cycle % 2;
    }
}

impl Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            // Internal RAM (mirrored 4x in 0x0000-0x1FFF)
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            // PPU registers $2000-$3FFF (mirrored every 8 bytes)
            0x2000..=0x3FFF => {
                self.catch_up_ppu();
                self.ppu
                    .read_register(addr & 7, &mut self.cart, &mut self.interrupts)
            }
            0x4015 => {
                self.apu.catch_up(self.cpu_cycle);
                self.apu.read_status()
            }
            0x4016 => self.controller.read(),
            // Write-only APU ports, second controller, unmapped expansion space
            0x4000..=0x5FFF => 0,
            0x6000..=0x7FFF => self.cart.read_prg_ram(addr),
            // Cartridge PRG ROM
            0x8000..=0xFFFF => self.cart.read_prg(addr),
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            // Internal RAM
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = data,
            // PPU registers $2000-$3FFF (mirrored every 8 bytes)
            0x2000..=0x3FFF => {
                self.catch_up_ppu();
                self.ppu
                    .write_register(addr & 7, data, &mut self.cart, &mut self.interrupts);
            }
            0x4014 => self.oam_dma(data),
            0x4016 => self.controller.write(data),
            0x4000..=0x4017 => {
                self.apu.catch_up(self.cpu_cycle);
                self.apu.write(addr, data);
            }
            0x4018..=0x5FFF => {}
            0x6000..=0x7FFF => self.cart.write_prg_ram(addr, data),
            // Mapper registers: the PPU must see bank and mirroring changes at the right dot.
            0x8000..=0xFFFF => {
                self.catch_up_ppu();
                self.cart.write_prg(addr, data);
            }
        }
    }

    fn sync(&mut self, cpu_cycle: u64) {
        self.cpu_cycle = cpu_cycle;
    }

    fn take_stall_cycles(&mut self) -> u64 {
        std::mem::take(&mut self.stall_cycles)
    }
}
