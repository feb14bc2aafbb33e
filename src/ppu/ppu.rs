//! NES PPU (Picture Processing Unit) implementation.
//!
//! Dot-stepped 2C02: 341 dots per scanline, 262 scanlines per frame (pre-render line -1,
//! visible 0–239, post-render 240, vblank 241–260). Background tiles go through the
//! fetch/shift-register pipeline one tile pair ahead of the beam; sprites are evaluated at
//! dot 257 for the next line and their patterns fetched at dots 257–320. Scrolling uses the
//! [loopy](https://www.nesdev.org/wiki/PPU_scrolling) v/t/x/w registers.
//! Registers: $2000–$2007 (mirrored).

use crate::cartridge::{cartridge::Cartridge, mapper::Mirroring};
use crate::interrupts::Interrupts;
use crate::ppu::frame::{HEIGHT, NES_PALETTE_RGB, WIDTH};

/// OAM (Object Attribute Memory): 64 sprites × 4 bytes. Each entry: Y, tile, attr, X.
pub const OAM_LEN: usize = 256;

const DOTS_PER_LINE: u16 = 341;
const PRE_RENDER_LINE: i16 = -1;
const VBLANK_LINE: i16 = 241;
const LAST_LINE: i16 = 260;

const CTRL_INCREMENT_32: u8 = 0x04;
const CTRL_SPRITE_TABLE: u8 = 0x08;
const CTRL_BG_TABLE: u8 = 0x10;
const CTRL_SPRITE_16: u8 = 0x20;
const CTRL_NMI: u8 = 0x80;

const MASK_GRAYSCALE: u8 = 0x01;
const MASK_BG_LEFT: u8 = 0x02;
const MASK_SPRITE_LEFT: u8 = 0x04;
const MASK_BG: u8 = 0x08;
const MASK_SPRITES: u8 = 0x10;

const STATUS_OVERFLOW: u8 = 0x20;
const STATUS_SPRITE_0: u8 = 0x40;
const STATUS_VBLANK: u8 = 0x80;

/// A sprite selected for a scanline, with its pattern row already fetched.
#[derive(Clone, Copy, Default, Debug)]
struct SpriteSlot {
    index: u8,
    x: u8,
    attr: u8,
    tile: u8,
    /// Row within the sprite, before vertical flip.
    row: u8,
    lo: u8,
    hi: u8,
}

/// PPU state: timing, loopy registers, VRAM, palettes, OAM, pipeline and framebuffer.
pub struct PPU {
    /// Dot within the scanline (0..=340).
    pub cycle: u16,
    pub scanline: i16,
    /// Frames started since power-on; odd frames may skip a dot.
    pub frame: u64,
    /// Dots processed since power-on.
    pub clock: u64,
    /// Set when entering vblank (scanline 241); clear after presenting the framebuffer.
    pub frame_ready: bool,
    pub ctrl: u8,
    pub mask: u8,
    vblank: bool,
    sprite_0_hit: bool,
    sprite_overflow: bool,
    /// A $2002 read just before the vblank dot cancels the flag for this frame.
    suppress_vblank: bool,

    /// Current VRAM address (15 bits: fine Y, nametable, coarse Y, coarse X).
    v: u16,
    /// Temporary VRAM address; top-left of the screen during rendering.
    t: u16,
    fine_x: u8,
    /// First/second write toggle shared by $2005 and $2006.
    w: bool,
    read_buffer: u8,
    /// Last value seen on the PPU data bus; fills write-only and unused bits.
    open_bus: u8,

    /// Nametable RAM, 4 KiB so four-screen boards get every quadrant.
    nametable: [u8; 0x1000],
    mirroring: Mirroring,
    /// $2000–$2FFF offset → nametable RAM index for the current mirroring.
    mirror_table: Box<[u16; 0x1000]>,
    /// Palette RAM $3F00-$3F1F (32 bytes, with NES mirroring).
    palette: [u8; 32],
    /// OAM: 64 sprites × 4 bytes (Y, tile, attr, X). Written via $2003/$2004 or $4014 DMA.
    pub oam: [u8; OAM_LEN],
    /// OAM address for $2003/$2004 (byte index 0..255).
    pub oam_addr: u8,

    nt_latch: u8,
    at_latch: u8,
    pattern_lo_latch: u8,
    pattern_hi_latch: u8,
    bg_shift_lo: u16,
    bg_shift_hi: u16,
    at_shift_lo: u16,
    at_shift_hi: u16,

    sprites: [SpriteSlot; 8],
    sprite_count: usize,
    next_sprites: [SpriteSlot; 8],
    next_sprite_count: usize,

    /// 256×240 framebuffer (0xRRGGBB per pixel). Row-major, left-to-right, top-to-bottom.
    pub framebuffer: Vec<u32>,
}

impl Default for PPU {
    fn default() -> Self {
        Self::new()
    }
}

impl PPU {
    /// Create PPU in initial state (pre-render scanline -1, cycle 0).
    pub fn new() -> Self {
        Self {
            cycle: 0,
            scanline: PRE_RENDER_LINE,
            frame: 0,
            clock: 0,
            frame_ready: false,
            ctrl: 0,
            mask: 0,
            vblank: false,
            sprite_0_hit: false,
            sprite_overflow: false,
            suppress_vblank: false,
            v: 0,
            t: 0,
            fine_x: 0,
            w: false,
            read_buffer: 0,
            open_bus: 0,
            nametable: [0; 0x1000],
            mirroring: Mirroring::Horizontal,
            mirror_table: Box::new(build_mirror_table(Mirroring::Horizontal)),
            palette: [0; 32],
            oam: [0; OAM_LEN],
            oam_addr: 0,
            nt_latch: 0,
            at_latch: 0,
            pattern_lo_latch: 0,
            pattern_hi_latch: 0,
            bg_shift_lo: 0,
            bg_shift_hi: 0,
            at_shift_lo: 0,
            at_shift_hi: 0,
            sprites: [SpriteSlot::default(); 8],
            sprite_count: 0,
            next_sprites: [SpriteSlot::default(); 8],
            next_sprite_count: 0,
            framebuffer: vec![0; WIDTH * HEIGHT],
        }
    }

    pub fn rendering_enabled(&self) -> bool {
        self.mask & (MASK_BG | MASK_SPRITES) != 0
    }

    fn rendering_line(&self) -> bool {
        self.scanline == PRE_RENDER_LINE || (0..240).contains(&self.scanline)
    }

    /// Run dots until `clock` reaches `target`.
    pub fn catch_up(&mut self, target: u64, cart: &mut Cartridge, interrupts: &mut Interrupts) {
        while self.clock < target {
            self.tick(cart, interrupts);
        }
    }

    /// Process the current dot and advance to the next one.
    pub fn tick(&mut self, cart: &mut Cartridge, interrupts: &mut Interrupts) {
        let dot = self.cycle;
        let visible = (0..240).contains(&self.scanline);
        let pre_render = self.scanline == PRE_RENDER_LINE;

        if pre_render && dot == 1 {
            self.vblank = false;
            self.sprite_0_hit = false;
            self.sprite_overflow = false;
            self.suppress_vblank = false;
        }

        if self.scanline == VBLANK_LINE && dot == 1 {
            self.frame_ready = true;
            if !self.suppress_vblank {
                self.vblank = true;
                if self.ctrl & CTRL_NMI != 0 {
                    interrupts.request_nmi();
                }
            }
        }

        if self.rendering_enabled() && (visible || pre_render) {
            if (2..=257).contains(&dot) || (321..=337).contains(&dot) {
                self.shift_background();
                match (dot - 1) % 8 {
                    0 => {
                        self.reload_background();
                        let addr = 0x2000 | (self.v & 0x0FFF);
                        self.nt_latch = self.read_vram(addr, cart);
                    }
                    2 => {
                        let v = self.v;
                        let addr = 0x23C0 | (v & 0x0C00) | ((v >> 4) & 0x38) | ((v >> 2) & 0x07);
                        let shift = ((v >> 4) & 0x04) | (v & 0x02);
                        self.at_latch = (self.read_vram(addr, cart) >> shift) & 0x03;
                    }
                    4 => self.pattern_lo_latch = self.read_vram(self.background_row(), cart),
                    6 => self.pattern_hi_latch = self.read_vram(self.background_row() + 8, cart),
                    7 => self.increment_x(),
                    _ => {}
                }
            }
            if visible && (1..=256).contains(&dot) {
                self.render_pixel();
            }
            match dot {
                256 => self.increment_y(),
                257 => {
                    self.copy_x();
                    if visible {
                        self.evaluate_sprites();
                    } else {
                        self.next_sprite_count = 0;
                    }
                }
                280..=304 if pre_render => self.copy_y(),
                _ => {}
            }
            if (257..=320).contains(&dot) {
                let offset = dot - 257;
                match offset % 8 {
                    4 => self.fetch_sprite_row(offset as usize / 8, false, cart),
                    6 => self.fetch_sprite_row(offset as usize / 8, true, cart),
                    _ => {}
                }
            }
        } else if visible && (1..=256).contains(&dot) {
            let color = self.palette[0] & self.color_mask();
            let index = self.scanline as usize * WIDTH + (dot - 1) as usize;
            self.framebuffer[index] = NES_PALETTE_RGB[color as usize];
        }

        self.clock += 1;
        self.advance();
    }

    fn advance(&mut self) {
        self.cycle += 1;
        // Odd frames drop the pre-render line's last dot when rendering.
        if self.scanline == PRE_RENDER_LINE
            && self.cycle == DOTS_PER_LINE - 1
            && self.frame % 2 == 1
            && self.rendering_enabled()
        {
            self.cycle = DOTS_PER_LINE;
        }
        if self.cycle < DOTS_PER_LINE {
            return;
        }

        self.cycle = 0;
        self.scanline += 1;
        self.sprites = self.next_sprites;
        self.sprite_count = self.next_sprite_count;
        self.next_sprite_count = 0;
        if self.scanline > LAST_LINE {
            self.scanline = PRE_RENDER_LINE;
            self.frame += 1;
        }
    }

    fn color_mask(&self) -> u8 {
        if self.mask & MASK_GRAYSCALE != 0 { 0x30 } else { 0x3F }
    }

    fn render_pixel(&mut self) {
        let x = (self.cycle - 1) as usize;
        let y = self.scanline as usize;

        let mut bg_pixel = 0u8;
        let mut bg_palette = 0u8;
        if self.mask & MASK_BG != 0 && (x >= 8 || self.mask & MASK_BG_LEFT != 0) {
            let bit = 0x8000 >> self.fine_x;
            bg_pixel = (u8::from(self.bg_shift_hi & bit != 0) << 1)
                | u8::from(self.bg_shift_lo & bit != 0);
            bg_palette = (u8::from(self.at_shift_hi & bit != 0) << 1)
                | u8::from(self.at_shift_lo & bit != 0);
        }

        let mut sprite_pixel = 0u8;
        let mut sprite_palette = 0u8;
        let mut sprite_behind = false;
        let mut sprite_zero = false;
        if self.mask & MASK_SPRITES != 0 && (x >= 8 || self.mask & MASK_SPRITE_LEFT != 0) {
            for slot in &self.sprites[..self.sprite_count] {
                let offset = x as i32 - slot.x as i32;
                if !(0..8).contains(&offset) {
                    continue;
                }
                let bit = 7 - offset;
                let pixel = (((slot.hi >> bit) & 1) << 1) | ((slot.lo >> bit) & 1);
                if pixel == 0 {
                    continue;
                }
                sprite_pixel = pixel;
                sprite_palette = (slot.attr & 0x03) + 4;
                sprite_behind = slot.attr & 0x20 != 0;
                sprite_zero = slot.index == 0;
                break;
            }
        }

        if sprite_zero && bg_pixel != 0 && sprite_pixel != 0 && x != 255 {
            self.sprite_0_hit = true;
        }

        let palette_addr = match (bg_pixel, sprite_pixel) {
            (0, 0) => 0,
            (0, _) => sprite_palette * 4 + sprite_pixel,
            (_, 0) => bg_palette * 4 + bg_pixel,
            _ if sprite_behind => bg_palette * 4 + bg_pixel,
            _ => sprite_palette * 4 + sprite_pixel,
        };
        let color = self.palette[palette_index(palette_addr as u16)] & self.color_mask();
        self.framebuffer[y * WIDTH + x] = NES_PALETTE_RGB[color as usize];
    }

    fn shift_background(&mut self) {
        self.bg_shift_lo <<= 1;
        self.bg_shift_hi <<= 1;
        self.at_shift_lo <<= 1;
        self.at_shift_hi <<= 1;
    }

    fn reload_background(&mut self) {
        self.bg_shift_lo = (self.bg_shift_lo & 0xFF00) | self.pattern_lo_latch as u16;
        self.bg_shift_hi = (self.bg_shift_hi & 0xFF00) | self.pattern_hi_latch as u16;
        let spread = |bit: u8| if self.at_latch & bit != 0 { 0x00FF } else { 0x0000 };
        self.at_shift_lo = (self.at_shift_lo & 0xFF00) | spread(0x01);
        self.at_shift_hi = (self.at_shift_hi & 0xFF00) | spread(0x02);
    }

    /// Low-plane pattern address of the latched tile at the current fine Y.
    fn background_row(&self) -> u16 {
        let table = if self.ctrl & CTRL_BG_TABLE != 0 { 0x1000 } else { 0 };
        table + self.nt_latch as u16 * 16 + (self.v >> 12)
    }

    fn sprite_height(&self) -> u8 {
        if self.ctrl & CTRL_SPRITE_16 != 0 { 16 } else { 8 }
    }

    /// Select up to eight sprites on the current line for the next one. The overflow search
    /// reproduces the hardware's diagonal OAM walk.
    fn evaluate_sprites(&mut self) {
        let line = self.scanline as i32;
        let height = self.sprite_height() as i32;
        let in_range = |y: u8| (0..height).contains(&(line - y as i32));

        let mut count = 0;
        let mut n = 0;
        while n < 64 && count < 8 {
            let base = n * 4;
            let y = self.oam[base];
            if in_range(y) {
                self.next_sprites[count] = SpriteSlot {
                    index: n as u8,
                    x: self.oam[base + 3],
                    attr: self.oam[base + 2],
                    tile: self.oam[base + 1],
                    row: (line - y as i32) as u8,
                    lo: 0,
                    hi: 0,
                };
                count += 1;
            }
            n += 1;
        }
        self.next_sprite_count = count;

        let mut m = 0;
        while n < 64 {
            if in_range(self.oam[n * 4 + m]) {
                self.sprite_overflow = true;
                break;
            }
            n += 1;
            m = (m + 1) & 3;
        }
    }

    /// Fetch one pattern plane for a sprite slot. Empty slots fetch tile $FF so the mapper
    /// still sees the address pattern.
    fn fetch_sprite_row(&mut self, slot: usize, high: bool, cart: &mut Cartridge) {
        let height = self.sprite_height();
        let (tile, row, attr) = if slot < self.next_sprite_count {
            let s = &self.next_sprites[slot];
            (s.tile, s.row, s.attr)
        } else {
            (0xFF, 0, 0)
        };
        let row = if attr & 0x80 != 0 { height - 1 - row } else { row };
        let addr = if height == 16 {
            let table = ((tile & 1) as u16) << 12;
            let tile = (tile & 0xFE) as u16 + u16::from(row >= 8);
            table + tile * 16 + (row & 7) as u16
        } else {
            let table = if self.ctrl & CTRL_SPRITE_TABLE != 0 { 0x1000 } else { 0 };
            table + tile as u16 * 16 + row as u16
        };
        let mut data = cart.read_chr(addr + if high { 8 } else { 0 });
        if attr & 0x40 != 0 {
            data = data.reverse_bits();
        }
        if slot < self.next_sprite_count {
            let s = &mut self.next_sprites[slot];
            if high {
                s.hi = data;
            } else {
                s.lo = data;
            }
        }
    }

    /// Coarse X increment; wrapping past 31 switches the horizontal nametable.
    fn increment_x(&mut self) {
        if self.v & 0x001F == 31 {
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    /// Fine Y increment with carry into coarse Y; row 29 wraps and switches the vertical
    /// nametable, rows 30–31 wrap without switching.
    fn increment_y(&mut self) {
        if self.v & 0x7000 != 0x7000 {
            self.v += 0x1000;
            return;
        }
        self.v &= !0x7000;
        let mut coarse_y = (self.v & 0x03E0) >> 5;
        if coarse_y == 29 {
            coarse_y = 0;
            self.v ^= 0x0800;
        } else if coarse_y == 31 {
            coarse_y = 0;
        } else {
            coarse_y += 1;
        }
        self.v = (self.v & !0x03E0) | (coarse_y << 5);
    }

    fn copy_x(&mut self) {
        self.v = (self.v & !0x041F) | (self.t & 0x041F);
    }

    fn copy_y(&mut self) {
        self.v = (self.v & !0x7BE0) | (self.t & 0x7BE0);
    }

    /// Rebuild the nametable translation when the cartridge has switched mirroring.
    fn sync_mirroring(&mut self, cart: &Cartridge) {
        let mirroring = cart.mirroring();
        if mirroring != self.mirroring {
            log::debug!("nametable mirroring {:?} -> {:?}", self.mirroring, mirroring);
            self.mirroring = mirroring;
            self.mirror_table = Box::new(build_mirror_table(mirroring));
        }
    }

    fn read_vram(&mut self, addr: u16, cart: &mut Cartridge) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => cart.read_chr(addr),
            0x2000..=0x3EFF => {
                self.sync_mirroring(cart);
                self.nametable[self.mirror_table[(addr & 0x0FFF) as usize] as usize]
            }
            _ => self.palette[palette_index(addr)],
        }
    }

    fn write_vram(&mut self, addr: u16, data: u8, cart: &mut Cartridge) {
        let addr = addr & 0x3FFF;
        match addr {
            // CHR RAM only; ROM boards ignore the write.
            0x0000..=0x1FFF => cart.write_chr(addr, data),
            0x2000..=0x3EFF => {
                self.sync_mirroring(cart);
                self.nametable[self.mirror_table[(addr & 0x0FFF) as usize] as usize] = data;
            }
            // Upper 2 bits of palette entries don't exist on real hardware.
            _ => self.palette[palette_index(addr)] = data & 0x3F,
        }
    }

    /// $2007 address step: 1 or 32 outside rendering, a coarse X and Y bump during it.
    fn increment_v(&mut self) {
        if self.rendering_enabled() && self.rendering_line() {
            self.increment_x();
            self.increment_y();
        } else {
            let step = if self.ctrl & CTRL_INCREMENT_32 != 0 { 32 } else { 1 };
            self.v = (self.v + step) & 0x7FFF;
        }
    }

    /// CPU read of a PPU port (`reg` = address & 7).
    pub fn read_register(
        &mut self,
        reg: u16,
        cart: &mut Cartridge,
        interrupts: &mut Interrupts,
    ) -> u8 {
        let value = match reg & 7 {
            2 => self.read_status(interrupts),
            4 => {
                let data = self.oam[self.oam_addr as usize];
                // Attribute bits 2-4 are unimplemented.
                if self.oam_addr & 3 == 2 { data & 0xE3 } else { data }
            }
            7 => self.read_data(cart),
            _ => self.open_bus,
        };
        self.open_bus = value;
        value
    }

    /// PPUSTATUS ($2002): flags in bits 5–7, open bus below. Clears vblank and the write
    /// toggle. Reads racing the vblank dot suppress the flag or the NMI.
    fn read_status(&mut self, interrupts: &mut Interrupts) -> u8 {
        if self.scanline == VBLANK_LINE {
            match self.cycle {
                // The flag is about to be set: it never appears this frame.
                0 | 1 => self.suppress_vblank = true,
                // Set one or two dots ago: visible, but the NMI is withdrawn.
                2 | 3 => interrupts.suppress_nmi(),
                _ => {}
            }
        }
        let mut status = self.open_bus & 0x1F;
        if self.vblank {
            status |= STATUS_VBLANK;
        }
        if self.sprite_0_hit {
            status |= STATUS_SPRITE_0;
        }
        if self.sprite_overflow {
            status |= STATUS_OVERFLOW;
        }
        self.vblank = false;
        self.w = false;
        status
    }

    /// PPUDATA ($2007) read: buffered below the palette, immediate for palette entries
    /// (the buffer then picks up the nametable byte underneath).
    fn read_data(&mut self, cart: &mut Cartridge) -> u8 {
        let addr = self.v & 0x3FFF;
        let value = if addr >= 0x3F00 {
            self.read_buffer = self.read_vram(addr - 0x1000, cart);
            (self.read_vram(addr, cart) & 0x3F) | (self.open_bus & 0xC0)
        } else {
            let buffered = self.read_buffer;
            self.read_buffer = self.read_vram(addr, cart);
            buffered
        };
        self.increment_v();
        value
    }

    /// CPU write to a PPU port (`reg` = address & 7).
    pub fn write_register(
        &mut self,
        reg: u16,
        data: u8,
        cart: &mut Cartridge,
        interrupts: &mut Interrupts,
    ) {
        self.open_bus = data;
        match reg & 7 {
            0 => {
                let was_enabled = self.ctrl & CTRL_NMI != 0;
                self.ctrl = data;
                self.t = (self.t & !0x0C00) | ((data as u16 & 0x03) << 10);
                // Enabling NMI while the vblank flag is up fires one right away.
                if !was_enabled && data & CTRL_NMI != 0 && self.vblank {
                    interrupts.request_nmi();
                }
            }
            1 => self.mask = data,
            3 => self.oam_addr = data,
            4 => {
                self.oam[self.oam_addr as usize] = data;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            5 => {
                if !self.w {
                    self.t = (self.t & !0x001F) | (data as u16 >> 3);
                    self.fine_x = data & 0x07;
                } else {
                    self.t = (self.t & !0x73E0)
                        | ((data as u16 & 0x07) << 12)
                        | ((data as u16 & 0xF8) << 2);
                }
                self.w = !self.w;
            }
            6 => {
                if !self.w {
                    self.t = (self.t & 0x00FF) | ((data as u16 & 0x3F) << 8);
                } else {
                    self.t = (self.t & 0xFF00) | data as u16;
                    self.v = self.t;
                }
                self.w = !self.w;
            }
            7 => {
                self.write_vram(self.v, data, cart);
                self.increment_v();
            }
            // $2002 is read-only.
            _ => {}
        }
    }

    /// Store one OAM DMA byte at the current OAM address.
    pub fn write_oam_dma(&mut self, data: u8) {
        self.oam[self.oam_addr as usize] = data;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }
}

/// Resolve PPU palette address $3F00–$3F1F (and $3F20–$3FFF mirrors) to 32-byte index.
/// Addresses $3F10, $3F14, $3F18, $3F1C mirror $3F00, $3F04, $3F08, $3F0C.
fn palette_index(addr: u16) -> usize {
    let i = (addr & 0x1F) as usize;
    if i & 0x13 == 0x10 { i & 0x0F } else { i }
}

/// Translation from a $2000–$2FFF offset to nametable RAM for one mirroring mode.
fn build_mirror_table(mirroring: Mirroring) -> [u16; 0x1000] {
    let mut table = [0u16; 0x1000];
    for (offset, entry) in table.iter_mut().enumerate() {
        let quadrant = (offset / 0x400) as u16;
        let page = match mirroring {
            Mirroring::Horizontal => quadrant / 2,
            Mirroring::Vertical => quadrant % 2,
            Mirroring::OneScreenLower => 0,
            Mirroring::OneScreenUpper => 1,
            Mirroring::FourScreen => quadrant,
        };
        *entry = page * 0x400 + (offset as u16 & 0x3FF);
    }
    table
}
