//! Instruction fetch and effective-address resolution.

use crate::bus::Bus;
use crate::cpu::cpu::CPU;
use crate::cpu::opcodes::{Mode, OPCODES, Opcode};

/// A fetched instruction with its addressing already resolved.
#[derive(Clone, Copy, Debug)]
pub struct Instruction {
    /// Address of the opcode byte.
    pub pc: u16,
    pub code: u8,
    pub opcode: Opcode,
    /// Effective address for memory modes, branch target for relative mode.
    pub addr: u16,
    /// Address before indexing. SHA/SHX/SHY/TAS take their mask from its high byte.
    pub base: u16,
    /// Immediate value, or the byte read from `addr` when the operation reads memory.
    pub operand: u8,
    pub args: [u8; 2],
    /// Page-cross and branch penalties on top of the table cost.
    pub extra_cycles: u8,
    pub page_crossed: bool,
}

impl Instruction {
    /// Total cost once penalties are known.
    pub fn cycles(&self) -> u64 {
        u64::from(self.opcode.cycles + self.extra_cycles)
    }
}

impl<B: Bus> CPU<B> {
    /// Fetch the opcode and its operand bytes and resolve the effective address.
    ///
    /// Pointer reads for indirect modes happen here. The operand itself is read later,
    /// once the bus has been told which cycle the access lands on.
    pub(super) fn decode(&mut self) -> Instruction {
        let pc = self.pc;
        let code = self.fetch_byte();
        let opcode = OPCODES[code as usize];
        let mut inst = Instruction {
            pc,
            code,
            opcode,
            addr: 0,
            base: 0,
            operand: 0,
            args: [0; 2],
            extra_cycles: 0,
            page_crossed: false,
        };
        for i in 0..opcode.mode.len() as usize {
            inst.args[i] = self.fetch_byte();
        }

        let lo = inst.args[0];
        let word = u16::from_le_bytes(inst.args);
        match opcode.mode {
            Mode::Imp | Mode::Acc => {}
            Mode::Imm => inst.operand = lo,
            Mode::Zp => inst.addr = lo as u16,
            Mode::Zpx => inst.addr = lo.wrapping_add(self.x) as u16,
            Mode::Zpy => inst.addr = lo.wrapping_add(self.y) as u16,
            Mode::Abs => inst.addr = word,
            Mode::Abx => self.index(&mut inst, word, self.x),
            Mode::Aby => self.index(&mut inst, word, self.y),
            Mode::Ind => {
                // The pointer's high byte never carries into the next page.
                let hi_addr = (word & 0xFF00) | (word.wrapping_add(1) & 0x00FF);
                inst.addr = u16::from_le_bytes([self.bus.read(word), self.bus.read(hi_addr)]);
            }
            Mode::Izx => inst.addr = self.read_zero_page_word(lo.wrapping_add(self.x)),
            Mode::Izy => {
                let base = self.read_zero_page_word(lo);
                self.index(&mut inst, base, self.y);
            }
            Mode::Rel => inst.addr = self.pc.wrapping_add(lo as i8 as u16),
        }
        inst
    }

    fn index(&self, inst: &mut Instruction, base: u16, index: u8) {
        let addr = base.wrapping_add(index as u16);
        inst.base = base;
        inst.addr = addr;
        inst.page_crossed = (base ^ addr) & 0xFF00 != 0;
        if inst.page_crossed && !inst.opcode.store {
            inst.extra_cycles += 1;
        }
    }

    /// Pointer fetch that wraps inside page zero.
    fn read_zero_page_word(&mut self, ptr: u8) -> u16 {
        let lo = self.bus.read(ptr as u16);
        let hi = self.bus.read(ptr.wrapping_add(1) as u16);
        u16::from_le_bytes([lo, hi])
    }

    pub(super) fn fetch_byte(&mut self) -> u8 {
        let byte = self.bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }
}
