use crate::{
    bus::Bus,
    cpu::{
        decode::Instruction,
        flags::{self, CARRY, DECIMAL, INTERRUPT_DISABLE, NEGATIVE, OVERFLOW, UNUSED, ZERO},
        opcodes::{Mode, Op},
    },
};

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles spent entering an interrupt handler.
const INTERRUPT_CYCLES: u64 = 7;

pub struct CPU<B: Bus> {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub cycles: u64,
    pub bus: B,
}

impl<B: Bus> CPU<B> {
    /// Power-on state. Call [`CPU::reset`] before stepping.
    pub fn new(bus: B) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0,
            pc: 0,
            status: UNUSED,
            cycles: 0,
            bus,
        }
    }

    pub fn reset(&mut self) {
        self.pc = self.read_word(RESET_VECTOR);
        // Reset runs the interrupt sequence with writes suppressed: S drops by three.
        self.sp = self.sp.wrapping_sub(3);
        self.status |= INTERRUPT_DISABLE | UNUSED;
        self.cycles += INTERRUPT_CYCLES;
        self.bus.sync(self.cycles);
    }

    /// Execute one instruction and return the cycles it consumed, DMA stalls included.
    pub fn step(&mut self) -> u64 {
        let start = self.cycles;
        self.bus.sync(start);

        let mut inst = self.decode();
        if log::log_enabled!(log::Level::Trace) {
            self.trace(&inst);
        }

        // The operand access is the instruction's last bus cycle.
        self.bus.sync(start + inst.cycles() - 1);
        if inst.opcode.mode.is_memory() && inst.opcode.op.reads_operand() {
            inst.operand = self.bus.read(inst.addr);
        }
        self.execute(&mut inst);

        let spent = inst.cycles() + self.bus.take_stall_cycles();
        self.cycles += spent;
        self.bus.sync(self.cycles);
        spent
    }

    /// Enter the NMI handler.
    pub fn nmi(&mut self) {
        self.interrupt(NMI_VECTOR, false);
        self.cycles += INTERRUPT_CYCLES;
        self.bus.sync(self.cycles);
    }

    /// Enter the IRQ handler. Masking by the I flag is the caller's decision.
    pub fn irq(&mut self) {
        self.interrupt(IRQ_VECTOR, false);
        self.cycles += INTERRUPT_CYCLES;
        self.bus.sync(self.cycles);
    }

    pub fn interrupts_disabled(&self) -> bool {
        self.status & INTERRUPT_DISABLE != 0
    }

    fn trace(&self, inst: &Instruction) {
        let bytes = match inst.opcode.mode.len() {
            0 => format!("{:02X}", inst.code),
            1 => format!("{:02X} {:02X}", inst.code, inst.args[0]),
            _ => format!("{:02X} {:02X} {:02X}", inst.code, inst.args[0], inst.args[1]),
        };
        log::trace!(
            "{:04X}  {:<8}  {}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            inst.pc,
            bytes,
            inst.opcode.op.mnemonic(),
            self.a,
            self.x,
            self.y,
            self.status,
            self.sp,
            self.cycles
        );
    }

    fn execute(&mut self, inst: &mut Instruction) {
        let m = inst.operand;
        match inst.opcode.op {
            Op::Lda => self.load_a(m),
            Op::Ldx => {
                self.x = m;
                self.update_zero_and_negative_flags(m);
            }
            Op::Ldy => {
                self.y = m;
                self.update_zero_and_negative_flags(m);
            }
            Op::Lax => {
                self.x = m;
                self.load_a(m);
            }
            Op::Sta => self.store(inst, self.a),
            Op::Stx => self.store(inst, self.x),
            Op::Sty => self.store(inst, self.y),
            Op::Sax => self.store(inst, self.a & self.x),

            Op::Tax => {
                self.x = self.a;
                self.update_zero_and_negative_flags(self.x);
            }
            Op::Tay => {
                self.y = self.a;
                self.update_zero_and_negative_flags(self.y);
            }
            Op::Tsx => {
                self.x = self.sp;
                self.update_zero_and_negative_flags(self.x);
            }
            Op::Txa => self.load_a(self.x),
            Op::Tya => self.load_a(self.y),
            Op::Txs => self.sp = self.x,

            Op::Adc => self.add_with_carry(m),
            Op::Sbc => self.add_with_carry(!m),
            Op::And => self.load_a(self.a & m),
            Op::Ora => self.load_a(self.a | m),
            Op::Eor => self.load_a(self.a ^ m),
            Op::Cmp => self.compare(self.a, m),
            Op::Cpx => self.compare(self.x, m),
            Op::Cpy => self.compare(self.y, m),
            Op::Bit => {
                self.set_flag(ZERO, self.a & m == 0);
                self.set_flag(OVERFLOW, m & 0x40 != 0);
                self.set_flag(NEGATIVE, m & 0x80 != 0);
            }

            Op::Asl => {
                self.read_modify_write(inst, Self::asl);
            }
            Op::Lsr => {
                self.read_modify_write(inst, Self::lsr);
            }
            Op::Rol => {
                self.read_modify_write(inst, Self::rol);
            }
            Op::Ror => {
                self.read_modify_write(inst, Self::ror);
            }
            Op::Inc => {
                self.read_modify_write(inst, Self::increment);
            }
            Op::Dec => {
                self.read_modify_write(inst, Self::decrement);
            }
            Op::Inx => self.x = self.increment(self.x),
            Op::Iny => self.y = self.increment(self.y),
            Op::Dex => self.x = self.decrement(self.x),
            Op::Dey => self.y = self.decrement(self.y),

            Op::Bcc => self.branch(inst, self.status & CARRY == 0),
            Op::Bcs => self.branch(inst, self.status & CARRY != 0),
            Op::Bne => self.branch(inst, self.status & ZERO == 0),
            Op::Beq => self.branch(inst, self.status & ZERO != 0),
            Op::Bpl => self.branch(inst, self.status & NEGATIVE == 0),
            Op::Bmi => self.branch(inst, self.status & NEGATIVE != 0),
            Op::Bvc => self.branch(inst, self.status & OVERFLOW == 0),
            Op::Bvs => self.branch(inst, self.status & OVERFLOW != 0),

            Op::Jmp => self.pc = inst.addr,
            Op::Jsr => {
                self.push_word(self.pc.wrapping_sub(1));
                self.pc = inst.addr;
            }
            Op::Rts => self.pc = self.pop_word().wrapping_add(1),
            Op::Rti => {
                self.status = flags::pulled(self.pop());
                self.pc = self.pop_word();
            }
            Op::Brk => {
                // Skip the padding byte after the opcode.
                self.pc = self.pc.wrapping_add(1);
                self.interrupt(IRQ_VECTOR, true);
            }

            Op::Pha => self.push(self.a),
            Op::Php => self.push(flags::pushed(self.status, true)),
            Op::Pla => {
                let value = self.pop();
                self.load_a(value);
            }
            Op::Plp => self.status = flags::pulled(self.pop()),

            Op::Clc => self.set_flag(CARRY, false),
            Op::Sec => self.set_flag(CARRY, true),
            Op::Cli => self.set_flag(INTERRUPT_DISABLE, false),
            Op::Sei => self.set_flag(INTERRUPT_DISABLE, true),
            Op::Cld => self.set_flag(DECIMAL, false),
            Op::Sed => self.set_flag(DECIMAL, true),
            Op::Clv => self.set_flag(OVERFLOW, false),

            Op::Nop => {}
            Op::Jam => log::warn!(
                "halting opcode ${:02X} at ${:04X} executed as a no-op",
                inst.code,
                inst.pc
            ),

            Op::Slo => {
                let value = self.read_modify_write(inst, Self::asl);
                self.load_a(self.a | value);
            }
            Op::Rla => {
                let value = self.read_modify_write(inst, Self::rol);
                self.load_a(self.a & value);
            }
            Op::Sre => {
                let value = self.read_modify_write(inst, Self::lsr);
                self.load_a(self.a ^ value);
            }
            Op::Rra => {
                let value = self.read_modify_write(inst, Self::ror);
                self.add_with_carry(value);
            }
            Op::Dcp => {
                let value = self.read_modify_write(inst, Self::decrement);
                self.compare(self.a, value);
            }
            Op::Isc => {
                let value = self.read_modify_write(inst, Self::increment);
                self.add_with_carry(!value);
            }
            Op::Anc => {
                self.load_a(self.a & m);
                self.set_flag(CARRY, self.a & 0x80 != 0);
            }
            Op::Alr => {
                let value = self.a & m;
                self.a = self.lsr(value);
            }
            Op::Arr => {
                let carry_in = (self.status & CARRY) << 7;
                let value = ((self.a & m) >> 1) | carry_in;
                self.load_a(value);
                let bit6 = value & 0x40 != 0;
                let bit5 = value & 0x20 != 0;
                self.set_flag(CARRY, bit6);
                self.set_flag(OVERFLOW, bit6 ^ bit5);
            }
            Op::Axs => {
                let value = self.a & self.x;
                self.set_flag(CARRY, value >= m);
                self.x = value.wrapping_sub(m);
                self.update_zero_and_negative_flags(self.x);
            }
            Op::Lxa => {
                self.x = m;
                self.load_a(m);
            }
            Op::Ane => self.load_a((self.a | 0xEE) & self.x & m),
            Op::Las => {
                let value = m & self.sp;
                self.sp = value;
                self.x = value;
                self.load_a(value);
            }
            Op::Sha => self.store_high_masked(inst, self.a & self.x),
            Op::Shx => self.store_high_masked(inst, self.x),
            Op::Shy => self.store_high_masked(inst, self.y),
            Op::Tas => {
                self.sp = self.a & self.x;
                self.store_high_masked(inst, self.sp);
            }
        }
    }

    fn load_a(&mut self, value: u8) {
        self.a = value;
        self.update_zero_and_negative_flags(value);
    }

    fn store(&mut self, inst: &Instruction, value: u8) {
        self.bus.write(inst.addr, value);
    }

    /// Unstable stores: the value is ANDed with the base high byte plus one, and on a page
    /// cross the result also replaces the high byte of the target address.
    fn store_high_masked(&mut self, inst: &Instruction, value: u8) {
        let value = value & ((inst.base >> 8) as u8).wrapping_add(1);
        let addr = if inst.page_crossed {
            ((value as u16) << 8) | (inst.addr & 0x00FF)
        } else {
            inst.addr
        };
        self.bus.write(addr, value);
    }

    /// Apply `f` to the accumulator or to memory and return the new value.
    fn read_modify_write(&mut self, inst: &Instruction, f: fn(&mut Self, u8) -> u8) -> u8 {
        if inst.opcode.mode == Mode::Acc {
            let a = self.a;
            self.a = f(self, a);
            self.a
        } else {
            let value = f(self, inst.operand);
            self.bus.write(inst.addr, value);
            value
        }
    }

    fn asl(&mut self, value: u8) -> u8 {
        self.set_flag(CARRY, value & 0x80 != 0);
        let result = value << 1;
        self.update_zero_and_negative_flags(result);
        result
    }

    fn lsr(&mut self, value: u8) -> u8 {
        self.set_flag(CARRY, value & 0x01 != 0);
        let result = value >> 1;
        self.update_zero_and_negative_flags(result);
        result
    }

    fn rol(&mut self, value: u8) -> u8 {
        let carry_in = self.status & CARRY;
        self.set_flag(CARRY, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.update_zero_and_negative_flags(result);
        result
    }

    fn ror(&mut self, value: u8) -> u8 {
        let carry_in = (self.status & CARRY) << 7;
        self.set_flag(CARRY, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.update_zero_and_negative_flags(result);
        result
    }

    fn increment(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.update_zero_and_negative_flags(result);
        result
    }

    fn decrement(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.update_zero_and_negative_flags(result);
        result
    }

    /// Binary add; SBC passes the inverted operand. The decimal flag has no effect.
    fn add_with_carry(&mut self, value: u8) {
        let sum = self.a as u16 + value as u16 + (self.status & CARRY) as u16;
        let result = sum as u8;
        self.set_flag(CARRY, sum > 0xFF);
        self.set_flag(OVERFLOW, !(self.a ^ value) & (self.a ^ result) & 0x80 != 0);
        self.load_a(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.set_flag(CARRY, register >= value);
        self.update_zero_and_negative_flags(register.wrapping_sub(value));
    }

    fn branch(&mut self, inst: &mut Instruction, condition: bool) {
        if condition {
            inst.extra_cycles += 1;
            if (self.pc & 0xFF00) != (inst.addr & 0xFF00) {
                inst.extra_cycles += 1;
            }
            self.pc = inst.addr;
        }
    }

    fn interrupt(&mut self, vector: u16, brk: bool) {
        self.push_word(self.pc);
        self.push(flags::pushed(self.status, brk));
        self.status |= INTERRUPT_DISABLE;
        self.pc = self.read_word(vector);
    }

    fn set_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.status |= flag;
        } else {
            self.status &= !flag;
        }
    }

    fn update_zero_and_negative_flags(&mut self, value: u8) {
        self.set_flag(ZERO, value == 0);
        self.set_flag(NEGATIVE, value & 0x80 != 0);
    }

    fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.bus.read(addr);
        let hi = self.bus.read(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    fn push(&mut self, value: u8) {
        let addr = 0x0100 | self.sp as u16;
        self.bus.write(addr, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        let addr = 0x0100 | self.sp as u16;
        self.bus.read(addr)
    }

    fn push_word(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push(value as u8);
    }

    fn pop_word(&mut self) -> u16 {
        let lo = self.pop();
        let hi = self.pop();
        u16::from_le_bytes([lo, hi])
    }
}
