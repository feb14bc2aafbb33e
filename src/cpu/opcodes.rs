//! Static 6502 opcode table: all 256 opcodes, including the undocumented ones.
//!
//! Each entry carries the operation, the addressing mode, the base cycle cost and whether the
//! instruction writes memory. Write-class instructions (stores and read-modify-write) have the
//! indexing cycle built into their base cost, so they never pay the page-cross penalty.
//! See [6502 instructions](https://www.nesdev.org/wiki/6502_instructions) and
//! [CPU unofficial opcodes](https://www.nesdev.org/wiki/CPU_unofficial_opcodes).

/// Operation performed by an opcode.
#[rustfmt::skip]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    // Undocumented
    Alr, Anc, Ane, Arr, Axs, Dcp, Isc, Jam, Las, Lax, Lxa, Rla, Rra, Sax,
    Sha, Shx, Shy, Slo, Sre, Tas,
}

impl Op {
    /// Mnemonic for trace output.
    #[rustfmt::skip]
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Adc => "ADC", Op::And => "AND", Op::Asl => "ASL", Op::Bcc => "BCC",
            Op::Bcs => "BCS", Op::Beq => "BEQ", Op::Bit => "BIT", Op::Bmi => "BMI",
            Op::Bne => "BNE", Op::Bpl => "BPL", Op::Brk => "BRK", Op::Bvc => "BVC",
            Op::Bvs => "BVS", Op::Clc => "CLC", Op::Cld => "CLD", Op::Cli => "CLI",
            Op::Clv => "CLV", Op::Cmp => "CMP", Op::Cpx => "CPX", Op::Cpy => "CPY",
            Op::Dec => "DEC", Op::Dex => "DEX", Op::Dey => "DEY", Op::Eor => "EOR",
            Op::Inc => "INC", Op::Inx => "INX", Op::Iny => "INY", Op::Jmp => "JMP",
            Op::Jsr => "JSR", Op::Lda => "LDA", Op::Ldx => "LDX", Op::Ldy => "LDY",
            Op::Lsr => "LSR", Op::Nop => "NOP", Op::Ora => "ORA", Op::Pha => "PHA",
            Op::Php => "PHP", Op::Pla => "PLA", Op::Plp => "PLP", Op::Rol => "ROL",
            Op::Ror => "ROR", Op::Rti => "RTI", Op::Rts => "RTS", Op::Sbc => "SBC",
            Op::Sec => "SEC", Op::Sed => "SED", Op::Sei => "SEI", Op::Sta => "STA",
            Op::Stx => "STX", Op::Sty => "STY", Op::Tax => "TAX", Op::Tay => "TAY",
            Op::Tsx => "TSX", Op::Txa => "TXA", Op::Txs => "TXS", Op::Tya => "TYA",
            Op::Alr => "ALR", Op::Anc => "ANC", Op::Ane => "ANE", Op::Arr => "ARR",
            Op::Axs => "AXS", Op::Dcp => "DCP", Op::Isc => "ISC", Op::Jam => "JAM",
            Op::Las => "LAS", Op::Lax => "LAX", Op::Lxa => "LXA", Op::Rla => "RLA",
            Op::Rra => "RRA", Op::Sax => "SAX", Op::Sha => "SHA", Op::Shx => "SHX",
            Op::Shy => "SHY", Op::Slo => "SLO", Op::Sre => "SRE", Op::Tas => "TAS",
        }
    }

    /// False for operations that only write (or only use) the effective address, so the
    /// CPU must not perform a read with side effects on it.
    pub fn reads_operand(self) -> bool {
        !matches!(
            self,
            Op::Sta
                | Op::Stx
                | Op::Sty
                | Op::Sax
                | Op::Sha
                | Op::Shx
                | Op::Shy
                | Op::Tas
                | Op::Jmp
                | Op::Jsr
        )
    }
}

/// Addressing mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Implied
    Imp,
    /// Accumulator
    Acc,
    /// #imm
    Imm,
    /// zp
    Zp,
    /// zp,X
    Zpx,
    /// zp,Y
    Zpy,
    /// abs
    Abs,
    /// abs,X
    Abx,
    /// abs,Y
    Aby,
    /// (abs), JMP only
    Ind,
    /// (zp,X)
    Izx,
    /// (zp),Y
    Izy,
    /// Branch offset
    Rel,
}

impl Mode {
    /// Operand bytes following the opcode.
    pub const fn len(self) -> u8 {
        match self {
            Mode::Imp | Mode::Acc => 0,
            Mode::Imm | Mode::Zp | Mode::Zpx | Mode::Zpy | Mode::Izx | Mode::Izy | Mode::Rel => 1,
            Mode::Abs | Mode::Abx | Mode::Aby | Mode::Ind => 2,
        }
    }

    /// True when the mode resolves to a memory address the operand lives at.
    pub const fn is_memory(self) -> bool {
        !matches!(self, Mode::Imp | Mode::Acc | Mode::Imm | Mode::Rel)
    }
}

/// One opcode table entry.
#[derive(Clone, Copy, Debug)]
pub struct Opcode {
    pub op: Op,
    pub mode: Mode,
    /// Base cycle cost before page-cross and branch penalties.
    pub cycles: u8,
    /// Store or read-modify-write: never pays the page-cross penalty.
    pub store: bool,
}

const fn r(op: Op, mode: Mode, cycles: u8) -> Opcode {
    Opcode { op, mode, cycles, store: false }
}

const fn w(op: Op, mode: Mode, cycles: u8) -> Opcode {
    Opcode { op, mode, cycles, store: true }
}

use Mode::*;
use Op::*;

#[rustfmt::skip]
pub static OPCODES: [Opcode; 256] = [
    /* 00 */ r(Brk, Imp, 7), r(Ora, Izx, 6), r(Jam, Imp, 2), w(Slo, Izx, 8),
    /* 04 */ r(Nop, Zp, 3), r(Ora, Zp, 3), w(Asl, Zp, 5), w(Slo, Zp, 5),
    /* 08 */ r(Php, Imp, 3), r(Ora, Imm, 2), r(Asl, Acc, 2), r(Anc, Imm, 2),
    /* 0C */ r(Nop, Abs, 4), r(Ora, Abs, 4), w(Asl, Abs, 6), w(Slo, Abs, 6),
    /* 10 */ r(Bpl, Rel, 2), r(Ora, Izy, 5), r(Jam, Imp, 2), w(Slo, Izy, 8),
    /* 14 */ r(Nop, Zpx, 4), r(Ora, Zpx, 4), w(Asl, Zpx, 6), w(Slo, Zpx, 6),
    /* 18 */ r(Clc, Imp, 2), r(Ora, Aby, 4), r(Nop, Imp, 2), w(Slo, Aby, 7),
    /* 1C */ r(Nop, Abx, 4), r(Ora, Abx, 4), w(Asl, Abx, 7), w(Slo, Abx, 7),
    /* 20 */ r(Jsr, Abs, 6), r(And, Izx, 6), r(Jam, Imp, 2), w(Rla, Izx, 8),
    /* 24 */ r(Bit, Zp, 3), r(And, Zp, 3), w(Rol, Zp, 5), w(Rla, Zp, 5),
    /* 28 */ r(Plp, Imp, 4), r(And, Imm, 2), r(Rol, Acc, 2), r(Anc, Imm, 2),
    /* 2C */ r(Bit, Abs, 4), r(And, Abs, 4), w(Rol, Abs, 6), w(Rla, Abs, 6),
    /* 30 */ r(Bmi, Rel, 2), r(And, Izy, 5), r(Jam, Imp, 2), w(Rla, Izy, 8),
    /* 34 */ r(Nop, Zpx, 4), r(And, Zpx, 4), w(Rol, Zpx, 6), w(Rla, Zpx, 6),
    /* 38 */ r(Sec, Imp, 2), r(And, Aby, 4), r(Nop, Imp, 2), w(Rla, Aby, 7),
    /* 3C */ r(Nop, Abx, 4), r(And, Abx, 4), w(Rol, Abx, 7), w(Rla, Abx, 7),
    /* 40 */ r(Rti, Imp, 6), r(Eor, Izx, 6), r(Jam, Imp, 2), w(Sre, Izx, 8),
    /* 44 */ r(Nop, Zp, 3), r(Eor, Zp, 3), w(Lsr, Zp, 5), w(Sre, Zp, 5),
    /* 48 */ r(Pha, Imp, 3), r(Eor, Imm, 2), r(Lsr, Acc, 2), r(Alr, Imm, 2),
    /* 4C */ r(Jmp, Abs, 3), r(Eor, Abs, 4), w(Lsr, Abs, 6), w(Sre, Abs, 6),
    /* 50 */ r(Bvc, Rel, 2), r(Eor, Izy, 5), r(Jam, Imp, 2), w(Sre, Izy, 8),
    /* 54 */ r(Nop, Zpx, 4), r(Eor, Zpx, 4), w(Lsr, Zpx, 6), w(Sre, Zpx, 6),
    /* 58 */ r(Cli, Imp, 2), r(Eor, Aby, 4), r(Nop, Imp, 2), w(Sre, Aby, 7),
    /* 5C */ r(Nop, Abx, 4), r(Eor, Abx, 4), w(Lsr, Abx, 7), w(Sre, Abx, 7),
    /* 60 */ r(Rts, Imp, 6), r(Adc, Izx, 6), r(Jam, Imp, 2), w(Rra, Izx, 8),
    /* 64 */ r(Nop, Zp, 3), r(Adc, Zp, 3), w(Ror, Zp, 5), w(Rra, Zp, 5),
    /* 68 */ r(Pla, Imp, 4), r(Adc, Imm, 2), r(Ror, Acc, 2), r(Arr, Imm, 2),
    /* 6C */ r(Jmp, Ind, 5), r(Adc, Abs, 4), w(Ror, Abs, 6), w(Rra, Abs, 6),
    /* 70 */ r(Bvs, Rel, 2), r(Adc, Izy, 5), r(Jam, Imp, 2), w(Rra, Izy, 8),
    /* 74 */ r(Nop, Zpx, 4), r(Adc, Zpx, 4), w(Ror, Zpx, 6), w(Rra, Zpx, 6),
    /* 78 */ r(Sei, Imp, 2), r(Adc, Aby, 4), r(Nop, Imp, 2), w(Rra, Aby, 7),
    /* 7C */ r(Nop, Abx, 4), r(Adc, Abx, 4), w(Ror, Abx, 7), w(Rra, Abx, 7),
    /* 80 */ r(Nop, Imm, 2), w(Sta, Izx, 6), r(Nop, Imm, 2), w(Sax, Izx, 6),
    /* 84 */ w(Sty, Zp, 3), w(Sta, Zp, 3), w(Stx, Zp, 3), w(Sax, Zp, 3),
    /* 88 */ r(Dey, Imp, 2), r(Nop, Imm, 2), r(Txa, Imp, 2), r(Ane, Imm, 2),
    /* 8C */ w(Sty, Abs, 4), w(Sta, Abs, 4), w(Stx, Abs, 4), w(Sax, Abs, 4),
    /* 90 */ r(Bcc, Rel, 2), w(Sta, Izy, 6), r(Jam, Imp, 2), w(Sha, Izy, 6),
    /* 94 */ w(Sty, Zpx, 4), w(Sta, Zpx, 4), w(Stx, Zpy, 4), w(Sax, Zpy, 4),
    /* 98 */ r(Tya, Imp, 2), w(Sta, Aby, 5), r(Txs, Imp, 2), w(Tas, Aby, 5),
    /* 9C */ w(Shy, Abx, 5), w(Sta, Abx, 5), w(Shx, Aby, 5), w(Sha, Aby, 5),
    /* A0 */ r(Ldy, Imm, 2), r(Lda, Izx, 6), r(Ldx, Imm, 2), r(Lax, Izx, 6),
    /* A4 */ r(Ldy, Zp, 3), r(Lda, Zp, 3), r(Ldx, Zp, 3), r(Lax, Zp, 3),
    /* A8 */ r(Tay, Imp, 2), r(Lda, Imm, 2), r(Tax, Imp, 2), r(Lxa, Imm, 2),
    /* AC */ r(Ldy, Abs, 4), r(Lda, Abs, 4), r(Ldx, Abs, 4), r(Lax, Abs, 4),
    /* B0 */ r(Bcs, Rel, 2), r(Lda, Izy, 5), r(Jam, Imp, 2), r(Lax, Izy, 5),
    /* B4 */ r(Ldy, Zpx, 4), r(Lda, Zpx, 4), r(Ldx, Zpy, 4), r(Lax, Zpy, 4),
    /* B8 */ r(Clv, Imp, 2), r(Lda, Aby, 4), r(Tsx, Imp, 2), r(Las, Aby, 4),
    /* BC */ r(Ldy, Abx, 4), r(Lda, Abx, 4), r(Ldx, Aby, 4), r(Lax, Aby, 4),
    /* C0 */ r(Cpy, Imm, 2), r(Cmp, Izx, 6), r(Nop, Imm, 2), w(Dcp, Izx, 8),
    /* C4 */ r(Cpy, Zp, 3), r(Cmp, Zp, 3), w(Dec, Zp, 5), w(Dcp, Zp, 5),
    /* C8 */ r(Iny, Imp, 2), r(Cmp, Imm, 2), r(Dex, Imp, 2), r(Axs, Imm, 2),
    /* CC */ r(Cpy, Abs, 4), r(Cmp, Abs, 4), w(Dec, Abs, 6), w(Dcp, Abs, 6),
    /* D0 */ r(Bne, Rel, 2), r(Cmp, Izy, 5), r(Jam, Imp, 2), w(Dcp, Izy, 8),
    /* D4 */ r(Nop, Zpx, 4), r(Cmp, Zpx, 4), w(Dec, Zpx, 6), w(Dcp, Zpx, 6),
    /* D8 */ r(Cld, Imp, 2), r(Cmp, Aby, 4), r(Nop, Imp, 2), w(Dcp, Aby, 7),
    /* DC */ r(Nop, Abx, 4), r(Cmp, Abx, 4), w(Dec, Abx, 7), w(Dcp, Abx, 7),
    /* E0 */ r(Cpx, Imm, 2), r(Sbc, Izx, 6), r(Nop, Imm, 2), w(Isc, Izx, 8),
    /* E4 */ r(Cpx, Zp, 3), r(Sbc, Zp, 3), w(Inc, Zp, 5), w(Isc, Zp, 5),
    /* E8 */ r(Inx, Imp, 2), r(Sbc, Imm, 2), r(Nop, Imp, 2), r(Sbc, Imm, 2),
    /* EC */ r(Cpx, Abs, 4), r(Sbc, Abs, 4), w(Inc, Abs, 6), w(Isc, Abs, 6),
    /* F0 */ r(Beq, Rel, 2), r(Sbc, Izy, 5), r(Jam, Imp, 2), w(Isc, Izy, 8),
    /* F4 */ r(Nop, Zpx, 4), r(Sbc, Zpx, 4), w(Inc, Zpx, 6), w(Isc, Zpx, 6),
    /* F8 */ r(Sed, Imp, 2), r(Sbc, Aby, 4), r(Nop, Imp, 2), w(Isc, Aby, 7),
    /* FC */ r(Nop, Abx, 4), r(Sbc, Abx, 4), w(Inc, Abx, 7), w(Isc, Abx, 7),
];
