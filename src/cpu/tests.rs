use crate::{
    bus::Bus,
    cpu::{
        cpu::CPU,
        flags::{BREAK, CARRY, INTERRUPT_DISABLE, NEGATIVE, OVERFLOW, UNUSED, ZERO},
        opcodes::{Mode, OPCODES, Op},
    },
};

struct TestBus {
    mem: [u8; 65536],
}

impl TestBus {
    fn new() -> Self {
        Self { mem: [0; 65536] }
    }
}

impl Bus for TestBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.mem[addr as usize] = data;
    }
}

fn new_cpu(bus: TestBus) -> CPU<TestBus> {
    let mut cpu = CPU::new(bus);
    cpu.reset();
    cpu
}

/// CPU with `program` at $8000 and the reset vector pointing at it.
fn cpu_with(program: &[u8]) -> CPU<TestBus> {
    let mut bus = TestBus::new();
    bus.mem[0x8000..0x8000 + program.len()].copy_from_slice(program);
    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;
    new_cpu(bus)
}

#[test]
fn reset_loads_vector_and_power_on_state() {
    let cpu = cpu_with(&[]);
    assert_eq!(cpu.pc, 0x8000);
    assert_eq!(cpu.sp, 0xFD);
    assert_eq!(cpu.status, INTERRUPT_DISABLE | UNUSED);
    assert_eq!(cpu.cycles, 7);
}

#[test]
fn lda_immediate_loads_value() {
    let mut cpu = cpu_with(&[0xA9, 0x42]); // LDA #$42
    assert_eq!(cpu.step(), 2);
    assert_eq!(cpu.a, 0x42);
}

#[test]
fn lda_sets_zero_flag() {
    let mut cpu = cpu_with(&[0xA9, 0x00]);
    cpu.step();
    assert!(cpu.status & ZERO != 0);
}

#[test]
fn lda_sets_negative_flag() {
    let mut cpu = cpu_with(&[0xA9, 0x80]);
    cpu.step();
    assert!(cpu.status & NEGATIVE != 0)
}

#[test]
fn tax_transfers_a_to_x() {
    let mut cpu = cpu_with(&[
        0xA9, 0x10, // LDA #$10
        0xAA, // TAX
    ]);
    cpu.step();
    cpu.step();
    assert_eq!(cpu.x, 0x10)
}

#[test]
fn sta_writes_to_memory() {
    let mut cpu = cpu_with(&[
        0xA9, 0x33, // LDA #$33
        0x8D, 0x00, 0x02, // STA $0200
    ]);
    cpu.step();
    assert_eq!(cpu.step(), 4);
    assert_eq!(cpu.bus.mem[0x0200], 0x33);
}

#[test]
fn jmp_changes_program_counter() {
    let mut bus = TestBus::new();

    bus.mem[0x8000] = 0x4C; // JMP $9000
    bus.mem[0x8001] = 0x00;
    bus.mem[0x8002] = 0x90;

    bus.mem[0x9000] = 0xA9; // LDA #$55
    bus.mem[0x9001] = 0x55;

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);

    cpu.step(); // JMP
    cpu.step(); // LDA

    assert_eq!(cpu.a, 0x55);
}

#[test]
fn jmp_indirect_does_not_carry_into_next_page() {
    let mut cpu = cpu_with(&[0x6C, 0xFF, 0x10]); // JMP ($10FF)
    cpu.bus.mem[0x10FF] = 0x34;
    cpu.bus.mem[0x1000] = 0x12;
    cpu.bus.mem[0x1100] = 0x56;
    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn inx_increments_x() {
    let mut cpu = cpu_with(&[
        0xA2, 0x01, // LDX #$01
        0xE8, // INX
    ]);
    cpu.step();
    cpu.step();
    assert_eq!(cpu.x, 0x02);
}

#[test]
fn dex_sets_zero_flag() {
    let mut cpu = cpu_with(&[
        0xA2, 0x01, // LDX #$01
        0xCA, // DEX
    ]);
    cpu.step();
    cpu.step();
    assert!(cpu.status & ZERO != 0);
}

#[test]
fn bne_loops_until_zero() {
    let mut cpu = cpu_with(&[
        0xA2, 0x03, // LDX #3
        0xCA, // DEX
        0xD0, 0xFD, // BNE -3
    ]);
    for _ in 0..7 {
        cpu.step();
    }
    assert_eq!(cpu.x, 0x00);
    assert_eq!(cpu.pc, 0x8005);
}

#[test]
fn branch_costs_depend_on_outcome_and_page() {
    // Not taken.
    let mut cpu = cpu_with(&[0xF0, 0x10]); // BEQ +16
    cpu.status &= !ZERO;
    assert_eq!(cpu.step(), 2);

    // Taken, same page.
    let mut cpu = cpu_with(&[0xD0, 0x10]); // BNE +16
    cpu.status &= !ZERO;
    assert_eq!(cpu.step(), 3);
    assert_eq!(cpu.pc, 0x8012);

    // Taken, into the previous page.
    let mut cpu = cpu_with(&[0xD0, 0xF0]); // BNE -16
    cpu.status &= !ZERO;
    assert_eq!(cpu.step(), 4);
    assert_eq!(cpu.pc, 0x7FF2);
}

#[test]
fn jsr_and_rts_work() {
    let mut bus = TestBus::new();

    // main program
    bus.mem[0x8000] = 0x20; // JSR $9000
    bus.mem[0x8001] = 0x00;
    bus.mem[0x8002] = 0x90;
    bus.mem[0x8003] = 0xA9; // LDA #$11
    bus.mem[0x8004] = 0x11;

    // subroutine
    bus.mem[0x9000] = 0xA9; // LDA #$22
    bus.mem[0x9001] = 0x22;
    bus.mem[0x9002] = 0x60; // RTS

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);

    assert_eq!(cpu.step(), 6); // JSR
    assert_eq!(cpu.bus.mem[0x01FD], 0x80);
    assert_eq!(cpu.bus.mem[0x01FC], 0x02);
    cpu.step(); // LDA #$22
    cpu.step(); // RTS
    cpu.step(); // LDA #$11

    assert_eq!(cpu.a, 0x11);
}

#[test]
fn brk_pushes_break_flag_and_rti_discards_it() {
    let mut bus = TestBus::new();

    bus.mem[0x8000] = 0x38; // SEC
    bus.mem[0x8001] = 0x00; // BRK
    bus.mem[0x9000] = 0x40; // RTI

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;
    bus.mem[0xFFFE] = 0x00;
    bus.mem[0xFFFF] = 0x90;

    let mut cpu = new_cpu(bus);
    cpu.status &= !INTERRUPT_DISABLE;
    cpu.step();
    assert_eq!(cpu.step(), 7);

    assert_eq!(cpu.pc, 0x9000);
    assert!(cpu.status & INTERRUPT_DISABLE != 0);
    assert_eq!(cpu.bus.mem[0x01FD], 0x80);
    assert_eq!(cpu.bus.mem[0x01FC], 0x03);
    assert_eq!(cpu.bus.mem[0x01FB], CARRY | UNUSED | BREAK);

    assert_eq!(cpu.step(), 6);
    assert_eq!(cpu.pc, 0x8003);
    assert_eq!(cpu.status, CARRY | UNUSED);
}

#[test]
fn php_sets_break_and_plp_ignores_it() {
    let mut cpu = cpu_with(&[
        0x08, // PHP
        0xA9, 0xFF, // LDA #$FF
        0x48, // PHA
        0x28, // PLP
    ]);
    cpu.step();
    assert_eq!(cpu.bus.mem[0x01FD], INTERRUPT_DISABLE | UNUSED | BREAK);
    cpu.step();
    cpu.step();
    cpu.step();
    assert_eq!(cpu.status, 0xFF & !BREAK);
}

#[test]
fn nmi_pushes_state_without_break_flag() {
    let mut cpu = cpu_with(&[]);
    cpu.bus.mem[0xFFFA] = 0x00;
    cpu.bus.mem[0xFFFB] = 0xC0;
    cpu.status = CARRY | UNUSED;
    let before = cpu.cycles;

    cpu.nmi();

    assert_eq!(cpu.pc, 0xC000);
    assert_eq!(cpu.cycles - before, 7);
    assert_eq!(cpu.bus.mem[0x01FB], CARRY | UNUSED);
    assert!(cpu.interrupts_disabled());
}

#[test]
fn zero_page_indexing_wraps() {
    let mut cpu = cpu_with(&[
        0xA2, 0x02, // LDX #$02
        0xB5, 0xFF, // LDA $FF,X
    ]);
    cpu.bus.mem[0x0001] = 0x77;
    cpu.bus.mem[0x0101] = 0x11;
    cpu.step();
    cpu.step();
    assert_eq!(cpu.a, 0x77);
}

#[test]
fn indirect_pointers_wrap_in_zero_page() {
    let mut cpu = cpu_with(&[
        0xB1, 0xFF, // LDA ($FF),Y
        0xA2, 0x01, // LDX #$01
        0xA1, 0xFE, // LDA ($FE,X)
    ]);
    cpu.bus.mem[0x00FF] = 0x00;
    cpu.bus.mem[0x0000] = 0x03;
    cpu.bus.mem[0x0100] = 0x04;
    cpu.bus.mem[0x0300] = 0x5A;
    cpu.bus.mem[0x0400] = 0xA5;

    cpu.step();
    assert_eq!(cpu.a, 0x5A);
    cpu.step();
    cpu.step();
    assert_eq!(cpu.a, 0x5A);
}

#[test]
fn page_cross_penalty_applies_to_reads_only() {
    for (code, entry) in OPCODES.iter().enumerate() {
        if !matches!(entry.mode, Mode::Abx | Mode::Aby | Mode::Izy) {
            continue;
        }
        for (base, crossed) in [(0x1000u16, false), (0x10FF, true)] {
            let args = match entry.mode {
                Mode::Izy => vec![0x10],
                _ => base.to_le_bytes().to_vec(),
            };
            let mut program = vec![code as u8];
            program.extend(args);
            let mut cpu = cpu_with(&program);
            cpu.bus.mem[0x10] = base as u8;
            cpu.bus.mem[0x11] = (base >> 8) as u8;
            cpu.x = 1;
            cpu.y = 1;

            let expected = entry.cycles as u64 + u64::from(crossed && !entry.store);
            assert_eq!(cpu.step(), expected, "opcode ${:02X} crossed={}", code, crossed);
        }
    }
}

#[test]
fn adc_matches_reference_for_every_input() {
    let mut cpu = cpu_with(&[0x69, 0x00]); // ADC #imm
    for a in 0..=255u8 {
        for m in 0..=255u8 {
            for carry in [0u8, 1] {
                cpu.pc = 0x8000;
                cpu.bus.mem[0x8001] = m;
                cpu.a = a;
                cpu.status = UNUSED | carry;
                cpu.step();

                let sum = a as u16 + m as u16 + carry as u16;
                let signed = a as i8 as i16 + m as i8 as i16 + carry as i16;
                assert_eq!(cpu.a, sum as u8);
                assert_eq!(cpu.status & CARRY != 0, sum > 0xFF);
                assert_eq!(cpu.status & OVERFLOW != 0, !(-128..=127).contains(&signed));
                assert_eq!(cpu.status & ZERO != 0, sum as u8 == 0);
                assert_eq!(cpu.status & NEGATIVE != 0, sum & 0x80 != 0);
            }
        }
    }
}

#[test]
fn sbc_matches_reference_for_every_input() {
    let mut cpu = cpu_with(&[0xE9, 0x00]); // SBC #imm
    for a in 0..=255u8 {
        for m in 0..=255u8 {
            for carry in [0u8, 1] {
                cpu.pc = 0x8000;
                cpu.bus.mem[0x8001] = m;
                cpu.a = a;
                cpu.status = UNUSED | carry;
                cpu.step();

                let borrow = 1 - carry as i16;
                let diff = a as i16 - m as i16 - borrow;
                let signed = a as i8 as i16 - m as i8 as i16 - borrow;
                assert_eq!(cpu.a, diff as u8);
                assert_eq!(cpu.status & CARRY != 0, diff >= 0);
                assert_eq!(cpu.status & OVERFLOW != 0, !(-128..=127).contains(&signed));
            }
        }
    }
}

#[test]
fn compare_sets_carry_zero_and_negative() {
    let mut cpu = cpu_with(&[
        0xA9, 0x40, // LDA #$40
        0xC9, 0x40, // CMP #$40
        0xC9, 0x41, // CMP #$41
    ]);
    cpu.step();
    cpu.step();
    assert_eq!(cpu.status & (CARRY | ZERO | NEGATIVE), CARRY | ZERO);
    cpu.step();
    assert_eq!(cpu.status & (CARRY | ZERO | NEGATIVE), NEGATIVE);
}

#[test]
fn asl_accumulator_and_memory() {
    let mut cpu = cpu_with(&[
        0xA9, 0x81, // LDA #$81
        0x0A, // ASL A
        0x06, 0x10, // ASL $10
    ]);
    cpu.bus.mem[0x10] = 0x40;
    cpu.step();
    cpu.step();
    assert_eq!(cpu.a, 0x02);
    assert!(cpu.status & CARRY != 0);
    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.bus.mem[0x10], 0x80);
    assert!(cpu.status & NEGATIVE != 0);
    assert!(cpu.status & CARRY == 0);
}

#[test]
fn lax_and_sax() {
    let mut cpu = cpu_with(&[
        0xA7, 0x10, // LAX $10
        0xA9, 0xF0, // LDA #$F0
        0xA2, 0x3C, // LDX #$3C
        0x87, 0x11, // SAX $11
    ]);
    cpu.bus.mem[0x10] = 0x99;
    cpu.step();
    assert_eq!((cpu.a, cpu.x), (0x99, 0x99));
    assert!(cpu.status & NEGATIVE != 0);
    cpu.step();
    cpu.step();
    cpu.step();
    assert_eq!(cpu.bus.mem[0x11], 0x30);
}

#[test]
fn dcp_decrements_then_compares() {
    let mut cpu = cpu_with(&[
        0xA9, 0x42, // LDA #$42
        0xC7, 0x10, // DCP $10
    ]);
    cpu.bus.mem[0x10] = 0x43;
    cpu.step();
    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.bus.mem[0x10], 0x42);
    assert_eq!(cpu.status & (CARRY | ZERO), CARRY | ZERO);
}

#[test]
fn isc_increments_then_subtracts() {
    let mut cpu = cpu_with(&[
        0xA9, 0x20, // LDA #$20
        0x38, // SEC
        0xE7, 0x10, // ISC $10
    ]);
    cpu.bus.mem[0x10] = 0x0F;
    for _ in 0..3 {
        cpu.step();
    }
    assert_eq!(cpu.bus.mem[0x10], 0x10);
    assert_eq!(cpu.a, 0x10);
    assert!(cpu.status & CARRY != 0);
}

#[test]
fn slo_shifts_then_ors() {
    let mut cpu = cpu_with(&[
        0xA9, 0x01, // LDA #$01
        0x07, 0x10, // SLO $10
    ]);
    cpu.bus.mem[0x10] = 0x81;
    cpu.step();
    cpu.step();
    assert_eq!(cpu.bus.mem[0x10], 0x02);
    assert_eq!(cpu.a, 0x03);
    assert!(cpu.status & CARRY != 0);
}

#[test]
fn rla_rotates_left_then_ands() {
    let mut cpu = cpu_with(&[
        0x38, // SEC
        0xA9, 0x0F, // LDA #$0F
        0x27, 0x10, // RLA $10
    ]);
    cpu.bus.mem[0x10] = 0x81;
    for _ in 0..3 {
        cpu.step();
    }
    assert_eq!(cpu.bus.mem[0x10], 0x03);
    assert_eq!(cpu.a, 0x03);
    assert_eq!(cpu.status & (CARRY | ZERO | NEGATIVE), CARRY);
}

#[test]
fn sre_shifts_right_then_eors() {
    let mut cpu = cpu_with(&[
        0xA9, 0xF0, // LDA #$F0
        0x47, 0x10, // SRE $10
    ]);
    cpu.bus.mem[0x10] = 0x81;
    cpu.step();
    cpu.step();
    assert_eq!(cpu.bus.mem[0x10], 0x40);
    assert_eq!(cpu.a, 0xB0);
    assert_eq!(cpu.status & (CARRY | ZERO | NEGATIVE), CARRY | NEGATIVE);
}

#[test]
fn rra_rotates_right_then_adds_with_the_rotated_carry() {
    let mut cpu = cpu_with(&[
        0xA9, 0x10, // LDA #$10
        0x38, // SEC
        0x67, 0x10, // RRA $10
    ]);
    cpu.bus.mem[0x10] = 0x03;
    for _ in 0..3 {
        cpu.step();
    }
    // ROR gives $81 with C set, then $10 + $81 + 1.
    assert_eq!(cpu.bus.mem[0x10], 0x81);
    assert_eq!(cpu.a, 0x92);
    assert_eq!(cpu.status & (CARRY | OVERFLOW | NEGATIVE), NEGATIVE);
}

#[test]
fn alr_ands_then_shifts_right() {
    let mut cpu = cpu_with(&[
        0xA9, 0xFF, // LDA #$FF
        0x4B, 0x03, // ALR #$03
    ]);
    cpu.step();
    cpu.step();
    assert_eq!(cpu.a, 0x01);
    assert_eq!(cpu.status & (CARRY | ZERO | NEGATIVE), CARRY);
}

#[test]
fn ane_ors_magic_constant_then_ands_x_and_operand() {
    let mut cpu = cpu_with(&[
        0xA9, 0x00, // LDA #$00
        0xA2, 0xFF, // LDX #$FF
        0x8B, 0x5A, // ANE #$5A
    ]);
    for _ in 0..3 {
        cpu.step();
    }
    assert_eq!(cpu.a, 0x4A);
    assert_eq!(cpu.status & (ZERO | NEGATIVE), 0);
}

#[test]
fn sha_stores_a_and_x_masked_with_high_byte() {
    let mut cpu = cpu_with(&[
        0xA9, 0xFF, // LDA #$FF
        0xA2, 0xF3, // LDX #$F3
        0xA0, 0x00, // LDY #$00
        0x9F, 0x00, 0x12, // SHA $1200,Y
    ]);
    for _ in 0..3 {
        cpu.step();
    }
    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.bus.mem[0x1200], 0x13);
}

#[test]
fn shy_stores_y_masked_with_high_byte() {
    let mut cpu = cpu_with(&[
        0xA0, 0xFF, // LDY #$FF
        0xA2, 0x00, // LDX #$00
        0x9C, 0x00, 0x12, // SHY $1200,X
    ]);
    cpu.step();
    cpu.step();
    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.bus.mem[0x1200], 0x13);
}

#[test]
fn tas_sets_stack_pointer_then_stores_it_masked() {
    let mut cpu = cpu_with(&[
        0xA9, 0xFF, // LDA #$FF
        0xA2, 0x37, // LDX #$37
        0xA0, 0x00, // LDY #$00
        0x9B, 0x00, 0x03, // TAS $0300,Y
    ]);
    cpu.bus.mem[0x0300] = 0xAA;
    for _ in 0..4 {
        cpu.step();
    }
    assert_eq!(cpu.sp, 0x37);
    assert_eq!(cpu.bus.mem[0x0300], 0x04);
}

#[test]
fn anc_copies_negative_into_carry() {
    let mut cpu = cpu_with(&[
        0xA9, 0xFF, // LDA #$FF
        0x0B, 0x80, // ANC #$80
    ]);
    cpu.step();
    cpu.step();
    assert_eq!(cpu.a, 0x80);
    assert_eq!(cpu.status & (CARRY | NEGATIVE), CARRY | NEGATIVE);
}

#[test]
fn arr_rotates_and_sets_carry_and_overflow_from_bits_6_and_5() {
    let mut cpu = cpu_with(&[
        0xA9, 0xFF, // LDA #$FF
        0x38, // SEC
        0x6B, 0xC0, // ARR #$C0
        0x18, // CLC
        0x6B, 0x80, // ARR #$80
    ]);
    cpu.step();
    cpu.step();
    cpu.step();
    assert_eq!(cpu.a, 0xE0);
    assert_eq!(cpu.status & (CARRY | OVERFLOW | NEGATIVE), CARRY | NEGATIVE);
    cpu.step();
    cpu.step();
    // $E0 & $80 = $80, rotated with C clear = $40: bit 6 set, bit 5 clear.
    assert_eq!(cpu.a, 0x40);
    assert_eq!(cpu.status & (CARRY | OVERFLOW | NEGATIVE), CARRY | OVERFLOW);
}

#[test]
fn axs_subtracts_from_a_and_x() {
    let mut cpu = cpu_with(&[
        0xA9, 0x0F, // LDA #$0F
        0xA2, 0xF3, // LDX #$F3
        0xCB, 0x01, // AXS #$01
        0xCB, 0x05, // AXS #$05
    ]);
    cpu.step();
    cpu.step();
    cpu.step();
    assert_eq!(cpu.x, 0x02);
    assert!(cpu.status & CARRY != 0);
    cpu.step();
    // A & X = $02 now.
    assert_eq!(cpu.x, 0xFD);
    assert!(cpu.status & CARRY == 0);
}

#[test]
fn lxa_loads_a_and_x() {
    let mut cpu = cpu_with(&[0xAB, 0x5A]); // LXA #$5A
    cpu.step();
    assert_eq!((cpu.a, cpu.x), (0x5A, 0x5A));
}

#[test]
fn shx_masks_with_high_byte_and_corrupts_target_on_page_cross() {
    let mut cpu = cpu_with(&[
        0xA2, 0x03, // LDX #$03
        0xA0, 0x00, // LDY #$00
        0x9E, 0x00, 0x12, // SHX $1200,Y
        0xA0, 0x01, // LDY #$01
        0x9E, 0xFF, 0x12, // SHX $12FF,Y
    ]);
    for _ in 0..3 {
        cpu.step();
    }
    assert_eq!(cpu.bus.mem[0x1200], 0x03);
    cpu.step();
    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.bus.mem[0x0300], 0x03);
    assert_eq!(cpu.bus.mem[0x1300], 0x00);
}

#[test]
fn las_loads_memory_and_stack_pointer() {
    let mut cpu = cpu_with(&[0xBB, 0x00, 0x02]); // LAS $0200,Y
    cpu.bus.mem[0x0200] = 0x3F;
    cpu.step();
    assert_eq!((cpu.a, cpu.x, cpu.sp), (0x3D, 0x3D, 0x3D));
}

#[test]
fn jam_opcodes_are_two_cycle_no_ops() {
    let mut cpu = cpu_with(&[0x02, 0xA9, 0x07]); // JAM; LDA #$07
    assert_eq!(OPCODES[0x02].op, Op::Jam);
    assert_eq!(cpu.step(), 2);
    assert_eq!(cpu.pc, 0x8001);
    cpu.step();
    assert_eq!(cpu.a, 0x07);
}
