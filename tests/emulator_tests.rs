//! Integration tests for the interpreter: architectural effects of the
//! instruction groups the translator's tracing runs rely on.

use apple2tc::cpu::{Emu6502, StopReason, FLAG_C, FLAG_N, FLAG_V, FLAG_Z};
use apple2tc::memory::{FlatMemory, MemoryBus};

/// Loads `program` at `start` and positions the PC there.
fn setup(start: u16, program: &[u8]) -> Emu6502<FlatMemory> {
    let mut mem = FlatMemory::new();
    mem.load(start, program);
    let mut emu = Emu6502::new(mem);
    emu.regs_mut().pc = start;
    emu
}

fn step_n(emu: &mut Emu6502<FlatMemory>, n: usize) {
    for _ in 0..n {
        assert_eq!(emu.step(), None);
    }
}

#[test]
fn test_lda_sta_round_trip() {
    // LDA #$05 ; STA $00
    let mut emu = setup(0x6000, &[0xA9, 0x05, 0x85, 0x00]);
    step_n(&mut emu, 2);
    assert_eq!(emu.regs().a, 0x05);
    assert_eq!(emu.ram_peek(0x0000), 0x05);
    assert!(!emu.regs().flag(FLAG_Z));
    assert!(!emu.regs().flag(FLAG_N));
}

#[test]
fn test_lda_sets_zero_and_negative() {
    let mut emu = setup(0x6000, &[0xA9, 0x00, 0xA9, 0x80]);
    step_n(&mut emu, 1);
    assert!(emu.regs().flag(FLAG_Z));
    step_n(&mut emu, 1);
    assert!(emu.regs().flag(FLAG_N));
    assert!(!emu.regs().flag(FLAG_Z));
}

#[test]
fn test_adc_overflow_and_carry() {
    // CLC ; LDA #$50 ; ADC #$50 -> 0xA0, V set, C clear
    let mut emu = setup(0x6000, &[0x18, 0xA9, 0x50, 0x69, 0x50]);
    step_n(&mut emu, 3);
    let regs = emu.regs();
    assert_eq!(regs.a, 0xA0);
    assert!(regs.flag(FLAG_V));
    assert!(!regs.flag(FLAG_C));
    assert!(regs.flag(FLAG_N));
}

#[test]
fn test_adc_carry_out() {
    // CLC ; LDA #$FF ; ADC #$01 -> 0x00, C set, Z set
    let mut emu = setup(0x6000, &[0x18, 0xA9, 0xFF, 0x69, 0x01]);
    step_n(&mut emu, 3);
    let regs = emu.regs();
    assert_eq!(regs.a, 0x00);
    assert!(regs.flag(FLAG_C));
    assert!(regs.flag(FLAG_Z));
    assert!(!regs.flag(FLAG_V));
}

#[test]
fn test_sbc_borrow() {
    // SEC ; LDA #$03 ; SBC #$05 -> 0xFE, C clear (borrow)
    let mut emu = setup(0x6000, &[0x38, 0xA9, 0x03, 0xE9, 0x05]);
    step_n(&mut emu, 3);
    let regs = emu.regs();
    assert_eq!(regs.a, 0xFE);
    assert!(!regs.flag(FLAG_C));
    assert!(regs.flag(FLAG_N));
}

#[test]
fn test_cmp_sets_carry_on_greater_equal() {
    // LDA #$40 ; CMP #$40
    let mut emu = setup(0x6000, &[0xA9, 0x40, 0xC9, 0x40]);
    step_n(&mut emu, 2);
    assert!(emu.regs().flag(FLAG_C));
    assert!(emu.regs().flag(FLAG_Z));
}

#[test]
fn test_branch_taken_and_not_taken() {
    // LDA #$00 ; BEQ +2 ; (skipped) LDA #$01 ; target: LDA #$02
    let mut emu = setup(0x6000, &[0xA9, 0x00, 0xF0, 0x02, 0xA9, 0x01, 0xA9, 0x02]);
    step_n(&mut emu, 2);
    assert_eq!(emu.regs().pc, 0x6006);
    step_n(&mut emu, 1);
    assert_eq!(emu.regs().a, 0x02);

    // BNE is not taken with Z set: falls through.
    let mut emu = setup(0x6000, &[0xA9, 0x00, 0xD0, 0x02, 0xA9, 0x01]);
    step_n(&mut emu, 2);
    assert_eq!(emu.regs().pc, 0x6004);
}

#[test]
fn test_backward_branch() {
    // LDX #$02 ; loop: DEX ; BNE loop
    let mut emu = setup(0x6000, &[0xA2, 0x02, 0xCA, 0xD0, 0xFD]);
    step_n(&mut emu, 4); // LDX, DEX, BNE (taken), DEX
    assert_eq!(emu.regs().x, 0);
    step_n(&mut emu, 1); // BNE not taken
    assert_eq!(emu.regs().pc, 0x6005);
}

#[test]
fn test_jsr_rts() {
    // 6000: JSR $6010 ; 6003: LDA #$01
    // 6010: LDA #$42 ; RTS
    let mut emu = setup(0x6000, &[0x20, 0x10, 0x60]);
    emu.memory_mut().write(0x6010, 0xA9);
    emu.memory_mut().write(0x6011, 0x42);
    emu.memory_mut().write(0x6012, 0x60);

    step_n(&mut emu, 1);
    assert_eq!(emu.regs().pc, 0x6010);
    // Return address (JSR's last byte) sits on the stack.
    assert_eq!(emu.ram_peek16(0x01FC), 0x6002);

    step_n(&mut emu, 2);
    assert_eq!(emu.regs().a, 0x42);
    assert_eq!(emu.regs().pc, 0x6003);
    assert_eq!(emu.regs().sp, 0xFD);
}

#[test]
fn test_jmp_indirect_page_wrap_bug() {
    // JMP ($10FF): low byte from $10FF, high byte from $1000 (not $1100).
    let mut emu = setup(0x6000, &[0x6C, 0xFF, 0x10]);
    emu.memory_mut().write(0x10FF, 0x34);
    emu.memory_mut().write(0x1000, 0x12);
    emu.memory_mut().write(0x1100, 0x99);
    step_n(&mut emu, 1);
    assert_eq!(emu.regs().pc, 0x1234);
}

#[test]
fn test_zero_page_x_wraparound() {
    // LDX #$01 ; LDA $FF,X reads $00, not $100.
    let mut emu = setup(0x6000, &[0xA2, 0x01, 0xB5, 0xFF]);
    emu.memory_mut().write(0x0000, 0x7A);
    emu.memory_mut().write(0x0100, 0x11);
    step_n(&mut emu, 2);
    assert_eq!(emu.regs().a, 0x7A);
}

#[test]
fn test_indirect_y_store() {
    // Pointer at $40 -> $2000; LDY #$05 ; LDA #$AB ; STA ($40),Y
    let mut emu = setup(0x6000, &[0xA0, 0x05, 0xA9, 0xAB, 0x91, 0x40]);
    emu.memory_mut().write(0x0040, 0x00);
    emu.memory_mut().write(0x0041, 0x20);
    step_n(&mut emu, 3);
    assert_eq!(emu.ram_peek(0x2005), 0xAB);
}

#[test]
fn test_rmw_shift_in_memory() {
    // ASL $10 with $10 = 0x81 -> 0x02, carry set
    let mut emu = setup(0x6000, &[0x06, 0x10]);
    emu.memory_mut().write(0x0010, 0x81);
    step_n(&mut emu, 1);
    assert_eq!(emu.ram_peek(0x0010), 0x02);
    assert!(emu.regs().flag(FLAG_C));
}

#[test]
fn test_php_plp_round_trip() {
    // SEC ; PHP ; CLC ; PLP -> carry restored
    let mut emu = setup(0x6000, &[0x38, 0x08, 0x18, 0x28]);
    step_n(&mut emu, 4);
    assert!(emu.regs().flag(FLAG_C));
}

#[test]
fn test_brk_vectors_through_fffe() {
    let mut emu = setup(0x6000, &[0x00]);
    emu.memory_mut().write(0xFFFE, 0x00);
    emu.memory_mut().write(0xFFFF, 0x70);
    step_n(&mut emu, 1);
    assert_eq!(emu.regs().pc, 0x7000);
    // Return PC on the stack is BRK's address + 2.
    assert_eq!(emu.ram_peek16(0x01FC), 0x6002);
}

#[test]
fn test_invalid_opcode_stops() {
    let mut emu = setup(0x6000, &[0x02]);
    assert_eq!(emu.step(), Some(StopReason::InvalidOpcode));
}
