//! # Arithmetic and Logic Instructions
//!
//! ADC, SBC, AND, ORA, EOR, the compare family and BIT.
//!
//! Arithmetic is binary-mode only: the decimal flag is tracked but does not
//! change results, because BCD fidelity is out of scope for the translator.

use crate::cpu::{Emu6502, FLAG_C, FLAG_N, FLAG_V, FLAG_Z};
use crate::disassembler::Inst;
use crate::memory::MemoryBus;

/// ADC: A = A + M + C, setting N, V, Z and C.
///
/// Overflow is set when the operands share a sign and the result does not.
pub(crate) fn adc<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let m = emu.read_operand(inst);
    add_with_carry(emu, m);
}

/// SBC: A = A - M - (1 - C), implemented as ADC of the complement.
pub(crate) fn sbc<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let m = emu.read_operand(inst);
    add_with_carry(emu, !m);
}

fn add_with_carry<M: MemoryBus>(emu: &mut Emu6502<M>, m: u8) {
    let regs = emu.regs_mut();
    let a = regs.a;
    let carry_in = regs.flag(FLAG_C) as u16;
    let sum = a as u16 + m as u16 + carry_in;
    let result = sum as u8;

    regs.set_flag(FLAG_C, sum > 0xFF);
    regs.set_flag(FLAG_V, (a ^ result) & (m ^ result) & 0x80 != 0);
    regs.a = regs.set_nz(result);
}

/// AND: A = A & M.
pub(crate) fn and<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let m = emu.read_operand(inst);
    let regs = emu.regs_mut();
    regs.a = regs.set_nz(regs.a & m);
}

/// ORA: A = A | M.
pub(crate) fn ora<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let m = emu.read_operand(inst);
    let regs = emu.regs_mut();
    regs.a = regs.set_nz(regs.a | m);
}

/// EOR: A = A ^ M.
pub(crate) fn eor<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let m = emu.read_operand(inst);
    let regs = emu.regs_mut();
    regs.a = regs.set_nz(regs.a ^ m);
}

/// CMP: compare A with M (C = A >= M, N/Z from A - M).
pub(crate) fn cmp<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let m = emu.read_operand(inst);
    let a = emu.regs().a;
    compare(emu, a, m);
}

/// CPX: compare X with M.
pub(crate) fn cpx<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let m = emu.read_operand(inst);
    let x = emu.regs().x;
    compare(emu, x, m);
}

/// CPY: compare Y with M.
pub(crate) fn cpy<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let m = emu.read_operand(inst);
    let y = emu.regs().y;
    compare(emu, y, m);
}

fn compare<M: MemoryBus>(emu: &mut Emu6502<M>, reg: u8, m: u8) {
    let regs = emu.regs_mut();
    regs.set_flag(FLAG_C, reg >= m);
    regs.set_nz(reg.wrapping_sub(m));
}

/// BIT: Z from A & M, N and V copied from bits 7 and 6 of M.
pub(crate) fn bit<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let m = emu.read_operand(inst);
    let regs = emu.regs_mut();
    regs.set_flag(FLAG_Z, regs.a & m == 0);
    regs.set_flag(FLAG_N, m & 0x80 != 0);
    regs.set_flag(FLAG_V, m & 0x40 != 0);
}
