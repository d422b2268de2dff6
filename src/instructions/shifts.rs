//! # Shift and Rotate Instructions
//!
//! ASL, LSR, ROL, ROR. All four work on the accumulator or read-modify-write
//! memory depending on the addressing mode, shift through the carry flag,
//! and set N and Z from the result.

use crate::cpu::{Emu6502, FLAG_C};
use crate::disassembler::Inst;
use crate::memory::MemoryBus;

/// ASL: shift left, bit 7 into carry.
pub(crate) fn asl<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let value = emu.read_operand(inst);
    let result = value << 1;
    let regs = emu.regs_mut();
    regs.set_flag(FLAG_C, value & 0x80 != 0);
    regs.set_nz(result);
    emu.write_operand(inst, result);
}

/// LSR: shift right, bit 0 into carry.
pub(crate) fn lsr<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let value = emu.read_operand(inst);
    let result = value >> 1;
    let regs = emu.regs_mut();
    regs.set_flag(FLAG_C, value & 0x01 != 0);
    regs.set_nz(result);
    emu.write_operand(inst, result);
}

/// ROL: rotate left through carry.
pub(crate) fn rol<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let value = emu.read_operand(inst);
    let carry_in = emu.regs().flag(FLAG_C) as u8;
    let result = (value << 1) | carry_in;
    let regs = emu.regs_mut();
    regs.set_flag(FLAG_C, value & 0x80 != 0);
    regs.set_nz(result);
    emu.write_operand(inst, result);
}

/// ROR: rotate right through carry.
pub(crate) fn ror<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let value = emu.read_operand(inst);
    let carry_in = (emu.regs().flag(FLAG_C) as u8) << 7;
    let result = (value >> 1) | carry_in;
    let regs = emu.regs_mut();
    regs.set_flag(FLAG_C, value & 0x01 != 0);
    regs.set_nz(result);
    emu.write_operand(inst, result);
}
