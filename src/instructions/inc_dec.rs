//! # Increment and Decrement Instructions
//!
//! INC/DEC read-modify-write memory; INX/INY/DEX/DEY touch the index
//! registers. All of them set N and Z from the result.

use crate::cpu::Emu6502;
use crate::disassembler::Inst;
use crate::memory::MemoryBus;

/// INC: M = M + 1.
pub(crate) fn inc<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let value = emu.read_operand(inst).wrapping_add(1);
    emu.regs_mut().set_nz(value);
    emu.write_operand(inst, value);
}

/// DEC: M = M - 1.
pub(crate) fn dec<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let value = emu.read_operand(inst).wrapping_sub(1);
    emu.regs_mut().set_nz(value);
    emu.write_operand(inst, value);
}

pub(crate) fn inx<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let regs = emu.regs_mut();
    regs.x = regs.set_nz(regs.x.wrapping_add(1));
}

pub(crate) fn iny<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let regs = emu.regs_mut();
    regs.y = regs.set_nz(regs.y.wrapping_add(1));
}

pub(crate) fn dex<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let regs = emu.regs_mut();
    regs.x = regs.set_nz(regs.x.wrapping_sub(1));
}

pub(crate) fn dey<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let regs = emu.regs_mut();
    regs.y = regs.set_nz(regs.y.wrapping_sub(1));
}
