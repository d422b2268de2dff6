//! # Load and Store Instructions
//!
//! LDA/LDX/LDY set N and Z from the loaded value; the stores affect no
//! flags.

use crate::cpu::Emu6502;
use crate::disassembler::Inst;
use crate::memory::MemoryBus;

pub(crate) fn lda<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let value = emu.read_operand(inst);
    let regs = emu.regs_mut();
    regs.a = regs.set_nz(value);
}

pub(crate) fn ldx<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let value = emu.read_operand(inst);
    let regs = emu.regs_mut();
    regs.x = regs.set_nz(value);
}

pub(crate) fn ldy<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let value = emu.read_operand(inst);
    let regs = emu.regs_mut();
    regs.y = regs.set_nz(value);
}

pub(crate) fn sta<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let value = emu.regs().a;
    emu.write_operand(inst, value);
}

pub(crate) fn stx<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let value = emu.regs().x;
    emu.write_operand(inst, value);
}

pub(crate) fn sty<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let value = emu.regs().y;
    emu.write_operand(inst, value);
}
