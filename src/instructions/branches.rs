//! # Branch Instructions
//!
//! The eight conditional branches. The decoder resolves relative operands to
//! the target PC, so taking a branch is a plain PC assignment; an untaken
//! branch falls through to the already-advanced PC.

use crate::cpu::{Emu6502, FLAG_C, FLAG_N, FLAG_V, FLAG_Z};
use crate::disassembler::Inst;
use crate::memory::MemoryBus;

fn branch_if<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst, taken: bool) {
    if taken {
        emu.regs_mut().pc = inst.operand;
    }
}

/// BCC: branch when carry clear.
pub(crate) fn bcc<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let taken = !emu.regs().flag(FLAG_C);
    branch_if(emu, inst, taken);
}

/// BCS: branch when carry set.
pub(crate) fn bcs<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let taken = emu.regs().flag(FLAG_C);
    branch_if(emu, inst, taken);
}

/// BEQ: branch when zero set.
pub(crate) fn beq<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let taken = emu.regs().flag(FLAG_Z);
    branch_if(emu, inst, taken);
}

/// BNE: branch when zero clear.
pub(crate) fn bne<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let taken = !emu.regs().flag(FLAG_Z);
    branch_if(emu, inst, taken);
}

/// BMI: branch when negative set.
pub(crate) fn bmi<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let taken = emu.regs().flag(FLAG_N);
    branch_if(emu, inst, taken);
}

/// BPL: branch when negative clear.
pub(crate) fn bpl<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let taken = !emu.regs().flag(FLAG_N);
    branch_if(emu, inst, taken);
}

/// BVC: branch when overflow clear.
pub(crate) fn bvc<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let taken = !emu.regs().flag(FLAG_V);
    branch_if(emu, inst, taken);
}

/// BVS: branch when overflow set.
pub(crate) fn bvs<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let taken = emu.regs().flag(FLAG_V);
    branch_if(emu, inst, taken);
}
