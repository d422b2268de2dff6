//! # Register Transfer Instructions
//!
//! TAX, TAY, TXA, TYA, TSX, TXS. All set N and Z from the transferred value
//! except TXS, which affects no flags.

use crate::cpu::Emu6502;
use crate::memory::MemoryBus;

pub(crate) fn tax<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let regs = emu.regs_mut();
    regs.x = regs.set_nz(regs.a);
}

pub(crate) fn tay<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let regs = emu.regs_mut();
    regs.y = regs.set_nz(regs.a);
}

pub(crate) fn txa<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let regs = emu.regs_mut();
    regs.a = regs.set_nz(regs.x);
}

pub(crate) fn tya<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let regs = emu.regs_mut();
    regs.a = regs.set_nz(regs.y);
}

pub(crate) fn tsx<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let regs = emu.regs_mut();
    regs.x = regs.set_nz(regs.sp);
}

pub(crate) fn txs<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let regs = emu.regs_mut();
    regs.sp = regs.x;
}
