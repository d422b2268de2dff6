//! # Stack Instructions
//!
//! PHA, PHP, PLA, PLP. PHP pushes the status byte with B and the unused bit
//! set, as the hardware does; PLP clears B again on the way back in.

use crate::cpu::{Emu6502, FLAG_B, FLAG_U};
use crate::memory::MemoryBus;

pub(crate) fn pha<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let a = emu.regs().a;
    emu.push(a);
}

pub(crate) fn php<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let status = emu.regs().status | FLAG_B | FLAG_U;
    emu.push(status);
}

pub(crate) fn pla<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let value = emu.pop();
    let regs = emu.regs_mut();
    regs.a = regs.set_nz(value);
}

pub(crate) fn plp<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let value = emu.pop();
    emu.regs_mut().status = (value | FLAG_U) & !FLAG_B;
}
