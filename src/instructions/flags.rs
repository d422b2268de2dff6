//! # Status Flag Instructions
//!
//! CLC, SEC, CLI, SEI, CLD, SED, CLV. SED only sets the flag; arithmetic
//! stays binary (see the crate non-goals).

use crate::cpu::{Emu6502, FLAG_C, FLAG_D, FLAG_I, FLAG_V};
use crate::memory::MemoryBus;

pub(crate) fn clc<M: MemoryBus>(emu: &mut Emu6502<M>) {
    emu.regs_mut().set_flag(FLAG_C, false);
}

pub(crate) fn sec<M: MemoryBus>(emu: &mut Emu6502<M>) {
    emu.regs_mut().set_flag(FLAG_C, true);
}

pub(crate) fn cli<M: MemoryBus>(emu: &mut Emu6502<M>) {
    emu.regs_mut().set_flag(FLAG_I, false);
}

pub(crate) fn sei<M: MemoryBus>(emu: &mut Emu6502<M>) {
    emu.regs_mut().set_flag(FLAG_I, true);
}

pub(crate) fn cld<M: MemoryBus>(emu: &mut Emu6502<M>) {
    emu.regs_mut().set_flag(FLAG_D, false);
}

pub(crate) fn sed<M: MemoryBus>(emu: &mut Emu6502<M>) {
    emu.regs_mut().set_flag(FLAG_D, true);
}

pub(crate) fn clv<M: MemoryBus>(emu: &mut Emu6502<M>) {
    emu.regs_mut().set_flag(FLAG_V, false);
}
