//! # Control Flow Instructions
//!
//! JMP, JSR, RTS, RTI, BRK. NOP is handled inline by the dispatcher.
//!
//! JSR pushes the address of its own last byte; RTS pops it and adds one.
//! BRK pushes PC+2 and the status byte with B set, then vectors through
//! $FFFE/$FFFF.

use crate::addressing::AddressingMode;
use crate::cpu::{Emu6502, FLAG_B, FLAG_I, FLAG_U};
use crate::disassembler::Inst;
use crate::memory::MemoryBus;

/// JMP: absolute or indirect jump.
///
/// The indirect form reproduces the NMOS page-wrap bug: a pointer at $xxFF
/// reads its high byte from $xx00 instead of crossing the page.
pub(crate) fn jmp<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst) {
    let target = match inst.mode {
        AddressingMode::Absolute => inst.operand,
        AddressingMode::Indirect => {
            let ptr = inst.operand;
            let lo = emu.ram_peek(ptr) as u16;
            let hi_addr = if ptr & 0xFF == 0xFF {
                ptr & 0xFF00
            } else {
                ptr.wrapping_add(1)
            };
            let hi = emu.ram_peek(hi_addr) as u16;
            (hi << 8) | lo
        }
        // The opcode table only pairs JMP with Absolute and Indirect.
        _ => unreachable!("JMP addressing mode"),
    };
    emu.regs_mut().pc = target;
}

/// JSR: push the return address (last byte of the JSR), jump to the target.
pub(crate) fn jsr<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst, pc: u16) {
    emu.push_word(pc.wrapping_add(2));
    emu.regs_mut().pc = inst.operand;
}

/// RTS: pop the return address and resume after it.
pub(crate) fn rts<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let ret = emu.pop_word();
    emu.regs_mut().pc = ret.wrapping_add(1);
}

/// RTI: pop status, then the full return PC.
pub(crate) fn rti<M: MemoryBus>(emu: &mut Emu6502<M>) {
    let status = emu.pop();
    let pc = emu.pop_word();
    let regs = emu.regs_mut();
    regs.status = (status | FLAG_U) & !FLAG_B;
    regs.pc = pc;
}

/// BRK: software interrupt through the IRQ vector.
pub(crate) fn brk<M: MemoryBus>(emu: &mut Emu6502<M>, pc: u16) {
    // BRK is one byte but pushes PC+2, as the hardware does.
    emu.push_word(pc.wrapping_add(2));
    let status = emu.regs().status | FLAG_B | FLAG_U;
    emu.push(status);
    let vector = emu.ram_peek16(0xFFFE);
    let regs = emu.regs_mut();
    regs.set_flag(FLAG_I, true);
    regs.pc = vector;
}
