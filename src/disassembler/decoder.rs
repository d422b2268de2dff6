//! Instruction decoder for the 6502 disassembler.
//!
//! Decoding is driven entirely by the opcode table: the opcode byte selects
//! `(kind, mode)`, the mode fixes the size, and the operand is assembled
//! little-endian from the remaining bytes of the window.

use crate::addressing::AddressingMode;
use crate::cpu::Regs;
use crate::disassembler::{Inst, ThreeBytes};
use crate::memory::MemoryBus;
use crate::opcodes::{decode_opcode, Mnemonic, OPCODE_TABLE};

/// Decodes the instruction in the three-byte window at `pc`.
///
/// Total on every byte value: undocumented opcodes come back as
/// `Mnemonic::Invalid` with size 1 so a scanner can resynchronize.
/// `Relative` operands are resolved to the target PC.
///
/// # Examples
///
/// ```
/// use apple2tc::disassembler::decoder::decode_inst;
/// use apple2tc::opcodes::Mnemonic;
///
/// let inst = decode_inst(0x6000, [0xA9, 0x05, 0x00]); // LDA #$05
/// assert_eq!(inst.kind, Mnemonic::Lda);
/// assert_eq!(inst.size, 2);
/// assert_eq!(inst.operand, 0x05);
/// ```
pub fn decode_inst(pc: u16, bytes: ThreeBytes) -> Inst {
    let entry = decode_opcode(bytes[0]);
    let size = entry.mode.instruction_size();

    let operand = match size {
        2 if entry.mode == AddressingMode::Relative => {
            // Branch displacement resolved to the target PC.
            pc.wrapping_add(2).wrapping_add(bytes[1] as i8 as u16)
        }
        2 => bytes[1] as u16,
        3 => u16::from_le_bytes([bytes[1], bytes[2]]),
        _ => 0,
    };

    Inst {
        kind: entry.kind,
        mode: entry.mode,
        size,
        operand,
    }
}

/// Re-emits the bytes of a defined instruction decoded at `pc`.
///
/// Unused trailing bytes of the window are zero. Returns `None` for
/// `Mnemonic::Invalid`, which has no unique encoding.
pub fn encode_inst(pc: u16, inst: &Inst) -> Option<ThreeBytes> {
    if inst.kind == Mnemonic::Invalid {
        return None;
    }
    let opcode = OPCODE_TABLE
        .iter()
        .position(|e| e.kind == inst.kind && e.mode == inst.mode)? as u8;

    let mut bytes = [opcode, 0, 0];
    match inst.size {
        2 if inst.mode == AddressingMode::Relative => {
            bytes[1] = inst.operand.wrapping_sub(pc.wrapping_add(2)) as u8;
        }
        2 => bytes[1] = inst.operand as u8,
        3 => {
            bytes[1] = inst.operand as u8;
            bytes[2] = (inst.operand >> 8) as u8;
        }
        _ => {}
    }
    Some(bytes)
}

/// Calculates the memory address the instruction would touch, or `None` when
/// the addressing mode does not access memory.
///
/// Zero-page indexed modes wrap within zero page; `IndirectY` reads its
/// 16-bit pointer from zero page (the pointer's own bytes wrap at $FF) and
/// adds Y in 16 bits.
pub fn effective_address<M: MemoryBus>(
    mem: &M,
    regs: &Regs,
    mode: AddressingMode,
    operand: u16,
) -> Option<u16> {
    use AddressingMode::*;
    match mode {
        Absolute | Relative | ZeroPage => Some(operand),
        AbsoluteX => Some(operand.wrapping_add(regs.x as u16)),
        AbsoluteY => Some(operand.wrapping_add(regs.y as u16)),
        Indirect => Some(mem.read_word(operand)),
        IndirectX => Some(read_zero_page_word(
            mem,
            (operand as u8).wrapping_add(regs.x),
        )),
        IndirectY => Some(read_zero_page_word(mem, operand as u8).wrapping_add(regs.y as u16)),
        ZeroPageX => Some((operand as u8).wrapping_add(regs.x) as u16),
        ZeroPageY => Some((operand as u8).wrapping_add(regs.y) as u16),
        Implicit | Accumulator | Immediate => None,
    }
}

/// Reads a 16-bit pointer out of zero page; the high byte of the pointer
/// wraps from $FF to $00.
fn read_zero_page_word<M: MemoryBus>(mem: &M, zp: u8) -> u16 {
    let lo = mem.read(zp as u16) as u16;
    let hi = mem.read(zp.wrapping_add(1) as u16) as u16;
    (hi << 8) | lo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::FlatMemory;

    #[test]
    fn test_decode_lda_immediate() {
        let inst = decode_inst(0x8000, [0xA9, 0x42, 0x00]);

        assert_eq!(inst.kind, Mnemonic::Lda);
        assert_eq!(inst.mode, AddressingMode::Immediate);
        assert_eq!(inst.size, 2);
        assert_eq!(inst.operand, 0x42);
    }

    #[test]
    fn test_decode_sta_absolute() {
        let inst = decode_inst(0x0000, [0x8D, 0x00, 0x80]);

        assert_eq!(inst.kind, Mnemonic::Sta);
        assert_eq!(inst.mode, AddressingMode::Absolute);
        assert_eq!(inst.size, 3);
        assert_eq!(inst.operand, 0x8000);
    }

    #[test]
    fn test_decode_relative_resolves_target() {
        // BEQ +2 at 0x6000 targets 0x6004.
        let inst = decode_inst(0x6000, [0xF0, 0x02, 0x00]);
        assert_eq!(inst.kind, Mnemonic::Beq);
        assert_eq!(inst.operand, 0x6004);

        // Displacement 0x80 is -128: target = pc + 2 - 128.
        let inst = decode_inst(0x6000, [0xF0, 0x80, 0x00]);
        assert_eq!(inst.operand, 0x6000 + 2 - 128);
    }

    #[test]
    fn test_decode_invalid_is_size_one() {
        let inst = decode_inst(0x2000, [0x02, 0xFF, 0xFF]);
        assert_eq!(inst.kind, Mnemonic::Invalid);
        assert_eq!(inst.size, 1);
        assert_eq!(inst.operand, 0);
    }

    #[test]
    fn test_encode_round_trip() {
        for opcode in 0u8..=255 {
            let window = [opcode, 0x34, 0x12];
            let inst = decode_inst(0x7000, window);
            if inst.kind == Mnemonic::Invalid {
                continue;
            }
            let encoded = encode_inst(0x7000, &inst).unwrap();
            assert_eq!(
                &encoded[..inst.size as usize],
                &window[..inst.size as usize],
                "opcode {opcode:#04X} must round-trip"
            );
        }
    }

    #[test]
    fn test_effective_address_zero_page_x_wraps() {
        let mem = FlatMemory::new();
        let mut regs = Regs::new();
        regs.x = 1;
        let ea = effective_address(&mem, &regs, AddressingMode::ZeroPageX, 0xFF);
        assert_eq!(ea, Some(0x00));
    }

    #[test]
    fn test_effective_address_indirect_y_pointer_wraps() {
        let mut mem = FlatMemory::new();
        // Pointer at $FF: low byte at $FF, high byte wraps to $00.
        mem.write(0x00FF, 0x34);
        mem.write(0x0000, 0x12);
        let mut regs = Regs::new();
        regs.y = 1;
        let ea = effective_address(&mem, &regs, AddressingMode::IndirectY, 0xFF);
        assert_eq!(ea, Some(0x1235));
    }

    #[test]
    fn test_effective_address_non_memory_modes() {
        let mem = FlatMemory::new();
        let regs = Regs::new();
        for mode in [
            AddressingMode::Implicit,
            AddressingMode::Accumulator,
            AddressingMode::Immediate,
        ] {
            assert_eq!(effective_address(&mem, &regs, mode, 0x42), None);
        }
    }
}
