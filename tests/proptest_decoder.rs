//! Property-based tests for the decoder and the effective-address
//! calculation: totality, size derivation, encode round-trips and the
//! zero-page wraparound rules.

use apple2tc::addressing::AddressingMode;
use apple2tc::cpu::Regs;
use apple2tc::disassembler::decoder::{decode_inst, effective_address, encode_inst};
use apple2tc::memory::{FlatMemory, MemoryBus};
use apple2tc::opcodes::Mnemonic;
use proptest::prelude::*;

proptest! {
    /// Property: every byte sequence decodes to a record with a size the
    /// addressing mode prescribes.
    #[test]
    fn prop_decode_total_and_sized(pc in 0u16..=0xFFFF, b0 in 0u8..=255, b1 in 0u8..=255, b2 in 0u8..=255) {
        let inst = decode_inst(pc, [b0, b1, b2]);
        prop_assert!(matches!(inst.size, 1..=3));
        prop_assert_eq!(inst.size, inst.mode.instruction_size());
    }

    /// Property: defined instructions re-encode to the bytes they were
    /// decoded from.
    #[test]
    fn prop_encode_round_trip(pc in 0u16..=0xFFFF, b0 in 0u8..=255, b1 in 0u8..=255, b2 in 0u8..=255) {
        let window = [b0, b1, b2];
        let inst = decode_inst(pc, window);
        prop_assume!(inst.kind != Mnemonic::Invalid);

        let encoded = encode_inst(pc, &inst).expect("defined opcodes encode");
        prop_assert_eq!(&encoded[..inst.size as usize], &window[..inst.size as usize]);
    }

    /// Property: relative operands resolve to pc + 2 + signed displacement.
    #[test]
    fn prop_relative_target(pc in 0u16..=0xFFFF, disp in 0u8..=255) {
        let inst = decode_inst(pc, [0xF0, disp, 0x00]); // BEQ
        let expected = pc.wrapping_add(2).wrapping_add(disp as i8 as u16);
        prop_assert_eq!(inst.operand, expected);
    }

    /// Property: zero-page indexed addressing never leaves the zero page.
    #[test]
    fn prop_zero_page_indexed_wraps(operand in 0u8..=255, index in 0u8..=255) {
        let mem = FlatMemory::new();
        let mut regs = Regs::new();
        regs.x = index;
        regs.y = index;

        for mode in [AddressingMode::ZeroPageX, AddressingMode::ZeroPageY] {
            let ea = effective_address(&mem, &regs, mode, operand as u16).unwrap();
            prop_assert!(ea < 0x100);
            prop_assert_eq!(ea, operand.wrapping_add(index) as u16);
        }
    }

    /// Property: indirect-indexed reads its pointer from zero page with
    /// low-byte wrap, then adds Y in 16 bits.
    #[test]
    fn prop_indirect_y_pointer_wrap(zp in 0u8..=255, lo in 0u8..=255, hi in 0u8..=255, y in 0u8..=255) {
        let mut mem = FlatMemory::new();
        mem.write(zp as u16, lo);
        mem.write(zp.wrapping_add(1) as u16, hi);

        let mut regs = Regs::new();
        regs.y = y;
        let ea = effective_address(&mem, &regs, AddressingMode::IndirectY, zp as u16).unwrap();
        let base = u16::from_le_bytes([lo, hi]);
        prop_assert_eq!(ea, base.wrapping_add(y as u16));
    }

    /// Property: the non-memory modes never produce an address.
    #[test]
    fn prop_non_memory_modes_have_no_ea(operand in 0u16..=0xFFFF) {
        let mem = FlatMemory::new();
        let regs = Regs::new();
        for mode in [
            AddressingMode::Implicit,
            AddressingMode::Accumulator,
            AddressingMode::Immediate,
        ] {
            prop_assert_eq!(effective_address(&mem, &regs, mode, operand), None);
        }
    }

    /// Property: absolute-indexed effective addresses add the index in
    /// 16-bit arithmetic.
    #[test]
    fn prop_absolute_indexed(operand in 0u16..=0xFFFF, index in 0u8..=255) {
        let mem = FlatMemory::new();
        let mut regs = Regs::new();
        regs.x = index;
        regs.y = index;

        let x = effective_address(&mem, &regs, AddressingMode::AbsoluteX, operand).unwrap();
        prop_assert_eq!(x, operand.wrapping_add(index as u16));
        let y = effective_address(&mem, &regs, AddressingMode::AbsoluteY, operand).unwrap();
        prop_assert_eq!(y, operand.wrapping_add(index as u16));
    }
}
