//! Tests for the opcode table: totality, size derivation and the
//! control-flow / memory-write predicates.

use apple2tc::addressing::AddressingMode;
use apple2tc::disassembler::decoder::decode_inst;
use apple2tc::opcodes::{decode_opcode, Mnemonic, OPCODE_TABLE};

#[test]
fn test_decoding_is_total() {
    for opcode in 0u8..=255 {
        let inst = decode_inst(0x1000, [opcode, 0x00, 0x00]);
        assert!(
            (1..=3).contains(&inst.size),
            "opcode {opcode:#04X} has size {}",
            inst.size
        );
    }
}

#[test]
fn test_size_follows_addressing_mode() {
    for opcode in 0u8..=255 {
        let inst = decode_inst(0x1000, [opcode, 0x00, 0x00]);
        assert_eq!(
            inst.size,
            inst.mode.instruction_size(),
            "opcode {opcode:#04X}"
        );
    }
}

#[test]
fn test_undocumented_opcodes_are_invalid() {
    // A few well-known holes in the NMOS map.
    for opcode in [0x02u8, 0x03, 0x04, 0x0B, 0x22, 0x5C, 0x80, 0x9C, 0xFF] {
        assert_eq!(
            decode_opcode(opcode).kind,
            Mnemonic::Invalid,
            "opcode {opcode:#04X}"
        );
    }
}

#[test]
fn test_well_known_encodings() {
    let cases: &[(u8, Mnemonic, AddressingMode)] = &[
        (0x00, Mnemonic::Brk, AddressingMode::Implicit),
        (0x20, Mnemonic::Jsr, AddressingMode::Absolute),
        (0x4C, Mnemonic::Jmp, AddressingMode::Absolute),
        (0x6C, Mnemonic::Jmp, AddressingMode::Indirect),
        (0x60, Mnemonic::Rts, AddressingMode::Implicit),
        (0x81, Mnemonic::Sta, AddressingMode::IndirectX),
        (0x96, Mnemonic::Stx, AddressingMode::ZeroPageY),
        (0xA9, Mnemonic::Lda, AddressingMode::Immediate),
        (0xBE, Mnemonic::Ldx, AddressingMode::AbsoluteY),
        (0xD0, Mnemonic::Bne, AddressingMode::Relative),
        (0xEA, Mnemonic::Nop, AddressingMode::Implicit),
        (0xFE, Mnemonic::Inc, AddressingMode::AbsoluteX),
    ];
    for &(opcode, kind, mode) in cases {
        let entry = decode_opcode(opcode);
        assert_eq!(entry.kind, kind, "opcode {opcode:#04X}");
        assert_eq!(entry.mode, mode, "opcode {opcode:#04X}");
    }
}

#[test]
fn test_branch_predicate_covers_all_control_transfers() {
    let branches: Vec<u8> = (0u8..=255)
        .filter(|&op| {
            let e = decode_opcode(op);
            e.kind.is_branch(e.mode)
        })
        .collect();

    // 8 conditional branches + JMP abs + JMP ind + JSR + RTS + RTI + BRK.
    assert_eq!(branches.len(), 14);
    for op in [0x10, 0x30, 0x50, 0x70, 0x90, 0xB0, 0xD0, 0xF0] {
        assert!(branches.contains(&op), "conditional branch {op:#04X}");
    }
    for op in [0x00, 0x20, 0x40, 0x4C, 0x60, 0x6C] {
        assert!(branches.contains(&op), "control transfer {op:#04X}");
    }
}

#[test]
fn test_writes_memory_predicate() {
    // Stores in every mode write memory.
    for op in [0x81u8, 0x85, 0x8D, 0x91, 0x95, 0x99, 0x9D, 0x86, 0x8E, 0x96, 0x84, 0x8C, 0x94] {
        let e = decode_opcode(op);
        assert!(e.kind.writes_memory(e.mode), "store {op:#04X}");
    }
    // Read-modify-write in memory modes.
    for op in [0x06u8, 0x0E, 0x46, 0x66, 0xC6, 0xE6, 0xDE, 0xFE] {
        let e = decode_opcode(op);
        assert!(e.kind.writes_memory(e.mode), "rmw {op:#04X}");
    }
    // Accumulator shift variants do not.
    for op in [0x0Au8, 0x2A, 0x4A, 0x6A] {
        let e = decode_opcode(op);
        assert!(!e.kind.writes_memory(e.mode), "accumulator {op:#04X}");
    }
    // Loads, stack pushes and BRK are not normal writes.
    for op in [0xA9u8, 0xAD, 0x48, 0x08, 0x00] {
        let e = decode_opcode(op);
        assert!(!e.kind.writes_memory(e.mode), "non-write {op:#04X}");
    }
}

#[test]
fn test_table_has_exactly_151_documented_entries() {
    let documented = OPCODE_TABLE
        .iter()
        .filter(|e| e.kind != Mnemonic::Invalid)
        .count();
    assert_eq!(documented, 151);
}
