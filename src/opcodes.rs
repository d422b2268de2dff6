//! # Opcode Table
//!
//! This module contains the complete 256-entry opcode table that serves as the
//! single source of truth for 6502 instruction metadata:
//!
//! - **151 documented opcodes** - the official NMOS 6502 instruction set
//! - **105 undocumented opcodes** - mapped to [`Mnemonic::Invalid`]
//!
//! Each entry yields the instruction kind and its addressing mode; the
//! instruction size follows from the addressing mode
//! ([`AddressingMode::instruction_size`]). The control-flow and memory-write
//! predicates used by the tracer and the discovery engine also live here so
//! that classification stays a table lookup rather than a chain of
//! comparisons.

use crate::addressing::AddressingMode;

/// The 56 official 6502 mnemonics, plus `Invalid` for undocumented opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    /// Undocumented opcode.
    Invalid,
}

impl Mnemonic {
    /// The canonical upper-case assembly name, `"???"` for `Invalid`.
    pub const fn name(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Adc => "ADC", And => "AND", Asl => "ASL", Bcc => "BCC", Bcs => "BCS",
            Beq => "BEQ", Bit => "BIT", Bmi => "BMI", Bne => "BNE", Bpl => "BPL",
            Brk => "BRK", Bvc => "BVC", Bvs => "BVS", Clc => "CLC", Cld => "CLD",
            Cli => "CLI", Clv => "CLV", Cmp => "CMP", Cpx => "CPX", Cpy => "CPY",
            Dec => "DEC", Dex => "DEX", Dey => "DEY", Eor => "EOR", Inc => "INC",
            Inx => "INX", Iny => "INY", Jmp => "JMP", Jsr => "JSR", Lda => "LDA",
            Ldx => "LDX", Ldy => "LDY", Lsr => "LSR", Nop => "NOP", Ora => "ORA",
            Pha => "PHA", Php => "PHP", Pla => "PLA", Plp => "PLP", Rol => "ROL",
            Ror => "ROR", Rti => "RTI", Rts => "RTS", Sbc => "SBC", Sec => "SEC",
            Sed => "SED", Sei => "SEI", Sta => "STA", Stx => "STX", Sty => "STY",
            Tax => "TAX", Tay => "TAY", Tsx => "TSX", Txa => "TXA", Txs => "TXS",
            Tya => "TYA", Invalid => "???",
        }
    }

    /// Returns true for every control-transfer instruction: the eight
    /// conditional branches, `JMP`, `JSR`, `RTS`, `RTI` and `BRK`.
    ///
    /// The addressing mode is accepted for symmetry with
    /// [`Mnemonic::writes_memory`]; every control-transfer mnemonic transfers
    /// control in all of its encodings.
    pub const fn is_branch(self, _mode: AddressingMode) -> bool {
        use Mnemonic::*;
        matches!(
            self,
            Bcc | Bcs | Beq | Bmi | Bne | Bpl | Bvc | Bvs | Jmp | Jsr | Rts | Rti | Brk
        )
    }

    /// Returns true when the instruction stores to memory through its
    /// effective address: `STA`/`STX`/`STY`, and the read-modify-write group
    /// (`ASL`, `LSR`, `ROL`, `ROR`, `INC`, `DEC`) in a memory addressing mode.
    ///
    /// The accumulator variants of the shift/rotate group do not touch memory
    /// and return false. Stack pushes and `BRK` are not "normal" writes.
    pub const fn writes_memory(self, mode: AddressingMode) -> bool {
        use Mnemonic::*;
        match self {
            Sta | Stx | Sty => true,
            Asl | Lsr | Rol | Ror | Inc | Dec => !matches!(mode, AddressingMode::Accumulator),
            _ => false,
        }
    }
}

/// Metadata for a single opcode byte: what it is and how it addresses memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry {
    /// Instruction kind; `Mnemonic::Invalid` for undocumented opcodes.
    pub kind: Mnemonic,

    /// Addressing mode; determines the instruction size.
    pub mode: AddressingMode,
}

const fn op(kind: Mnemonic, mode: AddressingMode) -> OpcodeEntry {
    OpcodeEntry { kind, mode }
}

const fn bad() -> OpcodeEntry {
    OpcodeEntry {
        kind: Mnemonic::Invalid,
        mode: AddressingMode::Implicit,
    }
}

use AddressingMode::*;
use Mnemonic::*;

/// Complete 256-entry opcode table indexed by opcode byte value.
///
/// Undocumented opcodes map to `(Invalid, Implicit)` and therefore decode
/// with size 1, which lets a scanner resynchronize one byte at a time.
///
/// # Examples
///
/// ```
/// use apple2tc::opcodes::{Mnemonic, OPCODE_TABLE};
///
/// assert_eq!(OPCODE_TABLE[0xA9].kind, Mnemonic::Lda);
/// assert_eq!(OPCODE_TABLE[0x02].kind, Mnemonic::Invalid);
/// ```
#[rustfmt::skip]
pub const OPCODE_TABLE: [OpcodeEntry; 256] = [
    // 0x00 - 0x0F
    op(Brk, Implicit),   op(Ora, IndirectX),  bad(),               bad(),
    bad(),               op(Ora, ZeroPage),   op(Asl, ZeroPage),   bad(),
    op(Php, Implicit),   op(Ora, Immediate),  op(Asl, Accumulator), bad(),
    bad(),               op(Ora, Absolute),   op(Asl, Absolute),   bad(),
    // 0x10 - 0x1F
    op(Bpl, Relative),   op(Ora, IndirectY),  bad(),               bad(),
    bad(),               op(Ora, ZeroPageX),  op(Asl, ZeroPageX),  bad(),
    op(Clc, Implicit),   op(Ora, AbsoluteY),  bad(),               bad(),
    bad(),               op(Ora, AbsoluteX),  op(Asl, AbsoluteX),  bad(),
    // 0x20 - 0x2F
    op(Jsr, Absolute),   op(And, IndirectX),  bad(),               bad(),
    op(Bit, ZeroPage),   op(And, ZeroPage),   op(Rol, ZeroPage),   bad(),
    op(Plp, Implicit),   op(And, Immediate),  op(Rol, Accumulator), bad(),
    op(Bit, Absolute),   op(And, Absolute),   op(Rol, Absolute),   bad(),
    // 0x30 - 0x3F
    op(Bmi, Relative),   op(And, IndirectY),  bad(),               bad(),
    bad(),               op(And, ZeroPageX),  op(Rol, ZeroPageX),  bad(),
    op(Sec, Implicit),   op(And, AbsoluteY),  bad(),               bad(),
    bad(),               op(And, AbsoluteX),  op(Rol, AbsoluteX),  bad(),
    // 0x40 - 0x4F
    op(Rti, Implicit),   op(Eor, IndirectX),  bad(),               bad(),
    bad(),               op(Eor, ZeroPage),   op(Lsr, ZeroPage),   bad(),
    op(Pha, Implicit),   op(Eor, Immediate),  op(Lsr, Accumulator), bad(),
    op(Jmp, Absolute),   op(Eor, Absolute),   op(Lsr, Absolute),   bad(),
    // 0x50 - 0x5F
    op(Bvc, Relative),   op(Eor, IndirectY),  bad(),               bad(),
    bad(),               op(Eor, ZeroPageX),  op(Lsr, ZeroPageX),  bad(),
    op(Cli, Implicit),   op(Eor, AbsoluteY),  bad(),               bad(),
    bad(),               op(Eor, AbsoluteX),  op(Lsr, AbsoluteX),  bad(),
    // 0x60 - 0x6F
    op(Rts, Implicit),   op(Adc, IndirectX),  bad(),               bad(),
    bad(),               op(Adc, ZeroPage),   op(Ror, ZeroPage),   bad(),
    op(Pla, Implicit),   op(Adc, Immediate),  op(Ror, Accumulator), bad(),
    op(Jmp, Indirect),   op(Adc, Absolute),   op(Ror, Absolute),   bad(),
    // 0x70 - 0x7F
    op(Bvs, Relative),   op(Adc, IndirectY),  bad(),               bad(),
    bad(),               op(Adc, ZeroPageX),  op(Ror, ZeroPageX),  bad(),
    op(Sei, Implicit),   op(Adc, AbsoluteY),  bad(),               bad(),
    bad(),               op(Adc, AbsoluteX),  op(Ror, AbsoluteX),  bad(),
    // 0x80 - 0x8F
    bad(),               op(Sta, IndirectX),  bad(),               bad(),
    op(Sty, ZeroPage),   op(Sta, ZeroPage),   op(Stx, ZeroPage),   bad(),
    op(Dey, Implicit),   bad(),               op(Txa, Implicit),   bad(),
    op(Sty, Absolute),   op(Sta, Absolute),   op(Stx, Absolute),   bad(),
    // 0x90 - 0x9F
    op(Bcc, Relative),   op(Sta, IndirectY),  bad(),               bad(),
    op(Sty, ZeroPageX),  op(Sta, ZeroPageX),  op(Stx, ZeroPageY),  bad(),
    op(Tya, Implicit),   op(Sta, AbsoluteY),  op(Txs, Implicit),   bad(),
    bad(),               op(Sta, AbsoluteX),  bad(),               bad(),
    // 0xA0 - 0xAF
    op(Ldy, Immediate),  op(Lda, IndirectX),  op(Ldx, Immediate),  bad(),
    op(Ldy, ZeroPage),   op(Lda, ZeroPage),   op(Ldx, ZeroPage),   bad(),
    op(Tay, Implicit),   op(Lda, Immediate),  op(Tax, Implicit),   bad(),
    op(Ldy, Absolute),   op(Lda, Absolute),   op(Ldx, Absolute),   bad(),
    // 0xB0 - 0xBF
    op(Bcs, Relative),   op(Lda, IndirectY),  bad(),               bad(),
    op(Ldy, ZeroPageX),  op(Lda, ZeroPageX),  op(Ldx, ZeroPageY),  bad(),
    op(Clv, Implicit),   op(Lda, AbsoluteY),  op(Tsx, Implicit),   bad(),
    op(Ldy, AbsoluteX),  op(Lda, AbsoluteX),  op(Ldx, AbsoluteY),  bad(),
    // 0xC0 - 0xCF
    op(Cpy, Immediate),  op(Cmp, IndirectX),  bad(),               bad(),
    op(Cpy, ZeroPage),   op(Cmp, ZeroPage),   op(Dec, ZeroPage),   bad(),
    op(Iny, Implicit),   op(Cmp, Immediate),  op(Dex, Implicit),   bad(),
    op(Cpy, Absolute),   op(Cmp, Absolute),   op(Dec, Absolute),   bad(),
    // 0xD0 - 0xDF
    op(Bne, Relative),   op(Cmp, IndirectY),  bad(),               bad(),
    bad(),               op(Cmp, ZeroPageX),  op(Dec, ZeroPageX),  bad(),
    op(Cld, Implicit),   op(Cmp, AbsoluteY),  bad(),               bad(),
    bad(),               op(Cmp, AbsoluteX),  op(Dec, AbsoluteX),  bad(),
    // 0xE0 - 0xEF
    op(Cpx, Immediate),  op(Sbc, IndirectX),  bad(),               bad(),
    op(Cpx, ZeroPage),   op(Sbc, ZeroPage),   op(Inc, ZeroPage),   bad(),
    op(Inx, Implicit),   op(Sbc, Immediate),  op(Nop, Implicit),   bad(),
    op(Cpx, Absolute),   op(Sbc, Absolute),   op(Inc, Absolute),   bad(),
    // 0xF0 - 0xFF
    op(Beq, Relative),   op(Sbc, IndirectY),  bad(),               bad(),
    bad(),               op(Sbc, ZeroPageX),  op(Inc, ZeroPageX),  bad(),
    op(Sed, Implicit),   op(Sbc, AbsoluteY),  bad(),               bad(),
    bad(),               op(Sbc, AbsoluteX),  op(Inc, AbsoluteX),  bad(),
];

/// Looks up the table entry for an opcode byte. Total on `0..=255`.
pub fn decode_opcode(byte: u8) -> OpcodeEntry {
    OPCODE_TABLE[byte as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_count() {
        let documented = OPCODE_TABLE
            .iter()
            .filter(|e| e.kind != Mnemonic::Invalid)
            .count();
        assert_eq!(documented, 151);
    }

    #[test]
    fn test_branch_predicate() {
        assert!(Mnemonic::Beq.is_branch(Relative));
        assert!(Mnemonic::Jmp.is_branch(Indirect));
        assert!(Mnemonic::Rts.is_branch(Implicit));
        assert!(Mnemonic::Brk.is_branch(Implicit));
        assert!(!Mnemonic::Lda.is_branch(Immediate));
        assert!(!Mnemonic::Nop.is_branch(Implicit));
    }

    #[test]
    fn test_writes_memory_predicate() {
        assert!(Mnemonic::Sta.writes_memory(Absolute));
        assert!(Mnemonic::Inc.writes_memory(ZeroPage));
        assert!(Mnemonic::Asl.writes_memory(AbsoluteX));
        // Accumulator variants stay in the register file.
        assert!(!Mnemonic::Asl.writes_memory(Accumulator));
        assert!(!Mnemonic::Lda.writes_memory(Absolute));
        assert!(!Mnemonic::Pha.writes_memory(Implicit));
    }
}
