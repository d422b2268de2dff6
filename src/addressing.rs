//! # Addressing Modes
//!
//! This module defines the 13 addressing modes of the NMOS 6502 and the
//! instruction-size rule derived from them. The decoder, the effective-address
//! calculation and the formatters all key off this enum.

/// 6502 addressing mode enumeration.
///
/// The addressing mode determines how many operand bytes follow an opcode and
/// how the CPU turns those bytes into an effective memory address.
///
/// # Instruction Sizes
///
/// - **1 byte**: Implicit, Accumulator
/// - **2 bytes**: Immediate, ZeroPage, ZeroPageX, ZeroPageY, Relative, IndirectX, IndirectY
/// - **3 bytes**: Absolute, AbsoluteX, AbsoluteY, Indirect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// No operand, operation implied by instruction.
    ///
    /// Examples: CLC, RTS, NOP
    Implicit,

    /// Operates directly on the accumulator register.
    ///
    /// Examples: LSR A, ROL A, ASL A
    Accumulator,

    /// 8-bit constant operand in the instruction stream.
    ///
    /// Example: LDA #$10
    Immediate,

    /// 8-bit address in zero page (0x00-0xFF).
    ///
    /// Example: LDA $80
    ZeroPage,

    /// Zero page address indexed by X; wraps within zero page.
    ///
    /// Example: LDA $80,X
    ZeroPageX,

    /// Zero page address indexed by Y; wraps within zero page.
    ///
    /// Example: LDX $80,Y
    ZeroPageY,

    /// Signed 8-bit displacement for branch instructions, relative to the
    /// address after the branch.
    ///
    /// Example: BEQ label
    Relative,

    /// Full 16-bit address.
    ///
    /// Example: JMP $1234
    Absolute,

    /// 16-bit address indexed by X.
    ///
    /// Example: LDA $1234,X
    AbsoluteX,

    /// 16-bit address indexed by Y.
    ///
    /// Example: LDA $1234,Y
    AbsoluteY,

    /// Indirect jump through a 16-bit pointer. Only used by JMP.
    ///
    /// Example: JMP ($FFFC)
    Indirect,

    /// Indexed indirect: (ZP + X) is dereferenced as a 16-bit pointer.
    /// The ZP + X addition wraps within zero page.
    ///
    /// Example: LDA ($40,X)
    IndirectX,

    /// Indirect indexed: the ZP byte is dereferenced as a 16-bit pointer,
    /// then Y is added. The pointer's low byte may sit at $FF, in which case
    /// its high byte is read from $00.
    ///
    /// Example: LDA ($40),Y
    IndirectY,
}

impl AddressingMode {
    /// Total instruction size in bytes (opcode + operand) for this mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use apple2tc::addressing::AddressingMode;
    ///
    /// assert_eq!(AddressingMode::Implicit.instruction_size(), 1);
    /// assert_eq!(AddressingMode::Immediate.instruction_size(), 2);
    /// assert_eq!(AddressingMode::Absolute.instruction_size(), 3);
    /// ```
    pub const fn instruction_size(self) -> u8 {
        use AddressingMode::*;
        match self {
            Implicit | Accumulator => 1,
            Immediate | ZeroPage | ZeroPageX | ZeroPageY | Relative | IndirectX | IndirectY => 2,
            Absolute | AbsoluteX | AbsoluteY | Indirect => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AddressingMode::*;

    #[test]
    fn test_instruction_sizes() {
        for mode in [Implicit, Accumulator] {
            assert_eq!(mode.instruction_size(), 1);
        }
        for mode in [
            Immediate, ZeroPage, ZeroPageX, ZeroPageY, Relative, IndirectX, IndirectY,
        ] {
            assert_eq!(mode.instruction_size(), 2);
        }
        for mode in [Absolute, AbsoluteX, AbsoluteY, Indirect] {
            assert_eq!(mode.instruction_size(), 3);
        }
    }
}
