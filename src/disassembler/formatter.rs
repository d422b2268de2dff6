//! Formatting functions for disassembled instructions.
//!
//! Produces the three text columns of a listing line: the raw bytes, the
//! mnemonic, and the operand. Operand formatting follows the classic
//! conventions (`#$nn`, `$nnnn,X`, `($nn),Y`, ...); absolute and relative
//! operands can be resolved to symbols when a resolver is supplied.

use crate::addressing::AddressingMode;
use crate::disassembler::{Inst, ThreeBytes};

/// Optional address-to-name lookup consulted for operand addresses.
pub type SymbolResolver = fn(u16) -> Option<&'static str>;

/// The formatted pieces of one instruction, kept separate so callers can
/// align them into columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedInst {
    /// Raw instruction bytes, e.g. `"A9 05"`.
    pub bytes: String,

    /// Mnemonic text, `"???"` for undocumented opcodes.
    pub inst: &'static str,

    /// Operand text, empty for implicit instructions.
    pub operand: String,
}

/// Formats one decoded instruction together with its raw bytes.
///
/// # Examples
///
/// ```
/// use apple2tc::disassembler::decoder::decode_inst;
/// use apple2tc::disassembler::formatter::format_inst;
///
/// let window = [0x8D, 0x00, 0x80];
/// let inst = decode_inst(0x6000, window);
/// let fmt = format_inst(&inst, window, None);
/// assert_eq!(fmt.bytes, "8D 00 80");
/// assert_eq!(fmt.inst, "STA");
/// assert_eq!(fmt.operand, "$8000");
/// ```
pub fn format_inst(inst: &Inst, bytes: ThreeBytes, resolver: Option<SymbolResolver>) -> FormattedInst {
    let byte_text = bytes[..inst.size as usize]
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ");

    FormattedInst {
        bytes: byte_text,
        inst: inst.kind.name(),
        operand: format_operand(inst, resolver),
    }
}

/// Renders an address as a resolved symbol when possible, `$XXXX` otherwise.
fn addr_text(addr: u16, resolver: Option<SymbolResolver>) -> String {
    if let Some(name) = resolver.and_then(|r| r(addr)) {
        return name.to_string();
    }
    format!("${addr:04X}")
}

fn format_operand(inst: &Inst, resolver: Option<SymbolResolver>) -> String {
    use AddressingMode::*;

    match inst.mode {
        Implicit => String::new(),
        Accumulator => "A".to_string(),
        Immediate => format!("#${:02X}", inst.operand),
        ZeroPage => format!("${:02X}", inst.operand),
        ZeroPageX => format!("${:02X},X", inst.operand),
        ZeroPageY => format!("${:02X},Y", inst.operand),
        // The operand already holds the resolved branch target.
        Relative => addr_text(inst.operand, resolver),
        Absolute => addr_text(inst.operand, resolver),
        AbsoluteX => format!("{},X", addr_text(inst.operand, resolver)),
        AbsoluteY => format!("{},Y", addr_text(inst.operand, resolver)),
        Indirect => format!("({})", addr_text(inst.operand, resolver)),
        IndirectX => format!("(${:02X},X)", inst.operand),
        IndirectY => format!("(${:02X}),Y", inst.operand),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disassembler::decoder::decode_inst;

    fn fmt(pc: u16, window: ThreeBytes) -> FormattedInst {
        let inst = decode_inst(pc, window);
        format_inst(&inst, window, None)
    }

    #[test]
    fn test_format_immediate() {
        let f = fmt(0x8000, [0xA9, 0x42, 0x00]);
        assert_eq!(f.bytes, "A9 42");
        assert_eq!(f.inst, "LDA");
        assert_eq!(f.operand, "#$42");
    }

    #[test]
    fn test_format_implicit() {
        let f = fmt(0x1000, [0xEA, 0x00, 0x00]);
        assert_eq!(f.inst, "NOP");
        assert_eq!(f.operand, "");
    }

    #[test]
    fn test_format_accumulator() {
        let f = fmt(0x1000, [0x0A, 0x00, 0x00]);
        assert_eq!(f.inst, "ASL");
        assert_eq!(f.operand, "A");
    }

    #[test]
    fn test_format_relative_shows_target() {
        // BNE -2 at 0x7000: target 0x7000.
        let f = fmt(0x7000, [0xD0, 0xFE, 0x00]);
        assert_eq!(f.inst, "BNE");
        assert_eq!(f.operand, "$7000");
    }

    #[test]
    fn test_format_indexed_and_indirect() {
        assert_eq!(fmt(0, [0xBD, 0x00, 0x20]).operand, "$2000,X");
        assert_eq!(fmt(0, [0xB1, 0x40, 0x00]).operand, "($40),Y");
        assert_eq!(fmt(0, [0xA1, 0x40, 0x00]).operand, "($40,X)");
        assert_eq!(fmt(0, [0x6C, 0xFC, 0xFF]).operand, "($FFFC)");
    }

    #[test]
    fn test_format_with_symbol_resolver() {
        fn resolver(addr: u16) -> Option<&'static str> {
            (addr == 0xFDED).then_some("COUT")
        }

        let window = [0x20, 0xED, 0xFD]; // JSR $FDED
        let inst = decode_inst(0x6000, window);
        let f = format_inst(&inst, window, Some(resolver));
        assert_eq!(f.inst, "JSR");
        assert_eq!(f.operand, "COUT");
    }

    #[test]
    fn test_format_invalid() {
        let f = fmt(0x2000, [0x02, 0x00, 0x00]);
        assert_eq!(f.inst, "???");
        assert_eq!(f.bytes, "02");
    }
}
