//! # apple2tc - Apple II binary translator
//!
//! Statically translates 6502 machine-code binaries in Apple II DOS 3.3
//! format into a human-readable assembly listing or equivalent C source.
//!
//! The pipeline: parse the 4-byte DOS 3.3 header, load the payload into a
//! 64 KiB image, trace the program under a self-modification collector to
//! harvest branch targets and code generations, statically discover
//! reachable code from the entry point, shape it into functions of basic
//! blocks, and hand the IR to a back-end printer.
//!
//! ## Quick Start
//!
//! ```rust
//! use apple2tc::disas::Disas;
//! use apple2tc::listing::print_asm_listing;
//!
//! let mut dis = Disas::new();
//! dis.load_binary(0x6000, &[0xEA]); // NOP
//! dis.run(0x6000);
//!
//! let mut out = Vec::new();
//! print_asm_listing(&dis, &mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().contains("NOP"));
//! ```
//!
//! ## Modules
//!
//! - `addressing`, `opcodes`, `disassembler` - the instruction decoder
//! - `memory`, `cpu`, `instructions` - the 6502 interpreter
//! - `bitset`, `debug`, `symbols` - the tracer and its collaborators
//! - `ir`, `disas` - code discovery and the CFG
//! - `listing`, `simple_c` - the back-end printers

pub mod addressing;
pub mod bitset;
pub mod cpu;
pub mod debug;
pub mod disas;
pub mod disassembler;
pub mod ir;
pub mod listing;
pub mod memory;
pub mod opcodes;
pub mod simple_c;
pub mod symbols;

// Internal instruction implementations (not part of the public API).
mod instructions;

// Re-export the types most callers need.
pub use addressing::AddressingMode;
pub use cpu::{DebugHook, Emu6502, Regs, StopReason};
pub use debug::DebugState;
pub use disas::Disas;
pub use disassembler::{Inst, ThreeBytes};
pub use memory::{FlatMemory, MemoryBus};
pub use opcodes::{Mnemonic, OPCODE_TABLE};

use thiserror::Error;

/// Errors raised while validating a DOS 3.3 input file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The file is shorter than the 4-byte header.
    #[error("missing DOS3.3 file header")]
    MissingHeader,

    /// The header size field disagrees with the actual payload length.
    #[error("invalid DOS3.3 file header: size field {declared} but {actual} payload bytes")]
    LengthMismatch {
        /// Size according to the header.
        declared: u16,
        /// Bytes actually present after the header.
        actual: usize,
    },

    /// Load address plus size runs past the top of the address space.
    #[error("invalid DOS3.3 file header: ${start:04X} + {size} bytes overflows the address space")]
    AddressOverflow {
        /// Load address.
        start: u16,
        /// Declared payload size.
        size: u16,
    },
}

/// Parses a DOS 3.3 binary: a little-endian `{loadAddr, size}` header
/// followed by exactly `size` payload bytes.
///
/// # Examples
///
/// ```
/// use apple2tc::parse_dos33;
///
/// let (start, payload) = parse_dos33(&[0x00, 0x60, 0x01, 0x00, 0xEA]).unwrap();
/// assert_eq!(start, 0x6000);
/// assert_eq!(payload, &[0xEA]);
/// ```
pub fn parse_dos33(bytes: &[u8]) -> Result<(u16, &[u8]), LoadError> {
    if bytes.len() < 4 {
        return Err(LoadError::MissingHeader);
    }
    let start = u16::from_le_bytes([bytes[0], bytes[1]]);
    let size = u16::from_le_bytes([bytes[2], bytes[3]]);
    let payload = &bytes[4..];

    if size as u32 > 0x10000 - start as u32 {
        return Err(LoadError::AddressOverflow { start, size });
    }
    if payload.len() != size as usize {
        return Err(LoadError::LengthMismatch {
            declared: size,
            actual: payload.len(),
        });
    }
    Ok((start, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dos33_valid() {
        let (start, payload) = parse_dos33(&[0x00, 0x60, 0x02, 0x00, 0xA9, 0x05]).unwrap();
        assert_eq!(start, 0x6000);
        assert_eq!(payload, &[0xA9, 0x05]);
    }

    #[test]
    fn test_parse_dos33_short_header() {
        assert_eq!(parse_dos33(&[0x00, 0x60, 0x01]), Err(LoadError::MissingHeader));
    }

    #[test]
    fn test_parse_dos33_length_mismatch() {
        assert_eq!(
            parse_dos33(&[0x00, 0x60, 0x02, 0x00, 0xEA]),
            Err(LoadError::LengthMismatch {
                declared: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_parse_dos33_address_overflow() {
        // 2 bytes loading at $FFFF runs past the top of memory.
        assert_eq!(
            parse_dos33(&[0xFF, 0xFF, 0x02, 0x00, 0xEA, 0xEA]),
            Err(LoadError::AddressOverflow {
                start: 0xFFFF,
                size: 2
            })
        );
    }

    #[test]
    fn test_parse_dos33_fills_to_top_exactly() {
        // 1 byte at $FFFF is the last valid placement.
        let mut file = vec![0xFF, 0xFF, 0x01, 0x00, 0xEA];
        assert!(parse_dos33(&file).is_ok());
        // Empty payload anywhere is also fine.
        file = vec![0x00, 0x00, 0x00, 0x00];
        assert!(parse_dos33(&file).is_ok());
    }
}
