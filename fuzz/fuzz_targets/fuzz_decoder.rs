//! Fuzz target for the instruction decoder and formatter.
//!
//! Feeds arbitrary three-byte windows at arbitrary PCs through decode,
//! format and re-encode to find panics and round-trip breaks.

#![no_main]

use arbitrary::Arbitrary;
use apple2tc::disassembler::decoder::{decode_inst, encode_inst};
use apple2tc::disassembler::formatter::format_inst;
use apple2tc::opcodes::Mnemonic;
use libfuzzer_sys::fuzz_target;

/// Complete fuzz input
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    pc: u16,
    bytes: [u8; 3],
}

fuzz_target!(|input: FuzzInput| {
    let inst = decode_inst(input.pc, input.bytes);

    // Size is always derived from the addressing mode.
    assert_eq!(inst.size, inst.mode.instruction_size());

    // Formatting never panics, even for invalid opcodes.
    let fmt = format_inst(&inst, input.bytes, None);
    assert!(!fmt.bytes.is_empty());

    // Defined instructions round-trip through encode.
    if inst.kind != Mnemonic::Invalid {
        let encoded = encode_inst(input.pc, &inst).expect("defined opcodes encode");
        assert_eq!(
            &encoded[..inst.size as usize],
            &input.bytes[..inst.size as usize]
        );
    }
});
