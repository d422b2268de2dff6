//! Fuzz target for the discovery pipeline.
//!
//! Loads arbitrary payloads as DOS 3.3 images and runs the full
//! trace-and-discover pipeline; nothing a program does may panic the
//! translator.

#![no_main]

use arbitrary::Arbitrary;
use apple2tc::disas::Disas;
use apple2tc::listing::print_asm_listing;
use libfuzzer_sys::fuzz_target;

/// Complete fuzz input
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    start: u16,
    payload: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    // Keep the image inside the address space, as the header validation
    // would.
    if input.payload.is_empty() || input.payload.len() > 0x10000 - input.start as usize {
        return;
    }

    let mut dis = Disas::new();
    dis.load_binary(input.start, &input.payload);
    // A small budget keeps runaway loops fast while still exercising the
    // collector.
    dis.set_trace_limit(1_000);
    dis.run(input.start);

    let mut out = Vec::new();
    print_asm_listing(&dis, &mut out).unwrap();
});
