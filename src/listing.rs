//! # Assembly Listing Back-End
//!
//! Prints the recovered program as a labeled assembly listing: one `F_XXXX`
//! label per function, one `L_XXXX` label per basic block, one line per
//! instruction with its address and raw bytes, `.byte` rows for data, and a
//! trailing section for every preserved self-modification generation.

use std::io::{self, Write};

use crate::disas::Disas;
use crate::disassembler::decoder::decode_inst;
use crate::disassembler::formatter::format_inst;
use crate::disassembler::ThreeBytes;
use crate::ir::{BlockId, Function};
use crate::opcodes::Mnemonic;
use crate::symbols::find_symbol;

/// Writes the full assembly listing for a completed [`Disas`] run.
pub fn print_asm_listing<W: Write>(dis: &Disas, w: &mut W) -> io::Result<()> {
    writeln!(
        w,
        "; image ${:04X}-${:04X}",
        dis.image_start(),
        dis.image_end().saturating_sub(1)
    )?;

    for (func, &entry) in dis.functions().iter().zip(dis.function_entries()) {
        writeln!(w)?;
        writeln!(w, "F_{entry:04X}:")?;
        for id in blocks_in_address_order(func) {
            print_block(dis, func, id, w)?;
        }
    }

    print_data(dis, w)?;
    print_generations(dis, w)?;
    Ok(())
}

/// Blocks sorted by address so the listing reads top to bottom.
fn blocks_in_address_order(func: &Function) -> Vec<BlockId> {
    let mut ids: Vec<BlockId> = func.blocks().map(|(id, _)| id).collect();
    ids.sort_by_key(|&id| func.block(id).addr);
    ids
}

fn print_block<W: Write>(dis: &Disas, func: &Function, id: BlockId, w: &mut W) -> io::Result<()> {
    let block = func.block(id);
    writeln!(w, "L_{:04X}:", block.addr)?;

    let mut pc = block.addr;
    for inst in &block.insts {
        let bytes = peek3(dis.ram(), pc);
        let fmt = format_inst(inst, bytes, Some(find_symbol));
        if fmt.operand.is_empty() {
            writeln!(w, "    {:04X}: {:<9} {}", pc, fmt.bytes, fmt.inst)?;
        } else {
            writeln!(
                w,
                "    {:04X}: {:<9} {} {}",
                pc, fmt.bytes, fmt.inst, fmt.operand
            )?;
        }
        pc = pc.wrapping_add(inst.size as u16);
    }
    Ok(())
}

/// Rows of bytes never classified as code.
fn print_data<W: Write>(dis: &Disas, w: &mut W) -> io::Result<()> {
    let mut row: Vec<u8> = Vec::new();
    let mut row_start = 0u16;
    let mut printed_header = false;

    let mut flush = |w: &mut W, row: &mut Vec<u8>, row_start: u16, printed: &mut bool| -> io::Result<()> {
        if row.is_empty() {
            return Ok(());
        }
        if !*printed {
            writeln!(w)?;
            writeln!(w, "; data")?;
            *printed = true;
        }
        let text = row
            .iter()
            .map(|b| format!("${b:02X}"))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(w, "    {row_start:04X}: .byte {text}")?;
        row.clear();
        Ok(())
    };

    for addr in dis.image_start() as u32..dis.image_end() {
        let addr16 = addr as u16;
        if dis.is_code(addr16) {
            flush(w, &mut row, row_start, &mut printed_header)?;
            continue;
        }
        if row.is_empty() {
            row_start = addr16;
        }
        row.push(dis.ram()[addr as usize]);
        if row.len() == 8 {
            flush(w, &mut row, row_start, &mut printed_header)?;
        }
    }
    flush(w, &mut row, row_start, &mut printed_header)?;
    Ok(())
}

/// Disassembles every preserved self-modification layer. RAM only holds the
/// final layer; these sections are the only place the earlier ones survive.
fn print_generations<W: Write>(dis: &Disas, w: &mut W) -> io::Result<()> {
    for (index, gen) in dis.generations().iter().enumerate() {
        if gen.ranges.is_empty() {
            continue;
        }
        writeln!(w)?;
        writeln!(
            w,
            "; generation {index} (superseded at PC=${:04X})",
            gen.regs.pc
        )?;
        for (start, bytes) in &gen.ranges {
            let mut offset = 0usize;
            while offset < bytes.len() {
                let pc = start.wrapping_add(offset as u16);
                let window: ThreeBytes = [
                    bytes[offset],
                    bytes.get(offset + 1).copied().unwrap_or(0),
                    bytes.get(offset + 2).copied().unwrap_or(0),
                ];
                let inst = decode_inst(pc, window);
                if inst.kind == Mnemonic::Invalid || offset + inst.size as usize > bytes.len() {
                    writeln!(w, "    {:04X}: .byte ${:02X}", pc, bytes[offset])?;
                    offset += 1;
                    continue;
                }
                let fmt = format_inst(&inst, window, Some(find_symbol));
                if fmt.operand.is_empty() {
                    writeln!(w, "    {:04X}: {:<9} {}", pc, fmt.bytes, fmt.inst)?;
                } else {
                    writeln!(w, "    {:04X}: {:<9} {} {}", pc, fmt.bytes, fmt.inst, fmt.operand)?;
                }
                offset += inst.size as usize;
            }
        }
    }
    Ok(())
}

fn peek3(ram: &[u8; 65536], pc: u16) -> ThreeBytes {
    [
        ram[pc as usize],
        ram[pc.wrapping_add(1) as usize],
        ram[pc.wrapping_add(2) as usize],
    ]
}
