//! # Simple C Back-End
//!
//! Lowers the recovered CFG to a self-contained C translation unit. The
//! register file and RAM become globals, each discovered function becomes a
//! `static void fn_XXXX(void)`, each basic block a `goto` label, and each
//! instruction a statement (or compound statement) over those globals.
//!
//! The fidelity target is control flow and dataflow, not cycles: flags are
//! individual byte-sized globals updated exactly where the 6502 would
//! update them. Anything without a static lowering (indirect jumps, BRK,
//! calls out of the image) becomes a `trap()` with a descriptive message.

use std::io::{self, Write};

use crate::addressing::AddressingMode;
use crate::disas::Disas;
use crate::disassembler::Inst;
use crate::ir::{BlockId, Function};
use crate::opcodes::Mnemonic;
use crate::symbols::find_symbol;

/// Writes the C translation of a completed [`Disas`] run.
pub fn print_simple_c<W: Write>(dis: &Disas, w: &mut W) -> io::Result<()> {
    print_prologue(dis, w)?;

    for &entry in dis.function_entries() {
        writeln!(w, "static void fn_{entry:04X}(void);")?;
    }
    writeln!(w)?;

    for (func, &entry) in dis.functions().iter().zip(dis.function_entries()) {
        print_function(dis, func, entry, w)?;
    }

    print_main(dis, w)
}

fn print_prologue<W: Write>(dis: &Disas, w: &mut W) -> io::Result<()> {
    writeln!(w, "/* generated by apple2tc --simple-c */")?;
    writeln!(w, "#include <stdint.h>")?;
    writeln!(w, "#include <stdio.h>")?;
    writeln!(w, "#include <stdlib.h>")?;
    writeln!(w, "#include <string.h>")?;
    writeln!(w)?;
    writeln!(w, "static uint8_t ram[0x10000];")?;
    writeln!(w, "static uint8_t a, x, y;")?;
    writeln!(w, "static uint8_t sp = 0xFD;")?;
    writeln!(w, "static uint8_t nf, vf, df, intf, zf, cf;")?;
    writeln!(w)?;
    writeln!(w, "static void trap(const char *msg) {{")?;
    writeln!(w, "    fprintf(stderr, \"trap: %s\\n\", msg);")?;
    writeln!(w, "    exit(1);")?;
    writeln!(w, "}}")?;
    writeln!(w)?;
    writeln!(w, "static uint16_t peek16zp(uint8_t zp) {{")?;
    writeln!(
        w,
        "    return (uint16_t)(ram[zp] | (ram[(uint8_t)(zp + 1)] << 8));"
    )?;
    writeln!(w, "}}")?;
    writeln!(w)?;
    writeln!(w, "static void set_nz(uint8_t v) {{")?;
    writeln!(w, "    zf = v == 0;")?;
    writeln!(w, "    nf = (v & 0x80) != 0;")?;
    writeln!(w, "}}")?;
    writeln!(w)?;
    writeln!(w, "static void push8(uint8_t v) {{")?;
    writeln!(w, "    ram[0x100 + sp--] = v;")?;
    writeln!(w, "}}")?;
    writeln!(w)?;
    writeln!(w, "static uint8_t pop8(void) {{")?;
    writeln!(w, "    return ram[0x100 + (uint8_t)++sp];")?;
    writeln!(w, "}}")?;
    writeln!(w)?;
    writeln!(w, "static uint8_t pack_flags(void) {{")?;
    writeln!(
        w,
        "    return (uint8_t)((nf << 7) | (vf << 6) | 0x20 | (df << 3) | (intf << 2) | (zf << 1) | cf);"
    )?;
    writeln!(w, "}}")?;
    writeln!(w)?;
    writeln!(w, "static void unpack_flags(uint8_t v) {{")?;
    writeln!(w, "    nf = (v >> 7) & 1;")?;
    writeln!(w, "    vf = (v >> 6) & 1;")?;
    writeln!(w, "    df = (v >> 3) & 1;")?;
    writeln!(w, "    intf = (v >> 2) & 1;")?;
    writeln!(w, "    zf = (v >> 1) & 1;")?;
    writeln!(w, "    cf = v & 1;")?;
    writeln!(w, "}}")?;
    writeln!(w)?;

    // The pristine load image, replayed into RAM before the entry function
    // runs.
    if !dis.payload().is_empty() {
        writeln!(w, "static const uint8_t image[] = {{")?;
        for row in dis.payload().chunks(12) {
            let text = row
                .iter()
                .map(|b| format!("0x{b:02X},"))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(w, "    {text}")?;
        }
        writeln!(w, "}};")?;
        writeln!(w)?;
    }
    Ok(())
}

fn print_main<W: Write>(dis: &Disas, w: &mut W) -> io::Result<()> {
    writeln!(w, "int main(void) {{")?;
    if !dis.payload().is_empty() {
        writeln!(
            w,
            "    memcpy(&ram[0x{:04X}], image, sizeof(image));",
            dis.image_start()
        )?;
    }
    if let Some(entry) = dis.function_entries().first() {
        writeln!(w, "    fn_{entry:04X}();")?;
    }
    writeln!(w, "    return 0;")?;
    writeln!(w, "}}")?;
    Ok(())
}

fn print_function<W: Write>(dis: &Disas, func: &Function, entry: u16, w: &mut W) -> io::Result<()> {
    writeln!(w, "static void fn_{entry:04X}(void) {{")?;

    let mut ids: Vec<BlockId> = func.blocks().map(|(id, _)| id).collect();
    ids.sort_by_key(|&id| func.block(id).addr);

    let ctx = LowerContext::new(dis, func);
    for id in ids {
        let block = func.block(id);
        writeln!(w, "L_{:04X}:;", block.addr)?;

        let mut pc = block.addr;
        for inst in &block.insts {
            for line in ctx.lower_inst(inst, pc) {
                writeln!(w, "    {line}")?;
            }
            pc = pc.wrapping_add(inst.size as u16);
        }

        // Make fallthrough explicit: blocks are emitted in address order,
        // but a split block's textual successor is not guaranteed to be its
        // fallthrough successor.
        if let Some(last) = block.insts.last() {
            if !ends_control_flow(last) {
                for line in ctx.lower_goto(pc, "") {
                    writeln!(w, "    {line}")?;
                }
            }
        }
    }

    writeln!(w, "}}")?;
    writeln!(w)?;
    Ok(())
}

/// True when the instruction unconditionally leaves the block, so no
/// fallthrough goto is needed after it.
fn ends_control_flow(inst: &Inst) -> bool {
    matches!(
        inst.kind,
        Mnemonic::Jmp | Mnemonic::Rts | Mnemonic::Rti | Mnemonic::Brk
    )
}

/// Per-function lowering context: where the block labels and function
/// entries are, so control transfers can pick between `goto`, a call, and a
/// trap.
struct LowerContext<'a> {
    dis: &'a Disas,
    block_addrs: Vec<u16>,
}

impl<'a> LowerContext<'a> {
    fn new(dis: &'a Disas, func: &Function) -> Self {
        let mut block_addrs: Vec<u16> = func.blocks().map(|(_, bb)| bb.addr).collect();
        block_addrs.sort_unstable();
        Self { dis, block_addrs }
    }

    fn has_block(&self, addr: u16) -> bool {
        self.block_addrs.binary_search(&addr).is_ok()
    }

    fn is_function(&self, addr: u16) -> bool {
        self.dis.function_entries().contains(&addr)
    }

    /// Lowers an unconditional transfer to `target`. `prefix` is placed
    /// before each emitted statement (used for branch bodies).
    fn lower_goto(&self, target: u16, prefix: &str) -> Vec<String> {
        if self.has_block(target) {
            vec![format!("{prefix}goto L_{target:04X};")]
        } else if self.is_function(target) {
            vec![
                format!("{prefix}fn_{target:04X}();"),
                format!("{prefix}return;"),
            ]
        } else {
            vec![format!(
                "{prefix}trap(\"jump to ${target:04X} outside recovered code\");"
            )]
        }
    }

    /// One instruction to one or more C statements.
    fn lower_inst(&self, inst: &Inst, pc: u16) -> Vec<String> {
        use Mnemonic::*;
        let e = operand_expr(inst);
        match inst.kind {
            Lda => vec![format!("a = {e}; set_nz(a);")],
            Ldx => vec![format!("x = {e}; set_nz(x);")],
            Ldy => vec![format!("y = {e}; set_nz(y);")],
            Sta => vec![format!("{e} = a;")],
            Stx => vec![format!("{e} = x;")],
            Sty => vec![format!("{e} = y;")],

            Adc => vec![format!(
                "{{ uint8_t m = {e}; uint16_t t = a + m + cf; \
                 vf = ((a ^ t) & (m ^ t) & 0x80) != 0; cf = t > 0xFF; a = (uint8_t)t; set_nz(a); }}"
            )],
            Sbc => vec![format!(
                "{{ uint8_t m = (uint8_t)~{e}; uint16_t t = a + m + cf; \
                 vf = ((a ^ t) & (m ^ t) & 0x80) != 0; cf = t > 0xFF; a = (uint8_t)t; set_nz(a); }}"
            )],
            And => vec![format!("a &= {e}; set_nz(a);")],
            Ora => vec![format!("a |= {e}; set_nz(a);")],
            Eor => vec![format!("a ^= {e}; set_nz(a);")],
            Cmp => vec![format!(
                "{{ uint8_t m = {e}; cf = a >= m; set_nz((uint8_t)(a - m)); }}"
            )],
            Cpx => vec![format!(
                "{{ uint8_t m = {e}; cf = x >= m; set_nz((uint8_t)(x - m)); }}"
            )],
            Cpy => vec![format!(
                "{{ uint8_t m = {e}; cf = y >= m; set_nz((uint8_t)(y - m)); }}"
            )],
            Bit => vec![format!(
                "{{ uint8_t m = {e}; zf = (a & m) == 0; nf = (m & 0x80) != 0; vf = (m & 0x40) != 0; }}"
            )],

            Inc => vec![format!("{e} = (uint8_t)({e} + 1); set_nz({e});")],
            Dec => vec![format!("{e} = (uint8_t)({e} - 1); set_nz({e});")],
            Inx => vec!["x++; set_nz(x);".into()],
            Iny => vec!["y++; set_nz(y);".into()],
            Dex => vec!["x--; set_nz(x);".into()],
            Dey => vec!["y--; set_nz(y);".into()],

            Asl => vec![format!(
                "{{ uint8_t t = {e}; cf = (t & 0x80) != 0; t = (uint8_t)(t << 1); {e} = t; set_nz(t); }}"
            )],
            Lsr => vec![format!(
                "{{ uint8_t t = {e}; cf = t & 1; t >>= 1; {e} = t; set_nz(t); }}"
            )],
            Rol => vec![format!(
                "{{ uint8_t t = {e}; uint8_t c = cf; cf = (t & 0x80) != 0; \
                 t = (uint8_t)((t << 1) | c); {e} = t; set_nz(t); }}"
            )],
            Ror => vec![format!(
                "{{ uint8_t t = {e}; uint8_t c = cf; cf = t & 1; \
                 t = (uint8_t)((t >> 1) | (c << 7)); {e} = t; set_nz(t); }}"
            )],

            Clc => vec!["cf = 0;".into()],
            Sec => vec!["cf = 1;".into()],
            Cli => vec!["intf = 0;".into()],
            Sei => vec!["intf = 1;".into()],
            Cld => vec!["df = 0;".into()],
            Sed => vec!["df = 1;".into()],
            Clv => vec!["vf = 0;".into()],

            Tax => vec!["x = a; set_nz(x);".into()],
            Tay => vec!["y = a; set_nz(y);".into()],
            Txa => vec!["a = x; set_nz(a);".into()],
            Tya => vec!["a = y; set_nz(a);".into()],
            Tsx => vec!["x = sp; set_nz(x);".into()],
            Txs => vec!["sp = x;".into()],

            Pha => vec!["push8(a);".into()],
            Php => vec!["push8((uint8_t)(pack_flags() | 0x10));".into()],
            Pla => vec!["a = pop8(); set_nz(a);".into()],
            Plp => vec!["unpack_flags(pop8());".into()],

            Bcc => self.lower_branch("!cf", inst.operand),
            Bcs => self.lower_branch("cf", inst.operand),
            Beq => self.lower_branch("zf", inst.operand),
            Bne => self.lower_branch("!zf", inst.operand),
            Bmi => self.lower_branch("nf", inst.operand),
            Bpl => self.lower_branch("!nf", inst.operand),
            Bvc => self.lower_branch("!vf", inst.operand),
            Bvs => self.lower_branch("vf", inst.operand),

            Jmp => match inst.mode {
                AddressingMode::Absolute => self.lower_goto(inst.operand, ""),
                _ => vec![format!(
                    "trap(\"indirect jump through ${:04X}\");",
                    inst.operand
                )],
            },
            Jsr => self.lower_call(inst.operand),
            Rts => vec!["return;".into()],
            Rti => vec!["return;".into()],
            Brk => vec![format!("trap(\"BRK at ${pc:04X}\");")],
            Nop => vec!["/* nop */;".into()],
            Invalid => vec![format!("trap(\"invalid opcode at ${pc:04X}\");")],
        }
    }

    fn lower_branch(&self, cond: &str, target: u16) -> Vec<String> {
        if self.has_block(target) {
            vec![format!("if ({cond}) goto L_{target:04X};")]
        } else if self.is_function(target) {
            vec![format!("if ({cond}) {{ fn_{target:04X}(); return; }}")]
        } else {
            vec![format!(
                "if ({cond}) trap(\"branch to ${target:04X} outside recovered code\");"
            )]
        }
    }

    fn lower_call(&self, target: u16) -> Vec<String> {
        if self.is_function(target) {
            vec![format!("fn_{target:04X}();")]
        } else if let Some(name) = find_symbol(target) {
            vec![format!("trap(\"ROM call ${target:04X} ({name})\");")]
        } else {
            vec![format!(
                "trap(\"call to ${target:04X} outside recovered code\");"
            )]
        }
    }
}

/// The C expression for an instruction's operand. Usable as an lvalue for
/// every mode except `Immediate`.
fn operand_expr(inst: &Inst) -> String {
    use AddressingMode::*;
    match inst.mode {
        Implicit => String::new(),
        Accumulator => "a".into(),
        Immediate => format!("0x{:02X}", inst.operand),
        ZeroPage => format!("ram[0x{:02X}]", inst.operand),
        ZeroPageX => format!("ram[(uint8_t)(0x{:02X} + x)]", inst.operand),
        ZeroPageY => format!("ram[(uint8_t)(0x{:02X} + y)]", inst.operand),
        Relative => format!("0x{:04X}", inst.operand),
        Absolute => format!("ram[0x{:04X}]", inst.operand),
        AbsoluteX => format!("ram[(uint16_t)(0x{:04X} + x)]", inst.operand),
        AbsoluteY => format!("ram[(uint16_t)(0x{:04X} + y)]", inst.operand),
        Indirect => format!("0x{:04X}", inst.operand),
        IndirectX => format!("ram[peek16zp((uint8_t)(0x{:02X} + x))]", inst.operand),
        IndirectY => format!("ram[(uint16_t)(peek16zp(0x{:02X}) + y)]", inst.operand),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c_for(start: u16, payload: &[u8], entry: u16) -> String {
        let mut dis = Disas::new();
        dis.load_binary(start, payload);
        dis.run(entry);
        let mut out = Vec::new();
        print_simple_c(&dis, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_store_and_return() {
        // LDA #$05 ; STA $00 ; RTS
        let c = c_for(0x6000, &[0xA9, 0x05, 0x85, 0x00, 0x60], 0x6000);
        assert!(c.contains("static void fn_6000(void)"));
        assert!(c.contains("a = 0x05; set_nz(a);"));
        assert!(c.contains("ram[0x00] = a;"));
        assert!(c.contains("return;"));
        assert!(c.contains("fn_6000();"));
    }

    #[test]
    fn test_branch_lowers_to_goto() {
        // LDA #$00 ; BEQ $6007 ; LDA #$01 ; RTS ; RTS
        let c = c_for(
            0x6000,
            &[0xA9, 0x00, 0xF0, 0x03, 0xA9, 0x01, 0x60, 0x60],
            0x6000,
        );
        assert!(c.contains("if (zf) goto L_6007;"));
        assert!(c.contains("L_6004:;"));
        assert!(c.contains("L_6007:;"));
    }

    #[test]
    fn test_rom_call_traps_with_symbol() {
        let c = c_for(0x6000, &[0x20, 0xED, 0xFD, 0x60], 0x6000);
        assert!(c.contains("trap(\"ROM call $FDED (COUT)\");"));
    }

    #[test]
    fn test_backward_branch_loop() {
        // LDX #$03 ; DEX ; BNE $6002 ; RTS
        let c = c_for(0x6000, &[0xA2, 0x03, 0xCA, 0xD0, 0xFD, 0x60], 0x6000);
        assert!(c.contains("if (!zf) goto L_6002;"));
        assert!(c.contains("x--; set_nz(x);"));
    }
}
