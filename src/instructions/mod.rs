//! # 6502 Instruction Implementations
//!
//! Implementations of all 56 official instructions, organized by category.
//! Each instruction is a standalone function taking the emulator and the
//! decoded instruction; `dispatch` routes a decoded kind to it.
//!
//! ## Categories
//!
//! - **alu**: ADC, SBC, AND, ORA, EOR, CMP, CPX, CPY, BIT
//! - **branches**: BCC, BCS, BEQ, BNE, BMI, BPL, BVC, BVS
//! - **control**: JMP, JSR, RTS, RTI, BRK, NOP
//! - **flags**: CLC, SEC, CLI, SEI, CLD, SED, CLV
//! - **inc_dec**: INC, DEC, INX, INY, DEX, DEY
//! - **load_store**: LDA, LDX, LDY, STA, STX, STY
//! - **shifts**: ASL, LSR, ROL, ROR
//! - **stack**: PHA, PHP, PLA, PLP
//! - **transfer**: TAX, TAY, TXA, TYA, TSX, TXS

pub mod alu;
pub mod branches;
pub mod control;
pub mod flags;
pub mod inc_dec;
pub mod load_store;
pub mod shifts;
pub mod stack;
pub mod transfer;

use crate::cpu::Emu6502;
use crate::disassembler::Inst;
use crate::memory::MemoryBus;
use crate::opcodes::Mnemonic;

/// Executes a decoded instruction. `pc` is the address the instruction was
/// fetched from; the emulator has already advanced past it.
pub(crate) fn dispatch<M: MemoryBus>(emu: &mut Emu6502<M>, inst: &Inst, pc: u16) {
    use Mnemonic::*;
    match inst.kind {
        Adc => alu::adc(emu, inst),
        And => alu::and(emu, inst),
        Asl => shifts::asl(emu, inst),
        Bcc => branches::bcc(emu, inst),
        Bcs => branches::bcs(emu, inst),
        Beq => branches::beq(emu, inst),
        Bit => alu::bit(emu, inst),
        Bmi => branches::bmi(emu, inst),
        Bne => branches::bne(emu, inst),
        Bpl => branches::bpl(emu, inst),
        Brk => control::brk(emu, pc),
        Bvc => branches::bvc(emu, inst),
        Bvs => branches::bvs(emu, inst),
        Clc => flags::clc(emu),
        Cld => flags::cld(emu),
        Cli => flags::cli(emu),
        Clv => flags::clv(emu),
        Cmp => alu::cmp(emu, inst),
        Cpx => alu::cpx(emu, inst),
        Cpy => alu::cpy(emu, inst),
        Dec => inc_dec::dec(emu, inst),
        Dex => inc_dec::dex(emu),
        Dey => inc_dec::dey(emu),
        Eor => alu::eor(emu, inst),
        Inc => inc_dec::inc(emu, inst),
        Inx => inc_dec::inx(emu),
        Iny => inc_dec::iny(emu),
        Jmp => control::jmp(emu, inst),
        Jsr => control::jsr(emu, inst, pc),
        Lda => load_store::lda(emu, inst),
        Ldx => load_store::ldx(emu, inst),
        Ldy => load_store::ldy(emu, inst),
        Lsr => shifts::lsr(emu, inst),
        Nop => {}
        Ora => alu::ora(emu, inst),
        Pha => stack::pha(emu),
        Php => stack::php(emu),
        Pla => stack::pla(emu),
        Plp => stack::plp(emu),
        Rol => shifts::rol(emu, inst),
        Ror => shifts::ror(emu, inst),
        Rti => control::rti(emu),
        Rts => control::rts(emu),
        Sbc => alu::sbc(emu, inst),
        Sec => flags::sec(emu),
        Sed => flags::sed(emu),
        Sei => flags::sei(emu),
        Sta => load_store::sta(emu, inst),
        Stx => load_store::stx(emu, inst),
        Sty => load_store::sty(emu, inst),
        Tax => transfer::tax(emu),
        Tay => transfer::tay(emu),
        Tsx => transfer::tsx(emu),
        Txa => transfer::txa(emu),
        Txs => transfer::txs(emu),
        Tya => transfer::tya(emu),
        // The emulator never dispatches undocumented opcodes.
        Invalid => unreachable!("dispatch on invalid opcode"),
    }
}
