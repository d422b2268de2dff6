//! # Debug State and Self-Modification Tracer
//!
//! A pre-instruction hook that can trace a running program three ways:
//!
//! - **live tracing**: print every instruction with registers, flags and
//!   optional memory watches;
//! - **history buffering**: keep the last N instruction records in a ring
//!   and dump them when an undocumented opcode is reached;
//! - **collect mode**: silently track self-modifying code. Every normal
//!   memory write is recorded; when the program executes a byte it wrote in
//!   the current generation, the executed ranges of the previous layer are
//!   snapshotted out of RAM into a new [`Generation`] before they can be
//!   overwritten again. Branch targets are accumulated for the code
//!   discovery pass.
//!
//! All state lives in one [`DebugState`] value and is only mutated from
//! inside the callback; the emulator is borrowed read-only for the duration
//! of each call.

use std::collections::{BTreeSet, VecDeque};

use crate::bitset::AddrSet;
use crate::cpu::{DebugHook, Emu6502, Regs, StopReason};
use crate::disassembler::decoder::{decode_inst, effective_address};
use crate::disassembler::formatter::format_inst;
use crate::disassembler::ThreeBytes;
use crate::memory::MemoryBus;
use crate::opcodes::{decode_opcode, Mnemonic};
use crate::symbols::find_symbol;

/// Default history ring capacity.
const DEFAULT_MAX_HISTORY: usize = 128;

/// One traced instruction: the register file and the three-byte window at
/// the PC, captured at the moment the callback fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstRecord {
    /// Register file before the instruction executed.
    pub regs: Regs,
    /// The bytes at `regs.pc`.
    pub bytes: ThreeBytes,
}

/// A named, sized memory cell printed alongside each live-traced
/// instruction. Keyed by `(addr, size)`; `size` is 1 or 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watch {
    /// Display name.
    pub name: String,
    /// Watched address.
    pub addr: u16,
    /// 1 or 2 bytes.
    pub size: u8,
}

/// One preserved layer of self-modifying code: the register file at the
/// moment the layer was superseded, plus the executed byte ranges copied out
/// of RAM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Registers when the next layer took over.
    pub regs: Regs,
    /// `(start, bytes)` runs, in address order.
    pub ranges: Vec<(u16, Vec<u8>)>,
}

impl Generation {
    /// Total number of code bytes preserved in this generation.
    pub fn byte_count(&self) -> usize {
        self.ranges.iter().map(|(_, bytes)| bytes.len()).sum()
    }
}

/// The tracer. Implements [`DebugHook`]; install it with [`Emu6502::run`].
pub struct DebugState {
    buffering: bool,
    max_history: usize,
    history: VecDeque<InstRecord>,
    watches: Vec<Watch>,
    non_debug: Vec<(u16, u16)>,
    limit: u64,
    icount: u64,
    debug_bb: bool,
    /// One-shot: the previous instruction was a branch, so the current PC is
    /// a branch target.
    branch_target: bool,
    collect: bool,
    cur_mem_written: AddrSet,
    prev_mem_written: AddrSet,
    cur_mem_exec: AddrSet,
    generations: Vec<Generation>,
    branch_targets: BTreeSet<u16>,
    resolve_symbols: bool,
}

impl DebugState {
    /// Creates a tracer with everything off.
    pub fn new() -> Self {
        Self {
            buffering: false,
            max_history: DEFAULT_MAX_HISTORY,
            history: VecDeque::new(),
            watches: Vec::new(),
            non_debug: Vec::new(),
            limit: 0,
            icount: 0,
            debug_bb: false,
            branch_target: false,
            collect: false,
            cur_mem_written: AddrSet::new(),
            prev_mem_written: AddrSet::new(),
            cur_mem_exec: AddrSet::new(),
            generations: Vec::new(),
            branch_targets: BTreeSet::new(),
            resolve_symbols: false,
        }
    }

    /// Restores a clean initial state: collect mode off, buffering off,
    /// history, watches, non-debug ranges and collected data dropped, the
    /// instruction counter zeroed.
    pub fn reset(&mut self) {
        self.collect = false;
        self.set_debug_bb(false);
        self.set_buffering(false);
        self.set_limit(0);
        self.clear_history();
        self.watches.clear();
        self.non_debug.clear();
        self.icount = 0;
        self.reset_collected_data();
    }

    /// Enables or disables the history ring. Disabling frees the backing
    /// storage.
    pub fn set_buffering(&mut self, buffering: bool) {
        if !buffering && self.buffering {
            self.history.clear();
            self.history.shrink_to_fit();
        }
        self.buffering = buffering;
    }

    /// Sets the ring capacity, truncating from the back when shrinking.
    pub fn set_max_history(&mut self, max_history: usize) {
        if max_history < self.max_history {
            self.history.truncate(max_history);
            self.history.shrink_to_fit();
        }
        self.max_history = max_history;
    }

    /// Drops the buffered records.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// The buffered records, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &InstRecord> {
        self.history.iter()
    }

    /// Prints every buffered record to stderr.
    pub fn print_history(&self) {
        for rec in &self.history {
            eprintln!("{}", self.format_record(rec, true));
        }
    }

    /// Adds a watch, upserting by `(addr, size)`. `size` is 1 or 2 and the
    /// watched cell must fit in the address space.
    pub fn add_watch(&mut self, name: impl Into<String>, addr: u16, size: u8) {
        debug_assert!(size == 1 || size == 2);
        debug_assert!(addr as u32 + size as u32 <= 65536);
        let name = name.into();
        match self
            .watches
            .iter_mut()
            .find(|w| w.addr == addr && w.size == size)
        {
            Some(watch) => watch.name = name,
            None => self.watches.push(Watch { name, addr, size }),
        }
    }

    /// Removes the first watch with this name, if any.
    pub fn remove_watch(&mut self, name: &str) {
        if let Some(pos) = self.watches.iter().position(|w| w.name == name) {
            self.watches.remove(pos);
        }
    }

    /// Current watches, in insertion order.
    pub fn watches(&self) -> &[Watch] {
        &self.watches
    }

    /// Excludes the closed address range `[from, to]` from debugging.
    pub fn add_non_debug(&mut self, from: u16, to: u16) {
        self.non_debug.push((from, to));
    }

    /// Toggles collect mode. Turning it on clears all collected bitsets and
    /// starts a fresh generation seeded with the current register file.
    pub fn set_collect<M: MemoryBus>(&mut self, emu: &Emu6502<M>, on: bool) {
        if on && !self.collect {
            self.cur_mem_written.clear_all();
            self.prev_mem_written.clear_all();
            self.cur_mem_exec.clear_all();
            self.generations.clear();
            self.generations.push(Generation {
                regs: emu.regs(),
                ranges: Vec::new(),
            });
        }
        self.collect = on;
    }

    /// Toggles basic-block mode: only instructions that start a basic block
    /// (branch targets) are traced.
    pub fn set_debug_bb(&mut self, on: bool) {
        self.debug_bb = on;
        self.branch_target = false;
    }

    /// Stops after `limit` instructions; 0 means unlimited.
    pub fn set_limit(&mut self, limit: u64) {
        self.limit = limit;
    }

    /// Enables Apple II ROM symbol resolution in trace output.
    pub fn set_resolve_symbols(&mut self, on: bool) {
        self.resolve_symbols = on;
    }

    /// Branch targets accumulated by collect mode, in address order.
    pub fn branch_targets(&self) -> &BTreeSet<u16> {
        &self.branch_targets
    }

    /// Preserved self-modification generations, oldest first. The first
    /// entry is the seed generation with no ranges.
    pub fn generations(&self) -> &[Generation] {
        &self.generations
    }

    /// Addresses written by the current generation.
    pub fn cur_mem_written(&self) -> &AddrSet {
        &self.cur_mem_written
    }

    /// Addresses written by the previous generation.
    pub fn prev_mem_written(&self) -> &AddrSet {
        &self.prev_mem_written
    }

    /// Drops collected branch targets and generations.
    pub fn reset_collected_data(&mut self) {
        self.branch_targets.clear();
        self.generations.clear();
    }

    /// Formats one record: address, optional symbol, registers, flags, and
    /// (when `show_inst` is set) the decoded instruction.
    pub fn format_record(&self, rec: &InstRecord, show_inst: bool) -> String {
        let r = rec.regs;
        let name = if self.resolve_symbols {
            find_symbol(r.pc).unwrap_or("")
        } else {
            ""
        };
        let mut out = format!("{:04X}: {:<8}  ", r.pc, name);

        out.push_str(&format!(
            "A={:02X} X={:02X} Y={:02X} SP={:02X} SR=",
            r.a, r.x, r.y, r.sp
        ));
        const FLAG_NAMES: [char; 8] = ['N', 'V', '.', 'B', 'D', 'I', 'Z', 'C'];
        for (i, flag) in FLAG_NAMES.iter().enumerate() {
            out.push(if r.status & (0x80 >> i) != 0 { *flag } else { '.' });
        }

        if show_inst {
            // The PC again for convenience.
            out.push_str(&format!(" PC={:04X}  ", r.pc));
            let inst = decode_inst(r.pc, rec.bytes);
            let resolver = self
                .resolve_symbols
                .then_some(find_symbol as crate::disassembler::formatter::SymbolResolver);
            let fmt = format_inst(&inst, rec.bytes, resolver);
            out.push_str(&format!("  {:<8}    {}", fmt.bytes, fmt.inst));
            if !fmt.operand.is_empty() {
                out.push_str(&format!("  {}", fmt.operand));
                if inst.mode == crate::addressing::AddressingMode::Relative {
                    out.push_str(&format!(" ({})", rec.bytes[1] as i8));
                }
            }
        }
        out
    }

    fn add_record(&mut self, rec: InstRecord) {
        if self.max_history == 0 {
            return;
        }
        if self.history.len() >= self.max_history {
            self.history.pop_front();
        }
        self.history.push_back(rec);
    }

    /// The per-instruction callback body. Order matters; see the module
    /// docs and the collect-mode path in [`DebugState::collect_data`].
    fn debug_state<M: MemoryBus>(&mut self, emu: &Emu6502<M>, pc: u16) -> Option<StopReason> {
        // Don't debug in areas that have been excluded.
        if self.non_debug.iter().any(|&(from, to)| pc >= from && pc <= to) {
            return None;
        }

        if self.collect {
            return self.collect_data(emu, pc);
        }

        if self.debug_bb {
            let was_branch_target = self.branch_target;
            let entry = decode_opcode(emu.ram_peek(pc));
            self.branch_target = entry.kind.is_branch(entry.mode);
            // Only trace instructions that start a basic block.
            if !was_branch_target {
                return None;
            }
        }

        if self.limit != 0 && self.icount >= self.limit {
            return Some(StopReason::StopRequested);
        }
        self.icount += 1;

        let rec = InstRecord {
            regs: emu.regs(),
            bytes: emu.ram_peek3(pc),
        };

        if self.buffering {
            self.add_record(rec);

            if decode_opcode(rec.bytes[0]).kind == Mnemonic::Invalid {
                eprintln!("*** INVALID OPCODE! Dumping history:");
                self.print_history();
                return Some(StopReason::StopRequested);
            }

            return None;
        }

        let mut line = self.format_record(&rec, self.watches.is_empty());
        for watch in &self.watches {
            line.push(' ');
            line.push_str(&watch.name);
            if watch.addr < 256 {
                line.push_str(&format!("(${:02X})=", watch.addr));
            } else {
                line.push_str(&format!("(${:04X})=", watch.addr));
            }
            if watch.size == 1 {
                line.push_str(&format!("${:02X}", emu.ram_peek(watch.addr)));
            } else {
                line.push_str(&format!("${:04X}", emu.ram_peek16(watch.addr)));
            }
        }
        println!("{line}");

        None
    }

    /// Collect-mode body: track self-modification and branch targets.
    fn collect_data<M: MemoryBus>(&mut self, emu: &Emu6502<M>, pc: u16) -> Option<StopReason> {
        let inst = decode_inst(pc, emu.ram_peek3(pc));
        let regs = emu.regs();
        let ea = effective_address(emu.memory(), &regs, inst.mode, inst.operand);

        if self.cur_mem_written.get(pc) {
            // Executing a byte modified in the current generation: snapshot
            // the layer before it is overwritten further. The triggering
            // instruction belongs to the snapshot and to the new layer's
            // tracking, so it is marked on both sides of the rotation.
            self.cur_mem_exec
                .set_range(pc as u32, pc as u32 + inst.size as u32);
            self.new_generation(emu, regs);
            self.cur_mem_exec
                .set_range(pc as u32, pc as u32 + inst.size as u32);
        } else if self.prev_mem_written.get(pc) {
            // Executing something written by the previous generation; record
            // the range of the entire instruction.
            self.cur_mem_exec
                .set_range(pc as u32, pc as u32 + inst.size as u32);
        }

        if inst.is_branch() {
            if let Some(target) = ea {
                self.branch_targets.insert(target);
            }
            if self.limit != 0 && self.icount >= self.limit {
                return Some(StopReason::StopRequested);
            }
            self.icount += 1;
        } else if inst.writes_memory() {
            if let Some(addr) = ea {
                self.cur_mem_written.set(addr, true);
            }
        }
        None
    }

    /// Rotates generations: snapshots the executed runs of the outgoing
    /// layer out of RAM, then shifts the written-bitsets one generation
    /// back.
    fn new_generation<M: MemoryBus>(&mut self, emu: &Emu6502<M>, regs: Regs) {
        let mut gen = Generation {
            regs,
            ranges: Vec::new(),
        };

        let mut from = 0u32;
        while let Some(start) = self.cur_mem_exec.find_set_bit(from) {
            let end = self
                .cur_mem_exec
                .find_clear_bit(start + 1)
                .unwrap_or(AddrSet::BITS);
            let bytes = (start..end).map(|a| emu.ram_peek(a as u16)).collect();
            gen.ranges.push((start as u16, bytes));
            if end == AddrSet::BITS {
                break;
            }
            from = end + 1;
        }

        eprintln!("Saved {} bytes to previous generation", gen.byte_count());
        self.generations.push(gen);

        self.cur_mem_exec.clear_all();
        std::mem::swap(&mut self.prev_mem_written, &mut self.cur_mem_written);
        self.cur_mem_written.clear_all();
    }
}

impl Default for DebugState {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MemoryBus> DebugHook<M> for DebugState {
    fn before_instruction(&mut self, emu: &Emu6502<M>, pc: u16) -> Option<StopReason> {
        self.debug_state(emu, pc)
    }
}
