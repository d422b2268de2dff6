//! # Code Discovery
//!
//! Drives the whole translation pipeline: load a DOS 3.3 payload into a
//! 64 KiB image, trace it under the self-modification collector to harvest
//! dynamic branch targets and code generations, then statically discover
//! reachable code in the final RAM image and shape it into a CFG.
//!
//! Discovery is a classic worklist scan: seed with the entry PC and every
//! branch target, decode sequentially until a terminator, classify each
//! decoded byte as code, and enqueue the targets the scan exposes. Bytes
//! never reached stay classified as data. The code stream is then split at
//! every branch target and wired into [`Function`]s of [`BasicBlock`]s.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::bitset::AddrSet;
use crate::cpu::{DebugHook, Emu6502, StopReason};
use crate::debug::{DebugState, Generation};
use crate::disassembler::decoder::decode_inst;
use crate::disassembler::{Inst, ThreeBytes};
use crate::ir::{BlockId, Function};
use crate::memory::{FlatMemory, MemoryBus};
use crate::opcodes::Mnemonic;

/// Default instruction budget for the tracing run.
const DEFAULT_TRACE_LIMIT: u64 = 100_000;

/// Stops the tracing run as soon as the PC escapes the load image, so a
/// program that returns to DOS or wanders into unloaded memory ends the
/// trace instead of executing zeroes.
struct ImageBoundHook<'a> {
    debug: &'a mut DebugState,
    lo: u16,
    hi: u32,
}

impl<M: MemoryBus> DebugHook<M> for ImageBoundHook<'_> {
    fn before_instruction(&mut self, emu: &Emu6502<M>, pc: u16) -> Option<StopReason> {
        if (pc as u32) < self.lo as u32 || pc as u32 >= self.hi {
            return Some(StopReason::StopRequested);
        }
        self.debug.before_instruction(emu, pc)
    }
}

/// The translator pipeline: image, trace results, and the recovered CFG.
pub struct Disas {
    start: u16,
    payload: Vec<u8>,
    trace_limit: u64,
    /// Final RAM image after the tracing run.
    ram: Box<[u8; 65536]>,
    /// Dynamic branch targets harvested by the collector.
    branch_targets: BTreeSet<u16>,
    /// Preserved self-modification layers.
    generations: Vec<Generation>,
    /// Bytes of the load image classified as code.
    code: AddrSet,
    /// Function entry addresses, lowest first; index parallels `funcs`.
    func_entries: Vec<u16>,
    funcs: Vec<Function>,
}

impl Disas {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self {
            start: 0,
            payload: Vec::new(),
            trace_limit: DEFAULT_TRACE_LIMIT,
            ram: Box::new([0; 65536]),
            branch_targets: BTreeSet::new(),
            generations: Vec::new(),
            code: AddrSet::new(),
            func_entries: Vec::new(),
            funcs: Vec::new(),
        }
    }

    /// Loads the payload at its load address. The DOS 3.3 header validation
    /// guarantees `start + bytes.len() <= 65536`.
    pub fn load_binary(&mut self, start: u16, bytes: &[u8]) {
        self.start = start;
        self.payload = bytes.to_vec();
    }

    /// Overrides the tracing-run instruction budget. 0 disables tracing.
    pub fn set_trace_limit(&mut self, limit: u64) {
        self.trace_limit = limit;
    }

    /// Runs the pipeline from `entry`: trace, then discover, then build the
    /// CFG. The results are available through [`Disas::functions`] and the
    /// printers.
    pub fn run(&mut self, entry: u16) {
        self.trace(entry);
        let seeds = self.discover(entry);
        self.build_functions(entry, &seeds);
    }

    /// The recovered functions; the function containing the entry PC comes
    /// first.
    pub fn functions(&self) -> &[Function] {
        &self.funcs
    }

    /// Entry addresses parallel to [`Disas::functions`].
    pub fn function_entries(&self) -> &[u16] {
        &self.func_entries
    }

    /// Branch targets collected by the tracing run.
    pub fn branch_targets(&self) -> &BTreeSet<u16> {
        &self.branch_targets
    }

    /// Self-modification generations preserved by the tracing run.
    pub fn generations(&self) -> &[Generation] {
        &self.generations
    }

    /// Load address of the image.
    pub fn image_start(&self) -> u16 {
        self.start
    }

    /// One past the last loaded address.
    pub fn image_end(&self) -> u32 {
        self.start as u32 + self.payload.len() as u32
    }

    /// Final RAM image (after tracing).
    pub fn ram(&self) -> &[u8; 65536] {
        &self.ram
    }

    /// The pristine payload as loaded, before any tracing ran.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// True when the byte at `addr` was classified as code.
    pub fn is_code(&self, addr: u16) -> bool {
        self.code.get(addr)
    }

    fn in_image(&self, addr: u32) -> bool {
        addr >= self.start as u32 && addr < self.image_end()
    }

    /// Runs the program under the collector to harvest branch targets,
    /// generations and the final RAM image.
    fn trace(&mut self, entry: u16) {
        let mut memory = FlatMemory::new();
        memory.load(self.start, &self.payload);

        if self.trace_limit == 0 {
            self.ram = Box::new(*memory.as_slice());
            return;
        }

        let mut emu = Emu6502::new(memory);
        emu.regs_mut().pc = entry;

        let mut debug = DebugState::new();
        debug.set_collect(&emu, true);
        debug.set_limit(self.trace_limit);

        let mut hook = ImageBoundHook {
            debug: &mut debug,
            lo: self.start,
            hi: self.start as u32 + self.payload.len() as u32,
        };
        emu.run(&mut hook);

        self.branch_targets = debug.branch_targets().clone();
        self.generations = debug.generations().to_vec();
        self.ram = Box::new(*emu.memory().as_slice());
    }

    fn peek3(&self, pc: u16) -> ThreeBytes {
        [
            self.ram[pc as usize],
            self.ram[pc.wrapping_add(1) as usize],
            self.ram[pc.wrapping_add(2) as usize],
        ]
    }

    /// Worklist scan over the final RAM image. Returns the discovery seeds:
    /// instruction starts, block starts and function entries.
    fn discover(&mut self, entry: u16) -> DiscoverySeeds {
        let mut seeds = DiscoverySeeds::default();
        self.code.clear_all();

        let mut worklist: VecDeque<u16> = VecDeque::new();
        worklist.push_back(entry);
        seeds.block_starts.insert(entry);
        seeds.func_entries.insert(entry);
        for &target in &self.branch_targets {
            if self.in_image(target as u32) {
                worklist.push_back(target);
                seeds.block_starts.insert(target);
            }
        }

        while let Some(mut pc) = worklist.pop_front() {
            loop {
                if !self.in_image(pc as u32) {
                    break;
                }
                if seeds.inst_starts.get(pc) {
                    // Already decoded from here on.
                    break;
                }
                let inst = decode_inst(pc, self.peek3(pc));
                if inst.kind == Mnemonic::Invalid {
                    // The byte still marks an instruction start so the
                    // stream splits here; it stays classified as data.
                    break;
                }
                seeds.inst_starts.set(pc, true);
                self.code
                    .set_range(pc as u32, pc as u32 + inst.size as u32);

                let next = pc.wrapping_add(inst.size as u16);
                match inst.kind {
                    // Conditional branches: both edges live.
                    Mnemonic::Bcc
                    | Mnemonic::Bcs
                    | Mnemonic::Beq
                    | Mnemonic::Bmi
                    | Mnemonic::Bne
                    | Mnemonic::Bpl
                    | Mnemonic::Bvc
                    | Mnemonic::Bvs => {
                        seeds.enqueue_target(&mut worklist, inst.operand, self.image_bounds());
                        seeds.block_starts.insert(next);
                        worklist.push_back(next);
                        break;
                    }
                    Mnemonic::Jmp => {
                        // The indirect form has no static target.
                        if inst.mode == crate::addressing::AddressingMode::Absolute {
                            seeds.enqueue_target(&mut worklist, inst.operand, self.image_bounds());
                        }
                        break;
                    }
                    Mnemonic::Jsr => {
                        // Calls fall through; the target starts a function.
                        if self.in_image(inst.operand as u32) {
                            seeds.func_entries.insert(inst.operand);
                        }
                        seeds.enqueue_target(&mut worklist, inst.operand, self.image_bounds());
                        pc = next;
                    }
                    Mnemonic::Rts | Mnemonic::Rti | Mnemonic::Brk => break,
                    _ => pc = next,
                }
            }
        }

        seeds
    }

    fn image_bounds(&self) -> (u16, u32) {
        (self.start, self.image_end())
    }

    /// Splits the decoded stream into basic blocks and groups them into
    /// functions, claiming blocks breadth-first from each function entry.
    fn build_functions(&mut self, entry: u16, seeds: &DiscoverySeeds) {
        // Walk instruction starts in address order, cutting blocks at block
        // starts and after terminators.
        let mut blocks: Vec<(u16, Vec<Inst>)> = Vec::new();
        let mut current: Option<(u16, Vec<Inst>)> = None;
        let mut expected_next: u32 = u32::MAX;

        let mut from = self.start as u32;
        while let Some(pc32) = seeds.inst_starts.find_set_bit(from) {
            if pc32 >= self.image_end() {
                break;
            }
            let pc = pc32 as u16;
            from = pc32 + 1;

            let inst = decode_inst(pc, self.peek3(pc));
            let starts_block = seeds.block_starts.contains(&pc) || pc32 != expected_next;
            if starts_block || current.is_none() {
                if let Some(done) = current.take() {
                    blocks.push(done);
                }
                current = Some((pc, Vec::new()));
            }
            if let Some(block) = current.as_mut() {
                block.1.push(inst);
            }
            expected_next = pc32 + inst.size as u32;

            if block_terminator(&inst) {
                if let Some(done) = current.take() {
                    blocks.push(done);
                }
                expected_next = u32::MAX;
            }
        }
        if let Some(done) = current.take() {
            blocks.push(done);
        }

        // Global address -> block index map, then the edge lists.
        let index_of: BTreeMap<u16, usize> = blocks
            .iter()
            .enumerate()
            .map(|(i, (addr, _))| (*addr, i))
            .collect();

        let mut succs: Vec<Vec<usize>> = vec![Vec::new(); blocks.len()];
        for (i, (addr, insts)) in blocks.iter().enumerate() {
            let Some(last) = insts.last() else { continue };
            let end = addr.wrapping_add(insts.iter().map(|inst| inst.size as u16).sum::<u16>());
            let mut add = |succ_list: &mut Vec<usize>, target: u16| {
                if let Some(&j) = index_of.get(&target) {
                    if !succ_list.contains(&j) {
                        succ_list.push(j);
                    }
                }
            };
            match last.kind {
                Mnemonic::Bcc
                | Mnemonic::Bcs
                | Mnemonic::Beq
                | Mnemonic::Bmi
                | Mnemonic::Bne
                | Mnemonic::Bpl
                | Mnemonic::Bvc
                | Mnemonic::Bvs => {
                    add(&mut succs[i], last.operand);
                    add(&mut succs[i], end);
                }
                Mnemonic::Jmp => {
                    if last.mode == crate::addressing::AddressingMode::Absolute {
                        add(&mut succs[i], last.operand);
                    }
                }
                Mnemonic::Rts | Mnemonic::Rti | Mnemonic::Brk | Mnemonic::Invalid => {}
                // Fallthrough into the next block (split by an incoming
                // branch target or a call).
                _ => add(&mut succs[i], end),
            }
        }

        // Claim blocks into functions, entry function first.
        let mut entries: Vec<u16> = Vec::new();
        entries.push(entry);
        entries.extend(seeds.func_entries.iter().copied().filter(|&e| e != entry));

        let mut claimed: Vec<bool> = vec![false; blocks.len()];
        self.funcs.clear();
        self.func_entries.clear();

        for &func_entry in &entries {
            let Some(&root) = index_of.get(&func_entry) else {
                continue;
            };
            if claimed[root] {
                continue;
            }
            self.claim_function(func_entry, root, &blocks, &succs, &mut claimed);
        }

        // Anything still unclaimed (e.g. only reachable through an indirect
        // jump observed at trace time) becomes its own function.
        for i in 0..blocks.len() {
            if !claimed[i] {
                self.claim_function(blocks[i].0, i, &blocks, &succs, &mut claimed);
            }
        }
    }

    /// Breadth-first claims unclaimed blocks reachable from `root` and
    /// wires the intra-function edges.
    fn claim_function(
        &mut self,
        entry_addr: u16,
        root: usize,
        blocks: &[(u16, Vec<Inst>)],
        succs: &[Vec<usize>],
        claimed: &mut [bool],
    ) {
        let mut members: Vec<usize> = Vec::new();
        let mut queue = VecDeque::new();
        claimed[root] = true;
        queue.push_back(root);
        while let Some(i) = queue.pop_front() {
            members.push(i);
            for &j in &succs[i] {
                if !claimed[j] {
                    claimed[j] = true;
                    queue.push_back(j);
                }
            }
        }

        let mut func = Function::new(entry_addr);
        let mut local: BTreeMap<usize, BlockId> = BTreeMap::new();
        local.insert(root, func.entry());
        func.block_mut(func.entry()).insts = blocks[root].1.clone();
        for &i in &members {
            if i == root {
                continue;
            }
            let id = func.add_block(blocks[i].0);
            func.block_mut(id).insts = blocks[i].1.clone();
            local.insert(i, id);
        }
        for &i in &members {
            for &j in &succs[i] {
                // Edges into other functions are call/return shaped and are
                // not part of this CFG.
                if let (Some(&from), Some(&to)) = (local.get(&i), local.get(&j)) {
                    func.add_edge(from, to);
                }
            }
        }

        self.func_entries.push(entry_addr);
        self.funcs.push(func);
    }
}

impl Default for Disas {
    fn default() -> Self {
        Self::new()
    }
}

/// True when `inst` ends a basic block.
fn block_terminator(inst: &Inst) -> bool {
    // Calls fall through into the same block.
    inst.is_branch() && inst.kind != Mnemonic::Jsr
}

/// Intermediate discovery results shared between the scan and the block
/// builder.
#[derive(Default)]
struct DiscoverySeeds {
    inst_starts: AddrSet,
    block_starts: BTreeSet<u16>,
    func_entries: BTreeSet<u16>,
}

impl DiscoverySeeds {
    /// Marks a control-transfer target as a block start and queues it for
    /// decoding when it lies inside the image.
    fn enqueue_target(&mut self, worklist: &mut VecDeque<u16>, target: u16, bounds: (u16, u32)) {
        let (lo, hi) = bounds;
        if (target as u32) >= lo as u32 && (target as u32) < hi {
            self.block_starts.insert(target);
            worklist.push_back(target);
        }
    }
}
