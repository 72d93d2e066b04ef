//! A small interpreter for generated code.
//!
//! Labels are assembled to the index of the instruction that follows them.
//! The stack grows down from the top of memory and the heap grows up from
//! zero.

use fool::prelude::{Bytecode, Instruction, Label, Operand};
use rustc_hash::FxHashMap;

/// Upper bound on executed instructions.
const STEP_LIMIT: usize = 1_000_000;

#[derive(Debug, Clone, Copy)]
enum Op {
    Push(i32),
    Pop,
    Add,
    Sub,
    Mult,
    Div,
    Sw,
    Lw,
    B(usize),
    Beq(usize),
    Bleq(usize),
    Js,
    Lra,
    Sra,
    Ltm,
    Stm,
    Lfp,
    Sfp,
    Cfp,
    Lhp,
    Shp,
    Print,
    Halt,
}

/// What a run left behind.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Every value printed, in order.
    pub printed: Vec<i32>,
    /// The top of the stack at `halt`.
    pub top: Option<i32>,
    /// Number of words on the stack at `halt`.
    pub depth: usize,
    /// Number of executed instructions.
    pub steps: usize,
    /// Code addresses executed at least once.
    pub visited: Vec<bool>,
    /// Code address of each line of the listing (labels map to
    /// the next instruction).
    pub addresses: Vec<usize>,
}

impl Outcome {
    /// Whether the instruction on `line` of the listing ever ran.
    pub fn ran_line(&self, line: usize) -> bool {
        self.visited.get(self.addresses[line]).copied().unwrap_or(false)
    }
}

fn assemble(code: &Bytecode) -> (Vec<Op>, Vec<usize>) {
    let mut addresses = Vec::with_capacity(code.len());
    let mut labels = FxHashMap::default();
    let mut next = 0;
    for instr in code {
        addresses.push(next);
        match instr {
            Instruction::Label(label) => {
                labels.insert(*label, next);
            }
            _ => next += 1,
        }
    }

    let address = |label: Label| {
        *labels
            .get(&label)
            .unwrap_or_else(|| panic!("undefined label {label}"))
    };
    let ops = code
        .iter()
        .filter(|instr| !instr.is_label())
        .map(|instr| match *instr {
            Instruction::Push(Operand::Int(value)) => Op::Push(value),
            Instruction::Push(Operand::Label(label)) => Op::Push(address(label) as i32),
            Instruction::Pop => Op::Pop,
            Instruction::Add => Op::Add,
            Instruction::Sub => Op::Sub,
            Instruction::Mult => Op::Mult,
            Instruction::Div => Op::Div,
            Instruction::Sw => Op::Sw,
            Instruction::Lw => Op::Lw,
            Instruction::B(label) => Op::B(address(label)),
            Instruction::Beq(label) => Op::Beq(address(label)),
            Instruction::Bleq(label) => Op::Bleq(address(label)),
            Instruction::Js => Op::Js,
            Instruction::Lra => Op::Lra,
            Instruction::Sra => Op::Sra,
            Instruction::Ltm => Op::Ltm,
            Instruction::Stm => Op::Stm,
            Instruction::Lfp => Op::Lfp,
            Instruction::Sfp => Op::Sfp,
            Instruction::Cfp => Op::Cfp,
            Instruction::Lhp => Op::Lhp,
            Instruction::Shp => Op::Shp,
            Instruction::Print => Op::Print,
            Instruction::Halt => Op::Halt,
            Instruction::Label(_) => unreachable!("labels are filtered out"),
        })
        .collect();
    (ops, addresses)
}

struct Machine {
    memory: Vec<i32>,
    sp: usize,
    fp: i32,
    hp: i32,
    ra: i32,
    tm: i32,
}

impl Machine {
    fn slot(&self, address: i32) -> usize {
        usize::try_from(address)
            .ok()
            .filter(|a| *a < self.memory.len())
            .unwrap_or_else(|| panic!("address {address} out of memory"))
    }

    fn push(&mut self, value: i32) {
        self.sp = self.sp.checked_sub(1).expect("stack overflow");
        self.memory[self.sp] = value;
    }

    fn pop(&mut self) -> i32 {
        assert!(self.sp < self.memory.len(), "pop from empty stack");
        let value = self.memory[self.sp];
        self.sp += 1;
        value
    }

    fn top(&self) -> Option<i32> {
        self.memory.get(self.sp).copied()
    }
}

/// Execute `code` on a machine with `memory_size` words.
pub fn run(code: &Bytecode, memory_size: usize) -> Outcome {
    let (ops, addresses) = assemble(code);
    let mut m = Machine {
        memory: vec![0; memory_size],
        sp: memory_size,
        fp: memory_size as i32,
        hp: 0,
        ra: 0,
        tm: 0,
    };
    let mut outcome = Outcome {
        visited: vec![false; ops.len()],
        addresses,
        ..Outcome::default()
    };

    let mut ip = 0;
    loop {
        assert!(outcome.steps < STEP_LIMIT, "step limit exceeded");
        let op = *ops.get(ip).unwrap_or_else(|| panic!("ran off the code at {ip}"));
        outcome.visited[ip] = true;
        outcome.steps += 1;
        ip += 1;

        match op {
            Op::Push(value) => m.push(value),
            Op::Pop => {
                m.pop();
            }
            Op::Add | Op::Sub | Op::Mult | Op::Div => {
                let right = m.pop();
                let left = m.pop();
                m.push(match op {
                    Op::Add => left + right,
                    Op::Sub => left - right,
                    Op::Mult => left * right,
                    _ => left.checked_div(right).expect("division by zero"),
                });
            }
            Op::Sw => {
                let address = m.pop();
                let value = m.pop();
                let slot = m.slot(address);
                m.memory[slot] = value;
            }
            Op::Lw => {
                let address = m.pop();
                let value = m.memory[m.slot(address)];
                m.push(value);
            }
            Op::B(target) => ip = target,
            Op::Beq(target) => {
                let right = m.pop();
                let left = m.pop();
                if left == right {
                    ip = target;
                }
            }
            Op::Bleq(target) => {
                let right = m.pop();
                let left = m.pop();
                if left <= right {
                    ip = target;
                }
            }
            Op::Js => {
                let address = m.pop();
                m.ra = ip as i32;
                ip = usize::try_from(address).expect("negative code address");
            }
            Op::Lra => m.push(m.ra),
            Op::Sra => m.ra = m.pop(),
            Op::Ltm => m.push(m.tm),
            Op::Stm => m.tm = m.pop(),
            Op::Lfp => m.push(m.fp),
            Op::Sfp => m.fp = m.pop(),
            Op::Cfp => m.fp = m.sp as i32,
            Op::Lhp => m.push(m.hp),
            Op::Shp => m.hp = m.pop(),
            Op::Print => outcome.printed.push(m.top().expect("print on empty stack")),
            Op::Halt => {
                outcome.top = m.top();
                outcome.depth = memory_size - m.sp;
                return outcome;
            }
        }
    }
}
