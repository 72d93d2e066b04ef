//! Stack-machine instructions.
//!
//! One variant per mnemonic understood by the target interpreter, plus
//! [`Instruction::Label`] which marks a jump target and occupies no code
//! address. `Display` renders the interpreter's text format:
//!
//! ```text
//! push 5
//! beq label3
//! function0:
//! ```

use std::fmt;

// ============================================================================
// Labels
// ============================================================================

/// Which namespace a label was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    /// Control flow inside an expression (`labelN`).
    Branch,
    /// Entry point of a function or method body (`functionN`).
    Function,
}

/// A symbolic code address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    kind: LabelKind,
    index: u32,
}

impl Label {
    pub fn new(kind: LabelKind, index: u32) -> Self {
        Self { kind, index }
    }

    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LabelKind::Branch => write!(f, "label{}", self.index),
            LabelKind::Function => write!(f, "function{}", self.index),
        }
    }
}

/// Operand of `push`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Int(i32),
    /// Resolved to a code address by the interpreter's assembler.
    Label(Label),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(value) => write!(f, "{value}"),
            Operand::Label(label) => write!(f, "{label}"),
        }
    }
}

// ============================================================================
// Instructions
// ============================================================================

/// A single stack-machine instruction.
///
/// Binary operators pop the right operand, then the left, and push the
/// result. `fp`, `ra`, `tm` and `hp` are the frame pointer, return address,
/// temporary and heap pointer registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    // =========================================================================
    // Stack
    // =========================================================================
    /// Push an immediate or a code address.
    Push(Operand),
    /// Discard the top of the stack.
    Pop,

    // =========================================================================
    // Arithmetic
    // =========================================================================
    Add,
    Sub,
    Mult,
    Div,

    // =========================================================================
    // Memory
    // =========================================================================
    /// Pop an address, pop a value, store the value at the address.
    Sw,
    /// Replace the address on top of the stack with the word it points to.
    Lw,

    // =========================================================================
    // Control flow
    // =========================================================================
    /// Unconditional branch.
    B(Label),
    /// Pop two values; branch if they are equal.
    Beq(Label),
    /// Pop right, pop left; branch if left <= right.
    Bleq(Label),
    /// Pop an address, save the next address in `ra`, jump.
    Js,

    // =========================================================================
    // Registers
    // =========================================================================
    /// Push `ra`.
    Lra,
    /// Pop into `ra`.
    Sra,
    /// Push `tm`.
    Ltm,
    /// Pop into `tm`.
    Stm,
    /// Push `fp`.
    Lfp,
    /// Pop into `fp`.
    Sfp,
    /// Copy the stack pointer into `fp`.
    Cfp,
    /// Push `hp`.
    Lhp,
    /// Pop into `hp`.
    Shp,

    // =========================================================================
    // Misc
    // =========================================================================
    /// Print the top of the stack without popping it.
    Print,
    Halt,
    /// Jump target; not an instruction of its own.
    Label(Label),
}

impl Instruction {
    /// Push an integer immediate.
    pub fn push(value: i32) -> Self {
        Instruction::Push(Operand::Int(value))
    }

    /// Push the code address of `label`.
    pub fn push_label(label: Label) -> Self {
        Instruction::Push(Operand::Label(label))
    }

    /// The mnemonic of this instruction.
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Push(_) => "push",
            Instruction::Pop => "pop",
            Instruction::Add => "add",
            Instruction::Sub => "sub",
            Instruction::Mult => "mult",
            Instruction::Div => "div",
            Instruction::Sw => "sw",
            Instruction::Lw => "lw",
            Instruction::B(_) => "b",
            Instruction::Beq(_) => "beq",
            Instruction::Bleq(_) => "bleq",
            Instruction::Js => "js",
            Instruction::Lra => "lra",
            Instruction::Sra => "sra",
            Instruction::Ltm => "ltm",
            Instruction::Stm => "stm",
            Instruction::Lfp => "lfp",
            Instruction::Sfp => "sfp",
            Instruction::Cfp => "cfp",
            Instruction::Lhp => "lhp",
            Instruction::Shp => "shp",
            Instruction::Print => "print",
            Instruction::Halt => "halt",
            Instruction::Label(_) => "label",
        }
    }

    /// Branch target, if this is a branch.
    pub fn target(&self) -> Option<Label> {
        match self {
            Instruction::B(label) | Instruction::Beq(label) | Instruction::Bleq(label) => {
                Some(*label)
            }
            _ => None,
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, Instruction::Label(_))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push(operand) => write!(f, "push {operand}"),
            Instruction::B(label) | Instruction::Beq(label) | Instruction::Bleq(label) => {
                write!(f, "{} {label}", self.name())
            }
            Instruction::Label(label) => write!(f, "{label}:"),
            _ => f.write_str(self.name()),
        }
    }
}
