//! Instruction model for the target stack machine.
//!
//! - [`Instruction`] - one stack-machine instruction or label
//! - [`Label`] - a symbolic code address
//! - [`Bytecode`] - a complete generated program

mod instruction;
mod program;

pub use instruction::{Instruction, Label, LabelKind, Operand};
pub use program::Bytecode;
