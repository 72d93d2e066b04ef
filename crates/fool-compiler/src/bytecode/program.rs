//! Generated program text.

use std::fmt;

use rustc_hash::FxHashMap;

use super::{Instruction, Label};

/// The complete output of code generation: the main code, `halt`, then
/// every function and method body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bytecode {
    code: Vec<Instruction>,
}

impl Bytecode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_instructions(code: Vec<Instruction>) -> Self {
        Self { code }
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.code.push(instruction);
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.code
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.code.iter()
    }

    /// Number of lines, labels included.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Line index of each label definition.
    pub fn label_lines(&self) -> FxHashMap<Label, usize> {
        self.code
            .iter()
            .enumerate()
            .filter_map(|(line, instr)| match instr {
                Instruction::Label(label) => Some((*label, line)),
                _ => None,
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Bytecode {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.code.iter()
    }
}

impl fmt::Display for Bytecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instr) in self.code.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{instr}")?;
        }
        Ok(())
    }
}
