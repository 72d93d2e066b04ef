//! Instruction emitter for the FOOL code generator.
//!
//! The [`CodeEmitter`] appends instructions to the block being generated
//! and collects finished function bodies in a side buffer, which
//! [`CodeEmitter::finish`] places after the main code.
//!
//! # Example
//!
//! ```
//! use fool_compiler::bytecode::Instruction;
//! use fool_compiler::emit::CodeEmitter;
//!
//! let mut emitter = CodeEmitter::new();
//! emitter.emit_push(2);
//! emitter.emit_push(3);
//! emitter.emit(Instruction::Add);
//! emitter.emit(Instruction::Halt);
//!
//! assert_eq!(emitter.finish().to_string(), "push 2\npush 3\nadd\nhalt");
//! ```

mod labels;

pub use labels::LabelAllocator;

use crate::bytecode::{Bytecode, Instruction, Label};

/// Emits stack-machine instructions.
#[derive(Debug, Default)]
pub struct CodeEmitter {
    /// The block currently being generated
    code: Vec<Instruction>,

    /// Finished function and method bodies, in completion order
    functions: Vec<Instruction>,

    labels: LabelAllocator,
}

impl CodeEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    pub fn emit(&mut self, instr: Instruction) {
        self.code.push(instr);
    }

    /// Emit `instr` `count` times.
    pub fn emit_repeated(&mut self, instr: Instruction, count: usize) {
        self.code.extend(std::iter::repeat_n(instr, count));
    }

    pub fn emit_push(&mut self, value: i32) {
        self.emit(Instruction::push(value));
    }

    pub fn emit_push_label(&mut self, label: Label) {
        self.emit(Instruction::push_label(label));
    }

    /// Define `label` at the current position.
    pub fn place_label(&mut self, label: Label) {
        self.emit(Instruction::Label(label));
    }

    /// Append a block produced by [`end_block`](Self::end_block).
    pub fn append(&mut self, block: Vec<Instruction>) {
        self.code.extend(block);
    }

    // ==========================================================================
    // Labels
    // ==========================================================================

    pub fn fresh_label(&mut self) -> Label {
        self.labels.fresh_label()
    }

    pub fn fresh_function_label(&mut self) -> Label {
        self.labels.fresh_function_label()
    }

    // ==========================================================================
    // Blocks
    // ==========================================================================

    /// Start generating into an empty block.
    ///
    /// Returns the enclosing block, to be handed back to
    /// [`end_block`](Self::end_block).
    #[must_use]
    pub fn begin_block(&mut self) -> Vec<Instruction> {
        std::mem::take(&mut self.code)
    }

    /// Finish the current block and resume the enclosing one.
    pub fn end_block(&mut self, enclosing: Vec<Instruction>) -> Vec<Instruction> {
        std::mem::replace(&mut self.code, enclosing)
    }

    /// Record a finished function body.
    pub fn add_function(&mut self, body: Vec<Instruction>) {
        self.functions.extend(body);
    }

    /// Number of instructions in the current block.
    pub fn current_len(&self) -> usize {
        self.code.len()
    }

    /// The main code followed by every function body.
    pub fn finish(mut self) -> Bytecode {
        self.code.append(&mut self.functions);
        Bytecode::from_instructions(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn functions_follow_main_code() {
        let mut emitter = CodeEmitter::new();
        emitter.emit_push(0);

        let outer = emitter.begin_block();
        let label = emitter.fresh_function_label();
        emitter.place_label(label);
        emitter.emit(Instruction::Js);
        let body = emitter.end_block(outer);
        emitter.add_function(body);

        emitter.emit_push_label(label);
        emitter.emit(Instruction::Halt);

        assert_eq!(
            emitter.finish().to_string(),
            "push 0\npush function0\nhalt\nfunction0:\njs"
        );
    }

    #[test]
    fn nested_blocks_restore_enclosing_code() {
        let mut emitter = CodeEmitter::new();
        emitter.emit(Instruction::Lfp);
        let outer = emitter.begin_block();
        assert_eq!(emitter.current_len(), 0);
        emitter.emit_repeated(Instruction::Pop, 3);
        let block = emitter.end_block(outer);
        assert_eq!(block, vec![Instruction::Pop; 3]);
        assert_eq!(emitter.current_len(), 1);
        emitter.append(block);
        assert_eq!(emitter.current_len(), 4);
    }

    #[test]
    fn fresh_labels_are_unique() {
        let mut emitter = CodeEmitter::new();
        let a = emitter.fresh_label();
        let b = emitter.fresh_label();
        assert_ne!(a, b);
    }
}
