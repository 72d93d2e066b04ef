//! Fresh label allocation.
//!
//! Branch labels and function labels are numbered independently, each
//! starting at zero.

use crate::bytecode::{Label, LabelKind};

/// Hands out unique labels for one compilation.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    next_branch: u32,
    next_function: u32,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh `labelN`.
    pub fn fresh_label(&mut self) -> Label {
        let label = Label::new(LabelKind::Branch, self.next_branch);
        self.next_branch += 1;
        label
    }

    /// A fresh `functionN`.
    pub fn fresh_function_label(&mut self) -> Label {
        let label = Label::new(LabelKind::Function, self.next_function);
        self.next_function += 1;
        label
    }
}
