//! Compiler passes.
//!
//! - [`SymbolTablePass`]: resolve names, assign offsets, lay out classes
//! - [`TypeCheckPass`]: infer expression types and validate declarations
//!
//! Code generation lives in [`crate::codegen`] since, unlike these passes,
//! it stops at the first problem.

mod symbol_table;
mod type_check;

pub use symbol_table::{SymbolTableOutput, SymbolTablePass};
pub use type_check::{TypeCheckOutput, TypeCheckPass};
