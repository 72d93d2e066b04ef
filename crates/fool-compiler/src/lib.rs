//! FOOL Compiler
//!
//! Semantic analysis and code generation for FOOL programs.
//!
//! ## Architecture
//!
//! - **Pass 1 (Symbol table)**: resolve every name, assign frame offsets and
//!   lay out classes
//! - **Pass 2 (Type check)**: infer expression types and validate
//!   declarations, overrides and calls
//! - **Code generation**: lower the checked program to stack-machine text
//!
//! The first two passes collect every error they find. Code generation runs
//! only when both came back clean.
//!
//! ## Modules
//!
//! - [`annotations`]: Side tables the symbol-table pass attaches to the tree
//! - [`bytecode`]: Stack-machine instructions and generated programs
//! - [`codegen`]: The code generator
//! - [`context`]: Compiler configuration and per-compilation state
//! - [`emit`]: Instruction emitter and label allocation
//! - [`passes`]: Symbol-table and type-check passes
//! - [`scope`]: Lexical scope stack
//! - [`type_rels`]: Subtyping over primitive, functional and class types
//! - [`type_resolver`]: Type resolution from source annotations
//! - [`types`]: Semantic types

pub mod annotations;
pub mod bytecode;
pub mod codegen;
pub mod context;
pub mod emit;
pub mod passes;
pub mod scope;
pub mod type_rels;
pub mod type_resolver;
pub mod types;

pub use annotations::{Annotations, EntryId, StEntry};
pub use bytecode::{Bytecode, Instruction, Label};
pub use codegen::CodeGenerator;
pub use context::{CompilationSession, CompilerConfig, DEFAULT_MEMORY_SIZE};
pub use emit::CodeEmitter;
pub use passes::{SymbolTableOutput, SymbolTablePass, TypeCheckOutput, TypeCheckPass};
pub use type_rels::TypeRelations;
pub use types::{ArrowType, ClassType, Type};

// Re-export the error types from core for convenience
pub use fool_core::{BindingError, CompilationError, TypeError};

use fool_ast::Program;
use fool_core::NodeId;
use rustc_hash::FxHashMap;

/// Result of compilation.
#[derive(Debug, Default)]
pub struct CompilationResult {
    /// Errors from the symbol-table pass.
    pub binding_errors: Vec<BindingError>,
    /// Errors from the type-check pass.
    pub type_errors: Vec<TypeError>,
    /// Set if code generation hit a missing annotation.
    pub internal_error: Option<CompilationError>,
    /// Type of the program body, if it could be determined.
    pub program_type: Option<Type>,
    /// Type of every checked expression.
    pub types: FxHashMap<NodeId, Type>,
    /// Generated code; present only for an error-free program.
    pub bytecode: Option<Bytecode>,
}

impl CompilationResult {
    /// Check if compilation succeeded (no errors).
    pub fn is_success(&self) -> bool {
        self.error_count() == 0 && self.bytecode.is_some()
    }

    /// Total number of errors of every kind.
    pub fn error_count(&self) -> usize {
        self.binding_errors.len() + self.type_errors.len() + usize::from(self.internal_error.is_some())
    }

    /// Every error, binding errors first.
    pub fn errors(&self) -> Vec<CompilationError> {
        self.binding_errors
            .iter()
            .cloned()
            .map(CompilationError::from)
            .chain(self.type_errors.iter().cloned().map(CompilationError::from))
            .chain(self.internal_error.iter().cloned())
            .collect()
    }
}

/// The main compiler entry point.
pub struct Compiler;

impl Compiler {
    /// Compile a program.
    ///
    /// Classes declared by the program are registered in the session's type
    /// relations; call [`CompilationSession::reset`] before compiling an
    /// unrelated program with the same session.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(program: &Program<'_>, session: &mut CompilationSession) -> CompilationResult {
        let SymbolTableOutput {
            annotations,
            errors: binding_errors,
        } = SymbolTablePass::new().run(program);
        if !binding_errors.is_empty() {
            log::info!("symbol table: {} errors", binding_errors.len());
        }

        let TypeCheckOutput {
            program_type,
            types,
            errors: type_errors,
        } = TypeCheckPass::new(session.type_rels_mut(), &annotations).run(program);
        if !type_errors.is_empty() {
            log::info!("type check: {} errors", type_errors.len());
        }

        let mut result = CompilationResult {
            binding_errors,
            type_errors,
            program_type,
            types,
            ..CompilationResult::default()
        };
        if result.error_count() > 0 {
            return result;
        }

        match CodeGenerator::new(&annotations, session.config()).generate(program) {
            Ok(bytecode) => result.bytecode = Some(bytecode),
            Err(error) => {
                log::error!("{error}");
                result.internal_error = Some(error);
            }
        }
        result
    }
}
