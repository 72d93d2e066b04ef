//! FOOL: semantic analysis and stack-machine code generation.
//!
//! This crate ties the workspace together:
//!
//! - [`fool_ast`]: the arena-allocated tree and [`AstBuilder`]
//! - [`fool_compiler`]: the passes and the code generator
//! - [`fool_core`]: spans, node ids and the error hierarchy
//!
//! ```
//! use fool::prelude::*;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let sum = b.binary(b.int(2, 1), BinaryOp::Add, b.int(3, 1), 1);
//! let program = b.bare(b.binary(sum, BinaryOp::Mul, b.int(4, 1), 1), 1);
//!
//! let result = fool::compile(&program, CompilerConfig::default());
//! assert_eq!(result.program_type, Some(Type::Int));
//! assert!(result.bytecode.is_some());
//! ```

pub use fool_ast;
pub use fool_compiler;
pub use fool_core;

pub use bumpalo::Bump;
pub use fool_ast::AstBuilder;
pub use fool_compiler::{CompilationResult, CompilationSession, Compiler, CompilerConfig};

use fool_ast::Program;

pub mod prelude {
    pub use bumpalo::Bump;
    pub use fool_ast::{AstBuilder, BinaryOp, Decl, Expr, Program, TypeExpr};
    pub use fool_compiler::bytecode::{Bytecode, Instruction, Label, LabelKind, Operand};
    pub use fool_compiler::{
        CompilationResult, CompilationSession, Compiler, CompilerConfig, DEFAULT_MEMORY_SIZE,
        Type,
    };
    pub use fool_core::{BindingError, CompilationError, DeclKind, Span, TypeError};
}

/// Compile `program` in a fresh session.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile(program: &Program<'_>, config: CompilerConfig) -> CompilationResult {
    let mut session = CompilationSession::new(config);
    let result = Compiler::compile(program, &mut session);
    log::debug!(
        "compiled program: {} errors, {} lines of code",
        result.error_count(),
        result.bytecode.as_ref().map_or(0, |code| code.len())
    );
    result
}
