//! Abstract Syntax Tree (AST) for FOOL.
//!
//! This crate provides:
//! - AST node definitions for programs, declarations, expressions and type
//!   annotations, including the object-oriented extensions
//! - [`AstBuilder`], the interface an external parser uses to build trees
//!
//! All nodes are allocated in a [`bumpalo::Bump`] arena and remain valid for
//! the lifetime of the arena. Trees are never mutated once built: the
//! semantic passes record what they learn in side tables keyed by
//! [`NodeId`].
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use fool_ast::{AstBuilder, BinaryOp};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//!
//! // let var x:int = 2; in x + 3;
//! let x = b.var_decl("x", b.int_type(1), b.int(2, 1), 1);
//! let body = b.binary(b.ident("x", 2), BinaryOp::Add, b.int(3, 2), 2);
//! let program = b.let_in(&[x], body, 1);
//!
//! assert_eq!(program.declarations().len(), 1);
//! ```

mod builder;
pub mod decl;
pub mod expr;
pub mod ops;
pub mod types;

pub use builder::AstBuilder;
pub use decl::*;
pub use expr::*;
pub use ops::*;
pub use types::*;

use fool_core::{NodeId, Span};

/// A name together with where it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// The root of a FOOL tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Program<'ast> {
    /// `let <declarations> in <body>;`
    LetIn {
        id: NodeId,
        declarations: &'ast [Decl<'ast>],
        body: Expr<'ast>,
        span: Span,
    },
    /// A program consisting of a single expression.
    Bare {
        id: NodeId,
        body: Expr<'ast>,
        span: Span,
    },
}

impl<'ast> Program<'ast> {
    /// Get the node id of the root.
    pub fn id(&self) -> NodeId {
        match self {
            Self::LetIn { id, .. } | Self::Bare { id, .. } => *id,
        }
    }

    /// Top-level declarations; empty for a bare program.
    pub fn declarations(&self) -> &'ast [Decl<'ast>] {
        match self {
            Self::LetIn { declarations, .. } => declarations,
            Self::Bare { .. } => &[],
        }
    }

    /// The main expression.
    pub fn body(&self) -> Expr<'ast> {
        match self {
            Self::LetIn { body, .. } | Self::Bare { body, .. } => *body,
        }
    }

    pub fn is_let_in(&self) -> bool {
        matches!(self, Self::LetIn { .. })
    }

    pub fn span(&self) -> Span {
        match self {
            Self::LetIn { span, .. } | Self::Bare { span, .. } => *span,
        }
    }
}
