//! Core types shared by the FOOL AST and compiler crates.
//!
//! - [`Span`]: source locations attached to every node and diagnostic
//! - [`NodeId`]: stable node identity used to key semantic side tables
//! - [`BindingError`], [`TypeError`], [`CompilationError`]: the error hierarchy

mod error;
mod ids;
mod span;

pub use error::{BindingError, CompilationError, DeclKind, TypeError};
pub use ids::NodeId;
pub use span::Span;
