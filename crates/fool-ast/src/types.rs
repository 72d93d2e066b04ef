//! Type annotations as written in source.
//!
//! These are syntax only. Semantic types live in the compiler crate and are
//! produced from these by type resolution.

use fool_core::Span;

use crate::Ident;

/// A type annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeExpr<'ast> {
    /// `int`
    Int(Span),
    /// `bool`
    Bool(Span),
    /// `(T1, ..., Tn) -> R`
    Arrow(&'ast ArrowTypeExpr<'ast>),
    /// A class name used as a reference type.
    Ref(Ident<'ast>),
}

impl<'ast> TypeExpr<'ast> {
    /// Get the span of this annotation.
    pub fn span(&self) -> Span {
        match self {
            Self::Int(span) | Self::Bool(span) => *span,
            Self::Arrow(arrow) => arrow.span,
            Self::Ref(ident) => ident.span,
        }
    }
}

/// A functional type annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowTypeExpr<'ast> {
    /// Parameter types in order
    pub params: &'ast [TypeExpr<'ast>],
    /// Return type
    pub ret: TypeExpr<'ast>,
    /// Source location
    pub span: Span,
}
