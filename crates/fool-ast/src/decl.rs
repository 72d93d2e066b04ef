//! Declaration AST nodes for FOOL.
//!
//! Provides nodes for:
//! - Functions and their parameters
//! - Variables
//! - Classes with their fields and methods

use fool_core::{NodeId, Span};

use crate::{Expr, Ident, TypeExpr};

/// A declaration in a `let` block or a function body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decl<'ast> {
    /// Function declaration
    Fun(&'ast FunDecl<'ast>),
    /// Variable declaration
    Var(&'ast VarDecl<'ast>),
    /// Class declaration
    Class(&'ast ClassDecl<'ast>),
}

impl<'ast> Decl<'ast> {
    /// Get the node id of this declaration.
    pub fn id(&self) -> NodeId {
        match self {
            Self::Fun(d) => d.id,
            Self::Var(d) => d.id,
            Self::Class(d) => d.id,
        }
    }

    /// Get the declared name.
    pub fn name(&self) -> Ident<'ast> {
        match self {
            Self::Fun(d) => d.name,
            Self::Var(d) => d.name,
            Self::Class(d) => d.name,
        }
    }

    /// Get the span of this declaration.
    pub fn span(&self) -> Span {
        match self {
            Self::Fun(d) => d.span,
            Self::Var(d) => d.span,
            Self::Class(d) => d.span,
        }
    }
}

/// A function declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunDecl<'ast> {
    pub id: NodeId,
    /// Function name
    pub name: Ident<'ast>,
    /// Declared return type
    pub return_type: TypeExpr<'ast>,
    /// Parameters
    pub params: &'ast [ParamDecl<'ast>],
    /// Nested declarations evaluated before the body
    pub declarations: &'ast [Decl<'ast>],
    /// Body expression
    pub body: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A function or method parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}

/// A variable declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    /// Declared type
    pub ty: TypeExpr<'ast>,
    /// Initializer; cannot refer to the variable itself
    pub init: Expr<'ast>,
    pub span: Span,
}

/// A class declaration with optional single inheritance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassDecl<'ast> {
    pub id: NodeId,
    /// Class name
    pub name: Ident<'ast>,
    /// Superclass name, if the class inherits
    pub superclass: Option<Ident<'ast>>,
    /// Fields in declaration order; also the constructor parameters
    pub fields: &'ast [FieldDecl<'ast>],
    /// Methods in declaration order
    pub methods: &'ast [MethodDecl<'ast>],
    /// Source location
    pub span: Span,
}

impl<'ast> ClassDecl<'ast> {
    /// Whether this class extends another.
    pub fn is_inheriting(&self) -> bool {
        self.superclass.is_some()
    }
}

/// A field of a class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}

/// A method of a class. Shaped exactly like a function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub return_type: TypeExpr<'ast>,
    pub params: &'ast [ParamDecl<'ast>],
    pub declarations: &'ast [Decl<'ast>],
    pub body: Expr<'ast>,
    pub span: Span,
}
