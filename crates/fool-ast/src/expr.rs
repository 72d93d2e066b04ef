//! Expression AST nodes for FOOL.
//!
//! FOOL is expression-oriented: a program body, a function body and a
//! variable initializer are all single expressions.

use fool_core::{NodeId, Span};

use crate::{BinaryOp, Ident};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Integer literal
    Int(IntLit),
    /// Boolean literal
    Bool(BoolLit),
    /// `null`
    Null(NullLit),
    /// Variable, parameter or function identifier
    Ident(IdentExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// `!e`
    Not(&'ast NotExpr<'ast>),
    /// `if c then {a} else {b}`
    If(&'ast IfExpr<'ast>),
    /// `print(e)`
    Print(&'ast PrintExpr<'ast>),
    /// `f(args)`
    Call(&'ast CallExpr<'ast>),
    /// `new C(args)`
    New(&'ast NewExpr<'ast>),
    /// `obj.m(args)`
    MethodCall(&'ast MethodCallExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the node id of this expression.
    pub fn id(&self) -> NodeId {
        match self {
            Self::Int(e) => e.id,
            Self::Bool(e) => e.id,
            Self::Null(e) => e.id,
            Self::Ident(e) => e.id,
            Self::Binary(e) => e.id,
            Self::Not(e) => e.id,
            Self::If(e) => e.id,
            Self::Print(e) => e.id,
            Self::Call(e) => e.id,
            Self::New(e) => e.id,
            Self::MethodCall(e) => e.id,
        }
    }

    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Int(e) => e.span,
            Self::Bool(e) => e.span,
            Self::Null(e) => e.span,
            Self::Ident(e) => e.name.span,
            Self::Binary(e) => e.span,
            Self::Not(e) => e.span,
            Self::If(e) => e.span,
            Self::Print(e) => e.span,
            Self::Call(e) => e.span,
            Self::New(e) => e.span,
            Self::MethodCall(e) => e.span,
        }
    }
}

/// An integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntLit {
    pub id: NodeId,
    pub value: i32,
    pub span: Span,
}

/// A boolean literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolLit {
    pub id: NodeId,
    pub value: bool,
    pub span: Span,
}

/// The `null` literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullLit {
    pub id: NodeId,
    pub span: Span,
}

/// An identifier used as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentExpr<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub id: NodeId,
    /// Left operand
    pub left: Expr<'ast>,
    /// Operator
    pub op: BinaryOp,
    /// Right operand
    pub right: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// Boolean negation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotExpr<'ast> {
    pub id: NodeId,
    pub operand: Expr<'ast>,
    pub span: Span,
}

/// A conditional expression. Both branches are mandatory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfExpr<'ast> {
    pub id: NodeId,
    pub condition: Expr<'ast>,
    pub then_branch: Expr<'ast>,
    pub else_branch: Expr<'ast>,
    pub span: Span,
}

/// Prints its operand and evaluates to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintExpr<'ast> {
    pub id: NodeId,
    pub expr: Expr<'ast>,
    pub span: Span,
}

/// A call of a function (or of a method from inside its class body).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub id: NodeId,
    /// Name of the called function
    pub callee: Ident<'ast>,
    /// Arguments in source order
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

/// Object construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpr<'ast> {
    pub id: NodeId,
    /// Name of the instantiated class
    pub class: Ident<'ast>,
    /// One argument per field, in field order
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

/// Dynamic dispatch of a method on an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodCallExpr<'ast> {
    pub id: NodeId,
    /// Identifier holding the receiver
    pub object: Ident<'ast>,
    /// Name of the invoked method
    pub method: Ident<'ast>,
    /// Arguments in source order
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}
