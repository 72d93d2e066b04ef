//! Unified error types for the FOOL compiler.
//!
//! ## Error Hierarchy
//!
//! ```text
//! CompilationError (top-level wrapper)
//! ├── BindingError - scope/offset resolution errors (symbol-table pass)
//! └── TypeError    - type mismatches (type-check pass)
//! ```
//!
//! Both phases accumulate their errors and keep going, so one invocation
//! reports every independent problem. Code generation only runs on programs
//! that produced no errors; a missing annotation there is reported as
//! [`CompilationError::Internal`].

use std::fmt;

use thiserror::Error;

use crate::Span;

// ============================================================================
// Declaration kinds
// ============================================================================

/// The kind of declaration a binding error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Function,
    Variable,
    Parameter,
    Class,
    Field,
    Method,
    Object,
}

impl DeclKind {
    /// Returns a human-readable name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Function => "function",
            DeclKind::Variable => "variable",
            DeclKind::Parameter => "parameter",
            DeclKind::Class => "class",
            DeclKind::Field => "field",
            DeclKind::Method => "method",
            DeclKind::Object => "object",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Binding Errors
// ============================================================================

/// Errors detected while building the symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// A name was declared twice in the same scope.
    #[error("{kind} id '{name}' at {span} already declared")]
    AlreadyDeclared {
        kind: DeclKind,
        name: String,
        span: Span,
    },

    /// A reference did not resolve to any declaration.
    #[error("{kind} id '{name}' at {span} not declared")]
    NotDeclared {
        kind: DeclKind,
        name: String,
        span: Span,
    },

    /// A class member name was used twice in the same class body.
    #[error("{kind} '{name}' at {span} was already declared in this class")]
    DuplicateMember {
        kind: DeclKind,
        name: String,
        span: Span,
    },

    /// A field was declared with the name of an inherited method.
    #[error("cannot override method '{name}' with a field at {span}")]
    MethodOverriddenByField { name: String, span: Span },

    /// A method was declared with the name of an inherited field.
    #[error("cannot override field '{name}' with a method at {span}")]
    FieldOverriddenByMethod { name: String, span: Span },

    /// A class was declared inside a body or after a non-class declaration.
    #[error("class '{name}' at {span} must be declared at top level before any other declaration")]
    MisplacedClass { name: String, span: Span },

    /// A dispatch target is not a reference to a class instance.
    #[error("object id '{name}' at {span} is not a reference type")]
    NotAReference { name: String, span: Span },

    /// A dispatch named a member its class does not have.
    #[error("object id '{object}' at {span} has no member '{member}'")]
    NoSuchMember {
        object: String,
        member: String,
        span: Span,
    },
}

impl BindingError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            BindingError::AlreadyDeclared { span, .. } => *span,
            BindingError::NotDeclared { span, .. } => *span,
            BindingError::DuplicateMember { span, .. } => *span,
            BindingError::MethodOverriddenByField { span, .. } => *span,
            BindingError::FieldOverriddenByMethod { span, .. } => *span,
            BindingError::MisplacedClass { span, .. } => *span,
            BindingError::NotAReference { span, .. } => *span,
            BindingError::NoSuchMember { span, .. } => *span,
        }
    }
}

// ============================================================================
// Type Errors
// ============================================================================

/// Errors detected while type checking the enriched tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A type rule was violated.
    #[error("at {span}: {message}")]
    Mismatch { message: String, span: Span },

    /// A node the check depends on was never resolved.
    ///
    /// The symbol-table pass has already reported the cause, so this error
    /// aborts the enclosing check without being reported again.
    #[error("at {span}: unresolved reference")]
    Incomplete { span: Span },
}

impl TypeError {
    /// Create a mismatch error.
    pub fn mismatch(span: Span, message: impl Into<String>) -> Self {
        TypeError::Mismatch {
            message: message.into(),
            span,
        }
    }

    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            TypeError::Mismatch { span, .. } => *span,
            TypeError::Incomplete { span } => *span,
        }
    }

    /// Whether this error should be shown to the user.
    pub fn is_reportable(&self) -> bool {
        matches!(self, TypeError::Mismatch { .. })
    }
}

// ============================================================================
// Top-level
// ============================================================================

/// Any error reported by a compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    #[error("binding error: {0}")]
    Binding(#[from] BindingError),

    #[error("type error: {0}")]
    Type(#[from] TypeError),

    /// Internal compiler error.
    #[error("internal error: {message}")]
    Internal {
        /// The error message.
        message: String,
    },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::Binding(e) => e.span(),
            CompilationError::Type(e) => e.span(),
            CompilationError::Internal { .. } => Span::default(),
        }
    }
}
