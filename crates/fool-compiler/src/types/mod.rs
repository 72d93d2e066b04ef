//! Semantic types.
//!
//! These are the types the passes reason about, as opposed to the
//! annotations written in source (see [`fool_ast::TypeExpr`]). Compound
//! types are reference counted so that symbol-table entries, class layouts
//! and the type table can share them cheaply.

mod class_type;

pub use class_type::ClassType;

use std::fmt;
use std::rc::Rc;

/// A semantic type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// `int`
    Int,
    /// `bool`, a subtype of `int`
    Bool,
    /// Type of a function
    Arrow(Rc<ArrowType>),
    /// Type of a method; same shape as a function, dispatched through a table
    Method(Rc<ArrowType>),
    /// Layout of a class; the type of a class name itself
    Class(Rc<ClassType>),
    /// Reference to an instance of the named class
    Ref(Rc<str>),
    /// Type of `null`
    Empty,
}

impl Type {
    pub fn arrow(params: Vec<Type>, ret: Type) -> Self {
        Type::Arrow(Rc::new(ArrowType::new(params, ret)))
    }

    pub fn method(params: Vec<Type>, ret: Type) -> Self {
        Type::Method(Rc::new(ArrowType::new(params, ret)))
    }

    /// Reference to an instance of `class`.
    pub fn reference(class: &str) -> Self {
        Type::Ref(Rc::from(class))
    }

    /// The functional shape of a function or method type.
    pub fn as_arrow(&self) -> Option<&Rc<ArrowType>> {
        match self {
            Type::Arrow(arrow) | Type::Method(arrow) => Some(arrow),
            _ => None,
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Type::Method(_))
    }

    /// Class name of a reference type.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Ref(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("int"),
            Type::Bool => f.write_str("bool"),
            Type::Arrow(arrow) => write!(f, "{arrow}"),
            Type::Method(arrow) => write!(f, "method {arrow}"),
            Type::Class(class) => write!(f, "{class}"),
            Type::Ref(name) => f.write_str(name),
            Type::Empty => f.write_str("null"),
        }
    }
}

/// Parameter and return types of a function or method.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowType {
    pub params: Vec<Type>,
    pub ret: Type,
}

impl ArrowType {
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        Self { params, ret }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for ArrowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ")->{}", self.ret)
    }
}
