//! Type resolution for converting source annotations to semantic types.
//!
//! Resolution is purely structural: a class name becomes a reference type
//! whether or not the class exists. Whether every named class is declared is
//! a separate question answered by [`undeclared_class`], which the type
//! checker asks once the class table is complete.

use std::rc::Rc;

use fool_ast::{Ident, ParamDecl, TypeExpr};

use crate::types::{ArrowType, Type};

/// Resolve a type annotation to a semantic type.
pub fn resolve_type(ty: &TypeExpr<'_>) -> Type {
    match ty {
        TypeExpr::Int(_) => Type::Int,
        TypeExpr::Bool(_) => Type::Bool,
        TypeExpr::Arrow(arrow) => Type::Arrow(Rc::new(ArrowType::new(
            arrow.params.iter().map(resolve_type).collect(),
            resolve_type(&arrow.ret),
        ))),
        TypeExpr::Ref(class) => Type::reference(class.name),
    }
}

/// Build the functional shape of a function or method signature.
pub fn resolve_signature(params: &[ParamDecl<'_>], ret: &TypeExpr<'_>) -> ArrowType {
    ArrowType::new(
        params.iter().map(|p| resolve_type(&p.ty)).collect(),
        resolve_type(ret),
    )
}

/// Find the first class name in `ty` for which `is_class` is false.
pub fn undeclared_class<'ast>(
    ty: &TypeExpr<'ast>,
    is_class: &impl Fn(&str) -> bool,
) -> Option<Ident<'ast>> {
    match ty {
        TypeExpr::Int(_) | TypeExpr::Bool(_) => None,
        TypeExpr::Arrow(arrow) => arrow
            .params
            .iter()
            .find_map(|p| undeclared_class(p, is_class))
            .or_else(|| undeclared_class(&arrow.ret, is_class)),
        TypeExpr::Ref(class) => (!is_class(class.name)).then_some(*class),
    }
}
