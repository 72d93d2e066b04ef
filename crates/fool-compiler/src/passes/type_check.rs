//! Type-Check Pass - infer expression types and validate declarations.
//!
//! Runs over the tree enriched by the symbol-table pass. Every expression
//! check returns `Result<Type, TypeError>`: an error in an operand aborts
//! the enclosing expression, since it has nothing to check against. Errors
//! are contained at declaration boundaries. A failing declaration is
//! reported and its siblings are still checked.
//!
//! Nodes the symbol-table pass could not resolve yield
//! [`TypeError::Incomplete`]. Those abort like any other error but are not
//! reported again.

use fool_ast::{
    BinaryOp, ClassDecl, Decl, Expr, FunDecl, Ident, MethodDecl, ParamDecl, Program, TypeExpr,
    VarDecl,
};
use fool_core::{NodeId, Span, TypeError};
use rustc_hash::FxHashMap;

use crate::annotations::{Annotations, StEntry};
use crate::type_rels::TypeRelations;
use crate::type_resolver::{resolve_type, undeclared_class};
use crate::types::{ArrowType, ClassType, Type};

/// Output of the type-check pass.
#[derive(Debug, Default)]
pub struct TypeCheckOutput {
    /// Type of the program body, if it could be determined.
    pub program_type: Option<Type>,
    /// Type of every expression that was successfully checked.
    pub types: FxHashMap<NodeId, Type>,
    /// Reported errors, in traversal order.
    pub errors: Vec<TypeError>,
}

impl TypeCheckOutput {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Type checks an enriched program.
pub struct TypeCheckPass<'a> {
    rels: &'a mut TypeRelations,
    annotations: &'a Annotations,
    types: FxHashMap<NodeId, Type>,
    errors: Vec<TypeError>,
}

type Check<T = Type> = Result<T, TypeError>;

impl<'a> TypeCheckPass<'a> {
    pub fn new(rels: &'a mut TypeRelations, annotations: &'a Annotations) -> Self {
        Self {
            rels,
            annotations,
            types: FxHashMap::default(),
            errors: Vec::new(),
        }
    }

    /// Run the pass over a program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> TypeCheckOutput {
        log::debug!("type check: start");

        for decl in program.declarations() {
            self.check_isolated(|pass| pass.check_decl(decl));
        }
        let program_type = match self.check_expr(&program.body()) {
            Ok(ty) => Some(ty),
            Err(error) => {
                self.report(error);
                None
            }
        };

        log::debug!(
            "type check: done, program type {}, {} errors",
            program_type
                .as_ref()
                .map_or_else(|| "unknown".to_string(), Type::to_string),
            self.errors.len()
        );
        TypeCheckOutput {
            program_type,
            types: self.types,
            errors: self.errors,
        }
    }

    fn report(&mut self, error: TypeError) {
        if error.is_reportable() {
            log::error!("{error}");
            self.errors.push(error);
        } else {
            log::trace!("skipping check at {}: unresolved", error.span());
        }
    }

    /// Run `check`, reporting its error instead of propagating it.
    fn check_isolated(&mut self, check: impl FnOnce(&mut Self) -> Check<()>) {
        if let Err(error) = check(self) {
            self.report(error);
        }
    }

    fn resolved(&self, node: NodeId, span: Span) -> Check<&'a StEntry> {
        self.annotations
            .resolved(node)
            .ok_or(TypeError::Incomplete { span })
    }

    /// Every class named in `ty` must be declared.
    fn check_well_formed(&self, ty: &TypeExpr<'_>) -> Check<()> {
        let is_class = |name: &str| self.annotations.is_class(name);
        match undeclared_class(ty, &is_class) {
            Some(class) => Err(TypeError::mismatch(
                class.span,
                format!("Undeclared class {}", class.name),
            )),
            None => Ok(()),
        }
    }

    fn expect_subtype(&self, sub: &Type, sup: &Type, span: Span, message: impl FnOnce() -> String) -> Check<()> {
        if self.rels.is_subtype(sub, sup) {
            Ok(())
        } else {
            Err(TypeError::mismatch(span, message()))
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn check_decl(&mut self, decl: &Decl<'_>) -> Check<()> {
        match decl {
            Decl::Fun(fun) => self.check_fun(fun),
            Decl::Var(var) => self.check_var(var),
            Decl::Class(class) => {
                self.check_class(class);
                Ok(())
            }
        }
    }

    fn check_fun(&mut self, fun: &FunDecl<'_>) -> Check<()> {
        self.check_body(fun.name, fun.params, fun.declarations, &fun.body, &fun.return_type, "function")
    }

    /// Shared by functions and methods.
    fn check_body(
        &mut self,
        name: Ident<'_>,
        params: &[ParamDecl<'_>],
        declarations: &[Decl<'_>],
        body: &Expr<'_>,
        return_type: &TypeExpr<'_>,
        what: &str,
    ) -> Check<()> {
        for decl in declarations {
            self.check_isolated(|pass| pass.check_decl(decl));
        }
        for param in params {
            self.check_well_formed(&param.ty)?;
        }
        self.check_well_formed(return_type)?;

        let body_type = self.check_expr(body)?;
        self.expect_subtype(&body_type, &resolve_type(return_type), name.span, || {
            format!("Wrong return type for {what} {}", name.name)
        })
    }

    fn check_var(&mut self, var: &VarDecl<'_>) -> Check<()> {
        let init_type = self.check_expr(&var.init)?;
        self.check_well_formed(&var.ty)?;
        self.expect_subtype(&init_type, &resolve_type(&var.ty), var.name.span, || {
            format!("Incompatible value for variable {}", var.name.name)
        })
    }

    fn check_method(&mut self, method: &MethodDecl<'_>) -> Check<()> {
        self.check_body(
            method.name,
            method.params,
            method.declarations,
            &method.body,
            &method.return_type,
            "method",
        )
    }

    /// Classes contain their own errors: each field, override and method is
    /// checked on its own.
    fn check_class(&mut self, class: &ClassDecl<'_>) {
        for field in class.fields {
            self.check_isolated(|pass| pass.check_well_formed(&field.ty));
        }

        if let Some(superclass) = class.superclass {
            self.check_overrides(class, superclass);
        }

        for method in class.methods {
            self.check_isolated(|pass| pass.check_method(method));
        }
    }

    fn check_overrides(&mut self, class: &ClassDecl<'_>, superclass: Ident<'_>) {
        let layouts = (
            self.annotations.class_layout(class.id),
            self.annotations.superclass_entry(class.id),
        );
        let (Some(layout), Some(StEntry { ty: Type::Class(super_layout), .. })) = layouts else {
            // The superclass did not resolve; already reported.
            return;
        };
        self.rels.register_parent(class.name.name, superclass.name);

        for field in class.fields {
            let Some(entry) = self.annotations.resolved(field.id) else {
                continue;
            };
            if let (Some(own), Some(inherited)) =
                (layout.field_at(entry.offset), super_layout.field_at(entry.offset))
            {
                let (own, inherited) = (own.clone(), inherited.clone());
                self.check_isolated(|pass| {
                    pass.expect_subtype(&own, &inherited, field.name.span, || {
                        format!("Wrong type for field {}", field.name.name)
                    })
                });
            }
        }

        for method in class.methods {
            let Some(entry) = self.annotations.resolved(method.id) else {
                continue;
            };
            if let (Some(own), Some(inherited)) =
                (layout.method_at(entry.offset), super_layout.method_at(entry.offset))
            {
                let result = self.check_override(method.name, own, inherited);
                self.check_isolated(|_| result);
            }
        }
    }

    fn check_override(&self, name: Ident<'_>, own: &ArrowType, inherited: &ArrowType) -> Check<()> {
        if own.arity() != inherited.arity() {
            return Err(TypeError::mismatch(
                name.span,
                format!("Wrong number of parameters in override of method {}", name.name),
            ));
        }
        if !self.rels.is_method_override(own, inherited) {
            return Err(TypeError::mismatch(
                name.span,
                format!("Wrong type for method {}", name.name),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn check_expr(&mut self, expr: &Expr<'_>) -> Check {
        let ty = self.infer(expr)?;
        self.types.insert(expr.id(), ty.clone());
        Ok(ty)
    }

    fn infer(&mut self, expr: &Expr<'_>) -> Check {
        match expr {
            Expr::Int(_) => Ok(Type::Int),
            Expr::Bool(_) => Ok(Type::Bool),
            Expr::Null(_) => Ok(Type::Empty),
            Expr::Ident(ident) => {
                let entry = self.resolved(ident.id, ident.name.span)?;
                match &entry.ty {
                    Type::Arrow(_) => Err(TypeError::mismatch(
                        ident.name.span,
                        format!("Wrong usage of function identifier {}", ident.name.name),
                    )),
                    Type::Method(_) => Err(TypeError::mismatch(
                        ident.name.span,
                        format!("Wrong usage of method identifier {}", ident.name.name),
                    )),
                    ty => Ok(ty.clone()),
                }
            }
            Expr::Binary(binary) => {
                let left = self.check_expr(&binary.left)?;
                let right = self.check_expr(&binary.right)?;
                self.check_binary(binary.op, &left, &right, binary.span)
            }
            Expr::Not(not) => {
                let operand = self.check_expr(&not.operand)?;
                self.expect_subtype(&operand, &Type::Bool, not.span, || {
                    "Non boolean in not".to_string()
                })?;
                Ok(Type::Bool)
            }
            Expr::If(if_expr) => {
                let condition = self.check_expr(&if_expr.condition)?;
                self.expect_subtype(&condition, &Type::Bool, if_expr.span, || {
                    "Non boolean condition in if".to_string()
                })?;
                let then_type = self.check_expr(&if_expr.then_branch)?;
                let else_type = self.check_expr(&if_expr.else_branch)?;
                self.rels
                    .lowest_common_ancestor(&then_type, &else_type)
                    .ok_or_else(|| {
                        TypeError::mismatch(if_expr.span, "Incompatible types in then-else branches")
                    })
            }
            Expr::Print(print) => self.check_expr(&print.expr),
            Expr::Call(call) => {
                let entry = self.resolved(call.id, call.callee.span)?;
                let Some(arrow) = entry.ty.as_arrow() else {
                    return Err(TypeError::mismatch(
                        call.span,
                        format!("Invocation of a non-function {}", call.callee.name),
                    ));
                };
                self.check_args(&arrow.params, call.args, call.span, call.callee.name)?;
                Ok(arrow.ret.clone())
            }
            Expr::New(new) => {
                let entry = self.resolved(new.id, new.class.span)?;
                let Type::Class(layout) = &entry.ty else {
                    return Err(TypeError::mismatch(
                        new.span,
                        format!("Invocation of a non-constructor {}", new.class.name),
                    ));
                };
                self.check_construction(layout, new.args, new.span, new.class.name)?;
                Ok(Type::reference(new.class.name))
            }
            Expr::MethodCall(call) => {
                let entry = self
                    .annotations
                    .method_entry(call.id)
                    .ok_or(TypeError::Incomplete { span: call.span })?;
                let Type::Method(arrow) = &entry.ty else {
                    return Err(TypeError::mismatch(
                        call.span,
                        format!("Invocation of a non-method {}", call.method.name),
                    ));
                };
                self.check_args(&arrow.params, call.args, call.span, call.method.name)?;
                Ok(arrow.ret.clone())
            }
        }
    }

    fn check_binary(&self, op: BinaryOp, left: &Type, right: &Type, span: Span) -> Check {
        let (operand, result, message) = match op {
            BinaryOp::Add => (Type::Int, Type::Int, "Non integers in sum"),
            BinaryOp::Sub => (Type::Int, Type::Int, "Non integers in subtraction"),
            BinaryOp::Mul => (Type::Int, Type::Int, "Non integers in multiplication"),
            BinaryOp::Div => (Type::Int, Type::Int, "Non integers in division"),
            BinaryOp::LessEqual => (Type::Int, Type::Bool, "Incompatible types in less-equal"),
            BinaryOp::GreaterEqual => (Type::Int, Type::Bool, "Incompatible types in greater-equal"),
            BinaryOp::And => (Type::Bool, Type::Bool, "Non booleans in and"),
            BinaryOp::Or => (Type::Bool, Type::Bool, "Non booleans in or"),
            BinaryOp::Equal => {
                return if self.rels.is_subtype(left, right) || self.rels.is_subtype(right, left) {
                    Ok(Type::Bool)
                } else {
                    Err(TypeError::mismatch(span, "Incompatible types in equal"))
                };
            }
        };

        if self.rels.is_subtype(left, &operand) && self.rels.is_subtype(right, &operand) {
            Ok(result)
        } else {
            Err(TypeError::mismatch(span, message))
        }
    }

    fn check_args(&mut self, params: &[Type], args: &[Expr<'_>], span: Span, callee: &str) -> Check<()> {
        if params.len() != args.len() {
            return Err(TypeError::mismatch(
                span,
                format!("Wrong number of parameters in the invocation of {callee}"),
            ));
        }
        for (i, (param, arg)) in params.iter().zip(args).enumerate() {
            let arg_type = self.check_expr(arg)?;
            self.expect_subtype(&arg_type, param, span, || {
                format!("Wrong type for {}-th parameter in the invocation of {callee}", i + 1)
            })?;
        }
        Ok(())
    }

    fn check_construction(&mut self, layout: &ClassType, args: &[Expr<'_>], span: Span, class: &str) -> Check<()> {
        if layout.fields.len() != args.len() {
            return Err(TypeError::mismatch(
                span,
                format!("Wrong number of parameters in the invocation of constructor {class}"),
            ));
        }
        for (i, (field, arg)) in layout.fields.iter().zip(args).enumerate() {
            let arg_type = self.check_expr(arg)?;
            self.expect_subtype(&arg_type, field, span, || {
                format!(
                    "Wrong type for {}-th parameter in the invocation of constructor {class}",
                    i + 1
                )
            })?;
        }
        Ok(())
    }
}
