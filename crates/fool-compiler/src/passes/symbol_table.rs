//! Symbol-Table Pass - resolve names and lay out frames and classes.
//!
//! This pass walks the tree once, depth first, and records in
//! [`Annotations`] which declaration every name refers to. It never aborts:
//! each problem becomes a [`BindingError`] and the walk continues, so one
//! run reports every independent binding error.
//!
//! ## Responsibilities
//!
//! - Open and close scopes for the program, functions, classes and methods
//! - Assign offsets: parameters `1, 2, ...`, local declarations `-2, -3, ...`
//! - Lay out classes: fields at `-1, -2, ...`, methods at `0, 1, ...`,
//!   inherited members keep their slots and overriding members reuse them
//! - Build the class table (class name -> virtual table)
//!
//! ## Layout
//!
//! ```text
//! activation record          object on the heap
//! ┌──────────────┐           ┌──────────────┐
//! │ param n      │ fp + n    │ field n      │ obj - n
//! │ ...          │           │ ...          │
//! │ param 1      │ fp + 1    │ field 1      │ obj - 1
//! │ access link  │ fp        │ vtable ptr   │ obj
//! │ return addr  │ fp - 1    └──────────────┘
//! │ local 1      │ fp - 2
//! │ ...          │
//! └──────────────┘
//! ```

use std::rc::Rc;

use fool_ast::{
    ClassDecl, Decl, Expr, FunDecl, Ident, MethodDecl, ParamDecl, Program, TypeExpr, VarDecl,
};
use fool_core::{BindingError, DeclKind, NodeId};
use rustc_hash::FxHashSet;

use crate::annotations::{Annotations, EntryId, StEntry};
use crate::scope::ScopeStack;
use crate::type_resolver::{resolve_signature, resolve_type};
use crate::types::{ClassType, Type};

/// Offset of the first local declaration in an activation record.
const FIRST_LOCAL_OFFSET: i32 = -2;

/// Output of the symbol-table pass.
#[derive(Debug, Default)]
pub struct SymbolTableOutput {
    /// The enrichment of the tree.
    pub annotations: Annotations,
    /// Collected errors, in traversal order.
    pub errors: Vec<BindingError>,
}

impl SymbolTableOutput {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Resolves every name in a program.
pub struct SymbolTablePass {
    scopes: ScopeStack,
    annotations: Annotations,
    /// Next local-declaration offset, or next method slot inside a class.
    decl_offset: i32,
    /// Set once a top-level variable or function has been declared.
    globals_declared: bool,
    errors: Vec<BindingError>,
}

impl SymbolTablePass {
    pub fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            annotations: Annotations::new(),
            decl_offset: FIRST_LOCAL_OFFSET,
            globals_declared: false,
            errors: Vec::new(),
        }
    }

    /// Run the pass over a program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> SymbolTableOutput {
        log::debug!("symbol table: start");

        match program {
            Program::LetIn {
                declarations, body, ..
            } => {
                self.scopes.push_scope();
                for decl in declarations.iter() {
                    self.visit_decl(decl);
                }
                self.visit_expr(body);
                self.scopes.pop_scope();
            }
            Program::Bare { body, .. } => self.visit_expr(body),
        }

        let mut annotations = self.annotations;
        annotations.set_class_table(self.scopes.into_class_table());

        log::debug!(
            "symbol table: done, {} entries, {} errors",
            annotations.entry_count(),
            self.errors.len()
        );
        SymbolTableOutput {
            annotations,
            errors: self.errors,
        }
    }

    fn report(&mut self, error: BindingError) {
        log::error!("{error}");
        self.errors.push(error);
    }

    /// Bind `name` in the innermost scope, reporting a clash.
    fn declare(&mut self, name: Ident<'_>, kind: DeclKind, entry: EntryId) {
        if self.scopes.insert(name.name, entry).is_some() {
            self.report(BindingError::AlreadyDeclared {
                kind,
                name: name.name.to_string(),
                span: name.span,
            });
        }
    }

    fn next_local_offset(&mut self) -> i32 {
        let offset = self.decl_offset;
        self.decl_offset -= 1;
        offset
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn visit_decl(&mut self, decl: &Decl<'_>) {
        let top_level = self.scopes.nesting_level() == 0;
        match decl {
            Decl::Class(class) => {
                // Classes take the first global slots.
                if !top_level || self.globals_declared {
                    self.report(BindingError::MisplacedClass {
                        name: class.name.name.to_string(),
                        span: class.name.span,
                    });
                }
                self.visit_class(class);
            }
            Decl::Fun(fun) => {
                self.globals_declared |= top_level;
                self.visit_fun(fun);
            }
            Decl::Var(var) => {
                self.globals_declared |= top_level;
                self.visit_var(var);
            }
        }
    }

    fn visit_fun(&mut self, fun: &FunDecl<'_>) {
        let signature = resolve_signature(fun.params, &fun.return_type);
        let offset = self.next_local_offset();
        let entry = self.annotations.add_entry(StEntry::new(
            self.scopes.nesting_level(),
            Type::Arrow(Rc::new(signature)),
            offset,
        ));
        self.declare(fun.name, DeclKind::Function, entry);
        self.annotations.bind(fun.id, entry);

        log::trace!("function {} at offset {offset}", fun.name.name);
        self.visit_body(fun.params, fun.declarations, &fun.body);
    }

    fn visit_var(&mut self, var: &VarDecl<'_>) {
        // The initializer cannot see the variable it initializes.
        self.visit_expr(&var.init);

        let offset = self.next_local_offset();
        let entry = self.annotations.add_entry(StEntry::new(
            self.scopes.nesting_level(),
            resolve_type(&var.ty),
            offset,
        ));
        self.declare(var.name, DeclKind::Variable, entry);
        self.annotations.bind(var.id, entry);
    }

    /// Shared by functions and methods: parameters, nested declarations and
    /// the body, in a fresh scope.
    fn visit_body(&mut self, params: &[ParamDecl<'_>], declarations: &[Decl<'_>], body: &Expr<'_>) {
        self.scopes.push_scope();
        let saved_offset = std::mem::replace(&mut self.decl_offset, FIRST_LOCAL_OFFSET);
        let level = self.scopes.nesting_level();

        for (i, param) in params.iter().enumerate() {
            let entry = self.annotations.add_entry(StEntry::new(
                level,
                resolve_type(&param.ty),
                i as i32 + 1,
            ));
            self.declare(param.name, DeclKind::Parameter, entry);
            self.annotations.bind(param.id, entry);
        }
        for decl in declarations {
            self.visit_decl(decl);
        }
        self.visit_expr(body);

        self.decl_offset = saved_offset;
        self.scopes.pop_scope();
    }

    // ========================================================================
    // Classes
    // ========================================================================

    /// Entry and layout of the class `name`, if it is one.
    fn superclass(&self, name: &str) -> Option<(EntryId, Rc<ClassType>)> {
        if !self.scopes.is_class(name) {
            return None;
        }
        let entry = self.scopes.lookup_global(name)?;
        match &self.annotations.entry(entry).ty {
            Type::Class(layout) => Some((entry, Rc::clone(layout))),
            _ => None,
        }
    }

    fn visit_class(&mut self, class: &ClassDecl<'_>) {
        let name = class.name.name;
        let mut layout = ClassType::new();
        let mut vtable = Default::default();

        if let Some(superclass) = class.superclass {
            match self.superclass(superclass.name) {
                Some((super_entry, super_layout)) => {
                    layout = (*super_layout).clone();
                    if let Some(super_vtable) = self.scopes.virtual_table(superclass.name) {
                        vtable = super_vtable.clone();
                    }
                    self.annotations.bind_superclass(class.id, super_entry);
                }
                None => self.report(BindingError::NotDeclared {
                    kind: DeclKind::Class,
                    name: superclass.name.to_string(),
                    span: superclass.span,
                }),
            }
        }

        // Classes always live in the global scope.
        let offset = self.next_local_offset();
        let entry = self.annotations.add_entry(StEntry::new(
            0,
            Type::Class(Rc::new(layout.clone())),
            offset,
        ));
        if self.scopes.insert_global(name, entry).is_some() {
            self.report(BindingError::AlreadyDeclared {
                kind: DeclKind::Class,
                name: name.to_string(),
                span: class.name.span,
            });
        }
        self.annotations.bind(class.id, entry);

        self.scopes.declare_class(name, vtable);
        self.scopes.push_class_scope(name);

        let mut members = FxHashSet::default();
        for field in class.fields {
            if !members.insert(field.name.name) {
                self.report(BindingError::DuplicateMember {
                    kind: DeclKind::Field,
                    name: field.name.name.to_string(),
                    span: field.name.span,
                });
            }
            let entry = self.declare_field(field.name, &field.ty, &mut layout);
            self.annotations.bind(field.id, entry);
        }

        let saved_offset = std::mem::replace(&mut self.decl_offset, layout.methods.len() as i32);
        for method in class.methods {
            if !members.insert(method.name.name) {
                self.report(BindingError::DuplicateMember {
                    kind: DeclKind::Method,
                    name: method.name.name.to_string(),
                    span: method.name.span,
                });
            }
            self.visit_method(method, &mut layout);
        }
        self.decl_offset = saved_offset;

        self.scopes.pop_scope();

        log::trace!(
            "class {name}: {} fields, {} methods",
            layout.fields.len(),
            layout.methods.len()
        );
        let layout = Rc::new(layout);
        self.annotations.entry_mut(entry).ty = Type::Class(Rc::clone(&layout));
        self.annotations.set_class_layout(class.id, layout);
    }

    /// Place a field in the open class, overriding an inherited field of the
    /// same name in place.
    fn declare_field(&mut self, name: Ident<'_>, ty: &TypeExpr<'_>, layout: &mut ClassType) -> EntryId {
        let ty = resolve_type(ty);
        let inherited = self
            .scopes
            .lookup_local(name.name)
            .map(|id| self.annotations.entry(id).clone());

        let offset = match inherited {
            Some(previous) if !previous.ty.is_method() => {
                if let Some(slot) = ClassType::field_index(previous.offset)
                    .and_then(|i| layout.fields.get_mut(i))
                {
                    *slot = ty.clone();
                }
                previous.offset
            }
            other => {
                if other.is_some() {
                    self.report(BindingError::MethodOverriddenByField {
                        name: name.name.to_string(),
                        span: name.span,
                    });
                }
                layout.fields.push(ty.clone());
                -(layout.fields.len() as i32)
            }
        };

        let entry = self
            .annotations
            .add_entry(StEntry::new(self.scopes.nesting_level(), ty, offset));
        self.scopes.insert(name.name, entry);
        entry
    }

    fn visit_method(&mut self, method: &MethodDecl<'_>, layout: &mut ClassType) {
        let signature = Rc::new(resolve_signature(method.params, &method.return_type));

        let mut offset = self.decl_offset;
        self.decl_offset += 1;
        if let Some(previous) = self.scopes.lookup_local(method.name.name) {
            let previous = self.annotations.entry(previous);
            if previous.ty.is_method() {
                offset = previous.offset;
                self.decl_offset -= 1;
            } else {
                self.report(BindingError::FieldOverriddenByMethod {
                    name: method.name.name.to_string(),
                    span: method.name.span,
                });
            }
        }

        let entry = self.annotations.add_entry(StEntry::new(
            self.scopes.nesting_level(),
            Type::Method(Rc::clone(&signature)),
            offset,
        ));
        self.scopes.insert(method.name.name, entry);
        self.annotations.bind(method.id, entry);

        match usize::try_from(offset).ok().and_then(|i| layout.methods.get_mut(i)) {
            Some(slot) => *slot = signature,
            None => layout.methods.push(signature),
        }

        log::trace!("method {} at slot {offset}", method.name.name);
        self.visit_body(method.params, method.declarations, &method.body);
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn visit_exprs(&mut self, exprs: &[Expr<'_>]) {
        for expr in exprs {
            self.visit_expr(expr);
        }
    }

    fn visit_expr(&mut self, expr: &Expr<'_>) {
        match expr {
            Expr::Int(_) | Expr::Bool(_) | Expr::Null(_) => {}
            Expr::Ident(ident) => {
                self.resolve_use(expr, ident.name, DeclKind::Variable);
            }
            Expr::Binary(binary) => {
                self.visit_expr(&binary.left);
                self.visit_expr(&binary.right);
            }
            Expr::Not(not) => self.visit_expr(&not.operand),
            Expr::If(if_expr) => {
                self.visit_expr(&if_expr.condition);
                self.visit_expr(&if_expr.then_branch);
                self.visit_expr(&if_expr.else_branch);
            }
            Expr::Print(print) => self.visit_expr(&print.expr),
            Expr::Call(call) => {
                self.resolve_use(expr, call.callee, DeclKind::Function);
                self.visit_exprs(call.args);
            }
            Expr::New(new) => {
                match self.scopes.lookup_global(new.class.name) {
                    Some(entry) if self.scopes.is_class(new.class.name) => {
                        self.annotations.bind(new.id, entry);
                    }
                    _ => self.report(BindingError::NotDeclared {
                        kind: DeclKind::Class,
                        name: new.class.name.to_string(),
                        span: new.class.span,
                    }),
                }
                self.visit_exprs(new.args);
            }
            Expr::MethodCall(call) => {
                self.resolve_dispatch(call.id, call.object, call.method);
                self.visit_exprs(call.args);
            }
        }
    }

    fn resolve_use(&mut self, expr: &Expr<'_>, name: Ident<'_>, kind: DeclKind) {
        match self.scopes.lookup(name.name) {
            Some(entry) => {
                self.annotations
                    .bind_use(expr.id(), entry, self.scopes.nesting_level());
            }
            None => self.report(BindingError::NotDeclared {
                kind,
                name: name.name.to_string(),
                span: name.span,
            }),
        }
    }

    fn resolve_dispatch(&mut self, node: NodeId, object: Ident<'_>, method: Ident<'_>) {
        let Some(entry) = self.scopes.lookup(object.name) else {
            self.report(BindingError::NotDeclared {
                kind: DeclKind::Object,
                name: object.name.to_string(),
                span: object.span,
            });
            return;
        };

        let class = match &self.annotations.entry(entry).ty {
            Type::Ref(class) => Rc::clone(class),
            _ => {
                self.report(BindingError::NotAReference {
                    name: object.name.to_string(),
                    span: object.span,
                });
                return;
            }
        };

        self.annotations
            .bind_use(node, entry, self.scopes.nesting_level());
        let member = self
            .scopes
            .virtual_table(&class)
            .and_then(|vtable| vtable.get(method.name))
            .copied();
        match member {
            Some(member) => self.annotations.bind_method(node, member),
            None => self.report(BindingError::NoSuchMember {
                object: object.name.to_string(),
                member: method.name.to_string(),
                span: method.span,
            }),
        }
    }
}

impl Default for SymbolTablePass {
    fn default() -> Self {
        Self::new()
    }
}
