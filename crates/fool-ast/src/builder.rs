//! Arena-backed construction of FOOL trees.

use std::cell::Cell;

use bumpalo::Bump;
use fool_core::{NodeId, Span};

use crate::{
    ArrowTypeExpr, BinaryExpr, BinaryOp, BoolLit, CallExpr, ClassDecl, Decl, Expr, FieldDecl,
    FunDecl, Ident, IdentExpr, IfExpr, IntLit, MethodCallExpr, MethodDecl, NewExpr, NotExpr,
    NullLit, ParamDecl, PrintExpr, Program, TypeExpr, VarDecl,
};

/// Builds AST nodes in an arena, assigning each a fresh [`NodeId`].
///
/// Every constructor takes the source line of the node. Constructors take
/// `&self`, so calls can be nested freely.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    next_id: Cell<u32>,
}

impl<'ast> AstBuilder<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            next_id: Cell::new(0),
        }
    }

    /// The arena nodes are allocated in.
    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    /// Number of node ids handed out so far.
    pub fn node_count(&self) -> u32 {
        self.next_id.get()
    }

    fn fresh_id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId::new(id)
    }

    fn exprs(&self, items: &[Expr<'ast>]) -> &'ast [Expr<'ast>] {
        self.arena.alloc_slice_copy(items)
    }

    // ========================================================================
    // Names and types
    // ========================================================================

    /// Intern a name.
    pub fn name(&self, name: &str, line: u32) -> Ident<'ast> {
        Ident::new(self.arena.alloc_str(name), Span::line(line))
    }

    pub fn int_type(&self, line: u32) -> TypeExpr<'ast> {
        TypeExpr::Int(Span::line(line))
    }

    pub fn bool_type(&self, line: u32) -> TypeExpr<'ast> {
        TypeExpr::Bool(Span::line(line))
    }

    pub fn arrow_type(
        &self,
        params: &[TypeExpr<'ast>],
        ret: TypeExpr<'ast>,
        line: u32,
    ) -> TypeExpr<'ast> {
        TypeExpr::Arrow(self.arena.alloc(ArrowTypeExpr {
            params: self.arena.alloc_slice_copy(params),
            ret,
            span: Span::line(line),
        }))
    }

    /// A reference to an instance of the named class.
    pub fn ref_type(&self, class: &str, line: u32) -> TypeExpr<'ast> {
        TypeExpr::Ref(self.name(class, line))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn int(&self, value: i32, line: u32) -> Expr<'ast> {
        Expr::Int(IntLit {
            id: self.fresh_id(),
            value,
            span: Span::line(line),
        })
    }

    pub fn bool(&self, value: bool, line: u32) -> Expr<'ast> {
        Expr::Bool(BoolLit {
            id: self.fresh_id(),
            value,
            span: Span::line(line),
        })
    }

    pub fn null(&self, line: u32) -> Expr<'ast> {
        Expr::Null(NullLit {
            id: self.fresh_id(),
            span: Span::line(line),
        })
    }

    /// An identifier used as a value.
    pub fn ident(&self, name: &str, line: u32) -> Expr<'ast> {
        Expr::Ident(IdentExpr {
            id: self.fresh_id(),
            name: self.name(name, line),
        })
    }

    pub fn binary(
        &self,
        left: Expr<'ast>,
        op: BinaryOp,
        right: Expr<'ast>,
        line: u32,
    ) -> Expr<'ast> {
        Expr::Binary(self.arena.alloc(BinaryExpr {
            id: self.fresh_id(),
            left,
            op,
            right,
            span: Span::line(line),
        }))
    }

    pub fn not(&self, operand: Expr<'ast>, line: u32) -> Expr<'ast> {
        Expr::Not(self.arena.alloc(NotExpr {
            id: self.fresh_id(),
            operand,
            span: Span::line(line),
        }))
    }

    pub fn if_expr(
        &self,
        condition: Expr<'ast>,
        then_branch: Expr<'ast>,
        else_branch: Expr<'ast>,
        line: u32,
    ) -> Expr<'ast> {
        Expr::If(self.arena.alloc(IfExpr {
            id: self.fresh_id(),
            condition,
            then_branch,
            else_branch,
            span: Span::line(line),
        }))
    }

    pub fn print(&self, expr: Expr<'ast>, line: u32) -> Expr<'ast> {
        Expr::Print(self.arena.alloc(PrintExpr {
            id: self.fresh_id(),
            expr,
            span: Span::line(line),
        }))
    }

    pub fn call(&self, callee: &str, args: &[Expr<'ast>], line: u32) -> Expr<'ast> {
        Expr::Call(self.arena.alloc(CallExpr {
            id: self.fresh_id(),
            callee: self.name(callee, line),
            args: self.exprs(args),
            span: Span::line(line),
        }))
    }

    pub fn new_object(&self, class: &str, args: &[Expr<'ast>], line: u32) -> Expr<'ast> {
        Expr::New(self.arena.alloc(NewExpr {
            id: self.fresh_id(),
            class: self.name(class, line),
            args: self.exprs(args),
            span: Span::line(line),
        }))
    }

    pub fn method_call(
        &self,
        object: &str,
        method: &str,
        args: &[Expr<'ast>],
        line: u32,
    ) -> Expr<'ast> {
        Expr::MethodCall(self.arena.alloc(MethodCallExpr {
            id: self.fresh_id(),
            object: self.name(object, line),
            method: self.name(method, line),
            args: self.exprs(args),
            span: Span::line(line),
        }))
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    pub fn param(&self, name: &str, ty: TypeExpr<'ast>, line: u32) -> ParamDecl<'ast> {
        ParamDecl {
            id: self.fresh_id(),
            name: self.name(name, line),
            ty,
            span: Span::line(line),
        }
    }

    pub fn var_decl(
        &self,
        name: &str,
        ty: TypeExpr<'ast>,
        init: Expr<'ast>,
        line: u32,
    ) -> Decl<'ast> {
        Decl::Var(self.arena.alloc(VarDecl {
            id: self.fresh_id(),
            name: self.name(name, line),
            ty,
            init,
            span: Span::line(line),
        }))
    }

    pub fn fun(
        &self,
        name: &str,
        return_type: TypeExpr<'ast>,
        params: &[ParamDecl<'ast>],
        declarations: &[Decl<'ast>],
        body: Expr<'ast>,
        line: u32,
    ) -> Decl<'ast> {
        Decl::Fun(self.arena.alloc(FunDecl {
            id: self.fresh_id(),
            name: self.name(name, line),
            return_type,
            params: self.arena.alloc_slice_copy(params),
            declarations: self.arena.alloc_slice_copy(declarations),
            body,
            span: Span::line(line),
        }))
    }

    pub fn field(&self, name: &str, ty: TypeExpr<'ast>, line: u32) -> FieldDecl<'ast> {
        FieldDecl {
            id: self.fresh_id(),
            name: self.name(name, line),
            ty,
            span: Span::line(line),
        }
    }

    pub fn method(
        &self,
        name: &str,
        return_type: TypeExpr<'ast>,
        params: &[ParamDecl<'ast>],
        declarations: &[Decl<'ast>],
        body: Expr<'ast>,
        line: u32,
    ) -> MethodDecl<'ast> {
        MethodDecl {
            id: self.fresh_id(),
            name: self.name(name, line),
            return_type,
            params: self.arena.alloc_slice_copy(params),
            declarations: self.arena.alloc_slice_copy(declarations),
            body,
            span: Span::line(line),
        }
    }

    pub fn class(
        &self,
        name: &str,
        superclass: Option<&str>,
        fields: &[FieldDecl<'ast>],
        methods: &[MethodDecl<'ast>],
        line: u32,
    ) -> Decl<'ast> {
        Decl::Class(self.arena.alloc(ClassDecl {
            id: self.fresh_id(),
            name: self.name(name, line),
            superclass: superclass.map(|s| self.name(s, line)),
            fields: self.arena.alloc_slice_copy(fields),
            methods: self.arena.alloc_slice_copy(methods),
            span: Span::line(line),
        }))
    }

    // ========================================================================
    // Programs
    // ========================================================================

    pub fn let_in(&self, declarations: &[Decl<'ast>], body: Expr<'ast>, line: u32) -> Program<'ast> {
        Program::LetIn {
            id: self.fresh_id(),
            declarations: self.arena.alloc_slice_copy(declarations),
            body,
            span: Span::line(line),
        }
    }

    pub fn bare(&self, body: Expr<'ast>, line: u32) -> Program<'ast> {
        Program::Bare {
            id: self.fresh_id(),
            body,
            span: Span::line(line),
        }
    }
}
