//! Code generation - lower a checked program to stack-machine code.
//!
//! Runs only on programs that passed both earlier passes, so it performs no
//! checks of its own. A missing annotation means an earlier pass broke its
//! contract and is reported as [`CompilationError::Internal`].
//!
//! ## Activation records
//!
//! A call pushes the caller's `fp` (control link), the arguments last to
//! first, and the access link, then jumps. The callee saves `ra` and pushes
//! its local declarations. On return the result goes through `tm` while the
//! record is popped:
//!
//! ```text
//! functionN:
//!   cfp lra            ; fp = sp, push return address
//!   <declarations>
//!   <body>
//!   stm                ; result -> tm
//!   pop * locals
//!   sra pop            ; restore ra, drop access link
//!   pop * params
//!   sfp                ; restore caller fp from control link
//!   ltm lra js         ; push result, return
//! ```
//!
//! Methods use the same shape; their access link is the receiver object.
//!
//! ## Objects
//!
//! Objects live on the heap: fields first (last field lowest), then the
//! dispatch-table pointer. An object reference points at the dispatch-table
//! pointer, so field `i` (1-based) is at `obj - i`.

use fool_ast::{BinaryOp, ClassDecl, Decl, Expr, Ident, MethodDecl, ParamDecl, Program};
use fool_core::{CompilationError, NodeId, Span};
use rustc_hash::FxHashMap;

use crate::annotations::{Annotations, StEntry};
use crate::bytecode::{Bytecode, Instruction, Label};
use crate::context::CompilerConfig;
use crate::emit::CodeEmitter;
use crate::types::Type;

type Result<T> = std::result::Result<T, CompilationError>;

/// Generates code for a checked program.
pub struct CodeGenerator<'a> {
    annotations: &'a Annotations,
    config: &'a CompilerConfig,
    emitter: CodeEmitter,
    /// Method labels of each class, by dispatch-table slot.
    dispatch_tables: FxHashMap<String, Vec<Label>>,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(annotations: &'a Annotations, config: &'a CompilerConfig) -> Self {
        Self {
            annotations,
            config,
            emitter: CodeEmitter::new(),
            dispatch_tables: FxHashMap::default(),
        }
    }

    /// Generate the code of a whole program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn generate(mut self, program: &Program<'_>) -> Result<Bytecode> {
        log::debug!("codegen: start");

        match program {
            Program::LetIn {
                declarations, body, ..
            } => {
                self.emitter.emit_push(0);
                for decl in declarations.iter() {
                    self.gen_decl(decl)?;
                }
                self.gen_expr(body)?;
            }
            Program::Bare { body, .. } => self.gen_expr(body)?,
        }
        self.emitter.emit(Instruction::Halt);

        let code = self.emitter.finish();
        log::debug!("codegen: done, {} lines", code.len());
        Ok(code)
    }

    // ========================================================================
    // Annotation access
    // ========================================================================

    fn internal(what: &str, span: Span) -> CompilationError {
        CompilationError::Internal {
            message: format!("no {what} recorded for node at {span}"),
        }
    }

    fn entry(&self, node: NodeId, span: Span) -> Result<&'a StEntry> {
        self.annotations
            .resolved(node)
            .ok_or_else(|| Self::internal("entry", span))
    }

    /// Number of access links to follow from a use to its declaration.
    fn hops(&self, node: NodeId, entry: &StEntry, span: Span) -> Result<usize> {
        let level = self
            .annotations
            .use_level(node)
            .ok_or_else(|| Self::internal("nesting level", span))?;
        level
            .checked_sub(entry.nesting_level)
            .map(|hops| hops as usize)
            .ok_or_else(|| Self::internal("enclosing declaration", span))
    }

    /// Push the frame that declared the entry used by `node`.
    fn emit_frame_of(&mut self, node: NodeId, entry: &StEntry, span: Span) -> Result<()> {
        let hops = self.hops(node, entry, span)?;
        self.emitter.emit(Instruction::Lfp);
        self.emitter.emit_repeated(Instruction::Lw, hops);
        Ok(())
    }

    /// Replace the address on the stack with the word `offset` past it.
    fn emit_load_at(&mut self, offset: i32) {
        self.emitter.emit_push(offset);
        self.emitter.emit(Instruction::Add);
        self.emitter.emit(Instruction::Lw);
    }

    /// Store the top of the stack at `hp` and advance `hp`.
    fn emit_heap_store(&mut self) {
        self.emitter.emit(Instruction::Lhp);
        self.emitter.emit(Instruction::Sw);
        self.emit_bump_heap();
    }

    fn emit_bump_heap(&mut self) {
        self.emitter.emit(Instruction::Lhp);
        self.emitter.emit_push(1);
        self.emitter.emit(Instruction::Add);
        self.emitter.emit(Instruction::Shp);
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn gen_decl(&mut self, decl: &Decl<'_>) -> Result<()> {
        match decl {
            Decl::Fun(fun) => {
                let label = self.gen_function(fun.params, fun.declarations, &fun.body)?;
                self.emitter.emit_push_label(label);
            }
            Decl::Var(var) => self.gen_expr(&var.init)?,
            Decl::Class(class) => self.gen_class(class)?,
        }
        Ok(())
    }

    /// Emit a function or method body out of line and return its label.
    fn gen_function(
        &mut self,
        params: &[ParamDecl<'_>],
        declarations: &[Decl<'_>],
        body: &Expr<'_>,
    ) -> Result<Label> {
        let outer = self.emitter.begin_block();
        for decl in declarations {
            self.gen_decl(decl)?;
        }
        let decl_code = self.emitter.end_block(outer);

        let label = self.emitter.fresh_function_label();
        let outer = self.emitter.begin_block();
        self.emitter.place_label(label);
        self.emitter.emit(Instruction::Cfp);
        self.emitter.emit(Instruction::Lra);
        self.emitter.append(decl_code);
        self.gen_expr(body)?;
        self.emitter.emit(Instruction::Stm);
        self.emitter.emit_repeated(Instruction::Pop, declarations.len());
        self.emitter.emit(Instruction::Sra);
        self.emitter.emit(Instruction::Pop);
        self.emitter.emit_repeated(Instruction::Pop, params.len());
        self.emitter.emit(Instruction::Sfp);
        self.emitter.emit(Instruction::Ltm);
        self.emitter.emit(Instruction::Lra);
        self.emitter.emit(Instruction::Js);
        let code = self.emitter.end_block(outer);
        self.emitter.add_function(code);

        Ok(label)
    }

    fn gen_method(&mut self, method: &MethodDecl<'_>) -> Result<Label> {
        self.gen_function(method.params, method.declarations, &method.body)
    }

    /// Build the dispatch table of a class on the heap. The class evaluates
    /// to the table's address.
    fn gen_class(&mut self, class: &ClassDecl<'_>) -> Result<()> {
        let mut table = match class.superclass {
            Some(superclass) => self
                .dispatch_tables
                .get(superclass.name)
                .cloned()
                .ok_or_else(|| Self::internal("dispatch table", superclass.span))?,
            None => Vec::new(),
        };

        for method in class.methods {
            let label = self.gen_method(method)?;
            let offset = self.entry(method.id, method.name.span)?.offset;
            match usize::try_from(offset).ok().and_then(|slot| table.get_mut(slot)) {
                Some(slot) => *slot = label,
                None => table.push(label),
            }
        }

        self.emitter.emit(Instruction::Lhp);
        for label in &table {
            self.emitter.emit_push_label(*label);
            self.emit_heap_store();
        }

        log::trace!("class {}: dispatch table of {} entries", class.name.name, table.len());
        self.dispatch_tables.insert(class.name.name.to_string(), table);
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn gen_exprs_reversed(&mut self, exprs: &[Expr<'_>]) -> Result<()> {
        for expr in exprs.iter().rev() {
            self.gen_expr(expr)?;
        }
        Ok(())
    }

    fn gen_expr(&mut self, expr: &Expr<'_>) -> Result<()> {
        match expr {
            Expr::Int(lit) => self.emitter.emit_push(lit.value),
            Expr::Bool(lit) => self.emitter.emit_push(i32::from(lit.value)),
            Expr::Null(_) => self.emitter.emit_push(-1),
            Expr::Ident(ident) => {
                let entry = self.entry(ident.id, ident.name.span)?;
                self.emit_frame_of(ident.id, entry, ident.name.span)?;
                self.emit_load_at(entry.offset);
            }
            Expr::Binary(binary) => self.gen_binary(binary.op, &binary.left, &binary.right)?,
            Expr::Not(not) => {
                let (was_false, end_label) = self.fresh_label_pair();
                self.gen_expr(&not.operand)?;
                self.emitter.emit_push(0);
                self.emit_compare(Instruction::Beq(was_false), was_false, end_label);
            }
            Expr::If(if_expr) => {
                let (then_label, end_label) = self.fresh_label_pair();
                self.gen_expr(&if_expr.condition)?;
                self.emitter.emit_push(1);
                self.emitter.emit(Instruction::Beq(then_label));
                self.gen_expr(&if_expr.else_branch)?;
                self.emitter.emit(Instruction::B(end_label));
                self.emitter.place_label(then_label);
                self.gen_expr(&if_expr.then_branch)?;
                self.emitter.place_label(end_label);
            }
            Expr::Print(print) => {
                self.gen_expr(&print.expr)?;
                self.emitter.emit(Instruction::Print);
            }
            Expr::Call(call) => {
                let entry = self.entry(call.id, call.callee.span)?;
                self.emitter.emit(Instruction::Lfp);
                self.gen_exprs_reversed(call.args)?;
                self.emit_frame_of(call.id, entry, call.callee.span)?;
                self.emit_access_link();
                if matches!(entry.ty, Type::Method(_)) {
                    // Through the receiver's dispatch table.
                    self.emitter.emit(Instruction::Lw);
                }
                self.emit_load_at(entry.offset);
                self.emitter.emit(Instruction::Js);
            }
            Expr::New(new) => self.gen_new(new.id, new.class, new.args)?,
            Expr::MethodCall(call) => {
                let object = self.entry(call.id, call.object.span)?;
                let method = self
                    .annotations
                    .method_entry(call.id)
                    .ok_or_else(|| Self::internal("method entry", call.method.span))?;

                self.emitter.emit(Instruction::Lfp);
                self.gen_exprs_reversed(call.args)?;
                self.emit_frame_of(call.id, object, call.object.span)?;
                self.emit_load_at(object.offset);
                self.emit_access_link();
                self.emitter.emit(Instruction::Lw);
                self.emit_load_at(method.offset);
                self.emitter.emit(Instruction::Js);
            }
        }
        Ok(())
    }

    /// Keep the address on the stack as the access link and leave a copy of
    /// it on top.
    fn emit_access_link(&mut self) {
        self.emitter.emit(Instruction::Stm);
        self.emitter.emit(Instruction::Ltm);
        self.emitter.emit(Instruction::Ltm);
    }

    fn gen_new(&mut self, node: NodeId, class: Ident<'_>, args: &[Expr<'_>]) -> Result<()> {
        let entry = self.entry(node, class.span)?;
        for arg in args {
            self.gen_expr(arg)?;
        }
        for _ in args {
            self.emit_heap_store();
        }

        // The class's dispatch-table address sits in its global slot.
        self.emitter.emit_push(self.config.memory_size + entry.offset);
        self.emitter.emit(Instruction::Lw);
        self.emitter.emit(Instruction::Lhp);
        self.emitter.emit(Instruction::Sw);
        self.emitter.emit(Instruction::Lhp);
        self.emit_bump_heap();
        Ok(())
    }

    fn gen_binary(&mut self, op: BinaryOp, left: &Expr<'_>, right: &Expr<'_>) -> Result<()> {
        let arithmetic = match op {
            BinaryOp::Add => Some(Instruction::Add),
            BinaryOp::Sub => Some(Instruction::Sub),
            BinaryOp::Mul => Some(Instruction::Mult),
            BinaryOp::Div => Some(Instruction::Div),
            _ => None,
        };
        if let Some(instr) = arithmetic {
            self.gen_expr(left)?;
            self.gen_expr(right)?;
            self.emitter.emit(instr);
            return Ok(());
        }

        let (taken, end_label) = self.fresh_label_pair();
        let (branch, first, second) = match op {
            BinaryOp::Or => return self.gen_short_circuit(1, left, right, taken, end_label),
            BinaryOp::And => return self.gen_short_circuit(0, left, right, taken, end_label),
            BinaryOp::Equal => (Instruction::Beq(taken), left, right),
            BinaryOp::LessEqual => (Instruction::Bleq(taken), left, right),
            // a >= b is b <= a
            _ => (Instruction::Bleq(taken), right, left),
        };
        self.gen_expr(first)?;
        self.gen_expr(second)?;
        self.emit_compare(branch, taken, end_label);
        Ok(())
    }

    fn fresh_label_pair(&mut self) -> (Label, Label) {
        (self.emitter.fresh_label(), self.emitter.fresh_label())
    }

    /// Emit `branch` to `taken` over the two values on the stack, leaving 1
    /// if it is taken, else 0.
    fn emit_compare(&mut self, branch: Instruction, taken: Label, end_label: Label) {
        self.emitter.emit(branch);
        self.emitter.emit_push(0);
        self.emitter.emit(Instruction::B(end_label));
        self.emitter.place_label(taken);
        self.emitter.emit_push(1);
        self.emitter.place_label(end_label);
    }

    /// `or` (`decisive` = 1) and `and` (`decisive` = 0): once an operand
    /// equals `decisive` the rest is skipped.
    fn gen_short_circuit(
        &mut self,
        decisive: i32,
        left: &Expr<'_>,
        right: &Expr<'_>,
        decided: Label,
        end_label: Label,
    ) -> Result<()> {
        for operand in [left, right] {
            self.gen_expr(operand)?;
            self.emitter.emit_push(decisive);
            self.emitter.emit(Instruction::Beq(decided));
        }
        self.emitter.emit_push(1 - decisive);
        self.emitter.emit(Instruction::B(end_label));
        self.emitter.place_label(decided);
        self.emitter.emit_push(decisive);
        self.emitter.place_label(end_label);
        Ok(())
    }
}
