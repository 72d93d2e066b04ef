//! End-to-end tests: compile programs and run the generated code.

mod common;

use common::{compile_ok, execute, svm};
use fool::fool_compiler::SymbolTablePass;
use fool::prelude::*;

// =============================================================================
// Expressions
// =============================================================================

#[test]
fn arithmetic_leaves_single_result() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let sum = b.binary(b.int(2, 1), BinaryOp::Add, b.int(3, 1), 1);
    let program = b.bare(b.binary(sum, BinaryOp::Mul, b.int(4, 1), 1), 1);

    let result = compile_ok(&program);
    assert_eq!(result.program_type, Some(Type::Int));

    let code = result.bytecode.unwrap();
    let outcome = svm::run(&code, DEFAULT_MEMORY_SIZE as usize);
    assert_eq!(outcome.top, Some(20));
    assert_eq!(outcome.depth, 1);
}

#[test]
fn subtraction_and_division_keep_operand_order() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let diff = b.binary(b.int(20, 1), BinaryOp::Sub, b.int(8, 1), 1);
    let program = b.bare(b.binary(diff, BinaryOp::Div, b.int(4, 1), 1), 1);
    assert_eq!(execute(&program).top, Some(3));
}

#[test]
fn or_short_circuits_past_right_operand() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let div = b.binary(b.int(1, 1), BinaryOp::Div, b.int(0, 1), 1);
    let right = b.binary(div, BinaryOp::Equal, b.int(0, 1), 1);
    let program = b.bare(b.binary(b.bool(true, 1), BinaryOp::Or, right, 1), 1);

    let result = compile_ok(&program);
    assert_eq!(result.program_type, Some(Type::Bool));
    let code = result.bytecode.unwrap();
    let listing = code.instructions();

    // The first branch jumps past every line of the right operand.
    let div_line = listing.iter().position(|i| *i == Instruction::Div).unwrap();
    let first_branch = listing.iter().position(|i| i.target().is_some()).unwrap();
    let target = listing[first_branch].target().unwrap();
    let target_line = code.label_lines()[&target];
    assert!(first_branch < div_line);
    assert!(target_line > div_line);

    let outcome = svm::run(&code, DEFAULT_MEMORY_SIZE as usize);
    assert_eq!(outcome.top, Some(1));
    assert!(!outcome.ran_line(div_line));
}

#[test]
fn and_short_circuits_on_false() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let div = b.binary(b.int(1, 1), BinaryOp::Div, b.int(0, 1), 1);
    let right = b.binary(div, BinaryOp::Equal, b.int(0, 1), 1);
    let program = b.bare(b.binary(b.bool(false, 1), BinaryOp::And, right, 1), 1);
    assert_eq!(execute(&program).top, Some(0));
}

#[test]
fn comparisons() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let cases = [
        (BinaryOp::LessEqual, 3, 4, 1),
        (BinaryOp::LessEqual, 4, 4, 1),
        (BinaryOp::LessEqual, 5, 4, 0),
        (BinaryOp::GreaterEqual, 3, 4, 0),
        (BinaryOp::GreaterEqual, 4, 4, 1),
        (BinaryOp::GreaterEqual, 5, 4, 1),
        (BinaryOp::Equal, 4, 4, 1),
        (BinaryOp::Equal, 3, 4, 0),
    ];
    for (op, left, right, expected) in cases {
        let program = b.bare(b.binary(b.int(left, 1), op, b.int(right, 1), 1), 1);
        assert_eq!(
            execute(&program).top,
            Some(expected),
            "{left} {op} {right}"
        );
    }
}

#[test]
fn not_and_if() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let cond = b.not(b.bool(false, 1), 1);
    let program = b.bare(b.if_expr(cond, b.int(7, 1), b.int(9, 1), 1), 1);
    assert_eq!(execute(&program).top, Some(7));

    let cond = b.not(b.bool(true, 1), 1);
    let program = b.bare(b.if_expr(cond, b.int(7, 1), b.int(9, 1), 1), 1);
    assert_eq!(execute(&program).top, Some(9));
}

#[test]
fn print_keeps_its_value() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let x = b.var_decl("x", b.int_type(1), b.int(3, 1), 1);
    let printed = b.print(b.binary(b.ident("x", 2), BinaryOp::Add, b.int(1, 2), 2), 2);
    let program = b.let_in(&[x], b.binary(printed, BinaryOp::Mul, b.int(2, 2), 2), 1);

    let outcome = execute(&program);
    assert_eq!(outcome.printed, vec![4]);
    assert_eq!(outcome.top, Some(8));
}

// =============================================================================
// Functions
// =============================================================================

#[test]
fn recursive_function() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let n = || b.ident("n", 2);
    let base = b.binary(n(), BinaryOp::LessEqual, b.int(1, 2), 2);
    let pred = b.binary(n(), BinaryOp::Sub, b.int(1, 2), 2);
    let step = b.binary(n(), BinaryOp::Mul, b.call("fact", &[pred], 2), 2);
    let body = b.if_expr(base, b.int(1, 2), step, 2);
    let fact = b.fun("fact", b.int_type(1), &[b.param("n", b.int_type(1), 1)], &[], body, 1);
    let program = b.let_in(&[fact], b.call("fact", &[b.int(5, 3)], 3), 1);

    let outcome = execute(&program);
    assert_eq!(outcome.top, Some(120));
}

#[test]
fn arguments_bind_in_declaration_order() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let params = [b.param("a", b.int_type(1), 1), b.param("c", b.int_type(1), 1)];
    let body = b.binary(b.ident("a", 1), BinaryOp::Sub, b.ident("c", 1), 1);
    let minus = b.fun("minus", b.int_type(1), &params, &[], body, 1);
    let program = b.let_in(&[minus], b.call("minus", &[b.int(10, 2), b.int(3, 2)], 2), 1);
    assert_eq!(execute(&program).top, Some(7));
}

#[test]
fn nested_functions_follow_access_links() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let g = b.var_decl("g", b.int_type(1), b.int(10, 1), 1);
    let inner_body = b.binary(
        b.binary(b.ident("a", 3), BinaryOp::Add, b.ident("x", 3), 3),
        BinaryOp::Add,
        b.ident("g", 3),
        3,
    );
    let inner = b.fun(
        "inner",
        b.int_type(3),
        &[b.param("x", b.int_type(3), 3)],
        &[],
        inner_body,
        3,
    );
    let local = b.var_decl("a", b.int_type(2), b.ident("p", 2), 2);
    let outer = b.fun(
        "outer",
        b.int_type(2),
        &[b.param("p", b.int_type(2), 2)],
        &[local, inner],
        b.call("inner", &[b.int(5, 4)], 4),
        2,
    );
    let program = b.let_in(&[g, outer], b.call("outer", &[b.int(1, 5)], 5), 1);

    let outcome = execute(&program);
    assert_eq!(outcome.top, Some(16));
}

#[test]
fn stack_is_balanced_after_calls() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let local = b.var_decl("l", b.int_type(1), b.int(1, 1), 1);
    let params = [b.param("a", b.int_type(1), 1), b.param("c", b.int_type(1), 1)];
    let f = b.fun("f", b.int_type(1), &params, &[local], b.ident("l", 1), 1);
    let call = || b.call("f", &[b.int(1, 2), b.int(2, 2)], 2);
    let program = b.let_in(&[f], b.binary(call(), BinaryOp::Add, call(), 2), 1);

    let outcome = execute(&program);
    assert_eq!(outcome.top, Some(2));
    // The dummy slot, f's label and the result.
    assert_eq!(outcome.depth, 3);
}

// =============================================================================
// Objects
// =============================================================================

#[test]
fn methods_read_fields_of_their_receiver() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let fields = [b.field("balance", b.int_type(1), 1)];
    let deposit_body = b.binary(b.ident("balance", 1), BinaryOp::Add, b.ident("amount", 1), 1);
    let methods = [
        b.method("get", b.int_type(1), &[], &[], b.ident("balance", 1), 1),
        b.method(
            "deposit",
            b.int_type(1),
            &[b.param("amount", b.int_type(1), 1)],
            &[],
            deposit_body,
            1,
        ),
    ];
    let account = b.class("Account", None, &fields, &methods, 1);
    let acc = b.var_decl(
        "acc",
        b.ref_type("Account", 2),
        b.new_object("Account", &[b.int(100, 2)], 2),
        2,
    );
    let program = b.let_in(&[account, acc], b.method_call("acc", "deposit", &[b.int(50, 3)], 3), 1);

    assert_eq!(execute(&program).top, Some(150));
}

#[test]
fn fields_keep_declaration_order() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let fields = [b.field("x", b.int_type(1), 1), b.field("y", b.int_type(1), 1)];
    let body = b.binary(b.ident("x", 1), BinaryOp::Sub, b.ident("y", 1), 1);
    let methods = [b.method("diff", b.int_type(1), &[], &[], body, 1)];
    let point = b.class("P", None, &fields, &methods, 1);
    let p = b.var_decl("p", b.ref_type("P", 2), b.new_object("P", &[b.int(9, 2), b.int(4, 2)], 2), 2);
    let program = b.let_in(&[point, p], b.method_call("p", "diff", &[], 3), 1);

    assert_eq!(execute(&program).top, Some(5));
}

#[test]
fn methods_call_siblings_through_the_receiver() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let fields = [b.field("v", b.int_type(1), 1)];
    let double = b.binary(b.ident("v", 1), BinaryOp::Add, b.ident("v", 1), 1);
    let quad = b.binary(b.call("double", &[], 1), BinaryOp::Add, b.call("double", &[], 1), 1);
    let methods = [
        b.method("double", b.int_type(1), &[], &[], double, 1),
        b.method("quad", b.int_type(1), &[], &[], quad, 1),
    ];
    let class = b.class("C", None, &fields, &methods, 1);
    let c = b.var_decl("c", b.ref_type("C", 2), b.new_object("C", &[b.int(3, 2)], 2), 2);
    let program = b.let_in(&[class, c], b.method_call("c", "quad", &[], 3), 1);

    assert_eq!(execute(&program).top, Some(12));
}

#[test]
fn inherited_methods_dispatch_at_the_same_offset() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let base_methods = [
        b.method("m", b.int_type(1), &[], &[], b.int(1, 1), 1),
        b.method("n", b.int_type(1), &[], &[], b.int(2, 1), 1),
    ];
    let base = b.class("A", None, &[], &base_methods, 1);
    let sub_methods = [b.method("m", b.int_type(2), &[], &[], b.int(10, 2), 2)];
    let sub = b.class("B", Some("A"), &[], &sub_methods, 2);
    let a = b.var_decl("a", b.ref_type("A", 3), b.new_object("A", &[], 3), 3);
    let bb = b.var_decl("bb", b.ref_type("B", 4), b.new_object("B", &[], 4), 4);

    let on_sub = b.method_call("bb", "n", &[], 5);
    let on_base = b.method_call("a", "n", &[], 5);
    let overridden = b.method_call("bb", "m", &[], 5);
    let body = b.binary(
        b.binary(on_sub, BinaryOp::Add, on_base, 5),
        BinaryOp::Add,
        b.binary(overridden, BinaryOp::Mul, b.int(100, 5), 5),
        5,
    );
    let program = b.let_in(&[base, sub, a, bb], body, 1);

    let bound = SymbolTablePass::new().run(&program);
    let offset = |call: Expr<'_>| bound.annotations.method_entry(call.id()).map(|e| e.offset);
    assert_eq!(offset(on_sub), Some(1));
    assert_eq!(offset(on_sub), offset(on_base));
    assert_eq!(offset(overridden), Some(0));

    assert_eq!(execute(&program).top, Some(1004));
}

#[test]
fn subclass_extends_inherited_fields() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let base = b.class(
        "A",
        None,
        &[b.field("x", b.int_type(1), 1)],
        &[b.method("getx", b.int_type(1), &[], &[], b.ident("x", 1), 1)],
        1,
    );
    let sub = b.class(
        "B",
        Some("A"),
        &[b.field("y", b.int_type(2), 2)],
        &[b.method("gety", b.int_type(2), &[], &[], b.ident("y", 2), 2)],
        2,
    );
    let obj = b.var_decl("o", b.ref_type("B", 3), b.new_object("B", &[b.int(1, 3), b.int(2, 3)], 3), 3);
    let body = b.binary(
        b.method_call("o", "getx", &[], 4),
        BinaryOp::Add,
        b.binary(b.method_call("o", "gety", &[], 4), BinaryOp::Mul, b.int(10, 4), 4),
        4,
    );
    let program = b.let_in(&[base, sub, obj], body, 1);

    assert_eq!(execute(&program).top, Some(21));
}

#[test]
fn null_compares_equal_to_null_references() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let class = b.class("A", None, &[], &[], 1);
    let a = b.var_decl("a", b.ref_type("A", 2), b.null(2), 2);
    let program = b.let_in(&[class, a], b.binary(b.ident("a", 3), BinaryOp::Equal, b.null(3), 3), 1);
    assert_eq!(execute(&program).top, Some(1));
}

#[test]
fn memory_size_is_configurable() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let fields = [b.field("v", b.int_type(1), 1)];
    let methods = [b.method("get", b.int_type(1), &[], &[], b.ident("v", 1), 1)];
    let class = b.class("C", None, &fields, &methods, 1);
    let c = b.var_decl("c", b.ref_type("C", 2), b.new_object("C", &[b.int(42, 2)], 2), 2);
    let program = b.let_in(&[class, c], b.method_call("c", "get", &[], 3), 1);

    let result = fool::compile(&program, CompilerConfig::new().with_memory_size(256));
    let code = result.bytecode.expect("program compiles");
    assert!(code.iter().any(|i| *i == Instruction::push(254)));
    assert_eq!(svm::run(&code, 256).top, Some(42));
}
