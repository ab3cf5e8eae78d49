use indoc::indoc;

use crate::ast::{BinaryOp, ExprKind, StmtKind};
use crate::parser::parse;

fn parse_ok(source: &str) -> crate::ast::Program {
    let result = parse(source);
    assert!(
        !result.diagnostics.has_errors(),
        "syntax errors:\n{}",
        result.diagnostics.printer().source(source).render()
    );
    result.program
}

#[test]
fn binary_chains_nest_left() {
    let program = parse_ok("let r = 1 - 2 - 3;");
    let StmtKind::Var(decl) = &program.stmts[0].kind else {
        panic!("expected declaration");
    };
    let ExprKind::Binary { op, left, right } = &decl.init.as_ref().unwrap().kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Sub);
    assert!(matches!(right.kind, ExprKind::Int(3)));
    // Left operand is itself 1 - 2.
    let ExprKind::Binary { left: ll, right: lr, .. } = &left.kind else {
        panic!("expected nested binary");
    };
    assert!(matches!(ll.kind, ExprKind::Int(1)));
    assert!(matches!(lr.kind, ExprKind::Int(2)));
}

#[test]
fn precedence_mul_over_add() {
    let program = parse_ok("let r = 1 + 2 * 3;");
    let StmtKind::Var(decl) = &program.stmts[0].kind else {
        panic!()
    };
    let ExprKind::Binary { op, right, .. } = &decl.init.as_ref().unwrap().kind else {
        panic!()
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(
        right.kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn postfix_chain_nests() {
    let program = parse_ok("a.b[0](1);");
    let StmtKind::ExprStmt { expr } = &program.stmts[0].kind else {
        panic!()
    };
    let ExprKind::Call { callee, args } = &expr.kind else {
        panic!("expected call at the top")
    };
    assert_eq!(args.len(), 1);
    let ExprKind::Index { arr, .. } = &callee.kind else {
        panic!("expected index under call")
    };
    let ExprKind::Member { obj, name } = &arr.kind else {
        panic!("expected member under index")
    };
    assert_eq!(name, "b");
    assert!(matches!(&obj.kind, ExprKind::Name(n) if n == "a"));
}

#[test]
fn degenerate_ternary_collapses() {
    let program = parse_ok("let x = 1;");
    let StmtKind::Var(decl) = &program.stmts[0].kind else {
        panic!()
    };
    assert!(matches!(decl.init.as_ref().unwrap().kind, ExprKind::Int(1)));
}

#[test]
fn this_becomes_a_name() {
    let program = parse_ok("this;");
    let StmtKind::ExprStmt { expr } = &program.stmts[0].kind else {
        panic!()
    };
    assert!(matches!(&expr.kind, ExprKind::Name(n) if n == "this"));
}

#[test]
fn new_expression() {
    let program = parse_ok("new Dog(1, 2);");
    let StmtKind::ExprStmt { expr } = &program.stmts[0].kind else {
        panic!()
    };
    let ExprKind::New { class_name, args } = &expr.kind else {
        panic!()
    };
    assert_eq!(class_name, "Dog");
    assert_eq!(args.len(), 2);
}

#[test]
fn assignment_targets() {
    let program = parse_ok("x = 1; a.b = 2; c[0] = 3;");
    assert!(matches!(
        &program.stmts[0].kind,
        StmtKind::Assign { target, .. } if matches!(target.kind, ExprKind::Name(_))
    ));
    assert!(matches!(
        &program.stmts[1].kind,
        StmtKind::Assign { target, .. } if matches!(target.kind, ExprKind::Member { .. })
    ));
    assert!(matches!(
        &program.stmts[2].kind,
        StmtKind::Assign { target, .. } if matches!(target.kind, ExprKind::Index { .. })
    ));
}

#[test]
fn non_lvalue_assignment_is_a_syntax_error() {
    let result = parse("1 + 2 = 3;");
    assert!(result.diagnostics.has_errors());
}

#[test]
fn array_type_annotations() {
    let program = parse_ok("let m: integer[][] = [[1]];");
    let StmtKind::Var(decl) = &program.stmts[0].kind else {
        panic!()
    };
    let ty = decl.ty.as_ref().unwrap();
    let crate::ast::TypeRefKind::Array(inner) = &ty.kind else {
        panic!("outer array")
    };
    assert!(matches!(
        &inner.kind,
        crate::ast::TypeRefKind::Array(_)
    ));
}

#[test]
fn class_with_base_fields_and_methods() {
    let program = parse_ok(indoc! {"
        class B : A {
            let x: integer;
            function constructor(x: integer) { }
            function m(): integer { return 1; }
        }
    "});
    let StmtKind::Class(class) = &program.stmts[0].kind else {
        panic!()
    };
    assert_eq!(class.base.as_deref(), Some("A"));
    assert_eq!(class.fields.len(), 1);
    assert_eq!(class.methods.len(), 2);
    assert!(class.methods[0].is_constructor);
    assert!(class.methods.iter().all(|m| m.is_method));
}

#[test]
fn for_clauses_are_optional() {
    parse_ok("for (;;) { }");
    parse_ok("for (let i: integer = 0; i < 3; i = i + 1) { }");
    parse_ok("for (; true;) { }");
}

#[test]
fn switch_with_cases_and_default() {
    let program = parse_ok(indoc! {r#"
        switch (x) {
            case 1: print(1); break;
            case 2: print(2);
            default: print(0);
        }
    "#});
    let StmtKind::Switch { cases, default, .. } = &program.stmts[0].kind else {
        panic!()
    };
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].body.stmts.len(), 2);
    assert!(default.is_some());
}

#[test]
fn try_catch_binds_error_name() {
    let program = parse_ok("try { } catch (oops) { }");
    let StmtKind::TryCatch { err_name, .. } = &program.stmts[0].kind else {
        panic!()
    };
    assert_eq!(err_name, "oops");
}

#[test]
fn node_ids_are_dense() {
    let result = parse("let x = 1 + 2;");
    // Three expressions: 1, 2, and the sum.
    assert_eq!(result.node_count, 3);
}

#[test]
fn missing_semicolon_reported() {
    let result = parse("let x = 1");
    assert!(result.diagnostics.has_errors());
}

#[test]
fn unclosed_block_reported() {
    let result = parse("function f(): void { ");
    assert!(result.diagnostics.has_errors());
}
