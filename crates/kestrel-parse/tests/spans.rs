//! Tests for span tracking in the parser.
//!
//! Bracket-backed nodes report their bracket pair's span; everything else
//! joins its own tokens with its children's spans.

use kestrel_ast::ast::{Expr, Stmt};
use kestrel_parse::parse_str;

fn range(span: kestrel_ast::span::Span) -> (usize, usize) {
    (span.start, span.end)
}

/// Assignment spans run from `let` to the semicolon.
#[test]
fn test_let_span_ends_at_semicolon() {
    let src = "let x = 1; let y = 2;";
    let p = parse_str("<test>", src).expect("parse failed");
    assert_eq!(range(p.stmts[0].span()), (0, 10));
    assert_eq!(range(p.stmts[1].span()), (11, 21));
    assert_eq!(range(p.span()), (0, 21));
}

/// Call expressions span from callee to closing paren.
#[test]
fn test_call_span_ends_at_rparen() {
    let src = "let x = foo(1, 2);";
    let p = parse_str("<test>", src).expect("parse failed");
    let Stmt::Assignment(a) = &p.stmts[0] else {
        panic!("expected assignment");
    };
    let Expr::FunctionCall(call) = &a.value else {
        panic!("expected call");
    };
    assert_eq!(range(a.value.span()), (8, 17));
    assert_eq!(range(call.args.span()), (11, 17));
}

#[test]
fn test_block_span_is_brace_span() {
    let src = "x = { 1 };";
    let p = parse_str("<test>", src).unwrap();
    let Stmt::Assignment(a) = &p.stmts[0] else {
        panic!("expected assignment");
    };
    assert_eq!(range(a.value.span()), (4, 9));
}

#[test]
fn test_if_span_covers_else_branch() {
    let src = "if a { 1 } else { 2 }";
    let p = parse_str("<test>", src).unwrap();
    assert_eq!(range(p.tail.unwrap().span()), (0, src.len()));
}

#[test]
fn test_binary_and_unary_spans() {
    let src = "-a + bc";
    let p = parse_str("<test>", src).unwrap();
    let tail = p.tail.unwrap();
    assert_eq!(range(tail.span()), (0, 7));
    let Expr::BinaryOp(b) = tail else {
        panic!("expected binary");
    };
    assert_eq!(range(b.left.span()), (0, 2));
    assert_eq!(range(b.right.span()), (5, 7));
}

#[test]
fn test_field_assignment_span_starts_at_base() {
    let src = "  a.b = 1;";
    let p = parse_str("<test>", src).unwrap();
    assert_eq!(range(p.stmts[0].span()), (2, 10));
}

#[test]
fn test_spans_carry_file() {
    let p = parse_str("lib/util.ks", "x").unwrap();
    assert_eq!(&*p.tail.unwrap().span().file, "lib/util.ks");
}
