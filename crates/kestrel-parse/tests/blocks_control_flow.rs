use kestrel_ast::ast::{Block, Expr, Stmt};
use kestrel_parse::parse_str;

/// Helper: parse `src` and return the tail expression.
fn parse_expr_only(src: &str) -> Expr {
    let p = parse_str("<mem>", src).expect("parse ok");
    p.tail.expect("tail expression")
}

fn parse_block_only(src: &str) -> std::rc::Rc<Block> {
    match parse_expr_only(src) {
        Expr::Block(b) => b,
        other => panic!("expected Block, got {}", other.debug(0)),
    }
}

// ============ Block tests ============

#[test]
fn block_with_tail_expression() {
    let block = parse_block_only("{ 1 + 2 }");
    assert!(block.stmts.is_empty());
    assert!(matches!(block.tail, Some(Expr::BinaryOp(_))));
}

#[test]
fn block_without_tail_trailing_semicolon() {
    let block = parse_block_only("{ 1 + 2; }");
    assert_eq!(block.stmts.len(), 1);
    assert!(matches!(&block.stmts[0], Stmt::Expr(_)));
    assert!(block.tail.is_none());
}

#[test]
fn block_with_statements_and_tail() {
    let block = parse_block_only("{ let x = 1; let y = 2; x + y }");
    assert_eq!(block.stmts.len(), 2);
    assert!(block.tail.is_some());
}

#[test]
fn empty_block() {
    let block = parse_block_only("{}");
    assert!(block.stmts.is_empty());
    assert!(block.tail.is_none());
}

#[test]
fn nested_blocks() {
    let mut src = String::new();
    for _ in 0..50 {
        src.push_str("{ ");
    }
    src.push('1');
    for _ in 0..50 {
        src.push_str(" }");
    }
    let mut block = parse_block_only(&src);
    for _ in 1..50 {
        block = match block.tail.clone() {
            Some(Expr::Block(inner)) => inner,
            _ => panic!("expected nested block"),
        };
    }
    assert!(matches!(block.tail, Some(Expr::NumberLiteral(_))));
}

// ============ If / else ============

#[test]
fn if_else() {
    let Expr::IfThenElse(i) = parse_expr_only("if x < 1 { a } else { b }") else {
        panic!("expected if");
    };
    assert!(matches!(i.cond, Expr::BinaryOp(_)));
    let branch = i.otherwise.as_ref().expect("else branch");
    assert!(matches!(branch.expr, Expr::Block(_)));
}

#[test]
fn if_without_else() {
    let Expr::IfThenElse(i) = parse_expr_only("if c { 1 }") else {
        panic!("expected if");
    };
    assert!(i.otherwise.is_none());
}

#[test]
fn else_if_chain() {
    let Expr::IfThenElse(i) = parse_expr_only("if a { 1 } else if b { 2 } else { 3 }") else {
        panic!("expected if");
    };
    let Some(branch) = &i.otherwise else {
        panic!("expected else");
    };
    let Expr::IfThenElse(inner) = &branch.expr else {
        panic!("expected nested if");
    };
    assert!(inner.otherwise.is_some());
}

// ============ Loops ============

#[test]
fn while_loop() {
    let Expr::WhileLoop(w) = parse_expr_only("while i < 10 { i = i + 1; }") else {
        panic!("expected while");
    };
    assert_eq!(w.body.stmts.len(), 1);
    assert!(matches!(w.body.stmts[0], Stmt::Assignment(_)));
}

#[test]
fn for_loop() {
    let Expr::ForLoop(f) = parse_expr_only("for x in [1, 2] { print(x); }") else {
        panic!("expected for");
    };
    assert_eq!(f.var.text, "x");
    assert!(matches!(f.iter, Expr::ArrayLiteral(_)));
}

#[test]
fn block_like_statement_needs_no_semicolon() {
    let p = parse_str("<mem>", "if c { a(); } while d { } x = 1; { 2 } 3").unwrap();
    assert_eq!(p.stmts.len(), 4);
    for stmt in &p.stmts[..2] {
        let Stmt::Expr(s) = stmt else {
            panic!("expected expression statement");
        };
        assert!(s.semi.is_none());
    }
    assert!(matches!(p.tail, Some(Expr::NumberLiteral(_))));
}

#[test]
fn trailing_control_flow_is_the_tail() {
    let p = parse_str("<mem>", "let x = 1; if x == 1 { 2 } else { 3 }").unwrap();
    assert_eq!(p.stmts.len(), 1);
    assert!(matches!(p.tail, Some(Expr::IfThenElse(_))));
}
