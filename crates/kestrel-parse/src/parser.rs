//! Recursive-descent parser over a grouped token tree.
//!
//! Every production takes a `&mut ParseStream`. A production that fails with
//! a non-critical error may have consumed part of its input, so callers that
//! want to try another alternative snapshot the stream first; [`attempt!`]
//! does that. Statements parse their expression once and decide afterwards
//! whether it was an assignment target, a statement, or the body's tail.
//! Once a production has seen the token that identifies it (`let`,
//! the `=` of an assignment, a keyword, a `.`, a binary operator) its errors
//! are marked critical and travel straight to the top.

use crate::error::{Commit, PResult, ParserError};
use crate::stream::ParseStream;
use kestrel_ast::ast::{
    ArrayLiteral, Assignment, BinOp, BinaryOp, Block, BoolLiteral, ElseBranch, Expr, ExprStmt,
    FieldAccess, ForLoop, FunctionCall, FunctionLiteral, IfThenElse, List, MethodCall, Paren,
    Program, Stmt, UnOp, UnaryOp, Variable, WhileLoop,
};
use kestrel_ast::group::{Group, ParenPair};
use kestrel_ast::lexeme::{NumberLit, ParenKind, Punct, StringLit, Word};
use std::rc::Rc;

pub const KEYWORDS: [&str; 9] = [
    "let", "if", "else", "while", "for", "in", "func", "true", "false",
];

/// Run a production on a snapshot of the stream. Success yields `Some`, a
/// non-critical failure rewinds and yields `None`, a critical one returns
/// from the enclosing function.
macro_rules! attempt {
    ($input:ident, $parse:expr) => {{
        let saved = *$input;
        match $parse {
            Ok(value) => Some(value),
            Err(e) if e.critical => return Err(e),
            Err(_) => {
                *$input = saved;
                None
            }
        }
    }};
}

pub fn parse_program(root: &Group) -> PResult<Program> {
    let mut input = ParseStream::new(root);
    let (stmts, tail) = parse_body(&mut input)?;
    Ok(Program { stmts, tail })
}

// ======= statements =======

/// Result of parsing one statement. An expression that is missing its `;`
/// is handed back with the error, so the body can take it as its tail
/// without parsing it again.
enum StmtOutcome {
    Stmt(Stmt),
    Unterminated(Expr, ParserError),
}

fn parse_body(input: &mut ParseStream<'_>) -> PResult<(Vec<Stmt>, Option<Expr>)> {
    let mut stmts = Vec::new();
    while !input.is_empty() {
        match parse_stmt(input)? {
            StmtOutcome::Stmt(stmt) => stmts.push(stmt),
            StmtOutcome::Unterminated(tail, stmt_err) => {
                if !input.is_empty() {
                    return Err(input.expected("; or }").critical().caused_by(stmt_err));
                }
                return Ok((stmts, Some(tail)));
            }
        }
    }
    Ok((stmts, None))
}

fn parse_stmt(input: &mut ParseStream<'_>) -> PResult<StmtOutcome> {
    if let Ok(semi) = input.parse::<Punct>(Some(";")) {
        return Ok(StmtOutcome::Stmt(Stmt::Empty(semi)));
    }

    let let_kw = attempt!(input, input.parse::<Word>(Some("let")));
    let expr = match let_kw {
        Some(_) => parse_access(input),
        None => parse_expr(input),
    }
    .committed()?;

    if let_kw.is_some() || input.peek("=") {
        let assignment = parse_assignment(input, let_kw, expr)?;
        return Ok(StmtOutcome::Stmt(Stmt::Assignment(Rc::new(assignment))));
    }
    reject_compound_assignment(input)?;

    // `if c { ... } next();` reads naturally without a `;` after the block
    let semi = if expr.is_block_like() && !input.is_empty() && !input.peek(";") {
        None
    } else {
        match input.parse::<Punct>(Some(";")) {
            Ok(semi) => Some(semi),
            Err(e) => return Ok(StmtOutcome::Unterminated(expr, e)),
        }
    };
    Ok(StmtOutcome::Stmt(Stmt::Expr(Rc::new(ExprStmt { expr, semi }))))
}

/// The rest of an assignment once its target is parsed: `= value;`.
fn parse_assignment(
    input: &mut ParseStream<'_>,
    let_kw: Option<Word>,
    target: Expr,
) -> PResult<Assignment> {
    let (base, field) = match target {
        Expr::Variable(v) => (None, v.name.clone()),
        Expr::FieldAccess(f) if let_kw.is_none() => (Some(f.base.clone()), f.field.clone()),
        other => {
            let expected = if let_kw.is_some() {
                "variable name"
            } else {
                "assignable expression"
            };
            return Err(ParserError::new(other.span(), expected, "expression").critical());
        }
    };

    reject_compound_assignment(input)?;
    let assign = input.parse::<Punct>(Some("=")).committed()?;
    let value = parse_expr(input).committed()?;
    let semi = input.parse::<Punct>(Some(";")).committed()?;
    Ok(Assignment {
        let_kw,
        base,
        field,
        assign,
        value,
        semi,
    })
}

const COMPOUND_ASSIGNMENTS: [&str; 6] = ["+=", "-=", "*=", "/=", "%=", "~="];

fn reject_compound_assignment(input: &ParseStream<'_>) -> PResult<()> {
    match COMPOUND_ASSIGNMENTS.iter().find(|op| input.peek(op)) {
        Some(op) => Err(input
            .expected(format!("`=` (`{op}` is reserved)"))
            .critical()),
        None => Ok(()),
    }
}

// ======= expressions =======

/// All binary operators share one precedence level and associate to the left.
pub fn parse_expr(input: &mut ParseStream<'_>) -> PResult<Expr> {
    let mut left = parse_unary(input)?;
    while let Some((op, op_token)) = parse_binop(input) {
        let right = parse_unary(input).committed()?;
        left = Expr::BinaryOp(Rc::new(BinaryOp {
            op,
            op_token,
            left,
            right,
        }));
    }
    Ok(left)
}

fn parse_binop(input: &mut ParseStream<'_>) -> Option<(BinOp, Punct)> {
    let saved = *input;
    let punct = input.parse::<Punct>(None).ok()?;
    match BinOp::from_symbol(&punct.text) {
        Some(op) => Some((op, punct)),
        None => {
            *input = saved;
            None
        }
    }
}

/// Every recursive production passes through here, so this is where
/// nesting depth is counted.
fn parse_unary(input: &mut ParseStream<'_>) -> PResult<Expr> {
    input.enter_depth()?;
    let result = parse_unary_inner(input);
    input.exit_depth();
    result
}

fn parse_unary_inner(input: &mut ParseStream<'_>) -> PResult<Expr> {
    let saved = *input;
    if let Some(op_token) = attempt!(input, input.parse::<Punct>(None)) {
        if let Some(op) = UnOp::from_symbol(&op_token.text) {
            let operand = parse_unary(input)?;
            return Ok(Expr::UnaryOp(Rc::new(UnaryOp {
                op,
                op_token,
                operand,
            })));
        }
        *input = saved;
    }
    parse_access(input)
}

fn parse_access(input: &mut ParseStream<'_>) -> PResult<Expr> {
    let mut expr = parse_primary(input)?;
    loop {
        if let Ok(dot) = input.parse::<Punct>(Some(".")) {
            let name = input.parse::<Word>(None).committed()?;
            expr = if input.peek_group(ParenKind::Round) {
                let args = parse_list(input, ParenKind::Round, parse_expr)?;
                Expr::MethodCall(Rc::new(MethodCall {
                    base: expr,
                    dot,
                    method: name,
                    args: Rc::new(args),
                }))
            } else {
                Expr::FieldAccess(Rc::new(FieldAccess {
                    base: expr,
                    dot,
                    field: name,
                }))
            };
        } else if input.peek_group(ParenKind::Round) {
            let args = parse_list(input, ParenKind::Round, parse_expr)?;
            expr = Expr::FunctionCall(Rc::new(FunctionCall {
                function: expr,
                args: Rc::new(args),
            }));
        } else {
            return Ok(expr);
        }
    }
}

fn parse_primary(input: &mut ParseStream<'_>) -> PResult<Expr> {
    if let Ok(number) = input.parse::<NumberLit>(None) {
        return Ok(Expr::NumberLiteral(Rc::new(number)));
    }
    if let Ok(string) = input.parse::<StringLit>(None) {
        return Ok(Expr::StringLiteral(Rc::new(string)));
    }
    if input.peek_group(ParenKind::Square) {
        let items = parse_list(input, ParenKind::Square, parse_expr)?;
        return Ok(Expr::ArrayLiteral(Rc::new(ArrayLiteral {
            items: Rc::new(items),
        })));
    }
    if input.peek_group(ParenKind::Curly) {
        return parse_block(input).map(Expr::Block);
    }
    if input.peek_group(ParenKind::Round) {
        return parse_paren(input);
    }

    let saved = *input;
    let Ok(word) = input.parse::<Word>(None) else {
        return Err(input.expected("expression"));
    };
    match word.text.as_str() {
        "true" | "false" => Ok(Expr::BoolLiteral(Rc::new(BoolLiteral {
            value: word.text == "true",
            word,
        }))),
        "func" => parse_function(input, word).committed(),
        "if" => parse_if(input, word).committed(),
        "while" => parse_while(input, word).committed(),
        "for" => parse_for(input, word).committed(),
        text if KEYWORDS.contains(&text) => {
            *input = saved;
            Err(input.expected("expression"))
        }
        _ => Ok(Expr::Variable(Rc::new(Variable { name: word }))),
    }
}

fn parse_ident(input: &mut ParseStream<'_>) -> PResult<Word> {
    let saved = *input;
    let word = input.parse::<Word>(None)?;
    if KEYWORDS.contains(&word.text.as_str()) {
        *input = saved;
        return Err(input.expected("identifier"));
    }
    Ok(word)
}

fn parse_block(input: &mut ParseStream<'_>) -> PResult<Rc<Block>> {
    let group = input.parse::<Rc<Group>>(Some(ParenKind::Curly.open()))?;
    let parens = paren_pair(input, &group)?;
    let mut inner = input.nested(&group);
    let (stmts, tail) = parse_body(&mut inner).committed()?;
    Ok(Rc::new(Block {
        parens,
        stmts,
        tail,
    }))
}

fn parse_paren(input: &mut ParseStream<'_>) -> PResult<Expr> {
    let group = input.parse::<Rc<Group>>(Some(ParenKind::Round.open()))?;
    let parens = paren_pair(input, &group)?;
    let mut inner = input.nested(&group);
    let expr = parse_expr(&mut inner).committed()?;
    if !inner.is_empty() {
        return Err(inner.expected(ParenKind::Round.close()).critical());
    }
    Ok(Expr::Paren(Rc::new(Paren { parens, inner: expr })))
}

fn parse_function(input: &mut ParseStream<'_>, func_kw: Word) -> PResult<Expr> {
    let params = parse_list(input, ParenKind::Round, parse_ident)?;
    let body = parse_expr(input)?;
    Ok(Expr::FunctionLiteral(Rc::new(FunctionLiteral {
        func_kw,
        params: Rc::new(params),
        body,
    })))
}

fn parse_if(input: &mut ParseStream<'_>, if_kw: Word) -> PResult<Expr> {
    let cond = parse_expr(input)?;
    let then = parse_block(input)?;
    let otherwise = match input.parse::<Word>(Some("else")) {
        Ok(else_kw) => Some(ElseBranch {
            else_kw,
            expr: parse_expr(input)?,
        }),
        Err(_) => None,
    };
    Ok(Expr::IfThenElse(Rc::new(IfThenElse {
        if_kw,
        cond,
        then,
        otherwise,
    })))
}

fn parse_while(input: &mut ParseStream<'_>, while_kw: Word) -> PResult<Expr> {
    let cond = parse_expr(input)?;
    let body = parse_block(input)?;
    Ok(Expr::WhileLoop(Rc::new(WhileLoop {
        while_kw,
        cond,
        body,
    })))
}

fn parse_for(input: &mut ParseStream<'_>, for_kw: Word) -> PResult<Expr> {
    let var = parse_ident(input)?;
    let in_kw = input.parse::<Word>(Some("in"))?;
    let iter = parse_expr(input)?;
    let body = parse_block(input)?;
    Ok(Expr::ForLoop(Rc::new(ForLoop {
        for_kw,
        var,
        in_kw,
        iter,
        body,
    })))
}

/// `( item, item, ... )` with an optional trailing comma. Once the bracket
/// group is taken, every failure inside it is critical.
fn parse_list<T>(
    input: &mut ParseStream<'_>,
    kind: ParenKind,
    item: impl Fn(&mut ParseStream<'_>) -> PResult<T>,
) -> PResult<List<T>> {
    let group = input.parse::<Rc<Group>>(Some(kind.open()))?;
    let parens = paren_pair(input, &group)?;
    let mut inner = input.nested(&group);
    let mut items = Vec::new();
    while !inner.is_empty() {
        items.push(item(&mut inner).committed()?);
        if inner.is_empty() {
            break;
        }
        inner.parse::<Punct>(Some(",")).committed()?;
    }
    Ok(List { parens, items })
}

fn paren_pair(input: &ParseStream<'_>, group: &Group) -> PResult<ParenPair> {
    group
        .parens
        .clone()
        .ok_or_else(|| input.expected("bracket group"))
}
