//! Syntax tree produced by the parser.
//!
//! Nodes are shared through `Rc` so that function values can hold on to
//! their body without copying it. Each node keeps the tokens it was built
//! from, which is where [`Expr::span`] and [`Stmt::span`] get their ranges.

use crate::group::{indent, ParenPair};
use crate::lexeme::{NumberLit, Punct, StringLit, Word};
use crate::span::Span;
use serde::Serialize;
use std::rc::Rc;

#[derive(Clone, Debug, Serialize)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    /// Trailing expression without `;`, the value of the program.
    pub tail: Option<Expr>,
}

impl Program {
    pub fn span(&self) -> Span {
        let mut span = Span::empty();
        if let Some(first) = self.stmts.first() {
            span = span.merge(&first.span());
        }
        if let Some(tail) = &self.tail {
            span = span.merge(&tail.span());
        } else if let Some(last) = self.stmts.last() {
            span = span.merge(&last.span());
        }
        span
    }

    pub fn debug(&self) -> String {
        let mut out = String::from("program");
        for stmt in &self.stmts {
            out.push('\n');
            out.push_str(&stmt.debug(1));
        }
        if let Some(tail) = &self.tail {
            out.push('\n');
            out.push_str(&tail.debug(1));
        }
        out
    }
}

// ======= statements =======

#[derive(Clone, Debug, Serialize)]
pub enum Stmt {
    Assignment(Rc<Assignment>),
    Expr(Rc<ExprStmt>),
    Empty(Punct),
}

/// `let? (base.)?field = value;`
///
/// A plain variable binding has no `base`. The parser never produces a
/// `let` together with a `base`.
#[derive(Clone, Debug, Serialize)]
pub struct Assignment {
    pub let_kw: Option<Word>,
    pub base: Option<Expr>,
    pub field: Word,
    pub assign: Punct,
    pub value: Expr,
    pub semi: Punct,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExprStmt {
    pub expr: Expr,
    /// Block-like expressions followed by more input may omit the `;`.
    pub semi: Option<Punct>,
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Assignment(a) => {
                let start = match (&a.let_kw, &a.base) {
                    (Some(kw), _) => kw.span.clone(),
                    (None, Some(base)) => base.span(),
                    (None, None) => a.field.span.clone(),
                };
                start.merge(&a.semi.span)
            }
            Stmt::Expr(s) => match &s.semi {
                Some(semi) => s.expr.span().merge(&semi.span),
                None => s.expr.span(),
            },
            Stmt::Empty(semi) => semi.span.clone(),
        }
    }

    pub fn debug(&self, depth: usize) -> String {
        match self {
            Stmt::Assignment(a) => {
                let mut out = indent(depth);
                out.push_str("assign ");
                if a.let_kw.is_some() {
                    out.push_str("let ");
                }
                if a.base.is_some() {
                    out.push('.');
                }
                out.push_str(&a.field.text);
                if let Some(base) = &a.base {
                    out.push('\n');
                    out.push_str(&base.debug(depth + 1));
                }
                out.push('\n');
                out.push_str(&a.value.debug(depth + 1));
                out
            }
            Stmt::Expr(s) => format!("{}stmt\n{}", indent(depth), s.expr.debug(depth + 1)),
            Stmt::Empty(_) => format!("{}empty", indent(depth)),
        }
    }
}

// ======= expressions =======

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// `~`, string concatenation
    Concat,
    And,
    Or,
}

impl BinOp {
    pub const ALL: [BinOp; 14] = [
        BinOp::Eq,
        BinOp::Ne,
        BinOp::Le,
        BinOp::Ge,
        BinOp::Lt,
        BinOp::Gt,
        BinOp::Add,
        BinOp::Sub,
        BinOp::Mul,
        BinOp::Div,
        BinOp::Mod,
        BinOp::Concat,
        BinOp::And,
        BinOp::Or,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Concat => "~",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<BinOp> {
        BinOp::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum UnOp {
    Not,
    Plus,
    Neg,
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Not => "!",
            UnOp::Plus => "+",
            UnOp::Neg => "-",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<UnOp> {
        match symbol {
            "!" => Some(UnOp::Not),
            "+" => Some(UnOp::Plus),
            "-" => Some(UnOp::Neg),
            _ => None,
        }
    }
}

/// Parenthesized, comma separated sequence.
#[derive(Clone, Debug, Serialize)]
pub struct List<T> {
    pub parens: ParenPair,
    pub items: Vec<T>,
}

impl<T> List<T> {
    pub fn span(&self) -> Span {
        self.parens.span()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Variable {
    pub name: Word,
}

#[derive(Clone, Debug, Serialize)]
pub struct Block {
    pub parens: ParenPair,
    pub stmts: Vec<Stmt>,
    pub tail: Option<Expr>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BinaryOp {
    pub op: BinOp,
    pub op_token: Punct,
    pub left: Expr,
    pub right: Expr,
}

#[derive(Clone, Debug, Serialize)]
pub struct UnaryOp {
    pub op: UnOp,
    pub op_token: Punct,
    pub operand: Expr,
}

#[derive(Clone, Debug, Serialize)]
pub struct FunctionCall {
    pub function: Expr,
    pub args: Rc<List<Expr>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FieldAccess {
    pub base: Expr,
    pub dot: Punct,
    pub field: Word,
}

#[derive(Clone, Debug, Serialize)]
pub struct MethodCall {
    pub base: Expr,
    pub dot: Punct,
    pub method: Word,
    pub args: Rc<List<Expr>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct WhileLoop {
    pub while_kw: Word,
    pub cond: Expr,
    pub body: Rc<Block>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ForLoop {
    pub for_kw: Word,
    pub var: Word,
    pub in_kw: Word,
    pub iter: Expr,
    pub body: Rc<Block>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ElseBranch {
    pub else_kw: Word,
    pub expr: Expr,
}

#[derive(Clone, Debug, Serialize)]
pub struct IfThenElse {
    pub if_kw: Word,
    pub cond: Expr,
    pub then: Rc<Block>,
    pub otherwise: Option<ElseBranch>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BoolLiteral {
    pub word: Word,
    pub value: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ArrayLiteral {
    pub items: Rc<List<Expr>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FunctionLiteral {
    pub func_kw: Word,
    pub params: Rc<List<Word>>,
    pub body: Expr,
}

#[derive(Clone, Debug, Serialize)]
pub struct Paren {
    pub parens: ParenPair,
    pub inner: Expr,
}

#[derive(Clone, Debug, Serialize)]
pub enum Expr {
    Variable(Rc<Variable>),
    Block(Rc<Block>),
    BinaryOp(Rc<BinaryOp>),
    UnaryOp(Rc<UnaryOp>),
    FunctionCall(Rc<FunctionCall>),
    FieldAccess(Rc<FieldAccess>),
    MethodCall(Rc<MethodCall>),
    WhileLoop(Rc<WhileLoop>),
    ForLoop(Rc<ForLoop>),
    IfThenElse(Rc<IfThenElse>),
    StringLiteral(Rc<StringLit>),
    NumberLiteral(Rc<NumberLit>),
    BoolLiteral(Rc<BoolLiteral>),
    ArrayLiteral(Rc<ArrayLiteral>),
    FunctionLiteral(Rc<FunctionLiteral>),
    Paren(Rc<Paren>),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Variable(v) => v.name.span.clone(),
            Expr::Block(b) => b.parens.span(),
            Expr::BinaryOp(b) => b
                .left
                .span()
                .merge(&b.op_token.span)
                .merge(&b.right.span()),
            Expr::UnaryOp(u) => u.op_token.span.merge(&u.operand.span()),
            Expr::FunctionCall(c) => c.function.span().merge(&c.args.span()),
            Expr::FieldAccess(f) => f.base.span().merge(&f.field.span),
            Expr::MethodCall(m) => m.base.span().merge(&m.args.span()),
            Expr::WhileLoop(w) => w.while_kw.span.merge(&w.body.parens.span()),
            Expr::ForLoop(f) => f.for_kw.span.merge(&f.body.parens.span()),
            Expr::IfThenElse(i) => {
                let span = i.if_kw.span.merge(&i.then.parens.span());
                match &i.otherwise {
                    Some(branch) => span.merge(&branch.expr.span()),
                    None => span,
                }
            }
            Expr::StringLiteral(s) => s.span.clone(),
            Expr::NumberLiteral(n) => n.span.clone(),
            Expr::BoolLiteral(b) => b.word.span.clone(),
            Expr::ArrayLiteral(a) => a.items.span(),
            Expr::FunctionLiteral(f) => f.func_kw.span.merge(&f.body.span()),
            Expr::Paren(p) => p.parens.span(),
        }
    }

    /// Block-like expressions may stand as statements without a `;`.
    pub fn is_block_like(&self) -> bool {
        matches!(
            self,
            Expr::Block(_) | Expr::IfThenElse(_) | Expr::WhileLoop(_) | Expr::ForLoop(_)
        )
    }

    pub fn debug(&self, depth: usize) -> String {
        let pad = indent(depth);
        match self {
            Expr::Variable(v) => format!("{pad}var({})", v.name.text),
            Expr::Block(b) => block_debug(b, depth),
            Expr::BinaryOp(b) => format!(
                "{pad}binary {}\n{}\n{}",
                b.op.symbol(),
                b.left.debug(depth + 1),
                b.right.debug(depth + 1)
            ),
            Expr::UnaryOp(u) => format!(
                "{pad}unary {}\n{}",
                u.op.symbol(),
                u.operand.debug(depth + 1)
            ),
            Expr::FunctionCall(c) => {
                let mut out = format!("{pad}call\n{}", c.function.debug(depth + 1));
                push_items(&mut out, &c.args.items, depth + 1);
                out
            }
            Expr::FieldAccess(f) => {
                format!("{pad}field .{}\n{}", f.field.text, f.base.debug(depth + 1))
            }
            Expr::MethodCall(m) => {
                let mut out = format!("{pad}method .{}\n{}", m.method.text, m.base.debug(depth + 1));
                push_items(&mut out, &m.args.items, depth + 1);
                out
            }
            Expr::WhileLoop(w) => format!(
                "{pad}while\n{}\n{}",
                w.cond.debug(depth + 1),
                block_debug(&w.body, depth + 1)
            ),
            Expr::ForLoop(f) => format!(
                "{pad}for {} in\n{}\n{}",
                f.var.text,
                f.iter.debug(depth + 1),
                block_debug(&f.body, depth + 1)
            ),
            Expr::IfThenElse(i) => {
                let mut out = format!(
                    "{pad}if\n{}\n{}",
                    i.cond.debug(depth + 1),
                    block_debug(&i.then, depth + 1)
                );
                if let Some(branch) = &i.otherwise {
                    out.push('\n');
                    out.push_str(&indent(depth));
                    out.push_str("else\n");
                    out.push_str(&branch.expr.debug(depth + 1));
                }
                out
            }
            Expr::StringLiteral(s) => format!("{pad}string {}", s.text),
            Expr::NumberLiteral(n) => format!("{pad}number {}", n.text),
            Expr::BoolLiteral(b) => format!("{pad}bool {}", b.value),
            Expr::ArrayLiteral(a) => {
                let mut out = format!("{pad}array");
                push_items(&mut out, &a.items.items, depth + 1);
                out
            }
            Expr::FunctionLiteral(f) => {
                let params: Vec<&str> = f.params.items.iter().map(|w| w.text.as_str()).collect();
                format!(
                    "{pad}func({})\n{}",
                    params.join(", "),
                    f.body.debug(depth + 1)
                )
            }
            Expr::Paren(p) => format!("{pad}paren\n{}", p.inner.debug(depth + 1)),
        }
    }
}

fn block_debug(block: &Block, depth: usize) -> String {
    let mut out = format!("{}block", indent(depth));
    for stmt in &block.stmts {
        out.push('\n');
        out.push_str(&stmt.debug(depth + 1));
    }
    if let Some(tail) = &block.tail {
        out.push('\n');
        out.push_str(&tail.debug(depth + 1));
    }
    out
}

fn push_items(out: &mut String, items: &[Expr], depth: usize) {
    for item in items {
        out.push('\n');
        out.push_str(&item.debug(depth));
    }
}
