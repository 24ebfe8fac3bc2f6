use crate::lexeme::{Lexeme, Paren, ParenKind};
use crate::span::Span;
use serde::Serialize;
use std::rc::Rc;

/// A matched opening and closing bracket.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParenPair {
    pub open: Paren,
    pub close: Paren,
}

impl ParenPair {
    pub fn span(&self) -> Span {
        self.open.span.merge(&self.close.span)
    }

    pub fn kind(&self) -> ParenKind {
        self.open.kind
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum TokenTree {
    Lexeme(Lexeme),
    Group(Rc<Group>),
}

impl TokenTree {
    pub fn span(&self) -> Span {
        match self {
            TokenTree::Lexeme(l) => l.span().clone(),
            TokenTree::Group(g) => g.span.clone(),
        }
    }

    pub fn text(&self) -> String {
        match self {
            TokenTree::Lexeme(l) => l.text().to_string(),
            TokenTree::Group(g) => g.text(),
        }
    }

    pub fn debug(&self, depth: usize) -> String {
        match self {
            TokenTree::Lexeme(l) => format!("{}{} {}", indent(depth), l.kind_name(), l.text()),
            TokenTree::Group(g) => g.debug(depth),
        }
    }
}

/// Bracket-delimited run of token trees. The root group has no parens.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Group {
    pub parens: Option<ParenPair>,
    pub inner: Vec<TokenTree>,
    pub span: Span,
}

impl Group {
    /// Unparenthesized group spanning its first to last child.
    pub fn new(inner: Vec<TokenTree>) -> Self {
        let span = match (inner.first(), inner.last()) {
            (Some(first), Some(last)) => first.span().merge(&last.span()),
            _ => Span::empty(),
        };
        Self {
            parens: None,
            inner,
            span,
        }
    }

    pub fn surrounded(parens: ParenPair, inner: Vec<TokenTree>) -> Self {
        Self {
            span: parens.span(),
            parens: Some(parens),
            inner,
        }
    }

    pub fn kind(&self) -> Option<ParenKind> {
        self.parens.as_ref().map(ParenPair::kind)
    }

    pub fn text(&self) -> String {
        let inner = self
            .inner
            .iter()
            .map(TokenTree::text)
            .collect::<Vec<_>>()
            .join(" ");
        match &self.parens {
            Some(p) if inner.is_empty() => format!("{}{}", p.open.text(), p.close.text()),
            Some(p) => format!("{} {} {}", p.open.text(), inner, p.close.text()),
            None => inner,
        }
    }

    pub fn debug(&self, depth: usize) -> String {
        let mut out = format!("{}group", indent(depth));
        if let Some(p) = &self.parens {
            out.push(' ');
            out.push_str(p.open.text());
            out.push_str(p.close.text());
        }
        for child in &self.inner {
            out.push('\n');
            out.push_str(&child.debug(depth + 1));
        }
        out
    }
}

pub(crate) fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}
