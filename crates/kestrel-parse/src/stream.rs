//! Cursor over the children of one [`Group`].
//!
//! The stream is `Copy`, so a parser can snapshot it before trying an
//! alternative and restore it by assignment when the attempt fails.

use crate::error::{PResult, ParserError};
use kestrel_ast::group::{Group, TokenTree};
use kestrel_ast::lexeme::{Lexeme, NumberLit, ParenKind, Punct, StringLit, Word};
use kestrel_ast::span::Span;
use std::rc::Rc;

/// Limit on nested expressions, so hostile input fails with an error
/// instead of exhausting the native stack.
pub const MAX_NESTING_DEPTH: usize = 512;

/// A leaf the parser can pull out of the stream.
pub trait Token: Sized {
    /// Used in "expected ..." messages.
    const NAME: &'static str;

    fn from_tree(tree: &TokenTree) -> Option<Self>;

    fn matches(&self, text: &str) -> bool;
}

impl Token for Word {
    const NAME: &'static str = "identifier";

    fn from_tree(tree: &TokenTree) -> Option<Self> {
        match tree {
            TokenTree::Lexeme(Lexeme::Word(w)) => Some(w.clone()),
            _ => None,
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.text == text
    }
}

impl Token for Punct {
    const NAME: &'static str = "punctuation";

    fn from_tree(tree: &TokenTree) -> Option<Self> {
        match tree {
            TokenTree::Lexeme(Lexeme::Punct(p)) => Some(p.clone()),
            _ => None,
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.text == text
    }
}

impl Token for StringLit {
    const NAME: &'static str = "string literal";

    fn from_tree(tree: &TokenTree) -> Option<Self> {
        match tree {
            TokenTree::Lexeme(Lexeme::Str(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.text == text
    }
}

impl Token for NumberLit {
    const NAME: &'static str = "number literal";

    fn from_tree(tree: &TokenTree) -> Option<Self> {
        match tree {
            TokenTree::Lexeme(Lexeme::Number(n)) => Some(n.clone()),
            _ => None,
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.text == text
    }
}

impl Token for Rc<Group> {
    const NAME: &'static str = "group";

    fn from_tree(tree: &TokenTree) -> Option<Self> {
        match tree {
            TokenTree::Group(g) => Some(g.clone()),
            _ => None,
        }
    }

    /// Groups match by their opening bracket, e.g. `"("`.
    fn matches(&self, text: &str) -> bool {
        self.parens
            .as_ref()
            .is_some_and(|p| p.open.text() == text)
    }
}

#[derive(Clone, Copy)]
pub struct ParseStream<'a> {
    trees: &'a [TokenTree],
    pos: usize,
    /// Closing bracket of the enclosing group, reported at end of input.
    eoi: Option<&'a Span>,
    depth: usize,
}

impl<'a> ParseStream<'a> {
    pub fn new(group: &'a Group) -> Self {
        Self {
            trees: &group.inner,
            pos: 0,
            eoi: group.parens.as_ref().map(|p| &p.close.span),
            depth: 0,
        }
    }

    /// Stream over a group found inside this one; nesting depth carries over.
    pub fn nested<'b>(&self, group: &'b Group) -> ParseStream<'b> {
        ParseStream {
            depth: self.depth,
            ..ParseStream::new(group)
        }
    }

    pub fn enter_depth(&mut self) -> PResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParserError::new(
                self.span(),
                format!("at most {MAX_NESTING_DEPTH} levels of nesting"),
                "nesting depth exceeded",
            )
            .critical());
        }
        Ok(())
    }

    pub fn exit_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.trees.len()
    }

    fn current(&self) -> Option<&'a TokenTree> {
        self.trees.get(self.pos)
    }

    /// True if the next tree is a lexeme with exactly this text.
    pub fn peek(&self, text: &str) -> bool {
        matches!(self.current(), Some(TokenTree::Lexeme(l)) if l.text() == text)
    }

    pub fn peek_group(&self, kind: ParenKind) -> bool {
        matches!(self.current(), Some(TokenTree::Group(g)) if g.kind() == Some(kind))
    }

    /// Span of the next tree, or of the enclosing closer at end of input.
    pub fn span(&self) -> Span {
        match self.current() {
            Some(tree) => tree.span(),
            None => match (self.eoi, self.trees.last()) {
                (Some(close), _) => close.clone(),
                (None, Some(last)) => last.span(),
                (None, None) => Span::empty(),
            },
        }
    }

    /// Description of the next tree for error messages.
    pub fn got(&self) -> String {
        match self.current() {
            Some(TokenTree::Lexeme(l)) => format!("`{}`", l.text()),
            Some(TokenTree::Group(g)) => match &g.parens {
                Some(p) => format!("`{}`", p.open.text()),
                None => "group".to_string(),
            },
            None => crate::error::END_OF_INPUT.to_string(),
        }
    }

    pub fn expected(&self, what: impl Into<String>) -> ParserError {
        ParserError::new(self.span(), what, self.got())
    }

    /// Take the next tree as a `T`, optionally requiring its text. The
    /// stream only advances on success.
    pub fn parse<T: Token>(&mut self, text: Option<&str>) -> PResult<T> {
        let what = match text {
            Some(text) => format!("`{text}`"),
            None => T::NAME.to_string(),
        };
        let token = self
            .current()
            .and_then(T::from_tree)
            .filter(|t| text.map_or(true, |text| t.matches(text)))
            .ok_or_else(|| self.expected(what))?;
        self.pos += 1;
        Ok(token)
    }
}
