use crate::span::Span;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ParenKind {
    Round,
    Square,
    Curly,
}

impl ParenKind {
    pub const ALL: [ParenKind; 3] = [ParenKind::Round, ParenKind::Square, ParenKind::Curly];

    pub fn open(self) -> &'static str {
        match self {
            ParenKind::Round => "(",
            ParenKind::Square => "[",
            ParenKind::Curly => "{",
        }
    }

    pub fn close(self) -> &'static str {
        match self {
            ParenKind::Round => ")",
            ParenKind::Square => "]",
            ParenKind::Curly => "}",
        }
    }
}

/// Identifier or keyword.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Word {
    pub span: Span,
    pub text: String,
}

/// Operator or punctuation symbol.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Punct {
    pub span: Span,
    pub text: String,
}

/// A single bracket. Remembers its kind, so its counterpart is always known.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Paren {
    pub span: Span,
    pub kind: ParenKind,
    pub opening: bool,
}

impl Paren {
    pub fn text(&self) -> &'static str {
        if self.opening {
            self.kind.open()
        } else {
            self.kind.close()
        }
    }

    pub fn counterpart(&self) -> &'static str {
        if self.opening {
            self.kind.close()
        } else {
            self.kind.open()
        }
    }
}

/// String literal. `text` is the raw source including quotes, `value` the decoded contents.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StringLit {
    pub span: Span,
    pub text: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NumberLit {
    pub span: Span,
    pub text: String,
}

impl NumberLit {
    pub fn value(&self) -> f32 {
        self.text.parse().unwrap_or(f32::NAN)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Lexeme {
    Word(Word),
    Punct(Punct),
    Paren(Paren),
    Str(StringLit),
    Number(NumberLit),
}

impl Lexeme {
    pub fn span(&self) -> &Span {
        match self {
            Lexeme::Word(w) => &w.span,
            Lexeme::Punct(p) => &p.span,
            Lexeme::Paren(p) => &p.span,
            Lexeme::Str(s) => &s.span,
            Lexeme::Number(n) => &n.span,
        }
    }

    /// The source slice this lexeme was read from.
    pub fn text(&self) -> &str {
        match self {
            Lexeme::Word(w) => &w.text,
            Lexeme::Punct(p) => &p.text,
            Lexeme::Paren(p) => p.text(),
            Lexeme::Str(s) => &s.text,
            Lexeme::Number(n) => &n.text,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Lexeme::Word(_) => "word",
            Lexeme::Punct(_) => "punct",
            Lexeme::Paren(_) => "paren",
            Lexeme::Str(_) => "string",
            Lexeme::Number(_) => "number",
        }
    }
}
