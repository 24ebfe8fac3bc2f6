use kestrel_ast::span::Span;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unknown character {ch:?} at byte {}", .span.start)]
    UnknownCharacter { ch: char, span: Span },
    #[error("unknown escape sequence `\\{escape}` at byte {}", .span.start)]
    UnknownEscape { escape: char, span: Span },
    #[error("unterminated string literal starting at byte {}", .span.start)]
    UnterminatedString { span: Span },
}

impl LexError {
    pub fn span(&self) -> &Span {
        match self {
            LexError::UnknownCharacter { span, .. }
            | LexError::UnknownEscape { span, .. }
            | LexError::UnterminatedString { span } => span,
        }
    }

    pub fn offset(&self) -> usize {
        self.span().start
    }
}

/// A closer that does not match the innermost open bracket, or an opener
/// that is never closed (`cl_span` is `None`).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unbalanced parenthesis at byte {}", paren_position(.cl_span, .full_span))]
pub struct UnbalancedParenthesis {
    pub full_span: Span,
    pub cl_span: Option<Span>,
}

impl UnbalancedParenthesis {
    pub fn position(&self) -> usize {
        paren_position(&self.cl_span, &self.full_span)
    }
}

fn paren_position(cl_span: &Option<Span>, full_span: &Span) -> usize {
    match cl_span {
        Some(span) => span.start,
        None => full_span.start,
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("expected {expected} but got {got}")]
pub struct ParserError {
    pub span: Span,
    pub expected: String,
    pub got: String,
    /// Set once the failing production consumed its distinguishing token;
    /// callers must not try another alternative.
    pub critical: bool,
    #[source]
    pub cause: Option<Box<ParserError>>,
}

pub const END_OF_INPUT: &str = "end of input";

impl ParserError {
    pub fn new(span: Span, expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self {
            span,
            expected: expected.into(),
            got: got.into(),
            critical: false,
            cause: None,
        }
    }

    pub fn unexpected_eoi(span: Span, expected: impl Into<String>) -> Self {
        Self::new(span, expected, END_OF_INPUT)
    }

    pub fn is_eoi(&self) -> bool {
        self.got == END_OF_INPUT
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    pub fn caused_by(mut self, cause: ParserError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

pub type PResult<T> = Result<T, ParserError>;

pub trait Commit {
    /// Mark a failure as critical.
    fn committed(self) -> Self;
}

impl<T> Commit for PResult<T> {
    fn committed(self) -> Self {
        self.map_err(ParserError::critical)
    }
}

/// Any failure of the text-to-AST pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrontendError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Unbalanced(#[from] UnbalancedParenthesis),
    #[error(transparent)]
    Parse(#[from] ParserError),
}

impl FrontendError {
    pub fn span(&self) -> Span {
        match self {
            FrontendError::Lex(e) => e.span().clone(),
            FrontendError::Unbalanced(e) => e.cl_span.clone().unwrap_or_else(|| e.full_span.clone()),
            FrontendError::Parse(e) => e.span.clone(),
        }
    }
}
