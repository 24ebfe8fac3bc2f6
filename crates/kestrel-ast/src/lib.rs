#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

pub mod ast;
pub mod group;
pub mod lexeme;

pub mod span {
    use serde::Serialize;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    #[error("cannot join spans from different files (`{left}` and `{right}`)")]
    pub struct SpanError {
        pub left: String,
        pub right: String,
    }

    /// Half-open byte range `start..end` inside `file`.
    ///
    /// An empty span carries no position and is the identity of [`Span::join`].
    #[derive(Clone, Debug, PartialEq, Eq, Serialize)]
    pub struct Span {
        pub file: Rc<str>,
        pub start: usize,
        pub end: usize,
        pub is_empty: bool,
    }

    impl Span {
        pub fn new(file: Rc<str>, start: usize, end: usize) -> Self {
            Self {
                file,
                start,
                end,
                is_empty: false,
            }
        }

        pub fn empty() -> Self {
            Self {
                file: Rc::from(""),
                start: 0,
                end: 0,
                is_empty: true,
            }
        }

        pub fn join(&self, other: &Span) -> Result<Span, SpanError> {
            if self.is_empty {
                return Ok(other.clone());
            }
            if other.is_empty {
                return Ok(self.clone());
            }
            if self.file != other.file {
                return Err(SpanError {
                    left: self.file.to_string(),
                    right: other.file.to_string(),
                });
            }
            Ok(Span::new(
                self.file.clone(),
                self.start.min(other.start),
                self.end.max(other.end),
            ))
        }

        /// Join two spans of the same tree.
        ///
        /// # Panics
        ///
        /// Panics if the spans belong to different files, which cannot happen
        /// for nodes produced by a single tokenization.
        pub fn merge(&self, other: &Span) -> Span {
            match self.join(other) {
                Ok(span) => span,
                Err(e) => panic!("{e}"),
            }
        }

        pub fn len(&self) -> usize {
            self.end - self.start
        }

        pub fn slice<'a>(&self, source: &'a str) -> &'a str {
            source.get(self.start..self.end).unwrap_or("")
        }
    }

}
