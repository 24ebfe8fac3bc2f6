use crate::error::LexError;
use kestrel_ast::lexeme::{Lexeme, NumberLit, Paren, ParenKind, Punct, StringLit, Word};
use kestrel_ast::span::Span;
use std::rc::Rc;

/// Two-character operators come before their one-character prefixes.
/// The compound assignments are reserved: they lex, and the parser rejects
/// them with a dedicated message.
pub const PUNCTUATION: [&str; 25] = [
    "==", "!=", "<=", ">=", "+=", "-=", "*=", "/=", "%=", "~=", "&&", "||", ",", ".", ";", "=",
    "<", ">", "+", "-", "*", "/", "%", "~", "!",
];

const STRING_ESCAPES: [(char, char); 4] = [('n', '\n'), ('t', '\t'), ('"', '"'), ('\\', '\\')];

pub fn tokenize(source: &str, filename: &str) -> Result<Vec<Lexeme>, LexError> {
    let mut lexer = Lexer::new(source, filename);
    let mut lexemes = Vec::new();
    while let Some(lexeme) = lexer.next_lexeme()? {
        lexemes.push(lexeme);
    }
    Ok(lexemes)
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    file: Rc<str>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, file: &str) -> Self {
        Self {
            src,
            pos: 0,
            file: Rc::from(file),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn span(&self, start: usize) -> Span {
        Span::new(self.file.clone(), start, self.pos)
    }

    /// Consume `len` bytes and return the consumed source slice.
    fn take(&mut self, len: usize) -> (usize, &'a str) {
        let start = self.pos;
        self.pos += len;
        (start, &self.src[start..self.pos])
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    pub fn next_lexeme(&mut self) -> Result<Option<Lexeme>, LexError> {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        if let Some(punct) = self.lex_punct() {
            return Ok(Some(punct));
        }
        if let Some(paren) = self.lex_paren() {
            return Ok(Some(paren));
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(Some(self.lex_word()));
        }
        if c.is_ascii_digit() {
            return Ok(Some(self.lex_number()));
        }
        if c == '"' {
            return self.lex_string().map(Some);
        }

        let start = self.pos;
        self.pos += c.len_utf8();
        Err(LexError::UnknownCharacter {
            ch: c,
            span: self.span(start),
        })
    }

    fn lex_punct(&mut self) -> Option<Lexeme> {
        let punct = PUNCTUATION.iter().find(|p| self.rest().starts_with(*p))?;
        let (start, text) = self.take(punct.len());
        Some(Lexeme::Punct(Punct {
            span: self.span(start),
            text: text.to_string(),
        }))
    }

    fn lex_paren(&mut self) -> Option<Lexeme> {
        for kind in ParenKind::ALL {
            let opening = if self.rest().starts_with(kind.open()) {
                true
            } else if self.rest().starts_with(kind.close()) {
                false
            } else {
                continue;
            };
            let (start, _) = self.take(1);
            return Some(Lexeme::Paren(Paren {
                span: self.span(start),
                kind,
                opening,
            }));
        }
        None
    }

    fn lex_word(&mut self) -> Lexeme {
        let len = self
            .rest()
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        let (start, text) = self.take(len);
        Lexeme::Word(Word {
            span: self.span(start),
            text: text.to_string(),
        })
    }

    /// Digits, optionally followed by `.` and more digits. A dot that is not
    /// followed by a digit is left alone so `3.to_s()` is a method call.
    fn lex_number(&mut self) -> Lexeme {
        let bytes = self.rest().as_bytes();
        let mut len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
        if bytes.get(len) == Some(&b'.') && bytes.get(len + 1).is_some_and(u8::is_ascii_digit) {
            len += 1;
            len += bytes[len..].iter().take_while(|b| b.is_ascii_digit()).count();
        }
        let (start, text) = self.take(len);
        Lexeme::Number(NumberLit {
            span: self.span(start),
            text: text.to_string(),
        })
    }

    fn lex_string(&mut self) -> Result<Lexeme, LexError> {
        let start = self.pos;
        let mut value = String::new();
        let mut chars = self.rest().char_indices().skip(1);

        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    let (_, text) = self.take(offset + 1);
                    return Ok(Lexeme::Str(StringLit {
                        span: self.span(start),
                        text: text.to_string(),
                        value,
                    }));
                }
                '\\' => {
                    let Some((esc_offset, esc)) = chars.next() else {
                        break;
                    };
                    match STRING_ESCAPES.iter().find(|(name, _)| *name == esc) {
                        Some((_, real)) => value.push(*real),
                        None => {
                            let esc_start = start + offset;
                            return Err(LexError::UnknownEscape {
                                escape: esc,
                                span: Span::new(
                                    self.file.clone(),
                                    esc_start,
                                    start + esc_offset + esc.len_utf8(),
                                ),
                            });
                        }
                    }
                }
                _ => value.push(c),
            }
        }

        self.pos = self.src.len();
        Err(LexError::UnterminatedString {
            span: self.span(start),
        })
    }
}
