#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

pub mod error;
mod grouper;
mod lexer;
mod parser;
mod stream;

pub use error::{
    Commit, FrontendError, LexError, PResult, ParserError, UnbalancedParenthesis, END_OF_INPUT,
};
pub use grouper::group;
pub use lexer::{tokenize, Lexer, PUNCTUATION};
pub use parser::{parse_expr, parse_program, KEYWORDS};
pub use stream::{ParseStream, Token, MAX_NESTING_DEPTH};

use kestrel_ast::ast::Program;
use tracing::debug;

/// Run the whole front end: tokenize, group brackets, parse.
pub fn parse_str(file: &str, src: &str) -> Result<Program, FrontendError> {
    let lexemes = tokenize(src, file)?;
    let lexeme_count = lexemes.len();
    let root = group(lexemes)?;
    let program = parse_program(&root)?;
    debug!(
        file,
        lexemes = lexeme_count,
        stmts = program.stmts.len(),
        has_tail = program.tail.is_some(),
        "parsed source"
    );
    Ok(program)
}
