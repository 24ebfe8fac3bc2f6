use crate::error::UnbalancedParenthesis;
use kestrel_ast::group::{Group, ParenPair, TokenTree};
use kestrel_ast::lexeme::{Lexeme, Paren};
use std::rc::Rc;

struct Frame {
    open: Paren,
    inner: Vec<TokenTree>,
}

/// Nest a flat lexeme sequence into bracket groups.
///
/// The returned root group has no parens and holds the top-level trees in
/// source order.
pub fn group(lexemes: Vec<Lexeme>) -> Result<Group, UnbalancedParenthesis> {
    let last_span = lexemes.last().map(|l| l.span().clone());
    let mut root = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for lexeme in lexemes {
        let paren = match lexeme {
            Lexeme::Paren(paren) => paren,
            other => {
                current(&mut root, &mut stack).push(TokenTree::Lexeme(other));
                continue;
            }
        };

        if paren.opening {
            stack.push(Frame {
                open: paren,
                inner: Vec::new(),
            });
            continue;
        }

        let Some(frame) = stack.pop() else {
            return Err(UnbalancedParenthesis {
                full_span: paren.span.clone(),
                cl_span: Some(paren.span),
            });
        };
        if frame.open.kind != paren.kind {
            return Err(UnbalancedParenthesis {
                full_span: frame.open.span.merge(&paren.span),
                cl_span: Some(paren.span),
            });
        }

        let parens = ParenPair {
            open: frame.open,
            close: paren,
        };
        let group = Group::surrounded(parens, frame.inner);
        current(&mut root, &mut stack).push(TokenTree::Group(Rc::new(group)));
    }

    if let Some(unclosed) = stack.pop() {
        let full_span = match last_span {
            Some(last) => unclosed.open.span.merge(&last),
            None => unclosed.open.span,
        };
        return Err(UnbalancedParenthesis {
            full_span,
            cl_span: None,
        });
    }

    Ok(Group::new(root))
}

fn current<'s>(root: &'s mut Vec<TokenTree>, stack: &'s mut [Frame]) -> &'s mut Vec<TokenTree> {
    match stack.last_mut() {
        Some(frame) => &mut frame.inner,
        None => root,
    }
}
