//! Block-syntax configuration front end.
//!
//! Text is split into [`lexer::Token`]s, grouped into one segment per
//! top-level directive, and each segment is walked by a module's parser
//! through a [`dispenser::Dispenser`].

pub mod dispenser;
pub mod lexer;

use crate::error::{ParseError, SyntaxError};
use lexer::Token;

/// Splits a token stream into top-level directives.
///
/// A directive starts on a new line at brace depth zero and runs until the
/// next such token. Braces must balance.
pub fn split_directives(tokens: Vec<Token>) -> Result<Vec<Vec<Token>>, ParseError> {
    let mut segments: Vec<Vec<Token>> = Vec::new();
    let mut depth = 0usize;
    let mut last_end_line = 0usize;

    for token in tokens {
        let starts_line = token.line > last_end_line;
        last_end_line = token.line + token.line_breaks();
        let inside_block = depth > 0;

        if token.is_close_brace() {
            if depth == 0 {
                return Err(error_at(&token, SyntaxError::UnexpectedCloseBrace));
            }
            depth -= 1;
        } else if token.is_open_brace() {
            depth += 1;
        }

        match segments.last_mut() {
            Some(segment) if inside_block || !starts_line => segment.push(token),
            _ => segments.push(vec![token]),
        }
    }

    if depth > 0 {
        if let Some(last) = segments.last().and_then(|s| s.last()) {
            return Err(error_at(last, SyntaxError::UnexpectedEof));
        }
    }

    Ok(segments)
}

fn error_at(token: &Token, err: SyntaxError) -> ParseError {
    ParseError {
        kind: err.into(),
        file: token.file.clone(),
        line: token.line,
        column: token.column,
    }
}
