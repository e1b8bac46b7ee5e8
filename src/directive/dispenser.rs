//! Cursor over configuration tokens.
//!
//! The dispenser walks a directive's tokens the way a recursive-descent
//! parser needs: whole-line arguments, brace-delimited blocks at a given
//! nesting level, and errors positioned at the token under the cursor.

use crate::directive::lexer::Token;
use crate::error::{ParseError, ParseErrorKind, SyntaxError};

#[derive(Debug, Clone)]
pub struct Dispenser {
    tokens: Vec<Token>,
    /// Index of the current token; `None` before the first `next()`
    cursor: Option<usize>,
    nesting: usize,
    /// Source name reported when there are no tokens at all
    file: String,
}

impl Dispenser {
    pub fn new(file: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            cursor: None,
            nesting: 0,
            file: file.into(),
        }
    }

    /// Gives the tokens back, e.g. to rewind with a fresh dispenser.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Advances to the next token regardless of line or nesting.
    pub fn next(&mut self) -> bool {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next < self.tokens.len() {
            self.cursor = Some(next);
            true
        } else {
            false
        }
    }

    /// Advances to the next token only if it sits on the current line and is
    /// not a brace, so one-line blocks like `uds { path /a }` still close.
    pub fn next_arg(&mut self) -> bool {
        if !self.next_on_same_line() {
            return false;
        }
        if self
            .current()
            .is_some_and(|t| t.is_open_brace() || t.is_close_brace())
        {
            self.step_back();
            return false;
        }
        true
    }

    /// Collects every argument left on the current line.
    pub fn remaining_args(&mut self) -> Vec<String> {
        let mut args = Vec::new();
        while self.next_arg() {
            args.push(self.val().to_string());
        }
        args
    }

    /// Current nesting depth, to be captured before walking a block.
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    /// Advances to the next line inside the block opened at
    /// `initial_nesting`, entering the block on the first call.
    ///
    /// Returns `false` once the block's closing brace is consumed, or when
    /// there is no block at all (the cursor is left untouched then).
    pub fn next_block(&mut self, initial_nesting: usize) -> bool {
        if self.nesting > initial_nesting {
            if !self.next() {
                return false;
            }
            match self.current() {
                Some(token) if token.is_close_brace() => self.nesting -= 1,
                Some(token) if token.is_open_brace() => self.nesting += 1,
                _ => {}
            }
            return self.nesting > initial_nesting;
        }

        if !self.next_on_same_line() {
            return false;
        }
        if !self.current().is_some_and(Token::is_open_brace) {
            self.step_back();
            return false;
        }
        self.next();
        if self.current().is_some_and(Token::is_close_brace) {
            // opened and closed right away
            return false;
        }
        self.nesting += 1;
        true
    }

    /// Text of the current token, or `""` before the first token.
    pub fn val(&self) -> &str {
        self.current().map_or("", |t| t.text.as_str())
    }

    pub fn line(&self) -> usize {
        self.current().map_or(0, |t| t.line)
    }

    pub fn column(&self) -> usize {
        self.current().map_or(0, |t| t.column)
    }

    pub fn file(&self) -> &str {
        self.current().map_or(self.file.as_str(), |t| t.file.as_str())
    }

    /// Builds an error positioned at the current token.
    pub fn err(&self, kind: impl Into<ParseErrorKind>) -> ParseError {
        ParseError {
            kind: kind.into(),
            file: self.file().to_string(),
            line: self.line(),
            column: self.column(),
        }
    }

    /// Error for a directive or key that received the wrong number of values.
    pub fn arg_err(&self) -> ParseError {
        self.err(SyntaxError::ArgumentCount {
            token: self.val().to_string(),
        })
    }

    fn current(&self) -> Option<&Token> {
        self.cursor.and_then(|c| self.tokens.get(c))
    }

    fn step_back(&mut self) {
        self.cursor = match self.cursor {
            Some(0) | None => None,
            Some(c) => Some(c - 1),
        };
    }

    fn next_on_same_line(&mut self) -> bool {
        let Some(cursor) = self.cursor else {
            return self.next();
        };
        let (Some(curr), Some(next)) = (self.tokens.get(cursor), self.tokens.get(cursor + 1)) else {
            return false;
        };
        if curr.line + curr.line_breaks() < next.line {
            return false;
        }
        self.cursor = Some(cursor + 1);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::lexer::tokenize;

    fn dispenser(input: &str) -> Dispenser {
        Dispenser::new("Testfile", tokenize("Testfile", input))
    }

    #[test]
    fn remaining_args_stop_at_block() {
        let mut d = dispenser("dir a b {\n}");
        assert!(d.next());
        assert_eq!(d.remaining_args(), ["a", "b"]);
        assert_eq!(d.val(), "b");
    }

    #[test]
    fn remaining_args_stop_at_line_end() {
        let mut d = dispenser("dir a\nother");
        d.next();
        assert_eq!(d.remaining_args(), ["a"]);
        assert!(d.next());
        assert_eq!(d.val(), "other");
    }

    #[test]
    fn close_brace_is_not_an_argument() {
        let mut d = dispenser("k { v }");
        d.next();
        assert!(d.next_block(0));
        assert_eq!(d.val(), "v");
        assert!(!d.next_arg());
        assert_eq!(d.val(), "v");
        assert!(!d.next_block(0));
        assert_eq!(d.nesting(), 0);
    }

    #[test]
    fn walks_nested_blocks() {
        let mut d = dispenser("dir {\n  k1 v1\n  k2 {\n    x\n  }\n}");
        d.next();
        let outer = d.nesting();
        let mut keys = Vec::new();
        while d.next_block(outer) {
            keys.push(d.val().to_string());
            let inner = d.nesting();
            while d.next_block(inner) {}
        }
        assert_eq!(keys, ["k1", "v1", "k2"]);
        assert_eq!(d.nesting(), 0);
    }

    #[test]
    fn empty_block_leaves_cursor_on_close_brace() {
        let mut d = dispenser("dir {\n}\n");
        d.next();
        assert!(!d.next_block(0));
        assert_eq!(d.val(), "}");
        assert_eq!(d.line(), 2);
    }

    #[test]
    fn no_block_leaves_cursor_in_place() {
        let mut d = dispenser("dir\nnext");
        d.next();
        assert!(!d.next_block(0));
        assert_eq!(d.val(), "dir");
    }

    #[test]
    fn errors_carry_position() {
        let mut d = dispenser("\n  dir arg");
        d.next();
        d.next();
        let err = d.arg_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 7);
        assert_eq!(
            err.to_string(),
            "Testfile:2 - Error during parsing: wrong argument count or unexpected line ending after 'arg'"
        );
    }
}
