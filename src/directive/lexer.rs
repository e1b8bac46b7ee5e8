//! Splits block-syntax configuration text into positioned tokens.

/// A single word of configuration text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Source name used in diagnostics (file name, or `Testfile` in tests)
    pub file: String,
    /// 1-based line of the first character
    pub line: usize,
    /// 1-based column of the first character
    pub column: usize,
    /// Token text with quotes removed and escapes resolved
    pub text: String,
    /// Whether the token came from a quoted string
    pub quoted: bool,
}

impl Token {
    /// Number of line breaks inside the token (quoted strings may span lines).
    pub fn line_breaks(&self) -> usize {
        self.text.matches('\n').count()
    }

    /// Unquoted `{`.
    pub fn is_open_brace(&self) -> bool {
        !self.quoted && self.text == "{"
    }

    /// Unquoted `}`.
    pub fn is_close_brace(&self) -> bool {
        !self.quoted && self.text == "}"
    }
}

/// Tokenizes `input`, tagging every token with `file` for diagnostics.
///
/// Words are separated by whitespace. A word starting with `"` or a backtick
/// runs until the matching quote; inside double quotes `\"` and `\\` are
/// escapes. A `#` at the start of a word comments out the rest of the line.
pub fn tokenize(file: &str, input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    let mut line = 1;
    let mut column = 0;

    while let Some(ch) = chars.next() {
        column += 1;

        if ch == '\n' {
            line += 1;
            column = 0;
            continue;
        }
        if ch.is_whitespace() {
            continue;
        }

        if ch == '#' {
            while let Some(&next) = chars.peek() {
                if next == '\n' {
                    break;
                }
                chars.next();
            }
            continue;
        }

        let start_line = line;
        let start_column = column;
        let mut text = String::new();
        let quoted = ch == '"' || ch == '`';

        if quoted {
            let quote = ch;
            while let Some(next) = chars.next() {
                column += 1;
                if quote == '"' && next == '\\' {
                    if let Some(&escaped) = chars.peek() {
                        if escaped == '"' || escaped == '\\' {
                            chars.next();
                            column += 1;
                            text.push(escaped);
                            continue;
                        }
                    }
                }
                if next == quote {
                    break;
                }
                if next == '\n' {
                    line += 1;
                    column = 0;
                }
                text.push(next);
            }
        } else {
            text.push(ch);
            while let Some(&next) = chars.peek() {
                if next.is_whitespace() {
                    break;
                }
                chars.next();
                column += 1;
                text.push(next);
            }
        }

        tokens.push(Token {
            file: file.to_string(),
            line: start_line,
            column: start_column,
            text,
            quoted,
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn splits_words_and_braces() {
        let tokens = tokenize("Testfile", "local_metrics_proxy {\n  uds {\n  }\n}");
        assert_eq!(texts(&tokens), ["local_metrics_proxy", "{", "uds", "{", "}", "}"]);
        assert_eq!(tokens[2].line, 2);
        assert_eq!(tokens[2].column, 3);
        assert_eq!(tokens[5].line, 4);
    }

    #[test]
    fn strips_quotes_and_resolves_escapes() {
        let tokens = tokenize("Testfile", r#"path "/run/my \"sock\"" `raw\n`"#);
        assert_eq!(tokens[1].text, "/run/my \"sock\"");
        assert!(tokens[1].quoted);
        assert_eq!(tokens[2].text, "raw\\n");
    }

    #[test]
    fn quoted_brace_is_not_a_delimiter() {
        let tokens = tokenize("Testfile", r#"path "{""#);
        assert!(!tokens[1].is_open_brace());
        assert_eq!(tokens[1].text, "{");
    }

    #[test]
    fn skips_comments() {
        let tokens = tokenize("Testfile", "# leading\nuds # trailing\n{");
        assert_eq!(texts(&tokens), ["uds", "{"]);
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn multiline_quoted_token_advances_lines() {
        let tokens = tokenize("Testfile", "\"a\nb\" next");
        assert_eq!(tokens[0].line_breaks(), 1);
        assert_eq!(tokens[1].line, 2);
    }
}
