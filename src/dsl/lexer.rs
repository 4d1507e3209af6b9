//! Lexer (tokenizer) for the netlist DSL.

use crate::error::{LogicError, Result};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in the DSL.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A word: component type, name, net, or parameter key
    Identifier,
    /// A number: decimal with optional unit suffix, `0x..`, or `0b..`
    Number,
    /// A directive (starts with '.')
    Directive,
    /// Equals sign '='
    Equals,
    /// Newline
    Newline,
    /// End of file
    Eof,
}

/// Lexer for tokenizing netlist input.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        let line = self.line;
        let column = self.column;
        let token = |kind, text| Token {
            kind,
            text,
            line,
            column,
        };

        let Some(&ch) = self.chars.peek() else {
            return Ok(token(TokenKind::Eof, String::new()));
        };

        match ch {
            '\n' => {
                self.advance();
                Ok(token(TokenKind::Newline, "\n".to_string()))
            }
            '.' => {
                self.advance();
                let text = self.read_word();
                if text.is_empty() {
                    return Err(LogicError::lexer(line, column, "expected directive name after '.'"));
                }
                Ok(token(TokenKind::Directive, format!(".{}", text)))
            }
            '=' => {
                self.advance();
                Ok(token(TokenKind::Equals, "=".to_string()))
            }
            '-' | '+' => {
                let mut text = String::new();
                text.extend(self.advance());
                text.push_str(&self.read_word());
                if looks_like_number(&text) {
                    Ok(token(TokenKind::Number, text))
                } else {
                    Err(LogicError::lexer(line, column, format!("invalid number '{}'", text)))
                }
            }
            _ if is_word_char(ch) => {
                let text = self.read_word();
                let kind = if looks_like_number(&text) {
                    TokenKind::Number
                } else {
                    TokenKind::Identifier
                };
                Ok(token(kind, text))
            }
            _ => Err(LogicError::lexer(line, column, format!("unexpected character '{}'", ch))),
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else if ch == '#' || ch == ';' {
                // Skip comment until end of line
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if is_word_char(ch) {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '\'' | '.' | '[' | ']' | 'µ')
}

fn looks_like_number(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['-', '+']);
    if let Some(hex) = unsigned.strip_prefix("0x") {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit() || c == '_');
    }
    if let Some(bin) = unsigned.strip_prefix("0b") {
        return !bin.is_empty() && bin.chars().all(|c| matches!(c, '0' | '1' | 'x' | 'X' | '_'));
    }
    unsigned.starts_with(|c: char| c.is_ascii_digit()) && parse_value(text).is_some()
}

/// Parse a number string with optional unit suffix.
///
/// Time parameters are in milliseconds and frequencies in Hz, so `2k` on a
/// clock is 2000 Hz and `0.5m` on a delay is half a microsecond.
pub fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let unsigned = text.trim_start_matches(['-', '+']);
    let negative = text.starts_with('-');
    if let Some(hex) = unsigned.strip_prefix("0x") {
        let v = u64::from_str_radix(&hex.replace('_', ""), 16).ok()? as f64;
        return Some(if negative { -v } else { v });
    }
    if let Some(bin) = unsigned.strip_prefix("0b") {
        let v = u64::from_str_radix(&bin.replace('_', ""), 2).ok()? as f64;
        return Some(if negative { -v } else { v });
    }

    let (num_str, multiplier) = if let Some(last) = text.chars().last() {
        let mult = match last {
            'p' => 1e-12,
            'n' => 1e-9,
            'u' | 'µ' => 1e-6,
            'm' => 1e-3,
            'k' | 'K' => 1e3,
            'M' => 1e6,
            'G' => 1e9,
            _ => 1.0,
        };
        if mult != 1.0 {
            (&text[..text.len() - last.len_utf8()], mult)
        } else {
            (text, 1.0)
        }
    } else {
        (text, 1.0)
    };

    num_str.parse::<f64>().ok().map(|v| v * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Option<f64>, b: Option<f64>) -> bool {
        match (a, b) {
            (Some(x), Some(y)) => (x - y).abs() < x.abs() * 1e-10 + 1e-15,
            (None, None) => true,
            _ => false,
        }
    }

    #[test]
    fn test_parse_value() {
        assert!(approx_eq(parse_value("10k"), Some(10_000.0)));
        assert!(approx_eq(parse_value("2.5"), Some(2.5)));
        assert!(approx_eq(parse_value("0x1f"), Some(31.0)));
        assert!(approx_eq(parse_value("0b101"), Some(5.0)));
        assert!(approx_eq(parse_value("-4"), Some(-4.0)));
        assert!(approx_eq(parse_value("abc"), None));
    }

    #[test]
    fn test_lexer_component_line() {
        let mut lexer = Lexer::new("DFF ff1 d clk q q' freq=2k");
        let kinds: Vec<TokenKind> = std::iter::from_fn(|| {
            let tok = lexer.next_token().unwrap();
            (tok.kind != TokenKind::Eof).then_some(tok.kind)
        })
        .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_lexer_directive_and_positions() {
        let mut lexer = Lexer::new("# header\n.circuit half_adder");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Newline);
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Directive);
        assert_eq!(tok.text, ".circuit");
        assert_eq!((tok.line, tok.column), (2, 1));
    }

    #[test]
    fn test_lexer_rejects_stray_characters() {
        let mut lexer = Lexer::new("AND g1 a b @");
        for _ in 0..4 {
            lexer.next_token().unwrap();
        }
        let err = lexer.next_token().unwrap_err();
        assert!(matches!(err, LogicError::LexerError { line: 1, column: 12, .. }));
    }
}
