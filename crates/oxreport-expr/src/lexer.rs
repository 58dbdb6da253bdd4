//! Tokenizer for expression source text.
//!
//! Operator symbols are not hard-coded: the lexer receives the symbol set of
//! the [`Language`](crate::Language) it lexes for and matches the longest
//! symbol at each position, so registering `->` or `|` is enough to make them
//! lexable.

use crate::error::{ExprError, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Nil,
    /// `@`, the current evaluation context.
    At,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Question,
    Colon,
    Bang,
    /// A registered operator symbol.
    Op(&'static str),
    Eof,
}

#[derive(Debug, Clone)]
pub(crate) struct Spanned {
    pub token: Token,
    pub offset: usize,
}

pub(crate) struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    /// Registered operator symbols, longest first.
    symbols: &'a [&'static str],
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, symbols: &'a [&'static str]) -> Self {
        Self {
            source,
            pos: 0,
            symbols,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Spanned>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let offset = self.pos;
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(Spanned { token, offset });
            if done {
                return Ok(tokens);
            }
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> ExprError {
        ExprError::Compile {
            expression: self.source.to_string(),
            offset,
            message: message.into(),
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        if c.is_ascii_digit() {
            return self.number();
        }
        if c == '_' || c.is_alphabetic() {
            return Ok(self.word());
        }
        if c == '"' || c == '\'' {
            return self.string(c);
        }

        // Registered symbols take priority so that `!=` wins over `!`
        // and `->` over `-`.
        let rest = self.rest();
        if let Some(symbol) = self
            .symbols
            .iter()
            .copied()
            .find(|s| !s.starts_with(char::is_alphabetic) && rest.starts_with(s))
        {
            self.pos += symbol.len();
            return Ok(Token::Op(symbol));
        }

        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            '.' => Token::Dot,
            '?' => Token::Question,
            ':' => Token::Colon,
            '!' => Token::Bang,
            '@' => Token::At,
            other => {
                return Err(self.error(self.pos, format!("unexpected character {other:?}")));
            }
        };
        self.pos += c.len_utf8();
        Ok(token)
    }

    fn number(&mut self) -> Result<Token> {
        let start = self.pos;
        let bytes = self.source.as_bytes();
        let mut end = start;
        let mut is_float = false;

        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
            is_float = true;
            end += 1;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
        if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
            let mut exp = end + 1;
            if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
                exp += 1;
            }
            if exp < bytes.len() && bytes[exp].is_ascii_digit() {
                is_float = true;
                end = exp;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
            }
        }

        let text = &self.source[start..end];
        self.pos = end;
        if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|e| self.error(start, format!("invalid number {text:?}: {e}")))
        } else {
            match text.parse::<i64>() {
                Ok(n) => Ok(Token::Int(n)),
                // Integers beyond i64 fall back to floating point.
                Err(_) => text
                    .parse::<f64>()
                    .map(Token::Float)
                    .map_err(|e| self.error(start, format!("invalid number {text:?}: {e}"))),
            }
        }
    }

    fn word(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_alphanumeric() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        let word = &self.source[start..self.pos];
        match word {
            "true" => Token::True,
            "false" => Token::False,
            "nil" | "null" => Token::Nil,
            _ => match self.symbols.iter().copied().find(|s| *s == word) {
                Some(symbol) => Token::Op(symbol),
                None => Token::Ident(word.to_string()),
            },
        }
    }

    fn string(&mut self, quote: char) -> Result<Token> {
        let start = self.pos;
        self.pos += quote.len_utf8();
        let mut out = String::new();
        loop {
            let Some(c) = self.peek_char() else {
                return Err(self.error(start, "unterminated string literal"));
            };
            self.pos += c.len_utf8();
            if c == quote {
                return Ok(Token::Str(out));
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let Some(escaped) = self.peek_char() else {
                return Err(self.error(start, "unterminated string literal"));
            };
            self.pos += escaped.len_utf8();
            match escaped {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '\\' | '"' | '\'' => out.push(escaped),
                other => {
                    return Err(self.error(self.pos - 2, format!("unknown escape \\{other}")));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYMBOLS: &[&str] = &["->", "==", "!=", "||", "&&", "in", "-", "|", "<", "+"];

    fn tokens(source: &str) -> Vec<Token> {
        Lexer::new(source, SYMBOLS)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn longest_symbol_wins() {
        assert_eq!(
            tokens("a->\"b\" || c|d"),
            vec![
                Token::Ident("a".into()),
                Token::Op("->"),
                Token::Str("b".into()),
                Token::Op("||"),
                Token::Ident("c".into()),
                Token::Op("|"),
                Token::Ident("d".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn numbers_and_selectors() {
        assert_eq!(
            tokens("Items[0].Size < 1.5e3"),
            vec![
                Token::Ident("Items".into()),
                Token::LBracket,
                Token::Int(0),
                Token::RBracket,
                Token::Dot,
                Token::Ident("Size".into()),
                Token::Op("<"),
                Token::Float(1500.0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn word_operators_and_keywords() {
        assert_eq!(
            tokens("x in [true, nil]"),
            vec![
                Token::Ident("x".into()),
                Token::Op("in"),
                Token::LBracket,
                Token::True,
                Token::Comma,
                Token::Nil,
                Token::RBracket,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            tokens(r#""a\"b" 'c\'d'"#),
            vec![
                Token::Str("a\"b".into()),
                Token::Str("c'd".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn unterminated_string_is_compile_error() {
        let err = Lexer::new("\"abc", SYMBOLS).tokenize().unwrap_err();
        assert!(err.is_compile());
    }

    #[test]
    fn unknown_character_is_compile_error() {
        let err = Lexer::new("a # b", SYMBOLS).tokenize().unwrap_err();
        assert!(matches!(err, ExprError::Compile { offset: 2, .. }));
    }
}
