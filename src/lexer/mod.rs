//! Turns source text into a flat token stream.
//!
//! Mirrors the lexer's job description in the pipeline: advance a cursor over
//! characters, track `(line, column)` as we go, and hand back a `Vec<Token>`
//! terminated by [`TokenKind::Eof`].
mod token;
mod tokens;

pub use token::*;
pub use tokens::*;

use std::{fmt::Display, iter::Peekable, str::Chars};

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::position::Position;

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    use TokenKind::*;
    HashMap::from([
        ("def", Def),
        ("fn", Fn),
        ("val", Val),
        ("var", Var),
        ("if", If),
        ("then", Then),
        ("else", Else),
        ("while", While),
        ("break", Break),
        ("continue", Continue),
        ("return", Return),
        ("true", Bool(true)),
        ("false", Bool(false)),
    ])
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub position: Position,
    pub message: String,
}

impl Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message, self.position)
    }
}

impl std::error::Error for LexError {}

pub type LexResult<T> = Result<T, LexError>;

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Lex the whole input and return every token, `Eof` included.
    pub fn lex(source: &'a str) -> LexResult<Vec<Token>> {
        let mut lexer = Self::new(source);
        let mut tokens = vec![];

        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }

        tokens.push(Token::new(TokenKind::Eof, "", lexer.position()));

        Ok(tokens)
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn peek(&mut self) -> Option<char> {
        self.source.peek().copied()
    }

    fn peek_second(&mut self) -> Option<char> {
        let mut clone = self.source.clone();
        clone.next();
        clone.next()
    }

    fn advance(&mut self) -> Option<char> {
        let next = self.source.next()?;
        if next == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(next)
    }

    fn eat_non_newline_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t') | Some('\r')) {
            self.advance();
        }
    }

    fn eat_comment(&mut self) {
        while !matches!(self.peek(), None | Some('\n')) {
            self.advance();
        }
    }

    /// Produce the next token, or `None` once the input is exhausted.
    fn next_token(&mut self) -> LexResult<Option<Token>> {
        loop {
            self.eat_non_newline_whitespace();

            match self.peek() {
                Some('/') if self.peek_second() == Some('/') => {
                    self.eat_comment();
                    continue;
                }
                _ => break,
            }
        }

        let position = self.position();

        let Some(next) = self.peek() else {
            return Ok(None);
        };

        let token = match next {
            '\n' => {
                self.advance();
                Token::new(TokenKind::Newline, "\n", position)
            }
            'a'..='z' | 'A'..='Z' | '_' => self.lex_identifier(position),
            '0'..='9' => self.lex_number(position)?,
            '"' => self.lex_string(position)?,
            _ => self.lex_operator(position)?,
        };

        Ok(Some(token))
    }

    fn lex_identifier(&mut self, position: Position) -> Token {
        let mut lexeme = String::new();

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = KEYWORDS
            .get(lexeme.as_str())
            .cloned()
            .unwrap_or_else(|| TokenKind::Ident(lexeme.clone()));

        Token::new(kind, lexeme, position)
    }

    fn lex_number(&mut self, position: Position) -> LexResult<Token> {
        let mut lexeme = String::new();

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let value = lexeme.parse::<i64>().map_err(|_| LexError {
            position,
            message: format!("invalid integer literal '{lexeme}'"),
        })?;

        Ok(Token::new(TokenKind::Int(value), lexeme, position))
    }

    fn lex_string(&mut self, position: Position) -> LexResult<Token> {
        let mut raw = String::from("\"");
        self.advance();

        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(LexError {
                        position,
                        message: "unterminated string".to_owned(),
                    });
                }
                Some('"') => {
                    raw.push('"');
                    self.advance();
                    break;
                }
                Some('\\') => {
                    raw.push('\\');
                    self.advance();
                    match self.peek() {
                        Some(escaped) => {
                            raw.push(escaped);
                            self.advance();
                        }
                        None => {
                            return Err(LexError {
                                position,
                                message: "unterminated string".to_owned(),
                            });
                        }
                    }
                }
                Some(c) => {
                    raw.push(c);
                    self.advance();
                }
            }
        }

        let unescaped = unescape::unescape(&raw[1..raw.len() - 1]).ok_or_else(|| LexError {
            position,
            message: format!("invalid escape sequence in {raw}"),
        })?;

        Ok(Token::new(TokenKind::Str(unescaped), raw, position))
    }

    fn lex_operator(&mut self, position: Position) -> LexResult<Token> {
        use TokenKind::*;

        macro_rules! two_char {
            ($first:expr, $second:expr, $kind:expr) => {
                if self.peek() == Some($first) && self.peek_second() == Some($second) {
                    let lexeme = format!("{}{}", $first, $second);
                    self.advance();
                    self.advance();
                    return Ok(Token::new($kind, lexeme, position));
                }
            };
        }

        two_char!('=', '=', EqEq);
        two_char!('!', '=', NotEq);
        two_char!('<', '=', LtEq);
        two_char!('>', '=', GtEq);
        two_char!('&', '&', AndAnd);
        two_char!('|', '|', OrOr);
        two_char!('+', '=', PlusEq);
        two_char!('-', '=', MinusEq);
        two_char!('=', '>', Arrow);

        let c = self.advance().expect("checked by caller");
        let kind = match c {
            '{' => LBrace,
            '}' => RBrace,
            '(' => LParen,
            ')' => RParen,
            ',' => Comma,
            ':' => Colon,
            ';' => Semicolon,
            '=' => Eq,
            '+' => Plus,
            '-' => Minus,
            '*' => Star,
            '/' => Slash,
            '%' => Percent,
            '<' => Lt,
            '>' => Gt,
            '!' => Bang,
            other => {
                return Err(LexError {
                    position,
                    message: format!("unexpected character '{other}'"),
                });
            }
        };

        Ok(Token::new(kind, c.to_string(), position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::lex(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_identifiers_and_keywords() {
        assert_eq!(
            kinds("val x = 1"),
            vec![
                TokenKind::Val,
                TokenKind::Ident("x".into()),
                TokenKind::Eq,
                TokenKind::Int(1),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_multi_char_operators_with_maximal_munch() {
        assert_eq!(
            kinds("a <= b && c != d"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::LtEq,
                TokenKind::Ident("b".into()),
                TokenKind::AndAnd,
                TokenKind::Ident("c".into()),
                TokenKind::NotEq,
                TokenKind::Ident("d".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_string_escapes() {
        let tokens = Lexer::lex(r#""a\nb""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str("a\nb".to_owned()));
    }

    #[test]
    fn unterminated_string_is_a_lex_error() {
        let err = Lexer::lex("\"abc").unwrap_err();
        assert_eq!(err.position, Position::new(1, 1));
    }

    #[test]
    fn skips_comments_to_end_of_line() {
        assert_eq!(
            kinds("1 // comment\n2"),
            vec![
                TokenKind::Int(1),
                TokenKind::Newline,
                TokenKind::Int(2),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn newline_is_a_token() {
        assert_eq!(
            kinds("1\n2"),
            vec![TokenKind::Int(1), TokenKind::Newline, TokenKind::Int(2), TokenKind::Eof]
        );
    }
}
