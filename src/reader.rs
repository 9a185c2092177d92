use crate::source::{Source, StrSource};
use crate::tokens::{Lexer, Token, TokenKind, TokenizerError};
use crate::types::Expression;
use derive_more::Display;
use std::fmt;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    #[display(fmt = "an atom, number, string or list")]
    Expression,
    #[display(fmt = "{}", _0)]
    Token(TokenKind),
}

#[derive(Debug)]
pub enum ReadError {
    Tokenizer(TokenizerError),
    Unexpected { expected: Expected, found: TokenKind },
    NumberOutOfRange(String),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Tokenizer(e) => write!(f, "{}", e),
            ReadError::Unexpected { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            ReadError::NumberOutOfRange(text) => write!(f, "number {} is out of range", text),
        }
    }
}

impl From<TokenizerError> for ReadError {
    fn from(e: TokenizerError) -> Self {
        Self::Tokenizer(e)
    }
}

pub type Result<T = Expression> = std::result::Result<T, ReadError>;

/// Recursive descent over the token stream, one token of lookahead.
///
/// ```text
/// sexpr := ATOM | INTEGER | REAL | STRING | list
/// list  := '(' sexpr* ')'
/// ```
///
/// Comment markers are handled here: the rest of the line is skipped, so a
/// comment may appear wherever whitespace may.
pub struct Parser<S> {
    lexer: Lexer<S>,
    lookahead: Token,
}

impl<S: Source> Parser<S> {
    pub fn new(lexer: Lexer<S>) -> Result<Self> {
        let mut parser = Self {
            lexer,
            lookahead: Token::End,
        };
        parser.advance()?;
        Ok(parser)
    }

    pub fn has_next(&self) -> bool {
        self.lookahead != Token::End
    }

    pub fn parse_next(&mut self) -> Result {
        if self.lookahead == Token::OpenParen {
            return self.list();
        }
        let expr = match &self.lookahead {
            Token::Atom(text) => Expression::symbol(text),
            Token::Integer(text) => text
                .parse()
                .map(Expression::Integer)
                .map_err(|_| ReadError::NumberOutOfRange(text.clone()))?,
            Token::Real(text) => text
                .parse()
                .map(Expression::Real)
                .map_err(|_| ReadError::NumberOutOfRange(text.clone()))?,
            Token::String(text) => Expression::string(text),
            other => {
                return Err(ReadError::Unexpected {
                    expected: Expected::Expression,
                    found: other.kind(),
                })
            }
        };
        self.advance()?;
        Ok(expr)
    }

    fn list(&mut self) -> Result {
        self.expect(TokenKind::OpenParen)?;
        let mut elements = Vec::new();
        loop {
            match self.lookahead {
                Token::CloseParen => break,
                Token::End => Err(ReadError::Unexpected {
                    expected: Expected::Token(TokenKind::CloseParen),
                    found: TokenKind::End,
                })?,
                _ => elements.push(self.parse_next()?),
            }
        }
        self.expect(TokenKind::CloseParen)?;
        Ok(Expression::wrap_list(elements))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<()> {
        match self.lookahead.kind() {
            found if found == kind => self.advance(),
            found => Err(ReadError::Unexpected {
                expected: Expected::Token(kind),
                found,
            }),
        }
    }

    fn advance(&mut self) -> Result<()> {
        loop {
            self.lookahead = self.lexer.next_token()?;
            if self.lookahead != Token::Comment {
                return Ok(());
            }
            self.lexer.skip_line()?;
        }
    }
}

/// Reads exactly one form from `input`.
pub fn read_str(input: &str) -> Result {
    let mut parser = Parser::new(Lexer::new(StrSource::new(input)))?;
    let expr = parser.parse_next()?;
    match parser.has_next() {
        false => Ok(expr),
        true => Err(ReadError::Unexpected {
            expected: Expected::Token(TokenKind::End),
            found: parser.lookahead.kind(),
        }),
    }
}
