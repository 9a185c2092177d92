use crate::source::Source;
use derive_more::Display;
use std::collections::HashSet;
use std::{fmt, io};

lazy_static! {
    // Operators double as identifier characters.
    static ref OPERATORS: HashSet<char> = ['=', '+', '-', '*', '/', '^', '.', '$']
        .iter()
        .copied()
        .collect();
}

fn is_operator(c: char) -> bool {
    OPERATORS.contains(&c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(fmt = "line {}, column {}", line, column)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    End,
    Atom(String),
    Integer(String),
    Real(String),
    String(String),
    OpenParen,
    CloseParen,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenKind {
    #[display(fmt = "end of input")]
    End,
    #[display(fmt = "atom")]
    Atom,
    #[display(fmt = "integer")]
    Integer,
    #[display(fmt = "real")]
    Real,
    #[display(fmt = "string")]
    String,
    #[display(fmt = "'('")]
    OpenParen,
    #[display(fmt = "')'")]
    CloseParen,
    #[display(fmt = "comment marker")]
    Comment,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::End => TokenKind::End,
            Token::Atom(_) => TokenKind::Atom,
            Token::Integer(_) => TokenKind::Integer,
            Token::Real(_) => TokenKind::Real,
            Token::String(_) => TokenKind::String,
            Token::OpenParen => TokenKind::OpenParen,
            Token::CloseParen => TokenKind::CloseParen,
            Token::Comment => TokenKind::Comment,
        }
    }
}

#[derive(Debug)]
pub enum TokenizerError {
    InvalidCharacter { found: char, at: Position },
    UnexpectedEnd { expected: char, at: Position },
    Io(io::Error),
}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizerError::InvalidCharacter { found, at } => {
                write!(f, "invalid character '{}' at {}", found, at)
            }
            TokenizerError::UnexpectedEnd { expected, at } => {
                write!(f, "expected '{}' but found end of input at {}", expected, at)
            }
            TokenizerError::Io(e) => write!(f, "failed to read input: {}", e),
        }
    }
}

pub type Result<T = Token> = std::result::Result<T, TokenizerError>;

/// Single pass tokenizer over a [`Source`]. Each call to
/// [`Lexer::next_token`] consumes exactly one token; once the source is
/// exhausted every further call yields [`Token::End`].
pub struct Lexer<S> {
    source: S,
    position: Position,
}

impl<S: Source> Lexer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            position: Position::default(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn next_token(&mut self) -> Result {
        while let Some(c) = self.source.current() {
            match c {
                c if c.is_whitespace() => self.skip_whitespace()?,
                '(' => {
                    self.consume()?;
                    return Ok(Token::OpenParen);
                }
                ')' => {
                    self.consume()?;
                    return Ok(Token::CloseParen);
                }
                '#' => {
                    self.consume()?;
                    return Ok(Token::Comment);
                }
                '"' => return self.string_literal(),
                '+' | '-' => return self.atom_or_number(c),
                c if c.is_alphabetic() || is_operator(c) => return self.atom(String::new()),
                c if c.is_ascii_digit() => return self.number(String::new()),
                c => return Err(self.invalid(c)),
            }
        }
        Ok(Token::End)
    }

    /// Discards everything up to and including the next newline.
    pub fn skip_line(&mut self) -> Result<()> {
        while let Some(c) = self.source.current() {
            self.consume()?;
            if c == '\n' {
                break;
            }
        }
        Ok(())
    }

    fn consume(&mut self) -> Result<()> {
        match self.source.current() {
            Some('\n') => {
                self.position.line += 1;
                self.position.column = 1;
            }
            Some(_) => self.position.column += 1,
            None => {}
        }
        self.source.consume().map_err(TokenizerError::Io)
    }

    fn skip_whitespace(&mut self) -> Result<()> {
        while self.source.current().map_or(false, char::is_whitespace) {
            self.consume()?;
        }
        Ok(())
    }

    fn string_literal(&mut self) -> Result {
        self.consume()?;
        let mut text = String::new();
        let mut escaped = false;
        loop {
            match self.source.current() {
                None => {
                    return Err(TokenizerError::UnexpectedEnd {
                        expected: '"',
                        at: self.position,
                    })
                }
                Some('"') if !escaped => {
                    self.consume()?;
                    return Ok(Token::String(text));
                }
                Some('\\') if !escaped => escaped = true,
                Some(c) => {
                    text.push(c);
                    escaped = false;
                }
            }
            self.consume()?;
        }
    }

    fn atom_or_number(&mut self, sign: char) -> Result {
        let mut text = String::new();
        text.push(sign);
        self.consume()?;
        match self.source.current() {
            Some(c) if c.is_ascii_digit() => self.number(text),
            _ => self.atom(text),
        }
    }

    fn atom(&mut self, mut text: String) -> Result {
        if let Some(c) = self.source.current().filter(|&c| is_operator(c)) {
            text.push(c);
            self.consume()?;
        }
        while let Some(c) = self
            .source
            .current()
            .filter(|&c| c.is_alphanumeric() || c == '_')
        {
            text.push(c);
            self.consume()?;
        }
        self.terminate(Token::Atom(text))
    }

    fn number(&mut self, mut text: String) -> Result {
        let mut is_real = false;
        while let Some(c) = self.source.current() {
            if c == '.' && !is_real {
                is_real = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.consume()?;
        }
        match is_real {
            true => self.terminate(Token::Real(text)),
            false => self.terminate(Token::Integer(text)),
        }
    }

    // Atoms and numbers must be followed by whitespace, ')' or the end of input.
    fn terminate(&self, token: Token) -> Result {
        match self.source.current() {
            None | Some(')') => Ok(token),
            Some(c) if c.is_whitespace() => Ok(token),
            Some(c) => Err(self.invalid(c)),
        }
    }

    fn invalid(&self, found: char) -> TokenizerError {
        TokenizerError::InvalidCharacter {
            found,
            at: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StrSource;

    fn lex(input: &str) -> Result<Vec<Token>> {
        let mut lexer = Lexer::new(StrSource::new(input));
        let mut tokens = Vec::new();
        loop {
            match lexer.next_token()? {
                Token::End => return Ok(tokens),
                token => tokens.push(token),
            }
        }
    }

    fn atom(text: &str) -> Token {
        Token::Atom(text.into())
    }

    #[test]
    fn empty_input_is_end_forever() {
        let mut lexer = Lexer::new(StrSource::new(""));
        assert_eq!(lexer.next_token().unwrap(), Token::End);
        assert_eq!(lexer.next_token().unwrap(), Token::End);
        let mut lexer = Lexer::new(StrSource::new("   \n\t "));
        assert_eq!(lexer.next_token().unwrap(), Token::End);
    }

    #[test]
    fn structure_and_atoms() {
        assert_eq!(
            lex("(let my_var 3)").unwrap(),
            vec![
                Token::OpenParen,
                atom("let"),
                atom("my_var"),
                Token::Integer("3".into()),
                Token::CloseParen
            ]
        );
    }

    #[test]
    fn operators_are_atoms() {
        assert_eq!(
            lex("+ - * / ^ . $ = $x =a").unwrap(),
            vec![
                atom("+"),
                atom("-"),
                atom("*"),
                atom("/"),
                atom("^"),
                atom("."),
                atom("$"),
                atom("="),
                atom("$x"),
                atom("=a")
            ]
        );
    }

    #[test]
    fn signs_start_numbers_only_before_digits() {
        assert_eq!(
            lex("-5 +12 -2.5 -x +").unwrap(),
            vec![
                Token::Integer("-5".into()),
                Token::Integer("+12".into()),
                Token::Real("-2.5".into()),
                atom("-x"),
                atom("+")
            ]
        );
    }

    #[test]
    fn reals_take_a_single_full_stop() {
        assert_eq!(lex("12.34").unwrap(), vec![Token::Real("12.34".into())]);
        assert_eq!(lex("7.").unwrap(), vec![Token::Real("7.".into())]);
        match lex("1.2.3") {
            Err(TokenizerError::InvalidCharacter { found: '.', at }) => {
                assert_eq!(at, Position { line: 1, column: 4 })
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn strings_take_escaped_characters_literally() {
        let tokens = lex(r#""This string escapes \"\\\"""#).unwrap();
        assert_eq!(
            tokens,
            vec![Token::String("This string escapes \"\\\"".into())]
        );
        assert_eq!(lex(r#""a\nb""#).unwrap(), vec![Token::String("anb".into())]);
        assert_eq!(lex(r#""""#).unwrap(), vec![Token::String("".into())]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        match lex(r#""never closed \""#) {
            Err(TokenizerError::UnexpectedEnd { expected: '"', .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn atoms_must_be_properly_terminated() {
        match lex("(abc(") {
            Err(TokenizerError::InvalidCharacter { found: '(', .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        match lex("12a") {
            Err(TokenizerError::InvalidCharacter { found: 'a', .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_characters_report_their_position() {
        match lex("(+ 1\n  @)") {
            Err(TokenizerError::InvalidCharacter { found: '@', at }) => {
                assert_eq!(at, Position { line: 2, column: 3 })
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn comment_marker_leaves_the_line_to_the_caller() {
        let mut lexer = Lexer::new(StrSource::new("# note (\n42"));
        assert_eq!(lexer.next_token().unwrap(), Token::Comment);
        assert_eq!(lexer.next_token().unwrap(), atom("note"));
        let mut lexer = Lexer::new(StrSource::new("# note (\n42"));
        assert_eq!(lexer.next_token().unwrap(), Token::Comment);
        lexer.skip_line().unwrap();
        assert_eq!(lexer.next_token().unwrap(), Token::Integer("42".into()));
        assert_eq!(lexer.next_token().unwrap(), Token::End);
    }
}
