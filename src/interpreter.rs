use crate::environment::{Environment, ScopeTree};
use crate::reader::{Parser, ReadError};
use crate::source::{ReaderSource, Source, StrSource};
use crate::tokens::Lexer;
use crate::types::Expression;
use crate::{core, evaluator};
use std::fmt;
use std::io;
use std::path::Path;

pub type Result<T = Expression> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Read(ReadError),
    Eval(evaluator::Error),
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Read(e) => write!(f, "read error: {}", e),
            Error::Eval(e) => write!(f, "{}", e),
            Error::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Self {
        Self::Read(e)
    }
}

impl From<evaluator::Error> for Error {
    fn from(e: evaluator::Error) -> Self {
        Self::Eval(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Owns the global scope for a session. Bindings made by one call to
/// [`Interpreter::process`] are visible to the next.
pub struct Interpreter {
    scopes: ScopeTree,
}

impl Interpreter {
    pub fn new() -> Result<Self> {
        let mut scopes = ScopeTree::new();
        core::load_all(&mut scopes.root()).map_err(evaluator::Error::from)?;
        Ok(Self { scopes })
    }

    pub fn env(&mut self) -> Environment<'_> {
        self.scopes.root()
    }

    pub fn eval(&mut self, expr: &Expression) -> Result {
        Ok(evaluator::eval(expr, &mut self.env())?)
    }

    /// Evaluates every form in `text` in order and returns the value of the
    /// last one, or `nil` if there were none. Stops at the first error;
    /// bindings made by earlier forms are kept.
    pub fn process(&mut self, text: &str) -> Result {
        self.run_source(StrSource::new(text))
    }

    pub fn run_source<S: Source>(&mut self, source: S) -> Result {
        let mut parser = Parser::new(Lexer::new(source))?;
        let mut last = Expression::nil();
        while parser.has_next() {
            let expr = parser.parse_next()?;
            last = self.eval(&expr)?;
        }
        Ok(last)
    }

    pub fn run_file<P: AsRef<Path>>(&mut self, path: P) -> Result {
        log::info!("Running script {}", path.as_ref().display());
        self.run_source(ReaderSource::open(path)?)
    }
}
