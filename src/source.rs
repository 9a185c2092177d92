//! Character sources the lexer reads from.
//!
//! A source exposes one character of lookahead: the lexer inspects
//! [`Source::current`] and advances with [`Source::consume`]. `None` marks the
//! end of input and stays `None` once reached.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::str::Chars;

pub trait Source {
    fn current(&self) -> Option<char>;
    fn consume(&mut self) -> io::Result<()>;
}

/// A finite in-memory text buffer.
pub struct StrSource<'a> {
    chars: Chars<'a>,
    current: Option<char>,
}

impl<'a> StrSource<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars();
        let current = chars.next();
        Self { chars, current }
    }
}

impl Source for StrSource<'_> {
    fn current(&self) -> Option<char> {
        self.current
    }

    fn consume(&mut self) -> io::Result<()> {
        self.current = self.chars.next();
        Ok(())
    }
}

/// A streaming source, decoded a line at a time so that multi-byte characters
/// are never split.
pub struct ReaderSource<R> {
    reader: R,
    line: Vec<char>,
    index: usize,
    exhausted: bool,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> io::Result<Self> {
        let mut source = Self {
            reader,
            line: Vec::new(),
            index: 0,
            exhausted: false,
        };
        source.refill()?;
        Ok(source)
    }

    fn refill(&mut self) -> io::Result<()> {
        let mut buffer = String::new();
        let read = self.reader.read_line(&mut buffer)?;
        self.line = buffer.chars().collect();
        self.index = 0;
        self.exhausted = read == 0;
        Ok(())
    }
}

impl ReaderSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: BufRead> Source for ReaderSource<R> {
    fn current(&self) -> Option<char> {
        self.line.get(self.index).copied()
    }

    fn consume(&mut self) -> io::Result<()> {
        if self.exhausted {
            return Ok(());
        }
        self.index += 1;
        if self.index >= self.line.len() {
            self.refill()?;
        }
        Ok(())
    }
}
