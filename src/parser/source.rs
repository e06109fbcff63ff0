//! Character source for the lexer
//!
//! [`Scanner`] hands out one character at a time from any [`BufRead`],
//! tracking a 1-based line and 0-based column.  Input is pulled a line at a
//! time, so a source file never has to be resident in memory as a whole.
//!
//! Running out of input is reported as [`SourceError::EndOfInput`], which the
//! lexer treats as an ordinary condition.  Any other failure is an I/O error
//! and is the only way lexing can fail for real.

use super::ast::SourceLocation;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Failure to produce the next character.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No characters are left.
    #[error("end of input")]
    EndOfInput,

    /// The underlying reader failed (including invalid UTF-8).
    #[error("failed to read source: {0}")]
    Io(#[from] io::Error),
}

/// Line/column tracking character reader.
pub struct Scanner<R> {
    reader: R,
    pending: VecDeque<char>,
    exhausted: bool,
    line: usize,
    column: usize,
}

impl<'a> Scanner<&'a [u8]> {
    /// Scan an in-memory source string.
    pub fn from_source(source: &'a str) -> Self {
        Scanner::new(source.as_bytes())
    }
}

impl Scanner<BufReader<File>> {
    /// Open a file for scanning.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Scanner::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
            exhausted: false,
            line: 1,
            column: 0,
        }
    }

    /// Look at the next character without consuming it.
    pub fn peek(&mut self) -> Result<char, SourceError> {
        self.fill()?;
        self.pending.front().copied().ok_or(SourceError::EndOfInput)
    }

    /// Consume the next character.
    pub fn advance(&mut self) -> Result<char, SourceError> {
        self.fill()?;
        let ch = self.pending.pop_front().ok_or(SourceError::EndOfInput)?;

        match ch {
            '\n' => self.new_line(),
            // Lone CR is a line break; in CRLF only the LF counts
            '\r' if self.pending.front() != Some(&'\n') => self.new_line(),
            _ => self.column += 1,
        }

        Ok(ch)
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Location of the next character to be consumed.
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 0;
    }

    fn fill(&mut self) -> Result<(), SourceError> {
        while self.pending.is_empty() && !self.exhausted {
            let mut buf = String::new();
            if self.reader.read_line(&mut buf)? == 0 {
                self.exhausted = true;
            } else {
                self.pending.extend(buf.chars());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_consume() {
        let mut scanner = Scanner::from_source("ab");
        assert_eq!(scanner.peek().unwrap(), 'a');
        assert_eq!(scanner.peek().unwrap(), 'a');
        assert_eq!(scanner.advance().unwrap(), 'a');
        assert_eq!(scanner.advance().unwrap(), 'b');
        assert!(matches!(scanner.peek(), Err(SourceError::EndOfInput)));
        assert!(matches!(scanner.advance(), Err(SourceError::EndOfInput)));
    }

    #[test]
    fn test_line_and_column_tracking() {
        let mut scanner = Scanner::from_source("ab\ncd");
        assert_eq!(scanner.location(), SourceLocation::new(1, 0));
        scanner.advance().unwrap();
        scanner.advance().unwrap();
        assert_eq!(scanner.location(), SourceLocation::new(1, 2));
        scanner.advance().unwrap(); // '\n'
        assert_eq!(scanner.location(), SourceLocation::new(2, 0));
        scanner.advance().unwrap();
        assert_eq!((scanner.line(), scanner.column()), (2, 1));
    }

    #[test]
    fn test_carriage_returns() {
        let mut scanner = Scanner::from_source("a\r\nb\rc");
        for _ in 0..4 {
            scanner.advance().unwrap();
        }
        // "a\r\nb" consumed: one line break for the CRLF pair
        assert_eq!(scanner.location(), SourceLocation::new(2, 1));
        scanner.advance().unwrap(); // lone '\r'
        assert_eq!(scanner.location(), SourceLocation::new(3, 0));
    }

    #[test]
    fn test_invalid_utf8_is_io_error() {
        let bytes: &[u8] = &[b'a', 0xff, 0xfe, b'\n'];
        let mut scanner = Scanner::new(bytes);
        assert!(matches!(scanner.peek(), Err(SourceError::Io(_))));
    }
}
