//! Token stream with buffered lookahead for the recursive descent parser.

use super::lexer::{Lexer, Token};
use std::collections::VecDeque;
use std::io::BufRead;

/// Pull-based token stream over a [`Lexer`].
///
/// Holds the current token plus a FIFO of tokens already lexed for
/// lookahead, so peeking any distance never re-lexes anything.
pub struct TokenStream<R> {
    lexer: Lexer<R>,
    current: Token,
    buffer: VecDeque<Token>,
    pos: usize,
}

impl<R: BufRead> TokenStream<R> {
    /// Create a token stream positioned on the first token.
    pub fn new(mut lexer: Lexer<R>) -> Self {
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            buffer: VecDeque::new(),
            pos: 0,
        }
    }

    /// The token under the cursor.
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Peek at the token `n` positions past the current one.
    ///
    /// `n` must be at least 1; `look_ahead(1)` is the token right after
    /// [`TokenStream::current`].
    pub fn look_ahead(&mut self, n: usize) -> &Token {
        assert!(n >= 1, "look_ahead distance must be at least 1");
        while self.buffer.len() < n {
            let token = self.lexer.next_token();
            self.buffer.push_back(token);
        }
        &self.buffer[n - 1]
    }

    /// Consume the current token and return it.
    pub fn advance(&mut self) -> Token {
        let next = match self.buffer.pop_front() {
            Some(token) => token,
            None => self.lexer.next_token(),
        };
        self.pos += 1;
        std::mem::replace(&mut self.current, next)
    }

    /// Index of the current token within the stream.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Give the lexer back, e.g. to collect its errors.
    pub fn into_lexer(self) -> Lexer<R> {
        self.lexer
    }
}
