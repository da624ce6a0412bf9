//! Token stream with lookahead and backtracking
//!
//! [`SourceReader`] pulls tokens from the [`Lexer`] lazily into a buffer and
//! walks it with a cursor. A [`Checkpoint`] saves the cursor; resetting to it
//! replays every token consumed since, in order. While no checkpoint is live
//! the consumed prefix of the buffer is dropped, so the buffer only ever holds
//! the tokens under the oldest live checkpoint plus the lookahead.

use super::ast::SourceLocation;
use super::lexer::Lexer;
use super::parse::{ParseError, SyntaxError};
use super::token::{Token, TokenKind};
use std::collections::VecDeque;

/// Saved reader position. Hand it back to [`SourceReader::reset`] to rewind
/// or to [`SourceReader::commit`] to keep what was consumed.
#[must_use = "a checkpoint must be reset or committed"]
#[derive(Debug)]
pub struct Checkpoint {
    position: usize,
}

pub struct SourceReader {
    lexer: Lexer,
    buffer: VecDeque<Token>,
    /// Absolute index of `buffer[0]` in the token stream
    base: usize,
    cursor: usize,
    live_checkpoints: usize,
    /// Location of the most recently consumed token
    previous: SourceLocation,
}

impl SourceReader {
    pub fn new(lexer: Lexer) -> Self {
        Self {
            lexer,
            buffer: VecDeque::new(),
            base: 0,
            cursor: 0,
            live_checkpoints: 0,
            previous: SourceLocation::new(1, 1),
        }
    }

    /// Token `k` positions past the cursor (0 is the next token)
    pub fn look_ahead(&mut self, k: usize) -> Result<&Token, ParseError> {
        while self.buffer.len() <= self.cursor + k {
            let token = self.lexer.next_token()?;
            self.buffer.push_back(token);
        }
        Ok(&self.buffer[self.cursor + k])
    }

    pub fn peek(&mut self) -> Result<&Token, ParseError> {
        self.look_ahead(0)
    }

    pub fn check(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        Ok(self.peek()?.kind == kind)
    }

    pub fn is_at_end(&mut self) -> Result<bool, ParseError> {
        self.check(TokenKind::Eof)
    }

    /// Consume the next token
    pub fn consume(&mut self) -> Result<Token, ParseError> {
        let token = self.peek()?.clone();
        self.previous = token.location;
        if self.live_checkpoints == 0 {
            self.buffer.pop_front();
            self.base += 1;
        } else {
            self.cursor += 1;
        }
        Ok(token)
    }

    pub fn previous_location(&self) -> SourceLocation {
        self.previous
    }

    /// Consume the next token if it has the given kind
    pub fn match_token(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.check(kind)? {
            self.consume()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume a token of the given kind or fail
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind)? {
            return self.consume();
        }
        let token = self.peek()?;
        Err(SyntaxError::at(token, format!("Expected {}, found {}", kind, token)).into())
    }

    /// Return the most recently consumed token to the front of the stream
    pub fn put_back(&mut self, token: Token) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.buffer[self.cursor] = token;
        } else {
            self.base = self.base.saturating_sub(1);
            self.buffer.push_front(token);
        }
    }

    pub fn mark(&mut self) -> Checkpoint {
        self.live_checkpoints += 1;
        Checkpoint {
            position: self.base + self.cursor,
        }
    }

    /// Rewind to `checkpoint`, replaying everything consumed since
    pub fn reset(&mut self, checkpoint: Checkpoint) {
        self.cursor = checkpoint.position - self.base;
        self.release();
    }

    /// Keep everything consumed since `checkpoint`
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        drop(checkpoint);
        self.release();
    }

    fn release(&mut self) {
        self.live_checkpoints -= 1;
        if self.live_checkpoints == 0 {
            self.buffer.drain(..self.cursor);
            self.base += self.cursor;
            self.cursor = 0;
        }
    }

    #[cfg(test)]
    fn buffered(&self) -> usize {
        self.buffer.len()
    }
}
