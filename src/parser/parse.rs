//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, the parser error types and the
//! main parse entry point.
//!
//! # Parser Architecture
//!
//! Two levels, both reading from one [`SourceReader`]:
//! - `statements`: statement grammar, one production per leading keyword
//! - `expressions`: Pratt engine driven by the tables in `grammar`
//!
//! Statement productions are `impl Parser` blocks in `statements.rs`; the
//! expression engine borrows the reader through [`Parser::expression`].
//!
//! Parsing stops at the first error. There is no recovery.

use crate::parser::ast::*;
use crate::parser::expressions::ExpressionParser;
use crate::parser::lexer::{LexError, Lexer};
use crate::parser::reader::SourceReader;
use crate::parser::token::{Token, TokenKind};
use thiserror::Error;

/// Grammar violation at a specific token
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Syntax error at line {}, column {}: {}", .location.line, .location.column, .message)]
pub struct SyntaxError {
    pub message: String,
    pub kind: TokenKind, // offending token kind
    pub text: String,
    pub location: SourceLocation,
}

impl SyntaxError {
    /// Error positioned at `token`
    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        SyntaxError {
            message: message.into(),
            kind: token.kind,
            text: token.text.clone(),
            location: token.location,
        }
    }
}

/// Parser error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::Lex(e) => e.location,
            ParseError::Syntax(e) => e.location,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::Lex(e) => &e.message,
            ParseError::Syntax(e) => &e.message,
        }
    }
}

/// Statement-level parser for Harbour source
pub struct Parser {
    pub(crate) reader: SourceReader,
    /// Inside a function or procedure body
    pub(crate) in_definition: bool,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        Self {
            reader: SourceReader::new(lexer),
            in_definition: false,
        }
    }

    /// Parse the whole unit
    pub fn parse(&mut self) -> Result<SourceRoot, ParseError> {
        let mut root = SourceRoot::new();

        while !self.reader.is_at_end()? {
            let statement = self.parse_statement()?;
            root.nodes.push(statement);
        }

        Ok(root)
    }

    // ===== Helper methods =====

    pub(crate) fn expression(&mut self) -> ExpressionParser<'_> {
        ExpressionParser::new(&mut self.reader)
    }

    /// Syntax error at the next unconsumed token
    pub(crate) fn error_at_next(&mut self, message: impl Into<String>) -> ParseError {
        match self.reader.peek() {
            Ok(token) => SyntaxError::at(token, message).into(),
            Err(e) => e,
        }
    }

    pub(crate) fn expect_name(&mut self) -> Result<String, ParseError> {
        Ok(self.reader.expect(TokenKind::Name)?.text)
    }
}
