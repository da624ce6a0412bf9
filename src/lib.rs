//! # Introduction
//!
//! Harpy tokenizes and parses Harbour/Clipper source into a syntax tree that
//! can be printed back as equivalent source text.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → SourceReader → Parser (statements + Pratt expressions) → SourceRoot → Render
//! ```
//!
//! 1. [`parser`]: tokenizes on demand, parses statements and expressions,
//!    and defines the tree in [`parser::ast`].
//! 2. [`render`]: prints any node back as dialect text.
//!
//! ## Example
//!
//! ```
//! use harpy::render::Render;
//!
//! let root = harpy::parse("function a(b)\n local c := b\nreturn c").unwrap();
//! assert_eq!(root.nodes.len(), 1);
//! assert_eq!(root.render(), "function a(b)\n   local c := b\nreturn c\n");
//! ```
//!
//! Preprocessor directives and comments are kept as opaque nodes. Nothing is
//! evaluated or type-checked.

pub mod parser;
pub mod render;

pub use parser::ast::SourceRoot;
pub use parser::lexer::{LexError, Lexer};
pub use parser::parse::{ParseError, Parser, SyntaxError};

/// Parse a complete compilation unit
pub fn parse(source: &str) -> Result<SourceRoot, ParseError> {
    Parser::new(Lexer::new(source)).parse()
}
