//! Harbour source parser
//!
//! This module transforms Harbour/Clipper source text into a syntax tree:
//! - [`token`]: token categories and their spellings
//! - [`lexer`]: tokenization (source text → tokens, one at a time)
//! - [`reader`]: lookahead and backtracking over the token stream
//! - [`grammar`]: expression rule tables and precedence bands
//! - [`expressions`]: Pratt expression parser
//! - [`parse`]: statement parser entry point and error types
//! - [`ast`]: syntax tree node definitions
//!
//! # Supported Dialect
//!
//! - Definitions: `function`, `procedure`, `static function`, `static procedure`
//! - Statements: `local`/`static` declarations, `if`/`elseif`/`else`/`endif`,
//!   `while`/`endwhile`, `return`, calls, assignments
//! - Expressions: xBase operators (`.and.`, `.or.`, `$`, `#`), assignment
//!   family, `++`/`--`, calls, indexing, `:` member access, array, hash and
//!   codeblock literals, `iif`
//! - Comments and preprocessor directives are kept in the tree, not evaluated
//!
//! # Parser Implementation
//!
//! Hand-written: a statement-level recursive descent parser on top of a
//! table-driven Pratt expression parser. No external parser generator
//! dependencies.

pub mod ast;
pub mod expressions;
pub mod grammar;
pub mod lexer;
pub mod parse;
pub mod reader;
mod statements;
pub mod token;
