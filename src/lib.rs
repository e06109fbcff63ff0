//! # Introduction
//!
//! minic is the front end of a compiler for a small subset of C: a lexer and
//! an error-recovering recursive-descent parser that turn source text into
//! an abstract syntax tree.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Scanner → Lexer → TokenStream → Parser → AST
//! ```
//!
//! 1. [`parser::source`]: reads characters and tracks line and column.
//! 2. [`parser::lexer`]: groups characters into tokens, reporting
//!    unrecognised characters without stopping.
//! 3. [`parser::stream`]: buffers tokens so the parser can look ahead.
//! 4. [`parser::parse`]: builds the [`parser::ast::Program`], reporting
//!    every syntax error it meets and carrying on past each one.
//!
//! ## Example
//!
//! ```
//! let output = minic::parse_source("int main() { return 0; }").unwrap();
//! assert!(output.is_ok());
//! assert_eq!(
//!     output.program.to_string(),
//!     "Program(FunDecl(INT,main,Block(Return(IntLiteral(0)))))"
//! );
//! ```

pub mod parser;

use parser::{Lexed, Lexer, ParseOutput, Parser, SourceError};

/// Tokenize an in-memory source string, EOF included.
pub fn lex_source(source: &str) -> Result<Lexed, SourceError> {
    Lexer::from_source(source).tokenize()
}

/// Parse an in-memory source string.
pub fn parse_source(source: &str) -> Result<ParseOutput, SourceError> {
    Parser::from_source(source).parse()
}
