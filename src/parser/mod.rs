//! C subset front end
//!
//! This module transforms source text into an Abstract Syntax Tree (AST):
//! - [`source`]: character source with line/column tracking
//! - [`lexer`]: Tokenization (characters → tokens)
//! - [`stream`]: token buffer with arbitrary lookahead
//! - [`parse`]: Parsing (tokens → AST), split across `declarations`,
//!   `statements` and `expressions`
//! - [`ast`]: AST node definitions
//! - `printer`: one-line rendering of the AST
//!
//! # Supported C Subset
//!
//! - Types: `int`, `char`, `void`, structs, pointers, fixed-size arrays
//! - Declarations: `#include "file"`, struct definitions, globals, functions,
//!   in that order
//! - Statements: blocks, `if`/`else`, `while`, `return`, assignments
//! - Expressions: arithmetic, comparison, logical, `-`, `*`, indexing,
//!   field access, calls, casts, `sizeof`
//!
//! # Error handling
//!
//! Neither the lexer nor the parser stops at the first problem. Both record
//! diagnostics and keep going, so a single run reports every error it can
//! find. Only a failure to read the input is returned as `Err`.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod printer;
pub mod source;
mod statements;
pub mod stream;

pub use ast::SourceLocation;
pub use lexer::{LexError, Lexed, Lexer, Token, TokenClass};
pub use parse::{ParseError, ParseOutput, Parser};
pub use source::{Scanner, SourceError};
pub use stream::TokenStream;
