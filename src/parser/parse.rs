//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, `expect`/`accept`, error reporting, program entry
//! - `declarations`: includes, struct/variable/function declarations, types
//! - `statements`: blocks and statements
//! - `expressions`: expressions with precedence climbing
//!
//! # Error recovery
//!
//! Nothing here aborts on malformed input.  A failed [`Parser::expect`] reports
//! a [`ParseError`] and the caller carries on as if the expected token had
//! been there.  A production that ends up missing a required piece (a name,
//! a type, an operand) builds no node, and its parent leaves it out.
//!
//! Two errors in a row anchored at the same token are one error: the second
//! is dropped.  This keeps a production that keeps failing at a stuck token
//! from flooding the output.
//!
//! Statements and prefix expressions nest at most [`MAX_NESTING_DEPTH`]
//! levels.  Past that the parser reports [`ParseError::TooDeep`], skips the
//! token it stopped at, and unwinds instead of recursing further.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token, TokenClass};
use crate::parser::source::SourceError;
use crate::parser::stream::TokenStream;
use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, trace};

/// Maximum nesting of statements and prefix expressions.
///
/// Each level costs several stack frames, so this bounds stack use on
/// adversarial input such as thousands of `(` or `-` in a row.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Syntax error. Recorded, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected ({}) found ({found}) at {}", join_classes(.expected), .found.location)]
    Expected {
        expected: Vec<TokenClass>,
        found: Token,
    },

    /// An integer literal too large for the node it appears in.
    #[error("integer literal out of range ({found}) at {}", .found.location)]
    IntegerOutOfRange { found: Token },

    #[error("nesting deeper than {} levels ({found}) at {}", MAX_NESTING_DEPTH, .found.location)]
    TooDeep { found: Token },
}

impl ParseError {
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::Expected { found, .. }
            | ParseError::IntegerOutOfRange { found }
            | ParseError::TooDeep { found } => found.location,
        }
    }
}

fn join_classes(classes: &[TokenClass]) -> String {
    classes
        .iter()
        .map(|class| class.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

/// Result of a full parse: the tree plus every diagnostic found on the way.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub program: Program,
    pub errors: Vec<ParseError>,
    pub lex_errors: Vec<LexError>,
}

impl ParseOutput {
    /// Number of syntax errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of lexical errors met while feeding the parser.
    pub fn lex_error_count(&self) -> usize {
        self.lex_errors.len()
    }

    /// No syntax errors were found, so later passes may run.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Recursive descent parser for the C subset
pub struct Parser<R> {
    pub(crate) tokens: TokenStream<R>,
    errors: Vec<ParseError>,
    last_error_at: Option<usize>,
    depth: usize,
}

impl<'a> Parser<&'a [u8]> {
    /// Create a parser over an in-memory source string.
    pub fn from_source(source: &'a str) -> Self {
        Parser::new(Lexer::from_source(source))
    }
}

impl<R: BufRead> Parser<R> {
    pub fn new(lexer: Lexer<R>) -> Self {
        Self {
            tokens: TokenStream::new(lexer),
            errors: Vec::new(),
            last_error_at: None,
            depth: 0,
        }
    }

    /// Parse the whole token stream.
    ///
    /// Always yields a program for malformed input; only a read failure in
    /// the character source is an `Err`.
    pub fn parse(mut self) -> Result<ParseOutput, SourceError> {
        let program = self.parse_program();

        let Parser { tokens, errors, .. } = self;
        let lex_errors = tokens.into_lexer().finish()?;

        debug!(
            structs = program.structs.len(),
            globals = program.globals.len(),
            functions = program.functions.len(),
            syntax_errors = errors.len(),
            lexical_errors = lex_errors.len(),
            "parse finished"
        );

        Ok(ParseOutput {
            program,
            errors,
            lex_errors,
        })
    }

    /// program ::= include* struct_decl* var_decl* fun_decl* EOF
    fn parse_program(&mut self) -> Program {
        self.parse_includes();
        let structs = self.parse_struct_decls();
        let globals = self.parse_var_decls();
        let functions = self.parse_fun_decls();
        self.expect(&[TokenClass::Eof]);

        Program {
            structs,
            globals,
            functions,
        }
    }

    // ===== Helper methods =====

    pub(crate) fn current(&self) -> &Token {
        self.tokens.current()
    }

    pub(crate) fn current_class(&self) -> TokenClass {
        self.tokens.current().class
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.tokens.current().location
    }

    /// Class of the token `n` positions past the current one.
    pub(crate) fn look_ahead(&mut self, n: usize) -> TokenClass {
        self.tokens.look_ahead(n).class
    }

    pub(crate) fn advance(&mut self) -> Token {
        self.tokens.advance()
    }

    /// Whether the current token is one of `expected`. Consumes nothing.
    pub(crate) fn accept(&self, expected: &[TokenClass]) -> bool {
        expected.contains(&self.current_class())
    }

    /// Consume the current token if it is one of `expected`, otherwise
    /// report an error and return `None`.
    pub(crate) fn expect(&mut self, expected: &[TokenClass]) -> Option<Token> {
        if self.accept(expected) {
            return Some(self.advance());
        }

        let error = ParseError::Expected {
            expected: expected.to_vec(),
            found: self.current().clone(),
        };
        self.report(error, self.tokens.position());
        None
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<String> {
        self.expect(&[TokenClass::Identifier])
            .map(|token| token.lexeme)
    }

    /// Numeric value of an integer literal token that was just consumed.
    pub(crate) fn int_value<T: FromStr>(&mut self, token: Token) -> Option<T> {
        match token.lexeme.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                let at = self.tokens.position().saturating_sub(1);
                self.report(ParseError::IntegerOutOfRange { found: token }, at);
                None
            }
        }
    }

    /// Report an expected-one-of error at the current token.
    pub(crate) fn error(&mut self, expected: &[TokenClass]) {
        let error = ParseError::Expected {
            expected: expected.to_vec(),
            found: self.current().clone(),
        };
        self.report(error, self.tokens.position());
    }

    /// Go one nesting level deeper. Pair every `true` with
    /// [`Parser::leave_nesting`].
    ///
    /// Past [`MAX_NESTING_DEPTH`] this reports an error, skips the current
    /// token so enclosing loops still make progress, and returns `false`.
    pub(crate) fn enter_nesting(&mut self) -> bool {
        if self.depth >= MAX_NESTING_DEPTH {
            let error = ParseError::TooDeep {
                found: self.current().clone(),
            };
            self.report(error, self.tokens.position());
            if !self.accept(&[TokenClass::Eof]) {
                self.advance();
            }
            return false;
        }

        self.depth += 1;
        true
    }

    pub(crate) fn leave_nesting(&mut self) {
        debug_assert!(self.depth > 0, "leave_nesting without enter_nesting");
        self.depth = self.depth.saturating_sub(1);
    }

    /// Record an error anchored at stream position `at`, unless the previous
    /// error was anchored there too.
    fn report(&mut self, error: ParseError, at: usize) {
        if self.last_error_at == Some(at) {
            trace!(%error, "suppressed repeated error at same token");
            return;
        }

        debug!(%error, "syntax error");
        self.last_error_at = Some(at);
        self.errors.push(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParseOutput {
        Parser::from_source(source).parse().unwrap()
    }

    #[test]
    fn test_parse_simple_function() {
        let output = parse("int main() { return 0; }");
        assert!(output.is_ok(), "{:?}", output.errors);

        let program = &output.program;
        assert_eq!(program.functions.len(), 1);
        let main = &program.functions[0];
        assert_eq!(main.name, "main");
        assert_eq!(main.params.len(), 0);
        assert_eq!(main.return_type, Type::Base(BaseType::Int));
        assert_eq!(main.body.stmts.len(), 1);
    }

    #[test]
    fn test_parse_struct() {
        let output = parse("struct Point { int x; int y; };");
        assert!(output.is_ok());

        let point = &output.program.structs[0];
        assert_eq!(point.name, "Point");
        assert_eq!(point.fields.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let output = parse("");
        assert!(output.is_ok());
        assert!(output.program.is_empty());
    }

    #[test]
    fn test_error_message_format() {
        let output = parse("int x");
        assert_eq!(output.error_count(), 1);
        assert_eq!(
            output.errors[0].to_string(),
            "expected (SC) found (EOF) at 1:5"
        );
    }

    #[test]
    fn test_repeated_error_at_same_token_is_suppressed() {
        // expect(IDENTIFIER), expect(SC) and expect(EOF) all fail on `5`
        let output = parse("int 5");
        assert_eq!(output.error_count(), 1);
        assert_eq!(
            output.errors[0].to_string(),
            "expected (IDENTIFIER) found (INT_LITERAL(5)) at 1:4"
        );
    }

    #[test]
    fn test_integer_out_of_range() {
        let output = parse("int a[99999999999999999999999];");
        assert_eq!(output.error_count(), 1);
        assert!(matches!(
            output.errors[0],
            ParseError::IntegerOutOfRange { .. }
        ));
        assert!(output.program.globals.is_empty());
    }

    #[test]
    fn test_nesting_limit() {
        let mut parser = Parser::from_source("x");
        for _ in 0..MAX_NESTING_DEPTH {
            assert!(parser.enter_nesting());
        }
        assert!(!parser.enter_nesting());
        assert_eq!(parser.current_class(), TokenClass::Eof);

        parser.leave_nesting();
        assert!(parser.enter_nesting());

        let output = parser.parse().unwrap();
        assert!(matches!(output.errors[0], ParseError::TooDeep { .. }));
    }

    #[test]
    fn test_lex_errors_are_reported_separately() {
        let output = parse("int x; @");
        assert_eq!(output.lex_error_count(), 1);
        assert_eq!(output.error_count(), 1);
    }
}
