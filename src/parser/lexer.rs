//! Lexer (tokenizer) for C source code
//!
//! Pulls characters from a [`Scanner`] and produces one [`Token`] per call to
//! [`Lexer::next_token`].  Lexing never stops because of bad input: an
//! unrecognised character is recorded as a [`LexError`] and comes out as an
//! [`TokenClass::Invalid`] token so the parser stays in step with the source.
//!
//! Classification is a single `match` on the first character, longest match
//! first for the two-character operators and `//` comments.

use super::ast::SourceLocation;
use super::source::{Scanner, SourceError};
use std::fmt;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::{debug, trace};

/// All token classes produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    // Literals
    Identifier,
    IntLiteral,
    CharLiteral,
    StringLiteral,

    // Keywords
    Int,
    Char,
    Void,
    If,
    Else,
    While,
    Return,
    Struct,
    Sizeof,

    // Directive
    Include, // #include

    // Delimiters
    Lbra,  // {
    Rbra,  // }
    Lpar,  // (
    Rpar,  // )
    Lsbr,  // [
    Rsbr,  // ]
    Sc,    // ;
    Comma, // ,
    Dot,   // .

    // Operators
    Plus,    // +
    Minus,   // -
    Asterix, // *
    Div,     // /
    Rem,     // %
    Assign,  // =
    Eq,      // ==
    Ne,      // !=
    Lt,      // <
    Le,      // <=
    Gt,      // >
    Ge,      // >=
    And,     // &&
    Or,      // ||

    // Sentinels
    Eof,
    Invalid,
}

impl TokenClass {
    /// The fixed external spelling of this class, e.g. `LBRA`.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenClass::Identifier => "IDENTIFIER",
            TokenClass::IntLiteral => "INT_LITERAL",
            TokenClass::CharLiteral => "CHAR_LITERAL",
            TokenClass::StringLiteral => "STRING_LITERAL",
            TokenClass::Int => "INT",
            TokenClass::Char => "CHAR",
            TokenClass::Void => "VOID",
            TokenClass::If => "IF",
            TokenClass::Else => "ELSE",
            TokenClass::While => "WHILE",
            TokenClass::Return => "RETURN",
            TokenClass::Struct => "STRUCT",
            TokenClass::Sizeof => "SIZEOF",
            TokenClass::Include => "INCLUDE",
            TokenClass::Lbra => "LBRA",
            TokenClass::Rbra => "RBRA",
            TokenClass::Lpar => "LPAR",
            TokenClass::Rpar => "RPAR",
            TokenClass::Lsbr => "LSBR",
            TokenClass::Rsbr => "RSBR",
            TokenClass::Sc => "SC",
            TokenClass::Comma => "COMMA",
            TokenClass::Dot => "DOT",
            TokenClass::Plus => "PLUS",
            TokenClass::Minus => "MINUS",
            TokenClass::Asterix => "ASTERIX",
            TokenClass::Div => "DIV",
            TokenClass::Rem => "REM",
            TokenClass::Assign => "ASSIGN",
            TokenClass::Eq => "EQ",
            TokenClass::Ne => "NE",
            TokenClass::Lt => "LT",
            TokenClass::Le => "LE",
            TokenClass::Gt => "GT",
            TokenClass::Ge => "GE",
            TokenClass::And => "AND",
            TokenClass::Or => "OR",
            TokenClass::Eof => "EOF",
            TokenClass::Invalid => "INVALID",
        }
    }

    /// Keyword class for an identifier spelling, if it is one.
    pub fn keyword(spelling: &str) -> Option<TokenClass> {
        let class = match spelling {
            "int" => TokenClass::Int,
            "char" => TokenClass::Char,
            "void" => TokenClass::Void,
            "if" => TokenClass::If,
            "else" => TokenClass::Else,
            "while" => TokenClass::While,
            "return" => TokenClass::Return,
            "struct" => TokenClass::Struct,
            "sizeof" => TokenClass::Sizeof,
            _ => return None,
        };
        Some(class)
    }

    /// Classes that can begin a type: `int`, `char`, `void`, `struct`.
    pub fn starts_type(self) -> bool {
        matches!(
            self,
            TokenClass::Int | TokenClass::Char | TokenClass::Void | TokenClass::Struct
        )
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, positioned piece of source text.
///
/// `lexeme` is empty for every fixed-spelling class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub class: TokenClass,
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(class: TokenClass, location: SourceLocation) -> Self {
        Self {
            class,
            lexeme: String::new(),
            location,
        }
    }

    pub fn with_lexeme(class: TokenClass, lexeme: String, location: SourceLocation) -> Self {
        Self {
            class,
            lexeme,
            location,
        }
    }

    pub fn is(&self, class: TokenClass) -> bool {
        self.class == class
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lexeme.is_empty() {
            write!(f, "{}", self.class)
        } else {
            write!(f, "{}({})", self.class, self.lexeme)
        }
    }
}

/// Lexical error. Recorded, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unrecognised character ({}) at {location}", .character.escape_debug())]
    UnrecognisedCharacter {
        character: char,
        location: SourceLocation,
    },

    /// Input ended inside a literal or a multi-character spelling.
    #[error("unexpected end of input at {location}")]
    UnexpectedEndOfInput { location: SourceLocation },
}

impl LexError {
    pub fn location(&self) -> SourceLocation {
        match self {
            LexError::UnrecognisedCharacter { location, .. }
            | LexError::UnexpectedEndOfInput { location } => *location,
        }
    }
}

/// Every token up to and including EOF, plus the errors met on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

/// Lexer for C source code
pub struct Lexer<R> {
    scanner: Scanner<R>,
    errors: Vec<LexError>,
    fatal: Option<io::Error>,
}

impl<'a> Lexer<&'a [u8]> {
    /// Create a lexer over an in-memory source string.
    pub fn from_source(source: &'a str) -> Self {
        Lexer::new(Scanner::from_source(source))
    }
}

impl<R: BufRead> Lexer<R> {
    pub fn new(scanner: Scanner<R>) -> Self {
        Self {
            scanner,
            errors: Vec::new(),
            fatal: None,
        }
    }

    /// Produce the next token.
    ///
    /// At end of input this returns EOF at the current position, again and
    /// again. A read failure also ends the stream with EOF; the failure
    /// itself is handed back by [`Lexer::finish`].
    pub fn next_token(&mut self) -> Token {
        if self.fatal.is_some() {
            return Token::new(TokenClass::Eof, self.scanner.location());
        }

        let token = match self.scan() {
            Ok(token) => token,
            Err(SourceError::EndOfInput) => Token::new(TokenClass::Eof, self.scanner.location()),
            Err(SourceError::Io(err)) => {
                debug!(%err, "source read failed, ending token stream");
                self.fatal = Some(err);
                Token::new(TokenClass::Eof, self.scanner.location())
            }
        };

        trace!(%token, at = %token.location, "token");
        token
    }

    /// Number of lexical errors so far.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// Hand back the recorded errors, or the read failure that cut the
    /// stream short.
    pub fn finish(self) -> Result<Vec<LexError>, SourceError> {
        match self.fatal {
            Some(err) => Err(SourceError::Io(err)),
            None => Ok(self.errors),
        }
    }

    /// Tokenize the entire input, EOF included.
    pub fn tokenize(mut self) -> Result<Lexed, SourceError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let done = token.is(TokenClass::Eof);
            tokens.push(token);
            if done {
                break;
            }
        }

        let errors = self.finish()?;
        Ok(Lexed { tokens, errors })
    }

    /// Classify the next token, skipping whitespace and comments.
    fn scan(&mut self) -> Result<Token, SourceError> {
        loop {
            let loc = self.scanner.location();
            let ch = self.scanner.advance()?;

            if ch.is_whitespace() {
                continue;
            }

            let class = match ch {
                '/' => {
                    if self.next_is('/')? {
                        self.skip_line_comment()?;
                        continue;
                    }
                    TokenClass::Div
                }

                // Two-character operators with no one-character form
                '&' => return self.fixed_spelling(ch, "&&", TokenClass::And, loc),
                '|' => return self.fixed_spelling(ch, "||", TokenClass::Or, loc),
                '!' => return self.fixed_spelling(ch, "!=", TokenClass::Ne, loc),

                // Two-character operators that shorten to one
                '=' => self.one_or_two('=', TokenClass::Eq, TokenClass::Assign)?,
                '<' => self.one_or_two('=', TokenClass::Le, TokenClass::Lt)?,
                '>' => self.one_or_two('=', TokenClass::Ge, TokenClass::Gt)?,

                '+' => TokenClass::Plus,
                '-' => TokenClass::Minus,
                '*' => TokenClass::Asterix,
                '%' => TokenClass::Rem,
                '.' => TokenClass::Dot,

                '{' => TokenClass::Lbra,
                '}' => TokenClass::Rbra,
                '(' => TokenClass::Lpar,
                ')' => TokenClass::Rpar,
                '[' => TokenClass::Lsbr,
                ']' => TokenClass::Rsbr,
                ';' => TokenClass::Sc,
                ',' => TokenClass::Comma,

                '#' => return self.fixed_spelling(ch, "#include", TokenClass::Include, loc),

                '"' => return self.string_literal(loc),
                '\'' => return self.char_literal(loc),
                '0'..='9' => return self.int_literal(ch, loc),
                'a'..='z' | 'A'..='Z' | '_' => return self.identifier_or_keyword(ch, loc),

                _ => {
                    self.report(LexError::UnrecognisedCharacter {
                        character: ch,
                        location: loc,
                    });
                    TokenClass::Invalid
                }
            };

            return Ok(Token::new(class, loc));
        }
    }

    /// Skip the rest of a `//` comment, line break included.
    ///
    /// The comment ends wherever the scanner starts a new line, so a lone
    /// `\r` ends it as well as `\n`.
    fn skip_line_comment(&mut self) -> Result<(), SourceError> {
        let line = self.scanner.line();
        while self.scanner.line() == line {
            self.scanner.advance()?;
        }
        Ok(())
    }

    /// Finish a spelling that has exactly one valid form (`&&`, `#include`).
    ///
    /// `leading` is already consumed. On a mismatch the leading character is
    /// reported at the token start, the mismatching character stays in the
    /// input, and the token is INVALID.
    fn fixed_spelling(
        &mut self,
        leading: char,
        spelling: &str,
        class: TokenClass,
        loc: SourceLocation,
    ) -> Result<Token, SourceError> {
        for expected in spelling.chars().skip(1) {
            match self.scanner.peek() {
                Ok(ch) if ch == expected => {
                    self.scanner.advance()?;
                }
                Ok(_) => {
                    self.report(LexError::UnrecognisedCharacter {
                        character: leading,
                        location: loc,
                    });
                    return Ok(Token::new(TokenClass::Invalid, loc));
                }
                Err(SourceError::EndOfInput) => return Err(self.unexpected_end()),
                Err(err) => return Err(err),
            }
        }

        Ok(Token::new(class, loc))
    }

    /// Pick the long class when the next character is `second`, else the
    /// short class without consuming anything more.
    fn one_or_two(
        &mut self,
        second: char,
        long: TokenClass,
        short: TokenClass,
    ) -> Result<TokenClass, SourceError> {
        if self.next_is(second)? {
            self.scanner.advance()?;
            Ok(long)
        } else {
            Ok(short)
        }
    }

    /// Parse string literal; the lexeme keeps both quotes.
    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, SourceError> {
        let mut lexeme = String::from('"');

        loop {
            let ch = self.advance_in_literal()?;
            lexeme.push(ch);
            match ch {
                '"' => break,
                '\\' => lexeme.push(self.advance_in_literal()?),
                _ => {}
            }
        }

        Ok(Token::with_lexeme(TokenClass::StringLiteral, lexeme, loc))
    }

    /// Parse character literal; the lexeme keeps both quotes.
    ///
    /// `''` and a missing closing quote are errors, but a token is produced
    /// from whatever was consumed either way.
    fn char_literal(&mut self, loc: SourceLocation) -> Result<Token, SourceError> {
        let mut lexeme = String::from('\'');

        let at = self.scanner.location();
        let ch = self.advance_in_literal()?;
        lexeme.push(ch);

        if ch == '\'' {
            self.report(LexError::UnrecognisedCharacter {
                character: ch,
                location: at,
            });
            return Ok(Token::with_lexeme(TokenClass::CharLiteral, lexeme, loc));
        }

        if ch == '\\' {
            lexeme.push(self.advance_in_literal()?);
        }

        let at = self.scanner.location();
        let close = self.advance_in_literal()?;
        if close != '\'' {
            self.report(LexError::UnrecognisedCharacter {
                character: close,
                location: at,
            });
        }
        lexeme.push(close);

        Ok(Token::with_lexeme(TokenClass::CharLiteral, lexeme, loc))
    }

    /// Parse integer literal (decimal digits, no range check here)
    fn int_literal(&mut self, first_digit: char, loc: SourceLocation) -> Result<Token, SourceError> {
        let mut digits = String::from(first_digit);
        while let Some(ch) = self.peek_matching(|c| c.is_ascii_digit())? {
            digits.push(ch);
            self.scanner.advance()?;
        }

        Ok(Token::with_lexeme(TokenClass::IntLiteral, digits, loc))
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(
        &mut self,
        first_char: char,
        loc: SourceLocation,
    ) -> Result<Token, SourceError> {
        let mut ident = String::from(first_char);
        while let Some(ch) = self.peek_matching(|c| c.is_ascii_alphanumeric() || c == '_')? {
            ident.push(ch);
            self.scanner.advance()?;
        }

        let token = match TokenClass::keyword(&ident) {
            Some(class) => Token::new(class, loc),
            None => Token::with_lexeme(TokenClass::Identifier, ident, loc),
        };

        Ok(token)
    }

    /// Consume a character that must exist because a literal is still open.
    fn advance_in_literal(&mut self) -> Result<char, SourceError> {
        match self.scanner.advance() {
            Err(SourceError::EndOfInput) => Err(self.unexpected_end()),
            other => other,
        }
    }

    /// Whether the next character is `expected`; end of input counts as no.
    fn next_is(&mut self, expected: char) -> Result<bool, SourceError> {
        Ok(self.peek_matching(|c| c == expected)?.is_some())
    }

    /// Peek, returning the character only if it satisfies `pred`.
    fn peek_matching(&mut self, pred: impl Fn(char) -> bool) -> Result<Option<char>, SourceError> {
        match self.scanner.peek() {
            Ok(ch) if pred(ch) => Ok(Some(ch)),
            Ok(_) | Err(SourceError::EndOfInput) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Record that input ran out mid-token and end this call with EOF.
    fn unexpected_end(&mut self) -> SourceError {
        self.report(LexError::UnexpectedEndOfInput {
            location: self.scanner.location(),
        });
        SourceError::EndOfInput
    }

    fn report(&mut self, error: LexError) {
        debug!(%error, "lexical error");
        self.errors.push(error);
    }
}
