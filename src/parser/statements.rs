//! Statement parsing implementation
//!
//! This module handles parsing of all statement types:
//!
//! - Compound statements: `{ var_decls... stmts... }`
//! - Control flow: `if`, `if`/`else`, `while`
//! - `return` with or without a value
//! - Assignments and expression statements
//!
//! # Grammar
//!
//! ```text
//! block     ::= "{" var_decl* stmt* "}"
//! stmt      ::= block
//!             | "while" "(" expr ")" stmt
//!             | "if" "(" expr ")" stmt ("else" stmt)?
//!             | "return" expr? ";"
//!             | expr "=" expr ";"
//!             | expr ";"
//! ```
//!
//! A dangling `else` binds to the nearest `if`.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenClass;
use crate::parser::parse::Parser;
use std::io::BufRead;

/// Token classes that can begin a statement, for error reporting.
const STMT_START: &[TokenClass] = &[
    TokenClass::Lbra,
    TokenClass::While,
    TokenClass::If,
    TokenClass::Return,
    TokenClass::Lpar,
    TokenClass::Identifier,
    TokenClass::IntLiteral,
    TokenClass::CharLiteral,
    TokenClass::StringLiteral,
    TokenClass::Sizeof,
    TokenClass::Minus,
    TokenClass::Asterix,
];

impl<R: BufRead> Parser<R> {
    /// Parse a block, braces included. The caller has checked for `{`.
    pub(crate) fn parse_block(&mut self) -> Block {
        self.expect(&[TokenClass::Lbra]);
        let var_decls = self.parse_var_decls();
        let stmts = self.parse_stmts();
        self.expect(&[TokenClass::Rbra]);

        Block { var_decls, stmts }
    }

    fn parse_stmts(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();

        while self.starts_statement() {
            stmts.extend(self.parse_stmt());
        }

        stmts
    }

    pub(crate) fn starts_statement(&self) -> bool {
        self.accept(STMT_START)
    }

    /// Parse a statement
    pub(crate) fn parse_stmt(&mut self) -> Option<Stmt> {
        if !self.enter_nesting() {
            return None;
        }
        let stmt = self.parse_stmt_kind();
        self.leave_nesting();
        stmt
    }

    fn parse_stmt_kind(&mut self) -> Option<Stmt> {
        match self.current_class() {
            TokenClass::Lbra => Some(Stmt::Block(self.parse_block())),
            TokenClass::While => self.parse_while(),
            TokenClass::If => self.parse_if(),
            TokenClass::Return => self.parse_return(),
            _ if self.starts_expression() => self.parse_expr_or_assign(),
            _ => {
                self.error(STMT_START);
                None
            }
        }
    }

    /// Parse while loop: while (condition) body
    fn parse_while(&mut self) -> Option<Stmt> {
        let location = self.current_location();

        self.expect(&[TokenClass::While]);
        self.expect(&[TokenClass::Lpar]);
        let condition = self.parse_expr();
        self.expect(&[TokenClass::Rpar]);
        let body = self.parse_stmt();

        Some(Stmt::While {
            condition: condition?,
            body: Box::new(body?),
            location,
        })
    }

    /// Parse if statement: if (condition) then_branch [else else_branch]
    fn parse_if(&mut self) -> Option<Stmt> {
        let location = self.current_location();

        self.expect(&[TokenClass::If]);
        self.expect(&[TokenClass::Lpar]);
        let condition = self.parse_expr();
        self.expect(&[TokenClass::Rpar]);
        let then_branch = self.parse_stmt();

        let else_branch = if self.accept(&[TokenClass::Else]) {
            self.advance();
            Some(self.parse_stmt())
        } else {
            None
        };

        let else_branch = match else_branch {
            Some(stmt) => Some(Box::new(stmt?)),
            None => None,
        };

        Some(Stmt::If {
            condition: condition?,
            then_branch: Box::new(then_branch?),
            else_branch,
            location,
        })
    }

    /// Parse return statement: return [expr];
    fn parse_return(&mut self) -> Option<Stmt> {
        let location = self.current_location();

        self.expect(&[TokenClass::Return]);
        let value = if self.starts_expression() {
            Some(self.parse_expr())
        } else {
            None
        };
        self.expect(&[TokenClass::Sc]);

        let value = match value {
            Some(expr) => Some(expr?),
            None => None,
        };

        Some(Stmt::Return { value, location })
    }

    /// Parse `lhs = rhs;` or a bare `expr;`
    fn parse_expr_or_assign(&mut self) -> Option<Stmt> {
        let location = self.current_location();
        let lhs = self.parse_expr();

        if self.accept(&[TokenClass::Assign]) {
            self.advance();
            let rhs = self.parse_expr();
            self.expect(&[TokenClass::Sc]);

            return Some(Stmt::Assign {
                lhs: lhs?,
                rhs: rhs?,
                location,
            });
        }

        self.expect(&[TokenClass::Sc]);
        lhs.map(Stmt::Expr)
    }
}
