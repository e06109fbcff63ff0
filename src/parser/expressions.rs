//! Expression parsing implementation
//!
//! This module handles parsing of expressions using precedence climbing
//! for binary operators and recursive descent for other expression forms.
//!
//! # Supported Expressions
//!
//! - Literals: integers, characters, strings
//! - Variable references and function calls
//! - Binary operators: arithmetic, comparison, logical
//! - Unary operators: `-`, `*`
//! - Postfix: `[]`, `.`
//! - Type casts: `(type)expr`
//! - `sizeof(type)`
//!
//! # Precedence
//!
//! From loosest to tightest, all binary levels left-associative:
//!
//! ```text
//! ||
//! &&
//! ==  !=
//! <  <=  >  >=
//! +  -
//! *  /  %
//! prefix -  *  (type)
//! postfix []  .
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenClass;
use crate::parser::parse::Parser;
use std::io::BufRead;

/// Token classes that can begin an expression.
pub(crate) const EXPR_START: &[TokenClass] = &[
    TokenClass::Lpar,
    TokenClass::Identifier,
    TokenClass::IntLiteral,
    TokenClass::CharLiteral,
    TokenClass::StringLiteral,
    TokenClass::Sizeof,
    TokenClass::Minus,
    TokenClass::Asterix,
];

/// Binary operator and binding power for a token class
fn binary_op(class: TokenClass) -> Option<(BinaryOp, u8)> {
    let op = match class {
        TokenClass::Or => (BinaryOp::Or, 1),
        TokenClass::And => (BinaryOp::And, 2),
        TokenClass::Eq => (BinaryOp::Eq, 3),
        TokenClass::Ne => (BinaryOp::Ne, 3),
        TokenClass::Lt => (BinaryOp::Lt, 4),
        TokenClass::Le => (BinaryOp::Le, 4),
        TokenClass::Gt => (BinaryOp::Gt, 4),
        TokenClass::Ge => (BinaryOp::Ge, 4),
        TokenClass::Plus => (BinaryOp::Add, 5),
        TokenClass::Minus => (BinaryOp::Sub, 5),
        TokenClass::Asterix => (BinaryOp::Mul, 6),
        TokenClass::Div => (BinaryOp::Div, 6),
        TokenClass::Rem => (BinaryOp::Rem, 6),
        _ => return None,
    };
    Some(op)
}

/// Strip the delimiters from a char or string literal lexeme.
///
/// An unterminated literal has no closing quote to strip.
fn unquote(lexeme: &str, quote: char) -> String {
    let inner = lexeme.strip_prefix(quote).unwrap_or(lexeme);
    let closed = inner
        .strip_suffix(quote)
        .filter(|body| !body.ends_with('\\') || body.ends_with("\\\\"));
    closed.unwrap_or(inner).to_string()
}

impl<R: BufRead> Parser<R> {
    pub(crate) fn starts_expression(&self) -> bool {
        self.accept(EXPR_START)
    }

    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_binary(1)
    }

    /// Precedence climbing over every operator binding at least `min_prec`
    fn parse_binary(&mut self, min_prec: u8) -> Option<Expr> {
        let mut left = self.parse_unary();

        while let Some((op, prec)) = binary_op(self.current_class()) {
            if prec < min_prec {
                break;
            }

            let location = self.current_location();
            self.advance();
            let right = self.parse_binary(prec + 1);

            left = left.zip(right).map(|(left, right)| Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location,
            });
        }

        left
    }

    /// Parse prefix operators, casts and `sizeof`
    fn parse_unary(&mut self) -> Option<Expr> {
        if !self.enter_nesting() {
            return None;
        }
        let expr = self.parse_prefix();
        self.leave_nesting();
        expr
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        let location = self.current_location();
        let next = self.look_ahead(1);

        match self.current_class() {
            TokenClass::Minus | TokenClass::Asterix => {
                let op = if self.advance().is(TokenClass::Minus) {
                    UnaryOp::Neg
                } else {
                    UnaryOp::Deref
                };
                let operand = self.parse_unary()?;
                Some(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                    location,
                })
            }
            TokenClass::Sizeof => {
                self.advance();
                self.expect(&[TokenClass::Lpar]);
                let ty = self.parse_type();
                self.expect(&[TokenClass::Rpar]);
                Some(Expr::SizeOf(ty?, location))
            }
            TokenClass::Lpar if next.starts_type() => {
                self.advance();
                let target_type = self.parse_type();
                self.expect(&[TokenClass::Rpar]);
                let expr = self.parse_unary();
                Some(Expr::TypeCast {
                    target_type: target_type?,
                    expr: Box::new(expr?),
                    location,
                })
            }
            _ => self.parse_postfix(),
        }
    }

    /// Parse postfix operators: array indexing and field access
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary();

        loop {
            let location = self.current_location();

            match self.current_class() {
                TokenClass::Lsbr => {
                    self.advance();
                    let index = self.parse_expr();
                    self.expect(&[TokenClass::Rsbr]);
                    expr = expr.zip(index).map(|(array, index)| Expr::ArrayAccess {
                        array: Box::new(array),
                        index: Box::new(index),
                        location,
                    });
                }
                TokenClass::Dot => {
                    self.advance();
                    let field = self.expect_identifier();
                    expr = expr.zip(field).map(|(object, field)| Expr::FieldAccess {
                        object: Box::new(object),
                        field,
                        location,
                    });
                }
                _ => break,
            }
        }

        expr
    }

    /// Parse primary expressions: literals, names, calls, parentheses
    fn parse_primary(&mut self) -> Option<Expr> {
        let location = self.current_location();
        let next = self.look_ahead(1);

        match self.current_class() {
            TokenClass::Lpar => {
                self.advance();
                let expr = self.parse_expr();
                self.expect(&[TokenClass::Rpar]);
                expr
            }
            TokenClass::Identifier if next == TokenClass::Lpar => {
                self.parse_fun_call()
            }
            TokenClass::Identifier => {
                let name = self.advance().lexeme;
                Some(Expr::VarRef(name, location))
            }
            TokenClass::IntLiteral => {
                let token = self.advance();
                let value = self.int_value::<i64>(token)?;
                Some(Expr::IntLiteral(value, location))
            }
            TokenClass::CharLiteral => {
                let token = self.advance();
                Some(Expr::CharLiteral(unquote(&token.lexeme, '\''), location))
            }
            TokenClass::StringLiteral => {
                let token = self.advance();
                Some(Expr::StringLiteral(unquote(&token.lexeme, '"'), location))
            }
            _ => {
                self.error(EXPR_START);
                None
            }
        }
    }

    /// Parse function call: name(args)
    fn parse_fun_call(&mut self) -> Option<Expr> {
        let location = self.current_location();

        let name = self.expect_identifier();
        self.expect(&[TokenClass::Lpar]);

        let mut args = Vec::new();
        if self.starts_expression() {
            loop {
                args.push(self.parse_expr());
                if !self.accept(&[TokenClass::Comma]) {
                    break;
                }
                self.advance();
            }
        }

        self.expect(&[TokenClass::Rpar]);

        Some(Expr::FunCall {
            name: name?,
            args: args.into_iter().collect::<Option<Vec<_>>>()?,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> Expr {
        let mut parser = Parser::from_source(source);
        let expr = parser.parse_expr().expect("expression");
        assert_eq!(parser.current_class(), TokenClass::Eof, "trailing input");
        expr
    }

    /// Rebuild an expression as a parenthesised string, ignoring locations
    fn shape(expr: &Expr) -> String {
        match expr {
            Expr::IntLiteral(n, _) => n.to_string(),
            Expr::CharLiteral(c, _) => format!("'{c}'"),
            Expr::StringLiteral(s, _) => format!("\"{s}\""),
            Expr::VarRef(name, _) => name.clone(),
            Expr::ArrayAccess { array, index, .. } => format!("{}[{}]", shape(array), shape(index)),
            Expr::FieldAccess { object, field, .. } => format!("{}.{field}", shape(object)),
            Expr::FunCall { name, args, .. } => {
                let args: Vec<_> = args.iter().map(shape).collect();
                format!("{name}({})", args.join(","))
            }
            Expr::Unary { op, operand, .. } => {
                let op = match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Deref => "*",
                };
                format!("({op}{})", shape(operand))
            }
            Expr::Binary {
                op, left, right, ..
            } => format!("({} {op:?} {})", shape(left), shape(right)),
            Expr::SizeOf(ty, _) => format!("sizeof({ty:?})"),
            Expr::TypeCast {
                target_type, expr, ..
            } => format!("(({target_type:?}){})", shape(expr)),
        }
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        assert_eq!(shape(&expr("1 + 2 * 3")), "(1 Add (2 Mul 3))");
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(shape(&expr("a - b - c")), "((a Sub b) Sub c)");
        assert_eq!(shape(&expr("a / b % c")), "((a Div b) Rem c)");
    }

    #[test]
    fn test_logical_precedence() {
        assert_eq!(
            shape(&expr("a || b && c == d < e")),
            "(a Or (b And (c Eq (d Lt e))))"
        );
    }

    #[test]
    fn test_postfix_binds_tighter_than_deref() {
        assert_eq!(shape(&expr("*p.f")), "(*p.f)");
        assert_eq!(shape(&expr("-a[1]")), "(-a[1])");
        assert_eq!(shape(&expr("a.b[2].c")), "a.b[2].c");
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(shape(&expr("(1 + 2) * 3")), "((1 Add 2) Mul 3)");
    }

    #[test]
    fn test_cast_and_sizeof() {
        assert_eq!(shape(&expr("(char*) p")), "((Pointer(Base(Char)))p)");
        assert_eq!(
            shape(&expr("sizeof(struct node)")),
            "sizeof(Struct(\"node\"))"
        );
    }

    #[test]
    fn test_fun_call() {
        assert_eq!(shape(&expr("f(a, 1 + 2, g())")), "f(a,(1 Add 2),g())");
    }

    #[test]
    fn test_literals_are_unquoted() {
        assert_eq!(shape(&expr(r"'\n'")), r"'\n'");
        assert_eq!(shape(&expr(r#""hi \"there\"""#)), r#""hi \"there\"""#);
        assert!(matches!(expr("'a'"), Expr::CharLiteral(ref c, _) if c == "a"));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'a'", '\''), "a");
        assert_eq!(unquote("'ab", '\''), "ab");
        assert_eq!(unquote(r#""abc\""#, '"'), r#"abc\""#);
        assert_eq!(unquote(r#""a\\""#, '"'), r"a\\");
    }

    #[test]
    fn test_nesting_is_fine_below_limit() {
        let source = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(shape(&expr(&source)), "1");

        let source = format!("{}x", "-".repeat(100));
        let expected = format!("{}x{}", "(-".repeat(100), ")".repeat(100));
        assert_eq!(shape(&expr(&source)), expected);
    }

    #[test]
    fn test_missing_operand_reports_once() {
        let mut parser = Parser::from_source("1 + ");
        assert_eq!(parser.parse_expr(), None);
        let output = parser.parse().unwrap();
        assert_eq!(output.error_count(), 1);
    }
}
