//! Declaration parsing implementation
//!
//! This module handles parsing of declarations:
//!
//! - Include directives: `#include "file"` (checked, then dropped)
//! - Struct definitions: `struct Name { fields };`
//! - Variable declarations: `type name;` and `type name[N];`
//! - Function definitions: `type name(params) { ... }`
//! - Types: base types, struct types, pointers
//!
//! # Grammar
//!
//! ```text
//! include      ::= "#include" STRING_LITERAL
//! struct_decl  ::= "struct" IDENT "{" var_decl* "}" ";"
//! var_decl     ::= type IDENT ("[" INT_LITERAL "]")? ";"
//! fun_decl     ::= type IDENT "(" params? ")" block
//! params       ::= type IDENT ("," type IDENT)*
//! type         ::= ("int" | "char" | "void" | "struct" IDENT) "*"*
//! ```
//!
//! Whether a declaration is a variable or a function is decided by lookahead
//! before anything is consumed: skip the type, skip the name, and check for
//! `(`.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenClass;
use crate::parser::parse::Parser;
use std::io::BufRead;

/// Token classes that can begin a type.
pub(crate) const TYPE_START: &[TokenClass] = &[
    TokenClass::Int,
    TokenClass::Char,
    TokenClass::Void,
    TokenClass::Struct,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclKind {
    Variable,
    Function,
}

impl<R: BufRead> Parser<R> {
    /// Includes carry no meaning past syntax, so nothing is returned.
    pub(crate) fn parse_includes(&mut self) {
        while self.accept(&[TokenClass::Include]) {
            self.advance();
            self.expect(&[TokenClass::StringLiteral]);
        }
    }

    pub(crate) fn parse_struct_decls(&mut self) -> Vec<StructTypeDecl> {
        let mut structs = Vec::new();

        // `struct NAME {` opens a definition; `struct NAME x` is a declaration
        while self.accept(&[TokenClass::Struct]) && self.look_ahead(2) == TokenClass::Lbra {
            structs.extend(self.parse_struct_decl());
        }

        structs
    }

    /// Parse struct definition: struct Name { fields };
    fn parse_struct_decl(&mut self) -> Option<StructTypeDecl> {
        let location = self.current_location();

        self.expect(&[TokenClass::Struct]);
        let name = self.expect_identifier();
        self.expect(&[TokenClass::Lbra]);
        let fields = self.parse_var_decls();
        self.expect(&[TokenClass::Rbra]);
        self.expect(&[TokenClass::Sc]);

        Some(StructTypeDecl {
            name: name?,
            fields,
            location,
        })
    }

    pub(crate) fn parse_var_decls(&mut self) -> Vec<VarDecl> {
        let mut decls = Vec::new();

        while self.accept(TYPE_START) && self.declaration_kind() == DeclKind::Variable {
            decls.extend(self.parse_var_decl());
        }

        decls
    }

    /// Parse variable declaration: type name; or type name[N];
    fn parse_var_decl(&mut self) -> Option<VarDecl> {
        let location = self.current_location();

        let var_type = self.parse_type();
        let name = self.expect_identifier();

        let var_type = if self.accept(&[TokenClass::Lsbr]) {
            self.advance();
            let size = self
                .expect(&[TokenClass::IntLiteral])
                .and_then(|token| self.int_value::<usize>(token));
            self.expect(&[TokenClass::Rsbr]);
            var_type.zip(size).map(|(element, size)| element.array_of(size))
        } else {
            var_type
        };

        self.expect(&[TokenClass::Sc]);

        Some(VarDecl {
            var_type: var_type?,
            name: name?,
            location,
        })
    }

    pub(crate) fn parse_fun_decls(&mut self) -> Vec<FunDecl> {
        let mut functions = Vec::new();

        while self.accept(TYPE_START) {
            functions.extend(self.parse_fun_decl());
        }

        functions
    }

    /// Parse function definition: type name(params) { body }
    fn parse_fun_decl(&mut self) -> Option<FunDecl> {
        let location = self.current_location();

        let return_type = self.parse_type();
        let name = self.expect_identifier();
        self.expect(&[TokenClass::Lpar]);
        let params = self.parse_params();
        self.expect(&[TokenClass::Rpar]);

        // A body is mandatory here even though a bare block is optional
        let body = if self.accept(&[TokenClass::Lbra]) {
            Some(self.parse_block())
        } else {
            self.error(&[TokenClass::Lbra]);
            None
        };

        Some(FunDecl {
            return_type: return_type?,
            name: name?,
            params: params?,
            body: body?,
            location,
        })
    }

    /// Parse parameter list: type name, type name, ...
    fn parse_params(&mut self) -> Option<Vec<VarDecl>> {
        if !self.accept(TYPE_START) {
            return Some(Vec::new());
        }

        let mut params = Vec::new();

        loop {
            params.push(self.parse_param());
            if !self.accept(&[TokenClass::Comma]) {
                break;
            }
            self.advance();
        }

        params.into_iter().collect()
    }

    fn parse_param(&mut self) -> Option<VarDecl> {
        let location = self.current_location();
        let param_type = self.parse_type();
        let name = self.expect_identifier();

        Some(VarDecl {
            var_type: param_type?,
            name: name?,
            location,
        })
    }

    /// Parse type: base_type [*]*
    pub(crate) fn parse_type(&mut self) -> Option<Type> {
        let mut ty = match self.current_class() {
            TokenClass::Int => {
                self.advance();
                Some(Type::Base(BaseType::Int))
            }
            TokenClass::Char => {
                self.advance();
                Some(Type::Base(BaseType::Char))
            }
            TokenClass::Void => {
                self.advance();
                Some(Type::Base(BaseType::Void))
            }
            TokenClass::Struct => {
                self.advance();
                self.expect_identifier().map(Type::Struct)
            }
            _ => {
                self.error(TYPE_START);
                return None;
            }
        };

        while self.accept(&[TokenClass::Asterix]) {
            self.advance();
            ty = ty.map(Type::pointer_to);
        }

        ty
    }

    /// Classify the declaration starting at the current (type) token
    /// without consuming anything.
    pub(crate) fn declaration_kind(&mut self) -> DeclKind {
        // Distance from the current token to the declared name
        let mut name_at = if self.accept(&[TokenClass::Struct]) { 2 } else { 1 };
        while self.look_ahead(name_at) == TokenClass::Asterix {
            name_at += 1;
        }

        if self.look_ahead(name_at + 1) == TokenClass::Lpar {
            DeclKind::Function
        } else {
            DeclKind::Variable
        }
    }
}
