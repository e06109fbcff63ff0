// AST (Abstract Syntax Tree) definitions for the C subset

use std::fmt;

/// Source location information for error reporting
///
/// Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Int,
    Char,
    Void,
}

/// Type representation
///
/// Pointers nest freely (`char**` is two `Pointer` layers). `Array` only ever
/// appears as the outermost layer of a declared variable's type, with a
/// literal size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Base(BaseType),
    Pointer(Box<Type>),
    Struct(String),
    Array(Box<Type>, usize),
}

impl Type {
    pub fn pointer_to(self) -> Self {
        Type::Pointer(Box::new(self))
    }

    pub fn array_of(self, size: usize) -> Self {
        Type::Array(Box::new(self), size)
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,   // -x
    Deref, // *x
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    IntLiteral(i64, SourceLocation),
    /// Raw spelling between the quotes, escapes undecoded
    CharLiteral(String, SourceLocation),
    /// Raw spelling between the quotes, escapes undecoded
    StringLiteral(String, SourceLocation),
    VarRef(String, SourceLocation),
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
        location: SourceLocation,
    },
    FieldAccess {
        object: Box<Expr>,
        field: String,
        location: SourceLocation,
    },
    FunCall {
        name: String,
        args: Vec<Expr>,
        location: SourceLocation,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    SizeOf(Type, SourceLocation),
    TypeCast {
        target_type: Type,
        expr: Box<Expr>,
        location: SourceLocation,
    },
}

impl Expr {
    /// Get the source location of this expression
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::IntLiteral(_, loc)
            | Expr::CharLiteral(_, loc)
            | Expr::StringLiteral(_, loc)
            | Expr::VarRef(_, loc)
            | Expr::SizeOf(_, loc) => *loc,
            Expr::ArrayAccess { location, .. }
            | Expr::FieldAccess { location, .. }
            | Expr::FunCall { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Binary { location, .. }
            | Expr::TypeCast { location, .. } => *location,
        }
    }
}

/// Statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Block(Block),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        location: SourceLocation,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    Return {
        value: Option<Expr>,
        location: SourceLocation,
    },
    Expr(Expr),
    Assign {
        lhs: Expr,
        rhs: Expr,
        location: SourceLocation,
    },
}

/// `{ var_decls... stmts... }`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub var_decls: Vec<VarDecl>,
    pub stmts: Vec<Stmt>,
}

/// Variable, struct field, or function parameter declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    pub var_type: Type,
    pub name: String,
    pub location: SourceLocation,
}

impl VarDecl {
    /// Element count when the variable is a fixed-size array
    pub fn array_size(&self) -> Option<usize> {
        match self.var_type {
            Type::Array(_, size) => Some(size),
            _ => None,
        }
    }
}

/// Struct definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructTypeDecl {
    pub name: String,
    pub fields: Vec<VarDecl>,
    pub location: SourceLocation,
}

/// Function definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunDecl {
    pub return_type: Type,
    pub name: String,
    pub params: Vec<VarDecl>,
    pub body: Block,
    pub location: SourceLocation,
}

/// Top-level program structure
///
/// Each list is in source order. Includes leave no trace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub structs: Vec<StructTypeDecl>,
    pub globals: Vec<VarDecl>,
    pub functions: Vec<FunDecl>,
}

impl Program {
    /// Total number of top-level declarations
    pub fn len(&self) -> usize {
        self.structs.len() + self.globals.len() + self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
