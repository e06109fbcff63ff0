//! Canonical one-line rendering of the AST
//!
//! Every node prints as `Name(child,child,...)` with no spaces, e.g.
//! `FunDecl(INT,main,VarDecl(INT,argc),Block(Return(IntLiteral(0))))`.
//! Two trees print the same exactly when they have the same shape, names
//! and literal values; locations are not printed.

use crate::parser::ast::*;
use std::fmt;

/// Write `name(part,part,...)`.
fn node(f: &mut fmt::Formatter<'_>, name: &str, parts: &[&dyn fmt::Display]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{part}")?;
    }
    f.write_str(")")
}

fn parts<T: fmt::Display>(items: &[T]) -> impl Iterator<Item = &dyn fmt::Display> {
    items.iter().map(|item| item as &dyn fmt::Display)
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BaseType::Int => "INT",
            BaseType::Char => "CHAR",
            BaseType::Void => "VOID",
        })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Base(base) => write!(f, "{base}"),
            Type::Pointer(inner) => node(f, "PointerType", &[inner]),
            Type::Struct(name) => node(f, "StructType", &[name]),
            Type::Array(element, size) => node(f, "ArrayType", &[element, size]),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "ADD",
            BinaryOp::Sub => "SUB",
            BinaryOp::Mul => "MUL",
            BinaryOp::Div => "DIV",
            BinaryOp::Rem => "MOD",
            BinaryOp::Gt => "GT",
            BinaryOp::Lt => "LT",
            BinaryOp::Ge => "GE",
            BinaryOp::Le => "LE",
            BinaryOp::Ne => "NE",
            BinaryOp::Eq => "EQ",
            BinaryOp::Or => "OR",
            BinaryOp::And => "AND",
        })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntLiteral(value, _) => node(f, "IntLiteral", &[value]),
            Expr::CharLiteral(value, _) => node(f, "ChrLiteral", &[value]),
            Expr::StringLiteral(value, _) => node(f, "StrLiteral", &[value]),
            Expr::VarRef(name, _) => node(f, "VarExpr", &[name]),
            Expr::ArrayAccess { array, index, .. } => node(f, "ArrayAccessExpr", &[array, index]),
            Expr::FieldAccess { object, field, .. } => node(f, "FieldAccessExpr", &[object, field]),
            Expr::FunCall { name, args, .. } => {
                let mut all: Vec<&dyn fmt::Display> = vec![name];
                all.extend(parts(args));
                node(f, "FunCallExpr", &all)
            }
            // No negation node: -e is 0 - e
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
                ..
            } => write!(f, "BinOp(IntLiteral(0),SUB,{operand})"),
            Expr::Unary {
                op: UnaryOp::Deref,
                operand,
                ..
            } => node(f, "ValueAtExpr", &[operand]),
            Expr::Binary {
                op, left, right, ..
            } => node(f, "BinOp", &[left, op, right]),
            Expr::SizeOf(ty, _) => node(f, "SizeOfExpr", &[ty]),
            Expr::TypeCast {
                target_type, expr, ..
            } => node(f, "TypecastExpr", &[target_type, expr]),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Block(block) => write!(f, "{block}"),
            Stmt::If {
                condition,
                then_branch,
                else_branch: Some(else_branch),
                ..
            } => node(f, "If", &[condition, then_branch, else_branch]),
            Stmt::If {
                condition,
                then_branch,
                else_branch: None,
                ..
            } => node(f, "If", &[condition, then_branch]),
            Stmt::While {
                condition, body, ..
            } => node(f, "While", &[condition, body]),
            Stmt::Return {
                value: Some(value), ..
            } => node(f, "Return", &[value]),
            Stmt::Return { value: None, .. } => node(f, "Return", &[]),
            Stmt::Expr(expr) => node(f, "ExprStmt", &[expr]),
            Stmt::Assign { lhs, rhs, .. } => node(f, "Assign", &[lhs, rhs]),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let all: Vec<_> = parts(&self.var_decls).chain(parts(&self.stmts)).collect();
        node(f, "Block", &all)
    }
}

impl fmt::Display for VarDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        node(f, "VarDecl", &[&self.var_type, &self.name])
    }
}

impl fmt::Display for StructTypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let struct_type = Type::Struct(self.name.clone());
        let mut all: Vec<&dyn fmt::Display> = vec![&struct_type];
        all.extend(parts(&self.fields));
        node(f, "StructTypeDecl", &all)
    }
}

impl fmt::Display for FunDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut all: Vec<&dyn fmt::Display> = vec![&self.return_type, &self.name];
        all.extend(parts(&self.params));
        all.push(&self.body);
        node(f, "FunDecl", &all)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let all: Vec<_> = parts(&self.structs)
            .chain(parts(&self.globals))
            .chain(parts(&self.functions))
            .collect();
        node(f, "Program", &all)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse::Parser;

    fn print(source: &str) -> String {
        let output = Parser::from_source(source).parse().unwrap();
        assert!(output.is_ok(), "{:?}", output.errors);
        output.program.to_string()
    }

    #[test]
    fn test_print_program() {
        assert_eq!(
            print("struct node { int x; }; char* s; int main(int argc) { return 0; }"),
            "Program(StructTypeDecl(StructType(node),VarDecl(INT,x)),\
             VarDecl(PointerType(CHAR),s),\
             FunDecl(INT,main,VarDecl(INT,argc),Block(Return(IntLiteral(0)))))"
        );
    }

    #[test]
    fn test_print_types() {
        assert_eq!(
            print("struct s* a[3]; void** p;"),
            "Program(VarDecl(ArrayType(PointerType(StructType(s)),3),a),\
             VarDecl(PointerType(PointerType(VOID)),p))"
        );
    }

    #[test]
    fn test_print_statements() {
        assert_eq!(
            print("void f() { int i; while (i < 3) i = i + 1; if (i) return; else { f(); } }"),
            "Program(FunDecl(VOID,f,Block(VarDecl(INT,i),\
             While(BinOp(VarExpr(i),LT,IntLiteral(3)),Assign(VarExpr(i),BinOp(VarExpr(i),ADD,IntLiteral(1)))),\
             If(VarExpr(i),Return(),Block(ExprStmt(FunCallExpr(f)))))))"
        );
    }

    #[test]
    fn test_print_expressions() {
        assert_eq!(
            print("void f() { x = -*p.f[1] % sizeof(char) + (int) 'c'; g(\"s\", a); }"),
            "Program(FunDecl(VOID,f,Block(\
             Assign(VarExpr(x),BinOp(BinOp(BinOp(IntLiteral(0),SUB,\
             ValueAtExpr(ArrayAccessExpr(FieldAccessExpr(VarExpr(p),f),IntLiteral(1)))),\
             MOD,SizeOfExpr(CHAR)),ADD,TypecastExpr(INT,ChrLiteral(c)))),\
             ExprStmt(FunCallExpr(g,StrLiteral(s),VarExpr(a))))))"
        );
    }

    #[test]
    fn test_print_empty_program() {
        assert_eq!(print(""), "Program()");
    }
}
