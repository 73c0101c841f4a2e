//! Source-level rendering of statements and expressions.
//!
//! Output follows the conventions of the downstream code generator: blocks
//! open with `{`, two-space indent, every branch of an `if` chain braced,
//! and the empty block rendered as `{}`. Expressions parenthesize children
//! using the `lprec`/`rprec` floors on [`NodeKind`].

use std::fmt;

use super::expr::{Expr, MemberDecl};
use super::kind::NodeKind;
use super::stmt::{BlockStmt, Modifiers, Stmt};

fn indent(f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
    for _ in 0..level {
        f.write_str("  ")?;
    }
    Ok(())
}

fn fmt_modifiers(modifiers: Modifiers, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if modifiers.contains(Modifiers::STATIC) {
        f.write_str("static ")?;
    }
    if modifiers.contains(Modifiers::FINAL) {
        f.write_str("final ")?;
    }
    Ok(())
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Constant(_) | Expr::Parameter(_) | Expr::Member(_) | Expr::Call(_) | Expr::New(_) => {
            15
        }
        Expr::Unary(u) => u.kind.precedence(),
        Expr::Binary(b) => b.kind.precedence(),
        Expr::Ternary(t) => t.kind.precedence(),
        Expr::TypeBinary(t) => t.kind.precedence(),
    }
}

/// Print `expr`, parenthesizing when its precedence is below `floor`.
fn fmt_expr(expr: &Expr, f: &mut fmt::Formatter<'_>, floor: u8, level: usize) -> fmt::Result {
    if precedence(expr) < floor {
        f.write_str("(")?;
        fmt_expr(expr, f, 0, level)?;
        return f.write_str(")");
    }
    match expr {
        Expr::Constant(c) => write!(f, "{}", c.value),
        Expr::Parameter(p) => f.write_str(&p.name),
        Expr::Unary(u) => match u.kind {
            NodeKind::Convert => {
                write!(f, "({}) ", u.ty)?;
                fmt_expr(&u.expr, f, u.kind.rprec(), level)
            }
            kind if kind.is_postfix() => {
                fmt_expr(&u.expr, f, kind.lprec(), level)?;
                f.write_str(kind.op())
            }
            kind => {
                f.write_str(kind.op())?;
                fmt_expr(&u.expr, f, kind.rprec(), level)
            }
        },
        Expr::Binary(b) => {
            fmt_expr(&b.left, f, b.kind.lprec(), level)?;
            write!(f, " {} ", b.kind.op())?;
            fmt_expr(&b.right, f, b.kind.rprec(), level)
        }
        Expr::Ternary(t) => {
            fmt_expr(&t.cond, f, t.kind.lprec(), level)?;
            f.write_str(" ? ")?;
            fmt_expr(&t.then_expr, f, t.kind.rprec(), level)?;
            f.write_str(" : ")?;
            fmt_expr(&t.else_expr, f, t.kind.rprec(), level)
        }
        Expr::TypeBinary(t) => {
            fmt_expr(&t.expr, f, t.kind.lprec(), level)?;
            write!(f, " {} {}", t.kind.op(), t.target)
        }
        Expr::Member(m) => {
            match &m.target {
                Some(target) => fmt_expr(target, f, 15, level)?,
                None => write!(f, "{}", m.declaring)?,
            }
            write!(f, ".{}", m.name)
        }
        Expr::Call(c) => {
            if let Some(target) = &c.target {
                fmt_expr(target, f, 15, level)?;
                f.write_str(".")?;
            }
            write!(f, "{}(", c.method)?;
            fmt_args(&c.args, f, level)?;
            f.write_str(")")
        }
        Expr::New(n) => {
            write!(f, "new {}(", n.class)?;
            fmt_args(&n.args, f, level)?;
            f.write_str(")")?;
            if n.members.is_empty() {
                return Ok(());
            }
            f.write_str(" {\n")?;
            for member in &n.members {
                fmt_member_decl(member, f, level + 1)?;
            }
            indent(f, level)?;
            f.write_str("}")
        }
    }
}

fn fmt_args(args: &[Expr], f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        fmt_expr(arg, f, 0, level)?;
    }
    Ok(())
}

fn fmt_member_decl(member: &MemberDecl, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
    match member {
        MemberDecl::Field {
            modifiers,
            name,
            ty,
            initializer,
        } => {
            indent(f, level)?;
            fmt_modifiers(*modifiers, f)?;
            write!(f, "{ty} {name}")?;
            if let Some(init) = initializer {
                f.write_str(" = ")?;
                fmt_expr(init, f, 0, level)?;
            }
            f.write_str(";\n")
        }
        MemberDecl::Method {
            modifiers,
            name,
            result,
            params,
            body,
        } => {
            indent(f, level)?;
            fmt_modifiers(*modifiers, f)?;
            write!(f, "{result} {name}(")?;
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{} {}", param.ty, param.name)?;
            }
            f.write_str(") {\n")?;
            for stmt in &body.statements {
                fmt_stmt(stmt, f, level + 1)?;
            }
            indent(f, level)?;
            f.write_str("}\n")
        }
    }
}

/// Print the body of a braced region: blocks are flattened, the empty
/// sentinel prints nothing, anything else is a single indented statement.
fn fmt_braced_body(stmt: &Stmt, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
    match stmt {
        Stmt::Block(b) => {
            for inner in &b.statements {
                fmt_stmt(inner, f, level)?;
            }
            Ok(())
        }
        Stmt::Empty => Ok(()),
        other => fmt_stmt(other, f, level),
    }
}

fn fmt_stmt(stmt: &Stmt, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
    match stmt {
        Stmt::Declaration(d) => {
            indent(f, level)?;
            fmt_modifiers(d.modifiers, f)?;
            write!(f, "{} {}", d.parameter.ty, d.parameter.name)?;
            if let Some(init) = &d.initializer {
                f.write_str(" = ")?;
                fmt_expr(init, f, 0, level)?;
            }
            f.write_str(";\n")
        }
        Stmt::Expression(e) => {
            indent(f, level)?;
            fmt_expr(e, f, 0, level)?;
            f.write_str(";\n")
        }
        Stmt::Return(e) => {
            indent(f, level)?;
            f.write_str("return")?;
            if let Some(e) = e {
                f.write_str(" ")?;
                fmt_expr(e, f, 0, level)?;
            }
            f.write_str(";\n")
        }
        Stmt::If(chain) => {
            for (i, (test, arm)) in chain.arms.iter().enumerate() {
                if i == 0 {
                    indent(f, level)?;
                    f.write_str("if (")?;
                } else {
                    indent(f, level)?;
                    f.write_str("} else if (")?;
                }
                fmt_expr(test, f, 0, level)?;
                f.write_str(") {\n")?;
                fmt_braced_body(arm, f, level + 1)?;
            }
            if let Some(else_stmt) = &chain.else_stmt {
                indent(f, level)?;
                f.write_str("} else {\n")?;
                fmt_braced_body(else_stmt, f, level + 1)?;
            }
            indent(f, level)?;
            f.write_str("}\n")
        }
        Stmt::Block(b) => {
            indent(f, level)?;
            f.write_str("{\n")?;
            for inner in &b.statements {
                fmt_stmt(inner, f, level + 1)?;
            }
            indent(f, level)?;
            f.write_str("}\n")
        }
        Stmt::Empty => {
            indent(f, level)?;
            f.write_str(";\n")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_expr(self, f, 0, 0)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_stmt(self, f, 0)
    }
}

impl fmt::Display for BlockStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{\n")?;
        for stmt in &self.statements {
            fmt_stmt(stmt, f, 1)?;
        }
        f.write_str("}\n")
    }
}
