//! Bottom-up rewriting over the syntax tree.
//!
//! [`rewrite_expr`] and [`rewrite_stmt`] drive the traversal: children are
//! rewritten first, then the per-kind hook on the [`Rewriter`] receives the
//! original node together with the rewritten children and returns the
//! replacement. Default hooks reconstruct the node, so a pass only overrides
//! the shapes it cares about.
//!
//! Declarations do not visit their bound parameter; a rewrite may not
//! replace the variable being declared.

use super::expr::{
    BinaryExpr, CallExpr, ConstantExpr, Expr, MemberDecl, MemberExpr, NewExpr, Parameter,
    TernaryExpr, TypeBinaryExpr, UnaryExpr,
};
use super::stmt::{BlockStmt, Declaration, IfStmt, Stmt};

/// A syntax-directed rewrite pass.
pub trait Rewriter {
    fn visit_constant(&mut self, constant: &ConstantExpr) -> Expr {
        Expr::Constant(constant.clone())
    }

    fn visit_parameter(&mut self, parameter: &Parameter) -> Expr {
        Expr::Parameter(parameter.clone())
    }

    fn visit_unary(&mut self, unary: &UnaryExpr, expr: Expr) -> Expr {
        Expr::Unary(UnaryExpr {
            kind: unary.kind,
            ty: unary.ty.clone(),
            expr: Box::new(expr),
        })
    }

    fn visit_binary(&mut self, binary: &BinaryExpr, left: Expr, right: Expr) -> Expr {
        Expr::Binary(BinaryExpr {
            kind: binary.kind,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn visit_ternary(
        &mut self,
        ternary: &TernaryExpr,
        cond: Expr,
        then_expr: Expr,
        else_expr: Expr,
    ) -> Expr {
        Expr::Ternary(TernaryExpr {
            kind: ternary.kind,
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    fn visit_type_binary(&mut self, node: &TypeBinaryExpr, expr: Expr) -> Expr {
        Expr::TypeBinary(TypeBinaryExpr {
            kind: node.kind,
            expr: Box::new(expr),
            target: node.target.clone(),
        })
    }

    fn visit_member(&mut self, member: &MemberExpr, target: Option<Expr>) -> Expr {
        Expr::Member(MemberExpr {
            target: target.map(Box::new),
            declaring: member.declaring.clone(),
            name: member.name.clone(),
            ty: member.ty.clone(),
        })
    }

    fn visit_call(&mut self, call: &CallExpr, target: Option<Expr>, args: Vec<Expr>) -> Expr {
        Expr::Call(CallExpr {
            target: target.map(Box::new),
            method: call.method.clone(),
            args,
            ty: call.ty.clone(),
        })
    }

    fn visit_new(&mut self, new: &NewExpr, args: Vec<Expr>, members: Vec<MemberDecl>) -> Expr {
        Expr::New(NewExpr {
            class: new.class.clone(),
            args,
            members,
        })
    }

    fn visit_declaration(&mut self, decl: &Declaration, initializer: Option<Expr>) -> Stmt {
        Stmt::Declaration(Declaration {
            modifiers: decl.modifiers,
            parameter: decl.parameter.clone(),
            initializer,
        })
    }

    fn visit_expression_stmt(&mut self, expr: Expr) -> Stmt {
        Stmt::Expression(expr)
    }

    fn visit_return(&mut self, expr: Option<Expr>) -> Stmt {
        Stmt::Return(expr)
    }

    fn visit_if(&mut self, arms: Vec<(Expr, Stmt)>, else_stmt: Option<Stmt>) -> Stmt {
        Stmt::If(IfStmt {
            arms,
            else_stmt: else_stmt.map(Box::new),
        })
    }

    fn visit_block(&mut self, statements: Vec<Stmt>) -> Stmt {
        Stmt::Block(BlockStmt { statements })
    }
}

/// Rewrite an expression bottom-up.
pub fn rewrite_expr<R: Rewriter + ?Sized>(expr: &Expr, visitor: &mut R) -> Expr {
    match expr {
        Expr::Constant(c) => visitor.visit_constant(c),
        Expr::Parameter(p) => visitor.visit_parameter(p),
        Expr::Unary(u) => {
            let operand = rewrite_expr(&u.expr, visitor);
            visitor.visit_unary(u, operand)
        }
        Expr::Binary(b) => {
            let left = rewrite_expr(&b.left, visitor);
            let right = rewrite_expr(&b.right, visitor);
            visitor.visit_binary(b, left, right)
        }
        Expr::Ternary(t) => {
            let cond = rewrite_expr(&t.cond, visitor);
            let then_expr = rewrite_expr(&t.then_expr, visitor);
            let else_expr = rewrite_expr(&t.else_expr, visitor);
            visitor.visit_ternary(t, cond, then_expr, else_expr)
        }
        Expr::TypeBinary(t) => {
            let inner = rewrite_expr(&t.expr, visitor);
            visitor.visit_type_binary(t, inner)
        }
        Expr::Member(m) => {
            let target = m.target.as_deref().map(|t| rewrite_expr(t, visitor));
            visitor.visit_member(m, target)
        }
        Expr::Call(c) => {
            let target = c.target.as_deref().map(|t| rewrite_expr(t, visitor));
            let args = c.args.iter().map(|a| rewrite_expr(a, visitor)).collect();
            visitor.visit_call(c, target, args)
        }
        Expr::New(n) => {
            let args = n.args.iter().map(|a| rewrite_expr(a, visitor)).collect();
            let members = n
                .members
                .iter()
                .map(|m| rewrite_member_decl(m, visitor))
                .collect();
            visitor.visit_new(n, args, members)
        }
    }
}

/// Rewrite a statement bottom-up.
pub fn rewrite_stmt<R: Rewriter + ?Sized>(stmt: &Stmt, visitor: &mut R) -> Stmt {
    match stmt {
        Stmt::Declaration(d) => {
            let initializer = d.initializer.as_ref().map(|e| rewrite_expr(e, visitor));
            visitor.visit_declaration(d, initializer)
        }
        Stmt::Expression(e) => {
            let expr = rewrite_expr(e, visitor);
            visitor.visit_expression_stmt(expr)
        }
        Stmt::Return(e) => {
            let expr = e.as_ref().map(|e| rewrite_expr(e, visitor));
            visitor.visit_return(expr)
        }
        Stmt::If(chain) => {
            let arms = chain
                .arms
                .iter()
                .map(|(test, arm)| (rewrite_expr(test, visitor), rewrite_stmt(arm, visitor)))
                .collect();
            let else_stmt = chain
                .else_stmt
                .as_deref()
                .map(|s| rewrite_stmt(s, visitor));
            visitor.visit_if(arms, else_stmt)
        }
        Stmt::Block(b) => {
            let statements = b
                .statements
                .iter()
                .map(|s| rewrite_stmt(s, visitor))
                .collect();
            visitor.visit_block(statements)
        }
        Stmt::Empty => Stmt::Empty,
    }
}

fn rewrite_member_decl<R: Rewriter + ?Sized>(member: &MemberDecl, visitor: &mut R) -> MemberDecl {
    match member {
        MemberDecl::Field {
            modifiers,
            name,
            ty,
            initializer,
        } => MemberDecl::Field {
            modifiers: *modifiers,
            name: name.clone(),
            ty: ty.clone(),
            initializer: initializer.as_ref().map(|e| rewrite_expr(e, visitor)),
        },
        MemberDecl::Method {
            modifiers,
            name,
            result,
            params,
            body,
        } => MemberDecl::Method {
            modifiers: *modifiers,
            name: name.clone(),
            result: result.clone(),
            params: params.clone(),
            body: BlockStmt {
                statements: body
                    .statements
                    .iter()
                    .map(|s| rewrite_stmt(s, visitor))
                    .collect(),
            },
        },
    }
}
