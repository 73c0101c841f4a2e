//! Reference counting for block-local variables.

use std::collections::HashMap;

use crate::ast::expr::{Expr, MemberDecl, ParamId, Parameter};
use crate::ast::stmt::Stmt;

/// Counts references to a registered set of parameters.
///
/// Every textual mention of a registered parameter counts as a use,
/// including the left-hand side of an assignment; writes do not cancel
/// reads. Parameters that are not registered (free variables captured from
/// an outer block) are ignored. Declarations do not count the parameter
/// they bind, only their initializer.
#[derive(Default)]
pub struct UseCounter {
    counts: HashMap<ParamId, u32>,
}

impl UseCounter {
    pub fn new() -> UseCounter {
        UseCounter::default()
    }

    pub fn register(&mut self, parameter: &Parameter) {
        self.counts.insert(parameter.id, 0);
    }

    pub fn count(&self, parameter: &Parameter) -> u32 {
        self.counts.get(&parameter.id).copied().unwrap_or(0)
    }

    pub fn count_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Declaration(d) => {
                if let Some(init) = &d.initializer {
                    self.count_expr(init);
                }
            }
            Stmt::Expression(e) => self.count_expr(e),
            Stmt::Return(e) => {
                if let Some(e) = e {
                    self.count_expr(e);
                }
            }
            Stmt::If(chain) => {
                for (test, arm) in &chain.arms {
                    self.count_expr(test);
                    self.count_stmt(arm);
                }
                if let Some(else_stmt) = &chain.else_stmt {
                    self.count_stmt(else_stmt);
                }
            }
            Stmt::Block(b) => {
                for inner in &b.statements {
                    self.count_stmt(inner);
                }
            }
            Stmt::Empty => {}
        }
    }

    pub fn count_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Parameter(p) => {
                if let Some(count) = self.counts.get_mut(&p.id) {
                    *count += 1;
                }
            }
            Expr::Constant(_) => {}
            Expr::Unary(u) => self.count_expr(&u.expr),
            Expr::Binary(b) => {
                self.count_expr(&b.left);
                self.count_expr(&b.right);
            }
            Expr::Ternary(t) => {
                self.count_expr(&t.cond);
                self.count_expr(&t.then_expr);
                self.count_expr(&t.else_expr);
            }
            Expr::TypeBinary(t) => self.count_expr(&t.expr),
            Expr::Member(m) => {
                if let Some(target) = &m.target {
                    self.count_expr(target);
                }
            }
            Expr::Call(c) => {
                if let Some(target) = &c.target {
                    self.count_expr(target);
                }
                for arg in &c.args {
                    self.count_expr(arg);
                }
            }
            Expr::New(n) => {
                for arg in &n.args {
                    self.count_expr(arg);
                }
                for member in &n.members {
                    match member {
                        MemberDecl::Field { initializer, .. } => {
                            if let Some(init) = initializer {
                                self.count_expr(init);
                            }
                        }
                        MemberDecl::Method { body, .. } => {
                            for inner in &body.statements {
                                self.count_stmt(inner);
                            }
                        }
                    }
                }
            }
        }
    }
}
