//! Identity-keyed substitution of parameters by expressions.

use std::collections::{HashMap, HashSet};

use crate::ast::expr::{BinaryExpr, Expr, ParamId, Parameter, UnaryExpr};
use crate::ast::visit::{rewrite_expr, Rewriter};

/// Replaces references to mapped parameters with their expressions.
///
/// Substitution is transitive: a replacement expression is itself traversed,
/// so a chain of single-use variables collapses in one application. An
/// active set guards against a substitution whose expansion refers,
/// transitively, to itself; re-entering an active parameter is a logic bug
/// in the caller and panics.
///
/// Operands written by a mutating operator are never substituted: `t++`
/// must not become `1++`, and the target of an assignment stays a variable.
/// When the target of an assignment is itself scheduled for substitution,
/// the write is dead and the whole assignment is replaced by its right-hand
/// side.
pub struct Substitution<'a> {
    map: &'a HashMap<ParamId, Expr>,
    actives: HashSet<ParamId>,
}

impl<'a> Substitution<'a> {
    pub fn new(map: &'a HashMap<ParamId, Expr>) -> Substitution<'a> {
        Substitution {
            map,
            actives: HashSet::new(),
        }
    }
}

impl Rewriter for Substitution<'_> {
    fn visit_parameter(&mut self, parameter: &Parameter) -> Expr {
        match self.map.get(&parameter.id) {
            Some(replacement) => {
                if !self.actives.insert(parameter.id) {
                    panic!("recursive expansion of {}", parameter.name);
                }
                // Recursively substitute.
                let result = rewrite_expr(replacement, self);
                self.actives.remove(&parameter.id);
                result
            }
            None => Expr::Parameter(parameter.clone()),
        }
    }

    fn visit_unary(&mut self, unary: &UnaryExpr, expr: Expr) -> Expr {
        if unary.kind.modifies_lvalue() {
            // Keep the original operand.
            return Expr::Unary(unary.clone());
        }
        Expr::Unary(UnaryExpr {
            kind: unary.kind,
            ty: unary.ty.clone(),
            expr: Box::new(expr),
        })
    }

    fn visit_binary(&mut self, binary: &BinaryExpr, left: Expr, right: Expr) -> Expr {
        if binary.kind.modifies_lvalue() {
            if let Expr::Parameter(p) = binary.left.as_ref() {
                // If t is a declaration used only once, replace
                //   int v = (t = 1) != a ? c : d;
                // with
                //   int v = 1 != a ? c : d;
                if self.map.contains_key(&p.id) {
                    return rewrite_expr(&right, self);
                }
            }
            // Keep the original target.
            return Expr::Binary(BinaryExpr {
                kind: binary.kind,
                left: binary.left.clone(),
                right: Box::new(right),
            });
        }
        Expr::Binary(BinaryExpr {
            kind: binary.kind,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}
