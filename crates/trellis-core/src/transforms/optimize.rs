//! Peephole optimization over expressions and statements.
//!
//! The rewrites are essential, not mere tweaks: without them the block
//! builder would emit comparisons like `false == null` that the downstream
//! generator cannot compile, and single-use inlining would cascade into
//! trees no later pass cleans up. One bottom-up traversal is one pass; the
//! block builder re-runs the pass after substitution, which handles
//! cascades (e.g. a `!` introduced by a ternary rotation enabling a later
//! comparison fold).

use tracing::trace;

use crate::ast::expr::{BinaryExpr, Expr, TernaryExpr, UnaryExpr};
use crate::ast::kind::NodeKind;
use crate::ast::stmt::{IfStmt, Stmt};
use crate::ast::ty::TypeRef;
use crate::ast::value::Value;
use crate::ast::visit::{rewrite_expr, Rewriter};

fn const_true() -> Expr {
    Expr::constant(Value::Bool(true))
}

fn const_false() -> Expr {
    Expr::constant(Value::Bool(false))
}

fn truth(value: bool) -> Expr {
    Expr::constant(Value::Bool(value))
}

fn is_constant_null(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(c) if c.value == Value::Null)
}

/// Classify an already-optimized expression as always-true, always-false,
/// or unknown.
///
/// Deliberately narrow: only the unboxed boolean constants and the boxed
/// `Boolean.TRUE` / `Boolean.FALSE` member references are recognized. The
/// bottom-up traversal guarantees that other truthy shapes (`1 == 1`) have
/// been folded to one of these by the time a parent inspects them.
pub fn always(expr: &Expr) -> Option<bool> {
    match expr {
        Expr::Constant(c) if c.ty == TypeRef::BOOLEAN => match c.value {
            Value::Bool(b) => Some(b),
            _ => None,
        },
        Expr::Member(m) if m.target.is_none() && m.declaring == TypeRef::BOXED_BOOLEAN => {
            match m.name.as_str() {
                "TRUE" => Some(true),
                "FALSE" => Some(false),
                _ => None,
            }
        }
        _ => None,
    }
}

/// One-sided simplification of a short-circuit or equality operator.
/// `lhs` is the side inspected for a constant.
fn reduce(kind: NodeKind, lhs: &Expr, rhs: &Expr) -> Option<Expr> {
    match kind {
        NodeKind::AndAlso => match always(lhs)? {
            true => Some(rhs.clone()),
            false => Some(const_false()),
        },
        NodeKind::OrElse => match always(lhs)? {
            true => Some(const_true()),
            false => Some(rhs.clone()),
        },
        NodeKind::Equal => {
            if is_constant_null(rhs) && lhs.ty().is_primitive() {
                // A primitive can never equal null.
                return Some(const_false());
            }
            // a == true  -> a
            // a == false -> !a
            match always(lhs)? {
                true => Some(rhs.clone()),
                false => Some(Expr::not(rhs.clone())),
            }
        }
        NodeKind::NotEqual => {
            if is_constant_null(rhs) && lhs.ty().is_primitive() {
                return Some(const_true());
            }
            // a != true  -> !a
            // a != false -> a
            match always(lhs)? {
                true => Some(Expr::not(rhs.clone())),
                false => Some(rhs.clone()),
            }
        }
        _ => None,
    }
}

/// The peephole rewriter. Stateless; a single traversal is one pass.
pub struct Optimizer;

impl Rewriter for Optimizer {
    fn visit_unary(&mut self, unary: &UnaryExpr, expr: Expr) -> Expr {
        if unary.kind == NodeKind::Convert {
            if expr.ty() == unary.ty {
                return expr;
            }
            if let Expr::Constant(c) = &expr {
                // Re-type the constant instead of casting it.
                return Expr::typed_constant(c.value.clone(), unary.ty.clone());
            }
        }
        Expr::Unary(UnaryExpr {
            kind: unary.kind,
            ty: unary.ty.clone(),
            expr: Box::new(expr),
        })
    }

    fn visit_binary(&mut self, binary: &BinaryExpr, left: Expr, right: Expr) -> Expr {
        if binary.kind == NodeKind::Assign && left == right {
            // Self-assignment is a no-op.
            return rewrite_expr(&left, self);
        }
        match binary.kind {
            NodeKind::Equal | NodeKind::NotEqual => {
                if left == right {
                    return truth(binary.kind == NodeKind::Equal);
                }
                if let (Expr::Constant(c0), Expr::Constant(c1)) = (&left, &right) {
                    if c0.value == Value::Null && c1.value == Value::Null {
                        // Nulls of all types are equal.
                        return truth(binary.kind == NodeKind::Equal);
                    }
                    if c0.ty == c1.ty {
                        // Equal-valued constants were absorbed above, so two
                        // same-typed constants here are distinct.
                        return truth(binary.kind == NodeKind::NotEqual);
                    }
                }
                if let Some(result) = reduce(binary.kind, &left, &right) {
                    return result;
                }
                if let Some(result) = reduce(binary.kind, &right, &left) {
                    return result;
                }
            }
            NodeKind::AndAlso | NodeKind::OrElse => {
                if let Some(result) = reduce(binary.kind, &left, &right) {
                    return result;
                }
                if let Some(result) = reduce(binary.kind, &right, &left) {
                    return result;
                }
            }
            _ => {}
        }
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
        if ternary.kind == NodeKind::Conditional {
            match always(&cond) {
                // true ? y : z  ===  y
                // false ? y : z ===  z
                Some(true) => return then_expr,
                Some(false) => return else_expr,
                None => {}
            }
            if then_expr == else_expr {
                // a ? b : b  ===  b
                return then_expr;
            }
            // !a ? b : c  ===  a ? c : b
            if let Expr::Unary(u) = &cond {
                if u.kind == NodeKind::Not {
                    let inner = (*u.expr).clone();
                    return Expr::Ternary(TernaryExpr {
                        kind: ternary.kind,
                        cond: Box::new(inner),
                        then_expr: Box::new(else_expr),
                        else_expr: Box::new(then_expr),
                    });
                }
            }
        }
        Expr::Ternary(TernaryExpr {
            kind: ternary.kind,
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    fn visit_if(&mut self, arms: Vec<(Expr, Stmt)>, else_stmt: Option<Stmt>) -> Stmt {
        // if (false) { ... }  <-- drop the arm
        // if (true) { ... }   <-- stop here, discard the rest
        let mut foldable = false;
        let mut first_always_true = false;
        for (i, (test, _)) in arms.iter().enumerate() {
            match always(test) {
                None => continue,
                Some(true) if i == 0 => {
                    first_always_true = true;
                    break;
                }
                Some(_) => {
                    foldable = true;
                    break;
                }
            }
        }
        if first_always_true {
            // The very first test always holds; the chain is its arm.
            return arms.into_iter().next().expect("first arm").1;
        }
        if !foldable {
            // Nothing to fold.
            return Stmt::If(IfStmt {
                arms,
                else_stmt: else_stmt.map(Box::new),
            });
        }
        let had_else = else_stmt.is_some();
        let total = arms.len();
        let mut kept: Vec<(Expr, Stmt)> = Vec::new();
        let mut terminal: Option<Stmt> = None;
        for (test, arm) in arms {
            match always(&test) {
                None => kept.push((test, arm)),
                Some(false) => {}
                Some(true) => {
                    // No need to examine the remaining arms or the else.
                    terminal = Some(arm);
                    break;
                }
            }
        }
        trace!(
            arms = total,
            kept = kept.len(),
            "folded conditional statement"
        );
        let else_stmt = match terminal {
            Some(stmt) => Some(stmt),
            None if had_else => else_stmt,
            None => None,
        };
        if kept.is_empty() {
            // Every test folded away; the chain collapses to its else, or
            // to nothing at all.
            return match else_stmt {
                Some(stmt) => stmt,
                None => Stmt::Empty,
            };
        }
        Stmt::If(IfStmt {
            arms: kept,
            else_stmt: else_stmt.map(Box::new),
        })
    }
}
