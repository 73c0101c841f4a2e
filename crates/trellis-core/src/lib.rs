//! Expression-tree construction, optimization, and block building.
//!
//! This crate is the front half of the trellis code generator: callers
//! assemble statements for a small statically-typed language with nullable
//! references and primitive boxing, and get back a normalized, simplified
//! block ready for textual emission.
//!
//! Two subsystems cooperate:
//!
//! - [`Optimizer`] applies algebraic identities over boolean, comparison,
//!   conditional, and conversion nodes, and collapses dead branches of
//!   multi-arm conditional statements.
//! - [`BlockBuilder`] accumulates statements, keeps declared names unique,
//!   shares common subexpressions, and inlines single-use declarations when
//!   the block is finished.
//!
//! The optimizer is a local, syntactic rewriter: no data-flow analysis, no
//! constant propagation across variables. It is allowed to be conservative
//! and never changes the observable behavior of well-formed input.

pub mod ast;
pub mod builder;
pub mod transforms;

pub use ast::{
    rewrite_expr, rewrite_stmt, BlockStmt, Declaration, Expr, IfStmt, MemberDecl, Modifiers,
    NodeKind, ParamId, Parameter, Primitive, Rewriter, Stmt, TypeRef, Value,
};
pub use builder::{is_simple_expression, BlockBuilder};
pub use transforms::{always, Optimizer, Substitution, UseCounter};
