//! The expression-tree model: node kinds, static types, expressions,
//! statements, the rewrite traversal, and source-level printing.

pub mod expr;
pub mod kind;
pub mod printer;
pub mod stmt;
pub mod ty;
pub mod value;
pub mod visit;

pub use expr::{
    BinaryExpr, CallExpr, ConstantExpr, Expr, MemberDecl, MemberExpr, NewExpr, ParamId, Parameter,
    TernaryExpr, TypeBinaryExpr, UnaryExpr,
};
pub use kind::NodeKind;
pub use stmt::{BlockStmt, Declaration, IfStmt, Modifiers, Stmt};
pub use ty::{Primitive, TypeRef};
pub use value::Value;
pub use visit::{rewrite_expr, rewrite_stmt, Rewriter};
