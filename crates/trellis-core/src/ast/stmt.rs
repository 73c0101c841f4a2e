use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::expr::{Expr, Parameter};
use super::kind::NodeKind;

bitflags! {
    /// Declaration modifiers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// The variable is assigned exactly once; final declarations with an
        /// initializer are candidates for common-subexpression reuse.
        const FINAL = 1 << 0;
        const STATIC = 1 << 1;
    }
}

// Serialized as the raw bits.
impl Serialize for Modifiers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Modifiers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Modifiers, D::Error> {
        Ok(Modifiers::from_bits_truncate(u8::deserialize(deserializer)?))
    }
}

/// Statement that declares and optionally initializes a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Declaration {
    pub modifiers: Modifiers,
    pub parameter: Parameter,
    pub initializer: Option<Expr>,
}

/// `if (test) stmt else if (test) stmt ... else stmt` chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IfStmt {
    pub arms: Vec<(Expr, Stmt)>,
    pub else_stmt: Option<Box<Stmt>>,
}

/// Ordered sequence of statements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
}

/// A statement node.
///
/// `Empty` is the empty-statement sentinel: rewrites that eliminate a
/// statement entirely return it, and the block builder filters it out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stmt {
    Declaration(Declaration),
    Expression(Expr),
    Return(Option<Expr>),
    If(IfStmt),
    Block(BlockStmt),
    Empty,
}

impl Stmt {
    /// Node kind tag.
    pub fn kind(&self) -> NodeKind {
        match self {
            Stmt::Declaration(_) => NodeKind::Declaration,
            Stmt::Expression(_) => NodeKind::Statement,
            Stmt::Return(_) => NodeKind::Goto,
            Stmt::If(_) => NodeKind::IfThenElse,
            Stmt::Block(_) => NodeKind::Block,
            Stmt::Empty => NodeKind::Statement,
        }
    }

    pub fn declare(modifiers: Modifiers, parameter: Parameter, initializer: Option<Expr>) -> Stmt {
        Stmt::Declaration(Declaration {
            modifiers,
            parameter,
            initializer,
        })
    }

    /// Expression evaluated for its effect.
    pub fn expr(expr: Expr) -> Stmt {
        Stmt::Expression(expr)
    }

    /// `return expr;`
    pub fn ret(expr: Expr) -> Stmt {
        Stmt::Return(Some(expr))
    }

    /// `return;`
    pub fn ret_void() -> Stmt {
        Stmt::Return(None)
    }

    pub fn if_then(test: Expr, then_stmt: Stmt) -> Stmt {
        Stmt::If(IfStmt {
            arms: vec![(test, then_stmt)],
            else_stmt: None,
        })
    }

    pub fn if_then_else(test: Expr, then_stmt: Stmt, else_stmt: Stmt) -> Stmt {
        Stmt::If(IfStmt {
            arms: vec![(test, then_stmt)],
            else_stmt: Some(Box::new(else_stmt)),
        })
    }

    /// Full `if`/`else if`/`else` chain.
    pub fn if_chain(arms: Vec<(Expr, Stmt)>, else_stmt: Option<Stmt>) -> Stmt {
        Stmt::If(IfStmt {
            arms,
            else_stmt: else_stmt.map(Box::new),
        })
    }

    pub fn block(statements: Vec<Stmt>) -> Stmt {
        Stmt::Block(BlockStmt { statements })
    }
}
