use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Deserializer, Serialize};

use super::kind::NodeKind;
use super::stmt::{BlockStmt, Modifiers};
use super::ty::{Primitive, TypeRef};
use super::value::Value;

/// Process-unique identity of a [`Parameter`].
///
/// Two parameters are the same variable iff their ids are equal; names are
/// only labels and may be rewritten during block building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ParamId(u32);

static NEXT_PARAM_ID: AtomicU32 = AtomicU32::new(0);

impl ParamId {
    fn fresh() -> ParamId {
        ParamId(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

// Deserialized ids must keep their identity, so the allocator is advanced
// past them; ids minted afterwards can never collide.
impl<'de> Deserialize<'de> for ParamId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<ParamId, D::Error> {
        let raw = u32::deserialize(deserializer)?;
        NEXT_PARAM_ID.fetch_max(raw.saturating_add(1), Ordering::Relaxed);
        Ok(ParamId(raw))
    }
}

/// A named binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub id: ParamId,
    pub name: String,
    pub ty: TypeRef,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Parameter {
        Parameter {
            id: ParamId::fresh(),
            name: name.into(),
            ty,
        }
    }
}

// Identity equality: two parameters that happen to share a name and type
// are still distinct variables.
impl PartialEq for Parameter {
    fn eq(&self, other: &Parameter) -> bool {
        self.id == other.id
    }
}

impl Eq for Parameter {}

impl Hash for Parameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Literal constant with its declared static type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstantExpr {
    pub value: Value,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub kind: NodeKind,
    pub ty: TypeRef,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub kind: NodeKind,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TernaryExpr {
    pub kind: NodeKind,
    pub cond: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
}

/// An operation between an expression and a type (`x instanceof T`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeBinaryExpr {
    pub kind: NodeKind,
    pub expr: Box<Expr>,
    pub target: TypeRef,
}

/// Field access; a missing target is a static field of the declaring type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberExpr {
    pub target: Option<Box<Expr>>,
    pub declaring: TypeRef,
    pub name: String,
    pub ty: TypeRef,
}

/// Method call; a missing target is a call in the enclosing scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallExpr {
    pub target: Option<Box<Expr>>,
    pub method: String,
    pub args: Vec<Expr>,
    pub ty: TypeRef,
}

/// Object construction, optionally with an anonymous class body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewExpr {
    pub class: TypeRef,
    pub args: Vec<Expr>,
    pub members: Vec<MemberDecl>,
}

/// Member of an anonymous class body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberDecl {
    Field {
        modifiers: Modifiers,
        name: String,
        ty: TypeRef,
        initializer: Option<Expr>,
    },
    Method {
        modifiers: Modifiers,
        name: String,
        result: TypeRef,
        params: Vec<Parameter>,
        body: BlockStmt,
    },
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    Constant(ConstantExpr),
    Parameter(Parameter),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Ternary(TernaryExpr),
    TypeBinary(TypeBinaryExpr),
    Member(MemberExpr),
    Call(CallExpr),
    New(NewExpr),
}

impl Expr {
    /// Node kind tag.
    pub fn kind(&self) -> NodeKind {
        match self {
            Expr::Constant(_) => NodeKind::Constant,
            Expr::Parameter(_) => NodeKind::Parameter,
            Expr::Unary(u) => u.kind,
            Expr::Binary(b) => b.kind,
            Expr::Ternary(t) => t.kind,
            Expr::TypeBinary(t) => t.kind,
            Expr::Member(_) => NodeKind::MemberAccess,
            Expr::Call(_) => NodeKind::Call,
            Expr::New(_) => NodeKind::New,
        }
    }

    /// Static type of this node.
    pub fn ty(&self) -> TypeRef {
        match self {
            Expr::Constant(c) => c.ty.clone(),
            Expr::Parameter(p) => p.ty.clone(),
            Expr::Unary(u) => u.ty.clone(),
            Expr::Binary(b) => match b.kind {
                NodeKind::LessThan
                | NodeKind::LessThanOrEqual
                | NodeKind::GreaterThan
                | NodeKind::GreaterThanOrEqual
                | NodeKind::Equal
                | NodeKind::NotEqual
                | NodeKind::AndAlso
                | NodeKind::OrElse => TypeRef::BOOLEAN,
                _ => b.left.ty(),
            },
            Expr::Ternary(t) => t.then_expr.ty(),
            Expr::TypeBinary(_) => TypeRef::BOOLEAN,
            Expr::Member(m) => m.ty.clone(),
            Expr::Call(c) => c.ty.clone(),
            Expr::New(n) => n.class.clone(),
        }
    }
}

// Constructors. These mirror the node set a front end needs to assemble
// statements for the block builder; types are inferred where the target
// language would infer them.
impl Expr {
    /// Constant with an inferred static type; nulls are typed `Object`.
    pub fn constant(value: Value) -> Expr {
        let ty = match &value {
            Value::Null => TypeRef::object(),
            Value::Bool(_) => TypeRef::BOOLEAN,
            Value::Int(_) => TypeRef::INT,
            Value::Float(_) => TypeRef::Primitive(Primitive::Double),
            Value::Str(_) => TypeRef::class("String"),
        };
        Expr::Constant(ConstantExpr { value, ty })
    }

    /// Constant with an explicit declared type.
    pub fn typed_constant(value: Value, ty: TypeRef) -> Expr {
        Expr::Constant(ConstantExpr { value, ty })
    }

    pub fn null() -> Expr {
        Expr::constant(Value::Null)
    }

    /// A fresh named binding of the given type.
    pub fn parameter(ty: TypeRef, name: impl Into<String>) -> Expr {
        Expr::Parameter(Parameter::new(name, ty))
    }

    /// Static field reference `Boolean.TRUE` / `Boolean.FALSE`.
    pub fn boxed_boolean(value: bool) -> Expr {
        Expr::static_field(
            TypeRef::BOXED_BOOLEAN,
            if value { "TRUE" } else { "FALSE" },
            TypeRef::BOXED_BOOLEAN,
        )
    }

    pub fn not(expr: Expr) -> Expr {
        let ty = expr.ty();
        Expr::Unary(UnaryExpr {
            kind: NodeKind::Not,
            ty,
            expr: Box::new(expr),
        })
    }

    pub fn negate(expr: Expr) -> Expr {
        let ty = expr.ty();
        Expr::Unary(UnaryExpr {
            kind: NodeKind::Negate,
            ty,
            expr: Box::new(expr),
        })
    }

    pub fn convert(expr: Expr, ty: TypeRef) -> Expr {
        Expr::Unary(UnaryExpr {
            kind: NodeKind::Convert,
            ty,
            expr: Box::new(expr),
        })
    }

    /// Mutating unary (`++x`, `x--`, ...); the kind must modify its operand.
    pub fn mutate(kind: NodeKind, expr: Expr) -> Expr {
        debug_assert!(kind.modifies_lvalue());
        let ty = expr.ty();
        Expr::Unary(UnaryExpr {
            kind,
            ty,
            expr: Box::new(expr),
        })
    }

    pub fn binary(kind: NodeKind, left: Expr, right: Expr) -> Expr {
        Expr::Binary(BinaryExpr {
            kind,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn equal(left: Expr, right: Expr) -> Expr {
        Expr::binary(NodeKind::Equal, left, right)
    }

    pub fn not_equal(left: Expr, right: Expr) -> Expr {
        Expr::binary(NodeKind::NotEqual, left, right)
    }

    pub fn and_also(left: Expr, right: Expr) -> Expr {
        Expr::binary(NodeKind::AndAlso, left, right)
    }

    pub fn or_else(left: Expr, right: Expr) -> Expr {
        Expr::binary(NodeKind::OrElse, left, right)
    }

    pub fn add(left: Expr, right: Expr) -> Expr {
        Expr::binary(NodeKind::Add, left, right)
    }

    pub fn subtract(left: Expr, right: Expr) -> Expr {
        Expr::binary(NodeKind::Subtract, left, right)
    }

    pub fn multiply(left: Expr, right: Expr) -> Expr {
        Expr::binary(NodeKind::Multiply, left, right)
    }

    pub fn assign(left: Expr, right: Expr) -> Expr {
        Expr::binary(NodeKind::Assign, left, right)
    }

    pub fn conditional(cond: Expr, then_expr: Expr, else_expr: Expr) -> Expr {
        Expr::Ternary(TernaryExpr {
            kind: NodeKind::Conditional,
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    pub fn type_is(expr: Expr, target: TypeRef) -> Expr {
        Expr::TypeBinary(TypeBinaryExpr {
            kind: NodeKind::TypeIs,
            expr: Box::new(expr),
            target,
        })
    }

    pub fn field(target: Expr, declaring: TypeRef, name: impl Into<String>, ty: TypeRef) -> Expr {
        Expr::Member(MemberExpr {
            target: Some(Box::new(target)),
            declaring,
            name: name.into(),
            ty,
        })
    }

    pub fn static_field(declaring: TypeRef, name: impl Into<String>, ty: TypeRef) -> Expr {
        Expr::Member(MemberExpr {
            target: None,
            declaring,
            name: name.into(),
            ty,
        })
    }

    pub fn call(
        target: Option<Expr>,
        method: impl Into<String>,
        args: Vec<Expr>,
        ty: TypeRef,
    ) -> Expr {
        Expr::Call(CallExpr {
            target: target.map(Box::new),
            method: method.into(),
            args,
            ty,
        })
    }

    pub fn new_instance(class: TypeRef, args: Vec<Expr>) -> Expr {
        Expr::New(NewExpr {
            class,
            args,
            members: Vec::new(),
        })
    }

    pub fn new_anonymous(class: TypeRef, args: Vec<Expr>, members: Vec<MemberDecl>) -> Expr {
        Expr::New(NewExpr {
            class,
            args,
            members,
        })
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_identity_not_name() {
        let a = Parameter::new("x", TypeRef::INT);
        let b = Parameter::new("x", TypeRef::INT);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn constant_equality_includes_declared_type() {
        let untyped = Expr::null();
        let typed = Expr::typed_constant(Value::Null, TypeRef::Boxed(Primitive::Int));
        assert_ne!(untyped, typed);
        assert_eq!(Expr::constant(Value::Int(1)), Expr::constant(Value::Int(1)));
    }

    #[test]
    fn structural_equality_recurses() {
        let x = Expr::parameter(TypeRef::INT, "x");
        let lhs = Expr::add(x.clone(), Expr::constant(Value::Int(1)));
        let rhs = Expr::add(x.clone(), Expr::constant(Value::Int(1)));
        assert_eq!(lhs, rhs);
        let other = Expr::add(Expr::parameter(TypeRef::INT, "x"), Expr::constant(Value::Int(1)));
        assert_ne!(lhs, other);
    }

    #[test]
    fn static_types() {
        let x = Expr::parameter(TypeRef::INT, "x");
        assert_eq!(Expr::equal(x.clone(), x.clone()).ty(), TypeRef::BOOLEAN);
        assert_eq!(Expr::add(x.clone(), x.clone()).ty(), TypeRef::INT);
        assert_eq!(
            Expr::convert(x.clone(), TypeRef::Boxed(Primitive::Int)).ty(),
            TypeRef::Boxed(Primitive::Int)
        );
        assert_eq!(Expr::not(Expr::parameter(TypeRef::BOOLEAN, "b")).ty(), TypeRef::BOOLEAN);
    }
}
