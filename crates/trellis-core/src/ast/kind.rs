use serde::{Deserialize, Serialize};

/// Kind tag shared by every expression and statement node.
///
/// Carries the operator metadata the printer and the rewrite passes need:
/// the textual operator, precedence floors for parenthesization, and
/// whether applying the operator writes to its first operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    // Leaf expressions.
    Constant,
    Parameter,
    MemberAccess,
    Call,
    New,
    // Unary.
    Not,
    Negate,
    Convert,
    PreIncrementAssign,
    PreDecrementAssign,
    PostIncrementAssign,
    PostDecrementAssign,
    // Binary.
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    LeftShift,
    RightShift,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    TypeIs,
    Equal,
    NotEqual,
    And,
    ExclusiveOr,
    Or,
    AndAlso,
    OrElse,
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
    // Ternary.
    Conditional,
    // Statements.
    Declaration,
    Statement,
    Goto,
    IfThenElse,
    Block,
}

/// Operator metadata for one kind.
struct OpInfo {
    op: &'static str,
    /// Binding strength of the operator itself.
    prec: u8,
    /// Minimum precedence the first operand must have to print unparenthesized.
    lprec: u8,
    /// Same, for the second operand.
    rprec: u8,
    modifies_lvalue: bool,
}

const fn leaf() -> OpInfo {
    OpInfo {
        op: "",
        prec: 15,
        lprec: 15,
        rprec: 15,
        modifies_lvalue: false,
    }
}

const fn prefix(op: &'static str, rprec: u8, modifies_lvalue: bool) -> OpInfo {
    OpInfo {
        op,
        prec: 14,
        lprec: 14,
        rprec,
        modifies_lvalue,
    }
}

const fn left_assoc(op: &'static str, prec: u8) -> OpInfo {
    OpInfo {
        op,
        prec,
        lprec: prec,
        rprec: prec + 1,
        modifies_lvalue: false,
    }
}

const fn assign(op: &'static str) -> OpInfo {
    OpInfo {
        op,
        prec: 2,
        lprec: 3,
        rprec: 2,
        modifies_lvalue: true,
    }
}

const fn stmt() -> OpInfo {
    OpInfo {
        op: "",
        prec: 0,
        lprec: 0,
        rprec: 0,
        modifies_lvalue: false,
    }
}

impl NodeKind {
    fn info(self) -> OpInfo {
        use NodeKind::*;
        match self {
            Constant | Parameter | MemberAccess | Call | New => leaf(),
            Not => prefix("!", 14, false),
            Negate => prefix("-", 15, false),
            Convert => prefix("", 14, false),
            PreIncrementAssign => prefix("++", 15, true),
            PreDecrementAssign => prefix("--", 15, true),
            PostIncrementAssign => OpInfo {
                op: "++",
                prec: 15,
                lprec: 15,
                rprec: 15,
                modifies_lvalue: true,
            },
            PostDecrementAssign => OpInfo {
                op: "--",
                prec: 15,
                lprec: 15,
                rprec: 15,
                modifies_lvalue: true,
            },
            Multiply => left_assoc("*", 13),
            Divide => left_assoc("/", 13),
            Modulo => left_assoc("%", 13),
            Add => left_assoc("+", 12),
            Subtract => left_assoc("-", 12),
            LeftShift => left_assoc("<<", 11),
            RightShift => left_assoc(">>", 11),
            LessThan => left_assoc("<", 10),
            LessThanOrEqual => left_assoc("<=", 10),
            GreaterThan => left_assoc(">", 10),
            GreaterThanOrEqual => left_assoc(">=", 10),
            TypeIs => left_assoc("instanceof", 10),
            Equal => left_assoc("==", 9),
            NotEqual => left_assoc("!=", 9),
            And => left_assoc("&", 8),
            ExclusiveOr => left_assoc("^", 7),
            Or => left_assoc("|", 6),
            AndAlso => left_assoc("&&", 5),
            OrElse => left_assoc("||", 4),
            Assign => assign("="),
            AddAssign => assign("+="),
            SubtractAssign => assign("-="),
            MultiplyAssign => assign("*="),
            DivideAssign => assign("/="),
            ModuloAssign => assign("%="),
            Conditional => OpInfo {
                op: "?",
                prec: 3,
                lprec: 4,
                rprec: 3,
                modifies_lvalue: false,
            },
            Declaration | Statement | Goto | IfThenElse | Block => stmt(),
        }
    }

    /// Textual operator, empty for leaves and statements.
    pub fn op(self) -> &'static str {
        self.info().op
    }

    /// Binding strength used by the printer.
    pub fn precedence(self) -> u8 {
        self.info().prec
    }

    /// Precedence floor for the first operand.
    pub fn lprec(self) -> u8 {
        self.info().lprec
    }

    /// Precedence floor for the second operand.
    pub fn rprec(self) -> u8 {
        self.info().rprec
    }

    /// Whether this operator writes to its first operand.
    pub fn modifies_lvalue(self) -> bool {
        self.info().modifies_lvalue
    }

    /// Whether the operator prints after its operand (`x++`, `x--`).
    pub fn is_postfix(self) -> bool {
        matches!(
            self,
            NodeKind::PostIncrementAssign | NodeKind::PostDecrementAssign
        )
    }
}
