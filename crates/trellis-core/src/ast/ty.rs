use std::fmt;

use serde::{Deserialize, Serialize};

/// Primitive (unboxed) types of the target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    /// Unboxed type name (`int`, `boolean`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    /// Name of the boxed wrapper class (`Integer`, `Boolean`, ...).
    pub fn boxed_name(self) -> &'static str {
        match self {
            Primitive::Boolean => "Boolean",
            Primitive::Byte => "Byte",
            Primitive::Char => "Character",
            Primitive::Short => "Short",
            Primitive::Int => "Integer",
            Primitive::Long => "Long",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
        }
    }
}

/// Static type of a node.
///
/// Primitives and their boxed wrappers are distinct types; `Class` covers
/// every other reference type by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Primitive(Primitive),
    Boxed(Primitive),
    Class(String),
    Void,
}

impl TypeRef {
    pub const BOOLEAN: TypeRef = TypeRef::Primitive(Primitive::Boolean);
    pub const INT: TypeRef = TypeRef::Primitive(Primitive::Int);
    pub const BOXED_BOOLEAN: TypeRef = TypeRef::Boxed(Primitive::Boolean);

    pub fn class(name: impl Into<String>) -> TypeRef {
        TypeRef::Class(name.into())
    }

    /// The root reference type, used as the static type of untyped nulls.
    pub fn object() -> TypeRef {
        TypeRef::Class("Object".to_string())
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => f.write_str(p.name()),
            TypeRef::Boxed(p) => f.write_str(p.boxed_name()),
            TypeRef::Class(name) => f.write_str(name),
            TypeRef::Void => f.write_str("void"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(TypeRef::INT.to_string(), "int");
        assert_eq!(TypeRef::Boxed(Primitive::Int).to_string(), "Integer");
        assert_eq!(TypeRef::BOOLEAN.to_string(), "boolean");
        assert_eq!(TypeRef::BOXED_BOOLEAN.to_string(), "Boolean");
        assert_eq!(TypeRef::class("List").to_string(), "List");
    }

    #[test]
    fn boxed_is_not_primitive() {
        assert!(TypeRef::BOOLEAN.is_primitive());
        assert!(!TypeRef::BOXED_BOOLEAN.is_primitive());
        assert!(!TypeRef::object().is_primitive());
        assert_ne!(TypeRef::BOOLEAN, TypeRef::BOXED_BOOLEAN);
    }
}
