//! Semantic types of MiniJava values.

use std::fmt;

use crate::parser::{BaseType, TypeSpec};

/// The closed set of value types. Equality is structural and exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Boolean,
    IntArray,
    /// Reference to a class by name
    ClassRef(String),
}

impl Type {
    /// Storage size in bytes used by the layout calculator
    pub fn size(&self) -> usize {
        match self {
            Type::Boolean => 1,
            Type::Int => 4,
            Type::IntArray | Type::ClassRef(_) => 8,
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::ClassRef(name) => Some(name),
            _ => None,
        }
    }
}

impl From<&TypeSpec> for Type {
    fn from(spec: &TypeSpec) -> Self {
        match &spec.base {
            BaseType::Int => Type::Int,
            BaseType::Boolean => Type::Boolean,
            BaseType::IntArray => Type::IntArray,
            BaseType::Named(name) => Type::ClassRef(name.clone()),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Boolean => write!(f, "boolean"),
            Type::IntArray => write!(f, "int[]"),
            Type::ClassRef(name) => write!(f, "{}", name),
        }
    }
}

/// True when `text` is a base-10 integer literal that fits in an `int`
pub fn is_integer_literal(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) && text.parse::<i32>().is_ok()
}
