//! The `Type` lattice and subtype rule.
//!
//! `Type` fills the role the teacher crate's `VariableType` enum plays for
//! its integer-only language, generalized to the richer primitive set this
//! language needs plus a closed lattice of the structural categories
//! (`Equatable`, `Comparable`, `Iterable`) the analyzer's subtype checks are
//! built around.
use std::fmt::{self, Display, Formatter};

use crate::scope::ScopeHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Nil,
    Boolean,
    Integer,
    Decimal,
    String,
    Character,
    Any,
    Equatable,
    Comparable,
    Iterable,
    Function {
        params: Vec<Type>,
        returns: Box<Type>,
    },
    Object {
        scope: ScopeHandle<Type>,
    },
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Nil => f.write_str("Nil"),
            Type::Boolean => f.write_str("Boolean"),
            Type::Integer => f.write_str("Integer"),
            Type::Decimal => f.write_str("Decimal"),
            Type::String => f.write_str("String"),
            Type::Character => f.write_str("Character"),
            Type::Any => f.write_str("Any"),
            Type::Equatable => f.write_str("Equatable"),
            Type::Comparable => f.write_str("Comparable"),
            Type::Iterable => f.write_str("Iterable"),
            Type::Function { params, returns } => {
                let params = params
                    .iter()
                    .map(Type::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Function({params}) -> {returns}")
            }
            Type::Object { .. } => f.write_str("Object"),
        }
    }
}

/// Names every native type the analyzer's root `Scope<Type>` must carry, per
/// the external-interfaces contract.
pub const NATIVE_TYPE_NAMES: &[&str] = &[
    "Nil",
    "Boolean",
    "Integer",
    "Decimal",
    "String",
    "Character",
    "Any",
    "Equatable",
    "Comparable",
    "Iterable",
];

pub fn native_type_by_name(name: &str) -> Option<Type> {
    match name {
        "Nil" => Some(Type::Nil),
        "Boolean" => Some(Type::Boolean),
        "Integer" => Some(Type::Integer),
        "Decimal" => Some(Type::Decimal),
        "String" => Some(Type::String),
        "Character" => Some(Type::Character),
        "Any" => Some(Type::Any),
        "Equatable" => Some(Type::Equatable),
        "Comparable" => Some(Type::Comparable),
        "Iterable" => Some(Type::Iterable),
        _ => None,
    }
}

/// `require_subtype(actual, expected)`: is `actual` usable wherever `expected`
/// is required? The lattice is fixed and closed per the component design:
/// `Any` is top, `Equatable` and `Comparable` are structural supertypes of a
/// fixed set of primitives, and everything else is a subtype only of itself.
pub fn is_subtype(actual: &Type, expected: &Type) -> bool {
    if matches!(expected, Type::Any) {
        return true;
    }

    if actual == expected {
        return true;
    }

    match expected {
        Type::Equatable => matches!(
            actual,
            Type::Nil
                | Type::Boolean
                | Type::Integer
                | Type::Decimal
                | Type::String
                | Type::Comparable
                | Type::Iterable
        ),
        Type::Comparable => matches!(
            actual,
            Type::Boolean | Type::Integer | Type::Decimal | Type::String
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_is_top() {
        assert!(is_subtype(&Type::Integer, &Type::Any));
        assert!(is_subtype(&Type::Nil, &Type::Any));
    }

    #[test]
    fn reflexive_for_every_primitive() {
        for t in [
            Type::Nil,
            Type::Boolean,
            Type::Integer,
            Type::Decimal,
            Type::String,
            Type::Character,
            Type::Equatable,
            Type::Comparable,
            Type::Iterable,
        ] {
            assert!(is_subtype(&t, &t));
        }
    }

    #[test]
    fn comparable_is_subtype_of_equatable() {
        assert!(is_subtype(&Type::Comparable, &Type::Equatable));
        assert!(is_subtype(&Type::Integer, &Type::Equatable));
    }

    #[test]
    fn integer_is_not_subtype_of_decimal() {
        assert!(!is_subtype(&Type::Integer, &Type::Decimal));
    }

    #[test]
    fn character_is_not_comparable() {
        assert!(!is_subtype(&Type::Character, &Type::Comparable));
    }

    #[test]
    fn iterable_is_not_comparable() {
        assert!(!is_subtype(&Type::Iterable, &Type::Comparable));
    }

    #[test]
    fn transitivity_through_the_lattice() {
        // Integer <: Comparable <: Equatable, so Integer <: Equatable holds directly
        // (the lattice has depth one, not a chain that needs composing checks).
        assert!(is_subtype(&Type::Integer, &Type::Comparable));
        assert!(is_subtype(&Type::Comparable, &Type::Equatable));
        assert!(is_subtype(&Type::Integer, &Type::Equatable));
    }
}
