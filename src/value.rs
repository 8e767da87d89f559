//! Runtime values produced by the evaluator.
//!
//! Plays the role of the teacher crate's `VariableType` runtime enum
//! (`src/interpreter/mod.rs`), generalized from its `{Void, Bool, Str, Int,
//! Func}` set to this language's full primitive/object/function value space.
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::ast::Stmt;
use crate::error::EvaluateError;
use crate::scope::ScopeHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Nil,
    Bool(bool),
    Integer(BigInt),
    Decimal(BigDecimal),
    Str(String),
    Char(char),
    List(Vec<RuntimeValue>),
}

impl Display for Primitive {
    /// The "printable form" referenced by the native `print`/`log` functions.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Nil => f.write_str("nil"),
            Primitive::Bool(value) => write!(f, "{value}"),
            Primitive::Integer(value) => write!(f, "{value}"),
            Primitive::Decimal(value) => write!(f, "{value}"),
            Primitive::Str(value) => f.write_str(value),
            Primitive::Char(value) => write!(f, "{value}"),
            Primitive::List(values) => {
                let rendered = values
                    .iter()
                    .map(RuntimeValue::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{rendered}]")
            }
        }
    }
}

pub type NativeFn = Rc<dyn Fn(&[RuntimeValue]) -> Result<RuntimeValue, EvaluateError>>;

/// A user `Def`, closing over the scope it was declared in.
#[derive(Clone)]
pub struct UserFn {
    pub parameters: Vec<String>,
    pub body: Rc<Vec<Stmt<()>>>,
    pub closure: ScopeHandle<RuntimeValue>,
}

#[derive(Clone)]
pub enum FunctionKind {
    Native(NativeFn),
    User(UserFn),
}

#[derive(Clone)]
pub struct FunctionValue {
    pub name: Option<String>,
    pub kind: FunctionKind,
}

impl PartialEq for FunctionValue {
    /// Functions compare by identity of their name; two distinct closures
    /// over the same source text are still distinct values, matching the
    /// language's lack of any other notion of function equality.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionValue({:?})", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeValue {
    Primitive(Primitive),
    ObjectValue {
        name: Option<String>,
        scope: ScopeHandle<RuntimeValue>,
    },
    Function(FunctionValue),
}

impl RuntimeValue {
    pub fn nil() -> Self {
        RuntimeValue::Primitive(Primitive::Nil)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            RuntimeValue::Primitive(Primitive::Nil) => "Nil",
            RuntimeValue::Primitive(Primitive::Bool(_)) => "Boolean",
            RuntimeValue::Primitive(Primitive::Integer(_)) => "Integer",
            RuntimeValue::Primitive(Primitive::Decimal(_)) => "Decimal",
            RuntimeValue::Primitive(Primitive::Str(_)) => "String",
            RuntimeValue::Primitive(Primitive::Char(_)) => "Character",
            RuntimeValue::Primitive(Primitive::List(_)) => "Iterable",
            RuntimeValue::ObjectValue { .. } => "Object",
            RuntimeValue::Function(_) => "Function",
        }
    }
}

impl Display for RuntimeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeValue::Primitive(primitive) => write!(f, "{primitive}"),
            RuntimeValue::ObjectValue { name, .. } => match name {
                Some(name) => write!(f, "<object {name}>"),
                None => f.write_str("<object>"),
            },
            RuntimeValue::Function(func) => match &func.name {
                Some(name) => write!(f, "<function {name}>"),
                None => f.write_str("<function>"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_display_matches_printable_form() {
        assert_eq!(Primitive::Bool(true).to_string(), "true");
        assert_eq!(Primitive::Str("hi".into()).to_string(), "hi");
    }

    #[test]
    fn list_display_joins_elements() {
        let list = Primitive::List(vec![
            RuntimeValue::Primitive(Primitive::Integer(BigInt::from(1))),
            RuntimeValue::Primitive(Primitive::Integer(BigInt::from(2))),
        ]);
        assert_eq!(list.to_string(), "[1, 2]");
    }

    #[test]
    fn functions_compare_by_name() {
        let a = FunctionValue {
            name: Some("f".into()),
            kind: FunctionKind::Native(Rc::new(|_| Ok(RuntimeValue::nil()))),
        };
        let b = FunctionValue {
            name: Some("f".into()),
            kind: FunctionKind::Native(Rc::new(|_| Ok(RuntimeValue::nil()))),
        };
        assert_eq!(a, b);
    }
}
