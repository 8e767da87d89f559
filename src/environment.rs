//! Builders for the two root scopes the external interface requires:
//! the analyzer's `Scope<Type>` (native types + native function signatures)
//! and the evaluator's `Scope<RuntimeValue>` (native functions + the
//! crate's own testing fixtures).
use std::rc::Rc;

use num_bigint::BigInt;

use crate::analyzer::types::{native_type_by_name, Type, NATIVE_TYPE_NAMES};
use crate::error::EvaluateError;
use crate::scope::Scope;
use crate::value::{FunctionKind, FunctionValue, Primitive, RuntimeValue};

/// The analyzer's root scope: every native type name plus the signature of
/// every native function the evaluator's root scope below provides.
pub fn analyzer_root() -> Scope<Type> {
    let root = Scope::root();

    for name in NATIVE_TYPE_NAMES {
        root.define(name.to_string(), native_type_by_name(name).unwrap())
            .expect("native type names are distinct");
    }

    root.define(
        "debug",
        Type::Function {
            params: vec![Type::Any],
            returns: Box::new(Type::Nil),
        },
    )
    .unwrap();
    root.define(
        "print",
        Type::Function {
            params: vec![Type::Any],
            returns: Box::new(Type::Nil),
        },
    )
    .unwrap();
    root.define(
        "log",
        Type::Function {
            params: vec![Type::Any],
            returns: Box::new(Type::Any),
        },
    )
    .unwrap();
    // `list` is intentionally absent here: it takes any arity, which this
    // crate's fixed-arity `Type::Function` shape cannot express, so the
    // analyzer special-cases it by name instead of looking it up here.
    root.define(
        "range",
        Type::Function {
            params: vec![Type::Integer, Type::Integer],
            returns: Box::new(Type::Iterable),
        },
    )
    .unwrap();

    root
}

fn native(f: impl Fn(&[RuntimeValue]) -> Result<RuntimeValue, EvaluateError> + 'static) -> RuntimeValue {
    RuntimeValue::Function(FunctionValue {
        name: None,
        kind: FunctionKind::Native(Rc::new(f)),
    })
}

fn expect_one(args: &[RuntimeValue], name: &str) -> Result<&RuntimeValue, EvaluateError> {
    match args {
        [value] => Ok(value),
        _ => Err(EvaluateError::new(format!(
            "'{name}' expects 1 argument, found {}",
            args.len()
        ))),
    }
}

fn expect_integer(value: &RuntimeValue, name: &str) -> Result<BigInt, EvaluateError> {
    match value {
        RuntimeValue::Primitive(Primitive::Integer(i)) => Ok(i.clone()),
        other => Err(EvaluateError::new(format!(
            "'{name}' expects an Integer, found '{}'",
            other.type_name()
        ))),
    }
}

/// The evaluator's root scope: native functions `debug`/`print`/`log`/`list`/`range`
/// plus the `variable`/`function`/`object` testing fixtures the crate's own
/// test suite is built against.
pub fn evaluator_root() -> Scope<RuntimeValue> {
    let root = Scope::root();

    root.define(
        "debug",
        native(|args| {
            let value = expect_one(args, "debug")?;
            println!("{value:?}");
            Ok(RuntimeValue::nil())
        }),
    )
    .unwrap();

    root.define(
        "print",
        native(|args| {
            let value = expect_one(args, "print")?;
            println!("{value}");
            Ok(RuntimeValue::nil())
        }),
    )
    .unwrap();

    root.define(
        "log",
        native(|args| {
            let value = expect_one(args, "log")?;
            println!("log: {value}");
            Ok(value.clone())
        }),
    )
    .unwrap();

    root.define(
        "list",
        native(|args| Ok(RuntimeValue::Primitive(Primitive::List(args.to_vec())))),
    )
    .unwrap();

    root.define(
        "range",
        native(|args| {
            let (a, b) = match args {
                [a, b] => (
                    expect_integer(a, "range")?,
                    expect_integer(b, "range")?,
                ),
                _ => {
                    return Err(EvaluateError::new(format!(
                        "'range' expects 2 arguments, found {}",
                        args.len()
                    )))
                }
            };

            if a > b {
                return Err(EvaluateError::new("'range' requires its first argument to not exceed its second"));
            }

            let mut values = vec![];
            let mut current = a;
            while current < b {
                values.push(RuntimeValue::Primitive(Primitive::Integer(current.clone())));
                current += 1;
            }
            Ok(RuntimeValue::Primitive(Primitive::List(values)))
        }),
    )
    .unwrap();

    root.define(
        "variable",
        RuntimeValue::Primitive(Primitive::Integer(BigInt::from(0))),
    )
    .unwrap();

    root.define(
        "function",
        native(|_args| Ok(RuntimeValue::nil())),
    )
    .unwrap();

    root.define(
        "object",
        RuntimeValue::ObjectValue {
            name: None,
            scope: Scope::root(),
        },
    )
    .unwrap();

    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyzer_root_carries_every_native_type() {
        let root = analyzer_root();
        for name in NATIVE_TYPE_NAMES {
            assert!(root.contains(name));
        }
    }

    #[test]
    fn analyzer_root_carries_native_function_signatures() {
        let root = analyzer_root();
        assert!(matches!(root.get("print"), Some(Type::Function { .. })));
        assert!(matches!(root.get("range"), Some(Type::Function { .. })));
    }

    #[test]
    fn evaluator_range_produces_half_open_interval() {
        let root = evaluator_root();
        let range = root.get("range").unwrap();
        let RuntimeValue::Function(f) = range else {
            panic!("expected a function");
        };
        let FunctionKind::Native(native) = f.kind else {
            panic!("expected a native function");
        };
        let result = native(&[
            RuntimeValue::Primitive(Primitive::Integer(BigInt::from(0))),
            RuntimeValue::Primitive(Primitive::Integer(BigInt::from(3))),
        ])
        .unwrap();
        match result {
            RuntimeValue::Primitive(Primitive::List(values)) => assert_eq!(values.len(), 3),
            other => panic!("expected a List, got {other:?}"),
        }
    }

    #[test]
    fn evaluator_range_rejects_a_greater_than_b() {
        let root = evaluator_root();
        let RuntimeValue::Function(f) = root.get("range").unwrap() else {
            panic!("expected a function");
        };
        let FunctionKind::Native(native) = f.kind else {
            panic!("expected a native function");
        };
        let result = native(&[
            RuntimeValue::Primitive(Primitive::Integer(BigInt::from(3))),
            RuntimeValue::Primitive(Primitive::Integer(BigInt::from(0))),
        ]);
        assert!(result.is_err());
    }
}
