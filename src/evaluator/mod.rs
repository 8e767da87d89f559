//! Tree-walking evaluator.
//!
//! Generalizes the teacher crate's `Interpreter` (`src/interpreter/mod.rs`:
//! `run_statement`/`run_expression` dispatch over a push/pop `Scope` stack)
//! from its integer-only `VariableType` to the full `RuntimeValue` space,
//! and replaces its `unreachable!()`-on-type-mismatch style with proper
//! `EvaluateError`s since this evaluator runs over already-parsed (but not
//! necessarily analyzed) ASTs.
use std::cmp::Ordering;
use std::rc::Rc;

use bigdecimal::BigDecimal;
use log::trace;
use num_bigint::BigInt;
use num_traits::Zero;

use crate::ast::{BinaryOp, Def, Expr, LetField, Literal, Source, Stmt};
use crate::error::EvaluateError;
use crate::scope::Scope;
use crate::value::{FunctionKind, FunctionValue, Primitive, RuntimeValue, UserFn};

/// Internal control-flow signal. `Return` is never a user-visible error: it
/// unwinds up to the nearest function call boundary and is consumed there.
enum Signal {
    Return(RuntimeValue),
    Error(EvaluateError),
}

impl From<EvaluateError> for Signal {
    fn from(e: EvaluateError) -> Self {
        Signal::Error(e)
    }
}

type Flow<T> = Result<T, Signal>;

pub fn evaluate(source: &Source<()>, root: Scope<RuntimeValue>) -> Result<RuntimeValue, EvaluateError> {
    let mut result = RuntimeValue::nil();
    for stmt in &source.statements {
        match eval_stmt(stmt, &root) {
            Ok(value) => result = value,
            Err(Signal::Return(value)) => return Ok(value),
            Err(Signal::Error(e)) => return Err(e),
        }
    }
    Ok(result)
}

fn eval_block(body: &[Stmt<()>], scope: &Scope<RuntimeValue>) -> Flow<RuntimeValue> {
    let mut result = RuntimeValue::nil();
    for stmt in body {
        result = eval_stmt(stmt, scope)?;
    }
    Ok(result)
}

fn eval_stmt(stmt: &Stmt<()>, scope: &Scope<RuntimeValue>) -> Flow<RuntimeValue> {
    match stmt {
        Stmt::Let { name, value, .. } => {
            let value = match value {
                Some(expr) => eval_expr(expr, scope)?,
                None => RuntimeValue::nil(),
            };
            scope
                .define(name.clone(), value)
                .map_err(EvaluateError::new)?;
            Ok(RuntimeValue::nil())
        }
        Stmt::Def(def) => {
            let function = make_user_function(def, scope);
            scope
                .define(def.name.clone(), function)
                .map_err(EvaluateError::new)?;
            Ok(RuntimeValue::nil())
        }
        Stmt::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => {
            let cond = eval_expr(cond, scope)?;
            trace!("scope push (if)");
            let result = if is_truthy(&cond)? {
                eval_block(then_branch, &scope.child())
            } else {
                eval_block(else_branch, &scope.child())
            };
            trace!("scope pop (if)");
            result
        }
        Stmt::For {
            name,
            iterable,
            body,
            ..
        } => eval_for(name, iterable, body, scope),
        Stmt::Return { value, .. } => {
            let value = match value {
                Some(expr) => eval_expr(expr, scope)?,
                None => RuntimeValue::nil(),
            };
            Err(Signal::Return(value))
        }
        Stmt::Expression { expr } => eval_expr(expr, scope),
        Stmt::Assignment { target, value, .. } => eval_assignment(target, value, scope),
    }
}

fn is_truthy(value: &RuntimeValue) -> Flow<bool> {
    match value {
        RuntimeValue::Primitive(Primitive::Bool(b)) => Ok(*b),
        other => Err(Signal::Error(EvaluateError::new(format!(
            "expected a Boolean, found '{}'",
            other.type_name()
        )))),
    }
}

fn iterable_values(value: &RuntimeValue) -> Flow<Vec<RuntimeValue>> {
    match value {
        RuntimeValue::Primitive(Primitive::List(values)) => Ok(values.clone()),
        other => Err(Signal::Error(EvaluateError::new(format!(
            "'{}' is not iterable",
            other.type_name()
        )))),
    }
}

fn eval_for(
    name: &str,
    iterable: &Expr<()>,
    body: &[Stmt<()>],
    scope: &Scope<RuntimeValue>,
) -> Flow<RuntimeValue> {
    let iterable = eval_expr(iterable, scope)?;
    let values = iterable_values(&iterable)?;

    let mut result = RuntimeValue::nil();
    for value in values {
        trace!("scope push (for)");
        let body_scope = scope.child();
        body_scope
            .define(name.to_string(), value)
            .map_err(EvaluateError::new)?;
        result = eval_block(body, &body_scope)?;
        trace!("scope pop (for)");
    }
    Ok(result)
}

fn eval_assignment(
    target: &Expr<()>,
    value: &Expr<()>,
    scope: &Scope<RuntimeValue>,
) -> Flow<RuntimeValue> {
    match target {
        Expr::Variable(name, ()) => {
            let value = eval_expr(value, scope)?;
            scope
                .set(name, value.clone())
                .map_err(EvaluateError::new)?;
            Ok(value)
        }
        Expr::Property(receiver, name, ()) => {
            let receiver = eval_expr(receiver, scope)?;
            let object_scope = match &receiver {
                RuntimeValue::ObjectValue { scope, .. } => scope,
                other => {
                    return Err(Signal::Error(EvaluateError::new(format!(
                        "cannot assign to a property of non-object value '{}'",
                        other.type_name()
                    ))))
                }
            };
            let value = eval_expr(value, scope)?;
            object_scope
                .set_current(name, value.clone())
                .map_err(EvaluateError::new)?;
            Ok(value)
        }
        _ => Err(Signal::Error(EvaluateError::new(
            "invalid assignment target",
        ))),
    }
}

fn eval_expr(expr: &Expr<()>, scope: &Scope<RuntimeValue>) -> Flow<RuntimeValue> {
    match expr {
        Expr::Literal(literal, ()) => Ok(eval_literal(literal)),
        Expr::Group(inner, ()) => eval_expr(inner, scope),
        Expr::Binary(op, left, right, ()) => eval_binary(*op, left, right, scope),
        Expr::Variable(name, ()) => scope
            .get(name)
            .ok_or_else(|| Signal::Error(EvaluateError::new(format!("undefined variable '{name}'")))),
        Expr::Property(receiver, name, ()) => {
            let receiver = eval_expr(receiver, scope)?;
            let object_scope = match &receiver {
                RuntimeValue::ObjectValue { scope, .. } => scope,
                other => {
                    return Err(Signal::Error(EvaluateError::new(format!(
                        "'{}' has no properties",
                        other.type_name()
                    ))))
                }
            };
            object_scope.get_current(name).ok_or_else(|| {
                Signal::Error(EvaluateError::new(format!("no member named '{name}'")))
            })
        }
        Expr::Function(name, args, ()) => eval_call(name, args, scope),
        Expr::Method(receiver, name, args, ()) => eval_method_call(receiver, name, args, scope),
        Expr::ObjectExpr {
            name,
            fields,
            methods,
            ..
        } => eval_object(name.as_deref(), fields, methods, scope),
    }
}

fn eval_literal(literal: &Literal) -> RuntimeValue {
    match literal {
        Literal::Nil => RuntimeValue::nil(),
        Literal::Bool(b) => RuntimeValue::Primitive(Primitive::Bool(*b)),
        Literal::Integer(i) => RuntimeValue::Primitive(Primitive::Integer(i.clone())),
        Literal::Decimal(d) => RuntimeValue::Primitive(Primitive::Decimal(d.clone())),
        Literal::Str(s) => RuntimeValue::Primitive(Primitive::Str(s.clone())),
        Literal::Char(c) => RuntimeValue::Primitive(Primitive::Char(*c)),
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &Expr<()>,
    right: &Expr<()>,
    scope: &Scope<RuntimeValue>,
) -> Flow<RuntimeValue> {
    // AND/OR short-circuit: the right operand is only ever evaluated when needed.
    match op {
        BinaryOp::And => {
            let left = is_truthy(&eval_expr(left, scope)?)?;
            if !left {
                return Ok(RuntimeValue::Primitive(Primitive::Bool(false)));
            }
            let right = is_truthy(&eval_expr(right, scope)?)?;
            return Ok(RuntimeValue::Primitive(Primitive::Bool(right)));
        }
        BinaryOp::Or => {
            let left = is_truthy(&eval_expr(left, scope)?)?;
            if left {
                return Ok(RuntimeValue::Primitive(Primitive::Bool(true)));
            }
            let right = is_truthy(&eval_expr(right, scope)?)?;
            return Ok(RuntimeValue::Primitive(Primitive::Bool(right)));
        }
        _ => {}
    }

    let left = eval_expr(left, scope)?;
    let right = eval_expr(right, scope)?;

    if matches!(op, BinaryOp::Add)
        && (matches!(left, RuntimeValue::Primitive(Primitive::Str(_)))
            || matches!(right, RuntimeValue::Primitive(Primitive::Str(_))))
    {
        return Ok(RuntimeValue::Primitive(Primitive::Str(format!(
            "{left}{right}"
        ))));
    }

    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            eval_arithmetic(op, &left, &right)
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            eval_ordering(op, &left, &right)
        }
        BinaryOp::Eq => Ok(RuntimeValue::Primitive(Primitive::Bool(left == right))),
        BinaryOp::Neq => Ok(RuntimeValue::Primitive(Primitive::Bool(left != right))),
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above with short-circuiting"),
    }
}

fn eval_arithmetic(op: BinaryOp, left: &RuntimeValue, right: &RuntimeValue) -> Flow<RuntimeValue> {
    use Primitive::{Decimal, Integer};

    let result = match (left, right) {
        (RuntimeValue::Primitive(Integer(a)), RuntimeValue::Primitive(Integer(b))) => {
            Integer(integer_op(op, a, b)?)
        }
        (RuntimeValue::Primitive(Decimal(a)), RuntimeValue::Primitive(Decimal(b))) => {
            Decimal(decimal_op(op, a, b)?)
        }
        (a, b) => {
            return Err(Signal::Error(EvaluateError::new(format!(
                "cannot apply '{}' to '{}' and '{}'",
                op.as_str(),
                a.type_name(),
                b.type_name()
            ))))
        }
    };

    Ok(RuntimeValue::Primitive(result))
}

fn integer_op(op: BinaryOp, a: &BigInt, b: &BigInt) -> Flow<BigInt> {
    match op {
        BinaryOp::Add => Ok(a + b),
        BinaryOp::Sub => Ok(a - b),
        BinaryOp::Mul => Ok(a * b),
        BinaryOp::Div => {
            if b.is_zero() {
                Err(Signal::Error(EvaluateError::new("division by zero")))
            } else {
                Ok(a / b)
            }
        }
        _ => unreachable!("only arithmetic operators reach integer_op"),
    }
}

fn decimal_op(op: BinaryOp, a: &BigDecimal, b: &BigDecimal) -> Flow<BigDecimal> {
    match op {
        BinaryOp::Add => Ok(a + b),
        BinaryOp::Sub => Ok(a - b),
        BinaryOp::Mul => Ok(a * b),
        BinaryOp::Div => {
            if b.is_zero() {
                Err(Signal::Error(EvaluateError::new("division by zero")))
            } else {
                // bigdecimal's `Div` rounds to its default context precision using
                // half-even rounding, matching the banker's-rounding requirement.
                Ok(a / b)
            }
        }
        _ => unreachable!("only arithmetic operators reach decimal_op"),
    }
}

fn eval_ordering(op: BinaryOp, left: &RuntimeValue, right: &RuntimeValue) -> Flow<RuntimeValue> {
    let ordering = compare(left, right)?;
    let result = match op {
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        _ => unreachable!("only relational operators reach eval_ordering"),
    };
    Ok(RuntimeValue::Primitive(Primitive::Bool(result)))
}

fn compare(left: &RuntimeValue, right: &RuntimeValue) -> Flow<Ordering> {
    use Primitive::{Bool, Decimal, Integer, Str};

    match (left, right) {
        (RuntimeValue::Primitive(Integer(a)), RuntimeValue::Primitive(Integer(b))) => Ok(a.cmp(b)),
        (RuntimeValue::Primitive(Decimal(a)), RuntimeValue::Primitive(Decimal(b))) => Ok(a.cmp(b)),
        (RuntimeValue::Primitive(Str(a)), RuntimeValue::Primitive(Str(b))) => Ok(a.cmp(b)),
        (RuntimeValue::Primitive(Bool(a)), RuntimeValue::Primitive(Bool(b))) => Ok(a.cmp(b)),
        (a, b) => Err(Signal::Error(EvaluateError::new(format!(
            "cannot compare '{}' and '{}'",
            a.type_name(),
            b.type_name()
        )))),
    }
}

fn eval_args(args: &[Expr<()>], scope: &Scope<RuntimeValue>) -> Flow<Vec<RuntimeValue>> {
    args.iter().map(|a| eval_expr(a, scope)).collect()
}

fn eval_call(name: &str, args: &[Expr<()>], scope: &Scope<RuntimeValue>) -> Flow<RuntimeValue> {
    let args = eval_args(args, scope)?;

    let callee = scope
        .get(name)
        .ok_or_else(|| Signal::Error(EvaluateError::new(format!("undefined function '{name}'"))))?;

    call_function(&callee, &args)
}

fn eval_method_call(
    receiver: &Expr<()>,
    name: &str,
    args: &[Expr<()>],
    scope: &Scope<RuntimeValue>,
) -> Flow<RuntimeValue> {
    let receiver = eval_expr(receiver, scope)?;
    let object_scope = match &receiver {
        RuntimeValue::ObjectValue { scope, .. } => scope,
        other => {
            return Err(Signal::Error(EvaluateError::new(format!(
                "'{}' has no methods",
                other.type_name()
            ))))
        }
    };

    let callee = object_scope
        .get_current(name)
        .ok_or_else(|| Signal::Error(EvaluateError::new(format!("no member named '{name}'"))))?;

    let args = eval_args(args, scope)?;
    call_function(&callee, &args)
}

fn call_function(callee: &RuntimeValue, args: &[RuntimeValue]) -> Flow<RuntimeValue> {
    let function = match callee {
        RuntimeValue::Function(f) => f,
        other => {
            return Err(Signal::Error(EvaluateError::new(format!(
                "'{}' is not callable",
                other.type_name()
            ))))
        }
    };

    match &function.kind {
        FunctionKind::Native(native) => native(args).map_err(Signal::Error),
        FunctionKind::User(user) => call_user_function(user, args),
    }
}

fn call_user_function(function: &UserFn, args: &[RuntimeValue]) -> Flow<RuntimeValue> {
    if function.parameters.len() != args.len() {
        return Err(Signal::Error(EvaluateError::new(format!(
            "expected {} argument(s), found {}",
            function.parameters.len(),
            args.len()
        ))));
    }

    trace!("scope push (call)");
    let call_scope = function.closure.child();
    for (name, value) in function.parameters.iter().zip(args) {
        call_scope
            .define(name.clone(), value.clone())
            .map_err(EvaluateError::new)?;
    }

    let result = match eval_block(&function.body, &call_scope) {
        Ok(value) => Ok(value),
        Err(Signal::Return(value)) => Ok(value),
        Err(other) => Err(other),
    };
    trace!("scope pop (call)");
    result
}

fn make_user_function(def: &Def<()>, closure: &Scope<RuntimeValue>) -> RuntimeValue {
    RuntimeValue::Function(FunctionValue {
        name: Some(def.name.clone()),
        kind: FunctionKind::User(UserFn {
            parameters: def.parameters.clone(),
            body: Rc::new(def.body.clone()),
            closure: closure.clone(),
        }),
    })
}

fn eval_object(
    name: Option<&str>,
    fields: &[LetField<()>],
    methods: &[Def<()>],
    scope: &Scope<RuntimeValue>,
) -> Flow<RuntimeValue> {
    // Parented to the enclosing scope per §4.4: field initializers and
    // method bodies can call native functions, call other top-level `Def`s,
    // and read outer `LET` bindings. Member access on a receiver still only
    // ever reads the object's own frame (see `get_current` in eval_expr's
    // `Property` arm and in `eval_method_call`), so the member set stays
    // closed even though the frame chains up to the enclosing scope.
    let object_scope = scope.child();

    for field in fields {
        let value = match &field.value {
            Some(expr) => eval_expr(expr, &object_scope)?,
            None => RuntimeValue::nil(),
        };
        object_scope
            .define(field.name.clone(), value)
            .map_err(EvaluateError::new)?;
    }

    let this_value = RuntimeValue::ObjectValue {
        name: name.map(str::to_string),
        scope: object_scope.clone(),
    };

    for method in methods {
        let method_scope = object_scope.child();
        method_scope
            .define("this", this_value.clone())
            .map_err(EvaluateError::new)?;
        let function = make_user_function(method, &method_scope);
        object_scope
            .define(method.name.clone(), function)
            .map_err(EvaluateError::new)?;
    }

    Ok(this_value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::environment;
    use crate::lexer::Lexer;
    use crate::parser::parse;

    fn run(src: &str) -> Result<RuntimeValue, EvaluateError> {
        let tokens = Lexer::new(src).lex().expect("should lex");
        let ast = parse(tokens).expect("should parse");
        evaluate(&ast, environment::evaluator_root())
    }

    #[test]
    fn arithmetic_on_integers() {
        let result = run("1 + 2;").unwrap();
        assert_eq!(result, RuntimeValue::Primitive(Primitive::Integer(BigInt::from(3))));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(run("1 / 0;").is_err());
    }

    #[test]
    fn string_concatenation_coerces_other_operand() {
        let result = run(r#""x = " + 1;"#).unwrap();
        assert_eq!(result, RuntimeValue::Primitive(Primitive::Str("x = 1".into())));
    }

    #[test]
    fn and_short_circuits_without_evaluating_right_side() {
        // `1 / 0` would error if evaluated; FALSE AND ... must not evaluate it.
        let result = run("FALSE AND (1 / 0 == 0);").unwrap();
        assert_eq!(result, RuntimeValue::Primitive(Primitive::Bool(false)));
    }

    #[test]
    fn or_short_circuits_without_evaluating_right_side() {
        let result = run("TRUE OR (1 / 0 == 0);").unwrap();
        assert_eq!(result, RuntimeValue::Primitive(Primitive::Bool(true)));
    }

    #[test]
    fn recursive_function_computes_factorial() {
        let result = run(
            "DEF fact(n) DO
                 IF n == 0 DO RETURN 1; END
                 RETURN n * fact(n - 1);
             END
             fact(5);",
        )
        .unwrap();
        assert_eq!(
            result,
            RuntimeValue::Primitive(Primitive::Integer(BigInt::from(120)))
        );
    }

    #[test]
    fn for_loop_iterates_over_a_range() {
        let result = run(
            "LET sum = 0;
             FOR i IN range(0, 4) DO sum = sum + i; END
             sum;",
        )
        .unwrap();
        assert_eq!(result, RuntimeValue::Primitive(Primitive::Integer(BigInt::from(6))));
    }

    #[test]
    fn object_field_and_method_access() {
        let result = run(
            "LET o = OBJECT DO
                 LET n = 41;
                 DEF bump() DO RETURN this.n + 1; END
             END;
             o.bump();",
        )
        .unwrap();
        assert_eq!(result, RuntimeValue::Primitive(Primitive::Integer(BigInt::from(42))));
    }

    #[test]
    fn property_assignment_mutates_object_field() {
        let result = run(
            "LET o = OBJECT DO LET n = 1; END;
             o.n = 2;
             o.n;",
        )
        .unwrap();
        assert_eq!(result, RuntimeValue::Primitive(Primitive::Integer(BigInt::from(2))));
    }

    #[test]
    fn object_method_can_call_a_native_function() {
        let result = run(
            "LET o = OBJECT DO DEF get() DO RETURN print(1); END END;
             o.get();",
        )
        .unwrap();
        assert_eq!(result, RuntimeValue::nil());
    }

    #[test]
    fn object_field_can_reference_an_outer_binding() {
        let result = run(
            "LET base = 41;
             LET o = OBJECT DO
                 LET n = base;
                 DEF bump() DO RETURN this.n + 1; END
             END;
             o.bump();",
        )
        .unwrap();
        assert_eq!(result, RuntimeValue::Primitive(Primitive::Integer(BigInt::from(42))));
    }

    #[test]
    fn property_assignment_cannot_create_an_outer_binding_as_a_member() {
        // `x` is visible through `o`'s scope chain but is not a member of `o`,
        // so assigning through `o.x` must still fail rather than silently
        // updating the outer `x`.
        assert!(run(
            "LET x = 1;
             LET o = OBJECT DO LET n = 1; END;
             o.x = 2;"
        )
        .is_err());
    }
}
