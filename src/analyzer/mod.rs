//! AST → IR analyzer.
//!
//! Follows the teacher crate's `Typechecker` shape (one `check_*` function
//! per node kind, each returning a `TResult<T>`-style result) but visits the
//! generic `Stmt<()>`/`Expr<()>` nodes directly instead of a node-type-specific
//! tree, producing `Stmt<Type>`/`Expr<Type>` by re-annotating every `info`.
pub mod types;

use std::collections::HashSet;

use log::debug;

use crate::ast::{BinaryOp, Def, Expr, LetField, Literal, Source, Stmt};
use crate::error::AnalyzeError;
use crate::scope::Scope;
use types::{is_subtype, native_type_by_name, Type};

const RETURNS_SENTINEL: &str = "$RETURNS";

pub fn analyze(source: &Source<()>, root: Scope<Type>) -> Result<Source<Type>, AnalyzeError> {
    let mut statements = Vec::with_capacity(source.statements.len());
    for stmt in &source.statements {
        statements.push(analyze_stmt(stmt, &root)?);
    }
    Ok(Source { statements })
}

fn literal_type(literal: &Literal) -> Type {
    match literal {
        Literal::Nil => Type::Nil,
        Literal::Bool(_) => Type::Boolean,
        Literal::Integer(_) => Type::Integer,
        Literal::Decimal(_) => Type::Decimal,
        Literal::Str(_) => Type::String,
        Literal::Char(_) => Type::Character,
    }
}

fn resolve_type_name(name: &str, scope: &Scope<Type>) -> Result<Type, AnalyzeError> {
    scope
        .get(name)
        .ok_or_else(|| AnalyzeError::new(format!("unknown type '{name}'")))
}

fn require_subtype(actual: &Type, expected: &Type) -> Result<(), AnalyzeError> {
    if is_subtype(actual, expected) {
        Ok(())
    } else {
        Err(AnalyzeError::new(format!(
            "expected a subtype of '{expected}', found '{actual}'"
        )))
    }
}

fn require_equal(a: &Type, b: &Type, op: &str) -> Result<(), AnalyzeError> {
    if a == b {
        Ok(())
    } else {
        Err(AnalyzeError::new(format!(
            "operands of '{op}' have different types: '{a}' and '{b}'"
        )))
    }
}

fn analyze_stmt(stmt: &Stmt<()>, scope: &Scope<Type>) -> Result<Stmt<Type>, AnalyzeError> {
    match stmt {
        Stmt::Let {
            name,
            type_name,
            value,
            ..
        } => analyze_let(name, type_name, value.as_ref(), scope),
        Stmt::Def(def) => Ok(Stmt::Def(analyze_def(def, scope)?)),
        Stmt::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => analyze_if(cond, then_branch, else_branch, scope),
        Stmt::For {
            name,
            iterable,
            body,
            ..
        } => analyze_for(name, iterable, body, scope),
        Stmt::Return { value, .. } => analyze_return(value.as_ref(), scope),
        Stmt::Expression { expr } => Ok(Stmt::Expression {
            expr: analyze_expr(expr, scope)?,
        }),
        Stmt::Assignment { target, value, .. } => analyze_assignment(target, value, scope),
    }
}

fn analyze_let(
    name: &str,
    type_name: &Option<String>,
    value: Option<&Expr<()>>,
    scope: &Scope<Type>,
) -> Result<Stmt<Type>, AnalyzeError> {
    if scope.contains_current(name) {
        return Err(AnalyzeError::new(format!(
            "'{name}' is already defined in this scope"
        )));
    }

    let value_ir = value.map(|v| analyze_expr(v, scope)).transpose()?;

    let declared = type_name
        .as_ref()
        .map(|t| resolve_type_name(t, scope))
        .transpose()?;

    let final_type = match (&declared, &value_ir) {
        (Some(declared), Some(value_ir)) => {
            require_subtype(&value_ir.info(), declared)?;
            declared.clone()
        }
        (Some(declared), None) => declared.clone(),
        (None, Some(value_ir)) => {
            let inferred = value_ir.info();
            debug!("inferred type '{inferred}' for '{name}'");
            inferred
        }
        (None, None) => Type::Any,
    };

    scope
        .define(name.to_string(), final_type.clone())
        .map_err(AnalyzeError::new)?;

    Ok(Stmt::Let {
        name: name.to_string(),
        type_name: type_name.clone(),
        value: value_ir,
        info: final_type,
    })
}

/// Resolves a `Def`'s parameter/return type annotations and builds its
/// `Function` signature, defaulting missing annotations to `Any`.
fn def_signature(
    parameter_types: &[Option<String>],
    return_type: &Option<String>,
    scope: &Scope<Type>,
) -> Result<(Vec<Type>, Type), AnalyzeError> {
    let params = parameter_types
        .iter()
        .map(|t| match t {
            Some(name) => resolve_type_name(name, scope),
            None => Ok(Type::Any),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let returns = match return_type {
        Some(name) => resolve_type_name(name, scope)?,
        None => Type::Any,
    };

    Ok((params, returns))
}

fn check_duplicate_parameters(parameters: &[String]) -> Result<(), AnalyzeError> {
    for i in 0..parameters.len() {
        for j in (i + 1)..parameters.len() {
            if parameters[i] == parameters[j] {
                return Err(AnalyzeError::new(format!(
                    "duplicate parameter name '{}'",
                    parameters[i]
                )));
            }
        }
    }
    Ok(())
}

fn analyze_def(def: &Def<()>, scope: &Scope<Type>) -> Result<Def<Type>, AnalyzeError> {
    if scope.contains_current(&def.name) {
        return Err(AnalyzeError::new(format!(
            "'{}' is already defined in this scope",
            def.name
        )));
    }

    check_duplicate_parameters(&def.parameters)?;

    let (param_types, returns) = def_signature(&def.parameter_types, &def.return_type, scope)?;

    let function_type = Type::Function {
        params: param_types.clone(),
        returns: Box::new(returns.clone()),
    };

    scope
        .define(def.name.clone(), function_type.clone())
        .map_err(AnalyzeError::new)?;

    let body_scope = scope.child();
    for (name, ty) in def.parameters.iter().zip(&param_types) {
        body_scope
            .define(name.clone(), ty.clone())
            .map_err(AnalyzeError::new)?;
    }
    body_scope
        .define(RETURNS_SENTINEL, returns)
        .map_err(AnalyzeError::new)?;

    let body = def
        .body
        .iter()
        .map(|s| analyze_stmt(s, &body_scope))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Def {
        name: def.name.clone(),
        parameters: def.parameters.clone(),
        parameter_types: def.parameter_types.clone(),
        return_type: def.return_type.clone(),
        body,
        info: function_type,
    })
}

fn analyze_if(
    cond: &Expr<()>,
    then_branch: &[Stmt<()>],
    else_branch: &[Stmt<()>],
    scope: &Scope<Type>,
) -> Result<Stmt<Type>, AnalyzeError> {
    let cond_ir = analyze_expr(cond, scope)?;
    require_subtype(&cond_ir.info(), &Type::Boolean)?;

    let then_scope = scope.child();
    let then_branch = then_branch
        .iter()
        .map(|s| analyze_stmt(s, &then_scope))
        .collect::<Result<Vec<_>, _>>()?;

    let else_scope = scope.child();
    let else_branch = else_branch
        .iter()
        .map(|s| analyze_stmt(s, &else_scope))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Stmt::If {
        cond: cond_ir,
        then_branch,
        else_branch,
        info: Type::Nil,
    })
}

fn analyze_for(
    name: &str,
    iterable: &Expr<()>,
    body: &[Stmt<()>],
    scope: &Scope<Type>,
) -> Result<Stmt<Type>, AnalyzeError> {
    let iterable_ir = analyze_expr(iterable, scope)?;
    require_subtype(&iterable_ir.info(), &Type::Iterable)?;

    let body_scope = scope.child();
    body_scope
        .define(name.to_string(), Type::Integer)
        .map_err(AnalyzeError::new)?;

    let body = body
        .iter()
        .map(|s| analyze_stmt(s, &body_scope))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Stmt::For {
        name: name.to_string(),
        iterable: iterable_ir,
        body,
        info: Type::Nil,
    })
}

fn analyze_return(value: Option<&Expr<()>>, scope: &Scope<Type>) -> Result<Stmt<Type>, AnalyzeError> {
    let returns = scope
        .get(RETURNS_SENTINEL)
        .ok_or_else(|| AnalyzeError::new("'RETURN' outside of a function body"))?;

    let value_ir = value.map(|v| analyze_expr(v, scope)).transpose()?;
    let actual = value_ir.as_ref().map(|v| v.info()).unwrap_or(Type::Nil);

    require_subtype(&actual, &returns)?;

    Ok(Stmt::Return {
        value: value_ir,
        info: actual,
    })
}

fn analyze_assignment(
    target: &Expr<()>,
    value: &Expr<()>,
    scope: &Scope<Type>,
) -> Result<Stmt<Type>, AnalyzeError> {
    match target {
        Expr::Variable(name, ()) => {
            let var_type = scope
                .get(name)
                .ok_or_else(|| AnalyzeError::new(format!("undefined variable '{name}'")))?;

            let value_ir = analyze_expr(value, scope)?;
            require_subtype(&value_ir.info(), &var_type)?;

            Ok(Stmt::Assignment {
                target: Expr::Variable(name.clone(), var_type.clone()),
                value: value_ir,
                info: var_type,
            })
        }
        Expr::Property(receiver, name, ()) => {
            let receiver_ir = analyze_expr(receiver, scope)?;
            let member_scope = match receiver_ir.info() {
                Type::Object { scope } => scope,
                other => {
                    return Err(AnalyzeError::new(format!(
                        "cannot assign to a property of non-object type '{other}'"
                    )))
                }
            };

            let member_type = member_scope
                .get_current(name)
                .ok_or_else(|| AnalyzeError::new(format!("no member named '{name}'")))?;

            let value_ir = analyze_expr(value, scope)?;
            require_subtype(&value_ir.info(), &member_type)?;

            Ok(Stmt::Assignment {
                target: Expr::Property(Box::new(receiver_ir), name.clone(), member_type.clone()),
                value: value_ir,
                info: member_type,
            })
        }
        _ => Err(AnalyzeError::new("invalid assignment target")),
    }
}

fn analyze_expr(expr: &Expr<()>, scope: &Scope<Type>) -> Result<Expr<Type>, AnalyzeError> {
    match expr {
        Expr::Literal(literal, ()) => {
            Ok(Expr::Literal(literal.clone(), literal_type(literal)))
        }
        Expr::Group(inner, ()) => {
            let inner_ir = analyze_expr(inner, scope)?;
            let ty = inner_ir.info();
            Ok(Expr::Group(Box::new(inner_ir), ty))
        }
        Expr::Binary(op, left, right, ()) => analyze_binary(*op, left, right, scope),
        Expr::Variable(name, ()) => {
            let ty = scope
                .get(name)
                .ok_or_else(|| AnalyzeError::new(format!("undefined variable '{name}'")))?;
            Ok(Expr::Variable(name.clone(), ty))
        }
        Expr::Property(receiver, name, ()) => {
            let receiver_ir = analyze_expr(receiver, scope)?;
            let member_scope = match receiver_ir.info() {
                Type::Object { scope } => scope,
                other => {
                    return Err(AnalyzeError::new(format!(
                        "'{other}' has no properties"
                    )))
                }
            };
            let member_type = member_scope
                .get_current(name)
                .ok_or_else(|| AnalyzeError::new(format!("no member named '{name}'")))?;
            Ok(Expr::Property(Box::new(receiver_ir), name.clone(), member_type))
        }
        Expr::Function(name, args, ()) => analyze_call(name, args, scope),
        Expr::Method(receiver, name, args, ()) => analyze_method_call(receiver, name, args, scope),
        Expr::ObjectExpr {
            name,
            fields,
            methods,
            ..
        } => analyze_object(name.as_deref(), fields, methods, scope),
    }
}

fn analyze_binary(
    op: BinaryOp,
    left: &Expr<()>,
    right: &Expr<()>,
    scope: &Scope<Type>,
) -> Result<Expr<Type>, AnalyzeError> {
    let left_ir = analyze_expr(left, scope)?;
    let right_ir = analyze_expr(right, scope)?;
    let left_type = left_ir.info();
    let right_type = right_ir.info();

    let result = match op {
        BinaryOp::Add => {
            if matches!(left_type, Type::String) || matches!(right_type, Type::String) {
                require_subtype(&left_type, &Type::Equatable)?;
                require_subtype(&right_type, &Type::Equatable)?;
                Type::String
            } else {
                require_subtype(&left_type, &Type::Comparable)?;
                require_subtype(&right_type, &Type::Comparable)?;
                require_equal(&left_type, &right_type, op.as_str())?;
                left_type.clone()
            }
        }
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            require_subtype(&left_type, &Type::Comparable)?;
            require_subtype(&right_type, &Type::Comparable)?;
            require_equal(&left_type, &right_type, op.as_str())?;
            left_type.clone()
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            require_subtype(&left_type, &Type::Comparable)?;
            require_subtype(&right_type, &Type::Comparable)?;
            require_equal(&left_type, &right_type, op.as_str())?;
            Type::Boolean
        }
        BinaryOp::Eq | BinaryOp::Neq => {
            require_subtype(&left_type, &Type::Equatable)?;
            require_subtype(&right_type, &Type::Equatable)?;
            require_equal(&left_type, &right_type, op.as_str())?;
            Type::Boolean
        }
        BinaryOp::And | BinaryOp::Or => {
            require_subtype(&left_type, &Type::Boolean)?;
            require_subtype(&right_type, &Type::Boolean)?;
            Type::Boolean
        }
    };

    Ok(Expr::Binary(op, Box::new(left_ir), Box::new(right_ir), result))
}

fn analyze_args(args: &[Expr<()>], scope: &Scope<Type>) -> Result<Vec<Expr<Type>>, AnalyzeError> {
    args.iter().map(|a| analyze_expr(a, scope)).collect()
}

/// `list(...)` is the one native function with unbounded arity (see the
/// external-interfaces contract); every other callee is a fixed-arity
/// `Function` type resolved through the scope chain like any user `Def`.
fn analyze_call(name: &str, args: &[Expr<()>], scope: &Scope<Type>) -> Result<Expr<Type>, AnalyzeError> {
    if name == "list" {
        let args_ir = analyze_args(args, scope)?;
        return Ok(Expr::Function(name.to_string(), args_ir, Type::Iterable));
    }

    let fn_type = scope
        .get(name)
        .ok_or_else(|| AnalyzeError::new(format!("undefined function '{name}'")))?;

    let (params, returns) = match fn_type {
        Type::Function { params, returns } => (params, returns),
        other => return Err(AnalyzeError::new(format!("'{other}' is not callable"))),
    };

    if params.len() != args.len() {
        return Err(AnalyzeError::new(format!(
            "'{name}' expects {} argument(s), found {}",
            params.len(),
            args.len()
        )));
    }

    let args_ir = analyze_args(args, scope)?;
    for (arg_ir, param_type) in args_ir.iter().zip(&params) {
        require_subtype(&arg_ir.info(), param_type)?;
    }

    Ok(Expr::Function(name.to_string(), args_ir, *returns))
}

fn analyze_method_call(
    receiver: &Expr<()>,
    name: &str,
    args: &[Expr<()>],
    scope: &Scope<Type>,
) -> Result<Expr<Type>, AnalyzeError> {
    let receiver_ir = analyze_expr(receiver, scope)?;
    let member_scope = match receiver_ir.info() {
        Type::Object { scope } => scope,
        other => return Err(AnalyzeError::new(format!("'{other}' has no methods"))),
    };

    let member_type = member_scope
        .get_current(name)
        .ok_or_else(|| AnalyzeError::new(format!("no member named '{name}'")))?;

    let (params, returns) = match member_type {
        Type::Function { params, returns } => (params, returns),
        other => return Err(AnalyzeError::new(format!("'{other}' is not callable"))),
    };

    if params.len() != args.len() {
        return Err(AnalyzeError::new(format!(
            "'{name}' expects {} argument(s), found {}",
            params.len(),
            args.len()
        )));
    }

    let args_ir = analyze_args(args, scope)?;
    for (arg_ir, param_type) in args_ir.iter().zip(&params) {
        require_subtype(&arg_ir.info(), param_type)?;
    }

    Ok(Expr::Method(Box::new(receiver_ir), name.to_string(), args_ir, *returns))
}

fn analyze_object(
    name: Option<&str>,
    fields: &[LetField<()>],
    methods: &[Def<()>],
    scope: &Scope<Type>,
) -> Result<Expr<Type>, AnalyzeError> {
    if let Some(name) = name {
        if native_type_by_name(name).is_some() {
            return Err(AnalyzeError::new(format!(
                "object name '{name}' collides with a primitive type"
            )));
        }
    }

    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            return Err(AnalyzeError::new(format!(
                "duplicate member name '{}'",
                field.name
            )));
        }
    }
    for method in methods {
        if !seen.insert(method.name.as_str()) {
            return Err(AnalyzeError::new(format!(
                "duplicate member name '{}'",
                method.name
            )));
        }
    }

    // Parented to the enclosing scope per §4.4: field initializers and method
    // bodies can see outer `LET`/`DEF` bindings and native functions. Member
    // resolution on a receiver (`Property`/`Method`) still only ever looks at
    // the object's own frame (`get_current`), so the nominal member set stays
    // closed even though the frame itself is no longer parentless.
    let object_scope = scope.child();

    let mut field_irs = Vec::with_capacity(fields.len());
    for field in fields {
        let value_ir = field
            .value
            .as_ref()
            .map(|v| analyze_expr(v, &object_scope))
            .transpose()?;

        let declared = field
            .type_name
            .as_ref()
            .map(|t| resolve_type_name(t, scope))
            .transpose()?;

        let field_type = match (&declared, &value_ir) {
            (Some(declared), Some(value_ir)) => {
                require_subtype(&value_ir.info(), declared)?;
                declared.clone()
            }
            (Some(declared), None) => declared.clone(),
            (None, Some(value_ir)) => value_ir.info(),
            (None, None) => {
                return Err(AnalyzeError::new(format!(
                    "field '{}' needs a type annotation or an initial value",
                    field.name
                )))
            }
        };

        object_scope
            .define(field.name.clone(), field_type.clone())
            .map_err(AnalyzeError::new)?;

        field_irs.push(LetField {
            name: field.name.clone(),
            type_name: field.type_name.clone(),
            value: value_ir,
            info: field_type,
        });
    }

    let mut method_signatures = Vec::with_capacity(methods.len());
    for method in methods {
        check_duplicate_parameters(&method.parameters)?;

        if method.parameter_types.iter().any(Option::is_none) {
            return Err(AnalyzeError::new(format!(
                "method '{}' parameters require explicit types",
                method.name
            )));
        }

        let (params, returns) = def_signature(&method.parameter_types, &method.return_type, scope)?;
        let function_type = Type::Function {
            params,
            returns: Box::new(returns),
        };
        object_scope
            .define(method.name.clone(), function_type.clone())
            .map_err(AnalyzeError::new)?;
        method_signatures.push(function_type);
    }

    let object_type = Type::Object {
        scope: object_scope.clone(),
    };

    let mut method_irs = Vec::with_capacity(methods.len());
    for (method, function_type) in methods.iter().zip(&method_signatures) {
        let (params, returns) = match function_type {
            Type::Function { params, returns } => (params.clone(), (**returns).clone()),
            _ => unreachable!("method_signatures only ever holds Function types"),
        };

        let body_scope = object_scope.child();
        body_scope
            .define("this", object_type.clone())
            .map_err(AnalyzeError::new)?;
        for (param_name, param_type) in method.parameters.iter().zip(&params) {
            body_scope
                .define(param_name.clone(), param_type.clone())
                .map_err(AnalyzeError::new)?;
        }
        body_scope
            .define(RETURNS_SENTINEL, returns)
            .map_err(AnalyzeError::new)?;

        let body = method
            .body
            .iter()
            .map(|s| analyze_stmt(s, &body_scope))
            .collect::<Result<Vec<_>, _>>()?;

        method_irs.push(Def {
            name: method.name.clone(),
            parameters: method.parameters.clone(),
            parameter_types: method.parameter_types.clone(),
            return_type: method.return_type.clone(),
            body,
            info: function_type.clone(),
        });
    }

    Ok(Expr::ObjectExpr {
        name: name.map(str::to_string),
        fields: field_irs,
        methods: method_irs,
        info: object_type,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::parse;

    fn analyze_str(src: &str) -> Result<Source<Type>, AnalyzeError> {
        let tokens = Lexer::new(src).lex().expect("should lex");
        let ast = parse(tokens).expect("should parse");
        analyze(&ast, crate::environment::analyzer_root())
    }

    #[test]
    fn let_infers_type_from_value() {
        let ir = analyze_str("LET x = 1;").unwrap();
        match &ir.statements[0] {
            Stmt::Let { info, .. } => assert_eq!(*info, Type::Integer),
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn let_rejects_mismatched_annotation() {
        assert!(analyze_str("LET x: Integer = \"s\";").is_err());
    }

    #[test]
    fn def_allows_recursion() {
        let ir = analyze_str("DEF fact(n: Integer): Integer DO RETURN fact(n); END").unwrap();
        assert_eq!(ir.statements.len(), 1);
    }

    #[test]
    fn def_rejects_duplicate_parameters() {
        assert!(analyze_str("DEF f(a, a) DO RETURN a; END").is_err());
    }

    #[test]
    fn if_condition_must_be_boolean() {
        assert!(analyze_str("IF 1 DO RETURN; END").is_err());
    }

    #[test]
    fn return_outside_function_is_rejected() {
        assert!(analyze_str("RETURN 1;").is_err());
    }

    #[test]
    fn return_checks_against_returns_sentinel() {
        assert!(analyze_str("DEF f(): Decimal DO RETURN \"x\"; END").is_err());
    }

    #[test]
    fn property_type_resolves_to_member_type_not_string() {
        let ir = analyze_str(
            "LET o = OBJECT DO LET n: Integer = 1; END;
             LET x = o.n;",
        )
        .unwrap();
        match &ir.statements[1] {
            Stmt::Let { info, .. } => assert_eq!(*info, Type::Integer),
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn object_name_cannot_collide_with_primitive_type() {
        assert!(analyze_str("LET o = OBJECT Integer DO LET x = 1; END;").is_err());
    }

    #[test]
    fn object_duplicate_member_name_is_rejected() {
        assert!(analyze_str(
            "LET o = OBJECT DO LET x = 1; DEF x() DO RETURN 1; END END;"
        )
        .is_err());
    }

    #[test]
    fn object_method_this_binds_object_type() {
        let ir = analyze_str(
            "LET o = OBJECT DO
                 LET n: Integer = 1;
                 DEF get(): Integer DO RETURN this.n; END
             END;",
        )
        .unwrap();
        assert_eq!(ir.statements.len(), 1);
    }

    #[test]
    fn string_concatenation_allows_mixed_equatable_operands() {
        let ir = analyze_str("LET s = \"a\" + 1;").unwrap();
        match &ir.statements[0] {
            Stmt::Let { info, .. } => assert_eq!(*info, Type::String),
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn arithmetic_requires_matching_operand_types() {
        assert!(analyze_str("LET x = 1 + 1.5;").is_err());
    }

    #[test]
    fn object_method_can_call_a_native_function() {
        analyze_str(
            "LET o = OBJECT DO DEF get(): Nil DO RETURN print(1); END END;
             o.get();",
        )
        .unwrap();
    }

    #[test]
    fn object_field_can_reference_an_outer_binding() {
        let ir = analyze_str(
            "LET base: Integer = 1;
             LET o = OBJECT DO LET n = base; END;",
        )
        .unwrap();
        match &ir.statements[1] {
            Stmt::Let { info, .. } => match info {
                Type::Object { scope } => {
                    assert_eq!(scope.get_current("n"), Some(Type::Integer))
                }
                other => panic!("expected Object, got {other:?}"),
            },
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn member_lookup_does_not_leak_into_the_enclosing_scope() {
        // `x` is visible to `o`'s scope chain (as an outer binding) but is
        // not a member of `o`, so `o.x` must still fail to resolve.
        assert!(analyze_str(
            "LET x = 1;
             LET o = OBJECT DO LET n = 1; END;
             o.x;"
        )
        .is_err());
    }
}
