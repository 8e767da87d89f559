//! IR → host-language text buffer.
//!
//! Retargets the teacher crate's `Compiler` (`src/compiler/mod.rs`: a struct
//! that walks a scope and writes sections via `write_*` methods) from x86
//! assembly to a single text buffer holding a syntactically valid Java-like
//! program, using an indent-tracking writer in place of the teacher's
//! `File::write_all` calls.
use log::debug;

use crate::analyzer::types::Type;
use crate::ast::{BinaryOp, Def, Expr, LetField, Literal, Source, Stmt};
use crate::error::AssertionError;

struct Generator {
    buffer: String,
    indent: usize,
}

impl Generator {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            indent: 0,
        }
    }

    fn write_line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.buffer.push_str("    ");
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }
}

pub fn generate(ir: &Source<Type>) -> Result<String, AssertionError> {
    let mut gen = Generator::new();

    gen.write_line("import java.math.BigInteger;");
    gen.write_line("import java.math.BigDecimal;");
    gen.write_line("import java.math.RoundingMode;");
    gen.write_line("import java.util.Objects;");
    gen.write_line("import java.util.List;");
    gen.write_line("import java.util.ArrayList;");
    gen.write_line("import java.util.Arrays;");
    gen.write_line("");
    write_natives_helper(&mut gen);
    gen.write_line("");
    gen.write_line("public class Main {");
    gen.indent += 1;

    let mut switched = false;
    let mut main_stmts = vec![];

    for stmt in &ir.statements {
        if !switched && matches!(stmt, Stmt::Let { .. } | Stmt::Def(_)) {
            write_hoisted(&mut gen, stmt)?;
        } else {
            switched = true;
            main_stmts.push(stmt);
        }
    }

    gen.write_line("public static void main(String[] args) {");
    gen.indent += 1;
    for stmt in main_stmts {
        write_stmt(&mut gen, stmt)?;
    }
    gen.indent -= 1;
    gen.write_line("}");

    gen.indent -= 1;
    gen.write_line("}");

    Ok(gen.buffer)
}

fn write_natives_helper(gen: &mut Generator) {
    gen.write_line("final class Natives {");
    gen.indent += 1;
    gen.write_line("static Object debug(Object x) { System.out.println(x); return null; }");
    gen.write_line("static Object print(Object x) { System.out.println(x); return null; }");
    gen.write_line(
        "static Object log(Object x) { System.out.println(\"log: \" + x); return x; }",
    );
    gen.write_line("static List<Object> list(Object... xs) { return Arrays.asList(xs); }");
    gen.write_line("static List<BigInteger> range(BigInteger a, BigInteger b) {");
    gen.indent += 1;
    gen.write_line("if (a.compareTo(b) > 0) throw new IllegalArgumentException(\"range requires a <= b\");");
    gen.write_line("List<BigInteger> result = new ArrayList<>();");
    gen.write_line("for (BigInteger i = a; i.compareTo(b) < 0; i = i.add(BigInteger.ONE)) result.add(i);");
    gen.write_line("return result;");
    gen.indent -= 1;
    gen.write_line("}");
    gen.indent -= 1;
    gen.write_line("}");
}

/// Maps the IR's closed type lattice onto Java types; everything that isn't
/// a concrete primitive (`Any`, `Equatable`, `Comparable`, `Iterable`,
/// `Object`, `Function`, `Nil`) degrades to `Object`, the natural top type.
fn java_type(ty: &Type) -> String {
    match ty {
        Type::Boolean => "boolean".to_string(),
        Type::Integer => "BigInteger".to_string(),
        Type::Decimal => "BigDecimal".to_string(),
        Type::String => "String".to_string(),
        Type::Character => "char".to_string(),
        Type::Nil
        | Type::Any
        | Type::Equatable
        | Type::Comparable
        | Type::Iterable
        | Type::Function { .. }
        | Type::Object { .. } => "Object".to_string(),
    }
}

fn escape_java_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn literal_java(literal: &Literal) -> String {
    match literal {
        Literal::Nil => "null".to_string(),
        Literal::Bool(b) => b.to_string(),
        Literal::Integer(i) => format!("new BigInteger(\"{i}\")"),
        Literal::Decimal(d) => format!("new BigDecimal(\"{d}\")"),
        Literal::Str(s) => format!("\"{}\"", escape_java_string(s)),
        Literal::Char(c) => format!("'{c}'"),
    }
}

const NATIVE_FUNCTIONS: &[&str] = &["debug", "print", "log", "list", "range"];

fn expr_java(expr: &Expr<Type>) -> Result<String, AssertionError> {
    match expr {
        Expr::Literal(literal, _) => Ok(literal_java(literal)),
        Expr::Group(inner, _) => Ok(format!("({})", expr_java(inner)?)),
        Expr::Binary(op, left, right, _) => binary_java(*op, left, right),
        Expr::Variable(name, _) => Ok(name.clone()),
        Expr::Property(receiver, name, _) => Ok(format!("{}.{}", expr_java(receiver)?, name)),
        Expr::Function(name, args, _) => {
            let args = args
                .iter()
                .map(expr_java)
                .collect::<Result<Vec<_>, _>>()?
                .join(", ");
            if NATIVE_FUNCTIONS.contains(&name.as_str()) {
                Ok(format!("Natives.{name}({args})"))
            } else {
                Ok(format!("{name}({args})"))
            }
        }
        Expr::Method(receiver, name, args, _) => {
            let args = args
                .iter()
                .map(expr_java)
                .collect::<Result<Vec<_>, _>>()?
                .join(", ");
            Ok(format!("{}.{}({args})", expr_java(receiver)?, name))
        }
        Expr::ObjectExpr {
            fields, methods, ..
        } => object_expr_java(fields, methods),
    }
}

fn binary_java(op: BinaryOp, left: &Expr<Type>, right: &Expr<Type>) -> Result<String, AssertionError> {
    let left_type = left.info();
    let right_type = right.info();
    let left_java = expr_java(left)?;
    let right_java = expr_java(right)?;

    if matches!(op, BinaryOp::Add) && (left_type == Type::String || right_type == Type::String) {
        return Ok(format!("({left_java} + {right_java})"));
    }

    Ok(match op {
        BinaryOp::Add => format!("{left_java}.add({right_java})"),
        BinaryOp::Sub => format!("{left_java}.subtract({right_java})"),
        BinaryOp::Mul => format!("{left_java}.multiply({right_java})"),
        BinaryOp::Div => match left_type {
            Type::Decimal => format!("{left_java}.divide({right_java}, RoundingMode.HALF_EVEN)"),
            _ => format!("{left_java}.divide({right_java})"),
        },
        BinaryOp::Lt => format!("({left_java}.compareTo({right_java}) < 0)"),
        BinaryOp::Le => format!("({left_java}.compareTo({right_java}) <= 0)"),
        BinaryOp::Gt => format!("({left_java}.compareTo({right_java}) > 0)"),
        BinaryOp::Ge => format!("({left_java}.compareTo({right_java}) >= 0)"),
        BinaryOp::Eq => format!("Objects.equals({left_java}, {right_java})"),
        BinaryOp::Neq => format!("!Objects.equals({left_java}, {right_java})"),
        BinaryOp::And => {
            // `false AND e` must short-circuit like the source language does;
            // Java's `&&` already does, but `OR` binds looser so a literal
            // `(a OR b) AND c` needs its left side parenthesized to survive
            // translation into `&&`/`||`.
            let left_java = if matches!(left, Expr::Binary(BinaryOp::Or, ..)) {
                format!("({left_java})")
            } else {
                left_java
            };
            format!("({left_java} && {right_java})")
        }
        BinaryOp::Or => format!("({left_java} || {right_java})"),
    })
}

fn object_expr_java(fields: &[LetField<Type>], methods: &[Def<Type>]) -> Result<String, AssertionError> {
    let mut body = Generator::new();
    body.indent = 0;

    body.write_line("new Object() {");
    body.indent += 1;
    for field in fields {
        let value = match &field.value {
            Some(expr) => expr_java(expr)?,
            None => "null".to_string(),
        };
        body.write_line(&format!("{} {} = {value};", java_type(&field.info), field.name));
    }
    for method in methods {
        write_def(&mut body, method)?;
    }
    body.indent -= 1;
    body.write_line("}");

    Ok(body.buffer.trim_end().to_string())
}

fn write_def(gen: &mut Generator, def: &Def<Type>) -> Result<(), AssertionError> {
    let (params, returns) = match &def.info {
        Type::Function { params, returns } => (params.clone(), (**returns).clone()),
        _ => (vec![Type::Any; def.parameters.len()], Type::Any),
    };

    let params_java = def
        .parameters
        .iter()
        .zip(&params)
        .map(|(name, ty)| format!("{} {name}", java_type(ty)))
        .collect::<Vec<_>>()
        .join(", ");

    gen.write_line(&format!(
        "{} {}({params_java}) {{",
        java_type(&returns),
        def.name
    ));
    gen.indent += 1;
    for stmt in &def.body {
        write_stmt(gen, stmt)?;
    }
    gen.indent -= 1;
    gen.write_line("}");
    Ok(())
}

fn write_hoisted(gen: &mut Generator, stmt: &Stmt<Type>) -> Result<(), AssertionError> {
    match stmt {
        Stmt::Let { name, value, info, .. } => {
            if matches!(info, Type::Function { .. }) {
                return Err(AssertionError::new(format!(
                    "cannot hoist function-valued top-level binding '{name}'"
                )));
            }
            let value = match value {
                Some(expr) => expr_java(expr)?,
                None => "null".to_string(),
            };
            debug!("hoisting top-level let '{name}' as a static field");
            gen.write_line(&format!("static {} {name} = {value};", java_type(info)));
            Ok(())
        }
        Stmt::Def(def) => {
            debug!("hoisting top-level def '{}' as a static method", def.name);
            write_static_def(gen, def)
        }
        _ => unreachable!("only Let/Def are ever passed to write_hoisted"),
    }
}

fn write_static_def(gen: &mut Generator, def: &Def<Type>) -> Result<(), AssertionError> {
    let (params, returns) = match &def.info {
        Type::Function { params, returns } => (params.clone(), (**returns).clone()),
        _ => (vec![Type::Any; def.parameters.len()], Type::Any),
    };

    let params_java = def
        .parameters
        .iter()
        .zip(&params)
        .map(|(name, ty)| format!("{} {name}", java_type(ty)))
        .collect::<Vec<_>>()
        .join(", ");

    gen.write_line(&format!(
        "static {} {}({params_java}) {{",
        java_type(&returns),
        def.name
    ));
    gen.indent += 1;
    for stmt in &def.body {
        write_stmt(gen, stmt)?;
    }
    gen.indent -= 1;
    gen.write_line("}");
    Ok(())
}

fn write_stmt(gen: &mut Generator, stmt: &Stmt<Type>) -> Result<(), AssertionError> {
    match stmt {
        Stmt::Let { name, value, info, .. } => {
            let value = match value {
                Some(expr) => expr_java(expr)?,
                None => "null".to_string(),
            };
            gen.write_line(&format!("{} {name} = {value};", java_type(info)));
            Ok(())
        }
        Stmt::Def(_) => Err(AssertionError::new(
            "nested function definitions are not supported by the generator target",
        )),
        Stmt::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => {
            gen.write_line(&format!("if ({}) {{", expr_java(cond)?));
            gen.indent += 1;
            for stmt in then_branch {
                write_stmt(gen, stmt)?;
            }
            gen.indent -= 1;
            if else_branch.is_empty() {
                gen.write_line("}");
            } else {
                gen.write_line("} else {");
                gen.indent += 1;
                for stmt in else_branch {
                    write_stmt(gen, stmt)?;
                }
                gen.indent -= 1;
                gen.write_line("}");
            }
            Ok(())
        }
        Stmt::For {
            name,
            iterable,
            body,
            ..
        } => {
            gen.write_line(&format!(
                "for (BigInteger {name} : (List<BigInteger>)(List<?>) {}) {{",
                expr_java(iterable)?
            ));
            gen.indent += 1;
            for stmt in body {
                write_stmt(gen, stmt)?;
            }
            gen.indent -= 1;
            gen.write_line("}");
            Ok(())
        }
        Stmt::Return { value, .. } => {
            match value {
                Some(expr) => gen.write_line(&format!("return {};", expr_java(expr)?)),
                None => gen.write_line("return;"),
            }
            Ok(())
        }
        Stmt::Expression { expr } => {
            gen.write_line(&format!("{};", expr_java(expr)?));
            Ok(())
        }
        Stmt::Assignment { target, value, .. } => {
            gen.write_line(&format!("{} = {};", expr_java(target)?, expr_java(value)?));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::environment;
    use crate::lexer::Lexer;
    use crate::parser::parse;

    fn generate_str(src: &str) -> String {
        let tokens = Lexer::new(src).lex().expect("should lex");
        let ast = parse(tokens).expect("should parse");
        let ir = analyze(&ast, environment::analyzer_root()).expect("should analyze");
        generate(&ir).expect("should generate")
    }

    #[test]
    fn hoists_top_level_let_as_static_field() {
        let out = generate_str("LET x = 1; print(x);");
        assert!(out.contains("static BigInteger x = new BigInteger(\"1\");"));
        assert!(out.contains("public static void main"));
        assert!(out.contains("Natives.print(x);"));
    }

    #[test]
    fn hoists_top_level_def_as_static_method() {
        let out = generate_str("DEF double(n: Integer): Integer DO RETURN n * 2; END double(2);");
        assert!(out.contains("static BigInteger double(BigInteger n) {"));
        assert!(out.contains("return n.multiply(new BigInteger(\"2\"));"));
    }

    #[test]
    fn decimal_division_uses_half_even_rounding_mode() {
        let out = generate_str("LET x = 1.0 / 3.0;");
        assert!(out.contains("RoundingMode.HALF_EVEN"));
    }

    #[test]
    fn relational_operators_use_compare_to() {
        let out = generate_str("LET b = 1 < 2;");
        assert!(out.contains(".compareTo("));
    }

    #[test]
    fn equality_uses_objects_equals() {
        let out = generate_str("LET b = 1 == 1;");
        assert!(out.contains("Objects.equals("));
    }

    #[test]
    fn string_concatenation_stays_a_native_plus() {
        let out = generate_str(r#"LET s = "a" + "b";"#);
        assert!(out.contains("(\"a\" + \"b\")"));
    }

    #[test]
    fn function_valued_top_level_let_cannot_be_hoisted() {
        let tokens = Lexer::new("DEF f() DO RETURN 1; END LET g = f;")
            .lex()
            .unwrap();
        let ast = parse(tokens).unwrap();
        let ir = analyze(&ast, environment::analyzer_root()).unwrap();
        assert!(generate(&ir).is_err());
    }

    #[test]
    fn statement_after_first_non_declaration_switches_to_main() {
        let out = generate_str("LET x = 1; print(x); LET y = 2;");
        // `y` is declared after execution already started, so it's a local
        // variable inside `main`, not a hoisted static field.
        assert!(!out.contains("static BigInteger y"));
        assert!(out.contains("BigInteger y = new BigInteger(\"2\");"));
    }
}
