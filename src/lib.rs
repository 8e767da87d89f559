//! Lexer, parser, analyzer, tree-walking evaluator and transpiler backend.
//!
//! The five stages are independent and composable: `lex` → `parse` →
//! `analyze`/`evaluate` → `generate`. Each stage's root scope (for `analyze`
//! and `evaluate`) is assembled by [`environment`], not read from
//! configuration — there is no file format or wire protocol anywhere in this
//! crate.
pub mod analyzer;
pub mod ast;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod token;
pub mod value;

use analyzer::types::Type;
use ast::Source;
use error::{AnalyzeError, AssertionError, EvaluateError, LexError, ParseError};
use scope::Scope;
use token::Token;
use value::RuntimeValue;

pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    lexer::Lexer::new(source).lex()
}

pub fn parse(tokens: Vec<Token>) -> Result<Source<()>, ParseError> {
    parser::parse(tokens)
}

pub fn analyze(source: &Source<()>, root: Scope<Type>) -> Result<Source<Type>, AnalyzeError> {
    analyzer::analyze(source, root)
}

pub fn evaluate(
    source: &Source<()>,
    root: Scope<RuntimeValue>,
) -> Result<RuntimeValue, EvaluateError> {
    evaluator::evaluate(source, root)
}

pub fn generate(ir: &Source<Type>) -> Result<String, AssertionError> {
    generator::generate(ir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_pipeline_lex_parse_evaluate() {
        let tokens = lex("LET x = 1 + 2; x;").unwrap();
        let ast = parse(tokens).unwrap();
        let result = evaluate(&ast, environment::evaluator_root()).unwrap();
        assert_eq!(result.to_string(), "3");
    }

    #[test]
    fn full_pipeline_lex_parse_analyze_generate() {
        let tokens = lex("LET x = 1; print(x);").unwrap();
        let ast = parse(tokens).unwrap();
        let ir = analyze(&ast, environment::analyzer_root()).unwrap();
        let code = generate(&ir).unwrap();
        assert!(code.contains("public class Main"));
    }

    #[test]
    fn analyze_rejects_string_where_decimal_expected() {
        let tokens = lex("DEF f(): Decimal DO RETURN \"x\"; END").unwrap();
        let ast = parse(tokens).unwrap();
        assert!(analyze(&ast, environment::analyzer_root()).is_err());
    }

    #[test]
    fn evaluate_division_by_zero_is_an_error() {
        let tokens = lex("1 / 0;").unwrap();
        let ast = parse(tokens).unwrap();
        assert!(evaluate(&ast, environment::evaluator_root()).is_err());
    }
}
