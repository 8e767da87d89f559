//! Recursive-descent parser.
//!
//! The token cursor generalizes the teacher crate's `Tokens<T>` (`peek`,
//! `next`, index get/set) into a `peek`/`match_token` pair that matches
//! either a token *kind* or a literal *text*, since this grammar's keywords
//! are reserved identifiers rather than their own token kind.
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::ast::{BinaryOp, Def, Expr, LetField, Source, Stmt};
use crate::error::ParseError;
use crate::token::{Token, TokenKind};

#[derive(Clone, Copy)]
enum Pattern {
    Kind(TokenKind),
    Text(&'static str),
}

impl Pattern {
    fn matches(self, token: &Token) -> bool {
        match self {
            Pattern::Kind(kind) => token.kind == kind,
            Pattern::Text(text) => token.literal == text,
        }
    }
}

struct Cursor {
    tokens: Vec<Token>,
    index: usize,
}

impl Cursor {
    fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.index + offset)
    }

    fn current(&self) -> Option<&Token> {
        self.peek(0)
    }

    fn position(&self) -> (usize, usize) {
        self.current()
            .map(|t| t.position)
            .unwrap_or_else(|| self.tokens.last().map(|t| t.position).unwrap_or((1, 1)))
    }

    fn is(&self, pattern: Pattern) -> bool {
        self.current().is_some_and(|t| pattern.matches(t))
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.current().cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn match_token(&mut self, pattern: Pattern) -> Option<Token> {
        if self.is(pattern) {
            self.advance()
        } else {
            None
        }
    }

    fn expect(&mut self, pattern: Pattern, what: &str) -> Result<Token, ParseError> {
        self.match_token(pattern)
            .ok_or_else(|| ParseError::at(format!("expected {what}"), self.position()))
    }

    fn expect_text(&mut self, text: &'static str) -> Result<Token, ParseError> {
        self.expect(Pattern::Text(text), &format!("'{text}'"))
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        Ok(self
            .expect(Pattern::Kind(TokenKind::Identifier), "an identifier")?
            .literal)
    }
}

pub fn parse(tokens: Vec<Token>) -> Result<Source<()>, ParseError> {
    let mut cursor = Cursor { tokens, index: 0 };
    let mut statements = vec![];

    while cursor.current().is_some() {
        statements.push(parse_stmt(&mut cursor)?);
    }

    Ok(Source { statements })
}

fn at_block_end(cursor: &Cursor) -> bool {
    cursor.current().is_none()
        || cursor.is(Pattern::Text("END"))
        || cursor.is(Pattern::Text("ELSE"))
}

fn parse_block(cursor: &mut Cursor) -> Result<Vec<Stmt<()>>, ParseError> {
    let mut statements = vec![];
    while !at_block_end(cursor) {
        statements.push(parse_stmt(cursor)?);
    }
    Ok(statements)
}

fn parse_stmt(cursor: &mut Cursor) -> Result<Stmt<()>, ParseError> {
    if cursor.is(Pattern::Text("LET")) {
        parse_let(cursor)
    } else if cursor.is(Pattern::Text("DEF")) {
        Ok(Stmt::Def(parse_def(cursor)?))
    } else if cursor.is(Pattern::Text("IF")) {
        parse_if(cursor)
    } else if cursor.is(Pattern::Text("FOR")) {
        parse_for(cursor)
    } else if cursor.is(Pattern::Text("RETURN")) {
        parse_return(cursor)
    } else {
        parse_expr_or_assign(cursor)
    }
}

fn parse_let(cursor: &mut Cursor) -> Result<Stmt<()>, ParseError> {
    cursor.expect_text("LET")?;
    let name = cursor.expect_ident()?;

    let type_name = if cursor.match_token(Pattern::Text(":")).is_some() {
        Some(cursor.expect_ident()?)
    } else {
        None
    };

    let value = if cursor.match_token(Pattern::Text("=")).is_some() {
        Some(parse_expr(cursor)?)
    } else {
        None
    };

    cursor.expect_text(";")?;

    Ok(Stmt::Let {
        name,
        type_name,
        value,
        info: (),
    })
}

fn parse_let_field(cursor: &mut Cursor) -> Result<LetField<()>, ParseError> {
    cursor.expect_text("LET")?;
    let name = cursor.expect_ident()?;

    let type_name = if cursor.match_token(Pattern::Text(":")).is_some() {
        Some(cursor.expect_ident()?)
    } else {
        None
    };

    let value = if cursor.match_token(Pattern::Text("=")).is_some() {
        Some(parse_expr(cursor)?)
    } else {
        None
    };

    cursor.expect_text(";")?;

    Ok(LetField {
        name,
        type_name,
        value,
        info: (),
    })
}

fn parse_def(cursor: &mut Cursor) -> Result<Def<()>, ParseError> {
    cursor.expect_text("DEF")?;
    let name = cursor.expect_ident()?;

    cursor.expect_text("(")?;
    let mut parameters = vec![];
    let mut parameter_types = vec![];
    if !cursor.is(Pattern::Text(")")) {
        loop {
            parameters.push(cursor.expect_ident()?);
            let param_type = if cursor.match_token(Pattern::Text(":")).is_some() {
                Some(cursor.expect_ident()?)
            } else {
                None
            };
            parameter_types.push(param_type);
            if cursor.match_token(Pattern::Text(",")).is_none() {
                break;
            }
        }
    }
    cursor.expect_text(")")?;

    let return_type = if cursor.match_token(Pattern::Text(":")).is_some() {
        Some(cursor.expect_ident()?)
    } else {
        None
    };

    cursor.expect_text("DO")?;
    let body = parse_block(cursor)?;
    cursor.expect_text("END")?;

    Ok(Def {
        name,
        parameters,
        parameter_types,
        return_type,
        body,
        info: (),
    })
}

fn parse_if(cursor: &mut Cursor) -> Result<Stmt<()>, ParseError> {
    cursor.expect_text("IF")?;
    let cond = parse_expr(cursor)?;
    cursor.expect_text("DO")?;
    let then_branch = parse_block(cursor)?;

    let else_branch = if cursor.match_token(Pattern::Text("ELSE")).is_some() {
        parse_block(cursor)?
    } else {
        vec![]
    };

    cursor.expect_text("END")?;

    Ok(Stmt::If {
        cond,
        then_branch,
        else_branch,
        info: (),
    })
}

fn parse_for(cursor: &mut Cursor) -> Result<Stmt<()>, ParseError> {
    cursor.expect_text("FOR")?;
    let name = cursor.expect_ident()?;
    cursor.expect_text("IN")?;
    let iterable = parse_expr(cursor)?;
    cursor.expect_text("DO")?;
    let body = parse_block(cursor)?;
    cursor.expect_text("END")?;

    Ok(Stmt::For {
        name,
        iterable,
        body,
        info: (),
    })
}

fn parse_return(cursor: &mut Cursor) -> Result<Stmt<()>, ParseError> {
    cursor.expect_text("RETURN")?;
    let value = if cursor.is(Pattern::Text(";")) {
        None
    } else {
        Some(parse_expr(cursor)?)
    };
    cursor.expect_text(";")?;

    Ok(Stmt::Return { value, info: () })
}

fn parse_expr_or_assign(cursor: &mut Cursor) -> Result<Stmt<()>, ParseError> {
    let expr = parse_expr(cursor)?;

    let stmt = if cursor.match_token(Pattern::Text("=")).is_some() {
        let value = parse_expr(cursor)?;
        Stmt::Assignment {
            target: expr,
            value,
            info: (),
        }
    } else {
        Stmt::Expression { expr }
    };

    cursor.expect_text(";")?;

    Ok(stmt)
}

fn parse_expr(cursor: &mut Cursor) -> Result<Expr<()>, ParseError> {
    parse_logical(cursor)
}

fn parse_logical(cursor: &mut Cursor) -> Result<Expr<()>, ParseError> {
    let mut left = parse_comparison(cursor)?;

    loop {
        let op = if cursor.is(Pattern::Text("AND")) {
            BinaryOp::And
        } else if cursor.is(Pattern::Text("OR")) {
            BinaryOp::Or
        } else {
            break;
        };
        cursor.advance();
        let right = parse_comparison(cursor)?;
        left = Expr::Binary(op, Box::new(left), Box::new(right), ());
    }

    Ok(left)
}

fn parse_comparison(cursor: &mut Cursor) -> Result<Expr<()>, ParseError> {
    let mut left = parse_additive(cursor)?;

    loop {
        let op = if cursor.is(Pattern::Text("==")) {
            BinaryOp::Eq
        } else if cursor.is(Pattern::Text("!=")) {
            BinaryOp::Neq
        } else if cursor.is(Pattern::Text("<=")) {
            BinaryOp::Le
        } else if cursor.is(Pattern::Text("<")) {
            BinaryOp::Lt
        } else if cursor.is(Pattern::Text(">=")) {
            BinaryOp::Ge
        } else if cursor.is(Pattern::Text(">")) {
            BinaryOp::Gt
        } else {
            break;
        };
        cursor.advance();
        let right = parse_additive(cursor)?;
        left = Expr::Binary(op, Box::new(left), Box::new(right), ());
    }

    Ok(left)
}

fn parse_additive(cursor: &mut Cursor) -> Result<Expr<()>, ParseError> {
    let mut left = parse_multiplicative(cursor)?;

    loop {
        let op = if cursor.is(Pattern::Text("+")) {
            BinaryOp::Add
        } else if cursor.is(Pattern::Text("-")) {
            BinaryOp::Sub
        } else {
            break;
        };
        cursor.advance();
        let right = parse_multiplicative(cursor)?;
        left = Expr::Binary(op, Box::new(left), Box::new(right), ());
    }

    Ok(left)
}

fn parse_multiplicative(cursor: &mut Cursor) -> Result<Expr<()>, ParseError> {
    let mut left = parse_secondary(cursor)?;

    loop {
        let op = if cursor.is(Pattern::Text("*")) {
            BinaryOp::Mul
        } else if cursor.is(Pattern::Text("/")) {
            BinaryOp::Div
        } else {
            break;
        };
        cursor.advance();
        let right = parse_secondary(cursor)?;
        left = Expr::Binary(op, Box::new(left), Box::new(right), ());
    }

    Ok(left)
}

fn parse_secondary(cursor: &mut Cursor) -> Result<Expr<()>, ParseError> {
    let mut expr = parse_primary(cursor)?;

    while cursor.match_token(Pattern::Text(".")).is_some() {
        let name = cursor.expect_ident()?;

        if cursor.match_token(Pattern::Text("(")).is_some() {
            let args = parse_args(cursor)?;
            expr = Expr::Method(Box::new(expr), name, args, ());
        } else {
            expr = Expr::Property(Box::new(expr), name, ());
        }
    }

    Ok(expr)
}

fn parse_args(cursor: &mut Cursor) -> Result<Vec<Expr<()>>, ParseError> {
    let mut args = vec![];
    if !cursor.is(Pattern::Text(")")) {
        loop {
            args.push(parse_expr(cursor)?);
            if cursor.match_token(Pattern::Text(",")).is_none() {
                break;
            }
        }
    }
    cursor.expect_text(")")?;
    Ok(args)
}

fn parse_primary(cursor: &mut Cursor) -> Result<Expr<()>, ParseError> {
    let position = cursor.position();

    if let Some(token) = cursor.match_token(Pattern::Kind(TokenKind::Integer)) {
        let value = BigInt::from_str(&token.literal)
            .map_err(|_| ParseError::at("malformed integer literal", position))?;
        return Ok(Expr::Literal(crate::ast::Literal::Integer(value), ()));
    }

    if let Some(token) = cursor.match_token(Pattern::Kind(TokenKind::Decimal)) {
        let value = BigDecimal::from_str(&token.literal)
            .map_err(|_| ParseError::at("malformed decimal literal", position))?;
        return Ok(Expr::Literal(crate::ast::Literal::Decimal(value), ()));
    }

    if let Some(token) = cursor.match_token(Pattern::Kind(TokenKind::String)) {
        let value = decode_string_literal(&token.literal, position)?;
        return Ok(Expr::Literal(crate::ast::Literal::Str(value), ()));
    }

    if let Some(token) = cursor.match_token(Pattern::Kind(TokenKind::Character)) {
        let value = decode_character_literal(&token.literal, position)?;
        return Ok(Expr::Literal(crate::ast::Literal::Char(value), ()));
    }

    if cursor.match_token(Pattern::Text("TRUE")).is_some() {
        return Ok(Expr::Literal(crate::ast::Literal::Bool(true), ()));
    }

    if cursor.match_token(Pattern::Text("FALSE")).is_some() {
        return Ok(Expr::Literal(crate::ast::Literal::Bool(false), ()));
    }

    if cursor.match_token(Pattern::Text("NIL")).is_some() {
        return Ok(Expr::Literal(crate::ast::Literal::Nil, ()));
    }

    if cursor.match_token(Pattern::Text("(")).is_some() {
        let inner = parse_expr(cursor)?;
        cursor.expect_text(")")?;
        return Ok(Expr::Group(Box::new(inner), ()));
    }

    if cursor.match_token(Pattern::Text("OBJECT")).is_some() {
        return parse_object_expr(cursor);
    }

    if cursor.is(Pattern::Kind(TokenKind::Identifier)) {
        let name = cursor.expect_ident()?;
        if cursor.match_token(Pattern::Text("(")).is_some() {
            let args = parse_args(cursor)?;
            return Ok(Expr::Function(name, args, ()));
        }
        return Ok(Expr::Variable(name, ()));
    }

    Err(ParseError::at("expected an expression", position))
}

fn parse_object_expr(cursor: &mut Cursor) -> Result<Expr<()>, ParseError> {
    let name = if cursor.is(Pattern::Kind(TokenKind::Identifier)) && !cursor.is(Pattern::Text("DO"))
    {
        Some(cursor.expect_ident()?)
    } else {
        None
    };

    cursor.expect_text("DO")?;

    let mut fields = vec![];
    let mut methods = vec![];

    while !cursor.is(Pattern::Text("END")) {
        if cursor.is(Pattern::Text("LET")) {
            fields.push(parse_let_field(cursor)?);
        } else if cursor.is(Pattern::Text("DEF")) {
            methods.push(parse_def(cursor)?);
        } else {
            return Err(ParseError::at(
                "expected a field or method definition",
                cursor.position(),
            ));
        }
    }

    cursor.expect_text("END")?;

    Ok(Expr::ObjectExpr {
        name,
        fields,
        methods,
        info: (),
    })
}

fn decode_string_literal(literal: &str, position: (usize, usize)) -> Result<String, ParseError> {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| ParseError::at("malformed string literal", position))?;

    unescape::unescape(inner)
        .ok_or_else(|| ParseError::at("invalid escape sequence in string literal", position))
}

fn decode_character_literal(literal: &str, position: (usize, usize)) -> Result<char, ParseError> {
    let inner = literal
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .ok_or_else(|| ParseError::at("malformed character literal", position))?;

    let decoded = unescape::unescape(inner)
        .ok_or_else(|| ParseError::at("invalid escape sequence in character literal", position))?;

    let mut chars = decoded.chars();
    let c = chars
        .next()
        .ok_or_else(|| ParseError::at("empty character literal", position))?;

    if chars.next().is_some() {
        return Err(ParseError::at(
            "character literal must be a single code point",
            position,
        ));
    }

    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_str(src: &str) -> Source<()> {
        let tokens = Lexer::new(src).lex().expect("should lex");
        parse(tokens).expect("should parse")
    }

    #[test]
    fn parses_let_with_annotation_and_value() {
        let source = parse_str("LET x: Integer = 1;");
        assert_eq!(source.statements.len(), 1);
        match &source.statements[0] {
            Stmt::Let {
                name,
                type_name,
                value,
                ..
            } => {
                assert_eq!(name, "x");
                assert_eq!(type_name.as_deref(), Some("Integer"));
                assert!(value.is_some());
            }
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn parses_def_and_return() {
        let source = parse_str("DEF f(n) DO RETURN n + 1; END");
        match &source.statements[0] {
            Stmt::Def(def) => {
                assert_eq!(def.name, "f");
                assert_eq!(def.parameters, vec!["n".to_string()]);
                assert_eq!(def.body.len(), 1);
            }
            other => panic!("expected Def, got {other:?}"),
        }
    }

    #[test]
    fn parses_if_else() {
        let source = parse_str("IF 1 == 1 DO print(1); ELSE print(2); END");
        match &source.statements[0] {
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert_eq!(then_branch.len(), 1);
                assert_eq!(else_branch.len(), 1);
            }
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn parses_for_loop() {
        let source = parse_str("FOR i IN range(0, 3) DO print(i); END");
        match &source.statements[0] {
            Stmt::For { name, body, .. } => {
                assert_eq!(name, "i");
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected For, got {other:?}"),
        }
    }

    #[test]
    fn parses_method_and_property_chains() {
        let source = parse_str("x.foo.bar(1, 2);");
        match &source.statements[0] {
            Stmt::Expression { expr } => match expr {
                Expr::Method(receiver, name, args, _) => {
                    assert_eq!(name, "bar");
                    assert_eq!(args.len(), 2);
                    assert!(matches!(**receiver, Expr::Property(_, _, _)));
                }
                other => panic!("expected Method, got {other:?}"),
            },
            other => panic!("expected Expression, got {other:?}"),
        }
    }

    #[test]
    fn parses_object_expr() {
        let source = parse_str("LET o = OBJECT DO LET x = 1; DEF get() DO RETURN x; END END;");
        match &source.statements[0] {
            Stmt::Let { value, .. } => match value.as_ref().unwrap() {
                Expr::ObjectExpr { fields, methods, .. } => {
                    assert_eq!(fields.len(), 1);
                    assert_eq!(methods.len(), 1);
                }
                other => panic!("expected ObjectExpr, got {other:?}"),
            },
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn decodes_string_escapes() {
        let source = parse_str(r#"LET s = "a\nb";"#);
        match &source.statements[0] {
            Stmt::Let { value, .. } => match value.as_ref().unwrap() {
                Expr::Literal(crate::ast::Literal::Str(s), _) => assert_eq!(s, "a\nb"),
                other => panic!("expected Str literal, got {other:?}"),
            },
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn reports_parse_error_on_unexpected_token() {
        let tokens = Lexer::new("LET 1 = 2;").lex().unwrap();
        assert!(parse(tokens).is_err());
    }

    #[test]
    fn rejects_no_residual_tokens_violation() {
        // A successful parse must consume every token; trailing garbage is an error.
        let tokens = Lexer::new("LET x = 1; )").lex().unwrap();
        assert!(parse(tokens).is_err());
    }
}
