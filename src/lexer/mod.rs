//! Hand-written longest-match lexer.
//!
//! Scans a single read cursor over a `Peekable<Chars>` with one-character
//! lookahead, the same cursor shape the teacher crate's own lexer uses,
//! generalized from its fixed keyword table to this language's richer set
//! of literal kinds.
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use once_cell::sync::Lazy;

use crate::error::LexError;
use crate::token::{Token, TokenKind};

/// Two-character operators, checked before falling back to single characters
/// (longest-match).
static TWO_CHAR_OPERATORS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for op in ["==", "!=", "<=", ">="] {
        m.insert(op, op);
    }
    m
});

const SINGLE_CHAR_OPERATORS: &str = "=<>!&|+-*/(){};,.";

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn decode_escape_char(c: char) -> Option<char> {
    match c {
        'b' => Some('\u{8}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        '\'' => Some('\''),
        '"' => Some('"'),
        '\\' => Some('\\'),
        _ => None,
    }
}

pub struct Lexer<'a> {
    iterator: Peekable<Chars<'a>>,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            iterator: input.chars().peekable(),
            line: 1,
            col: 1,
            tokens: vec![],
        }
    }

    pub fn lex(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            self.eat_whitespace();

            let Some(&next) = self.iterator.peek() else {
                break;
            };

            match next {
                c if is_ident_start(c) => self.lex_identifier(),
                c if c.is_ascii_digit() => self.lex_number()?,
                '"' => self.lex_string()?,
                '\'' => self.lex_character()?,
                _ => self.lex_operator()?,
            }
        }

        Ok(self.tokens)
    }

    fn position(&self) -> (usize, usize) {
        (self.line, self.col)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.iterator.next()?;
        match c {
            '\n' => {
                self.line += 1;
                self.col = 1;
            }
            _ => self.col += 1,
        }
        Some(c)
    }

    fn eat_whitespace(&mut self) {
        while let Some(&c) = self.iterator.peek() {
            if matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{8}') {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn lex_identifier(&mut self) {
        let position = self.position();
        let mut text = String::new();

        while let Some(&c) = self.iterator.peek() {
            if is_ident_continue(c) {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        self.tokens
            .push(Token::new(TokenKind::Identifier, text, position));
    }

    fn lex_number(&mut self) -> Result<(), LexError> {
        let position = self.position();
        let mut text = String::new();

        while let Some(&c) = self.iterator.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let mut is_decimal = false;

        if self.iterator.peek() == Some(&'.') {
            is_decimal = true;
            text.push('.');
            self.advance();

            let mut saw_digit = false;
            while let Some(&c) = self.iterator.peek() {
                if c.is_ascii_digit() {
                    saw_digit = true;
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }

            if !saw_digit {
                return Err(LexError::at(
                    "malformed number: dot with no digits after",
                    position,
                ));
            }
        }

        if self.iterator.peek() == Some(&'e') {
            is_decimal = true;
            text.push('e');
            self.advance();

            let mut saw_digit = false;
            while let Some(&c) = self.iterator.peek() {
                if c.is_ascii_digit() {
                    saw_digit = true;
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }

            if !saw_digit {
                return Err(LexError::at(
                    "malformed number: 'e' with no digits after",
                    position,
                ));
            }
        }

        let kind = if is_decimal {
            TokenKind::Decimal
        } else {
            TokenKind::Integer
        };

        self.tokens.push(Token::new(kind, text, position));

        Ok(())
    }

    fn lex_string(&mut self) -> Result<(), LexError> {
        let position = self.position();
        let mut text = String::new();
        text.push('"');
        self.advance();

        loop {
            let Some(c) = self.advance() else {
                return Err(LexError::at("unterminated string literal", position));
            };

            match c {
                '"' => {
                    text.push('"');
                    break;
                }
                '\\' => {
                    let Some(escaped) = self.advance() else {
                        return Err(LexError::at("unterminated string literal", position));
                    };
                    if decode_escape_char(escaped).is_none() {
                        return Err(LexError::at(
                            format!("invalid escape sequence '\\{escaped}'"),
                            position,
                        ));
                    }
                    text.push('\\');
                    text.push(escaped);
                }
                other => text.push(other),
            }
        }

        self.tokens
            .push(Token::new(TokenKind::String, text, position));

        Ok(())
    }

    fn lex_character(&mut self) -> Result<(), LexError> {
        let position = self.position();
        let mut text = String::new();
        text.push('\'');
        self.advance();

        let Some(c) = self.advance() else {
            return Err(LexError::at("unterminated character literal", position));
        };

        match c {
            '\\' => {
                let Some(escaped) = self.advance() else {
                    return Err(LexError::at("unterminated character literal", position));
                };
                if decode_escape_char(escaped).is_none() {
                    return Err(LexError::at(
                        format!("invalid escape sequence '\\{escaped}'"),
                        position,
                    ));
                }
                text.push('\\');
                text.push(escaped);
            }
            other => text.push(other),
        }

        match self.advance() {
            Some('\'') => text.push('\''),
            _ => return Err(LexError::at("unterminated character literal", position)),
        }

        self.tokens
            .push(Token::new(TokenKind::Character, text, position));

        Ok(())
    }

    fn lex_operator(&mut self) -> Result<(), LexError> {
        let position = self.position();
        let first = self.advance().expect("checked by caller");

        if let Some(&second) = self.iterator.peek() {
            let mut two = String::new();
            two.push(first);
            two.push(second);

            if TWO_CHAR_OPERATORS.contains_key(two.as_str()) {
                self.advance();
                self.tokens
                    .push(Token::new(TokenKind::Operator, two, position));
                return Ok(());
            }
        }

        if !SINGLE_CHAR_OPERATORS.contains(first) {
            return Err(LexError::at(
                format!("unexpected character '{first}'"),
                position,
            ));
        }

        self.tokens
            .push(Token::new(TokenKind::Operator, first.to_string(), position));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token> {
        Lexer::new(src).lex().expect("should lex")
    }

    #[test]
    fn lexes_identifiers_and_keywords() {
        let tokens = lex("LET x");
        assert_eq!(tokens[0].literal, "LET");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].literal, "x");
    }

    #[test]
    fn lexes_integer_and_decimal() {
        let tokens = lex("42 3.14 2e10 1.5e3");
        assert_eq!(tokens[0].kind, TokenKind::Integer);
        assert_eq!(tokens[0].literal, "42");
        assert_eq!(tokens[1].kind, TokenKind::Decimal);
        assert_eq!(tokens[1].literal, "3.14");
        assert_eq!(tokens[2].kind, TokenKind::Decimal);
        assert_eq!(tokens[2].literal, "2e10");
        assert_eq!(tokens[3].kind, TokenKind::Decimal);
        assert_eq!(tokens[3].literal, "1.5e3");
    }

    #[test]
    fn rejects_malformed_number() {
        assert!(Lexer::new("1.").lex().is_err());
        assert!(Lexer::new("1e").lex().is_err());
    }

    #[test]
    fn lexes_two_char_operators_longest_match() {
        let tokens = lex("== != <= >= = < >");
        let literals: Vec<_> = tokens.iter().map(|t| t.literal.as_str()).collect();
        assert_eq!(literals, vec!["==", "!=", "<=", ">=", "=", "<", ">"]);
    }

    #[test]
    fn lexes_string_with_escapes() {
        let tokens = lex(r#""a\nb""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, r#""a\nb""#);
    }

    #[test]
    fn rejects_unknown_escape() {
        assert!(Lexer::new(r#""\q""#).lex().is_err());
        assert!(Lexer::new(r"'\q'").lex().is_err());
    }

    #[test]
    fn rejects_unterminated_string() {
        assert!(Lexer::new("\"abc").lex().is_err());
    }

    #[test]
    fn lexes_character_literal() {
        let tokens = lex("'a' '\\n'");
        assert_eq!(tokens[0].literal, "'a'");
        assert_eq!(tokens[1].literal, "'\\n'");
    }

    #[test]
    fn skips_whitespace() {
        let tokens = lex("  LET\t x\n=\r1;");
        assert_eq!(tokens.len(), 5);
    }
}
