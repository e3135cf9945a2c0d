//! The small algebraic language topology equations are written in.
//!
//! Grammar (usual precedence, left associative):
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | identifier | '(' expr ')'
//! ```
//! Numbers are read as exact rationals, so `0.5` is exactly `1/2`.

use crate::errors::ConfigurationError;
use num_bigint::BigInt;
use num_rational::BigRational;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(BigRational),
    Ident(String),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Parse a single expression, reporting failures against `source`.
    pub fn parse(source: &str) -> Result<Expr, ConfigurationError> {
        let fail = |message: String| ConfigurationError::Parse {
            equation: source.to_string(),
            message,
        };
        let tokens = tokenize(source).map_err(fail)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expr().map_err(fail)?;
        if let Some(token) = parser.peek() {
            return Err(fail(format!("unexpected trailing {token:?}")));
        }
        Ok(expr)
    }

    /// Collect every identifier referenced by this expression.
    pub fn collect_identifiers(&self, into: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) => {},
            Expr::Ident(name) => {
                into.insert(name.clone());
            },
            Expr::Neg(inner) => inner.collect_identifiers(into),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) => {
                a.collect_identifiers(into);
                b.collect_identifiers(into);
            },
        }
    }
}

/// Scan `source` for word-like identifier tokens, ignoring everything else.
pub fn identifiers(source: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let mut chars = source.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c.is_ascii_digit() {
            // skip the rest of a numeric literal so `2x` never yields `x`
            while let Some(&(_, d)) = chars.peek() {
                if d.is_ascii_alphanumeric() || d == '.' || d == '_' {
                    chars.next();
                } else {
                    break;
                }
            }
        } else if c.is_ascii_alphabetic() || c == '_' {
            let mut end = start + c.len_utf8();
            while let Some(&(i, d)) = chars.peek() {
                if d.is_ascii_alphanumeric() || d == '_' {
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            out.insert(source[start..end].to_string());
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(BigRational),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            },
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            },
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            },
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            },
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            },
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            },
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(Token::Number(parse_decimal(&literal)?));
            },
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            },
            other => return Err(format!("unexpected character `{other}`")),
        }
    }
    Ok(tokens)
}

/// `"12.25"` -> 49/4, exactly.
fn parse_decimal(literal: &str) -> Result<BigRational, String> {
    let (whole, fraction) = match literal.split_once('.') {
        Some((w, f)) => (w, f),
        None => (literal, ""),
    };
    if fraction.contains('.') || (whole.is_empty() && fraction.is_empty()) {
        return Err(format!("malformed number `{literal}`"));
    }
    let digits = format!("{whole}{fraction}");
    let numerator: BigInt = digits
        .parse()
        .map_err(|_| format!("malformed number `{literal}`"))?;
    let denominator = num_traits::pow(BigInt::from(10u32), fraction.len());
    Ok(BigRational::new(numerator, denominator))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    lhs = Expr::Add(Box::new(lhs), Box::new(self.term()?));
                },
                Some(Token::Minus) => {
                    self.pos += 1;
                    lhs = Expr::Sub(Box::new(lhs), Box::new(self.term()?));
                },
                _ => return Ok(lhs),
            }
        }
    }

    fn term(&mut self) -> Result<Expr, String> {
        let mut lhs = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    lhs = Expr::Mul(Box::new(lhs), Box::new(self.unary()?));
                },
                Some(Token::Slash) => {
                    self.pos += 1;
                    lhs = Expr::Div(Box::new(lhs), Box::new(self.unary()?));
                },
                _ => return Ok(lhs),
            }
        }
    }

    fn unary(&mut self) -> Result<Expr, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            },
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            },
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Ident(name)) => Ok(Expr::Ident(name)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("missing closing parenthesis".to_string()),
                }
            },
            Some(token) => Err(format!("unexpected {token:?}")),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals_are_exact() {
        assert_eq!(
            parse_decimal("0.5").unwrap(),
            BigRational::new(1.into(), 2.into())
        );
        assert_eq!(
            parse_decimal("12.25").unwrap(),
            BigRational::new(49.into(), 4.into())
        );
        assert!(parse_decimal("1.2.3").is_err());
    }

    #[test]
    fn precedence() {
        let e = Expr::parse("S * s + P * p - (S + P) * c").unwrap();
        let mut ids = BTreeSet::new();
        e.collect_identifiers(&mut ids);
        let ids: Vec<_> = ids.into_iter().collect();
        assert_eq!(ids, ["P", "S", "c", "p", "s"]);
        match e {
            Expr::Sub(_, rhs) => assert!(matches!(*rhs, Expr::Mul(_, _))),
            other => panic!("unexpected tree {other:?}"),
        }
    }

    #[test]
    fn identifier_scan_skips_numbers() {
        let ids = identifiers("(P1+1) * r1 - 2 * p - (1) * c");
        let ids: Vec<_> = ids.into_iter().collect();
        assert_eq!(ids, ["P1", "c", "p", "r1"]);
    }

    #[test]
    fn parse_errors_name_the_equation() {
        let err = Expr::parse("a + * b").unwrap_err();
        match err {
            ConfigurationError::Parse { equation, .. } => assert_eq!(equation, "a + * b"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(Expr::parse("(a + b").is_err());
        assert!(Expr::parse("a b").is_err());
        assert!(Expr::parse("a # b").is_err());
    }
}
