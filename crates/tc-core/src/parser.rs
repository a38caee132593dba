//! Lexer and recursive-descent parser for calculator expressions.
//!
//! Precedence, loosest first: `,` then `=` (right) then `=== !== == !=`
//! then `+ -` then `* /` then `**` (right) then prefix `- +` then postfix
//! member access and calls.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{AccessStyle, BinaryOp, Expr, UnaryOp};
use crate::constants::{
    CALCULATOR_TAG, COS_PI_6_NAME, COS_PI_OVER_6, SIN_PI_6_NAME, SIN_PI_OVER_6,
};
use crate::error::{CalcError, Result};
use crate::radix::Radix;
use crate::value::VectorKind;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+)").unwrap());

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*").unwrap());

const PUNCTUATION: [&str; 17] = [
    "===", "!==", "**", "==", "!=", "=", "+", "-", "*", "/", ",", "(", ")", "[", "]", "|", ".",
];

static END: Token = Token::End;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Literal {
        radix: Option<Radix>,
        digits: String,
        repeating: bool,
    },
    Ident(String),
    Str(String),
    Punct(&'static str),
    End,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Literal { digits, .. } => format!("number {digits}"),
            Token::Ident(name) => format!("identifier {name}"),
            Token::Str(s) => format!("string {s:?}"),
            Token::Punct(p) => format!("'{p}'"),
            Token::End => "end of input".to_string(),
        }
    }

    /// Whether a following `.` reads as member access rather than a
    /// fraction.
    fn ends_operand(&self) -> bool {
        matches!(
            self,
            Token::Ident(_) | Token::Literal { .. } | Token::Str(_) | Token::Punct(")" | "]")
        )
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn tokenize(text: &str) -> Result<Vec<(usize, Token)>> {
    let mut tokens: Vec<(usize, Token)> = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let Some(c) = rest.chars().next() else {
            break;
        };
        if c.is_whitespace() {
            pos += c.len_utf8();
            continue;
        }

        let after_operand = tokens.last().is_some_and(|(_, t)| t.ends_operand());
        if let Some((len, token)) = lex_literal(rest, after_operand)? {
            tokens.push((pos, token));
            pos += len;
            continue;
        }

        if let Some(m) = IDENT_RE.find(rest) {
            tokens.push((pos, Token::Ident(m.as_str().to_string())));
            pos += m.end();
            continue;
        }

        if c == '"' || c == '\'' {
            let body = &rest[1..];
            let end = body.find(c).ok_or_else(|| {
                CalcError::Syntax(format!("unterminated string starting at {pos}"))
            })?;
            tokens.push((pos, Token::Str(body[..end].to_string())));
            pos += end + 2;
            continue;
        }

        match PUNCTUATION.iter().find(|p| rest.starts_with(**p)) {
            Some(p) => {
                tokens.push((pos, Token::Punct(*p)));
                pos += p.len();
            }
            None => {
                return Err(CalcError::Syntax(format!(
                    "unexpected character {c:?} at {pos}"
                )));
            }
        }
    }

    tokens.push((text.len(), Token::End));
    Ok(tokens)
}

/// Digits with an optional `0b`/`0q`/`0d` prefix and `i`/`...` suffix.
fn lex_literal(rest: &str, after_operand: bool) -> Result<Option<(usize, Token)>> {
    let bytes = rest.as_bytes();
    let mut len = 0;
    let mut radix = None;

    if bytes.len() > 2 && bytes[0] == b'0' && (bytes[2].is_ascii_digit() || bytes[2] == b'.') {
        radix = Radix::from_tag(char::from(bytes[1]));
        if radix.is_some() {
            len = 2;
        }
    }
    if radix.is_none() && after_operand && rest.starts_with('.') {
        return Ok(None);
    }

    let Some(m) = NUMBER_RE.find(&rest[len..]) else {
        if radix.is_some() {
            return Err(CalcError::Syntax(format!(
                "radix prefix without digits in {rest:?}"
            )));
        }
        return Ok(None);
    };
    let digits = m.as_str().to_string();
    len += m.end();

    let tail = &rest[len..];
    let mut repeating = false;
    if tail.starts_with("...") {
        repeating = true;
        len += 3;
    } else if tail.starts_with('i') && !tail[1..].chars().next().is_some_and(is_ident_char) {
        repeating = true;
        len += 1;
    }
    // a repeating zero is just zero
    if digits.ends_with('0') {
        repeating = false;
    }

    Ok(Some((
        len,
        Token::Literal {
            radix,
            digits,
            repeating,
        },
    )))
}

/// Parse expression text into a tree.
pub fn parse(text: &str) -> Result<Expr> {
    let mut parser = Parser {
        tokens: tokenize(text)?,
        pos: 0,
    };
    let expr = parser.sequence()?;
    match parser.peek() {
        Token::End => Ok(expr),
        other => Err(parser.unexpected(other)),
    }
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).map_or(&END, |(_, t)| t)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, punct: &str) -> bool {
        if matches!(self.peek(), Token::Punct(p) if *p == punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<()> {
        if self.eat(punct) {
            return Ok(());
        }
        let found = self.peek().clone();
        Err(CalcError::Syntax(format!(
            "expected '{punct}' but found {} at {}",
            found.describe(),
            self.offset()
        )))
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(0, |(at, _)| *at)
    }

    fn unexpected(&self, token: &Token) -> CalcError {
        CalcError::Syntax(format!(
            "unexpected {} at {}",
            token.describe(),
            self.offset()
        ))
    }

    fn sequence(&mut self) -> Result<Expr> {
        let first = self.assignment()?;
        if !matches!(self.peek(), Token::Punct(",")) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(",") {
            items.push(self.assignment()?);
        }
        Ok(Expr::Collection(items))
    }

    fn assignment(&mut self) -> Result<Expr> {
        let target = self.equality()?;
        if self.eat("=") {
            let value = self.assignment()?;
            return Ok(Expr::Assign {
                target: Box::new(target),
                value: Box::new(value),
            });
        }
        Ok(target)
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                Token::Punct("===") => BinaryOp::StrictEq,
                Token::Punct("!==") => BinaryOp::StrictNe,
                Token::Punct("==") => BinaryOp::LooseEq,
                Token::Punct("!=") => BinaryOp::LooseNe,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.additive()?;
            left = binary(op, left, right);
        }
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Punct("+") => BinaryOp::Add,
                Token::Punct("-") => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.power()?;
        loop {
            let op = match self.peek() {
                Token::Punct("*") => BinaryOp::Mul,
                Token::Punct("/") => BinaryOp::Div,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.power()?;
            left = binary(op, left, right);
        }
    }

    fn power(&mut self) -> Result<Expr> {
        let base = self.unary()?;
        if self.eat("**") {
            let exponent = self.power()?;
            return Ok(binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<Expr> {
        let op = match self.peek() {
            Token::Punct("-") => UnaryOp::Neg,
            Token::Punct("+") => UnaryOp::Pos,
            _ => return self.postfix(),
        };
        self.pos += 1;
        let operand = self.unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.eat(".") {
                let key = match self.advance() {
                    Token::Ident(name) => Expr::Ident(name),
                    Token::Str(s) => Expr::Str(s),
                    Token::Literal {
                        radix: None,
                        digits,
                        repeating: false,
                    } => Expr::Number(digits),
                    other => {
                        self.pos -= 1;
                        return Err(self.unexpected(&other));
                    }
                };
                expr = Expr::Access {
                    object: Box::new(expr),
                    key: Box::new(key),
                    style: AccessStyle::Dot,
                };
            } else if self.eat("[") {
                let inner = self.sequence()?;
                self.expect("]")?;
                expr = bracket(expr, inner);
            } else if self.eat("(") {
                let args = if self.eat(")") {
                    None
                } else {
                    let args = self.sequence()?;
                    self.expect(")")?;
                    Some(Box::new(args))
                };
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.advance() {
            Token::Literal {
                radix,
                digits,
                repeating,
            } => {
                let mut literal = Expr::Number(digits);
                if repeating {
                    literal = Expr::Repeating(Box::new(literal));
                }
                Ok(match radix {
                    Some(radix) => Expr::Based {
                        radix,
                        literal: Box::new(literal),
                    },
                    None => literal,
                })
            }
            Token::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::Bool(true),
                "false" => Expr::Bool(false),
                COS_PI_6_NAME => Expr::Constant {
                    name: COS_PI_6_NAME,
                    value: COS_PI_OVER_6,
                },
                SIN_PI_6_NAME => Expr::Constant {
                    name: SIN_PI_6_NAME,
                    value: SIN_PI_OVER_6,
                },
                _ => Expr::Ident(name),
            }),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::Punct("(") => {
                let inner = self.sequence()?;
                self.expect(")")?;
                Ok(Expr::Group(Box::new(inner)))
            }
            Token::Punct("|") => {
                let inner = self.sequence()?;
                self.expect("|")?;
                Ok(Expr::Magnitude(Box::new(inner)))
            }
            other => {
                self.pos -= 1;
                Err(self.unexpected(&other))
            }
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// `cc[...]`, `tc[...]` and `exprcalc[...]` are constructors; anything
/// else is member access.
fn bracket(object: Expr, inner: Expr) -> Expr {
    if let Expr::Ident(name) = &object {
        if let Some(kind) = VectorKind::from_tag(name) {
            return Expr::Vector {
                kind,
                inner: Box::new(inner),
            };
        }
        if name == CALCULATOR_TAG {
            return Expr::Load {
                path: Box::new(inner),
            };
        }
    }
    Expr::Access {
        object: Box::new(object),
        key: Box::new(inner),
        style: AccessStyle::Bracket,
    }
}
