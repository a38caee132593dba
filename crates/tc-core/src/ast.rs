//! Expression tree produced by the parser.

use std::fmt;

use crate::constants::CALCULATOR_TAG;
use crate::radix::Radix;
use crate::value::VectorKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    StrictEq,
    StrictNe,
    LooseEq,
    LooseNe,
}

impl BinaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "**",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNe => "!==",
            BinaryOp::LooseEq => "==",
            BinaryOp::LooseNe => "!=",
        }
    }
}

/// How a member key was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessStyle {
    Dot,
    Bracket,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Bare digits such as `12.5`, read in the surrounding radix.
    Number(String),
    /// A named constant, already a plain number in every radix context.
    Constant { name: &'static str, value: f64 },
    Bool(bool),
    Str(String),
    Ident(String),
    /// Digits whose last place repeats forever: `0q31i`, `2...`.
    Repeating(Box<Expr>),
    /// Digits with an explicit radix prefix.
    Based { radix: Radix, literal: Box<Expr> },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Magnitude(Box<Expr>),
    Group(Box<Expr>),
    Collection(Vec<Expr>),
    Vector { kind: VectorKind, inner: Box<Expr> },
    Call {
        callee: Box<Expr>,
        args: Option<Box<Expr>>,
    },
    Assign { target: Box<Expr>, value: Box<Expr> },
    Access {
        object: Box<Expr>,
        key: Box<Expr>,
        style: AccessStyle,
    },
    Load { path: Box<Expr> },
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(digits) => f.write_str(digits),
            Expr::Constant { name, .. } => f.write_str(name),
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Str(s) => write!(f, "{s:?}"),
            Expr::Ident(name) => f.write_str(name),
            Expr::Repeating(literal) => write!(f, "{literal}i"),
            Expr::Based { radix, literal } => match literal.as_ref() {
                Expr::Repeating(inner) => write!(f, "0{}{inner}i", radix.tag()),
                other => write!(f, "0{}{other}", radix.tag()),
            },
            Expr::Unary { op, operand } => {
                let sign = match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Pos => "+",
                };
                write!(f, "{sign}{operand}")
            }
            Expr::Binary { op, left, right } => write!(f, "{left} {} {right}", op.symbol()),
            Expr::Magnitude(inner) => write!(f, "|{inner}|"),
            Expr::Group(inner) => write!(f, "({inner})"),
            Expr::Collection(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Expr::Vector { kind, inner } => write!(f, "{}[{inner}]", kind.tag()),
            Expr::Call { callee, args } => match args {
                Some(args) => write!(f, "{callee}({args})"),
                None => write!(f, "{callee}()"),
            },
            Expr::Assign { target, value } => write!(f, "{target} = {value}"),
            Expr::Access { object, key, style } => match style {
                AccessStyle::Dot => write!(f, "{object}.{key}"),
                AccessStyle::Bracket => write!(f, "{object}[{key}]"),
            },
            Expr::Load { path } => write!(f, "{CALCULATOR_TAG}[{path}]"),
        }
    }
}
