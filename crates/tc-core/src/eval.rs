//! Tree-walking evaluator.
//!
//! Bare digits are read in the current radix context, which starts decimal
//! and switches inside vector constructors. Operands evaluate left to right.

use tracing::debug;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::calculator::CalculatorCache;
use crate::cartesian::CartesianCoordinate;
use crate::constants::{CARTESIAN_X_KEY, CARTESIAN_Y_KEY, TETRA_VALUE_KEY, VAR_NAMESPACE};
use crate::context::VariableContext;
use crate::error::{CalcError, Result};
use crate::parser;
use crate::radix::{DigitOrder, Radix};
use crate::scalar::{self, ArithOp, Operand, PowerScalar};
use crate::tetracoord::{Orientation, Tetracoordinate};
use crate::value::{Value, VectorKind};

/// Parse and evaluate `text`. With a context, the result is also stored as
/// the latest answer.
pub fn evaluate(
    text: &str,
    ctx: Option<&mut VariableContext>,
    cache: &CalculatorCache,
) -> Result<Value> {
    debug!(expression = text, "evaluating");
    let expr = parser::parse(text)?;

    let mut evaluator = Evaluator::new(cache, ctx);
    let result = evaluator.eval(&expr)?;
    if let Some(ctx) = evaluator.ctx {
        ctx.record_answer(result.clone());
    }
    debug!(%result, "evaluated");
    Ok(result)
}

pub struct Evaluator<'a> {
    cache: &'a CalculatorCache,
    ctx: Option<&'a mut VariableContext>,
}

impl<'a> Evaluator<'a> {
    pub fn new(cache: &'a CalculatorCache, ctx: Option<&'a mut VariableContext>) -> Self {
        Self { cache, ctx }
    }

    /// Evaluate a tree in the decimal context.
    pub fn eval(&mut self, expr: &Expr) -> Result<Value> {
        self.eval_in(expr, Radix::Decimal)
    }

    fn eval_in(&mut self, expr: &Expr, radix: Radix) -> Result<Value> {
        match expr {
            Expr::Number(digits) => {
                if radix == Radix::Decimal {
                    digits
                        .parse::<f64>()
                        .map(Value::Number)
                        .map_err(|_| CalcError::Syntax(format!("malformed number {digits}")))
                } else {
                    parse_scalar(expr, digits, radix, false).map(Value::Scalar)
                }
            }
            Expr::Constant { value, .. } => Ok(Value::Number(*value)),
            Expr::Repeating(_) => literal_scalar(expr, radix).map(Value::Scalar),
            Expr::Based { radix, literal } => literal_scalar(literal, *radix).map(Value::Scalar),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Str(s) => Err(CalcError::Syntax(format!(
                "string {s:?} is only valid as a member key or calculator path"
            ))),
            Expr::Ident(name) => Err(CalcError::Syntax(format!(
                "unknown identifier {name}; variables live under {VAR_NAMESPACE}"
            ))),
            Expr::Unary { op, operand } => {
                let value = self.eval_in(operand, radix)?;
                match op {
                    UnaryOp::Pos => Ok(value),
                    UnaryOp::Neg => negate(expr, value),
                }
            }
            Expr::Magnitude(inner) => {
                let value = self.eval_in(inner, radix)?;
                magnitude(expr, value)
            }
            Expr::Group(inner) => self.eval_in(inner, radix),
            Expr::Collection(items) => items
                .iter()
                .map(|item| self.eval_in(item, radix))
                .collect::<Result<Vec<_>>>()
                .map(Value::Collection),
            Expr::Binary { op, left, right } => {
                if matches!(op, BinaryOp::LooseEq | BinaryOp::LooseNe) {
                    return Err(CalcError::Syntax(format!(
                        "loose equality {} is not supported; use === or !==",
                        op.symbol()
                    )));
                }
                let a = self.eval_in(left, radix)?;
                let b = self.eval_in(right, radix)?;
                binary(expr, *op, a, b)
            }
            Expr::Vector { kind, inner } => {
                let value = self.eval_in(inner, kind.literal_radix())?;
                construct_vector(expr, *kind, value)
            }
            Expr::Call { callee, args } => {
                let calculator = match self.eval_in(callee, radix)? {
                    Value::Calculator(c) => c,
                    other => {
                        return Err(CalcError::Type(format!(
                            "{callee} is a {}, not an expression calculator",
                            other.type_name()
                        )));
                    }
                };
                let args = match args {
                    None => Vec::new(),
                    Some(args) => match self.eval_in(args, radix)? {
                        Value::Collection(items) => items,
                        single => vec![single],
                    },
                };
                calculator.eval(&args)
            }
            Expr::Assign { target, value } => {
                let key = namespace_key(target).ok_or_else(|| {
                    CalcError::Syntax(format!(
                        "cannot assign to {target}; only {VAR_NAMESPACE} members are assignable"
                    ))
                })?;
                if self.ctx.is_none() {
                    return Err(missing_context(expr));
                }
                let value = self.eval_in(value, Radix::Decimal)?;
                let ctx = self.ctx.as_deref_mut().ok_or_else(|| missing_context(expr))?;
                ctx.set(&key, value.clone())?;
                Ok(value)
            }
            Expr::Access { object, key, .. } => self.access(expr, object, key, radix),
            Expr::Load { path } => {
                let path = match path.as_ref() {
                    Expr::Str(s) | Expr::Ident(s) => s,
                    other => {
                        return Err(CalcError::Syntax(format!(
                            "calculator path must be a string, found {other}"
                        )));
                    }
                };
                self.cache.load(path).map(Value::Calculator)
            }
        }
    }

    fn access(
        &mut self,
        expr: &Expr,
        object: &Expr,
        key: &Expr,
        radix: Radix,
    ) -> Result<Value> {
        if let Expr::Ident(name) = object {
            if name != VAR_NAMESPACE {
                return Err(CalcError::Syntax(format!(
                    "cannot access {expr}; all variables belong to {VAR_NAMESPACE}"
                )));
            }
            let key = member_key(key).ok_or_else(|| {
                CalcError::Syntax(format!("invalid {VAR_NAMESPACE} member key in {expr}"))
            })?;
            let ctx = self.ctx.as_deref().ok_or_else(|| missing_context(expr))?;
            return ctx
                .get(&key)
                .cloned()
                .ok_or_else(|| CalcError::Reference(format!("{VAR_NAMESPACE}.{key} is not defined")));
        }

        let component = member_key(key)
            .ok_or_else(|| CalcError::Syntax(format!("invalid component key in {expr}")))?;
        match (self.eval_in(object, radix)?, component.as_str()) {
            (Value::Tetra(t), TETRA_VALUE_KEY) => Ok(Value::Scalar(t.value().clone())),
            (Value::Cartesian(c), CARTESIAN_X_KEY) => Ok(Value::Number(c.point().x)),
            (Value::Cartesian(c), CARTESIAN_Y_KEY) => Ok(Value::Number(c.point().y)),
            (Value::Tetra(_), other) => Err(CalcError::Type(format!(
                "tetracoordinate component {other} must be {TETRA_VALUE_KEY}"
            ))),
            (Value::Cartesian(_), other) => Err(CalcError::Type(format!(
                "cartesian component {other} must be {CARTESIAN_X_KEY} or {CARTESIAN_Y_KEY}"
            ))),
            (value, other) => Err(CalcError::Type(format!(
                "cannot access component {other} of {} {value}",
                value.type_name()
            ))),
        }
    }
}

fn missing_context(expr: &Expr) -> CalcError {
    CalcError::Reference(format!("cannot evaluate {expr} without a variable context"))
}

/// Key of a `var.key` / `var[key]` target.
fn namespace_key(target: &Expr) -> Option<String> {
    match target {
        Expr::Access { object, key, .. } => match object.as_ref() {
            Expr::Ident(name) if name == VAR_NAMESPACE => member_key(key),
            _ => None,
        },
        _ => None,
    }
}

/// `var.key`, `var[key]` and `var["key"]` name the same member.
fn member_key(key: &Expr) -> Option<String> {
    match key {
        Expr::Ident(name) | Expr::Number(name) | Expr::Str(name) => Some(name.clone()),
        _ => None,
    }
}

fn parse_scalar(expr: &Expr, digits: &str, radix: Radix, irrational: bool) -> Result<PowerScalar> {
    PowerScalar::parse(digits, radix, irrational, DigitOrder::HighFirst)
        .map_err(|e| CalcError::scalar(expr, e))
}

/// Digits, optionally repeating, read as a scalar in `radix`.
fn literal_scalar(literal: &Expr, radix: Radix) -> Result<PowerScalar> {
    match literal {
        Expr::Number(digits) => parse_scalar(literal, digits, radix, false),
        Expr::Repeating(inner) => match inner.as_ref() {
            Expr::Number(digits) => parse_scalar(literal, digits, radix, true),
            other => Err(CalcError::Syntax(format!("{other} cannot repeat"))),
        },
        other => Err(CalcError::Syntax(format!("invalid scalar literal {other}"))),
    }
}

fn operand(value: &Value) -> Option<Operand<'_>> {
    match value {
        Value::Number(n) => Some(Operand::Number(*n)),
        Value::Scalar(s) => Some(Operand::Scalar(s)),
        _ => None,
    }
}

fn negate(expr: &Expr, value: Value) -> Result<Value> {
    Ok(match value {
        Value::Number(n) => Value::Number(-n),
        Value::Scalar(s) => Value::Scalar(-s),
        Value::Tetra(t) => Value::Tetra(t.negate().map_err(|e| CalcError::scalar(expr, e))?),
        Value::Cartesian(c) => Value::Cartesian(-c),
        other => {
            return Err(CalcError::Type(format!(
                "cannot negate {} {other}",
                other.type_name()
            )));
        }
    })
}

fn magnitude(expr: &Expr, value: Value) -> Result<Value> {
    Ok(match value {
        Value::Number(n) => Value::Number(n.abs()),
        Value::Scalar(s) => Value::Scalar(s.abs().map_err(|e| CalcError::scalar(expr, e))?),
        Value::Tetra(t) => Value::Number(t.magnitude()),
        Value::Cartesian(c) => Value::Number(c.magnitude()),
        other => {
            return Err(CalcError::Type(format!(
                "{} {other} has no magnitude",
                other.type_name()
            )));
        }
    })
}

fn binary(expr: &Expr, op: BinaryOp, a: Value, b: Value) -> Result<Value> {
    let arith = match op {
        BinaryOp::Add => ArithOp::Add,
        BinaryOp::Sub => ArithOp::Subtract,
        BinaryOp::Mul => ArithOp::Multiply,
        BinaryOp::Div => ArithOp::Divide,
        BinaryOp::Pow => ArithOp::Pow,
        BinaryOp::StrictEq => return strict_equals(&a, &b).map(Value::Bool),
        BinaryOp::StrictNe => return strict_equals(&a, &b).map(|eq| Value::Bool(!eq)),
        BinaryOp::LooseEq | BinaryOp::LooseNe => {
            return Err(CalcError::Syntax(format!(
                "loose equality {} is not supported",
                op.symbol()
            )));
        }
    };
    match arith {
        ArithOp::Add | ArithOp::Subtract => add_subtract(expr, arith, a, b),
        ArithOp::Multiply | ArithOp::Divide | ArithOp::Pow => semiscalar(expr, arith, a, b),
    }
}

fn scalar_op(expr: &Expr, op: ArithOp, a: &Value, b: &Value) -> Option<Result<Value>> {
    let (Some(x), Some(y)) = (operand(a), operand(b)) else {
        return None;
    };
    Some(match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(Value::Number(op.apply(*x, *y))),
        _ => scalar::arithmetic(op, x, y)
            .map(Value::Scalar)
            .map_err(|e| CalcError::scalar(expr, e)),
    })
}

fn add_subtract(expr: &Expr, op: ArithOp, a: Value, b: Value) -> Result<Value> {
    if let Some(result) = scalar_op(expr, op, &a, &b) {
        return result;
    }
    let lift = |e| CalcError::scalar(expr, e);
    match (&a, &b) {
        (Value::Tetra(x), Value::Tetra(y)) => {
            let t = if op == ArithOp::Add {
                x.add(y)
            } else {
                x.subtract(y)
            };
            t.map(Value::Tetra).map_err(lift)
        }
        (Value::Cartesian(x), Value::Cartesian(y)) => {
            let c = if op == ArithOp::Add {
                x.add(y)
            } else {
                x.subtract(y)
            };
            c.map(Value::Cartesian).map_err(lift)
        }
        _ => Err(CalcError::Type(format!(
            "cannot {} {} and {}; convert first",
            if op == ArithOp::Add { "add" } else { "subtract" },
            a.type_name(),
            b.type_name()
        ))),
    }
}

/// Multiply, divide or raise with at most one vector operand, moved to the
/// left when the operation commutes.
fn semiscalar(expr: &Expr, op: ArithOp, a: Value, b: Value) -> Result<Value> {
    let (vector, factor) = match (a.is_vector(), b.is_vector()) {
        (false, false) => {
            return scalar_op(expr, op, &a, &b).unwrap_or_else(|| {
                Err(CalcError::Type(format!(
                    "{} is not defined between {} and {}",
                    op.symbol(),
                    a.type_name(),
                    b.type_name()
                )))
            });
        }
        (true, true) => {
            return Err(CalcError::Type(format!(
                "{} between two vectors is not supported",
                op.symbol()
            )));
        }
        (true, false) => (a, b),
        (false, true) if op.is_commutative() => (b, a),
        (false, true) => {
            return Err(CalcError::Type(format!(
                "operands of {} must be vector left and scalar right in {expr}",
                op.symbol()
            )));
        }
    };

    let s = operand(&factor).map(Operand::to_number).ok_or_else(|| {
        CalcError::Type(format!(
            "cannot {} a vector by {} {factor}",
            op.symbol(),
            factor.type_name()
        ))
    })?;
    let unsupported = || CalcError::Type(format!("{} is not a vector-scalar operation", op.symbol()));
    let lift = |e| CalcError::scalar(expr, e);
    match vector {
        Value::Tetra(t) => t
            .scale(op, s)
            .ok_or_else(unsupported)?
            .map(Value::Tetra)
            .map_err(lift),
        Value::Cartesian(c) => c
            .scale(op, s)
            .ok_or_else(unsupported)?
            .map(Value::Cartesian)
            .map_err(lift),
        other => Err(CalcError::Type(format!("{} is not a vector", other.type_name()))),
    }
}

fn strict_equals(a: &Value, b: &Value) -> Result<bool> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(x == y),
        (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
        (Value::Scalar(x), Value::Scalar(y)) => Ok(x.equals(y)),
        (Value::Tetra(x), Value::Tetra(y)) => Ok(x.equals(y)),
        (Value::Cartesian(x), Value::Cartesian(y)) => Ok(x.equals(y)),
        _ => Err(CalcError::Type(format!(
            "strict equality is not defined between {} {a} and {} {b}; convert first",
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn component(expr: &Expr, value: &Value) -> Result<PowerScalar> {
    match value {
        Value::Scalar(s) => Ok(s.clone()),
        Value::Number(n) => {
            PowerScalar::encode(*n, Radix::Decimal).map_err(|e| CalcError::scalar(expr, e))
        }
        other => Err(CalcError::Syntax(format!(
            "cartesian component must be a number, found {} {other} in {expr}",
            other.type_name()
        ))),
    }
}

fn construct_vector(expr: &Expr, kind: VectorKind, value: Value) -> Result<Value> {
    let lift = |e| CalcError::scalar(expr, e);
    match (kind, value) {
        (VectorKind::Tetra, Value::Tetra(t)) => Ok(Value::Tetra(t)),
        (VectorKind::Cartesian, Value::Cartesian(c)) => Ok(Value::Cartesian(c)),
        (VectorKind::Cartesian, Value::Tetra(t)) => t
            .to_cartesian(Orientation::Up)
            .map(Value::Cartesian)
            .map_err(lift),
        (VectorKind::Tetra, Value::Cartesian(c)) => Tetracoordinate::from_cartesian_coord(&c)
            .map(Value::Tetra)
            .map_err(lift),
        (VectorKind::Cartesian, Value::Collection(items)) if items.len() == 2 => {
            let x = component(expr, &items[0])?;
            let y = component(expr, &items[1])?;
            Ok(Value::Cartesian(CartesianCoordinate::new(x, y)))
        }
        (VectorKind::Tetra, Value::Scalar(s)) => {
            Tetracoordinate::from_scalar(s).map(Value::Tetra).map_err(lift)
        }
        (VectorKind::Tetra, Value::Number(n)) => PowerScalar::encode(n, Radix::Quaternary)
            .and_then(Tetracoordinate::from_scalar)
            .map(Value::Tetra)
            .map_err(lift),
        (VectorKind::Cartesian, other) => Err(CalcError::Syntax(format!(
            "failed to parse {other} as x, y components in {expr}"
        ))),
        (VectorKind::Tetra, other) => Err(CalcError::Syntax(format!(
            "failed to parse {} {other} as a tetracoordinate in {expr}",
            other.type_name()
        ))),
    }
}
