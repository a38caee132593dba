use std::fmt;

use crate::calculator::CalculatorRef;
use crate::cartesian::CartesianCoordinate;
use crate::constants::{CALCULATOR_TAG, CARTESIAN_TAG, TETRACOORD_TAG};
use crate::error::ScalarError;
use crate::radix::Radix;
use crate::scalar::PowerScalar;
use crate::tetracoord::{Orientation, Tetracoordinate};

/// Vector family named by the `cc` / `tc` tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VectorKind {
    Cartesian,
    Tetra,
}

impl VectorKind {
    pub const fn tag(self) -> &'static str {
        match self {
            VectorKind::Cartesian => CARTESIAN_TAG,
            VectorKind::Tetra => TETRACOORD_TAG,
        }
    }

    pub fn from_tag(tag: &str) -> Option<VectorKind> {
        match tag {
            CARTESIAN_TAG => Some(VectorKind::Cartesian),
            TETRACOORD_TAG => Some(VectorKind::Tetra),
            _ => None,
        }
    }

    /// Radix for bare digits inside the constructor brackets.
    pub const fn literal_radix(self) -> Radix {
        match self {
            VectorKind::Cartesian => Radix::Decimal,
            VectorKind::Tetra => Radix::Quaternary,
        }
    }
}

/// Anything an expression can evaluate to.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Scalar(PowerScalar),
    Tetra(Tetracoordinate),
    Cartesian(CartesianCoordinate),
    Calculator(CalculatorRef),
    Collection(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Scalar(_) => "power scalar",
            Value::Tetra(_) => "tetracoordinate",
            Value::Cartesian(_) => "cartesian coordinate",
            Value::Calculator(_) => "expression calculator",
            Value::Collection(_) => "collection",
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Value::Tetra(_) | Value::Cartesian(_))
    }

    /// Render for display, converting vectors to `vector` and digits to
    /// `radix` when given.
    pub fn format(
        &self,
        radix: Option<Radix>,
        vector: Option<VectorKind>,
    ) -> Result<String, ScalarError> {
        Ok(match self {
            Value::Tetra(t) => match vector {
                Some(VectorKind::Cartesian) => t.to_cartesian(Orientation::Up)?.to_literal(radix),
                _ => t.to_literal(radix),
            },
            Value::Cartesian(c) => match vector {
                Some(VectorKind::Tetra) => Tetracoordinate::from_cartesian_coord(c)?.to_literal(radix),
                _ => c.to_literal(radix),
            },
            Value::Scalar(s) => s.to_literal(radix, true, None),
            Value::Number(n) => match radix {
                Some(r) if n.is_finite() => {
                    PowerScalar::encode(*n, Radix::Decimal)?.to_literal(Some(r), false, None)
                }
                _ => format!("{n}"),
            },
            Value::Collection(items) => {
                let parts = items
                    .iter()
                    .map(|item| item.format(radix, vector))
                    .collect::<Result<Vec<_>, _>>()?;
                parts.join(", ")
            }
            Value::Bool(_) | Value::Calculator(_) => self.to_string(),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Scalar(s) => write!(f, "{s}"),
            Value::Tetra(t) => write!(f, "{t}"),
            Value::Cartesian(c) => write!(f, "{c}"),
            Value::Calculator(c) => write!(f, "{CALCULATOR_TAG}[{:?}]", c.path()),
            Value::Collection(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<PowerScalar> for Value {
    fn from(s: PowerScalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<Tetracoordinate> for Value {
    fn from(t: Tetracoordinate) -> Self {
        Value::Tetra(t)
    }
}

impl From<CartesianCoordinate> for Value {
    fn from(c: CartesianCoordinate) -> Self {
        Value::Cartesian(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point;
    use crate::radix::DigitOrder;

    #[test]
    fn test_format_converts_vectors() {
        let t = Tetracoordinate::parse("1", DigitOrder::HighFirst, false).unwrap();
        let v = Value::Tetra(t);
        assert_eq!(v.format(None, None).unwrap(), "tc[0q1]");
        assert_eq!(
            v.format(None, Some(VectorKind::Cartesian)).unwrap(),
            "cc[0d0,0d1]"
        );

        let c = Value::Cartesian(CartesianCoordinate::from_point(Point::new(0.0, 1.0)).unwrap());
        assert_eq!(c.format(None, Some(VectorKind::Tetra)).unwrap(), "tc[0q1]");
    }

    #[test]
    fn test_format_numbers_in_radix() {
        assert_eq!(Value::Number(6.0).format(None, None).unwrap(), "6");
        assert_eq!(Value::Number(6.0).format(Some(Radix::Quaternary), None).unwrap(), "12");
        assert_eq!(Value::Number(-2.5).format(Some(Radix::Binary), None).unwrap(), "-10.1");
        let inf = Value::Number(f64::NEG_INFINITY);
        assert_eq!(inf.format(Some(Radix::Quaternary), None).unwrap(), "-inf");
        assert_eq!(Value::Number(f64::NAN).format(Some(Radix::Binary), None).unwrap(), "NaN");
    }

    #[test]
    fn test_collection_display() {
        let v = Value::Collection(vec![Value::Number(1.0), Value::Bool(true)]);
        assert_eq!(v.to_string(), "1, true");
    }
}
