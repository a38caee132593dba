use std::f64::consts::{PI, TAU};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::constants::CARTESIAN_EQ_THRESHOLD;
use crate::error::ScalarError;
use crate::radix::Radix;
use crate::scalar::{ArithOp, PowerScalar};

/// Float pair used for all lattice geometry.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn magnitude(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Direction in radians, normalized to [0, 2π).
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x).rem_euclid(TAU)
    }

    /// Non-negative angle between two directions, at most π.
    pub fn angle_between(self, other: Point) -> f64 {
        let delta = (self.angle() - other.angle()).abs();
        if delta > PI { TAU - delta } else { delta }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self - other).magnitude()
    }

    pub fn approx_eq(self, other: Point, threshold: f64) -> bool {
        (self.x - other.x).abs() < threshold && (self.y - other.y).abs() < threshold
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, s: f64) -> Point {
        Point::new(self.x * s, self.y * s)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// A 2D point kept both as exact power scalars and as a float pair.
#[derive(Clone, Debug, PartialEq)]
pub struct CartesianCoordinate {
    x: PowerScalar,
    y: PowerScalar,
    v: Point,
}

impl CartesianCoordinate {
    pub fn new(x: PowerScalar, y: PowerScalar) -> Self {
        let v = Point::new(x.to_number(true), y.to_number(true));
        Self { x, y, v }
    }

    /// Components become decimal power scalars.
    pub fn from_point(p: Point) -> Result<Self, ScalarError> {
        let x = PowerScalar::encode(p.x, Radix::Decimal)?;
        let y = PowerScalar::encode(p.y, Radix::Decimal)?;
        Ok(Self { x, y, v: p })
    }

    pub fn x(&self) -> &PowerScalar {
        &self.x
    }

    pub fn y(&self) -> &PowerScalar {
        &self.y
    }

    pub fn point(&self) -> Point {
        self.v
    }

    pub fn magnitude(&self) -> f64 {
        self.v.magnitude()
    }

    pub fn add(&self, other: &CartesianCoordinate) -> Result<Self, ScalarError> {
        Self::from_point(self.v + other.v)
    }

    pub fn subtract(&self, other: &CartesianCoordinate) -> Result<Self, ScalarError> {
        Self::from_point(self.v - other.v)
    }

    pub fn multiply(&self, s: f64) -> Result<Self, ScalarError> {
        Self::from_point(self.v * s)
    }

    pub fn divide(&self, s: f64) -> Result<Self, ScalarError> {
        Self::from_point(Point::new(self.v.x / s, self.v.y / s))
    }

    /// Scales the vector's length to `|v|^s`, keeping its direction.
    pub fn pow(&self, s: f64) -> Result<Self, ScalarError> {
        self.multiply(self.magnitude().powf(s - 1.0))
    }

    /// Vector-by-scalar operation. Addition and subtraction are not
    /// defined against a scalar.
    pub fn scale(&self, op: ArithOp, s: f64) -> Option<Result<Self, ScalarError>> {
        match op {
            ArithOp::Multiply => Some(self.multiply(s)),
            ArithOp::Divide => Some(self.divide(s)),
            ArithOp::Pow => Some(self.pow(s)),
            ArithOp::Add | ArithOp::Subtract => None,
        }
    }

    pub fn equals(&self, other: &CartesianCoordinate) -> bool {
        self.v.approx_eq(other.v, CARTESIAN_EQ_THRESHOLD)
    }

    /// `cc[x,y]` with both components rendered in `radix` (decimal if unset).
    pub fn to_literal(&self, radix: Option<Radix>) -> String {
        let radix = Some(radix.unwrap_or(Radix::Decimal));
        format!(
            "cc[{},{}]",
            self.x.to_literal(radix, true, None),
            self.y.to_literal(radix, true, None)
        )
    }
}

impl Neg for CartesianCoordinate {
    type Output = CartesianCoordinate;
    fn neg(self) -> CartesianCoordinate {
        CartesianCoordinate {
            x: -self.x,
            y: -self.y,
            v: -self.v,
        }
    }
}

impl fmt::Display for CartesianCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radix::DigitOrder;
    use approx::assert_relative_eq;

    fn cc(x: f64, y: f64) -> CartesianCoordinate {
        CartesianCoordinate::from_point(Point::new(x, y)).unwrap()
    }

    #[test]
    fn test_angle_between_wraps() {
        let a = Point::new(1.0, 0.0);
        let b = Point::new(0.0, -1.0);
        assert_relative_eq!(a.angle_between(b), PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(b.angle_between(a), PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(a.angle_between(-a), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_components_stay_in_sync() {
        let x = PowerScalar::parse("11", Radix::Binary, false, DigitOrder::HighFirst).unwrap();
        let y = PowerScalar::parse("0.2", Radix::Quaternary, false, DigitOrder::HighFirst)
            .unwrap();
        let c = CartesianCoordinate::new(x, y);
        assert_eq!(c.point(), Point::new(3.0, 0.5));

        let n = -c;
        assert_eq!(n.point(), Point::new(-3.0, -0.5));
        assert!(n.x().is_negative());
    }

    #[test]
    fn test_arithmetic() {
        let a = cc(-1.0, 2.0);
        assert!(a.add(&cc(1.0, 1.0)).unwrap().equals(&cc(0.0, 3.0)));
        assert!(a.subtract(&cc(1.0, 1.0)).unwrap().equals(&cc(-2.0, 1.0)));
        assert!(a.multiply(2.0).unwrap().equals(&cc(-2.0, 4.0)));
        assert!(a.divide(2.0).unwrap().equals(&cc(-0.5, 1.0)));
        assert!(a.pow(3.0).unwrap().equals(&cc(-5.0, 10.0)));
        assert!(a.scale(ArithOp::Add, 1.0).is_none());
    }

    #[test]
    fn test_divide_by_zero_errors() {
        assert!(cc(1.0, 0.0).divide(0.0).is_err());
    }

    #[test]
    fn test_literal() {
        assert_eq!(cc(5.0, 6.5).to_string(), "cc[0d5,0d6.5]");
        assert_eq!(cc(2.0, -1.0).to_literal(Some(Radix::Binary)), "cc[0b10,-0b1]");
    }
}
