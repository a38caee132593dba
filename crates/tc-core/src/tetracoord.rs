//! Tetracoordinates: points of a self-similar triangular lattice addressed
//! by base-4 direction digits, and the conversions to and from cartesian
//! space.
//!
//! Digit `0` steps into the centre sub-cell, which is mirrored relative to
//! its parent, so every `0` toggles the sign applied to the steps below it.

use std::fmt;

use crate::cartesian::{CartesianCoordinate, Point};
use crate::constants::{COS_PI_OVER_6, MAX_POWER, SIN_PI_OVER_6};
use crate::error::ScalarError;
use crate::radix::{DigitOrder, Radix};
use crate::scalar::{ArithOp, PowerScalar};

/// Lattice rotation applied to digits before the unit-vector lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl Orientation {
    pub const fn tag(self) -> &'static str {
        match self {
            Orientation::Up => "up",
            Orientation::Down => "dn",
            Orientation::Left => "lf",
            Orientation::Right => "rt",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Orientation> {
        [
            Orientation::Up,
            Orientation::Down,
            Orientation::Left,
            Orientation::Right,
        ]
        .into_iter()
        .find(|o| o.tag() == tag)
    }
}

/// Signed step direction. `Imaginary` (±4) only arises from left/right
/// remapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Origin,
    One,
    Two,
    Three,
    NegOne,
    NegTwo,
    NegThree,
    Imaginary,
    NegImaginary,
}

impl Direction {
    fn unit(self) -> Point {
        match self {
            Direction::Origin => Point::ZERO,
            Direction::One => Point::new(0.0, 1.0),
            Direction::Two => Point::new(-COS_PI_OVER_6, -SIN_PI_OVER_6),
            Direction::Three => Point::new(COS_PI_OVER_6, -SIN_PI_OVER_6),
            Direction::NegOne => Point::new(0.0, -1.0),
            Direction::NegTwo => Point::new(COS_PI_OVER_6, SIN_PI_OVER_6),
            Direction::NegThree => Point::new(-COS_PI_OVER_6, SIN_PI_OVER_6),
            Direction::Imaginary => Point::new(1.0, 0.0),
            Direction::NegImaginary => Point::new(-1.0, 0.0),
        }
    }
}

fn reorient(digit: u8, orientation: Orientation) -> Direction {
    use Direction::*;
    match (digit & 0b11, orientation) {
        (0, _) => Origin,
        (1, Orientation::Up) => One,
        (2, Orientation::Up) => Two,
        (_, Orientation::Up) => Three,
        (1, Orientation::Down) => NegOne,
        (2, Orientation::Down) => NegTwo,
        (_, Orientation::Down) => NegThree,
        (1, Orientation::Left) => NegImaginary,
        (2, Orientation::Left) => Three,
        (_, Orientation::Left) => NegTwo,
        (1, Orientation::Right) => Imaginary,
        (2, Orientation::Right) => NegThree,
        (_, Orientation::Right) => Two,
    }
}

/// Cartesian step of one digit at `level`, negated when `flip` is set.
pub fn digit_to_cartesian(digit: u8, orientation: Orientation, level: i32, flip: bool) -> Point {
    let unit = reorient(digit, orientation).unit();
    let unit = if flip { -unit } else { unit };
    unit * 2f64.powi(level)
}

/// Distance from a cell's centroid to its nearest edge at `level`.
pub fn cell_radius(level: i32) -> f64 {
    2f64.powi(level) / 2.0
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tetracoordinate {
    value: PowerScalar,
    num_levels: usize,
}

impl Tetracoordinate {
    /// Wrap a scalar. Non-quaternary scalars are re-encoded through their
    /// float value.
    pub fn from_scalar(value: PowerScalar) -> Result<Self, ScalarError> {
        let value = if value.radix() == Radix::Quaternary {
            value
        } else {
            PowerScalar::encode(value.to_number(true), Radix::Quaternary)?
        };
        let num_levels = value.digit_levels().len();
        Ok(Self { value, num_levels })
    }

    /// Parse quaternary digits such as `31.2`.
    pub fn parse(quads: &str, order: DigitOrder, irrational: bool) -> Result<Self, ScalarError> {
        Self::from_scalar(PowerScalar::parse(
            quads,
            Radix::Quaternary,
            irrational,
            order,
        )?)
    }

    /// Build from direction digits shifted by `power` places.
    pub fn from_levels(
        levels: &[u8],
        order: DigitOrder,
        power: i32,
        irrational: bool,
    ) -> Result<Self, ScalarError> {
        Self::from_scalar(PowerScalar::from_levels(
            levels,
            Radix::Quaternary,
            power,
            irrational,
            order,
        )?)
    }

    /// Reassemble a stored value. `num_levels` never exceeds the significant
    /// digits of `value`.
    pub fn from_parts(value: PowerScalar, num_levels: usize) -> Result<Self, ScalarError> {
        if value.radix() != Radix::Quaternary {
            return Err(ScalarError::Malformed {
                raw: format!("tetracoordinate value {value}"),
            });
        }
        let significant = value.digit_levels().len();
        Ok(Self {
            value,
            num_levels: num_levels.clamp(1, significant),
        })
    }

    pub fn value(&self) -> &PowerScalar {
        &self.value
    }

    pub fn num_levels(&self) -> usize {
        self.num_levels
    }

    pub fn power(&self) -> i32 {
        self.value.power()
    }

    pub fn is_irrational(&self) -> bool {
        self.value.is_irrational()
    }

    /// Significant direction digits in storage order.
    pub fn quad_digits(&self) -> Vec<u8> {
        let mut levels = self.value.digit_levels();
        if levels.len() > self.num_levels {
            let excess = levels.len() - self.num_levels;
            match self.value.order() {
                DigitOrder::HighFirst => {
                    levels.drain(..excess);
                }
                DigitOrder::LowFirst => levels.truncate(self.num_levels),
            }
        }
        levels
    }

    fn cartesian_point(&self, orientation: Orientation) -> Point {
        let mut digits = self.quad_digits();
        if self.value.order() == DigitOrder::LowFirst {
            digits.reverse();
        }

        let mut level = digits.len() as i32 - 1 + self.value.power();
        let mut level_even = level.rem_euclid(2) == 0;
        let mut sum = Point::ZERO;
        let mut last = Point::ZERO;
        for digit in digits {
            last = digit_to_cartesian(digit, orientation, level, !level_even);
            sum = sum + last;
            level -= 1;
            if digit == 0 {
                level_even = !level_even;
            }
        }

        if self.value.is_irrational() {
            sum = sum + last;
        }
        if self.value.is_negative() { -sum } else { sum }
    }

    pub fn to_cartesian(&self, orientation: Orientation) -> Result<CartesianCoordinate, ScalarError> {
        CartesianCoordinate::from_point(self.cartesian_point(orientation))
    }

    /// Greedy level-by-level search for the lattice cell containing `target`,
    /// down to `precision` (a digit place, may be negative).
    pub fn from_cartesian(
        target: Point,
        precision: i32,
        allow_irrational: bool,
        order: DigitOrder,
        orientation: Orientation,
    ) -> Result<Self, ScalarError> {
        if !target.is_finite() {
            return Err(ScalarError::NonFinite {
                value: target.magnitude(),
            });
        }
        if precision.checked_abs().is_none_or(|p| p > MAX_POWER) {
            return Err(ScalarError::PowerOutOfRange {
                power: i64::from(precision),
            });
        }

        let cell = cell_radius(precision);
        let dist = target.magnitude();
        let scale = dist.log2().ceil().max(0.0) as i32;
        let mut search = Search {
            target,
            loc: Point::ZERO,
            delta: target,
            dist,
            flip: if scale % 2 != 0 { -1.0 } else { 1.0 },
            units: [1, 2, 3].map(|d| reorient(d, orientation).unit()),
        };

        let mut power = scale;
        let mut digits = Vec::new();
        while search.dist > cell && power >= precision {
            digits.push(search.step(power));
            power -= 1;
        }

        let mut irrational = false;
        if allow_irrational && search.dist >= cell {
            // a repeating digit one place down spans the same length as one step here
            let digit = search.step(power + 1);
            if digit != 0 {
                irrational = true;
                digits.push(digit);
            }
        }

        let fill = (scale + 1 - precision) - digits.len() as i32;
        if fill > 0 {
            digits.extend(std::iter::repeat_n(0, fill as usize));
        } else if digits.is_empty() {
            digits.push(0);
        }

        let power = scale + 1 - digits.len() as i32;
        if order == DigitOrder::LowFirst {
            digits.reverse();
        }
        Self::from_levels(&digits, order, power, irrational)
    }

    pub fn from_cartesian_coord(cc: &CartesianCoordinate) -> Result<Self, ScalarError> {
        Self::from_cartesian(cc.point(), 0, true, DigitOrder::HighFirst, Orientation::Up)
    }

    pub fn magnitude(&self) -> f64 {
        self.cartesian_point(Orientation::Up).magnitude()
    }

    /// Same-sign rational values compare natively. Anything else compares
    /// cartesian images within the finer operand's cell radius (never
    /// coarser than level 0).
    pub fn equals(&self, other: &Tetracoordinate) -> bool {
        if !self.is_irrational()
            && !other.is_irrational()
            && self.value.sign() == other.value.sign()
        {
            return self.value.equals(&other.value);
        }
        let level = 0.min(self.power()).min(other.power());
        let dist = self
            .cartesian_point(Orientation::Up)
            .distance(other.cartesian_point(Orientation::Up));
        dist < cell_radius(level)
    }

    fn reconvert(p: Point, precision: i32) -> Result<Self, ScalarError> {
        Self::from_cartesian(p, precision, true, DigitOrder::HighFirst, Orientation::Up)
    }

    pub fn add(&self, other: &Tetracoordinate) -> Result<Self, ScalarError> {
        let p = self.cartesian_point(Orientation::Up) + other.cartesian_point(Orientation::Up);
        Self::reconvert(p, self.power().min(other.power()))
    }

    pub fn subtract(&self, other: &Tetracoordinate) -> Result<Self, ScalarError> {
        let p = self.cartesian_point(Orientation::Up) - other.cartesian_point(Orientation::Up);
        Self::reconvert(p, self.power().min(other.power()))
    }

    /// Vector-by-scalar operation through cartesian space, reconverted at
    /// level 0. `None` for addition and subtraction.
    pub fn scale(&self, op: ArithOp, s: f64) -> Option<Result<Self, ScalarError>> {
        let cc = match self.to_cartesian(Orientation::Up) {
            Ok(cc) => cc,
            Err(e) => return Some(Err(e)),
        };
        let scaled = cc.scale(op, s)?;
        Some(scaled.and_then(|c| Self::reconvert(c.point(), 0)))
    }

    /// `tc[value]`, the value rendered in `radix` (quaternary if unset).
    pub fn to_literal(&self, radix: Option<Radix>) -> String {
        format!("tc[{}]", self.value.to_literal(radix, true, None))
    }

    pub fn negate(&self) -> Result<Self, ScalarError> {
        Self::reconvert(-self.cartesian_point(Orientation::Up), self.power().min(0))
    }
}

struct Search {
    target: Point,
    loc: Point,
    delta: Point,
    dist: f64,
    flip: f64,
    units: [Point; 3],
}

impl Search {
    /// Take the step whose direction is closest to the remaining
    /// displacement, or stay put (digit 0) if it moves away from the target.
    fn step(&mut self, power: i32) -> u8 {
        let mut best = 0;
        let mut best_angle = f64::INFINITY;
        for (i, unit) in self.units.iter().enumerate() {
            let angle = self.delta.angle_between(*unit * self.flip);
            if angle < best_angle {
                best = i;
                best_angle = angle;
            }
        }

        let loc = self.loc + self.units[best] * (2f64.powi(power) * self.flip);
        let delta = self.target - loc;
        let dist = delta.magnitude();
        if dist > self.dist {
            self.flip = -self.flip;
            return 0;
        }
        self.loc = loc;
        self.delta = delta;
        self.dist = dist;
        best as u8 + 1
    }
}

impl fmt::Display for Tetracoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tc(quads: &str) -> Tetracoordinate {
        Tetracoordinate::parse(quads, DigitOrder::HighFirst, false).unwrap()
    }

    #[test]
    fn test_unit_digits() {
        let three = tc("3").to_cartesian(Orientation::Up).unwrap().point();
        assert_relative_eq!(three.x, COS_PI_OVER_6);
        assert_relative_eq!(three.y, -SIN_PI_OVER_6);

        let one_down = tc("1").to_cartesian(Orientation::Down).unwrap().point();
        assert_eq!(one_down, Point::new(0.0, -1.0));
        let one_left = tc("1").to_cartesian(Orientation::Left).unwrap().point();
        assert_eq!(one_left, Point::new(-1.0, 0.0));
    }

    #[test]
    fn test_zero_mirrors_lower_levels() {
        let p = tc("101").to_cartesian(Orientation::Up).unwrap().point();
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 3.0);

        let neg = Tetracoordinate::from_parts(-tc("101").value().clone(), 3).unwrap();
        let p = neg.to_cartesian(Orientation::Up).unwrap().point();
        assert_relative_eq!(p.y, -3.0);
    }

    #[test]
    fn test_irrational_repeats_last_step() {
        let t = Tetracoordinate::parse("0.2", DigitOrder::HighFirst, true).unwrap();
        let p = t.to_cartesian(Orientation::Up).unwrap().point();
        let two = Point::new(-COS_PI_OVER_6, -SIN_PI_OVER_6);
        // level -1 under an odd top level: flipped, half length, counted twice
        assert_relative_eq!(p.x, -two.x, epsilon = 1e-12);
        assert_relative_eq!(p.y, -two.y, epsilon = 1e-12);
    }

    #[test]
    fn test_from_cartesian_unit() {
        let t = Tetracoordinate::from_cartesian(
            Point::new(0.0, 1.0),
            0,
            true,
            DigitOrder::HighFirst,
            Orientation::Up,
        )
        .unwrap();
        assert_eq!(t.to_string(), "tc[0q1]");
        assert!(t.equals(&tc("1")));
    }

    #[test]
    fn test_from_cartesian_recovers_digits() {
        for quads in ["31", "10", "12", "33", "101", "2.31", "1230.03"] {
            let t = tc(quads);
            let p = t.to_cartesian(Orientation::Up).unwrap().point();
            let back = Tetracoordinate::from_cartesian(
                p,
                t.power(),
                true,
                DigitOrder::HighFirst,
                Orientation::Up,
            )
            .unwrap();
            assert!(back.equals(&t), "{quads}: got {back}");
            assert_eq!(back.quad_digits(), t.quad_digits(), "{quads}");
        }
    }

    #[test]
    fn test_down_orientation_round_trip() {
        let t = tc("3021");
        let p = t.to_cartesian(Orientation::Down).unwrap().point();
        let back = Tetracoordinate::from_cartesian(
            p,
            0,
            false,
            DigitOrder::HighFirst,
            Orientation::Down,
        )
        .unwrap();
        assert!(back.equals(&t), "got {back}");
    }

    #[test]
    fn test_origin() {
        let t = Tetracoordinate::from_cartesian(
            Point::ZERO,
            -2,
            true,
            DigitOrder::HighFirst,
            Orientation::Up,
        )
        .unwrap();
        assert_eq!(t.power(), -2);
        assert_eq!(t.to_cartesian(Orientation::Up).unwrap().point(), Point::ZERO);
    }

    #[test]
    fn test_low_first_digits() {
        let low = Tetracoordinate::parse("13", DigitOrder::LowFirst, false).unwrap();
        assert_eq!(low.quad_digits(), vec![1, 3]);
        let p = low.to_cartesian(Orientation::Up).unwrap().point();
        let q = tc("31").to_cartesian(Orientation::Up).unwrap().point();
        assert_relative_eq!(p.x, q.x);
        assert_relative_eq!(p.y, q.y);
    }

    #[test]
    fn test_arithmetic_through_cartesian() {
        let neg_three = tc("3").negate().unwrap();
        assert!(neg_three.is_irrational(), "got {neg_three}");
        let sum = tc("1").add(&neg_three).unwrap();
        assert!(sum.equals(&tc("32")), "got {sum}");

        let doubled = tc("1").scale(ArithOp::Multiply, 2.0).unwrap().unwrap();
        assert_relative_eq!(doubled.magnitude(), 2.0, epsilon = 1e-12);
        assert!(tc("1").scale(ArithOp::Add, 1.0).is_none());
    }

    #[test]
    fn test_mixed_sign_equality_uses_geometry() {
        let signed = Tetracoordinate::from_parts(-tc("32").value().clone(), 2).unwrap();
        let rebuilt = tc("32").negate().unwrap();
        assert_eq!(rebuilt.to_string(), "tc[0q12]");
        assert!(signed.equals(&rebuilt));
        assert!(rebuilt.equals(&signed));
        assert!(!signed.equals(&tc("32")));
    }

    #[test]
    fn test_equal_angles_prefer_lower_direction() {
        // straight up from an odd scale, directions 2 and 3 are equally close
        let target = Point::new(0.0, 2.0);
        let order = DigitOrder::HighFirst;

        let t = Tetracoordinate::from_cartesian(target, 0, false, order, Orientation::Up).unwrap();
        assert_eq!(t.quad_digits(), vec![2, 3]);
        assert_eq!(t.power(), 0);
        let p = t.to_cartesian(Orientation::Up).unwrap().point();
        assert_relative_eq!(p.x, COS_PI_OVER_6, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.5, epsilon = 1e-12);

        let t = Tetracoordinate::from_cartesian(target, 0, true, order, Orientation::Up).unwrap();
        assert_eq!(t.quad_digits(), vec![2, 3, 3]);
        assert_eq!(t.power(), -1);
        assert!(t.is_irrational());
    }

    #[test]
    fn test_precision_is_bounded() {
        let order = DigitOrder::HighFirst;
        for precision in [i32::MIN, -MAX_POWER - 1, MAX_POWER + 1] {
            let err = Tetracoordinate::from_cartesian(
                Point::new(1.0, 1.0),
                precision,
                false,
                order,
                Orientation::Up,
            );
            assert!(matches!(err, Err(ScalarError::PowerOutOfRange { .. })), "{precision}");
        }
    }

    #[test]
    fn test_cell_radius() {
        assert_eq!(cell_radius(0), 0.5);
        assert_eq!(cell_radius(2), 2.0);
        assert_eq!(cell_radius(-1), 0.25);
    }
}
