//! Power scalars: signed numerals in radix 2, 4 or 10 with a digit-place
//! power shift and an optional repeating least-significant digit.
//!
//! Decimal digits are kept as a plain integer. Binary and quaternary digits
//! are packed into bytes, several fixed-width levels per byte, with the first
//! stored level in the high bits.

use std::fmt;
use std::ops::Neg;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::constants::{MAX_POWER, SCALAR_EQ_PRECISION};
use crate::error::ScalarError;
use crate::radix::{DigitOrder, Radix};

/// Raw digit storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Digits {
    Integer(u64),
    Bytes(Vec<u8>),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Sign {
    #[default]
    Positive,
    Negative,
}

impl Sign {
    pub const fn value(self) -> i8 {
        match self {
            Sign::Positive => 1,
            Sign::Negative => -1,
        }
    }

    pub fn from_value(value: i8) -> Option<Sign> {
        match value {
            1 => Some(Sign::Positive),
            -1 => Some(Sign::Negative),
            _ => None,
        }
    }

    pub const fn flipped(self) -> Sign {
        match self {
            Sign::Positive => Sign::Negative,
            Sign::Negative => Sign::Positive,
        }
    }
}

/// Binary operation shared by scalars and vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Pow,
}

impl ArithOp {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            ArithOp::Add => a + b,
            ArithOp::Subtract => a - b,
            ArithOp::Multiply => a * b,
            ArithOp::Divide => a / b,
            ArithOp::Pow => a.powf(b),
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Subtract => "-",
            ArithOp::Multiply => "*",
            ArithOp::Divide => "/",
            ArithOp::Pow => "**",
        }
    }

    pub const fn is_commutative(self) -> bool {
        matches!(self, ArithOp::Add | ArithOp::Multiply)
    }
}

/// Either side of a scalar operation. A plain number behaves as decimal.
#[derive(Clone, Copy, Debug)]
pub enum Operand<'a> {
    Number(f64),
    Scalar(&'a PowerScalar),
}

impl Operand<'_> {
    pub fn to_number(self) -> f64 {
        match self {
            Operand::Number(n) => n,
            Operand::Scalar(s) => s.to_number(true),
        }
    }

    fn radix(self) -> Radix {
        match self {
            Operand::Number(_) => Radix::Decimal,
            Operand::Scalar(s) => s.radix,
        }
    }
}

impl From<f64> for Operand<'_> {
    fn from(n: f64) -> Self {
        Operand::Number(n)
    }
}

impl<'a> From<&'a PowerScalar> for Operand<'a> {
    fn from(s: &'a PowerScalar) -> Self {
        Operand::Scalar(s)
    }
}

/// Float operation re-encoded in the left operand's radix.
pub fn arithmetic(op: ArithOp, a: Operand<'_>, b: Operand<'_>) -> Result<PowerScalar, ScalarError> {
    let result = op.apply(a.to_number(), b.to_number());
    PowerScalar::encode(result, a.radix())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerScalar {
    digits: Digits,
    radix: Radix,
    power: i32,
    sign: Sign,
    irrational: bool,
    order: DigitOrder,
}

struct RawDigits {
    digits: Vec<u8>,
    power: i32,
    sign: Sign,
}

fn parse_raw_digits(raw: &str, order: DigitOrder) -> Result<RawDigits, ScalarError> {
    let malformed = || ScalarError::Malformed {
        raw: raw.to_string(),
    };
    let (sign, body) = match raw.strip_prefix('-') {
        Some(rest) => (Sign::Negative, rest),
        None => (Sign::Positive, raw),
    };

    let len = body.chars().count();
    let mut digits = Vec::with_capacity(len);
    let mut point = None;
    for (i, c) in body.chars().enumerate() {
        if c == '.' {
            if point.is_some() {
                return Err(malformed());
            }
            point = Some(i);
        } else {
            let d = c.to_digit(10).ok_or_else(malformed)?;
            digits.push(d as u8);
        }
    }
    if digits.is_empty() {
        return Err(malformed());
    }

    let power = match (point, order) {
        (None, _) => 0,
        (Some(i), DigitOrder::HighFirst) => -((len - 1 - i) as i32),
        (Some(i), DigitOrder::LowFirst) => -(i as i32),
    };
    Ok(RawDigits {
        digits,
        power,
        sign,
    })
}

/// Pack digit levels into bytes, padding the side opposite to `order` with
/// zeros to complete the last byte.
pub fn digits_to_bytes(
    digits: &[u8],
    radix: Radix,
    order: DigitOrder,
) -> Result<Vec<u8>, ScalarError> {
    let (Some(bits), Some(per_byte)) = (radix.bits_per_level(), radix.levels_per_byte()) else {
        return Err(ScalarError::Malformed {
            raw: digits_text(digits),
        });
    };
    let per_byte = per_byte as usize;
    let values = radix.value() as u8;

    let pad = (per_byte - digits.len() % per_byte) % per_byte;
    let mut padded = Vec::with_capacity(digits.len() + pad);
    match order {
        DigitOrder::HighFirst => {
            padded.resize(pad, 0);
            padded.extend_from_slice(digits);
        }
        DigitOrder::LowFirst => {
            padded.extend_from_slice(digits);
            padded.resize(digits.len() + pad, 0);
        }
    }

    padded
        .chunks(per_byte)
        .map(|chunk| {
            let mut byte = 0u8;
            for (idx, &d) in chunk.iter().enumerate() {
                if d == values {
                    return Err(ScalarError::Imaginary {
                        raw: digits_text(digits),
                        radix,
                    });
                }
                if d > values {
                    return Err(ScalarError::DigitOutOfRange { digit: d, radix });
                }
                byte |= d << ((per_byte - 1 - idx) as u32 * bits);
            }
            Ok(byte)
        })
        .collect()
}

fn checked_power(power: i64) -> Result<i32, ScalarError> {
    i32::try_from(power)
        .ok()
        .filter(|p| p.abs() <= MAX_POWER)
        .ok_or(ScalarError::PowerOutOfRange { power })
}

fn digits_text(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

/// Accumulate high-first decimal digits into a u64. Digits that no longer fit
/// are dropped and returned as a positive power shift.
fn accumulate_decimal(digits: &[u8]) -> (u64, i32) {
    let mut value: u64 = 0;
    for (i, &d) in digits.iter().enumerate() {
        match value.checked_mul(10).and_then(|v| v.checked_add(u64::from(d))) {
            Some(v) => value = v,
            None => return (value, (digits.len() - i) as i32),
        }
    }
    (value, 0)
}

fn reverse_decimal(n: u64) -> u64 {
    n.to_string()
        .chars()
        .rev()
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

impl PowerScalar {
    /// Parse a digit string such as `-320.1` in the given radix.
    pub fn parse(
        raw: &str,
        radix: Radix,
        irrational: bool,
        order: DigitOrder,
    ) -> Result<Self, ScalarError> {
        let RawDigits {
            digits,
            power,
            sign,
        } = parse_raw_digits(raw, order)?;

        let least = match order {
            DigitOrder::HighFirst => digits.last(),
            DigitOrder::LowFirst => digits.first(),
        }
        .copied()
        .unwrap_or(0);
        let irrational = irrational && least != 0;

        if radix == Radix::Decimal {
            let mut ordered = digits;
            if order == DigitOrder::LowFirst {
                ordered.reverse();
            }
            let (value, dropped) = accumulate_decimal(&ordered);
            return Ok(PowerScalar {
                digits: Digits::Integer(value),
                radix,
                power: checked_power(i64::from(power) + i64::from(dropped))?,
                sign,
                irrational: irrational && dropped == 0,
                order: DigitOrder::HighFirst,
            });
        }

        let bytes = digits_to_bytes(&digits, radix, order)?;
        Ok(PowerScalar {
            digits: Digits::Bytes(bytes),
            radix,
            power: checked_power(i64::from(power))?,
            sign,
            irrational,
            order,
        })
    }

    /// Build from already separated digit levels (most significant first
    /// when `order` is high-first).
    pub fn from_levels(
        levels: &[u8],
        radix: Radix,
        power: i32,
        irrational: bool,
        order: DigitOrder,
    ) -> Result<Self, ScalarError> {
        let raw = digits_text(levels);
        let mut scalar = PowerScalar::parse(&raw, radix, irrational, order)?;
        scalar.power = checked_power(i64::from(scalar.power) + i64::from(power))?;
        Ok(scalar)
    }

    /// Assemble from stored parts, enforcing the storage invariants.
    pub fn from_parts(
        digits: Digits,
        radix: Radix,
        power: i32,
        sign: Sign,
        irrational: bool,
        order: DigitOrder,
    ) -> Result<Self, ScalarError> {
        let valid = match (&digits, radix) {
            (Digits::Integer(_), Radix::Decimal) => true,
            (Digits::Bytes(bytes), Radix::Binary | Radix::Quaternary) => !bytes.is_empty(),
            _ => false,
        };
        if !valid {
            return Err(ScalarError::Malformed {
                raw: format!("{digits:?} in radix {radix}"),
            });
        }
        let mut scalar = PowerScalar {
            digits,
            radix,
            power: checked_power(i64::from(power))?,
            sign,
            irrational,
            order,
        };
        scalar.irrational = irrational && scalar.least_digit() != 0;
        Ok(scalar)
    }

    /// Encode a float in the given radix.
    pub fn encode(value: f64, radix: Radix) -> Result<Self, ScalarError> {
        if !value.is_finite() {
            return Err(ScalarError::NonFinite { value });
        }
        PowerScalar::parse(&radix.format_float(value), radix, false, DigitOrder::HighFirst)
    }

    pub fn digits(&self) -> &Digits {
        &self.digits
    }

    pub fn radix(&self) -> Radix {
        self.radix
    }

    pub fn power(&self) -> i32 {
        self.power
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn is_negative(&self) -> bool {
        self.sign == Sign::Negative
    }

    pub fn is_irrational(&self) -> bool {
        self.irrational
    }

    pub fn order(&self) -> DigitOrder {
        self.order
    }

    /// Every packed level in storage order, padding included.
    fn packed_levels(&self) -> Vec<u8> {
        let Digits::Bytes(bytes) = &self.digits else {
            return Vec::new();
        };
        let (Some(bits), Some(per_byte)) =
            (self.radix.bits_per_level(), self.radix.levels_per_byte())
        else {
            return Vec::new();
        };
        let mask = (1u8 << bits) - 1;
        bytes
            .iter()
            .flat_map(move |&byte| {
                (0..per_byte).map(move |idx| (byte >> ((per_byte - 1 - idx) * bits)) & mask)
            })
            .collect()
    }

    /// Significant digit levels in storage order. Zero padding in the most
    /// significant byte is trimmed, keeping at least one level of that byte.
    pub fn digit_levels(&self) -> Vec<u8> {
        match &self.digits {
            Digits::Integer(n) => n.to_string().bytes().map(|b| b - b'0').collect(),
            Digits::Bytes(_) => {
                let mut levels = self.packed_levels();
                let per_byte = self.radix.levels_per_byte().unwrap_or(1) as usize;
                if self.order == DigitOrder::LowFirst {
                    levels.reverse();
                }
                let skip = levels
                    .iter()
                    .take(per_byte - 1)
                    .take_while(|&&d| d == 0)
                    .count();
                levels.drain(..skip);
                if self.order == DigitOrder::LowFirst {
                    levels.reverse();
                }
                levels
            }
        }
    }

    fn least_digit(&self) -> u8 {
        match (&self.digits, self.order) {
            (Digits::Integer(n), DigitOrder::HighFirst) => (n % 10) as u8,
            (Digits::Integer(n), DigitOrder::LowFirst) => {
                n.to_string().bytes().next().map_or(0, |b| b - b'0')
            }
            (Digits::Bytes(_), DigitOrder::HighFirst) => {
                self.packed_levels().last().copied().unwrap_or(0)
            }
            (Digits::Bytes(_), DigitOrder::LowFirst) => {
                self.packed_levels().first().copied().unwrap_or(0)
            }
        }
    }

    /// Numeric value. `signed = false` yields the magnitude.
    pub fn to_number(&self, signed: bool) -> f64 {
        let base = f64::from(self.radix.value());
        let mut n = match &self.digits {
            Digits::Integer(value) => {
                let value = match self.order {
                    DigitOrder::HighFirst => *value,
                    DigitOrder::LowFirst => reverse_decimal(*value),
                } as f64;
                if self.power >= 0 {
                    value * base.powi(self.power)
                } else {
                    value / base.powi(-self.power)
                }
            }
            Digits::Bytes(_) => {
                let bits = self.radix.bits_per_level().unwrap_or(1) as usize;
                let mut levels = self.packed_levels();
                if self.order == DigitOrder::LowFirst {
                    levels.reverse();
                }
                let mut acc = BigUint::zero();
                for level in levels {
                    acc = (acc << bits) + BigUint::from(level);
                }
                if self.power > 0 {
                    acc <<= self.power as usize * bits;
                }
                let value = acc.to_f64().unwrap_or(f64::INFINITY);
                if self.power < 0 {
                    value * base.powi(self.power)
                } else {
                    value
                }
            }
        };

        if self.irrational {
            n += f64::from(self.least_digit()) * base.powi(self.power)
                / self.radix.irrational_denominator();
        }
        if signed && self.is_negative() { -n } else { n }
    }

    /// Digits with the decimal point placed by `power`, without sign, prefix
    /// or repeating suffix. A different target radix goes through the float
    /// value and loses precision.
    pub fn to_digit_string(&self, target: Radix, show_power: bool) -> String {
        if target != self.radix {
            return target.format_float(self.to_number(false));
        }

        let mut levels = self.digit_levels();
        let high_first = self.order == DigitOrder::HighFirst;
        if show_power && self.power < 0 {
            let frac = (-self.power) as usize;
            if levels.len() <= frac {
                let missing = frac + 1 - levels.len();
                if high_first {
                    levels.splice(0..0, std::iter::repeat_n(0, missing));
                } else {
                    levels.extend(std::iter::repeat_n(0, missing));
                }
            }
            let point = if high_first {
                levels.len() - frac
            } else {
                frac
            };
            let mut text = digits_text(&levels);
            text.insert(point, '.');
            return text;
        }

        if show_power && self.power > 0 {
            let fill = if self.irrational { self.least_digit() } else { 0 };
            let shift = std::iter::repeat_n(fill, self.power as usize);
            if high_first {
                levels.extend(shift);
            } else {
                levels.splice(0..0, shift);
            }
        }
        digits_text(&levels)
    }

    /// Canonical literal: `[-][0<tag>]digits[i]`.
    ///
    /// `order` reverses the digit text when it differs from the order the
    /// digits were rendered in.
    pub fn to_literal(
        &self,
        radix: Option<Radix>,
        show_prefix: bool,
        order: Option<DigitOrder>,
    ) -> String {
        let radix = radix.unwrap_or(self.radix);
        let mut digits = self.to_digit_string(radix, true);
        let rendered_order = if radix == self.radix {
            self.order
        } else {
            DigitOrder::HighFirst
        };
        if order.is_some_and(|o| o != rendered_order) {
            digits = digits.chars().rev().collect();
        }

        let sign = if self.is_negative() { "-" } else { "" };
        let prefix = if show_prefix {
            format!("0{}", radix.tag())
        } else {
            String::new()
        };
        let suffix = if self.irrational && radix == self.radix {
            "i"
        } else {
            ""
        };
        format!("{sign}{prefix}{digits}{suffix}")
    }

    /// Approximate equality of the numeric values rounded to `precision`
    /// decimal places.
    pub fn equals_within(&self, other: &PowerScalar, precision: i32) -> bool {
        let scaled = (self.to_number(true) - other.to_number(true)) * 10f64.powi(precision);
        (scaled + 0.5).floor() == 0.0
    }

    pub fn equals(&self, other: &PowerScalar) -> bool {
        self.equals_within(other, SCALAR_EQ_PRECISION)
    }

    pub fn add(&self, other: Operand<'_>) -> Result<PowerScalar, ScalarError> {
        arithmetic(ArithOp::Add, self.into(), other)
    }

    pub fn subtract(&self, other: Operand<'_>) -> Result<PowerScalar, ScalarError> {
        arithmetic(ArithOp::Subtract, self.into(), other)
    }

    pub fn multiply(&self, other: Operand<'_>) -> Result<PowerScalar, ScalarError> {
        arithmetic(ArithOp::Multiply, self.into(), other)
    }

    pub fn divide(&self, other: Operand<'_>) -> Result<PowerScalar, ScalarError> {
        arithmetic(ArithOp::Divide, self.into(), other)
    }

    pub fn pow(&self, other: Operand<'_>) -> Result<PowerScalar, ScalarError> {
        arithmetic(ArithOp::Pow, self.into(), other)
    }

    pub fn abs(&self) -> Result<PowerScalar, ScalarError> {
        PowerScalar::encode(self.to_number(true).abs(), self.radix)
    }
}

impl Neg for PowerScalar {
    type Output = PowerScalar;
    fn neg(mut self) -> PowerScalar {
        self.sign = self.sign.flipped();
        self
    }
}

impl fmt::Display for PowerScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal(None, true, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn q(raw: &str) -> PowerScalar {
        PowerScalar::parse(raw, Radix::Quaternary, false, DigitOrder::HighFirst).unwrap()
    }

    fn parse_irr(raw: &str, radix: Radix) -> PowerScalar {
        PowerScalar::parse(raw, radix, true, DigitOrder::HighFirst).unwrap()
    }

    #[test]
    fn test_parse_packs_high_bits_first() {
        let s = parse_irr("320.1", Radix::Quaternary);
        assert_eq!(s.digits(), &Digits::Bytes(vec![0b1110_0001]));
        assert_eq!(s.power(), -1);
        assert!(s.is_irrational());
        assert_relative_eq!(s.to_number(true), 56.25 + 1.0 / 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_pads_opposite_to_order() {
        let high = PowerScalar::parse("11", Radix::Binary, false, DigitOrder::HighFirst).unwrap();
        assert_eq!(high.digits(), &Digits::Bytes(vec![0b0000_0011]));

        let low = PowerScalar::parse("11", Radix::Binary, false, DigitOrder::LowFirst).unwrap();
        assert_eq!(low.digits(), &Digits::Bytes(vec![0b1100_0000]));
        assert_eq!(low.to_number(true), 3.0);
    }

    #[test]
    fn test_to_number_cases() {
        assert_relative_eq!(q("3.2").to_number(true), 3.5);
        assert_relative_eq!(
            PowerScalar::parse("11.01", Radix::Binary, false, DigitOrder::HighFirst)
                .unwrap()
                .to_number(true),
            3.25
        );
        assert_relative_eq!(q("3.001").to_number(true), 3.015625);
        assert_relative_eq!(q("-12").to_number(true), -6.0);
        assert_relative_eq!(q("-12").to_number(false), 6.0);

        let high = q("1103.2222222222");
        let low =
            PowerScalar::parse("2222222222.3011", Radix::Quaternary, false, DigitOrder::LowFirst)
                .unwrap();
        assert_relative_eq!(high.to_number(true), 83.666_666_030_883_79, epsilon = 1e-9);
        assert_relative_eq!(low.to_number(true), high.to_number(true), epsilon = 1e-12);
    }

    #[test]
    fn test_irrational_contribution() {
        assert_relative_eq!(
            parse_irr("5.1", Radix::Decimal).to_number(true),
            5.0 + 1.0 / 9.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            parse_irr("31", Radix::Quaternary).to_number(true),
            13.0 + 1.0 / 3.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(parse_irr("0111", Radix::Binary).to_number(true), 8.0);
    }

    #[test]
    fn test_repeating_zero_is_rational() {
        let s = parse_irr("1.20", Radix::Quaternary);
        assert!(!s.is_irrational());
        let d = parse_irr("7.0", Radix::Decimal);
        assert!(!d.is_irrational());
        assert_eq!(d.to_number(true), 7.0);
    }

    #[test]
    fn test_imaginary_and_out_of_range() {
        let err = PowerScalar::parse("14", Radix::Quaternary, false, DigitOrder::HighFirst);
        assert!(matches!(err, Err(ScalarError::Imaginary { .. })), "{err:?}");

        let err = PowerScalar::parse("15", Radix::Quaternary, false, DigitOrder::HighFirst);
        assert!(matches!(err, Err(ScalarError::DigitOutOfRange { digit: 5, .. })));

        let err = PowerScalar::parse("1.2.3", Radix::Decimal, false, DigitOrder::HighFirst);
        assert!(matches!(err, Err(ScalarError::Malformed { .. })));
        assert!(PowerScalar::parse("-", Radix::Binary, false, DigitOrder::HighFirst).is_err());
    }

    #[test]
    fn test_decimal_overflow_moves_into_power() {
        let s = PowerScalar::parse(
            "123456789012345678901234",
            Radix::Decimal,
            false,
            DigitOrder::HighFirst,
        )
        .unwrap();
        assert!(s.power() > 0);
        assert_relative_eq!(s.to_number(true), 1.234_567_890_123_456_8e23, max_relative = 1e-15);
    }

    #[test]
    fn test_power_is_bounded() {
        let tiny = PowerScalar::encode(f64::from_bits(1), Radix::Binary).unwrap();
        assert!(tiny.power() >= -MAX_POWER);

        let order = DigitOrder::HighFirst;
        let err = PowerScalar::from_levels(&[1], Radix::Quaternary, MAX_POWER + 1, false, order);
        assert!(matches!(err, Err(ScalarError::PowerOutOfRange { .. })), "{err:?}");

        let err = PowerScalar::from_levels(&[1], Radix::Binary, i32::MIN, false, order);
        assert!(matches!(err, Err(ScalarError::PowerOutOfRange { .. })), "{err:?}");

        let err = PowerScalar::from_parts(
            Digits::Integer(1),
            Radix::Decimal,
            i32::MAX,
            Sign::Positive,
            false,
            DigitOrder::HighFirst,
        );
        assert!(matches!(
            err,
            Err(ScalarError::PowerOutOfRange { power }) if power == i64::from(i32::MAX)
        ));
    }

    #[test]
    fn test_digit_string() {
        assert_eq!(q("320.1").to_digit_string(Radix::Quaternary, true), "320.1");
        assert_eq!(q("0.2").to_digit_string(Radix::Quaternary, true), "0.2");
        assert_eq!(q("0.02").to_digit_string(Radix::Quaternary, true), "0.02");
        assert_eq!(q("0031").to_digit_string(Radix::Quaternary, false), "31");
        assert_eq!(q("320.1").to_digit_string(Radix::Decimal, true), "56.25");

        let shifted = PowerScalar::from_parts(
            Digits::Bytes(vec![3]),
            Radix::Quaternary,
            2,
            Sign::Positive,
            false,
            DigitOrder::HighFirst,
        )
        .unwrap();
        assert_eq!(shifted.to_digit_string(Radix::Quaternary, true), "300");
        assert_eq!(shifted.to_number(true), 48.0);

        let low = PowerScalar::parse("1.023", Radix::Quaternary, false, DigitOrder::LowFirst)
            .unwrap();
        assert_eq!(low.to_digit_string(Radix::Quaternary, true), "1.023");
        assert_eq!(low.to_number(true), 56.25);
    }

    #[test]
    fn test_literal() {
        assert_eq!(parse_irr("320.1", Radix::Quaternary).to_string(), "0q320.1i");
        assert_eq!((-q("12")).to_string(), "-0q12");
        assert_eq!(q("12").to_literal(Some(Radix::Decimal), true, None), "0d6");
        assert_eq!(q("12").to_literal(None, false, Some(DigitOrder::LowFirst)), "21");
    }

    #[test]
    fn test_equals() {
        let d = parse_irr("5.9", Radix::Decimal);
        let b = parse_irr("101.1", Radix::Binary);
        assert!(d.equals(&b), "{} vs {}", d.to_number(true), b.to_number(true));

        let q_irr = parse_irr("11.3", Radix::Quaternary);
        assert!(q_irr.equals(&b));
        assert!(!q("1").equals(&q("2")));
        assert!(q("3.2").equals_within(&q("3.201"), 1));
    }

    #[test]
    fn test_arithmetic_keeps_left_radix() {
        let a = q("3");
        let b = PowerScalar::parse("11", Radix::Binary, false, DigitOrder::HighFirst).unwrap();
        let sum = a.add((&b).into()).unwrap();
        assert_eq!(sum.radix(), Radix::Quaternary);
        assert_eq!(sum.to_string(), "0q12");

        let from_number = arithmetic(ArithOp::Multiply, Operand::Number(2.0), (&a).into()).unwrap();
        assert_eq!(from_number.radix(), Radix::Decimal);
        assert_eq!(from_number.to_number(true), 6.0);

        let neg = a.subtract(Operand::Number(5.0)).unwrap();
        assert_eq!(neg.to_string(), "-0q2");
        assert_eq!(neg.abs().unwrap().to_string(), "0q2");
    }

    #[test]
    fn test_non_finite_result_errors() {
        let err = q("1").divide(Operand::Number(0.0));
        assert!(matches!(err, Err(ScalarError::NonFinite { .. })));
    }
}
