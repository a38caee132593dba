//! Radix tables and float formatting in each supported base.

use std::fmt;

use num_bigint::BigUint;
use num_traits::FromPrimitive;

/// Numeral base of a power scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Radix {
    Binary,
    Quaternary,
    Decimal,
}

impl Radix {
    pub const ALL: [Radix; 3] = [Radix::Binary, Radix::Quaternary, Radix::Decimal];

    pub const fn value(self) -> u32 {
        match self {
            Radix::Binary => 2,
            Radix::Quaternary => 4,
            Radix::Decimal => 10,
        }
    }

    /// Literal tag: `b`, `q` or `d`.
    pub const fn tag(self) -> char {
        match self {
            Radix::Binary => 'b',
            Radix::Quaternary => 'q',
            Radix::Decimal => 'd',
        }
    }

    pub fn from_tag(tag: char) -> Option<Radix> {
        Radix::ALL.into_iter().find(|r| r.tag() == tag)
    }

    pub fn from_value(value: u32) -> Option<Radix> {
        Radix::ALL.into_iter().find(|r| r.value() == value)
    }

    /// Width of one digit level inside a packed byte. Decimal digits are
    /// stored as a plain integer and have no level width.
    pub const fn bits_per_level(self) -> Option<u32> {
        match self {
            Radix::Binary => Some(1),
            Radix::Quaternary => Some(2),
            Radix::Decimal => None,
        }
    }

    pub const fn levels_per_byte(self) -> Option<u32> {
        match self.bits_per_level() {
            Some(bits) => Some(crate::constants::BITS_PER_BYTE / bits),
            None => None,
        }
    }

    /// Denominator of the geometric series `d·r^p·Σ r^-k`, i.e. `r - 1`.
    pub const fn irrational_denominator(self) -> f64 {
        match self {
            Radix::Binary => 1.0,
            Radix::Quaternary => 3.0,
            Radix::Decimal => 9.0,
        }
    }

    /// Render a float in this base.
    ///
    /// Decimal uses the shortest round-trip form. Binary and quaternary
    /// expand the fraction exactly, which always terminates for an `f64`.
    pub fn format_float(self, value: f64) -> String {
        if value == 0.0 {
            return "0".to_string();
        }
        if self == Radix::Decimal {
            return format!("{value}");
        }
        let sign = if value < 0.0 { "-" } else { "" };
        let magnitude = value.abs();
        let int_part = magnitude.trunc();
        let mut frac = magnitude - int_part;

        let int_digits = BigUint::from_f64(int_part)
            .map(|n| n.to_str_radix(self.value()))
            .unwrap_or_else(|| "0".to_string());

        let base = f64::from(self.value());
        let mut frac_digits = String::new();
        while frac > 0.0 && frac_digits.len() < MAX_FRACTION_DIGITS {
            frac *= base;
            let digit = frac.trunc();
            frac -= digit;
            frac_digits.push(char::from(b'0' + digit as u8));
        }

        if frac_digits.is_empty() {
            format!("{sign}{int_digits}")
        } else {
            format!("{sign}{int_digits}.{frac_digits}")
        }
    }
}

// Smallest subnormal is 2^-1074, so no exact binary expansion is longer.
const MAX_FRACTION_DIGITS: usize = 1100;

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Order in which digit levels are stored: most significant first
/// (`h`, the default) or least significant first (`l`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DigitOrder {
    #[default]
    HighFirst,
    LowFirst,
}

impl DigitOrder {
    pub const fn tag(self) -> char {
        match self {
            DigitOrder::HighFirst => 'h',
            DigitOrder::LowFirst => 'l',
        }
    }

    pub fn from_tag(tag: char) -> Option<DigitOrder> {
        match tag {
            'h' => Some(DigitOrder::HighFirst),
            'l' => Some(DigitOrder::LowFirst),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables() {
        assert_eq!(Radix::Binary.levels_per_byte(), Some(8));
        assert_eq!(Radix::Quaternary.levels_per_byte(), Some(4));
        assert_eq!(Radix::Decimal.levels_per_byte(), None);
        assert_eq!(Radix::from_tag('q'), Some(Radix::Quaternary));
        assert_eq!(Radix::from_tag('x'), None);
        assert_eq!(Radix::from_value(10), Some(Radix::Decimal));
    }

    #[test]
    fn test_format_float() {
        assert_eq!(Radix::Quaternary.format_float(56.25), "320.1");
        assert_eq!(Radix::Binary.format_float(-3.25), "-11.01");
        assert_eq!(Radix::Binary.format_float(0.0), "0");
        assert_eq!(Radix::Decimal.format_float(7.0), "7");
        assert_eq!(Radix::Decimal.format_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(Radix::Quaternary.format_float(1.0 / 3.0).len(), 29);
    }
}
