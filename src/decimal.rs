//! Exact base-10 numbers and their user-facing text form.
//!
//! Values are kept as an arbitrary-precision integer mantissa scaled by a
//! power of ten, so conversions between units never pick up binary
//! floating-point error. Text shown to the user uses a comma as decimal
//! separator; input accepts either a comma or a period.

use crate::error::ParseError;
use num_bigint::{BigInt, Sign};
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul};
use std::str::FromStr;

/// An exact decimal number: `mantissa / 10^scale`.
///
/// Always normalized: when `scale > 0` the mantissa has no trailing zero
/// digit, and zero has scale 0. Derived equality is therefore numeric
/// equality (`5.000 == 5`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

fn ten_pow(exp: u32) -> BigInt {
    num_traits::pow(BigInt::from(10u8), exp as usize)
}

impl Decimal {
    pub fn new(mantissa: impl Into<BigInt>, scale: u32) -> Self {
        let mut d = Self {
            mantissa: mantissa.into(),
            scale,
        };
        d.normalize();
        d
    }

    pub fn zero() -> Self {
        Self::new(0, 0)
    }

    fn normalize(&mut self) {
        if self.mantissa.is_zero() {
            self.scale = 0;
            return;
        }
        let ten = BigInt::from(10u8);
        while self.scale > 0 && (&self.mantissa % &ten).is_zero() {
            self.mantissa = &self.mantissa / &ten;
            self.scale -= 1;
        }
    }

    /// Number of digits after the decimal point in the shortest exact form.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_integer(&self) -> bool {
        self.scale == 0
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.mantissa.is_positive()
    }

    /// `self × 10^exp`, exact for any sign of `exp`.
    pub fn scale_pow10(&self, exp: i32) -> Self {
        if exp >= 0 {
            Self::new(&self.mantissa * ten_pow(exp.unsigned_abs()), self.scale)
        } else {
            Self::new(self.mantissa.clone(), self.scale + exp.unsigned_abs())
        }
    }

    /// Canonical text with a period separator, e.g. `-12.05`.
    fn canonical(&self, separator: char) -> String {
        let digits = self.mantissa.abs().to_string();
        let sign = if self.mantissa.sign() == Sign::Minus {
            "-"
        } else {
            ""
        };

        if self.scale == 0 {
            return format!("{sign}{digits}");
        }

        let scale = self.scale as usize;
        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (whole, frac) = padded.split_at(padded.len() - scale);
        format!("{sign}{whole}{separator}{frac}")
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for Decimal {
    fn from(v: i64) -> Self {
        Self::new(v, 0)
    }
}

impl From<u32> for Decimal {
    fn from(v: u32) -> Self {
        Self::new(v, 0)
    }
}

impl Add for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        let scale = self.scale.max(rhs.scale);
        let lhs_m = &self.mantissa * ten_pow(scale - self.scale);
        let rhs_m = &rhs.mantissa * ten_pow(scale - rhs.scale);
        Decimal::new(lhs_m + rhs_m, scale)
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        &self + &rhs
    }
}

impl Mul for &Decimal {
    type Output = Decimal;

    fn mul(self, rhs: &Decimal) -> Decimal {
        Decimal::new(&self.mantissa * &rhs.mantissa, self.scale + rhs.scale)
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        &self * &rhs
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical('.'))
    }
}

/// Strict literal grammar: `[+-]? digits? ('.' digits?)?` with at least one digit.
impl FromStr for Decimal {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::Invalid(s.to_string());

        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let mut parts = body.split('.');
        let whole = parts.next().unwrap_or_default();
        let frac = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(invalid());
        }

        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(frac) || whole.len() + frac.len() == 0 {
            return Err(invalid());
        }

        let mut mantissa: BigInt = format!("{whole}{frac}").parse().map_err(|_| invalid())?;
        if negative {
            mantissa = -mantissa;
        }
        let scale = u32::try_from(frac.len()).map_err(|_| invalid())?;
        Ok(Decimal::new(mantissa, scale))
    }
}

impl From<Decimal> for String {
    fn from(d: Decimal) -> Self {
        d.to_string()
    }
}

impl TryFrom<String> for Decimal {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Render for display: comma separator, no thousands grouping, no trailing
/// fractional zeros, integers without a separator.
pub fn format(value: &Decimal) -> String {
    value.canonical(',')
}

/// Read a number typed by the user.
///
/// Surrounding whitespace is trimmed, spaces inside the number are dropped
/// and either `,` or `.` is accepted as the decimal separator.
pub fn parse(text: &str) -> Result<Decimal, ParseError> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return Err(ParseError::Empty);
    }

    cleaned
        .parse()
        .map_err(|_| ParseError::Invalid(text.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_integers_have_no_separator() {
        assert_eq!(format(&Decimal::from(3i64)), "3");
        assert_eq!(format(&dec("3.0")), "3");
        assert_eq!(format(&dec("5000")), "5000");
        assert_eq!(format(&Decimal::zero()), "0");
    }

    #[test]
    fn test_format_uses_comma_and_strips_trailing_zeros() {
        assert_eq!(format(&dec("12.50")), "12,5");
        assert_eq!(format(&dec("0.007")), "0,007");
        assert_eq!(format(&dec("-0.25")), "-0,25");
        assert_eq!(format(&dec("1234567.891")), "1234567,891");
    }

    #[test]
    fn test_exact_addition() {
        let sum = dec("0.1") + dec("0.2");
        assert_eq!(format(&sum), "0,3");
        assert_eq!(sum, dec("0.3"));
    }

    #[test]
    fn test_multiplication_and_powers_of_ten() {
        assert_eq!(dec("1.5") * dec("0.2"), dec("0.3"));
        assert_eq!(dec("5").scale_pow10(3), dec("5000"));
        assert_eq!(dec("5000").scale_pow10(-3), dec("5"));
        assert_eq!(dec("0.004").scale_pow10(-6), dec("0.000000004"));
        assert_eq!(dec("0.004").scale_pow10(0), dec("0.004"));
    }

    #[test]
    fn test_normalization_makes_equal_values_equal() {
        assert_eq!(Decimal::new(5000, 3), Decimal::from(5i64));
        assert_eq!(Decimal::new(0, 7).scale(), 0);
        assert!(Decimal::new(120, 1).is_integer());
        assert!(!Decimal::new(125, 1).is_integer());
    }

    #[test]
    fn test_parse_accepts_either_separator() {
        assert_eq!(parse("12,5").unwrap(), dec("12.5"));
        assert_eq!(parse("12.5").unwrap(), dec("12.5"));
        assert_eq!(parse(",5").unwrap(), dec("0.5"));
        assert_eq!(parse("5.").unwrap(), dec("5"));
    }

    #[test]
    fn test_parse_trims_and_drops_inner_spaces() {
        assert_eq!(parse("  42 \n").unwrap(), dec("42"));
        assert_eq!(parse("1 000 000").unwrap(), dec("1000000"));
        assert_eq!(parse("1\u{a0}250,5").unwrap(), dec("1250.5"));
    }

    #[test]
    fn test_parse_comma_is_never_a_thousands_separator() {
        assert_eq!(parse("5,000").unwrap(), dec("5"));
        assert_eq!(parse("5,000").unwrap(), parse("5000").unwrap().scale_pow10(-3));
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("\t\n"), Err(ParseError::Empty));
    }

    #[test]
    fn test_parse_rejects_non_numbers() {
        for text in ["abc", "1,2,3", "1.000,5", "12a", "--1", "1e3", "NaN", "inf", ".", "-", "5 m"] {
            assert!(
                matches!(parse(text), Err(ParseError::Invalid(_))),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_signs() {
        assert_eq!(parse("-3,5").unwrap(), dec("-3.5"));
        assert_eq!(parse("+3").unwrap(), dec("3"));
    }

    #[test]
    fn test_serde_uses_canonical_text() {
        let json = serde_json::to_string(&dec("0.125")).unwrap();
        assert_eq!(json, "\"0.125\"");
        let back: Decimal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dec("0.125"));
        assert!(serde_json::from_str::<Decimal>("\"1,2,3\"").is_err());
    }
}
