//! Arbitrary-precision decimal numbers.
//!
//! The wire format carries decimals as their literal string form under
//! the `f` tag. [`BigDec`] keeps that exactness as an unscaled
//! [`BigInt`] and a base-10 scale: the numeric value is
//! `unscaled x 10^-scale`. Parsing and display are lossless inverses, so
//! a decimal read off the wire is re-emitted unchanged.

use crate::{Error, Result};
use num_bigint::BigInt;
use std::fmt;
use std::str::FromStr;

/// An arbitrary-precision decimal number.
///
/// # Examples
///
/// ```rust
/// use transit::BigDec;
///
/// let d: BigDec = "3.14159265358979323846".parse().unwrap();
/// assert_eq!(d.scale(), 20);
/// assert_eq!(d.to_string(), "3.14159265358979323846");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigDec {
    unscaled: BigInt,
    scale: i64,
}

impl BigDec {
    /// Creates a decimal from an unscaled integer and a base-10 scale.
    ///
    /// The numeric value is `unscaled x 10^-scale`; a negative scale
    /// shifts the value left of the decimal point.
    #[must_use]
    pub fn new(unscaled: BigInt, scale: i64) -> Self {
        BigDec { unscaled, scale }
    }

    /// The unscaled integer component.
    #[must_use]
    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    /// The base-10 scale.
    #[must_use]
    pub fn scale(&self) -> i64 {
        self.scale
    }
}

impl FromStr for BigDec {
    type Err = Error;

    /// Parses a decimal literal: `[sign] digits [. digits] [(e|E) [sign] digits]`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::custom(format!("invalid decimal literal `{s}`"));

        let (mantissa, exp_part) = match s.find(['e', 'E']) {
            Some(i) => (&s[..i], Some(&s[i + 1..])),
            None => (s, None),
        };
        let exp: i64 = match exp_part {
            Some(e) => e.parse().map_err(|_| invalid())?,
            None => 0,
        };
        let (int_part, frac_part) = match mantissa.find('.') {
            Some(i) => (&mantissa[..i], &mantissa[i + 1..]),
            None => (mantissa, ""),
        };

        let mut digits = String::with_capacity(int_part.len() + frac_part.len());
        digits.push_str(int_part);
        digits.push_str(frac_part);
        let unscaled = BigInt::from_str(&digits).map_err(|_| invalid())?;

        Ok(BigDec {
            unscaled,
            scale: frac_part.len() as i64 - exp,
        })
    }
}

impl fmt::Display for BigDec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.unscaled);
        }
        if self.scale < 0 {
            return write!(f, "{}e{}", self.unscaled, -self.scale);
        }

        let repr = self.unscaled.to_string();
        let (sign, digits) = match repr.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", repr.as_str()),
        };
        let scale = self.scale as usize;
        if digits.len() <= scale {
            write!(f, "{sign}0.{}{digits}", "0".repeat(scale - digits.len()))
        } else {
            let split = digits.len() - scale;
            write!(f, "{sign}{}.{}", &digits[..split], &digits[split..])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> BigDec {
        s.parse().unwrap()
    }

    #[test]
    fn test_parses_plain_integers() {
        let d = parse("42");
        assert_eq!(d.unscaled(), &BigInt::from(42));
        assert_eq!(d.scale(), 0);
    }

    #[test]
    fn test_parses_fractions_and_exponents() {
        assert_eq!(parse("12.34"), BigDec::new(BigInt::from(1234), 2));
        assert_eq!(parse("-0.005"), BigDec::new(BigInt::from(-5), 3));
        assert_eq!(parse("1.5e3"), BigDec::new(BigInt::from(15), -2));
        assert_eq!(parse("25E-2"), BigDec::new(BigInt::from(25), 2));
    }

    #[test]
    fn test_display_round_trips() {
        for s in [
            "0",
            "42",
            "-42",
            "12.34",
            "-0.005",
            "0.000",
            "123456789012345678901234567890.5",
        ] {
            let d = parse(s);
            assert_eq!(parse(&d.to_string()), d, "{s}");
        }
    }

    #[test]
    fn test_negative_scale_uses_exponent_form() {
        let d = BigDec::new(BigInt::from(15), -2);
        assert_eq!(d.to_string(), "15e2");
        assert_eq!(parse("15e2"), d);
    }

    #[test]
    fn test_rejects_garbage() {
        for s in ["", "abc", "1.2.3", "1e", "1.-2"] {
            assert!(s.parse::<BigDec>().is_err(), "{s}");
        }
    }
}
