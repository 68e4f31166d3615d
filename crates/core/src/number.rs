//! Arbitrary-precision decimal numbers and their validated conversion to
//! and from IEEE-754 double precision.
//!
//! Configuration numbers are exact decimals of unbounded size. JSON as the
//! encryptor reads it only carries doubles, so every number crosses this
//! boundary twice:
//!
//! - [`Number::to_f64`] rounds to nearest and refuses results that lost the
//!   value entirely (a nonzero number becoming `0.0`, or any number
//!   becoming infinite).
//! - [`Number::from_f64`] is exact: every finite double is a terminating
//!   decimal.

use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, Sign};
use rust_decimal::Decimal;

/// Largest negative exponent still rendered in positional notation.
const MAX_PLAIN_FRACTION_DIGITS: usize = 64;
/// Largest positive exponent still rendered in positional notation.
const MAX_PLAIN_TRAILING_ZEROS: i64 = 21;

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Why a decimal could not become a double.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("value too small to represent as float64")]
    Underflow,
    #[error("value too large to represent as float64")]
    Overflow,
}

/// A string that is not a decimal number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseNumberError {
    #[error("invalid number literal '{input}'")]
    Invalid { input: String },
    #[error("exponent out of range in '{input}'")]
    ExponentOutOfRange { input: String },
}

// ──────────────────────────────────────────────
// Number
// ──────────────────────────────────────────────

/// An exact decimal `coefficient × 10^exponent`.
///
/// Always normalized: the coefficient has no trailing decimal zeros and zero
/// is stored as `0 × 10^0`. Two numbers with the same value therefore
/// compare and hash equal no matter how they were written (`1.50`, `15e-1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number {
    coefficient: BigInt,
    exponent: i64,
}

impl Number {
    pub fn new(coefficient: BigInt, exponent: i64) -> Self {
        Number::normalized(coefficient, exponent)
    }

    pub fn zero() -> Self {
        Number {
            coefficient: BigInt::from(0),
            exponent: 0,
        }
    }

    pub fn coefficient(&self) -> &BigInt {
        &self.coefficient
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient.sign() == Sign::NoSign
    }

    pub fn is_negative(&self) -> bool {
        self.coefficient.sign() == Sign::Minus
    }

    /// Round to the nearest double.
    ///
    /// Fails with [`RangeError::Underflow`] when a nonzero value rounds to
    /// zero, and with [`RangeError::Overflow`] when the magnitude exceeds the
    /// double range.
    pub fn to_f64(&self) -> Result<f64, RangeError> {
        if self.is_zero() {
            return Ok(0.0);
        }
        // Float parsing in std is correctly rounded for any digit count, so
        // the scientific literal is the rounding step.
        let literal = format!("{}e{}", self.coefficient, self.exponent);
        let f: f64 = literal.parse().map_err(|_| RangeError::Overflow)?;
        if f.is_infinite() {
            return Err(RangeError::Overflow);
        }
        if f == 0.0 {
            return Err(RangeError::Underflow);
        }
        Ok(f)
    }

    /// The exact decimal value of a finite double. `None` for NaN and
    /// infinities.
    pub fn from_f64(f: f64) -> Option<Number> {
        if !f.is_finite() {
            return None;
        }
        if f == 0.0 {
            return Some(Number::zero());
        }

        let bits = f.to_bits();
        let negative = bits >> 63 == 1;
        let biased_exponent = ((bits >> 52) & 0x7ff) as i64;
        let fraction = bits & ((1u64 << 52) - 1);
        let (mantissa, binary_exponent) = if biased_exponent == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1u64 << 52), biased_exponent - 1075)
        };

        // m × 2^-k == m × 5^k × 10^-k
        let mut coefficient = BigInt::from(mantissa);
        let exponent = if binary_exponent >= 0 {
            coefficient = coefficient << (binary_exponent as usize);
            0
        } else {
            coefficient *= BigInt::from(5u32).pow((-binary_exponent) as u32);
            binary_exponent
        };
        if negative {
            coefficient = -coefficient;
        }
        Some(Number::normalized(coefficient, exponent))
    }

    /// The value as a `rust_decimal::Decimal`, when it fits in 96 bits of
    /// mantissa and at most 28 fractional digits.
    pub fn to_decimal(&self) -> Option<Decimal> {
        if self.exponent >= 0 {
            let exponent = u32::try_from(self.exponent).ok()?;
            if exponent > 28 {
                return None;
            }
            let scaled = &self.coefficient * BigInt::from(10u32).pow(exponent);
            let mantissa = i128::try_from(&scaled).ok()?;
            Decimal::try_from_i128_with_scale(mantissa, 0).ok()
        } else {
            let scale = u32::try_from(-self.exponent).ok()?;
            let mantissa = i128::try_from(&self.coefficient).ok()?;
            Decimal::try_from_i128_with_scale(mantissa, scale).ok()
        }
    }

    fn normalized(mut coefficient: BigInt, mut exponent: i64) -> Self {
        if coefficient.sign() == Sign::NoSign {
            return Number::zero();
        }
        while (&coefficient % 10u32).sign() == Sign::NoSign {
            match exponent.checked_add(1) {
                Some(next) => exponent = next,
                None => break,
            }
            coefficient /= 10u32;
        }
        Number {
            coefficient,
            exponent,
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::normalized(BigInt::from(value), 0)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number::normalized(BigInt::from(value), 0)
    }
}

impl From<Decimal> for Number {
    fn from(value: Decimal) -> Self {
        Number::normalized(BigInt::from(value.mantissa()), -i64::from(value.scale()))
    }
}

// ──────────────────────────────────────────────
// Text form
// ──────────────────────────────────────────────

impl FromStr for Number {
    type Err = ParseNumberError;

    /// Accepts the JSON number grammar, plus a leading `+` and a missing
    /// integer part (`.5`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseNumberError::Invalid {
            input: s.to_string(),
        };
        let out_of_range = || ParseNumberError::ExponentOutOfRange {
            input: s.to_string(),
        };

        let (negative, rest) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (mantissa, exponent_part) = match rest.find(['e', 'E']) {
            Some(at) => (&rest[..at], Some(&rest[at + 1..])),
            None => (rest, None),
        };
        let (integer, fraction) = match mantissa.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa, ""),
        };
        if integer.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let mut exponent: i64 = match exponent_part {
            Some(e) => {
                let digits = e.strip_prefix('+').unwrap_or(e);
                let (sign, digits) = match digits.strip_prefix('-') {
                    Some(d) => (-1i64, d),
                    None => (1i64, digits),
                };
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                let magnitude: i64 = digits.parse().map_err(|_| out_of_range())?;
                sign * magnitude
            }
            None => 0,
        };
        let fraction_len = i64::try_from(fraction.len()).map_err(|_| out_of_range())?;
        exponent = exponent.checked_sub(fraction_len).ok_or_else(out_of_range)?;

        let digits = format!("{}{}", integer, fraction);
        let mut coefficient = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;
        if negative {
            coefficient = -coefficient;
        }
        Ok(Number::normalized(coefficient, exponent))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-")?;
        }
        let digits = self.coefficient.magnitude().to_string();

        if self.exponent >= 0 {
            if self.exponent <= MAX_PLAIN_TRAILING_ZEROS {
                write!(f, "{}{}", digits, "0".repeat(self.exponent as usize))
            } else {
                write!(f, "{}e{}", digits, self.exponent)
            }
        } else {
            let shift = self.exponent.unsigned_abs() as usize;
            if shift > MAX_PLAIN_FRACTION_DIGITS {
                write!(f, "{}e{}", digits, self.exponent)
            } else if digits.len() > shift {
                let (int_part, frac_part) = digits.split_at(digits.len() - shift);
                write!(f, "{}.{}", int_part, frac_part)
            } else {
                write!(f, "0.{}{}", "0".repeat(shift - digits.len()), digits)
            }
        }
    }
}
