//! Typed leaf values.
//!
//! A leaf carries exactly one [`Value`]. Values of different variants never
//! compare equal, so a string leaf and an integer leaf with the same lexical
//! form are still distinct. Ordering is likewise defined only within a
//! variant; comparing across variants yields `None`.

use std::fmt;

use crate::error::{Error, Result};

/// The declared type of a leaf, used when parsing lexical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafType {
    /// Free-form string.
    Str,
    /// `true` or `false`.
    Bool,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// Fixed-point decimal with the given number of fraction digits (1..=18).
    Decimal64 {
        /// Digits after the decimal point.
        fraction_digits: u8,
    },
    /// Enumeration label, compared as an exact string.
    Enumeration,
    /// Presence-only leaf; carries no content.
    Empty,
}

/// A typed leaf value.
#[derive(Debug, Clone)]
pub enum Value {
    /// Free-form string.
    Str(String),
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// Fixed-point decimal.
    Decimal64(Decimal64),
    /// Enumeration label.
    Enumeration(String),
    /// Presence-only value.
    Empty,
}

impl Value {
    /// Parses a lexical value against a declared leaf type.
    ///
    /// The lexical form is trimmed of surrounding whitespace first, matching
    /// how values arrive from an XML parser.
    pub fn parse(lexical: &str, ty: LeafType) -> Result<Value> {
        let s = lexical.trim();
        match ty {
            LeafType::Str => Ok(Value::Str(s.to_string())),
            LeafType::Bool => match s {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(Error::Value(format!("'{s}' is not a boolean"))),
            },
            LeafType::Int64 => s
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|_| Error::Value(format!("'{s}' is not a valid int64"))),
            LeafType::UInt64 => s
                .parse::<u64>()
                .map(Value::UInt64)
                .map_err(|_| Error::Value(format!("'{s}' is not a valid uint64"))),
            LeafType::Decimal64 { fraction_digits } => {
                Decimal64::parse(s, fraction_digits).map(Value::Decimal64)
            }
            LeafType::Enumeration => {
                if s.is_empty() {
                    Err(Error::Value("empty enumeration label".to_string()))
                } else {
                    Ok(Value::Enumeration(s.to_string()))
                }
            }
            LeafType::Empty => {
                if s.is_empty() {
                    Ok(Value::Empty)
                } else {
                    Err(Error::Value(format!("empty leaf has content '{s}'")))
                }
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::UInt64(a), Value::UInt64(b)) => a == b,
            (Value::Decimal64(a), Value::Decimal64(b)) => a == b,
            (Value::Enumeration(a), Value::Enumeration(b)) => a == b,
            (Value::Empty, Value::Empty) => true,
            // Cross-variant comparisons are never equal.
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::Int64(a), Value::Int64(b)) => a.partial_cmp(b),
            (Value::UInt64(a), Value::UInt64(b)) => a.partial_cmp(b),
            (Value::Decimal64(a), Value::Decimal64(b)) => a.partial_cmp(b),
            (Value::Enumeration(a), Value::Enumeration(b)) => a.partial_cmp(b),
            (Value::Empty, Value::Empty) => Some(std::cmp::Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int64(n) => write!(f, "{n}"),
            Value::UInt64(n) => write!(f, "{n}"),
            Value::Decimal64(d) => write!(f, "{d}"),
            Value::Enumeration(s) => f.write_str(s),
            Value::Empty => Ok(()),
        }
    }
}

/// Fixed-point decimal stored as scaled integer units.
///
/// The value is `units / 10^fraction_digits`. Two decimals with different
/// scales compare by normalizing to a common scale, so `1.50` equals `1.5`.
#[derive(Debug, Clone, Copy)]
pub struct Decimal64 {
    units: i64,
    fraction_digits: u8,
}

impl Decimal64 {
    /// Creates a decimal from scaled units. `fraction_digits` is clamped
    /// to the 1..=18 range the wire format allows.
    pub fn new(units: i64, fraction_digits: u8) -> Self {
        Decimal64 {
            units,
            fraction_digits: fraction_digits.clamp(1, 18),
        }
    }

    /// Scaled integer units.
    pub fn units(&self) -> i64 {
        self.units
    }

    /// Digits after the decimal point.
    pub fn fraction_digits(&self) -> u8 {
        self.fraction_digits
    }

    /// Parses a lexical decimal such as `-1.25` at the given scale.
    ///
    /// More fraction digits than the scale permits is an error; fewer are
    /// padded with zeros.
    pub fn parse(s: &str, fraction_digits: u8) -> Result<Decimal64> {
        let fraction_digits = fraction_digits.clamp(1, 18);
        let err = || Error::Value(format!("'{s}' is not a valid decimal64"));

        let (sign, rest) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int_part, frac_part) = match rest.split_once('.') {
            Some((i, f)) => (i, f),
            None => (rest, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(err());
        }
        if frac_part.len() > fraction_digits as usize {
            return Err(Error::Value(format!(
                "'{s}' has more than {fraction_digits} fraction digits"
            )));
        }

        let mut units: i64 = 0;
        for c in int_part.chars().chain(frac_part.chars()) {
            units = units
                .checked_mul(10)
                .and_then(|u| u.checked_add((c as u8 - b'0') as i64))
                .ok_or_else(err)?;
        }
        for _ in frac_part.len()..fraction_digits as usize {
            units = units.checked_mul(10).ok_or_else(err)?;
        }
        Ok(Decimal64 {
            units: sign * units,
            fraction_digits,
        })
    }

    /// Value normalized to 18 fraction digits, for comparisons across scales.
    fn normalized(&self) -> i128 {
        let scale = 18 - self.fraction_digits as u32;
        self.units as i128 * 10i128.pow(scale)
    }
}

impl PartialEq for Decimal64 {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Decimal64 {}

impl PartialOrd for Decimal64 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.normalized().cmp(&other.normalized()))
    }
}

impl fmt::Display for Decimal64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.fraction_digits as usize;
        let abs = self.units.unsigned_abs();
        let scale = 10u64.pow(self.fraction_digits as u32);
        let sign = if self.units < 0 { "-" } else { "" };
        write!(f, "{sign}{}.{:0digits$}", abs / scale, abs % scale)
    }
}
