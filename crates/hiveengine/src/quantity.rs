//! Exact decimal token quantities.
//!
//! Hive Engine carries amounts as decimal strings ("12.34500000"). Floats
//! would lose digits, so a [`Quantity`] keeps an integer mantissa and a
//! decimal scale. Quantizing truncates toward zero, never rounds up.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

const MAX_SCALE: u32 = 36;
const MAX_MANTISSA: i128 = 10i128.pow(30);

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "QuantityRepr", into = "String")]
pub struct Quantity {
    mantissa: i128,
    scale: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuantityRepr {
    Text(String),
    Number(serde_json::Number),
}

impl TryFrom<QuantityRepr> for Quantity {
    type Error = EngineError;

    fn try_from(repr: QuantityRepr) -> Result<Self, Self::Error> {
        match repr {
            QuantityRepr::Text(s) => s.parse(),
            QuantityRepr::Number(n) => match n.as_i64() {
                Some(i) => Ok(Quantity::from(i)),
                None => n.to_string().parse(),
            },
        }
    }
}

impl From<Quantity> for String {
    fn from(q: Quantity) -> Self {
        q.to_string()
    }
}

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Self {
            mantissa: value as i128,
            scale: 0,
        }
    }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self {
        Self::from(i64::from(value))
    }
}

fn pow10(exp: u32) -> i128 {
    10i128.pow(exp)
}

impl Quantity {
    pub const ZERO: Quantity = Quantity {
        mantissa: 0,
        scale: 0,
    };

    /// Number of digits after the decimal point.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    pub fn is_positive(&self) -> bool {
        self.mantissa > 0
    }

    /// Exactly `precision` decimals, dropping extra digits toward zero.
    ///
    /// A value too large to pad is returned with its own scale.
    pub fn quantize(&self, precision: u32) -> Quantity {
        let precision = precision.min(MAX_SCALE);
        match self.scale.cmp(&precision) {
            Ordering::Equal => *self,
            Ordering::Greater => Quantity {
                mantissa: self.mantissa / pow10(self.scale - precision),
                scale: precision,
            },
            Ordering::Less => match self.mantissa.checked_mul(pow10(precision - self.scale)) {
                Some(mantissa) => Quantity {
                    mantissa,
                    scale: precision,
                },
                None => *self,
            },
        }
    }

    /// Exact product, or `None` when it does not fit.
    pub fn checked_mul(&self, other: &Quantity) -> Option<Quantity> {
        let scale = self.scale + other.scale;
        if scale > MAX_SCALE {
            return None;
        }
        Some(Quantity {
            mantissa: self.mantissa.checked_mul(other.mantissa)?,
            scale,
        })
    }

    /// Lossy conversion for display and rough comparisons.
    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale as i32)
    }

    fn split(&self) -> (i128, i128) {
        let unit = pow10(self.scale);
        (self.mantissa / unit, self.mantissa % unit)
    }
}

impl FromStr for Quantity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidQuantity(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let scale = frac_part.len() as u32;
        if scale > MAX_SCALE {
            return Err(invalid());
        }

        let mut mantissa: i128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(b - b'0')))
                .filter(|m| *m < MAX_MANTISSA)
                .ok_or_else(invalid)?;
        }
        Ok(Quantity {
            mantissa: if negative { -mantissa } else { mantissa },
            scale,
        })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (int, frac) = self.split();
        if self.mantissa < 0 {
            f.write_str("-")?;
        }
        write!(f, "{}", int.abs())?;
        if self.scale > 0 {
            write!(f, ".{:0width$}", frac.abs(), width = self.scale as usize)?;
        }
        Ok(())
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a_int, a_frac) = self.split();
        let (b_int, b_frac) = other.split();
        let scale = self.scale.max(other.scale);
        let a_frac = a_frac * pow10(scale - self.scale);
        let b_frac = b_frac * pow10(scale - other.scale);
        a_int.cmp(&b_int).then(a_frac.cmp(&b_frac))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_display() {
        assert_eq!(q("12.345").to_string(), "12.345");
        assert_eq!(q("0.00000001").to_string(), "0.00000001");
        assert_eq!(q("-1.50").to_string(), "-1.50");
        assert_eq!(q(".5").to_string(), "0.5");
        assert_eq!(q("7").to_string(), "7");
        assert_eq!(q("9007199254740991.00000000").to_string(), "9007199254740991.00000000");
    }

    #[test]
    fn rejects_garbage() {
        for s in ["", "-", ".", "1e5", "abc", "1.2.3", "1,5", "12345678901234567890123456789012"] {
            assert!(s.parse::<Quantity>().is_err(), "{s:?} should not parse");
        }
    }

    #[test]
    fn quantize_truncates_toward_zero() {
        assert_eq!(q("1.23456789").quantize(3).to_string(), "1.234");
        assert_eq!(q("-1.9999").quantize(0).to_string(), "-1");
        assert_eq!(q("0.0009").quantize(3).to_string(), "0.000");
        assert!(!q("0.0009").quantize(3).is_positive());
    }

    #[test]
    fn quantize_pads_to_precision() {
        assert_eq!(q("1").quantize(3).to_string(), "1.000");
        assert_eq!(q("2.5").quantize(8).to_string(), "2.50000000");
    }

    #[test]
    fn ordering_ignores_scale() {
        assert_eq!(q("1.0"), q("1.000"));
        assert!(q("1.0001") > q("1"));
        assert!(q("0.99") < q("1"));
        assert!(q("-0.5") < q("0.1"));
        assert!(q("10") > q("9.99999999"));
    }

    #[test]
    fn multiplication() {
        let cost = q("2.5").checked_mul(&q("0.2")).unwrap();
        assert_eq!(cost, q("0.5"));
        assert_eq!(cost.scale(), 2);
    }

    #[test]
    fn serde_accepts_strings_and_numbers() {
        let from_str: Quantity = serde_json::from_str("\"1.25\"").unwrap();
        let from_num: Quantity = serde_json::from_str("42").unwrap();
        assert_eq!(from_str, q("1.25"));
        assert_eq!(from_num, q("42"));
        assert_eq!(serde_json::to_string(&q("1.250")).unwrap(), "\"1.250\"");
        assert!(serde_json::from_str::<Quantity>("\"nope\"").is_err());
    }
}
