//! `JsonNumber`, the numeric value kind shared by every reader/writer in
//! this crate: cross-kind `Ord`/`Eq` with NaN-safe comparison, a
//! `Decimal` kind gated behind the `big-decimal` feature, and
//! literal-string preservation so that a number read and immediately
//! re-written is byte-identical.

use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "big-decimal")]
use bigdecimal::{BigDecimal, ToPrimitive};

#[cfg(feature = "serde")]
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

/// A JSON number, classified without being fully parsed until a typed
/// accessor is called. `Unsigned`/`Signed` are the integer fast paths;
/// `Float` is the fallback; `Decimal` (feature-gated) preserves
/// precision beyond what `f64` can hold.
#[derive(Debug, Clone)]
pub enum JsonNumber {
    Unsigned(u64),
    Signed(i64),
    /// The classified value, plus the exact source literal when this
    /// came from parsing text (`"1.0"`, `"1e2"`) rather than being
    /// constructed from a bare `f64` — `f64`'s own `Display` collapses
    /// both of those to `"1"`, which would silently change a document
    /// on a read-then-write round trip.
    Float(f64, Option<String>),
    #[cfg(feature = "big-decimal")]
    Decimal(BigDecimal),
}
use JsonNumber::*;

impl JsonNumber {
    pub fn is_float(&self) -> bool {
        matches!(self, Float(..))
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Unsigned(n) => *n as f64,
            Signed(n) => *n as f64,
            Float(n, _) => *n,
            #[cfg(feature = "big-decimal")]
            Decimal(n) => n.to_f64().unwrap_or(f64::NAN),
        }
    }

    /// Integer fast path used by `next_int`/`next_long`: succeeds only
    /// when the value is an exact, in-range integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Unsigned(n) => i64::try_from(*n).ok(),
            Signed(n) => Some(*n),
            Float(n, _) => {
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64 {
                    Some(*n as i64)
                } else {
                    None
                }
            }
            #[cfg(feature = "big-decimal")]
            Decimal(n) => n.to_i64(),
        }
    }

    /// Parse the literal exactly as the UTF-8 reader saw it, classifying
    /// it into the narrowest representable kind. This is the tokenizer's
    /// number-classification step. Integer literals already round-trip
    /// exactly through their `Display` impl; `Float` keeps the literal
    /// itself alongside the parsed value so a later `Display` can
    /// reproduce it byte-for-byte instead of Rust's shortest-round-trip
    /// rendering.
    pub fn parse(literal: &str) -> Option<JsonNumber> {
        if !literal.contains(['.', 'e', 'E']) {
            if let Ok(u) = literal.parse::<u64>() {
                return Some(Unsigned(u));
            }
            if let Ok(s) = literal.parse::<i64>() {
                return Some(Signed(s));
            }
        }
        if let Ok(f) = literal.parse::<f64>() {
            return Some(Float(f, Some(literal.to_string())));
        }
        #[cfg(feature = "big-decimal")]
        if let Ok(d) = literal.parse::<BigDecimal>() {
            return Some(Decimal(d));
        }
        None
    }
}

impl fmt::Display for JsonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsigned(n) => write!(f, "{n}"),
            Signed(n) => write!(f, "{n}"),
            Float(_, Some(literal)) => write!(f, "{literal}"),
            Float(n, None) => write!(f, "{n}"),
            #[cfg(feature = "big-decimal")]
            Decimal(n) => write!(f, "{n}"),
        }
    }
}

impl From<u64> for JsonNumber {
    fn from(n: u64) -> Self {
        Unsigned(n)
    }
}
impl From<i64> for JsonNumber {
    fn from(n: i64) -> Self {
        Signed(n)
    }
}
impl From<f64> for JsonNumber {
    fn from(n: f64) -> Self {
        Float(n, None)
    }
}

impl Ord for JsonNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Unsigned(l), Unsigned(r)) => l.cmp(r),
            (Unsigned(_), Signed(r)) if *r < 0 => Ordering::Greater,
            (Unsigned(l), Signed(r)) => l.cmp(&(*r as u64)),
            (Unsigned(l), Float(r, _)) => f64_cmp(&(*l as f64), r),

            (Signed(l), Unsigned(_)) if *l < 0 => Ordering::Less,
            (Signed(l), Unsigned(r)) => (*l as u64).cmp(r),
            (Signed(l), Signed(r)) => l.cmp(r),
            (Signed(l), Float(r, _)) => f64_cmp(&(*l as f64), r),

            (Float(l, _), Unsigned(r)) => f64_cmp(l, &(*r as f64)),
            (Float(l, _), Signed(r)) => f64_cmp(l, &(*r as f64)),
            (Float(l, _), Float(r, _)) => f64_cmp(l, r),

            #[cfg(feature = "big-decimal")]
            (Decimal(l), Decimal(r)) => l.cmp(r),
            #[cfg(feature = "big-decimal")]
            (Decimal(_), _) | (_, Decimal(_)) => f64_cmp(&self.as_f64(), &other.as_f64()),
        }
    }
}

impl PartialOrd for JsonNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for JsonNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for JsonNumber {}

fn f64_cmp(lhs: &f64, rhs: &f64) -> Ordering {
    lhs.partial_cmp(rhs).unwrap_or_else(|| {
        if lhs.is_nan() && rhs.is_nan() {
            Ordering::Equal
        } else if lhs.is_nan() {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    })
}

/// Serializes through the narrowest numeric representation it holds,
/// so a `serde_json` consumer sees a plain JSON number rather than a
/// wrapper object.
#[cfg(feature = "serde")]
impl Serialize for JsonNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Unsigned(n) => serializer.serialize_u64(*n),
            Signed(n) => serializer.serialize_i64(*n),
            Float(n, _) => serializer.serialize_f64(*n),
            #[cfg(feature = "big-decimal")]
            Decimal(n) => serializer.serialize_str(&n.to_string()),
        }
    }
}

/// Deserializes via the literal's string form and reclassifies it with
/// [`JsonNumber::parse`], matching how a reader sees the same literal.
#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for JsonNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Number::deserialize(deserializer)?;
        JsonNumber::parse(&value.to_string())
            .ok_or_else(|| D::Error::custom(format!("unrepresentable number: {value}")))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_fast_paths() {
        assert!(matches!(JsonNumber::parse("1234"), Some(Unsigned(1234))));
        assert!(matches!(JsonNumber::parse("-1234"), Some(Signed(-1234))));
        assert!(matches!(JsonNumber::parse("12.34"), Some(Float(f, _)) if f == 12.34));
        assert!(matches!(
            JsonNumber::parse("18446744073709551615"),
            Some(Unsigned(18446744073709551615))
        ));
    }

    #[test]
    fn test_cross_kind_equality() {
        assert_eq!(Unsigned(20), Signed(20));
        assert_eq!(Unsigned(20), Float(20.0, None));
        assert_eq!(Signed(-20), Float(-20.0, None));
    }

    #[test]
    fn test_ordering() {
        assert!(Unsigned(10) < Unsigned(11));
        assert!(Signed(-11) < Signed(-10));
        assert!(Unsigned(10) < Float(10.1, None));
        assert!(Signed(-10) < Unsigned(0));
        assert!(Float(f64::NAN, None) < Signed(10));
        assert_eq!(Float(f64::NAN, None), Float(f64::NAN, None));
    }

    #[test]
    fn test_as_i64_roundtrip() {
        assert_eq!(Float(5.0, None).as_i64(), Some(5));
        assert_eq!(Float(5.5, None).as_i64(), None);
    }

    #[test]
    fn test_parsed_literal_survives_display_byte_for_byte() {
        assert_eq!(JsonNumber::parse("1.0").unwrap().to_string(), "1.0");
        assert_eq!(JsonNumber::parse("1e2").unwrap().to_string(), "1e2");
        assert_eq!(JsonNumber::parse("1.50").unwrap().to_string(), "1.50");
    }

    #[test]
    fn test_a_constructed_float_falls_back_to_canonical_rendering() {
        assert_eq!(JsonNumber::from(1.5f64).to_string(), "1.5");
    }
}
