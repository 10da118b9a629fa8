//! Index key values
//!
//! Every index, the primary table and the query language share one
//! value domain: [`IndexKey`]. Item ids are index keys too.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

/// Index key representing a scalar field value.
///
/// Supports Null, Bool, Int (i64), UInt (above i64::MAX), Float (ordered
/// bits) and String. Ordering is deterministic: Null < Bool < numbers <
/// String, where numbers compare by value. Integral floats that fit an
/// i64 are stored as Int, so `1` and `1.0` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// Missing or null value
    Null,
    /// Boolean value (false < true)
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Unsigned integer too large for `Int`
    UInt(u64),
    /// Non-integral float value (stored as bits for total ordering)
    Float(u64),
    /// String value
    String(String),
}

/// Identifier stored in index buckets (typically the primary key)
pub type ItemId = IndexKey;

const SIGN_BIT: u64 = 1 << 63;
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

impl IndexKey {
    pub fn from_bool(v: bool) -> Self {
        IndexKey::Bool(v)
    }

    pub fn from_int(v: i64) -> Self {
        IndexKey::Int(v)
    }

    /// Create a key from an unsigned integer; values that fit an i64 become `Int`
    pub fn from_uint(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => IndexKey::Int(i),
            Err(_) => IndexKey::UInt(v),
        }
    }

    /// Create a key from a float
    ///
    /// Integral values in i64 range become `Int`; the rest use a bit
    /// representation with total ordering.
    pub fn from_float(v: f64) -> Self {
        if v.fract() == 0.0 && v >= I64_LOWER && v < I64_UPPER {
            return IndexKey::Int(v as i64);
        }
        let bits = v.to_bits();
        let ordered = if bits & SIGN_BIT != 0 {
            !bits
        } else {
            bits ^ SIGN_BIT
        };
        IndexKey::Float(ordered)
    }

    pub fn from_string(v: impl Into<String>) -> Self {
        IndexKey::String(v.into())
    }

    /// Create a key from a JSON scalar.
    ///
    /// Arrays and objects are not indexable and yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(IndexKey::Null),
            Value::Bool(b) => Some(IndexKey::from_bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(IndexKey::from_int(i))
                } else if let Some(u) = n.as_u64() {
                    Some(IndexKey::from_uint(u))
                } else {
                    n.as_f64().map(IndexKey::from_float)
                }
            }
            Value::String(s) => Some(IndexKey::from_string(s)),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Convert back to a JSON value
    pub fn to_json(&self) -> Value {
        match self {
            IndexKey::Null => Value::Null,
            IndexKey::Bool(b) => Value::Bool(*b),
            IndexKey::Int(i) => Value::from(*i),
            IndexKey::UInt(u) => Value::from(*u),
            IndexKey::Float(_) => self.as_f64().map(Value::from).unwrap_or(Value::Null),
            IndexKey::String(s) => Value::String(s.clone()),
        }
    }

    /// Decoded float value, for `Float` keys only
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            IndexKey::Float(ordered) => {
                let bits = if ordered & SIGN_BIT != 0 {
                    ordered ^ SIGN_BIT
                } else {
                    !ordered
                };
                Some(f64::from_bits(bits))
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            IndexKey::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, IndexKey::Null)
    }

    fn rank(&self) -> u8 {
        match self {
            IndexKey::Null => 0,
            IndexKey::Bool(_) => 1,
            IndexKey::Int(_) | IndexKey::UInt(_) | IndexKey::Float(_) => 2,
            IndexKey::String(_) => 3,
        }
    }
}

/// Integer against Float by value; exact ties (only past 2^53) put the
/// integer first so distinct keys never compare equal.
fn cmp_int_float(i: f64, float: &IndexKey) -> Ordering {
    let f = float.as_f64().unwrap_or(f64::NAN);
    i.total_cmp(&f).then(Ordering::Less)
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IndexKey::Bool(a), IndexKey::Bool(b)) => a.cmp(b),
            (IndexKey::Int(a), IndexKey::Int(b)) => a.cmp(b),
            (IndexKey::Float(a), IndexKey::Float(b)) => a.cmp(b),
            (IndexKey::UInt(a), IndexKey::UInt(b)) => a.cmp(b),
            (IndexKey::Int(_), IndexKey::UInt(_)) => Ordering::Less,
            (IndexKey::UInt(_), IndexKey::Int(_)) => Ordering::Greater,
            (IndexKey::Int(a), IndexKey::Float(_)) => cmp_int_float(*a as f64, other),
            (IndexKey::Float(_), IndexKey::Int(b)) => cmp_int_float(*b as f64, self).reverse(),
            (IndexKey::UInt(a), IndexKey::Float(_)) => cmp_int_float(*a as f64, other),
            (IndexKey::Float(_), IndexKey::UInt(b)) => cmp_int_float(*b as f64, self).reverse(),
            (IndexKey::String(a), IndexKey::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Null => write!(f, "null"),
            IndexKey::Bool(b) => write!(f, "{}", b),
            IndexKey::Int(i) => write!(f, "{}", i),
            IndexKey::UInt(u) => write!(f, "{}", u),
            IndexKey::Float(_) => write!(f, "{}", self.as_f64().unwrap_or(f64::NAN)),
            IndexKey::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for IndexKey {
    fn from(v: bool) -> Self {
        IndexKey::from_bool(v)
    }
}

impl From<i64> for IndexKey {
    fn from(v: i64) -> Self {
        IndexKey::from_int(v)
    }
}

impl From<i32> for IndexKey {
    fn from(v: i32) -> Self {
        IndexKey::from_int(i64::from(v))
    }
}

impl From<u64> for IndexKey {
    fn from(v: u64) -> Self {
        IndexKey::from_uint(v)
    }
}

impl From<f64> for IndexKey {
    fn from(v: f64) -> Self {
        IndexKey::from_float(v)
    }
}

impl From<&str> for IndexKey {
    fn from(v: &str) -> Self {
        IndexKey::from_string(v)
    }
}

impl From<String> for IndexKey {
    fn from(v: String) -> Self {
        IndexKey::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_ordering() {
        let keys = vec![
            IndexKey::Null,
            IndexKey::from_bool(false),
            IndexKey::from_bool(true),
            IndexKey::from_float(-1e300),
            IndexKey::from_int(-100),
            IndexKey::from_float(-2.5),
            IndexKey::from_int(0),
            IndexKey::from_float(3.25),
            IndexKey::from_int(100),
            IndexKey::from_float(1e300),
            IndexKey::from_string(""),
            IndexKey::from_string("aaa"),
            IndexKey::from_string("zzz"),
        ];

        for i in 1..keys.len() {
            assert!(keys[i - 1] < keys[i], "{:?} should sort before {:?}", keys[i - 1], keys[i]);
            assert!(keys[i] > keys[i - 1]);
        }
    }

    #[test]
    fn test_integral_floats_are_ints() {
        assert_eq!(IndexKey::from_float(2.0), IndexKey::Int(2));
        assert_eq!(IndexKey::from_float(-0.0), IndexKey::Int(0));
        assert_eq!(IndexKey::from_json(&json!(1.0)), IndexKey::from_json(&json!(1)));
        assert_eq!(IndexKey::from_float(2.0).to_json(), json!(2));
        assert!(matches!(IndexKey::from_float(1e19), IndexKey::Float(_)));
    }

    #[test]
    fn test_huge_int_float_tie_is_not_equal() {
        let int = IndexKey::from_int(i64::MAX);
        let float = IndexKey::from_float(9_223_372_036_854_775_808.0);
        assert_ne!(int, float);
        assert_eq!(int.cmp(&float), Ordering::Less);
        assert_eq!(float.cmp(&int), Ordering::Greater);
    }

    #[test]
    fn test_large_unsigned_keys_stay_distinct() {
        let max = IndexKey::from_json(&json!(u64::MAX)).unwrap();
        let below = IndexKey::from_json(&json!(u64::MAX - 1)).unwrap();
        assert_eq!(max, IndexKey::UInt(u64::MAX));
        assert_ne!(max, below);
        assert!(below < max);
        assert_eq!(max.to_json(), json!(u64::MAX));
        assert_eq!(max.to_string(), "18446744073709551615");

        // values that fit an i64 normalise to Int
        assert_eq!(IndexKey::from(5u64), IndexKey::Int(5));
        let min_unsigned = IndexKey::from_uint(1 << 63);
        assert!(IndexKey::from_int(i64::MAX) < min_unsigned);
        assert!(min_unsigned < IndexKey::from_float(1e19));
        assert!(IndexKey::from_float(-1e19) < min_unsigned);
        // exact float tie orders the integer first
        assert_eq!(min_unsigned.cmp(&IndexKey::from_float(9_223_372_036_854_775_808.0)), Ordering::Less);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(IndexKey::from_json(&json!(null)), Some(IndexKey::Null));
        assert_eq!(IndexKey::from_json(&json!(true)), Some(IndexKey::Bool(true)));
        assert_eq!(IndexKey::from_json(&json!(42)), Some(IndexKey::Int(42)));
        assert_eq!(
            IndexKey::from_json(&json!("hello")),
            Some(IndexKey::String("hello".to_string()))
        );
        assert_eq!(IndexKey::from_json(&json!([1, 2, 3])), None);
        assert_eq!(IndexKey::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_float_round_trip() {
        for v in [-1.5, 2.75, 1e-10, 1e300] {
            let key = IndexKey::from_float(v);
            assert_eq!(key.as_f64(), Some(v));
            assert_eq!(key.to_json(), json!(v));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(IndexKey::from("a").to_string(), "a");
        assert_eq!(IndexKey::from(7i64).to_string(), "7");
        assert_eq!(IndexKey::Null.to_string(), "null");
    }
}
