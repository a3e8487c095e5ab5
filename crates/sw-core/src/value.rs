//! [`SignalValue`] — the tagged union carried by every [`crate::Signal`],
//! and the coercion rules used by [`crate::AnalysisContext::get_value`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Dynamically-typed value carried by a signal. The wire form is
/// internally tagged so `value_type` survives a `serialize` / `deserialize`
/// round-trip, per spec.md §4.1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SignalValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Vector(Vec<f32>),
    List(Vec<SignalValue>),
    Map(BTreeMap<String, SignalValue>),
}

impl SignalValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            SignalValue::Bool(_) => "bool",
            SignalValue::Int(_) => "int",
            SignalValue::Float(_) => "float",
            SignalValue::Str(_) => "string",
            SignalValue::Bytes(_) => "bytes",
            SignalValue::Vector(_) => "vector",
            SignalValue::List(_) => "list",
            SignalValue::Map(_) => "map",
        }
    }

    /// Best-effort coercion to `bool` per spec.md §4.2: `bool` passthrough,
    /// `{0,1}` int/float, and the strings `"true"`/`"false"` (case-insensitive).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SignalValue::Bool(b) => Some(*b),
            SignalValue::Int(i) => match i {
                0 => Some(false),
                1 => Some(true),
                _ => None,
            },
            SignalValue::Float(f) => {
                if *f == 0.0 {
                    Some(false)
                } else if *f == 1.0 {
                    Some(true)
                } else {
                    None
                }
            }
            SignalValue::Str(s) => match s.to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Best-effort coercion to `f64`: numeric widening and `string -> number`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SignalValue::Float(f) => Some(*f),
            SignalValue::Int(i) => Some(*i as f64),
            SignalValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            SignalValue::Str(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Best-effort coercion to `i64`: numeric narrowing (truncating) and
    /// `string -> number`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SignalValue::Int(i) => Some(*i),
            SignalValue::Float(f) => Some(*f as i64),
            SignalValue::Bool(b) => Some(if *b { 1 } else { 0 }),
            SignalValue::Str(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Best-effort coercion to `String`: every scalar variant has a
    /// canonical textual form; compound variants do not coerce.
    pub fn as_str_coerced(&self) -> Option<String> {
        match self {
            SignalValue::Str(s) => Some(s.clone()),
            SignalValue::Int(i) => Some(i.to_string()),
            SignalValue::Float(f) => Some(f.to_string()),
            SignalValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f32]> {
        match self {
            SignalValue::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SignalValue]> {
        match self {
            SignalValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, SignalValue>> {
        match self {
            SignalValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// `string -> enum` coercion by case-insensitive variant name match,
    /// used for signals like `identity.format` read back as a typed enum.
    pub fn as_enum_name(&self) -> Option<String> {
        self.as_str_coerced()
    }
}

impl From<bool> for SignalValue {
    fn from(v: bool) -> Self {
        SignalValue::Bool(v)
    }
}
impl From<i64> for SignalValue {
    fn from(v: i64) -> Self {
        SignalValue::Int(v)
    }
}
impl From<f64> for SignalValue {
    fn from(v: f64) -> Self {
        SignalValue::Float(v)
    }
}
impl From<String> for SignalValue {
    fn from(v: String) -> Self {
        SignalValue::Str(v)
    }
}
impl From<&str> for SignalValue {
    fn from(v: &str) -> Self {
        SignalValue::Str(v.to_string())
    }
}
impl From<Vec<f32>> for SignalValue {
    fn from(v: Vec<f32>) -> Self {
        SignalValue::Vector(v)
    }
}
impl From<usize> for SignalValue {
    fn from(v: usize) -> Self {
        SignalValue::Int(v as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_coercion_from_int() {
        assert_eq!(SignalValue::Int(1).as_bool(), Some(true));
        assert_eq!(SignalValue::Int(0).as_bool(), Some(false));
        assert_eq!(SignalValue::Int(2).as_bool(), None);
    }

    #[test]
    fn numeric_widening() {
        assert_eq!(SignalValue::Int(42).as_f64(), Some(42.0));
        assert_eq!(SignalValue::Float(3.5).as_i64(), Some(3));
    }

    #[test]
    fn string_number_parse() {
        assert_eq!(SignalValue::Str("3.14".into()).as_f64(), Some(3.14));
        assert_eq!(SignalValue::Str("not-a-number".into()).as_f64(), None);
    }

    #[test]
    fn round_trip_json() {
        let v = SignalValue::List(vec![SignalValue::Int(1), SignalValue::Str("x".into())]);
        let json = serde_json::to_string(&v).unwrap();
        let back: SignalValue = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
