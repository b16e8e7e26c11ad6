//! Raw inventory values as delivered by a provider.
//!
//! Providers hand back untyped scalar/list/map data. It is modelled as a sum
//! type so the renderer can match exhaustively instead of probing types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Map payload. Key order carries no meaning; BTreeMap keeps it deterministic.
pub type RawMap = BTreeMap<String, RawValue>;

/// A scalar leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => write!(f, "{}", s),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            // Debug keeps the fractional part of whole numbers: 2.0, not 2
            Scalar::Float(x) => write!(f, "{:?}", x),
        }
    }
}

/// Inventory value: scalar, list, map or nothing (nil, `[]`, `{}`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum RawValue {
    #[default]
    Empty,
    Scalar(Scalar),
    List(Vec<RawValue>),
    Map(RawMap),
}

impl RawValue {
    pub fn str(s: impl Into<String>) -> Self {
        RawValue::Scalar(Scalar::Str(s.into()))
    }

    pub fn int(i: i64) -> Self {
        RawValue::Scalar(Scalar::Int(i))
    }

    pub fn bool(b: bool) -> Self {
        RawValue::Scalar(Scalar::Bool(b))
    }

    pub fn float(x: f64) -> Self {
        RawValue::Scalar(Scalar::Float(x))
    }

    /// Build a map value. An empty iterator gives `Empty`.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, RawValue)>) -> Self {
        let map: RawMap = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        if map.is_empty() {
            RawValue::Empty
        } else {
            RawValue::Map(map)
        }
    }

    /// Build a list value. An empty vector gives `Empty`.
    pub fn list(items: Vec<RawValue>) -> Self {
        if items.is_empty() {
            RawValue::Empty
        } else {
            RawValue::List(items)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::List(items) => items.is_empty(),
            RawValue::Map(map) => map.is_empty(),
            RawValue::Scalar(_) => false,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, RawValue::Scalar(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            RawValue::Scalar(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RawValue::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RawValue]> {
        match self {
            RawValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&RawMap> {
        match self {
            RawValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Generic stringification. Compound values print as compact JSON.
    pub fn stringify(&self) -> String {
        match self {
            value if value.is_empty() => String::new(),
            RawValue::Scalar(s) => s.to_string(),
            compound => serde_json::Value::from(compound.clone()).to_string(),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stringify())
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => RawValue::Empty,
            Value::Bool(b) => RawValue::bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RawValue::int(i)
                } else {
                    // u64 beyond i64 range and real numbers
                    RawValue::float(n.as_f64().unwrap_or_default())
                }
            }
            Value::String(s) => RawValue::str(s),
            Value::Array(items) => RawValue::list(items.into_iter().map(RawValue::from).collect()),
            Value::Object(map) => RawValue::map(map.into_iter().map(|(k, v)| (k, RawValue::from(v)))),
        }
    }
}

impl From<RawValue> for serde_json::Value {
    fn from(value: RawValue) -> Self {
        use serde_json::Value;

        match value {
            RawValue::Empty => Value::Null,
            RawValue::Scalar(Scalar::Str(s)) => Value::String(s),
            RawValue::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            RawValue::Scalar(Scalar::Int(i)) => Value::from(i),
            RawValue::Scalar(Scalar::Float(x)) => serde_json::Number::from_f64(x)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            RawValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            RawValue::Map(map) => Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::str(s)
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::str(s)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::int(i)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_empty_shapes_become_empty() {
        assert_eq!(RawValue::from(json!(null)), RawValue::Empty);
        assert_eq!(RawValue::from(json!([])), RawValue::Empty);
        assert_eq!(RawValue::from(json!({})), RawValue::Empty);
    }

    #[test]
    fn test_json_numbers() {
        assert_eq!(RawValue::from(json!(42)), RawValue::int(42));
        assert_eq!(RawValue::from(json!(2.5)), RawValue::float(2.5));
        assert_eq!(RawValue::from(json!(u64::MAX)).as_int(), None);
    }

    #[test]
    fn test_stringify() {
        assert_eq!(RawValue::str("eth0").stringify(), "eth0");
        assert_eq!(RawValue::bool(true).stringify(), "true");
        assert_eq!(RawValue::int(-3).stringify(), "-3");
        assert_eq!(RawValue::Empty.stringify(), "");
        assert_eq!(RawValue::from(json!([1, "a"])).stringify(), "[1,\"a\"]");
    }

    #[test]
    fn test_empty_compounds_stringify_to_nothing() {
        assert_eq!(RawValue::List(Vec::new()).stringify(), "");
        assert_eq!(RawValue::Map(RawMap::new()).stringify(), "");
    }

    #[test]
    fn test_whole_floats_keep_fraction() {
        assert_eq!(RawValue::float(2.0).stringify(), "2.0");
        assert_eq!(RawValue::float(2400.5).stringify(), "2400.5");
        assert_eq!(RawValue::float(-0.25).to_string(), "-0.25");
    }

    #[test]
    fn test_serde_uses_plain_json() {
        let value: RawValue = serde_json::from_str(r#"{"type": "unknown", "type_id": 217}"#).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map["type"].as_str(), Some("unknown"));
        assert_eq!(map["type_id"].as_int(), Some(217));

        let back = serde_json::to_value(&value).unwrap();
        assert_eq!(back, json!({"type": "unknown", "type_id": 217}));
    }
}
