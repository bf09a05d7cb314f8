//! Leaf value representation shared by rules, data, and bindings.

use serde::{Deserialize, Serialize};

/// The type a leaf rule declares for its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Int,
    Float,
    Bool,
    Str,
}

impl ValueKind {
    /// Parse from a rule resource type name, case-insensitive.
    ///
    /// Accepts `"str"` as an alias for `"string"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "int" => Some(ValueKind::Int),
            "float" => Some(ValueKind::Float),
            "bool" => Some(ValueKind::Bool),
            "string" | "str" => Some(ValueKind::Str),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Str => "string",
        }
    }

    /// The kind's zero value, used when a leaf rule declares no default.
    pub(crate) fn zero(&self) -> Value {
        match self {
            ValueKind::Int => Value::Int(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Str => Value::Str(String::new()),
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A settings value at a leaf position.
///
/// Serializes untagged, so persisted JSON holds plain scalars. Variant order
/// matters for deserialization: integral JSON numbers become [`Value::Int`],
/// fractional ones [`Value::Float`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// The runtime kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers promote losslessly enough for bound checks.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(ValueKind::parse("int"), Some(ValueKind::Int));
        assert_eq!(ValueKind::parse("FLOAT"), Some(ValueKind::Float));
        assert_eq!(ValueKind::parse("bool"), Some(ValueKind::Bool));
        assert_eq!(ValueKind::parse("string"), Some(ValueKind::Str));
        assert_eq!(ValueKind::parse("str"), Some(ValueKind::Str));
        assert_eq!(ValueKind::parse("tuple"), None);
    }

    #[test]
    fn test_kind_zero() {
        assert_eq!(ValueKind::Int.zero(), Value::Int(0));
        assert_eq!(ValueKind::Float.zero(), Value::Float(0.0));
        assert_eq!(ValueKind::Bool.zero(), Value::Bool(false));
        assert_eq!(ValueKind::Str.zero(), Value::Str(String::new()));
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(Value::Int(1).kind(), ValueKind::Int);
        assert_eq!(Value::Float(1.5).kind(), ValueKind::Float);
        assert_eq!(Value::Bool(true).kind(), ValueKind::Bool);
        assert_eq!(Value::from("x").kind(), ValueKind::Str);
    }

    #[test]
    fn test_untagged_json_round_trip() {
        let v: Value = serde_json::from_str("50").unwrap();
        assert_eq!(v, Value::Int(50));

        let v: Value = serde_json::from_str("0.5").unwrap();
        assert_eq!(v, Value::Float(0.5));

        let v: Value = serde_json::from_str("true").unwrap();
        assert_eq!(v, Value::Bool(true));

        let v: Value = serde_json::from_str("\"dark\"").unwrap();
        assert_eq!(v, Value::from("dark"));

        assert_eq!(serde_json::to_string(&Value::Int(50)).unwrap(), "50");
        assert_eq!(serde_json::to_string(&Value::from("x")).unwrap(), "\"x\"");
    }

    #[test]
    fn test_as_f64_promotes_int() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(3.5).as_f64(), Some(3.5));
        assert_eq!(Value::Bool(true).as_f64(), None);
    }
}
