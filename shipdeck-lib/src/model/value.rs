//! Value enum for dynamic field values

use serde::Deserialize;
use serde::Serialize;

/// A dynamic value held by a record field.
///
/// # Type Mapping
///
/// | JSON | Rust Variant |
/// |------|--------------|
/// | null | `Null` |
/// | boolean | `Bool` |
/// | integer | `Int` |
/// | fractional number | `Float` |
/// | string (incl. dates and timestamps) | `String` |
/// | array of strings | `List` |
///
/// # Example
///
/// ```
/// use shipdeck_lib::model::Value;
///
/// let carrier = Value::from("MSC");
/// let transit = Value::from(21i64);
/// let containers = Value::from(vec!["MSCU1234567".to_string()]);
/// let empty = Value::Null;
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value. Dates travel as ISO strings.
    String(String),
    /// Multi-value field.
    List(Vec<String>),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for null, empty strings and empty lists.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::List(items) => items.iter().all(|s| s.trim().is_empty()),
            _ => false,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
        }
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the numeric value for `Int` and `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Plain text rendering used for searching, measuring and sorting.
    ///
    /// Null renders empty, lists are joined with `", "` and integral floats
    /// drop their fractional part.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => format_float(*n),
            Value::String(s) => s.clone(),
            Value::List(items) => items.join(", "),
        }
    }
}

fn format_float(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

/// Lossy conversion from arbitrary JSON.
///
/// Arrays become string lists (non-string items use their JSON text),
/// objects are kept as their JSON text.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::List(
                items
                    .into_iter()
                    .filter(|item| !item.is_null())
                    .map(|item| match item {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            obj @ serde_json::Value::Object(_) => Value::String(obj.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("   ").is_blank());
        assert!(Value::List(vec![]).is_blank());
        assert!(!Value::from(0i64).is_blank());
        assert!(!Value::from("MSC").is_blank());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Value::Float(21.0).to_text(), "21");
        assert_eq!(Value::Float(-0.5).to_text(), "-0.5");
        assert_eq!(
            Value::List(vec!["A".into(), "B".into()]).to_text(),
            "A, B"
        );
        assert_eq!(Value::Null.to_text(), "");
    }

    #[test]
    fn test_from_json_array() {
        let json = serde_json::json!(["MSCU1", null, 7]);
        assert_eq!(
            Value::from(json),
            Value::List(vec!["MSCU1".into(), "7".into()])
        );
    }

    #[test]
    fn test_from_json_number() {
        assert_eq!(Value::from(serde_json::json!(12)), Value::Int(12));
        assert_eq!(Value::from(serde_json::json!(1.5)), Value::Float(1.5));
    }
}
