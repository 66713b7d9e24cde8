//! Attribute value type and the CX datatype vocabulary.

use std::fmt;

use serde::de::Error as DeError;
use serde::ser::Error as SerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Value carried by a node, edge, or network attribute.
///
/// Covers the scalar and list shapes CX attributes can take:
/// - Scalars: Bool, Int, Double, String
/// - Bytes: binary payloads, decoded as ASCII text on the wire
/// - Containers: List (homogeneous by convention, not enforced)
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }
    pub fn is_numeric(&self) -> bool { matches!(self, Value::Int(_) | Value::Double(_)) }

    /// Attempt to extract as &str
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempt to extract as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert a plain JSON value into an attribute value.
    ///
    /// CX attribute values are scalars or lists; a JSON object in value
    /// position is malformed input, not something to guess at.
    pub fn from_json(raw: &serde_json::Value) -> Result<Value> {
        match raw {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Double(f))
                } else {
                    Err(Error::InvalidArgument(format!(
                        "attribute value {n} is out of range"
                    )))
                }
            }
            serde_json::Value::String(s) => Ok(Value::String(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Value::from_json)
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            serde_json::Value::Object(_) => Err(Error::InvalidArgument(
                "attribute values must be scalars or lists".into(),
            )),
        }
    }

    /// Convert to the plain JSON wire form, enforcing the codec's numeric
    /// and byte rules: bytes decode as ASCII text, doubles must be finite.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        match self {
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Value::Int(i) => Ok(serde_json::Value::from(*i)),
            Value::Double(d) => {
                if !d.is_finite() {
                    return Err(Error::EncodingError(format!(
                        "cannot encode non-finite number {d}"
                    )));
                }
                Ok(serde_json::Value::from(*d))
            }
            Value::String(s) => Ok(serde_json::Value::String(s.clone())),
            Value::Bytes(b) => {
                if !b.is_ascii() {
                    return Err(Error::EncodingError(
                        "binary value is not valid ASCII".into(),
                    ));
                }
                // Safe: just checked the bytes are ASCII.
                let text = std::str::from_utf8(b)
                    .map_err(|e| Error::EncodingError(e.to_string()))?;
                Ok(serde_json::Value::String(text.to_owned()))
            }
            Value::List(items) => items
                .iter()
                .map(Value::to_json)
                .collect::<Result<Vec<_>>>()
                .map(serde_json::Value::Array),
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Int(v as i64) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Double(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self { Value::List(v.into_iter().map(Into::into).collect()) }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(Value::Null) }
}

// ============================================================================
// Serde (wire form is plain JSON, not tagged)
// ============================================================================

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(|e| S::Error::custom(e.to_string()))?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Value::from_json(&raw).map_err(|e| D::Error::custom(e.to_string()))
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Bytes(b) => write!(f, "<bytes[{}]>", b.len()),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// ============================================================================
// DataType — the closed CX datatype vocabulary
// ============================================================================

/// Declared datatype of an attribute value.
///
/// `long` is never inferred; it only appears when a caller asks for it
/// explicitly. Everything unclassifiable falls back to `string`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    String,
    Boolean,
    Integer,
    Long,
    Double,
    ListOfString,
    ListOfBoolean,
    ListOfInteger,
    ListOfLong,
    ListOfDouble,
}

impl DataType {
    /// Classify a value's shape into a declared datatype.
    ///
    /// Whole numbers are `integer`, fractional numbers `double`, booleans
    /// `boolean`, homogeneous lists `list_of_<element>`; anything else,
    /// including heterogeneous lists, is `string` / `list_of_string`.
    pub fn infer(value: &Value) -> DataType {
        match value {
            Value::Bool(_) => DataType::Boolean,
            Value::Int(_) => DataType::Integer,
            Value::Double(_) => DataType::Double,
            Value::List(items) => Self::infer_list(items),
            Value::Null | Value::String(_) | Value::Bytes(_) => DataType::String,
        }
    }

    fn infer_list(items: &[Value]) -> DataType {
        let mut elements = items.iter().map(DataType::infer);
        let first = match elements.next() {
            Some(d) => d,
            None => return DataType::ListOfString,
        };
        if elements.any(|d| d != first) {
            return DataType::ListOfString;
        }
        match first {
            DataType::Boolean => DataType::ListOfBoolean,
            DataType::Integer => DataType::ListOfInteger,
            DataType::Double => DataType::ListOfDouble,
            _ => DataType::ListOfString,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            DataType::ListOfString
                | DataType::ListOfBoolean
                | DataType::ListOfInteger
                | DataType::ListOfLong
                | DataType::ListOfDouble
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from() {
        assert_eq!(Value::from("hello"), Value::String("hello".into()));
        assert_eq!(Value::from(42), Value::Int(42));
        assert_eq!(Value::from(3.14), Value::Double(3.14));
        assert_eq!(Value::from(true), Value::Bool(true));
    }

    #[test]
    fn test_infer_scalars() {
        assert_eq!(DataType::infer(&Value::Int(5)), DataType::Integer);
        assert_eq!(DataType::infer(&Value::Double(5.5)), DataType::Double);
        assert_eq!(DataType::infer(&Value::Bool(false)), DataType::Boolean);
        assert_eq!(DataType::infer(&Value::from("x")), DataType::String);
    }

    #[test]
    fn test_infer_lists() {
        assert_eq!(
            DataType::infer(&Value::from(vec!["hi", "bye"])),
            DataType::ListOfString
        );
        assert_eq!(
            DataType::infer(&Value::from(vec![1i64, 2, 3])),
            DataType::ListOfInteger
        );
        assert_eq!(
            DataType::infer(&Value::List(vec![Value::Int(1), Value::from("x")])),
            DataType::ListOfString
        );
        assert_eq!(DataType::infer(&Value::List(vec![])), DataType::ListOfString);
    }

    #[test]
    fn test_datatype_wire_names() {
        assert_eq!(serde_json::to_string(&DataType::String).unwrap(), "\"string\"");
        assert_eq!(
            serde_json::to_string(&DataType::ListOfString).unwrap(),
            "\"list_of_string\""
        );
        assert_eq!(serde_json::to_string(&DataType::Long).unwrap(), "\"long\"");
    }

    #[test]
    fn test_bytes_to_json_ascii() {
        let v = Value::Bytes(b"plain".to_vec());
        assert_eq!(v.to_json().unwrap(), serde_json::json!("plain"));

        let bad = Value::Bytes(vec![0xff, 0xfe]);
        assert!(matches!(bad.to_json(), Err(Error::EncodingError(_))));
    }

    #[test]
    fn test_non_finite_double_rejected() {
        let v = Value::Double(f64::NAN);
        assert!(matches!(v.to_json(), Err(Error::EncodingError(_))));
    }

    #[test]
    fn test_from_json_rejects_objects() {
        let raw = serde_json::json!({"not": "a scalar"});
        assert!(matches!(Value::from_json(&raw), Err(Error::InvalidArgument(_))));
    }
}
