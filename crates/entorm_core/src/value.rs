//! Dynamic column value type.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single column value as exchanged with the database driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Floating point value.
    Real(f64),
    /// Text string (UTF-8).
    Text(String),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a float, if it is one.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Real(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Conversion from a column value into a Rust type.
///
/// `column` is only used to build error messages.
pub trait FromValue: Sized {
    /// Converts `value` read from `column`.
    fn from_value(value: &Value, column: &str) -> CoreResult<Self>;
}

fn mismatch(column: &str, expected: &'static str, actual: &Value) -> CoreError {
    if actual.is_null() {
        return CoreError::unexpected_null(column);
    }
    CoreError::TypeMismatch {
        column: column.to_string(),
        expected,
        actual: actual.kind(),
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value, column: &str) -> CoreResult<Self> {
        value
            .as_integer()
            .ok_or_else(|| mismatch(column, "i64", value))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value, column: &str) -> CoreResult<Self> {
        let n = i64::from_value(value, column)?;
        i32::try_from(n).map_err(|_| mismatch(column, "i32", value))
    }
}

impl FromValue for u32 {
    fn from_value(value: &Value, column: &str) -> CoreResult<Self> {
        let n = i64::from_value(value, column)?;
        u32::try_from(n).map_err(|_| mismatch(column, "u32", value))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value, column: &str) -> CoreResult<Self> {
        match value {
            Value::Real(n) => Ok(*n),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(n) => Ok(*n as f64),
            other => Err(mismatch(column, "f64", other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value, column: &str) -> CoreResult<Self> {
        // SQLite stores booleans as 0/1 integers
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Integer(0) => Ok(false),
            Value::Integer(1) => Ok(true),
            other => Err(mismatch(column, "bool", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value, column: &str) -> CoreResult<Self> {
        value
            .as_text()
            .map(str::to_string)
            .ok_or_else(|| mismatch(column, "string", value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, column: &str) -> CoreResult<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value, column).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_into_value() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
    }

    #[test]
    fn integer_extraction() {
        assert_eq!(i64::from_value(&Value::Integer(7), "age").unwrap(), 7);
        assert_eq!(i32::from_value(&Value::Integer(-3), "age").unwrap(), -3);
        assert!(u32::from_value(&Value::Integer(-3), "age").is_err());
    }

    #[test]
    fn null_into_required_type_fails() {
        let err = String::from_value(&Value::Null, "name").unwrap_err();
        assert!(matches!(err, CoreError::UnexpectedNull { column } if column == "name"));
    }

    #[test]
    fn null_into_optional_type_is_none() {
        let v: Option<String> = FromValue::from_value(&Value::Null, "email").unwrap();
        assert_eq!(v, None);
    }

    #[test]
    fn wrong_variant_reports_kinds() {
        let err = i64::from_value(&Value::Text("x".into()), "age").unwrap_err();
        match err {
            CoreError::TypeMismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, "i64");
                assert_eq!(actual, "text");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bool_accepts_integer_flags() {
        assert!(bool::from_value(&Value::Integer(1), "active").unwrap());
        assert!(!bool::from_value(&Value::Integer(0), "active").unwrap());
        assert!(bool::from_value(&Value::Integer(2), "active").is_err());
    }
}
