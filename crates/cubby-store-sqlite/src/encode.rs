//! Conversions between JSON values and SQLite column values.
//!
//! Parameters arrive as JSON (the wire format); result columns leave as
//! JSON. Booleans bind as 0/1 integers. Blobs do not occur in the state
//! schema but decode to byte arrays rather than failing.

use rusqlite::types::{Value as SqlValue, ValueRef};
use serde_json::Value;

use crate::{Error, Result};

/// Convert a JSON parameter into a bindable SQLite value.
pub fn bind_value(value: &Value) -> Result<SqlValue> {
  match value {
    Value::Null => Ok(SqlValue::Null),
    Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
    Value::Number(n) => n
      .as_i64()
      .map(SqlValue::Integer)
      .or_else(|| n.as_f64().map(SqlValue::Real))
      .ok_or_else(|| Error::UnbindableParam(value.clone())),
    Value::String(s) => Ok(SqlValue::Text(s.clone())),
    Value::Array(_) | Value::Object(_) => {
      Err(Error::UnbindableParam(value.clone()))
    }
  }
}

/// Convert one result column into a JSON value.
pub fn column_to_json(value: ValueRef<'_>) -> Value {
  match value {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(i) => Value::from(i),
    ValueRef::Real(f) => serde_json::Number::from_f64(f)
      .map(Value::Number)
      .unwrap_or(Value::Null),
    ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
    ValueRef::Blob(b) => Value::Array(b.iter().map(|&x| Value::from(x)).collect()),
  }
}
