//! Helpers shared by the session and persistent scopes.
//!
//! Stored values are opaque JSON text in a nullable `value` column.

use std::collections::BTreeMap;

use cubby_client::{LAST_INSERT_ROW_ID, Row};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result};

/// Decode the `value` column of the first row, if any.
///
/// A SQL `NULL` (or absent row) reads as `None`; invalid JSON in a directly
/// requested key is an error, unlike in bulk reads.
pub(crate) fn decode_first<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Option<T>> {
  let Some(mut row) = rows.into_iter().next() else {
    return Ok(None);
  };
  match row.remove("value") {
    Some(Value::String(text)) => Ok(Some(serde_json::from_str(&text)?)),
    _ => Ok(None),
  }
}

/// Decode all `(key, value)` rows of a bulk read.
///
/// A row whose value fails to parse is reported as `None` rather than
/// aborting the batch.
pub(crate) fn decode_all(rows: Vec<Row>) -> BTreeMap<String, Option<Value>> {
  let mut out = BTreeMap::new();
  for mut row in rows {
    let Some(Value::String(key)) = row.remove("key") else {
      continue;
    };
    let value = match row.remove("value") {
      Some(Value::String(text)) => match serde_json::from_str(&text) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
          tracing::warn!(%key, %err, "stored value is not valid JSON; reporting null");
          None
        }
      },
      _ => None,
    };
    out.insert(key, value);
  }
  out
}

/// Extract the row id reported for an insert.
pub(crate) fn insert_rowid(rows: &[Row]) -> Result<i64> {
  rows
    .first()
    .and_then(|row| row.get(LAST_INSERT_ROW_ID))
    .and_then(Value::as_i64)
    .ok_or(Error::MissingInsertId)
}
