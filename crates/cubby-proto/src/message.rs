//! Request and response bodies.
//!
//! Responses carry an explicit discriminant rather than a sentinel string
//! prefix, so error detection never depends on message content.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, Row};

/// Liveness string answered to a [`Request::Status`] probe.
pub const STATUS_OK: &str = "cubby state service: OK";

/// Column name under which an insert's assigned row id is returned.
pub const LAST_INSERT_ROW_ID: &str = "LAST_INSERT_ROW_ID";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
  /// Liveness probe; answered without touching the database.
  Status,
  /// One parameterized statement. `params` bind positionally to `?N`
  /// placeholders in `sql`.
  Query {
    sql:    String,
    #[serde(default)]
    params: Vec<Value>,
  },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
  Status { message: String },
  /// Result rows. For an `INSERT` this is a single row
  /// `{ "LAST_INSERT_ROW_ID": n }`.
  Rows { rows: Vec<Row> },
  Error { message: String },
}

impl Request {
  pub fn to_bytes(&self) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(self)?)
  }

  pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
    Ok(serde_json::from_slice(bytes)?)
  }
}

impl Response {
  pub fn to_bytes(&self) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(self)?)
  }

  pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
    Ok(serde_json::from_slice(bytes)?)
  }
}
