//! Error type for `cubby-state`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("client error: {0}")]
  Client(#[from] cubby_client::Error),

  #[error("serialization error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("insert did not report a row id")]
  MissingInsertId,

  #[error("session {0} not found")]
  SessionNotFound(i64),

  #[error("unrepresentable timestamp: {0}")]
  InvalidTimestamp(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
