//! Error type for `cubby-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  /// Only null, bool, number and string parameters can be bound.
  #[error("cannot bind parameter: {0}")]
  UnbindableParam(serde_json::Value),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
