//! Error types for `cubby-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("table not found: {0}")]
  TableNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
