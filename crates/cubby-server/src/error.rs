//! Error type for `cubby-server`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("protocol error: {0}")]
  Protocol(#[from] cubby_proto::Error),

  #[error("store error: {0}")]
  Store(#[from] cubby_store_sqlite::Error),

  #[error("HOME is not set; cannot locate the user service directory")]
  HomeDirUnset,

  #[error("no user service support on this platform: {0}")]
  UnsupportedPlatform(String),

  #[error("`{command}` exited with {status}")]
  CommandFailed {
    command: String,
    status:  std::process::ExitStatus,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
