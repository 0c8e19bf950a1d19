//! Error type for `cubby-client`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The channel endpoint is missing — the daemon is not running.
  #[error("state service socket does not exist: {} (is cubbyd running?)", .0.display())]
  SocketMissing(PathBuf),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("protocol error: {0}")]
  Protocol(#[from] cubby_proto::Error),

  /// The server answered with an error envelope.
  #[error("state service error: {0}")]
  Server(String),

  #[error("unexpected response kind from the state service")]
  UnexpectedResponse,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
