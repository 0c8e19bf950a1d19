//! Error types for the cubby wire protocol.

use thiserror::Error;

use crate::frame::MAX_FRAME_LEN;

#[derive(Debug, Error)]
pub enum Error {
  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("frame of {0} bytes exceeds the {MAX_FRAME_LEN}-byte limit")]
  FrameTooLarge(usize),

  #[error("malformed message: {0}")]
  Malformed(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
