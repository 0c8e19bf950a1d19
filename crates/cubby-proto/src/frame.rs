//! Length-prefixed message framing.
//!
//! Wire layout: `[len:u32 big-endian][payload…]`. A payload whose size is an
//! exact multiple of any read-buffer size needs no special handling — the
//! header states the full length up front.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Error, Result};

/// Upper bound on a single frame's payload. Statements and row sets for the
/// state database are small; anything near this limit is a protocol abuse.
pub const MAX_FRAME_LEN: usize = 4 * 1024 * 1024;

/// Write one framed message to `stream`.
pub async fn write_frame<W>(stream: &mut W, payload: &[u8]) -> Result<()>
where
  W: AsyncWrite + Unpin,
{
  if payload.len() > MAX_FRAME_LEN {
    return Err(Error::FrameTooLarge(payload.len()));
  }
  stream.write_all(&(payload.len() as u32).to_be_bytes()).await?;
  stream.write_all(payload).await?;
  stream.flush().await?;
  Ok(())
}

/// Read one framed message from `stream`.
pub async fn read_frame<R>(stream: &mut R) -> Result<Vec<u8>>
where
  R: AsyncRead + Unpin,
{
  let mut header = [0u8; 4];
  stream.read_exact(&mut header).await?;

  let len = u32::from_be_bytes(header) as usize;
  if len > MAX_FRAME_LEN {
    return Err(Error::FrameTooLarge(len));
  }

  let mut payload = vec![0u8; len];
  stream.read_exact(&mut payload).await?;
  Ok(payload)
}
