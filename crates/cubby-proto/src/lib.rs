//! Wire protocol for the cubby state service.
//!
//! One request/response exchange per connection: the client writes a framed
//! [`Request`], the server answers with a framed [`Response`] and closes.
//! Frames are length-prefixed (4-byte big-endian header), so message
//! boundaries never depend on read-buffer sizes; bodies are JSON.

pub mod error;
mod frame;
mod message;

pub use cubby_core::Row;
pub use error::{Error, Result};
pub use frame::{MAX_FRAME_LEN, read_frame, write_frame};
pub use message::{LAST_INSERT_ROW_ID, Request, Response, STATUS_OK};
