//! RPC client for the cubby state service.
//!
//! Opens one unix-socket connection per request, sends a framed
//! parameterized statement, and decodes the framed response into rows or a
//! typed error. No pooling and no transport state between calls.

mod client;
mod statement;

pub mod error;

pub use client::StateClient;
pub use cubby_proto::{LAST_INSERT_ROW_ID, Row};
pub use error::{Error, Result};
pub use statement::Statement;
