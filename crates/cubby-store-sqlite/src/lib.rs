//! SQLite storage engine for the cubby state service.
//!
//! Opens (or creates) the backing database file from a
//! [`cubby_core::Schema`], applies the schema as idempotent DDL, and exposes
//! raw parameterized-query execution. Wraps [`tokio_rusqlite`] so all
//! database access runs off the async runtime's worker threads.
//!
//! The engine itself carries no locking: the RPC server in front of it is
//! the sole caller and serializes requests.

mod ddl;
mod encode;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
