//! Core types for the cubby state store.
//!
//! This crate is deliberately free of I/O and database dependencies.
//! All other crates depend on it; it depends on nothing but serde.

pub mod error;
pub mod schema;
pub mod state;

pub use error::{Error, Result};
pub use schema::{
  Column, ColumnRef, ForeignKey, Schema, SchemaBuilder, Table, TableBuilder,
  UniqueIndex,
};
pub use state::{STATE_DB_NAME, state_schema};

/// One result row: column name → JSON value.
///
/// Rows cross the wire as JSON objects, so the map type is shared by the
/// storage engine, the protocol and the client.
pub type Row = serde_json::Map<String, serde_json::Value>;
