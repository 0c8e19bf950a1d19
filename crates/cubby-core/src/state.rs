//! The fixed schema of the CLI state database.
//!
//! Three tables: `sessions` holds one row per CLI invocation, `session_data`
//! holds key-value pairs scoped to a session, `persistent_data` holds
//! key-value pairs that survive across invocations. Values are stored as
//! JSON text; timestamps are unix-epoch seconds assigned by SQLite.
//!
//! There is no migration mechanism — the layout is versionless and the
//! storage engine only ever re-creates missing tables and indexes.

use crate::schema::Schema;

/// Name of the state database; the backing file is `<name>.db`.
pub const STATE_DB_NAME: &str = "cubby";

/// Build the state schema document.
pub fn state_schema() -> Schema {
  Schema::builder(STATE_DB_NAME)
    .table("sessions")
    .column("id", "INTEGER PRIMARY KEY AUTOINCREMENT")
    .column("created_at", "INTEGER DEFAULT (strftime('%s','now'))")
    .finish()
    .table("session_data")
    .column("id", "INTEGER PRIMARY KEY AUTOINCREMENT")
    .column("session_id", "INTEGER NOT NULL")
    .column("created_at", "INTEGER DEFAULT (strftime('%s','now'))")
    .column("key", "TEXT")
    .column("value", "TEXT NULL")
    .foreign_key("session_id", "sessions", "id")
    .unique_index(["session_id", "key"])
    .finish()
    .table("persistent_data")
    .column("id", "INTEGER PRIMARY KEY AUTOINCREMENT")
    .column("created_at", "INTEGER DEFAULT (strftime('%s','now'))")
    .column("key", "TEXT")
    .column("value", "TEXT NULL")
    .unique_index(["key"])
    .finish()
    .build()
}
