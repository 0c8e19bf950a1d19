//! [`SqliteStore`] — schema application and raw statement execution.

use std::path::Path;

use cubby_core::{Row, Schema};
use serde_json::Value;

use crate::{Result, ddl, encode};

/// The backing database, exclusively owned by the process that opened it.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) `<dir>/<schema.name>.db` and apply `schema`.
  ///
  /// The directory is created if absent. Re-opening an already-initialized
  /// file re-applies the DDL as a no-op.
  pub async fn open(schema: &Schema, dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(format!("{}.db", schema.name));
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.apply_schema(schema).await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory(schema: &Schema) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.apply_schema(schema).await?;
    Ok(store)
  }

  async fn apply_schema(&self, schema: &Schema) -> Result<()> {
    let mut statements = vec![
      "PRAGMA journal_mode = WAL".to_string(),
      "PRAGMA foreign_keys = ON".to_string(),
    ];
    for table in &schema.tables {
      statements.push(ddl::create_table_sql(table));
      statements.extend(
        table
          .unique_indexes
          .iter()
          .map(|ix| ddl::create_unique_index_sql(&table.name, ix)),
      );
    }

    self
      .conn
      .call(move |conn| {
        for sql in &statements {
          tracing::debug!(%sql, "applying schema statement");
          conn.execute_batch(sql)?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Execute one statement with positionally-bound parameters.
  ///
  /// Statements that produce result columns return their rows; everything
  /// else returns an empty vec.
  pub async fn execute(&self, sql: String, params: Vec<Value>) -> Result<Vec<Row>> {
    let bound: Vec<rusqlite::types::Value> =
      params.iter().map(encode::bind_value).collect::<Result<_>>()?;

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let names: Vec<String> =
          stmt.column_names().iter().map(|n| n.to_string()).collect();

        if names.is_empty() {
          stmt.execute(rusqlite::params_from_iter(bound))?;
          return Ok(Vec::new());
        }

        let rows = stmt
          .query_map(rusqlite::params_from_iter(bound), |row| {
            let mut object = Row::new();
            for (i, name) in names.iter().enumerate() {
              object.insert(name.clone(), encode::column_to_json(row.get_ref(i)?));
            }
            Ok(object)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    Ok(rows)
  }

  /// Row id assigned by the most recent successful `INSERT` on this
  /// connection.
  pub async fn last_insert_rowid(&self) -> Result<i64> {
    let id = self.conn.call(|conn| Ok(conn.last_insert_rowid())).await?;
    Ok(id)
  }

  /// Close the underlying connection. The store cannot be used afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }
}
