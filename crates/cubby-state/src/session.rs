//! [`Session`] — the handle scoping one CLI invocation's state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use cubby_client::{StateClient, Statement};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result, values};

/// One row in `sessions`, owned for the lifetime of the invocation.
///
/// The handle is the only way to express a session-scoped operation;
/// [`Session::destroy`] consumes it, so nothing can touch a torn-down
/// session afterwards.
#[derive(Debug)]
pub struct Session {
  id:     i64,
  client: StateClient,
}

impl Session {
  pub(crate) fn new(id: i64, client: StateClient) -> Self {
    Self { id, client }
  }

  /// The server-assigned session id.
  pub fn id(&self) -> i64 {
    self.id
  }

  /// Store `value` under `key` for this session, replacing any previous
  /// value.
  pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
    let text = serde_json::to_string(value)?;
    self
      .client
      .query(
        Statement::new(
          "INSERT INTO session_data (session_id, key, value) VALUES (?1, ?2, ?3) \
           ON CONFLICT(session_id, key) DO UPDATE SET value = excluded.value",
        )
        .bind(self.id)
        .bind(key)
        .bind(text),
      )
      .await?;
    Ok(())
  }

  pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
    let rows = self
      .client
      .query(
        Statement::new(
          "SELECT value FROM session_data WHERE session_id = ?1 AND key = ?2",
        )
        .bind(self.id)
        .bind(key),
      )
      .await?;
    values::decode_first(rows)
  }

  pub async fn remove(&self, key: &str) -> Result<()> {
    self
      .client
      .query(
        Statement::new("DELETE FROM session_data WHERE session_id = ?1 AND key = ?2")
          .bind(self.id)
          .bind(key),
      )
      .await?;
    Ok(())
  }

  /// All pairs of this session, each value JSON-decoded individually.
  pub async fn values(&self) -> Result<BTreeMap<String, Option<Value>>> {
    let rows = self
      .client
      .query(
        Statement::new("SELECT key, value FROM session_data WHERE session_id = ?1")
          .bind(self.id),
      )
      .await?;
    Ok(values::decode_all(rows))
  }

  /// When the session row was created.
  pub async fn created_at(&self) -> Result<DateTime<Utc>> {
    let rows = self
      .client
      .query(Statement::new("SELECT created_at FROM sessions WHERE id = ?1").bind(self.id))
      .await?;
    let epoch = rows
      .first()
      .and_then(|row| row.get("created_at"))
      .and_then(Value::as_i64)
      .ok_or(Error::SessionNotFound(self.id))?;
    DateTime::from_timestamp(epoch, 0).ok_or(Error::InvalidTimestamp(epoch))
  }

  /// Tear the session down: delete its data rows, then the session row.
  pub async fn destroy(self) -> Result<()> {
    self
      .client
      .query(
        Statement::new("DELETE FROM session_data WHERE session_id = ?1").bind(self.id),
      )
      .await?;
    self
      .client
      .query(Statement::new("DELETE FROM sessions WHERE id = ?1").bind(self.id))
      .await?;
    tracing::debug!(id = self.id, "session destroyed");
    Ok(())
  }
}
