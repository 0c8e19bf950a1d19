//! [`StateStore`] — entry point to the state service, and the persistent
//! scope.

use std::{collections::BTreeMap, path::Path};

use cubby_client::{StateClient, Statement};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Result, Session, values};

/// Facade over the state service.
///
/// Persistent values are keyed globally and survive across invocations;
/// session values hang off a [`Session`] started with
/// [`StateStore::begin_session`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StateStore {
  client: StateClient,
}

impl StateStore {
  pub fn new(client: StateClient) -> Self {
    Self { client }
  }

  /// Facade over the daemon listening on `socket_path`. No connection is
  /// opened until the first call.
  pub fn connect(socket_path: impl AsRef<Path>) -> Self {
    Self::new(StateClient::new(socket_path.as_ref()))
  }

  /// Probe the daemon and return its liveness string.
  pub async fn status(&self) -> Result<String> {
    Ok(self.client.status().await?)
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  /// Register this invocation: insert a `sessions` row and return the handle
  /// carrying its id. Every call yields a distinct session.
  pub async fn begin_session(&self) -> Result<Session> {
    let rows = self
      .client
      .query(Statement::new("INSERT INTO sessions DEFAULT VALUES"))
      .await?;
    let id = values::insert_rowid(&rows)?;
    tracing::debug!(id, "session started");
    Ok(Session::new(id, self.client.clone()))
  }

  // ── Persistent scope ──────────────────────────────────────────────────────

  /// Store `value` under `key`, replacing any previous value.
  pub async fn set_persistent<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
    let text = serde_json::to_string(value)?;
    self
      .client
      .query(
        Statement::new(
          "INSERT INTO persistent_data (key, value) VALUES (?1, ?2) \
           ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(text),
      )
      .await?;
    Ok(())
  }

  pub async fn get_persistent<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
    let rows = self
      .client
      .query(
        Statement::new("SELECT value FROM persistent_data WHERE key = ?1").bind(key),
      )
      .await?;
    values::decode_first(rows)
  }

  pub async fn remove_persistent(&self, key: &str) -> Result<()> {
    self
      .client
      .query(Statement::new("DELETE FROM persistent_data WHERE key = ?1").bind(key))
      .await?;
    Ok(())
  }

  /// All persistent pairs, each value JSON-decoded individually.
  pub async fn persistent_values(&self) -> Result<BTreeMap<String, Option<Value>>> {
    let rows = self
      .client
      .query(Statement::new("SELECT key, value FROM persistent_data"))
      .await?;
    Ok(values::decode_all(rows))
  }

  /// Delete every persistent pair.
  pub async fn clear_persistent(&self) -> Result<()> {
    self
      .client
      .query(Statement::new("DELETE FROM persistent_data"))
      .await?;
    Ok(())
  }
}
