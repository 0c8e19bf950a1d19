//! RPC server for the cubby state database.
//!
//! Owns the backing SQLite file exclusively: every other process reaches it
//! through the unix-socket endpoint served here, one framed request per
//! connection. Request handling is serialized, so concurrent CLI
//! invocations never race on the store.

pub mod error;
pub mod server;
pub mod service;

pub use error::{Error, Result};
pub use server::StateServer;
pub use service::ServiceInstaller;

use std::path::PathBuf;

use serde::Deserialize;

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_socket_path() -> PathBuf {
  PathBuf::from("~/.cubby/state.sock")
}

fn default_data_dir() -> PathBuf {
  PathBuf::from("~/.cubby/db")
}

/// Runtime daemon configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// Channel endpoint; its existence signals a live daemon.
  #[serde(default = "default_socket_path")]
  pub socket_path: PathBuf,
  /// Directory holding the backing database file.
  #[serde(default = "default_data_dir")]
  pub data_dir:    PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      socket_path: default_socket_path(),
      data_dir:    default_data_dir(),
    }
  }
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use cubby_core::state_schema;
  use cubby_proto::{
    LAST_INSERT_ROW_ID, Request, Response, STATUS_OK, read_frame, write_frame,
  };
  use cubby_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tokio::net::UnixStream;
  use uuid::Uuid;

  use crate::server::StateServer;

  struct TestService {
    socket: PathBuf,
    dir:    PathBuf,
    task:   tokio::task::JoinHandle<()>,
  }

  async fn spawn_service() -> TestService {
    let dir = std::env::temp_dir().join(format!("cubbyd-test-{}", Uuid::new_v4()));
    let socket = dir.join("state.sock");

    let store = SqliteStore::open(&state_schema(), &dir).await.unwrap();
    let server = StateServer::bind(store, &socket).await.unwrap();
    let task = tokio::spawn(async move {
      let _ = server.serve().await;
    });

    TestService { socket, dir, task }
  }

  impl TestService {
    async fn exchange(&self, request: &Request) -> Response {
      let mut stream = UnixStream::connect(&self.socket).await.unwrap();
      write_frame(&mut stream, &request.to_bytes().unwrap())
        .await
        .unwrap();
      let payload = read_frame(&mut stream).await.unwrap();
      Response::from_bytes(&payload).unwrap()
    }

    fn finish(self) {
      self.task.abort();
      std::fs::remove_dir_all(&self.dir).ok();
    }
  }

  fn query(sql: &str, params: Vec<Value>) -> Request {
    Request::Query { sql: sql.to_string(), params }
  }

  #[tokio::test]
  async fn status_probe_answers_liveness_string() {
    let svc = spawn_service().await;
    let response = svc.exchange(&Request::Status).await;
    assert_eq!(response, Response::Status { message: STATUS_OK.to_string() });
    svc.finish();
  }

  #[tokio::test]
  async fn insert_reports_the_assigned_row_id() {
    let svc = spawn_service().await;

    let response = svc
      .exchange(&query(
        "INSERT INTO persistent_data (key, value) VALUES (?1, ?2)",
        vec![json!("editor"), json!("\"vim\"")],
      ))
      .await;
    let Response::Rows { rows } = response else {
      panic!("expected rows, got {response:?}");
    };
    let id = rows[0][LAST_INSERT_ROW_ID].as_i64().unwrap();

    // The reported id must address the row just inserted.
    let response = svc
      .exchange(&query(
        "SELECT key, value FROM persistent_data WHERE id = ?1",
        vec![json!(id)],
      ))
      .await;
    let Response::Rows { rows } = response else {
      panic!("expected rows, got {response:?}");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["key"], json!("editor"));
    assert_eq!(rows[0]["value"], json!("\"vim\""));

    svc.finish();
  }

  #[tokio::test]
  async fn comment_prefixed_insert_is_still_an_insert() {
    let svc = spawn_service().await;
    let response = svc
      .exchange(&query(
        "/* retried */ -- after failure\nINSERT INTO persistent_data (key) VALUES (?1)",
        vec![json!("k")],
      ))
      .await;
    let Response::Rows { rows } = response else {
      panic!("expected rows, got {response:?}");
    };
    assert!(rows[0][LAST_INSERT_ROW_ID].as_i64().unwrap() > 0);
    svc.finish();
  }

  #[tokio::test]
  async fn invalid_statement_answers_error_and_server_survives() {
    let svc = spawn_service().await;

    let response = svc.exchange(&query("INVALID COMMAND", vec![])).await;
    let Response::Error { message } = response else {
      panic!("expected error, got {response:?}");
    };
    assert!(!message.is_empty());

    // The daemon must keep serving after a failed statement.
    let response = svc.exchange(&query("SELECT 1 AS one", vec![])).await;
    let Response::Rows { rows } = response else {
      panic!("expected rows, got {response:?}");
    };
    assert_eq!(rows[0]["one"], json!(1));

    svc.finish();
  }

  #[tokio::test]
  async fn values_larger_than_a_read_buffer_round_trip() {
    let svc = spawn_service().await;
    let big = "x".repeat(64 * 1024);

    svc
      .exchange(&query(
        "INSERT INTO persistent_data (key, value) VALUES (?1, ?2)",
        vec![json!("big"), json!(big.clone())],
      ))
      .await;

    let response = svc
      .exchange(&query(
        "SELECT value FROM persistent_data WHERE key = ?1",
        vec![json!("big")],
      ))
      .await;
    let Response::Rows { rows } = response else {
      panic!("expected rows, got {response:?}");
    };
    assert_eq!(rows[0]["value"], json!(big));

    svc.finish();
  }

  #[tokio::test]
  async fn concurrent_inserts_each_see_their_own_row_id() {
    let svc = std::sync::Arc::new(spawn_service().await);

    let mut handles = Vec::new();
    for n in 0..8 {
      let svc = std::sync::Arc::clone(&svc);
      handles.push(tokio::spawn(async move {
        let key = format!("key-{n}");
        let response = svc
          .exchange(&query(
            "INSERT INTO persistent_data (key, value) VALUES (?1, ?2)",
            vec![json!(key.clone()), json!("\"v\"")],
          ))
          .await;
        let Response::Rows { rows } = response else {
          panic!("expected rows, got {response:?}");
        };
        let id = rows[0][LAST_INSERT_ROW_ID].as_i64().unwrap();

        // Handling is serialized, so the id must belong to this insert even
        // under contention.
        let response = svc
          .exchange(&query(
            "SELECT key FROM persistent_data WHERE id = ?1",
            vec![json!(id)],
          ))
          .await;
        let Response::Rows { rows } = response else {
          panic!("expected rows, got {response:?}");
        };
        assert_eq!(rows[0]["key"], json!(key));
        id
      }));
    }

    let mut ids = Vec::new();
    for handle in handles {
      ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 8, "row ids must be distinct");

    match std::sync::Arc::try_unwrap(svc) {
      Ok(svc) => svc.finish(),
      Err(_) => unreachable!("all tasks joined"),
    }
  }
}
