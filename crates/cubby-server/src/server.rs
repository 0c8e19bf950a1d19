//! [`StateServer`] — the unix-socket RPC server in front of the store.
//!
//! Connections are accepted freely but handled one at a time: every handler
//! task takes the store mutex before reading its request, so at most one
//! statement is ever mid-execution. The store is not proven safe for
//! concurrent writers; the mutex is the single write gate.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use cubby_proto::{
  LAST_INSERT_ROW_ID, Request, Response, STATUS_OK, read_frame, write_frame,
};
use cubby_store_sqlite::SqliteStore;
use serde_json::Value;
use tokio::{
  net::{UnixListener, UnixStream},
  sync::Mutex,
};

use crate::Result;

pub struct StateServer {
  listener:    UnixListener,
  socket_path: PathBuf,
  store:       Arc<Mutex<SqliteStore>>,
}

impl StateServer {
  /// Bind the socket endpoint, replacing a stale one left by an earlier run.
  pub async fn bind(store: SqliteStore, socket_path: impl Into<PathBuf>) -> Result<Self> {
    let socket_path = socket_path.into();

    if socket_path.exists() {
      tracing::info!(path = %socket_path.display(), "removing stale socket");
      tokio::fs::remove_file(&socket_path).await?;
    }
    if let Some(parent) = socket_path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }

    let listener = UnixListener::bind(&socket_path)?;
    Ok(Self {
      listener,
      socket_path,
      store: Arc::new(Mutex::new(store)),
    })
  }

  pub fn socket_path(&self) -> &Path {
    &self.socket_path
  }

  /// Accept loop. Runs until the listener fails or the future is dropped.
  pub async fn serve(&self) -> Result<()> {
    loop {
      let (stream, _addr) = self.listener.accept().await?;
      let store = Arc::clone(&self.store);
      tokio::spawn(async move {
        let store = store.lock().await;
        if let Err(err) = handle_connection(stream, &store).await {
          tracing::error!(%err, "connection handling failed");
        }
      });
    }
  }

  /// Stop serving: remove the socket endpoint and close the store.
  pub async fn shutdown(self) -> Result<()> {
    let Self { listener, socket_path, store } = self;
    drop(listener);

    if socket_path.exists() {
      tokio::fs::remove_file(&socket_path).await?;
    }

    // In-flight handler tasks hold clones of the Arc; if any remain, the
    // store closes when the last one drops it.
    if let Ok(mutex) = Arc::try_unwrap(store) {
      mutex.into_inner().close().await?;
    }
    Ok(())
  }
}

/// One request/response exchange; the connection closes when `stream` drops.
async fn handle_connection(mut stream: UnixStream, store: &SqliteStore) -> Result<()> {
  let payload = read_frame(&mut stream).await?;
  let request = Request::from_bytes(&payload)?;
  tracing::debug!(?request, "handling request");

  let response = match request {
    Request::Status => Response::Status { message: STATUS_OK.to_string() },
    Request::Query { sql, params } => run_query(store, sql, params).await,
  };

  write_frame(&mut stream, &response.to_bytes()?).await?;
  Ok(())
}

/// Execute one statement. Failures become an error response, never a crash.
async fn run_query(store: &SqliteStore, sql: String, params: Vec<Value>) -> Response {
  let is_insert = statement_kind(&sql).is_some_and(|kind| kind == "INSERT");

  let result = if is_insert {
    insert_returning_rowid(store, sql, params).await
  } else {
    store.execute(sql, params).await
  };

  match result {
    Ok(rows) => Response::Rows { rows },
    Err(err) => {
      tracing::warn!(%err, "statement failed");
      Response::Error { message: err.to_string() }
    }
  }
}

/// Run an insert, then report the assigned row id as a single-row result.
async fn insert_returning_rowid(
  store: &SqliteStore,
  sql: String,
  params: Vec<Value>,
) -> cubby_store_sqlite::Result<Vec<cubby_proto::Row>> {
  store.execute(sql, params).await?;
  let id = store.last_insert_rowid().await?;

  let mut row = cubby_proto::Row::new();
  row.insert(LAST_INSERT_ROW_ID.to_string(), id.into());
  Ok(vec![row])
}

/// Leading keyword of `sql`, uppercased, with comments stripped.
fn statement_kind(sql: &str) -> Option<String> {
  let stripped = strip_comments(sql);
  let word: String = stripped
    .trim_start()
    .chars()
    .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
    .collect();
  (!word.is_empty()).then(|| word.to_ascii_uppercase())
}

/// Remove `/* … */` block comments and `--` line comments.
///
/// Comment markers inside string literals are not recognised; statement
/// classification only needs the leading keyword.
fn strip_comments(sql: &str) -> String {
  let mut out = String::with_capacity(sql.len());
  let mut rest = sql;
  while let Some(start) = rest.find("/*") {
    out.push_str(&rest[..start]);
    match rest[start + 2..].find("*/") {
      Some(end) => rest = &rest[start + 2 + end + 2..],
      None => {
        rest = "";
        break;
      }
    }
  }
  out.push_str(rest);

  out
    .lines()
    .map(|line| line.split_once("--").map_or(line, |(head, _)| head))
    .collect::<Vec<_>>()
    .join("\n")
}

#[cfg(test)]
mod tests {
  use super::{statement_kind, strip_comments};

  #[test]
  fn keyword_is_case_insensitive() {
    assert_eq!(statement_kind("insert into t VALUES (1)").as_deref(), Some("INSERT"));
    assert_eq!(statement_kind("  SELECT 1").as_deref(), Some("SELECT"));
    assert_eq!(statement_kind("Delete FROM t").as_deref(), Some("DELETE"));
  }

  #[test]
  fn comments_are_ignored() {
    let sql = "/* hint */ -- a note\nINSERT INTO t (k) VALUES (?1)";
    assert_eq!(statement_kind(sql).as_deref(), Some("INSERT"));
  }

  #[test]
  fn unterminated_block_comment_yields_nothing() {
    assert_eq!(statement_kind("/* dangling INSERT"), None);
    assert_eq!(statement_kind(""), None);
  }

  #[test]
  fn strip_comments_keeps_statement_text() {
    let sql = "SELECT a, /* b, */ c FROM t -- trailing";
    assert_eq!(strip_comments(sql), "SELECT a,  c FROM t ");
  }
}
