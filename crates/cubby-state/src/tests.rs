//! Facade tests against a full stack: store → server → client → facade,
//! on a temp socket and database.

use std::path::PathBuf;

use cubby_client::{StateClient, Statement};
use cubby_core::state_schema;
use cubby_server::StateServer;
use cubby_store_sqlite::SqliteStore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::StateStore;

struct TestService {
  state:  StateStore,
  client: StateClient,
  dir:    PathBuf,
  task:   tokio::task::JoinHandle<()>,
}

async fn spawn_service() -> TestService {
  let dir = std::env::temp_dir().join(format!("cubby-state-test-{}", Uuid::new_v4()));
  let socket = dir.join("state.sock");

  let store = SqliteStore::open(&state_schema(), &dir).await.unwrap();
  let server = StateServer::bind(store, &socket).await.unwrap();
  let task = tokio::spawn(async move {
    let _ = server.serve().await;
  });

  TestService {
    state:  StateStore::connect(&socket),
    client: StateClient::new(&socket),
    dir,
    task,
  }
}

impl TestService {
  async fn count(&self, sql: &str, params: Vec<serde_json::Value>) -> i64 {
    let mut stmt = Statement::new(sql);
    for param in params {
      stmt = stmt.bind(param);
    }
    let rows = self.client.query(stmt).await.unwrap();
    rows[0]["n"].as_i64().unwrap()
  }

  fn finish(self) {
    self.task.abort();
    std::fs::remove_dir_all(&self.dir).ok();
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Workspace {
  root:     String,
  services: Vec<String>,
  pinned:   bool,
}

fn workspace() -> Workspace {
  Workspace {
    root:     "/home/u/project".to_string(),
    services: vec!["web".to_string(), "db".to_string()],
    pinned:   true,
  }
}

#[tokio::test]
async fn daemon_answers_the_status_probe() {
  let svc = spawn_service().await;
  let status = svc.state.status().await.unwrap();
  assert!(status.ends_with("OK"), "unexpected status line: {status}");
  svc.finish();
}

// ─── Session scope ───────────────────────────────────────────────────────────

#[tokio::test]
async fn session_set_get_round_trip() {
  let svc = spawn_service().await;
  let session = svc.state.begin_session().await.unwrap();

  session.set("workspace", &workspace()).await.unwrap();
  let read: Option<Workspace> = session.get("workspace").await.unwrap();
  assert_eq!(read, Some(workspace()));

  svc.finish();
}

#[tokio::test]
async fn session_get_missing_key_is_none() {
  let svc = spawn_service().await;
  let session = svc.state.begin_session().await.unwrap();

  let read: Option<String> = session.get("never-set").await.unwrap();
  assert_eq!(read, None);

  svc.finish();
}

#[tokio::test]
async fn session_set_is_an_upsert() {
  let svc = spawn_service().await;
  let session = svc.state.begin_session().await.unwrap();

  session.set("attempts", &1).await.unwrap();
  session.set("attempts", &2).await.unwrap();

  let read: Option<i64> = session.get("attempts").await.unwrap();
  assert_eq!(read, Some(2));

  let all = session.values().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all["attempts"], Some(json!(2)));

  svc.finish();
}

#[tokio::test]
async fn session_remove_deletes_the_pair() {
  let svc = spawn_service().await;
  let session = svc.state.begin_session().await.unwrap();

  session.set("tmp", &"x").await.unwrap();
  session.remove("tmp").await.unwrap();

  let read: Option<String> = session.get("tmp").await.unwrap();
  assert_eq!(read, None);

  svc.finish();
}

#[tokio::test]
async fn sessions_do_not_see_each_other() {
  let svc = spawn_service().await;
  let a = svc.state.begin_session().await.unwrap();
  let b = svc.state.begin_session().await.unwrap();

  a.set("who", &"a").await.unwrap();
  b.set("who", &"b").await.unwrap();

  assert_eq!(a.get::<String>("who").await.unwrap(), Some("a".to_string()));
  assert_eq!(b.get::<String>("who").await.unwrap(), Some("b".to_string()));

  svc.finish();
}

#[tokio::test]
async fn created_at_is_recent() {
  let svc = spawn_service().await;
  let session = svc.state.begin_session().await.unwrap();

  let created = session.created_at().await.unwrap();
  let age = chrono::Utc::now().signed_duration_since(created);
  assert!(age.num_seconds().abs() < 60, "created_at off by {age}");

  svc.finish();
}

#[tokio::test]
async fn concurrent_sessions_receive_distinct_ids() {
  let svc = spawn_service().await;

  let mut handles = Vec::new();
  for _ in 0..8 {
    let state = svc.state.clone();
    handles.push(tokio::spawn(async move {
      state.begin_session().await.unwrap().id()
    }));
  }

  let mut ids = Vec::new();
  for handle in handles {
    ids.push(handle.await.unwrap());
  }
  ids.sort_unstable();
  ids.dedup();
  assert_eq!(ids.len(), 8, "session ids must be distinct");

  svc.finish();
}

// ─── Teardown ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn destroy_removes_only_that_session() {
  let svc = spawn_service().await;
  let doomed = svc.state.begin_session().await.unwrap();
  let survivor = svc.state.begin_session().await.unwrap();

  doomed.set("k1", &"v").await.unwrap();
  doomed.set("k2", &"v").await.unwrap();
  survivor.set("k", &"v").await.unwrap();
  svc.state.set_persistent("p", &"v").await.unwrap();

  let doomed_id = doomed.id();
  doomed.destroy().await.unwrap();

  let orphaned = svc
    .count(
      "SELECT COUNT(*) AS n FROM session_data WHERE session_id = ?1",
      vec![json!(doomed_id)],
    )
    .await;
  assert_eq!(orphaned, 0);

  let doomed_rows = svc
    .count("SELECT COUNT(*) AS n FROM sessions WHERE id = ?1", vec![json!(doomed_id)])
    .await;
  assert_eq!(doomed_rows, 0);

  // The other session and the persistent scope are untouched.
  assert_eq!(survivor.values().await.unwrap().len(), 1);
  assert_eq!(svc.state.persistent_values().await.unwrap().len(), 1);

  svc.finish();
}

// ─── Persistent scope ────────────────────────────────────────────────────────

#[tokio::test]
async fn persistent_set_get_round_trip() {
  let svc = spawn_service().await;

  svc.state.set_persistent("workspace", &workspace()).await.unwrap();
  let read: Option<Workspace> = svc.state.get_persistent("workspace").await.unwrap();
  assert_eq!(read, Some(workspace()));

  svc.finish();
}

#[tokio::test]
async fn persistent_values_survive_sessions() {
  let svc = spawn_service().await;

  let session = svc.state.begin_session().await.unwrap();
  svc.state.set_persistent("counter", &41).await.unwrap();
  session.destroy().await.unwrap();

  let read: Option<i64> = svc.state.get_persistent("counter").await.unwrap();
  assert_eq!(read, Some(41));

  svc.finish();
}

#[tokio::test]
async fn remove_and_clear_persistent() {
  let svc = spawn_service().await;

  svc.state.set_persistent("a", &1).await.unwrap();
  svc.state.set_persistent("b", &2).await.unwrap();

  svc.state.remove_persistent("a").await.unwrap();
  assert_eq!(svc.state.get_persistent::<i64>("a").await.unwrap(), None);

  svc.state.clear_persistent().await.unwrap();
  assert!(svc.state.persistent_values().await.unwrap().is_empty());

  svc.finish();
}

// ─── Degraded reads ──────────────────────────────────────────────────────────

#[tokio::test]
async fn corrupt_value_reads_as_null_in_bulk() {
  let svc = spawn_service().await;
  let session = svc.state.begin_session().await.unwrap();

  session.set("good", &"fine").await.unwrap();

  // Plant a row whose value is not valid JSON, bypassing the facade.
  svc
    .client
    .query(
      Statement::new(
        "INSERT INTO session_data (session_id, key, value) VALUES (?1, ?2, ?3)",
      )
      .bind(session.id())
      .bind("bad")
      .bind("{not json"),
    )
    .await
    .unwrap();

  let all = session.values().await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all["good"], Some(json!("fine")));
  assert_eq!(all["bad"], None);

  svc.finish();
}

#[tokio::test]
async fn values_larger_than_a_read_buffer_round_trip() {
  let svc = spawn_service().await;
  let session = svc.state.begin_session().await.unwrap();

  let big = "x".repeat(32 * 1024);
  session.set("big", &big).await.unwrap();

  let read: Option<String> = session.get("big").await.unwrap();
  assert_eq!(read.as_deref().map(str::len), Some(big.len()));

  svc.finish();
}
