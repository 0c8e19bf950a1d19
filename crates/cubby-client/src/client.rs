//! [`StateClient`] — one connection per request against the state service.

use std::path::{Path, PathBuf};

use cubby_proto::{Request, Response, Row, read_frame, write_frame};
use tokio::net::UnixStream;

use crate::{Error, Result, Statement};

/// Client for the unix-socket endpoint of a running `cubbyd`.
///
/// Cheap to clone — only the endpoint path is held. Every call opens, uses
/// and drops its own connection.
#[derive(Debug, Clone)]
pub struct StateClient {
  socket_path: PathBuf,
}

impl StateClient {
  pub fn new(socket_path: impl Into<PathBuf>) -> Self {
    Self { socket_path: socket_path.into() }
  }

  pub fn socket_path(&self) -> &Path {
    &self.socket_path
  }

  async fn connect(&self) -> Result<UnixStream> {
    if !self.socket_path.exists() {
      return Err(Error::SocketMissing(self.socket_path.clone()));
    }
    Ok(UnixStream::connect(&self.socket_path).await?)
  }

  async fn round_trip(&self, request: &Request) -> Result<Response> {
    let mut stream = self.connect().await?;
    write_frame(&mut stream, &request.to_bytes()?).await?;
    let payload = read_frame(&mut stream).await?;
    Ok(Response::from_bytes(&payload)?)
  }

  /// Execute one parameterized statement and return its rows.
  ///
  /// An `INSERT` returns a single row `{ "LAST_INSERT_ROW_ID": n }`. A
  /// server-side failure is raised as [`Error::Server`].
  pub async fn query(&self, statement: Statement) -> Result<Vec<Row>> {
    let (sql, params) = statement.compile();
    tracing::debug!(%sql, "sending query");

    match self.round_trip(&Request::Query { sql, params }).await? {
      Response::Rows { rows } => Ok(rows),
      Response::Error { message } => Err(Error::Server(message)),
      Response::Status { .. } => Err(Error::UnexpectedResponse),
    }
  }

  /// Probe the daemon and return its liveness string.
  pub async fn status(&self) -> Result<String> {
    match self.round_trip(&Request::Status).await? {
      Response::Status { message } => Ok(message),
      Response::Error { message } => Err(Error::Server(message)),
      Response::Rows { .. } => Err(Error::UnexpectedResponse),
    }
  }
}
