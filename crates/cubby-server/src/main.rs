//! cubbyd — the cubby state service daemon.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the state
//! database, and serves it over a unix socket. Multiple concurrent CLI
//! invocations share this one process; it is the sole owner of the backing
//! file.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use cubby_core::state_schema;
use cubby_proto::{Request, Response, read_frame, write_frame};
use cubby_server::{ServerConfig, ServiceInstaller, StateServer};
use cubby_store_sqlite::SqliteStore;
use tokio::net::UnixStream;
use tokio::signal::unix::{SignalKind, signal};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "cubby state service daemon")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Run the state service in the foreground (the default).
  Run,
  /// Install the user service unit that keeps the daemon running.
  Install {
    /// Write the unit file but do not start the service.
    #[arg(long)]
    no_start: bool,
  },
  /// Probe a running daemon and print its status line.
  Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("CUBBY"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let socket_path = expand_tilde(&server_cfg.socket_path);
  let data_dir = expand_tilde(&server_cfg.data_dir);

  match cli.command.unwrap_or(Command::Run) {
    Command::Run => run(socket_path, data_dir).await,
    Command::Install { no_start } => {
      let exec_path =
        std::env::current_exe().context("cannot resolve executable path")?;
      let installer = ServiceInstaller::new(exec_path, cli.config)?;
      installer.install(!no_start).await?;
      Ok(())
    }
    Command::Status => status(&socket_path).await,
  }
}

async fn run(socket_path: PathBuf, data_dir: PathBuf) -> anyhow::Result<()> {
  let store = SqliteStore::open(&state_schema(), &data_dir)
    .await
    .with_context(|| format!("failed to open state database in {data_dir:?}"))?;

  let server = StateServer::bind(store, &socket_path)
    .await
    .with_context(|| format!("failed to bind {socket_path:?}"))?;

  tracing::info!("Listening on {}", socket_path.display());

  let mut sigterm = signal(SignalKind::terminate())?;
  tokio::select! {
    result = server.serve() => result.context("server error")?,
    _ = tokio::signal::ctrl_c() => tracing::info!("SIGINT received - stopping"),
    _ = sigterm.recv() => tracing::info!("SIGTERM received - stopping"),
  }

  server.shutdown().await.context("shutdown error")?;
  Ok(())
}

async fn status(socket_path: &Path) -> anyhow::Result<()> {
  let mut stream = UnixStream::connect(socket_path)
    .await
    .with_context(|| format!("no daemon listening on {socket_path:?}"))?;

  write_frame(&mut stream, &Request::Status.to_bytes()?).await?;
  let payload = read_frame(&mut stream).await?;

  match Response::from_bytes(&payload)? {
    Response::Status { message } => {
      println!("{message}");
      Ok(())
    }
    other => anyhow::bail!("unexpected response: {other:?}"),
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
