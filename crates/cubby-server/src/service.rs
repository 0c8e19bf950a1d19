//! User-service installation for the daemon.
//!
//! Writes the unit file that keeps `cubbyd` running — a systemd user unit on
//! Linux, a launchd agent plist on macOS — and starts it. The file is only
//! rewritten when its content changed.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::{Error, Result};

const SERVICE_NAME: &str = "cubbyd";
const SERVICE_DESCRIPTION: &str = "cubby state service";

pub struct ServiceInstaller {
  exec_path:   PathBuf,
  config_path: PathBuf,
  home_dir:    PathBuf,
}

impl ServiceInstaller {
  pub fn new(exec_path: PathBuf, config_path: PathBuf) -> Result<Self> {
    let home_dir = std::env::var_os("HOME")
      .map(PathBuf::from)
      .ok_or(Error::HomeDirUnset)?;
    Ok(Self { exec_path, config_path, home_dir })
  }

  /// Override the home directory (used by tests).
  pub fn with_home(mut self, home_dir: impl Into<PathBuf>) -> Self {
    self.home_dir = home_dir.into();
    self
  }

  pub fn unit_file_path(&self) -> Result<PathBuf> {
    match std::env::consts::OS {
      "macos" => Ok(
        self
          .home_dir
          .join("Library/LaunchAgents")
          .join(format!("{SERVICE_NAME}.plist")),
      ),
      "linux" => Ok(
        self
          .home_dir
          .join(".config/systemd/user")
          .join(format!("{SERVICE_NAME}.service")),
      ),
      other => Err(Error::UnsupportedPlatform(other.to_string())),
    }
  }

  pub fn unit_file_content(&self) -> Result<String> {
    match std::env::consts::OS {
      "macos" => Ok(self.launchd_plist()),
      "linux" => Ok(self.systemd_unit()),
      other => Err(Error::UnsupportedPlatform(other.to_string())),
    }
  }

  /// Write the unit file (when changed) and optionally start the service.
  pub async fn install(&self, start: bool) -> Result<()> {
    let path = self.unit_file_path()?;
    let content = self.unit_file_content()?;

    tokio::fs::create_dir_all(self.log_dir()).await?;
    write_if_changed(&path, &content).await?;

    if start {
      self.start().await?;
    }
    Ok(())
  }

  pub async fn start(&self) -> Result<()> {
    match std::env::consts::OS {
      "macos" => {
        let path = self.unit_file_path()?;
        run_checked(Command::new("launchctl").arg("load").arg(&path)).await
      }
      "linux" => {
        run_checked(Command::new("systemctl").args(["--user", "daemon-reload"])).await?;
        run_checked(
          Command::new("systemctl")
            .args(["--user", "start", &format!("{SERVICE_NAME}.service")]),
        )
        .await
      }
      other => Err(Error::UnsupportedPlatform(other.to_string())),
    }
  }

  fn log_dir(&self) -> PathBuf {
    self.home_dir.join(".cubby/logs")
  }

  fn exec_line(&self) -> String {
    format!(
      "{} --config {} run",
      self.exec_path.display(),
      self.config_path.display()
    )
  }

  fn systemd_unit(&self) -> String {
    let logs = self.log_dir();
    format!(
      r"[Unit]
Description={SERVICE_DESCRIPTION}

[Service]
ExecStart={exec}
Restart=always
RestartSec=5
StartLimitBurst=3
StartLimitIntervalSec=60
StandardOutput=append:{logs}/{SERVICE_NAME}.out.log
StandardError=append:{logs}/{SERVICE_NAME}.err.log

[Install]
WantedBy=default.target
",
      exec = self.exec_line(),
      logs = logs.display(),
    )
  }

  fn launchd_plist(&self) -> String {
    let logs = self.log_dir();
    let arguments = [
      self.exec_path.display().to_string(),
      "--config".to_string(),
      self.config_path.display().to_string(),
      "run".to_string(),
    ]
    .iter()
    .map(|arg| format!("            <string>{arg}</string>"))
    .collect::<Vec<_>>()
    .join("\n");

    format!(
      r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple Computer//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
    <dict>
        <key>Label</key>
        <string>{SERVICE_NAME}</string>
        <key>Description</key>
        <string>{SERVICE_DESCRIPTION}</string>
        <key>ProgramArguments</key>
        <array>
{arguments}
        </array>
        <key>RunAtLoad</key>
        <true/>
        <key>KeepAlive</key>
        <true/>
        <key>ThrottleInterval</key>
        <integer>60</integer>
        <key>StandardOutPath</key>
        <string>{logs}/{SERVICE_NAME}.out.log</string>
        <key>StandardErrorPath</key>
        <string>{logs}/{SERVICE_NAME}.err.log</string>
    </dict>
</plist>
"#,
      logs = logs.display(),
    )
  }
}

async fn write_if_changed(path: &Path, content: &str) -> Result<()> {
  if let Ok(current) = tokio::fs::read_to_string(path).await
    && current == content
  {
    tracing::info!(path = %path.display(), "service file is up to date");
    return Ok(());
  }

  if let Some(parent) = path.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }
  tracing::info!(path = %path.display(), "writing service file");
  tokio::fs::write(path, content).await?;
  Ok(())
}

async fn run_checked(command: &mut Command) -> Result<()> {
  let rendered = format!("{:?}", command.as_std());
  let status = command.status().await?;
  if !status.success() {
    return Err(Error::CommandFailed { command: rendered, status });
  }
  Ok(())
}
