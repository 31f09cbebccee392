use std::process::Stdio;

use tracing::{debug, warn};

use crate::{Error, Result};

/// Opens URLs in the user's browser.
pub trait Launcher: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Uses the platform opener (`open`, `xdg-open`, or `start`). Does not wait
/// for the browser; the opener process is reaped on a background task.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    program: String,
    args: Vec<String>,
}

impl SystemLauncher {
    pub fn new() -> Self {
        if cfg!(target_os = "macos") {
            Self::with_command("open", Vec::new())
        } else if cfg!(target_os = "windows") {
            Self::with_command("cmd", vec!["/C".into(), "start".into(), String::new()])
        } else {
            Self::with_command("xdg-open", Vec::new())
        }
    }

    /// Run `program args... <url>` instead of the platform opener.
    pub fn with_command(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher for SystemLauncher {
    /// Must be called from within a tokio runtime.
    fn open(&self, url: &str) -> Result<()> {
        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Launch(format!("cannot open {url}: {e}")))?;

        let program = self.program.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => debug!(%program, "opener exited"),
                Ok(status) => warn!(%program, %status, "opener exited with failure"),
                Err(e) => warn!(%program, error = %e, "failed to wait for opener"),
            }
        });
        Ok(())
    }
}
