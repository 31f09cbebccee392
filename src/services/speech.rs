use async_trait::async_trait;
use tracing::debug;

use crate::config::SpeechConfig;
use crate::{Error, Result};

/// Speech synthesis collaborator. `speak` resolves once playback has finished.
#[async_trait]
pub trait Speaker: Send + Sync {
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Drives an OS text-to-speech program (`say` on macOS, `espeak` elsewhere).
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    command: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self { command: command.into(), args }
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(&config.command, config.args.clone())
    }
}

#[async_trait]
impl Speaker for CommandSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        debug!(command = %self.command, "spawning speech");
        let status = tokio::process::Command::new(&self.command)
            .args(&self.args)
            .arg(text)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| Error::Speech(format!("failed to spawn '{}': {e}", self.command)))?;

        if !status.success() {
            return Err(Error::Speech(format!("'{}' exited with {status}", self.command)));
        }
        Ok(())
    }
}

/// Speech switched off in config. Every call fails so the sink renders the
/// transcript fallback instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutedSpeaker;

#[async_trait]
impl Speaker for MutedSpeaker {
    async fn speak(&self, _text: &str) -> Result<()> {
        Err(Error::Speech("speech disabled".to_string()))
    }
}
