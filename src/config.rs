//! Runtime configuration.
//!
//! Every field has a default, so an empty (or absent) TOML file yields a
//! working assistant. A handful of environment variables override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

/// Log file override, kept for compatibility with existing deployments.
pub const ENV_LOG_FILE: &str = "ASSISTANT_LOG";
pub const ENV_OLLAMA_HOST: &str = "HERALD_OLLAMA_HOST";
pub const ENV_MODEL: &str = "HERALD_MODEL";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub memory: MemoryConfig,
    pub log: LogConfig,
    pub reasoning: ReasoningConfig,
    pub listen: ListenConfig,
    pub speech: SpeechConfig,
    pub pacing: PacingConfig,
    pub monitor: MonitorConfig,
    /// Static response table, matched as case-insensitive substrings.
    pub phrases: Vec<PhraseEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub path: PathBuf,
    /// Turns kept on every persist (oldest evicted first).
    pub max_turns: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("conversation.json"),
            max_turns: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub path: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assistant.log"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    /// Base URL of the Ollama server.
    pub host: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Prior turns included as context in each classification prompt.
    pub history_turns: usize,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            host: "http://127.0.0.1:11434".to_string(),
            model: "phi3".to_string(),
            timeout_secs: 20,
            history_turns: 6,
        }
    }
}

impl ReasoningConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriberKind {
    /// Typed input on stdin stands in for the microphone.
    Console,
    /// Microphone capture posted to a Whisper-compatible endpoint.
    Whisper,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub duration_secs: u64,
    pub transcriber: TranscriberKind,
    pub whisper_url: String,
    pub whisper_model: String,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            duration_secs: 4,
            transcriber: TranscriberKind::Console,
            whisper_url: "http://127.0.0.1:8080/v1/audio/transcriptions".to_string(),
            whisper_model: "whisper-1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// Program invoked with the text as its last argument (`say`, `espeak`, ...).
    pub command: String,
    pub args: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "say".to_string(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub base_secs: f64,
    pub per_word_secs: f64,
    pub fallback_secs: f64,
    /// Pause after an iteration failed and was apologized for.
    pub error_pause_secs: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_secs: 1.0,
            per_word_secs: 0.15,
            fallback_secs: 3.0,
            error_pause_secs: 1.0,
        }
    }
}

impl PacingConfig {
    /// No pauses at all. Used by tests and the single-turn surface.
    pub fn immediate() -> Self {
        Self {
            base_secs: 0.0,
            per_word_secs: 0.0,
            fallback_secs: 0.0,
            error_pause_secs: 0.0,
        }
    }

    /// Anti-feedback pause for `text`: base plus a per-word increment.
    /// Falls back to `fallback_secs` if the computed value is not a valid duration.
    pub fn feedback_pause(&self, text: &str) -> Duration {
        let words = text.split_whitespace().count() as f64;
        let secs = self.base_secs + words * self.per_word_secs;
        Duration::try_from_secs_f64(secs).unwrap_or_else(|e| {
            tracing::warn!(error = %e, secs, "invalid feedback pause, using fallback");
            Duration::try_from_secs_f64(self.fallback_secs).unwrap_or(Duration::from_secs(3))
        })
    }

    pub fn error_pause(&self) -> Duration {
        Duration::try_from_secs_f64(self.error_pause_secs).unwrap_or(Duration::from_secs(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// File holding the latest temperature reading. No monitor runs when unset.
    pub sensor_path: Option<PathBuf>,
    pub poll_secs: u64,
    pub threshold: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sensor_path: None,
            poll_secs: 5,
            threshold: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhraseEntry {
    pub phrase: String,
    pub response: String,
}

impl Config {
    /// Load from `path` (if any), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        if config.memory.max_turns == 0 {
            return Err(Error::Config("memory.max_turns must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_LOG_FILE).filter(|v| !v.is_empty()) {
            self.log.path = PathBuf::from(path);
        }
        if let Some(host) = lookup(ENV_OLLAMA_HOST).filter(|v| !v.is_empty()) {
            self.reasoning.host = host;
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.is_empty()) {
            self.reasoning.model = model;
        }
    }
}
