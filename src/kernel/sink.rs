//! The single output path for everything the assistant says.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::PacingConfig;
use crate::memory::{ConversationStore, Turn};
use crate::services::Speaker;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechMode {
    /// Wait for playback, then hold the anti-feedback pause. Main loop.
    Blocking,
    /// Queue playback on a background worker and return at once. Single-turn use.
    Detached,
}

/// Append-only `[timestamp] text` log.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, text: &str) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "[{}] {}", Local::now().format("%Y-%m-%d %H:%M:%S%.6f"), text)?;
        Ok(())
    }
}

pub struct ResponseSink {
    speaker: Arc<dyn Speaker>,
    log: EventLog,
    mode: SpeechMode,
    pacing: PacingConfig,
    // Detached mode: one worker speaks queued lines in order.
    voice_tx: Option<mpsc::UnboundedSender<String>>,
    voice_worker: Option<JoinHandle<()>>,
}

impl ResponseSink {
    pub fn new(speaker: Arc<dyn Speaker>, log: EventLog, mode: SpeechMode, pacing: PacingConfig) -> Self {
        Self {
            speaker,
            log,
            mode,
            pacing,
            voice_tx: None,
            voice_worker: None,
        }
    }

    pub fn mode(&self) -> SpeechMode {
        self.mode
    }

    /// Render, speak, log and (when `memory` is given) remember `text`.
    ///
    /// Returns false without doing anything if `text` is blank. Speech and
    /// logging failures degrade; nothing here fails the caller.
    pub async fn emit(&mut self, text: &str, memory: Option<&mut ConversationStore>) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        println!("Assistant: {text}");

        match self.mode {
            SpeechMode::Blocking => {
                if let Err(e) = self.speaker.speak(text).await {
                    warn!(error = %e, "speech failed");
                    println!("Assistant (TTS fallback): {text}");
                }
            }
            SpeechMode::Detached => self.speak_detached(text),
        }

        if let Err(e) = self.log.append(text) {
            warn!(error = %e, path = %self.log.path().display(), "failed to write event log");
        }

        if self.mode == SpeechMode::Blocking {
            let pause = self.pacing.feedback_pause(text);
            debug!(?pause, "pausing to prevent feedback");
            tokio::time::sleep(pause).await;
        }

        if let Some(memory) = memory {
            memory.append(Turn::assistant(text));
        }
        true
    }

    fn speak_detached(&mut self, text: &str) {
        if self.voice_tx.is_none() {
            let (tx, mut rx) = mpsc::unbounded_channel::<String>();
            let speaker = Arc::clone(&self.speaker);
            self.voice_worker = Some(tokio::spawn(async move {
                while let Some(line) = rx.recv().await {
                    if let Err(e) = speaker.speak(&line).await {
                        warn!(error = %e, "speech failed");
                        println!("Assistant (TTS fallback): {line}");
                    }
                }
            }));
            self.voice_tx = Some(tx);
        }

        let queued = self
            .voice_tx
            .as_ref()
            .is_some_and(|tx| tx.send(text.to_string()).is_ok());
        if !queued {
            println!("Assistant (TTS fallback): {text}");
        }
    }

    /// Wait until every detached line has been spoken. No-op in blocking mode.
    pub async fn wait_idle(&mut self) {
        self.voice_tx = None;
        if let Some(worker) = self.voice_worker.take() {
            if let Err(e) = worker.await {
                warn!(error = %e, "speech worker ended abnormally");
            }
        }
    }
}
