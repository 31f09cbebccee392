//! Speech-to-text collaborators.
//!
//! A transcriber returns whatever it heard within `duration`. An empty string
//! or a lone "." means silence; the main loop skips the cycle for either.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::Result;

#[async_trait]
pub trait Transcriber: Send {
    async fn transcribe(&mut self, duration: Duration) -> Result<String>;
}

/// True for the transcriber outputs that mean "nothing was said".
pub fn is_silence(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text == "."
}

/// Reads typed lines from stdin in place of a microphone.
pub struct ConsoleTranscriber {
    lines: Lines<BufReader<Stdin>>,
    closed: bool,
}

impl ConsoleTranscriber {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            closed: false,
        }
    }
}

impl Default for ConsoleTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcriber for ConsoleTranscriber {
    async fn transcribe(&mut self, duration: Duration) -> Result<String> {
        // stdin closed: behave like a quiet room instead of spinning.
        if self.closed {
            tokio::time::sleep(duration).await;
            return Ok(String::new());
        }

        // `next_line` is cancel safe, so a timeout loses no input.
        match tokio::time::timeout(duration, self.lines.next_line()).await {
            Ok(Ok(Some(line))) => Ok(line.trim().to_string()),
            Ok(Ok(None)) => {
                tracing::info!("stdin closed, no more console input");
                self.closed = true;
                Ok(String::new())
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Ok(String::new()),
        }
    }
}

#[cfg(feature = "microphone")]
pub use whisper::WhisperTranscriber;

#[cfg(feature = "microphone")]
mod whisper {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde::Deserialize;

    use super::Transcriber;
    use crate::audio::capture;
    use crate::{Error, Result};

    #[derive(Deserialize)]
    struct WhisperResponse {
        text: String,
    }

    /// Records from the default microphone and posts the clip to a
    /// Whisper-compatible `/audio/transcriptions` endpoint.
    pub struct WhisperTranscriber {
        client: reqwest::Client,
        url: String,
        model: String,
    }

    impl WhisperTranscriber {
        pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
            Self {
                client: reqwest::Client::new(),
                url: url.into(),
                model: model.into(),
            }
        }
    }

    #[async_trait]
    impl Transcriber for WhisperTranscriber {
        async fn transcribe(&mut self, duration: Duration) -> Result<String> {
            let clip = tokio::task::spawn_blocking(move || capture::record(duration))
                .await
                .map_err(|e| Error::Audio(format!("capture task failed: {e}")))??;
            let wav = clip.to_wav()?;
            tracing::debug!(wav_bytes = wav.len(), "clip captured");

            let part = reqwest::multipart::Part::bytes(wav)
                .file_name("audio.wav")
                .mime_str("audio/wav")
                .map_err(|e| Error::Transcription(e.to_string()))?;
            let form = reqwest::multipart::Form::new()
                .part("file", part)
                .text("model", self.model.clone());

            let response = self.client.post(&self.url).multipart(form).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Transcription(format!("whisper returned {status}: {body}")));
            }

            let result: WhisperResponse = response.json().await?;
            Ok(result.text.trim().to_string())
        }
    }
}
