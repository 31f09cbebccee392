use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Speech-to-text error
    #[error("transcription error: {0}")]
    Transcription(String),

    /// Speech synthesis error
    #[error("speech error: {0}")]
    Speech(String),

    /// Device control error
    #[error("device error: {0}")]
    Device(String),

    /// Reasoning service returned something we cannot use
    #[error("reasoning service error: {0}")]
    Reasoning(String),

    /// Browser / URL launch error
    #[error("launch error: {0}")]
    Launch(String),

    /// Audio capture error
    #[error("audio error: {0}")]
    Audio(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
