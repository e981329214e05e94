//! Error types for Docent.

use thiserror::Error;

/// Library-level error type for Docent operations.
#[derive(Error, Debug)]
pub enum DocentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not extract text from {file}: {reason}")]
    Extraction { file: String, reason: String },

    #[error("Language model error: {0}")]
    Gateway(String),

    #[error("Media processing failed: {0}")]
    Media(String),

    #[error("Video has no audio track: {0}")]
    NoAudioTrack(String),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Speech synthesis failed: {0}")]
    Speech(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

impl DocentError {
    /// Build an extraction error for a named file.
    pub fn extraction(file: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Extraction {
            file: file.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for Docent operations.
pub type Result<T> = std::result::Result<T, DocentError>;
