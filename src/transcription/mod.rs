//! Speech recognition.
//!
//! Recognizers turn an audio file into text. Failures are reported as a
//! [`TranscriptionFailure`] so callers can tell an unreachable service from
//! audio that simply contained no intelligible speech.

mod whisper;

pub use whisper::WhisperRecognizer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Why a recognition attempt produced no text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum TranscriptionFailure {
    #[error("Speech recognition service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Could not understand the audio")]
    Unintelligible,

    #[error("No speech detected before the listening timeout")]
    ListenTimeout,

    #[error("Audio could not be read: {0}")]
    InvalidAudio(String),
}

/// Recognized text, or the reason there is none.
pub type Transcription = std::result::Result<String, TranscriptionFailure>;

/// A speech-to-text service.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize the speech in an audio file.
    async fn recognize(&self, audio_path: &Path) -> Transcription;
}

/// Recognize in-memory audio by writing it to a scoped temp file first.
///
/// The temp file keeps the extension of `file_name` so the service can detect
/// the container, and is removed when recognition returns.
pub async fn transcribe_bytes(
    recognizer: &dyn SpeechRecognizer,
    file_name: &str,
    bytes: &[u8],
    temp_dir: &Path,
) -> Transcription {
    let suffix = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_else(|| ".wav".to_string());

    let staged = std::fs::create_dir_all(temp_dir)
        .and_then(|_| {
            tempfile::Builder::new()
                .prefix("docent-speech-")
                .suffix(&suffix)
                .tempfile_in(temp_dir)
        })
        .and_then(|mut file| file.write_all(bytes).map(|_| file));

    let file = staged.map_err(|e| TranscriptionFailure::InvalidAudio(e.to_string()))?;
    recognizer.recognize(file.path()).await
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedRecognizer;
    use super::*;

    #[test]
    fn test_failures_have_distinct_messages() {
        let messages = [
            TranscriptionFailure::ServiceUnavailable("timeout".into()).to_string(),
            TranscriptionFailure::Unintelligible.to_string(),
            TranscriptionFailure::ListenTimeout.to_string(),
        ];
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
        assert_ne!(messages[0], messages[2]);
    }

    #[tokio::test]
    async fn test_transcribe_bytes_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let recognizer = ScriptedRecognizer::new(Ok("hello there".into()));

        let text = transcribe_bytes(&recognizer, "memo.wav", b"RIFF", dir.path()).await;

        assert_eq!(text.unwrap(), "hello there");
        let seen = recognizer.seen.lock().unwrap().clone();
        assert_eq!(seen[0].extension().unwrap(), "wav");
        assert!(!seen[0].exists());
    }

    #[tokio::test]
    async fn test_failure_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let recognizer = ScriptedRecognizer::new(Err(TranscriptionFailure::Unintelligible));
        let outcome = transcribe_bytes(&recognizer, "memo.wav", b"RIFF", dir.path()).await;
        assert_eq!(outcome, Err(TranscriptionFailure::Unintelligible));
    }
}
