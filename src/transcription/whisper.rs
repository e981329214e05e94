//! OpenAI Whisper speech recognition.

use super::{SpeechRecognizer, Transcription, TranscriptionFailure};
use crate::config::SpeechSettings;
use crate::error::Result;
use crate::http::create_openai_client;
use async_openai::error::OpenAIError;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Whisper-backed recognizer.
pub struct WhisperRecognizer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl WhisperRecognizer {
    pub fn new(settings: &SpeechSettings) -> Result<Self> {
        Ok(Self {
            client: create_openai_client()?,
            model: settings.transcription_model.clone(),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn recognize(&self, audio_path: &Path) -> Transcription {
        let file_bytes = tokio::fs::read(audio_path)
            .await
            .map_err(|e| TranscriptionFailure::InvalidAudio(e.to_string()))?;

        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(file_name, file_bytes))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json)
            .build()
            .map_err(|e| TranscriptionFailure::InvalidAudio(e.to_string()))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(classify_error)?;

        let text = response.text.trim().to_string();
        debug!("Recognized {} chars", text.len());

        if text.is_empty() {
            Err(TranscriptionFailure::Unintelligible)
        } else {
            Ok(text)
        }
    }
}

/// Rejected input is the caller's problem; everything else is the service's.
fn classify_error(err: OpenAIError) -> TranscriptionFailure {
    warn!("Whisper request failed: {}", err);
    match err {
        OpenAIError::ApiError(api) if api.r#type.as_deref() == Some("invalid_request_error") => {
            TranscriptionFailure::InvalidAudio(api.message)
        }
        other => TranscriptionFailure::ServiceUnavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;

    fn api_error(kind: &str) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: "Invalid file format.".into(),
            r#type: Some(kind.into()),
            param: None,
            code: None,
        })
    }

    #[test]
    fn test_invalid_request_is_invalid_audio() {
        assert_eq!(
            classify_error(api_error("invalid_request_error")),
            TranscriptionFailure::InvalidAudio("Invalid file format.".into())
        );
    }

    #[test]
    fn test_other_errors_are_service_unavailable() {
        assert!(matches!(
            classify_error(api_error("server_error")),
            TranscriptionFailure::ServiceUnavailable(_)
        ));
        assert!(matches!(
            classify_error(OpenAIError::InvalidArgument("bad".into())),
            TranscriptionFailure::ServiceUnavailable(_)
        ));
    }
}
