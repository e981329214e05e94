//! Text-to-speech synthesis and playback.

use super::{split_for_limit, Warned};
use crate::config::SpeechSettings;
use crate::error::{DocentError, Result};
use crate::http::create_openai_client;
use crate::media::{run_tool, AudioArtifact, AudioFormat};
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, SpeechResponseFormat, Voice};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Longest input the speech endpoint accepts per request.
const MAX_SPEECH_CHARS: usize = 4096;

/// A text-to-speech service producing MP3 audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// OpenAI speech endpoint.
pub struct OpenAiSynthesizer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    voice: String,
}

impl OpenAiSynthesizer {
    pub fn new(settings: &SpeechSettings) -> Result<Self> {
        Ok(Self {
            client: create_openai_client()?,
            model: settings.tts_model.clone(),
            voice: settings.voice.clone(),
        })
    }

    fn voice(&self) -> Voice {
        match self.voice.to_lowercase().as_str() {
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            _ => Voice::Alloy,
        }
    }

    fn model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSynthesizer {
    /// Long text is synthesized piecewise; MP3 frames concatenate cleanly.
    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let mut audio = Vec::new();

        for piece in split_for_limit(text, MAX_SPEECH_CHARS) {
            if piece.text.trim().is_empty() {
                continue;
            }
            let request = CreateSpeechRequestArgs::default()
                .input(piece.text)
                .model(self.model())
                .voice(self.voice())
                .response_format(SpeechResponseFormat::Mp3)
                .build()
                .map_err(|e| DocentError::Speech(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .audio()
                .speech(request)
                .await
                .map_err(|e| DocentError::OpenAI(format!("Speech API error: {}", e)))?;

            audio.extend_from_slice(&response.bytes);
        }

        debug!("Synthesized {} bytes of audio", audio.len());
        Ok(audio)
    }
}

/// Returned by [`SpeechService::speak`]. Playback runs detached; there is no
/// way to cancel it or observe its outcome.
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    started_at: DateTime<Local>,
    chars: usize,
}

impl PlaybackHandle {
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Length of the text being spoken.
    pub fn chars(&self) -> usize {
        self.chars
    }
}

/// Synthesizes speech to files and plays it back.
#[derive(Clone)]
pub struct SpeechService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    temp_dir: PathBuf,
    player: String,
}

impl SpeechService {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, settings: &SpeechSettings, temp_dir: PathBuf) -> Self {
        Self {
            synthesizer,
            temp_dir,
            player: settings.player.clone(),
        }
    }

    /// Synthesize text into a new MP3 file owned by the caller.
    ///
    /// Empty text yields `None` without contacting the service. A failure
    /// yields `None` and a warning.
    pub async fn synthesize_speech(&self, text: &str) -> Warned<Option<AudioArtifact>> {
        if text.trim().is_empty() {
            return Warned::ok(None);
        }

        match self.synthesize_to_file(text).await {
            Ok(artifact) => Warned::ok(Some(artifact)),
            Err(e) => {
                warn!("Speech synthesis failed: {}", e);
                Warned::warn(None, format!("Text-to-speech error: {}", e))
            }
        }
    }

    async fn synthesize_to_file(&self, text: &str) -> Result<AudioArtifact> {
        let audio = self.synthesizer.synthesize(text).await?;

        std::fs::create_dir_all(&self.temp_dir)?;
        let mut file = tempfile::Builder::new()
            .prefix("docent-speech-")
            .suffix(".mp3")
            .tempfile_in(&self.temp_dir)?;
        file.write_all(&audio)?;

        let (_, path) = file.keep().map_err(|e| DocentError::Io(e.error))?;
        info!("Wrote speech to {}", path.display());
        Ok(AudioArtifact::new(path, AudioFormat::Mp3))
    }

    /// Synthesize and play text, waiting for playback to finish.
    pub async fn play(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let artifact = self.synthesize_to_file(text).await?;
        let played = play_file(&self.player, &artifact.path).await;
        let removed = artifact.remove();
        played.and(removed)
    }

    /// Synthesize and play text on a detached task.
    ///
    /// The caller gets control back immediately. Errors are logged and the
    /// temp file is removed once playback ends.
    pub fn speak(&self, text: &str) -> PlaybackHandle {
        let handle = PlaybackHandle {
            started_at: Local::now(),
            chars: text.chars().count(),
        };

        let service = self.clone();
        let text = text.to_string();
        tokio::spawn(async move {
            if let Err(e) = service.play(&text).await {
                warn!("Playback failed: {}", e);
            }
        });

        handle
    }
}

/// Play an audio file with the configured player.
async fn play_file(player: &str, path: &Path) -> Result<()> {
    let mut args: Vec<&OsStr> = Vec::new();
    if player == "ffplay" {
        args.extend(["-nodisp", "-autoexit", "-loglevel", "quiet"].map(OsStr::new));
    }
    args.push(path.as_os_str());

    let output = run_tool(player, &args).await?;
    if output.status.success() {
        Ok(())
    } else {
        Err(DocentError::ToolFailed(format!(
            "{} exited with {}",
            player, output.status
        )))
    }
}
