//! Configuration settings for Docent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub gateway: GatewaySettings,
    pub speech: SpeechSettings,
    pub translation: TranslationSettings,
    pub classification: ClassificationSettings,
    pub web: WebSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data (exported transcripts).
    pub data_dir: String,
    /// Directory for temporary audio/video files.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.docent".to_string(),
            temp_dir: "/tmp/docent".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Default language model request timeout, in seconds.
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 300;

/// Local language model endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Model identifier passed with every request.
    pub model: String,
    /// Request timeout in seconds. 0 disables the timeout.
    pub timeout_seconds: u64,
    /// Total attempts per request (1 = no retry).
    pub max_attempts: u32,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            timeout_seconds: DEFAULT_GATEWAY_TIMEOUT_SECS,
            max_attempts: 1,
        }
    }
}

/// Speech recognition, synthesis and playback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Model used for speech recognition.
    pub transcription_model: String,
    /// Model used for speech synthesis.
    pub tts_model: String,
    /// Voice used for speech synthesis.
    pub voice: String,
    /// Seconds to wait for speech to start when listening on the microphone.
    pub listen_timeout_seconds: u32,
    /// Maximum length of a spoken phrase in seconds.
    pub phrase_limit_seconds: u32,
    /// Microphone input device (platform specific, "default" picks the system default).
    pub input_device: String,
    /// Audio player used for playback.
    pub player: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            transcription_model: "whisper-1".to_string(),
            tts_model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            listen_timeout_seconds: 5,
            phrase_limit_seconds: 15,
            input_device: "default".to_string(),
            player: "ffplay".to_string(),
        }
    }
}

/// Translation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    /// Translation endpoint.
    pub endpoint: String,
    /// Maximum characters sent per request; longer text is split.
    pub max_chunk_chars: usize,
    /// Maximum concurrent requests when translating split text.
    pub max_concurrent: usize,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            max_chunk_chars: 5000,
            max_concurrent: 2,
            timeout_seconds: 30,
        }
    }
}

/// Sentiment and emotion classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationSettings {
    /// Base URL of the inference API; the model id is appended.
    pub endpoint: String,
    /// Sentiment model id.
    pub sentiment_model: String,
    /// Emotion model id.
    pub emotion_model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            sentiment_model: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            emotion_model: "j-hartmann/emotion-english-distilroberta-base".to_string(),
            timeout_seconds: 60,
        }
    }
}

/// Web page fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSettings {
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// User agent sent with page requests.
    pub user_agent: String,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: concat!("docent/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Largest accepted `/extract` request body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: 512 * 1024 * 1024,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::DocentError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docent")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}
