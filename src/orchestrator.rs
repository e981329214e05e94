//! Wires the readers, media tools and remote services together.
//!
//! CLI commands and HTTP handlers go through an [`Orchestrator`] built from
//! [`Settings`], so every surface shares the same collaborators.

use crate::config::{Prompts, Settings};
use crate::error::{DocentError, Result};
use crate::gateway::{ConversationGateway, LanguageModel, OllamaModel};
use crate::media::{extract_audio, AudioArtifact, Microphone, Recording};
use crate::source::{read_artifact, Artifact, ArtifactKind, Extraction, WebReader};
use crate::transcription::{
    transcribe_bytes, SpeechRecognizer, Transcription, TranscriptionFailure, WhisperRecognizer,
};
use crate::transforms::{
    classify_emotion, classify_sentiment, natural_language_to_sql, Classifier, EmotionScores,
    GoogleTranslator, HuggingFaceClassifier, Language, OpenAiSynthesizer, PlaybackHandle,
    Sentiment, SpeechService, SpeechSynthesizer, TranslationService, Translator, Warned,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// External services the orchestrator talks to.
pub struct Components {
    pub model: Arc<dyn LanguageModel>,
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub translator: Arc<dyn Translator>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub classifier: Arc<dyn Classifier>,
}

impl Components {
    /// Build the default remote clients from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            model: Arc::new(OllamaModel::new(&settings.gateway)?),
            recognizer: Arc::new(WhisperRecognizer::new(&settings.speech)?),
            translator: Arc::new(GoogleTranslator::new(&settings.translation)?),
            synthesizer: Arc::new(OpenAiSynthesizer::new(&settings.speech)?),
            classifier: Arc::new(HuggingFaceClassifier::new(&settings.classification)?),
        })
    }
}

/// The main entry point for every docent operation.
pub struct Orchestrator {
    settings: Settings,
    gateway: ConversationGateway,
    web: WebReader,
    recognizer: Arc<dyn SpeechRecognizer>,
    translation: TranslationService,
    speech: SpeechService,
    classifier: Arc<dyn Classifier>,
    microphone: Microphone,
    temp_dir: PathBuf,
}

impl Orchestrator {
    /// Create an orchestrator with the default remote clients.
    pub fn new(settings: Settings) -> Result<Self> {
        let components = Components::from_settings(&settings)?;
        Self::with_components(settings, components)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(settings: Settings, components: Components) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        info!(
            "Using model {} at {}",
            components.model.model_name(),
            settings.gateway.base_url
        );

        Ok(Self {
            gateway: ConversationGateway::new(components.model).with_prompts(prompts),
            web: WebReader::new(&settings.web)?,
            recognizer: components.recognizer,
            translation: TranslationService::new(components.translator, &settings.translation),
            speech: SpeechService::new(components.synthesizer, &settings.speech, temp_dir.clone()),
            classifier: components.classifier,
            microphone: Microphone::new(&settings.speech, temp_dir.clone()),
            temp_dir,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn gateway(&self) -> &ConversationGateway {
        &self.gateway
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Turn every artifact into text, in order.
    ///
    /// Documents are read directly; audio is transcribed and video has its
    /// audio track extracted and transcribed. Each failure adds one warning
    /// naming the file and the batch continues.
    #[instrument(skip_all, fields(count = artifacts.len()))]
    pub async fn ingest(&self, artifacts: &[Artifact]) -> Extraction {
        let mut extraction = Extraction::default();

        for artifact in artifacts {
            let part = if artifact.kind.is_document() {
                match read_artifact(artifact) {
                    Ok(text) => Extraction::text(text),
                    Err(DocentError::Extraction { reason, .. }) => {
                        Extraction::failed(&artifact.name, reason)
                    }
                    Err(e) => Extraction::failed(&artifact.name, e),
                }
            } else {
                match self.transcribe(artifact).await {
                    Ok(Ok(text)) => Extraction::text(text),
                    Ok(Err(failure)) => Extraction::failed(&artifact.name, failure),
                    Err(e) => Extraction::failed(&artifact.name, e),
                }
            };

            let failed = !part.warnings.is_empty();
            if failed {
                warn!("Skipping {}", artifact.name);
            } else {
                debug!("Read {} chars from {}", part.text.len(), artifact.name);
            }
            extraction.merge(part);
            if !failed {
                extraction.text.push('\n');
            }
        }

        extraction
    }

    /// Transcribe an audio or video artifact.
    ///
    /// The outer error covers local media problems such as a video without an
    /// audio track; the inner result is the recognition outcome.
    #[instrument(skip_all, fields(name = %artifact.name))]
    pub async fn transcribe(&self, artifact: &Artifact) -> Result<Transcription> {
        match artifact.kind {
            ArtifactKind::Audio => Ok(transcribe_bytes(
                self.recognizer.as_ref(),
                &artifact.name,
                &artifact.bytes,
                &self.temp_dir,
            )
            .await),
            ArtifactKind::Video => {
                let audio = extract_audio(artifact, &self.temp_dir).await?;
                let outcome = self.recognizer.recognize(&audio.path).await;
                if let Err(e) = audio.remove() {
                    warn!("Failed to clean up extracted audio: {}", e);
                }
                Ok(outcome)
            }
            _ => Err(DocentError::InvalidInput(format!(
                "{} is not an audio or video file",
                artifact.name
            ))),
        }
    }

    /// Extract the audio track of a video into a caller-owned file.
    pub async fn extract_audio(&self, video: &Artifact) -> Result<AudioArtifact> {
        extract_audio(video, &self.temp_dir).await
    }

    /// Capture one phrase from the microphone and recognize it.
    pub async fn listen(&self) -> Result<Transcription> {
        match self.microphone.record().await? {
            Recording::NoSpeech => Ok(Err(TranscriptionFailure::ListenTimeout)),
            Recording::Captured(file) => Ok(self.recognizer.recognize(file.path()).await),
        }
    }

    pub async fn fetch_page(&self, url: &str) -> Extraction {
        self.web.fetch_page(url).await
    }

    pub async fn translate(&self, text: &str, target: Language) -> Warned<String> {
        self.translation.translate(text, target).await
    }

    pub async fn synthesize_speech(&self, text: &str) -> Warned<Option<AudioArtifact>> {
        self.speech.synthesize_speech(text).await
    }

    /// Speak text in the background.
    pub fn speak(&self, text: &str) -> PlaybackHandle {
        self.speech.speak(text)
    }

    /// Speak text and wait until playback ends.
    pub async fn play(&self, text: &str) -> Result<()> {
        self.speech.play(text).await
    }

    pub async fn sentiment(&self, text: &str) -> Warned<Option<Sentiment>> {
        classify_sentiment(self.classifier.as_ref(), text).await
    }

    pub async fn emotions(&self, text: &str) -> Warned<EmotionScores> {
        classify_emotion(self.classifier.as_ref(), text).await
    }

    pub async fn to_sql(&self, query: &str) -> Warned<String> {
        natural_language_to_sql(&self.gateway, query).await
    }

    /// Read a PDF aloud into an MP3 file.
    pub async fn podcast(&self, pdf: &Artifact) -> Warned<Option<AudioArtifact>> {
        if pdf.kind != ArtifactKind::Pdf {
            return Warned::warn(None, format!("{} is not a PDF", pdf.name));
        }

        let extraction = self.ingest(std::slice::from_ref(pdf)).await;
        if let Some(w) = extraction.warnings.first() {
            return Warned::warn(None, w.to_string());
        }
        if extraction.text.trim().is_empty() {
            return Warned::warn(None, "No text found in the PDF.");
        }

        self.synthesize_speech(&extraction.text).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::gateway::testing::RecordingModel;
    use crate::transcription::testing::ScriptedRecognizer;
    use async_trait::async_trait;

    pub struct NoopClassifier;

    #[async_trait]
    impl Classifier for NoopClassifier {
        async fn sentiment(&self, _text: &str) -> Result<Sentiment> {
            Ok(Sentiment {
                label: "NEUTRAL".into(),
                score: 1.0,
            })
        }

        async fn emotions(&self, _text: &str) -> Result<EmotionScores> {
            Ok(EmotionScores::default())
        }
    }

    pub struct EchoSynthesizer;

    #[async_trait]
    impl SpeechSynthesizer for EchoSynthesizer {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
            Ok(text.as_bytes().to_vec())
        }
    }

    /// Orchestrator over fakes, with the model replying `SELECT 1;`.
    pub fn orchestrator(dir: &Path, recognizer: Transcription) -> Orchestrator {
        let mut settings = Settings::default();
        settings.general.temp_dir = dir.to_string_lossy().to_string();
        let components = Components {
            model: RecordingModel::replying("SELECT 1;"),
            recognizer: Arc::new(ScriptedRecognizer::new(recognizer)),
            translator: Arc::new(GoogleTranslator::new(&settings.translation).unwrap()),
            synthesizer: Arc::new(EchoSynthesizer),
            classifier: Arc::new(NoopClassifier),
        };
        Orchestrator::with_components(settings, components).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::orchestrator;
    use super::*;
    use crate::source::fixtures;

    #[tokio::test]
    async fn test_ingest_mixed_batch_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), Ok("spoken words".into()));

        let artifacts = vec![
            Artifact::new("a.pdf", fixtures::pdf(&["First page"])).unwrap(),
            Artifact::new("memo.wav", b"RIFF".to_vec()).unwrap(),
            Artifact::new("broken.pdf", b"%PDF-garbage".to_vec()).unwrap(),
        ];
        let extraction = orch.ingest(&artifacts).await;

        let first = extraction.text.find("First page").unwrap();
        let second = extraction.text.find("spoken words").unwrap();
        assert!(first < second);
        assert_eq!(extraction.warnings.len(), 1);
        assert_eq!(extraction.warnings[0].file_name, "broken.pdf");
    }

    #[tokio::test]
    async fn test_unintelligible_audio_becomes_warning() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), Err(TranscriptionFailure::Unintelligible));

        let artifacts = vec![Artifact::new("memo.wav", b"RIFF".to_vec()).unwrap()];
        let extraction = orch.ingest(&artifacts).await;

        assert_eq!(extraction.text, "");
        assert_eq!(
            extraction.warnings[0].reason,
            TranscriptionFailure::Unintelligible.to_string()
        );
    }

    #[tokio::test]
    async fn test_transcribe_rejects_documents() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), Ok(String::new()));
        let doc = Artifact::new("a.pdf", fixtures::pdf(&["x"])).unwrap();
        assert!(matches!(
            orch.transcribe(&doc).await,
            Err(DocentError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_podcast_writes_audio() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), Ok(String::new()));

        let pdf = Artifact::new("talk.pdf", fixtures::pdf(&["Hello listeners"])).unwrap();
        let out = orch.podcast(&pdf).await;

        let audio = out.value.unwrap();
        let bytes = std::fs::read(&audio.path).unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Hello listeners"));
        audio.remove().unwrap();
    }

    #[tokio::test]
    async fn test_podcast_requires_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), Ok(String::new()));
        let docx = Artifact::new("a.docx", fixtures::docx(&["hi"])).unwrap();
        let out = orch.podcast(&docx).await;
        assert!(out.value.is_none());
        assert!(out.warning.is_some());
    }

    #[tokio::test]
    async fn test_sql_goes_through_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), Ok(String::new()));
        assert_eq!(orch.to_sql("anything").await.value, "SELECT 1;");
    }
}
