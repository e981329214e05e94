//! Translation through the public Google Translate endpoint.

use super::{rejoin, split_for_limit, Warned};
use crate::config::TranslationSettings;
use crate::error::{DocentError, Result};
use crate::http::create_client;
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Supported target languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
    Es,
    Fr,
    De,
    Bn,
    Ta,
    Te,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::En,
        Language::Hi,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::Bn,
        Language::Ta,
        Language::Te,
    ];

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Bn => "bn",
            Language::Ta => "ta",
            Language::Te => "te",
        }
    }

    /// English display name.
    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::De => "German",
            Language::Bn => "Bengali",
            Language::Ta => "Tamil",
            Language::Te => "Telugu",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Language {
    type Err = DocentError;

    /// Accepts a code ("es") or an English name ("Spanish"), case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Language::ALL
            .into_iter()
            .find(|lang| {
                lang.code().eq_ignore_ascii_case(needle) || lang.name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| {
                let supported: Vec<&str> = Language::ALL.iter().map(|l| l.code()).collect();
                DocentError::InvalidInput(format!(
                    "Unsupported language '{}'. Supported: {}",
                    needle,
                    supported.join(", ")
                ))
            })
    }
}

/// A machine translation service.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate one piece of text that is within the service's size limit.
    async fn translate_chunk(&self, text: &str, target: Language) -> Result<String>;
}

/// Client for the `translate_a/single` endpoint with source auto-detection.
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(settings: &TranslationSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings.timeout_seconds)?,
            endpoint: settings.endpoint.clone(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate_chunk(&self, text: &str, target: Language) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| DocentError::Translation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocentError::Translation(format!("HTTP {}", status)));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DocentError::Translation(format!("Malformed response: {}", e)))?;

        parse_segments(&body)
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The payload is a nested array whose first element lists
/// `[translated, original, ...]` segments.
fn parse_segments(body: &serde_json::Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| DocentError::Translation("Response has no segments".into()))?;

    Ok(segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|t| t.as_str()))
        .collect())
}

/// Translates text of any length by splitting it under the service limit.
#[derive(Clone)]
pub struct TranslationService {
    translator: Arc<dyn Translator>,
    max_chunk_chars: usize,
    max_concurrent: usize,
}

impl TranslationService {
    pub fn new(translator: Arc<dyn Translator>, settings: &TranslationSettings) -> Self {
        Self {
            translator,
            max_chunk_chars: settings.max_chunk_chars.max(1),
            max_concurrent: settings.max_concurrent.max(1),
        }
    }

    /// Translate text into `target`.
    ///
    /// Empty or whitespace-only text returns an empty string without calling
    /// the service. Any service failure yields an empty string and a warning.
    #[instrument(skip(self, text), fields(len = text.len(), target = %target))]
    pub async fn translate(&self, text: &str, target: Language) -> Warned<String> {
        if text.trim().is_empty() {
            return Warned::ok(String::new());
        }

        let chunks = split_for_limit(text, self.max_chunk_chars);
        debug!("Translating {} chunk(s)", chunks.len());
        let separators: Vec<&'static str> = chunks.iter().map(|c| c.separator).collect();

        let result: Result<Vec<String>> = stream::iter(chunks)
            .map(|chunk| {
                let translator = Arc::clone(&self.translator);
                async move {
                    if chunk.text.trim().is_empty() {
                        return Ok(chunk.text);
                    }
                    translator.translate_chunk(&chunk.text, target).await
                }
            })
            .buffered(self.max_concurrent)
            .try_collect()
            .await;

        match result {
            Ok(parts) => Warned::ok(rejoin(parts.into_iter().zip(separators))),
            Err(e) => {
                warn!("Translation failed: {}", e);
                Warned::warn(String::new(), format!("Translation error: {}", e))
            }
        }
    }
}
