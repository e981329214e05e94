//! Sentiment and emotion classification through the Hugging Face inference API.

use super::Warned;
use crate::config::ClassificationSettings;
use crate::error::{DocentError, Result};
use crate::http::create_client;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, instrument, warn};

/// Environment variable holding the inference API token.
pub const HF_TOKEN_ENV: &str = "HF_API_TOKEN";

/// Top sentiment label and its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: String,
    pub score: f32,
}

/// The closed set of emotions scored by [`Classifier::emotions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Anger,
    Disgust,
    Fear,
    Joy,
    Neutral,
    Sadness,
    Surprise,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Anger,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Joy,
        Emotion::Neutral,
        Emotion::Sadness,
        Emotion::Surprise,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Joy => "joy",
            Emotion::Neutral => "neutral",
            Emotion::Sadness => "sadness",
            Emotion::Surprise => "surprise",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A score for every [`Emotion`]. Labels the model did not return score 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScores(BTreeMap<Emotion, f32>);

impl Default for EmotionScores {
    fn default() -> Self {
        Self(Emotion::ALL.into_iter().map(|e| (e, 0.0)).collect())
    }
}

impl EmotionScores {
    pub fn get(&self, emotion: Emotion) -> f32 {
        self.0.get(&emotion).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f32)> + '_ {
        self.0.iter().map(|(e, s)| (*e, *s))
    }

    /// Highest-scoring emotion, or `None` when every score is zero.
    pub fn dominant(&self) -> Option<Emotion> {
        self.iter()
            .filter(|(_, s)| *s > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(e, _)| e)
    }

    fn from_labels(labels: &[LabelScore]) -> Self {
        let mut scores = Self::default();
        for item in labels {
            if let Some(emotion) = Emotion::from_label(&item.label) {
                scores.0.insert(emotion, item.score);
            }
        }
        scores
    }
}

/// A text classification service.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn sentiment(&self, text: &str) -> Result<Sentiment>;
    async fn emotions(&self, text: &str) -> Result<EmotionScores>;
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

/// Single inputs come back nested one level deeper on some deployments.
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationResponse {
    fn into_labels(self) -> Vec<LabelScore> {
        match self {
            ClassificationResponse::Nested(mut outer) => {
                if outer.is_empty() {
                    Vec::new()
                } else {
                    outer.swap_remove(0)
                }
            }
            ClassificationResponse::Flat(labels) => labels,
        }
    }
}

/// Hugging Face hosted text-classification models.
pub struct HuggingFaceClassifier {
    client: reqwest::Client,
    endpoint: String,
    sentiment_model: String,
    emotion_model: String,
    token: Option<String>,
}

impl HuggingFaceClassifier {
    /// Create a classifier. The token is read from `HF_API_TOKEN` if set.
    pub fn new(settings: &ClassificationSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings.timeout_seconds)?,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            sentiment_model: settings.sentiment_model.clone(),
            emotion_model: settings.emotion_model.clone(),
            token: std::env::var(HF_TOKEN_ENV).ok().filter(|t| !t.is_empty()),
        })
    }

    #[instrument(skip(self, text), fields(model = %model))]
    async fn classify(&self, model: &str, text: &str, top_k: Option<usize>) -> Result<Vec<LabelScore>> {
        let url = format!("{}/{}", self.endpoint, model);
        let mut body = serde_json::json!({ "inputs": text });
        if let Some(k) = top_k {
            body["parameters"] = serde_json::json!({ "top_k": k });
        }

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DocentError::Classification(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DocentError::Classification(format!(
                "HTTP {} {}",
                status,
                detail.trim()
            )));
        }

        let parsed: ClassificationResponse = response
            .json()
            .await
            .map_err(|e| DocentError::Classification(format!("Malformed response: {}", e)))?;

        let labels = parsed.into_labels();
        debug!("Model returned {} labels", labels.len());
        Ok(labels)
    }
}

#[async_trait]
impl Classifier for HuggingFaceClassifier {
    async fn sentiment(&self, text: &str) -> Result<Sentiment> {
        let labels = self.classify(&self.sentiment_model, text, None).await?;
        labels
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .map(|top| Sentiment {
                label: top.label,
                score: top.score,
            })
            .ok_or_else(|| DocentError::Classification("No sentiment label returned".into()))
    }

    async fn emotions(&self, text: &str) -> Result<EmotionScores> {
        let labels = self
            .classify(&self.emotion_model, text, Some(Emotion::ALL.len()))
            .await?;
        Ok(EmotionScores::from_labels(&labels))
    }
}

/// Classify overall sentiment. Empty text or a failure yields `None`.
pub async fn classify_sentiment(classifier: &dyn Classifier, text: &str) -> Warned<Option<Sentiment>> {
    if text.trim().is_empty() {
        return Warned::ok(None);
    }
    match classifier.sentiment(text).await {
        Ok(sentiment) => Warned::ok(Some(sentiment)),
        Err(e) => {
            warn!("Sentiment analysis failed: {}", e);
            Warned::warn(None, format!("Sentiment analysis error: {}", e))
        }
    }
}

/// Score every emotion. Empty text or a failure yields all-zero scores.
pub async fn classify_emotion(classifier: &dyn Classifier, text: &str) -> Warned<EmotionScores> {
    if text.trim().is_empty() {
        return Warned::ok(EmotionScores::default());
    }
    match classifier.emotions(text).await {
        Ok(scores) => Warned::ok(scores),
        Err(e) => {
            warn!("Emotion analysis failed: {}", e);
            Warned::warn(EmotionScores::default(), format!("Emotion analysis error: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path as UrlPath, http::StatusCode, routing::post, Json, Router};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/models", addr)
    }

    fn classifier(endpoint: &str) -> HuggingFaceClassifier {
        HuggingFaceClassifier::new(&ClassificationSettings {
            endpoint: endpoint.to_string(),
            sentiment_model: "sst2".to_string(),
            emotion_model: "emo".to_string(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    async fn stub() -> String {
        let app = Router::new().route(
            "/models/{model}",
            post(|UrlPath(model): UrlPath<String>, Json(body): Json<serde_json::Value>| async move {
                assert!(body["inputs"].is_string());
                if model == "sst2" {
                    Json(serde_json::json!([[
                        { "label": "NEGATIVE", "score": 0.1 },
                        { "label": "POSITIVE", "score": 0.9 }
                    ]]))
                } else {
                    assert_eq!(body["parameters"]["top_k"], 7);
                    Json(serde_json::json!([
                        { "label": "joy", "score": 0.7 },
                        { "label": "surprise", "score": 0.2 },
                        { "label": "confusion", "score": 0.1 }
                    ]))
                }
            }),
        );
        serve(app).await
    }

    #[tokio::test]
    async fn test_sentiment_picks_top_label() {
        let hf = classifier(&stub().await);
        let out = classify_sentiment(&hf, "What a lovely day").await;
        assert_eq!(
            out.value,
            Some(Sentiment {
                label: "POSITIVE".into(),
                score: 0.9
            })
        );
    }

    #[tokio::test]
    async fn test_emotions_cover_closed_set() {
        let hf = classifier(&stub().await);
        let out = classify_emotion(&hf, "Wow!").await;
        let scores = out.value;

        assert_eq!(scores.iter().count(), 7);
        assert_eq!(scores.get(Emotion::Joy), 0.7);
        assert_eq!(scores.get(Emotion::Anger), 0.0);
        assert_eq!(scores.dominant(), Some(Emotion::Joy));
    }

    #[tokio::test]
    async fn test_service_error_is_warning() {
        let app = Router::new().route(
            "/models/{model}",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "Model is currently loading") }),
        );
        let hf = classifier(&serve(app).await);

        let out = classify_sentiment(&hf, "text").await;
        assert!(out.value.is_none());
        assert!(out.warning.unwrap().contains("503"));

        let emo = classify_emotion(&hf, "text").await;
        assert_eq!(emo.value, EmotionScores::default());
        assert!(emo.warning.is_some());
    }

    #[tokio::test]
    async fn test_empty_text_skips_service() {
        let hf = classifier("http://127.0.0.1:9/models");
        let out = classify_sentiment(&hf, "").await;
        assert_eq!(out, Warned::ok(None));
    }
}
