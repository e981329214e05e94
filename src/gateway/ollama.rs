//! Ollama `/api/generate` client.

use super::LanguageModel;
use crate::config::GatewaySettings;
use crate::error::{DocentError, Result};
use crate::http::create_client;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Local Ollama model.
pub struct OllamaModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_attempts: u32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaModel {
    /// Create a client from gateway settings.
    pub fn new(settings: &GatewaySettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings.timeout_seconds)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            max_attempts: settings.max_attempts.max(1),
        })
    }

    /// Check whether the Ollama server is reachable.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn generate_once(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocentError::Gateway(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocentError::Gateway(format!(
                "Generation failed: HTTP {} {}",
                status,
                body.trim()
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DocentError::Gateway(format!("Malformed generate response: {}", e)))?;

        Ok(parsed.response)
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut attempt = 1;
        loop {
            match self.generate_once(prompt).await {
                Ok(reply) => {
                    debug!("Generated {} chars", reply.len());
                    return Ok(reply);
                }
                Err(e) if attempt < self.max_attempts => {
                    let delay = Duration::from_secs(2u64.pow(attempt - 1));
                    warn!(
                        "Generation failed (attempt {}/{}), retrying in {:?}: {}",
                        attempt, self.max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn settings(base_url: &str, max_attempts: u32) -> GatewaySettings {
        GatewaySettings {
            base_url: base_url.to_string(),
            model: "llama3.2:3b".to_string(),
            timeout_seconds: 5,
            max_attempts,
        }
    }

    #[tokio::test]
    async fn test_generate_sends_model_and_prompt() {
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["model"], "llama3.2:3b");
                assert_eq!(body["stream"], false);
                let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
                Json(serde_json::json!({ "response": format!("echo: {}", prompt), "done": true }))
            }),
        );
        let base = serve(app).await;
        let model = OllamaModel::new(&settings(&base, 1)).unwrap();

        let reply = model.generate("User: hi\nBot:").await.unwrap();
        assert_eq!(reply, "echo: User: hi\nBot:");
    }

    #[tokio::test]
    async fn test_single_attempt_by_default() {
        let calls = Arc::new(AtomicU32::new(0));
        let app = Router::new()
            .route(
                "/api/generate",
                post(|State(calls): State<Arc<AtomicU32>>| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded")
                }),
            )
            .with_state(calls.clone());
        let base = serve(app).await;
        let model = OllamaModel::new(&settings(&base, 1)).unwrap();

        let err = model.generate("hi").await.unwrap_err();
        assert!(matches!(err, DocentError::Gateway(_)));
        assert!(err.to_string().contains("500"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_when_configured() {
        let calls = Arc::new(AtomicU32::new(0));
        let app = Router::new()
            .route(
                "/api/generate",
                post(|State(calls): State<Arc<AtomicU32>>| async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err((StatusCode::SERVICE_UNAVAILABLE, "warming up"))
                    } else {
                        Ok(Json(serde_json::json!({ "response": "ready" })))
                    }
                }),
            )
            .with_state(calls.clone());
        let base = serve(app).await;
        let model = OllamaModel::new(&settings(&base, 2)).unwrap();

        assert_eq!(model.generate("hi").await.unwrap(), "ready");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_timeout_is_finite() {
        assert!(GatewaySettings::default().timeout_seconds > 0);
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        // Accepts connections and never writes a response.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mut config = settings(&format!("http://{}", addr), 1);
        config.timeout_seconds = 1;
        let model = OllamaModel::new(&config).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(10), model.generate("hi"))
            .await
            .expect("gateway call should not hang");
        assert!(matches!(result, Err(DocentError::Gateway(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let model = OllamaModel::new(&settings("http://127.0.0.1:9", 1)).unwrap();
        assert!(model.generate("hi").await.is_err());
        assert!(!model.health_check().await);
    }
}
