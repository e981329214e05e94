//! HTTP API server for integration with other systems.
//!
//! Every request is stateless: callers pass the context they want the model
//! to see with each chat message.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::DocentError;
use crate::orchestrator::Orchestrator;
use crate::source::{Artifact, Extraction};
use crate::transforms::{EmotionScores, Language, Sentiment, Warned};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, warn};

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let app = router(orchestrator);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Docent API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat", "POST /chat");
    Output::kv("Extract", "POST /extract (multipart)");
    Output::kv("Fetch", "POST /fetch");
    Output::kv("Translate", "POST /translate");
    Output::kv("SQL", "POST /sql");
    Output::kv("Analyze", "POST /analyze");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(orchestrator: Orchestrator) -> Router {
    let max_upload_bytes = orchestrator.settings().server.max_upload_bytes;
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route(
            "/extract",
            post(extract).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/fetch", post(fetch))
        .route("/translate", post(translate))
        .route("/sql", post(sql))
        .route("/analyze", post(analyze))
        .layer(cors)
        .with_state(Arc::new(AppState { orchestrator }))
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    /// Source text the answer should be grounded in
    #[serde(default)]
    context: String,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Deserialize)]
struct FetchRequest {
    url: String,
}

#[derive(Deserialize)]
struct TranslateRequest {
    text: String,
    /// Language code or name
    language: String,
}

#[derive(Deserialize)]
struct SqlRequest {
    query: String,
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    sentiment: Option<Sentiment>,
    emotions: EmotionScores,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(err: &DocentError) -> Response {
    let status = match err {
        DocentError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DocentError::Gateway(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// A broken multipart stream; over-limit bodies keep their 413 status.
fn upload_error(err: MultipartError) -> Response {
    warn!("Upload failed: {}", err);
    (
        err.status(),
        Json(ErrorResponse {
            error: format!("Malformed upload: {}", err),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat(State(state): State<Arc<AppState>>, Json(req): Json<ChatRequest>) -> Response {
    let message = req.message.trim();
    if message.is_empty() {
        return error_response(&DocentError::InvalidInput(
            "Please enter a message.".to_string(),
        ));
    }

    match state
        .orchestrator
        .gateway()
        .converse(message, &req.context)
        .await
    {
        Ok(reply) => Json(ChatResponse { reply }).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn extract(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut artifacts = Vec::new();
    let mut rejected = Extraction::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return upload_error(e),
        };

        let Some(name) = field.file_name().map(str::to_string) else {
            debug!("Skipping multipart field without a file name");
            continue;
        };
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => return upload_error(e),
        };

        match Artifact::new(&name, bytes) {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => {
                warn!("Rejected upload {}: {}", name, e);
                rejected.merge(Extraction::failed(&name, e));
            }
        }
    }

    if artifacts.is_empty() && rejected.warnings.is_empty() {
        return error_response(&DocentError::InvalidInput(
            "No files were uploaded.".to_string(),
        ));
    }

    let mut extraction = state.orchestrator.ingest(&artifacts).await;
    extraction.warnings.extend(rejected.warnings);
    Json(extraction).into_response()
}

async fn fetch(State(state): State<Arc<AppState>>, Json(req): Json<FetchRequest>) -> Response {
    Json(state.orchestrator.fetch_page(&req.url).await).into_response()
}

async fn translate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranslateRequest>,
) -> Response {
    let target: Language = match req.language.parse() {
        Ok(language) => language,
        Err(e) => return error_response(&e),
    };
    Json(state.orchestrator.translate(&req.text, target).await).into_response()
}

async fn sql(State(state): State<Arc<AppState>>, Json(req): Json<SqlRequest>) -> Response {
    Json(state.orchestrator.to_sql(&req.query).await).into_response()
}

async fn analyze(State(state): State<Arc<AppState>>, Json(req): Json<AnalyzeRequest>) -> Response {
    let (sentiment, emotions) = tokio::join!(
        state.orchestrator.sentiment(&req.text),
        state.orchestrator.emotions(&req.text)
    );

    let Warned {
        value: sentiment,
        warning: sentiment_warning,
    } = sentiment;
    let Warned {
        value: emotions,
        warning: emotion_warning,
    } = emotions;

    Json(AnalyzeResponse {
        sentiment,
        emotions,
        warnings: sentiment_warning.into_iter().chain(emotion_warning).collect(),
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::testing::orchestrator;
    use crate::source::fixtures;
    use serde_json::{json, Value};

    async fn serve(dir: &std::path::Path) -> String {
        let app = router(orchestrator(dir, Ok("spoken words".into())));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let base = serve(dir.path()).await;
        let body: Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_message() {
        let dir = tempfile::tempdir().unwrap();
        let base = serve(dir.path()).await;
        let response = reqwest::Client::new()
            .post(format!("{}/chat", base))
            .json(&json!({ "message": "   " }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_replies() {
        let dir = tempfile::tempdir().unwrap();
        let base = serve(dir.path()).await;
        let body: Value = reqwest::Client::new()
            .post(format!("{}/chat", base))
            .json(&json!({ "message": "hi", "context": "some notes" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["reply"], "SELECT 1;");
    }

    #[tokio::test]
    async fn test_extract_multipart() {
        let dir = tempfile::tempdir().unwrap();
        let base = serve(dir.path()).await;

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(fixtures::pdf(&["Quarterly report"]))
                    .file_name("report.pdf"),
            )
            .part(
                "file",
                reqwest::multipart::Part::bytes(b"hello".to_vec()).file_name("notes.txt"),
            );

        let body: Value = reqwest::Client::new()
            .post(format!("{}/extract", base))
            .multipart(form)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert!(body["text"].as_str().unwrap().contains("Quarterly report"));
        let warnings = body["warnings"].as_array().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0]["file_name"], "notes.txt");
    }

    #[tokio::test]
    async fn test_extract_accepts_uploads_over_two_mib() {
        let dir = tempfile::tempdir().unwrap();
        let base = serve(dir.path()).await;

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(fixtures::pdf(&["Annual summary"]))
                    .file_name("summary.pdf"),
            )
            .part(
                "file",
                reqwest::multipart::Part::bytes(vec![0u8; 3 * 1024 * 1024])
                    .file_name("huge.xlsx"),
            );

        let response = reqwest::Client::new()
            .post(format!("{}/extract", base))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.unwrap();
        assert!(body["text"].as_str().unwrap().contains("Annual summary"));
        let warnings = body["warnings"].as_array().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0]["file_name"], "huge.xlsx");
    }

    #[tokio::test]
    async fn test_translate_rejects_unknown_language() {
        let dir = tempfile::tempdir().unwrap();
        let base = serve(dir.path()).await;
        let response = reqwest::Client::new()
            .post(format!("{}/translate", base))
            .json(&json!({ "text": "hello", "language": "klingon" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_sql_and_analyze() {
        let dir = tempfile::tempdir().unwrap();
        let base = serve(dir.path()).await;
        let client = reqwest::Client::new();

        let sql: Value = client
            .post(format!("{}/sql", base))
            .json(&json!({ "query": "all users" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(sql["value"], "SELECT 1;");
        assert!(sql["warning"].is_null());

        let analysis: Value = client
            .post(format!("{}/analyze", base))
            .json(&json!({ "text": "fine day" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(analysis["sentiment"]["label"], "NEUTRAL");
        assert_eq!(analysis["warnings"].as_array().unwrap().len(), 0);
    }
}
