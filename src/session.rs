//! Per-user conversation state.
//!
//! A [`Session`] owns everything one user accumulates: the transcript, the
//! context fragments from uploads, the last fetched page and an activity log.
//! Operations take it by `&mut`; nothing is global.

use crate::context::{assemble, ContextBuilder};
use crate::error::{DocentError, Result};
use crate::gateway::ConversationGateway;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// One exchange in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub user_message: String,
    pub bot_reply: String,
    pub timestamp: String,
}

/// One user action, in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub action: String,
    pub detail: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub transcript: Vec<TranscriptEntry>,
    pub context: ContextBuilder,
    pub page_text: String,
    pub activity: Vec<ActivityEntry>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            transcript: Vec::new(),
            context: ContextBuilder::new(),
            page_text: String::new(),
            activity: Vec::new(),
        }
    }

    /// Record a user action.
    pub fn log(&mut self, action: impl Into<String>, detail: impl Into<String>) {
        self.activity.push(ActivityEntry {
            action: action.into(),
            detail: detail.into(),
            timestamp: now(),
        });
    }

    /// Add extracted text to the context.
    pub fn add_source(&mut self, label: &str, text: impl Into<String>) {
        self.context.push(text);
        self.log("upload", label);
    }

    /// Replace the fetched page text.
    pub fn set_page(&mut self, url: &str, text: impl Into<String>) {
        self.page_text = text.into();
        self.log("fetch", url);
    }

    /// Context the model sees: uploaded fragments, then the fetched page.
    pub fn current_context(&self) -> String {
        let mut fragments: Vec<&str> = self.context.fragments().iter().map(String::as_str).collect();
        if !self.page_text.is_empty() {
            fragments.push(&self.page_text);
        }
        assemble(&fragments)
    }

    /// Send a message with the session context and record the exchange.
    ///
    /// Empty input is rejected before the model is contacted. A gateway error
    /// leaves the transcript unchanged.
    #[instrument(skip_all, fields(session = %self.id))]
    pub async fn ask(&mut self, gateway: &ConversationGateway, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(DocentError::InvalidInput("Please enter a question.".into()));
        }

        let context = self.current_context();
        debug!("Asking with {} chars of context", context.len());
        let reply = gateway.converse(message, &context).await?;

        self.transcript.push(TranscriptEntry {
            user_message: message.to_string(),
            bot_reply: reply.clone(),
            timestamp: now(),
        });
        Ok(reply)
    }

    /// Forget everything except the session id.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.context.clear();
        self.page_text.clear();
        self.activity.clear();
    }

    /// Serialize the transcript as pretty JSON.
    pub fn transcript_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.transcript)?)
    }

    /// Write the transcript to a JSON file.
    pub fn export_transcript(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.transcript_json()?)?;
        Ok(())
    }
}
