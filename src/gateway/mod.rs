//! Conversation gateway: one prompt in, one generated reply out.
//!
//! The gateway is stateless. Conversation memory is the caller's transcript;
//! the only thing that conditions a reply is the `context` string passed in.

mod ollama;

pub use ollama::OllamaModel;

use crate::config::Prompts;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A hosted text-completion model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a continuation for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for display.
    fn model_name(&self) -> &str;
}

/// Builds role-labelled prompts and forwards them to a [`LanguageModel`].
#[derive(Clone)]
pub struct ConversationGateway {
    model: Arc<dyn LanguageModel>,
    prompts: Prompts,
}

impl ConversationGateway {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Build the prompt for a message and optional context.
    pub fn build_prompt(&self, message: &str, context: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("message".to_string(), message.to_string());

        let template = if context.is_empty() {
            &self.prompts.conversation.without_context
        } else {
            vars.insert("context".to_string(), context.to_string());
            &self.prompts.conversation.with_context
        };

        self.prompts.render_with_custom(template, &vars)
    }

    /// Send a message with optional context and return the reply verbatim.
    #[instrument(skip(self, context), fields(context_len = context.len()))]
    pub async fn converse(&self, message: &str, context: &str) -> Result<String> {
        let prompt = self.build_prompt(message, context);
        debug!("Prompt is {} chars", prompt.len());
        self.complete(&prompt).await
    }

    /// Send a fully built prompt and return the reply verbatim.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        self.model.generate(prompt).await
    }
}
