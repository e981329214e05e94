//! Configuration module for Docent.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ConversationPrompts, Prompts, SqlPrompts};
pub use settings::{
    ClassificationSettings, GatewaySettings, GeneralSettings, PromptSettings, ServerSettings,
    Settings, SpeechSettings, TranslationSettings, WebSettings,
};
