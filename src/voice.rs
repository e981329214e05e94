//! Spoken command recognition.

use crate::transforms::Language;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Intent behind a recognized utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "language", rename_all = "snake_case")]
pub enum VoiceCommand {
    Upload,
    Analyze,
    SwitchTab,
    Translate(Option<Language>),
    GeneratePodcast,
    Ask,
    Unrecognized,
}

fn translate_target() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\btranslate\b.*?\b(?:to|into)\s+([a-z]+)").expect("valid regex")
    })
}

impl VoiceCommand {
    /// Classify an utterance by keyword. Earlier keywords win.
    pub fn classify(utterance: &str) -> Self {
        let text = utterance.to_lowercase();

        if text.contains("upload") {
            VoiceCommand::Upload
        } else if text.contains("analyze") {
            VoiceCommand::Analyze
        } else if text.contains("switch tab") {
            VoiceCommand::SwitchTab
        } else if text.contains("translate") {
            let language = translate_target()
                .captures(&text)
                .and_then(|c| c[1].parse::<Language>().ok());
            VoiceCommand::Translate(language)
        } else if text.contains("generate podcast") {
            VoiceCommand::GeneratePodcast
        } else if text.contains("ask") {
            VoiceCommand::Ask
        } else {
            VoiceCommand::Unrecognized
        }
    }

    /// Message spoken back to confirm the command.
    pub fn confirmation(&self) -> String {
        match self {
            VoiceCommand::Upload => "Opening file upload.".to_string(),
            VoiceCommand::Analyze => "Analyzing the text.".to_string(),
            VoiceCommand::SwitchTab => "Switching tabs.".to_string(),
            VoiceCommand::Translate(Some(lang)) => format!("Translating to {}.", lang),
            VoiceCommand::Translate(None) => "Translating the text.".to_string(),
            VoiceCommand::GeneratePodcast => "Generating the podcast.".to_string(),
            VoiceCommand::Ask => "What would you like to ask?".to_string(),
            VoiceCommand::Unrecognized => "Sorry, I did not recognize that command.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(VoiceCommand::classify("Please UPLOAD a file"), VoiceCommand::Upload);
        assert_eq!(VoiceCommand::classify("analyze this"), VoiceCommand::Analyze);
        assert_eq!(VoiceCommand::classify("switch tab now"), VoiceCommand::SwitchTab);
        assert_eq!(VoiceCommand::classify("generate podcast"), VoiceCommand::GeneratePodcast);
        assert_eq!(VoiceCommand::classify("I want to ask something"), VoiceCommand::Ask);
        assert_eq!(VoiceCommand::classify("hello"), VoiceCommand::Unrecognized);
    }

    #[test]
    fn test_precedence() {
        assert_eq!(VoiceCommand::classify("upload and analyze"), VoiceCommand::Upload);
        assert_eq!(VoiceCommand::classify("translate then ask"), VoiceCommand::Translate(None));
    }

    #[test]
    fn test_translate_target() {
        assert_eq!(
            VoiceCommand::classify("Translate this to Spanish"),
            VoiceCommand::Translate(Some(Language::Es))
        );
        assert_eq!(
            VoiceCommand::classify("translate the page into hi"),
            VoiceCommand::Translate(Some(Language::Hi))
        );
        assert_eq!(
            VoiceCommand::classify("translate to klingon"),
            VoiceCommand::Translate(None)
        );
    }

    #[test]
    fn test_confirmations_differ() {
        assert_eq!(
            VoiceCommand::Translate(Some(Language::Fr)).confirmation(),
            "Translating to French."
        );
        assert_ne!(
            VoiceCommand::Ask.confirmation(),
            VoiceCommand::Unrecognized.confirmation()
        );
    }
}
