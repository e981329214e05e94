//! Analyze command implementation.

use super::text_or_files;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::path::PathBuf;

/// Run the analyze command.
pub async fn run_analyze(text: Option<&str>, files: &[PathBuf], settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let source = text_or_files(&orchestrator, text, files).await?;

    if source.trim().is_empty() {
        Output::warning("No text to analyze.");
        return Ok(());
    }

    let spinner = Output::spinner("Analyzing...");
    let (sentiment, emotions) =
        tokio::join!(orchestrator.sentiment(&source), orchestrator.emotions(&source));
    spinner.finish_and_clear();

    Output::header("Sentiment");
    Output::transform_warning(sentiment.warning.as_deref());
    if let Some(s) = &sentiment.value {
        Output::sentiment(s);
    }

    Output::header("Emotions");
    Output::transform_warning(emotions.warning.as_deref());
    if emotions.is_ok() {
        Output::emotions(&emotions.value);
        if let Some(top) = emotions.value.dominant() {
            Output::kv("Dominant", top.label());
        }
    }

    Ok(())
}
