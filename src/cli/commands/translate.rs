//! Translate command implementation.

use super::text_or_files;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::transforms::Language;
use anyhow::Result;
use std::path::PathBuf;

/// Run the translate command.
pub async fn run_translate(
    text: Option<&str>,
    to: &str,
    files: &[PathBuf],
    settings: Settings,
) -> Result<()> {
    let target: Language = to.parse()?;
    let orchestrator = Orchestrator::new(settings)?;
    let source = text_or_files(&orchestrator, text, files).await?;

    let spinner = Output::spinner(&format!("Translating to {}...", target));
    let translated = orchestrator.translate(&source, target).await;
    spinner.finish_and_clear();

    Output::transform_warning(translated.warning.as_deref());
    if !translated.value.is_empty() {
        println!("{}", translated.value);
    }
    Ok(())
}
