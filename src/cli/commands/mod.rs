//! CLI command implementations.

mod analyze;
mod ask;
mod chat;
mod config;
mod doctor;
mod extract;
mod fetch;
mod serve;
mod speak;
mod sql;
mod transcribe;
mod translate;

pub use analyze::run_analyze;
pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use extract::{run_extract, run_extract_audio};
pub use fetch::run_fetch;
pub use serve::run_serve;
pub use speak::{run_podcast, run_speak};
pub use sql::run_sql;
pub use transcribe::{run_listen, run_transcribe};
pub use translate::run_translate;

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::source::Artifact;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Read files from disk, validating their kinds before anything is processed.
pub(crate) async fn load_artifacts(paths: &[PathBuf]) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::with_capacity(paths.len());
    for path in paths {
        let artifact = Artifact::from_path(path)
            .await
            .with_context(|| format!("Failed to load {}", path.display()))?;
        artifacts.push(artifact);
    }
    Ok(artifacts)
}

/// Text from the command line, or extracted from files when any are given.
pub(crate) async fn text_or_files(
    orchestrator: &Orchestrator,
    text: Option<&str>,
    files: &[PathBuf],
) -> Result<String> {
    if !files.is_empty() {
        let artifacts = load_artifacts(files).await?;
        let spinner = Output::spinner("Reading files...");
        let extraction = orchestrator.ingest(&artifacts).await;
        spinner.finish_and_clear();
        Output::extraction_warnings(&extraction.warnings);
        return Ok(extraction.text);
    }

    match text {
        Some(t) => Ok(t.to_string()),
        None => anyhow::bail!("Provide text or at least one --file"),
    }
}

/// Print to stdout, or write to a file when a path is given.
pub(crate) fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Output::success(&format!("Saved to {}", path.display()));
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// Apply a per-command model override.
pub(crate) fn with_model(mut settings: Settings, model: Option<String>) -> Settings {
    if let Some(model) = model {
        settings.gateway.model = model;
    }
    settings
}
