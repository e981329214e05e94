//! Extract and extract-audio commands.

use super::{emit, load_artifacts};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::source::{Artifact, ArtifactKind};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Run the extract command.
pub async fn run_extract(files: &[PathBuf], output: Option<&Path>, settings: Settings) -> Result<()> {
    let artifacts = load_artifacts(files).await?;

    let has_video = artifacts.iter().any(|a| a.kind == ArtifactKind::Video);
    let has_media = has_video || artifacts.iter().any(|a| a.kind == ArtifactKind::Audio);
    if has_media {
        if let Err(e) = preflight::check(Operation::Transcribe { video: has_video }, &settings) {
            Output::warning(&format!("Media files will be skipped: {}", e));
        }
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!("Reading {} file(s)...", artifacts.len()));
    let extraction = orchestrator.ingest(&artifacts).await;
    spinner.finish_and_clear();

    Output::extraction_warnings(&extraction.warnings);
    if extraction.text.trim().is_empty() {
        Output::warning("No text extracted.");
        return Ok(());
    }

    emit(&extraction.text, output)
}

/// Run the extract-audio command.
pub async fn run_extract_audio(video: &Path, output: Option<&Path>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::ExtractAudio, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'docent doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let artifact = Artifact::from_path(video).await?;
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Extracting audio...");
    let result = orchestrator.extract_audio(&artifact).await;
    spinner.finish_and_clear();

    let audio = match result {
        Ok(audio) => audio,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    let audio = match output {
        Some(dest) => audio.persist_to(dest)?,
        None => audio,
    };
    Output::success(&format!("Audio saved to {}", audio.path.display()));
    Ok(())
}
