//! Speak and podcast commands.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::source::Artifact;
use anyhow::Result;
use std::path::Path;

fn preflight_speech(playback: bool, settings: &Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Speak { playback }, settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'docent doctor' for detailed diagnostics.");
        return Err(e.into());
    }
    Ok(())
}

/// Run the speak command.
pub async fn run_speak(text: &str, output: Option<&Path>, settings: Settings) -> Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Nothing to say.");
    }
    preflight_speech(output.is_none(), &settings)?;
    let orchestrator = Orchestrator::new(settings)?;

    match output {
        Some(dest) => {
            let spinner = Output::spinner("Synthesizing speech...");
            let speech = orchestrator.synthesize_speech(text).await;
            spinner.finish_and_clear();

            Output::transform_warning(speech.warning.as_deref());
            if let Some(audio) = speech.value {
                let audio = audio.persist_to(dest)?;
                Output::success(&format!("Speech saved to {}", audio.path.display()));
            }
        }
        None => {
            let spinner = Output::spinner("Speaking...");
            let played = orchestrator.play(text).await;
            spinner.finish_and_clear();
            played?;
        }
    }
    Ok(())
}

/// Run the podcast command.
pub async fn run_podcast(pdf: &Path, output: Option<&Path>, settings: Settings) -> Result<()> {
    preflight_speech(false, &settings)?;
    let artifact = Artifact::from_path(pdf).await?;
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Generating podcast...");
    let podcast = orchestrator.podcast(&artifact).await;
    spinner.finish_and_clear();

    Output::transform_warning(podcast.warning.as_deref());
    let Some(audio) = podcast.value else {
        anyhow::bail!("No podcast was generated");
    };

    let audio = match output {
        Some(dest) => audio.persist_to(dest)?,
        None => audio,
    };
    Output::success(&format!("Podcast saved to {}", audio.path.display()));
    Ok(())
}
