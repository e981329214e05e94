//! Transcribe and listen commands.

use super::emit;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::source::{Artifact, ArtifactKind};
use crate::voice::VoiceCommand;
use anyhow::Result;
use std::path::Path;

/// Run the transcribe command.
pub async fn run_transcribe(
    input: &Path,
    analyze: bool,
    output: Option<&Path>,
    settings: Settings,
) -> Result<()> {
    let artifact = Artifact::from_path(input).await?;
    let video = artifact.kind == ArtifactKind::Video;

    if let Err(e) = preflight::check(Operation::Transcribe { video }, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'docent doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(if video {
        "Extracting audio and transcribing..."
    } else {
        "Transcribing..."
    });
    let result = orchestrator.transcribe(&artifact).await;
    spinner.finish_and_clear();

    let text = match result {
        Ok(Ok(text)) => text,
        Ok(Err(failure)) => {
            Output::warning(&failure.to_string());
            return Ok(());
        }
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    emit(&text, output)?;

    if analyze {
        Output::header("Analysis");
        let sentiment = orchestrator.sentiment(&text).await;
        Output::transform_warning(sentiment.warning.as_deref());
        if let Some(s) = &sentiment.value {
            Output::sentiment(s);
        }

        let emotions = orchestrator.emotions(&text).await;
        Output::transform_warning(emotions.warning.as_deref());
        if emotions.is_ok() {
            Output::emotions(&emotions.value);
        }
    }

    Ok(())
}

/// Run the listen command.
pub async fn run_listen(command: bool, settings: Settings) -> Result<()> {
    let operation = if command {
        Operation::Speak { playback: true }
    } else {
        Operation::Listen
    };
    for op in [Operation::Listen, operation] {
        if let Err(e) = preflight::check(op, &settings) {
            Output::error(&format!("{}", e));
            Output::info("Run 'docent doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Listening... speak now");
    let heard = orchestrator.listen().await;
    spinner.finish_and_clear();

    let text = match heard {
        Ok(Ok(text)) => text,
        Ok(Err(failure)) => {
            Output::warning(&failure.to_string());
            return Ok(());
        }
        Err(e) => {
            Output::error(&format!("Microphone error: {}", e));
            return Err(e.into());
        }
    };

    Output::kv("You said", &text);

    if command {
        let action = VoiceCommand::classify(&text);
        let confirmation = action.confirmation();
        Output::kv("Command", &serde_json::to_string(&action)?);
        Output::info(&confirmation);
        if let Err(e) = orchestrator.play(&confirmation).await {
            Output::warning(&format!("Could not play confirmation: {}", e));
        }
    }

    Ok(())
}
