//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{DocentError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Speech recognition needs the OpenAI key; video also needs ffmpeg/ffprobe.
    Transcribe { video: bool },
    /// Audio extraction needs ffmpeg/ffprobe.
    ExtractAudio,
    /// Microphone capture needs ffmpeg and the OpenAI key.
    Listen,
    /// Synthesis needs the OpenAI key; playback also needs the player.
    Speak { playback: bool },
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Transcribe { video } => {
            check_api_key()?;
            if video {
                check_tool("ffmpeg")?;
                check_tool("ffprobe")?;
            }
        }
        Operation::ExtractAudio => {
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
        }
        Operation::Listen => {
            check_api_key()?;
            check_tool("ffmpeg")?;
        }
        Operation::Speak { playback } => {
            check_api_key()?;
            if playback {
                check_tool(&settings.speech.player)?;
            }
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(DocentError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(DocentError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg tools use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" | "ffplay" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(DocentError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(DocentError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(DocentError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_player_is_reported() {
        let mut settings = Settings::default();
        settings.speech.player = "docent-missing-player".to_string();
        assert!(matches!(
            check_tool(&settings.speech.player),
            Err(DocentError::ToolNotFound(_))
        ));
    }
}
