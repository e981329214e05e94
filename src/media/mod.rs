//! Media transcoding utilities.
//!
//! Audio extraction and microphone capture shell out to ffmpeg/ffprobe.

mod extract;
mod microphone;

pub use extract::{count_audio_streams, extract_audio};
pub use microphone::{speech_onset, Microphone, Recording};

use crate::error::{DocentError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Container format of a generated audio file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Aac,
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Aac => "aac",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Aac => "audio/aac",
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
        }
    }
}

/// A uniquely named audio file on disk that the caller owns.
///
/// Nothing deletes it automatically; call [`AudioArtifact::remove`] or move it
/// with [`AudioArtifact::persist_to`] when done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub format: AudioFormat,
}

impl AudioArtifact {
    pub fn new(path: PathBuf, format: AudioFormat) -> Self {
        Self { path, format }
    }

    /// Delete the underlying file.
    pub fn remove(self) -> Result<()> {
        std::fs::remove_file(&self.path)?;
        Ok(())
    }

    /// Move the file to `dest`, falling back to copy+delete across filesystems.
    pub fn persist_to(self, dest: &Path) -> Result<AudioArtifact> {
        if std::fs::rename(&self.path, dest).is_err() {
            std::fs::copy(&self.path, dest)?;
            std::fs::remove_file(&self.path)?;
        }
        Ok(AudioArtifact::new(dest.to_path_buf(), self.format))
    }
}

/// Run an external tool and capture its output, mapping a missing binary to
/// [`DocentError::ToolNotFound`].
pub(crate) async fn run_tool(program: &str, args: &[&std::ffi::OsStr]) -> Result<Output> {
    debug!("Running {} with {} args", program, args.len());

    let result = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(output) => Ok(output),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(DocentError::ToolNotFound(program.to_string()))
        }
        Err(e) => Err(DocentError::ToolFailed(format!("{} execution failed: {}", program, e))),
    }
}

/// Check whether an external tool is installed and runs.
pub fn tool_available(name: &str) -> bool {
    let version_arg = match name {
        "ffmpeg" | "ffprobe" | "ffplay" => "-version",
        _ => "--version",
    };
    std::process::Command::new(name)
        .arg(version_arg)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.mp3");
        std::fs::write(&src, b"id3").unwrap();

        let artifact = AudioArtifact::new(src.clone(), AudioFormat::Mp3);
        let moved = artifact.persist_to(&dir.path().join("b.mp3")).unwrap();
        assert!(!src.exists());
        assert!(moved.path.exists());

        moved.remove().unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let err = run_tool("docent-no-such-tool", &[]).await.unwrap_err();
        assert!(matches!(err, DocentError::ToolNotFound(_)));
        assert!(!tool_available("docent-no-such-tool"));
    }
}
