//! Microphone capture through ffmpeg.
//!
//! A capture records a fixed window of `listen_timeout + phrase_limit` seconds,
//! then `silencedetect` decides whether speech started within the listen timeout.

use super::run_tool;
use crate::config::SpeechSettings;
use crate::error::{DocentError, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// Noise floor below which audio counts as silence.
const SILENCE_NOISE_DB: i32 = -35;

/// Minimum silence duration reported by ffmpeg, in seconds.
const SILENCE_MIN_SECONDS: f64 = 0.5;

/// Result of one capture.
#[derive(Debug)]
pub enum Recording {
    /// Speech started within the listen timeout. The file is deleted on drop.
    Captured(NamedTempFile),
    /// Nothing but silence before the listen timeout elapsed.
    NoSpeech,
}

/// Captures single phrases from the default input device.
#[derive(Debug, Clone)]
pub struct Microphone {
    device: String,
    listen_timeout: u32,
    phrase_limit: u32,
    temp_dir: PathBuf,
}

impl Microphone {
    pub fn new(settings: &SpeechSettings, temp_dir: PathBuf) -> Self {
        Self {
            device: settings.input_device.clone(),
            listen_timeout: settings.listen_timeout_seconds.max(1),
            phrase_limit: settings.phrase_limit_seconds.max(1),
            temp_dir,
        }
    }

    /// Record one phrase as 16 kHz mono WAV.
    #[instrument(skip(self), fields(device = %self.device))]
    pub async fn record(&self) -> Result<Recording> {
        std::fs::create_dir_all(&self.temp_dir)?;
        let file = tempfile::Builder::new()
            .prefix("docent-mic-")
            .suffix(".wav")
            .tempfile_in(&self.temp_dir)?;

        let window = self.listen_timeout + self.phrase_limit;
        info!("Listening for up to {}s", window);

        let args = capture_args(&self.device, window, file.path());
        let arg_refs: Vec<&OsStr> = args.iter().map(|a| a.as_os_str()).collect();
        let output = run_tool("ffmpeg", &arg_refs).await?;
        if !output.status.success() {
            let err = String::from_utf8_lossy(&output.stderr);
            return Err(DocentError::Media(format!(
                "Microphone capture failed: {}",
                err.trim()
            )));
        }

        let onset = detect_onset(file.path()).await?;
        debug!("Speech onset: {:?}", onset);

        match onset {
            Some(t) if t <= self.listen_timeout as f64 => Ok(Recording::Captured(file)),
            _ => Ok(Recording::NoSpeech),
        }
    }
}

/// ffmpeg arguments for capturing `seconds` of audio from `device`.
fn capture_args(device: &str, seconds: u32, out: &Path) -> Vec<OsString> {
    let (format, input) = if cfg!(target_os = "macos") {
        let input = if device == "default" {
            ":0".to_string()
        } else {
            format!(":{}", device)
        };
        ("avfoundation", input)
    } else if cfg!(target_os = "windows") {
        ("dshow", format!("audio={}", device))
    } else {
        ("alsa", device.to_string())
    };

    let seconds = seconds.to_string();
    let mut args: Vec<OsString> = [
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        format,
        "-i",
        input.as_str(),
        "-t",
        seconds.as_str(),
        "-ac",
        "1",
        "-ar",
        "16000",
        "-y",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(out.as_os_str().to_owned());
    args
}

/// Run silencedetect over a recording and return the speech onset.
async fn detect_onset(path: &Path) -> Result<Option<f64>> {
    let filter = format!("silencedetect=noise={}dB:d={}", SILENCE_NOISE_DB, SILENCE_MIN_SECONDS);
    let output = run_tool(
        "ffmpeg",
        &[
            OsStr::new("-hide_banner"),
            OsStr::new("-i"),
            path.as_os_str(),
            OsStr::new("-af"),
            OsStr::new(&filter),
            OsStr::new("-f"),
            OsStr::new("null"),
            OsStr::new("-"),
        ],
    )
    .await?;

    if !output.status.success() {
        return Err(DocentError::Media("Silence detection failed".into()));
    }

    Ok(speech_onset(&String::from_utf8_lossy(&output.stderr)))
}

/// Find when speech starts from ffmpeg `silencedetect` log output.
///
/// Returns `Some(0.0)` when the recording does not open with silence, the end
/// of the leading silence when it does, and `None` when it never ends.
pub fn speech_onset(log: &str) -> Option<f64> {
    let mut leading_silence = false;

    for line in log.lines() {
        if let Some(start) = field_after(line, "silence_start:") {
            if start > 0.05 {
                return Some(0.0);
            }
            leading_silence = true;
        } else if let Some(end) = field_after(line, "silence_end:") {
            if leading_silence {
                return Some(end);
            }
        }
    }

    if leading_silence {
        None
    } else {
        Some(0.0)
    }
}

fn field_after(line: &str, key: &str) -> Option<f64> {
    let rest = &line[line.find(key)? + key.len()..];
    rest.split_whitespace().next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onset_without_silence() {
        assert_eq!(speech_onset("size=N/A time=00:00:05.00\n"), Some(0.0));
    }

    #[test]
    fn test_onset_after_leading_silence() {
        let log = "[silencedetect @ 0x1] silence_start: 0\n\
                   [silencedetect @ 0x1] silence_end: 3.25 | silence_duration: 3.25\n\
                   [silencedetect @ 0x1] silence_start: 7.1\n";
        assert_eq!(speech_onset(log), Some(3.25));
    }

    #[test]
    fn test_onset_when_silence_comes_later() {
        let log = "[silencedetect @ 0x1] silence_start: 2.4\n\
                   [silencedetect @ 0x1] silence_end: 4 | silence_duration: 1.6\n";
        assert_eq!(speech_onset(log), Some(0.0));
    }

    #[test]
    fn test_all_silence() {
        assert_eq!(speech_onset("[silencedetect @ 0x1] silence_start: 0\n"), None);
    }

    #[test]
    fn test_capture_args_end_with_output() {
        let args = capture_args("default", 20, Path::new("/tmp/out.wav"));
        assert_eq!(args.last().unwrap(), "/tmp/out.wav");
        assert!(args.iter().any(|a| a == "20"));
    }
}
