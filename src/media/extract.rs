//! Audio extraction from uploaded video.

use super::{run_tool, AudioArtifact, AudioFormat};
use crate::error::{DocentError, Result};
use crate::source::{Artifact, ArtifactKind};
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use tracing::{info, instrument};

/// Demux the audio track of a video into a new `.aac` file.
///
/// The video bytes are written to a scoped temp file that is removed on every
/// exit path. The audio temp file only survives on success; the caller owns it.
#[instrument(skip_all, fields(video = %video.name))]
pub async fn extract_audio(video: &Artifact, temp_dir: &Path) -> Result<AudioArtifact> {
    if video.kind != ArtifactKind::Video {
        return Err(DocentError::InvalidInput(format!(
            "{} is not a video file",
            video.name
        )));
    }

    std::fs::create_dir_all(temp_dir)?;

    let mut video_file = tempfile::Builder::new()
        .prefix("docent-video-")
        .suffix(&format!(".{}", video.extension()))
        .tempfile_in(temp_dir)?;
    video_file.write_all(&video.bytes)?;
    video_file.as_file().sync_all()?;

    let streams = probe_audio_streams(video_file.path()).await?;
    if streams == 0 {
        return Err(DocentError::NoAudioTrack(video.name.clone()));
    }

    let audio_file = tempfile::Builder::new()
        .prefix("docent-audio-")
        .suffix(".aac")
        .tempfile_in(temp_dir)?;

    encode_aac(video_file.path(), audio_file.path()).await?;

    let (_, audio_path) = audio_file.keep().map_err(|e| DocentError::Io(e.error))?;
    info!("Extracted audio to {}", audio_path.display());

    Ok(AudioArtifact::new(audio_path, AudioFormat::Aac))
}

/// Count audio streams in a media file with ffprobe.
async fn probe_audio_streams(path: &Path) -> Result<usize> {
    let output = run_tool(
        "ffprobe",
        &[
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-select_streams"),
            OsStr::new("a"),
            OsStr::new("-show_entries"),
            OsStr::new("stream=codec_type"),
            OsStr::new("-of"),
            OsStr::new("json"),
            path.as_os_str(),
        ],
    )
    .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DocentError::Media(format!(
            "Could not read video container: {}",
            stderr.trim()
        )));
    }

    count_audio_streams(&String::from_utf8_lossy(&output.stdout))
}

/// Parse ffprobe JSON output and count audio streams.
pub fn count_audio_streams(json: &str) -> Result<usize> {
    let parsed: serde_json::Value = serde_json::from_str(json)
        .map_err(|_| DocentError::Media("Invalid ffprobe output".into()))?;

    Ok(parsed["streams"]
        .as_array()
        .map(|streams| {
            streams
                .iter()
                .filter(|s| s["codec_type"].as_str() == Some("audio"))
                .count()
        })
        .unwrap_or(0))
}

/// Encode the first audio stream of `source` to AAC.
async fn encode_aac(source: &Path, dest: &Path) -> Result<()> {
    let output = run_tool(
        "ffmpeg",
        &[
            OsStr::new("-i"),
            source.as_os_str(),
            OsStr::new("-vn"),
            OsStr::new("-c:a"),
            OsStr::new("aac"),
            OsStr::new("-y"),
            OsStr::new("-loglevel"),
            OsStr::new("error"),
            dest.as_os_str(),
        ],
    )
    .await?;

    if output.status.success() {
        Ok(())
    } else {
        let err = String::from_utf8_lossy(&output.stderr);
        Err(DocentError::Media(format!("ffmpeg audio extraction failed: {}", err.trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::tool_available;

    fn dir_is_empty(path: &Path) -> bool {
        std::fs::read_dir(path).unwrap().next().is_none()
    }

    #[test]
    fn test_count_audio_streams() {
        assert_eq!(count_audio_streams(r#"{"streams":[{"codec_type":"audio"}]}"#).unwrap(), 1);
        assert_eq!(count_audio_streams(r#"{"streams":[]}"#).unwrap(), 0);
        assert_eq!(count_audio_streams("{}").unwrap(), 0);
        assert!(count_audio_streams("not json").is_err());
    }

    #[tokio::test]
    async fn test_rejects_non_video() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = Artifact::new("memo.wav", vec![1, 2, 3]).unwrap();
        assert!(matches!(
            extract_audio(&artifact, dir.path()).await,
            Err(DocentError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_video_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = Artifact::new("clip.mp4", b"not really a video".to_vec()).unwrap();

        assert!(extract_audio(&artifact, dir.path()).await.is_err());
        assert!(dir_is_empty(dir.path()));
    }

    async fn make_video(dir: &Path, with_audio: bool) -> Vec<u8> {
        let out = dir.join(if with_audio { "with.mp4" } else { "without.mp4" });
        let mut args = vec![
            "-f", "lavfi", "-i", "color=c=black:s=32x32:d=1",
        ];
        if with_audio {
            args.extend(["-f", "lavfi", "-i", "sine=frequency=440:duration=1", "-shortest"]);
        }
        args.extend(["-c:v", "mpeg4", "-y", "-loglevel", "error"]);
        let status = tokio::process::Command::new("ffmpeg")
            .args(&args)
            .arg(&out)
            .status()
            .await
            .unwrap();
        assert!(status.success());
        let bytes = std::fs::read(&out).unwrap();
        std::fs::remove_file(&out).unwrap();
        bytes
    }

    #[tokio::test]
    #[ignore = "requires ffmpeg and ffprobe on PATH"]
    async fn test_video_without_audio_track() {
        assert!(tool_available("ffmpeg") && tool_available("ffprobe"));
        let dir = tempfile::tempdir().unwrap();
        let bytes = make_video(dir.path(), false).await;
        let artifact = Artifact::new("silent.mp4", bytes).unwrap();

        let err = extract_audio(&artifact, dir.path()).await.unwrap_err();
        assert!(matches!(err, DocentError::NoAudioTrack(ref name) if name == "silent.mp4"));
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    #[ignore = "requires ffmpeg and ffprobe on PATH"]
    async fn test_video_with_audio_track() {
        assert!(tool_available("ffmpeg") && tool_available("ffprobe"));
        let dir = tempfile::tempdir().unwrap();
        let bytes = make_video(dir.path(), true).await;
        let artifact = Artifact::new("tone.mp4", bytes).unwrap();

        let audio = extract_audio(&artifact, dir.path()).await.unwrap();
        assert_eq!(audio.format, AudioFormat::Aac);
        assert!(audio.path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        audio.remove().unwrap();
    }
}
