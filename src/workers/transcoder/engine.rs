use super::error::TranscodeError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Command;
use tracing::info;

pub const MANIFEST_FILE_NAME: &str = "index.m3u8";

/// Converts a source container into an HLS manifest plus segment files
/// written next to the source.
#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    async fn convert(&self, source: &Path) -> Result<PathBuf, TranscodeError>;
}

pub struct FfmpegEngine {
    binary: String,
}

impl FfmpegEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

pub fn manifest_path_for(source: &Path) -> PathBuf {
    source
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(MANIFEST_FILE_NAME)
}

/// Video copied as-is, audio to AAC 128k, 10s segments numbered from 0.
pub fn ffmpeg_args(source: &Path, manifest: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-i".into(), source.into()];
    args.extend(
        [
            "-c:v",
            "copy",
            "-c:a",
            "aac",
            "-b:a",
            "128k",
            "-start_number",
            "0",
            "-hls_time",
            "10",
            "-hls_list_size",
            "0",
            "-f",
            "hls",
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.push(manifest.into());
    args
}

#[async_trait]
impl TranscodeEngine for FfmpegEngine {
    async fn convert(&self, source: &Path) -> Result<PathBuf, TranscodeError> {
        let manifest = manifest_path_for(source);
        let start = Instant::now();

        let output = Command::new(&self.binary)
            .args(ffmpeg_args(source, &manifest))
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(TranscodeError::Engine {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        info!("🎞️ Transcoded {} in {:?}", source.display(), start.elapsed());
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_hls_argument_template() {
        let source = Path::new("/tmp/spots/42/origin.webm");
        let manifest = manifest_path_for(source);
        assert_eq!(manifest, PathBuf::from("/tmp/spots/42/index.m3u8"));

        let args: Vec<String> = ffmpeg_args(source, &manifest)
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect();

        assert_eq!(
            args,
            vec![
                "-i",
                "/tmp/spots/42/origin.webm",
                "-c:v",
                "copy",
                "-c:a",
                "aac",
                "-b:a",
                "128k",
                "-start_number",
                "0",
                "-hls_time",
                "10",
                "-hls_list_size",
                "0",
                "-f",
                "hls",
                "/tmp/spots/42/index.m3u8",
            ]
        );
    }

    #[tokio::test]
    async fn nonzero_exit_surfaces_stderr() {
        // `cat` rejects ffmpeg's flags and exits non-zero with a diagnostic.
        let engine = FfmpegEngine::new("cat");
        let err = engine
            .convert(Path::new("/tmp/origin.webm"))
            .await
            .unwrap_err();

        match err {
            TranscodeError::Engine { status, stderr } => {
                assert!(!status.is_empty());
                assert!(!stderr.trim().is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_io_error() {
        let engine = FfmpegEngine::new("/nonexistent/ffmpeg-binary");
        let err = engine
            .convert(Path::new("/tmp/origin.webm"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Io(_)));
    }
}
