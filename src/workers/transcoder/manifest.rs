use super::error::TranscodeError;
use crate::infrastructure::storage::{Compression, ObjectStorage};
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

pub const SEGMENT_PREFIX: &str = "index";
pub const SEGMENT_SUFFIX: &str = ".ts";
pub const SEGMENT_CONTENT_TYPE: &str = "video/mp2t";

/// Lines naming a segment file written by the engine, e.g. `index3.ts`.
pub fn is_segment_reference(line: &str) -> bool {
    line.starts_with(SEGMENT_PREFIX) && line.ends_with(SEGMENT_SUFFIX)
}

pub fn segment_key(recording_id: u64, segment: &str) -> String {
    format!("{}/{}", recording_id, segment)
}

/// Both manifest variants for one recording. Same line count and order;
/// only segment references differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenManifest {
    pub original: String,
    pub rewritten: String,
}

pub struct ManifestRewriter {
    storage: Arc<dyn ObjectStorage>,
}

impl ManifestRewriter {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    pub async fn rewrite(
        &self,
        manifest_path: &Path,
        recording_id: u64,
    ) -> Result<RewrittenManifest, TranscodeError> {
        let lines = read_lines(manifest_path).await?;
        let segment_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));

        // 1. Upload every segment, in manifest order
        let mut uploaded = 0usize;
        for segment in lines.iter().filter(|l| is_segment_reference(l)) {
            let data = fs::read(segment_dir.join(segment)).await?;
            let key = segment_key(recording_id, segment);

            self.storage
                .upload(
                    Bytes::from(data),
                    &key,
                    SEGMENT_CONTENT_TYPE,
                    Compression::None,
                )
                .await?;

            debug!("⬆️ Uploaded segment {}", key);
            uploaded += 1;
        }

        // 2. Swap segment references for presigned URLs
        let mut rewritten = Vec::with_capacity(lines.len());
        for line in &lines {
            if is_segment_reference(line) {
                let url = self
                    .storage
                    .presigned_download_url(&segment_key(recording_id, line))
                    .await?;
                rewritten.push(url);
            } else {
                rewritten.push(line.clone());
            }
        }

        info!(
            "🔗 Rewrote manifest for spot {} ({} segments)",
            recording_id, uploaded
        );

        Ok(RewrittenManifest {
            original: lines.join("\n"),
            rewritten: rewritten.join("\n"),
        })
    }
}

async fn read_lines(path: &Path) -> Result<Vec<String>, TranscodeError> {
    let file = fs::File::open(path).await?;
    let mut reader = BufReader::new(file).lines();

    let mut lines = Vec::new();
    while let Some(line) = reader.next_line().await? {
        lines.push(line);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_segment_references() {
        assert!(is_segment_reference("index0.ts"));
        assert!(is_segment_reference("index12.ts"));
        assert!(!is_segment_reference("#EXTINF:10.000000,"));
        assert!(!is_segment_reference("#EXT-X-ENDLIST"));
        assert!(!is_segment_reference("index.m3u8"));
        assert!(!is_segment_reference("segment0.ts"));
        assert!(!is_segment_reference(""));
    }

    #[test]
    fn segment_keys_are_namespaced_by_recording() {
        assert_eq!(segment_key(42, "index2.ts"), "42/index2.ts");
    }
}
