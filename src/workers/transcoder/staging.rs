use super::error::TranscodeError;
use crate::infrastructure::storage::ObjectStorage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

pub const SOURCE_FILE_NAME: &str = "origin.webm";

pub fn source_key(recording_id: u64) -> String {
    format!("{}/video.webm", recording_id)
}

/// Per-recording working directory. Never removed automatically.
#[derive(Debug, Clone)]
pub struct StagingDir {
    recording_id: u64,
    path: PathBuf,
}

impl StagingDir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source_path(&self) -> PathBuf {
        self.path.join(SOURCE_FILE_NAME)
    }
}

#[derive(Clone)]
pub struct StagingArea {
    root: PathBuf,
    storage: Arc<dyn ObjectStorage>,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            root: root.into(),
            storage,
        }
    }

    pub fn directory(&self, recording_id: u64) -> PathBuf {
        self.root.join(recording_id.to_string())
    }

    pub async fn prepare(&self, recording_id: u64) -> Result<StagingDir, TranscodeError> {
        let path = self.directory(recording_id);

        fs::create_dir_all(&path)
            .await
            .map_err(|source| TranscodeError::Staging {
                path: path.clone(),
                source,
            })?;

        Ok(StagingDir { recording_id, path })
    }

    /// Streams the recording's source video into the staging directory.
    pub async fn fetch_source(&self, dir: &StagingDir) -> Result<PathBuf, TranscodeError> {
        let key = source_key(dir.recording_id);
        let mut video = self.storage.get(&key).await?;

        let local_path = dir.source_path();
        let mut file = fs::File::create(&local_path).await?;
        let written = tokio::io::copy(&mut video, &mut file).await?;
        file.flush().await?;

        info!(
            "⬇️ Saved origin video to disk, spot: {} ({} bytes)",
            dir.recording_id, written
        );
        Ok(local_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::{Compression, ObjectReader, StorageError};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::HashMap;

    struct SourceOnly(HashMap<String, Vec<u8>>);

    #[async_trait]
    impl ObjectStorage for SourceOnly {
        async fn get(&self, key: &str) -> Result<ObjectReader, StorageError> {
            match self.0.get(key) {
                Some(data) => Ok(Box::pin(std::io::Cursor::new(data.clone()))),
                None => Err(StorageError::NotFound(key.to_string())),
            }
        }

        async fn upload(
            &self,
            _body: Bytes,
            _key: &str,
            _content_type: &str,
            _compression: Compression,
        ) -> Result<(), StorageError> {
            unreachable!("staging never uploads")
        }

        async fn presigned_download_url(&self, _key: &str) -> Result<String, StorageError> {
            unreachable!("staging never presigns")
        }
    }

    fn area(root: &Path) -> StagingArea {
        let mut objects = HashMap::new();
        objects.insert(source_key(7), b"webm-bytes".to_vec());
        StagingArea::new(root, Arc::new(SourceOnly(objects)))
    }

    #[tokio::test]
    async fn prepare_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let area = area(tmp.path());

        let first = area.prepare(7).await.unwrap();
        let second = area.prepare(7).await.unwrap();

        assert_eq!(first.path(), second.path());
        assert_eq!(first.path(), tmp.path().join("7"));
        assert!(first.path().is_dir());
    }

    #[tokio::test]
    async fn prepare_failure_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("root");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let area = area(&blocker);

        let err = area.prepare(7).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn fetch_source_writes_deterministic_file() {
        let tmp = tempfile::tempdir().unwrap();
        let area = area(tmp.path());
        let dir = area.prepare(7).await.unwrap();

        let path = area.fetch_source(&dir).await.unwrap();

        assert_eq!(path, tmp.path().join("7").join(SOURCE_FILE_NAME));
        assert_eq!(std::fs::read(&path).unwrap(), b"webm-bytes");
    }

    #[tokio::test]
    async fn fetch_source_reports_missing_object() {
        let tmp = tempfile::tempdir().unwrap();
        let area = area(tmp.path());
        let dir = area.prepare(8).await.unwrap();

        let err = area.fetch_source(&dir).await.unwrap_err();
        assert!(matches!(
            err,
            TranscodeError::Storage(StorageError::NotFound(ref key)) if key == "8/video.webm"
        ));
        assert!(!err.is_fatal());
    }
}
