#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use spot_backend::infrastructure::storage::{Compression, ObjectReader, ObjectStorage, StorageError};
use spot_backend::workers::transcoder::engine::{MANIFEST_FILE_NAME, TranscodeEngine};
use spot_backend::workers::transcoder::{
    ManifestRewriter, ManifestStore, StagingArea, TranscodeError, TranscodePipeline,
    TranscodeQueue,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture_source() -> Vec<u8> {
    std::fs::read(fixture_path("source.webm")).unwrap()
}

pub fn fixture_manifest() -> String {
    std::fs::read_to_string(fixture_path("index.m3u8")).unwrap()
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
    pub compression: Compression,
}

/// In-memory object storage handing out fake presigned URLs.
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, StoredObject>>,
    uploads: Mutex<Vec<String>>,
    presigned: AtomicUsize,
    fail_upload_on: Option<String>,
    fail_presign: bool,
}

impl MemoryStorage {
    pub fn failing_upload(key: &str) -> Self {
        Self {
            fail_upload_on: Some(key.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_presign() -> Self {
        Self {
            fail_presign: true,
            ..Default::default()
        }
    }

    pub fn put_source(&self, recording_id: u64, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(
            format!("{}/video.webm", recording_id),
            StoredObject {
                data,
                content_type: "video/webm".to_string(),
                compression: Compression::None,
            },
        );
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn presigned_count(&self) -> usize {
        self.presigned.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<ObjectReader, StorageError> {
        let object = self
            .object(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(Box::pin(std::io::Cursor::new(object.data)))
    }

    async fn upload(
        &self,
        body: Bytes,
        key: &str,
        content_type: &str,
        compression: Compression,
    ) -> Result<(), StorageError> {
        if self.fail_upload_on.as_deref() == Some(key) {
            return Err(StorageError::Backend(format!("upload of {} rejected", key)));
        }

        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data: body.to_vec(),
                content_type: content_type.to_string(),
                compression,
            },
        );
        self.uploads.lock().unwrap().push(key.to_string());
        Ok(())
    }

    async fn presigned_download_url(&self, key: &str) -> Result<String, StorageError> {
        if self.fail_presign {
            return Err(StorageError::Backend("presigning disabled".to_string()));
        }
        if self.object(key).is_none() {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let n = self.presigned.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "https://storage.test/spots/{}?X-Amz-Expires=86400&X-Amz-Signature={:064x}",
            key, n
        ))
    }
}

#[derive(Debug, Clone)]
pub struct ManifestRecord {
    pub original: String,
    pub rewritten: String,
}

#[derive(Default)]
pub struct MemoryManifestStore {
    records: Mutex<HashMap<u64, ManifestRecord>>,
    saves: AtomicUsize,
}

impl MemoryManifestStore {
    pub fn record(&self, recording_id: u64) -> Option<ManifestRecord> {
        self.records.lock().unwrap().get(&recording_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ManifestStore for MemoryManifestStore {
    async fn save(
        &self,
        recording_id: u64,
        original: &str,
        rewritten: &str,
    ) -> Result<(), TranscodeError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.records.lock().unwrap().insert(
            recording_id,
            ManifestRecord {
                original: original.to_string(),
                rewritten: rewritten.to_string(),
            },
        );
        Ok(())
    }

    async fn load(&self, recording_id: u64) -> Result<String, TranscodeError> {
        self.record(recording_id)
            .map(|r| r.rewritten)
            .ok_or(TranscodeError::NotFound(recording_id))
    }
}

/// Writes the fixture manifest and its three segments next to the source.
pub struct FixtureEngine;

#[async_trait]
impl TranscodeEngine for FixtureEngine {
    async fn convert(&self, source: &Path) -> Result<PathBuf, TranscodeError> {
        let source_bytes = tokio::fs::read(source).await?;
        assert!(!source_bytes.is_empty(), "source was not staged");

        let dir = source.parent().unwrap();
        let manifest = dir.join(MANIFEST_FILE_NAME);
        tokio::fs::write(&manifest, fixture_manifest()).await?;
        for n in 0..3 {
            tokio::fs::write(dir.join(format!("index{}.ts", n)), format!("segment-{}", n)).await?;
        }
        Ok(manifest)
    }
}

/// Fails like an ffmpeg run on a corrupt input.
pub struct BrokenEngine;

#[async_trait]
impl TranscodeEngine for BrokenEngine {
    async fn convert(&self, _source: &Path) -> Result<PathBuf, TranscodeError> {
        Err(TranscodeError::Engine {
            status: "exit status: 1".to_string(),
            stderr: "origin.webm: Invalid data found when processing input".to_string(),
        })
    }
}

/// Holds each conversion until released.
pub struct GatedEngine {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[async_trait]
impl TranscodeEngine for GatedEngine {
    async fn convert(&self, source: &Path) -> Result<PathBuf, TranscodeError> {
        self.started.notify_one();
        self.release.notified().await;
        FixtureEngine.convert(source).await
    }
}

pub fn start_queue(
    staging_root: &Path,
    storage: Arc<MemoryStorage>,
    engine: Arc<dyn TranscodeEngine>,
    store: Arc<MemoryManifestStore>,
) -> TranscodeQueue {
    let pipeline = TranscodePipeline::new(
        StagingArea::new(staging_root, storage.clone()),
        engine,
        ManifestRewriter::new(storage),
        store,
    );
    TranscodeQueue::start(pipeline)
}
