//! Background HLS transcoding of recorded spots.
//!
//! A single worker drains a bounded FIFO queue. Each job runs every stage in
//! order: staging, source download, ffmpeg, segment upload + manifest
//! rewrite, and finally the manifest upsert. A failed job is logged and
//! dropped; nothing is retried.

pub mod engine;
pub mod error;
pub mod manifest;
pub mod staging;
pub mod store;

pub use engine::{FfmpegEngine, TranscodeEngine};
pub use error::TranscodeError;
pub use manifest::{ManifestRewriter, RewrittenManifest};
pub use staging::{StagingArea, StagingDir};
pub use store::{ManifestStore, PgManifestStore};

use async_channel::{Receiver, Sender};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub const QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeJob {
    pub recording_id: u64,
}

pub struct TranscodePipeline {
    staging: StagingArea,
    engine: Arc<dyn TranscodeEngine>,
    rewriter: ManifestRewriter,
    store: Arc<dyn ManifestStore>,
}

impl TranscodePipeline {
    pub fn new(
        staging: StagingArea,
        engine: Arc<dyn TranscodeEngine>,
        rewriter: ManifestRewriter,
        store: Arc<dyn ManifestStore>,
    ) -> Self {
        Self {
            staging,
            engine,
            rewriter,
            store,
        }
    }

    pub async fn process(&self, job: TranscodeJob) -> Result<(), TranscodeError> {
        let spot_id = job.recording_id;
        info!("Transcoding spot {}", spot_id);

        // 1. Staging directory + source video
        let dir = self.staging.prepare(spot_id).await?;
        let source = self.staging.fetch_source(&dir).await?;

        // 2. Convert to HLS
        let manifest_path = self.engine.convert(&source).await?;

        // 3. Upload segments, rewrite references
        let manifest = self.rewriter.rewrite(&manifest_path, spot_id).await?;

        // 4. Persist both variants
        self.store
            .save(spot_id, &manifest.original, &manifest.rewritten)
            .await
    }
}

/// Handle to the transcoding queue. Cloning shares the same worker.
#[derive(Clone)]
pub struct TranscodeQueue {
    sender: Sender<TranscodeJob>,
    store: Arc<dyn ManifestStore>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl TranscodeQueue {
    /// Spawns the worker on the current tokio runtime.
    pub fn start(pipeline: TranscodePipeline) -> Self {
        let (sender, receiver) = async_channel::bounded(QUEUE_CAPACITY);
        let store = pipeline.store.clone();
        let handle = tokio::spawn(run_worker(pipeline, receiver));

        Self {
            sender,
            store,
            worker: Arc::new(Mutex::new(Some(handle))),
        }
    }

    /// Waits for room when the queue is full.
    pub async fn enqueue(&self, recording_id: u64) -> Result<(), TranscodeError> {
        if recording_id == 0 {
            return Err(TranscodeError::InvalidRecordingId(recording_id));
        }
        store::db_id(recording_id)?;

        self.sender
            .send(TranscodeJob { recording_id })
            .await
            .map_err(|_| TranscodeError::QueueClosed)
    }

    pub async fn get_manifest(&self, recording_id: u64) -> Result<Bytes, TranscodeError> {
        let playlist = self.store.load(recording_id).await?;
        Ok(Bytes::from(playlist))
    }

    pub fn pending(&self) -> usize {
        self.sender.len()
    }

    /// Stops accepting jobs. Jobs already queued may still be picked up.
    pub fn shutdown(&self) {
        self.sender.close();
    }

    /// Waits for the worker task to exit.
    pub async fn join(&self) {
        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Transcoder worker panicked: {}", e);
            }
        }
    }
}

async fn run_worker(pipeline: TranscodePipeline, receiver: Receiver<TranscodeJob>) {
    info!("🎥 Transcoder Worker started (capacity {})", QUEUE_CAPACITY);

    while let Ok(job) = receiver.recv().await {
        info!("📦 Received transcoding job: spot {}", job.recording_id);

        match pipeline.process(job).await {
            Ok(()) => info!("✅ Job completed successfully: spot {}", job.recording_id),
            Err(e) if e.is_fatal() => {
                error!("💥 Stopping transcoder worker: {}", e);
                receiver.close();
                break;
            }
            Err(e) => error!("❌ Failed to process spot {}: {}", job.recording_id, e),
        }
    }

    info!("🎥 Transcoder Worker stopped");
}
