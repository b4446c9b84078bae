use crate::infrastructure::storage::StorageError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("invalid recording id: {0}")]
    InvalidRecordingId(u64),

    #[error("transcode queue is closed")]
    QueueClosed,

    #[error("failed to create staging directory {}: {source}", .path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("ffmpeg failed ({status}): {stderr}")]
    Engine { status: String, stderr: String },

    #[error("stream manifest not found for recording {0}")]
    NotFound(u64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl TranscodeError {
    /// Errors that leave the worker's environment unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TranscodeError::Staging { .. })
    }
}
