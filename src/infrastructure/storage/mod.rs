use async_trait::async_trait;
use bytes::Bytes;
use std::pin::Pin;
use tokio::io::AsyncRead;

pub mod s3;

pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    /// Body is already gzip-encoded.
    Gzip,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("object storage error: {0}")]
    Backend(String),
    #[error("object storage i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Byte store the transcoding pipeline reads sources from and writes segments to.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<ObjectReader, StorageError>;

    async fn upload(
        &self,
        body: Bytes,
        key: &str,
        content_type: &str,
        compression: Compression,
    ) -> Result<(), StorageError>;

    async fn presigned_download_url(&self, key: &str) -> Result<String, StorageError>;
}
