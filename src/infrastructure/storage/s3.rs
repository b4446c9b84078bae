use super::{Compression, ObjectReader, ObjectStorage, StorageError};
use async_trait::async_trait;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::put_object::builders::PutObjectFluentBuilder;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{Client, config::BehaviorVersion, config::Credentials, config::Region};
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Clone)]
pub struct StorageService {
    pub client: Client,
    pub bucket: String,
    presign_expiry: Duration,
}

impl StorageService {
    pub fn new(
        endpoint: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
        presign_expiry: Duration,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "static");

        let config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO
            .build();

        let client = Client::from_conf(config);

        info!("✅ Configured S3 client for bucket '{}'", bucket);

        Self {
            client,
            bucket: bucket.to_string(),
            presign_expiry,
        }
    }

    fn put_request(
        &self,
        body: Bytes,
        key: &str,
        content_type: &str,
        compression: Compression,
    ) -> PutObjectFluentBuilder {
        let req = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body));

        match compression {
            Compression::Gzip => req.content_encoding("gzip"),
            Compression::None => req,
        }
    }
}

#[async_trait]
impl ObjectStorage for StorageService {
    async fn get(&self, key: &str) -> Result<ObjectReader, StorageError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Backend(DisplayErrorContext(&e).to_string())
                }
            })?;

        Ok(Box::pin(result.body.into_async_read()))
    }

    async fn upload(
        &self,
        body: Bytes,
        key: &str,
        content_type: &str,
        compression: Compression,
    ) -> Result<(), StorageError> {
        self.put_request(body, key, content_type, compression)
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;

        debug!("Uploaded object {}", key);
        Ok(())
    }

    async fn presigned_download_url(&self, key: &str) -> Result<String, StorageError> {
        let config = PresigningConfig::expires_in(self.presign_expiry)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;

        let url = url::Url::parse(request.uri())
            .map_err(|e| StorageError::Backend(format!("invalid presigned url: {}", e)))?;

        Ok(url.to_string())
    }
}
