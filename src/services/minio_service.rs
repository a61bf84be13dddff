use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{error, info, warn};

use crate::config::media::S3Settings;
use crate::models::media::MediaError;
use crate::services::media_host::{validate_key, MediaHost};

/// Remote media host backed by an S3-compatible bucket.
#[derive(Clone, Debug)]
pub struct MinIOService {
    client: S3Client,
    bucket_name: String,
    public_base_url: String,
}

impl MinIOService {
    pub async fn new(settings: &S3Settings) -> Result<Self, MediaError> {
        let service = Self {
            client: settings.create_s3_client(),
            bucket_name: settings.bucket_name.clone(),
            public_base_url: settings.public_base_url(),
        };

        service.init_bucket().await?;

        Ok(service)
    }

    async fn init_bucket(&self) -> Result<(), MediaError> {
        info!("Initializing media bucket: {}", self.bucket_name);

        let bucket_exists = self.client
            .head_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
            .is_ok();

        if !bucket_exists {
            info!("Creating media bucket: {}", self.bucket_name);
            self.client
                .create_bucket()
                .bucket(&self.bucket_name)
                .send()
                .await
                .map_err(|e| MediaError::Remote(format!("create bucket failed: {}", e)))?;
        }

        Ok(())
    }
}

#[async_trait]
impl MediaHost for MinIOService {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<String, MediaError> {
        validate_key(key)?;
        info!("Uploading {} to media bucket ({} bytes)", key, data.len());

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .metadata("uploaded_at", chrono::Utc::now().to_rfc3339())
            .send()
            .await
            .map_err(|e| {
                error!("Failed to upload {} to media bucket: {}", key, e);
                MediaError::Remote(e.to_string())
            })?;

        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn get(&self, key: &str) -> Result<(Bytes, String), MediaError> {
        validate_key(key)?;

        let response = match self.client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    return Err(MediaError::NotFound(key.to_string()));
                }
                warn!("Failed to fetch {} from media bucket: {}", key, service_error);
                return Err(MediaError::Remote(service_error.to_string()));
            }
        };

        let content_type = response
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| MediaError::Remote(e.to_string()))?
            .into_bytes();

        Ok((data, content_type))
    }
}
