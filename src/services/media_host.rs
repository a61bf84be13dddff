//! Storage for uploaded images.
//!
//! The upload handlers only see `Arc<dyn MediaHost>`; the concrete host is
//! picked from `media.backend` at startup.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::media::{MediaBackend, MediaSettings};
use crate::models::media::{ImageKind, MediaError};
use crate::services::minio_service::MinIOService;

#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Store `data` under `key` and return the URL clients fetch it from.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<String, MediaError>;

    /// Fetch a stored object and its content type.
    async fn get(&self, key: &str) -> Result<(Bytes, String), MediaError>;
}

/// Keys are flat file names; anything that could escape the store is refused.
pub fn validate_key(key: &str) -> Result<(), MediaError> {
    if key.is_empty()
        || key.contains('/')
        || key.contains('\\')
        || key.contains("..")
        || key.starts_with('.')
    {
        return Err(MediaError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Writes images to a directory served back under `public_path`.
pub struct LocalMediaHost {
    root: PathBuf,
    public_path: String,
}

impl LocalMediaHost {
    pub async fn new(root: impl Into<PathBuf>, public_path: &str) -> Result<Self, MediaError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::info!("Local media host writing to {}", root.display());
        Ok(Self {
            root,
            public_path: public_path.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MediaHost for LocalMediaHost {
    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> Result<String, MediaError> {
        validate_key(key)?;
        tokio::fs::write(self.root.join(key), &data).await?;
        tracing::debug!("Stored {} ({} bytes) locally", key, data.len());
        Ok(format!("{}/{}", self.public_path, key))
    }

    async fn get(&self, key: &str) -> Result<(Bytes, String), MediaError> {
        validate_key(key)?;
        let data = match tokio::fs::read(self.root.join(key)).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MediaError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let content_type = key
            .rsplit_once('.')
            .and_then(|(_, ext)| ImageKind::from_extension(ext))
            .map(|kind| kind.mime())
            .unwrap_or("application/octet-stream");

        Ok((Bytes::from(data), content_type.to_string()))
    }
}

pub async fn build_media_host(settings: &MediaSettings) -> Result<Arc<dyn MediaHost>, MediaError> {
    match settings.backend {
        MediaBackend::Local => {
            let host = LocalMediaHost::new(&settings.local_dir, &settings.public_path).await?;
            Ok(Arc::new(host))
        }
        MediaBackend::S3 => {
            let s3 = settings.s3.as_ref().ok_or_else(|| {
                MediaError::Remote("media.backend is s3 but media.s3 is not configured".to_string())
            })?;
            Ok(Arc::new(MinIOService::new(s3).await?))
        }
    }
}
