use serde::Deserialize;
use aws_sdk_s3::{config::Builder as S3ConfigBuilder, Client as S3Client};
use aws_config::Region;
use aws_sdk_s3::config::{Credentials, SharedCredentialsProvider};
use secrecy::{ExposeSecret, SecretString};

pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024; // 5MB
pub const DEFAULT_MAX_FILES: usize = 5;
/// Slack on top of the image payload for multipart framing.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    Local,
    S3,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaSettings {
    pub backend: MediaBackend,
    /// Directory used by the local media host.
    pub local_dir: String,
    /// URL prefix under which locally stored files are served.
    pub public_path: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default)]
    pub s3: Option<S3Settings>,
}

fn default_max_file_size() -> usize {
    DEFAULT_MAX_FILE_SIZE
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

impl MediaSettings {
    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_file_size: self.max_file_size,
            max_files: self.max_files,
        }
    }
}

/// Per-request limits enforced on image uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_size: usize,
    pub max_files: usize,
}

impl UploadLimits {
    /// Largest single-file request body the form extractor accepts.
    pub fn single_request_limit(&self) -> usize {
        self.max_file_size.saturating_add(MULTIPART_OVERHEAD)
    }

    /// How much of a rejected request is skipped before the connection is
    /// left to close: one full upload past the file limit.
    pub fn drain_budget(&self) -> usize {
        self.max_file_size
            .saturating_mul(self.max_files.saturating_add(1))
            .saturating_add(MULTIPART_OVERHEAD)
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

/// S3-compatible bucket (MinIO, R2, AWS) used as the remote media host.
#[derive(Debug, Deserialize, Clone)]
pub struct S3Settings {
    pub endpoint: String,
    /// Base URL clients use to fetch stored objects.
    #[serde(default)]
    pub public_base_url: Option<String>,
    pub access_key: SecretString,
    pub secret_key: SecretString,
    pub bucket_name: String,
    pub region: String,
}

impl S3Settings {
    pub fn public_base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("{}/{}", self.endpoint.trim_end_matches('/'), self.bucket_name),
        }
    }

    pub fn create_s3_client(&self) -> S3Client {
        let creds = Credentials::new(
            self.access_key.expose_secret(),
            self.secret_key.expose_secret(),
            None, // No session token
            None, // No expiration
            "smart-vitals-media", // Provider name
        );

        let config = S3ConfigBuilder::new()
            .endpoint_url(&self.endpoint)
            .credentials_provider(SharedCredentialsProvider::new(creds))
            .region(Region::new(self.region.clone()))
            .force_path_style(true) // Important for MinIO
            .behavior_version_latest()
            .build();

        S3Client::from_conf(config)
    }
}
