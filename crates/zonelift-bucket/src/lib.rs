//! Abstractions over S3-compatible object storage used by the zone promotion job.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::timeout::TimeoutConfig;
use aws_credential_types::Credentials;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub force_path_style: bool,
    pub operation_timeout: Option<Duration>,
}

impl StorageConfig {
    /// Read the storage endpoint and credentials from the environment.
    ///
    /// `ZONELIFT_STORAGE_ENDPOINT`, `ZONELIFT_STORAGE_ACCESS_KEY_ID` and
    /// `ZONELIFT_STORAGE_SECRET_ACCESS_KEY` are required. Optional:
    /// `ZONELIFT_STORAGE_REGION` (defaults to `us-east-1`),
    /// `ZONELIFT_FORCE_PATH_STYLE`, and `ZONELIFT_REQUEST_TIMEOUT_SECS` for a
    /// per-call operation timeout.
    pub fn from_env() -> Result<Self, BlobError> {
        let endpoint = required_var("ZONELIFT_STORAGE_ENDPOINT")?;
        let access_key_id = required_var("ZONELIFT_STORAGE_ACCESS_KEY_ID")?;
        let secret_access_key = required_var("ZONELIFT_STORAGE_SECRET_ACCESS_KEY")?;

        let region = std::env::var("ZONELIFT_STORAGE_REGION")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "us-east-1".to_string());

        let force_path_style = std::env::var("ZONELIFT_FORCE_PATH_STYLE")
            .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE"))
            .unwrap_or(false);

        let operation_timeout = match std::env::var("ZONELIFT_REQUEST_TIMEOUT_SECS") {
            Ok(value) => {
                let secs: u64 = value.parse().map_err(|_| {
                    BlobError::Configuration(format!(
                        "ZONELIFT_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{value}'"
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Self {
            endpoint,
            region,
            access_key_id,
            secret_access_key,
            force_path_style,
            operation_timeout,
        })
    }
}

fn required_var(name: &'static str) -> Result<String, BlobError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| BlobError::Configuration(format!("{name} must be set")))
}

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("sdk error: {0}")]
    Sdk(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl BlobError {
    fn from_sdk(err: impl fmt::Display) -> Self {
        Self::Sdk(err.to_string())
    }
}

/// A named container of objects, addressed per call so one authenticated
/// client can serve both the landing and trusted zones.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn list_objects(&self, container: &str) -> Result<Vec<String>, BlobError>;
    async fn get_object(&self, container: &str, key: &str) -> Result<Bytes, BlobError>;
    async fn put_object(
        &self,
        container: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), BlobError>;
}

#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
}

impl S3BlobStore {
    pub async fn new(config: StorageConfig) -> Result<Self, BlobError> {
        if config.endpoint.is_empty() {
            return Err(BlobError::Configuration(
                "storage endpoint cannot be empty".into(),
            ));
        }

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "static",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(SharedCredentialsProvider::new(credentials));

        if let Some(timeout) = config.operation_timeout {
            loader = loader.timeout_config(
                TimeoutConfig::builder().operation_timeout(timeout).build(),
            );
        }

        let shared_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config)
            .endpoint_url(&config.endpoint);

        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        let client = Client::from_conf(builder.build());
        Ok(Self { client })
    }

    /// Maintenance helper for integration tests; the pipeline itself never
    /// deletes objects.
    pub async fn delete_object(&self, container: &str, key: &str) -> Result<(), BlobError> {
        self.client
            .delete_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .map_err(BlobError::from_sdk)?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn list_objects(&self, container: &str) -> Result<Vec<String>, BlobError> {
        let mut names = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(container);
            if let Some(token) = &continuation {
                request = request.continuation_token(token);
            }

            let output = request.send().await.map_err(BlobError::from_sdk)?;
            for object in output.contents() {
                if let Some(key) = object.key() {
                    names.push(key.to_string());
                }
            }

            if output.is_truncated().unwrap_or(false) {
                continuation = output.next_continuation_token().map(|t| t.to_string());
                if continuation.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        Ok(names)
    }

    async fn get_object(&self, container: &str, key: &str) -> Result<Bytes, BlobError> {
        let output = self
            .client
            .get_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .map_err(|err| match err {
                SdkError::ServiceError(service_err) => {
                    let message = service_err.err().to_string();
                    if message.contains("NoSuchKey") {
                        BlobError::NotFound(format!("{container}/{key}"))
                    } else {
                        BlobError::from_sdk(message)
                    }
                }
                other => BlobError::from_sdk(other),
            })?;

        let data = output.body.collect().await.map_err(BlobError::from_sdk)?;
        Ok(Bytes::from(data.into_bytes()))
    }

    async fn put_object(
        &self,
        container: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), BlobError> {
        self.client
            .put_object()
            .bucket(container)
            .key(key)
            .body(ByteStream::from(bytes.to_vec()))
            .content_type(content_type)
            .send()
            .await
            .map_err(BlobError::from_sdk)?;
        Ok(())
    }
}

/// In-memory store for exercising the pipeline without a storage service.
/// Containers must exist before they can be listed or written to, matching
/// the service's behavior for unknown buckets.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    containers: Mutex<BTreeMap<String, BTreeMap<String, Bytes>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_container(&self, name: &str) {
        self.containers
            .lock()
            .expect("memory store lock poisoned")
            .entry(name.to_string())
            .or_default();
    }

    /// Direct read-side peek for assertions.
    pub fn object(&self, container: &str, key: &str) -> Option<Bytes> {
        self.containers
            .lock()
            .expect("memory store lock poisoned")
            .get(container)
            .and_then(|objects| objects.get(key).cloned())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn list_objects(&self, container: &str) -> Result<Vec<String>, BlobError> {
        let containers = self.containers.lock().expect("memory store lock poisoned");
        let objects = containers
            .get(container)
            .ok_or_else(|| BlobError::NotFound(container.to_string()))?;
        Ok(objects.keys().cloned().collect())
    }

    async fn get_object(&self, container: &str, key: &str) -> Result<Bytes, BlobError> {
        let containers = self.containers.lock().expect("memory store lock poisoned");
        containers
            .get(container)
            .and_then(|objects| objects.get(key).cloned())
            .ok_or_else(|| BlobError::NotFound(format!("{container}/{key}")))
    }

    async fn put_object(
        &self,
        container: &str,
        key: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<(), BlobError> {
        let mut containers = self.containers.lock().expect("memory store lock poisoned");
        let objects = containers
            .get_mut(container)
            .ok_or_else(|| BlobError::NotFound(container.to_string()))?;
        objects.insert(key.to_string(), bytes);
        Ok(())
    }
}
