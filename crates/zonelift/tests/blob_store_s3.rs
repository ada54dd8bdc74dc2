use anyhow::{Context, Result};
use bytes::Bytes;
use uuid::Uuid;
use zonelift_bucket::{BlobStore, S3BlobStore, StorageConfig};

const REQUIRED_VARS: &[&str] = &[
    "ZONELIFT_TEST_S3_ENDPOINT",
    "ZONELIFT_TEST_S3_ACCESS_KEY_ID",
    "ZONELIFT_TEST_S3_SECRET_ACCESS_KEY",
    "ZONELIFT_TEST_CONTAINER",
];

#[tokio::test]
async fn s3_blob_store_put_list_get_overwrite() -> Result<()> {
    let Some(config) = S3TestConfig::from_env() else {
        eprintln!(
            "Skipping S3 blob store test; set {} to enable",
            REQUIRED_VARS.join(", ")
        );
        return Ok(());
    };

    let store = S3BlobStore::new(config.storage())
        .await
        .context("failed to build S3 blob store")?;
    let key = format!("zonelift-test/{}.csv", Uuid::new_v4());
    let payload = Bytes::from_static(b"id,name\n1,Alice\n");

    store
        .put_object(&config.container, &key, payload.clone(), "text/csv")
        .await
        .context("upload to S3 failed")?;

    let listed = store
        .list_objects(&config.container)
        .await
        .context("list failed")?;
    assert!(listed.iter().any(|entry| entry == &key));

    let fetched = store
        .get_object(&config.container, &key)
        .await
        .context("download failed")?;
    assert_eq!(fetched, payload);

    let replacement = Bytes::from_static(b"id,name\n2,Bob\n");
    store
        .put_object(&config.container, &key, replacement.clone(), "text/csv")
        .await
        .context("overwrite failed")?;
    let fetched = store
        .get_object(&config.container, &key)
        .await
        .context("download after overwrite failed")?;
    assert_eq!(fetched, replacement);

    store
        .delete_object(&config.container, &key)
        .await
        .context("cleanup delete failed")?;

    Ok(())
}

struct S3TestConfig {
    endpoint: String,
    region: Option<String>,
    access_key_id: String,
    secret_access_key: String,
    force_path_style: bool,
    container: String,
}

impl S3TestConfig {
    fn from_env() -> Option<Self> {
        for &var in REQUIRED_VARS {
            if std::env::var(var)
                .ok()
                .filter(|value| !value.is_empty())
                .is_none()
            {
                return None;
            }
        }

        Some(Self {
            endpoint: std::env::var("ZONELIFT_TEST_S3_ENDPOINT").ok()?,
            region: std::env::var("ZONELIFT_TEST_S3_REGION").ok(),
            access_key_id: std::env::var("ZONELIFT_TEST_S3_ACCESS_KEY_ID").ok()?,
            secret_access_key: std::env::var("ZONELIFT_TEST_S3_SECRET_ACCESS_KEY").ok()?,
            force_path_style: std::env::var("ZONELIFT_TEST_S3_FORCE_PATH_STYLE")
                .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE"))
                .unwrap_or(true),
            container: std::env::var("ZONELIFT_TEST_CONTAINER").ok()?,
        })
    }

    fn storage(&self) -> StorageConfig {
        StorageConfig {
            endpoint: self.endpoint.clone(),
            region: self
                .region
                .clone()
                .unwrap_or_else(|| "us-east-1".to_string()),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            force_path_style: self.force_path_style,
            operation_timeout: None,
        }
    }
}
