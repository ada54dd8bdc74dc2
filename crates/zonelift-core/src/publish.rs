use std::fs::File;
use std::path::PathBuf;

use bytes::Bytes;
use polars::prelude::*;
use tracing::debug;
use zonelift_bucket::BlobStore;

use crate::config::JobConfig;
use crate::error::{PipelineError, Result};

/// Where a published run landed, locally and remotely.
#[derive(Debug)]
pub struct PublishReceipt {
    pub staging_path: PathBuf,
    pub destination_key: String,
    pub bytes_uploaded: usize,
}

/// Serialize the combined frame to the local staging file, then upload the
/// file's bytes to the destination container, overwriting both unconditionally.
///
/// If the upload fails after the staging write succeeded, the staging file is
/// left in place; it is a scratch artifact, not authoritative state.
pub async fn publish(
    store: &dyn BlobStore,
    mut frame: DataFrame,
    config: &JobConfig,
) -> Result<PublishReceipt> {
    if let Some(parent) = config.staging_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| PipelineError::Publish {
                step: "create the staging directory",
                message: err.to_string(),
            })?;
        }
    }

    let mut file = File::create(&config.staging_path).map_err(|err| PipelineError::Publish {
        step: "create the staging file",
        message: err.to_string(),
    })?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut frame)
        .map_err(|err| PipelineError::Publish {
            step: "serialize the combined table",
            message: err.to_string(),
        })?;

    debug!(path = %config.staging_path.display(), "staged combined extract");

    let data = std::fs::read(&config.staging_path).map_err(|err| PipelineError::Publish {
        step: "read back the staging file",
        message: err.to_string(),
    })?;
    let bytes_uploaded = data.len();

    store
        .put_object(
            &config.destination_container,
            &config.destination_key,
            Bytes::from(data),
            "text/csv",
        )
        .await
        .map_err(|err| PipelineError::Publish {
            step: "upload the staged file",
            message: err.to_string(),
        })?;

    Ok(PublishReceipt {
        staging_path: config.staging_path.clone(),
        destination_key: config.destination_key.clone(),
        bytes_uploaded,
    })
}
