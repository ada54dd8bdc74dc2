use std::path::PathBuf;

use tracing::info;
use zonelift_bucket::BlobStore;

use crate::config::JobConfig;
use crate::error::Result;
use crate::{listing, publish, transform};

/// What a completed run did, for the caller to report.
#[derive(Debug)]
pub struct RunSummary {
    pub objects: usize,
    pub rows: usize,
    pub staging_path: PathBuf,
    pub destination_key: String,
}

/// Run the three stages in sequence: list, transform, publish.
///
/// Each stage's output is handed to the next exactly once and any error stops
/// the run immediately with nothing published. Exit behavior belongs to the
/// caller; this function only ever returns.
pub async fn run(store: &dyn BlobStore, config: &JobConfig) -> Result<RunSummary> {
    info!(container = %config.source_container, "listing source objects");
    let names = listing::list_source_objects(store, &config.source_container).await?;
    info!(count = names.len(), "found source objects");

    let frame = transform::transform(store, &config.source_container, &names).await?;
    let rows = frame.height();

    let receipt = publish::publish(store, frame, config).await?;
    info!(
        path = %receipt.staging_path.display(),
        container = %config.destination_container,
        key = %receipt.destination_key,
        bytes = receipt.bytes_uploaded,
        "published combined extract"
    );

    Ok(RunSummary {
        objects: names.len(),
        rows,
        staging_path: receipt.staging_path,
        destination_key: receipt.destination_key,
    })
}
