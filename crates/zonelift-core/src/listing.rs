use tracing::debug;
use zonelift_bucket::BlobStore;

use crate::error::Result;

/// Enumerate every object currently present in the source container, in
/// whatever order the storage service returns them.
///
/// Credential and missing-container failures are deliberately not handled
/// here; the run cannot proceed without a source listing, so they propagate
/// to the caller as [`crate::PipelineError::Access`].
pub async fn list_source_objects(store: &dyn BlobStore, container: &str) -> Result<Vec<String>> {
    let names = store.list_objects(container).await?;
    debug!(container, count = names.len(), "listed source objects");
    Ok(names)
}
