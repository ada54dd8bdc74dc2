use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use zonelift_bucket::{S3BlobStore, StorageConfig};
use zonelift_core::config::{
    DEFAULT_DESTINATION_CONTAINER, DEFAULT_DESTINATION_KEY, DEFAULT_SOURCE_CONTAINER,
    DEFAULT_STAGING_PATH,
};
use zonelift_core::{pipeline, JobConfig};

/// Promote customer CSV extracts from the landing zone to the trusted zone.
#[derive(Parser, Debug)]
#[command(author, version, about = "Landing-to-trusted CSV promotion job", long_about = None)]
struct Cli {
    /// Container the source CSV objects are listed and downloaded from
    #[arg(long, default_value = DEFAULT_SOURCE_CONTAINER)]
    source_container: String,

    /// Container the combined extract is uploaded to
    #[arg(long, default_value = DEFAULT_DESTINATION_CONTAINER)]
    destination_container: String,

    /// Local staging file the combined extract is written to before upload
    #[arg(long, default_value = DEFAULT_STAGING_PATH)]
    staging_path: PathBuf,

    /// Object key the combined extract is uploaded under
    #[arg(long, default_value = DEFAULT_DESTINATION_KEY)]
    destination_key: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error!("run failed: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let storage = StorageConfig::from_env().context("storage configuration incomplete")?;
    let store = S3BlobStore::new(storage)
        .await
        .context("failed to build storage client")?;

    let config = JobConfig {
        source_container: cli.source_container,
        destination_container: cli.destination_container,
        staging_path: cli.staging_path,
        destination_key: cli.destination_key,
    };

    let summary = pipeline::run(&store, &config).await?;
    info!(
        objects = summary.objects,
        rows = summary.rows,
        key = %summary.destination_key,
        "promotion complete"
    );

    Ok(())
}
