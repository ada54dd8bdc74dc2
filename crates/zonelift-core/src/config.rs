use std::path::PathBuf;

pub const DEFAULT_SOURCE_CONTAINER: &str = "landing-zone";
pub const DEFAULT_DESTINATION_CONTAINER: &str = "trusted-zone";
pub const DEFAULT_STAGING_PATH: &str = "extracts/Customers_withTimestamp.csv";
pub const DEFAULT_DESTINATION_KEY: &str = "final/Customers_withTimestamp.csv";

/// Where one run reads from, stages to, and publishes to.
///
/// The staging path is relative to the working directory unless given as
/// absolute, and both it and the destination key are overwritten on every run.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub source_container: String,
    pub destination_container: String,
    pub staging_path: PathBuf,
    pub destination_key: String,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            source_container: DEFAULT_SOURCE_CONTAINER.to_string(),
            destination_container: DEFAULT_DESTINATION_CONTAINER.to_string(),
            staging_path: PathBuf::from(DEFAULT_STAGING_PATH),
            destination_key: DEFAULT_DESTINATION_KEY.to_string(),
        }
    }
}
