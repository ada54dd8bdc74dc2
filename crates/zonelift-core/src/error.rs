use thiserror::Error;
use zonelift_bucket::BlobError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("storage access failed: {0}")]
    Access(#[from] BlobError),

    #[error("no source objects found in container '{container}'")]
    EmptyInput { container: String },

    #[error("transform failed for object '{object}': {message}")]
    Transform { object: String, message: String },

    #[error(
        "schema mismatch in object '{object}': expected columns {expected:?}, found {found:?}"
    )]
    SchemaMismatch {
        object: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("publish failed while trying to {step}: {message}")]
    Publish {
        step: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
