use std::io::Cursor;

use chrono::Utc;
use polars::prelude::*;
use tracing::{debug, info};
use zonelift_bucket::BlobStore;

use crate::error::{PipelineError, Result};

/// Name of the capture-time column appended to the combined frame.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Download every named object, parse it as headered CSV, and concatenate the
/// frames in listing order, then stamp a `timestamp` column holding the single
/// instant this function was entered (not per-object or per-row capture time).
///
/// All source objects must agree on column names; the first object's columns
/// set the expectation and any later divergence fails before concatenation.
pub async fn transform(
    store: &dyn BlobStore,
    container: &str,
    names: &[String],
) -> Result<DataFrame> {
    if names.is_empty() {
        return Err(PipelineError::EmptyInput {
            container: container.to_string(),
        });
    }

    let captured_at = Utc::now();
    let mut frames: Vec<LazyFrame> = Vec::with_capacity(names.len());
    let mut expected_columns: Option<Vec<String>> = None;

    for name in names {
        let bytes = store
            .get_object(container, name)
            .await
            .map_err(|err| PipelineError::Transform {
                object: name.clone(),
                message: format!("download failed: {err}"),
            })?;

        let text = std::str::from_utf8(&bytes).map_err(|err| PipelineError::Transform {
            object: name.clone(),
            message: format!("object is not valid UTF-8: {err}"),
        })?;

        let frame = parse_csv_object(name, text)?;
        let columns = column_names(&frame);

        match &expected_columns {
            None => expected_columns = Some(columns),
            Some(expected) if expected != &columns => {
                return Err(PipelineError::SchemaMismatch {
                    object: name.clone(),
                    expected: expected.clone(),
                    found: columns,
                });
            }
            Some(_) => {}
        }

        debug!(object = %name, rows = frame.height(), "parsed source object");
        frames.push(frame.lazy());
    }

    let combined = concat(&frames, UnionArgs::default())
        .map_err(concat_error)?
        .with_column(
            lit(captured_at.timestamp_micros())
                .cast(DataType::Datetime(TimeUnit::Microseconds, None))
                .alias(TIMESTAMP_COLUMN),
        )
        .collect()
        .map_err(concat_error)?;

    info!(
        objects = names.len(),
        rows = combined.height(),
        "combined source objects"
    );
    debug!("combined head:\n{}", combined.head(Some(5)));

    Ok(combined)
}

/// Parse one object's text as CSV with a header row and inferred dtypes.
fn parse_csv_object(name: &str, text: &str) -> Result<DataFrame> {
    let cursor = Cursor::new(text.as_bytes());
    CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(cursor)
        .finish()
        .map_err(|err| PipelineError::Transform {
            object: name.to_string(),
            message: format!("CSV parse failed: {err}"),
        })
}

fn column_names(frame: &DataFrame) -> Vec<String> {
    frame
        .get_column_names()
        .iter()
        .map(|column| column.to_string())
        .collect()
}

fn concat_error(err: PolarsError) -> PipelineError {
    PipelineError::Transform {
        object: "<combined>".to_string(),
        message: format!("concatenation failed: {err}"),
    }
}
