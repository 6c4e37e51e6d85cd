//! Run report output.

use std::path::{Path, PathBuf};

use echocheck_domain::RunReport;
use thiserror::Error;
use tracing::info;

use crate::serialization::{SerializationError, to_json_stable};

/// Errors writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report could not be serialized.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// The file or its directory could not be written.
    #[error("failed to write report to {path}: {source}")]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Writes `report` as stable JSON, creating parent directories as needed.
///
/// # Errors
///
/// Returns a [`ReportError`] if serialization or any write fails.
pub async fn write_report(path: &Path, report: &RunReport) -> Result<(), ReportError> {
    let json = to_json_stable(report)?;
    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    tokio::fs::write(path, json).await.map_err(io_error)?;

    info!(path = %path.display(), run_id = %report.run_id(), "report written");
    Ok(())
}
