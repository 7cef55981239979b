//! Persisting the per-chapter status report.

use crate::models::StatusStore;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Write `store` as pretty JSON (chapter id → status), creating parent
/// directories as needed.
pub fn write_report(path: &Path, store: &StatusStore) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut text = serde_json::to_string_pretty(store)?;
    text.push('\n');
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, text).map_err(io_err)?;
    tracing::debug!(path = %path.display(), chapters = store.len(), "report written");
    Ok(())
}
