//! Working directory safety check.
//!
//! A run refuses to start while the working directory holds media files
//! from today (or files without a date prefix): they may belong to a run
//! that is still in progress or was interrupted and needs manual attention.

use crate::core::naming;
use crate::utils::fs;
use crate::Result;
use chrono::NaiveDate;
use std::path::Path;

/// Media artifacts that block a run on `today`.
///
/// A missing directory yields an empty list.
pub fn blocking_files(dir: &Path, today: NaiveDate) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    fs::ensure_directory(dir)?;

    let mut blocking = Vec::new();
    for name in fs::list_file_names(dir)? {
        if !naming::is_media_artifact(&name) {
            continue;
        }
        match naming::leading_date(&name) {
            Some(date) if date < today => {
                tracing::debug!("Older artifact allowed: {}", name);
            }
            Some(_) | None => blocking.push(name),
        }
    }

    Ok(blocking)
}

/// Fail with `UnsafeWorkingDirectory` if any artifact blocks the run.
pub fn check_working_directory(dir: &Path, today: NaiveDate) -> Result<()> {
    let blocking = blocking_files(dir, today)?;
    if blocking.is_empty() {
        tracing::debug!("Working directory is safe: {}", dir.display());
        return Ok(());
    }

    Err(crate::Error::UnsafeWorkingDirectory {
        dir: dir.display().to_string(),
        files: blocking,
    })
}
