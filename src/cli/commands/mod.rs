//! CLI command implementations.

pub mod check;
pub mod fetch;
pub mod formats;
pub mod name;

use crate::models::config::Config;
use std::path::{Path, PathBuf};

/// Working subdirectory for a base directory.
pub fn working_directory(base: Option<&Path>, config: &Config) -> PathBuf {
    base.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(&config.work_subdir)
}
