//! Check command implementation.

use crate::cli::commands::working_directory;
use crate::core::safety;
use crate::models::config::Config;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Report whether the working directory would let a run start today.
pub async fn check(dir: Option<&Path>, config: &Config) -> Result<()> {
    let work_dir = working_directory(dir, config);
    let today = chrono::Local::now().date_naive();

    println!("[INFO] Checking: {}", work_dir.display());

    let blocking = safety::blocking_files(&work_dir, today)?;
    if blocking.is_empty() {
        println!("{}", "[OK] Safe to run".green());
        return Ok(());
    }

    println!("{}", "[FAILED] Files from today or without a date prefix:".bold().red());
    for name in &blocking {
        println!("  - {}", name);
    }

    Err(crate::Error::UnsafeWorkingDirectory {
        dir: work_dir.display().to_string(),
        files: blocking,
    })
}
