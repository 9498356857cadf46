//! Name command implementation.

use crate::core::naming::CanonicalName;
use crate::Result;
use colored::Colorize;

/// What a run is doing with a file, judging by its name.
pub fn describe_stage(name: &CanonicalName) -> &'static str {
    match (name.language(), name.format_code(), name.backup()) {
        (_, Some(_), Some(_)) => "staged video copy awaiting relabel",
        (_, Some(_), None) => "video-only file awaiting audio merge",
        (Some(_), None, _) => "final output of one language",
        (None, None, _) => "muxed file or fresh download",
    }
}

/// Parse a filename and print its parts.
pub async fn name(filename: &str) -> Result<()> {
    let parsed = CanonicalName::parse(filename)?;

    println!("{}", "[Name]".bold().cyan());
    println!("  {} {}", "Title:".bold(), parsed.title());
    println!("  {} {}", "Item:".bold(), parsed.item_id());
    println!("  {} {}", "Extension:".bold(), parsed.extension());
    if let Some(date) = parsed.date() {
        println!("  {} {}", "Date:".bold(), date);
    }
    if let Some(ordinal) = parsed.language() {
        println!("  {} ordinal {}", "Language:".bold(), ordinal);
    }
    if let Some(code) = parsed.format_code() {
        println!("  {} {}", "Format:".bold(), code);
    }
    if let Some(n) = parsed.backup() {
        println!("  {} for ordinal {}", "Backup:".bold(), n);
    }
    println!("  {} {}", "Stage:".bold(), describe_stage(&parsed));

    Ok(())
}
