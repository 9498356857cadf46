//! Formats command implementation.

use crate::core::listing;
use crate::core::resolver::suggested_languages;
use crate::core::sufix::language_name;
use crate::models::config::Config;
use crate::models::media::MediaItemId;
use crate::services::ytdlp::{MediaTool, YtDlp};
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Classify and print the formats of an item.
pub async fn formats(item: &str, from_file: Option<&Path>, config: &Config) -> Result<()> {
    let item_id = MediaItemId::from_input(item)?;

    let text = match from_file {
        Some(path) => {
            if !path.exists() {
                return Err(crate::Error::PathNotFound(path.display().to_string()));
            }
            println!("[INFO] Reading listing: {}", path.display());
            std::fs::read_to_string(path)?
        }
        None => YtDlp::new(config.tool.clone()).list_formats(&item_id).await?,
    };

    let classified = listing::classify(&text);

    println!("{}", "[Formats]".bold().cyan());
    let listed_id = listing::extract_item_id(&text);
    match &listed_id {
        Some(id) if id != &item_id => println!(
            "  {} {} {}",
            "Item:".bold(),
            id,
            format!("(requested {})", item_id).yellow()
        ),
        Some(id) => println!("  {} {}", "Item:".bold(), id),
        None => println!("  {} {} (not in listing)", "Item:".bold(), item_id),
    }
    println!("  {} {}", "Entries:".bold(), classified.entries.len());

    match (&classified.video_code, classified.video_kind) {
        (Some(code), Some(kind)) => println!("  {} {} ({})", "Video:".bold(), code, kind),
        _ => println!("  {} {}", "Video:".bold(), "no known video code".red()),
    }
    match &classified.audio_code {
        Some(code) => println!("  {} {}", "Audio:".bold(), code),
        None => println!("  {} {}", "Audio:".bold(), "no known audio code".red()),
    }
    println!("  {} {}", "Muxed:".bold(), classified.is_av_merged);
    println!("  {} {}", "Dubbed:".bold(), classified.is_dubbed);

    if classified.is_dubbed {
        println!("  {}", "Tracks:".bold());
        for ordinal in &classified.audio_ordinals {
            let (code, name) = match classified.languages.get(ordinal) {
                Some(code) => (code.as_str(), language_name(code)),
                None => ("??", "untagged"),
            };
            println!("    {} {} ({})", ordinal, code, name);
        }
        println!();
        println!("{}", "[Next Steps]".bold().yellow());
        println!(
            "  {}",
            format!(
                "dub-fetch fetch {} --langs \"{}\"",
                item_id,
                suggested_languages(&classified)
            )
            .cyan()
        );
        println!("  Check the mapping first: untagged tracks are marked ??.");
    }

    Ok(())
}
