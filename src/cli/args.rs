//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dub-fetch - Download every dubbed language of a video as its own file
#[derive(Parser, Debug)]
#[command(name = "dub-fetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download one item in every requested language
    Fetch {
        /// Item id or URL
        #[arg(value_name = "ITEM")]
        item: String,

        /// Base directory; the run works in its working subdirectory
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Video-only (or already muxed) format code, e.g. 160
        #[arg(long, value_name = "CODE")]
        video_code: Option<String>,

        /// Audio base format code, e.g. 233
        #[arg(long, value_name = "CODE")]
        audio_code: Option<String>,

        /// Audio track ordinal to language mapping, e.g. "0:en,1:pt"
        #[arg(short, long, value_name = "SPEC")]
        langs: Option<String>,

        /// Alternate video codes to try when the video code is unavailable
        #[arg(long = "alt-video", value_name = "CODE")]
        alt_video: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show and classify the formats available for an item
    Formats {
        /// Item id or URL
        #[arg(value_name = "ITEM")]
        item: String,

        /// Read the listing from a file instead of running the tool
        #[arg(long, value_name = "PATH")]
        from_file: Option<PathBuf>,
    },

    /// Check whether a working directory is safe to run in
    Check {
        /// Base directory
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Explain how a filename decomposes into the naming grammar
    Name {
        /// Filename to parse
        #[arg(value_name = "FILENAME")]
        filename: String,
    },
}

impl Commands {
    /// Whether this command runs the download tool.
    pub fn uses_tool(&self) -> bool {
        match self {
            Commands::Fetch { .. } => true,
            Commands::Formats { from_file, .. } => from_file.is_none(),
            Commands::Check { .. } | Commands::Name { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from([
            "dub-fetch",
            "fetch",
            "abcABC12345",
            "--video-code",
            "160",
            "--audio-code",
            "233",
            "--langs",
            "0:en,1:pt",
            "--alt-video",
            "133",
            "--alt-video",
            "278",
            "-y",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch {
                item,
                video_code,
                langs,
                alt_video,
                yes,
                ..
            } => {
                assert_eq!(item, "abcABC12345");
                assert_eq!(video_code.as_deref(), Some("160"));
                assert_eq!(langs.as_deref(), Some("0:en,1:pt"));
                assert_eq!(alt_video, vec!["133".to_string(), "278".to_string()]);
                assert!(yes);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_formats_from_file_skips_tool() {
        let cli = Cli::try_parse_from(["dub-fetch", "formats", "abcABC12345", "--from-file", "f.txt"])
            .unwrap();
        assert!(!cli.command.uses_tool());
    }
}
