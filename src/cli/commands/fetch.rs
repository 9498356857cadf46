//! Fetch command implementation.
//!
//! Resolves the request, asks for confirmation and runs the orchestrator,
//! retrying with alternate video codes when the chosen one is unavailable.

use crate::cli::commands::working_directory;
use crate::core::listing;
use crate::core::orchestrator::{Orchestrator, OrchestratorConfig};
use crate::core::resolver;
use crate::models::config::Config;
use crate::models::media::FormatKind;
use crate::models::report::{RunReport, RunState};
use crate::models::request::{AcquisitionRequest, RequestDraft};
use crate::services::ytdlp::{MediaTool, YtDlp};
use crate::Result;
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;

/// Options of the fetch command.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub item: String,
    pub dir: Option<PathBuf>,
    pub video_code: Option<String>,
    pub audio_code: Option<String>,
    pub langs: Option<String>,
    pub alt_video: Vec<String>,
    pub yes: bool,
    pub json: bool,
}

/// Run the fetch command.
pub async fn fetch(options: FetchOptions, config: &Config) -> Result<()> {
    let announce = !options.json;
    if announce {
        println!("{}", "[FETCH] Multi-language acquisition".bold().cyan());
        println!();
    }

    let mut tool = YtDlp::new(config.tool.clone());
    if options.json {
        tool = tool.quiet();
    }

    let draft = RequestDraft {
        item: options.item.clone(),
        working_directory: working_directory(options.dir.as_deref(), config),
        video_code: options.video_code.clone(),
        audio_base_code: options.audio_code.clone(),
        languages: options.langs.clone(),
    };
    let request = resolver::resolve(&tool, draft).await?;

    let mut candidates = vec![request.clone()];
    for code in &options.alt_video {
        candidates.push(AcquisitionRequest {
            video_code: code.clone(),
            video_kind: listing::kind_of(code).unwrap_or(FormatKind::VideoOnly),
            ..request.clone()
        });
    }

    let orchestrator_config = OrchestratorConfig {
        verify_copies: config.verify_copies,
        announce,
    };
    let confirm = if options.yes {
        None
    } else {
        Some(prompt_confirmation)
    };

    let report = run_with_fallback(candidates, &tool, orchestrator_config, confirm).await?;
    print_report(&report, options.json)
}

/// Run candidates in order until one completes.
///
/// A candidate is only abandoned for the next one when its video code was
/// unavailable and nothing was downloaded. Every candidate is confirmed
/// separately.
pub async fn run_with_fallback<T, F>(
    candidates: Vec<AcquisitionRequest>,
    tool: &T,
    config: OrchestratorConfig,
    confirm: Option<F>,
) -> Result<RunReport>
where
    T: MediaTool,
    F: FnMut(&AcquisitionRequest) -> bool + Clone + 'static,
{
    let total = candidates.len();

    for (attempt, candidate) in candidates.into_iter().enumerate() {
        if config.announce {
            print_request(&candidate);
        }

        let mut orchestrator = Orchestrator::new(candidate, tool).with_config(config.clone());
        if let Some(confirm) = &confirm {
            orchestrator = orchestrator.with_confirmation(confirm.clone());
        }

        match orchestrator.process().await {
            Ok(report) => return Ok(report),
            Err(crate::Error::FormatUnavailable(selector))
                if attempt + 1 < total && !downloaded_anything(orchestrator.transitions()) =>
            {
                eprintln!(
                    "{} {} unavailable, trying next alternate video code",
                    "[RETRY]".bold().yellow(),
                    selector
                );
            }
            Err(e) => return Err(e),
        }
    }

    Err(crate::Error::FormatUnavailable(
        "no video code left to try".to_string(),
    ))
}

fn downloaded_anything(transitions: &[crate::models::report::Transition]) -> bool {
    transitions
        .iter()
        .any(|t| !matches!(t.state, RunState::SafetyChecked | RunState::Aborted(_)))
}

fn print_request(request: &AcquisitionRequest) {
    println!("  {} {}", "Item:".bold(), request.item_id);
    println!("  {} {}", "Directory:".bold(), request.working_directory.display());
    println!(
        "  {} {} ({})",
        "Video:".bold(),
        request.video_code,
        request.video_kind
    );
    println!("  {} {}", "Audio:".bold(), request.audio_base_code);
    if request.video_kind == FormatKind::AlreadyMerged {
        println!("  {} single muxed download", "Languages:".bold());
    } else {
        println!("  {}", "Languages:".bold());
        for line in request.languages.describe(&request.audio_base_code).lines() {
            println!("    {}", line);
        }
    }
    println!();
}

/// Ask on stdin whether to proceed with a request.
fn prompt_confirmation(request: &AcquisitionRequest) -> bool {
    eprint!(
        "{} ",
        format!("Proceed with video code {}? [y/N]", request.video_code)
            .bold()
            .yellow()
    );
    if std::io::stderr().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    println!("{}", "[Run Summary]".bold().green());
    println!("  {} {}", "Item:".bold(), report.item_id);
    println!("  {} {}", "Steps:".bold(), report.transitions.len());
    println!("  {}", "Outputs:".bold());
    for output in &report.outputs {
        println!("    {}", output.display());
    }
    println!();
    println!("{}", "[Next Steps]".bold().yellow());
    println!(
        "  Move the outputs out of {} before fetching another item today.",
        report.directory.display()
    );

    Ok(())
}
