//! Acquisition orchestrator.
//!
//! Drives one run for one item:
//!
//! ```text
//! Idle -> SafetyChecked -> VideoDownloaded
//!      -> per language: Copied -> Relabeled -> AudioMerged -> Finalized
//!      -> Done
//! ```
//!
//! Any failure ends in `Aborted`. Files are left exactly as they were at the
//! failing step; the printed transitions describe how far the run got.
//!
//! The video-only file is downloaded once. Every language after the first
//! gets its own `.bk<n>` copy of it; the first language consumes the
//! original. Before each merge the copy is renamed back to the format-marked
//! name, which the download tool recognises as an already-downloaded video
//! stream, so only the audio track is fetched.

use crate::core::naming::{self, CanonicalName};
use crate::core::safety;
use crate::models::media::{FormatKind, LanguageSlot};
use crate::models::report::{RunReport, RunState, Transition};
use crate::models::request::AcquisitionRequest;
use crate::services::ytdlp::{MediaTool, ToolInvocation, ToolOutcome};
use crate::utils::{fs, hash};
use crate::Result;
use chrono::NaiveDate;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Verify each staged video copy with SHA-256.
    pub verify_copies: bool,
    /// Print transitions to stdout.
    pub announce: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            verify_copies: true,
            announce: true,
        }
    }
}

/// Confirmation hook, called after the safety check and before any change.
pub type ConfirmHook = Box<dyn FnMut(&AcquisitionRequest) -> bool>;

/// Runs one acquisition request.
pub struct Orchestrator<T: MediaTool> {
    request: AcquisitionRequest,
    tool: T,
    config: OrchestratorConfig,
    run_date: NaiveDate,
    confirm: Option<ConfirmHook>,
    state: RunState,
    video: Option<CanonicalName>,
    current_ordinal: Option<u32>,
    transitions: Vec<Transition>,
    outputs: Vec<PathBuf>,
}

impl<T: MediaTool> Orchestrator<T> {
    /// Create an orchestrator dated today.
    pub fn new(request: AcquisitionRequest, tool: T) -> Self {
        Self {
            request,
            tool,
            config: OrchestratorConfig::default(),
            run_date: chrono::Local::now().date_naive(),
            confirm: None,
            state: RunState::Idle,
            video: None,
            current_ordinal: None,
            transitions: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the date used for the safety check and file prefixes.
    pub fn with_run_date(mut self, run_date: NaiveDate) -> Self {
        self.run_date = run_date;
        self
    }

    /// Install a confirmation hook; returning `false` aborts the run.
    pub fn with_confirmation<F>(mut self, confirm: F) -> Self
    where
        F: FnMut(&AcquisitionRequest) -> bool + 'static,
    {
        self.confirm = Some(Box::new(confirm));
        self
    }

    pub fn request(&self) -> &AcquisitionRequest {
        &self.request
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Ordinal of the language being processed, if any.
    pub fn current_ordinal(&self) -> Option<u32> {
        self.current_ordinal
    }

    /// Canonical video-only file of this run, once downloaded.
    pub fn canonical_video(&self) -> Option<&CanonicalName> {
        self.video.as_ref()
    }

    /// Run the whole acquisition.
    pub async fn process(&mut self) -> Result<RunReport> {
        if self.state != RunState::Idle {
            return Err(crate::Error::other(format!(
                "Orchestrator already ran (state: {})",
                self.state
            )));
        }

        match self.run().await {
            Ok(()) => {
                self.enter(RunState::Done, None, None);
                Ok(self.report())
            }
            Err(e) => {
                self.abort(&e);
                Err(e)
            }
        }
    }

    async fn run(&mut self) -> Result<()> {
        let dir = self.request.working_directory.clone();

        if self.request.video_kind == FormatKind::AudioOnly {
            return Err(crate::Error::InvalidFormatCode(format!(
                "{} is an audio-only format, a video code is required",
                self.request.video_code
            )));
        }

        safety::check_working_directory(&dir, self.run_date)?;
        self.enter(RunState::SafetyChecked, None, None);

        if let Some(confirm) = self.confirm.as_mut() {
            if !confirm(&self.request) {
                return Err(crate::Error::Declined);
            }
        }

        fs::create_dir_all(&dir)?;

        let selector = self.request.video_code.clone();
        self.invoke(&selector).await?;
        let downloaded = self.discover_fresh()?;

        match self.request.video_kind {
            FormatKind::AlreadyMerged => {
                self.enter(RunState::VideoDownloaded, None, Some(&downloaded));
                self.outputs.push(dir.join(downloaded.to_string()));
                return self.sweep();
            }
            FormatKind::VideoOnly | FormatKind::AudioOnly => {}
        }

        let video = downloaded.with_format_marker(&self.request.video_code)?;
        self.rename(&downloaded, &video)?;
        self.enter(RunState::VideoDownloaded, Some(&downloaded), Some(&video));
        self.video = Some(video.clone());

        let slots = self.request.slots();
        let multi = slots.len() > 1;

        if let [slot] = slots.as_slice() {
            if slot.is_no_dub() {
                self.current_ordinal = Some(slot.ordinal);
                let output = self.merge(&video, slot).await?;
                self.outputs.push(dir.join(output.to_string()));
                self.enter(RunState::Finalized(slot.ordinal), None, Some(&output));
                return self.sweep();
            }
        }

        self.stage_copies(&video, &slots)?;

        for slot in &slots {
            self.current_ordinal = Some(slot.ordinal);
            self.relabel(&video, slot.ordinal)?;
            let output = self.merge(&video, slot).await?;
            let final_name = self.finalize(&output, slot.ordinal, multi)?;
            self.outputs.push(dir.join(final_name.to_string()));
        }

        self.sweep()
    }

    /// Copy the video for every ordinal but the first, then move the
    /// original onto the first ordinal's backup name.
    fn stage_copies(&mut self, video: &CanonicalName, slots: &[LanguageSlot]) -> Result<()> {
        let Some((first, rest)) = slots.split_first() else {
            return Ok(());
        };

        let source = self.path_of(video);
        let source_hash = if self.config.verify_copies && !rest.is_empty() {
            Some(hash::sha256_file(&source)?)
        } else {
            None
        };

        for slot in rest {
            let backup = video.with_backup_marker(slot.ordinal)?;
            let target = self.path_of(&backup);
            fs::copy_file(&source, &target)?;

            if let Some(expected) = &source_hash {
                let actual = hash::sha256_file(&target)?;
                if &actual != expected {
                    return Err(crate::Error::ChecksumMismatch(target.display().to_string()));
                }
            }

            self.enter(RunState::Copied(slot.ordinal), Some(video), Some(&backup));
        }

        let backup = video.with_backup_marker(first.ordinal)?;
        self.rename(video, &backup)?;
        self.enter(RunState::Copied(first.ordinal), Some(video), Some(&backup));

        Ok(())
    }

    /// Rename an ordinal's backup copy back to the canonical video name.
    fn relabel(&mut self, video: &CanonicalName, ordinal: u32) -> Result<()> {
        let backup = video.with_backup_marker(ordinal)?;
        let plain = backup.without_backup_marker();
        self.rename(&backup, &plain)?;
        self.enter(RunState::Relabeled(ordinal), Some(&backup), Some(&plain));
        Ok(())
    }

    /// Merge the canonical video with one audio track.
    ///
    /// The tool consumes the video-only file and leaves one fresh output.
    async fn merge(&mut self, video: &CanonicalName, slot: &LanguageSlot) -> Result<CanonicalName> {
        let selector = self.request.merge_selector(slot);
        self.invoke(&selector).await?;

        let output = self.discover_fresh()?;
        if self.path_of(video).exists() {
            return Err(crate::Error::LeftoverFiles(vec![video.to_string()]));
        }

        self.enter(RunState::AudioMerged(slot.ordinal), Some(video), Some(&output));
        Ok(output)
    }

    /// Give a merged output its final name.
    fn finalize(&mut self, output: &CanonicalName, ordinal: u32, multi: bool) -> Result<CanonicalName> {
        if !multi {
            self.enter(RunState::Finalized(ordinal), None, Some(output));
            return Ok(output.clone());
        }

        let final_name = output.with_language_prefix(ordinal);
        self.rename(output, &final_name)?;
        self.enter(RunState::Finalized(ordinal), Some(output), Some(&final_name));
        Ok(final_name)
    }

    /// Run the download tool with a selector.
    async fn invoke(&mut self, selector: &str) -> Result<()> {
        let invocation = ToolInvocation {
            selector: selector.to_string(),
            item_id: self.request.item_id.clone(),
            directory: self.request.working_directory.clone(),
            output_template: naming::download_template(self.run_date),
        };

        if self.config.announce {
            println!("  {} -f {}", "[TOOL]".bold().blue(), selector);
        }
        tracing::info!("Invoking download tool with selector {}", selector);

        match self.tool.fetch(&invocation).await? {
            ToolOutcome::Completed => Ok(()),
            ToolOutcome::FormatUnavailable { detail } => {
                tracing::warn!("Selector {} unavailable: {}", selector, detail);
                Err(crate::Error::FormatUnavailable(selector.to_string()))
            }
        }
    }

    /// The single unmarked, unprefixed file of this item dated today.
    fn discover_fresh(&self) -> Result<CanonicalName> {
        let dir = &self.request.working_directory;
        let mut fresh = Vec::new();
        let mut names = Vec::new();

        for name in fs::list_file_names(dir)? {
            let Ok(parsed) = CanonicalName::parse(&name) else {
                continue;
            };
            if parsed.item_id() == &self.request.item_id
                && parsed.is_fresh()
                && parsed.date() == Some(self.run_date)
            {
                names.push(name);
                fresh.push(parsed);
            }
        }

        if fresh.len() != 1 {
            return Err(crate::Error::UnexpectedDownloads {
                item: self.request.item_id.to_string(),
                files: names,
            });
        }

        Ok(fresh.remove(0))
    }

    /// Fail if any transient file of this run is still present.
    fn sweep(&self) -> Result<()> {
        let mut leftovers = Vec::new();
        for name in fs::list_file_names(&self.request.working_directory)? {
            if let Ok(parsed) = CanonicalName::parse(&name) {
                if parsed.item_id() == &self.request.item_id
                    && parsed.date() == Some(self.run_date)
                    && parsed.has_transient_marker()
                {
                    leftovers.push(name);
                }
            }
        }

        if leftovers.is_empty() {
            Ok(())
        } else {
            Err(crate::Error::LeftoverFiles(leftovers))
        }
    }

    fn path_of(&self, name: &CanonicalName) -> PathBuf {
        self.request.working_directory.join(name.to_string())
    }

    fn rename(&self, from: &CanonicalName, to: &CanonicalName) -> Result<()> {
        fs::rename_file(&self.path_of(from), &self.path_of(to))
    }

    /// Record a transition and describe it.
    fn enter(&mut self, state: RunState, from: Option<&CanonicalName>, to: Option<&CanonicalName>) {
        let transition = Transition {
            seq: self.transitions.len() as u32 + 1,
            state: state.clone(),
            from: from.map(|n| n.to_string()),
            to: to.map(|n| n.to_string()),
            directory: self.request.working_directory.clone(),
        };

        tracing::debug!(
            "[{}] {} -> {} in {}",
            state,
            transition.from.as_deref().unwrap_or("-"),
            transition.to.as_deref().unwrap_or("-"),
            transition.directory.display()
        );
        if self.config.announce {
            print_transition(&transition);
        }

        self.transitions.push(transition);
        self.state = state;
    }

    fn abort(&mut self, error: &crate::Error) {
        let reason = error.to_string();
        self.enter(RunState::Aborted(reason.clone()), None, None);
        tracing::error!("Run aborted: {}", reason);

        if self.config.announce {
            println!();
            println!("{} {}", "[ABORTED]".bold().red(), reason);
            println!(
                "  Files were left as they are in {}",
                self.request.working_directory.display()
            );
            if let Some(last) = self.transitions.iter().rev().find(|t| !t.state.is_terminal()) {
                println!("  Last completed step: {}", last.state);
            }
        }
    }

    fn report(&self) -> RunReport {
        RunReport {
            item_id: self.request.item_id.to_string(),
            directory: self.request.working_directory.clone(),
            run_date: self.run_date,
            outputs: self.outputs.clone(),
            transitions: self.transitions.clone(),
        }
    }
}

/// Print one transition as a before/after line.
pub fn print_transition(transition: &Transition) {
    let label = format!("[{}]", transition.state);
    match (&transition.from, &transition.to) {
        (Some(from), Some(to)) => {
            println!("  {} {}", label.bold().cyan(), from);
            println!("  {} {}", " ".repeat(label.len()), format!("-> {}", to).green());
        }
        (None, Some(to)) => println!("  {} {}", label.bold().cyan(), to.green()),
        (Some(from), None) => println!("  {} {}", label.bold().cyan(), from),
        (None, None) => println!("  {}", label.bold().cyan()),
    }
    println!("  {} {}", " ".repeat(label.len()), display_dir(&transition.directory).dimmed());
}

fn display_dir(dir: &Path) -> String {
    format!("in {}", dir.display())
}
