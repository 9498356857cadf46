//! Run journal data model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Orchestrator state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum RunState {
    Idle,
    SafetyChecked,
    VideoDownloaded,
    /// Backup copy staged for an ordinal.
    Copied(u32),
    /// Backup copy renamed back to the canonical video name.
    Relabeled(u32),
    /// Audio track merged.
    AudioMerged(u32),
    /// Output renamed to its final name.
    Finalized(u32),
    Done,
    Aborted(String),
}

impl RunState {
    /// Whether no further transition can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Aborted(_))
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::SafetyChecked => write!(f, "safety-checked"),
            RunState::VideoDownloaded => write!(f, "video-downloaded"),
            RunState::Copied(n) => write!(f, "copied[{}]", n),
            RunState::Relabeled(n) => write!(f, "relabeled[{}]", n),
            RunState::AudioMerged(n) => write!(f, "audio-merged[{}]", n),
            RunState::Finalized(n) => write!(f, "finalized[{}]", n),
            RunState::Done => write!(f, "done"),
            RunState::Aborted(reason) => write!(f, "aborted: {}", reason),
        }
    }
}

/// One recorded state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    /// Sequence number, starting at 1.
    pub seq: u32,
    /// State entered.
    pub state: RunState,
    /// File name before the step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// File name after the step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Directory the step happened in.
    pub directory: PathBuf,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Item that was acquired.
    pub item_id: String,
    /// Working directory.
    pub directory: PathBuf,
    /// Date prefix used for this run's files.
    pub run_date: NaiveDate,
    /// Final output files, in language order.
    pub outputs: Vec<PathBuf>,
    /// All transitions, in order.
    pub transitions: Vec<Transition>,
}
