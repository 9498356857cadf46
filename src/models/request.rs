//! Acquisition request model.

use crate::core::sufix::SufixMap;
use crate::models::media::{FormatKind, LanguageSlot, MediaItemId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fully resolved input of one acquisition run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionRequest {
    /// Item to acquire.
    pub item_id: MediaItemId,
    /// Working subdirectory the run operates in.
    pub working_directory: PathBuf,
    /// Video format code (video-only, or already merged).
    pub video_code: String,
    /// Kind of `video_code`.
    pub video_kind: FormatKind,
    /// Audio base code; dubbed tracks are `<base>-<ordinal>`.
    pub audio_base_code: String,
    /// Ordinal to language code mapping.
    pub languages: SufixMap,
}

impl AcquisitionRequest {
    /// Language slots in ascending ordinal order.
    pub fn slots(&self) -> Vec<LanguageSlot> {
        self.languages.slots(&self.audio_base_code)
    }

    /// Selector merging the video code with one audio track.
    pub fn merge_selector(&self, slot: &LanguageSlot) -> String {
        format!("{}+{}", self.video_code, slot.audio_selector)
    }
}

/// Partially specified request, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct RequestDraft {
    /// Item id or URL.
    pub item: String,
    /// Working subdirectory.
    pub working_directory: PathBuf,
    /// Explicit video code.
    pub video_code: Option<String>,
    /// Explicit audio base code.
    pub audio_base_code: Option<String>,
    /// Explicit language spec ("0:en,1:pt").
    pub languages: Option<String>,
}

impl RequestDraft {
    /// Whether a format listing is needed to fill in the gaps.
    pub fn needs_listing(&self) -> bool {
        self.video_code.is_none() || self.audio_base_code.is_none() || self.languages.is_none()
    }
}
