//! Media-related data models.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Length of a media item id.
pub const ITEM_ID_LEN: usize = 11;

/// Check whether a character belongs to the item id alphabet.
pub fn is_item_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Identifier of one remote media item.
///
/// Always exactly 11 characters from `[0-9A-Za-z_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaItemId(String);

impl MediaItemId {
    /// Validate a bare item id.
    pub fn parse(s: &str) -> Result<Self> {
        if s.chars().count() != ITEM_ID_LEN {
            return Err(crate::Error::InvalidItemId(format!(
                "'{}' must be {} characters long",
                s, ITEM_ID_LEN
            )));
        }
        if let Some(bad) = s.chars().find(|c| !is_item_id_char(*c)) {
            return Err(crate::Error::InvalidItemId(format!(
                "'{}' contains invalid character '{}'",
                s, bad
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Accept either a bare id or a watch/short/shorts URL containing one.
    pub fn from_input(input: &str) -> Result<Self> {
        let input = input.trim();
        if let Ok(id) = Self::parse(input) {
            return Ok(id);
        }

        let patterns = [
            r"[?&]v=([0-9A-Za-z_-]{11})(?:[&#]|$)",
            r"youtu\.be/([0-9A-Za-z_-]{11})(?:[?&#/]|$)",
            r"/(?:shorts|embed|live)/([0-9A-Za-z_-]{11})(?:[?&#/]|$)",
        ];

        for pattern in &patterns {
            if let Ok(re) = regex::Regex::new(pattern) {
                if let Some(caps) = re.captures(input) {
                    if let Some(m) = caps.get(1) {
                        return Self::parse(m.as_str());
                    }
                }
            }
        }

        Err(crate::Error::InvalidItemId(format!(
            "'{}' is neither an item id nor a recognised URL",
            input
        )))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render a download URL from a template containing `{id}`.
    pub fn url(&self, template: &str) -> String {
        template.replace("{id}", &self.0)
    }
}

impl fmt::Display for MediaItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MediaItemId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MediaItemId {
    type Error = crate::Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<MediaItemId> for String {
    fn from(id: MediaItemId) -> Self {
        id.0
    }
}

/// Code used for the single slot of an item without dubbed audio.
pub const NO_DUB_CODE: &str = "un";

/// One audio language to acquire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSlot {
    /// Audio track ordinal (the dashed suffix of the audio format id).
    pub ordinal: u32,
    /// Two-letter language code.
    pub code: String,
    /// Selector handed to the download tool for this track.
    pub audio_selector: String,
}

impl LanguageSlot {
    /// Slot for a dubbed track: selector `<base>-<ordinal>`.
    pub fn dubbed(ordinal: u32, code: &str, audio_base: &str) -> Self {
        Self {
            ordinal,
            code: code.to_string(),
            audio_selector: crate::core::sufix::audio_selector(audio_base, ordinal),
        }
    }

    /// The sentinel slot used when the item has a single undubbed track.
    pub fn no_dub(audio_base: &str) -> Self {
        Self {
            ordinal: 0,
            code: NO_DUB_CODE.to_string(),
            audio_selector: audio_base.to_string(),
        }
    }

    /// Whether this is the no-dub sentinel.
    pub fn is_no_dub(&self) -> bool {
        self.code == NO_DUB_CODE
    }
}

/// Kind of stream a format code delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    VideoOnly,
    AudioOnly,
    AlreadyMerged,
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatKind::VideoOnly => write!(f, "video only"),
            FormatKind::AudioOnly => write!(f, "audio only"),
            FormatKind::AlreadyMerged => write!(f, "audio+video"),
        }
    }
}

/// One row of a format listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatEntry {
    /// Full format id as printed (e.g. "249-9").
    pub id: String,
    /// Base code without the dubbed-track suffix (e.g. "249").
    pub base: String,
    /// Dubbed-track ordinal, if the id carries one.
    pub ordinal: Option<u32>,
    /// Stream kind.
    pub kind: FormatKind,
    /// Two-letter language tag found on the line.
    pub language: Option<String>,
}

/// Classified format listing for one item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatListing {
    /// Raw listing text.
    #[serde(skip)]
    pub raw: String,
    /// Parsed rows, in listing order.
    pub entries: Vec<FormatEntry>,
    /// Preferred video code.
    pub video_code: Option<String>,
    /// Kind of the preferred video code.
    pub video_kind: Option<FormatKind>,
    /// Preferred audio base code.
    pub audio_code: Option<String>,
    /// The preferred video code already carries audio.
    pub is_av_merged: bool,
    /// More than one audio track exists for the preferred audio code.
    pub is_dubbed: bool,
    /// Dubbed-track ordinals seen for the preferred audio code.
    pub audio_ordinals: BTreeSet<u32>,
    /// Language codes found next to the dubbed entries, by ordinal.
    pub languages: BTreeMap<u32, String>,
}
