//! Audio-track sufix to language mapping.
//!
//! Dubbed audio formats are listed as `<base>-<ordinal>`; this module maps
//! each ordinal to a two-letter language code, e.g. `"0:en,1:pt"`.

use crate::models::media::LanguageSlot;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Known language codes and their names.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("bn", "Bengali"),
    ("de", "German"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("id", "Indonesian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ml", "Malayalam"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese"),
    ("un", "Undetermined"),
];

/// Human-readable language name for a two-letter code.
pub fn language_name(code: &str) -> &str {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// Selector of one dubbed audio track.
pub fn audio_selector(audio_base: &str, ordinal: u32) -> String {
    format!("{}-{}", audio_base, ordinal)
}

/// Ordered ordinal to language code mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SufixMap {
    entries: BTreeMap<u32, String>,
}

impl SufixMap {
    /// Parse a spec like `"0:en,1:pt"`.
    ///
    /// Malformed entries are dropped with a warning; the rest still parse.
    pub fn parse(spec: &str) -> Self {
        let mut entries = BTreeMap::new();

        for raw in spec.split(',') {
            let entry = raw.trim();
            if entry.is_empty() {
                continue;
            }
            match parse_entry(entry) {
                Some((ordinal, code)) => {
                    if let Some(previous) = entries.insert(ordinal, code.clone()) {
                        tracing::warn!(
                            "Ordinal {} mapped twice ({} then {}), keeping {}",
                            ordinal,
                            previous,
                            code,
                            code
                        );
                    }
                }
                None => {
                    tracing::warn!("Dropping malformed language entry '{}'", entry);
                }
            }
        }

        Self { entries }
    }

    /// Like [`SufixMap::parse`], but a non-empty spec with no usable entry
    /// is an error.
    pub fn parse_strict(spec: &str) -> Result<Self> {
        let map = Self::parse(spec);
        if map.is_empty() && !spec.trim().is_empty() {
            return Err(crate::Error::InvalidLanguageMap(format!(
                "'{}' has no valid <ordinal>:<code> entry",
                spec
            )));
        }
        Ok(map)
    }

    /// Build from structured pairs, validating each the same way as `parse`.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: AsRef<str>,
    {
        let mut entries = BTreeMap::new();
        for (ordinal, code) in pairs {
            let code = code.as_ref();
            if is_language_code(code) {
                entries.insert(ordinal, code.to_lowercase());
            } else {
                tracing::warn!("Dropping invalid language code '{}' for ordinal {}", code, ordinal);
            }
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of slots a run will produce.
    pub fn slot_count(&self) -> usize {
        self.entries.len().max(1)
    }

    pub fn get(&self, ordinal: u32) -> Option<&str> {
        self.entries.get(&ordinal).map(String::as_str)
    }

    pub fn ordinals(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    /// Slots in ascending ordinal order.
    ///
    /// An empty mapping yields the single no-dub slot.
    pub fn slots(&self, audio_base: &str) -> Vec<LanguageSlot> {
        if self.entries.is_empty() {
            return vec![LanguageSlot::no_dub(audio_base)];
        }
        self.entries
            .iter()
            .map(|(ordinal, code)| LanguageSlot::dubbed(*ordinal, code, audio_base))
            .collect()
    }

    /// Slot with the smallest ordinal; it reuses the downloaded video file.
    pub fn first_slot(&self, audio_base: &str) -> LanguageSlot {
        match self.entries.iter().next() {
            Some((ordinal, code)) => LanguageSlot::dubbed(*ordinal, code, audio_base),
            None => LanguageSlot::no_dub(audio_base),
        }
    }

    /// Multi-line description for confirmation prompts.
    pub fn describe(&self, audio_base: &str) -> String {
        self.slots(audio_base)
            .iter()
            .map(|slot| {
                format!(
                    "{} -> {} ({})",
                    slot.audio_selector,
                    slot.code,
                    language_name(&slot.code)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for SufixMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(ordinal, code)| format!("{}:{}", ordinal, code))
            .collect();
        f.write_str(&parts.join(","))
    }
}

fn is_language_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())
}

fn parse_entry(entry: &str) -> Option<(u32, String)> {
    let (ordinal, code) = entry.split_once(':')?;
    let ordinal: u32 = ordinal.trim().parse().ok()?;
    let code = code.trim();
    if !is_language_code(code) {
        return None;
    }
    Some((ordinal, code.to_lowercase()))
}
