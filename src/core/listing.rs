//! Format listing classifier.
//!
//! Reads the table the download tool prints for `-F` and decides which
//! video and audio codes to use, whether the item is dubbed and which
//! languages its dubbed tracks carry. Never performs I/O.

use crate::models::media::{FormatEntry, FormatKind, FormatListing, MediaItemId};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Video codes in preference order. Video-only codes first, muxed last.
pub const VIDEO_PRIORITY: &[(&str, FormatKind)] = &[
    ("160", FormatKind::VideoOnly),
    ("133", FormatKind::VideoOnly),
    ("134", FormatKind::VideoOnly),
    ("135", FormatKind::VideoOnly),
    ("136", FormatKind::VideoOnly),
    ("278", FormatKind::VideoOnly),
    ("242", FormatKind::VideoOnly),
    ("243", FormatKind::VideoOnly),
    ("244", FormatKind::VideoOnly),
    ("247", FormatKind::VideoOnly),
    ("18", FormatKind::AlreadyMerged),
    ("22", FormatKind::AlreadyMerged),
];

/// Audio base codes in preference order.
pub const AUDIO_PRIORITY: &[&str] = &["233", "234", "139", "140", "249", "250", "251"];

/// Language tag such as `[en]` or `[pt-BR]`.
const LANGUAGE_TAG_PATTERN: &str = r"\[([a-zA-Z]{2})(?:-[A-Za-z0-9]{2,4})?\]";

/// Kind of a known code, if it appears in the priority tables.
pub fn kind_of(code: &str) -> Option<FormatKind> {
    if let Some((_, kind)) = VIDEO_PRIORITY.iter().find(|(c, _)| *c == code) {
        return Some(*kind);
    }
    let base = code.split('-').next().unwrap_or(code);
    if AUDIO_PRIORITY.contains(&base) {
        return Some(FormatKind::AudioOnly);
    }
    None
}

/// Split a format id into its base code and dubbed-track ordinal.
///
/// Only numeric ids qualify (`249`, `249-9`); storyboards and
/// protocol-named ids are skipped.
fn split_format_id(token: &str) -> Option<(&str, Option<u32>)> {
    let is_number = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    match token.split_once('-') {
        Some((base, ordinal)) if is_number(base) && is_number(ordinal) => {
            Some((base, ordinal.parse().ok()))
        }
        Some(_) => None,
        None if is_number(token) => Some((token, None)),
        None => None,
    }
}

/// Parse one listing line into an entry.
fn parse_line(line: &str, language_tag: Option<&Regex>) -> Option<FormatEntry> {
    let token = line.split_whitespace().next()?;
    let (base, ordinal) = split_format_id(token)?;
    let base = base.to_string();

    let lower = line.to_lowercase();
    let kind = if lower.contains("audio only") {
        FormatKind::AudioOnly
    } else if lower.contains("video only") {
        FormatKind::VideoOnly
    } else {
        kind_of(&base).unwrap_or(FormatKind::AlreadyMerged)
    };

    let language = language_tag
        .and_then(|re| re.captures(line))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase());

    Some(FormatEntry {
        id: token.to_string(),
        base,
        ordinal,
        kind,
        language,
    })
}

/// Classify a format listing.
pub fn classify(text: &str) -> FormatListing {
    let language_tag = Regex::new(LANGUAGE_TAG_PATTERN).ok();
    let entries: Vec<FormatEntry> = text
        .lines()
        .filter_map(|line| parse_line(line, language_tag.as_ref()))
        .collect();

    // Video: first priority code present as a bare id wins
    let video = VIDEO_PRIORITY.iter().find_map(|(code, _)| {
        entries
            .iter()
            .find(|e| e.ordinal.is_none() && e.base == *code)
            .map(|e| (e.base.clone(), e.kind))
    });

    // Audio: first priority code present, bare or dashed
    let audio_code = AUDIO_PRIORITY
        .iter()
        .find(|code| entries.iter().any(|e| e.base == **code))
        .map(|code| code.to_string());

    let mut audio_ordinals = BTreeSet::new();
    let mut languages = BTreeMap::new();
    if let Some(audio) = &audio_code {
        for entry in entries.iter().filter(|e| &e.base == audio) {
            if let Some(ordinal) = entry.ordinal {
                audio_ordinals.insert(ordinal);
                if let Some(lang) = &entry.language {
                    languages.entry(ordinal).or_insert_with(|| lang.clone());
                }
            }
        }
    }

    let (video_code, video_kind) = match video {
        Some((code, kind)) => (Some(code), Some(kind)),
        None => (None, None),
    };
    let is_av_merged = match video_kind {
        Some(FormatKind::AlreadyMerged) => true,
        Some(FormatKind::VideoOnly) | Some(FormatKind::AudioOnly) | None => false,
    };
    let is_dubbed = audio_ordinals.len() > 1;

    tracing::debug!(
        "Classified {} formats: video={:?} audio={:?} dubbed={} merged={}",
        entries.len(),
        video_code,
        audio_code,
        is_dubbed,
        is_av_merged
    );

    FormatListing {
        raw: text.to_string(),
        entries,
        video_code,
        video_kind,
        audio_code,
        is_av_merged,
        is_dubbed,
        audio_ordinals,
        languages,
    }
}

/// Extract the item id from the listing header, if present.
pub fn extract_item_id(text: &str) -> Option<MediaItemId> {
    let patterns = [
        r"Available formats for ([0-9A-Za-z_-]{11})\b",
        r"(?m)^\[[\w:]+\] ([0-9A-Za-z_-]{11}):",
    ];

    for pattern in &patterns {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(caps) = re.captures(text) {
                if let Some(m) = caps.get(1) {
                    if let Ok(id) = MediaItemId::parse(m.as_str()) {
                        return Some(id);
                    }
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUBBED: &str = "\
[youtube] abcABC12345: Downloading webpage
[info] Available formats for abcABC12345:
ID      EXT   RESOLUTION FPS │   FILESIZE   TBR PROTO │ VCODEC        ACODEC      MORE INFO
────────────────────────────────────────────────────────────────────────────────────────────
sb0     mhtml 48x27        0 │                  mhtml │ images                    storyboard
233-0   mp4   audio only     │                  m3u8  │ audio only    unknown     [en] English original
233-9   mp4   audio only     │                  m3u8  │ audio only    unknown     [pt-BR] Portuguese
249-0   webm  audio only     │ ~  1.2MiB   49k https │ audio only    opus        [en] English original
249-9   webm  audio only     │ ~  1.2MiB   49k https │ audio only    opus        [pt-BR] Portuguese
160     mp4   256x144     30 │ ~  2.0MiB   83k https │ avc1.4d400c   video only  144p
278     webm  256x144     30 │ ~  2.1MiB   89k https │ vp9           video only  144p
18      mp4   640x360     30 │ ~ 10.0MiB  420k https │ avc1.42001E   mp4a.40.2   360p
";

    #[test]
    fn test_classify_dubbed_listing() {
        let listing = classify(DUBBED);
        assert_eq!(listing.video_code.as_deref(), Some("160"));
        assert_eq!(listing.video_kind, Some(FormatKind::VideoOnly));
        assert_eq!(listing.audio_code.as_deref(), Some("233"));
        assert!(listing.is_dubbed);
        assert!(!listing.is_av_merged);
        assert_eq!(listing.audio_ordinals.iter().copied().collect::<Vec<_>>(), vec![0, 9]);
        assert_eq!(listing.languages.get(&9).map(String::as_str), Some("pt"));
    }

    #[test]
    fn test_two_dashed_tracks_are_dubbed() {
        let listing = classify("249-0  webm  audio only\n249-9  webm  audio only\n");
        assert!(listing.is_dubbed);
        assert_eq!(listing.audio_code.as_deref(), Some("249"));
        assert_eq!(listing.audio_ordinals.iter().copied().collect::<Vec<_>>(), vec![0, 9]);
        assert!(listing.video_code.is_none());
    }

    #[test]
    fn test_storyboard_rows_ignored() {
        let listing = classify(DUBBED);
        assert!(listing.entries.iter().all(|e| e.id != "sb0"));
    }

    #[test]
    fn test_merged_only_listing() {
        let listing = classify("18  mp4  640x360  30 | avc1.42001E  mp4a.40.2\n140 m4a audio only\n");
        assert_eq!(listing.video_code.as_deref(), Some("18"));
        assert!(listing.is_av_merged);
        assert!(!listing.is_dubbed);
        assert_eq!(listing.audio_code.as_deref(), Some("140"));
    }

    #[test]
    fn test_split_format_id() {
        assert_eq!(split_format_id("249-9"), Some(("249", Some(9))));
        assert_eq!(split_format_id("160"), Some(("160", None)));
        assert_eq!(split_format_id("hls-1080p"), None);
        assert_eq!(split_format_id("233-0-drc"), None);
        assert_eq!(split_format_id("sb0"), None);
    }

    #[test]
    fn test_kind_of() {
        assert_eq!(kind_of("160"), Some(FormatKind::VideoOnly));
        assert_eq!(kind_of("22"), Some(FormatKind::AlreadyMerged));
        assert_eq!(kind_of("233-1"), Some(FormatKind::AudioOnly));
        assert_eq!(kind_of("999"), None);
    }

    #[test]
    fn test_extract_item_id() {
        assert_eq!(
            extract_item_id(DUBBED).map(|id| id.to_string()),
            Some("abcABC12345".to_string())
        );
        assert!(extract_item_id("nothing here").is_none());
    }
}
