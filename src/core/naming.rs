//! Canonical filename model.
//!
//! Every file a run produces or expects follows one positional grammar:
//!
//! ```text
//! [lang<k> ][YYYYMMDD ]<title> [<item-id>][.f<code>].<ext>[.bk<n>]
//! ```
//!
//! - `lang<k> `: final name of one language when several exist (`k` is the
//!   ordinal plus one).
//! - `YYYYMMDD `: day the run downloaded the file.
//! - `.f<code>`: video-only file at a given format code.
//! - `.bk<n>`: staged copy of the video-only file for ordinal `n`.
//!
//! Nothing here touches the filesystem.

use crate::models::media::MediaItemId;
use crate::Result;
use chrono::NaiveDate;
use std::fmt;

/// Extensions a downloaded media file may carry.
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "webm", "m4a", "mov", "flv", "3gp", "avi", "ts", "mp3", "opus",
];

/// Suffixes the download tool leaves on unfinished files.
const PARTIAL_SUFFIXES: &[&str] = &["part", "ytdl", "temp"];

/// Date format of the date prefix.
const DATE_FORMAT: &str = "%Y%m%d";

/// Check if an extension is an accepted media extension.
pub fn is_media_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    MEDIA_EXTENSIONS.contains(&ext_lower.as_str())
}

/// A filename decomposed according to the naming grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalName {
    language: Option<u32>,
    date: Option<NaiveDate>,
    title: String,
    item_id: MediaItemId,
    format_code: Option<String>,
    extension: String,
    backup: Option<u32>,
}

impl CanonicalName {
    /// Build a plain name with no prefixes or markers.
    pub fn new(title: &str, item_id: MediaItemId, extension: &str) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(crate::Error::ParseError("title is empty".to_string()));
        }
        if !is_media_extension(extension) {
            return Err(crate::Error::ParseError(format!(
                "unsupported extension '{}'",
                extension
            )));
        }
        Ok(Self {
            language: None,
            date: None,
            title: title.to_string(),
            item_id,
            format_code: None,
            extension: extension.to_string(),
            backup: None,
        })
    }

    /// Parse a filename.
    pub fn parse(filename: &str) -> Result<Self> {
        let fail = |why: &str| crate::Error::ParseError(format!("{}: {}", filename, why));

        // Backup marker
        let (rest, backup) = match split_backup_marker(filename) {
            Some((rest, n)) => (rest, Some(n)),
            None => (filename, None),
        };

        // Extension
        let (rest, extension) = rest.rsplit_once('.').ok_or_else(|| fail("no extension"))?;
        if !is_media_extension(extension) {
            return Err(fail(&format!("unsupported extension '{}'", extension)));
        }

        // Bracketed item id and optional format marker
        let close = rest.rfind(']').ok_or_else(|| fail("no bracketed item id"))?;
        let after = &rest[close + 1..];
        let format_code = if after.is_empty() {
            None
        } else {
            let code = after
                .strip_prefix(".f")
                .filter(|c| is_format_code(c))
                .ok_or_else(|| fail(&format!("unexpected text '{}' after item id", after)))?;
            Some(code.to_string())
        };

        let open = rest[..close].rfind('[').ok_or_else(|| fail("no bracketed item id"))?;
        let item_id = MediaItemId::parse(&rest[open + 1..close])
            .map_err(|e| fail(&e.to_string()))?;

        // Prefixes and title
        let mut head = rest[..open].trim_end();
        let language = match strip_language_prefix(head) {
            Some((k, remaining)) => {
                head = remaining;
                Some(k)
            }
            None => None,
        };
        let date = match strip_date_prefix(head) {
            Some((d, remaining)) => {
                head = remaining;
                Some(d)
            }
            None => None,
        };

        if head.is_empty() {
            return Err(fail("empty title"));
        }

        Ok(Self {
            language,
            date,
            title: head.to_string(),
            item_id,
            format_code,
            extension: extension.to_string(),
            backup,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn item_id(&self) -> &MediaItemId {
        &self.item_id
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn format_code(&self) -> Option<&str> {
        self.format_code.as_deref()
    }

    pub fn backup(&self) -> Option<u32> {
        self.backup
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Language ordinal encoded in the `lang<k>` prefix.
    pub fn language(&self) -> Option<u32> {
        self.language
    }

    /// No language prefix, format marker or backup marker.
    pub fn is_fresh(&self) -> bool {
        self.language.is_none() && self.format_code.is_none() && self.backup.is_none()
    }

    /// Whether any transient marker is present.
    pub fn has_transient_marker(&self) -> bool {
        self.format_code.is_some() || self.backup.is_some()
    }

    /// Insert the format marker before the extension.
    ///
    /// Fails when a different format marker is already present.
    pub fn with_format_marker(&self, code: &str) -> Result<Self> {
        if !is_format_code(code) {
            return Err(crate::Error::ParseError(format!(
                "invalid format code '{}'",
                code
            )));
        }
        if let Some(existing) = &self.format_code {
            if existing != code {
                return Err(crate::Error::ConflictingFormatMarker {
                    existing: existing.clone(),
                    requested: code.to_string(),
                });
            }
        }
        Ok(Self {
            format_code: Some(code.to_string()),
            ..self.clone()
        })
    }

    /// Remove the format marker; what the tool names a merged output.
    pub fn without_format_marker(&self) -> Self {
        Self {
            format_code: None,
            ..self.clone()
        }
    }

    /// Append the backup marker after the extension.
    pub fn with_backup_marker(&self, n: u32) -> Result<Self> {
        if self.format_code.is_none() {
            return Err(crate::Error::MissingFormatMarker(self.to_string()));
        }
        Ok(Self {
            backup: Some(n),
            ..self.clone()
        })
    }

    pub fn without_backup_marker(&self) -> Self {
        Self {
            backup: None,
            ..self.clone()
        }
    }

    /// Prepend `lang<ordinal + 1> ` to the title.
    pub fn with_language_prefix(&self, ordinal: u32) -> Self {
        Self {
            language: Some(ordinal),
            ..self.clone()
        }
    }

    pub fn with_date(&self, date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..self.clone()
        }
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ordinal) = self.language {
            write!(f, "lang{} ", ordinal + 1)?;
        }
        if let Some(date) = self.date {
            write!(f, "{} ", date.format(DATE_FORMAT))?;
        }
        write!(f, "{} [{}]", self.title, self.item_id)?;
        if let Some(code) = &self.format_code {
            write!(f, ".f{}", code)?;
        }
        write!(f, ".{}", self.extension)?;
        if let Some(n) = self.backup {
            write!(f, ".bk{}", n)?;
        }
        Ok(())
    }
}

/// Output template for the download tool, so its files land on the grammar.
pub fn download_template(date: NaiveDate) -> String {
    format!("{} %(title)s [%(id)s].%(ext)s", date.format(DATE_FORMAT))
}

/// Whether a filename looks like a media file, including partial downloads
/// and staged backup copies.
pub fn is_media_artifact(filename: &str) -> bool {
    let mut name = filename;
    if let Some((rest, _)) = split_backup_marker(name) {
        name = rest;
    }
    if let Some((rest, ext)) = name.rsplit_once('.') {
        if PARTIAL_SUFFIXES.contains(&ext.to_lowercase().as_str()) {
            name = rest;
        }
    }
    match name.rsplit_once('.') {
        Some((_, ext)) => is_media_extension(ext),
        None => false,
    }
}

/// Date prefix of a filename, looking past an optional language prefix.
///
/// Works on names the full grammar rejects, such as partial downloads.
pub fn leading_date(filename: &str) -> Option<NaiveDate> {
    let head = match strip_language_prefix(filename) {
        Some((_, rest)) => rest,
        None => filename,
    };
    strip_date_prefix(head).map(|(date, _)| date)
}

fn is_format_code(code: &str) -> bool {
    !code.is_empty()
        && !code.starts_with('-')
        && !code.ends_with('-')
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Split `<rest>.bk<n>`.
fn split_backup_marker(name: &str) -> Option<(&str, u32)> {
    let (rest, marker) = name.rsplit_once(".bk")?;
    if marker.is_empty() || !marker.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    marker.parse().ok().map(|n| (rest, n))
}

/// Split `lang<k> <rest>`, returning the ordinal `k - 1`.
fn strip_language_prefix(head: &str) -> Option<(u32, &str)> {
    let rest = head.strip_prefix("lang")?;
    let (digits, rest) = rest.split_once(' ')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let k: u32 = digits.parse().ok()?;
    let ordinal = k.checked_sub(1)?;
    Some((ordinal, rest))
}

/// Split `YYYYMMDD <rest>`.
fn strip_date_prefix(head: &str) -> Option<(NaiveDate, &str)> {
    let (digits, rest) = head.split_once(' ')?;
    if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let date = NaiveDate::parse_from_str(digits, DATE_FORMAT).ok()?;
    Some((date, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_plain_name() {
        let name = CanonicalName::parse("My Video [abcABC12345].mp4").unwrap();
        assert_eq!(name.title(), "My Video");
        assert_eq!(name.item_id().as_str(), "abcABC12345");
        assert_eq!(name.extension(), "mp4");
        assert!(name.is_fresh());
        assert_eq!(name.date(), None);
    }

    #[test]
    fn test_parse_full_grammar() {
        let name =
            CanonicalName::parse("lang2 20261018 Some [Title] here [abcABC12345].f160.mp4.bk3")
                .unwrap();
        assert_eq!(name.language(), Some(1));
        assert_eq!(name.date(), Some(date(2026, 10, 18)));
        assert_eq!(name.title(), "Some [Title] here");
        assert_eq!(name.format_code(), Some("160"));
        assert_eq!(name.backup(), Some(3));
        assert_eq!(
            name.to_string(),
            "lang2 20261018 Some [Title] here [abcABC12345].f160.mp4.bk3"
        );
    }

    #[test]
    fn test_parse_rejects_bad_names() {
        assert!(CanonicalName::parse("video [abcABC1234].mp4").is_err());
        assert!(CanonicalName::parse("video [abcABC12345].txt").is_err());
        assert!(CanonicalName::parse("video.mp4").is_err());
        assert!(CanonicalName::parse(" [abcABC12345].mp4").is_err());
        assert!(CanonicalName::parse("video [abcABC12345]junk.mp4").is_err());
    }

    #[test]
    fn test_format_marker_conflict() {
        let name = CanonicalName::parse("v [abcABC12345].mp4").unwrap();
        let marked = name.with_format_marker("160").unwrap();
        assert_eq!(marked.to_string(), "v [abcABC12345].f160.mp4");
        assert!(marked.with_format_marker("160").is_ok());
        assert!(matches!(
            marked.with_format_marker("278"),
            Err(crate::Error::ConflictingFormatMarker { .. })
        ));
    }

    #[test]
    fn test_backup_marker_requires_format_marker() {
        let name = CanonicalName::parse("v [abcABC12345].mp4").unwrap();
        assert!(matches!(
            name.with_backup_marker(1),
            Err(crate::Error::MissingFormatMarker(_))
        ));
    }

    #[test]
    fn test_language_prefix_is_one_based() {
        let name = CanonicalName::parse("20261019 v [abcABC12345].mp4").unwrap();
        assert_eq!(
            name.with_language_prefix(0).to_string(),
            "lang1 20261019 v [abcABC12345].mp4"
        );
        let unprefixed = CanonicalName::parse("lang0 v [abcABC12345].mp4").unwrap();
        assert_eq!(unprefixed.language(), None);
        assert_eq!(unprefixed.title(), "lang0 v");
    }

    #[test]
    fn test_media_artifacts() {
        assert!(is_media_artifact("x [abcABC12345].mp4"));
        assert!(is_media_artifact("x [abcABC12345].f160.mp4.bk2"));
        assert!(is_media_artifact("x [abcABC12345].f233-0.m4a.part"));
        assert!(!is_media_artifact("notes.txt"));
        assert!(!is_media_artifact("README"));
    }

    #[test]
    fn test_leading_date() {
        assert_eq!(
            leading_date("20261019 x [abcABC12345].mp4.part"),
            Some(date(2026, 10, 19))
        );
        assert_eq!(
            leading_date("lang3 20250101 x [abcABC12345].mp4"),
            Some(date(2025, 1, 1))
        );
        assert_eq!(leading_date("x [abcABC12345].mp4"), None);
        assert_eq!(leading_date("20261399 x.mp4"), None);
    }

    #[test]
    fn test_download_template() {
        assert_eq!(
            download_template(date(2026, 10, 19)),
            "20261019 %(title)s [%(id)s].%(ext)s"
        );
    }
}
