//! Request resolution.
//!
//! Turns a command-line draft into an [`AcquisitionRequest`]. The format
//! listing is only fetched when a code or the language map is missing, and
//! explicit values always win over what the listing suggests.

use crate::core::listing;
use crate::core::sufix::SufixMap;
use crate::models::media::{FormatKind, FormatListing, MediaItemId};
use crate::models::request::{AcquisitionRequest, RequestDraft};
use crate::services::ytdlp::MediaTool;
use crate::Result;

/// Resolve a draft, consulting the tool's format listing only if needed.
pub async fn resolve<T: MediaTool>(tool: &T, draft: RequestDraft) -> Result<AcquisitionRequest> {
    let item_id = MediaItemId::from_input(&draft.item)?;

    let listing = if draft.needs_listing() {
        tracing::info!("Fetching format listing for {}", item_id);
        let text = tool.list_formats(&item_id).await?;
        let listing = listing::classify(&text);
        if let Some(listed) = listing::extract_item_id(&text) {
            if listed != item_id {
                tracing::warn!("Listing reports item {} but {} was requested", listed, item_id);
            }
        }
        Some(listing)
    } else {
        None
    };

    resolve_with_listing(item_id, draft, listing.as_ref())
}

/// Resolve a draft against an already classified listing.
pub fn resolve_with_listing(
    item_id: MediaItemId,
    draft: RequestDraft,
    listing: Option<&FormatListing>,
) -> Result<AcquisitionRequest> {
    let (video_code, video_kind) = match draft.video_code {
        Some(code) => {
            let kind = listing
                .and_then(|l| l.entries.iter().find(|e| e.id == code).map(|e| e.kind))
                .or_else(|| listing::kind_of(&code))
                .unwrap_or(FormatKind::VideoOnly);
            (code, kind)
        }
        None => {
            let listing = listing.ok_or_else(|| {
                crate::Error::InvalidFormatCode("no video code given and no listing".to_string())
            })?;
            match (&listing.video_code, listing.video_kind) {
                (Some(code), Some(kind)) => (code.clone(), kind),
                _ => {
                    return Err(crate::Error::FormatUnavailable(
                        "no known video format in listing".to_string(),
                    ))
                }
            }
        }
    };

    let audio_base_code = match draft.audio_base_code {
        Some(code) => code,
        None => listing
            .and_then(|l| l.audio_code.clone())
            .ok_or_else(|| {
                crate::Error::FormatUnavailable("no known audio format in listing".to_string())
            })?,
    };

    let languages = match draft.languages {
        Some(spec) => SufixMap::parse_strict(&spec)?,
        None => SufixMap::default(),
    };

    // A dubbed item cannot be merged with the bare audio base
    if languages.is_empty() && video_kind != FormatKind::AlreadyMerged {
        if let Some(l) = listing.filter(|l| l.is_dubbed) {
            return Err(crate::Error::InvalidLanguageMap(format!(
                "item is dubbed ({} audio tracks); pass --langs, e.g. --langs \"{}\"",
                l.audio_ordinals.len(),
                suggested_languages(l)
            )));
        }
    }

    Ok(AcquisitionRequest {
        item_id,
        working_directory: draft.working_directory,
        video_code,
        video_kind,
        audio_base_code,
        languages,
    })
}

/// Language spec built from the tags found in a listing.
///
/// Ordinals without a tag are shown as `??` so the suggestion never parses
/// silently into a guessed mapping.
pub fn suggested_languages(listing: &FormatListing) -> String {
    listing
        .audio_ordinals
        .iter()
        .map(|ordinal| match listing.languages.get(ordinal) {
            Some(code) => format!("{}:{}", ordinal, code),
            None => format!("{}:??", ordinal),
        })
        .collect::<Vec<_>>()
        .join(",")
}
