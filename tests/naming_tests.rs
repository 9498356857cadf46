//! Integration tests for the canonical naming grammar.

use chrono::NaiveDate;
use dub_fetch::core::naming::{download_template, CanonicalName};
use dub_fetch::models::media::MediaItemId;

#[test]
fn test_run_renames_follow_the_grammar() {
    let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let id = MediaItemId::parse("a-b_C123456").unwrap();

    let fresh = CanonicalName::new("Episode 1", id, "mp4").unwrap().with_date(date);
    assert_eq!(fresh.to_string(), "20261019 Episode 1 [a-b_C123456].mp4");
    assert!(fresh.is_fresh());

    let video = fresh.with_format_marker("160").unwrap();
    let backup = video.with_backup_marker(2).unwrap();
    assert_eq!(backup.to_string(), "20261019 Episode 1 [a-b_C123456].f160.mp4.bk2");
    assert!(backup.has_transient_marker());
    assert_eq!(backup.without_backup_marker(), video);

    let merged = video.without_format_marker();
    assert_eq!(merged, fresh);
    let final_name = merged.with_language_prefix(2);
    assert_eq!(final_name.to_string(), "lang3 20261019 Episode 1 [a-b_C123456].mp4");
    assert!(!final_name.is_fresh());
    assert!(!final_name.has_transient_marker());
}

#[test]
fn test_parse_what_the_template_produces() {
    let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
    let produced = download_template(date)
        .replace("%(title)s", "Título: [ao vivo]")
        .replace("%(id)s", "abcABC12345")
        .replace("%(ext)s", "webm");

    let name = CanonicalName::parse(&produced).unwrap();
    assert_eq!(name.date(), Some(date));
    assert_eq!(name.title(), "Título: [ao vivo]");
    assert_eq!(name.item_id().as_str(), "abcABC12345");
    assert_eq!(name.extension(), "webm");
    assert_eq!(name.to_string(), produced);
}

#[test]
fn test_item_id_from_urls() {
    for input in [
        "abcABC12345",
        "https://www.youtube.com/watch?v=abcABC12345",
        "https://www.youtube.com/watch?feature=share&v=abcABC12345&t=3",
        "https://youtu.be/abcABC12345?si=xyz",
        "https://www.youtube.com/shorts/abcABC12345",
    ] {
        assert_eq!(
            MediaItemId::from_input(input).unwrap().as_str(),
            "abcABC12345",
            "input: {}",
            input
        );
    }
    assert!(MediaItemId::from_input("https://example.com/video").is_err());
    assert!(MediaItemId::from_input("abc").is_err());
}

/// Deterministic ids covering the whole item id alphabet.
fn generated_ids() -> Vec<MediaItemId> {
    let alphabet: Vec<char> = ('0'..='9')
        .chain('a'..='z')
        .chain('A'..='Z')
        .chain(['-', '_'])
        .collect();
    (0..alphabet.len())
        .step_by(3)
        .map(|offset| {
            let id: String = (0..11)
                .map(|i| alphabet[(offset + i * 7) % alphabet.len()])
                .collect();
            MediaItemId::parse(&id).unwrap()
        })
        .collect()
}

#[test]
fn test_item_id_survives_render_and_parse() {
    let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    for id in generated_ids() {
        let name = CanonicalName::new("Clip [part 2]", id.clone(), "mkv")
            .unwrap()
            .with_date(date);
        let parsed = CanonicalName::parse(&name.to_string()).unwrap();
        assert_eq!(parsed.item_id(), &id);
        assert_eq!(parsed, name);

        let marked = name.with_format_marker("278").unwrap();
        let parsed = CanonicalName::parse(&marked.to_string()).unwrap();
        assert_eq!(parsed.format_code(), Some("278"));
        assert_eq!(parsed.title(), "Clip [part 2]");
        assert_eq!(parsed.extension(), "mkv");
    }
}

#[test]
fn test_backup_marker_round_trip_for_many_ordinals() {
    for id in generated_ids() {
        let video = CanonicalName::new("v", id, "mp4")
            .unwrap()
            .with_format_marker("160")
            .unwrap();
        for n in [0, 1, 2, 9, 10, 42, 999] {
            let backup = video.with_backup_marker(n).unwrap();
            let rendered = backup.to_string();
            assert_eq!(rendered, format!("{}.bk{}", video, n));

            let parsed = CanonicalName::parse(&rendered).unwrap();
            assert_eq!(parsed.backup(), Some(n));
            assert_eq!(parsed.without_backup_marker().to_string(), video.to_string());
        }
    }
}
