//! Two-phase photo search.
//!
//! Phase 1 matches the term against indexed metadata (filename, title,
//! description) ordered by recency. Phase 2 runs only with whatever budget
//! phase 1 left over: it decodes each remaining candidate's OCR blob
//! through the archive walker, decompressor, and word scanner, and
//! substring-matches the reconstructed text. The phases share one result
//! budget and one set of already-matched ids; outputs are concatenated with
//! no cross-phase re-ranking.
//!
//! Everything here is synchronous and allocation-local: each call receives
//! candidate buffers from the data-access layer and returns owned hits.

use std::collections::HashSet;

use crate::archive;
use crate::decompress;
use crate::models::{Candidate, MatchField, SearchHit};
use crate::ocr::{self, ScanRules};

/// Characters of context kept on each side of an OCR snippet match.
const SNIPPET_CONTEXT: usize = 30;

/// Maximum length of a metadata context excerpt.
const EXCERPT_LEN: usize = 100;

/// Archive field holding the compressed recognition payload.
pub const OCR_PAYLOAD_FIELD: &str = "kCROutputRegionData";

/// Search candidates with a shared result budget across both phases.
pub fn search(
    candidates: &[Candidate],
    term: &str,
    budget: usize,
    rules: &ScanRules,
) -> Vec<SearchHit> {
    search_with(candidates, term, budget, |c| {
        c.ocr_blob.as_deref().and_then(|blob| ocr_text(blob, rules))
    })
}

/// As [`search`], but with an injectable OCR decode step.
///
/// The decode function is only invoked during phase 2, and never once the
/// budget is exhausted — the data-access layer relies on that to keep blob
/// scanning bounded.
pub fn search_with<F>(
    candidates: &[Candidate],
    term: &str,
    budget: usize,
    mut ocr_text_fn: F,
) -> Vec<SearchHit>
where
    F: FnMut(&Candidate) -> Option<String>,
{
    let mut hits: Vec<SearchHit> = Vec::new();
    let mut seen: HashSet<i64> = HashSet::new();

    // Phase 1: metadata, most recent first.
    let mut ordered: Vec<&Candidate> = candidates.iter().collect();
    ordered.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.label.cmp(&b.label))
            .then_with(|| a.id.cmp(&b.id))
    });

    for candidate in ordered {
        if hits.len() >= budget {
            break;
        }
        let Some((field, snippet)) = metadata_match(candidate, term) else {
            continue;
        };
        seen.insert(candidate.id);
        hits.push(SearchHit {
            id: candidate.id,
            label: candidate.label.clone(),
            timestamp: candidate.timestamp,
            match_field: field,
            snippet,
        });
    }

    // Phase 2: OCR scan over candidates the metadata phase didn't claim,
    // consuming only the remaining budget.
    if hits.len() < budget {
        for candidate in candidates {
            if hits.len() >= budget {
                break;
            }
            if seen.contains(&candidate.id) {
                continue;
            }
            let Some(text) = ocr_text_fn(candidate) else {
                continue;
            };
            let Some(pos) = find_ci(&text, term) else {
                continue;
            };
            hits.push(SearchHit {
                id: candidate.id,
                label: candidate.label.clone(),
                timestamp: candidate.timestamp,
                match_field: MatchField::Ocr,
                snippet: make_snippet(&text, pos, term.chars().count()),
            });
        }
    }

    hits
}

/// Reconstruct searchable text from a raw character-recognition blob.
///
/// Walks the keyed archive to the compressed payload, inflates it, and
/// space-joins the recovered word tokens. `None` when any stage comes up
/// empty — an undecodable blob is a non-match, never an error.
pub fn ocr_text(blob: &[u8], rules: &ScanRules) -> Option<String> {
    let payload = archive::find_compressed_payload(blob, OCR_PAYLOAD_FIELD)?;
    let expanded = decompress::decompress(&payload);
    let words = ocr::extract_words(&expanded, rules);
    if words.is_empty() {
        None
    } else {
        Some(ocr::join_words(&words))
    }
}

/// Match one candidate's metadata fields against the term.
///
/// Description takes precedence over title over filename when several
/// fields match; non-filename matches carry a clamped excerpt of the
/// matching field.
fn metadata_match(candidate: &Candidate, term: &str) -> Option<(MatchField, String)> {
    if let Some(desc) = candidate.description.as_deref() {
        if find_ci(desc, term).is_some() {
            return Some((MatchField::Description, excerpt(desc)));
        }
    }
    if let Some(title) = candidate.title.as_deref() {
        if find_ci(title, term).is_some() {
            return Some((MatchField::Title, excerpt(title)));
        }
    }
    if find_ci(&candidate.label, term).is_some() {
        return Some((MatchField::Filename, String::new()));
    }
    None
}

/// First `EXCERPT_LEN` characters of a metadata field.
fn excerpt(field: &str) -> String {
    field.chars().take(EXCERPT_LEN).collect()
}

/// ASCII case-insensitive substring search, returning the character index
/// of the first match. An empty needle matches at position zero.
pub fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().map(|c| c.to_ascii_lowercase()).collect();
    if needle.is_empty() {
        return Some(0);
    }
    let hay: Vec<char> = haystack.chars().map(|c| c.to_ascii_lowercase()).collect();
    if needle.len() > hay.len() {
        return None;
    }
    hay.windows(needle.len()).position(|w| w == needle.as_slice())
}

/// Context window of ±30 characters around a match, clamped to the text,
/// newlines collapsed, with ellipsis markers on clamped-away edges.
pub fn make_snippet(text: &str, match_start: usize, term_len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let start = match_start.saturating_sub(SNIPPET_CONTEXT);
    let end = (match_start + term_len + SNIPPET_CONTEXT).min(chars.len());

    let window: String = chars[start..end]
        .iter()
        .map(|&c| if c == '\n' { ' ' } else { c })
        .collect();
    let mut snippet = window.trim().to_string();

    if start > 0 {
        snippet = format!("...{snippet}");
    }
    if end < chars.len() {
        snippet.push_str("...");
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candidate(id: i64, label: &str, day: u32) -> Candidate {
        Candidate {
            id,
            label: label.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).single(),
            title: None,
            description: None,
            ocr_blob: None,
        }
    }

    fn with_blob(mut c: Candidate, text: &str) -> Candidate {
        // The instrumented decode closures in these tests read the blob as
        // UTF-8 directly; the real pipeline is covered in ocr_text tests
        // and the integration suite.
        c.ocr_blob = Some(text.as_bytes().to_vec());
        c
    }

    fn utf8_decode(c: &Candidate) -> Option<String> {
        c.ocr_blob
            .as_deref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    #[test]
    fn phase_one_hits_precede_phase_two() {
        let candidates = vec![
            candidate(1, "receipt.heic", 3),
            with_blob(candidate(2, "img_0001.heic", 2), "total receipt due"),
        ];
        let hits = search_with(&candidates, "receipt", 10, utf8_decode);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, 1);
        assert_eq!(hits[0].match_field, MatchField::Filename);
        assert_eq!(hits[1].id, 2);
        assert_eq!(hits[1].match_field, MatchField::Ocr);
    }

    #[test]
    fn metadata_phase_orders_by_recency_then_label() {
        let candidates = vec![
            candidate(1, "b_cat.heic", 1),
            candidate(2, "a_cat.heic", 1),
            candidate(3, "z_cat.heic", 9),
        ];
        let hits = search_with(&candidates, "cat", 10, |_| None);
        let labels: Vec<&str> = hits.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["z_cat.heic", "a_cat.heic", "b_cat.heic"]);
    }

    #[test]
    fn ocr_phase_runs_with_remaining_budget_only() {
        let mut candidates: Vec<Candidate> = (0..5)
            .map(|i| candidate(i, &format!("dog_{i}.heic"), 5))
            .collect();
        for i in 0..10 {
            candidates.push(with_blob(
                candidate(100 + i, &format!("img_{i}.heic"), 4),
                "a dog in the park",
            ));
        }
        let hits = search_with(&candidates, "dog", 10, utf8_decode);
        assert_eq!(hits.len(), 10);
        assert_eq!(
            hits.iter()
                .filter(|h| h.match_field == MatchField::Ocr)
                .count(),
            5
        );
    }

    #[test]
    fn ocr_phase_skipped_when_metadata_fills_budget() {
        let mut candidates: Vec<Candidate> = (0..4)
            .map(|i| candidate(i, &format!("trip_{i}.heic"), 2))
            .collect();
        candidates.push(with_blob(candidate(50, "img.heic", 1), "trip itinerary"));

        let mut decode_calls = 0usize;
        let hits = search_with(&candidates, "trip", 3, |c| {
            decode_calls += 1;
            utf8_decode(c)
        });
        assert_eq!(hits.len(), 3);
        assert_eq!(decode_calls, 0, "no blob scans once the budget is spent");
    }

    #[test]
    fn ocr_phase_never_rescans_metadata_hits() {
        let candidates = vec![with_blob(
            candidate(7, "beach.heic", 1),
            "beach sunset text",
        )];
        let mut decoded_ids: Vec<i64> = Vec::new();
        let hits = search_with(&candidates, "beach", 10, |c| {
            decoded_ids.push(c.id);
            utf8_decode(c)
        });
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].match_field, MatchField::Filename);
        assert!(decoded_ids.is_empty());
    }

    #[test]
    fn ocr_phase_stops_decoding_at_budget() {
        let candidates: Vec<Candidate> = (0..10)
            .map(|i| with_blob(candidate(i, &format!("img_{i}.heic"), 1), "wifi password"))
            .collect();
        let mut decode_calls = 0usize;
        let hits = search_with(&candidates, "wifi", 3, |c| {
            decode_calls += 1;
            utf8_decode(c)
        });
        assert_eq!(hits.len(), 3);
        assert_eq!(decode_calls, 3);
    }

    #[test]
    fn zero_budget_returns_nothing() {
        let candidates = vec![candidate(1, "match.heic", 1)];
        assert!(search_with(&candidates, "match", 0, |_| None).is_empty());
    }

    #[test]
    fn description_outranks_title_outranks_filename() {
        let mut c = candidate(1, "kayak.heic", 1);
        c.title = Some("kayak trip".to_string());
        c.description = Some("two kayaks on the lake".to_string());
        let hits = search_with(&[c], "kayak", 10, |_| None);
        assert_eq!(hits[0].match_field, MatchField::Description);
        assert_eq!(hits[0].snippet, "two kayaks on the lake");
    }

    #[test]
    fn excerpt_is_clamped_to_one_hundred_chars() {
        let mut c = candidate(1, "img.heic", 1);
        c.description = Some(format!("needle {}", "pad ".repeat(60)));
        let hits = search_with(&[c], "needle", 10, |_| None);
        assert_eq!(hits[0].snippet.chars().count(), 100);
    }

    #[test]
    fn find_ci_is_case_insensitive() {
        assert_eq!(find_ci("The Quick Brown Fox", "qUiCk"), Some(4));
        assert_eq!(find_ci("no match here", "zebra"), None);
    }

    #[test]
    fn snippet_boundary_arithmetic_is_exact() {
        let text = format!("{}fox{}", "x".repeat(40), "y".repeat(157));
        assert_eq!(text.chars().count(), 200);
        let pos = find_ci(&text, "fox").unwrap();
        assert_eq!(pos, 40);
        let snippet = make_snippet(&text, pos, 3);
        let expected = format!("...{}fox{}...", "x".repeat(30), "y".repeat(30));
        assert_eq!(snippet, expected);
    }

    #[test]
    fn snippet_at_text_start_has_no_leading_ellipsis() {
        let text = format!("fox{}", "y".repeat(100));
        let snippet = make_snippet(&text, 0, 3);
        assert!(snippet.starts_with("fox"));
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn snippet_collapses_newlines_and_trims() {
        let text = "word one\nword two\nfox\nword three";
        let pos = find_ci(text, "fox").unwrap();
        let snippet = make_snippet(text, pos, 3);
        assert!(!snippet.contains('\n'));
        assert_eq!(snippet, "word one word two fox word three");
    }
}
