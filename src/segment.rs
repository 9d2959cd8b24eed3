//! Printable-run text recovery for undocumented record formats.
//!
//! A Notes body blob is a protobuf-like record with no public schema. After
//! decompression the actual note text sits in the first large stretch of
//! readable characters, surrounded by field tags, length prefixes, and
//! attachment metadata. Rather than parse the record, this module splits the
//! lossily-decoded stream into maximal printable runs, drops the ones that
//! look like serialization noise, and stitches the leading plausible runs
//! back into a text block.
//!
//! This is heuristic recovery, not a decoder: deterministic for identical
//! input, but with no precision/recall guarantee.

/// Tunable thresholds for run filtering.
///
/// The defaults were arrived at empirically against real note blobs; they
/// are policy, not format facts, so callers can adjust them per data source.
#[derive(Debug, Clone)]
pub struct RunPolicy {
    /// Minimum trimmed length for a run to survive the first filter.
    pub min_run_len: usize,
    /// Runs shorter than this are dropped unless they contain a newline.
    pub min_keep_len: usize,
    /// Minimum fraction of alphabetic/whitespace/basic-punctuation
    /// characters for a run to count as body text.
    pub min_text_ratio: f64,
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            min_run_len: 3,
            min_keep_len: 5,
            min_text_ratio: 0.5,
        }
    }
}

/// Punctuation that still reads as prose when computing the text ratio.
const BASIC_PUNCTUATION: &str = ".,;:!?-'\"()";

/// Recover the most plausible text block from a decoded blob.
///
/// Never fails: undecodable byte sequences are replaced lossily and inputs
/// with no recoverable text yield an empty string.
pub fn extract_text(bytes: &[u8], policy: &RunPolicy) -> String {
    let decoded = String::from_utf8_lossy(bytes);

    // Pass 1: split into maximal printable runs, keeping only runs that
    // contain at least two consecutive ASCII letters (drops short binary
    // noise that happens to decode as printable).
    let mut runs: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in decoded.chars() {
        if is_run_char(c) {
            current.push(c);
        } else {
            close_run(&mut current, &mut runs, policy);
        }
    }
    close_run(&mut current, &mut runs, policy);

    // Pass 2: tiny fragments are rarely body text even when alphabetic.
    let content_runs: Vec<&String> = runs
        .iter()
        .filter(|r| r.chars().count() >= policy.min_keep_len || r.contains('\n'))
        .collect();

    // Pass 3: accumulate leading runs while they read as prose. The first
    // degraded run after any accumulated content marks the boundary where
    // body text gives way to serialization artifacts.
    let mut result: Vec<&str> = Vec::new();
    for run in content_runs {
        if text_ratio(run) > policy.min_text_ratio {
            result.push(run);
        } else if !result.is_empty() {
            break;
        }
    }

    result.join("\n")
}

/// Characters allowed inside a run: printable plus newline and tab.
fn is_run_char(c: char) -> bool {
    c == '\n' || c == '\t' || !c.is_control()
}

fn close_run(current: &mut String, runs: &mut Vec<String>, policy: &RunPolicy) {
    if current.is_empty() {
        return;
    }
    let trimmed = current.trim();
    if trimmed.chars().count() >= policy.min_run_len && has_letter_pair(trimmed) {
        runs.push(trimmed.to_string());
    }
    current.clear();
}

/// True if the run contains two consecutive ASCII letters.
fn has_letter_pair(s: &str) -> bool {
    let mut prev_alpha = false;
    for c in s.chars() {
        let alpha = c.is_ascii_alphabetic();
        if alpha && prev_alpha {
            return true;
        }
        prev_alpha = alpha;
    }
    false
}

/// Fraction of characters that read as prose.
fn text_ratio(s: &str) -> f64 {
    let mut total = 0usize;
    let mut readable = 0usize;
    for c in s.chars() {
        total += 1;
        if c.is_alphabetic() || c.is_whitespace() || BASIC_PUNCTUATION.contains(c) {
            readable += 1;
        }
    }
    readable as f64 / total.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(bytes: &[u8]) -> String {
        extract_text(bytes, &RunPolicy::default())
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(extract(b""), "");
    }

    #[test]
    fn pure_binary_yields_empty_string() {
        let bytes: Vec<u8> = (0u8..8).cycle().take(256).collect();
        assert_eq!(extract(&bytes), "");
    }

    #[test]
    fn recovers_text_between_binary_framing() {
        let mut blob = vec![0x08, 0x00, 0x12, 0x1a];
        blob.extend_from_slice(b"Grocery list\nmilk and eggs");
        blob.extend_from_slice(&[0x1a, 0x05, 0x01]);
        assert_eq!(extract(&blob), "Grocery list\nmilk and eggs");
    }

    #[test]
    fn drops_short_field_name_fragments() {
        let mut blob = Vec::new();
        blob.extend_from_slice(b"id\x00\x01");
        blob.extend_from_slice(b"A full sentence worth keeping around.");
        blob.push(0x00);
        assert_eq!(extract(&blob), "A full sentence worth keeping around.");
    }

    #[test]
    fn stops_at_first_degraded_run() {
        let mut blob = Vec::new();
        blob.extend_from_slice(b"Meeting notes from Tuesday");
        blob.push(0x00);
        // Mostly symbols: below the 0.5 text ratio.
        blob.extend_from_slice(b"{{::}}==[[]]##//aa&&&&");
        blob.push(0x00);
        blob.extend_from_slice(b"trailing readable text never reached");
        blob.push(0x00);
        assert_eq!(extract(&blob), "Meeting notes from Tuesday");
    }

    #[test]
    fn skips_leading_garbage_before_any_content() {
        let mut blob = Vec::new();
        blob.extend_from_slice(b"<<==>>++__--||aa%%%%");
        blob.push(0x00);
        blob.extend_from_slice(b"Actual body text starts here.");
        blob.push(0x00);
        assert_eq!(extract(&blob), "Actual body text starts here.");
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let mut blob = vec![0xff, 0xfe, 0xc0];
        blob.extend_from_slice(b"still readable content here");
        let out = extract(&blob);
        assert!(out.contains("still readable content here"));
    }

    #[test]
    fn deterministic_on_repeated_calls() {
        let blob: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
        assert_eq!(extract(&blob), extract(&blob));
    }

    #[test]
    fn arbitrary_bytes_never_panic() {
        // Cheap deterministic pseudo-random stream.
        let mut state = 0x2545f491u32;
        for len in [0usize, 1, 7, 64, 512, 10_000] {
            let bytes: Vec<u8> = (0..len)
                .map(|_| {
                    state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                    (state >> 24) as u8
                })
                .collect();
            let _ = extract(&bytes);
        }
    }

    #[test]
    fn custom_policy_changes_retention() {
        let mut blob = Vec::new();
        blob.extend_from_slice(b"word");
        blob.push(0x00);
        blob.extend_from_slice(b"a longer readable sentence");
        blob.push(0x00);
        // Default policy drops the 4-char run; a looser one keeps it.
        assert_eq!(extract(&blob), "a longer readable sentence");
        let loose = RunPolicy {
            min_keep_len: 4,
            ..RunPolicy::default()
        };
        assert_eq!(
            extract_text(&blob, &loose),
            "word\na longer readable sentence"
        );
    }
}
