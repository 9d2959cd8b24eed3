//! Marker-anchored word recovery from decompressed OCR payloads.
//!
//! The Photos character-recognition payload lays out one fixed-pattern
//! binary record per recognized word. Each record starts with a class-name
//! marker; the word itself is the first printable-ASCII token shortly after
//! it. We scan marker to marker, read a bounded window behind each, and
//! keep the first token that doesn't look like structural noise (UUIDs,
//! key-path strings, binary artifacts).

use std::collections::HashSet;

/// Scan parameters for one payload variant.
///
/// Fixed per data source rather than user-configurable; injected so the
/// scanner can be pointed at other record layouts and tested in isolation.
#[derive(Debug, Clone)]
pub struct ScanRules {
    /// Record marker preceding each word.
    pub marker: Vec<u8>,
    /// Bytes to inspect after each marker occurrence.
    pub window: usize,
    /// Tokens at or above this length are rejected as noise.
    pub max_token_len: usize,
    /// Tokens starting with any of these prefixes are rejected.
    pub noise_prefixes: Vec<String>,
}

impl Default for ScanRules {
    fn default() -> Self {
        Self {
            marker: b"CRWordOutputRegion\x00".to_vec(),
            window: 80,
            max_token_len: 100,
            noise_prefixes: vec!["k:@".into(), "~A_".into(), "@~A".into()],
        }
    }
}

/// Extract word tokens from a decompressed OCR payload.
///
/// Tokens are deduplicated by exact value; order of first appearance is
/// preserved. An empty or marker-free payload yields an empty vector.
pub fn extract_words(bytes: &[u8], rules: &ScanRules) -> Vec<String> {
    if rules.marker.is_empty() {
        return Vec::new();
    }

    let mut words = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut start = 0usize;

    while let Some(offset) = find_marker(bytes, &rules.marker, start) {
        let window_start = offset + rules.marker.len();
        let window_end = (window_start + rules.window).min(bytes.len());
        if let Some(token) = first_printable_token(&bytes[window_start..window_end]) {
            if !is_noise(&token, rules) && seen.insert(token.clone()) {
                words.push(token);
            }
        }
        // Advance past the current match so the same location never
        // re-matches.
        start = offset + rules.marker.len();
    }

    words
}

/// Space-join tokens for presentation.
pub fn join_words(words: &[String]) -> String {
    words.join(" ")
}

fn find_marker(haystack: &[u8], marker: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() || marker.len() > haystack.len() - from {
        return None;
    }
    haystack[from..]
        .windows(marker.len())
        .position(|w| w == marker)
        .map(|pos| from + pos)
}

/// First maximal run of printable ASCII (0x20–0x7e) of length >= 2.
fn first_printable_token(window: &[u8]) -> Option<String> {
    let mut run_start = None;
    for (i, &b) in window.iter().enumerate() {
        if (0x20..=0x7e).contains(&b) {
            if run_start.is_none() {
                run_start = Some(i);
            }
        } else if let Some(s) = run_start.take() {
            if i - s >= 2 {
                return Some(String::from_utf8_lossy(&window[s..i]).into_owned());
            }
        }
    }
    if let Some(s) = run_start {
        if window.len() - s >= 2 {
            return Some(String::from_utf8_lossy(&window[s..]).into_owned());
        }
    }
    None
}

fn is_noise(token: &str, rules: &ScanRules) -> bool {
    if token.chars().count() >= rules.max_token_len {
        return true;
    }
    if rules.noise_prefixes.iter().any(|p| token.starts_with(p.as_str())) {
        return true;
    }
    has_uuid_prefix(token)
}

/// Matches the `^[A-F0-9]{8}-` shape of an archived-object UUID.
fn has_uuid_prefix(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() > 8
        && bytes[8] == b'-'
        && bytes[..8]
            .iter()
            .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &[u8] = b"CRWordOutputRegion\x00";

    fn payload(words: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        for word in words {
            out.extend_from_slice(MARKER);
            // Length prefix and flag bytes as seen in real records.
            out.extend_from_slice(&[0x12, word.len() as u8]);
            out.extend_from_slice(word.as_bytes());
            out.extend_from_slice(&[0x01, 0x02, 0x03]);
        }
        out
    }

    fn extract(bytes: &[u8]) -> Vec<String> {
        extract_words(bytes, &ScanRules::default())
    }

    #[test]
    fn recovers_words_in_order_deduplicated() {
        let bytes = payload(&["Hello", "World", "Hello"]);
        assert_eq!(extract(&bytes), vec!["Hello", "World"]);
    }

    #[test]
    fn empty_and_markerless_payloads_yield_nothing() {
        assert!(extract(b"").is_empty());
        assert!(extract(b"no structural markers anywhere in here").is_empty());
    }

    #[test]
    fn marker_with_no_printable_window_is_skipped() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MARKER);
        // Fill the whole 80-byte window with unprintables so this
        // occurrence yields nothing, then continue with a real record.
        bytes.extend_from_slice(&[0x00; 80]);
        bytes.extend_from_slice(&payload(&["Visible"]));
        assert_eq!(extract(&bytes), vec!["Visible"]);
    }

    #[test]
    fn uuid_prefixed_tokens_are_rejected() {
        let bytes = payload(&["DEADBEEF-1234-5678", "Keep"]);
        assert_eq!(extract(&bytes), vec!["Keep"]);
    }

    #[test]
    fn lowercase_hex_is_not_a_uuid_prefix() {
        let bytes = payload(&["deadbeef-word"]);
        assert_eq!(extract(&bytes), vec!["deadbeef-word"]);
    }

    #[test]
    fn noise_prefixes_are_rejected() {
        let bytes = payload(&["k:@anchor", "~A_field", "@~Aother", "Real"]);
        assert_eq!(extract(&bytes), vec!["Real"]);
    }

    #[test]
    fn overlong_tokens_are_rejected() {
        let long = "x".repeat(100);
        let bytes = payload(&[long.as_str(), "ok"]);
        assert_eq!(extract(&bytes), vec!["ok"]);
    }

    #[test]
    fn window_is_bounded() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MARKER);
        // 80 unprintable bytes, then text beyond the window.
        bytes.extend_from_slice(&[0x00; 80]);
        bytes.extend_from_slice(b"OutOfReach");
        assert!(extract(&bytes).is_empty());
    }

    #[test]
    fn truncated_trailing_record_still_yields_token() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MARKER);
        bytes.extend_from_slice(b"\x12\x04Stop");
        assert_eq!(extract(&bytes), vec!["Stop"]);
    }

    #[test]
    fn join_words_space_separates() {
        let words = vec!["EXIT".to_string(), "only".to_string()];
        assert_eq!(join_words(&words), "EXIT only");
    }
}
