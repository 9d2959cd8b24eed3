//! Core data models used throughout Shoebox.
//!
//! These types represent the candidate records flowing out of the library
//! databases and the search hits flowing back to the CLI.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Which field of a candidate matched the search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Filename,
    Title,
    Description,
    Ocr,
}

impl MatchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchField::Filename => "filename",
            MatchField::Title => "title",
            MatchField::Description => "description",
            MatchField::Ocr => "ocr",
        }
    }
}

/// One photo row as handed to the search orchestrator.
///
/// Metadata fields come straight from the asset tables; `ocr_blob` is the
/// raw character-recognition column, decoded lazily and only if the
/// metadata phase leaves budget over.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: i64,
    pub label: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub ocr_blob: Option<Vec<u8>>,
}

/// One matched entity. Constructed once per match, immutable, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: i64,
    pub label: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub match_field: MatchField,
    /// Context excerpt around the match; empty for plain filename matches.
    pub snippet: String,
}

/// A note row from the Notes store listing queries.
#[derive(Debug, Clone, Serialize)]
pub struct NoteSummary {
    pub id: i64,
    pub title: String,
    pub modified: Option<DateTime<Utc>>,
}

/// A full note with its recovered body text.
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub title: String,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub body: String,
}
