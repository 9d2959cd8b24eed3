//! Photos library access.
//!
//! Reads `Photos.sqlite` directly and feeds asset rows into the two-phase
//! search orchestrator: an indexed metadata pass over filename, title, and
//! description, then an OCR pass that decodes the character-recognition
//! blobs for whatever budget remains.
//!
//! Used by the `sbx photos search` CLI command.

use std::collections::HashMap;

use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::models::{Candidate, MatchField, SearchHit};
use crate::search;
use crate::timestamp;

/// Run the two-phase search against the Photos database.
pub async fn search_photos(config: &Config, query: &str, budget: usize) -> Result<Vec<SearchHit>> {
    let pool = db::connect_readonly(&config.photos.db_path).await?;
    let candidates = load_candidates(&pool, query, budget).await?;
    pool.close().await;

    Ok(search::search(
        &candidates,
        query,
        budget,
        &config.heuristics.scan_rules(),
    ))
}

/// Collect metadata-matching assets and OCR-bearing assets into one
/// candidate list, merged by primary key so an asset present in both sets
/// yields a single candidate.
async fn load_candidates(pool: &SqlitePool, query: &str, budget: usize) -> Result<Vec<Candidate>> {
    let pattern = format!("%{query}%");
    let meta_rows = sqlx::query(
        r#"
        SELECT DISTINCT
            a.Z_PK AS pk,
            a.ZFILENAME AS filename,
            a.ZDATECREATED AS created,
            attr.ZTITLE AS title,
            d.ZLONGDESCRIPTION AS description
        FROM ZASSET a
        LEFT JOIN ZADDITIONALASSETATTRIBUTES attr ON attr.ZASSET = a.Z_PK
        LEFT JOIN ZASSETDESCRIPTION d ON d.ZASSETATTRIBUTES = attr.Z_PK
        WHERE a.ZTRASHEDSTATE = 0
          AND (
            a.ZFILENAME LIKE ? COLLATE NOCASE
            OR attr.ZTITLE LIKE ? COLLATE NOCASE
            OR d.ZLONGDESCRIPTION LIKE ? COLLATE NOCASE
          )
        ORDER BY a.ZDATECREATED DESC
        LIMIT ?
        "#,
    )
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .bind(budget as i64)
    .fetch_all(pool)
    .await?;

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in &meta_rows {
        let candidate = Candidate {
            id: row.get("pk"),
            label: label_from(row),
            timestamp: date_from(row),
            title: row.get("title"),
            description: row.get("description"),
            ocr_blob: None,
        };
        index.insert(candidate.id, candidates.len());
        candidates.push(candidate);
    }

    let ocr_rows = sqlx::query(
        r#"
        SELECT
            a.Z_PK AS pk,
            a.ZFILENAME AS filename,
            a.ZDATECREATED AS created,
            c.ZCHARACTERRECOGNITIONDATA AS blob
        FROM ZCHARACTERRECOGNITIONATTRIBUTES c
        JOIN ZMEDIAANALYSISASSETATTRIBUTES m ON c.ZMEDIAANALYSISASSETATTRIBUTES = m.Z_PK
        JOIN ZASSET a ON m.ZASSET = a.Z_PK
        WHERE a.ZTRASHEDSTATE = 0
          AND c.ZCHARACTERRECOGNITIONDATA IS NOT NULL
        "#,
    )
    .fetch_all(pool)
    .await?;

    for row in &ocr_rows {
        let pk: i64 = row.get("pk");
        let blob: Option<Vec<u8>> = row.get("blob");
        match index.get(&pk) {
            Some(&i) => candidates[i].ocr_blob = blob,
            None => candidates.push(Candidate {
                id: pk,
                label: label_from(row),
                timestamp: date_from(row),
                title: None,
                description: None,
                ocr_blob: blob,
            }),
        }
    }

    Ok(candidates)
}

fn label_from(row: &sqlx::sqlite::SqliteRow) -> String {
    let filename: Option<String> = row.get("filename");
    filename.unwrap_or_else(|| "(no filename)".to_string())
}

fn date_from(row: &sqlx::sqlite::SqliteRow) -> Option<chrono::DateTime<chrono::Utc>> {
    let ts: Option<f64> = row.get("created");
    ts.and_then(timestamp::apple_to_utc)
}

/// Display prefix for a hit's context line.
fn context_line(hit: &SearchHit) -> String {
    if hit.snippet.is_empty() {
        return String::new();
    }
    match hit.match_field {
        MatchField::Title => format!("title: {}", hit.snippet),
        MatchField::Description => format!("desc: {}", hit.snippet),
        MatchField::Ocr => format!("ocr: {}", hit.snippet),
        MatchField::Filename => hit.snippet.clone(),
    }
}

// ---- CLI entry point ----

pub async fn run_search(config: &Config, query: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let budget = limit.unwrap_or(config.search.max_results);
    let hits = search_photos(config, query, budget).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No photos found matching: {query}");
        return Ok(());
    }

    println!("Found {} photo(s) matching \"{query}\":\n", hits.len());
    for hit in &hits {
        let mut line = format!(
            "  {}  |  {}  |  [{}]",
            hit.label,
            timestamp::format_date(hit.timestamp),
            hit.match_field.as_str()
        );
        let context = context_line(hit);
        if !context.is_empty() {
            line.push_str("  ");
            line.push_str(&context);
        }
        println!("{line}");
    }
    Ok(())
}
