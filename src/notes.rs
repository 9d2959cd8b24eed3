//! Notes store access.
//!
//! Reads `NoteStore.sqlite` directly instead of driving the Notes
//! application, which hangs on large libraries. Note bodies live in
//! `ZICNOTEDATA.ZDATA` as gzip-compressed records with no public schema;
//! they are recovered with the decompressor and printable-run segmenter.
//!
//! Used by the `sbx notes list|folders|read|search` CLI commands.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::decompress;
use crate::models::{Note, NoteSummary};
use crate::segment;
use crate::timestamp;

/// Recover plain text from a raw note body blob.
pub fn note_body(blob: &[u8], config: &Config) -> String {
    let expanded = decompress::decompress(blob);
    segment::extract_text(&expanded, &config.heuristics.run_policy())
}

/// Most recently modified notes, deletion-marked rows excluded.
pub async fn list_notes(config: &Config, limit: i64) -> Result<Vec<NoteSummary>> {
    let pool = db::connect_readonly(&config.notes.db_path).await?;

    let rows = sqlx::query(
        r#"
        SELECT n.Z_PK AS pk, n.ZTITLE1 AS title, n.ZMODIFICATIONDATE1 AS modified
        FROM ZICCLOUDSYNCINGOBJECT n
        WHERE n.ZTITLE1 IS NOT NULL AND n.ZTITLE1 != ''
          AND n.ZMARKEDFORDELETION != 1
        ORDER BY n.ZMODIFICATIONDATE1 DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    let notes = rows.iter().map(summary_from_row).collect();
    pool.close().await;
    Ok(notes)
}

/// Folder titles. The schema shifted across versions, so a second query
/// against the older column naming backs up the first.
pub async fn list_folders(config: &Config) -> Result<Vec<String>> {
    let pool = db::connect_readonly(&config.notes.db_path).await?;

    let rows = sqlx::query(
        r#"
        SELECT ZTITLE2 AS title
        FROM ZICCLOUDSYNCINGOBJECT
        WHERE ZTITLE2 IS NOT NULL AND ZTITLE2 != ''
          AND Z_ENT IN (SELECT Z_ENT FROM Z_PRIMARYKEY WHERE Z_NAME = 'ICFolder')
        ORDER BY ZTITLE2
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let mut folders: Vec<String> = rows.iter().map(|r| r.get("title")).collect();

    if folders.is_empty() {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT ZNAME AS title FROM ZICCLOUDSYNCINGOBJECT
            WHERE ZNAME IS NOT NULL AND ZNAME != ''
            ORDER BY ZNAME
            "#,
        )
        .fetch_all(&pool)
        .await?;
        folders = rows.iter().map(|r| r.get("title")).collect();
    }

    pool.close().await;
    Ok(folders)
}

/// Fetch one note by title: exact match first, then a case-insensitive
/// partial match. Returns `None` when neither finds a row.
pub async fn read_note(config: &Config, title: &str) -> Result<Option<Note>> {
    let pool = db::connect_readonly(&config.notes.db_path).await?;

    let exact = note_row(&pool, "n.ZTITLE1 = ?", title).await?;
    let row = match exact {
        Some(row) => Some(row),
        None => note_row(&pool, "n.ZTITLE1 LIKE ?", &format!("%{title}%")).await?,
    };

    let note = row.map(|row| {
        let blob: Option<Vec<u8>> = row.get("body");
        Note {
            title: row.get("title"),
            created: date_from(&row, "created"),
            modified: date_from(&row, "modified"),
            body: blob.as_deref().map(|b| note_body(b, config)).unwrap_or_default(),
        }
    });

    pool.close().await;
    Ok(note)
}

async fn note_row(
    pool: &SqlitePool,
    predicate: &str,
    value: &str,
) -> Result<Option<sqlx::sqlite::SqliteRow>> {
    let sql = format!(
        r#"
        SELECT n.ZTITLE1 AS title, n.ZMODIFICATIONDATE1 AS modified,
               n.ZCREATIONDATE1 AS created, nb.ZDATA AS body
        FROM ZICCLOUDSYNCINGOBJECT n
        JOIN ZICNOTEDATA nb ON nb.Z_PK = n.ZNOTEDATA
        WHERE {predicate}
        ORDER BY n.ZMODIFICATIONDATE1 DESC
        LIMIT 1
        "#
    );
    Ok(sqlx::query(&sql).bind(value).fetch_optional(pool).await?)
}

/// Search notes by title, falling back to a body scan when no title
/// matches.
///
/// The body scan decodes every note blob in modification order and
/// substring-matches the recovered text, stopping at `limit` hits. Slow on
/// big libraries by nature; the title phase keeps the common case fast.
pub async fn search_notes(config: &Config, query: &str, limit: i64) -> Result<Vec<NoteSummary>> {
    let pool = db::connect_readonly(&config.notes.db_path).await?;

    let rows = sqlx::query(
        r#"
        SELECT n.Z_PK AS pk, n.ZTITLE1 AS title, n.ZMODIFICATIONDATE1 AS modified
        FROM ZICCLOUDSYNCINGOBJECT n
        WHERE n.ZTITLE1 IS NOT NULL AND n.ZTITLE1 != ''
          AND n.ZTITLE1 LIKE ?
        ORDER BY n.ZMODIFICATIONDATE1 DESC
        LIMIT ?
        "#,
    )
    .bind(format!("%{query}%"))
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    let mut results: Vec<NoteSummary> = rows.iter().map(summary_from_row).collect();

    if results.is_empty() {
        let rows = sqlx::query(
            r#"
            SELECT n.Z_PK AS pk, n.ZTITLE1 AS title, n.ZMODIFICATIONDATE1 AS modified,
                   nb.ZDATA AS body
            FROM ZICCLOUDSYNCINGOBJECT n
            JOIN ZICNOTEDATA nb ON nb.Z_PK = n.ZNOTEDATA
            WHERE n.ZTITLE1 IS NOT NULL AND n.ZTITLE1 != ''
            ORDER BY n.ZMODIFICATIONDATE1 DESC
            "#,
        )
        .fetch_all(&pool)
        .await?;

        for row in &rows {
            let blob: Option<Vec<u8>> = row.get("body");
            let Some(blob) = blob else { continue };
            let body = note_body(&blob, config);
            if crate::search::find_ci(&body, query).is_some() {
                results.push(summary_from_row(row));
                if results.len() >= limit as usize {
                    break;
                }
            }
        }
    }

    pool.close().await;
    Ok(results)
}

fn summary_from_row(row: &sqlx::sqlite::SqliteRow) -> NoteSummary {
    NoteSummary {
        id: row.get("pk"),
        title: row.get("title"),
        modified: date_from(row, "modified"),
    }
}

fn date_from(row: &sqlx::sqlite::SqliteRow, column: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let ts: Option<f64> = row.get(column);
    ts.and_then(timestamp::apple_to_utc)
}

// ---- CLI entry points ----

pub async fn run_list(config: &Config, limit: i64, json: bool) -> Result<()> {
    let notes = list_notes(config, limit).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }
    for note in &notes {
        println!(
            "{} | {} | {}",
            note.id,
            timestamp::format_date(note.modified),
            note.title
        );
    }
    Ok(())
}

pub async fn run_folders(config: &Config) -> Result<()> {
    for folder in list_folders(config).await? {
        println!("{folder}");
    }
    Ok(())
}

pub async fn run_read(config: &Config, title: &str, json: bool) -> Result<()> {
    let note = match read_note(config, title).await? {
        Some(note) => note,
        None => {
            println!("Note not found: {title}");
            return Ok(());
        }
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
        return Ok(());
    }
    println!("Title: {}", note.title);
    println!("Modified: {}", timestamp::format_date(note.modified));
    println!("Created: {}", timestamp::format_date(note.created));
    println!();
    println!("{}", note.body);
    Ok(())
}

pub async fn run_search(config: &Config, query: &str, limit: i64, json: bool) -> Result<()> {
    let results = search_notes(config, query, limit).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("No notes found matching: {query}");
        return Ok(());
    }
    for note in &results {
        println!("{} | {}", note.title, timestamp::format_date(note.modified));
    }
    Ok(())
}
