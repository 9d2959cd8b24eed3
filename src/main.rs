//! # Shoebox CLI (`sbx`)
//!
//! Command-line interface for reading and searching Apple Notes and Photos
//! libraries directly from their SQLite stores.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sbx notes list` | List recent notes |
//! | `sbx notes folders` | List note folders |
//! | `sbx notes read <title>` | Print a note's recovered body text |
//! | `sbx notes search <query>` | Search note titles, then bodies |
//! | `sbx photos search <query>` | Two-phase photo search (metadata, then OCR) |
//!
//! ## Examples
//!
//! ```bash
//! # Recent notes
//! sbx notes list --limit 20
//!
//! # Read one note by (partial) title
//! sbx notes read "Grocery"
//!
//! # Find photos whose OCR text mentions a word
//! sbx photos search "invoice" --limit 10 --json
//! ```
//!
//! All commands accept `--config` pointing at a TOML file; without one,
//! Shoebox uses the standard macOS library locations.

mod archive;
mod config;
mod db;
mod decompress;
mod models;
mod notes;
mod ocr;
mod photos;
mod search;
mod segment;
mod timestamp;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Shoebox — read and search Apple Notes and Photos libraries straight
/// from their SQLite stores.
#[derive(Parser)]
#[command(
    name = "sbx",
    about = "Read and search Apple Notes and Photos libraries straight from their SQLite stores",
    version,
    long_about = "Shoebox opens the Notes and Photos SQLite databases read-only, recovers text \
    from their compressed binary blob columns (note bodies and photo OCR results), and exposes \
    listing, reading, and budgeted two-phase search from the command line."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional — without it, Shoebox points at the standard library
    /// locations under the current user's home directory.
    #[arg(long, global = true, default_value = "./config/sbx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Work with the Notes store.
    Notes {
        #[command(subcommand)]
        action: NotesAction,
    },

    /// Work with the Photos library.
    Photos {
        #[command(subcommand)]
        action: PhotosAction,
    },
}

/// Notes subcommands.
#[derive(Subcommand)]
enum NotesAction {
    /// List recent notes (id, modification date, title).
    List {
        /// Maximum number of notes to list.
        #[arg(long, default_value_t = 50)]
        limit: i64,

        /// Emit JSON instead of the plain listing.
        #[arg(long)]
        json: bool,
    },

    /// List note folders.
    Folders,

    /// Print one note's metadata and recovered body text.
    ///
    /// Matches the title exactly first, then falls back to a
    /// case-insensitive partial match.
    Read {
        /// Note title (or a fragment of it).
        title: String,

        /// Emit JSON instead of the plain listing.
        #[arg(long)]
        json: bool,
    },

    /// Search notes by title, then by recovered body text.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(long, default_value_t = 20)]
        limit: i64,

        /// Emit JSON instead of the plain listing.
        #[arg(long)]
        json: bool,
    },
}

/// Photos subcommands.
#[derive(Subcommand)]
enum PhotosAction {
    /// Search photos by filename, title, and description, then by OCR text.
    ///
    /// Both phases share one result budget; the OCR phase only decodes
    /// blobs for whatever the metadata phase left over.
    Search {
        /// The search query string.
        query: String,

        /// Result budget across both phases (defaults to config
        /// `search.max_results`).
        #[arg(long)]
        limit: Option<usize>,

        /// Emit JSON instead of the plain listing.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Notes { action } => match action {
            NotesAction::List { limit, json } => {
                notes::run_list(&cfg, limit, json).await?;
            }
            NotesAction::Folders => {
                notes::run_folders(&cfg).await?;
            }
            NotesAction::Read { title, json } => {
                notes::run_read(&cfg, &title, json).await?;
            }
            NotesAction::Search { query, limit, json } => {
                if query.trim().is_empty() {
                    anyhow::bail!("search query must not be empty");
                }
                notes::run_search(&cfg, &query, limit, json).await?;
            }
        },
        Commands::Photos { action } => match action {
            PhotosAction::Search { query, limit, json } => {
                if query.trim().is_empty() {
                    anyhow::bail!("search query must not be empty");
                }
                photos::run_search(&cfg, &query, limit, json).await?;
            }
        },
    }

    Ok(())
}
