//! # Shoebox
//!
//! Read and search Apple Notes and Photos libraries straight from their
//! SQLite stores, without driving the owning applications.
//!
//! Neither store keeps its interesting text in queryable columns: note
//! bodies are gzip-compressed records in an undocumented format, and photo
//! OCR results are LZFSE streams wrapped in keyed archives. Shoebox decodes
//! both defensively — structural sniffing and heuristic recovery, never a
//! conformant parser — and layers a budgeted two-phase search on top.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────────────────┐   ┌─────────┐
//! │ NoteStore /  │──▶│ decompress → archive → segment │──▶│   CLI   │
//! │ Photos.sqlite│   │            / ocr → search      │   │  (sbx)  │
//! └──────────────┘   └───────────────────────────────┘   └─────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and heuristic knobs |
//! | [`models`] | Core data types |
//! | [`decompress`] | Magic-sniffing gzip/LZFSE decompression |
//! | [`segment`] | Printable-run text recovery |
//! | [`archive`] | Keyed-archive payload lookup |
//! | [`ocr`] | Marker-anchored OCR word scanner |
//! | [`search`] | Two-phase budgeted search orchestrator |
//! | [`notes`] | Notes store queries |
//! | [`photos`] | Photos library queries |
//! | [`timestamp`] | Core Data epoch conversion |
//! | [`db`] | Read-only database connections |

pub mod archive;
pub mod config;
pub mod db;
pub mod decompress;
pub mod models;
pub mod notes;
pub mod ocr;
pub mod photos;
pub mod search;
pub mod segment;
pub mod timestamp;
