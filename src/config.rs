use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ocr::ScanRules;
use crate::segment::RunPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub photos: PhotosConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub heuristics: HeuristicsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotesConfig {
    #[serde(default = "default_notes_db")]
    pub db_path: PathBuf,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            db_path: default_notes_db(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PhotosConfig {
    #[serde(default = "default_photos_db")]
    pub db_path: PathBuf,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            db_path: default_photos_db(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Shared result budget across the metadata and OCR search phases.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

/// Knobs for the heuristic decoders.
///
/// These thresholds were inferred from observed data, not a documented
/// format; the defaults work on real libraries but are deliberately
/// adjustable per data-source variant.
#[derive(Debug, Deserialize, Clone)]
pub struct HeuristicsConfig {
    #[serde(default = "default_min_run_len")]
    pub min_run_len: usize,
    #[serde(default = "default_min_keep_len")]
    pub min_keep_len: usize,
    #[serde(default = "default_min_text_ratio")]
    pub min_text_ratio: f64,
    #[serde(default = "default_ocr_window")]
    pub ocr_window: usize,
    #[serde(default = "default_max_token_len")]
    pub max_token_len: usize,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            min_run_len: default_min_run_len(),
            min_keep_len: default_min_keep_len(),
            min_text_ratio: default_min_text_ratio(),
            ocr_window: default_ocr_window(),
            max_token_len: default_max_token_len(),
        }
    }
}

impl HeuristicsConfig {
    pub fn run_policy(&self) -> RunPolicy {
        RunPolicy {
            min_run_len: self.min_run_len,
            min_keep_len: self.min_keep_len,
            min_text_ratio: self.min_text_ratio,
        }
    }

    pub fn scan_rules(&self) -> ScanRules {
        ScanRules {
            window: self.ocr_window,
            max_token_len: self.max_token_len,
            ..ScanRules::default()
        }
    }
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default()
}

fn default_notes_db() -> PathBuf {
    home_dir().join("Library/Group Containers/group.com.apple.notes/NoteStore.sqlite")
}

fn default_photos_db() -> PathBuf {
    home_dir().join("Pictures/Photos Library.photoslibrary/database/Photos.sqlite")
}

fn default_max_results() -> usize {
    30
}
fn default_min_run_len() -> usize {
    3
}
fn default_min_keep_len() -> usize {
    5
}
fn default_min_text_ratio() -> f64 {
    0.5
}
fn default_ocr_window() -> usize {
    80
}
fn default_max_token_len() -> usize {
    100
}

/// Load configuration, falling back to built-in defaults when no file
/// exists at `path`. Shoebox points at the standard library locations out
/// of the box, so a config file is only needed to override them.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.search.max_results < 1 {
        anyhow::bail!("search.max_results must be >= 1");
    }
    if !(0.0..=1.0).contains(&config.heuristics.min_text_ratio) {
        anyhow::bail!("heuristics.min_text_ratio must be in [0.0, 1.0]");
    }
    if config.heuristics.ocr_window == 0 {
        anyhow::bail!("heuristics.ocr_window must be > 0");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("/nonexistent/shoebox.toml")).unwrap();
        assert_eq!(config.search.max_results, 30);
        assert!((config.heuristics.min_text_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\nmax_results = 5").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.heuristics.min_run_len, 3);
    }

    #[test]
    fn invalid_ratio_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[heuristics]\nmin_text_ratio = 1.5").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn zero_budget_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\nmax_results = 0").unwrap();
        assert!(load_config(file.path()).is_err());
    }
}
