use anyhow::{bail, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Open a library database strictly read-only.
///
/// These stores belong to other applications; we never create, migrate, or
/// write them. `query_only` guards against accidental writes even through
/// pragmas or virtual tables.
pub async fn connect_readonly(path: &Path) -> Result<SqlitePool> {
    if !path.exists() {
        bail!("database not found at {}", path.display());
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .pragma("query_only", "ON");

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}
