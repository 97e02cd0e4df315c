//! SQLite connection handling.
//!
//! SQLite has no server, so `ConnectionConfig::server` names the database
//! file. When it names a directory instead, each target database is a file
//! of that name inside it.

use std::path::{Path, PathBuf};

use super::SqliteAdapter;
use crate::Result;
use crate::adapters::ConnectionConfig;
use crate::error::DbCatalogError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

impl SqliteAdapter {
    /// Opens the SQLite file for `database`.
    ///
    /// The file is never created; a missing file is a connection error.
    ///
    /// # Errors
    /// Returns error if the database file cannot be opened
    pub async fn connect(config: &ConnectionConfig, database: &str) -> Result<Self> {
        let path = resolve_database_path(&config.server, database);
        tracing::debug!("Opening SQLite database '{}' at {}", database, path.display());

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .read_only(config.read_only)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                DbCatalogError::connection_failed(
                    format!("Failed to open SQLite database '{}'", database),
                    e,
                )
            })?;

        Ok(Self {
            pool,
            read_only: config.read_only,
        })
    }
}

/// Resolves the file backing `database`.
pub fn resolve_database_path(server: &str, database: &str) -> PathBuf {
    let base = Path::new(server);
    if base.is_dir() {
        base.join(database)
    } else {
        base.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_database_path_file() {
        let path = resolve_database_path("/data/catalog.db", "main");
        assert_eq!(path, PathBuf::from("/data/catalog.db"));
    }

    #[test]
    fn test_resolve_database_path_directory() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let server = dir.path().to_string_lossy().to_string();
        let path = resolve_database_path(&server, "sales.db");
        assert_eq!(path, dir.path().join("sales.db"));
    }
}
