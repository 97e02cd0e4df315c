//! Run configuration handed to the orchestrator.

use std::path::PathBuf;

use super::ConnectionConfig;
use crate::error::DbCatalogError;

/// Validated configuration record for one catalog run.
///
/// Built by the caller (the CLI loads it from YAML) and only read by the
/// core.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub connection: ConnectionConfig,
    /// Target database names, one introspection task each
    pub databases: Vec<String>,
    pub include_tables: Vec<String>,
    pub exclude_tables: Vec<String>,
    /// Optional user template for info documents
    pub template: Option<PathBuf>,
}

impl CatalogConfig {
    pub fn new(connection: ConnectionConfig, databases: Vec<String>) -> Self {
        Self {
            connection,
            databases,
            include_tables: Vec::new(),
            exclude_tables: Vec::new(),
            template: None,
        }
    }

    pub fn with_include_tables(mut self, tables: Vec<String>) -> Self {
        self.include_tables = tables;
        self
    }

    pub fn with_exclude_tables(mut self, tables: Vec<String>) -> Self {
        self.exclude_tables = tables;
        self
    }

    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Validates the run configuration.
    ///
    /// # Errors
    /// Returns error if the connection is invalid, no database is listed or
    /// a database name is blank
    pub fn validate(&self) -> crate::Result<()> {
        self.connection.validate()?;

        if self.databases.is_empty() {
            return Err(DbCatalogError::configuration(
                "at least one target database is required",
            ));
        }

        if self.databases.iter().any(|db| db.trim().is_empty()) {
            return Err(DbCatalogError::configuration(
                "database names cannot be empty",
            ));
        }

        Ok(())
    }
}
