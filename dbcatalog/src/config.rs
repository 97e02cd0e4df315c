//! YAML configuration file.
//!
//! ```yaml
//! server: db01.internal
//! port: 1433
//! user: reader
//! password: secret
//! dbtype: mssql
//! databases: [Sales, HR]
//! include_tables: []
//! exclude_tables: [AuditLog]
//! template: templates/info.md
//! ```

use std::path::{Path, PathBuf};

use dbcatalog_core::{
    CatalogConfig, ConnectionConfig, DbCatalogError, EngineKind, Result,
    error::redact_database_url,
};
use serde::Deserialize;

/// Configuration file contents, before validation
#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: String,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dbtype: String,
    pub databases: Vec<String>,
    pub include_tables: Vec<String>,
    pub exclude_tables: Vec<String>,
    pub template: Option<PathBuf>,
}

impl std::fmt::Debug for FileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("dbtype", &self.dbtype)
            .field("databases", &self.databases)
            .field("include_tables", &self.include_tables)
            .field("exclude_tables", &self.exclude_tables)
            .field("template", &self.template)
            .finish()
    }
}

impl FileConfig {
    /// Parses YAML text.
    ///
    /// # Errors
    /// Returns a `Configuration` error for malformed YAML or unknown keys
    pub fn parse(text: &str) -> Result<Self> {
        serde_yaml::from_str(text)
            .map_err(|e| DbCatalogError::configuration(format!("invalid configuration: {}", e)))
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    /// Returns an `Io` error if the file cannot be read, otherwise as
    /// [`FileConfig::parse`]
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            DbCatalogError::io(format!("Failed to read configuration {}", path.display()), e)
        })?;
        let config = Self::parse(&text)?;
        tracing::debug!("Loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Validates the file contents and builds the run configuration.
    ///
    /// `password_override` (from the command line or environment) replaces
    /// the password from the file.
    ///
    /// # Errors
    /// Returns a `Configuration` error for an unknown engine, an empty
    /// server or an empty database list
    pub fn into_catalog_config(self, password_override: Option<String>) -> Result<CatalogConfig> {
        let engine: EngineKind = self.dbtype.parse()?;

        if self.server.contains("://") {
            tracing::warn!(
                "Server '{}' looks like a connection URL; expected a host name or file path",
                redact_database_url(&self.server)
            );
        }

        let mut connection = ConnectionConfig::new(engine, self.server);
        if let Some(port) = self.port {
            connection = connection.with_port(port);
        }
        if let Some(user) = self.user.filter(|u| !u.trim().is_empty()) {
            connection = connection.with_username(user);
        }
        if let Some(password) = password_override.or(self.password) {
            connection = connection.with_password(password);
        }

        let mut config = CatalogConfig::new(connection, self.databases)
            .with_include_tables(self.include_tables)
            .with_exclude_tables(self.exclude_tables);
        if let Some(template) = self.template {
            config = config.with_template(template);
        }

        config.validate()?;
        Ok(config)
    }
}
