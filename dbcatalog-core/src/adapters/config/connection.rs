//! Database connection configuration.
//!
//! `ConnectionConfig` carries everything needed to open one connection to a
//! target database. The password lives in a zeroizing container and is never
//! printed by `Debug` or `Display`.

use std::str::FromStr;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::error::DbCatalogError;

/// Supported database engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    SqlServer,
    Sqlite,
    PostgreSql,
    MySql,
}

impl EngineKind {
    /// Default TCP port for client/server engines; `None` for SQLite.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            EngineKind::SqlServer => Some(1433),
            EngineKind::PostgreSql => Some(5432),
            EngineKind::MySql => Some(3306),
            EngineKind::Sqlite => None,
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::SqlServer => write!(f, "SQL Server"),
            EngineKind::Sqlite => write!(f, "SQLite"),
            EngineKind::PostgreSql => write!(f, "PostgreSQL"),
            EngineKind::MySql => write!(f, "MySQL"),
        }
    }
}

impl FromStr for EngineKind {
    type Err = DbCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mssql" | "sqlserver" => Ok(EngineKind::SqlServer),
            "sqlite" | "sqlite3" => Ok(EngineKind::Sqlite),
            "postgres" | "postgresql" => Ok(EngineKind::PostgreSql),
            "mysql" => Ok(EngineKind::MySql),
            other => Err(DbCatalogError::configuration(format!(
                "unknown database type '{}'",
                other
            ))),
        }
    }
}

/// Configuration for database connections.
///
/// For SQLite `server` is the database file, or a directory in which each
/// target database name is a file.
///
/// # Example
/// ```rust
/// use dbcatalog_core::adapters::{ConnectionConfig, EngineKind};
///
/// let config = ConnectionConfig::new(EngineKind::SqlServer, "db01.internal")
///     .with_username("reader")
///     .with_password("secret");
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.effective_port(), Some(1433));
/// assert!(!format!("{:?}", config).contains("secret"));
/// ```
#[derive(Clone)]
pub struct ConnectionConfig {
    pub engine: EngineKind,
    /// Host name or, for SQLite, a file path
    pub server: String,
    /// Explicit port; the engine default is used when unset
    pub port: Option<u16>,
    pub username: Option<String>,
    password: Option<Zeroizing<String>>,
    pub connect_timeout: Duration,
    /// Whether to open connections read-only where the engine allows it
    pub read_only: bool,
}

impl ConnectionConfig {
    pub fn new(engine: EngineKind, server: impl Into<String>) -> Self {
        Self {
            engine,
            server: server.into(),
            port: None,
            username: None,
            password: None,
            connect_timeout: Duration::from_secs(30),
            read_only: true,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Password for driver handshakes. Never log the returned value.
    pub(crate) fn password(&self) -> &str {
        self.password.as_ref().map_or("", |p| p.as_str())
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Configured port or the engine default.
    pub fn effective_port(&self) -> Option<u16> {
        self.port.or_else(|| self.engine.default_port())
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if the server is empty, the port is 0 or the connect
    /// timeout is zero
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.trim().is_empty() {
            return Err(DbCatalogError::configuration("server cannot be empty"));
        }

        if self.port == Some(0) {
            return Err(DbCatalogError::configuration(
                "port must be greater than 0",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(DbCatalogError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("engine", &self.engine)
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("connect_timeout", &self.connect_timeout)
            .field("read_only", &self.read_only)
            .finish()
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}{})",
            self.engine,
            self.server,
            self.effective_port()
                .map_or_else(String::new, |p| format!(":{}", p))
        )
        // Username and credentials are intentionally omitted
    }
}
