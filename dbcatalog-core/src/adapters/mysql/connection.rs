//! MySQL connection setup.

use super::MySqlAdapter;
use crate::Result;
use crate::adapters::ConnectionConfig;
use crate::error::DbCatalogError;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

impl MySqlAdapter {
    /// Opens one connection to `database`.
    ///
    /// # Errors
    /// Returns a `Connection` error if the server is unreachable or rejects
    /// the login
    pub async fn connect(config: &ConnectionConfig, database: &str) -> Result<Self> {
        use sqlx::Executor;

        let mut options = MySqlConnectOptions::new()
            .host(&config.server)
            .port(config.effective_port().unwrap_or(3306))
            .database(database);
        if let Some(username) = config.username.as_deref() {
            options = options.username(username);
        }
        if config.has_password() {
            options = options.password(config.password());
        }

        tracing::debug!("Connecting to {} for database '{}'", config, database);

        let read_only = config.read_only;
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(config.connect_timeout)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    if read_only {
                        conn.execute("SET SESSION TRANSACTION READ ONLY").await?;
                    }
                    Ok(())
                })
            })
            .connect_with(options)
            .await
            .map_err(|e| {
                DbCatalogError::connection_failed(
                    format!("Failed to connect to MySQL database '{}'", database),
                    e,
                )
            })?;

        Ok(Self { pool, read_only })
    }
}
