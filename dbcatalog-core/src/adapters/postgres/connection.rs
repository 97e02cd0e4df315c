//! PostgreSQL connection setup.
//!
//! # Security Features
//! - Read-only configurations set `default_transaction_read_only` on the session
//! - The password is passed to the driver only, never formatted into a URL

use super::PostgresAdapter;
use crate::Result;
use crate::adapters::ConnectionConfig;
use crate::error::DbCatalogError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

impl PostgresAdapter {
    /// Opens one connection to `database`.
    ///
    /// # Errors
    /// Returns a `Connection` error if the server is unreachable or rejects
    /// the login
    pub async fn connect(config: &ConnectionConfig, database: &str) -> Result<Self> {
        use sqlx::Executor;

        let mut options = PgConnectOptions::new()
            .host(&config.server)
            .port(config.effective_port().unwrap_or(5432))
            .database(database)
            .application_name("dbcatalog");
        if let Some(username) = config.username.as_deref() {
            options = options.username(username);
        }
        if config.has_password() {
            options = options.password(config.password());
        }

        tracing::debug!("Connecting to {} for database '{}'", config, database);

        let read_only = config.read_only;
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(config.connect_timeout)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    if read_only {
                        conn.execute("SET default_transaction_read_only = on")
                            .await?;
                    }
                    Ok(())
                })
            })
            .connect_with(options)
            .await
            .map_err(|e| {
                DbCatalogError::connection_failed(
                    format!("Failed to connect to PostgreSQL database '{}'", database),
                    e,
                )
            })?;

        Ok(Self { pool, read_only })
    }
}
