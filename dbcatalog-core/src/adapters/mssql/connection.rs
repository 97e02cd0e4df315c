//! SQL Server connection setup.
//!
//! # Security
//! - The password is only handed to the TDS handshake, never logged
//! - Read-only configurations request `ApplicationIntent=ReadOnly`

use super::SqlServerAdapter;
use crate::Result;
use crate::adapters::ConnectionConfig;
use crate::error::DbCatalogError;
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::TokioAsyncWriteCompatExt;

impl SqlServerAdapter {
    /// Opens a TDS connection with `database` as the initial catalog.
    ///
    /// # Errors
    /// Returns a `Connection` error if the TCP connect times out, the server
    /// is unreachable or the login is rejected
    pub async fn connect(config: &ConnectionConfig, database: &str) -> Result<Self> {
        let tds_config = build_tds_config(config, database);
        let context = format!("Failed to connect to SQL Server database '{}'", database);

        tracing::debug!("Connecting to {} for database '{}'", config, database);

        let tcp = tokio::time::timeout(config.connect_timeout, TcpStream::connect(tds_config.get_addr()))
            .await
            .map_err(|e| DbCatalogError::connection_failed(context.clone(), e))?
            .map_err(|e| DbCatalogError::connection_failed(context.clone(), e))?;

        tcp.set_nodelay(true)
            .map_err(|e| DbCatalogError::connection_failed(context.clone(), e))?;

        let client = Client::connect(tds_config, tcp.compat_write())
            .await
            .map_err(|e| DbCatalogError::connection_failed(context, e))?;

        Ok(Self {
            client: Mutex::new(client),
            read_only: config.read_only,
        })
    }
}

fn build_tds_config(config: &ConnectionConfig, database: &str) -> Config {
    let mut tds_config = Config::new();
    tds_config.host(&config.server);
    tds_config.port(config.effective_port().unwrap_or(1433));
    tds_config.authentication(AuthMethod::sql_server(
        config.username.as_deref().unwrap_or_default(),
        config.password(),
    ));
    tds_config.database(database);
    tds_config.application_name("dbcatalog");
    tds_config.readonly(config.read_only);
    tds_config.trust_cert();
    tds_config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::EngineKind;

    #[test]
    fn test_build_tds_config_uses_default_port() {
        let config = ConnectionConfig::new(EngineKind::SqlServer, "db01.internal")
            .with_username("reader")
            .with_password("secret");

        let tds_config = build_tds_config(&config, "Sales");
        assert_eq!(tds_config.get_addr(), "db01.internal:1433");
    }

    #[test]
    fn test_build_tds_config_uses_explicit_port() {
        let config = ConnectionConfig::new(EngineKind::SqlServer, "localhost").with_port(14330);

        let tds_config = build_tds_config(&config, "Sales");
        assert_eq!(tds_config.get_addr(), "localhost:14330");
    }
}
