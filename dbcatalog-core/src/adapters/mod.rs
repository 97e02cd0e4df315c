//! Engine adapter trait and factory for uniform schema introspection.
//!
//! Every supported engine answers the same four questions about a target
//! database: which objects exist, their columns, their stored definition and
//! what they depend on. Callers only ever see `Box<dyn EngineAdapter>`.
//!
//! # Module Structure
//! - `config`: Connection and run configuration
//! - `helpers`: Identifier quoting and result decoding shared by adapters
//! - Engine modules (`mssql`, `sqlite`, `postgres`, `mysql`), each behind its
//!   cargo feature

use crate::{
    Result,
    models::{ColumnDescriptor, DependencyRef, ObjectKind},
};
use async_trait::async_trait;

pub mod config;
pub mod helpers;

#[cfg(feature = "mssql")]
pub mod mssql;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgresql")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::{CatalogConfig, ConnectionConfig, EngineKind};

/// Optional capabilities that differ between engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterFeature {
    /// Objects live in named schemas
    Schemas,
    /// Functions and procedures are enumerated alongside tables and views
    Routines,
    /// The engine reports inter-object dependencies
    DependencyTracking,
    /// Connections are opened read-only
    ReadOnlyMode,
}

/// An object discovered by [`EngineAdapter::list_objects`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub schema: String,
    pub name: String,
    pub kind: ObjectKind,
}

impl ObjectRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            kind,
        }
    }
}

/// Uniform introspection capability implemented once per engine.
///
/// # Object Safety
/// This trait is object-safe, allowing dynamic dispatch through
/// `Box<dyn EngineAdapter>`. Each instance owns one connection exclusively.
///
/// # Errors
/// Implementations report unreachable engines as `Connection`, rejected query
/// text as `Query` and unexpected result shapes as `Decode` errors. Nothing is
/// retried at this layer.
#[async_trait]
pub trait EngineAdapter: Send + Sync {
    /// Enumerates tables and views, plus routines where the engine catalogs
    /// them, in engine discovery order.
    async fn list_objects(&self, database: &str) -> Result<Vec<ObjectRef>>;

    /// Returns the columns of one object in ordinal order.
    async fn describe_columns(
        &self,
        database: &str,
        schema: &str,
        name: &str,
    ) -> Result<Vec<ColumnDescriptor>>;

    /// Returns the stored source of a view or routine; empty for base tables.
    async fn get_definition(&self, database: &str, schema: &str, name: &str) -> Result<String>;

    /// Returns the objects this one depends on. Engines without dependency
    /// tracking return an empty list.
    async fn list_dependencies(
        &self,
        database: &str,
        schema: &str,
        name: &str,
    ) -> Result<Vec<DependencyRef>>;

    /// Returns the engine this adapter talks to.
    fn engine_kind(&self) -> EngineKind;

    /// Checks if the adapter supports a specific feature.
    fn supports_feature(&self, feature: AdapterFeature) -> bool;
}

/// Opens one exclusive connection for `database` and wraps it in the adapter
/// for the configured engine.
///
/// # Errors
/// Returns error if:
/// - The connection configuration is invalid
/// - The engine's cargo feature is not compiled in
/// - The connection cannot be established
pub async fn create_adapter(
    connection: &ConnectionConfig,
    database: &str,
) -> Result<Box<dyn EngineAdapter>> {
    connection.validate()?;

    match connection.engine {
        #[cfg(feature = "mssql")]
        EngineKind::SqlServer => {
            let adapter = mssql::SqlServerAdapter::connect(connection, database).await?;
            Ok(Box::new(adapter))
        }
        #[cfg(not(feature = "mssql"))]
        EngineKind::SqlServer => Err(crate::error::DbCatalogError::unsupported_feature(
            "SQL Server adapter",
            "Compile with --features mssql to enable SQL Server support",
        )),
        #[cfg(feature = "sqlite")]
        EngineKind::Sqlite => {
            let adapter = sqlite::SqliteAdapter::connect(connection, database).await?;
            Ok(Box::new(adapter))
        }
        #[cfg(not(feature = "sqlite"))]
        EngineKind::Sqlite => Err(crate::error::DbCatalogError::unsupported_feature(
            "SQLite adapter",
            "Compile with --features sqlite to enable SQLite support",
        )),
        #[cfg(feature = "postgresql")]
        EngineKind::PostgreSql => {
            let adapter = postgres::PostgresAdapter::connect(connection, database).await?;
            Ok(Box::new(adapter))
        }
        #[cfg(not(feature = "postgresql"))]
        EngineKind::PostgreSql => Err(crate::error::DbCatalogError::unsupported_feature(
            "PostgreSQL adapter",
            "Compile with --features postgresql to enable PostgreSQL support",
        )),
        #[cfg(feature = "mysql")]
        EngineKind::MySql => {
            let adapter = mysql::MySqlAdapter::connect(connection, database).await?;
            Ok(Box::new(adapter))
        }
        #[cfg(not(feature = "mysql"))]
        EngineKind::MySql => Err(crate::error::DbCatalogError::unsupported_feature(
            "MySQL adapter",
            "Compile with --features mysql to enable MySQL support",
        )),
    }
}
