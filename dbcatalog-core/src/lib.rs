//! Core library for dbcatalog: schema introspection, the catalog model and
//! the export pipeline.
//!
//! A run connects to every configured database through an engine adapter,
//! introspects tables, views, functions and procedures concurrently, and
//! merges the results into one [`Catalog`]. The catalog can be filtered by
//! object name, persisted as a snapshot for offline runs, and rendered as
//! JSON, XML or a per-object file tree.
//!
//! # Guarantees
//! - Sessions are opened read-only wherever the engine supports it
//! - Credentials are never logged or serialized
//! - Introspection failures are collected per database; whatever could be
//!   produced is always returned
//!
//! # Example
//! ```rust,no_run
//! use dbcatalog_core::{CatalogConfig, ConnectionConfig, EngineKind, Orchestrator};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> dbcatalog_core::Result<()> {
//! let connection = ConnectionConfig::new(EngineKind::Sqlite, "/var/lib/app");
//! let config = CatalogConfig::new(connection.clone(), vec!["app.db".to_string()]);
//!
//! let result = Orchestrator::for_connection(connection)
//!     .run(&config, &CancellationToken::new())
//!     .await?;
//! println!("{} entries, {} errors", result.catalog.len(), result.errors.len());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod catalog;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod snapshot;
pub mod validation;

// Re-export commonly used types
pub use adapters::{
    AdapterFeature, CatalogConfig, ConnectionConfig, EngineAdapter, EngineKind, ObjectRef,
    create_adapter,
};
pub use catalog::Catalog;
pub use error::{DbCatalogError, IntrospectionError, IntrospectionErrorKind, Result};
pub use export::{ExportOptions, OutputMode, RenderReport, Renderer, TypeTarget, create_renderer};
pub use models::{CatalogEntry, ColumnDescriptor, DependencyRef, ObjectKind};
pub use orchestrator::{AdapterFactory, CollectionResult, EngineAdapterFactory, Orchestrator};
pub use snapshot::{load_snapshot, save_snapshot};
pub use validation::validate_snapshot;
