//! Concurrent introspection of all configured databases.
//!
//! One future per target database runs concurrently; within a database,
//! objects are processed strictly one after another. A single consumer loop
//! drains finished futures and is the only place results are merged.
//!
//! Failures are collected, never thrown: a database that fails after
//! producing some entries keeps those entries, and the error is reported
//! alongside the catalog.

use std::collections::HashSet;
use std::time::Instant;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::{
    Result,
    adapters::{CatalogConfig, ConnectionConfig, EngineAdapter, ObjectRef, create_adapter},
    catalog::Catalog,
    error::{DbCatalogError, IntrospectionError, IntrospectionErrorKind},
    models::{CatalogEntry, DependencyRef},
};

/// Opens an adapter for one target database.
///
/// Each call must return an adapter with its own connection; adapters are
/// never shared between database tasks.
#[async_trait]
pub trait AdapterFactory: Send + Sync {
    async fn connect(&self, database: &str) -> Result<Box<dyn EngineAdapter>>;
}

/// Production factory backed by the engine drivers.
#[derive(Debug, Clone)]
pub struct EngineAdapterFactory {
    connection: ConnectionConfig,
}

impl EngineAdapterFactory {
    pub fn new(connection: ConnectionConfig) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl AdapterFactory for EngineAdapterFactory {
    async fn connect(&self, database: &str) -> Result<Box<dyn EngineAdapter>> {
        create_adapter(&self.connection, database).await
    }
}

/// Outcome of one run: every entry that could be produced plus every
/// non-fatal error encountered.
#[derive(Debug, Default)]
pub struct CollectionResult {
    pub catalog: Catalog,
    pub errors: Vec<IntrospectionError>,
}

impl CollectionResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// What one database task produced before it finished or stopped.
#[derive(Debug)]
struct DatabaseOutcome {
    database: String,
    entries: Vec<CatalogEntry>,
    error: Option<IntrospectionError>,
}

/// Drives engine adapters across all configured databases.
pub struct Orchestrator {
    factory: Box<dyn AdapterFactory>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator").finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(factory: Box<dyn AdapterFactory>) -> Self {
        Self { factory }
    }

    /// Creates an orchestrator that connects with the real engine drivers.
    pub fn for_connection(connection: ConnectionConfig) -> Self {
        Self::new(Box::new(EngineAdapterFactory::new(connection)))
    }

    /// Introspects every configured database concurrently.
    ///
    /// Parallelism equals the number of target databases. Entries are merged
    /// in task completion order, stable within a task; duplicate identities
    /// are dropped. Cancellation stops new work from starting but lets
    /// in-flight queries finish.
    ///
    /// # Errors
    /// Returns error if:
    /// - The target database list is empty (`Configuration`)
    /// - Every database failed to connect and nothing was produced
    ///   (`NoReachableDatabase`)
    pub async fn run(
        &self,
        config: &CatalogConfig,
        cancel: &CancellationToken,
    ) -> Result<CollectionResult> {
        if config.databases.is_empty() {
            return Err(DbCatalogError::configuration(
                "at least one target database is required",
            ));
        }

        let start_time = Instant::now();
        let attempted = config.databases.len();
        tracing::info!("Starting introspection of {} database(s)", attempted);

        let tasks = config
            .databases
            .iter()
            .map(|database| introspect_database(self.factory.as_ref(), database, cancel));

        let mut stream = stream::iter(tasks).buffer_unordered(attempted);

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let mut errors = Vec::new();
        let mut unreachable = 0usize;

        while let Some(outcome) = stream.next().await {
            let produced = outcome.entries.len();
            for entry in outcome.entries {
                if seen.insert(entry.identity()) {
                    entries.push(entry);
                } else {
                    tracing::warn!("Dropping duplicate entry '{}'", entry.qualified_name());
                }
            }

            match outcome.error {
                Some(error) => {
                    if error.kind == IntrospectionErrorKind::Connection && produced == 0 {
                        unreachable += 1;
                    }
                    tracing::warn!(
                        "Database '{}' stopped after {} entries: {}",
                        outcome.database,
                        produced,
                        error
                    );
                    errors.push(error);
                }
                None => {
                    tracing::info!(
                        "Collected {} entries from '{}'",
                        produced,
                        outcome.database
                    );
                }
            }
        }

        if unreachable == attempted && entries.is_empty() {
            tracing::error!("None of the {} configured databases could be reached", attempted);
            return Err(DbCatalogError::NoReachableDatabase { attempted });
        }

        tracing::info!(
            "Introspection finished in {:.2}s: {} entries, {} error(s)",
            start_time.elapsed().as_secs_f64(),
            entries.len(),
            errors.len()
        );

        Ok(CollectionResult {
            catalog: Catalog::new(entries),
            errors,
        })
    }
}

/// Runs the full introspection sequence for one database.
async fn introspect_database(
    factory: &dyn AdapterFactory,
    database: &str,
    cancel: &CancellationToken,
) -> DatabaseOutcome {
    let mut outcome = DatabaseOutcome {
        database: database.to_string(),
        entries: Vec::new(),
        error: None,
    };

    if cancel.is_cancelled() {
        tracing::warn!("Cancelled before connecting to '{}'", database);
        return outcome;
    }

    tracing::info!("Introspecting database '{}'", database);

    let adapter = match factory.connect(database).await {
        Ok(adapter) => adapter,
        Err(e) => {
            outcome.error = Some(IntrospectionError::new(database, None, e));
            return outcome;
        }
    };

    let objects = match adapter.list_objects(database).await {
        Ok(objects) => objects,
        Err(e) => {
            outcome.error = Some(IntrospectionError::new(database, None, e));
            return outcome;
        }
    };

    for object in objects {
        if cancel.is_cancelled() {
            tracing::warn!(
                "Cancelled in '{}' after {} entries",
                database,
                outcome.entries.len()
            );
            break;
        }

        tracing::debug!("{} {}.{}.{}", object.kind, database, object.schema, object.name);

        match introspect_object(adapter.as_ref(), database, &object).await {
            Ok(entry) => outcome.entries.push(entry),
            Err(e) => {
                let qualified = format!("{}.{}", object.schema, object.name);
                outcome.error = Some(IntrospectionError::new(database, Some(qualified), e));
                break;
            }
        }
    }

    outcome
}

/// Fetches columns, definition and dependencies of one object, in that order.
async fn introspect_object(
    adapter: &dyn EngineAdapter,
    database: &str,
    object: &ObjectRef,
) -> Result<CatalogEntry> {
    let columns = adapter
        .describe_columns(database, &object.schema, &object.name)
        .await?;
    let definition = adapter
        .get_definition(database, &object.schema, &object.name)
        .await?;
    let dependencies = adapter
        .list_dependencies(database, &object.schema, &object.name)
        .await?;

    let mut entry = CatalogEntry::new(database, &object.schema, &object.name, object.kind);
    entry.columns = columns;
    entry.definition = definition;
    entry.dependencies = normalize_dependencies(&entry, dependencies);
    Ok(entry)
}

/// Drops empty-target, self-referential and repeated edges, and resolves an
/// empty referenced database to the owning entry's database.
pub fn normalize_dependencies(
    entry: &CatalogEntry,
    dependencies: Vec<DependencyRef>,
) -> Vec<DependencyRef> {
    let mut seen = HashSet::new();

    dependencies
        .into_iter()
        .filter(DependencyRef::has_target)
        .map(|mut dependency| {
            if dependency.referenced_database.trim().is_empty() {
                dependency.referenced_database = entry.database.clone();
            }
            dependency
        })
        .filter(|dependency| !entry.is_self_reference(dependency))
        .filter(|dependency| seen.insert(dependency.clone()))
        .collect()
}
