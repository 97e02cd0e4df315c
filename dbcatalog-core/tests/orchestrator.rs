//! Orchestrator tests against in-process mock adapters.
//!
//! This test suite covers:
//! - Partial success within a failing database
//! - Error classification and aggregation across databases
//! - The fatal error when every database is unreachable
//! - Cooperative cancellation
//! - Dependency normalization and duplicate identities

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dbcatalog_core::{
    AdapterFactory, AdapterFeature, CatalogConfig, ColumnDescriptor, ConnectionConfig,
    DbCatalogError, DependencyRef, EngineAdapter, EngineKind, IntrospectionErrorKind, ObjectKind,
    ObjectRef, Orchestrator, Result,
};
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
enum MockDatabase {
    Unreachable,
    Objects {
        names: Vec<&'static str>,
        fail_on: Option<&'static str>,
    },
}

struct MockAdapter {
    names: Vec<&'static str>,
    fail_on: Option<&'static str>,
    /// Cancelled after this many objects have been described
    cancel_after: Option<(usize, CancellationToken)>,
    described: AtomicUsize,
}

#[async_trait]
impl EngineAdapter for MockAdapter {
    async fn list_objects(&self, _database: &str) -> Result<Vec<ObjectRef>> {
        Ok(self
            .names
            .iter()
            .map(|name| {
                let kind = if name.starts_with('v') {
                    ObjectKind::View
                } else {
                    ObjectKind::Table
                };
                ObjectRef::new("dbo", *name, kind)
            })
            .collect())
    }

    async fn describe_columns(
        &self,
        _database: &str,
        _schema: &str,
        name: &str,
    ) -> Result<Vec<ColumnDescriptor>> {
        if self.fail_on == Some(name) {
            return Err(DbCatalogError::query_failed(
                format!("Failed to describe '{}'", name),
                std::io::Error::other("invalid object name"),
            ));
        }

        let described = self.described.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((limit, token)) = &self.cancel_after
            && described >= *limit
        {
            token.cancel();
        }

        Ok(vec![ColumnDescriptor {
            name: "Id".to_string(),
            type_name: "int".to_string(),
            ..ColumnDescriptor::default()
        }])
    }

    async fn get_definition(&self, _database: &str, _schema: &str, name: &str) -> Result<String> {
        if name.starts_with('v') {
            Ok(format!("CREATE VIEW dbo.{} AS SELECT Id FROM dbo.Orders", name))
        } else {
            Ok(String::new())
        }
    }

    async fn list_dependencies(
        &self,
        _database: &str,
        schema: &str,
        name: &str,
    ) -> Result<Vec<DependencyRef>> {
        if !name.starts_with('v') {
            return Ok(Vec::new());
        }
        Ok(vec![
            DependencyRef::new("", "dbo", "Orders"),
            DependencyRef::new("", "dbo", "Orders"),
            DependencyRef::new("", schema, name),
            DependencyRef::new("", "", ""),
        ])
    }

    fn engine_kind(&self) -> EngineKind {
        EngineKind::SqlServer
    }

    fn supports_feature(&self, _feature: AdapterFeature) -> bool {
        true
    }
}

#[derive(Default)]
struct MockFactory {
    databases: HashMap<&'static str, MockDatabase>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl MockFactory {
    fn with(mut self, name: &'static str, database: MockDatabase) -> Self {
        self.databases.insert(name, database);
        self
    }
}

#[async_trait]
impl AdapterFactory for MockFactory {
    async fn connect(&self, database: &str) -> Result<Box<dyn EngineAdapter>> {
        match self.databases.get(database) {
            Some(MockDatabase::Objects { names, fail_on }) => Ok(Box::new(MockAdapter {
                names: names.clone(),
                fail_on: *fail_on,
                cancel_after: self.cancel_after.clone(),
                described: AtomicUsize::new(0),
            })),
            Some(MockDatabase::Unreachable) | None => Err(DbCatalogError::connection_failed(
                format!("Failed to connect to '{}'", database),
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
        }
    }
}

fn config(databases: &[&str]) -> CatalogConfig {
    CatalogConfig::new(
        ConnectionConfig::new(EngineKind::SqlServer, "mock"),
        databases.iter().map(|d| d.to_string()).collect(),
    )
}

fn objects(names: &[&'static str]) -> MockDatabase {
    MockDatabase::Objects {
        names: names.to_vec(),
        fail_on: None,
    }
}

// =============================================================================
// Aggregation
// =============================================================================

#[tokio::test]
async fn test_partial_results_survive_later_failure() -> Result<()> {
    let factory = MockFactory::default()
        .with(
            "Sales",
            MockDatabase::Objects {
                names: vec!["A", "B", "C", "D", "E"],
                fail_on: Some("D"),
            },
        )
        .with("HR", objects(&["Staff", "vStaff"]));
    let orchestrator = Orchestrator::new(Box::new(factory));

    let result = orchestrator
        .run(&config(&["Sales", "HR"]), &CancellationToken::new())
        .await?;

    let sales: Vec<&str> = result
        .catalog
        .iter()
        .filter(|e| e.database == "Sales")
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(sales, vec!["A", "B", "C"]);
    assert_eq!(result.catalog.len(), 5);

    assert_eq!(result.errors.len(), 1);
    let error = &result.errors[0];
    assert_eq!(error.database, "Sales");
    assert_eq!(error.object.as_deref(), Some("dbo.D"));
    assert_eq!(error.kind, IntrospectionErrorKind::Query);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_database_does_not_affect_others() -> Result<()> {
    let factory = MockFactory::default()
        .with("Sales", objects(&["Orders"]))
        .with("Archive", MockDatabase::Unreachable);
    let orchestrator = Orchestrator::new(Box::new(factory));

    let result = orchestrator
        .run(&config(&["Sales", "Archive"]), &CancellationToken::new())
        .await?;

    assert_eq!(result.catalog.len(), 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].database, "Archive");
    assert_eq!(result.errors[0].kind, IntrospectionErrorKind::Connection);
    assert!(result.errors[0].object.is_none());
    Ok(())
}

#[tokio::test]
async fn test_all_unreachable_is_fatal() {
    let factory = MockFactory::default()
        .with("A", MockDatabase::Unreachable)
        .with("B", MockDatabase::Unreachable)
        .with("C", MockDatabase::Unreachable);
    let orchestrator = Orchestrator::new(Box::new(factory));

    let result = orchestrator
        .run(&config(&["A", "B", "C"]), &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(DbCatalogError::NoReachableDatabase { attempted: 3 })
    ));
}

#[tokio::test]
async fn test_all_failing_after_connect_is_not_fatal() -> Result<()> {
    let factory = MockFactory::default().with(
        "Sales",
        MockDatabase::Objects {
            names: vec!["A"],
            fail_on: Some("A"),
        },
    );
    let orchestrator = Orchestrator::new(Box::new(factory));

    let result = orchestrator
        .run(&config(&["Sales"]), &CancellationToken::new())
        .await?;

    assert!(result.catalog.is_empty());
    assert_eq!(result.errors.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_target_produces_unique_identities() -> Result<()> {
    let factory = MockFactory::default().with("Sales", objects(&["Orders", "vOpen"]));
    let orchestrator = Orchestrator::new(Box::new(factory));

    let result = orchestrator
        .run(&config(&["Sales", "Sales"]), &CancellationToken::new())
        .await?;

    assert_eq!(result.catalog.len(), 2);
    result.catalog.validate_unique()?;
    Ok(())
}

#[tokio::test]
async fn test_dependencies_are_normalized() -> Result<()> {
    let factory = MockFactory::default().with("Sales", objects(&["Orders", "vOpen"]));
    let orchestrator = Orchestrator::new(Box::new(factory));

    let result = orchestrator
        .run(&config(&["Sales"]), &CancellationToken::new())
        .await?;

    let view = result
        .catalog
        .iter()
        .find(|e| e.name == "vOpen")
        .expect("view entry");
    assert_eq!(view.kind, ObjectKind::View);
    assert_eq!(
        view.dependencies,
        vec![DependencyRef::new("Sales", "dbo", "Orders")]
    );
    assert!(view.definition.starts_with("CREATE VIEW"));
    Ok(())
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancelled_before_start_produces_nothing() -> Result<()> {
    let factory = MockFactory::default().with("Sales", objects(&["A", "B"]));
    let orchestrator = Orchestrator::new(Box::new(factory));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = orchestrator.run(&config(&["Sales"]), &cancel).await?;

    assert!(result.catalog.is_empty());
    assert!(!result.has_errors());
    Ok(())
}

#[tokio::test]
async fn test_cancellation_stops_new_objects() -> Result<()> {
    let cancel = CancellationToken::new();
    let factory = MockFactory {
        cancel_after: Some((2, cancel.clone())),
        ..MockFactory::default()
    }
    .with("Sales", objects(&["A", "B", "C", "D"]));
    let orchestrator = Orchestrator::new(Box::new(factory));

    let result = orchestrator.run(&config(&["Sales"]), &cancel).await?;

    // the object being described when cancellation fired still completes
    let names: Vec<&str> = result.catalog.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert!(!result.has_errors());
    Ok(())
}

#[tokio::test]
async fn test_factory_is_called_once_per_database() -> Result<()> {
    struct CountingFactory {
        inner: MockFactory,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AdapterFactory for CountingFactory {
        async fn connect(&self, database: &str) -> Result<Box<dyn EngineAdapter>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.connect(database).await
        }
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let factory = CountingFactory {
        inner: MockFactory::default()
            .with("A", objects(&["T1"]))
            .with("B", objects(&["T2"]))
            .with("C", objects(&["T3"])),
        calls: Arc::clone(&calls),
    };
    let orchestrator = Orchestrator::new(Box::new(factory));

    let result = orchestrator
        .run(&config(&["A", "B", "C"]), &CancellationToken::new())
        .await?;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(result.catalog.len(), 3);
    Ok(())
}
