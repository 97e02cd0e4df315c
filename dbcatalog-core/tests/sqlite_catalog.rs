//! SQLite end-to-end catalog tests.
//!
//! This test suite covers:
//! - Orchestrated introspection of database files in a directory
//! - Column and view definition capture
//! - Partial success when one target file is missing
//! - The fatal error when no target can be opened
//!
//! Note: databases are temporary files, so no containers are needed.

#![cfg(feature = "sqlite")]

use std::path::Path;

use dbcatalog_core::{
    CatalogConfig, ConnectionConfig, DbCatalogError, EngineKind, IntrospectionErrorKind,
    ObjectKind, Orchestrator, Result,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio_util::sync::CancellationToken;

/// Creates `name` inside `dir` with a small order schema.
async fn create_database(dir: &Path, name: &str) {
    let options = SqliteConnectOptions::new()
        .filename(dir.join(name))
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("create database file");

    for statement in [
        "CREATE TABLE customers (id INTEGER PRIMARY KEY, name VARCHAR(100) NOT NULL)",
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER NOT NULL, total DECIMAL(10,2))",
        "CREATE VIEW open_orders AS SELECT o.id, c.name FROM orders o JOIN customers c ON c.id = o.customer_id",
    ] {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("create schema");
    }
    pool.close().await;
}

fn sqlite_config(dir: &Path, databases: &[&str]) -> CatalogConfig {
    let connection = ConnectionConfig::new(EngineKind::Sqlite, dir.to_string_lossy());
    CatalogConfig::new(
        connection,
        databases.iter().map(|d| d.to_string()).collect(),
    )
}

// =============================================================================
// Live introspection
// =============================================================================

#[tokio::test]
async fn test_sqlite_catalog_from_directory() -> Result<()> {
    let dir = tempfile::tempdir().expect("tempdir");
    create_database(dir.path(), "shop.db").await;

    let config = sqlite_config(dir.path(), &["shop.db"]);
    let result = Orchestrator::for_connection(config.connection.clone())
        .run(&config, &CancellationToken::new())
        .await?;

    assert!(!result.has_errors(), "{:?}", result.errors);
    assert_eq!(result.catalog.len(), 3);

    let orders = result
        .catalog
        .iter()
        .find(|e| e.name == "orders")
        .expect("orders table");
    assert_eq!(orders.database, "shop.db");
    assert_eq!(orders.schema, "main");
    assert_eq!(orders.kind, ObjectKind::Table);
    assert!(orders.definition.is_empty());
    assert_eq!(orders.columns.len(), 3);
    assert!(orders.columns[0].is_identity);
    assert_eq!(orders.columns[2].type_name, "decimal");
    assert_eq!(orders.columns[2].precision, 10);
    assert_eq!(orders.columns[2].scale, 2);

    let view = result
        .catalog
        .iter()
        .find(|e| e.kind == ObjectKind::View)
        .expect("view");
    assert_eq!(view.name, "open_orders");
    assert!(view.definition.starts_with("CREATE VIEW open_orders"));
    assert!(view.dependencies.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_sqlite_missing_file_is_partial_failure() -> Result<()> {
    let dir = tempfile::tempdir().expect("tempdir");
    create_database(dir.path(), "shop.db").await;

    let config = sqlite_config(dir.path(), &["shop.db", "absent.db"]);
    let result = Orchestrator::for_connection(config.connection.clone())
        .run(&config, &CancellationToken::new())
        .await?;

    assert_eq!(result.catalog.len(), 3);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].database, "absent.db");
    assert_eq!(result.errors[0].kind, IntrospectionErrorKind::Connection);
    assert!(!dir.path().join("absent.db").exists());
    Ok(())
}

#[tokio::test]
async fn test_sqlite_no_reachable_database() {
    let dir = tempfile::tempdir().expect("tempdir");

    let config = sqlite_config(dir.path(), &["a.db", "b.db"]);
    let result = Orchestrator::for_connection(config.connection.clone())
        .run(&config, &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(DbCatalogError::NoReachableDatabase { attempted: 2 })
    ));
}

#[tokio::test]
async fn test_sqlite_catalog_filtering() -> Result<()> {
    let dir = tempfile::tempdir().expect("tempdir");
    create_database(dir.path(), "shop.db").await;

    let config = sqlite_config(dir.path(), &["shop.db"]);
    let result = Orchestrator::for_connection(config.connection.clone())
        .run(&config, &CancellationToken::new())
        .await?;

    let filtered = result.catalog.filter(
        &["orders".to_string(), "customers".to_string()],
        &["customers".to_string()],
    );
    let names: Vec<&str> = filtered.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["orders"]);
    Ok(())
}
