//! Unit tests for the SQLite adapter against an in-memory database.

use crate::adapters::{AdapterFeature, EngineAdapter, EngineKind};
use crate::error::DbCatalogError;
use crate::models::ObjectKind;

use super::{SQLITE_SCHEMA, SqliteAdapter};
use sqlx::sqlite::SqlitePoolOptions;

async fn memory_adapter(statements: &[&str]) -> SqliteAdapter {
    // One connection, otherwise every pooled connection sees its own empty database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");

    for statement in statements {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("prepare schema");
    }

    SqliteAdapter::from_pool(pool)
}

// =============================================================================
// Object Enumeration
// =============================================================================

#[tokio::test]
async fn test_sqlite_list_objects_uses_placeholder_schema() {
    let adapter = memory_adapter(&[
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, total DECIMAL(10,2))",
        "CREATE VIEW open_orders AS SELECT id FROM orders WHERE total > 0",
    ])
    .await;

    let objects = adapter.list_objects("shop").await.expect("list objects");

    assert_eq!(objects.len(), 2);
    assert!(objects.iter().all(|o| o.schema == SQLITE_SCHEMA));
    assert!(
        objects
            .iter()
            .any(|o| o.name == "orders" && o.kind == ObjectKind::Table)
    );
    assert!(
        objects
            .iter()
            .any(|o| o.name == "open_orders" && o.kind == ObjectKind::View)
    );
}

#[tokio::test]
async fn test_sqlite_list_objects_skips_internal_tables() {
    // AUTOINCREMENT creates the internal sqlite_sequence table
    let adapter = memory_adapter(&[
        "CREATE TABLE events (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)",
    ])
    .await;

    let objects = adapter.list_objects("shop").await.expect("list objects");
    let names: Vec<&str> = objects.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["events"]);
}

// =============================================================================
// Columns
// =============================================================================

#[tokio::test]
async fn test_sqlite_describe_columns() {
    let adapter = memory_adapter(&[
        "CREATE TABLE customers (id INTEGER PRIMARY KEY, name VARCHAR(80) NOT NULL, balance DECIMAL(12,2))",
    ])
    .await;

    let columns = adapter
        .describe_columns("shop", SQLITE_SCHEMA, "customers")
        .await
        .expect("describe columns");

    assert_eq!(columns.len(), 3);

    assert_eq!(columns[0].name, "id");
    assert_eq!(columns[0].type_name, "integer");
    assert!(columns[0].is_identity);

    assert_eq!(columns[1].name, "name");
    assert_eq!(columns[1].type_name, "varchar");
    assert_eq!(columns[1].max_length, 80);
    assert!(!columns[1].nullable);
    assert!(!columns[1].is_identity);

    assert_eq!(columns[2].precision, 12);
    assert_eq!(columns[2].scale, 2);
    assert!(columns[2].nullable);
}

#[tokio::test]
async fn test_sqlite_composite_key_is_not_identity() {
    let adapter = memory_adapter(&[
        "CREATE TABLE order_lines (order_id INTEGER, line INTEGER, PRIMARY KEY (order_id, line))",
    ])
    .await;

    let columns = adapter
        .describe_columns("shop", SQLITE_SCHEMA, "order_lines")
        .await
        .expect("describe columns");

    assert!(columns.iter().all(|c| !c.is_identity));
}

#[tokio::test]
async fn test_sqlite_describe_columns_quotes_name() {
    let adapter = memory_adapter(&["CREATE TABLE \"it's\" (value TEXT)"]).await;

    let columns = adapter
        .describe_columns("shop", SQLITE_SCHEMA, "it's")
        .await
        .expect("describe columns");

    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].name, "value");
}

// =============================================================================
// Definitions and Dependencies
// =============================================================================

#[tokio::test]
async fn test_sqlite_definitions() {
    let adapter = memory_adapter(&[
        "CREATE TABLE orders (id INTEGER PRIMARY KEY)",
        "CREATE VIEW all_orders AS SELECT id FROM orders",
    ])
    .await;

    let table_definition = adapter
        .get_definition("shop", SQLITE_SCHEMA, "orders")
        .await
        .expect("table definition");
    assert!(table_definition.is_empty());

    let view_definition = adapter
        .get_definition("shop", SQLITE_SCHEMA, "all_orders")
        .await
        .expect("view definition");
    assert!(view_definition.starts_with("CREATE VIEW all_orders"));
}

#[tokio::test]
async fn test_sqlite_dependencies_are_empty() {
    let adapter = memory_adapter(&[
        "CREATE TABLE orders (id INTEGER PRIMARY KEY)",
        "CREATE VIEW all_orders AS SELECT id FROM orders",
    ])
    .await;

    let dependencies = adapter
        .list_dependencies("shop", SQLITE_SCHEMA, "all_orders")
        .await
        .expect("dependencies");
    assert!(dependencies.is_empty());
}

// =============================================================================
// Adapter Properties
// =============================================================================

#[tokio::test]
async fn test_sqlite_adapter_features() {
    let adapter = memory_adapter(&[]).await;

    assert_eq!(adapter.engine_kind(), EngineKind::Sqlite);
    assert!(!adapter.supports_feature(AdapterFeature::Schemas));
    assert!(!adapter.supports_feature(AdapterFeature::Routines));
    assert!(!adapter.supports_feature(AdapterFeature::DependencyTracking));
    assert!(!format!("{:?}", adapter).contains("pool"));
}

#[tokio::test]
async fn test_sqlite_closed_pool_reports_error() {
    let adapter = memory_adapter(&[]).await;
    adapter.close().await;

    let result = adapter.list_objects("shop").await;
    assert!(matches!(result, Err(DbCatalogError::Connection { .. })));
}
