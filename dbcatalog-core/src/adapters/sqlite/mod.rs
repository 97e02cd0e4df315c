//! SQLite engine adapter.
//!
//! # Module Structure
//! - `connection`: File resolution and connection setup
//! - `type_mapping`: Declared column type parsing
//!
//! # SQLite-Specific Behavior
//! - SQLite has no schemas; every object reports the placeholder schema
//!   [`SQLITE_SCHEMA`]
//! - Objects come from `sqlite_master`, internal `sqlite_%` tables excluded
//! - Columns come from `PRAGMA table_info`
//! - There is no dependency catalog, so dependencies are always empty

pub mod connection;
pub mod type_mapping;

#[cfg(test)]
mod tests;

use super::{AdapterFeature, EngineAdapter, EngineKind, ObjectRef, helpers};
use crate::Result;
use crate::models::{ColumnDescriptor, DependencyRef};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

pub use type_mapping::parse_declared_type;

/// Schema value reported for every SQLite object.
pub const SQLITE_SCHEMA: &str = "main";

const LIST_OBJECTS: &str = "SELECT name, type FROM sqlite_master \
     WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%'";

const VIEW_DEFINITION: &str = "SELECT sql FROM sqlite_master WHERE type = 'view' AND name = ?";

/// SQLite adapter over a single-connection pool.
pub struct SqliteAdapter {
    pool: SqlitePool,
    read_only: bool,
}

impl std::fmt::Debug for SqliteAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteAdapter")
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

impl SqliteAdapter {
    /// Wraps an existing pool. The pool should hold a single connection.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            read_only: false,
        }
    }

    /// Closes the connection gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl EngineAdapter for SqliteAdapter {
    async fn list_objects(&self, database: &str) -> Result<Vec<ObjectRef>> {
        let rows = sqlx::query(LIST_OBJECTS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                helpers::sqlx_query_error(format!("Failed to list objects of '{}'", database), e)
            })?;

        let mut objects = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row
                .try_get("name")
                .map_err(|e| helpers::sqlx_query_error("sqlite_master.name", e))?;
            let type_name: String = row
                .try_get("type")
                .map_err(|e| helpers::sqlx_query_error("sqlite_master.type", e))?;
            let kind = helpers::decode_object_kind(&type_name, &name)?;
            objects.push(ObjectRef::new(SQLITE_SCHEMA, name, kind));
        }

        tracing::debug!("Found {} objects in SQLite database '{}'", objects.len(), database);
        Ok(objects)
    }

    async fn describe_columns(
        &self,
        _database: &str,
        _schema: &str,
        name: &str,
    ) -> Result<Vec<ColumnDescriptor>> {
        // PRAGMA arguments cannot be bound
        let query = format!("PRAGMA table_info({})", helpers::quote_literal(name));
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| helpers::sqlx_query_error(format!("Failed to read columns of '{}'", name), e))?;

        let mut columns = Vec::with_capacity(rows.len());
        let mut primary_key_columns = 0usize;
        let mut integer_key: Option<usize> = None;

        for row in rows {
            let column_name: String = row
                .try_get("name")
                .map_err(|e| helpers::sqlx_query_error("table_info.name", e))?;
            let declared: String = row
                .try_get("type")
                .map_err(|e| helpers::sqlx_query_error("table_info.type", e))?;
            let not_null: i64 = row
                .try_get("notnull")
                .map_err(|e| helpers::sqlx_query_error("table_info.notnull", e))?;
            let pk: i64 = row
                .try_get("pk")
                .map_err(|e| helpers::sqlx_query_error("table_info.pk", e))?;

            let parsed = parse_declared_type(&declared);
            if pk > 0 {
                primary_key_columns += 1;
                if parsed.type_name == "integer" {
                    integer_key = Some(columns.len());
                }
            }

            columns.push(ColumnDescriptor {
                name: column_name,
                type_name: parsed.type_name,
                max_length: parsed.max_length,
                precision: parsed.precision,
                scale: parsed.scale,
                collation: String::new(),
                nullable: not_null == 0,
                is_identity: false,
            });
        }

        // A lone INTEGER PRIMARY KEY aliases the rowid and auto-assigns values
        if primary_key_columns == 1
            && let Some(index) = integer_key
            && let Some(column) = columns.get_mut(index)
        {
            column.is_identity = true;
        }

        Ok(columns)
    }

    async fn get_definition(&self, _database: &str, _schema: &str, name: &str) -> Result<String> {
        let definition: Option<Option<String>> = sqlx::query_scalar(VIEW_DEFINITION)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                helpers::sqlx_query_error(format!("Failed to read definition of '{}'", name), e)
            })?;

        Ok(definition.flatten().unwrap_or_default())
    }

    async fn list_dependencies(
        &self,
        _database: &str,
        _schema: &str,
        _name: &str,
    ) -> Result<Vec<DependencyRef>> {
        Ok(Vec::new())
    }

    fn engine_kind(&self) -> EngineKind {
        EngineKind::Sqlite
    }

    fn supports_feature(&self, feature: AdapterFeature) -> bool {
        match feature {
            AdapterFeature::ReadOnlyMode => self.read_only,
            AdapterFeature::Schemas
            | AdapterFeature::Routines
            | AdapterFeature::DependencyTracking => false,
        }
    }
}
