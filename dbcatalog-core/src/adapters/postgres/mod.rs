//! PostgreSQL engine adapter.
//!
//! # Module Structure
//! - `connection`: Single-connection pool setup with session settings
//!
//! Objects, columns and definitions come from `information_schema`. Only
//! views report dependencies, via `information_schema.view_table_usage`.

mod connection;

use super::{AdapterFeature, EngineAdapter, EngineKind, ObjectRef, helpers};
use crate::Result;
use crate::models::{ColumnDescriptor, DependencyRef};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

const LIST_OBJECTS: &str = r#"
    SELECT table_schema::text AS object_schema, table_name::text AS object_name, table_type::text AS object_type
    FROM information_schema.tables
    WHERE table_schema NOT IN ('pg_catalog', 'information_schema')
      AND table_type IN ('BASE TABLE', 'VIEW')
    UNION ALL
    SELECT routine_schema::text, routine_name::text, routine_type::text
    FROM information_schema.routines
    WHERE routine_schema NOT IN ('pg_catalog', 'information_schema')
      AND routine_type IN ('FUNCTION', 'PROCEDURE')
"#;

const DESCRIBE_COLUMNS: &str = r#"
    SELECT
        column_name::text AS column_name,
        udt_name::text AS type_name,
        COALESCE(character_maximum_length, 0)::bigint AS max_length,
        COALESCE(numeric_precision, 0)::bigint AS precision,
        COALESCE(numeric_scale, 0)::bigint AS scale,
        COALESCE(collation_name, '')::text AS collation,
        (is_nullable = 'YES') AS nullable,
        (is_identity = 'YES' OR COALESCE(column_default, '') LIKE 'nextval(%') AS is_identity
    FROM information_schema.columns
    WHERE table_schema = $1 AND table_name = $2
    ORDER BY ordinal_position
"#;

const OBJECT_SOURCE: &str = r#"
    SELECT COALESCE(view_definition, '')::text AS definition
    FROM information_schema.views
    WHERE table_schema = $1 AND table_name = $2
    UNION ALL
    SELECT COALESCE(routine_definition, '')::text
    FROM information_schema.routines
    WHERE routine_schema = $1 AND routine_name = $2
    LIMIT 1
"#;

const LIST_DEPENDENCIES: &str = r#"
    SELECT table_catalog::text AS referenced_database,
           table_schema::text AS referenced_schema,
           table_name::text AS referenced_table
    FROM information_schema.view_table_usage
    WHERE view_schema = $1 AND view_name = $2
"#;

/// PostgreSQL adapter over a single-connection pool.
pub struct PostgresAdapter {
    pool: PgPool,
    read_only: bool,
}

impl std::fmt::Debug for PostgresAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresAdapter")
            .field("read_only", &self.read_only)
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

#[async_trait]
impl EngineAdapter for PostgresAdapter {
    async fn list_objects(&self, database: &str) -> Result<Vec<ObjectRef>> {
        let rows = sqlx::query(LIST_OBJECTS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                helpers::sqlx_query_error(format!("Failed to list objects of '{}'", database), e)
            })?;

        let mut objects = Vec::with_capacity(rows.len());
        for row in rows {
            let schema: String = row
                .try_get("object_schema")
                .map_err(|e| helpers::sqlx_query_error("object_schema", e))?;
            let name: String = row
                .try_get("object_name")
                .map_err(|e| helpers::sqlx_query_error("object_name", e))?;
            let type_name: String = row
                .try_get("object_type")
                .map_err(|e| helpers::sqlx_query_error("object_type", e))?;
            let kind = helpers::decode_object_kind(&type_name, &format!("{}.{}", schema, name))?;
            objects.push(ObjectRef::new(schema, name, kind));
        }

        tracing::debug!("Found {} objects in PostgreSQL database '{}'", objects.len(), database);
        Ok(objects)
    }

    async fn describe_columns(
        &self,
        _database: &str,
        schema: &str,
        name: &str,
    ) -> Result<Vec<ColumnDescriptor>> {
        let rows = sqlx::query(DESCRIBE_COLUMNS)
            .bind(schema)
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                helpers::sqlx_query_error(
                    format!("Failed to read columns of '{}.{}'", schema, name),
                    e,
                )
            })?;

        rows.iter()
            .map(|row| {
                let field = |e| helpers::sqlx_query_error(format!("column of '{}'", name), e);
                Ok(ColumnDescriptor {
                    name: row.try_get("column_name").map_err(field)?,
                    type_name: row.try_get("type_name").map_err(field)?,
                    max_length: row.try_get("max_length").map_err(field)?,
                    precision: row.try_get("precision").map_err(field)?,
                    scale: row.try_get("scale").map_err(field)?,
                    collation: row.try_get("collation").map_err(field)?,
                    nullable: row.try_get("nullable").map_err(field)?,
                    is_identity: row.try_get("is_identity").map_err(field)?,
                })
            })
            .collect()
    }

    async fn get_definition(&self, _database: &str, schema: &str, name: &str) -> Result<String> {
        let definition: Option<String> = sqlx::query_scalar(OBJECT_SOURCE)
            .bind(schema)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                helpers::sqlx_query_error(
                    format!("Failed to read definition of '{}.{}'", schema, name),
                    e,
                )
            })?;

        Ok(definition.unwrap_or_default())
    }

    async fn list_dependencies(
        &self,
        _database: &str,
        schema: &str,
        name: &str,
    ) -> Result<Vec<DependencyRef>> {
        let rows = sqlx::query(LIST_DEPENDENCIES)
            .bind(schema)
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                helpers::sqlx_query_error(
                    format!("Failed to read dependencies of '{}.{}'", schema, name),
                    e,
                )
            })?;

        rows.iter()
            .map(|row| {
                let field = |e| helpers::sqlx_query_error(format!("dependency of '{}'", name), e);
                Ok(DependencyRef::new(
                    row.try_get::<String, _>("referenced_database").map_err(field)?,
                    row.try_get::<String, _>("referenced_schema").map_err(field)?,
                    row.try_get::<String, _>("referenced_table").map_err(field)?,
                ))
            })
            .collect()
    }

    fn engine_kind(&self) -> EngineKind {
        EngineKind::PostgreSql
    }

    fn supports_feature(&self, feature: AdapterFeature) -> bool {
        match feature {
            AdapterFeature::Schemas
            | AdapterFeature::Routines
            | AdapterFeature::DependencyTracking => true,
            AdapterFeature::ReadOnlyMode => self.read_only,
        }
    }
}
