//! MySQL engine adapter.
//!
//! MySQL catalogs tables, views and routines in `information_schema` but has
//! no dependency catalog, so dependencies are always empty. A MySQL database
//! is its own schema; entries report the database name as schema.

mod connection;

use super::{AdapterFeature, EngineAdapter, EngineKind, ObjectRef, helpers};
use crate::Result;
use crate::models::{ColumnDescriptor, DependencyRef};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row};

const LIST_OBJECTS: &str = r#"
    SELECT CAST(TABLE_SCHEMA AS CHAR) AS object_schema,
           CAST(TABLE_NAME AS CHAR) AS object_name,
           CAST(TABLE_TYPE AS CHAR) AS object_type
    FROM information_schema.TABLES
    WHERE TABLE_SCHEMA = ?
    UNION ALL
    SELECT CAST(ROUTINE_SCHEMA AS CHAR),
           CAST(ROUTINE_NAME AS CHAR),
           CAST(ROUTINE_TYPE AS CHAR)
    FROM information_schema.ROUTINES
    WHERE ROUTINE_SCHEMA = ?
"#;

const DESCRIBE_COLUMNS: &str = r#"
    SELECT
        CAST(COLUMN_NAME AS CHAR) AS column_name,
        CAST(DATA_TYPE AS CHAR) AS type_name,
        CAST(COALESCE(CHARACTER_MAXIMUM_LENGTH, 0) AS SIGNED) AS max_length,
        CAST(COALESCE(NUMERIC_PRECISION, 0) AS SIGNED) AS numeric_precision,
        CAST(COALESCE(NUMERIC_SCALE, 0) AS SIGNED) AS numeric_scale,
        CAST(COALESCE(COLLATION_NAME, '') AS CHAR) AS collation,
        CAST(IS_NULLABLE AS CHAR) AS is_nullable,
        CAST(EXTRA AS CHAR) AS extra
    FROM information_schema.COLUMNS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
"#;

const OBJECT_SOURCE: &str = r#"
    SELECT CAST(COALESCE(VIEW_DEFINITION, '') AS CHAR) AS definition
    FROM information_schema.VIEWS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
    UNION ALL
    SELECT CAST(COALESCE(ROUTINE_DEFINITION, '') AS CHAR)
    FROM information_schema.ROUTINES
    WHERE ROUTINE_SCHEMA = ? AND ROUTINE_NAME = ?
    LIMIT 1
"#;

/// MySQL adapter over a single-connection pool.
pub struct MySqlAdapter {
    pool: MySqlPool,
    read_only: bool,
}

impl std::fmt::Debug for MySqlAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlAdapter")
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EngineAdapter for MySqlAdapter {
    async fn list_objects(&self, database: &str) -> Result<Vec<ObjectRef>> {
        let rows = sqlx::query(LIST_OBJECTS)
            .bind(database)
            .bind(database)
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

        tracing::debug!("Found {} objects in MySQL database '{}'", objects.len(), database);
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
                let is_nullable: String = row.try_get("is_nullable").map_err(field)?;
                let extra: String = row.try_get("extra").map_err(field)?;
                Ok(ColumnDescriptor {
                    name: row.try_get("column_name").map_err(field)?,
                    type_name: row.try_get("type_name").map_err(field)?,
                    max_length: row.try_get("max_length").map_err(field)?,
                    precision: row.try_get("numeric_precision").map_err(field)?,
                    scale: row.try_get("numeric_scale").map_err(field)?,
                    collation: row.try_get("collation").map_err(field)?,
                    nullable: is_nullable.eq_ignore_ascii_case("YES"),
                    is_identity: extra.to_ascii_lowercase().contains("auto_increment"),
                })
            })
            .collect()
    }

    async fn get_definition(&self, _database: &str, schema: &str, name: &str) -> Result<String> {
        let definition: Option<String> = sqlx::query_scalar(OBJECT_SOURCE)
            .bind(schema)
            .bind(name)
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
        _schema: &str,
        _name: &str,
    ) -> Result<Vec<DependencyRef>> {
        Ok(Vec::new())
    }

    fn engine_kind(&self) -> EngineKind {
        EngineKind::MySql
    }

    fn supports_feature(&self, feature: AdapterFeature) -> bool {
        match feature {
            AdapterFeature::Schemas | AdapterFeature::Routines => true,
            AdapterFeature::DependencyTracking => false,
            AdapterFeature::ReadOnlyMode => self.read_only,
        }
    }
}
