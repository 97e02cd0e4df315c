//! SQL Server engine adapter.
//!
//! # Module Structure
//! - `connection`: TDS connection setup over a tokio TCP stream
//!
//! # SQL Server Catalog Sources
//! - `INFORMATION_SCHEMA.TABLES` unioned with `INFORMATION_SCHEMA.ROUTINES`
//! - `sys.columns` joined to `sys.types` for column metadata
//! - `OBJECT_DEFINITION` for view and routine source
//! - `sys.sql_expression_dependencies` for dependencies
//!
//! Database names are spliced into query text bracket-quoted; object names
//! are bound as parameters.

pub mod connection;

use super::{AdapterFeature, EngineAdapter, EngineKind, ObjectRef, helpers};
use crate::Result;
use crate::error::DbCatalogError;
use crate::models::{ColumnDescriptor, DependencyRef};
use async_trait::async_trait;
use tiberius::{Client, Row, ToSql};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::Compat;

/// Placeholder replaced by the bracket-quoted database name.
const DB_PLACEHOLDER: &str = "{db}";

const LIST_OBJECTS: &str = "SELECT TABLE_SCHEMA, TABLE_NAME, TABLE_TYPE \
     FROM {db}.INFORMATION_SCHEMA.TABLES \
     UNION ALL \
     SELECT ROUTINE_SCHEMA, ROUTINE_NAME, ROUTINE_TYPE \
     FROM {db}.INFORMATION_SCHEMA.ROUTINES";

const DESCRIBE_COLUMNS: &str = "SELECT c.name, tp.name AS type_name, c.max_length, c.precision, c.scale, \
     ISNULL(c.collation_name, '') AS collation_name, c.is_nullable, c.is_identity \
     FROM {db}.sys.columns c WITH (NOLOCK) \
     JOIN {db}.sys.types tp WITH (NOLOCK) ON c.user_type_id = tp.user_type_id \
     WHERE c.object_id = OBJECT_ID(@P1) \
     ORDER BY c.column_id";

const OBJECT_SOURCE: &str = "SELECT ISNULL(OBJECT_DEFINITION(OBJECT_ID(@P1)), '') AS definition";

const LIST_DEPENDENCIES: &str = "SELECT ISNULL(referenced_database_name, '') AS referenced_database_name, \
     ISNULL(referenced_schema_name, '') AS referenced_schema_name, \
     ISNULL(referenced_entity_name, '') AS referenced_entity_name \
     FROM {db}.sys.sql_expression_dependencies \
     WHERE referencing_id = OBJECT_ID(@P1)";

type TdsClient = Client<Compat<TcpStream>>;

/// SQL Server adapter holding one exclusive TDS connection.
pub struct SqlServerAdapter {
    client: Mutex<TdsClient>,
    read_only: bool,
}

impl std::fmt::Debug for SqlServerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlServerAdapter")
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

impl SqlServerAdapter {
    /// Runs one statement and returns the rows of its first result set.
    async fn fetch_rows(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        context: &str,
    ) -> Result<Vec<Row>> {
        let mut client = self.client.lock().await;
        let stream = client
            .query(sql, params)
            .await
            .map_err(|e| classify_error(context, e))?;
        stream
            .into_first_result()
            .await
            .map_err(|e| classify_error(context, e))
    }
}

/// Substitutes the quoted database name into a query template.
fn with_database(template: &str, database: &str) -> String {
    template.replace(DB_PLACEHOLDER, &helpers::quote_bracket(database))
}

/// Maps a driver error onto the connection/query/decode taxonomy.
fn classify_error(context: &str, error: tiberius::error::Error) -> DbCatalogError {
    use tiberius::error::Error as TdsError;

    match error {
        TdsError::Io { .. } | TdsError::Tls(_) | TdsError::Routing { .. } => {
            DbCatalogError::connection_failed(context, error)
        }
        TdsError::Conversion(_) | TdsError::ParseInt(_) | TdsError::Encoding(_) => {
            DbCatalogError::decode(format!("{}: {}", context, error))
        }
        other => DbCatalogError::query_failed(context, other),
    }
}

fn text_column(row: &Row, index: usize, field: &str, object: &str) -> Result<String> {
    row.try_get::<&str, usize>(index)
        .map_err(|_| DbCatalogError::decode_failed(field, Some(object)))
        .map(|value| value.unwrap_or_default().to_string())
}

fn flag_column(row: &Row, index: usize, field: &str, object: &str) -> Result<bool> {
    row.try_get::<bool, usize>(index)
        .map_err(|_| DbCatalogError::decode_failed(field, Some(object)))
        .map(|value| value.unwrap_or(false))
}

#[async_trait]
impl EngineAdapter for SqlServerAdapter {
    async fn list_objects(&self, database: &str) -> Result<Vec<ObjectRef>> {
        let sql = with_database(LIST_OBJECTS, database);
        let context = format!("Failed to list objects of '{}'", database);
        let rows = self.fetch_rows(&sql, &[], &context).await?;

        let mut objects = Vec::with_capacity(rows.len());
        for row in &rows {
            let schema = text_column(row, 0, "TABLE_SCHEMA", database)?;
            let name = text_column(row, 1, "TABLE_NAME", database)?;
            let type_name = text_column(row, 2, "TABLE_TYPE", &name)?;
            let kind = helpers::decode_object_kind(&type_name, &format!("{}.{}", schema, name))?;
            objects.push(ObjectRef::new(schema, name, kind));
        }

        tracing::debug!("Found {} objects in SQL Server database '{}'", objects.len(), database);
        Ok(objects)
    }

    async fn describe_columns(
        &self,
        database: &str,
        schema: &str,
        name: &str,
    ) -> Result<Vec<ColumnDescriptor>> {
        let sql = with_database(DESCRIBE_COLUMNS, database);
        let object = helpers::bracket_three_part(database, schema, name);
        let context = format!("Failed to read columns of '{}.{}'", schema, name);
        let rows = self.fetch_rows(&sql, &[&object], &context).await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let max_length = row
                .try_get::<i16, usize>(2)
                .map_err(|_| DbCatalogError::decode_failed("max_length", Some(name)))?
                .unwrap_or_default();
            let precision = row
                .try_get::<u8, usize>(3)
                .map_err(|_| DbCatalogError::decode_failed("precision", Some(name)))?
                .unwrap_or_default();
            let scale = row
                .try_get::<u8, usize>(4)
                .map_err(|_| DbCatalogError::decode_failed("scale", Some(name)))?
                .unwrap_or_default();

            columns.push(ColumnDescriptor {
                name: text_column(row, 0, "name", name)?,
                type_name: text_column(row, 1, "type_name", name)?,
                max_length: i64::from(max_length),
                precision: i64::from(precision),
                scale: i64::from(scale),
                collation: text_column(row, 5, "collation_name", name)?,
                nullable: flag_column(row, 6, "is_nullable", name)?,
                is_identity: flag_column(row, 7, "is_identity", name)?,
            });
        }

        Ok(columns)
    }

    async fn get_definition(&self, database: &str, schema: &str, name: &str) -> Result<String> {
        let object = helpers::bracket_three_part(database, schema, name);
        let context = format!("Failed to read definition of '{}.{}'", schema, name);
        let rows = self.fetch_rows(OBJECT_SOURCE, &[&object], &context).await?;

        match rows.first() {
            Some(row) => text_column(row, 0, "definition", name),
            None => Ok(String::new()),
        }
    }

    async fn list_dependencies(
        &self,
        database: &str,
        schema: &str,
        name: &str,
    ) -> Result<Vec<DependencyRef>> {
        let sql = with_database(LIST_DEPENDENCIES, database);
        let object = helpers::bracket_three_part(database, schema, name);
        let context = format!("Failed to read dependencies of '{}.{}'", schema, name);
        let rows = self.fetch_rows(&sql, &[&object], &context).await?;

        rows.iter()
            .map(|row| {
                Ok(DependencyRef::new(
                    text_column(row, 0, "referenced_database_name", name)?,
                    text_column(row, 1, "referenced_schema_name", name)?,
                    text_column(row, 2, "referenced_entity_name", name)?,
                ))
            })
            .collect()
    }

    fn engine_kind(&self) -> EngineKind {
        EngineKind::SqlServer
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
