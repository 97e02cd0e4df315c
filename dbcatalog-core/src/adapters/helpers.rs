//! Helper utilities shared by the engine adapters.
//!
//! Identifiers spliced into query text always pass through one of the
//! quoting functions here; values are bound as parameters wherever the
//! driver allows it.

use crate::{
    Result,
    error::DbCatalogError,
    models::ObjectKind,
};

/// Quotes an identifier for SQL Server: `[name]`, with `]` doubled.
///
/// # Example
/// ```rust
/// use dbcatalog_core::adapters::helpers::quote_bracket;
///
/// assert_eq!(quote_bracket("Sales"), "[Sales]");
/// assert_eq!(quote_bracket("odd]name"), "[odd]]name]");
/// ```
pub fn quote_bracket(identifier: &str) -> String {
    format!("[{}]", identifier.replace(']', "]]"))
}

/// Quotes a string literal: `'value'`, with `'` doubled.
///
/// Used for SQLite pragma arguments and SQL Server `N'...'` object names,
/// which cannot be bound as parameters.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Builds the three-part name `[db].[schema].[name]` used with `OBJECT_ID`.
pub fn bracket_three_part(database: &str, schema: &str, name: &str) -> String {
    format!(
        "{}.{}.{}",
        quote_bracket(database),
        quote_bracket(schema),
        quote_bracket(name)
    )
}

/// Maps an engine type string to an [`ObjectKind`] or reports a decode error.
///
/// # Arguments
/// * `type_name` - Raw type column from the engine catalog
/// * `object_context` - Object name for the error message
pub fn decode_object_kind(type_name: &str, object_context: &str) -> Result<ObjectKind> {
    ObjectKind::from_engine_type(type_name).ok_or_else(|| {
        DbCatalogError::decode(format!(
            "unknown object type '{}' for '{}'",
            type_name, object_context
        ))
    })
}

/// Converts a driver error into a `Query` error with context.
#[cfg(any(feature = "sqlite", feature = "postgresql", feature = "mysql"))]
pub(crate) fn sqlx_query_error(context: impl Into<String>, error: sqlx::Error) -> DbCatalogError {
    match error {
        sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::Decode(_) => {
            DbCatalogError::decode(format!("{}: {}", context.into(), error))
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => DbCatalogError::connection_failed(context, error),
        other => DbCatalogError::query_failed(context, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_bracket_escapes_closing_bracket() {
        assert_eq!(quote_bracket("dbo"), "[dbo]");
        assert_eq!(quote_bracket("a]b"), "[a]]b]");
        assert_eq!(quote_bracket("]; DROP TABLE x; --"), "[]]; DROP TABLE x; --]");
    }

    #[test]
    fn test_quote_literal_escapes_quotes() {
        assert_eq!(quote_literal("Orders"), "'Orders'");
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn test_bracket_three_part() {
        assert_eq!(
            bracket_three_part("Sales", "dbo", "Orders"),
            "[Sales].[dbo].[Orders]"
        );
    }

    #[test]
    fn test_decode_object_kind() {
        assert_eq!(
            decode_object_kind("BASE TABLE", "dbo.Orders").ok(),
            Some(ObjectKind::Table)
        );
        let err = decode_object_kind("SYNONYM", "dbo.Alias").expect_err("unknown type");
        assert!(matches!(err, DbCatalogError::Decode { .. }));
        assert!(err.to_string().contains("SYNONYM"));
    }
}
