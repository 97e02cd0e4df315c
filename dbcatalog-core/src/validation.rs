//! JSON Schema validation for catalog snapshots.
//!
//! A snapshot is read back from disk by later runs, so its structure is
//! checked against an embedded schema before it is deserialized. This turns a
//! truncated or hand-edited file into a `Validation` error naming the first
//! offending value instead of a bare serde message.
//!
//! # Example
//! ```rust
//! use dbcatalog_core::validation::validate_snapshot;
//! use serde_json::json;
//!
//! let snapshot = json!([{
//!     "database": "Sales",
//!     "schema": "dbo",
//!     "name": "Orders",
//!     "kind": "Table",
//!     "definition": "",
//!     "columns": [],
//!     "dependencies": []
//! }]);
//! assert!(validate_snapshot(&snapshot).is_ok());
//! assert!(validate_snapshot(&json!({"entries": []})).is_err());
//! ```

use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value;

use crate::error::{DbCatalogError, Result};

/// Embedded JSON Schema of the snapshot document
const SNAPSHOT_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "Database catalog snapshot",
  "type": "array",
  "items": {
    "type": "object",
    "required": ["database", "schema", "name", "kind"],
    "properties": {
      "database": { "type": "string" },
      "schema": { "type": "string" },
      "name": { "type": "string" },
      "kind": { "enum": ["Table", "View", "Function", "Procedure"] },
      "definition": { "type": "string" },
      "columns": {
        "type": "array",
        "items": {
          "type": "object",
          "required": ["name", "type_name", "max_length", "precision", "scale", "collation", "nullable", "is_identity"],
          "properties": {
            "name": { "type": "string" },
            "type_name": { "type": "string" },
            "max_length": { "type": "integer" },
            "precision": { "type": "integer" },
            "scale": { "type": "integer" },
            "collation": { "type": "string" },
            "nullable": { "type": "boolean" },
            "is_identity": { "type": "boolean" }
          }
        }
      },
      "dependencies": {
        "type": "array",
        "items": {
          "type": "object",
          "required": ["referenced_database", "referenced_schema", "referenced_table"],
          "properties": {
            "referenced_database": { "type": "string" },
            "referenced_schema": { "type": "string" },
            "referenced_table": { "type": "string" }
          }
        }
      }
    }
  }
}"#;

/// Compiled schema (initialized once)
static COMPILED_SCHEMA: OnceLock<Validator> = OnceLock::new();

fn compiled_schema() -> Result<&'static Validator> {
    if let Some(validator) = COMPILED_SCHEMA.get() {
        return Ok(validator);
    }

    let schema_json: Value = serde_json::from_str(SNAPSHOT_SCHEMA)
        .map_err(|e| DbCatalogError::serialization("Failed to parse embedded snapshot schema", e))?;

    let compiled = jsonschema::validator_for(&schema_json).map_err(|e| DbCatalogError::Validation {
        message: format!("Snapshot schema compilation error: {}", e),
    })?;

    // Another thread may have won the race; either instance is equivalent
    let _ = COMPILED_SCHEMA.set(compiled);
    COMPILED_SCHEMA.get().ok_or_else(|| DbCatalogError::Validation {
        message: "snapshot schema validator unavailable".to_string(),
    })
}

/// Validates a parsed snapshot document against the snapshot schema.
///
/// # Errors
/// Returns `DbCatalogError::Validation` describing the first violation.
pub fn validate_snapshot(json_value: &Value) -> Result<()> {
    let schema = compiled_schema()?;

    if let Err(validation_error) = schema.validate(json_value) {
        return Err(DbCatalogError::Validation {
            message: format!("snapshot does not match the catalog format: {}", validation_error),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry() -> Value {
        json!({
            "database": "Sales",
            "schema": "dbo",
            "name": "vOrders",
            "kind": "View",
            "definition": "CREATE VIEW dbo.vOrders AS SELECT 1 AS x",
            "columns": [{
                "name": "x",
                "type_name": "int",
                "max_length": 4,
                "precision": 10,
                "scale": 0,
                "collation": "",
                "nullable": false,
                "is_identity": false
            }],
            "dependencies": [{
                "referenced_database": "Sales",
                "referenced_schema": "dbo",
                "referenced_table": "Orders"
            }]
        })
    }

    #[test]
    fn test_accepts_empty_and_populated_snapshots() {
        assert!(validate_snapshot(&json!([])).is_ok());
        assert!(validate_snapshot(&json!([entry(), entry()])).is_ok());
    }

    #[test]
    fn test_optional_collections_may_be_absent() {
        let minimal = json!([{ "database": "a", "schema": "main", "name": "t", "kind": "Table" }]);
        assert!(validate_snapshot(&minimal).is_ok());
    }

    #[test]
    fn test_accepts_empty_identity_fields() {
        let mut blank = entry();
        blank["name"] = json!("");
        blank["schema"] = json!("");
        assert!(validate_snapshot(&json!([blank])).is_ok());
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let mut bad = entry();
        bad["kind"] = json!("Synonym");
        let err = validate_snapshot(&json!([bad])).unwrap_err();
        assert!(matches!(err, DbCatalogError::Validation { .. }));
        assert!(err.to_string().contains("Synonym"), "{}", err);
    }

    #[test]
    fn test_rejects_missing_name_and_wrong_types() {
        let mut missing = entry();
        missing.as_object_mut().unwrap().remove("name");
        assert!(validate_snapshot(&json!([missing])).is_err());

        let mut wrong = entry();
        wrong["columns"][0]["nullable"] = json!("yes");
        assert!(validate_snapshot(&json!([wrong])).is_err());
    }

    #[test]
    fn test_rejects_non_array_document() {
        assert!(validate_snapshot(&json!({ "entries": [] })).is_err());
        assert!(validate_snapshot(&json!("[]")).is_err());
    }
}
