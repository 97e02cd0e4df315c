//! Core data models for catalog entries.
//!
//! These types are shared by every engine adapter, the export renderers and
//! the snapshot format. Field names are serialized in snake_case and the
//! field order of each struct is the order of the serialized document.

use serde::{Deserialize, Serialize};

/// Kind of a cataloged database object
///
/// Serialized as its variant name (`"Table"`, `"View"`, ...) in every format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Table,
    View,
    Function,
    Procedure,
}

impl ObjectKind {
    /// Capitalized name used in document headings and the XML `kind` element.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Table => "Table",
            ObjectKind::View => "View",
            ObjectKind::Function => "Function",
            ObjectKind::Procedure => "Procedure",
        }
    }

    /// Maps an engine's catalog type string to an object kind.
    ///
    /// Accepts the `INFORMATION_SCHEMA` spellings (`BASE TABLE`, `VIEW`,
    /// `FUNCTION`, `PROCEDURE`) and the lowercase `sqlite_master` spellings
    /// (`table`, `view`). Returns `None` for anything else.
    pub fn from_engine_type(type_name: &str) -> Option<Self> {
        match type_name.trim() {
            "BASE TABLE" | "table" => Some(Self::Table),
            "VIEW" | "view" => Some(Self::View),
            "FUNCTION" => Some(Self::Function),
            "PROCEDURE" => Some(Self::Procedure),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Table => write!(f, "table"),
            ObjectKind::View => write!(f, "view"),
            ObjectKind::Function => write!(f, "function"),
            ObjectKind::Procedure => write!(f, "procedure"),
        }
    }
}

/// Column metadata as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub type_name: String,
    pub max_length: i64,
    pub precision: i64,
    pub scale: i64,
    pub collation: String,
    pub nullable: bool,
    pub is_identity: bool,
}

/// A directed reference from a catalog entry to an object it depends on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DependencyRef {
    pub referenced_database: String,
    pub referenced_schema: String,
    pub referenced_table: String,
}

impl DependencyRef {
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            referenced_database: database.into(),
            referenced_schema: schema.into(),
            referenced_table: table.into(),
        }
    }

    /// An edge without a target schema or table carries no information.
    pub fn has_target(&self) -> bool {
        !self.referenced_schema.trim().is_empty() && !self.referenced_table.trim().is_empty()
    }
}

/// Identity key of a catalog entry: `(database, schema, name)`
pub type EntryIdentity = (String, String, String);

/// One introspected table, view, function or procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub database: String,
    pub schema: String,
    pub name: String,
    pub kind: ObjectKind,
    /// Stored source text; empty for base tables
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,
}

impl CatalogEntry {
    /// Creates an entry with no definition, columns or dependencies.
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
        kind: ObjectKind,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            name: name.into(),
            kind,
            definition: String::new(),
            columns: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn identity(&self) -> EntryIdentity {
        (
            self.database.clone(),
            self.schema.clone(),
            self.name.clone(),
        )
    }

    /// Renders `database.schema.name`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}.{}", self.database, self.schema, self.name)
    }

    /// Returns true when the edge points back at this entry.
    pub fn is_self_reference(&self, dependency: &DependencyRef) -> bool {
        dependency.referenced_table == self.name
            && dependency.referenced_schema == self.schema
            && (dependency.referenced_database.is_empty()
                || dependency.referenced_database == self.database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_kind_from_engine_type() {
        assert_eq!(
            ObjectKind::from_engine_type("BASE TABLE"),
            Some(ObjectKind::Table)
        );
        assert_eq!(ObjectKind::from_engine_type("table"), Some(ObjectKind::Table));
        assert_eq!(ObjectKind::from_engine_type("VIEW"), Some(ObjectKind::View));
        assert_eq!(ObjectKind::from_engine_type("view"), Some(ObjectKind::View));
        assert_eq!(
            ObjectKind::from_engine_type("FUNCTION"),
            Some(ObjectKind::Function)
        );
        assert_eq!(
            ObjectKind::from_engine_type("PROCEDURE"),
            Some(ObjectKind::Procedure)
        );
        assert_eq!(ObjectKind::from_engine_type("SYNONYM"), None);
        assert_eq!(ObjectKind::from_engine_type(""), None);
    }

    #[test]
    fn test_object_kind_serde() {
        let json = serde_json::to_string(&ObjectKind::Procedure).expect("serialize kind");
        assert_eq!(json, "\"Procedure\"");
        let kind: ObjectKind = serde_json::from_str("\"View\"").expect("deserialize kind");
        assert_eq!(kind, ObjectKind::View);
        assert!(serde_json::from_str::<ObjectKind>("\"Synonym\"").is_err());

        for kind in [
            ObjectKind::Table,
            ObjectKind::View,
            ObjectKind::Function,
            ObjectKind::Procedure,
        ] {
            let json = serde_json::to_string(&kind).expect("serialize kind");
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_object_kind_display() {
        assert_eq!(ObjectKind::Table.to_string(), "table");
        assert_eq!(ObjectKind::Procedure.to_string(), "procedure");
    }

    #[test]
    fn test_identity_and_qualified_name() {
        let entry = CatalogEntry::new("Sales", "dbo", "Orders", ObjectKind::Table);
        assert_eq!(
            entry.identity(),
            ("Sales".to_string(), "dbo".to_string(), "Orders".to_string())
        );
        assert_eq!(entry.qualified_name(), "Sales.dbo.Orders");
    }

    #[test]
    fn test_dependency_has_target() {
        assert!(DependencyRef::new("Sales", "dbo", "Orders").has_target());
        assert!(DependencyRef::new("", "dbo", "Orders").has_target());
        assert!(!DependencyRef::new("Sales", "dbo", "").has_target());
        assert!(!DependencyRef::new("Sales", " ", "Orders").has_target());
    }

    #[test]
    fn test_self_reference() {
        let entry = CatalogEntry::new("Sales", "dbo", "vOrders", ObjectKind::View);
        assert!(entry.is_self_reference(&DependencyRef::new("Sales", "dbo", "vOrders")));
        assert!(entry.is_self_reference(&DependencyRef::new("", "dbo", "vOrders")));
        assert!(!entry.is_self_reference(&DependencyRef::new("Sales", "dbo", "Orders")));
        assert!(!entry.is_self_reference(&DependencyRef::new("Archive", "dbo", "vOrders")));
    }

    #[test]
    fn test_entry_serializes_snake_case() {
        let mut entry = CatalogEntry::new("Sales", "dbo", "Orders", ObjectKind::Table);
        entry.columns.push(ColumnDescriptor {
            name: "Id".to_string(),
            type_name: "int".to_string(),
            is_identity: true,
            ..ColumnDescriptor::default()
        });

        let json = serde_json::to_value(&entry).expect("serialize entry");
        assert_eq!(json["kind"], "Table");
        assert_eq!(json["columns"][0]["type_name"], "int");
        assert_eq!(json["columns"][0]["is_identity"], true);
        assert!(json["dependencies"].as_array().is_some_and(Vec::is_empty));
    }
}
