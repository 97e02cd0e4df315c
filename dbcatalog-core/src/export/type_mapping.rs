//! Engine type names to target-language types, and generated type
//! definition files.
//!
//! The lookup is a fixed table keyed by lowercase engine type name.
//! Unrecognized types map to the target's untyped placeholder.

use std::str::FromStr;

use crate::error::DbCatalogError;
use crate::models::CatalogEntry;

/// Language of generated type-definition files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeTarget {
    #[default]
    Go,
    Rust,
}

impl TypeTarget {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            TypeTarget::Go => "go",
            TypeTarget::Rust => "rs",
        }
    }

    fn fallback(&self) -> &'static str {
        match self {
            TypeTarget::Go => "interface{}",
            TypeTarget::Rust => "serde_json::Value",
        }
    }
}

impl FromStr for TypeTarget {
    type Err = DbCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "go" => Ok(TypeTarget::Go),
            "rust" | "rs" => Ok(TypeTarget::Rust),
            other => Err(DbCatalogError::configuration(format!(
                "unknown type target '{}'",
                other
            ))),
        }
    }
}

/// `(engine type, Go type, Rust type)`
const TYPE_TABLE: &[(&str, &str, &str)] = &[
    ("int", "int", "i32"),
    ("integer", "int64", "i64"),
    ("bigint", "int64", "i64"),
    ("smallint", "int16", "i16"),
    ("tinyint", "uint8", "u8"),
    ("int2", "int16", "i16"),
    ("int4", "int32", "i32"),
    ("int8", "int64", "i64"),
    ("varchar", "string", "String"),
    ("nvarchar", "string", "String"),
    ("char", "string", "String"),
    ("nchar", "string", "String"),
    ("bpchar", "string", "String"),
    ("text", "string", "String"),
    ("ntext", "string", "String"),
    ("uniqueidentifier", "string", "String"),
    ("uuid", "string", "String"),
    ("datetime", "time.Time", "chrono::NaiveDateTime"),
    ("datetime2", "time.Time", "chrono::NaiveDateTime"),
    ("smalldatetime", "time.Time", "chrono::NaiveDateTime"),
    ("timestamp", "time.Time", "chrono::NaiveDateTime"),
    ("date", "time.Time", "chrono::NaiveDate"),
    ("bit", "bool", "bool"),
    ("bool", "bool", "bool"),
    ("boolean", "bool", "bool"),
    ("float", "float64", "f64"),
    ("float8", "float64", "f64"),
    ("double", "float64", "f64"),
    ("real", "float32", "f32"),
    ("float4", "float32", "f32"),
    ("decimal", "float64", "f64"),
    ("numeric", "float64", "f64"),
    ("money", "float64", "f64"),
];

/// Maps an engine type name to a target-language type. Case-insensitive.
///
/// # Example
/// ```rust
/// use dbcatalog_core::export::type_mapping::{TypeTarget, map_type};
///
/// assert_eq!(map_type("NVARCHAR", TypeTarget::Go), "string");
/// assert_eq!(map_type("geography", TypeTarget::Go), "interface{}");
/// assert_eq!(map_type("bigint", TypeTarget::Rust), "i64");
/// ```
pub fn map_type(engine_type: &str, target: TypeTarget) -> &'static str {
    let key = engine_type.trim().to_ascii_lowercase();
    TYPE_TABLE
        .iter()
        .find(|(name, _, _)| *name == key)
        .map_or(target.fallback(), |&(_, go, rust)| match target {
            TypeTarget::Go => go,
            TypeTarget::Rust => rust,
        })
}

/// Renders the type-definition file for one entry.
pub fn generate_type_definition(entry: &CatalogEntry, target: TypeTarget) -> String {
    match target {
        TypeTarget::Go => generate_go(entry),
        TypeTarget::Rust => generate_rust(entry),
    }
}

fn generate_go(entry: &CatalogEntry) -> String {
    let type_name = exported_identifier(&entry.name);
    let fields: Vec<(String, &'static str, &str)> = entry
        .columns
        .iter()
        .map(|c| {
            (
                exported_identifier(&c.name),
                map_type(&c.type_name, TypeTarget::Go),
                c.name.as_str(),
            )
        })
        .collect();

    let mut out = String::from("package main\n\n");
    if fields.iter().any(|(_, go_type, _)| go_type.starts_with("time.")) {
        out.push_str("import \"time\"\n\n");
    }
    out.push_str(&format!(
        "// {} represents the {} {}\n",
        type_name,
        entry.qualified_name(),
        entry.kind
    ));
    out.push_str(&format!("type {} struct {{\n", type_name));
    for (field, go_type, column) in fields {
        out.push_str(&format!(
            "\t{} {} `json:\"{}\"`\n",
            field,
            go_type,
            column.replace('"', "")
        ));
    }
    out.push_str("}\n");
    out
}

fn generate_rust(entry: &CatalogEntry) -> String {
    let type_name = exported_identifier(&entry.name);

    let mut out = format!(
        "//! Generated from the {} {}\n\nuse serde::{{Deserialize, Serialize}};\n\n",
        entry.qualified_name(),
        entry.kind
    );
    out.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");
    out.push_str(&format!("pub struct {} {{\n", type_name));
    for column in &entry.columns {
        let rust_type = map_type(&column.type_name, TypeTarget::Rust);
        let field_type = if column.nullable {
            format!("Option<{}>", rust_type)
        } else {
            rust_type.to_string()
        };
        out.push_str(&format!(
            "    #[serde(rename = \"{}\")]\n    pub {}: {},\n",
            column.name.replace('\\', "\\\\").replace('"', "\\\""),
            field_identifier(&column.name),
            field_type
        ));
    }
    out.push_str("}\n");
    out
}

/// Replaces anything that is not alphanumeric or `_` and makes the first
/// character an uppercase letter.
fn exported_identifier(name: &str) -> String {
    let cleaned = clean_identifier(name);
    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            first.to_ascii_uppercase().to_string() + chars.as_str()
        }
        _ => format!("X{}", cleaned),
    }
}

/// Lowercase identifier, suffixed with `_` when it collides with a keyword.
fn field_identifier(name: &str) -> String {
    const KEYWORDS: &[&str] = &[
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
        "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
        "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true",
        "type", "unsafe", "use", "where", "while",
    ];

    let cleaned = clean_identifier(name).to_lowercase();
    let cleaned = match cleaned.chars().next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => cleaned,
        _ => format!("_{}", cleaned),
    };
    if KEYWORDS.contains(&cleaned.as_str()) {
        format!("{}_", cleaned)
    } else {
        cleaned
    }
}

fn clean_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
