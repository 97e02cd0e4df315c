//! Declared column type parsing for SQLite.
//!
//! SQLite stores the declared type verbatim, e.g. `VARCHAR(50)` or
//! `DECIMAL(10, 2)`. The base name is lowercased and the parenthesised
//! arguments become length or precision/scale.

/// Parsed form of a declared SQLite column type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeclaredType {
    pub type_name: String,
    pub max_length: i64,
    pub precision: i64,
    pub scale: i64,
}

/// Splits a declared type into base name and size arguments.
///
/// # Example
/// ```rust
/// use dbcatalog_core::adapters::sqlite::parse_declared_type;
///
/// let parsed = parse_declared_type("NVARCHAR(40)");
/// assert_eq!(parsed.type_name, "nvarchar");
/// assert_eq!(parsed.max_length, 40);
/// ```
pub fn parse_declared_type(declared: &str) -> DeclaredType {
    let declared = declared.trim();
    let (base, args) = match declared.split_once('(') {
        Some((base, rest)) => (base, rest.trim_end_matches(')')),
        None => (declared, ""),
    };

    let type_name = base.trim().to_lowercase();
    let numbers: Vec<i64> = args
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect();

    let mut parsed = DeclaredType {
        type_name,
        ..DeclaredType::default()
    };

    match (numbers.as_slice(), is_numeric(&parsed.type_name)) {
        ([precision, scale], _) => {
            parsed.precision = *precision;
            parsed.scale = *scale;
        }
        ([precision], true) => parsed.precision = *precision,
        ([length], false) => parsed.max_length = *length,
        _ => {}
    }

    parsed
}

fn is_numeric(type_name: &str) -> bool {
    matches!(
        type_name,
        "decimal" | "numeric" | "float" | "real" | "double" | "money"
    )
}
