//! Markdown information documents for catalog entries.
//!
//! Each document has a heading, the annotation-derived description, a column
//! table, a change-history table and a dependency table. Sections are built
//! once and then rendered either through the built-in `templates/info.md` or
//! through a user template with `{{ name }}` placeholders.

use askama::Template;

use super::annotations::{extract_annotations, parse_change_history};
use super::file_tree::{directory_segment, sanitize_segment};
use crate::error::{DbCatalogError, Result};
use crate::models::CatalogEntry;

/// Rendered sections of one information document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoSections {
    pub heading: String,
    pub description: String,
    pub columns: String,
    pub changes: String,
    pub dependencies: String,
    /// Relative link to the `.sql` file, empty when none is written
    pub definition_link: String,
}

impl InfoSections {
    /// Builds every section for `entry`.
    ///
    /// `has_definition_file` controls whether the heading links to the
    /// entry's `.sql` file.
    pub fn build(entry: &CatalogEntry, has_definition_file: bool) -> Self {
        let definition_link = if has_definition_file {
            relative_link(&entry.database, &entry.schema, &entry.name, "sql")
        } else {
            String::new()
        };

        let qualified = format!(
            "{}.{}.{}",
            entry.database.to_lowercase(),
            entry.schema.to_lowercase(),
            entry.name
        );
        let heading = if definition_link.is_empty() {
            format!("{} {}", entry.kind.as_str(), qualified)
        } else {
            format!("{} [{}]({})", entry.kind.as_str(), qualified, definition_link)
        };

        Self {
            heading,
            description: describe(entry),
            columns: column_table(entry),
            changes: change_table(entry),
            dependencies: dependency_table(entry),
            definition_link,
        }
    }

    fn placeholder(&self, key: &str) -> Option<&str> {
        match key {
            "heading" => Some(&self.heading),
            "description" => Some(&self.description),
            "columns" => Some(&self.columns),
            "changes" => Some(&self.changes),
            "dependencies" => Some(&self.dependencies),
            "definition_link" => Some(&self.definition_link),
            _ => None,
        }
    }
}

#[derive(Template)]
#[template(path = "info.md", escape = "none")]
struct InfoTemplate<'a> {
    sections: &'a InfoSections,
}

/// Renders an information document, through `user_template` when given.
///
/// # Errors
/// Returns `DbCatalogError::Serialization` if the built-in template fails to
/// render.
pub fn render_info_document(sections: &InfoSections, user_template: Option<&str>) -> Result<String> {
    match user_template {
        Some(template) => Ok(fill_placeholders(template, sections)),
        None => InfoTemplate { sections }
            .render()
            .map_err(|e| DbCatalogError::serialization("Failed to render info document", e)),
    }
}

/// Substitutes `{{ key }}` placeholders; unknown keys are left untouched.
fn fill_placeholders(template: &str, sections: &InfoSections) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        match sections.placeholder(after[..end].trim()) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

fn describe(entry: &CatalogEntry) -> String {
    let annotations = extract_annotations(&entry.definition);
    if annotations.is_empty() {
        return String::new();
    }

    let mut description = annotations.description.clone();
    let mut meta = Vec::new();
    if !annotations.creator.is_empty() {
        meta.push(format!("Author: {}", annotations.creator));
    }
    if let Some(created) = annotations.created {
        meta.push(format!("Created: {}", created.format("%Y-%m-%d")));
    }
    if !meta.is_empty() {
        if !description.is_empty() {
            description.push_str("\n\n");
        }
        description.push_str(&meta.join(", "));
    }
    description
}

fn column_table(entry: &CatalogEntry) -> String {
    let mut table = String::from(
        "| Name | Type | Length | Precision | Scale | Collation | Nullable | Identity |\n\
         |------|------|--------|-----------|-------|-----------|----------|----------|\n",
    );
    for column in &entry.columns {
        table.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
            escape_cell(&column.name),
            escape_cell(&column.type_name),
            column.max_length,
            column.precision,
            column.scale,
            escape_cell(&column.collation),
            u8::from(column.nullable),
            u8::from(column.is_identity)
        ));
    }
    table
}

fn change_table(entry: &CatalogEntry) -> String {
    let mut table = String::from("| User | Date | Comment |\n|------|------|---------|\n");
    for change in parse_change_history(&entry.definition) {
        table.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&change.user),
            escape_cell(&change.date),
            escape_cell(&change.comment)
        ));
    }
    table
}

fn dependency_table(entry: &CatalogEntry) -> String {
    let mut table = String::from("| DB | Schema | Object |\n|----|--------|--------|\n");
    for dependency in entry
        .dependencies
        .iter()
        .filter(|d| d.has_target() && !entry.is_self_reference(d))
    {
        let database = if dependency.referenced_database.trim().is_empty() {
            entry.database.as_str()
        } else {
            dependency.referenced_database.as_str()
        };
        let link = relative_link(
            database,
            &dependency.referenced_schema,
            &dependency.referenced_table,
            "info.md",
        );
        table.push_str(&format!(
            "| {} | {} | [{}]({}) |\n",
            escape_cell(database),
            escape_cell(&dependency.referenced_schema),
            escape_cell(&dependency.referenced_table),
            link
        ));
    }
    table
}

/// Link from any info document to an artifact of another object, matching
/// the file-tree layout.
fn relative_link(database: &str, schema: &str, name: &str, extension: &str) -> String {
    format!(
        "../../{}/{}/{}.{}",
        directory_segment(database),
        directory_segment(schema),
        sanitize_segment(name),
        extension
    )
    .replace(' ', "%20")
}

fn escape_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace('\n', " ")
}
