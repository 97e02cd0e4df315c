//! Per-object file tree: `root/<database>/<schema>/<name>.{sql,info.md,go|rs}`.
//!
//! Directory segments are lowercased. Every identifier used as a path
//! segment is sanitised first, so no entry can write outside its own
//! `root/<database>/<schema>` directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::info_doc::{InfoSections, render_info_document};
use super::type_mapping::{TypeTarget, generate_type_definition};
use super::{RenderReport, Renderer};
use crate::catalog::Catalog;
use crate::error::{DbCatalogError, Result};
use crate::models::CatalogEntry;

/// Definitions this short or shorter get no `.sql` file.
const MIN_DEFINITION_LENGTH: usize = 10;

/// Makes an identifier usable as exactly one path segment.
///
/// Path separators become `-`, and names consisting only of dots (`.`, `..`)
/// have their dots replaced. Blank identifiers become `_`.
///
/// # Example
/// ```rust
/// use dbcatalog_core::export::file_tree::sanitize_segment;
///
/// assert_eq!(sanitize_segment("sales/2024"), "sales-2024");
/// assert_eq!(sanitize_segment(".."), "--");
/// assert_eq!(sanitize_segment("Orders"), "Orders");
/// ```
pub fn sanitize_segment(identifier: &str) -> String {
    let replaced: String = identifier
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '-',
            other => other,
        })
        .collect();

    if replaced.is_empty() {
        "_".to_string()
    } else if replaced.chars().all(|c| c == '.') {
        replaced.replace('.', "-")
    } else {
        replaced
    }
}

/// Sanitised, lowercased directory segment for a database or schema name.
pub fn directory_segment(identifier: &str) -> String {
    sanitize_segment(identifier).to_lowercase()
}

/// True for entries without an exportable location.
pub fn should_skip(entry: &CatalogEntry) -> bool {
    entry.database.trim().chars().count() < 2 || entry.name.trim().is_empty()
}

/// Directory that holds the artifacts of `entry`.
pub fn entry_directory(root: &Path, entry: &CatalogEntry) -> PathBuf {
    root.join(directory_segment(&entry.database))
        .join(directory_segment(&entry.schema))
}

/// Writes `.sql`, `.info.md` and type-definition files for every entry.
#[derive(Debug, Clone)]
pub struct FileTreeRenderer {
    root: PathBuf,
    template: Option<PathBuf>,
    type_target: TypeTarget,
}

impl FileTreeRenderer {
    pub fn new(root: PathBuf, template: Option<PathBuf>, type_target: TypeTarget) -> Self {
        Self {
            root,
            template,
            type_target,
        }
    }

    async fn load_template(&self) -> Result<Option<String>> {
        let Some(path) = &self.template else {
            return Ok(None);
        };
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            DbCatalogError::io(format!("Failed to read template {}", path.display()), e)
        })?;
        tracing::debug!("Using info template {}", path.display());
        Ok(Some(content))
    }

    async fn render_entry(
        &self,
        entry: &CatalogEntry,
        user_template: Option<&str>,
        report: &mut RenderReport,
    ) {
        let directory = entry_directory(&self.root, entry);
        if let Err(e) = tokio::fs::create_dir_all(&directory).await {
            report.record_failure(directory, e);
            return;
        }

        let stem = sanitize_segment(&entry.name);
        let has_definition_file = entry.definition.chars().count() > MIN_DEFINITION_LENGTH;

        if has_definition_file {
            let path = directory.join(format!("{}.sql", stem));
            write_artifact(&directory, path, &entry.definition, report).await;
        }

        let sections = InfoSections::build(entry, has_definition_file);
        let info_path = directory.join(format!("{}.info.md", stem));
        match render_info_document(&sections, user_template) {
            Ok(document) => write_artifact(&directory, info_path, &document, report).await,
            Err(e) => report.record_failure(info_path, e),
        }

        let type_path = directory.join(format!("{}.{}", stem, self.type_target.extension()));
        let type_definition = generate_type_definition(entry, self.type_target);
        write_artifact(&directory, type_path, &type_definition, report).await;
    }
}

#[async_trait]
impl Renderer for FileTreeRenderer {
    async fn render(&self, catalog: &Catalog) -> Result<RenderReport> {
        let user_template = self.load_template().await?;
        let mut report = RenderReport::default();
        let mut skipped = 0usize;

        for entry in catalog {
            if should_skip(entry) {
                tracing::debug!("Skipping '{}': no exportable location", entry.qualified_name());
                skipped += 1;
                continue;
            }
            self.render_entry(entry, user_template.as_deref(), &mut report)
                .await;
        }

        tracing::info!(
            "Wrote {} files under {} ({} entries skipped, {} failures)",
            report.written.len(),
            self.root.display(),
            skipped,
            report.failures.len()
        );
        Ok(report)
    }
}

/// Writes one artifact; the path must be a direct child of `directory`.
async fn write_artifact(directory: &Path, path: PathBuf, contents: &str, report: &mut RenderReport) {
    if path.parent() != Some(directory) {
        report.record_failure(path, "refusing to write outside the entry directory");
        return;
    }

    match tokio::fs::write(&path, contents).await {
        Ok(()) => report.record_written(path),
        Err(e) => report.record_failure(path, e),
    }
}
