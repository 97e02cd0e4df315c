//! Whole-catalog documents: the JSON snapshot and the XML rendition.
//!
//! The XML document wraps the entries in a `<catalog>` root with one
//! `<entry>` element per catalog entry, fields in declaration order:
//!
//! ```xml
//! <catalog>
//!   <entry>
//!     <database>Sales</database>
//!     <schema>dbo</schema>
//!     <name>Orders</name>
//!     <kind>Table</kind>
//!     ...
//!   </entry>
//! </catalog>
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde::Deserialize;

use super::{RenderReport, Renderer};
use crate::catalog::Catalog;
use crate::error::{DbCatalogError, Result};
use crate::models::CatalogEntry;
use crate::snapshot::save_snapshot;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

#[derive(Deserialize)]
#[serde(rename = "catalog")]
struct XmlCatalog {
    #[serde(rename = "entry", default)]
    entries: Vec<CatalogEntry>,
}

type XmlWriter = Writer<Vec<u8>>;

/// Serializes `catalog` as an indented XML document.
///
/// Element names follow the serde field names of the models, so the
/// document reads back through [`from_xml`]. Whitespace at either end of a
/// text value is written as character references and carriage returns are
/// always referenced, so readers that trim text nodes still see it.
///
/// # Errors
/// Returns `DbCatalogError::Serialization` if the document cannot be written.
pub fn to_xml(catalog: &Catalog) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    open(&mut writer, "catalog")?;
    for entry in catalog.iter() {
        write_entry(&mut writer, entry)?;
    }
    close(&mut writer, "catalog")?;

    let body = String::from_utf8(writer.into_inner())
        .map_err(|e| DbCatalogError::serialization("XML output is not valid UTF-8", e))?;

    let mut document = String::with_capacity(XML_DECLARATION.len() + body.len() + 1);
    document.push_str(XML_DECLARATION);
    document.push_str(&body);
    document.push('\n');
    Ok(document)
}

fn write_entry(writer: &mut XmlWriter, entry: &CatalogEntry) -> Result<()> {
    open(writer, "entry")?;
    text_element(writer, "database", &entry.database)?;
    text_element(writer, "schema", &entry.schema)?;
    text_element(writer, "name", &entry.name)?;
    text_element(writer, "kind", entry.kind.as_str())?;
    text_element(writer, "definition", &entry.definition)?;

    for column in &entry.columns {
        open(writer, "columns")?;
        text_element(writer, "name", &column.name)?;
        text_element(writer, "type_name", &column.type_name)?;
        text_element(writer, "max_length", &column.max_length.to_string())?;
        text_element(writer, "precision", &column.precision.to_string())?;
        text_element(writer, "scale", &column.scale.to_string())?;
        text_element(writer, "collation", &column.collation)?;
        text_element(writer, "nullable", &column.nullable.to_string())?;
        text_element(writer, "is_identity", &column.is_identity.to_string())?;
        close(writer, "columns")?;
    }

    for dependency in &entry.dependencies {
        open(writer, "dependencies")?;
        text_element(writer, "referenced_database", &dependency.referenced_database)?;
        text_element(writer, "referenced_schema", &dependency.referenced_schema)?;
        text_element(writer, "referenced_table", &dependency.referenced_table)?;
        close(writer, "dependencies")?;
    }

    close(writer, "entry")
}

fn open(writer: &mut XmlWriter, tag: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(|e| DbCatalogError::serialization(format!("Failed to write <{}>", tag), e))
}

fn close(writer: &mut XmlWriter, tag: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(|e| DbCatalogError::serialization(format!("Failed to write </{}>", tag), e))
}

fn text_element(writer: &mut XmlWriter, tag: &str, value: &str) -> Result<()> {
    open(writer, tag)?;
    writer
        .write_event(Event::Text(BytesText::from_escaped(escape_text(value))))
        .map_err(|e| DbCatalogError::serialization(format!("Failed to write <{}> text", tag), e))?;
    close(writer, tag)
}

/// XML whitespace as trimmed by text-node readers
fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Escapes markup characters and references edge whitespace.
fn escape_text(value: &str) -> String {
    let start = value.len() - value.trim_start_matches(is_xml_space).len();
    let end = value.trim_end_matches(is_xml_space).len();

    let mut escaped = String::with_capacity(value.len());
    for (index, c) in value.char_indices() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '\r' => escaped.push_str("&#13;"),
            c if is_xml_space(c) && (index < start || index >= end) => {
                escaped.push_str(&format!("&#{};", u32::from(c)));
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Parses an XML document produced by [`to_xml`].
///
/// # Errors
/// Returns `DbCatalogError::Serialization` for malformed documents.
pub fn from_xml(xml: &str) -> Result<Catalog> {
    let document: XmlCatalog = quick_xml::de::from_str(xml)
        .map_err(|e| DbCatalogError::serialization("Failed to parse catalog XML", e))?;
    Ok(Catalog::new(document.entries))
}

/// Writes the catalog as a JSON snapshot.
#[derive(Debug, Clone)]
pub struct JsonRenderer {
    path: PathBuf,
}

impl JsonRenderer {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Renderer for JsonRenderer {
    async fn render(&self, catalog: &Catalog) -> Result<RenderReport> {
        let mut report = RenderReport::default();
        match save_snapshot(catalog, &self.path).await {
            Ok(()) => report.record_written(self.path.clone()),
            Err(DbCatalogError::Write { source, .. }) => {
                report.record_failure(self.path.clone(), source)
            }
            Err(e) => return Err(e),
        }
        Ok(report)
    }
}

/// Writes the catalog as a single XML document.
#[derive(Debug, Clone)]
pub struct XmlRenderer {
    path: PathBuf,
}

impl XmlRenderer {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Renderer for XmlRenderer {
    async fn render(&self, catalog: &Catalog) -> Result<RenderReport> {
        let document = to_xml(catalog)?;

        let mut report = RenderReport::default();
        match tokio::fs::write(&self.path, document).await {
            Ok(()) => {
                tracing::info!(
                    "Wrote {} entries as XML to {}",
                    catalog.len(),
                    self.path.display()
                );
                report.record_written(self.path.clone());
            }
            Err(e) => report.record_failure(self.path.clone(), e),
        }
        Ok(report)
    }
}
