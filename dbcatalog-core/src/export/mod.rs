//! Export pipeline: renders a catalog into JSON, XML, a per-object file tree
//! or a debug dump.
//!
//! Every renderer implements [`Renderer`]. A renderer only returns `Err` for
//! failures that stop the whole render (a serialization error, an unreadable
//! user template); a single artifact that cannot be written is recorded in the
//! [`RenderReport`] and the remaining artifacts are still produced.

pub mod annotations;
pub mod debug;
pub mod file_tree;
pub mod info_doc;
pub mod structured;
pub mod type_mapping;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;

use crate::catalog::Catalog;
use crate::error::{DbCatalogError, Result};

pub use debug::DebugRenderer;
pub use file_tree::FileTreeRenderer;
pub use structured::{JsonRenderer, XmlRenderer, from_xml, to_xml};
pub use type_mapping::TypeTarget;

/// Renders a catalog into one output format.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Produces every artifact for `catalog`.
    ///
    /// # Errors
    /// Returns error only when the render as a whole cannot proceed; failed
    /// artifact writes are reported through [`RenderReport::failures`].
    async fn render(&self, catalog: &Catalog) -> Result<RenderReport>;
}

/// An artifact that could not be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// What a render produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<WriteFailure>,
}

impl RenderReport {
    pub fn record_written(&mut self, path: PathBuf) {
        self.written.push(path);
    }

    pub fn record_failure(&mut self, path: PathBuf, reason: impl ToString) {
        let failure = WriteFailure {
            path,
            reason: reason.to_string(),
        };
        tracing::warn!("Failed to write {}", failure);
        self.failures.push(failure);
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Selected output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    Json,
    Xml,
    Files,
    #[default]
    Debug,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Json => write!(f, "json"),
            OutputMode::Xml => write!(f, "xml"),
            OutputMode::Files => write!(f, "files"),
            OutputMode::Debug => write!(f, "debug"),
        }
    }
}

impl FromStr for OutputMode {
    type Err = DbCatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputMode::Json),
            "xml" => Ok(OutputMode::Xml),
            "files" | "file-tree" => Ok(OutputMode::Files),
            "debug" => Ok(OutputMode::Debug),
            other => Err(DbCatalogError::configuration(format!(
                "unknown output mode '{}' (expected json, xml, files or debug)",
                other
            ))),
        }
    }
}

/// Destinations and knobs shared by the renderers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// JSON snapshot written in `Json` mode
    pub snapshot_path: PathBuf,
    /// Document written in `Xml` mode
    pub xml_path: PathBuf,
    /// Root directory of the file tree written in `Files` mode
    pub root: PathBuf,
    /// User template for info documents; the built-in layout when `None`
    pub template: Option<PathBuf>,
    pub type_target: TypeTarget,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("data.json"),
            xml_path: PathBuf::from("data.xml"),
            root: PathBuf::from("vcs"),
            template: None,
            type_target: TypeTarget::default(),
        }
    }
}

/// Builds the renderer for `mode`.
pub fn create_renderer(mode: OutputMode, options: &ExportOptions) -> Box<dyn Renderer> {
    match mode {
        OutputMode::Json => Box::new(JsonRenderer::new(options.snapshot_path.clone())),
        OutputMode::Xml => Box::new(XmlRenderer::new(options.xml_path.clone())),
        OutputMode::Files => Box::new(FileTreeRenderer::new(
            options.root.clone(),
            options.template.clone(),
            options.type_target,
        )),
        OutputMode::Debug => Box::new(DebugRenderer),
    }
}
