//! Debug rendering: dumps the catalog to stdout, writes no files.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{RenderReport, Renderer};
use crate::Result;
use crate::catalog::Catalog;

/// Pretty `Debug` dump of every entry.
pub fn dump(catalog: &Catalog) -> String {
    format!("{:#?}", catalog.entries())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DebugRenderer;

#[async_trait]
impl Renderer for DebugRenderer {
    async fn render(&self, catalog: &Catalog) -> Result<RenderReport> {
        let mut per_database: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in catalog {
            *per_database.entry(entry.database.as_str()).or_default() += 1;
        }
        for (database, count) in &per_database {
            tracing::debug!("{}: {} entries", database, count);
        }

        println!("{}", dump(catalog));
        Ok(RenderReport::default())
    }
}
