//! The ordered catalog produced by one run and its include/exclude filter.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{DbCatalogError, Result};
use crate::models::CatalogEntry;

/// Ordered collection of catalog entries.
///
/// Serializes as a bare array of entries, which is also the snapshot format.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<CatalogEntry> {
        self.entries
    }

    /// Checks that no two entries share a `(database, schema, name)` identity.
    ///
    /// # Errors
    /// Returns `DbCatalogError::Validation` naming the first duplicate found.
    pub fn validate_unique(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !seen.insert(entry.identity()) {
                return Err(DbCatalogError::Validation {
                    message: format!("duplicate catalog entry '{}'", entry.qualified_name()),
                });
            }
        }
        Ok(())
    }

    /// Applies include/exclude lists by bare object name.
    ///
    /// A non-empty `include` keeps only listed names; `exclude` always drops
    /// listed names, even when they are also included. Names are compared
    /// exactly, without schema or database qualification, so same-named
    /// objects in different schemas are filtered together.
    pub fn filter(&self, include: &[String], exclude: &[String]) -> Catalog {
        let include: HashSet<&str> = include.iter().map(String::as_str).collect();
        let exclude: HashSet<&str> = exclude.iter().map(String::as_str).collect();

        let entries = self
            .entries
            .iter()
            .filter(|entry| include.is_empty() || include.contains(entry.name.as_str()))
            .filter(|entry| !exclude.contains(entry.name.as_str()))
            .cloned()
            .collect();

        Catalog { entries }
    }
}

impl From<Vec<CatalogEntry>> for Catalog {
    fn from(entries: Vec<CatalogEntry>) -> Self {
        Self::new(entries)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Catalog {
    type Item = CatalogEntry;
    type IntoIter = std::vec::IntoIter<CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
