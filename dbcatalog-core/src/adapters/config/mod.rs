//! Configuration types for engine adapters and catalog runs.
//!
//! - `ConnectionConfig`: how to reach the engine
//! - `CatalogConfig`: which databases to catalog and how to filter them

mod catalog;
mod connection;

pub use catalog::CatalogConfig;
pub use connection::{ConnectionConfig, EngineKind};
