//! Catalog snapshot persistence.
//!
//! A snapshot is the catalog serialized as a pretty-printed JSON array of
//! entries. Paths ending in `.zst` are zstd-compressed when the `compression`
//! feature is enabled. Loading validates the document against the snapshot
//! schema and rejects duplicate identities.

use std::path::Path;

use crate::catalog::Catalog;
use crate::error::{DbCatalogError, Result};
use crate::validation::validate_snapshot;

/// zstd level used for compressed snapshots
#[cfg(feature = "compression")]
const COMPRESSION_LEVEL: i32 = 3;

/// Returns true when `path` names a zstd-compressed snapshot.
pub fn is_compressed(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zst"))
}

/// Writes `catalog` to `path`.
///
/// # Errors
/// Returns error if:
/// - Serialization fails (`Serialization`)
/// - `path` ends in `.zst` without the `compression` feature (`UnsupportedFeature`)
/// - The file cannot be written (`Write`)
pub async fn save_snapshot(catalog: &Catalog, path: &Path) -> Result<()> {
    let json_data = serde_json::to_string_pretty(catalog)
        .map_err(|e| DbCatalogError::serialization("Failed to serialize catalog snapshot", e))?;

    let bytes = if is_compressed(path) {
        compress(json_data.as_bytes())?
    } else {
        json_data.into_bytes()
    };

    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| DbCatalogError::write_failed(path, e))?;

    tracing::info!(
        "Saved snapshot with {} entries to {}",
        catalog.len(),
        path.display()
    );
    Ok(())
}

/// Reads and validates the snapshot at `path`.
///
/// # Errors
/// Returns error if:
/// - The file cannot be read (`Io`)
/// - The content is not JSON or cannot be decompressed (`Serialization`)
/// - The document does not match the snapshot schema, or two entries share an
///   identity (`Validation`)
pub async fn load_snapshot(path: &Path) -> Result<Catalog> {
    let raw = tokio::fs::read(path).await.map_err(|e| {
        DbCatalogError::io(format!("Failed to read snapshot {}", path.display()), e)
    })?;

    let bytes = if is_compressed(path) {
        decompress(&raw)?
    } else {
        raw
    };

    let json_value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
        DbCatalogError::serialization(format!("Snapshot {} is not valid JSON", path.display()), e)
    })?;

    validate_snapshot(&json_value)?;

    let catalog: Catalog = serde_json::from_value(json_value).map_err(|e| {
        DbCatalogError::serialization(format!("Failed to decode snapshot {}", path.display()), e)
    })?;
    catalog.validate_unique()?;

    tracing::debug!(
        "Loaded snapshot with {} entries from {}",
        catalog.len(),
        path.display()
    );
    Ok(catalog)
}

#[cfg(feature = "compression")]
fn compress(data: &[u8]) -> Result<Vec<u8>> {
    use std::io::Write;

    let mut encoder = zstd::Encoder::new(Vec::new(), COMPRESSION_LEVEL)
        .map_err(|e| DbCatalogError::serialization("Failed to create compressor", e))?;
    encoder
        .write_all(data)
        .map_err(|e| DbCatalogError::serialization("Compression failed", e))?;
    encoder
        .finish()
        .map_err(|e| DbCatalogError::serialization("Compression finalization failed", e))
}

#[cfg(not(feature = "compression"))]
fn compress(_data: &[u8]) -> Result<Vec<u8>> {
    Err(DbCatalogError::unsupported_feature(
        "compressed snapshots (compile with --features compression)",
        "snapshot",
    ))
}

#[cfg(feature = "compression")]
fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    zstd::decode_all(data).map_err(|e| DbCatalogError::serialization("Decompression failed", e))
}

#[cfg(not(feature = "compression"))]
fn decompress(_data: &[u8]) -> Result<Vec<u8>> {
    Err(DbCatalogError::unsupported_feature(
        "compressed snapshots (compile with --features compression)",
        "snapshot",
    ))
}
