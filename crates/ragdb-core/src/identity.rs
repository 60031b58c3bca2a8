//! Stable document identity derived from a file path.

use std::hash::Hasher;
use std::path::{Path, PathBuf};
use twox_hash::XxHash64;

use crate::error::{Error, Result};
use crate::types::DocumentId;

/// Prefix that marks a string as a document identity rather than a path.
pub const DOC_ID_PREFIX: &str = "doc_";

/// Resolve `path` to its absolute form without touching symlinks and
/// without requiring the file to exist (deletion must keep working for
/// files already removed from disk).
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|source| Error::PathResolution {
        path: path.to_path_buf(),
        source,
    })
}

/// Derive the deterministic document id for a path.
///
/// Identical absolute paths always yield identical ids; the hash is
/// non-cryptographic and collision-acceptable. Identity is content
/// independent: editing a file in place keeps its id.
pub fn generate_document_id(path: &Path) -> Result<DocumentId> {
    let absolute = absolute_path(path)?;
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(absolute.to_string_lossy().as_bytes());
    Ok(format!("{DOC_ID_PREFIX}{:016x}", hasher.finish()))
}
