//! Embedding-method to collection-name routing.
//!
//! Vector dimensions are backend-specific and not comparable, so every
//! embedding method owns an isolated collection. The mapping is a pure
//! function of the method label and stable across process restarts.

use crate::types::EmbeddingMethod;

const COLLECTION_PREFIX: &str = "documents_";

/// Sanitized collection name for an embedding method label: spaces become
/// underscores, every other run of non-`[A-Za-z0-9_]` characters collapses
/// to a single underscore.
pub fn collection_for_label(label: &str) -> String {
    let mut suffix = String::with_capacity(label.len());
    let mut in_run = false;
    for ch in label.trim().chars() {
        if ch == ' ' {
            suffix.push('_');
            in_run = false;
        } else if ch.is_ascii_alphanumeric() || ch == '_' {
            suffix.push(ch);
            in_run = false;
        } else if !in_run {
            suffix.push('_');
            in_run = true;
        }
    }
    format!("{COLLECTION_PREFIX}{suffix}")
}

pub fn collection_for_method(method: EmbeddingMethod) -> String {
    collection_for_label(method.label())
}
