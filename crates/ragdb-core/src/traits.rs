//! Collaborator seams. Implementations live in sibling crates (or in the
//! caller's test code); everything here is object-safe and `Send + Sync`.

use serde_json::{Map, Value};
use std::path::Path;

use crate::types::{GetRequest, InsertBatch, QueryRequest};

/// Maps text to fixed-length vectors. Backends with different `id()`s
/// produce incomparable vector spaces.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the backend/model (e.g. `local-hash:d384`).
    fn id(&self) -> &str;
    /// Embedding dimensionality.
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// The vector similarity engine and persistence layer.
///
/// `get` and `query` return loosely-typed JSON: the collaborator may hand
/// back malformed or partial structures on internal failure, and the store
/// facade owns the single decoding step that turns a response into typed
/// results or a `MalformedResponse` error.
pub trait VectorStore: Send + Sync {
    /// Create-or-fetch a named collection, tagging it with the given
    /// metadata on first creation.
    fn ensure_collection(&self, name: &str, metadata: &Map<String, Value>) -> anyhow::Result<()>;

    fn insert(&self, collection: &str, batch: InsertBatch) -> anyhow::Result<()>;

    /// Fetch by filter/ids/limit. Expected shape:
    /// `{"ids": [...], "documents": [...], "metadatas": [...]}`.
    fn get(&self, collection: &str, request: &GetRequest) -> anyhow::Result<Value>;

    /// Nearest-neighbour query. Expected shape adds `"distances": [...]`.
    fn query(&self, collection: &str, request: &QueryRequest) -> anyhow::Result<Value>;

    /// Delete by chunk id. Deleting ids that do not exist is not an error.
    fn delete(&self, collection: &str, ids: &[String]) -> anyhow::Result<()>;
}

/// Raw text extraction from PDF byte streams, one string per page.
pub trait Extractor: Send + Sync {
    fn extract_pages(&self, path: &Path) -> anyhow::Result<Vec<String>>;
}
