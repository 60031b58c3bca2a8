//! In-memory reference implementation of the `VectorStore` collaborator.
//!
//! Brute-force cosine distance over rows held in insertion order. Useful
//! for tests and development; a networked vector database drops in behind
//! the same trait. Responses are built as the loosely-typed JSON shapes
//! the facade decodes, because that is the collaborator contract.

use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use ragdb_core::traits::VectorStore;
use ragdb_core::types::{GetRequest, InsertBatch, MetadataFilter, QueryRequest};

#[derive(Default)]
struct CollectionData {
    metadata: Map<String, Value>,
    rows: Vec<StoredRow>,
}

struct StoredRow {
    id: String,
    document: String,
    metadata: Value,
    embedding: Vec<f32>,
}

impl StoredRow {
    fn matches(&self, filter: Option<&MetadataFilter>) -> bool {
        let Some(filter) = filter else {
            return true;
        };
        self.metadata
            .get(filter.key())
            .and_then(Value::as_str)
            .is_some_and(|v| v == filter.value())
    }
}

/// Clones share the same underlying data, so a caller can hand one clone
/// to a `ChunkStore` and keep another for inspection.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, CollectionData>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection-level metadata recorded at creation, if the collection
    /// exists.
    pub fn collection_metadata(&self, name: &str) -> Option<Map<String, Value>> {
        let collections = self.collections.read().ok()?;
        collections.get(name).map(|c| c.metadata.clone())
    }

    fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 1.0;
        }
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 1.0;
        }
        1.0 - dot / (norm_a * norm_b)
    }
}

impl VectorStore for MemoryStore {
    fn ensure_collection(&self, name: &str, metadata: &Map<String, Value>) -> anyhow::Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        collections
            .entry(name.to_string())
            .or_insert_with(|| CollectionData {
                metadata: metadata.clone(),
                rows: Vec::new(),
            });
        Ok(())
    }

    fn insert(&self, collection: &str, batch: InsertBatch) -> anyhow::Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        let data = collections.entry(collection.to_string()).or_default();

        for (((id, document), metadata), embedding) in batch
            .ids
            .into_iter()
            .zip(batch.documents)
            .zip(batch.metadatas)
            .zip(batch.embeddings)
        {
            let row = StoredRow {
                id,
                document,
                metadata,
                embedding,
            };
            // Upsert: a re-inserted id replaces the existing row in place.
            match data.rows.iter_mut().find(|r| r.id == row.id) {
                Some(existing) => *existing = row,
                None => data.rows.push(row),
            }
        }
        Ok(())
    }

    fn get(&self, collection: &str, request: &GetRequest) -> anyhow::Result<Value> {
        let collections = self
            .collections
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;

        let mut ids = Vec::new();
        let mut documents = Vec::new();
        let mut metadatas = Vec::new();

        if let Some(data) = collections.get(collection) {
            let limit = request.limit.unwrap_or(usize::MAX);
            for row in &data.rows {
                if ids.len() >= limit {
                    break;
                }
                if !row.matches(request.filter.as_ref()) {
                    continue;
                }
                if let Some(wanted) = &request.ids {
                    if !wanted.contains(&row.id) {
                        continue;
                    }
                }
                ids.push(row.id.clone());
                documents.push(row.document.clone());
                metadatas.push(row.metadata.clone());
            }
        }

        Ok(json!({
            "ids": ids,
            "documents": documents,
            "metadatas": metadatas,
        }))
    }

    fn query(&self, collection: &str, request: &QueryRequest) -> anyhow::Result<Value> {
        let collections = self
            .collections
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;

        let mut scored: Vec<(f32, &StoredRow)> = Vec::new();
        if let Some(data) = collections.get(collection) {
            for row in &data.rows {
                if row.matches(request.filter.as_ref()) {
                    scored.push((Self::cosine_distance(&request.embedding, &row.embedding), row));
                }
            }
        }
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(request.n_results);

        let ids: Vec<&str> = scored.iter().map(|(_, r)| r.id.as_str()).collect();
        let documents: Vec<&str> = scored.iter().map(|(_, r)| r.document.as_str()).collect();
        let metadatas: Vec<&Value> = scored.iter().map(|(_, r)| &r.metadata).collect();
        let distances: Vec<f32> = scored.iter().map(|(d, _)| *d).collect();

        Ok(json!({
            "ids": ids,
            "documents": documents,
            "metadatas": metadatas,
            "distances": distances,
        }))
    }

    fn delete(&self, collection: &str, ids: &[String]) -> anyhow::Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        // Deleting unknown ids or from an unknown collection is a no-op.
        if let Some(data) = collections.get_mut(collection) {
            data.rows.retain(|row| !ids.contains(&row.id));
        }
        Ok(())
    }
}
