//! `ChunkStore`: the sole caller of the vector-store collaborator.
//!
//! All structural validation of collaborator responses happens here, in one
//! decoding step per response shape. Downstream code only ever sees typed
//! results. Read failures degrade to empty results with a warning; write
//! failures are fatal to the operation.

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use ragdb_core::collection::collection_for_method;
use ragdb_core::error::{Error, Result};
use ragdb_core::traits::{Embedder, VectorStore};
use ragdb_core::types::{
    ChunkMetadata, EmbeddingMethod, FetchResult, GetRequest, InsertBatch, MetadataFilter,
    QueryRequest, ScoredChunk,
};

pub struct ChunkStore {
    store: Box<dyn VectorStore>,
    embedder: Box<dyn Embedder>,
    collection_name: String,
}

impl ChunkStore {
    /// Route the embedding method to its collection and create-or-fetch it,
    /// tagging the collection with method and model identifiers.
    pub fn open(
        store: Box<dyn VectorStore>,
        embedder: Box<dyn Embedder>,
        method: EmbeddingMethod,
    ) -> Result<Self> {
        let collection_name = collection_for_method(method);
        let mut metadata = Map::new();
        metadata.insert("description".into(), json!("RAG document storage"));
        metadata.insert("embedding_method".into(), json!(method.label()));
        metadata.insert("model".into(), json!(embedder.id()));
        store
            .ensure_collection(&collection_name, &metadata)
            .map_err(|e| Error::StoreWrite(e.to_string()))?;
        debug!(collection = %collection_name, model = embedder.id(), "collection ready");
        Ok(Self {
            store,
            embedder,
            collection_name,
        })
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn embedder_id(&self) -> &str {
        self.embedder.id()
    }

    /// Embed and insert a batch of chunks. The three sequences must be the
    /// same length.
    pub fn insert(
        &self,
        ids: &[String],
        documents: &[String],
        metadatas: &[ChunkMetadata],
    ) -> Result<()> {
        if ids.len() != documents.len() || ids.len() != metadatas.len() {
            return Err(Error::StoreWrite(format!(
                "mismatched batch lengths: {} ids, {} documents, {} metadatas",
                ids.len(),
                documents.len(),
                metadatas.len()
            )));
        }
        if ids.is_empty() {
            return Ok(());
        }

        let embeddings = self
            .embedder
            .embed_batch(documents)
            .map_err(|e| Error::Embedding(e.to_string()))?;
        let metadatas = metadatas
            .iter()
            .map(|m| serde_json::to_value(m).map_err(|e| Error::StoreWrite(e.to_string())))
            .collect::<Result<Vec<Value>>>()?;

        let batch = InsertBatch {
            ids: ids.to_vec(),
            documents: documents.to_vec(),
            metadatas,
            embeddings,
        };
        self.store
            .insert(&self.collection_name, batch)
            .map_err(|e| Error::StoreWrite(e.to_string()))
    }

    /// Filtered fetch. Never errors: a failing or malformed collaborator
    /// response yields the empty result so listing and stats degrade
    /// gracefully instead of crashing.
    pub fn fetch(&self, filter: Option<MetadataFilter>, limit: Option<usize>) -> FetchResult {
        let request = GetRequest {
            filter,
            ids: None,
            limit,
        };
        match self.store.get(&self.collection_name, &request) {
            Ok(value) => match decode_fetch(&value) {
                Ok(result) => result,
                Err(e) => {
                    warn!(collection = %self.collection_name, error = %e, "malformed fetch response, returning empty result");
                    FetchResult::default()
                }
            },
            Err(e) => {
                warn!(collection = %self.collection_name, error = %e, "fetch failed, returning empty result");
                FetchResult::default()
            }
        }
    }

    /// Ranked similarity query.
    pub fn query(
        &self,
        text: &str,
        n_results: usize,
        filter: Option<MetadataFilter>,
    ) -> Result<Vec<ScoredChunk>> {
        if text.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        let mut vectors = self
            .embedder
            .embed_batch(&[text.to_string()])
            .map_err(|e| Error::Embedding(e.to_string()))?;
        let embedding = vectors
            .pop()
            .ok_or_else(|| Error::Embedding("backend returned no vector for the query".into()))?;

        let request = QueryRequest {
            embedding,
            n_results,
            filter,
        };
        let value = self
            .store
            .query(&self.collection_name, &request)
            .map_err(|e| Error::StoreQuery(e.to_string()))?;
        decode_query(&value)
    }

    /// Idempotent delete by chunk id.
    pub fn delete(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.store
            .delete(&self.collection_name, ids)
            .map_err(|e| Error::StoreWrite(e.to_string()))
    }

    /// Duplicate guard: limit-1 existence probe by document id. Fail-open —
    /// a broken probe reads as "not found" so ingestion can proceed, but the
    /// failure is logged rather than swallowed silently.
    pub fn document_exists(&self, document_id: &str) -> bool {
        let request = GetRequest {
            filter: Some(MetadataFilter::DocumentId(document_id.to_string())),
            ids: None,
            limit: Some(1),
        };
        match self.store.get(&self.collection_name, &request) {
            Ok(value) => match decode_fetch(&value) {
                Ok(result) => !result.is_empty(),
                Err(e) => {
                    warn!(document_id, error = %e, "existence probe returned malformed response, treating as absent");
                    false
                }
            },
            Err(e) => {
                warn!(document_id, error = %e, "existence probe failed, treating as absent");
                false
            }
        }
    }
}

fn field_array<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a Vec<Value>> {
    obj.get(key)
        .ok_or_else(|| Error::MalformedResponse(format!("missing key `{key}`")))?
        .as_array()
        .ok_or_else(|| Error::MalformedResponse(format!("`{key}` is not an array")))
}

fn string_items(values: &[Value], key: &str) -> Result<Vec<String>> {
    values
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::MalformedResponse(format!("non-string entry in `{key}`")))
        })
        .collect()
}

fn metadata_items(values: &[Value]) -> Result<Vec<ChunkMetadata>> {
    values
        .iter()
        .map(|v| {
            serde_json::from_value(v.clone())
                .map_err(|e| Error::MalformedResponse(format!("bad metadata entry: {e}")))
        })
        .collect()
}

/// The single typed decoding step for `get` responses.
fn decode_fetch(value: &Value) -> Result<FetchResult> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::MalformedResponse("response is not an object".into()))?;
    let ids = string_items(field_array(obj, "ids")?, "ids")?;
    let documents = string_items(field_array(obj, "documents")?, "documents")?;
    let metadatas = metadata_items(field_array(obj, "metadatas")?)?;
    if ids.len() != documents.len() || ids.len() != metadatas.len() {
        return Err(Error::MalformedResponse(format!(
            "mismatched response lengths: {} ids, {} documents, {} metadatas",
            ids.len(),
            documents.len(),
            metadatas.len()
        )));
    }
    Ok(FetchResult {
        ids,
        documents,
        metadatas,
    })
}

/// The single typed decoding step for `query` responses. `distances` is
/// optional; when present it must line up with the ids.
fn decode_query(value: &Value) -> Result<Vec<ScoredChunk>> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::MalformedResponse("response is not an object".into()))?;
    let ids = string_items(field_array(obj, "ids")?, "ids")?;
    let documents = string_items(field_array(obj, "documents")?, "documents")?;
    let metadatas = metadata_items(field_array(obj, "metadatas")?)?;
    if ids.len() != documents.len() || ids.len() != metadatas.len() {
        return Err(Error::MalformedResponse(format!(
            "mismatched response lengths: {} ids, {} documents, {} metadatas",
            ids.len(),
            documents.len(),
            metadatas.len()
        )));
    }

    let distances: Option<Vec<f32>> = match obj.get("distances") {
        None | Some(Value::Null) => None,
        Some(raw) => {
            let arr = raw
                .as_array()
                .ok_or_else(|| Error::MalformedResponse("`distances` is not an array".into()))?;
            if arr.len() != ids.len() {
                return Err(Error::MalformedResponse(
                    "`distances` does not match result count".into(),
                ));
            }
            Some(
                arr.iter()
                    .map(|v| {
                        v.as_f64().map(|d| d as f32).ok_or_else(|| {
                            Error::MalformedResponse("non-numeric entry in `distances`".into())
                        })
                    })
                    .collect::<Result<Vec<f32>>>()?,
            )
        }
    };

    Ok(ids
        .into_iter()
        .zip(documents)
        .zip(metadatas)
        .enumerate()
        .map(|(i, ((chunk_id, content), metadata))| ScoredChunk {
            chunk_id,
            content,
            metadata,
            distance: distances.as_ref().map(|d| d[i]),
        })
        .collect())
}
