//! Domain types shared by the store, embedding, and lifecycle crates.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub type ChunkId = String;
pub type DocumentId = String;

/// Source document format. Only markdown and PDF are ingestible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Md,
    Pdf,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Md => "md",
            FileType::Pdf => "pdf",
        }
    }

    /// Guess the type from a path extension, if it is one we ingest.
    pub fn from_extension(path: &std::path::Path) -> Option<FileType> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("md") => Some(FileType::Md),
            Some("pdf") => Some(FileType::Pdf),
            _ => None,
        }
    }
}

impl FromStr for FileType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "md" => Ok(FileType::Md),
            "pdf" => Ok(FileType::Pdf),
            other => Err(Error::UnsupportedType(other.to_string())),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Embedding backend selector. Backends produce incompatible vector spaces,
/// so each method gets its own collection (see `collection_for_method`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbeddingMethod {
    #[serde(rename = "local-hash")]
    LocalHash,
    #[serde(rename = "openai")]
    OpenAi,
}

impl EmbeddingMethod {
    /// Canonical method name used in metadata tags and collection routing.
    pub fn label(&self) -> &'static str {
        match self {
            EmbeddingMethod::LocalHash => "local-hash",
            EmbeddingMethod::OpenAi => "openai",
        }
    }
}

impl FromStr for EmbeddingMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "local-hash" | "local" | "hash" => Ok(EmbeddingMethod::LocalHash),
            "openai" | "openai-embeddings" => Ok(EmbeddingMethod::OpenAi),
            other => Err(Error::UnsupportedEmbedding(other.to_string())),
        }
    }
}

impl fmt::Display for EmbeddingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Provenance record attached to every stored chunk.
///
/// This is the only channel through which filtering, grouping, and deletion
/// operate; the vector store itself has no document-level concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub document_id: DocumentId,
    pub file_path: String,
    pub file_type: FileType,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub timestamp: String,
    pub embedding_method: String,
    pub collection_name: String,
}

/// Metadata equality filter: the only two shapes the lifecycle layer issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataFilter {
    DocumentId(String),
    FilePath(String),
}

impl MetadataFilter {
    pub fn key(&self) -> &'static str {
        match self {
            MetadataFilter::DocumentId(_) => "document_id",
            MetadataFilter::FilePath(_) => "file_path",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            MetadataFilter::DocumentId(v) | MetadataFilter::FilePath(v) => v,
        }
    }
}

/// One batch of chunks bound for the store. The facade guarantees the four
/// sequences are equal length before the collaborator ever sees them.
#[derive(Debug, Clone)]
pub struct InsertBatch {
    pub ids: Vec<ChunkId>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Value>,
    pub embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Clone, Default)]
pub struct GetRequest {
    pub filter: Option<MetadataFilter>,
    pub ids: Option<Vec<ChunkId>>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub embedding: Vec<f32>,
    pub n_results: usize,
    pub filter: Option<MetadataFilter>,
}

/// Typed form of a collaborator `get` response after facade decoding.
#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    pub ids: Vec<ChunkId>,
    pub documents: Vec<String>,
    pub metadatas: Vec<ChunkMetadata>,
}

impl FetchResult {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// A ranked search hit. `distance` is backend-specific; lower is closer.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk_id: ChunkId,
    pub content: String,
    pub metadata: ChunkMetadata,
    pub distance: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyStatus {
    Created,
    Exists,
}

/// Outcome of ingesting a single document.
#[derive(Debug, Clone, Serialize)]
pub struct StudyReport {
    pub status: StudyStatus,
    pub document_id: DocumentId,
    pub file_path: String,
    pub file_type: FileType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_count: Option<usize>,
    pub collection_name: String,
    pub embedding_method: String,
}

/// Outcome of a directory sweep.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StudySummary {
    pub files_scanned: usize,
    pub files_created: usize,
    pub files_existing: usize,
    pub files_failed: usize,
    pub chunks_created: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub results_count: usize,
    pub results: Vec<ScoredChunk>,
    pub filter_applied: bool,
    pub collection_name: String,
    pub embedding_method: String,
}

/// One summary row per distinct document, first-seen metadata wins.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub document_id: DocumentId,
    pub file_path: String,
    pub file_type: FileType,
    pub total_chunks: usize,
    pub timestamp: String,
    pub embedding_method: String,
    pub collection_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteStatus {
    Success,
    NotFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteReport {
    pub status: DeleteStatus,
    pub document_ids: Vec<DocumentId>,
    pub chunks_deleted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    Deleted,
    NotFound,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchDeleteEntry {
    pub file_path: String,
    pub outcome: BatchOutcome,
    pub chunks_deleted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchDeleteReport {
    pub total: usize,
    pub deleted: usize,
    pub not_found: usize,
    pub failed: usize,
    pub results: Vec<BatchDeleteEntry>,
}

/// Aggregate counts for the active collection only.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub total_chunks: usize,
    pub unique_documents: usize,
    pub total_content_size_bytes: usize,
    pub database_path: String,
    pub collection_name: String,
    pub embedding_method: String,
}
