//! `RagControl`: the document lifecycle manager.
//!
//! Ingestion runs path → identity → duplicate guard → extraction →
//! chunking → metadata → store insert. Search, list, delete, and stats all
//! operate on chunk metadata through the store facade; nothing here talks
//! to the vector store directly.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};
use walkdir::WalkDir;

use ragdb_core::chunker::Chunker;
use ragdb_core::config::{expand_path, RagConfig};
use ragdb_core::error::{Error, Result};
use ragdb_core::identity::{self, DOC_ID_PREFIX};
use ragdb_core::traits::{Extractor, VectorStore};
use ragdb_core::types::{
    BatchDeleteEntry, BatchDeleteReport, BatchOutcome, ChunkMetadata, DeleteReport, DeleteStatus,
    DocumentSummary, EmbeddingMethod, FileType, MetadataFilter, SearchReport, StatsReport,
    StudyReport, StudyStatus, StudySummary,
};
use ragdb_embed::build_embedder;
use ragdb_store::ChunkStore;

use crate::extract;

pub struct RagControl {
    store: ChunkStore,
    chunker: Chunker,
    extractor: Box<dyn Extractor>,
    db_path: String,
    method: EmbeddingMethod,
}

impl RagControl {
    /// Wire the pipeline together: embedding backend from config, chunker
    /// from config, collection routed by embedding method.
    pub fn open(
        config: &RagConfig,
        vector_store: Box<dyn VectorStore>,
        extractor: Box<dyn Extractor>,
    ) -> Result<Self> {
        let embedder = build_embedder(&config.embedding)?;
        let chunker = Chunker::new(config.chunking.chunk_size, config.chunking.overlap)?;
        let method = config.embedding.method;
        let store = ChunkStore::open(vector_store, embedder, method)?;
        info!(
            collection = store.collection_name(),
            method = method.label(),
            model = store.embedder_id(),
            "rag control initialized"
        );
        Ok(Self {
            store,
            chunker,
            extractor,
            db_path: expand_path(&config.db_path).to_string_lossy().into_owned(),
            method,
        })
    }

    pub fn collection_name(&self) -> &str {
        self.store.collection_name()
    }

    pub fn embedding_method(&self) -> EmbeddingMethod {
        self.method
    }

    /// Ingest one document. Re-ingesting a path whose identity is already
    /// stored is a no-op reported as `Exists`.
    pub fn study_document(&self, path: &Path, file_type: FileType) -> Result<StudyReport> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let absolute = identity::absolute_path(path)?;
        let file_path = absolute.to_string_lossy().into_owned();
        let document_id = identity::generate_document_id(path)?;

        if self.store.document_exists(&document_id) {
            warn!(path = %file_path, %document_id, "document already studied");
            return Ok(StudyReport {
                status: StudyStatus::Exists,
                document_id,
                file_path,
                file_type,
                chunks_count: None,
                collection_name: self.collection_name().to_string(),
                embedding_method: self.method.label().to_string(),
            });
        }

        let content = extract::read_document(self.extractor.as_ref(), path, file_type)?;
        let chunks = self.chunker.chunk(&content);
        if chunks.is_empty() {
            return Err(Error::EmptyContent(path.to_path_buf()));
        }

        let ids: Vec<String> = (0..chunks.len())
            .map(|i| format!("{document_id}_chunk_{i}"))
            .collect();
        let timestamp = Utc::now().to_rfc3339();
        let metadatas: Vec<ChunkMetadata> = (0..chunks.len())
            .map(|i| ChunkMetadata {
                document_id: document_id.clone(),
                file_path: file_path.clone(),
                file_type,
                chunk_index: i,
                total_chunks: chunks.len(),
                timestamp: timestamp.clone(),
                embedding_method: self.method.label().to_string(),
                collection_name: self.collection_name().to_string(),
            })
            .collect();

        self.store.insert(&ids, &chunks, &metadatas)?;
        info!(path = %file_path, chunks = chunks.len(), collection = self.collection_name(), "stored document");

        Ok(StudyReport {
            status: StudyStatus::Created,
            document_id,
            file_path,
            file_type,
            chunks_count: Some(chunks.len()),
            collection_name: self.collection_name().to_string(),
            embedding_method: self.method.label().to_string(),
        })
    }

    /// Ingest every markdown and PDF file under `dir`. Per-file failures
    /// are logged and counted, never fatal to the sweep.
    pub fn study_directory(&self, dir: &Path) -> Result<StudySummary> {
        if !dir.is_dir() {
            return Err(Error::FileNotFound(dir.to_path_buf()));
        }

        let mut files: Vec<(PathBuf, FileType)> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                FileType::from_extension(e.path()).map(|t| (e.path().to_path_buf(), t))
            })
            .collect();
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut summary = StudySummary::default();
        for (path, file_type) in files {
            summary.files_scanned += 1;
            match self.study_document(&path, file_type) {
                Ok(report) => match report.status {
                    StudyStatus::Created => {
                        summary.files_created += 1;
                        summary.chunks_created += report.chunks_count.unwrap_or(0);
                    }
                    StudyStatus::Exists => summary.files_existing += 1,
                },
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to study file");
                    summary.files_failed += 1;
                }
            }
        }
        info!(
            scanned = summary.files_scanned,
            created = summary.files_created,
            chunks = summary.chunks_created,
            "directory sweep finished"
        );
        Ok(summary)
    }

    /// Semantic search. A filter token starting with `doc_` selects by
    /// document identity; any other token is treated as a file path.
    pub fn search(
        &self,
        query: &str,
        filter_token: Option<&str>,
        n_results: usize,
    ) -> Result<SearchReport> {
        let filter = match filter_token {
            Some(token) if token.starts_with(DOC_ID_PREFIX) => {
                Some(MetadataFilter::DocumentId(token.to_string()))
            }
            Some(token) => {
                let absolute = identity::absolute_path(Path::new(token))?;
                Some(MetadataFilter::FilePath(
                    absolute.to_string_lossy().into_owned(),
                ))
            }
            None => None,
        };
        let filter_applied = filter.is_some();

        let results = self.store.query(query, n_results, filter)?;
        info!(query, results = results.len(), "search completed");

        Ok(SearchReport {
            query: query.to_string(),
            results_count: results.len(),
            results,
            filter_applied,
            collection_name: self.collection_name().to_string(),
            embedding_method: self.method.label().to_string(),
        })
    }

    /// One summary per distinct document in the active collection,
    /// first-seen metadata winning per group.
    pub fn list_documents(&self) -> Vec<DocumentSummary> {
        let all = self.store.fetch(None, None);
        let mut seen = HashSet::new();
        let mut documents = Vec::new();
        for metadata in &all.metadatas {
            if seen.insert(metadata.document_id.clone()) {
                documents.push(DocumentSummary {
                    document_id: metadata.document_id.clone(),
                    file_path: metadata.file_path.clone(),
                    file_type: metadata.file_type,
                    total_chunks: metadata.total_chunks,
                    timestamp: metadata.timestamp.clone(),
                    embedding_method: metadata.embedding_method.clone(),
                    collection_name: metadata.collection_name.clone(),
                });
            }
        }
        documents
    }

    /// Locate a stored document by path: exact absolute match first, then
    /// basename fallback.
    pub fn find_document(&self, path: &Path) -> Result<Option<DocumentSummary>> {
        let absolute = identity::absolute_path(path)?;
        let absolute_str = absolute.to_string_lossy();
        let documents = self.list_documents();

        if let Some(doc) = documents.iter().find(|d| d.file_path == absolute_str) {
            return Ok(Some(doc.clone()));
        }
        let Some(basename) = path.file_name() else {
            return Ok(None);
        };
        Ok(documents
            .into_iter()
            .find(|d| Path::new(&d.file_path).file_name() == Some(basename)))
    }

    /// Delete every fragment of a document by identity.
    pub fn delete_document(&self, document_id: &str) -> Result<DeleteReport> {
        let matched = self
            .store
            .fetch(Some(MetadataFilter::DocumentId(document_id.to_string())), None);
        if matched.is_empty() {
            return Ok(DeleteReport {
                status: DeleteStatus::NotFound,
                document_ids: Vec::new(),
                chunks_deleted: 0,
            });
        }

        self.store.delete(&matched.ids)?;
        info!(document_id, chunks = matched.len(), "deleted document");
        Ok(DeleteReport {
            status: DeleteStatus::Success,
            document_ids: vec![document_id.to_string()],
            chunks_deleted: matched.len(),
        })
    }

    /// Delete by path: exact absolute-path match, then a filename-only scan
    /// over the whole collection when the exact stage comes up empty.
    pub fn delete_by_path(&self, path: &Path) -> Result<DeleteReport> {
        let absolute = identity::absolute_path(path)?;
        let exact = self.store.fetch(
            Some(MetadataFilter::FilePath(
                absolute.to_string_lossy().into_owned(),
            )),
            None,
        );

        let (ids, metadatas) = if exact.is_empty() {
            let Some(basename) = path.file_name().map(|n| n.to_os_string()) else {
                return Ok(DeleteReport {
                    status: DeleteStatus::NotFound,
                    document_ids: Vec::new(),
                    chunks_deleted: 0,
                });
            };
            info!(filename = %basename.to_string_lossy(), "no exact path match, trying filename match");
            let all = self.store.fetch(None, None);
            let mut ids = Vec::new();
            let mut metadatas = Vec::new();
            for (id, metadata) in all.ids.iter().zip(&all.metadatas) {
                if Path::new(&metadata.file_path).file_name() == Some(basename.as_os_str()) {
                    ids.push(id.clone());
                    metadatas.push(metadata.clone());
                }
            }
            (ids, metadatas)
        } else {
            (exact.ids, exact.metadatas)
        };

        if ids.is_empty() {
            return Ok(DeleteReport {
                status: DeleteStatus::NotFound,
                document_ids: Vec::new(),
                chunks_deleted: 0,
            });
        }

        let mut document_ids = Vec::new();
        for metadata in &metadatas {
            if !document_ids.contains(&metadata.document_id) {
                document_ids.push(metadata.document_id.clone());
            }
        }

        self.store.delete(&ids)?;
        info!(path = %path.display(), chunks = ids.len(), "deleted document by path");
        Ok(DeleteReport {
            status: DeleteStatus::Success,
            document_ids,
            chunks_deleted: ids.len(),
        })
    }

    /// Batch variant of `delete_by_path`: per-path outcomes are tallied,
    /// errors recorded instead of propagated.
    pub fn delete_documents(&self, paths: &[PathBuf]) -> BatchDeleteReport {
        let mut report = BatchDeleteReport {
            total: paths.len(),
            ..BatchDeleteReport::default()
        };
        for path in paths {
            let file_path = path.display().to_string();
            match self.delete_by_path(path) {
                Ok(result) if result.status == DeleteStatus::Success => {
                    report.deleted += 1;
                    report.results.push(BatchDeleteEntry {
                        file_path,
                        outcome: BatchOutcome::Deleted,
                        chunks_deleted: result.chunks_deleted,
                        error: None,
                    });
                }
                Ok(_) => {
                    report.not_found += 1;
                    report.results.push(BatchDeleteEntry {
                        file_path,
                        outcome: BatchOutcome::NotFound,
                        chunks_deleted: 0,
                        error: None,
                    });
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "batch delete entry failed");
                    report.failed += 1;
                    report.results.push(BatchDeleteEntry {
                        file_path,
                        outcome: BatchOutcome::Failed,
                        chunks_deleted: 0,
                        error: Some(err.to_string()),
                    });
                }
            }
        }
        report
    }

    /// Aggregate counts for the active collection. An empty or unreachable
    /// collection reports zeros, never an error.
    pub fn stats(&self) -> StatsReport {
        let all = self.store.fetch(None, None);
        let unique: HashSet<&str> = all
            .metadatas
            .iter()
            .map(|m| m.document_id.as_str())
            .collect();
        let total_content_size_bytes = all.documents.iter().map(String::len).sum();
        StatsReport {
            total_chunks: all.len(),
            unique_documents: unique.len(),
            total_content_size_bytes,
            database_path: self.db_path.clone(),
            collection_name: self.collection_name().to_string(),
            embedding_method: self.method.label().to_string(),
        }
    }
}
