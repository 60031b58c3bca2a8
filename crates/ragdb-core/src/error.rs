use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to resolve path {path}: {source}")]
    PathResolution {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Unsupported embedding method: {0}")]
    UnsupportedEmbedding(String),

    #[error("Extraction failed for {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },

    #[error("No content extracted from {0}")]
    EmptyContent(PathBuf),

    #[error("Vector store write failed: {0}")]
    StoreWrite(String),

    #[error("Vector store query failed: {0}")]
    StoreQuery(String),

    #[error("Search query cannot be empty")]
    EmptyQuery,

    #[error("Missing API key for embedding method {0}")]
    MissingCredential(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Malformed store response: {0}")]
    MalformedResponse(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),
}

pub type Result<T> = std::result::Result<T, Error>;
