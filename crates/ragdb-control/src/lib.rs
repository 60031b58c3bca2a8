//! Document lifecycle management over a pluggable vector store: ingest
//! (study), search, list, delete, and stats.

pub mod extract;
pub mod service;

pub use extract::PdfTextExtractor;
pub use service::RagControl;
