//! End-to-end walkthrough against the in-memory store:
//! study a markdown file, search it, print lifecycle reports as JSON.
//!
//! Run with: `cargo run -p ragdb-control --example demo`

use std::fs;

use ragdb_control::{PdfTextExtractor, RagControl};
use ragdb_core::config::RagConfig;
use ragdb_core::types::FileType;
use ragdb_store::MemoryStore;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let tmp = tempfile::tempdir()?;
    let file = tmp.path().join("ownership.md");
    fs::write(
        &file,
        "Ownership is Rust's most distinctive feature. Each value has a single \
         owner, and when the owner goes out of scope the value is dropped. \
         Borrowing lets code use a value without taking ownership of it.",
    )?;

    let rag = RagControl::open(
        &RagConfig::default(),
        Box::new(MemoryStore::new()),
        Box::new(PdfTextExtractor),
    )?;

    let report = rag.study_document(&file, FileType::Md)?;
    println!("study: {}", serde_json::to_string_pretty(&report)?);

    let results = rag.search("who owns a value", None, 3)?;
    println!("search: {}", serde_json::to_string_pretty(&results)?);

    println!("stats: {}", serde_json::to_string_pretty(&rag.stats())?);
    Ok(())
}
