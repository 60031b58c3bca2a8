use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use ragdb_control::RagControl;
use ragdb_core::config::RagConfig;
use ragdb_core::error::Error;
use ragdb_core::traits::Extractor;
use ragdb_core::types::{DeleteStatus, FileType, StudyStatus};
use ragdb_store::MemoryStore;

/// Extractor stub: study_document never needs a real PDF on disk.
struct StubPdf {
    pages: Vec<String>,
}

impl Extractor for StubPdf {
    fn extract_pages(&self, _path: &Path) -> anyhow::Result<Vec<String>> {
        Ok(self.pages.clone())
    }
}

struct FailingPdf;

impl Extractor for FailingPdf {
    fn extract_pages(&self, _path: &Path) -> anyhow::Result<Vec<String>> {
        anyhow::bail!("corrupt xref table")
    }
}

fn control() -> RagControl {
    control_with(StubPdf { pages: Vec::new() })
}

fn control_with(extractor: impl Extractor + 'static) -> RagControl {
    RagControl::open(
        &RagConfig::default(),
        Box::new(MemoryStore::new()),
        Box::new(extractor),
    )
    .unwrap()
}

fn write_md(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn studying_the_same_path_twice_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let file = write_md(
        tmp.path(),
        "notes.md",
        "Ownership moves values. Borrowing lends them out instead.",
    );
    let rag = control();

    let first = rag.study_document(&file, FileType::Md).unwrap();
    assert_eq!(first.status, StudyStatus::Created);
    assert_eq!(first.chunks_count, Some(1));
    assert!(first.document_id.starts_with("doc_"));
    assert_eq!(first.collection_name, "documents_local_hash");

    let chunks_before = rag.stats().total_chunks;

    let second = rag.study_document(&file, FileType::Md).unwrap();
    assert_eq!(second.status, StudyStatus::Exists);
    assert_eq!(second.document_id, first.document_id);
    assert_eq!(second.chunks_count, None);

    // The short-circuit performed no new writes.
    assert_eq!(rag.stats().total_chunks, chunks_before);
}

#[test]
fn studying_a_missing_file_fails_up_front() {
    let rag = control();
    let err = rag
        .study_document(Path::new("/no/such/file.md"), FileType::Md)
        .unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
}

#[test]
fn a_file_with_no_usable_text_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let file = write_md(tmp.path(), "blank.md", "   \n\t\n  ");
    let rag = control();
    let err = rag.study_document(&file, FileType::Md).unwrap_err();
    assert!(matches!(err, Error::EmptyContent(_)));
}

#[test]
fn pdf_pages_are_joined_with_markers_and_blank_pages_skipped() {
    let tmp = TempDir::new().unwrap();
    let file = write_md(tmp.path(), "paper.pdf", "placeholder bytes");
    let rag = control_with(StubPdf {
        pages: vec![
            "Abstract: chunking strategies for retrieval.".to_string(),
            "   ".to_string(),
            "Conclusion: overlap preserves context.".to_string(),
        ],
    });

    let report = rag.study_document(&file, FileType::Pdf).unwrap();
    assert_eq!(report.status, StudyStatus::Created);
    assert_eq!(report.file_type, FileType::Pdf);

    let hits = rag.search("chunking strategies", None, 5).unwrap();
    assert!(!hits.results.is_empty());
    assert!(hits.results[0].content.contains("--- Page 1 ---"));
    // Page 2 was blank and skipped, page 3 kept its original number.
    assert!(hits.results[0].content.contains("--- Page 3 ---"));
}

#[test]
fn a_pdf_with_no_extractable_text_is_an_extraction_error() {
    let tmp = TempDir::new().unwrap();
    let file = write_md(tmp.path(), "scan.pdf", "placeholder bytes");
    let rag = control_with(StubPdf {
        pages: vec!["  ".to_string(), String::new()],
    });
    let err = rag.study_document(&file, FileType::Pdf).unwrap_err();
    assert!(matches!(err, Error::Extraction { .. }));
}

#[test]
fn extractor_failures_surface_as_extraction_errors() {
    let tmp = TempDir::new().unwrap();
    let file = write_md(tmp.path(), "broken.pdf", "placeholder bytes");
    let rag = control_with(FailingPdf);
    let err = rag.study_document(&file, FileType::Pdf).unwrap_err();
    assert!(matches!(err, Error::Extraction { .. }));
}

#[test]
fn search_filter_token_routes_by_prefix() {
    let tmp = TempDir::new().unwrap();
    let rust = write_md(
        tmp.path(),
        "rust.md",
        "The borrow checker enforces ownership and lifetimes.",
    );
    let garden = write_md(
        tmp.path(),
        "garden.md",
        "Tomatoes want full sun and steady watering.",
    );
    let rag = control();
    let rust_report = rag.study_document(&rust, FileType::Md).unwrap();
    rag.study_document(&garden, FileType::Md).unwrap();

    // A `doc_` token filters by document identity.
    let by_id = rag
        .search("anything at all", Some(rust_report.document_id.as_str()), 10)
        .unwrap();
    assert!(by_id.filter_applied);
    assert_eq!(by_id.results_count, 1);
    assert_eq!(by_id.results[0].metadata.document_id, rust_report.document_id);

    // Any other token is treated as a file path.
    let by_path = rag
        .search("anything at all", Some(garden.to_str().unwrap()), 10)
        .unwrap();
    assert_eq!(by_path.results_count, 1);
    assert_eq!(
        by_path.results[0].metadata.file_path,
        garden.to_string_lossy()
    );

    let unfiltered = rag.search("sun and watering", None, 10).unwrap();
    assert!(!unfiltered.filter_applied);
    assert_eq!(unfiltered.results_count, 2);
}

#[test]
fn search_results_carry_position_and_distance() {
    let tmp = TempDir::new().unwrap();
    let file = write_md(
        tmp.path(),
        "long.md",
        &"Chunks carry their position. ".repeat(60),
    );
    let rag = control();
    let report = rag.study_document(&file, FileType::Md).unwrap();
    assert!(report.chunks_count.unwrap() > 1);

    let hits = rag.search("chunks position", None, 3).unwrap();
    assert!(!hits.results.is_empty());
    for hit in &hits.results {
        assert!(hit.distance.is_some());
        assert!(hit.metadata.chunk_index < hit.metadata.total_chunks);
        assert!(hit.chunk_id.contains("_chunk_"));
    }
}

#[test]
fn empty_queries_are_rejected() {
    let rag = control();
    assert!(matches!(rag.search("", None, 5), Err(Error::EmptyQuery)));
}

#[test]
fn list_groups_chunks_into_documents() {
    let tmp = TempDir::new().unwrap();
    let a = write_md(tmp.path(), "a.md", &"Alpha text with sentences. ".repeat(80));
    let b = write_md(tmp.path(), "b.md", "Beta text, one chunk only.");
    let rag = control();
    let report_a = rag.study_document(&a, FileType::Md).unwrap();
    rag.study_document(&b, FileType::Md).unwrap();

    let documents = rag.list_documents();
    assert_eq!(documents.len(), 2);
    let doc_a = documents
        .iter()
        .find(|d| d.document_id == report_a.document_id)
        .unwrap();
    assert_eq!(doc_a.total_chunks, report_a.chunks_count.unwrap());
    assert_eq!(doc_a.file_type, FileType::Md);
}

#[test]
fn delete_by_id_removes_every_fragment() {
    let tmp = TempDir::new().unwrap();
    let file = write_md(tmp.path(), "gone.md", &"Disposable content here. ".repeat(80));
    let rag = control();
    let report = rag.study_document(&file, FileType::Md).unwrap();

    let deleted = rag.delete_document(&report.document_id).unwrap();
    assert_eq!(deleted.status, DeleteStatus::Success);
    assert_eq!(deleted.chunks_deleted, report.chunks_count.unwrap());
    assert_eq!(deleted.document_ids, vec![report.document_id.clone()]);
    assert_eq!(rag.stats().total_chunks, 0);

    let again = rag.delete_document(&report.document_id).unwrap();
    assert_eq!(again.status, DeleteStatus::NotFound);
}

#[test]
fn delete_by_path_works_after_the_file_is_gone_from_disk() {
    let tmp = TempDir::new().unwrap();
    let file = write_md(tmp.path(), "ephemeral.md", "Here one moment.");
    let rag = control();
    rag.study_document(&file, FileType::Md).unwrap();
    fs::remove_file(&file).unwrap();

    let deleted = rag.delete_by_path(&file).unwrap();
    assert_eq!(deleted.status, DeleteStatus::Success);
    assert_eq!(deleted.chunks_deleted, 1);
}

#[test]
fn delete_by_path_falls_back_to_basename_matching() {
    let tmp = TempDir::new().unwrap();
    let file = write_md(tmp.path(), "report.md", "Quarterly numbers and notes.");
    let rag = control();
    let report = rag.study_document(&file, FileType::Md).unwrap();

    // Different directory, same basename: stage one misses, stage two hits.
    let elsewhere = Path::new("/somewhere/else/report.md");
    let deleted = rag.delete_by_path(elsewhere).unwrap();
    assert_eq!(deleted.status, DeleteStatus::Success);
    assert_eq!(deleted.document_ids, vec![report.document_id]);
    assert_eq!(deleted.chunks_deleted, 1);
    assert_eq!(rag.stats().total_chunks, 0);
}

#[test]
fn delete_by_path_reports_not_found_when_both_stages_miss() {
    let tmp = TempDir::new().unwrap();
    let file = write_md(tmp.path(), "kept.md", "Still here.");
    let rag = control();
    rag.study_document(&file, FileType::Md).unwrap();

    let result = rag.delete_by_path(Path::new("/absent/other.md")).unwrap();
    assert_eq!(result.status, DeleteStatus::NotFound);
    assert_eq!(result.chunks_deleted, 0);
    assert_eq!(rag.stats().total_chunks, 1);
}

#[test]
fn find_document_matches_exact_path_then_basename() {
    let tmp = TempDir::new().unwrap();
    let file = write_md(tmp.path(), "manual.md", "Operating instructions.");
    let rag = control();
    let report = rag.study_document(&file, FileType::Md).unwrap();

    let exact = rag.find_document(&file).unwrap().unwrap();
    assert_eq!(exact.document_id, report.document_id);

    let by_name = rag
        .find_document(Path::new("/moved/manual.md"))
        .unwrap()
        .unwrap();
    assert_eq!(by_name.document_id, report.document_id);

    assert!(rag.find_document(Path::new("/nope.md")).unwrap().is_none());
}

#[test]
fn batch_delete_tallies_per_path_outcomes() {
    let tmp = TempDir::new().unwrap();
    let a = write_md(tmp.path(), "a.md", "First document body.");
    let rag = control();
    rag.study_document(&a, FileType::Md).unwrap();

    let report = rag.delete_documents(&[a.clone(), tmp.path().join("missing.md")]);
    assert_eq!(report.total, 2);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.not_found, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.results.len(), 2);
}

#[test]
fn stats_on_an_empty_collection_are_all_zero() {
    let rag = control();
    let stats = rag.stats();
    assert_eq!(stats.total_chunks, 0);
    assert_eq!(stats.unique_documents, 0);
    assert_eq!(stats.total_content_size_bytes, 0);
    assert_eq!(stats.collection_name, "documents_local_hash");
    assert_eq!(stats.embedding_method, "local-hash");
}

#[test]
fn stats_aggregate_counts_and_content_size() {
    let tmp = TempDir::new().unwrap();
    let a = write_md(tmp.path(), "a.md", &"Longer body of prose. ".repeat(100));
    let b = write_md(tmp.path(), "b.md", "Short body.");
    let rag = control();
    let report_a = rag.study_document(&a, FileType::Md).unwrap();
    rag.study_document(&b, FileType::Md).unwrap();

    let stats = rag.stats();
    assert_eq!(stats.unique_documents, 2);
    assert_eq!(
        stats.total_chunks,
        report_a.chunks_count.unwrap() + 1
    );
    assert!(stats.total_content_size_bytes > 0);
}

#[test]
fn study_directory_sweeps_markdown_and_skips_other_files() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("nested")).unwrap();
    write_md(tmp.path(), "one.md", "First file content.");
    write_md(&tmp.path().join("nested"), "two.md", "Second file content.");
    write_md(tmp.path(), "ignored.txt", "Not an ingestible type.");
    let rag = control();

    let summary = rag.study_directory(tmp.path()).unwrap();
    assert_eq!(summary.files_scanned, 2);
    assert_eq!(summary.files_created, 2);
    assert_eq!(summary.files_failed, 0);
    assert_eq!(summary.chunks_created, 2);

    // A second sweep finds everything already studied.
    let summary = rag.study_directory(tmp.path()).unwrap();
    assert_eq!(summary.files_created, 0);
    assert_eq!(summary.files_existing, 2);
}

#[test]
fn reports_serialize_with_the_contract_field_names() {
    let tmp = TempDir::new().unwrap();
    let file = write_md(tmp.path(), "contract.md", "Body for the wire format.");
    let rag = control();
    let report = rag.study_document(&file, FileType::Md).unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["status"], "created");
    assert_eq!(value["chunks_count"], 1);
    assert_eq!(value["collection_name"], "documents_local_hash");
    assert_eq!(value["embedding_method"], "local-hash");
    assert!(value["document_id"].as_str().unwrap().starts_with("doc_"));

    let stats = serde_json::to_value(rag.stats()).unwrap();
    for key in [
        "total_chunks",
        "unique_documents",
        "total_content_size_bytes",
        "database_path",
        "collection_name",
        "embedding_method",
    ] {
        assert!(stats.get(key).is_some(), "stats is missing `{key}`");
    }
}
