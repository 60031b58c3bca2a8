//! Markdown and PDF normalization into plain text.

use std::fs;
use std::path::Path;
use tracing::{info, warn};

use ragdb_core::error::{Error, Result};
use ragdb_core::traits::Extractor;
use ragdb_core::types::FileType;

/// `Extractor` collaborator backed by the `pdf-extract` crate.
pub struct PdfTextExtractor;

impl Extractor for PdfTextExtractor {
    fn extract_pages(&self, path: &Path) -> anyhow::Result<Vec<String>> {
        Ok(pdf_extract::extract_text_by_pages(path)?)
    }
}

/// Read a document of the given type into normalized plain text.
pub fn read_document(extractor: &dyn Extractor, path: &Path, file_type: FileType) -> Result<String> {
    match file_type {
        FileType::Md => read_markdown(path),
        FileType::Pdf => read_pdf(extractor, path),
    }
}

fn read_markdown(path: &Path) -> Result<String> {
    // Non-UTF-8 bytes are an extraction failure, same as an unreadable file.
    let content = fs::read_to_string(path).map_err(|e| Error::Extraction {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    info!(path = %path.display(), "read markdown file");
    Ok(content)
}

fn read_pdf(extractor: &dyn Extractor, path: &Path) -> Result<String> {
    let pages = extractor
        .extract_pages(path)
        .map_err(|e| Error::Extraction {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut content = String::new();
    for (page_num, page) in pages.iter().enumerate() {
        if page.trim().is_empty() {
            warn!(page = page_num + 1, path = %path.display(), "page yielded no text, skipping");
            continue;
        }
        content.push_str(&format!("\n--- Page {} ---\n{page}\n", page_num + 1));
    }

    if content.trim().is_empty() {
        return Err(Error::Extraction {
            path: path.to_path_buf(),
            reason: "no text content extracted".to_string(),
        });
    }
    info!(path = %path.display(), pages = pages.len(), "read PDF file");
    Ok(content)
}
