//! PDF text extraction.
//!
//! Text is pulled page by page with `lopdf`. A page that fails or yields only
//! whitespace is logged and skipped; the document as a whole fails only when
//! it cannot be loaded or when no page yields any text. Parser panics on
//! malformed content are caught and reported as unreadable documents.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No readable text found in the PDF.")]
    NoReadableText,

    #[error("Error extracting text from PDF: {0}")]
    Unreadable(String),
}

/// Reads a saved upload from disk and extracts its text.
pub fn extract_text_from_path(path: &Path) -> Result<String, ExtractionError> {
    info!("Extracting text from PDF: {}", path.display());
    let bytes = std::fs::read(path).map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
    extract_text_from_pdf(&bytes)
}

/// Extracts the text of every page, in page order, joined by newlines.
pub fn extract_text_from_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    match panic::catch_unwind(AssertUnwindSafe(|| extract_pages(bytes))) {
        Ok(result) => result,
        Err(_) => {
            error!("PDF parser panicked - likely malformed document structure");
            Err(ExtractionError::Unreadable(
                "PDF parser failed on malformed content".to_string(),
            ))
        }
    }
}

fn extract_pages(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = Document::load_mem(bytes).map_err(|e| {
        error!("Error loading PDF: {e}");
        ExtractionError::Unreadable(e.to_string())
    })?;

    if doc.is_encrypted() {
        error!("Refusing encrypted PDF");
        return Err(ExtractionError::Unreadable(
            "the document is encrypted".to_string(),
        ));
    }

    let pages = doc.get_pages();
    info!("PDF has {} pages", pages.len());

    let extracted = collect_page_text(pages.keys().copied(), |n| doc.extract_text(&[n]));

    if extracted.is_empty() {
        warn!("No text extracted from PDF");
        return Err(ExtractionError::NoReadableText);
    }

    let text = extracted.join("\n");
    info!("PDF text extraction completed: {} chars", text.len());
    Ok(text)
}

/// Runs `extract` on each page number in turn and keeps the non-blank
/// results. Errors and panics on a single page are logged and skipped.
fn collect_page_text<I, F, E>(page_nums: I, extract: F) -> Vec<String>
where
    I: IntoIterator<Item = u32>,
    F: Fn(u32) -> Result<String, E>,
    E: std::fmt::Display,
{
    let mut extracted = Vec::new();
    for page_num in page_nums {
        match panic::catch_unwind(AssertUnwindSafe(|| extract(page_num))) {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                debug!("Extracted {} chars from page {page_num}", text.len());
                extracted.push(text);
            }
            Ok(Ok(_)) => warn!("Empty text extracted from page {page_num}"),
            Ok(Err(e)) => warn!("Failed to extract text from page {page_num}: {e}"),
            Err(_) => warn!("PDF parser panicked on page {page_num}; skipping"),
        }
    }
    extracted
}
