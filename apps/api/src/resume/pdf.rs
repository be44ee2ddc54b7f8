//! PDF text extraction.
//!
//! Extraction is local and deterministic, so failures are never retried.
//! Image-only pages yield empty strings; there is no OCR.

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error, PartialEq)]
pub enum ExtractionError {
    #[error("the uploaded file is empty")]
    Empty,

    #[error("the uploaded file is not a PDF")]
    NotPdf,

    #[error("the PDF could not be read: {0}")]
    Unreadable(String),
}

/// Plain text of an uploaded résumé, one string per page in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedDocument {
    pages: Vec<String>,
}

impl ExtractedDocument {
    pub fn from_pages(pages: Vec<String>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All pages concatenated in order.
    pub fn text(&self) -> String {
        self.pages.concat()
    }

    /// True when no page produced any non-whitespace text (e.g. a scanned résumé).
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.trim().is_empty())
    }
}

/// Extracts per-page text from an in-memory PDF.
///
/// Blocking and CPU-bound; call from `spawn_blocking` in async code.
pub fn extract_document(bytes: &[u8]) -> Result<ExtractedDocument, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::Empty);
    }
    if !looks_like_pdf(bytes) {
        return Err(ExtractionError::NotPdf);
    }

    // The parser panics on some malformed inputs; contain that here.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    match outcome {
        Ok(Ok(pages)) => {
            debug!("Extracted {} pages from PDF", pages.len());
            Ok(ExtractedDocument::from_pages(pages))
        }
        Ok(Err(e)) => {
            warn!("PDF extraction failed: {e}");
            Err(ExtractionError::Unreadable(e.to_string()))
        }
        Err(_) => {
            warn!("PDF parser panicked on malformed input");
            Err(ExtractionError::Unreadable(
                "the file might be corrupted or in an unsupported format".to_string(),
            ))
        }
    }
}

/// Checks for the `%PDF-` header, allowing leading whitespace or a BOM as
/// some generators emit.
fn looks_like_pdf(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}
