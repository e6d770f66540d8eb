//! Resume Extractor — PDF bytes to resume text.

use tracing::debug;

use crate::errors::PipelineError;
use crate::extraction::pdf::extract_pages;
use crate::models::analysis::{NormalizedText, TextOrigin};

/// Concatenates per-page text in page order. No OCR: image-only documents
/// yield no text and are reported as an extraction failure.
pub fn extract(pdf_bytes: &[u8]) -> Result<NormalizedText, PipelineError> {
    let pages =
        extract_pages(pdf_bytes).map_err(|e| PipelineError::InvalidFormat(e.to_string()))?;
    let page_count = pages.len();
    let text = pages.concat();
    debug!("Extracted {} chars from {page_count} resume page(s)", text.len());

    NormalizedText::new(TextOrigin::Resume, text).ok_or_else(|| PipelineError::Extraction {
        origin: TextOrigin::Resume,
        message: format!("none of the {page_count} PDF page(s) contain a text layer"),
    })
}
