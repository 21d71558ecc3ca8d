//! PDF text extraction.
//!
//! Page boundaries are preserved as human-readable `[Page N]` markers so
//! later-quoted context stays traceable to its page.

use docquery_core::{AppError, AppResult};
use lopdf::Document;

/// Extract plain text from PDF bytes, page by page.
///
/// Pages with no extractable text are skipped; page texts are prefixed with
/// `[Page N]` and joined with blank lines.
pub fn extract_pdf_text(bytes: &[u8]) -> AppResult<String> {
    let document = Document::load_mem(bytes)
        .map_err(|e| AppError::DocumentParse(format!("Failed to load PDF: {}", e)))?;

    let mut parts = Vec::new();
    for (&page_number, _) in document.get_pages().iter() {
        let page_text = document.extract_text(&[page_number]).map_err(|e| {
            AppError::DocumentParse(format!(
                "Failed to extract text from PDF page {}: {}",
                page_number, e
            ))
        })?;

        let trimmed = page_text.trim();
        if !trimmed.is_empty() {
            parts.push(format!("[Page {}]\n{}", page_number, trimmed));
        }
    }

    tracing::debug!(pages = parts.len(), "Extracted PDF text");

    Ok(parts.join("\n\n"))
}
