//! Document loading: URL fetch plus plain-text extraction.
//!
//! The loader fetches raw bytes with a bounded timeout, determines the
//! format from the declared content-type or the URL suffix, and extracts
//! plain text. When the format cannot be determined, extraction is attempted
//! as PDF first and DOCX second; each failed attempt is logged so the causes
//! stay distinguishable. Nothing is written to disk.

mod docx;
mod pdf;

pub use docx::extract_docx_text;
pub use pdf::extract_pdf_text;

use docquery_core::{AppError, AppResult};
use std::time::Duration;

/// Default fetch timeout.
const FETCH_TIMEOUT_SECS: u64 = 30;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

/// Determine the document format from the declared content-type, falling
/// back to the URL suffix. Returns `None` when both are inconclusive.
pub fn detect_format(content_type: Option<&str>, url: &str) -> Option<DocumentFormat> {
    if let Some(ct) = content_type {
        let ct = ct.to_lowercase();
        if ct.contains("pdf") {
            return Some(DocumentFormat::Pdf);
        }
        if ct.contains("word") || ct.contains("officedocument") {
            return Some(DocumentFormat::Docx);
        }
    }

    // Strip query/fragment before looking at the suffix
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_lowercase();
    if path.ends_with(".pdf") {
        Some(DocumentFormat::Pdf)
    } else if path.ends_with(".docx") || path.ends_with(".doc") {
        Some(DocumentFormat::Docx)
    } else {
        None
    }
}

/// Fetches remote documents and extracts their plain text.
pub struct DocumentLoader {
    /// HTTP client with a bounded fetch timeout
    client: reqwest::Client,
}

impl DocumentLoader {
    /// Create a loader with the default fetch timeout.
    pub fn new() -> AppResult<Self> {
        Self::with_timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
    }

    /// Create a loader with a custom fetch timeout.
    pub fn with_timeout(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Fetch the document at `url` and extract its plain text.
    ///
    /// # Errors
    /// * `AppError::DocumentFetch` - network failure or non-success status
    /// * `AppError::DocumentParse` - no extraction strategy succeeded
    pub async fn load(&self, url: &str) -> AppResult<String> {
        tracing::info!(url, "Fetching document");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::DocumentFetch(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::DocumentFetch(format!(
                "Fetching {} returned HTTP {}",
                url, status
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::DocumentFetch(format!("Failed to read body of {}: {}", url, e)))?;

        let text = match detect_format(content_type.as_deref(), url) {
            Some(DocumentFormat::Pdf) => extract_pdf_text(&bytes)?,
            Some(DocumentFormat::Docx) => extract_docx_text(&bytes)?,
            None => extract_with_fallback(&bytes, url)?,
        };

        tracing::info!(url, chars = text.len(), "Extracted document text");
        Ok(text)
    }
}

/// Documented fallback order for ambiguous formats: PDF first, DOCX second,
/// first success wins.
fn extract_with_fallback(bytes: &[u8], url: &str) -> AppResult<String> {
    tracing::debug!(url, "Format is ambiguous, trying PDF then DOCX");

    let pdf_err = match extract_pdf_text(bytes) {
        Ok(text) => return Ok(text),
        Err(e) => {
            tracing::warn!(url, error = %e, "PDF extraction failed, falling back to DOCX");
            e
        }
    };

    match extract_docx_text(bytes) {
        Ok(text) => Ok(text),
        Err(docx_err) => Err(AppError::DocumentParse(format!(
            "Could not extract {} as PDF ({}) or DOCX ({})",
            url, pdf_err, docx_err
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io::Write;

    #[test]
    fn test_detect_format_from_content_type() {
        assert_eq!(
            detect_format(Some("application/pdf"), "https://x/doc"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            detect_format(
                Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
                "https://x/doc"
            ),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(
            detect_format(Some("application/msword"), "https://x/doc"),
            Some(DocumentFormat::Docx)
        );
    }

    #[test]
    fn test_detect_format_from_url_suffix() {
        assert_eq!(
            detect_format(None, "https://x/policy.PDF?sig=abc"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            detect_format(Some("application/octet-stream"), "https://x/terms.docx"),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(detect_format(None, "https://x/terms.doc"), Some(DocumentFormat::Docx));
    }

    #[test]
    fn test_detect_format_ambiguous() {
        assert_eq!(detect_format(None, "https://x/download"), None);
        assert_eq!(detect_format(Some("application/octet-stream"), "https://x/blob"), None);
    }

    /// Build a minimal DOCX archive in memory.
    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
            .collect();
        let document = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{}</w:body></w:document>",
            body
        );

        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[tokio::test]
    async fn test_load_docx_by_content_type() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/terms");
                then.status(200)
                    .header(
                        "content-type",
                        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                    )
                    .body(docx_bytes(&["Grace period is thirty days.", "Premiums are monthly."]));
            })
            .await;

        let loader = DocumentLoader::new().unwrap();
        let text = loader.load(&server.url("/terms")).await.unwrap();
        assert_eq!(
            text,
            "Grace period is thirty days.\n\nPremiums are monthly."
        );
    }

    #[tokio::test]
    async fn test_load_ambiguous_falls_back_to_docx() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/blob");
                then.status(200)
                    .header("content-type", "application/octet-stream")
                    .body(docx_bytes(&["Fallback worked."]));
            })
            .await;

        let loader = DocumentLoader::new().unwrap();
        let text = loader.load(&server.url("/blob")).await.unwrap();
        assert_eq!(text, "Fallback worked.");
    }

    #[tokio::test]
    async fn test_load_http_error_is_fetch_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.pdf");
                then.status(404);
            })
            .await;

        let loader = DocumentLoader::new().unwrap();
        let err = loader.load(&server.url("/missing.pdf")).await.unwrap_err();
        assert!(matches!(err, docquery_core::AppError::DocumentFetch(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_load_garbage_is_parse_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/blob");
                then.status(200).body("definitely not a document");
            })
            .await;

        let loader = DocumentLoader::new().unwrap();
        let err = loader.load(&server.url("/blob")).await.unwrap_err();
        match err {
            docquery_core::AppError::DocumentParse(msg) => {
                // Both failure causes are surfaced
                assert!(msg.contains("PDF"));
                assert!(msg.contains("DOCX"));
            }
            other => panic!("expected DocumentParse, got {}", other),
        }
    }
}
