//! DOCX text extraction.
//!
//! A DOCX file is a ZIP archive whose main content lives in
//! `word/document.xml`. Text runs (`w:t`) are concatenated per paragraph
//! (`w:p`); non-empty paragraphs are joined with blank lines.

use docquery_core::{AppError, AppResult};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

/// Extract plain text from DOCX bytes.
pub fn extract_docx_text(bytes: &[u8]) -> AppResult<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::DocumentParse(format!("Failed to open DOCX archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| AppError::DocumentParse(format!("DOCX has no word/document.xml: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| AppError::DocumentParse(format!("Failed to read DOCX content: {}", e)))?;

    extract_paragraphs(&xml)
}

/// Pull paragraph texts out of the WordprocessingML body.
fn extract_paragraphs(xml: &str) -> AppResult<String> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    let paragraph = current.trim();
                    if !paragraph.is_empty() {
                        paragraphs.push(paragraph.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let text = t
                    .unescape()
                    .map_err(|e| AppError::DocumentParse(format!("Invalid DOCX text run: {}", e)))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(AppError::DocumentParse(format!(
                    "Invalid DOCX XML at offset {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }
    }

    tracing::debug!(paragraphs = paragraphs.len(), "Extracted DOCX text");

    Ok(paragraphs.join("\n\n"))
}
