use std::path::Path;

use crate::error::ProcessError;
use crate::processor::TextExtractor;

/// Page separator appended after every page's text.
const PAGE_SEPARATOR: &str = "\n\n";

/// Text extractor backed by `lopdf`.
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(
        &self,
        path: &Path,
        on_page: &mut dyn FnMut(usize, usize),
    ) -> Result<String, ProcessError> {
        let _span = tracing::info_span!("processor.pdf").entered();

        let pdf_bytes = std::fs::read(path).map_err(|e| ProcessError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let doc = lopdf::Document::load_mem(&pdf_bytes)
            .map_err(|e| ProcessError::PdfProcessing(format!("Failed to load PDF: {}", e)))?;

        Ok(extract_pages(&doc, on_page))
    }
}

fn extract_pages(doc: &lopdf::Document, on_page: &mut dyn FnMut(usize, usize)) -> String {
    let pages = doc.get_pages();
    let total = pages.len();
    let mut text = String::new();

    for (index, page_num) in pages.keys().enumerate() {
        // Pages with undecodable fonts contribute nothing rather than failing the document
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => tracing::debug!(page = page_num, error = %e, "No text on page"),
        }
        text.push_str(PAGE_SEPARATOR);
        on_page(index + 1, total);
    }

    tracing::debug!(pages = total, chars = text.chars().count(), "Extracted PDF text");
    text
}
