pub mod pdf;

use std::path::Path;

use crate::error::ProcessError;

pub use pdf::PdfTextExtractor;

/// The only document type accepted for conversion.
pub const ACCEPTED_EXTENSION: &str = "pdf";

/// Pulls plain text out of a stored document.
pub trait TextExtractor: Send + Sync {
    /// Extracts the text of every page, in order.
    ///
    /// `on_page(done, total)` is invoked after each page so callers can
    /// report progress. It is never invoked for a document without pages.
    fn extract(
        &self,
        path: &Path,
        on_page: &mut dyn FnMut(usize, usize),
    ) -> Result<String, ProcessError>;
}

/// Returns true if `filename` carries the accepted document extension,
/// compared case-insensitively.
pub fn has_accepted_extension(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.eq_ignore_ascii_case(ACCEPTED_EXTENSION),
        None => false,
    }
}
