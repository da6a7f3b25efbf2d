//! Helpers for sanitizing user-supplied names and span attributes.
//!
//! Uploaded filenames come straight from the client, and traces should not
//! carry absolute storage paths.

use std::path::Path;

/// Returns only the filename component of a path (no directory).
///
/// Safe for span fields: keeps the file name, drops the directories.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Reduces a client-supplied filename to a single path component.
///
/// Both `/` and `\` are treated as separators. Falls back to `upload` when
/// nothing usable remains.
pub fn upload_basename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();

    if base.is_empty() || base == "." || base == ".." {
        "upload".to_string()
    } else {
        base.to_string()
    }
}

/// File stem of an upload name, used to name its audio. Falls back to `audio`.
pub fn filename_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("audio")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_path_returns_filename() {
        assert_eq!(
            redact_path(Path::new("/srv/uploads/abc_book.pdf")),
            "abc_book.pdf"
        );
    }

    #[test]
    fn test_redact_path_no_filename() {
        assert_eq!(redact_path(Path::new("/")), "<unknown>");
    }

    #[test]
    fn test_upload_basename_plain() {
        assert_eq!(upload_basename("book.pdf"), "book.pdf");
        assert_eq!(upload_basename("  my book.pdf "), "my book.pdf");
    }

    #[test]
    fn test_upload_basename_strips_directories() {
        assert_eq!(upload_basename("../../etc/evil.pdf"), "evil.pdf");
        assert_eq!(upload_basename("C:\\Users\\me\\book.pdf"), "book.pdf");
    }

    #[test]
    fn test_upload_basename_fallback() {
        assert_eq!(upload_basename(""), "upload");
        assert_eq!(upload_basename("dir/"), "upload");
        assert_eq!(upload_basename(".."), "upload");
    }

    #[test]
    fn test_filename_stem() {
        assert_eq!(filename_stem("book.pdf"), "book");
        assert_eq!(filename_stem("My Book.final.pdf"), "My Book.final");
        assert_eq!(filename_stem("noext"), "noext");
        assert_eq!(filename_stem(""), "audio");
    }
}
