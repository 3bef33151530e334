//! PDF document loading.
//!
//! Text extraction is blocking; the ingestion pipeline runs it on the
//! blocking thread pool. Page boundaries come from the form-feed
//! characters `pdf-extract` inserts between pages.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::document::{Document, Page};
use crate::error::{RagError, Result};

/// Load one PDF as a page-structured [`Document`].
///
/// The document's source identifier is the file name. Page text is
/// trimmed; fully blank pages are kept (with empty text) so page
/// numbering stays aligned with the file.
///
/// # Errors
///
/// Returns [`RagError::Load`] when the file cannot be read or parsed.
pub fn load_pdf(path: &Path) -> Result<Document> {
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let text = pdf_extract::extract_text(path).map_err(|e| RagError::Load {
        source_path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let pages: Vec<Page> = text
        .split('\x0c')
        .enumerate()
        .map(|(number, page_text)| Page { number, text: page_text.trim().to_string() })
        .collect();

    debug!(source = %source, pages = pages.len(), "loaded document");
    Ok(Document::new(source, pages))
}

/// Enumerate the PDF files in a directory, sorted by file name.
///
/// Non-PDF entries are ignored. Subdirectories are not descended into.
///
/// # Errors
///
/// Returns [`RagError::Load`] when the directory cannot be read.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| RagError::Load {
        source_path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn load_missing_file_is_a_load_error() {
        let result = load_pdf(Path::new("/nonexistent/report.pdf"));
        assert!(matches!(result, Err(RagError::Load { .. })));
    }

    #[test]
    fn load_garbage_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"this is not a pdf").unwrap();

        let result = load_pdf(&path);
        assert!(matches!(result, Err(RagError::Load { .. })));
    }

    #[test]
    fn discover_filters_and_sorts_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.pdf"), b"").unwrap();
        fs::write(dir.path().join("a.PDF"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let paths = discover_pdfs(dir.path()).unwrap();
        let names: Vec<_> =
            paths.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn discover_missing_directory_is_a_load_error() {
        let result = discover_pdfs(Path::new("/nonexistent/data/raw"));
        assert!(matches!(result, Err(RagError::Load { .. })));
    }
}
