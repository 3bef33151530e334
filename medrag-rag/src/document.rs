//! Data types for documents, chunks, and search results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One page of a source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    /// 0-based page index within the document.
    pub number: usize,
    /// Extracted text of the page.
    pub text: String,
}

/// A source document: an identifier plus its ordered pages.
///
/// Immutable once loaded; chunking never mutates the document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Source identifier (typically the file name).
    pub source: String,
    /// Ordered pages.
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(source: impl Into<String>, pages: Vec<Page>) -> Self {
        Self { source: source.into(), pages }
    }

    /// Build a single-page document, mostly useful in tests.
    pub fn single_page(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source: source.into(), pages: vec![Page { number: 0, text: text.into() }] }
    }
}

/// Where a chunk came from: source document and page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Provenance {
    pub source: String,
    /// 0-based page index.
    pub page: usize,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pages are shown 1-based to match PDF viewers.
        write!(f, "{} (p. {})", self.source, self.page + 1)
    }
}

/// A contiguous passage of one page, with provenance and (after
/// embedding) its vector.
///
/// The chunker produces chunks with an empty `id` and empty
/// `embedding`; the ingestion pipeline assigns a fresh unique id and
/// the embedding just before upsert. Ids are never derived from
/// content, so re-ingesting a document appends new entries instead of
/// overwriting old ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Vector-store entry id, assigned at upsert time.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
    /// Source document identifier.
    pub source: String,
    /// 0-based page index the chunk was cut from.
    pub page: usize,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source: impl Into<String>, page: usize) -> Self {
        Self {
            id: String::new(),
            text: text.into(),
            embedding: Vec::new(),
            source: source.into(),
            page,
        }
    }

    pub fn provenance(&self) -> Provenance {
        Provenance { source: self.source.clone(), page: self.page }
    }
}

/// A retrieved [`Chunk`] paired with a relevance score.
///
/// Retrieval results are ordered by descending score; higher is more
/// relevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_displays_one_based_page() {
        let chunk = Chunk::new("text", "guide.pdf", 2);
        assert_eq!(chunk.provenance().to_string(), "guide.pdf (p. 3)");
    }
}
