//! Document chunking.
//!
//! [`RecursiveChunker`] splits page text using a cascade of separators
//! (paragraph, then line, then word) so chunks prefer natural text
//! boundaries, falling back to hard character cuts only when no
//! separator produces a segment that fits. Overlap is carried across
//! chunk boundaries by re-seeding each new chunk with the trailing
//! segments of the previous one.

use std::collections::VecDeque;

use crate::document::{Chunk, Document};

/// Separator cascade, coarsest first. Character-level cuts are the
/// implicit last resort.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// A strategy for splitting documents into chunks.
///
/// Implementations are pure: no I/O, no side effects, deterministic
/// for identical inputs. Produced chunks carry provenance (source and
/// page) but no id or embedding; the pipeline attaches those later.
pub trait Chunker: Send + Sync {
    /// Split every page of a document into chunks.
    ///
    /// Pages with empty text contribute no chunks.
    fn split(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text hierarchically by paragraphs, lines, then words, with a
/// bounded chunk size and configured overlap.
///
/// Every chunk is at most `chunk_size` characters. Adjacent chunks cut
/// from the same page share roughly `chunk_overlap` trailing/leading
/// characters; at natural separator boundaries the shared portion may
/// be shorter, and for hard character cuts it is exact.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// `chunk_overlap` must be less than `chunk_size`; [`crate::RagConfig`]
    /// validates this before construction.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for RecursiveChunker {
    fn split(&self, document: &Document) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in &document.pages {
            if page.text.is_empty() {
                continue;
            }
            for text in
                split_recursive(&page.text, self.chunk_size, self.chunk_overlap, &SEPARATORS)
            {
                if text.trim().is_empty() {
                    continue;
                }
                chunks.push(Chunk::new(text, document.source.clone(), page.number));
            }
        }
        chunks
    }
}

/// Split `text` with the first separator, recursing into the remaining
/// cascade for segments that still exceed `chunk_size`, then merge
/// segments back into overlapping chunks.
fn split_recursive(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if char_len(text) <= chunk_size {
        return vec![text.to_string()];
    }

    let Some((separator, remaining)) = separators.split_first() else {
        return split_by_size(text, chunk_size, chunk_overlap);
    };

    let mut pieces = Vec::new();
    for segment in split_keeping_separator(text, separator) {
        if char_len(segment) > chunk_size {
            pieces.extend(split_recursive(segment, chunk_size, chunk_overlap, remaining));
        } else {
            pieces.push(segment.to_string());
        }
    }

    merge_with_overlap(pieces, chunk_size, chunk_overlap)
}

/// Split text at a separator while keeping the separator attached to
/// the preceding segment, so rejoining segments reproduces the input.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Merge size-bounded pieces into chunks, carrying the trailing pieces
/// of each emitted chunk (up to `chunk_overlap` characters) into the
/// start of the next.
fn merge_with_overlap(pieces: Vec<String>, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<(String, usize)> = VecDeque::new();
    let mut window_len = 0usize;

    for piece in pieces {
        let piece_len = char_len(&piece);

        if window_len + piece_len > chunk_size && !window.is_empty() {
            chunks.push(window.iter().map(|(p, _)| p.as_str()).collect());

            // Keep a tail of at most `chunk_overlap` characters, but
            // always leave room for the incoming piece.
            while window_len > chunk_overlap
                || (window_len + piece_len > chunk_size && window_len > 0)
            {
                match window.pop_front() {
                    Some((_, dropped)) => window_len -= dropped,
                    None => break,
                }
            }
        }

        window_len += piece_len;
        window.push_back((piece, piece_len));
    }

    if !window.is_empty() {
        chunks.push(window.iter().map(|(p, _)| p.as_str()).collect());
    }

    chunks
}

/// Hard character cuts with exact overlap, respecting UTF-8 boundaries.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let total = boundaries.len();
    if total == 0 {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(chunk_overlap);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let end = start + chunk_size;
        let byte_start = boundaries[start];
        if end >= total {
            chunks.push(text[byte_start..].to_string());
            break;
        }
        chunks.push(text[byte_start..boundaries[end]].to_string());
        if step == 0 {
            break;
        }
        start += step;
    }

    chunks
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Page;

    fn chunk_texts(chunker: &RecursiveChunker, text: &str) -> Vec<String> {
        let document = Document::single_page("test.pdf", text);
        chunker.split(&document).into_iter().map(|c| c.text).collect()
    }

    #[test]
    fn short_page_yields_single_chunk() {
        let chunker = RecursiveChunker::new(100, 20);
        let texts = chunk_texts(&chunker, "short passage");
        assert_eq!(texts, vec!["short passage".to_string()]);
    }

    #[test]
    fn empty_page_yields_no_chunks() {
        let chunker = RecursiveChunker::new(100, 20);
        let document = Document::new(
            "empty.pdf",
            vec![Page { number: 0, text: String::new() }, Page { number: 1, text: "x".into() }],
        );
        let chunks = chunker.split(&document);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].page, 1);
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let chunker = RecursiveChunker::new(30, 0);
        let texts = chunk_texts(&chunker, "first paragraph here\n\nsecond paragraph here");
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0], "first paragraph here\n\n");
        assert_eq!(texts[1], "second paragraph here");
    }

    #[test]
    fn no_chunk_exceeds_size() {
        let chunker = RecursiveChunker::new(50, 10);
        let text = "word ".repeat(200);
        for chunk in chunk_texts(&chunker, &text) {
            assert!(chunk.chars().count() <= 50, "chunk too long: {chunk:?}");
        }
    }

    #[test]
    fn hard_cuts_have_exact_overlap() {
        let chunker = RecursiveChunker::new(10, 4);
        // No separators at all — forces character-level cuts.
        let texts = chunk_texts(&chunker, &"abcdefghij".repeat(3));
        assert!(texts.len() > 1);
        for pair in texts.windows(2) {
            let tail: String = pair[0].chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            let head: String = pair[1].chars().take(4).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn word_merge_carries_overlap() {
        let chunker = RecursiveChunker::new(20, 8);
        let texts = chunk_texts(&chunker, "alpha beta gamma delta epsilon zeta");
        assert!(texts.len() > 1);
        // Each chunk after the first starts with the tail of its predecessor.
        for pair in texts.windows(2) {
            let first_word = pair[1].split(' ').next().unwrap();
            assert!(
                pair[0].contains(first_word),
                "chunk {:?} does not overlap into {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn deterministic_for_identical_input() {
        let chunker = RecursiveChunker::new(40, 10);
        let text = "one two three\nfour five six\n\nseven eight nine ten eleven twelve";
        assert_eq!(chunk_texts(&chunker, text), chunk_texts(&chunker, text));
    }

    #[test]
    fn chunks_inherit_provenance() {
        let chunker = RecursiveChunker::new(1000, 200);
        let document = Document::new(
            "guide.pdf",
            vec![
                Page { number: 0, text: "page one text".into() },
                Page { number: 1, text: "page two text".into() },
            ],
        );
        let chunks = chunker.split(&document);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.source == "guide.pdf"));
        assert_eq!(chunks[0].page, 0);
        assert_eq!(chunks[1].page, 1);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let chunker = RecursiveChunker::new(10, 2);
        let text = "é".repeat(25);
        let texts = chunk_texts(&chunker, &text);
        assert!(texts.len() > 1);
        assert!(texts.iter().all(|t| t.chars().count() <= 10));
    }
}
