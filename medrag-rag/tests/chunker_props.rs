//! Property tests for chunk size and overlap invariants.

use medrag_rag::{Chunker, Document, RecursiveChunker};
use proptest::prelude::*;

/// Generate (chunk_size, chunk_overlap) with overlap < size.
fn arb_size_and_overlap() -> impl Strategy<Value = (usize, usize)> {
    (8usize..120).prop_flat_map(|size| (Just(size), 0usize..size))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every chunk is at most `chunk_size` characters, for any mix of
    /// paragraph, line, and word separators.
    #[test]
    fn chunks_never_exceed_size(
        text in "[a-z \n]{0,600}",
        (size, overlap) in arb_size_and_overlap(),
    ) {
        let chunker = RecursiveChunker::new(size, overlap);
        let document = Document::single_page("prop.pdf", text);
        for chunk in chunker.split(&document) {
            prop_assert!(
                chunk.text.chars().count() <= size,
                "chunk of {} chars exceeds size {}",
                chunk.text.chars().count(),
                size,
            );
        }
    }

    /// Separator-free text forces hard character cuts, where the
    /// overlap between adjacent chunks is exact: the trailing
    /// `overlap` characters of one chunk equal the leading `overlap`
    /// characters of the next.
    #[test]
    fn hard_cut_overlap_is_exact(
        text in "[a-z]{50,400}",
        (size, overlap) in arb_size_and_overlap(),
    ) {
        let chunker = RecursiveChunker::new(size, overlap);
        let document = Document::single_page("prop.pdf", text);
        let chunks = chunker.split(&document);

        for pair in chunks.windows(2) {
            let first: Vec<char> = pair[0].text.chars().collect();
            let second: Vec<char> = pair[1].text.chars().collect();
            let shared = overlap.min(first.len()).min(second.len());
            prop_assert_eq!(
                &first[first.len() - shared..],
                &second[..shared],
                "overlap mismatch between {:?} and {:?}",
                &pair[0].text,
                &pair[1].text,
            );
        }
    }

    /// Chunking is a pure function: identical inputs give identical
    /// outputs.
    #[test]
    fn chunking_is_deterministic(
        text in "[a-z \n]{0,300}",
        (size, overlap) in arb_size_and_overlap(),
    ) {
        let chunker = RecursiveChunker::new(size, overlap);
        let document = Document::single_page("prop.pdf", text);
        let first: Vec<String> = chunker.split(&document).into_iter().map(|c| c.text).collect();
        let second: Vec<String> = chunker.split(&document).into_iter().map(|c| c.text).collect();
        prop_assert_eq!(first, second);
    }
}
