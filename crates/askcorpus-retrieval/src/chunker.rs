//! Word-window chunking.
//!
//! Splits whitespace-normalized text into overlapping fixed-size word
//! windows. Designed for landing pages and other UI-heavy prose where
//! sentence boundaries are unreliable.

use askcorpus_core::error::{AskCorpusError, Result};

/// Split `text` into windows of `chunk_size` words, each overlapping
/// the previous window by `overlap` words.
///
/// Whitespace runs collapse to single spaces and the text is trimmed
/// before splitting. Windows start at offsets `0, c-o, 2(c-o), ...`
/// until the offset reaches the word count; the final window may be
/// shorter than `chunk_size`.
///
/// Empty or whitespace-only input yields an empty Vec. A document
/// shorter than `chunk_size` words yields exactly one chunk.
pub fn chunk(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(AskCorpusError::Config("chunk_size must be > 0".into()));
    }
    // overlap >= chunk_size means the window never advances.
    if overlap >= chunk_size {
        return Err(AskCorpusError::Config(format!(
            "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
        )));
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Vec::new());
    }

    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        let piece = words[start..end].join(" ");
        if !piece.is_empty() {
            chunks.push(piece);
        }
        start += step;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eight_words_window_four_overlap_two() {
        let chunks = chunk("a b c d e f g h", 4, 2).unwrap();
        assert_eq!(chunks, vec!["a b c d", "c d e f", "e f g h"]);
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(chunk("", 4, 2).unwrap().is_empty());
        assert!(chunk("   \n\t  ", 4, 2).unwrap().is_empty());
    }

    #[test]
    fn test_short_document_single_chunk() {
        let chunks = chunk("just three words", 10, 2).unwrap();
        assert_eq!(chunks, vec!["just three words"]);
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let chunks = chunk("  a   b\t\tc\n\nd  ", 4, 0).unwrap();
        assert_eq!(chunks, vec!["a b c d"]);
    }

    #[test]
    fn test_final_window_may_be_short() {
        let chunks = chunk("a b c d e", 4, 2).unwrap();
        assert_eq!(chunks, vec!["a b c d", "c d e", "e"]);
    }

    #[test]
    fn test_rejects_degenerate_overlap() {
        assert!(matches!(
            chunk("a b c", 4, 4),
            Err(AskCorpusError::Config(_))
        ));
        assert!(chunk("a b c", 4, 5).is_err());
        assert!(chunk("a b c", 0, 0).is_err());
    }

    #[test]
    fn test_chunk_count_and_overlap_property() {
        // 20 words, chunk_size 6, overlap 2 → step 4, offsets 0,4,8,12,16.
        let words: Vec<String> = (0..20).map(|i| format!("w{i}")).collect();
        let text = words.join(" ");
        let chunks = chunk(&text, 6, 2).unwrap();
        assert_eq!(chunks.len(), 5);

        // Every chunk except possibly the last has exactly 6 words.
        for c in &chunks[..chunks.len() - 1] {
            assert_eq!(c.split(' ').count(), 6);
        }

        // Consecutive chunks share exactly 2 words at the boundary.
        for pair in chunks.windows(2) {
            let prev: Vec<&str> = pair[0].split(' ').collect();
            let next: Vec<&str> = pair[1].split(' ').collect();
            assert_eq!(&prev[prev.len() - 2..], &next[..2]);
        }
    }
}
