//! Fixed-size sliding window chunker.

use super::base::{Chunker, Segment, SourceText, Span};
use crate::types::ChunkConfig;

/// Fixed-size chunker that slides a window of `chunk_size` chars over the text.
///
/// This is the baseline chunker that doesn't consider semantic boundaries.
/// Windows advance by `chunk_size - chunk_overlap`, so overlap is produced
/// here rather than by the post-processor. For a text of `n` chars longer
/// than one window, the chunk count is `ceil((n - overlap) / step)`.
pub struct FixedChunker;

impl FixedChunker {
    /// Create a new fixed-size chunker.
    pub fn new() -> Self {
        Self
    }

    /// Compute the window spans for a text of `len` chars.
    pub fn windows(len: usize, chunk_size: usize, chunk_overlap: usize) -> Vec<Span> {
        let mut windows = Vec::new();
        if len == 0 || chunk_size == 0 {
            return windows;
        }

        let step = chunk_size.saturating_sub(chunk_overlap).max(1);
        let mut start = 0;

        loop {
            let end = (start + chunk_size).min(len);
            windows.push(Span::new(start, end));

            // Stop if we've reached the end
            if end >= len {
                break;
            }
            start += step;
        }

        windows
    }
}

impl Default for FixedChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for FixedChunker {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn description(&self) -> &'static str {
        "Splits text into fixed-size character windows with optional overlap"
    }

    fn applies_overlap(&self) -> bool {
        true
    }

    fn segment(&self, text: &SourceText<'_>, config: &ChunkConfig) -> Vec<Segment> {
        Self::windows(text.len(), config.chunk_size(), config.chunk_overlap())
            .into_iter()
            .map(Segment::new)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content() {
        assert!(FixedChunker::windows(0, 100, 20).is_empty());
    }

    #[test]
    fn test_small_content() {
        assert_eq!(FixedChunker::windows(13, 100, 0), vec![Span::new(0, 13)]);
    }

    #[test]
    fn test_chunk_overlap() {
        let windows = FixedChunker::windows(1000, 100, 20);
        assert_eq!(windows.len(), 13);
        assert_eq!(windows[0], Span::new(0, 100));
        assert_eq!(windows[1], Span::new(80, 180));
        assert_eq!(windows[12], Span::new(960, 1000));
    }

    #[test]
    fn test_no_overlap_windows_are_disjoint() {
        let windows = FixedChunker::windows(250, 100, 0);
        assert_eq!(
            windows,
            vec![Span::new(0, 100), Span::new(100, 200), Span::new(200, 250)]
        );
    }

    #[test]
    fn test_exact_multiple() {
        // (180 - 20) / 80 = 2 windows, the second ending exactly at the text end
        let windows = FixedChunker::windows(180, 100, 20);
        assert_eq!(windows, vec![Span::new(0, 100), Span::new(80, 180)]);
    }
}
