//! Base trait and shared span types for all chunkers.

use crate::types::ChunkConfig;

/// The core trait that all segmentation strategies implement.
///
/// A chunker proposes raw split points only. Size bounds, runt merging and
/// overlap are applied afterwards by the post-processor, so implementations
/// stay stateless and can be shared freely across threads.
pub trait Chunker: Send + Sync {
    /// Get the name of this chunker.
    fn name(&self) -> &'static str;

    /// Split the text into ordered raw segments.
    ///
    /// The returned spans cover `[0, text.len())` in order and are disjoint,
    /// unless [`Chunker::applies_overlap`] is true.
    fn segment(&self, text: &SourceText<'_>, config: &ChunkConfig) -> Vec<Segment>;

    /// Whether the chunker already overlaps its windows.
    fn applies_overlap(&self) -> bool {
        false
    }

    /// Get the description of this chunker.
    fn description(&self) -> &'static str {
        "A text chunker"
    }
}

/// Half-open range of char offsets `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} after end {end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Smallest span covering both.
    pub fn union(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A raw span proposed by a strategy, with the markdown section owning it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub span: Span,
    pub section: Option<String>,
}

impl Segment {
    pub fn new(span: Span) -> Self {
        Self { span, section: None }
    }

    pub fn with_section(span: Span, section: Option<String>) -> Self {
        Self { span, section }
    }
}

impl From<Span> for Segment {
    fn from(span: Span) -> Self {
        Segment::new(span)
    }
}

/// Source text indexed by char position.
///
/// Strategies and the post-processor work in char offsets; this keeps the
/// byte offset of every char so slicing back into the original `&str` is O(1).
pub struct SourceText<'a> {
    text: &'a str,
    chars: Vec<char>,
    offsets: Vec<usize>,
}

impl<'a> SourceText<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut offsets = Vec::with_capacity(text.len() + 1);
        for (byte, c) in text.char_indices() {
            offsets.push(byte);
            chars.push(c);
        }
        offsets.push(text.len());
        Self { text, chars, offsets }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// True when the text holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.chars.iter().all(|c| c.is_whitespace())
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn full_span(&self) -> Span {
        Span::new(0, self.len())
    }

    /// Byte offset of the char at `index` (or of the end of text).
    pub fn byte_offset(&self, index: usize) -> usize {
        self.offsets[index.min(self.chars.len())]
    }

    /// Char index of a byte offset that lies on a char boundary.
    pub fn char_index(&self, byte: usize) -> usize {
        match self.offsets.binary_search(&byte) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        }
    }

    pub fn slice(&self, span: Span) -> &'a str {
        &self.text[self.byte_offset(span.start)..self.byte_offset(span.end)]
    }

    /// True when every char in the span is whitespace.
    pub fn is_blank_span(&self, span: Span) -> bool {
        self.chars[span.start..span.end].iter().all(|c| c.is_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_text_multibyte() {
        let text = SourceText::new("añb€c");
        assert_eq!(text.len(), 5);
        assert_eq!(text.slice(Span::new(1, 4)), "ñb€");
        assert_eq!(text.char_index(text.byte_offset(3)), 3);
        assert_eq!(text.byte_offset(5), "añb€c".len());
    }

    #[test]
    fn test_blank_detection() {
        assert!(SourceText::new("").is_blank());
        assert!(SourceText::new(" \n\t ").is_blank());
        assert!(!SourceText::new(" a ").is_blank());
    }
}
