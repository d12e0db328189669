//! Recursive text chunker with hierarchical splitting.

use tracing::debug;

use super::base::{Chunker, Segment, SourceText, Span};
use super::separators::Separator;
use crate::types::ChunkConfig;

/// Recursive chunker that splits text hierarchically.
///
/// This chunker tries separators in order of preference:
/// 1. Blank lines (paragraphs)
/// 2. Sentence endings (. ! ?)
/// 3. Whitespace (words)
/// 4. Grapheme clusters (last resort)
///
/// For each level, it only proceeds to more granular splitting if
/// the current pieces are still too large.
pub struct RecursiveChunker {
    /// Separators in order of preference (most to least preferred)
    separators: Vec<Separator>,
}

impl RecursiveChunker {
    /// Create a new recursive chunker with the default hierarchy.
    pub fn new() -> Self {
        Self {
            separators: Separator::HIERARCHY.to_vec(),
        }
    }

    /// Create a recursive chunker that starts at the given separator.
    pub fn starting_at(separator: Separator) -> Self {
        Self {
            separators: separator.and_finer(),
        }
    }

    /// Create a recursive chunker with custom separators.
    pub fn with_separators(separators: Vec<Separator>) -> Self {
        Self { separators }
    }

    /// Split `span` into pieces of at most `limit` chars where possible.
    pub fn split_span(
        &self,
        text: &SourceText<'_>,
        span: Span,
        limit: usize,
        keep_separator: bool,
    ) -> Vec<Span> {
        let mut out = Vec::new();
        self.recursive_split(text, span, limit, keep_separator, 0, &mut out);
        out
    }

    /// Recursively split a span using the separator hierarchy.
    fn recursive_split(
        &self,
        text: &SourceText<'_>,
        span: Span,
        limit: usize,
        keep_separator: bool,
        separator_index: usize,
        out: &mut Vec<Span>,
    ) {
        if span.is_empty() {
            return;
        }

        // If the span fits in a single chunk, keep it
        if span.len() <= limit {
            out.push(span);
            return;
        }

        // If we've exhausted all separators, slice raw chars
        let Some(separator) = self.separators.get(separator_index) else {
            split_by_chars(span, limit, out);
            return;
        };

        let pieces = separator.split(text, span, keep_separator);

        // If we only got one piece, try the next separator
        if pieces.len() <= 1 {
            self.recursive_split(text, span, limit, keep_separator, separator_index + 1, out);
            return;
        }

        // Merge pieces into chunks
        let mut current: Option<Span> = None;

        for piece in pieces {
            if piece.len() > limit {
                if let Some(c) = current.take() {
                    out.push(c);
                }
                // Recursively split this piece with finer separators
                self.recursive_split(text, piece, limit, keep_separator, separator_index + 1, out);
                continue;
            }

            current = match current {
                Some(c) if c.len() + piece.len() <= limit => Some(c.union(&piece)),
                Some(c) => {
                    out.push(c);
                    Some(piece)
                }
                None => Some(piece),
            };
        }

        // Don't forget the last chunk
        if let Some(c) = current {
            out.push(c);
        }
    }
}

/// Slice a span into fixed windows of `limit` chars (last resort).
fn split_by_chars(span: Span, limit: usize, out: &mut Vec<Span>) {
    let limit = limit.max(1);
    let mut start = span.start;
    while start < span.end {
        let end = (start + limit).min(span.end);
        out.push(Span::new(start, end));
        start = end;
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for RecursiveChunker {
    fn name(&self) -> &'static str {
        "recursive"
    }

    fn description(&self) -> &'static str {
        "Hierarchically splits text using paragraph, sentence, word and character separators"
    }

    fn segment(&self, text: &SourceText<'_>, config: &ChunkConfig) -> Vec<Segment> {
        if text.is_empty() {
            return vec![];
        }

        let spans = self.split_span(
            text,
            text.full_span(),
            config.chunk_size(),
            config.keep_separator(),
        );
        debug!(pieces = spans.len(), "Recursive split complete");

        spans.into_iter().map(Segment::new).collect()
    }
}
