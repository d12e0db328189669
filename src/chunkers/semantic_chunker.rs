//! Paragraph-grouping chunker.

use tracing::debug;

use super::base::{Chunker, Segment, SourceText, Span};
use super::recursive_chunker::RecursiveChunker;
use super::separators::Separator;
use crate::types::ChunkConfig;

/// Semantic chunker that keeps paragraphs together.
///
/// Consecutive short paragraphs are merged while the running length stays
/// within `chunk_size`. A paragraph larger than `max_chunk_size` is split with
/// the recursive hierarchy starting at sentence level, so it is never cut
/// mid-word unless a single word is itself too long.
pub struct SemanticChunker {
    fallback: RecursiveChunker,
}

impl SemanticChunker {
    /// Create a new semantic chunker.
    pub fn new() -> Self {
        Self {
            fallback: RecursiveChunker::starting_at(Separator::Sentence),
        }
    }

    /// Split a span of the text into paragraph-aligned pieces.
    pub fn split_span(&self, text: &SourceText<'_>, span: Span, config: &ChunkConfig) -> Vec<Span> {
        let paragraphs = Separator::Paragraph.split(text, span, config.keep_separator());
        debug!(paragraphs = paragraphs.len(), "Split text into paragraphs");

        let mut chunks = Vec::new();
        let mut current: Option<Span> = None;

        for paragraph in paragraphs {
            if paragraph.len() > config.chunk_size() {
                if let Some(c) = current.take() {
                    chunks.push(c);
                }
                if paragraph.len() > config.max_chunk_size() {
                    chunks.extend(self.fallback.split_span(
                        text,
                        paragraph,
                        config.chunk_size(),
                        config.keep_separator(),
                    ));
                } else {
                    chunks.push(paragraph);
                }
                continue;
            }

            current = match current {
                Some(c) if c.len() + paragraph.len() <= config.chunk_size() => {
                    Some(c.union(&paragraph))
                }
                Some(c) => {
                    chunks.push(c);
                    Some(paragraph)
                }
                None => Some(paragraph),
            };
        }

        if let Some(c) = current {
            chunks.push(c);
        }

        chunks
    }
}

impl Default for SemanticChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for SemanticChunker {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn description(&self) -> &'static str {
        "Merges consecutive paragraphs into chunks, splitting oversized paragraphs by sentence"
    }

    fn segment(&self, text: &SourceText<'_>, config: &ChunkConfig) -> Vec<Segment> {
        if text.is_empty() {
            return vec![];
        }

        self.split_span(text, text.full_span(), config)
            .into_iter()
            .map(Segment::new)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(content: &str, config: &ChunkConfig) -> Vec<String> {
        let text = SourceText::new(content);
        SemanticChunker::new()
            .segment(&text, config)
            .into_iter()
            .map(|s| text.slice(s.span).to_string())
            .collect()
    }

    #[test]
    fn test_short_paragraphs_merge() {
        let content = "Para one.\n\nPara two.\n\nPara three is longer than the rest.";
        let chunks = segment(content, &ChunkConfig::with_size(25).unwrap());
        assert_eq!(
            chunks,
            vec!["Para one.\n\nPara two.\n\n", "Para three is longer than the rest."]
        );
    }

    #[test]
    fn test_oversized_paragraph_split_by_sentence() {
        let paragraph = "First sentence here. Second sentence here. Third sentence here.";
        let content = format!("Intro.\n\n{paragraph}");
        let config = ChunkConfig::builder(25).max_chunk_size(40).build().unwrap();
        let chunks = segment(&content, &config);
        assert_eq!(
            chunks,
            vec![
                "Intro.\n\n",
                "First sentence here. ",
                "Second sentence here. ",
                "Third sentence here."
            ]
        );
    }

    #[test]
    fn test_no_paragraph_breaks() {
        let content = "single paragraph without breaks";
        let chunks = segment(content, &ChunkConfig::with_size(100).unwrap());
        assert_eq!(chunks, vec![content]);
    }

    #[test]
    fn test_separator_leads_when_not_kept() {
        let content = "Alpha.\n\nBeta.";
        let config = ChunkConfig::builder(8).keep_separator(false).build().unwrap();
        let chunks = segment(content, &config);
        assert_eq!(chunks, vec!["Alpha.", "\n\nBeta."]);
    }
}
