//! Sentence-based chunker that respects sentence boundaries.

use tracing::debug;

use super::base::{Chunker, Segment, SourceText, Span};
use super::recursive_chunker::RecursiveChunker;
use super::separators::Separator;
use crate::types::ChunkConfig;

/// Sentence-based chunker that splits text at sentence boundaries.
///
/// Consecutive sentences are grouped until the next one would push the chunk
/// past `chunk_size`. A sentence that alone exceeds `max_chunk_size` is sliced
/// at word boundaries; every other chunk edge is a sentence edge.
pub struct SentenceChunker {
    /// Fallback for sentences too long to keep whole
    word_splitter: RecursiveChunker,
}

impl SentenceChunker {
    /// Create a new sentence chunker.
    pub fn new() -> Self {
        Self {
            word_splitter: RecursiveChunker::starting_at(Separator::Word),
        }
    }

    /// Group the sentences of `span` into chunk-sized spans.
    fn group_sentences(&self, text: &SourceText<'_>, span: Span, config: &ChunkConfig) -> Vec<Span> {
        let sentences = Separator::Sentence.split(text, span, config.keep_separator());
        debug!(sentences = sentences.len(), "Split text into sentences");

        let mut chunks = Vec::new();
        let mut current: Option<Span> = None;

        for sentence in sentences {
            if sentence.len() > config.chunk_size() {
                if let Some(c) = current.take() {
                    chunks.push(c);
                }
                if sentence.len() > config.max_chunk_size() {
                    chunks.extend(self.word_splitter.split_span(
                        text,
                        sentence,
                        config.chunk_size(),
                        config.keep_separator(),
                    ));
                } else {
                    chunks.push(sentence);
                }
                continue;
            }

            // Check if adding this sentence exceeds the limit
            current = match current {
                Some(c) if c.len() + sentence.len() <= config.chunk_size() => Some(c.union(&sentence)),
                Some(c) => {
                    chunks.push(c);
                    Some(sentence)
                }
                None => Some(sentence),
            };
        }

        if let Some(c) = current {
            chunks.push(c);
        }

        chunks
    }
}

impl Default for SentenceChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for SentenceChunker {
    fn name(&self) -> &'static str {
        "sentence"
    }

    fn description(&self) -> &'static str {
        "Groups whole sentences into chunks while respecting the size limit"
    }

    fn segment(&self, text: &SourceText<'_>, config: &ChunkConfig) -> Vec<Segment> {
        if text.is_empty() {
            return vec![];
        }

        self.group_sentences(text, text.full_span(), config)
            .into_iter()
            .map(Segment::new)
            .collect()
    }
}
