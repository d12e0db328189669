//! Chunking engine: dispatch, post-processing and result assembly.

use std::time::Instant;

use tracing::{debug, info};

use crate::chunkers::SourceText;
use crate::processing::{BoundedSpan, ChunkStats, PostProcessor};
use crate::router::ChunkingRouter;
use crate::types::{ChunkConfig, ChunkMetadata, ChunkingResult, DocumentChunk, Metadata};

/// Metadata keys owned by the engine; caller values under these names are dropped.
const RESERVED_KEYS: &[&str] = &[
    "start_char",
    "end_char",
    "overlap",
    "chunk_index",
    "strategy",
    "section",
];

/// Splits documents into bounded chunks using a fixed configuration.
///
/// The engine holds no mutable state; one instance can serve concurrent
/// callers by shared reference.
pub struct ChunkingEngine {
    config: ChunkConfig,
    router: ChunkingRouter,
}

impl ChunkingEngine {
    /// Create an engine for a validated configuration.
    pub fn new(config: ChunkConfig) -> Self {
        Self {
            config,
            router: ChunkingRouter::new(),
        }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Chunk `text`, carrying `metadata` into the result and every chunk.
    ///
    /// Empty or whitespace-only text yields an empty result.
    pub fn chunk(&self, text: &str, metadata: Metadata) -> ChunkingResult {
        let started = Instant::now();
        let source = SourceText::new(text);

        if source.is_blank() {
            debug!(chars = source.len(), "Blank input, no chunks produced");
            return ChunkingResult {
                chunks: Vec::new(),
                total_chunks: 0,
                processing_time: started.elapsed(),
                metadata,
            };
        }

        let strategy = self.config.strategy();
        let chunker = self.router.get_chunker(strategy);
        let segments = chunker.segment(&source, &self.config);
        debug!(strategy = %strategy, segments = segments.len(), "Segmented text");

        let bounded = PostProcessor::new(&self.config).process(
            &source,
            segments,
            chunker.applies_overlap(),
        );
        let chunks = self.assemble(&source, bounded, &metadata);

        let processing_time = started.elapsed();
        info!(
            strategy = %strategy,
            chars = source.len(),
            chunks = chunks.len(),
            elapsed_us = processing_time.as_micros() as u64,
            "Chunked document"
        );

        ChunkingResult {
            total_chunks: chunks.len(),
            chunks,
            processing_time,
            metadata,
        }
    }

    /// Summary statistics for a result produced by any engine.
    pub fn get_stats(&self, result: &ChunkingResult) -> ChunkStats {
        ChunkStats::from_result(result)
    }

    fn assemble(
        &self,
        source: &SourceText<'_>,
        bounded: Vec<BoundedSpan>,
        metadata: &Metadata,
    ) -> Vec<DocumentChunk> {
        let mut extra = metadata.clone();
        for key in RESERVED_KEYS {
            extra.remove(*key);
        }

        bounded
            .into_iter()
            .enumerate()
            .map(|(chunk_index, b)| DocumentChunk {
                id: DocumentChunk::chunk_id(chunk_index, b.span.start, b.span.end),
                content: source.slice(b.span).to_string(),
                metadata: ChunkMetadata {
                    start_char: b.span.start,
                    end_char: b.span.end,
                    overlap: b.overlap,
                    chunk_index,
                    strategy: self.config.strategy(),
                    section: b.section,
                    extra: extra.clone(),
                },
            })
            .collect()
    }
}
