//! Chunker Library
//!
//! Splits long text into bounded, optionally overlapping chunks for
//! retrieval-augmented generation pipelines. Five strategies are available:
//! recursive, semantic, markdown, sentence and fixed windows.
//!
//! ```no_run
//! use chunker::prelude::*;
//!
//! let config = ChunkConfig::builder(256).chunk_overlap(32).build()?;
//! let engine = ChunkingEngine::new(config);
//! let result = engine.chunk("Some long document...", Metadata::new());
//! println!("{} chunks", result.total_chunks);
//! # Ok::<(), chunker::ChunkError>(())
//! ```

pub mod batch;
pub mod chunkers;
pub mod engine;
pub mod error;
pub mod processing;
pub mod router;
pub mod types;

pub use batch::{BatchConfig, BatchProcessor, BatchResult};
pub use chunkers::Chunker;
pub use engine::ChunkingEngine;
pub use error::{ChunkError, Result};
pub use processing::ChunkStats;
pub use router::ChunkingRouter;
pub use types::{ChunkConfig, ChunkMetadata, ChunkStrategy, ChunkingResult, DocumentChunk, Metadata, SourceDocument};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::batch::*;
    pub use crate::chunkers::Chunker;
    pub use crate::engine::ChunkingEngine;
    pub use crate::error::{ChunkError, Result};
    pub use crate::processing::ChunkStats;
    pub use crate::router::ChunkingRouter;
    pub use crate::types::*;
}

/// Default chunk size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Default chunk overlap in characters
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Default number of documents chunked concurrently in a batch
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;
