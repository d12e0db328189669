//! Core types for the chunking engine.

mod chunk;
mod config;
mod source;

pub use chunk::{ChunkMetadata, ChunkingResult, DocumentChunk, Metadata};
pub use config::{ChunkConfig, ChunkConfigBuilder, ChunkStrategy, ChunkingConfig, ChunkingProfile};
pub use source::SourceDocument;
