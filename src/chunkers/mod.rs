//! Segmentation strategies.

mod base;
mod fixed_chunker;
mod markdown_chunker;
mod recursive_chunker;
mod semantic_chunker;
mod sentence_chunker;
pub mod separators;

pub use base::{Chunker, Segment, SourceText, Span};
pub use fixed_chunker::FixedChunker;
pub use markdown_chunker::MarkdownChunker;
pub use recursive_chunker::RecursiveChunker;
pub use semantic_chunker::SemanticChunker;
pub use sentence_chunker::SentenceChunker;
pub use separators::Separator;
