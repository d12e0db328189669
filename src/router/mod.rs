//! Chunking strategy router.

use std::sync::Arc;

use crate::chunkers::{
    Chunker, FixedChunker, MarkdownChunker, RecursiveChunker, SemanticChunker, SentenceChunker,
};
use crate::error::Result;
use crate::types::ChunkStrategy;

/// Router that resolves a strategy to its chunker implementation.
///
/// Dispatch is an exhaustive match over [`ChunkStrategy`], so a new strategy
/// does not compile until it is routed here. The router never looks at text.
pub struct ChunkingRouter {
    /// Recursive chunker (general-purpose default)
    recursive_chunker: Arc<RecursiveChunker>,
    /// Semantic chunker (paragraph grouping)
    semantic_chunker: Arc<SemanticChunker>,
    /// Markdown chunker (heading sections)
    markdown_chunker: Arc<MarkdownChunker>,
    /// Sentence chunker (sentence grouping)
    sentence_chunker: Arc<SentenceChunker>,
    /// Fixed chunker (sliding windows)
    fixed_chunker: Arc<FixedChunker>,
}

impl ChunkingRouter {
    /// Create a router with every built-in strategy.
    pub fn new() -> Self {
        Self {
            recursive_chunker: Arc::new(RecursiveChunker::new()),
            semantic_chunker: Arc::new(SemanticChunker::new()),
            markdown_chunker: Arc::new(MarkdownChunker::new()),
            sentence_chunker: Arc::new(SentenceChunker::new()),
            fixed_chunker: Arc::new(FixedChunker::new()),
        }
    }

    /// Get the chunker implementing the given strategy.
    pub fn get_chunker(&self, strategy: ChunkStrategy) -> Arc<dyn Chunker> {
        match strategy {
            ChunkStrategy::Recursive => Arc::clone(&self.recursive_chunker) as Arc<dyn Chunker>,
            ChunkStrategy::Semantic => Arc::clone(&self.semantic_chunker) as Arc<dyn Chunker>,
            ChunkStrategy::Markdown => Arc::clone(&self.markdown_chunker) as Arc<dyn Chunker>,
            ChunkStrategy::Sentence => Arc::clone(&self.sentence_chunker) as Arc<dyn Chunker>,
            ChunkStrategy::Fixed => Arc::clone(&self.fixed_chunker) as Arc<dyn Chunker>,
        }
    }

    /// Get a chunker by strategy identifier.
    ///
    /// Fails with [`crate::ChunkError::UnsupportedStrategy`] for unknown names.
    pub fn get_chunker_by_name(&self, name: &str) -> Result<Arc<dyn Chunker>> {
        Ok(self.get_chunker(name.parse()?))
    }

    /// List all available chunkers.
    pub fn list_chunkers(&self) -> Vec<(&'static str, &'static str)> {
        ChunkStrategy::ALL
            .iter()
            .map(|strategy| {
                let chunker = self.get_chunker(*strategy);
                (chunker.name(), chunker.description())
            })
            .collect()
    }
}

impl Default for ChunkingRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChunkError;

    #[test]
    fn test_every_strategy_routes_to_its_chunker() {
        let router = ChunkingRouter::default();
        for strategy in ChunkStrategy::ALL {
            assert_eq!(router.get_chunker(strategy).name(), strategy.as_str());
        }
    }

    #[test]
    fn test_only_fixed_applies_overlap() {
        let router = ChunkingRouter::default();
        for strategy in ChunkStrategy::ALL {
            let native = router.get_chunker(strategy).applies_overlap();
            assert_eq!(native, strategy == ChunkStrategy::Fixed);
        }
    }

    #[test]
    fn test_routing_by_name() {
        let router = ChunkingRouter::default();
        assert_eq!(router.get_chunker_by_name("md").unwrap().name(), "markdown");
        assert_eq!(router.get_chunker_by_name("SENTENCE").unwrap().name(), "sentence");
    }

    #[test]
    fn test_unknown_name_rejected() {
        let router = ChunkingRouter::default();
        let err = router.get_chunker_by_name("agentic").err().unwrap();
        assert!(matches!(err, ChunkError::UnsupportedStrategy(_)));
    }

    #[test]
    fn test_list_chunkers() {
        let router = ChunkingRouter::default();
        let names: Vec<_> = router.list_chunkers().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["recursive", "semantic", "markdown", "sentence", "fixed"]);
    }
}
