//! Summary statistics over a chunking run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::ChunkingResult;

/// Aggregate metrics for a completed [`ChunkingResult`].
///
/// Sizes are observed char counts, not the configured bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkStats {
    pub total_chunks: usize,
    pub avg_chunk_size: f64,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
    pub processing_time: Duration,
}

impl ChunkStats {
    /// Compute stats for a result. Pure and idempotent.
    pub fn from_result(result: &ChunkingResult) -> Self {
        let sizes: Vec<usize> = result.chunks.iter().map(|c| c.len()).collect();
        let total: usize = sizes.iter().sum();

        let avg_chunk_size = if sizes.is_empty() {
            0.0
        } else {
            total as f64 / sizes.len() as f64
        };

        Self {
            total_chunks: result.chunks.len(),
            avg_chunk_size,
            min_chunk_size: sizes.iter().copied().min().unwrap_or(0),
            max_chunk_size: sizes.iter().copied().max().unwrap_or(0),
            processing_time: result.processing_time,
        }
    }
}

impl From<&ChunkingResult> for ChunkStats {
    fn from(result: &ChunkingResult) -> Self {
        Self::from_result(result)
    }
}
