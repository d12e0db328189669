//! Post-processing of raw strategy output and run statistics.

mod post_processor;
mod stats;

pub use post_processor::{BoundedSpan, PostProcessor};
pub use stats::ChunkStats;
