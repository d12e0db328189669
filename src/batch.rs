//! Batch processing utilities for chunking many documents at once.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::ChunkingEngine;
use crate::error::{ChunkError, Result};
use crate::types::{ChunkingResult, SourceDocument};
use crate::DEFAULT_BATCH_CONCURRENCY;

/// Configuration for batch processing.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum documents to chunk concurrently
    pub concurrency: usize,
    /// Whether to continue on individual document failures
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_BATCH_CONCURRENCY,
            continue_on_error: true,
        }
    }
}

/// Result of batch processing.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub total_documents: usize,
    pub processed_documents: usize,
    pub failed_documents: usize,
    pub total_chunks: usize,
    /// Successful results, in input order
    pub results: Vec<DocumentResult>,
    pub errors: Vec<BatchError>,
}

/// Chunking output for one document of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    pub id: String,
    pub result: ChunkingResult,
}

/// Error during batch processing.
#[derive(Debug, Clone, Serialize)]
pub struct BatchError {
    pub document_id: String,
    pub error: String,
}

/// Batch processor that fans documents out over blocking worker threads.
///
/// Chunking is CPU-bound, so each document runs on `spawn_blocking` while a
/// semaphore caps how many run at once. The engine is shared, never cloned.
pub struct BatchProcessor {
    engine: Arc<ChunkingEngine>,
    config: BatchConfig,
}

impl BatchProcessor {
    /// Create a new batch processor.
    pub fn new(engine: Arc<ChunkingEngine>, config: BatchConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &ChunkingEngine {
        &self.engine
    }

    /// Chunk every document and collect the results in input order.
    ///
    /// A failed document is recorded in [`BatchResult::errors`] when
    /// `continue_on_error` is set; otherwise the whole batch fails with
    /// [`ChunkError::Batch`].
    pub async fn process_batch(&self, documents: Vec<SourceDocument>) -> Result<BatchResult> {
        let total_documents = documents.len();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));

        info!(
            total_documents,
            concurrency = self.config.concurrency,
            "Starting batch processing"
        );

        let mut handles = Vec::with_capacity(total_documents);
        for document in documents {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| ChunkError::Batch(e.to_string()))?;
            let engine = Arc::clone(&self.engine);
            let id = document.id.clone();

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                debug!(document_id = %document.id, chars = document.content_len(), "Chunking document");
                engine.chunk(&document.content, document.metadata)
            });
            handles.push((id, handle));
        }

        let (results, errors) = collect_results(handles, self.config.continue_on_error).await?;

        let result = BatchResult {
            total_documents,
            processed_documents: results.len(),
            failed_documents: errors.len(),
            total_chunks: results.iter().map(|r| r.result.total_chunks).sum(),
            results,
            errors,
        };

        info!(
            processed = result.processed_documents,
            failed = result.failed_documents,
            chunks = result.total_chunks,
            "Batch processing complete"
        );

        Ok(result)
    }
}

/// Await every task in order, splitting successes from failures.
///
/// When `continue_on_error` is off the first failure fails the batch, but
/// only after the remaining tasks have finished, so no work outlives the call.
async fn collect_results(
    handles: Vec<(String, JoinHandle<ChunkingResult>)>,
    continue_on_error: bool,
) -> Result<(Vec<DocumentResult>, Vec<BatchError>)> {
    let mut results = Vec::with_capacity(handles.len());
    let mut errors = Vec::new();
    let mut first_failure: Option<ChunkError> = None;

    for (id, handle) in handles {
        match handle.await {
            Ok(result) => results.push(DocumentResult { id, result }),
            Err(e) => {
                warn!(document_id = %id, error = %e, "Failed to chunk document");
                if !continue_on_error && first_failure.is_none() {
                    first_failure = Some(ChunkError::Batch(format!("document {id}: {e}")));
                }
                errors.push(BatchError {
                    document_id: id,
                    error: e.to_string(),
                });
            }
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok((results, errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkConfig, ChunkStrategy, Metadata};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn processor(concurrency: usize) -> BatchProcessor {
        let config = ChunkConfig::builder(40)
            .chunk_overlap(8)
            .strategy(ChunkStrategy::Sentence)
            .build()
            .unwrap();
        BatchProcessor::new(
            Arc::new(ChunkingEngine::new(config)),
            BatchConfig {
                concurrency,
                continue_on_error: true,
            },
        )
    }

    fn documents(n: usize) -> Vec<SourceDocument> {
        (0..n)
            .map(|i| {
                let content = format!(
                    "Document {i} opens here. It has a few sentences. Each one is short! Done?"
                );
                SourceDocument::new(format!("doc-{i}"), content).with_metadata("source", format!("doc-{i}.txt"))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let result = processor(3).process_batch(documents(8)).await.unwrap();
        assert_eq!(result.total_documents, 8);
        assert_eq!(result.processed_documents, 8);
        assert_eq!(result.failed_documents, 0);
        let ids: Vec<_> = result.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, (0..8).map(|i| format!("doc-{i}")).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_batch_matches_sequential_engine() {
        let processor = processor(2);
        let docs = documents(4);
        let batch = processor.process_batch(docs.clone()).await.unwrap();

        for (doc, result) in docs.iter().zip(&batch.results) {
            let expected = processor.engine().chunk(&doc.content, doc.metadata.clone());
            assert_eq!(result.result.chunks, expected.chunks);
            assert_eq!(result.result.metadata.get("source"), Some(&json!(format!("{}.txt", doc.id))));
        }
        let total: usize = batch.results.iter().map(|r| r.result.total_chunks).sum();
        assert_eq!(batch.total_chunks, total);
    }

    #[tokio::test]
    async fn test_failure_waits_for_running_tasks() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let failing = tokio::task::spawn_blocking(|| -> ChunkingResult { panic!("chunker crashed") });
        let slow = tokio::task::spawn_blocking(move || {
            std::thread::sleep(Duration::from_millis(50));
            flag.store(true, Ordering::SeqCst);
            ChunkingResult {
                chunks: Vec::new(),
                total_chunks: 0,
                processing_time: Duration::ZERO,
                metadata: Metadata::new(),
            }
        });

        let err = collect_results(vec![("bad".into(), failing), ("slow".into(), slow)], false)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ChunkError::Batch(ref msg) if msg.contains("bad")));
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_failure_recorded_when_continuing() {
        let failing = tokio::task::spawn_blocking(|| -> ChunkingResult { panic!("chunker crashed") });
        let (results, errors) = collect_results(vec![("bad".into(), failing)], true).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].document_id, "bad");
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let result = processor(4).process_batch(Vec::new()).await.unwrap();
        assert_eq!(result.total_documents, 0);
        assert_eq!(result.total_chunks, 0);
        assert!(result.results.is_empty());
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_runs() {
        let docs = vec![
            SourceDocument::new("blank", "   "),
            SourceDocument::new("text", "One sentence only."),
        ];
        let result = processor(0).process_batch(docs).await.unwrap();
        assert_eq!(result.processed_documents, 2);
        assert_eq!(result.results[0].result.total_chunks, 0);
        assert_eq!(result.results[1].result.total_chunks, 1);
        assert_eq!(result.results[1].result.metadata, Metadata::new());
    }
}
