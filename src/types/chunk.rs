//! Chunk type definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ChunkStrategy;

/// Caller-supplied metadata carried through a chunking run.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A chunk of content extracted from a source document.
///
/// `content` is always an exact substring of the source:
/// `content == source[metadata.start_char..metadata.end_char]` in char offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Identifier, stable and unique within one run only
    pub id: Uuid,

    /// The text of the chunk, including any leading overlap
    pub content: String,

    /// Offsets and provenance
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    /// Derive the id for the chunk at `chunk_index` spanning `[start, end)`.
    pub fn chunk_id(chunk_index: usize, start: usize, end: usize) -> Uuid {
        let name = format!("{chunk_index}:{start}:{end}");
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
    }

    /// Length of the content in characters.
    pub fn len(&self) -> usize {
        self.metadata.end_char - self.metadata.start_char
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Content without the leading overlap copied from the previous chunk.
    pub fn fresh_content(&self) -> &str {
        match self.content.char_indices().nth(self.metadata.overlap) {
            Some((byte, _)) => &self.content[byte..],
            None => "",
        }
    }

    /// Content prefixed with its owning markdown heading.
    ///
    /// Chunks produced from the middle of a long section do not contain their
    /// heading; this restores it so the chunk reads on its own.
    pub fn contextual_content(&self) -> String {
        match &self.metadata.section {
            Some(heading) if !self.content.trim_start().starts_with(heading.as_str()) => {
                format!("{}\n\n{}", heading, self.content)
            }
            _ => self.content.clone(),
        }
    }
}

/// Metadata associated with a chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Starting char offset in the original text (inclusive)
    pub start_char: usize,

    /// Ending char offset in the original text (exclusive)
    pub end_char: usize,

    /// Leading chars shared with the previous chunk
    pub overlap: usize,

    /// Order of this chunk within the run (0-indexed)
    pub chunk_index: usize,

    /// Strategy that produced the chunk
    pub strategy: ChunkStrategy,

    /// Heading line of the markdown section owning this chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    /// Caller metadata, merged in
    #[serde(flatten)]
    pub extra: Metadata,
}

/// Outcome of a single chunking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingResult {
    /// Chunks in document order
    pub chunks: Vec<DocumentChunk>,

    pub total_chunks: usize,

    /// Wall-clock duration of the run
    pub processing_time: Duration,

    /// Source metadata supplied by the caller, unmodified
    pub metadata: Metadata,
}

impl ChunkingResult {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunk contents in order.
    pub fn contents(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(|c| c.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str, start: usize, overlap: usize, section: Option<&str>) -> DocumentChunk {
        let end = start + content.chars().count();
        DocumentChunk {
            id: DocumentChunk::chunk_id(0, start, end),
            content: content.to_string(),
            metadata: ChunkMetadata {
                start_char: start,
                end_char: end,
                overlap,
                chunk_index: 0,
                strategy: ChunkStrategy::Markdown,
                section: section.map(String::from),
                extra: Metadata::new(),
            },
        }
    }

    #[test]
    fn test_chunk_id_deterministic() {
        assert_eq!(DocumentChunk::chunk_id(3, 10, 20), DocumentChunk::chunk_id(3, 10, 20));
        assert_ne!(DocumentChunk::chunk_id(3, 10, 20), DocumentChunk::chunk_id(4, 10, 20));
    }

    #[test]
    fn test_fresh_content_skips_overlap() {
        let c = chunk("héllo world", 0, 3, None);
        assert_eq!(c.fresh_content(), "lo world");
        assert_eq!(c.len(), 11);
    }

    #[test]
    fn test_contextual_content() {
        let inner = chunk("More body text.", 40, 0, Some("## Setup"));
        assert_eq!(inner.contextual_content(), "## Setup\n\nMore body text.");

        let first = chunk("## Setup\n\nBody.", 0, 0, Some("## Setup"));
        assert_eq!(first.contextual_content(), "## Setup\n\nBody.");
    }

    #[test]
    fn test_caller_metadata_flattened() {
        let mut c = chunk("abc", 0, 0, None);
        c.metadata.extra.insert("source".into(), serde_json::json!("notes.md"));
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(value["metadata"]["source"], "notes.md");
        assert_eq!(value["metadata"]["start_char"], 0);
        assert!(value["metadata"].get("section").is_none());
    }
}
