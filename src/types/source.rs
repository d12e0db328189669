//! Source document definitions.

use serde::{Deserialize, Serialize};

use super::Metadata;

/// A document to be chunked, as received from an upstream text source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Caller-chosen identifier (file path, URL, record key)
    pub id: String,

    /// The raw text to chunk
    pub content: String,

    /// Metadata carried through into the result unmodified
    #[serde(default)]
    pub metadata: Metadata,
}

impl SourceDocument {
    /// Create a document with empty metadata.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Get content length in characters.
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }
}
