//! Configuration types for chunking.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ChunkError, Result};
use crate::{DEFAULT_BATCH_CONCURRENCY, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

/// Segmentation algorithm used to pick candidate split points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChunkStrategy {
    /// Separator hierarchy: paragraph, sentence, word, character
    #[default]
    Recursive,
    /// Paragraph grouping
    Semantic,
    /// Heading-delimited sections
    Markdown,
    /// Sentence grouping
    Sentence,
    /// Fixed-size sliding window
    Fixed,
}

impl ChunkStrategy {
    /// All strategies, in dispatch order.
    pub const ALL: [ChunkStrategy; 5] = [
        ChunkStrategy::Recursive,
        ChunkStrategy::Semantic,
        ChunkStrategy::Markdown,
        ChunkStrategy::Sentence,
        ChunkStrategy::Fixed,
    ];

    /// Canonical identifier of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkStrategy::Recursive => "recursive",
            ChunkStrategy::Semantic => "semantic",
            ChunkStrategy::Markdown => "markdown",
            ChunkStrategy::Sentence => "sentence",
            ChunkStrategy::Fixed => "fixed",
        }
    }
}

impl FromStr for ChunkStrategy {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "recursive" => Ok(Self::Recursive),
            "semantic" | "paragraph" => Ok(Self::Semantic),
            "markdown" | "md" => Ok(Self::Markdown),
            "sentence" => Ok(Self::Sentence),
            "fixed" | "fixed_size" | "char" | "chars" => Ok(Self::Fixed),
            _ => Err(ChunkError::UnsupportedStrategy(s.to_string())),
        }
    }
}

impl TryFrom<String> for ChunkStrategy {
    type Error = ChunkError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ChunkStrategy> for String {
    fn from(value: ChunkStrategy) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for ChunkStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validated parameters for a chunking run.
///
/// Lengths are counted in characters (Unicode scalar values). A `ChunkConfig`
/// can only be obtained through [`ChunkConfigBuilder::build`] (or serde, which
/// runs the same checks), so `0 <= chunk_overlap < chunk_size <= max_chunk_size`
/// always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChunkConfigBuilder", into = "ChunkConfigBuilder")]
pub struct ChunkConfig {
    chunk_size: usize,
    chunk_overlap: usize,
    strategy: ChunkStrategy,
    keep_separator: bool,
    min_chunk_size: usize,
    max_chunk_size: usize,
}

impl ChunkConfig {
    /// Start building a config with the given target chunk size.
    pub fn builder(chunk_size: usize) -> ChunkConfigBuilder {
        ChunkConfigBuilder::new(chunk_size)
    }

    /// Config with the given chunk size and all other fields defaulted.
    pub fn with_size(chunk_size: usize) -> Result<Self> {
        Self::builder(chunk_size).build()
    }

    /// Config with size, overlap and strategy; the rest defaulted.
    pub fn new(chunk_size: usize, chunk_overlap: usize, strategy: ChunkStrategy) -> Result<Self> {
        Self::builder(chunk_size)
            .chunk_overlap(chunk_overlap)
            .strategy(strategy)
            .build()
    }

    /// Target chunk length in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters shared between consecutive chunks.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn strategy(&self) -> ChunkStrategy {
        self.strategy
    }

    /// Whether boundary delimiters trail the preceding chunk.
    pub fn keep_separator(&self) -> bool {
        self.keep_separator
    }

    /// Chunks shorter than this are merged into a neighbour.
    pub fn min_chunk_size(&self) -> usize {
        self.min_chunk_size
    }

    /// Hard upper bound on chunk length.
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Builder pre-filled with this config, for deriving variants.
    pub fn to_builder(&self) -> ChunkConfigBuilder {
        ChunkConfigBuilder::from(self.clone())
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: 0,
            strategy: ChunkStrategy::default(),
            keep_separator: true,
            min_chunk_size: 0,
            max_chunk_size: DEFAULT_CHUNK_SIZE * 2,
        }
    }
}

/// Unvalidated chunk parameters.
///
/// Also the serde representation of [`ChunkConfig`]: missing fields take their
/// documented defaults and `max_chunk_size` falls back to twice the chunk size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfigBuilder {
    chunk_size: usize,
    #[serde(default)]
    chunk_overlap: usize,
    #[serde(default)]
    strategy: ChunkStrategy,
    #[serde(default = "default_keep_separator")]
    keep_separator: bool,
    #[serde(default)]
    min_chunk_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_chunk_size: Option<usize>,
}

fn default_keep_separator() -> bool {
    true
}

impl ChunkConfigBuilder {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap: 0,
            strategy: ChunkStrategy::default(),
            keep_separator: true,
            min_chunk_size: 0,
            max_chunk_size: None,
        }
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.chunk_overlap = overlap;
        self
    }

    pub fn strategy(mut self, strategy: ChunkStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn keep_separator(mut self, keep: bool) -> Self {
        self.keep_separator = keep;
        self
    }

    pub fn min_chunk_size(mut self, size: usize) -> Self {
        self.min_chunk_size = size;
        self
    }

    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = Some(size);
        self
    }

    /// Validate the parameters and produce an immutable [`ChunkConfig`].
    pub fn build(self) -> Result<ChunkConfig> {
        if self.chunk_size == 0 {
            return Err(ChunkError::Configuration(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ChunkError::Configuration(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        let max_chunk_size = self
            .max_chunk_size
            .unwrap_or_else(|| self.chunk_size.saturating_mul(2));
        if max_chunk_size < self.chunk_size {
            return Err(ChunkError::Configuration(format!(
                "max_chunk_size ({}) must be at least chunk_size ({})",
                max_chunk_size, self.chunk_size
            )));
        }
        if self.min_chunk_size > max_chunk_size {
            return Err(ChunkError::Configuration(format!(
                "min_chunk_size ({}) must not exceed max_chunk_size ({})",
                self.min_chunk_size, max_chunk_size
            )));
        }

        Ok(ChunkConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            strategy: self.strategy,
            keep_separator: self.keep_separator,
            min_chunk_size: self.min_chunk_size,
            max_chunk_size,
        })
    }
}

impl TryFrom<ChunkConfigBuilder> for ChunkConfig {
    type Error = ChunkError;

    fn try_from(builder: ChunkConfigBuilder) -> Result<Self> {
        builder.build()
    }
}

impl From<ChunkConfig> for ChunkConfigBuilder {
    fn from(config: ChunkConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            strategy: config.strategy,
            keep_separator: config.keep_separator,
            min_chunk_size: config.min_chunk_size,
            max_chunk_size: Some(config.max_chunk_size),
        }
    }
}

/// Process-wide chunking defaults, loaded from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Default chunk size in characters
    pub default_chunk_size: usize,

    /// Default chunk overlap in characters
    pub default_chunk_overlap: usize,

    /// Default strategy
    pub default_strategy: ChunkStrategy,

    /// Minimum chunk size before runt merging
    pub min_chunk_size: usize,

    /// Hard maximum chunk size (None = twice the chunk size)
    pub max_chunk_size: Option<usize>,

    /// Whether delimiters stay at the end of the preceding chunk
    pub keep_separator: bool,

    /// Maximum documents chunked concurrently in a batch
    pub batch_concurrency: usize,

    /// Active chunking profile name
    pub active_profile: String,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            default_chunk_size: DEFAULT_CHUNK_SIZE,
            default_chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            default_strategy: ChunkStrategy::default(),
            min_chunk_size: 0,
            max_chunk_size: None,
            keep_separator: true,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            active_profile: "default".to_string(),
        }
    }
}

impl ChunkingConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values are logged and replaced with their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_chunk_size: env_parse("CHUNK_SIZE").unwrap_or(defaults.default_chunk_size),
            default_chunk_overlap: env_parse("CHUNK_OVERLAP")
                .unwrap_or(defaults.default_chunk_overlap),
            default_strategy: env_parse("CHUNK_STRATEGY").unwrap_or(defaults.default_strategy),
            min_chunk_size: env_parse("MIN_CHUNK_SIZE").unwrap_or(defaults.min_chunk_size),
            max_chunk_size: env_parse("MAX_CHUNK_SIZE").or(defaults.max_chunk_size),
            keep_separator: env_parse("KEEP_SEPARATOR").unwrap_or(defaults.keep_separator),
            batch_concurrency: env_parse("BATCH_CONCURRENCY")
                .unwrap_or(defaults.batch_concurrency),
            active_profile: std::env::var("ACTIVE_PROFILE").unwrap_or(defaults.active_profile),
        }
    }

    /// Unvalidated builder seeded with these defaults.
    pub fn builder(&self) -> ChunkConfigBuilder {
        let mut builder = ChunkConfig::builder(self.default_chunk_size)
            .chunk_overlap(self.default_chunk_overlap)
            .strategy(self.default_strategy)
            .keep_separator(self.keep_separator)
            .min_chunk_size(self.min_chunk_size);
        if let Some(max) = self.max_chunk_size {
            builder = builder.max_chunk_size(max);
        }
        builder
    }

    /// Validate these defaults into a [`ChunkConfig`].
    pub fn chunk_config(&self) -> Result<ChunkConfig> {
        self.builder().build()
    }
}

fn env_parse<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring invalid environment value");
            None
        }
    }
}

/// A named chunking profile with preset parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingProfile {
    /// Profile name
    pub name: String,

    /// Profile description
    pub description: String,

    /// Chunk size for this profile
    pub chunk_size: usize,

    /// Chunk overlap for this profile
    pub chunk_overlap: usize,

    /// Strategy for this profile
    pub strategy: ChunkStrategy,
}

impl ChunkingProfile {
    /// Create default profiles.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::preset("default", "Balanced recursive splitting for general text", 512, 50, ChunkStrategy::Recursive),
            Self::preset("small", "Sentence-aligned chunks for fine-grained retrieval", 256, 25, ChunkStrategy::Sentence),
            Self::preset("large", "Paragraph-grouped chunks for more context", 1024, 100, ChunkStrategy::Semantic),
            Self::preset("markdown", "Heading-aware chunks for markdown and wiki pages", 768, 64, ChunkStrategy::Markdown),
            Self::preset("fixed", "Fixed-size sliding windows", 512, 64, ChunkStrategy::Fixed),
        ]
    }

    fn preset(
        name: &str,
        description: &str,
        chunk_size: usize,
        chunk_overlap: usize,
        strategy: ChunkStrategy,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            chunk_size,
            chunk_overlap,
            strategy,
        }
    }

    /// Look up a built-in profile by name (case-insensitive).
    pub fn find(name: &str) -> Option<Self> {
        Self::defaults()
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Builder seeded with this profile's parameters.
    pub fn builder(&self) -> ChunkConfigBuilder {
        ChunkConfig::builder(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .strategy(self.strategy)
    }

    /// Validate the profile into a [`ChunkConfig`].
    pub fn chunk_config(&self) -> Result<ChunkConfig> {
        self.builder().build()
    }
}
