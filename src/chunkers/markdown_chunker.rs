//! Markdown chunker that treats headings as hard boundaries.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::base::{Chunker, Segment, SourceText, Span};
use super::semantic_chunker::SemanticChunker;
use crate::types::ChunkConfig;

lazy_static! {
    /// ATX heading: one to six `#` followed by whitespace or end of line.
    static ref HEADING: Regex = Regex::new(r"^#{1,6}(?:[ \t]|$)").unwrap();
}

/// Markdown chunker for documents, wiki pages and READMEs.
///
/// Every heading starts a new section. Sections that fit are kept whole;
/// longer section bodies are split with the semantic chunker and each piece
/// records its owning heading.
pub struct MarkdownChunker {
    body_splitter: SemanticChunker,
}

impl MarkdownChunker {
    /// Create a new markdown chunker.
    pub fn new() -> Self {
        Self {
            body_splitter: SemanticChunker::new(),
        }
    }

    /// Split document into sections based on headings.
    fn split_by_headings(&self, text: &SourceText<'_>) -> Vec<Section> {
        let mut sections: Vec<Section> = Vec::new();
        let mut open_fence: Option<&str> = None;
        let mut line_start = 0;

        for line in text.as_str().split_inclusive('\n') {
            let start = text.char_index(line_start);
            line_start += line.len();
            let end = text.char_index(line_start);

            // Track code blocks to not split inside them
            if let Some(marker) = fence_marker(line) {
                match open_fence {
                    None => open_fence = Some(marker),
                    Some(open) if closes_fence(open, marker) => open_fence = None,
                    Some(_) => {}
                }
            }

            let bare = line.trim_end_matches(&['\n', '\r'][..]);
            if open_fence.is_none() && HEADING.is_match(bare) {
                sections.push(Section {
                    heading: Some(bare.trim().to_string()),
                    span: Span::new(start, end),
                    body_start: end,
                });
                continue;
            }

            match sections.last_mut() {
                Some(section) => section.span.end = end,
                None => sections.push(Section {
                    heading: None,
                    span: Span::new(start, end),
                    body_start: start,
                }),
            }
        }

        sections
    }

    /// Split a section into segments that each carry the section heading.
    fn split_section(
        &self,
        text: &SourceText<'_>,
        section: &Section,
        config: &ChunkConfig,
    ) -> Vec<Segment> {
        let body = Span::new(section.body_start, section.span.end);
        let fits = section.span.len() <= config.chunk_size()
            || (body.len() <= config.chunk_size()
                && section.span.len() <= config.max_chunk_size());

        if fits || body.is_empty() {
            return vec![Segment::with_section(section.span, section.heading.clone())];
        }

        let mut pieces = self.body_splitter.split_span(text, body, config);

        // The heading line joins the first body piece
        match pieces.first_mut() {
            Some(first) => first.start = section.span.start,
            None => pieces.push(section.span),
        }

        pieces
            .into_iter()
            .map(|span| Segment::with_section(span, section.heading.clone()))
            .collect()
    }
}

/// The backtick or tilde run opening a fenced code line, if any.
fn fence_marker(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let fence_char = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let run = trimmed.len() - trimmed.trim_start_matches(fence_char).len();
    (run >= 3).then(|| &trimmed[..run])
}

/// A fence closes only with the same character and at least the same length.
fn closes_fence(open: &str, marker: &str) -> bool {
    open.as_bytes()[0] == marker.as_bytes()[0] && marker.len() >= open.len()
}

/// A section of a document defined by a heading.
struct Section {
    heading: Option<String>,
    span: Span,
    body_start: usize,
}

impl Default for MarkdownChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for MarkdownChunker {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn description(&self) -> &'static str {
        "Heading-aware chunker for markdown and wiki content"
    }

    fn segment(&self, text: &SourceText<'_>, config: &ChunkConfig) -> Vec<Segment> {
        if text.is_empty() {
            return vec![];
        }

        let sections = self.split_by_headings(text);
        debug!(sections = sections.len(), "Split document by headings");

        sections
            .iter()
            .flat_map(|section| self.split_section(text, section, config))
            .collect()
    }
}
