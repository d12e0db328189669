//! Boundary post-processing: runt merging, hard splits and overlap injection.

use tracing::debug;

use crate::chunkers::{Segment, SourceText, Span};
use crate::types::ChunkConfig;

/// A final chunk boundary in source coordinates.
///
/// `span` includes the leading `overlap` chars shared with the previous chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedSpan {
    pub span: Span,
    pub overlap: usize,
    /// Heading owning the first char of the chunk
    pub section: Option<String>,
    /// Later sections that begin inside the chunk, by start offset
    section_starts: Vec<(usize, Option<String>)>,
}

impl BoundedSpan {
    fn new(span: Span, section: Option<String>) -> Self {
        Self {
            span,
            overlap: 0,
            section,
            section_starts: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.span.len()
    }

    fn last_section(&self) -> &Option<String> {
        self.section_starts
            .last()
            .map(|(_, section)| section)
            .unwrap_or(&self.section)
    }

    fn push_section(&mut self, start: usize, section: Option<String>) {
        if *self.last_section() != section {
            self.section_starts.push((start, section));
        }
    }

    /// Section owning the char at `pos`.
    fn section_at(&self, pos: usize) -> Option<String> {
        self.section_starts
            .iter()
            .rev()
            .find(|(start, _)| *start <= pos)
            .map(|(_, section)| section.clone())
            .unwrap_or_else(|| self.section.clone())
    }

    /// Absorb the directly following chunk.
    fn absorb(&mut self, next: BoundedSpan) {
        self.push_section(next.span.start, next.section);
        for (start, section) in next.section_starts {
            self.push_section(start, section);
        }
        self.span = self.span.union(&next.span);
    }
}

/// Turns raw strategy segments into chunks that honour the size bounds.
///
/// Passes run in order: normalise, merge runts, hard-split oversize chunks,
/// inject overlap. The first three work on disjoint spans; overlap is added
/// last and capped so no chunk grows past `max_chunk_size`. All offsets stay
/// in original text coordinates.
pub struct PostProcessor<'a> {
    config: &'a ChunkConfig,
}

impl<'a> PostProcessor<'a> {
    pub fn new(config: &'a ChunkConfig) -> Self {
        Self { config }
    }

    /// Run every pass over the segments of `text`.
    ///
    /// `native_overlap` marks segments that already overlap (fixed windows).
    /// Their shared prefix is trimmed first and restored as exact overlap at
    /// the end, so the windows come back unchanged unless merging or bounds
    /// required otherwise.
    pub fn process(
        &self,
        text: &SourceText<'_>,
        segments: Vec<Segment>,
        native_overlap: bool,
    ) -> Vec<BoundedSpan> {
        let segments = if native_overlap {
            trim_native_overlap(segments)
        } else {
            segments
        };

        let chunks = self.normalize(text, segments);
        debug!(chunks = chunks.len(), "Normalized segments");

        let chunks = self.merge_runts(chunks);
        let mut chunks = self.split_oversize(chunks);

        let snap = self.config.keep_separator() && !native_overlap;
        self.inject_overlap(text, &mut chunks, snap);

        debug!(chunks = chunks.len(), "Post-processing complete");
        chunks
    }

    /// Drop empty segments and fold whitespace-only ones into a neighbour.
    fn normalize(&self, text: &SourceText<'_>, segments: Vec<Segment>) -> Vec<BoundedSpan> {
        let mut chunks: Vec<BoundedSpan> = Vec::with_capacity(segments.len());
        let mut pending_start: Option<usize> = None;

        for segment in segments {
            if segment.span.is_empty() {
                continue;
            }
            if text.is_blank_span(segment.span) {
                match chunks.last_mut() {
                    Some(last) => last.span.end = last.span.end.max(segment.span.end),
                    None => {
                        pending_start.get_or_insert(segment.span.start);
                    }
                }
                continue;
            }

            let start = pending_start.take().unwrap_or(segment.span.start);
            chunks.push(BoundedSpan::new(
                Span::new(start, segment.span.end),
                segment.section,
            ));
        }

        chunks
    }

    /// Merge chunks shorter than `min_chunk_size` into a neighbour.
    ///
    /// A runt joins its predecessor when the union fits `max_chunk_size`,
    /// otherwise it is carried into its successor regardless of size; the
    /// hard split rebalances anything that grows past the maximum. Only a
    /// trailing runt may remain short.
    fn merge_runts(&self, chunks: Vec<BoundedSpan>) -> Vec<BoundedSpan> {
        let min = self.config.min_chunk_size();
        let max = self.config.max_chunk_size();
        if min == 0 || chunks.len() < 2 {
            return chunks;
        }

        let mut merged: Vec<BoundedSpan> = Vec::with_capacity(chunks.len());
        let mut carried: Option<BoundedSpan> = None;

        for chunk in chunks {
            let chunk = match carried.take() {
                Some(mut runt) => {
                    runt.absorb(chunk);
                    runt
                }
                None => chunk,
            };
            if chunk.len() >= min {
                merged.push(chunk);
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.len() + chunk.len() <= max => last.absorb(chunk),
                _ => carried = Some(chunk),
            }
        }

        if let Some(runt) = carried {
            match merged.last_mut() {
                Some(last) if last.len() + runt.len() <= max => last.absorb(runt),
                _ => merged.push(runt),
            }
        }

        debug!(chunks = merged.len(), min, "Merged runt chunks");
        merged
    }

    /// Slice chunks longer than `max_chunk_size` into balanced raw pieces.
    ///
    /// Pieces are at least `max / 2` chars, so they satisfy any
    /// `min_chunk_size` up to half the maximum. Above that the maximum wins.
    fn split_oversize(&self, chunks: Vec<BoundedSpan>) -> Vec<BoundedSpan> {
        let max = self.config.max_chunk_size();
        let mut out = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let len = chunk.len();
            if len <= max {
                out.push(chunk);
                continue;
            }

            let parts = len.div_ceil(max);
            let base = len / parts;
            let extra = len % parts;
            let mut start = chunk.span.start;

            for part in 0..parts {
                let end = start + base + usize::from(part < extra);
                let mut piece = BoundedSpan::new(Span::new(start, end), chunk.section_at(start));
                for (pos, section) in &chunk.section_starts {
                    if *pos > start && *pos < end {
                        piece.push_section(*pos, section.clone());
                    }
                }
                out.push(piece);
                start = end;
            }
            debug!(len, parts, max, "Hard split oversize chunk");
        }

        out
    }

    /// Prepend the tail of each previous chunk to the next one.
    ///
    /// The overlap never reaches past the previous chunk's start and never
    /// pushes a chunk over `max_chunk_size`.
    fn inject_overlap(&self, text: &SourceText<'_>, chunks: &mut [BoundedSpan], snap: bool) {
        let overlap = self.config.chunk_overlap();
        let max = self.config.max_chunk_size();
        if overlap == 0 || chunks.len() < 2 {
            return;
        }

        for i in 1..chunks.len() {
            let floor = chunks[i - 1].span.start;
            let core = chunks[i].span.start;
            let room = max.saturating_sub(chunks[i].len());
            let wanted = overlap.min(core - floor).min(room);
            if wanted == 0 {
                continue;
            }

            let mut cut = core - wanted;
            if snap {
                let snapped = snap_to_token_start(text, cut, floor);
                if core - snapped <= room {
                    cut = snapped;
                }
            }

            chunks[i].span.start = cut;
            chunks[i].overlap = core - cut;
        }
    }
}

/// Strip from each window the prefix already covered by its predecessor.
fn trim_native_overlap(segments: Vec<Segment>) -> Vec<Segment> {
    let mut previous_end = 0usize;
    segments
        .into_iter()
        .filter_map(|segment| {
            let start = segment.span.start.max(previous_end);
            if start >= segment.span.end {
                return None;
            }
            previous_end = segment.span.end;
            Some(Segment::with_section(
                Span::new(start, segment.span.end),
                segment.section,
            ))
        })
        .collect()
}

/// Move `cut` back to the start of the token it falls in, staying above `floor`.
///
/// Returns `cut` unchanged when no whitespace boundary exists in between.
fn snap_to_token_start(text: &SourceText<'_>, cut: usize, floor: usize) -> usize {
    let chars = text.chars();
    let mut pos = cut;
    while pos > floor && !chars[pos - 1].is_whitespace() {
        pos -= 1;
    }
    if pos == floor {
        cut
    } else {
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn segments(spans: &[(usize, usize)]) -> Vec<Segment> {
        spans.iter().map(|&(s, e)| Segment::new(Span::new(s, e))).collect()
    }

    fn spans(chunks: &[BoundedSpan]) -> Vec<(usize, usize, usize)> {
        chunks
            .iter()
            .map(|c| (c.span.start, c.span.end, c.overlap))
            .collect()
    }

    fn sections(chunks: &[BoundedSpan]) -> Vec<Option<&str>> {
        chunks.iter().map(|c| c.section.as_deref()).collect()
    }

    #[test]
    fn test_whitespace_segments_fold_into_neighbours() {
        let text = SourceText::new("  abc  def  ");
        let config = ChunkConfig::with_size(10).unwrap();
        let chunks = PostProcessor::new(&config).process(
            &text,
            segments(&[(0, 2), (2, 5), (5, 7), (7, 10), (10, 12)]),
            false,
        );
        assert_eq!(spans(&chunks), vec![(0, 7, 0), (7, 12, 0)]);
    }

    #[test]
    fn test_runt_merges_backward() {
        let content = "a".repeat(30);
        let text = SourceText::new(&content);
        let config = ChunkConfig::builder(10).min_chunk_size(5).build().unwrap();
        let chunks = PostProcessor::new(&config).process(
            &text,
            segments(&[(0, 10), (10, 13), (13, 23), (23, 30)]),
            false,
        );
        assert_eq!(spans(&chunks), vec![(0, 13, 0), (13, 23, 0), (23, 30, 0)]);
    }

    #[test]
    fn test_runt_merges_forward_when_backward_too_big() {
        let content = "a".repeat(30);
        let text = SourceText::new(&content);
        let config = ChunkConfig::builder(10)
            .min_chunk_size(5)
            .max_chunk_size(12)
            .build()
            .unwrap();
        let chunks = PostProcessor::new(&config).process(
            &text,
            segments(&[(0, 10), (10, 13), (13, 20), (20, 30)]),
            false,
        );
        assert_eq!(spans(&chunks), vec![(0, 10, 0), (10, 20, 0), (20, 30, 0)]);
    }

    #[test]
    fn test_runt_between_full_chunks_merges_forward_and_rebalances() {
        let content = "a".repeat(199);
        let text = SourceText::new(&content);
        let config = ChunkConfig::builder(50).min_chunk_size(15).build().unwrap();
        let chunks = PostProcessor::new(&config).process(
            &text,
            segments(&[(0, 98), (98, 102), (102, 199)]),
            false,
        );
        // (98, 199) is 101 chars, over the 100 char maximum
        assert_eq!(spans(&chunks), vec![(0, 98, 0), (98, 149, 0), (149, 199, 0)]);
    }

    #[test]
    fn test_leading_runt_merges_forward() {
        let content = "a".repeat(13);
        let text = SourceText::new(&content);
        let config = ChunkConfig::builder(10).min_chunk_size(5).build().unwrap();
        let chunks = PostProcessor::new(&config).process(&text, segments(&[(0, 3), (3, 13)]), false);
        assert_eq!(spans(&chunks), vec![(0, 13, 0)]);
    }

    #[test]
    fn test_trailing_runt_kept_when_backward_too_big() {
        let content = "a".repeat(13);
        let text = SourceText::new(&content);
        let config = ChunkConfig::builder(10)
            .min_chunk_size(5)
            .max_chunk_size(10)
            .build()
            .unwrap();
        let chunks = PostProcessor::new(&config).process(&text, segments(&[(0, 10), (10, 13)]), false);
        assert_eq!(spans(&chunks), vec![(0, 10, 0), (10, 13, 0)]);
    }

    #[test]
    fn test_single_runt_kept() {
        let text = SourceText::new("abc");
        let config = ChunkConfig::builder(10).min_chunk_size(5).build().unwrap();
        let chunks = PostProcessor::new(&config).process(&text, segments(&[(0, 3)]), false);
        assert_eq!(spans(&chunks), vec![(0, 3, 0)]);
    }

    #[test]
    fn test_overlap_snaps_to_token_start() {
        let text = SourceText::new("one two three four five six");
        let config = ChunkConfig::builder(14).chunk_overlap(3).build().unwrap();
        // "one two three " | "four five six"
        let chunks = PostProcessor::new(&config).process(&text, segments(&[(0, 14), (14, 27)]), false);
        // Exact cut at 11 lands inside "three"; snap back to its start at 8
        assert_eq!(spans(&chunks), vec![(0, 14, 0), (8, 27, 6)]);
    }

    #[test]
    fn test_overlap_exact_without_keep_separator() {
        let text = SourceText::new("one two three four five six");
        let config = ChunkConfig::builder(14)
            .chunk_overlap(3)
            .keep_separator(false)
            .build()
            .unwrap();
        let chunks = PostProcessor::new(&config).process(&text, segments(&[(0, 13), (13, 27)]), false);
        assert_eq!(spans(&chunks), vec![(0, 13, 0), (10, 27, 3)]);
    }

    #[test]
    fn test_overlap_without_boundary_uses_exact_cut() {
        let content = "x".repeat(20);
        let text = SourceText::new(&content);
        let config = ChunkConfig::builder(10).chunk_overlap(4).build().unwrap();
        let chunks = PostProcessor::new(&config).process(&text, segments(&[(0, 10), (10, 20)]), false);
        assert_eq!(spans(&chunks), vec![(0, 10, 0), (6, 20, 4)]);
    }

    #[test]
    fn test_native_overlap_restored() {
        let content = "x".repeat(180);
        let text = SourceText::new(&content);
        let config = ChunkConfig::builder(100).chunk_overlap(20).build().unwrap();
        let chunks = PostProcessor::new(&config).process(&text, segments(&[(0, 100), (80, 180)]), true);
        assert_eq!(spans(&chunks), vec![(0, 100, 0), (80, 180, 20)]);
    }

    #[test]
    fn test_native_overlap_wider_than_step() {
        let content = "x".repeat(14);
        let text = SourceText::new(&content);
        let config = ChunkConfig::builder(10).chunk_overlap(8).build().unwrap();
        let chunks = PostProcessor::new(&config).process(
            &text,
            segments(&[(0, 10), (2, 12), (4, 14)]),
            true,
        );
        assert_eq!(spans(&chunks), vec![(0, 10, 0), (2, 12, 8), (4, 14, 8)]);
    }

    #[test]
    fn test_oversize_split_balanced() {
        let content = "x".repeat(25);
        let text = SourceText::new(&content);
        let config = ChunkConfig::builder(10).max_chunk_size(10).build().unwrap();
        let chunks = PostProcessor::new(&config).process(&text, segments(&[(0, 25)]), false);
        assert_eq!(spans(&chunks), vec![(0, 9, 0), (9, 17, 0), (17, 25, 0)]);
    }

    #[test]
    fn test_overlap_capped_by_max() {
        let content = "x".repeat(20);
        let text = SourceText::new(&content);
        let tight = ChunkConfig::builder(10)
            .chunk_overlap(5)
            .max_chunk_size(10)
            .build()
            .unwrap();
        let chunks = PostProcessor::new(&tight).process(&text, segments(&[(0, 10), (10, 20)]), false);
        assert_eq!(spans(&chunks), vec![(0, 10, 0), (10, 20, 0)]);

        let roomy = ChunkConfig::builder(10)
            .chunk_overlap(5)
            .max_chunk_size(12)
            .build()
            .unwrap();
        let chunks = PostProcessor::new(&roomy).process(&text, segments(&[(0, 10), (10, 20)]), false);
        assert_eq!(spans(&chunks), vec![(0, 10, 0), (8, 20, 2)]);
    }

    #[test]
    fn test_overlap_never_creates_runts() {
        let content = "x".repeat(40);
        let text = SourceText::new(&content);
        let config = ChunkConfig::builder(10)
            .chunk_overlap(5)
            .min_chunk_size(8)
            .max_chunk_size(10)
            .build()
            .unwrap();
        let chunks = PostProcessor::new(&config).process(
            &text,
            segments(&[(0, 10), (10, 20), (20, 30), (30, 40)]),
            false,
        );
        assert!(chunks.iter().all(|c| (8..=10).contains(&c.span.len())));
    }

    #[test]
    fn test_backward_merge_keeps_opening_section() {
        let content = "x".repeat(20);
        let text = SourceText::new(&content);
        let config = ChunkConfig::builder(10).min_chunk_size(5).build().unwrap();
        let chunks = PostProcessor::new(&config).process(
            &text,
            vec![
                Segment::with_section(Span::new(0, 8), Some("# A".into())),
                Segment::with_section(Span::new(8, 11), Some("# B".into())),
                Segment::with_section(Span::new(11, 20), Some("# B".into())),
            ],
            false,
        );
        assert_eq!(spans(&chunks), vec![(0, 11, 0), (11, 20, 0)]);
        assert_eq!(sections(&chunks), vec![Some("# A"), Some("# B")]);
    }

    #[test]
    fn test_split_pieces_take_section_of_their_start() {
        let content = "x".repeat(23);
        let text = SourceText::new(&content);
        let config = ChunkConfig::builder(10)
            .min_chunk_size(5)
            .max_chunk_size(12)
            .build()
            .unwrap();
        let chunks = PostProcessor::new(&config).process(
            &text,
            vec![
                Segment::with_section(Span::new(0, 10), Some("# A".into())),
                Segment::with_section(Span::new(10, 13), Some("# A".into())),
                Segment::with_section(Span::new(13, 23), Some("# B".into())),
            ],
            false,
        );
        // The runt carries into "# B" and the 13 char union splits 7 + 6
        assert_eq!(spans(&chunks), vec![(0, 10, 0), (10, 17, 0), (17, 23, 0)]);
        assert_eq!(sections(&chunks), vec![Some("# A"), Some("# A"), Some("# B")]);
    }
}
