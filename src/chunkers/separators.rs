//! Separator hierarchy shared by the text strategies.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use super::base::{SourceText, Span};

lazy_static! {
    /// A newline followed by at least one blank line.
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\r?\n(?:[ \t]*\r?\n)+").unwrap();
}

/// Words that end in a period without ending a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "vs", "etc", "e.g", "i.e", "cf",
    "al", "inc", "ltd", "co", "corp", "no", "fig", "vol", "approx", "dept", "est", "jan", "feb",
    "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "u.s", "a.m", "p.m",
];

/// Closing punctuation allowed between a terminator and the following space.
const CLOSERS: &[char] = &['"', '\'', ')', ']', '}', '\u{201D}', '\u{2019}'];

/// Boundary kinds, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    /// Blank-line runs
    Paragraph,
    /// `.`, `!` or `?` followed by whitespace
    Sentence,
    /// Whitespace runs
    Word,
    /// Grapheme cluster boundaries
    Character,
}

impl Separator {
    /// Default hierarchy: paragraph > sentence > word > character.
    pub const HIERARCHY: [Separator; 4] = [
        Separator::Paragraph,
        Separator::Sentence,
        Separator::Word,
        Separator::Character,
    ];

    /// This separator and every finer one after it.
    pub fn and_finer(self) -> Vec<Separator> {
        Self::HIERARCHY
            .iter()
            .copied()
            .skip_while(|s| *s != self)
            .collect()
    }

    /// Cut positions strictly inside `span`, ascending.
    ///
    /// With `keep_separator` the delimiter stays at the end of the preceding
    /// piece; otherwise it starts the following piece.
    pub fn cuts(&self, text: &SourceText<'_>, span: Span, keep_separator: bool) -> Vec<usize> {
        let raw = match self {
            Separator::Paragraph => paragraph_delimiters(text, span),
            Separator::Sentence => sentence_delimiters(text, span),
            Separator::Word => whitespace_runs(text, span),
            Separator::Character => {
                return grapheme_boundaries(text, span);
            }
        };

        let mut cuts: Vec<usize> = raw
            .into_iter()
            .map(|d| if keep_separator { d.end } else { d.start })
            .filter(|&c| c > span.start && c < span.end)
            .collect();
        cuts.dedup();
        cuts
    }

    /// Split `span` into contiguous pieces at this separator.
    pub fn split(&self, text: &SourceText<'_>, span: Span, keep_separator: bool) -> Vec<Span> {
        let mut pieces = Vec::new();
        let mut start = span.start;
        for cut in self.cuts(text, span, keep_separator) {
            pieces.push(Span::new(start, cut));
            start = cut;
        }
        if start < span.end || pieces.is_empty() {
            pieces.push(Span::new(start, span.end));
        }
        pieces
    }
}

fn paragraph_delimiters(text: &SourceText<'_>, span: Span) -> Vec<Span> {
    let base = text.byte_offset(span.start);
    PARAGRAPH_BREAK
        .find_iter(text.slice(span))
        .map(|m| {
            Span::new(
                text.char_index(base + m.start()),
                text.char_index(base + m.end()),
            )
        })
        .collect()
}

/// Whitespace runs that follow a sentence terminator.
fn sentence_delimiters(text: &SourceText<'_>, span: Span) -> Vec<Span> {
    let chars = text.chars();
    let mut delimiters = Vec::new();
    let mut i = span.start;

    while i < span.end {
        let c = chars[i];
        if !matches!(c, '.' | '!' | '?') {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < span.end && CLOSERS.contains(&chars[j]) {
            j += 1;
        }
        if j >= span.end || !chars[j].is_whitespace() {
            i = j.max(i + 1);
            continue;
        }
        if c == '.' && is_abbreviation(chars, span.start, i) {
            i = j;
            continue;
        }

        let mut k = j;
        while k < span.end && chars[k].is_whitespace() {
            k += 1;
        }
        delimiters.push(Span::new(j, k));
        i = k;
    }

    delimiters
}

/// Whether the word ending at the period `dot` is an abbreviation or initial.
fn is_abbreviation(chars: &[char], floor: usize, dot: usize) -> bool {
    let mut start = dot;
    while start > floor && !chars[start - 1].is_whitespace() {
        start -= 1;
    }
    let word: String = chars[start..dot]
        .iter()
        .skip_while(|c| !c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();

    if word.is_empty() {
        return false;
    }
    let mut letters = word.chars();
    if let (Some(first), None) = (letters.next(), letters.next()) {
        // Single-letter initial such as "J. Smith"
        return first.is_alphabetic();
    }
    ABBREVIATIONS.contains(&word.as_str())
}

fn whitespace_runs(text: &SourceText<'_>, span: Span) -> Vec<Span> {
    let chars = text.chars();
    let mut runs = Vec::new();
    let mut i = span.start;

    while i < span.end {
        if chars[i].is_whitespace() {
            let start = i;
            while i < span.end && chars[i].is_whitespace() {
                i += 1;
            }
            runs.push(Span::new(start, i));
        } else {
            i += 1;
        }
    }

    runs
}

fn grapheme_boundaries(text: &SourceText<'_>, span: Span) -> Vec<usize> {
    let base = text.byte_offset(span.start);
    text.slice(span)
        .grapheme_indices(true)
        .map(|(byte, _)| text.char_index(base + byte))
        .filter(|&c| c > span.start && c < span.end)
        .collect()
}
