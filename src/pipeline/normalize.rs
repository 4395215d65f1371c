//! Paragraph normalisation of extracted text.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so that `\r\n\r\n` counts as a blank
//! line. The text is then split on runs of blank lines (a line holding only
//! whitespace is blank), each segment is trimmed, and empty segments are
//! dropped. Nothing inside a paragraph is rewritten, which is what makes
//! the pass idempotent: re-joining the paragraphs with `"\n\n"` and
//! normalising again yields the same paragraphs.

use crate::config::PageSeparator;
use crate::pipeline::extract::ExtractedPage;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Separator used when re-joining normalised paragraphs.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Matches a newline followed by one or more whitespace-only lines.
static RE_BLANK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[^\S\n]*\n\s*").unwrap());

/// Ordered, non-empty, trimmed paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub paragraphs: Vec<String>,
}

impl NormalizedDocument {
    /// Re-join the paragraphs with the canonical blank-line separator.
    pub fn to_text(&self) -> String {
        self.paragraphs.join(PARAGRAPH_SEPARATOR)
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }
}

/// Concatenate page texts in order, separated per `separator`.
pub fn join_pages(pages: &[ExtractedPage], separator: &PageSeparator) -> String {
    let mut out = String::with_capacity(pages.iter().map(|p| p.text.len() + 2).sum());
    for page in pages {
        out.push_str(&separator.render(page.index));
        out.push_str(&page.text);
    }
    out
}

/// Split `text` into trimmed, non-empty paragraphs.
pub fn normalize(text: &str) -> NormalizedDocument {
    let text = normalise_line_endings(text);
    NormalizedDocument {
        paragraphs: split_blocks(&text).map(str::to_string).collect(),
    }
}

pub(crate) fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

/// Blank-line block splitter shared with the markup renderer.
///
/// Expects LF line endings. Yields trimmed, non-empty segments in order.
pub(crate) fn split_blocks(text: &str) -> impl Iterator<Item = &str> + '_ {
    RE_BLANK_RUN
        .split(text)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}
