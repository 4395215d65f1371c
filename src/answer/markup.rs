//! Lightweight markup → structural tree.
//!
//! The dialect is the subset of Markdown the answer backend actually
//! emits: `#` headings, `- ` bullet lists, `**bold**`, `*italic*` and
//! `` `code` ``. Parsing is total: every input maps to some node list, with
//! plain paragraphs and plain text as the fallback, so there is no error
//! path.
//!
//! ## Passes
//!
//! 1. **Block pass**: split on blank lines (the same splitter the
//!    normaliser uses), then classify each block as heading, list or
//!    paragraph.
//! 2. **Inline pass**: on paragraph text and list items. Code spans are
//!    cut out first and are never looked at again, so `` `a*b*c` `` stays
//!    code. Bold is matched next, then italic, each only inside the plain
//!    text left by the previous pass. Unmatched delimiters stay literal.

use crate::pipeline::normalize::{normalise_line_endings, split_blocks};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\*\*(.+?)\*\*").unwrap());
static RE_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());

/// A block-level node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkupNode {
    Heading { level: usize, text: String },
    Paragraph { runs: Vec<InlineRun> },
    List { items: Vec<Vec<InlineRun>> },
}

/// A span of inline text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum InlineRun {
    Plain(String),
    Bold(String),
    Italic(String),
    Code(String),
}

impl InlineRun {
    pub fn text(&self) -> &str {
        match self {
            InlineRun::Plain(t) | InlineRun::Bold(t) | InlineRun::Italic(t) | InlineRun::Code(t) => t,
        }
    }
}

/// Parse `text` into block nodes.
///
/// ```rust
/// use docsift::answer::{render, InlineRun, MarkupNode};
///
/// assert_eq!(
///     render("### Title"),
///     vec![MarkupNode::Heading { level: 3, text: "Title".into() }]
/// );
/// assert_eq!(
///     render("**bold**"),
///     vec![MarkupNode::Paragraph { runs: vec![InlineRun::Bold("bold".into())] }]
/// );
/// ```
pub fn render(text: &str) -> Vec<MarkupNode> {
    let text = normalise_line_endings(text);
    split_blocks(&text).map(classify_block).collect()
}

fn classify_block(block: &str) -> MarkupNode {
    if let Some((level, rest)) = heading(block) {
        return MarkupNode::Heading {
            level,
            text: rest.trim().to_string(),
        };
    }

    let items: Option<Vec<&str>> = block.lines().map(list_item).collect();
    if let Some(items) = items {
        return MarkupNode::List {
            items: items.into_iter().map(parse_inline).collect(),
        };
    }

    MarkupNode::Paragraph {
        runs: parse_inline(block),
    }
}

/// Item text when `line` is a `- ` bullet. A bare `-` is an empty item: block
/// trimming turns a trailing `- ` into `-`.
fn list_item(line: &str) -> Option<&str> {
    let line = line.trim();
    if line == "-" {
        return Some("");
    }
    line.strip_prefix("- ").map(str::trim)
}

/// `Some((level, rest))` when `block` opens with `#`s followed by a space.
fn heading(block: &str) -> Option<(usize, &str)> {
    let rest = block.trim_start_matches('#');
    let level = block.len() - rest.len();
    if level == 0 {
        return None;
    }
    rest.strip_prefix(' ').map(|text| (level, text))
}

/// Split inline text into runs: code, then bold, then italic.
pub fn parse_inline(text: &str) -> Vec<InlineRun> {
    let runs = vec![InlineRun::Plain(text.to_string())];
    let runs = extract_spans(runs, &RE_CODE, InlineRun::Code);
    let runs = extract_spans(runs, &RE_BOLD, InlineRun::Bold);
    extract_spans(runs, &RE_ITALIC, InlineRun::Italic)
}

/// Replace matches of `re` inside every plain run with `make(inner)`.
/// Non-plain runs pass through untouched; empty plain pieces are dropped.
fn extract_spans(runs: Vec<InlineRun>, re: &Regex, make: fn(String) -> InlineRun) -> Vec<InlineRun> {
    let mut out = Vec::with_capacity(runs.len());
    for run in runs {
        let InlineRun::Plain(text) = run else {
            out.push(run);
            continue;
        };

        let mut last = 0;
        for caps in re.captures_iter(&text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                out.push(InlineRun::Plain(text[last..whole.start()].to_string()));
            }
            out.push(make(inner.as_str().to_string()));
            last = whole.end();
        }
        if last < text.len() {
            out.push(InlineRun::Plain(text[last..].to_string()));
        }
    }
    out
}
