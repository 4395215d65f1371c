//! HTML rendering of a [`MarkupNode`] tree.
//!
//! All text is escaped, so nothing in an answer can turn into markup: the
//! only tags in the output are the ones emitted here.

use super::markup::{render, InlineRun, MarkupNode};

/// Render nodes as an HTML fragment, one block element per line.
pub fn to_html(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        if !out.is_empty() {
            out.push('\n');
        }
        match node {
            MarkupNode::Heading { level, text } => {
                let level = (*level).clamp(1, 6);
                out.push_str(&format!("<h{level}>{}</h{level}>", escape_html(text)));
            }
            MarkupNode::Paragraph { runs } => {
                out.push_str("<p>");
                push_runs(&mut out, runs);
                out.push_str("</p>");
            }
            MarkupNode::List { items } => {
                out.push_str("<ul>");
                for item in items {
                    out.push_str("<li>");
                    push_runs(&mut out, item);
                    out.push_str("</li>");
                }
                out.push_str("</ul>");
            }
        }
    }
    out
}

/// Parse `text` and render it as HTML.
///
/// ```rust
/// use docsift::answer::render_html;
///
/// assert_eq!(render_html("# Hi\n\n**a** <b>"), "<h1>Hi</h1>\n<p><strong>a</strong> &lt;b&gt;</p>");
/// ```
pub fn render_html(text: &str) -> String {
    to_html(&render(text))
}

fn push_runs(out: &mut String, runs: &[InlineRun]) {
    for run in runs {
        match run {
            InlineRun::Plain(t) => out.push_str(&escape_html(t).replace('\n', "<br />")),
            InlineRun::Bold(t) => {
                out.push_str("<strong>");
                out.push_str(&escape_html(t).replace('\n', "<br />"));
                out.push_str("</strong>");
            }
            InlineRun::Italic(t) => {
                out.push_str("<em>");
                out.push_str(&escape_html(t).replace('\n', "<br />"));
                out.push_str("</em>");
            }
            InlineRun::Code(t) => {
                out.push_str("<code>");
                out.push_str(&escape_html(t));
                out.push_str("</code>");
            }
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
