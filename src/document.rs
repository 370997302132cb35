//! Document scanning: locate annotated code blocks and the spans the
//! annotators rewrite.
//!
//! The document is parsed once per annotator pass and the resulting context
//! is shared, so the per-block work (attribute lookup, last-`<pre>` inner
//! span) is done in one place.

use crate::config::MarkupConfig;
use crate::node::find_matching_close;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<([a-zA-Z][a-zA-Z0-9-]*)((?:"[^"]*"|'[^']*'|[^>"'])*)>"#).unwrap());

static ATTR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\s*)([a-zA-Z_:][-a-zA-Z0-9_:.]*)((?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>/"']*))?)"#).unwrap()
});

/// One attribute of a code block's open tag. `span` is absolute in the
/// document and includes the attribute's leading whitespace, so removing the
/// span consumes the attribute cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpan {
    pub name: String,
    pub value: String,
    pub span: Range<usize>,
}

/// A code block carrying the configured block class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// 1-based line of the open tag, for reporting
    pub line: usize,
    pub open_tag_span: Range<usize>,
    pub attributes: Vec<AttributeSpan>,
    /// Inner span of the last `<pre>` descendant, the annotation target.
    /// Blocks may carry a line-number gutter in an earlier `<pre>`, which is
    /// why only the last one is targeted. `None` when the block has no
    /// `<pre>` at all.
    pub pre_inner_span: Option<Range<usize>>,
}

impl CodeBlock {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpan> {
        self.attributes.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

/// Parsed view of one document, shared by all annotators in a pass.
#[derive(Debug)]
pub struct DocumentContext<'a> {
    pub content: &'a str,
    pub code_blocks: Vec<CodeBlock>,
    /// Element name used for marker wrappers, from `[markup]`
    pub marker_tag: String,
}

impl<'a> DocumentContext<'a> {
    pub fn new(content: &'a str, markup: &MarkupConfig) -> Self {
        let mut code_blocks = Vec::new();

        for caps in TAG_REGEX.captures_iter(content) {
            let whole = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let tag = caps.get(1).map_or("", |m| m.as_str());
            let attrs_match = match caps.get(2) {
                Some(m) => m,
                None => continue,
            };

            let attributes = parse_attributes(attrs_match.as_str(), attrs_match.start());
            let is_block = attributes.iter().any(|a| {
                a.name.eq_ignore_ascii_case("class") && a.value.split_whitespace().any(|c| c == markup.block_class)
            });
            if !is_block {
                continue;
            }

            let line = content[..whole.start()].bytes().filter(|&b| b == b'\n').count() + 1;
            let inner_end = match find_matching_close(&content[whole.end()..], tag) {
                Some((inner_end, _)) => whole.end() + inner_end,
                None => content.len(),
            };
            let block_inner = &content[whole.end()..inner_end];
            let pre_inner_span =
                last_pre_inner(block_inner).map(|r| whole.end() + r.start..whole.end() + r.end);

            code_blocks.push(CodeBlock {
                line,
                open_tag_span: whole.range(),
                attributes,
                pre_inner_span,
            });
        }

        Self {
            content,
            code_blocks,
            marker_tag: markup.marker_tag.clone(),
        }
    }
}

/// Parse the attribute region of an open tag. `offset` is the region's
/// absolute position, baked into the returned spans.
fn parse_attributes(attrs: &str, offset: usize) -> Vec<AttributeSpan> {
    let mut out = Vec::new();
    for caps in ATTR_REGEX.captures_iter(attrs) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        let name = caps.get(2).map_or("", |m| m.as_str());
        let raw_value = caps.get(3).map_or("", |m| m.as_str());
        out.push(AttributeSpan {
            name: name.to_string(),
            value: unquote_value(raw_value),
            span: offset + whole.start()..offset + whole.end(),
        });
    }
    out
}

/// Strip the `=` and surrounding quotes from a raw attribute value part.
/// A bare attribute (no `=`) has the empty value, like the DOM reports it.
fn unquote_value(raw: &str) -> String {
    let Some(eq) = raw.find('=') else {
        return String::new();
    };
    let value = raw[eq + 1..].trim_start();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);
    value.to_string()
}

/// Inner span of the last `<pre>` open tag in the block, relative to the
/// block's inner markup.
fn last_pre_inner(block_inner: &str) -> Option<Range<usize>> {
    let mut last_open_end = None;
    for caps in TAG_REGEX.captures_iter(block_inner) {
        let tag = caps.get(1).map_or("", |m| m.as_str());
        if !tag.eq_ignore_ascii_case("pre") {
            continue;
        }
        let attrs = caps.get(2).map_or("", |m| m.as_str());
        if attrs.ends_with('/') {
            continue;
        }
        last_open_end = caps.get(0).map(|m| m.end());
    }

    let start = last_open_end?;
    let end = match find_matching_close(&block_inner[start..], "pre") {
        Some((inner_end, _)) => start + inner_end,
        None => block_inner.len(),
    };
    Some(start..end)
}
