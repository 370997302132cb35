//! Owned node-list model of a code block's `<pre>` content.
//!
//! A rendered code block is a flat run of text and highlighter token spans.
//! This module tokenizes that markup into an ordered sequence of owned nodes,
//! lets the splitter rearrange them, and serializes the result back out.
//! Entities are carried verbatim so a parse/serialize round trip never
//! changes the visible text.

use regex::Regex;
use std::sync::LazyLock;

static START_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^<([a-zA-Z][a-zA-Z0-9-]*)((?:"[^"]*"|'[^']*'|[^>"'])*)>"#).unwrap());

static TAG_STRIP_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Elements that never have a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// How an element was written in the source, which decides how it closes on
/// the way back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Normal,
    Void,
    SelfClosing,
}

/// One highlighter token span. `inner` is the raw markup between the tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: String,
    pub inner: String,
    pub kind: ElementKind,
}

/// A wrapper element owning the nodes of one physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub tag: String,
    pub class: String,
    pub children: Vec<Node>,
}

/// A direct child of the `<pre>` container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
    Marker(Marker),
}

impl Node {
    /// Visible text of this node. Tags inside an element are stripped;
    /// entities stay encoded (they never contain newlines, and keeping them
    /// raw makes round trips exact).
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(element) => match element.kind {
                ElementKind::Normal => TAG_STRIP_REGEX.replace_all(&element.inner, "").into_owned(),
                ElementKind::Void | ElementKind::SelfClosing => String::new(),
            },
            Node::Marker(marker) => marker.children.iter().map(Node::text_content).collect(),
        }
    }

    /// Shallow clone carrying `text` as the node's entire content. Mirrors
    /// `cloneNode(false)` + `textContent = ...`: element tag and attributes
    /// survive, nested markup does not.
    pub fn with_text(&self, text: String) -> Node {
        match self {
            Node::Element(element) => Node::Element(Element {
                tag: element.tag.clone(),
                attrs: element.attrs.clone(),
                inner: text,
                kind: element.kind,
            }),
            Node::Text(_) | Node::Marker(_) => Node::Text(text),
        }
    }
}

/// True when `tag` is a plain ASCII element name usable for markers.
pub fn is_valid_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Tokenize a `<pre>`'s inner HTML into an ordered node list.
///
/// Anything that is not a recognizable element start tag (stray `<`,
/// orphaned close tags) is kept as literal text, so serialization reproduces
/// the input byte for byte.
pub fn parse_nodes(html: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut text = String::new();
    let mut rest = html;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            text.push_str(rest);
            break;
        };
        text.push_str(&rest[..lt]);
        rest = &rest[lt..];

        let Some(caps) = START_TAG_REGEX.captures(rest) else {
            // '<' that does not open a tag is literal text
            text.push('<');
            rest = &rest[1..];
            continue;
        };

        if !text.is_empty() {
            nodes.push(Node::Text(std::mem::take(&mut text)));
        }

        let whole = caps.get(0).map_or(0, |m| m.end());
        let tag = caps.get(1).map_or("", |m| m.as_str());
        let attrs = caps.get(2).map_or("", |m| m.as_str());
        let after = &rest[whole..];

        if let Some(stripped) = attrs.strip_suffix('/') {
            nodes.push(Node::Element(Element {
                tag: tag.to_string(),
                attrs: stripped.to_string(),
                inner: String::new(),
                kind: ElementKind::SelfClosing,
            }));
            rest = after;
        } else if VOID_TAGS.contains(&tag.to_ascii_lowercase().as_str()) {
            nodes.push(Node::Element(Element {
                tag: tag.to_string(),
                attrs: attrs.to_string(),
                inner: String::new(),
                kind: ElementKind::Void,
            }));
            rest = after;
        } else {
            let (inner, next) = match find_matching_close(after, tag) {
                Some((inner_end, close_end)) => (&after[..inner_end], &after[close_end..]),
                // Unterminated element: everything that follows is its content
                None => (after, ""),
            };
            nodes.push(Node::Element(Element {
                tag: tag.to_string(),
                attrs: attrs.to_string(),
                inner: inner.to_string(),
                kind: ElementKind::Normal,
            }));
            rest = next;
        }
    }

    if !text.is_empty() {
        nodes.push(Node::Text(text));
    }
    nodes
}

/// Serialize a node list back to markup. Inverse of [`parse_nodes`] for
/// unmodified input.
pub fn serialize_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => match element.kind {
                ElementKind::Normal => {
                    out.push_str(&format!(
                        "<{tag}{attrs}>{inner}</{tag}>",
                        tag = element.tag,
                        attrs = element.attrs,
                        inner = element.inner
                    ));
                }
                ElementKind::Void => out.push_str(&format!("<{}{}>", element.tag, element.attrs)),
                ElementKind::SelfClosing => out.push_str(&format!("<{}{}/>", element.tag, element.attrs)),
            },
            Node::Marker(marker) => {
                out.push_str(&format!("<{} class=\"{}\">", marker.tag, marker.class));
                out.push_str(&serialize_nodes(&marker.children));
                out.push_str(&format!("</{}>", marker.tag));
            }
        }
    }
    out
}

/// Find the close tag matching an already-consumed open tag of `tag`,
/// counting nested opens of the same name. Returns (inner end, end of the
/// close tag), both relative to `s`.
pub(crate) fn find_matching_close(s: &str, tag: &str) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    let mut idx = 0usize;

    while let Some(off) = s[idx..].find('<') {
        let pos = idx + off;
        let rest = &s[pos..];

        if let Some(len) = close_tag_len(rest, tag) {
            depth -= 1;
            if depth == 0 {
                return Some((pos, pos + len));
            }
            idx = pos + len;
        } else if let Some(caps) = START_TAG_REGEX.captures(rest) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            let attrs = caps.get(2).map_or("", |m| m.as_str());
            if name.eq_ignore_ascii_case(tag) && !attrs.ends_with('/') {
                depth += 1;
            }
            idx = pos + caps.get(0).map_or(1, |m| m.end());
        } else {
            idx = pos + 1;
        }
    }
    None
}

/// Length of a `</tag>` close tag at the start of `s`, if present.
fn close_tag_len(s: &str, tag: &str) -> Option<usize> {
    let rest = s.strip_prefix("</")?;
    let name = rest.get(..tag.len())?;
    if !name.eq_ignore_ascii_case(tag) {
        return None;
    }
    let after = &rest[tag.len()..];
    let trimmed = after.trim_start();
    if !trimmed.starts_with('>') {
        return None;
    }
    Some(2 + tag.len() + (after.len() - trimmed.len()) + 1)
}
