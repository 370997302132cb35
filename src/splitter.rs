//! Single-pass line splitter and marker.
//!
//! Walks a code block's node list in document order, decomposes nodes that
//! span newline boundaries into one sub-node per physical line, and wraps
//! every line named in the [`LineSet`] in a fresh marker element. Text is
//! never added, removed, or reordered; only structure changes.

use crate::line_set::LineSet;
use crate::node::{Marker, Node};

/// Wrap the physical lines named in `lines` in marker elements.
///
/// Lines are counted 1-based and a line is only closed (and therefore only
/// markable) by a newline; the trailing partial line stays unwrapped. Each
/// line is wrapped at most once regardless of duplicates in the set.
pub fn mark_lines(nodes: Vec<Node>, lines: &LineSet, marker_tag: &str, marker_class: &str) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    // Index into `out` of the first node of the line currently being assembled
    let mut line_start = 0usize;
    let mut lineno = 1usize;

    for node in nodes {
        let text = node.text_content();
        let segments: Vec<&str> = text.split('\n').collect();
        if segments.len() == 1 {
            // No newline: the node stays in place; a later split may still
            // collect it into that line's marker.
            out.push(node);
            continue;
        }

        let newline_count = segments.len() - 1;
        for (i, segment) in segments.iter().enumerate() {
            let mut piece = (*segment).to_string();
            if i != newline_count {
                piece.push('\n');
            }
            out.push(node.with_text(piece));

            if i != newline_count {
                if lines.contains(lineno) {
                    // Collect every node of this line, from the line start
                    // through the line-ending sub-node, into the marker.
                    let children: Vec<Node> = out.drain(line_start..).collect();
                    out.push(Node::Marker(Marker {
                        tag: marker_tag.to_string(),
                        class: marker_class.to_string(),
                        children,
                    }));
                }
                line_start = out.len();
                lineno += 1;
            }
        }
    }

    out
}

/// Number of top-level marker elements, i.e. lines wrapped by one pass.
pub fn count_marked(nodes: &[Node]) -> usize {
    nodes.iter().filter(|n| matches!(n, Node::Marker(_))).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{parse_nodes, serialize_nodes};

    fn mark(html: &str, lines: &[usize]) -> String {
        let set: LineSet = lines.iter().copied().collect();
        serialize_nodes(&mark_lines(parse_nodes(html), &set, "span", "add"))
    }

    fn text_of(nodes: &[Node]) -> String {
        nodes.iter().map(Node::text_content).collect()
    }

    #[test]
    fn test_wrap_single_line() {
        let out = mark("line1\nline2\nline3\n", &[2]);
        assert_eq!(out, "line1\n<span class=\"add\">line2\n</span>line3\n");
    }

    #[test]
    fn test_no_newlines_no_markers() {
        let html = "just one line without a terminator";
        assert_eq!(mark(html, &[1]), html);
    }

    #[test]
    fn test_trailing_partial_line_never_wrapped() {
        let out = mark("a\nb", &[1, 2]);
        assert_eq!(out, "<span class=\"add\">a\n</span>b");
    }

    #[test]
    fn test_line_spanning_multiple_nodes() {
        // Second line starts in one text node and is closed by another
        let out = mark("line1\nli", &[2]);
        // "li" has no newline yet, so nothing is wrapped
        assert_eq!(out, "line1\nli");

        let nodes = parse_nodes("line1\nli");
        let mut nodes = nodes;
        nodes.extend(parse_nodes("ne2\nline3\n"));
        let set: LineSet = [2].into_iter().collect();
        let marked = mark_lines(nodes, &set, "span", "add");
        let out = serialize_nodes(&marked);
        assert_eq!(out, "line1\n<span class=\"add\">line2\n</span>line3\n");
    }

    #[test]
    fn test_two_text_nodes_line_set_two() {
        // End-to-end scenario: nodes "line1\nline2\n" and "line3", set {2}
        let mut nodes = parse_nodes("line1\nline2\n");
        nodes.extend(parse_nodes("line3"));
        let set: LineSet = [2].into_iter().collect();
        let marked = mark_lines(nodes, &set, "span", "add");
        assert_eq!(count_marked(&marked), 1);
        let out = serialize_nodes(&marked);
        assert_eq!(out, "line1\n<span class=\"add\">line2\n</span>line3");
    }

    #[test]
    fn test_duplicate_line_numbers_wrap_once() {
        let mut nodes = parse_nodes("a\nb\n");
        nodes = mark_lines(nodes, &[1, 1, 2].into_iter().collect(), "span", "remove");
        assert_eq!(count_marked(&nodes), 2);
        let out = serialize_nodes(&nodes);
        assert_eq!(
            out,
            "<span class=\"remove\">a\n</span><span class=\"remove\">b\n</span>"
        );
    }

    #[test]
    fn test_token_spans_split_preserving_attrs() {
        let html = "<span class=\"c\"># one\n# two\n</span>";
        let out = mark(html, &[2]);
        assert_eq!(
            out,
            "<span class=\"c\"># one\n</span><span class=\"add\"><span class=\"c\"># two\n</span></span><span class=\"c\"></span>"
        );
    }

    #[test]
    fn test_mixed_nodes_collected_into_marker() {
        // A keyword span without newline belongs to the line closed by the
        // following text node.
        let html = "<span class=\"k\">fn</span> main() {\nbody\n}\n";
        let out = mark(html, &[1]);
        assert_eq!(
            out,
            "<span class=\"add\"><span class=\"k\">fn</span> main() {\n</span>body\n}\n"
        );
    }

    #[test]
    fn test_text_preserved() {
        let html = "<span class=\"k\">let</span> a = 1;\n<span class=\"k\">let</span> b = 2;\nend";
        let before = text_of(&parse_nodes(html));
        for lines in [&[][..], &[1][..], &[2][..], &[1, 2][..], &[1, 2, 3, 99][..]] {
            let set: LineSet = lines.iter().copied().collect();
            let marked = mark_lines(parse_nodes(html), &set, "span", "remove");
            assert_eq!(text_of(&marked), before, "lines {lines:?}");
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(mark_lines(Vec::new(), &[1].into_iter().collect(), "span", "add").is_empty());
    }

    #[test]
    fn test_out_of_range_lines_ignored() {
        let html = "a\nb\n";
        assert_eq!(mark(html, &[9]), html);
    }
}
