//! Shared marking routine behind both annotators.

use crate::annotator::{AnnotateError, AnnotateOutput, AnnotateResult, Annotation};
use crate::document::DocumentContext;
use crate::line_set::LineSet;
use crate::node::{is_valid_tag_name, parse_nodes, serialize_nodes};
use crate::splitter::{count_marked, mark_lines};
use std::ops::Range;

struct Edit {
    span: Range<usize>,
    replacement: String,
}

/// Process every code block carrying `attribute`: wrap the named lines of
/// the block's last `<pre>` in markers and consume the attribute.
///
/// An empty attribute value leaves the block untouched, attribute included,
/// so the caller can supply the value later. A non-empty value is always
/// consumed, even when none of its lines exist in the block: the block has
/// been processed exactly once either way.
pub(crate) fn apply_line_marking(
    ctx: &DocumentContext,
    attribute: &str,
    marker_class: &str,
    annotator: &str,
) -> AnnotateResult {
    if !is_valid_tag_name(&ctx.marker_tag) {
        return Err(AnnotateError::InvalidMarkerTag {
            tag: ctx.marker_tag.clone(),
        });
    }
    if marker_class.contains(['"', '<', '>']) {
        return Err(AnnotateError::InvalidMarkerClass {
            class: marker_class.to_string(),
        });
    }

    let mut edits: Vec<Edit> = Vec::new();
    let mut annotations = Vec::new();

    for block in &ctx.code_blocks {
        let Some(attr) = block.attribute(attribute) else {
            continue;
        };
        if attr.value.is_empty() {
            continue;
        }
        let Some(pre_span) = &block.pre_inner_span else {
            log::warn!("code block at line {} has no <pre> content, skipping", block.line);
            continue;
        };

        // Nested annotated blocks share bytes with an already-queued rewrite;
        // leave them for a later run, their attributes survive the rewrite.
        if edits
            .iter()
            .any(|e| e.span.start < pre_span.end && pre_span.start < e.span.end)
        {
            log::warn!(
                "code block at line {} is nested inside another annotated block, deferring",
                block.line
            );
            continue;
        }

        let line_set = LineSet::parse(&attr.value);
        let inner = &ctx.content[pre_span.clone()];
        let marked = mark_lines(parse_nodes(inner), &line_set, &ctx.marker_tag, marker_class);
        let lines_marked = count_marked(&marked);
        let new_inner = serialize_nodes(&marked);

        edits.push(Edit {
            span: attr.span.clone(),
            replacement: String::new(),
        });
        if new_inner != inner {
            edits.push(Edit {
                span: pre_span.clone(),
                replacement: new_inner,
            });
        }
        annotations.push(Annotation {
            line: block.line,
            attribute: attribute.to_string(),
            lines_marked,
            annotator: annotator.to_string(),
        });
    }

    if edits.is_empty() {
        return Ok(AnnotateOutput {
            content: None,
            annotations,
        });
    }

    // Back to front so earlier spans stay valid
    edits.sort_by(|a, b| b.span.start.cmp(&a.span.start));
    let mut content = ctx.content.to_string();
    for edit in edits {
        content.replace_range(edit.span, &edit.replacement);
    }

    Ok(AnnotateOutput {
        content: Some(content),
        annotations,
    })
}
