pub mod annotator;
pub mod annotator_config;
pub mod annotators;
pub mod config;
pub mod document;
pub mod exit_codes;
pub mod line_set;
pub mod node;
pub mod splitter;

pub use annotator::{AnnotateError, AnnotateOutput, Annotation, Annotator};
pub use annotators::{AddLines, RemoveLines};
pub use document::DocumentContext;
pub use line_set::LineSet;

use config::MarkupConfig;

/// Outcome of one full pass over one document.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutcome {
    /// Final document text (equal to the input when nothing changed)
    pub content: String,
    pub changed: bool,
    pub annotations: Vec<Annotation>,
}

/// Cheap pre-check before any real parsing: a document that never mentions
/// the block class or any trigger attribute cannot contain work.
fn has_candidate_blocks(content: &str, annotators: &[Box<dyn Annotator>], markup: &MarkupConfig) -> bool {
    content.contains(markup.block_class.as_str()) && annotators.iter().any(|a| content.contains(a.attribute()))
}

/// Run every annotator over one document.
///
/// The document is re-scanned between annotators since each pass may have
/// rewritten it. Blocks whose trigger attribute has already been consumed
/// are skipped by construction, so re-running the pipeline over its own
/// output is a no-op.
pub fn process_content(
    content: &str,
    annotators: &[Box<dyn Annotator>],
    markup: &MarkupConfig,
) -> Result<ProcessOutcome, AnnotateError> {
    let mut outcome = ProcessOutcome {
        content: content.to_string(),
        changed: false,
        annotations: Vec::new(),
    };

    if content.is_empty() || !has_candidate_blocks(content, annotators, markup) {
        return Ok(outcome);
    }

    for annotator in annotators {
        if !outcome.content.contains(annotator.attribute()) {
            log::debug!("Skipping {}: trigger attribute absent", annotator.name());
            continue;
        }

        let output = {
            let ctx = DocumentContext::new(&outcome.content, markup);
            annotator.apply(&ctx)?
        };
        outcome.annotations.extend(output.annotations);
        if let Some(new_content) = output.content {
            outcome.content = new_content;
            outcome.changed = true;
        }
    }

    Ok(outcome)
}
