//! The `Annotator` trait and its result types.

use crate::config::Config;
use crate::document::DocumentContext;
use dyn_clone::DynClone;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotateError {
    /// Marker tags must be plain element names; anything else would corrupt
    /// the rewritten markup.
    #[error("invalid marker tag {tag:?}")]
    InvalidMarkerTag { tag: String },

    /// Marker classes are emitted inside a double-quoted attribute and must
    /// not contain quote or angle-bracket characters.
    #[error("invalid marker class {class:?}")]
    InvalidMarkerClass { class: String },
}

pub type AnnotateResult = Result<AnnotateOutput, AnnotateError>;

/// What one annotator did to one document.
#[derive(Debug, Clone, Default)]
pub struct AnnotateOutput {
    /// Rewritten document, or `None` when nothing changed
    pub content: Option<String>,
    pub annotations: Vec<Annotation>,
}

/// Record of one processed code block, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// 1-based line of the code block's open tag in the source document
    pub line: usize,
    /// Attribute that was consumed
    pub attribute: String,
    /// Number of physical lines wrapped in markers
    pub lines_marked: usize,
    /// Name of the annotator that produced this record
    pub annotator: String,
}

/// One attribute-driven line-marking pass over a document.
///
/// Implementations are pure over the shared [`DocumentContext`]: they never
/// touch the filesystem, and `apply` returns the rewritten document instead
/// of mutating in place.
pub trait Annotator: DynClone + Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Attribute that triggers this annotator on a code block
    fn attribute(&self) -> &str;

    /// Class set on the marker elements this annotator produces
    fn marker_class(&self) -> &str;

    fn apply(&self, ctx: &DocumentContext) -> AnnotateResult;

    fn from_config(config: &Config) -> Box<dyn Annotator>
    where
        Self: Sized;

    fn default_config_section(&self) -> Option<(String, toml::Value)> {
        None
    }
}

dyn_clone::clone_trait_object!(Annotator);
