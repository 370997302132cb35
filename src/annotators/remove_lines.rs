use crate::annotator::{AnnotateResult, Annotator};
use crate::annotator_config::{AnnotatorConfig, default_section, load_annotator_config};
use crate::annotators::line_marking::apply_line_marking;
use crate::config::Config;
use crate::document::DocumentContext;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RemoveLinesConfig {
    /// Attribute naming the lines to mark as removed
    #[serde(default = "default_attribute")]
    pub attribute: String,
    /// Class set on the marker elements
    #[serde(default = "default_class")]
    pub class: String,
}

fn default_attribute() -> String {
    "remove-lines".to_string()
}

fn default_class() -> String {
    "remove".to_string()
}

impl Default for RemoveLinesConfig {
    fn default() -> Self {
        Self {
            attribute: default_attribute(),
            class: default_class(),
        }
    }
}

impl AnnotatorConfig for RemoveLinesConfig {
    const SECTION: &'static str = "remove-lines";
}

#[derive(Clone, Default)]
pub struct RemoveLines {
    config: RemoveLinesConfig,
}

impl RemoveLines {
    pub fn new() -> Self {
        Self {
            config: RemoveLinesConfig::default(),
        }
    }

    pub fn from_config_struct(config: RemoveLinesConfig) -> Self {
        Self { config }
    }
}

impl Annotator for RemoveLines {
    fn name(&self) -> &'static str {
        "remove-lines"
    }

    fn description(&self) -> &'static str {
        "Wrap removed lines of annotated code blocks in marker elements"
    }

    fn attribute(&self) -> &str {
        &self.config.attribute
    }

    fn marker_class(&self) -> &str {
        &self.config.class
    }

    fn apply(&self, ctx: &DocumentContext) -> AnnotateResult {
        apply_line_marking(ctx, &self.config.attribute, &self.config.class, self.name())
    }

    fn from_config(config: &Config) -> Box<dyn Annotator>
    where
        Self: Sized,
    {
        Box::new(Self::from_config_struct(load_annotator_config::<RemoveLinesConfig>(
            config,
        )))
    }

    fn default_config_section(&self) -> Option<(String, toml::Value)> {
        default_section::<RemoveLinesConfig>()
    }
}
