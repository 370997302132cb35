use crate::annotator::{AnnotateResult, Annotator};
use crate::annotator_config::{AnnotatorConfig, default_section, load_annotator_config};
use crate::annotators::line_marking::apply_line_marking;
use crate::config::Config;
use crate::document::DocumentContext;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct AddLinesConfig {
    /// Attribute naming the lines to mark as added
    #[serde(default = "default_attribute")]
    pub attribute: String,
    /// Class set on the marker elements
    #[serde(default = "default_class")]
    pub class: String,
}

fn default_attribute() -> String {
    "add-lines".to_string()
}

fn default_class() -> String {
    "add".to_string()
}

impl Default for AddLinesConfig {
    fn default() -> Self {
        Self {
            attribute: default_attribute(),
            class: default_class(),
        }
    }
}

impl AnnotatorConfig for AddLinesConfig {
    const SECTION: &'static str = "add-lines";
}

#[derive(Clone, Default)]
pub struct AddLines {
    config: AddLinesConfig,
}

impl AddLines {
    pub fn new() -> Self {
        Self {
            config: AddLinesConfig::default(),
        }
    }

    pub fn from_config_struct(config: AddLinesConfig) -> Self {
        Self { config }
    }
}

impl Annotator for AddLines {
    fn name(&self) -> &'static str {
        "add-lines"
    }

    fn description(&self) -> &'static str {
        "Wrap added lines of annotated code blocks in marker elements"
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
        Box::new(Self::from_config_struct(load_annotator_config::<AddLinesConfig>(config)))
    }

    fn default_config_section(&self) -> Option<(String, toml::Value)> {
        default_section::<AddLinesConfig>()
    }
}
