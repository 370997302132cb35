//!
//! This module defines configuration structures and loading logic for
//! linemark. Configuration is TOML: a `[global]` section for file selection,
//! a `[markup]` section for the HTML conventions of the rendered site, and
//! one top-level section per annotator (`[add-lines]`, `[remove-lines]`).

use crate::node::is_valid_tag_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file names probed in the working directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &[".linemark.toml", "linemark.toml"];

/// Top-level sections that belong to annotators; anything else top-level
/// (besides `[global]` and `[markup]`) draws a warning.
pub const ANNOTATOR_SECTIONS: &[&str] = &["add-lines", "remove-lines"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },
    #[error("invalid marker tag {tag:?} in [markup]")]
    InvalidMarkerTag { tag: String },
    #[error("[markup] block-class must not be empty")]
    EmptyBlockClass,
    #[error("invalid marker class {class:?} in [{section}]")]
    InvalidMarkerClass { section: String, class: String },
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Files to include
    #[serde(default)]
    pub include: Vec<String>,

    /// Files to exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Respect .gitignore files when scanning directories
    #[serde(default = "default_true", alias = "respect_gitignore")]
    pub respect_gitignore: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            respect_gitignore: true,
        }
    }
}

fn default_block_class() -> String {
    "highlighter-rouge".to_string()
}

fn default_marker_tag() -> String {
    "span".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct MarkupConfig {
    /// Class that marks an element as a highlighted code block
    #[serde(default = "default_block_class", alias = "block_class")]
    pub block_class: String,

    /// Element name used for marker wrappers
    #[serde(default = "default_marker_tag", alias = "marker_tag")]
    pub marker_tag: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            block_class: default_block_class(),
            marker_tag: default_marker_tag(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub markup: MarkupConfig,

    /// Per-annotator sections, keyed by section name
    #[serde(flatten)]
    pub annotators: BTreeMap<String, toml::Table>,

    /// Path the configuration was loaded from, if any
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration: an explicit path wins, otherwise the working
    /// directory is probed for the well-known file names, otherwise
    /// defaults. `isolated` skips files entirely.
    pub fn load(path: Option<&str>, isolated: bool) -> Result<Self, ConfigError> {
        if isolated {
            return Ok(Self::default());
        }

        if let Some(path) = path {
            return Self::from_file(Path::new(path));
        }

        for name in CONFIG_FILE_NAMES {
            let candidate = Path::new(name);
            if candidate.is_file() {
                return Self::from_file(candidate);
            }
        }

        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        config.loaded_from = Some(path.to_path_buf());
        config.validate()?;

        for key in config.annotators.keys() {
            if !ANNOTATOR_SECTIONS.contains(&key.as_str()) {
                log::warn!("Unknown config section [{key}] in {}, ignoring", path.display());
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.markup.block_class.trim().is_empty() {
            return Err(ConfigError::EmptyBlockClass);
        }
        if !is_valid_tag_name(&self.markup.marker_tag) {
            return Err(ConfigError::InvalidMarkerTag {
                tag: self.markup.marker_tag.clone(),
            });
        }
        // Marker classes end up inside a double-quoted class attribute
        for (section, table) in &self.annotators {
            if let Some(toml::Value::String(class)) = table.get("class") {
                if class.contains(['"', '<', '>']) {
                    return Err(ConfigError::InvalidMarkerClass {
                        section: section.clone(),
                        class: class.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Content written by `linemark init`.
pub fn default_config_content() -> String {
    r#"# linemark configuration
# https://github.com/linemark-dev/linemark

[global]
# Glob patterns of files to process (default: all .html/.htm/.xhtml files)
include = []
# Glob patterns of files or directories to skip
exclude = []
# Respect .gitignore files when scanning directories
respect-gitignore = true

[markup]
# Class that marks an element as a highlighted code block
block-class = "highlighter-rouge"
# Element name used for marker wrappers
marker-tag = "span"

[add-lines]
attribute = "add-lines"
class = "add"

[remove-lines]
attribute = "remove-lines"
class = "remove"
"#
    .to_string()
}

/// Create a default config file, refusing to overwrite an existing one.
pub fn create_default_config(path: &str) -> io::Result<()> {
    if Path::new(path).exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{path} already exists"),
        ));
    }
    fs::write(path, default_config_content())
}
