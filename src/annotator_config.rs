//! Typed access to per-annotator config sections.
//!
//! Annotator sections live at the top level of the config file
//! (`[add-lines]`, `[remove-lines]`) and deserialize into per-annotator
//! config structs; a missing or invalid section falls back to defaults.

use crate::config::Config;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub trait AnnotatorConfig: Default + Serialize + DeserializeOwned {
    /// Top-level config section name for this annotator
    const SECTION: &'static str;
}

pub fn load_annotator_config<T: AnnotatorConfig>(config: &Config) -> T {
    match config.annotators.get(T::SECTION) {
        Some(table) => match table.clone().try_into() {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("Invalid [{}] config section ({e}), using defaults", T::SECTION);
                T::default()
            }
        },
        None => T::default(),
    }
}

/// Default section content for `config --defaults`, skipped when empty.
pub fn default_section<T: AnnotatorConfig>() -> Option<(String, toml::Value)> {
    let value = toml::Value::try_from(T::default()).ok()?;
    match value {
        toml::Value::Table(table) if !table.is_empty() => {
            Some((T::SECTION.to_string(), toml::Value::Table(table)))
        }
        _ => None,
    }
}
