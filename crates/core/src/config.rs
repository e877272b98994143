//! Build configuration.
//!
//! An immutable snapshot of the options a caller can set for one generation
//! run: destination namespaces, the ordered list of extension activation
//! tags, and the optional global fallback extensions. Loaded from TOML or
//! built in code; `Configuration::default()` mirrors the defaults a bare
//! invocation gets.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{GenerationError, Result};

/// Immutable configuration for a single generation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Destination namespace for generated type artifacts.
    pub model_package: String,
    /// Destination namespace for generated resource artifacts.
    pub resource_package: String,
    /// Destination namespace for generated support artifacts.
    pub support_package: String,
    /// Ordered extension activation tags. Recognized tags activate the
    /// corresponding built-in extension; unrecognized tags are ignored.
    pub type_extension_tags: Vec<String>,
    /// Extension identifier used as the global fallback for creation events
    /// on synthetic model nodes.
    pub default_creation_extension: Option<String>,
    /// Extension identifier used as the global fallback for finish events
    /// on synthetic model nodes.
    pub default_finish_extension: Option<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            model_package: "model".to_string(),
            resource_package: "resources".to_string(),
            support_package: "support".to_string(),
            type_extension_tags: Vec::new(),
            default_creation_extension: None,
            default_finish_extension: None,
        }
    }
}

impl Configuration {
    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|err| GenerationError::Config(format!("failed to parse configuration: {err}")))
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            GenerationError::Config(format!(
                "failed to read configuration file {}: {err}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&contents)
    }
}
