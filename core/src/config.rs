//! Config files for registry aliases and expander trees.
//!
//! Both file kinds are JSON when the path ends in `.json`, YAML otherwise.
//!
//! | File | Type | Loader |
//! |------|------|--------|
//! | registry aliases | [`RegistryConfig`] | [`RegistryConfig::from_path()`] |
//! | expander tree | [`ExpanderNode`] | [`load_node()`] |
//!
//! ```yaml
//! # registry.yaml
//! aliases:
//!   prefix: startsWith
//!   email: isEmail
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ExpanderError, ExpanderNode, ExpanderRegistry};

/// Name aliases to bind in an [`ExpanderRegistry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Expander name → implementation identifier.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl RegistryConfig {
    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::InvalidConfig`] if the document does not deserialize.
    pub fn from_json(text: &str) -> Result<Self, ExpanderError> {
        parse(text, Format::Json)
    }

    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::InvalidConfig`] if the document does not deserialize.
    pub fn from_yaml(text: &str) -> Result<Self, ExpanderError> {
        parse(text, Format::Yaml)
    }

    /// Read and parse a config file.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExpanderError> {
        read(path.as_ref())
    }

    /// Bind every alias through [`ExpanderRegistry::register`].
    ///
    /// Every identifier is checked against the catalog before any alias is
    /// bound, so a failing config leaves `registry` untouched.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::UnknownImplementation`] for the first identifier (in
    /// name order) missing from the implementation catalog.
    pub fn apply(&self, registry: &mut ExpanderRegistry) -> Result<(), ExpanderError> {
        if let Some(identifier) = self
            .aliases
            .values()
            .find(|identifier| !registry.has_implementation(identifier))
        {
            return Err(ExpanderError::UnknownImplementation {
                identifier: identifier.clone(),
            });
        }
        for (name, identifier) in &self.aliases {
            registry.register(name, identifier)?;
        }
        debug!(aliases = self.aliases.len(), "applied registry config");
        Ok(())
    }
}

/// Read an [`ExpanderNode`] tree from a JSON or YAML file.
///
/// # Errors
///
/// [`ExpanderError::InvalidConfig`] if the file cannot be read or parsed.
pub fn load_node(path: impl AsRef<Path>) -> Result<ExpanderNode, ExpanderError> {
    read(path.as_ref())
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

fn read<T: DeserializeOwned>(path: &Path) -> Result<T, ExpanderError> {
    let text = std::fs::read_to_string(path).map_err(|err| ExpanderError::InvalidConfig {
        message: format!("{}: {err}", path.display()),
    })?;
    parse(&text, Format::of(path)).map_err(|err| match err {
        ExpanderError::InvalidConfig { message } => ExpanderError::InvalidConfig {
            message: format!("{}: {message}", path.display()),
        },
        other => other,
    })
}

fn parse<T: DeserializeOwned>(text: &str, format: Format) -> Result<T, ExpanderError> {
    let parsed = match format {
        Format::Json => serde_json::from_str(text).map_err(|err| err.to_string()),
        Format::Yaml => serde_yaml::from_str(text).map_err(|err| err.to_string()),
    };
    parsed.map_err(|message| ExpanderError::InvalidConfig { message })
}
