//! Parser for `.litdoc.yml` language config files.
//!
//! Declares comment syntax for languages missing from the built-in table.
//!
//! Format:
//! ```yaml
//! languages:
//!   .cql:
//!     name: cql
//!     symbol: "--"
//!     multistart: "/*"
//!     multiend: "*/"
//!     definitions:
//!       - "CREATE "
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::LanguageDescriptor;
use crate::error::{LitdocError, Result};

/// Name of the language config file looked up in the working directory
pub const CONFIG_FILENAME: &str = ".litdoc.yml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Comment syntax keyed by extension (leading dot optional)
    #[serde(default)]
    pub languages: BTreeMap<String, LanguageEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageEntry {
    /// Highlighter grammar name
    pub name: String,

    /// Line comment token
    pub symbol: Option<String>,

    pub multistart: Option<String>,

    pub multiend: Option<String>,

    /// Line prefixes that start a new section
    #[serde(default)]
    pub definitions: Vec<String>,

    pub decorator: Option<String>,

    /// Markers after `symbol` that make a doc comment (`/` for `///`)
    #[serde(default)]
    pub doc_markers: Vec<String>,
}

impl LanguageConfig {
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| LitdocError::Config(format!("Invalid language config YAML: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Loads `path` when given, else `.litdoc.yml` from `dir` if present.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = dir.join(CONFIG_FILENAME);
                if default.is_file() {
                    tracing::debug!("Loading language config from {}", default.display());
                    Self::load(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn descriptors(&self) -> Result<Vec<LanguageDescriptor>> {
        self.languages
            .iter()
            .map(|(ext, entry)| entry.to_descriptor(ext))
            .collect()
    }
}

impl LanguageEntry {
    fn to_descriptor(&self, extension: &str) -> Result<LanguageDescriptor> {
        if self.symbol.is_none() && self.multistart.is_none() {
            return Err(LitdocError::Config(format!(
                "Language '{}' ({}) declares no comment syntax",
                self.name, extension
            )));
        }

        let mut descriptor = LanguageDescriptor::new(extension, &self.name, self.symbol.as_deref());
        descriptor = match (&self.multistart, &self.multiend) {
            (Some(start), Some(end)) => descriptor.with_block(start, end),
            (None, None) => descriptor,
            _ => {
                return Err(LitdocError::Config(format!(
                    "Language '{}' ({}) must declare both multistart and multiend",
                    self.name, extension
                )))
            }
        };
        descriptor.definition_prefixes = self.definitions.clone();
        descriptor.decorator_prefix = self.decorator.clone();
        descriptor.doc_markers = self.doc_markers.clone();

        Ok(descriptor)
    }
}
