//! Optional per-module manifest parsing.
//!
//! A module directory may carry a `mod.toml` describing the module's
//! identity and the modules it expects to be present. Manifests are
//! advisory: a missing or malformed manifest never blocks the module from
//! loading.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// File name of the optional per-module manifest.
pub const MANIFEST_FILE: &str = "mod.toml";

/// Errors from reading a `mod.toml`. Only ever logged; manifest problems
/// do not propagate.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest is not valid TOML.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Manifest parsed but a required field is empty.
    #[error("Invalid manifest: {0}")]
    Invalid(String),
}

/// Parsed `mod.toml` contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModManifest {
    /// Module metadata.
    #[serde(rename = "mod")]
    pub module: ModMetadata,

    /// IDs of modules this one expects to be loaded.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Module metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModMetadata {
    /// Unique identifier.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Version string.
    pub version: String,

    /// Module description.
    #[serde(default)]
    pub description: Option<String>,
}

impl ModManifest {
    /// Load a manifest from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a manifest from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let manifest: ModManifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.module.id.is_empty() {
            return Err(ManifestError::Invalid(
                "Module ID cannot be empty".to_string(),
            ));
        }

        if self.module.version.is_empty() {
            return Err(ManifestError::Invalid(
                "Module version cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
