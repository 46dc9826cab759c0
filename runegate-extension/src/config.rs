//! Bridge configuration loading.
//!
//! The extension reads `<install-root>/bridge.toml`. Configuration is
//! advisory: a missing file gets a documented default written next to the
//! mods directory, and an unreadable or invalid file falls back to defaults
//! with a warning. Configuration problems never disable the bridge.

use anyhow::{Context, Result};
use runegate_hosting::HostPaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of the bridge configuration, directly under the install root.
pub const CONFIG_FILE: &str = "bridge.toml";

/// Environment override for the install root location.
pub const ROOT_ENV: &str = "RUNEGATE_ROOT";

/// Default install root, relative to the host process working directory.
const DEFAULT_INSTALL_ROOT: &str = "runegate";

/// Parsed `bridge.toml` contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    /// Bridge behavior
    #[serde(default)]
    pub bridge: BridgeSection,
    /// Install-root-relative paths
    #[serde(default)]
    pub paths: PathsSection,
}

/// Bridge behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeSection {
    /// Log filter used when `RUST_LOG` is unset
    /// Default: "info"
    pub log_level: String,
}

/// Filesystem layout settings, resolved against the install root unless
/// absolute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsSection {
    /// Mods directory
    /// Default: "mods"
    pub mods_dir: PathBuf,
    /// Runtime configuration artifact handed to the backend
    /// Default: "interop/runegate.runtimeconfig.json"
    pub runtime_config: PathBuf,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bridge: BridgeSection::default(),
            paths: PathsSection::default(),
        }
    }
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            mods_dir: PathBuf::from("mods"),
            runtime_config: PathBuf::from("interop/runegate.runtimeconfig.json"),
        }
    }
}

impl BridgeConfig {
    /// The install root: `$RUNEGATE_ROOT` when set, otherwise `runegate/`
    /// under the host process working directory.
    pub fn install_root() -> PathBuf {
        match std::env::var_os(ROOT_ENV) {
            Some(root) if !root.is_empty() => PathBuf::from(root),
            _ => PathBuf::from(DEFAULT_INSTALL_ROOT),
        }
    }

    /// Load configuration from the specified path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: BridgeConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `<install-root>/bridge.toml`, falling back to defaults.
    ///
    /// When the install root exists but carries no configuration, a default
    /// file with documented comments is written for the user to edit. No
    /// directories are created; the loader that installed the bridge owns
    /// the layout.
    pub fn load_or_default(install_root: &Path) -> Self {
        let path = install_root.join(CONFIG_FILE);

        if !path.exists() {
            if install_root.is_dir() {
                if let Err(e) = fs::write(&path, Self::default_config_content()) {
                    debug!(path = %path.display(), error = %e, "could not write default config");
                } else {
                    info!(path = %path.display(), "created default configuration file");
                }
            }
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => {
                info!(path = %path.display(), "configuration loaded");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.bridge.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log_level: {}. Must be one of: {}",
                self.bridge.log_level,
                valid_log_levels.join(", ")
            );
        }

        Ok(())
    }

    /// The mods directory, resolved against the install root.
    pub fn mods_dir(&self, install_root: &Path) -> PathBuf {
        resolve(install_root, &self.paths.mods_dir)
    }

    /// The runtime configuration artifact, resolved against the install
    /// root.
    pub fn runtime_config(&self, install_root: &Path) -> PathBuf {
        resolve(install_root, &self.paths.runtime_config)
    }

    /// The filesystem inputs handed to the hosting layer.
    pub fn host_paths(&self, install_root: &Path) -> HostPaths {
        HostPaths {
            install_root: install_root.to_path_buf(),
            runtime_config: self.runtime_config(install_root),
        }
    }

    /// Generate the default configuration file content with comments.
    fn default_config_content() -> String {
        r#"# Runegate Bridge Configuration
# This file configures the bridge extension loaded into the host process.

[bridge]
# Log filter used when RUST_LOG is unset: trace, debug, info, warn, error
# Default: "info"
log_level = "info"

[paths]
# Paths are resolved against the install root unless absolute.

# Directory scanned for mods; each mod lives in its own subdirectory
# holding a module artifact named after it.
# Default: "mods"
mods_dir = "mods"

# Runtime configuration artifact handed to the managed runtime at startup.
# Default: "interop/runegate.runtimeconfig.json"
runtime_config = "interop/runegate.runtimeconfig.json"
"#
        .to_string()
    }
}

fn resolve(install_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        install_root.join(path)
    }
}
