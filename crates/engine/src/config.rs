//! Snapshot configuration via `fieldsnap.toml`
//!
//! Settings that the admin screen used to carry as form controls live in a
//! small TOML file next to the site fixture. A missing file means defaults.

use fieldsnap_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name looked up next to the site fixture.
pub const CONFIG_FILE_NAME: &str = "fieldsnap.toml";

/// Export settings, persisted under `[export]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportConfig {
    /// Prefix of generated export file names (`<prefix>-YYYY-MM-DD.json`)
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,
    /// Pretty-print exported documents
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_filename_prefix() -> String {
    "data-export".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename_prefix: default_filename_prefix(),
            pretty: true,
        }
    }
}

/// Configuration loaded from `fieldsnap.toml`.
///
/// # Example
///
/// ```toml
/// rollback_on_failure = true
/// event_logging = false
///
/// [export]
/// filename_prefix = "data-export"
/// pretty = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Undo already-applied writes when an import fails.
    #[serde(default = "default_true")]
    pub rollback_on_failure: bool,
    /// Show the full event log after an import.
    #[serde(default)]
    pub event_logging: bool,
    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            rollback_on_failure: true,
            event_logging: false,
            export: ExportConfig::default(),
        }
    }
}

impl SnapshotConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# fieldsnap configuration
#
# Restore every value written so far when an import fails (default: true)
rollback_on_failure = true

# Print the full import event log instead of only the summary (default: false)
event_logging = false

[export]
# Exported files are named "<filename_prefix>-YYYY-MM-DD.json"
filename_prefix = "data-export"
# Pretty-print exported JSON (default: true)
pretty = true
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: SnapshotConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        if config.export.filename_prefix.trim().is_empty() {
            return Err(Error::config(format!(
                "Empty export.filename_prefix in '{}'",
                path.display()
            )));
        }
        Ok(config)
    }

    /// Read config from `path`, falling back to defaults when it is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
