//! Render configuration.
//!
//! Handles loading, validating, and merging `playgroundbook.toml`. The file is
//! optional and lives next to the book manifest; stock defaults are used for
//! every key it doesn't mention.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! packages_dir = "Packages"        # Shared package area, relative to the manifest
//! source_extension = "swift"       # Extension of files treated as sources
//! default_imports = ["UIKit"]      # Used when the manifest has no `imports` key
//!
//! [book]
//! deployment_target = "ios10.0"    # Manifest `deployment_target` wins when set
//! content_version = "1.0"
//!
//! [pages]
//! live_view_mode = "HiddenByDefault"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up beside the book manifest.
pub const CONFIG_FILE_NAME: &str = "playgroundbook.toml";

const LIVE_VIEW_MODES: &[&str] = &["HiddenByDefault", "VisibleByDefault"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Render configuration loaded from `playgroundbook.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Directory holding shared packages whose `Sources` are merged into every chapter.
    pub packages_dir: String,
    /// Extension (without the dot) of files treated as sources.
    pub source_extension: String,
    /// Imports used when the book manifest has no `imports` key.
    pub default_imports: Vec<String>,
    /// Book-level manifest values.
    pub book: BookConfig,
    /// Per-page manifest values.
    pub pages: PagesConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            packages_dir: "Packages".to_string(),
            source_extension: "swift".to_string(),
            default_imports: vec!["UIKit".to_string()],
            book: BookConfig::default(),
            pages: PagesConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_extension.is_empty() || self.source_extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "source_extension must be non-empty and must not start with '.'".into(),
            ));
        }
        if self.default_imports.iter().any(|i| i.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "default_imports must not contain empty names".into(),
            ));
        }
        if !LIVE_VIEW_MODES.contains(&self.pages.live_view_mode.as_str()) {
            return Err(ConfigError::Validation(format!(
                "pages.live_view_mode must be one of {LIVE_VIEW_MODES:?}"
            )));
        }
        Ok(())
    }
}

/// Values written into the book's `Contents/Manifest.plist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookConfig {
    pub deployment_target: String,
    pub content_version: String,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            deployment_target: "ios10.0".to_string(),
            content_version: "1.0".to_string(),
        }
    }
}

/// Values written into every page's `Manifest.plist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagesConfig {
    /// `HiddenByDefault` or `VisibleByDefault`.
    pub live_view_mode: String,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            live_view_mode: "HiddenByDefault".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(RenderConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `playgroundbook.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `playgroundbook.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<RenderConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(dir)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: RenderConfig = merged.try_into()?;
    config.validate()?;
    tracing::debug!(?config, "resolved render config");
    Ok(config)
}

/// Returns a fully-commented stock `playgroundbook.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# playgroundbook configuration
# ===========================
# All settings are optional. Values shown below are the defaults.
# Place this file next to the book manifest. Unknown keys cause an error.

# Directory of shared packages. Every `<packages_dir>/**/Sources/*.<ext>` file
# is copied into each chapter and into the book's Contents/Sources.
packages_dir = "Packages"

# Extension (without the dot) of files treated as sources.
source_extension = "swift"

# Imports injected into every page when the manifest has no `imports` key.
# A manifest `imports` list replaces this entirely; `imports: []` means none.
default_imports = ["UIKit"]

# ---------------------------------------------------------------------------
# Book manifest (Contents/Manifest.plist)
# ---------------------------------------------------------------------------
[book]
# Used unless the book manifest sets `deployment_target`.
deployment_target = "ios10.0"
content_version = "1.0"

# ---------------------------------------------------------------------------
# Page manifests (Pages/<page>.playgroundpage/Manifest.plist)
# ---------------------------------------------------------------------------
[pages]
# "HiddenByDefault" or "VisibleByDefault".
live_view_mode = "HiddenByDefault"
"##
}
