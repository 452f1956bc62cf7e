//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::defaults::{DEFAULT_LOG_LEVEL, DEFAULT_PROGRESS_INTERVAL, DEFAULT_STORE_FILE};
use super::types::AppConfig;
use crate::model::STANDALONE_VERSION;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".spdx-inventory.yaml",
    ".spdx-inventory.yml",
    "spdx-inventory.yaml",
    "spdx-inventory.yml",
];

/// Directory name under the user config directory.
pub const CONFIG_DIR_NAME: &str = "spdx-inventory";

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/spdx-inventory/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path
        && path.exists()
    {
        return Some(path.to_path_buf());
    }

    search_paths()
        .into_iter()
        .find_map(|dir| find_config_in_dir(&dir))
}

/// Directories searched for a config file, in order.
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd);
    }
    if let Some(git_root) = find_git_root()
        && !paths.contains(&git_root)
    {
        paths.push(git_root);
    }
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(CONFIG_DIR_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home);
    }
    paths
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Only values that differ from the defaults override. Boolean switches
    /// that default to `true` can only be turned off.
    pub fn merge(&mut self, other: &Self) {
        if other.store.path.as_path() != Path::new(DEFAULT_STORE_FILE) {
            self.store.path.clone_from(&other.store.path);
        }
        if other.store.keep_directories {
            self.store.keep_directories = true;
        }

        if other.import.progress_interval != DEFAULT_PROGRESS_INTERVAL {
            self.import.progress_interval = other.import.progress_interval;
        }
        if !other.import.clean_prior_import {
            self.import.clean_prior_import = false;
        }
        if other.import.standalone_version != STANDALONE_VERSION {
            self.import
                .standalone_version
                .clone_from(&other.import.standalone_version);
        }
        if !other.import.emit_downloads {
            self.import.emit_downloads = false;
        }
        if other.import.strict_parsing {
            self.import.strict_parsing = true;
        }

        if other.follow_ups.output.is_some() {
            self.follow_ups.output.clone_from(&other.follow_ups.output);
        }

        if other.logging.level != DEFAULT_LOG_LEVEL {
            self.logging.level.clone_from(&other.logging.level);
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content from the defaults.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::default();
    format!(
        r"# spdx-inventory configuration
# Place this file at .spdx-inventory.yaml in your project root or ~/.config/spdx-inventory/

{}
",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# spdx-inventory configuration file
# ===================================
#
# Place it at:
#   - .spdx-inventory.yaml in your project root
#   - ~/.config/spdx-inventory/spdx-inventory.yaml for global config
#
# CLI arguments always override file settings.

# Inventory store
store:
  # JSON file holding projects, items, components, licenses and documents
  path: spdx-inventory.json
  # Keep <base_path>/<name>_<id> when cleaning a prior import
  keep_directories: false

# Import passes
import:
  # Report progress every N packages
  progress_interval: 5
  # Remove file placeholders of the previous import first
  clean_prior_import: true
  # Component version for files no package claims
  standalone_version: Standalone
  # Request downloads for packages with a version and download location
  emit_downloads: true
  # Reject documents whose spdxVersion is not SPDX-2.x
  strict_parsing: false

# Follow-up requests (copyright filter, license matcher, vulnerability, download)
# Set output to write them to a JSON file instead of the log, e.g.
#   output: follow-ups.json
follow_ups: {}

logging:
  # Used when RUST_LOG is unset
  level: info
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
