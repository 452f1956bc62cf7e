//! Configuration types for spdx-inventory.
//!
//! Provides structured configuration for the store, the import passes and logging.

use crate::import::ImportOptions;
use crate::model::STANDALONE_VERSION;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::{DEFAULT_LOG_LEVEL, DEFAULT_PROGRESS_INTERVAL, DEFAULT_STORE_FILE};

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// CLI arguments are layered over file settings with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Inventory store location
    pub store: StoreConfig,
    /// Import pass tuning
    pub import: ImportConfig,
    /// Follow-up delivery
    pub follow_ups: FollowUpConfig,
    /// Logging
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Options handed to the importer.
    #[must_use]
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            progress_interval: self.import.progress_interval,
            clean_prior_import: self.import.clean_prior_import,
            standalone_version: self.import.standalone_version.clone(),
            emit_downloads: self.import.emit_downloads,
        }
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the store file.
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store.path = path.into();
        self
    }

    /// Set how often progress is reported.
    pub const fn progress_interval(mut self, interval: usize) -> Self {
        self.config.import.progress_interval = interval;
        self
    }

    /// Enable or disable the cleanup stage.
    pub const fn clean_prior_import(mut self, clean: bool) -> Self {
        self.config.import.clean_prior_import = clean;
        self
    }

    /// Enable or disable download requests.
    pub const fn emit_downloads(mut self, emit: bool) -> Self {
        self.config.import.emit_downloads = emit;
        self
    }

    /// Reject documents with an unsupported `spdxVersion`.
    pub const fn strict_parsing(mut self, strict: bool) -> Self {
        self.config.import.strict_parsing = strict;
        self
    }

    /// Set the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Section Types
// ============================================================================

/// Where the inventory is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON store file
    pub path: PathBuf,
    /// Keep the project's extraction directory when cleaning a prior import
    pub keep_directories: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_FILE),
            keep_directories: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ImportConfig {
    /// Report progress every this many packages
    pub progress_interval: usize,
    /// Remove file placeholders left by a previous import before importing
    pub clean_prior_import: bool,
    /// Component version given to files no package claims
    pub standalone_version: String,
    /// Request downloads for packages with a version and a download location
    pub emit_downloads: bool,
    /// Reject documents whose `spdxVersion` is not 2.x
    pub strict_parsing: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            clean_prior_import: true,
            standalone_version: STANDALONE_VERSION.to_string(),
            emit_downloads: true,
            strict_parsing: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FollowUpConfig {
    /// Write follow-up requests to this JSON file instead of logging them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
