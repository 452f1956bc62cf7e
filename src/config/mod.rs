//! Configuration module for spdx-inventory.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - Named presets
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use spdx_inventory::config::{AppConfig, ConfigPreset};
//!
//! let config = AppConfig::default();
//! let config = AppConfig::from_preset(ConfigPreset::Offline);
//! let config = AppConfig::builder()
//!     .store_path("inventory.json")
//!     .emit_downloads(false)
//!     .build();
//!
//! use spdx_inventory::config::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.spdx-inventory.yaml` file in your project root or `~/.config/spdx-inventory/`:
//!
//! ```yaml
//! store:
//!   path: /var/lib/spdx-inventory.json
//! import:
//!   emit_downloads: false
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    ConfigPreset, DEFAULT_LOG_LEVEL, DEFAULT_PROGRESS_INTERVAL, DEFAULT_STORE_FILE,
};
pub use types::{
    AppConfig, AppConfigBuilder, FollowUpConfig, ImportConfig, LoggingConfig, StoreConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    CONFIG_FILE_NAMES, ConfigFileError, discover_config_file, generate_example_config,
    generate_full_example_config, load_config_file, load_or_default, search_paths,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// Editors can use it to validate and complete `.spdx-inventory.yaml` files.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
