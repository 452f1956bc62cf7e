//! Configuration validation for spdx-inventory.

use super::types::{AppConfig, ImportConfig, LoggingConfig, StoreConfig};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.store.validate());
        errors.extend(self.import.validate());
        errors.extend(self.logging.validate());

        if let Some(output) = &self.follow_ups.output
            && let Some(parent) = output.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ConfigError::new(
                "follow_ups.output",
                format!("Parent directory does not exist: {}", parent.display()),
            ));
        }

        errors
    }
}

impl Validatable for StoreConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.path.as_os_str().is_empty() {
            errors.push(ConfigError::new("store.path", "Store path must not be empty"));
        } else if self.path.is_dir() {
            errors.push(ConfigError::new(
                "store.path",
                format!("Store path is a directory: {}", self.path.display()),
            ));
        }
        errors
    }
}

impl Validatable for ImportConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.progress_interval == 0 {
            errors.push(ConfigError::new(
                "import.progress_interval",
                "Progress interval must be at least 1",
            ));
        }
        if self.standalone_version.trim().is_empty() {
            errors.push(ConfigError::new(
                "import.standalone_version",
                "Standalone version must not be empty",
            ));
        }
        errors
    }
}

impl Validatable for LoggingConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if valid_levels.contains(&self.level.to_lowercase().as_str()) {
            Vec::new()
        } else {
            vec![ConfigError::new(
                "logging.level",
                format!(
                    "Invalid level '{}'. Valid options: {}",
                    self.level,
                    valid_levels.join(", ")
                ),
            )]
        }
    }
}
