//! Default configurations and presets for spdx-inventory.

use super::types::{AppConfig, ImportConfig};

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Default settings
    Default,
    /// Reject unsupported documents and report progress on every package
    Strict,
    /// No download requests, prior imports left in place
    Offline,
}

impl ConfigPreset {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Strict => "strict",
            Self::Offline => "offline",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "strict" => Some(Self::Strict),
            "offline" | "air-gapped" => Some(Self::Offline),
            _ => None,
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Clean prior imports and request downloads",
            Self::Strict => "Only SPDX 2.x documents, fine-grained progress",
            Self::Offline => "Import without download requests or cleanup",
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::Strict, Self::Offline]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Preset Implementations
// ============================================================================

impl AppConfig {
    /// Create an `AppConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::Strict => Self {
                import: ImportConfig {
                    progress_interval: 1,
                    strict_parsing: true,
                    ..ImportConfig::default()
                },
                ..Self::default()
            },
            ConfigPreset::Offline => Self {
                import: ImportConfig {
                    clean_prior_import: false,
                    emit_downloads: false,
                    ..ImportConfig::default()
                },
                ..Self::default()
            },
        }
    }
}

// ============================================================================
// Default Value Constants
// ============================================================================

/// Default store file, relative to the working directory.
pub const DEFAULT_STORE_FILE: &str = "spdx-inventory.json";

/// Default number of packages between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 5;

pub const DEFAULT_LOG_LEVEL: &str = "info";
