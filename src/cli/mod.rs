//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod config;
mod import;
mod inventory;
mod project;
mod work;

pub use config::{run_config_init, run_config_path, run_config_schema, run_config_show};
pub use import::{ImportArgs, run_import};
pub use inventory::{InventoryFormat, render_inventory, run_inventory};
pub use project::{run_project_create, run_project_list};
pub use work::run_work;

use crate::config::AppConfig;
use crate::import::{FollowUpSink, ImportProgress, LoggingSink, RecordingSink};
use crate::store::{InventoryStore, JsonStore};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Process exit codes.
pub mod exit_codes {
    /// The command succeeded
    pub const SUCCESS: i32 = 0;
    /// The import ran but reported failure (unknown project, unreadable document)
    pub const IMPORT_FAILED: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

/// Target for output - either stdout or a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    #[must_use]
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }
}

/// Write output to the target (stdout or file)
pub fn write_output(content: &str, target: &OutputTarget, quiet: bool) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            println!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !quiet {
                tracing::info!("Output written to {}", path.display());
            }
            Ok(())
        }
    }
}

/// Open the configured store, creating an empty one if the file is missing.
pub(crate) fn open_store(config: &AppConfig) -> Result<(JsonStore, InventoryStore)> {
    let file = JsonStore::new(&config.store.path);
    let store = file
        .load()
        .with_context(|| format!("Failed to open store {}", file.path().display()))?;
    Ok((file, store))
}

/// Progress callback printing to stderr unless quiet.
pub(crate) fn progress_printer(quiet: bool) -> impl FnMut(ImportProgress) {
    move |progress| {
        if !quiet {
            eprintln!("  {progress}");
        }
    }
}

/// Follow-up destination chosen by the configuration.
pub(crate) enum ConfiguredSink {
    Log(LoggingSink),
    File(PathBuf, RecordingSink),
}

impl ConfiguredSink {
    pub(crate) fn from_config(config: &AppConfig) -> Self {
        match &config.follow_ups.output {
            Some(path) => Self::File(path.clone(), RecordingSink::new()),
            None => Self::Log(LoggingSink),
        }
    }

    pub(crate) fn as_sink(&mut self) -> &mut dyn FollowUpSink {
        match self {
            Self::Log(sink) => sink,
            Self::File(_, sink) => sink,
        }
    }

    /// Write recorded follow-ups, if any were recorded.
    pub(crate) fn finish(self, quiet: bool) -> Result<()> {
        if let Self::File(path, sink) = self {
            let json = serde_json::to_string_pretty(&sink.received)
                .context("Failed to encode follow-ups")?;
            write_output(&json, &OutputTarget::File(path), quiet)?;
        }
        Ok(())
    }
}
