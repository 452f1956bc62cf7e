//! Config command handlers.

use super::{OutputTarget, write_output};
use crate::config::{
    AppConfig, CONFIG_FILE_NAMES, Validatable, discover_config_file, generate_full_example_config,
    generate_json_schema, load_or_default, search_paths,
};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

/// Print the effective configuration: defaults, then file, then CLI overrides.
pub fn run_config_show(explicit: Option<&Path>, overrides: &AppConfig) -> Result<()> {
    let (mut config, loaded_from) = load_or_default(explicit);
    config.merge(overrides);
    match &loaded_from {
        Some(path) => eprintln!("# Loaded from: {}", path.display()),
        None => eprintln!("# No config file found; showing defaults"),
    }
    for error in config.validate() {
        eprintln!("# warning: {error}");
    }
    let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
    print!("{yaml}");
    Ok(())
}

/// Print the search path and the config file that would be used.
pub fn run_config_path(explicit: Option<&Path>) -> Result<()> {
    eprintln!("Config file search paths (in order):");
    for path in search_paths() {
        eprintln!("  {}", path.display());
    }
    eprintln!();
    eprintln!("Recognized file names:");
    for name in CONFIG_FILE_NAMES {
        eprintln!("  {name}");
    }
    eprintln!();
    match discover_config_file(explicit) {
        Some(path) => eprintln!("Active config file: {}", path.display()),
        None => eprintln!("No config file found."),
    }
    Ok(())
}

/// Write a commented example config into `dir`.
pub fn run_config_init(dir: &Path) -> Result<PathBuf> {
    let target = dir.join(CONFIG_FILE_NAMES[0]);
    if target.exists() {
        bail!(
            "{} already exists. Remove it first to re-initialize.",
            target.display()
        );
    }
    std::fs::write(&target, generate_full_example_config())
        .with_context(|| format!("failed to write {}", target.display()))?;
    eprintln!("Created {}", target.display());
    Ok(target)
}

/// Print or write the JSON Schema of the config file.
pub fn run_config_schema(output: Option<PathBuf>) -> Result<()> {
    write_output(&generate_json_schema(), &OutputTarget::from_option(output), false)
}
