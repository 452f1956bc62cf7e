//! spdx-inventory: SPDX SBOM import into a component inventory
//!
//! Imports SPDX 2.x JSON documents into per-project inventories of items,
//! components, licenses and copyrights.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use spdx_inventory::{
    cli::{self, ImportArgs, InventoryFormat, exit_codes},
    config::{AppConfig, ConfigPreset, Validatable},
    model::ProjectId,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nSupported SBOM Formats:",
        "\n  SPDX: 2.2, 2.3 (JSON)",
        "\n\nFollow-ups:",
        "\n  copyright-filter, license-matcher, vulnerability, download"
    )
}

#[derive(Parser)]
#[command(name = "spdx-inventory")]
#[command(author = "Binarly.io")]
#[command(version, long_version = build_long_version())]
#[command(about = "Import SPDX SBOMs into a component inventory", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Import failed (unknown project, unreadable document)
    3  Error occurred

EXAMPLES:
    # Create a project and import an SBOM into it
    spdx-inventory project create firmware --base-path /srv/sources
    spdx-inventory import firmware.spdx.json --project 0

    # Show the resulting dependency tree
    spdx-inventory inventory 0

    # Process a queued work task
    spdx-inventory work task.json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the inventory store file
    #[arg(long, global = true, env = "SPDX_INVENTORY_STORE")]
    store: Option<PathBuf>,

    /// Configuration preset (default, strict, offline)
    #[arg(long, global = true)]
    preset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `import` subcommand
#[derive(Parser)]
struct ImportCmdArgs {
    /// Path to the SPDX JSON document
    sbom: PathBuf,

    /// Project to import into
    #[arg(short, long)]
    project: usize,

    /// Ask the copyright filter to review imported items
    #[arg(long)]
    copyright_ai: bool,

    /// Ask the license matcher to review imported items
    #[arg(long)]
    license_matcher: bool,

    /// Keep file placeholders of the previous import
    #[arg(long)]
    no_clean: bool,

    /// Do not request downloads
    #[arg(long)]
    no_downloads: bool,

    /// Reject documents whose spdxVersion is not SPDX-2.x
    #[arg(long)]
    strict: bool,

    /// Write follow-up requests to this JSON file
    #[arg(long)]
    follow_ups: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Import an SPDX JSON document into a project
    Import(ImportCmdArgs),

    /// Show a project's inventory
    Inventory {
        /// Project id
        project: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "tree")]
        format: InventoryFormat,

        /// Output file path (stdout if not specified)
        #[arg(short = 'O', long)]
        output_file: Option<PathBuf>,
    },

    /// Run a work task file
    Work {
        /// Path to the task JSON
        task: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Create a project and print its id
    Create {
        name: String,
        /// Directory holding the project's downloaded sources
        #[arg(long)]
        base_path: Option<PathBuf>,
    },
    /// List projects
    List {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .spdx-inventory.yaml in the current directory
    Init,
}

/// Settings given on the command line, layered over the config file.
fn cli_overrides(cli: &Cli) -> Result<AppConfig> {
    let mut overrides = match &cli.preset {
        Some(name) => {
            let Some(preset) = ConfigPreset::from_name(name) else {
                let valid: Vec<&str> = ConfigPreset::all().iter().map(ConfigPreset::name).collect();
                anyhow::bail!("Unknown preset '{name}'. Valid options: {}", valid.join(", "));
            };
            AppConfig::from_preset(preset)
        }
        None => AppConfig::default(),
    };
    if let Some(store) = &cli.store {
        overrides.store.path.clone_from(store);
    }
    if cli.verbose {
        overrides.logging.level = "debug".to_string();
    } else if cli.quiet {
        overrides.logging.level = "warn".to_string();
    }
    if let Commands::Import(args) = &cli.command {
        overrides.import.clean_prior_import &= !args.no_clean;
        overrides.import.emit_downloads &= !args.no_downloads;
        overrides.import.strict_parsing |= args.strict;
        if args.follow_ups.is_some() {
            overrides.follow_ups.output.clone_from(&args.follow_ups);
        }
    }
    Ok(overrides)
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let overrides = cli_overrides(&cli)?;
    let (config, loaded_from) =
        AppConfig::from_file_with_overrides(cli.config.as_deref(), &overrides);

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    if let Some(path) = &loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }
    let errors = config.validate();
    if !errors.is_empty() && !matches!(cli.command, Commands::Config { .. }) {
        for error in &errors {
            tracing::error!("Invalid configuration: {}", error);
        }
        return Ok(exit_codes::ERROR);
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Project { action } => match action {
            ProjectAction::Create { name, base_path } => {
                cli::run_project_create(&config, &name, base_path, cli.quiet)?;
                Ok(exit_codes::SUCCESS)
            }
            ProjectAction::List { json } => {
                cli::run_project_list(&config, json, cli.quiet)?;
                Ok(exit_codes::SUCCESS)
            }
        },

        Commands::Import(args) => {
            let args = ImportArgs {
                sbom: args.sbom,
                project: ProjectId::from_index(args.project),
                use_copyright_ai: args.copyright_ai,
                use_license_matcher: args.license_matcher,
            };
            cli::run_import(&config, &args, cli.quiet)
        }

        Commands::Inventory {
            project,
            format,
            output_file,
        } => {
            cli::run_inventory(
                &config,
                ProjectId::from_index(project),
                format,
                output_file,
                cli.quiet,
            )?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::Work { task } => cli::run_work(&config, &task, cli.quiet),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "spdx-inventory", &mut std::io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { output } => {
            cli::run_config_schema(output)?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => {
            match action {
                ConfigAction::Show => cli::run_config_show(cli.config.as_deref(), &overrides)?,
                ConfigAction::Path => cli::run_config_path(cli.config.as_deref())?,
                ConfigAction::Init => {
                    let cwd = std::env::current_dir()?;
                    cli::run_config_init(&cwd)?;
                }
            }
            Ok(exit_codes::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_import_flags_become_overrides() {
        let cli = Cli::parse_from([
            "spdx-inventory",
            "--store",
            "/tmp/s.json",
            "import",
            "doc.json",
            "--project",
            "2",
            "--no-downloads",
        ]);
        let overrides = cli_overrides(&cli).unwrap();
        assert_eq!(overrides.store.path, PathBuf::from("/tmp/s.json"));
        assert!(!overrides.import.emit_downloads);
        assert!(overrides.import.clean_prior_import);
    }

    #[test]
    fn test_unknown_preset_rejected() {
        let cli = Cli::parse_from(["spdx-inventory", "--preset", "fast", "config", "show"]);
        assert!(cli_overrides(&cli).is_err());
    }
}
