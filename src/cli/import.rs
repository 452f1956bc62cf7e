//! Import command handler.
//!
//! Runs one SPDX import against the configured store and saves the store
//! afterwards. A failed import leaves the store file untouched.

use super::{ConfiguredSink, exit_codes, open_store, progress_printer};
use crate::config::AppConfig;
use crate::import::{Importer, SpdxWorkData};
use crate::model::ProjectId;
use crate::parsers::SpdxJsonParser;
use crate::store::{FileTreeCleaner, NoOpCleaner, StoreCleaner};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Arguments of the `import` subcommand.
#[derive(Debug, Clone)]
pub struct ImportArgs {
    pub sbom: PathBuf,
    pub project: ProjectId,
    pub use_copyright_ai: bool,
    pub use_license_matcher: bool,
}

/// Run the import command. Returns the process exit code.
pub fn run_import(config: &AppConfig, args: &ImportArgs, quiet: bool) -> Result<i32> {
    let json_bytes = std::fs::read(&args.sbom)
        .with_context(|| format!("Failed to read {}", args.sbom.display()))?;
    let work = SpdxWorkData {
        project_id: args.project,
        json_bytes,
        use_copyright_ai: args.use_copyright_ai,
        use_license_matcher: args.use_license_matcher,
    };

    let (file, mut store) = open_store(config)?;
    let cleaner = StoreCleaner::new();
    let cleaner = if config.store.keep_directories {
        cleaner.keep_directory()
    } else {
        cleaner
    };
    let no_op = NoOpCleaner;
    let cleaner: &dyn FileTreeCleaner = if config.import.clean_prior_import {
        &cleaner
    } else {
        &no_op
    };
    let mut sink = ConfiguredSink::from_config(config);
    let parser = if config.import.strict_parsing {
        SpdxJsonParser::strict()
    } else {
        SpdxJsonParser::new()
    };

    let mut progress = progress_printer(quiet);
    let result = {
        let mut importer = Importer::new(
            &mut store,
            cleaner,
            sink.as_sink(),
        )
        .with_options(config.import_options())
        .with_parser(parser);
        importer.run(&work, &mut progress)
    };

    match result {
        Ok(summary) => {
            file.save(&store)
                .with_context(|| format!("Failed to save store {}", file.path().display()))?;
            sink.finish(quiet)?;
            if !quiet {
                eprintln!(
                    "Imported {} into project {}: {} items, {} packages, {} orphans, \
                     {} parent links, {} skipped",
                    summary.document_uri,
                    summary.project,
                    summary.items,
                    summary.stats.packages,
                    summary.stats.orphans,
                    summary.stats.parent_links,
                    summary.stats.skipped,
                );
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(e) if e.is_rejection() => {
            tracing::error!("Import rejected: {}", e);
            Ok(exit_codes::IMPORT_FAILED)
        }
        Err(e) => Err(e).context("Import failed"),
    }
}
