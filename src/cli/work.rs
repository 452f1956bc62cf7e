//! Work task command handler.

use super::{ConfiguredSink, exit_codes, open_store, progress_printer};
use crate::config::AppConfig;
use crate::import::Importer;
use crate::parsers::SpdxJsonParser;
use crate::store::{FileTreeCleaner, NoOpCleaner, StoreCleaner};
use crate::worker::{self, WorkTask};
use anyhow::{Context, Result};
use std::path::Path;

/// Load a task file and dispatch it. Relative paths inside the task resolve
/// against the task file's directory. Returns the process exit code.
pub fn run_work(config: &AppConfig, task_path: &Path, quiet: bool) -> Result<i32> {
    let task = WorkTask::load(task_path)
        .with_context(|| format!("Failed to load task {}", task_path.display()))?;
    let base_dir = task_path.parent();

    let (file, mut store) = open_store(config)?;
    let store_cleaner = if config.store.keep_directories {
        StoreCleaner::new().keep_directory()
    } else {
        StoreCleaner::new()
    };
    let cleaner: &dyn FileTreeCleaner = if config.import.clean_prior_import {
        &store_cleaner
    } else {
        &NoOpCleaner
    };
    let parser = if config.import.strict_parsing {
        SpdxJsonParser::strict()
    } else {
        SpdxJsonParser::new()
    };
    let mut sink = ConfiguredSink::from_config(config);

    let mut progress = progress_printer(quiet);
    let succeeded = {
        let mut importer = Importer::new(&mut store, cleaner, sink.as_sink())
            .with_options(config.import_options())
            .with_parser(parser);
        worker::dispatch(&task, base_dir, &mut importer, &mut progress)
    };

    if !succeeded {
        return Ok(exit_codes::IMPORT_FAILED);
    }
    file.save(&store)
        .with_context(|| format!("Failed to save store {}", file.path().display()))?;
    sink.finish(quiet)?;
    if !quiet {
        eprintln!("Task {} completed", task.task_id);
    }
    Ok(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Project;

    #[test]
    fn test_task_with_relative_sbom_path() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::builder()
            .store_path(tmp.path().join("store.json"))
            .emit_downloads(false)
            .build();
        let (file, mut store) = open_store(&config).unwrap();
        let project = store.create_project(Project::new("p", None));
        file.save(&store).unwrap();

        std::fs::write(
            tmp.path().join("doc.json"),
            r#"{"spdxVersion": "SPDX-2.3", "SPDXID": "SPDXRef-DOCUMENT", "name": "w",
                "documentNamespace": "https://example.com/w",
                "packages": [{"SPDXID": "SPDXRef-p", "name": "p", "versionInfo": "2"}]}"#,
        )
        .unwrap();
        let task_path = tmp.path().join("task.json");
        std::fs::write(
            &task_path,
            format!(
                r#"{{"task_id": "t1", "payload": {{
                    "type": "spdx", "project_id": {project}, "sbom_path": "doc.json"
                }}}}"#
            ),
        )
        .unwrap();

        assert_eq!(run_work(&config, &task_path, true).unwrap(), exit_codes::SUCCESS);
        let (_, store) = open_store(&config).unwrap();
        assert!(store.find_item(project, "SPDXRef-p").is_some());
    }

    #[test]
    fn test_missing_task_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::builder()
            .store_path(tmp.path().join("store.json"))
            .build();
        assert!(run_work(&config, &tmp.path().join("none.json"), true).is_err());
    }
}
