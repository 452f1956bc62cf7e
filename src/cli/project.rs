//! Project command handlers.

use super::{OutputTarget, open_store, write_output};
use crate::config::AppConfig;
use crate::model::{Project, ProjectId};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Create a project and print its id.
pub fn run_project_create(
    config: &AppConfig,
    name: &str,
    base_path: Option<PathBuf>,
    quiet: bool,
) -> Result<ProjectId> {
    anyhow::ensure!(!name.trim().is_empty(), "Project name must not be empty");

    let (file, mut store) = open_store(config)?;
    let id = store.create_project(Project::new(name.trim(), base_path));
    file.save(&store)
        .with_context(|| format!("Failed to save store {}", file.path().display()))?;

    write_output(&id.to_string(), &OutputTarget::Stdout, quiet)?;
    Ok(id)
}

#[derive(Serialize)]
struct ProjectRow<'a> {
    id: ProjectId,
    name: &'a str,
    base_path: Option<&'a std::path::Path>,
    items: usize,
}

/// List projects with their item counts.
pub fn run_project_list(config: &AppConfig, json: bool, quiet: bool) -> Result<()> {
    let (_, store) = open_store(config)?;
    let rows: Vec<ProjectRow<'_>> = store
        .projects()
        .map(|(id, project)| ProjectRow {
            id,
            name: &project.name,
            base_path: project.base_path.as_deref(),
            items: store.items_of(id).count(),
        })
        .collect();

    let content = if json {
        serde_json::to_string_pretty(&rows)?
    } else if rows.is_empty() {
        "No projects.".to_string()
    } else {
        rows.iter()
            .map(|row| {
                let base = row
                    .base_path
                    .map(|p| format!("  [{}]", p.display()))
                    .unwrap_or_default();
                format!("{:>4}  {}  ({} items){base}", row.id, row.name, row.items)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    write_output(&content, &OutputTarget::Stdout, quiet)
}
