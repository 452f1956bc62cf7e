//! Removal of a project's previously imported file tree.

use super::InventoryStore;
use crate::error::StoreError;
use crate::model::ProjectId;
use std::fs;
use std::path::PathBuf;

/// What a cleanup removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// File placeholders deleted from the store
    pub files_removed: usize,
    /// On-disk directory deleted, if one existed
    pub directory_removed: Option<PathBuf>,
}

/// Clears whatever a prior import left in a project's file tree.
///
/// Implementations must be safe to call on a project that was never
/// imported.
///
/// ```ignore
/// use spdx_inventory::store::{FileTreeCleaner, StoreCleaner};
///
/// let report = StoreCleaner::new().clean(&mut store, project)?;
/// println!("removed {} placeholders", report.files_removed);
/// ```
pub trait FileTreeCleaner {
    fn clean(
        &self,
        store: &mut InventoryStore,
        project: ProjectId,
    ) -> Result<CleanupReport, StoreError>;

    /// Name used in logs.
    fn name(&self) -> &'static str;
}

/// Deletes the project's file placeholders and its on-disk tree at
/// `<base_path>/<name>_<id>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreCleaner {
    keep_directory: bool,
}

impl StoreCleaner {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            keep_directory: false,
        }
    }

    /// Only clear the store, never touch the filesystem.
    #[must_use]
    pub const fn keep_directory(mut self) -> Self {
        self.keep_directory = true;
        self
    }
}

impl FileTreeCleaner for StoreCleaner {
    fn clean(
        &self,
        store: &mut InventoryStore,
        project: ProjectId,
    ) -> Result<CleanupReport, StoreError> {
        let files_removed = store.remove_project_files(project);

        let mut directory_removed = None;
        if !self.keep_directory
            && let Some(proj) = store.project(project)
            && let Some(base) = &proj.base_path
        {
            let tree = base.join(format!("{}_{}", proj.name, project));
            if tree.is_dir() {
                fs::remove_dir_all(&tree).map_err(|e| StoreError::io(&tree, e))?;
                directory_removed = Some(tree);
            }
        }

        tracing::debug!(
            project = %project,
            files_removed,
            directory = ?directory_removed,
            "Cleaned prior import"
        );
        Ok(CleanupReport {
            files_removed,
            directory_removed,
        })
    }

    fn name(&self) -> &'static str {
        "store"
    }
}

/// Cleaner that leaves everything in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCleaner;

impl FileTreeCleaner for NoOpCleaner {
    fn clean(
        &self,
        _store: &mut InventoryStore,
        _project: ProjectId,
    ) -> Result<CleanupReport, StoreError> {
        Ok(CleanupReport::default())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
