//! State shared by the passes of one import run.

use super::followup::FollowUp;
use super::license::LicenseResolver;
use super::ImportOptions;
use crate::document::{DocumentIndex, ExtractedLicensingInfo};
use crate::model::{DocumentId, ItemId, LicenseId, ProjectId};
use crate::store::InventoryStore;
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet};

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportStats {
    pub packages: usize,
    pub orphans: usize,
    pub relationships: usize,
    pub parent_links: usize,
    pub snippets: usize,
    pub items_created: usize,
    /// Elements logged and skipped
    pub skipped: usize,
}

/// Mutable state lent to each pass in turn.
///
/// `inventory_cache` only grows during the package and orphan passes. The
/// relationship and snippet passes only read it.
pub struct ImportContext<'a> {
    pub project: ProjectId,
    pub store: &'a mut InventoryStore,
    pub index: DocumentIndex<'a>,
    pub document_root: DocumentId,
    pub options: &'a ImportOptions,
    /// Source element id to inventory item
    pub inventory_cache: HashMap<String, ItemId>,
    /// Source file id to the item that owns the file
    pub file_to_item_cache: HashMap<String, ItemId>,
    /// License id or `LicenseRef` to persisted license
    pub license_cache: HashMap<String, LicenseId>,
    pub processed_file_ids: HashSet<String>,
    pub main_package_ids: IndexSet<String>,
    /// Items touched by this run, in processing order
    pub imported_items: IndexSet<ItemId>,
    pub follow_ups: Vec<FollowUp>,
    pub stats: ImportStats,
}

impl<'a> ImportContext<'a> {
    /// Create the context. The inventory cache starts with the items a
    /// previous import left in the project.
    pub fn new(
        project: ProjectId,
        store: &'a mut InventoryStore,
        index: DocumentIndex<'a>,
        document_root: DocumentId,
        options: &'a ImportOptions,
    ) -> Self {
        let inventory_cache: HashMap<String, ItemId> = store
            .items_of(project)
            .map(|(id, item)| (item.spdx_id.clone(), id))
            .collect();
        let main_package_ids = index.described_ids();

        tracing::debug!(
            project = %project,
            cached_items = inventory_cache.len(),
            main_packages = main_package_ids.len(),
            "Import context ready"
        );

        Self {
            project,
            store,
            index,
            document_root,
            options,
            inventory_cache,
            file_to_item_cache: HashMap::new(),
            license_cache: HashMap::new(),
            processed_file_ids: HashSet::new(),
            main_package_ids,
            imported_items: IndexSet::new(),
            follow_ups: Vec::new(),
            stats: ImportStats::default(),
        }
    }

    /// Document-local license definitions.
    #[must_use]
    pub fn extracted_license_infos(&self) -> &'a [ExtractedLicensingInfo] {
        &self.index.document().has_extracted_licensing_infos
    }

    #[must_use]
    pub fn cached_item(&self, spdx_id: &str) -> Option<ItemId> {
        self.inventory_cache.get(spdx_id).copied()
    }

    pub fn register_item(&mut self, spdx_id: &str, item: ItemId) {
        self.inventory_cache.insert(spdx_id.to_string(), item);
        self.imported_items.insert(item);
    }

    pub fn register_file(&mut self, file_id: &str, item: ItemId) {
        self.file_to_item_cache.insert(file_id.to_string(), item);
    }

    /// Resolve a raw expression. An unparsable expression is logged and
    /// resolves to nothing.
    pub fn resolve_licenses(&mut self, element: &str, raw: Option<&str>) -> Vec<LicenseId> {
        let mut resolver = LicenseResolver::new(self.store, &mut self.license_cache, &self.index);
        resolver.resolve_raw(element, raw).unwrap_or_else(|e| {
            self.stats.skipped += 1;
            tracing::warn!("Ignoring license expression: {}", e);
            Vec::new()
        })
    }
}
