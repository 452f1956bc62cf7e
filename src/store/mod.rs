//! Persistence for projects, inventory and imported documents.
//!
//! [`InventoryStore`] is the in-memory repository set the importer writes
//! to. Every lookup is either by handle, by the entity's unique key (source
//! id within a project, name and version, exact text), or a scan over a
//! project. [`JsonStore`] loads and saves the whole store as one JSON file.

mod arena;
mod cleanup;
mod file;

pub(crate) use arena::arena_id;
pub use arena::{Arena, ArenaId, Keyed, Registry, Upserted, upsert_entry};
pub use cleanup::{CleanupReport, FileTreeCleaner, NoOpCleaner, StoreCleaner};
pub use file::JsonStore;

use crate::error::StoreError;
use crate::model::{
    ComponentId, Copyright, CopyrightId, DocumentId, DocumentRoot, FileId, InventoryItem, ItemId,
    License, LicenseId, Project, ProjectFile, ProjectId, SoftwareComponent,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Entity counts, used for reporting and idempotence checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub projects: usize,
    pub items: usize,
    pub components: usize,
    pub licenses: usize,
    pub copyrights: usize,
    pub files: usize,
    pub documents: usize,
}

/// In-memory repositories.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryStore {
    projects: Arena<ProjectId, Project>,
    items: Registry<ItemId, InventoryItem>,
    components: Registry<ComponentId, SoftwareComponent>,
    licenses: Registry<LicenseId, License>,
    copyrights: Registry<CopyrightId, Copyright>,
    files: Registry<FileId, ProjectFile>,
    documents: Registry<DocumentId, DocumentRoot>,
}

impl InventoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn counts(&self) -> StoreCounts {
        StoreCounts {
            projects: self.projects.len(),
            items: self.items.len(),
            components: self.components.len(),
            licenses: self.licenses.len(),
            copyrights: self.copyrights.len(),
            files: self.files.len(),
            documents: self.documents.len(),
        }
    }

    // ========================================================================
    // Projects
    // ========================================================================

    pub fn create_project(&mut self, project: Project) -> ProjectId {
        let id = self.projects.push(project);
        tracing::info!(project = %id, "Created project");
        id
    }

    #[must_use]
    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.get(id)
    }

    pub fn projects(&self) -> impl Iterator<Item = (ProjectId, &Project)> {
        self.projects.iter()
    }

    // ========================================================================
    // Inventory items
    // ========================================================================

    #[must_use]
    pub fn find_item(&self, project: ProjectId, spdx_id: &str) -> Option<ItemId> {
        self.items.find(&(project, spdx_id.to_string()))
    }

    /// Find the item imported from `spdx_id` in `project`, or create it.
    pub fn upsert_item(
        &mut self,
        project: ProjectId,
        spdx_id: &str,
        create: impl FnOnce() -> InventoryItem,
    ) -> Upserted<ItemId> {
        self.items.upsert_with((project, spdx_id.to_string()), create)
    }

    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&InventoryItem> {
        self.items.get(id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Result<&mut InventoryItem, StoreError> {
        self.items.get_mut(id).ok_or(StoreError::Missing {
            kind: "inventory item",
            index: id.index(),
        })
    }

    pub fn items_of(&self, project: ProjectId) -> impl Iterator<Item = (ItemId, &InventoryItem)> {
        self.items.iter().filter(move |(_, item)| item.project == project)
    }

    /// Whether `ancestor` appears on the parent chain of `item`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: ItemId, item: ItemId) -> bool {
        let mut current = self.item(item).and_then(|i| i.parent);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.items.len() {
                return false;
            }
            current = self.item(id).and_then(|i| i.parent);
        }
        false
    }

    // ========================================================================
    // Software components
    // ========================================================================

    pub fn find_or_create_component(&mut self, name: &str, version: &str) -> Upserted<ComponentId> {
        self.components
            .upsert_with((name.to_string(), version.to_string()), || {
                SoftwareComponent::new(name, version)
            })
    }

    #[must_use]
    pub fn component(&self, id: ComponentId) -> Option<&SoftwareComponent> {
        self.components.get(id)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Result<&mut SoftwareComponent, StoreError> {
        self.components.get_mut(id).ok_or(StoreError::Missing {
            kind: "software component",
            index: id.index(),
        })
    }

    // ========================================================================
    // Licenses
    // ========================================================================

    /// Find a license by type and exact text, or create it.
    ///
    /// A new license whose type already exists with a different text is
    /// named `<name>-variant`.
    pub fn find_or_create_license(
        &mut self,
        license_type: &str,
        text: &str,
        name: &str,
        is_standard: bool,
    ) -> Upserted<LicenseId> {
        let key = (license_type.to_string(), text.to_string());
        if let Some(id) = self.licenses.find(&key) {
            return Upserted { id, created: false };
        }

        let is_variant = self
            .licenses
            .iter()
            .any(|(_, license)| license.license_type == license_type);
        let name = if is_variant {
            format!("{name}-variant")
        } else {
            name.to_string()
        };

        self.licenses.upsert_with(key, || License {
            license_type: license_type.to_string(),
            name,
            text: text.to_string(),
            curated: false,
            is_standard,
        })
    }

    #[must_use]
    pub fn license(&self, id: LicenseId) -> Option<&License> {
        self.licenses.get(id)
    }

    pub fn licenses(&self) -> impl Iterator<Item = (LicenseId, &License)> {
        self.licenses.iter()
    }

    // ========================================================================
    // Copyrights
    // ========================================================================

    /// Find or create one copyright per distinct statement, linking each to
    /// the files it was found in. Returns handles in statement order.
    pub fn find_or_create_copyrights(
        &mut self,
        statements: &IndexMap<String, Vec<FileId>>,
    ) -> Vec<CopyrightId> {
        let mut ids = Vec::with_capacity(statements.len());
        for (text, files) in statements {
            let upserted = self.copyrights.upsert_with(text.clone(), || Copyright {
                text: text.clone(),
                files: Vec::new(),
                curated: false,
            });
            if let Some(copyright) = self.copyrights.get_mut(upserted.id) {
                for file in files {
                    if !copyright.files.contains(file) {
                        copyright.files.push(*file);
                    }
                }
            }
            ids.push(upserted.id);
        }
        ids
    }

    #[must_use]
    pub fn find_copyright(&self, text: &str) -> Option<CopyrightId> {
        self.copyrights.find(&text.to_string())
    }

    #[must_use]
    pub fn copyright(&self, id: CopyrightId) -> Option<&Copyright> {
        self.copyrights.get(id)
    }

    // ========================================================================
    // Project files
    // ========================================================================

    /// Find or create a file placeholder per distinct path under `item`.
    pub fn find_or_create_files<'p>(
        &mut self,
        project: ProjectId,
        item: ItemId,
        paths: impl IntoIterator<Item = &'p str>,
    ) -> IndexMap<String, FileId> {
        let mut out = IndexMap::new();
        for path in paths {
            if out.contains_key(path) {
                continue;
            }
            let upserted = self
                .files
                .upsert_with((item, path.to_string()), || ProjectFile::new(project, item, path));
            out.insert(path.to_string(), upserted.id);
        }
        out
    }

    #[must_use]
    pub fn file(&self, id: FileId) -> Option<&ProjectFile> {
        self.files.get(id)
    }

    /// Delete every file placeholder of `project` and unlink it from
    /// copyrights. Returns the number of placeholders removed.
    pub fn remove_project_files(&mut self, project: ProjectId) -> usize {
        let doomed: Vec<FileId> = self
            .files
            .iter()
            .filter(|(_, file)| file.project == project)
            .map(|(id, _)| id)
            .collect();
        if doomed.is_empty() {
            return 0;
        }

        for id in &doomed {
            self.files.remove(*id);
        }
        let copyright_ids: Vec<CopyrightId> = self.copyrights.iter().map(|(id, _)| id).collect();
        for id in copyright_ids {
            if let Some(copyright) = self.copyrights.get_mut(id) {
                copyright.files.retain(|f| !doomed.contains(f));
            }
        }
        doomed.len()
    }

    // ========================================================================
    // Documents
    // ========================================================================

    pub fn upsert_document(&mut self, document_uri: &str) -> Upserted<DocumentId> {
        self.documents
            .upsert_with(document_uri.to_string(), || DocumentRoot::new(document_uri))
    }

    #[must_use]
    pub fn find_document(&self, document_uri: &str) -> Option<DocumentId> {
        self.documents.find(&document_uri.to_string())
    }

    #[must_use]
    pub fn document(&self, id: DocumentId) -> Option<&DocumentRoot> {
        self.documents.get(id)
    }

    pub fn document_mut(&mut self, id: DocumentId) -> Result<&mut DocumentRoot, StoreError> {
        self.documents.get_mut(id).ok_or(StoreError::Missing {
            kind: "document",
            index: id.index(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_project() -> (InventoryStore, ProjectId) {
        let mut store = InventoryStore::new();
        let project = store.create_project(Project::new("demo", None));
        (store, project)
    }

    #[test]
    fn test_license_variant_naming() {
        let mut store = InventoryStore::new();
        let first = store.find_or_create_license("LicenseRef-x", "text one", "LicenseRef-x", false);
        let same =
            store.find_or_create_license("LicenseRef-x", "text one", "LicenseRef-x", false);
        let variant =
            store.find_or_create_license("LicenseRef-x", "text two", "LicenseRef-x", false);

        assert_eq!(first.id, same.id);
        assert!(!same.created);
        assert!(variant.created);
        assert_eq!(
            store.license(variant.id).map(|l| l.name.as_str()),
            Some("LicenseRef-x-variant")
        );
        assert_eq!(store.counts().licenses, 2);
    }

    #[test]
    fn test_copyright_batch_dedupes_and_links_files() {
        let (mut store, project) = store_with_project();
        let item = store
            .upsert_item(project, "SPDXRef-a", || InventoryItem::new(project, "SPDXRef-a", "a"))
            .id;
        let files = store.find_or_create_files(project, item, ["./a.c", "./b.c", "./a.c"]);
        assert_eq!(files.len(), 2);

        let mut statements = IndexMap::new();
        statements.insert("Copyright 2020 Jane Doe".to_string(), vec![files["./a.c"]]);
        let first = store.find_or_create_copyrights(&statements);

        statements.insert("Copyright 2020 Jane Doe".to_string(), vec![files["./b.c"]]);
        let second = store.find_or_create_copyrights(&statements);

        assert_eq!(first, second);
        assert_eq!(store.counts().copyrights, 1);
        assert_eq!(store.copyright(first[0]).map(|c| c.files.len()), Some(2));
    }

    #[test]
    fn test_remove_project_files_unlinks_copyrights() {
        let (mut store, project) = store_with_project();
        let item = store
            .upsert_item(project, "SPDXRef-a", || InventoryItem::new(project, "SPDXRef-a", "a"))
            .id;
        let files = store.find_or_create_files(project, item, ["./a.c"]);
        let mut statements = IndexMap::new();
        statements.insert("(c) Someone".to_string(), files.values().copied().collect());
        let ids = store.find_or_create_copyrights(&statements);

        assert_eq!(store.remove_project_files(project), 1);
        assert_eq!(store.counts().files, 0);
        assert_eq!(store.copyright(ids[0]).map(|c| c.files.len()), Some(0));
        assert_eq!(store.remove_project_files(project), 0);
    }

    #[test]
    fn test_is_ancestor() {
        let (mut store, project) = store_with_project();
        let a = store.upsert_item(project, "a", || InventoryItem::new(project, "a", "a")).id;
        let b = store.upsert_item(project, "b", || InventoryItem::new(project, "b", "b")).id;
        let c = store.upsert_item(project, "c", || InventoryItem::new(project, "c", "c")).id;
        store.item_mut(b).unwrap().parent = Some(a);
        store.item_mut(c).unwrap().parent = Some(b);

        assert!(store.is_ancestor(a, c));
        assert!(!store.is_ancestor(c, a));
        assert!(!store.is_ancestor(a, a));
    }
}
