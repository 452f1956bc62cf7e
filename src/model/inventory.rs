//! Persisted inventory entities.

use super::{ComponentId, CopyrightId, FileId, ItemId, LicenseId, ProjectId};
use crate::store::Keyed;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Component version used for files that no package claims.
pub const STANDALONE_VERSION: &str = "Standalone";

/// A project the inventory is built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    /// Directory downloaded sources and the project file tree live under
    pub base_path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    #[must_use]
    pub fn new(name: impl Into<String>, base_path: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            base_path,
            created_at: Utc::now(),
        }
    }
}

/// How an item is linked into its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Linking {
    Static,
    Dynamic,
}

impl fmt::Display for Linking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// One concrete occurrence of a dependency in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub project: ProjectId,
    /// SPDX element id the item was imported from
    pub spdx_id: String,
    pub name: String,
    /// Number of files
    pub size: usize,
    pub parent: Option<ItemId>,
    pub component: Option<ComponentId>,
    pub linking: Option<Linking>,
    /// The license expression combined several licenses with AND
    pub was_combined: bool,
    pub curated: bool,
    pub external_notes: Option<String>,
}

impl InventoryItem {
    #[must_use]
    pub fn new(project: ProjectId, spdx_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project,
            spdx_id: spdx_id.into(),
            name: name.into(),
            size: 0,
            parent: None,
            component: None,
            linking: None,
            was_combined: false,
            curated: false,
            external_notes: None,
        }
    }
}

impl Keyed for InventoryItem {
    type Key = (ProjectId, String);

    fn key(&self) -> Self::Key {
        (self.project, self.spdx_id.clone())
    }
}

/// A physical or logical unit of software, shared between items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareComponent {
    pub name: String,
    pub version: String,
    pub purl: Option<String>,
    /// Where the component can be obtained
    pub details_url: Option<String>,
    pub licenses: Vec<LicenseId>,
    pub copyrights: Vec<CopyrightId>,
}

impl SoftwareComponent {
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            purl: None,
            details_url: None,
            licenses: Vec::new(),
            copyrights: Vec::new(),
        }
    }

    /// Add a license unless already present. Returns whether it was added.
    pub fn add_license(&mut self, license: LicenseId) -> bool {
        if self.licenses.contains(&license) {
            return false;
        }
        self.licenses.push(license);
        true
    }

    /// Add a copyright unless already present. Returns whether it was added.
    pub fn add_copyright(&mut self, copyright: CopyrightId) -> bool {
        if self.copyrights.contains(&copyright) {
            return false;
        }
        self.copyrights.push(copyright);
        true
    }
}

impl Keyed for SoftwareComponent {
    type Key = (String, String);

    fn key(&self) -> Self::Key {
        (self.name.clone(), self.version.clone())
    }
}

/// A license as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// SPDX license id or `LicenseRef-*`
    pub license_type: String,
    pub name: String,
    pub text: String,
    pub curated: bool,
    /// On the SPDX license list
    pub is_standard: bool,
}

impl Keyed for License {
    type Key = (String, String);

    fn key(&self) -> Self::Key {
        (self.license_type.clone(), self.text.clone())
    }
}

/// A copyright statement, unique by text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Copyright {
    pub text: String,
    /// Files the statement was found in
    pub files: Vec<FileId>,
    pub curated: bool,
}

impl Keyed for Copyright {
    type Key = String;

    fn key(&self) -> Self::Key {
        self.text.clone()
    }
}

/// Placeholder for a file of an item in the project file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub project: ProjectId,
    pub item: ItemId,
    pub project_path: String,
    pub file_name: String,
}

impl ProjectFile {
    #[must_use]
    pub fn new(project: ProjectId, item: ItemId, project_path: &str) -> Self {
        let file_name = project_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(project_path)
            .to_string();
        Self {
            project,
            item,
            project_path: project_path.to_string(),
            file_name,
        }
    }
}

impl Keyed for ProjectFile {
    type Key = (ItemId, String);

    fn key(&self) -> Self::Key {
        (self.item, self.project_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_add_is_idempotent() {
        let mut comp = SoftwareComponent::new("pkg1", "1.0");
        assert!(comp.add_license(LicenseId::from_index(0)));
        assert!(!comp.add_license(LicenseId::from_index(0)));
        assert!(comp.add_copyright(CopyrightId::from_index(2)));
        assert!(!comp.add_copyright(CopyrightId::from_index(2)));
        assert_eq!(comp.licenses.len(), 1);
        assert_eq!(comp.copyrights.len(), 1);
    }

    #[test]
    fn test_project_file_name() {
        let file = ProjectFile::new(
            ProjectId::from_index(0),
            ItemId::from_index(1),
            "./src/lib/a.c",
        );
        assert_eq!(file.file_name, "a.c");
        let file = ProjectFile::new(ProjectId::from_index(0), ItemId::from_index(1), "README");
        assert_eq!(file.file_name, "README");
    }

    #[test]
    fn test_item_key_is_project_scoped() {
        let a = InventoryItem::new(ProjectId::from_index(0), "SPDXRef-a", "a");
        let b = InventoryItem::new(ProjectId::from_index(1), "SPDXRef-a", "a");
        assert_ne!(a.key(), b.key());
    }
}
