//! The SPDX object graph consumed by the importer.
//!
//! [`SpdxDocument`] is the deserialized document as written. A
//! [`DocumentIndex`] borrows it and answers the lookups the import passes
//! need: elements by id, the outgoing relationships of an element, the member
//! files of a package, and the packages the document describes.

mod elements;
mod expression;

pub use elements::*;
pub use expression::{ExpressionError, LicenseExpression, is_license_ref, is_listed};

use indexmap::IndexSet;
use std::collections::{HashMap, HashSet};

/// Well-known relationship types the importer interprets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    Contains,
    ContainedBy,
    DependsOn,
    DependencyOf,
    AncestorOf,
    DescendantOf,
    StaticLink,
    DynamicLink,
    Describes,
    DescribedBy,
    Other(String),
}

impl RelationshipKind {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "CONTAINS" => Self::Contains,
            "CONTAINED_BY" => Self::ContainedBy,
            "DEPENDS_ON" => Self::DependsOn,
            "DEPENDENCY_OF" => Self::DependencyOf,
            "ANCESTOR_OF" => Self::AncestorOf,
            "DESCENDANT_OF" => Self::DescendantOf,
            "STATIC_LINK" => Self::StaticLink,
            "DYNAMIC_LINK" => Self::DynamicLink,
            "DESCRIBES" => Self::Describes,
            "DESCRIBED_BY" => Self::DescribedBy,
            other => Self::Other(other.to_string()),
        }
    }

    /// The source element becomes the parent of the target.
    #[must_use]
    pub const fn parents_target(&self) -> bool {
        matches!(self, Self::Contains | Self::DependsOn | Self::AncestorOf)
    }

    /// The target element becomes the parent of the source.
    #[must_use]
    pub const fn parents_source(&self) -> bool {
        matches!(self, Self::ContainedBy | Self::DependencyOf | Self::DescendantOf)
    }
}

/// Kind of element an SPDX id resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Document,
    Package,
    File,
    Snippet,
}

/// Borrowed lookup tables over an [`SpdxDocument`].
#[derive(Debug)]
pub struct DocumentIndex<'a> {
    document: &'a SpdxDocument,
    packages: HashMap<&'a str, &'a SpdxPackage>,
    files: HashMap<&'a str, &'a SpdxFile>,
    snippets: HashMap<&'a str, &'a SpdxSnippet>,
    outgoing: HashMap<&'a str, Vec<&'a SpdxRelationship>>,
    extracted: HashMap<&'a str, &'a ExtractedLicensingInfo>,
}

impl<'a> DocumentIndex<'a> {
    /// Build the index. First occurrence wins for duplicated ids.
    #[must_use]
    pub fn build(document: &'a SpdxDocument) -> Self {
        let mut packages = HashMap::with_capacity(document.packages.len());
        for package in &document.packages {
            packages.entry(package.spdx_id.as_str()).or_insert(package);
        }

        let mut files = HashMap::with_capacity(document.files.len());
        for file in &document.files {
            files.entry(file.spdx_id.as_str()).or_insert(file);
        }

        let mut snippets = HashMap::with_capacity(document.snippets.len());
        for snippet in &document.snippets {
            snippets.entry(snippet.spdx_id.as_str()).or_insert(snippet);
        }

        let mut outgoing: HashMap<&str, Vec<&SpdxRelationship>> = HashMap::new();
        for rel in &document.relationships {
            outgoing
                .entry(rel.spdx_element_id.as_str())
                .or_default()
                .push(rel);
        }

        let extracted = document
            .has_extracted_licensing_infos
            .iter()
            .map(|info| (info.license_id.as_str(), info))
            .collect();

        Self {
            document,
            packages,
            files,
            snippets,
            outgoing,
            extracted,
        }
    }

    #[must_use]
    pub const fn document(&self) -> &'a SpdxDocument {
        self.document
    }

    #[must_use]
    pub fn package(&self, id: &str) -> Option<&'a SpdxPackage> {
        self.packages.get(id).copied()
    }

    #[must_use]
    pub fn file(&self, id: &str) -> Option<&'a SpdxFile> {
        self.files.get(id).copied()
    }

    #[must_use]
    pub fn snippet(&self, id: &str) -> Option<&'a SpdxSnippet> {
        self.snippets.get(id).copied()
    }

    #[must_use]
    pub fn extracted_license(&self, license_id: &str) -> Option<&'a ExtractedLicensingInfo> {
        self.extracted.get(license_id).copied()
    }

    #[must_use]
    pub fn element_kind(&self, id: &str) -> Option<ElementKind> {
        if id == self.document.spdx_id {
            Some(ElementKind::Document)
        } else if self.packages.contains_key(id) {
            Some(ElementKind::Package)
        } else if self.files.contains_key(id) {
            Some(ElementKind::File)
        } else if self.snippets.contains_key(id) {
            Some(ElementKind::Snippet)
        } else {
            None
        }
    }

    /// Relationships whose `spdxElementId` is `id`, in document order.
    #[must_use]
    pub fn relationships_of(&self, id: &str) -> &[&'a SpdxRelationship] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Distinct packages, first occurrence of each id, in document order.
    pub fn packages(&self) -> impl Iterator<Item = &'a SpdxPackage> + '_ {
        let mut seen = HashSet::new();
        self.document.packages.iter().filter(move |pkg| {
            let pkg: &'a SpdxPackage = *pkg;
            seen.insert(pkg.spdx_id.as_str())
        })
    }

    /// Distinct files, first occurrence of each id, in document order.
    pub fn files(&self) -> impl Iterator<Item = &'a SpdxFile> + '_ {
        let mut seen = HashSet::new();
        self.document.files.iter().filter(move |file| {
            let file: &'a SpdxFile = *file;
            seen.insert(file.spdx_id.as_str())
        })
    }

    /// Member files of a package: `hasFiles` followed by the files it
    /// `CONTAINS`, without repeats. Ids with no file element are dropped.
    #[must_use]
    pub fn package_files(&self, package: &'a SpdxPackage) -> Vec<&'a SpdxFile> {
        let contained = self
            .relationships_of(&package.spdx_id)
            .iter()
            .filter(|rel| {
                RelationshipKind::parse(&rel.relationship_type) == RelationshipKind::Contains
            })
            .map(|rel| rel.related_spdx_element.as_str());

        let ids: IndexSet<&str> = package
            .has_files
            .iter()
            .map(String::as_str)
            .chain(contained)
            .collect();

        ids.into_iter().filter_map(|id| self.file(id)).collect()
    }

    /// Ids the document describes, from `documentDescribes` and from
    /// `DESCRIBES` relationships of the document element.
    #[must_use]
    pub fn described_ids(&self) -> IndexSet<String> {
        let mut ids: IndexSet<String> = self.document.document_describes.iter().cloned().collect();
        for rel in self.relationships_of(&self.document.spdx_id) {
            if RelationshipKind::parse(&rel.relationship_type) == RelationshipKind::Describes {
                ids.insert(rel.related_spdx_element.clone());
            }
        }
        ids
    }
}
