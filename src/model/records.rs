//! Persisted mirror of the imported SPDX document.
//!
//! A [`DocumentRoot`] is keyed by document namespace. Its element records are
//! keyed by SPDX id (relationships by their source/type/target triple), so a
//! re-import updates records in place instead of appending new ones.

use crate::document::{
    Annotation, Checksum, CreationInfo, ExternalDocumentRef, ExternalRef, ExtractedLicensingInfo,
    PackageVerificationCode, SnippetRange,
};
use crate::store::Keyed;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRoot {
    /// `documentNamespace`
    pub document_uri: String,
    pub spdx_id: String,
    pub name: String,
    pub spdx_version: String,
    pub data_license: Option<String>,
    pub comment: Option<String>,
    /// xxh3 of the imported bytes
    pub content_hash: u64,
    pub imported_at: DateTime<Utc>,
    pub creation_info: Option<CreationInfo>,
    pub external_document_refs: Vec<ExternalDocumentRef>,
    pub extracted_licenses: Vec<ExtractedLicensingInfo>,
    pub packages: IndexMap<String, PackageRecord>,
    pub files: IndexMap<String, FileRecord>,
    pub snippets: IndexMap<String, SnippetRecord>,
    pub relationships: IndexMap<String, RelationshipRecord>,
}

impl DocumentRoot {
    #[must_use]
    pub fn new(document_uri: impl Into<String>) -> Self {
        Self {
            document_uri: document_uri.into(),
            spdx_id: String::new(),
            name: String::new(),
            spdx_version: String::new(),
            data_license: None,
            comment: None,
            content_hash: 0,
            imported_at: Utc::now(),
            creation_info: None,
            external_document_refs: Vec::new(),
            extracted_licenses: Vec::new(),
            packages: IndexMap::new(),
            files: IndexMap::new(),
            snippets: IndexMap::new(),
            relationships: IndexMap::new(),
        }
    }
}

impl Keyed for DocumentRoot {
    type Key = String;

    fn key(&self) -> Self::Key {
        self.document_uri.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub spdx_id: String,
    pub name: String,
    pub version: Option<String>,
    pub package_file_name: Option<String>,
    pub copyright_text: Option<String>,
    pub download_location: Option<String>,
    pub license_concluded: Option<String>,
    pub license_declared: Option<String>,
    pub homepage: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub originator: Option<String>,
    pub supplier: Option<String>,
    pub files_analyzed: Option<bool>,
    pub verification_code: Option<PackageVerificationCode>,
    pub checksums: Vec<Checksum>,
    pub external_refs: Vec<ExternalRef>,
    pub annotations: Vec<Annotation>,
    pub license_info_from_files: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub spdx_id: String,
    pub file_name: String,
    pub copyright_text: Option<String>,
    pub license_concluded: Option<String>,
    pub comment: Option<String>,
    pub file_types: Vec<String>,
    pub license_info_in_files: Vec<String>,
    pub checksums: Vec<Checksum>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetRecord {
    pub spdx_id: String,
    pub name: Option<String>,
    pub copyright_text: Option<String>,
    pub snippet_from_file: String,
    pub license_concluded: Option<String>,
    pub comment: Option<String>,
    pub license_info_in_snippets: Vec<String>,
    pub ranges: Vec<SnippetRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub source_id: String,
    pub relationship_type: String,
    /// `None` when the document relates to `NONE` or `NOASSERTION`
    pub target_id: Option<String>,
    pub comment: Option<String>,
}

impl RelationshipRecord {
    /// Identity of an edge within a document.
    #[must_use]
    pub fn edge_key(source: &str, relationship_type: &str, target: Option<&str>) -> String {
        format!("{source}|{relationship_type}|{}", target.unwrap_or(""))
    }

    #[must_use]
    pub fn key(&self) -> String {
        Self::edge_key(
            &self.source_id,
            &self.relationship_type,
            self.target_id.as_deref(),
        )
    }
}
