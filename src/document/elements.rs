//! Serde model of an SPDX 2.x JSON document.
//!
//! Every field the importer reads or persists is modeled; everything else in
//! the document is ignored. Collections default to empty so that sparse
//! documents still deserialize.

use serde::{Deserialize, Serialize};

/// Top-level SPDX document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpdxDocument {
    pub spdx_version: String,
    pub data_license: Option<String>,
    #[serde(rename = "SPDXID")]
    pub spdx_id: String,
    pub name: String,
    pub document_namespace: String,
    pub comment: Option<String>,
    pub creation_info: Option<CreationInfo>,
    pub external_document_refs: Vec<ExternalDocumentRef>,
    pub has_extracted_licensing_infos: Vec<ExtractedLicensingInfo>,
    pub document_describes: Vec<String>,
    pub packages: Vec<SpdxPackage>,
    pub files: Vec<SpdxFile>,
    pub snippets: Vec<SpdxSnippet>,
    pub relationships: Vec<SpdxRelationship>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreationInfo {
    pub created: Option<String>,
    pub creators: Vec<String>,
    pub license_list_version: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalDocumentRef {
    pub external_document_id: String,
    pub spdx_document: String,
    pub checksum: Option<Checksum>,
}

/// A license defined inside the document (`LicenseRef-*`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedLicensingInfo {
    pub license_id: String,
    pub extracted_text: String,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub see_alsos: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checksum {
    pub algorithm: String,
    pub checksum_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalRef {
    pub reference_category: String,
    pub reference_type: String,
    pub reference_locator: String,
    pub comment: Option<String>,
}

impl ExternalRef {
    /// Whether this reference identifies the package in a package manager.
    ///
    /// SPDX 2.2 spells the category with a hyphen, 2.3 with an underscore.
    #[must_use]
    pub fn is_package_manager(&self) -> bool {
        self.reference_type == "purl"
            || matches!(
                self.reference_category.as_str(),
                "PACKAGE-MANAGER" | "PACKAGE_MANAGER"
            )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Annotation {
    pub annotation_date: String,
    pub annotation_type: String,
    pub annotator: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageVerificationCode {
    pub package_verification_code_value: String,
    pub package_verification_code_excluded_files: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpdxPackage {
    #[serde(rename = "SPDXID")]
    pub spdx_id: String,
    pub name: Option<String>,
    pub version_info: Option<String>,
    pub package_file_name: Option<String>,
    pub supplier: Option<String>,
    pub originator: Option<String>,
    pub download_location: Option<String>,
    pub files_analyzed: Option<bool>,
    pub package_verification_code: Option<PackageVerificationCode>,
    pub checksums: Vec<Checksum>,
    pub homepage: Option<String>,
    pub license_concluded: Option<String>,
    pub license_info_from_files: Vec<String>,
    pub license_declared: Option<String>,
    pub copyright_text: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub external_refs: Vec<ExternalRef>,
    pub has_files: Vec<String>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpdxFile {
    #[serde(rename = "SPDXID")]
    pub spdx_id: String,
    pub file_name: String,
    pub file_types: Vec<String>,
    pub checksums: Vec<Checksum>,
    pub license_concluded: Option<String>,
    pub license_info_in_files: Vec<String>,
    pub copyright_text: Option<String>,
    pub comment: Option<String>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpdxSnippet {
    #[serde(rename = "SPDXID")]
    pub spdx_id: String,
    pub name: Option<String>,
    pub snippet_from_file: String,
    pub ranges: Vec<SnippetRange>,
    pub license_concluded: Option<String>,
    pub license_info_in_snippets: Vec<String>,
    pub copyright_text: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetRange {
    pub start_pointer: RangePointer,
    pub end_pointer: RangePointer,
}

/// One end of a snippet range: a byte offset or a line number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RangePointer {
    pub reference: Option<String>,
    pub offset: Option<u64>,
    pub line_number: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpdxRelationship {
    pub spdx_element_id: String,
    pub relationship_type: String,
    pub related_spdx_element: String,
    pub comment: Option<String>,
}
