//! Mapping of SPDX elements onto the persisted document mirror.
//!
//! Each conversion finds the existing record by its key (document URI,
//! element id or relationship triple) and creates it on a miss. Scalars are
//! overwritten in place and every child collection is cleared and filled
//! again, so a re-import converges on the document's current content.
//! Records of other elements are never touched.

use crate::document::{SpdxDocument, SpdxFile, SpdxPackage, SpdxRelationship, SpdxSnippet};
use crate::error::{ConvertError, StoreError};
use crate::model::{
    DocumentId, DocumentRoot, FileRecord, PackageRecord, RelationshipRecord, SnippetRecord,
};
use crate::store::{InventoryStore, upsert_entry};
use chrono::Utc;
use xxhash_rust::xxh3::xxh3_64;

/// Key of the document root. Documents without a namespace fall back to
/// their name and id.
#[must_use]
pub fn document_uri(document: &SpdxDocument) -> String {
    let namespace = document.document_namespace.trim();
    if namespace.is_empty() {
        format!("urn:spdx-inventory:{}#{}", document.name, document.spdx_id)
    } else {
        namespace.to_string()
    }
}

/// Convert the document header. Returns the root handle and whether the root
/// was created by this call.
pub fn convert_document(
    store: &mut InventoryStore,
    document: &SpdxDocument,
    raw: &[u8],
) -> Result<(DocumentId, bool), StoreError> {
    let uri = document_uri(document);
    if document.document_namespace.trim().is_empty() {
        tracing::warn!(document_uri = %uri, "Document has no namespace");
    }

    let upserted = store.upsert_document(&uri);
    let root = store.document_mut(upserted.id)?;

    root.spdx_id.clone_from(&document.spdx_id);
    root.name.clone_from(&document.name);
    root.spdx_version.clone_from(&document.spdx_version);
    root.data_license.clone_from(&document.data_license);
    root.comment.clone_from(&document.comment);
    root.creation_info.clone_from(&document.creation_info);
    root.content_hash = xxh3_64(raw);
    root.imported_at = Utc::now();

    root.external_document_refs.clear();
    root.external_document_refs
        .extend(document.external_document_refs.iter().cloned());
    root.extracted_licenses.clear();
    root.extracted_licenses
        .extend(document.has_extracted_licensing_infos.iter().cloned());

    tracing::debug!(
        document_uri = %uri,
        created = upserted.created,
        extracted_licenses = root.extracted_licenses.len(),
        "Converted document header"
    );
    Ok((upserted.id, upserted.created))
}

pub fn convert_package(root: &mut DocumentRoot, package: &SpdxPackage) -> Result<(), ConvertError> {
    if package.spdx_id.is_empty() {
        return Err(ConvertError::missing_field(
            package.name.as_deref().unwrap_or("<package>"),
            "SPDXID",
        ));
    }

    let (record, created) = upsert_entry(&mut root.packages, package.spdx_id.clone(), || {
        PackageRecord {
            spdx_id: package.spdx_id.clone(),
            ..PackageRecord::default()
        }
    });

    record.name = package.name.clone().unwrap_or_else(|| package.spdx_id.clone());
    record.version.clone_from(&package.version_info);
    record.package_file_name.clone_from(&package.package_file_name);
    record.copyright_text.clone_from(&package.copyright_text);
    record.download_location.clone_from(&package.download_location);
    record.license_concluded.clone_from(&package.license_concluded);
    record.license_declared.clone_from(&package.license_declared);
    record.homepage.clone_from(&package.homepage);
    record.summary.clone_from(&package.summary);
    record.description.clone_from(&package.description);
    record.originator.clone_from(&package.originator);
    record.supplier.clone_from(&package.supplier);
    record.files_analyzed = package.files_analyzed;
    record.verification_code.clone_from(&package.package_verification_code);

    record.checksums.clear();
    record.checksums.extend(package.checksums.iter().cloned());
    record.external_refs.clear();
    record.external_refs.extend(package.external_refs.iter().cloned());
    record.annotations.clear();
    record.annotations.extend(package.annotations.iter().cloned());
    record.license_info_from_files.clear();
    record
        .license_info_from_files
        .extend(package.license_info_from_files.iter().cloned());

    tracing::debug!(package = %package.spdx_id, created, "Converted package");
    Ok(())
}

pub fn convert_file(root: &mut DocumentRoot, file: &SpdxFile) -> Result<(), ConvertError> {
    if file.spdx_id.is_empty() {
        return Err(ConvertError::missing_field(&file.file_name, "SPDXID"));
    }

    let (record, created) = upsert_entry(&mut root.files, file.spdx_id.clone(), || FileRecord {
        spdx_id: file.spdx_id.clone(),
        ..FileRecord::default()
    });

    record.file_name.clone_from(&file.file_name);
    record.copyright_text.clone_from(&file.copyright_text);
    record.license_concluded.clone_from(&file.license_concluded);
    record.comment.clone_from(&file.comment);

    record.file_types.clear();
    record.file_types.extend(file.file_types.iter().cloned());
    record.license_info_in_files.clear();
    record
        .license_info_in_files
        .extend(file.license_info_in_files.iter().cloned());
    record.checksums.clear();
    record.checksums.extend(file.checksums.iter().cloned());
    record.annotations.clear();
    record.annotations.extend(file.annotations.iter().cloned());

    tracing::debug!(file = %file.spdx_id, created, "Converted file");
    Ok(())
}

pub fn convert_snippet(root: &mut DocumentRoot, snippet: &SpdxSnippet) -> Result<(), ConvertError> {
    if snippet.spdx_id.is_empty() {
        return Err(ConvertError::missing_field(
            snippet.name.as_deref().unwrap_or("<snippet>"),
            "SPDXID",
        ));
    }
    if snippet.snippet_from_file.is_empty() {
        return Err(ConvertError::missing_field(&snippet.spdx_id, "snippetFromFile"));
    }

    let (record, created) =
        upsert_entry(&mut root.snippets, snippet.spdx_id.clone(), || SnippetRecord {
            spdx_id: snippet.spdx_id.clone(),
            ..SnippetRecord::default()
        });

    record.name.clone_from(&snippet.name);
    record.copyright_text.clone_from(&snippet.copyright_text);
    record.snippet_from_file.clone_from(&snippet.snippet_from_file);
    record.license_concluded.clone_from(&snippet.license_concluded);
    record.comment.clone_from(&snippet.comment);

    record.license_info_in_snippets.clear();
    record
        .license_info_in_snippets
        .extend(snippet.license_info_in_snippets.iter().cloned());
    record.ranges.clear();
    record.ranges.extend(snippet.ranges.iter().cloned());

    tracing::debug!(snippet = %snippet.spdx_id, created, "Converted snippet");
    Ok(())
}

/// Persist one relationship edge. Targets `NONE` and `NOASSERTION` are
/// stored without a target. Returns whether the edge is new.
pub fn convert_relationship(
    root: &mut DocumentRoot,
    relationship: &SpdxRelationship,
) -> Result<bool, ConvertError> {
    if relationship.spdx_element_id.is_empty() {
        return Err(ConvertError::missing_field(
            &relationship.related_spdx_element,
            "spdxElementId",
        ));
    }
    if relationship.relationship_type.is_empty() {
        return Err(ConvertError::missing_field(
            &relationship.spdx_element_id,
            "relationshipType",
        ));
    }

    let target = match relationship.related_spdx_element.trim() {
        "" | "NONE" | "NOASSERTION" => None,
        id => Some(id),
    };
    let key = RelationshipRecord::edge_key(
        &relationship.spdx_element_id,
        &relationship.relationship_type,
        target,
    );

    let (record, created) = upsert_entry(&mut root.relationships, key, || RelationshipRecord {
        source_id: relationship.spdx_element_id.clone(),
        relationship_type: relationship.relationship_type.clone(),
        target_id: target.map(str::to_string),
        comment: None,
    });
    record.comment.clone_from(&relationship.comment);
    Ok(created)
}
