//! SPDX JSON parser.
//!
//! Supports SPDX versions 2.2 and 2.3 in JSON.

use crate::document::SpdxDocument;
use crate::parsers::traits::ParseError;
use std::path::Path;

/// SPDX versions this parser accepts.
pub const SUPPORTED_VERSIONS: &[&str] = &["SPDX-2.2", "SPDX-2.3"];

/// Parser for SPDX JSON documents
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdxJsonParser {
    /// Reject versions outside [`SUPPORTED_VERSIONS`]
    strict: bool,
}

impl SpdxJsonParser {
    /// Create a new parser that accepts any `SPDX-*` version
    #[must_use]
    pub const fn new() -> Self {
        Self { strict: false }
    }

    /// Create a parser that only accepts supported versions
    #[must_use]
    pub const fn strict() -> Self {
        Self { strict: true }
    }

    /// Parse a document from raw bytes
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<SpdxDocument, ParseError> {
        let document: SpdxDocument = serde_json::from_slice(bytes)?;
        self.check(document)
    }

    /// Parse a document from a string
    pub fn parse_str(&self, content: &str) -> Result<SpdxDocument, ParseError> {
        self.parse_bytes(content.as_bytes())
    }

    /// Parse a document from a reader without buffering it first
    pub fn parse_reader<R: std::io::Read>(&self, reader: R) -> Result<SpdxDocument, ParseError> {
        let document: SpdxDocument = serde_json::from_reader(reader)?;
        self.check(document)
    }

    /// Parse a document from a file
    pub fn parse_file(&self, path: &Path) -> Result<SpdxDocument, ParseError> {
        let file = std::fs::File::open(path)?;
        self.parse_reader(std::io::BufReader::new(file))
    }

    fn check(&self, document: SpdxDocument) -> Result<SpdxDocument, ParseError> {
        if !document.spdx_version.starts_with("SPDX-") {
            return Err(ParseError::InvalidStructure(format!(
                "missing or malformed spdxVersion '{}'",
                document.spdx_version
            )));
        }
        if self.strict && !SUPPORTED_VERSIONS.contains(&document.spdx_version.as_str()) {
            return Err(ParseError::UnsupportedVersion(document.spdx_version));
        }
        if document.spdx_id.is_empty() {
            return Err(ParseError::InvalidStructure(
                "document has no SPDXID".to_string(),
            ));
        }

        tracing::debug!(
            version = %document.spdx_version,
            packages = document.packages.len(),
            files = document.files.len(),
            snippets = document.snippets.len(),
            relationships = document.relationships.len(),
            "Deserialized SPDX document"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "spdxVersion": "SPDX-2.3",
        "dataLicense": "CC0-1.0",
        "SPDXID": "SPDXRef-DOCUMENT",
        "name": "minimal",
        "documentNamespace": "https://example.com/minimal",
        "creationInfo": {"created": "2024-01-01T00:00:00Z", "creators": ["Tool: test"]},
        "packages": [{
            "SPDXID": "SPDXRef-pkg",
            "name": "pkg",
            "versionInfo": "1.0",
            "licenseConcluded": "MIT",
            "externalRefs": [{
                "referenceCategory": "PACKAGE_MANAGER",
                "referenceType": "purl",
                "referenceLocator": "pkg:npm/pkg@1.0"
            }]
        }],
        "snippets": [{
            "SPDXID": "SPDXRef-Snippet",
            "snippetFromFile": "SPDXRef-File",
            "ranges": [{
                "startPointer": {"offset": 310, "reference": "SPDXRef-File"},
                "endPointer": {"offset": 420, "reference": "SPDXRef-File"}
            }]
        }]
    }"#;

    #[test]
    fn test_parse_minimal_document() {
        let doc = SpdxJsonParser::new().parse_str(MINIMAL).unwrap();
        assert_eq!(doc.name, "minimal");
        assert_eq!(doc.packages.len(), 1);
        assert_eq!(doc.packages[0].version_info.as_deref(), Some("1.0"));
        assert!(doc.packages[0].external_refs[0].is_package_manager());
        assert_eq!(doc.snippets[0].ranges[0].end_pointer.offset, Some(420));
        assert_eq!(
            doc.creation_info.unwrap().creators,
            vec!["Tool: test".to_string()]
        );
    }

    #[test]
    fn test_rejects_non_spdx_json() {
        let err = SpdxJsonParser::new().parse_str("{}").unwrap_err();
        assert!(matches!(err, ParseError::InvalidStructure(_)));

        let err = SpdxJsonParser::new().parse_str("not json").unwrap_err();
        assert!(matches!(err, ParseError::JsonError(_)));
    }

    #[test]
    fn test_strict_rejects_unknown_version() {
        let json = MINIMAL.replace("SPDX-2.3", "SPDX-3.0");
        assert!(SpdxJsonParser::new().parse_str(&json).is_ok());
        assert!(matches!(
            SpdxJsonParser::strict().parse_str(&json),
            Err(ParseError::UnsupportedVersion(_))
        ));
    }
}
