//! Serialized work tasks and their dispatch.
//!
//! A task file names a payload kind in its `type` field:
//!
//! ```json
//! {
//!   "task_id": "spdx-42",
//!   "payload": {
//!     "type": "spdx",
//!     "project_id": 0,
//!     "sbom_path": "firmware.spdx.json",
//!     "use_copyright_ai": true
//!   }
//! }
//! ```

use crate::error::{ImportError, Result};
use crate::import::{ImportProgress, Importer, SpdxWorkData};
use crate::model::ProjectId;
use crate::parsers::ParseError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkTask {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Seconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    pub payload: WorkPayload,
}

/// Payload kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkPayload {
    Spdx(SpdxTask),
}

impl WorkPayload {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Spdx(_) => "spdx",
        }
    }
}

/// Import an SPDX document, given inline or by path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpdxTask {
    pub project_id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sbom_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<serde_json::Value>,
    #[serde(default)]
    pub use_copyright_ai: bool,
    #[serde(default)]
    pub use_license_matcher: bool,
}

impl SpdxTask {
    /// Build the import request. Relative paths resolve against `base_dir`.
    /// An inline document takes precedence over a path.
    pub fn to_work_data(&self, base_dir: Option<&Path>) -> Result<SpdxWorkData> {
        let json_bytes = match (&self.document, &self.sbom_path) {
            (Some(document), _) => serde_json::to_vec(document)
                .map_err(|e| ImportError::deserialize("inline document", e.into()))?,
            (None, Some(path)) => {
                let path = match base_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path.clone(),
                };
                std::fs::read(&path).map_err(|e| {
                    ImportError::deserialize(format!("reading {}", path.display()), e.into())
                })?
            }
            (None, None) => {
                return Err(ImportError::deserialize(
                    "spdx task",
                    ParseError::InvalidStructure(
                        "neither document nor sbom_path given".to_string(),
                    ),
                ));
            }
        };

        Ok(SpdxWorkData {
            project_id: self.project_id,
            json_bytes,
            use_copyright_ai: self.use_copyright_ai,
            use_license_matcher: self.use_license_matcher,
        })
    }
}

impl WorkTask {
    /// Load a task from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| {
            ImportError::deserialize(format!("reading task {}", path.display()), e.into())
        })?;
        serde_json::from_slice(&data).map_err(|e| {
            ImportError::deserialize(format!("parsing task {}", path.display()), e.into())
        })
    }
}

/// Route a task to its processor. Returns the processor's verdict.
pub fn dispatch(
    task: &WorkTask,
    base_dir: Option<&Path>,
    importer: &mut Importer<'_>,
    progress: &mut dyn FnMut(ImportProgress),
) -> bool {
    tracing::info!(task = %task.task_id, kind = task.payload.kind(), "Dispatching work task");
    match &task.payload {
        WorkPayload::Spdx(spdx) => match spdx.to_work_data(base_dir) {
            Ok(work) => importer.process(&work, progress),
            Err(e) => {
                tracing::error!(task = %task.task_id, "Cannot prepare import: {}", e);
                false
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_deserializes_tagged_payload() {
        let task: WorkTask = serde_json::from_str(
            r#"{
                "task_id": "t1",
                "payload": {
                    "type": "spdx",
                    "project_id": 3,
                    "sbom_path": "a.json",
                    "use_license_matcher": true
                }
            }"#,
        )
        .unwrap();
        let WorkPayload::Spdx(spdx) = &task.payload;
        assert_eq!(spdx.project_id, ProjectId::from_index(3));
        assert!(spdx.use_license_matcher);
        assert!(!spdx.use_copyright_ai);
        assert_eq!(task.payload.kind(), "spdx");
    }

    #[test]
    fn test_unknown_payload_type_is_rejected() {
        let result: std::result::Result<WorkTask, _> =
            serde_json::from_str(r#"{"task_id": "t", "payload": {"type": "download"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_inline_document_wins() {
        let task = SpdxTask {
            project_id: ProjectId::from_index(0),
            sbom_path: Some(PathBuf::from("/does/not/exist.json")),
            document: Some(serde_json::json!({"spdxVersion": "SPDX-2.3"})),
            use_copyright_ai: false,
            use_license_matcher: false,
        };
        let work = task.to_work_data(None).unwrap();
        assert!(String::from_utf8(work.json_bytes).unwrap().contains("SPDX-2.3"));
    }

    #[test]
    fn test_relative_path_resolves_against_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc.json"), b"{}").unwrap();
        let task = SpdxTask {
            project_id: ProjectId::from_index(0),
            sbom_path: Some(PathBuf::from("doc.json")),
            document: None,
            use_copyright_ai: true,
            use_license_matcher: false,
        };
        let work = task.to_work_data(Some(dir.path())).unwrap();
        assert_eq!(work.json_bytes, b"{}");
        assert!(work.use_copyright_ai);

        let missing = SpdxTask { sbom_path: None, ..task };
        assert!(missing.to_work_data(None).unwrap_err().is_rejection());
    }
}
