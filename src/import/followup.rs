//! Requests for downstream services, collected during an import and handed
//! over once the run is done.

use crate::model::{ComponentId, ItemId, ProjectId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ask the download service to fetch a package's sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    /// Where the project keeps downloaded sources
    pub base_path: Option<PathBuf>,
    pub version: String,
    pub project: ProjectId,
    /// The package is one the document describes
    pub is_main: bool,
}

/// One follow-up request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FollowUp {
    /// Run the copyright filter over an item
    CopyrightFilter { item: ItemId },
    /// Run the license matcher over an item
    LicenseMatcher { item: ItemId },
    /// Look up vulnerabilities for a component
    Vulnerability { component: ComponentId },
    Download(DownloadRequest),
}

impl FollowUp {
    /// Short name of the receiving service.
    #[must_use]
    pub const fn target(&self) -> &'static str {
        match self {
            Self::CopyrightFilter { .. } => "copyright-filter",
            Self::LicenseMatcher { .. } => "license-matcher",
            Self::Vulnerability { .. } => "vulnerability",
            Self::Download(_) => "download",
        }
    }
}

/// Receives follow-up requests after a successful import.
pub trait FollowUpSink {
    /// Deliver one request. Returns `false` if it could not be delivered.
    fn send(&mut self, follow_up: FollowUp) -> bool;

    /// Sink name for logging
    fn name(&self) -> &'static str;
}

/// Writes every request to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSink;

impl FollowUpSink for LoggingSink {
    fn send(&mut self, follow_up: FollowUp) -> bool {
        match serde_json::to_string(&follow_up) {
            Ok(message) => {
                tracing::info!(target_service = follow_up.target(), %message, "Follow-up");
                true
            }
            Err(e) => {
                tracing::warn!("Failed to encode follow-up: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "logging"
    }
}

/// Keeps every request in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub received: Vec<FollowUp>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> impl Iterator<Item = &DownloadRequest> {
        self.received.iter().filter_map(|f| match f {
            FollowUp::Download(request) => Some(request),
            _ => None,
        })
    }

    #[must_use]
    pub fn count(&self, target: &str) -> usize {
        self.received.iter().filter(|f| f.target() == target).count()
    }
}

impl FollowUpSink for RecordingSink {
    fn send(&mut self, follow_up: FollowUp) -> bool {
        self.received.push(follow_up);
        true
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
