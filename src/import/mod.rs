//! SPDX import orchestration.
//!
//! An import runs a fixed sequence of stages over one document:
//!
//! ```text
//! VALIDATE_PROJECT -> CLEAN_PRIOR_IMPORT -> PACKAGES -> ORPHANS
//!     -> RELATIONSHIPS -> SNIPPETS -> DONE
//! ```
//!
//! Packages are visited before relationships so every forward reference can
//! be resolved against the inventory cache. Stages share state only through
//! the [`ImportContext`]. Every entity is found by its key before it is
//! created, so importing the same document into the same project twice
//! leaves the entity counts unchanged.
//!
//! # Example
//!
//! ```ignore
//! use spdx_inventory::import::{Importer, SpdxWorkData};
//! use spdx_inventory::store::{InventoryStore, StoreCleaner};
//! use spdx_inventory::import::LoggingSink;
//!
//! let mut store = InventoryStore::new();
//! let mut sink = LoggingSink;
//! let cleaner = StoreCleaner::new();
//! let mut importer = Importer::new(&mut store, &cleaner, &mut sink);
//! let ok = importer.process(&work, &mut |p| println!("{p}"));
//! ```

mod context;
mod converter;
mod followup;
mod license;
mod orphans;
mod packages;
mod relationships;
mod snippets;

pub use context::{ImportContext, ImportStats};
pub use converter::{
    convert_document, convert_file, convert_package, convert_relationship, convert_snippet,
    document_uri,
};
pub use followup::{DownloadRequest, FollowUp, FollowUpSink, LoggingSink, RecordingSink};
pub use license::{LicenseResolver, governing_expression, is_combined};
pub use orphans::UNKNOWN_FILE;
pub use packages::{download_location, inventory_name, package_url};

use crate::document::DocumentIndex;
use crate::error::{ErrorContext, ImportError, Result};
use crate::model::{ProjectId, STANDALONE_VERSION};
use crate::parsers::SpdxJsonParser;
use crate::store::{FileTreeCleaner, InventoryStore};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A request to import one SPDX JSON document into a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpdxWorkData {
    pub project_id: ProjectId,
    pub json_bytes: Vec<u8>,
    /// Ask the copyright filter to review the imported items
    pub use_copyright_ai: bool,
    /// Ask the license matcher to review the imported items
    pub use_license_matcher: bool,
}

impl SpdxWorkData {
    pub fn new(project_id: ProjectId, json_bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            project_id,
            json_bytes: json_bytes.into(),
            use_copyright_ai: false,
            use_license_matcher: false,
        }
    }
}

/// Tuning knobs for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Report progress every this many packages
    pub progress_interval: usize,
    /// Run the CLEAN_PRIOR_IMPORT stage
    pub clean_prior_import: bool,
    /// Component version given to orphan files
    pub standalone_version: String,
    /// Emit download requests for packages with a version and location
    pub emit_downloads: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            progress_interval: 5,
            clean_prior_import: true,
            standalone_version: STANDALONE_VERSION.to_string(),
            emit_downloads: true,
        }
    }
}

/// Import stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStage {
    ValidateProject,
    CleanPriorImport,
    Packages,
    Orphans,
    Relationships,
    Snippets,
    Done,
}

impl ImportStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidateProject => "VALIDATE_PROJECT",
            Self::CleanPriorImport => "CLEAN_PRIOR_IMPORT",
            Self::Packages => "PACKAGES",
            Self::Orphans => "ORPHANS",
            Self::Relationships => "RELATIONSHIPS",
            Self::Snippets => "SNIPPETS",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A progress report. `total` is zero for stages without countable work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportProgress {
    pub stage: ImportStage,
    pub completed: usize,
    pub total: usize,
}

impl ImportProgress {
    #[must_use]
    pub const fn new(stage: ImportStage, completed: usize, total: usize) -> Self {
        Self {
            stage,
            completed,
            total,
        }
    }

    /// Completion of the current stage in percent.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let pct = self.completed.min(self.total) * 100 / self.total;
        u8::try_from(pct).unwrap_or(100)
    }
}

impl fmt::Display for ImportProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{} ({}%)", self.stage, self.completed, self.total, self.percent())
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub project: ProjectId,
    pub document_uri: String,
    pub stats: ImportStats,
    /// Items the run created or updated
    pub items: usize,
    pub follow_ups_sent: usize,
    pub follow_ups_failed: usize,
}

/// Runs imports against a store.
pub struct Importer<'a> {
    store: &'a mut InventoryStore,
    cleaner: &'a dyn FileTreeCleaner,
    sink: &'a mut dyn FollowUpSink,
    parser: SpdxJsonParser,
    options: ImportOptions,
}

impl<'a> Importer<'a> {
    pub fn new(
        store: &'a mut InventoryStore,
        cleaner: &'a dyn FileTreeCleaner,
        sink: &'a mut dyn FollowUpSink,
    ) -> Self {
        Self {
            store,
            cleaner,
            sink,
            parser: SpdxJsonParser::new(),
            options: ImportOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_parser(mut self, parser: SpdxJsonParser) -> Self {
        self.parser = parser;
        self
    }

    /// Run an import and report success as a single flag. Failures are
    /// logged.
    pub fn process(
        &mut self,
        work: &SpdxWorkData,
        progress: &mut dyn FnMut(ImportProgress),
    ) -> bool {
        match self.run(work, progress) {
            Ok(summary) => {
                tracing::info!(
                    project = %summary.project,
                    document = %summary.document_uri,
                    items = summary.items,
                    skipped = summary.stats.skipped,
                    "Import finished"
                );
                true
            }
            Err(e) => {
                tracing::error!(project = %work.project_id, "Import failed: {}", e);
                false
            }
        }
    }

    /// Run an import.
    ///
    /// Fails without touching the store when the document cannot be
    /// deserialized or the project does not exist. Once the passes start,
    /// element-level problems are logged and skipped.
    pub fn run(
        &mut self,
        work: &SpdxWorkData,
        progress: &mut dyn FnMut(ImportProgress),
    ) -> Result<ImportSummary> {
        let document = self
            .parser
            .parse_bytes(&work.json_bytes)
            .context("reading work item payload")?;

        let project = work.project_id;
        {
            let _span =
                tracing::info_span!("stage", stage = %ImportStage::ValidateProject).entered();
            progress(ImportProgress::new(ImportStage::ValidateProject, 0, 0));
            if self.store.project(project).is_none() {
                return Err(ImportError::ProjectNotFound(project));
            }
        }

        if self.options.clean_prior_import {
            let _span =
                tracing::info_span!("stage", stage = %ImportStage::CleanPriorImport).entered();
            progress(ImportProgress::new(ImportStage::CleanPriorImport, 0, 0));
            match self.cleaner.clean(self.store, project) {
                Ok(report) => tracing::info!(
                    cleaner = self.cleaner.name(),
                    files_removed = report.files_removed,
                    "Cleaned prior import"
                ),
                Err(e) => tracing::warn!(cleaner = self.cleaner.name(), "Cleanup failed: {}", e),
            }
        }

        let (root, created) = convert_document(self.store, &document, &work.json_bytes)
            .context("converting document header")?;
        let document_uri = document_uri(&document);
        tracing::info!(
            document = %document_uri,
            new_document = created,
            packages = document.packages.len(),
            files = document.files.len(),
            snippets = document.snippets.len(),
            relationships = document.relationships.len(),
            "Importing SPDX document"
        );

        let index = DocumentIndex::build(&document);
        let mut ctx = ImportContext::new(project, self.store, index, root, &self.options);

        {
            let _span = tracing::info_span!("stage", stage = %ImportStage::Packages).entered();
            packages::run(&mut ctx, progress);
        }
        {
            let _span = tracing::info_span!("stage", stage = %ImportStage::Orphans).entered();
            orphans::run(&mut ctx, progress);
        }
        {
            let _span = tracing::info_span!("stage", stage = %ImportStage::Relationships).entered();
            relationships::run(&mut ctx, progress);
        }
        {
            let _span = tracing::info_span!("stage", stage = %ImportStage::Snippets).entered();
            snippets::run(&mut ctx, progress);
        }

        let _span = tracing::info_span!("stage", stage = %ImportStage::Done).entered();
        let follow_ups = collect_follow_ups(&mut ctx, work);
        let stats = ctx.stats;
        let items = ctx.imported_items.len();
        drop(ctx);

        let total = follow_ups.len();
        let mut sent = 0;
        for follow_up in follow_ups {
            if self.sink.send(follow_up) {
                sent += 1;
            }
        }
        if sent < total {
            tracing::warn!(
                sink = self.sink.name(),
                failed = total - sent,
                "Some follow-ups were not delivered"
            );
        }
        progress(ImportProgress::new(ImportStage::Done, 1, 1));

        Ok(ImportSummary {
            project,
            document_uri,
            stats,
            items,
            follow_ups_sent: sent,
            follow_ups_failed: total - sent,
        })
    }
}

/// Downloads gathered by the passes, followed by the per-item answers.
fn collect_follow_ups(ctx: &mut ImportContext<'_>, work: &SpdxWorkData) -> Vec<FollowUp> {
    let mut out = std::mem::take(&mut ctx.follow_ups);
    let mut components = IndexSet::new();
    for &item in &ctx.imported_items {
        if work.use_copyright_ai {
            out.push(FollowUp::CopyrightFilter { item });
        }
        if work.use_license_matcher {
            out.push(FollowUp::LicenseMatcher { item });
        }
        if let Some(component) = ctx.store.item(item).and_then(|i| i.component) {
            components.insert(component);
        }
    }
    out.extend(
        components
            .into_iter()
            .map(|component| FollowUp::Vulnerability { component }),
    );
    out
}

/// A text value, unless it is empty or a `NONE`/`NOASSERTION` sentinel.
pub(crate) fn asserted_text(text: Option<&str>) -> Option<&str> {
    text.map(str::trim)
        .filter(|t| !t.is_empty() && *t != "NONE" && *t != "NOASSERTION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asserted_text() {
        assert_eq!(
            asserted_text(Some(" Copyright 2020 Jane Doe ")),
            Some("Copyright 2020 Jane Doe")
        );
        assert_eq!(asserted_text(Some("NONE")), None);
        assert_eq!(asserted_text(Some("NOASSERTION")), None);
        assert_eq!(asserted_text(Some("")), None);
        assert_eq!(asserted_text(None), None);
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(ImportProgress::new(ImportStage::Packages, 5, 10).percent(), 50);
        assert_eq!(ImportProgress::new(ImportStage::Packages, 0, 0).percent(), 100);
        assert_eq!(
            ImportProgress::new(ImportStage::Relationships, 3, 4).to_string(),
            "RELATIONSHIPS 3/4 (75%)"
        );
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(ImportStage::CleanPriorImport.to_string(), "CLEAN_PRIOR_IMPORT");
        assert_eq!(
            serde_json::to_value(ImportStage::ValidateProject).unwrap(),
            "VALIDATE_PROJECT"
        );
    }
}
