//! **Import SPDX SBOM documents into a persisted component inventory.**
//!
//! `spdx-inventory` reads SPDX 2.x JSON documents and folds them into a
//! project's inventory: one item per package or unclaimed file, linked into a
//! tree by the document's relationships, each pointing at a software component
//! shared across projects with its licenses and copyrights. The document itself
//! is mirrored so a re-import updates it in place.
//!
//! ## Core Concepts & Modules
//!
//! - **[`parsers`]**: [`SpdxJsonParser`] turns bytes into an [`SpdxDocument`].
//! - **[`document`]**: the serde model of an SPDX document, license expressions
//!   and the [`DocumentIndex`] used to look elements up by id.
//! - **[`model`]**: persisted entities and their typed handles.
//! - **[`store`]**: the [`InventoryStore`] with find-or-create operations, its
//!   JSON file backend and the cleaners that drop a previous import's files.
//! - **[`import`]**: the staged [`Importer`] and the follow-up requests it emits.
//! - **[`worker`]**: serialized work tasks routed to the importer.
//! - **[`config`]**: YAML configuration with discovery, presets and validation.
//!
//! ## Getting Started
//!
//! ```no_run
//! use spdx_inventory::import::{Importer, LoggingSink, SpdxWorkData};
//! use spdx_inventory::model::Project;
//! use spdx_inventory::store::{InventoryStore, StoreCleaner};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = InventoryStore::new();
//!     let project = store.create_project(Project::new("firmware", None));
//!     let work = SpdxWorkData::new(project, std::fs::read("firmware.spdx.json")?);
//!
//!     let cleaner = StoreCleaner::new();
//!     let mut sink = LoggingSink;
//!     let summary = Importer::new(&mut store, &cleaner, &mut sink).run(&work, &mut |p| {
//!         eprintln!("{p}");
//!     })?;
//!
//!     println!("{} items imported from {}", summary.items, summary.document_uri);
//!     Ok(())
//! }
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! The `spdx-inventory` binary wraps the library: `project create`, `import`,
//! `inventory`, `work` and `config`.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::similar_names
)]

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod import;
pub mod model;
pub mod parsers;
pub mod store;
pub mod worker;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, ConfigPreset, Validatable};
pub use document::{DocumentIndex, LicenseExpression, SpdxDocument};
pub use error::{ConvertError, ErrorContext, ImportError, Result, StoreError};
pub use import::{
    FollowUp, FollowUpSink, ImportOptions, ImportProgress, ImportStage, ImportSummary, Importer,
    SpdxWorkData,
};
pub use parsers::{ParseError, SpdxJsonParser};
pub use store::{InventoryStore, JsonStore};
pub use worker::{WorkPayload, WorkTask};
