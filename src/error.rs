//! Unified error types for spdx-inventory.
//!
//! Errors come in two weights. [`ImportError`] ends an import run: the
//! target project is missing, the document cannot be deserialized, or the
//! store itself fails. [`ConvertError`] belongs to a single SPDX element; the
//! passes log it and move on to the next element.

use crate::model::ProjectId;
use crate::parsers::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Run-level error. Any of these aborts an import before or between stages.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ImportError {
    /// The work item names a project the store does not know
    #[error("Project {0} does not exist")]
    ProjectNotFound(ProjectId),

    /// The raw document bytes are not a readable SPDX JSON document
    #[error("Failed to deserialize SPDX document: {context}")]
    Deserialize {
        context: String,
        #[source]
        source: ParseError,
    },

    /// The persistence layer failed
    #[error("Store operation failed: {context}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Error for a single element of the source document.
///
/// Never escalated: the stage that hits it logs it and continues.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConvertError {
    #[error("{element}: missing required field '{field}'")]
    MissingField {
        element: String,
        field: &'static str,
    },

    #[error("{element}: invalid value for '{field}': {message}")]
    InvalidValue {
        element: String,
        field: &'static str,
        message: String,
    },

    #[error("{0}: element is not part of this document")]
    UnknownElement(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Persistence errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No {kind} with index {index}")]
    Missing { kind: &'static str, index: usize },
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for run-level operations
pub type Result<T> = std::result::Result<T, ImportError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl ImportError {
    /// Create a deserialization error with context
    pub fn deserialize(context: impl Into<String>, source: ParseError) -> Self {
        Self::Deserialize {
            context: context.into(),
            source,
        }
    }

    /// Create a store error with context
    pub fn store(context: impl Into<String>, source: StoreError) -> Self {
        Self::Store {
            context: context.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the run was rejected before any stage touched the store.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::ProjectNotFound(_) | Self::Deserialize { .. })
    }
}

impl ConvertError {
    pub fn missing_field(element: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            element: element.into(),
            field,
        }
    }

    pub fn invalid_value(
        element: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            element: element.into(),
            field,
            message: message.into(),
        }
    }
}

impl StoreError {
    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<ParseError> for ImportError {
    fn from(err: ParseError) -> Self {
        Self::deserialize(String::new(), err)
    }
}

impl From<StoreError> for ImportError {
    fn from(err: StoreError) -> Self {
        Self::store(String::new(), err)
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to run-level errors.
///
/// ```ignore
/// use spdx_inventory::error::ErrorContext;
///
/// let document = SpdxJsonParser::new()
///     .parse_bytes(&bytes)
///     .context("reading work item payload")?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    ///
    /// The context string is prepended to the error's existing context.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, only evaluated on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<ImportError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

fn add_context_to_error(err: ImportError, new_ctx: &str) -> ImportError {
    match err {
        ImportError::Deserialize {
            context: existing,
            source,
        } => ImportError::Deserialize {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ImportError::Store {
            context: existing,
            source,
        } => ImportError::Store {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ImportError::Config(msg) => ImportError::Config(chain_context(new_ctx, &msg)),
        other @ ImportError::ProjectNotFound(_) => other,
    }
}

/// Chain two context strings as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
