//! Parser error types.

use thiserror::Error;

/// Errors that can occur while deserializing an SPDX document
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("JSON parse error: {0}")]
    JsonError(String),

    #[error("Invalid SPDX structure: {0}")]
    InvalidStructure(String),

    #[error("Unsupported SPDX version: {0}")]
    UnsupportedVersion(String),
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}
