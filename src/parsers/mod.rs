//! SPDX document deserialization.
//!
//! Turns raw SPDX JSON into the [`SpdxDocument`](crate::document::SpdxDocument)
//! object graph the importer walks.
//!
//! ```no_run
//! use spdx_inventory::parsers::SpdxJsonParser;
//! use std::path::Path;
//!
//! let document = SpdxJsonParser::new()
//!     .parse_file(Path::new("sbom.spdx.json"))
//!     .unwrap();
//! println!("{} packages", document.packages.len());
//! ```

mod spdx;
mod traits;

pub use spdx::{SUPPORTED_VERSIONS, SpdxJsonParser};
pub use traits::ParseError;
