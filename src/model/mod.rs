//! Persisted entities produced by an import.
//!
//! Two families live here: the inventory graph callers curate
//! ([`InventoryItem`], [`SoftwareComponent`], [`License`], [`Copyright`],
//! [`ProjectFile`]) and the [`DocumentRoot`] that mirrors the imported SPDX
//! document. Entities reference each other through the typed handles below,
//! never through pointers, so an item's `parent` is just an [`ItemId`].

mod inventory;
mod records;

pub use inventory::*;
pub use records::*;

use crate::store::arena_id;

arena_id!(
    /// Handle of a [`Project`].
    ProjectId
);
arena_id!(
    /// Handle of an [`InventoryItem`].
    ItemId
);
arena_id!(
    /// Handle of a [`SoftwareComponent`].
    ComponentId
);
arena_id!(
    /// Handle of a [`License`].
    LicenseId
);
arena_id!(
    /// Handle of a [`Copyright`].
    CopyrightId
);
arena_id!(
    /// Handle of a [`ProjectFile`].
    FileId
);
arena_id!(
    /// Handle of a [`DocumentRoot`].
    DocumentId
);
