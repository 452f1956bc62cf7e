//! Turning license expressions into persisted licenses.

use crate::document::{DocumentIndex, LicenseExpression};
use crate::error::ConvertError;
use crate::model::LicenseId;
use crate::store::InventoryStore;
use indexmap::IndexSet;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static COMBINED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bAND\b").expect("static regex"));

/// Whether a raw expression combines licenses with `AND`.
///
/// `WITH` alone does not count, and neither does `OR`.
#[must_use]
pub fn is_combined(raw: &str) -> bool {
    COMBINED.is_match(raw)
}

/// Pick the expression that governs a package: the concluded license,
/// or the declared one when nothing was concluded.
#[must_use]
pub fn governing_expression<'e>(
    concluded: Option<&'e str>,
    declared: Option<&'e str>,
) -> Option<&'e str> {
    let asserted = |raw: &&str| {
        let raw = raw.trim();
        !raw.is_empty() && raw != "NOASSERTION"
    };
    concluded
        .filter(asserted)
        .or_else(|| declared.filter(asserted))
}

/// Resolves expressions against the store, remembering every license it
/// touches in `cache`.
pub struct LicenseResolver<'r, 'a> {
    store: &'r mut InventoryStore,
    cache: &'r mut HashMap<String, LicenseId>,
    index: &'r DocumentIndex<'a>,
}

impl<'r, 'a> LicenseResolver<'r, 'a> {
    pub fn new(
        store: &'r mut InventoryStore,
        cache: &'r mut HashMap<String, LicenseId>,
        index: &'r DocumentIndex<'a>,
    ) -> Self {
        Self {
            store,
            cache,
            index,
        }
    }

    /// Parse and resolve a raw expression.
    ///
    /// `element` names the SPDX element the expression belongs to, for
    /// error reporting.
    pub fn resolve_raw(
        &mut self,
        element: &str,
        raw: Option<&str>,
    ) -> Result<Vec<LicenseId>, ConvertError> {
        let Some(raw) = raw else {
            return Ok(Vec::new());
        };
        let expr = LicenseExpression::parse(raw)
            .map_err(|e| ConvertError::invalid_value(element, "license", format!("'{raw}': {e}")))?;
        Ok(self.resolve(&expr))
    }

    /// Split an expression into its operands and find or create one license
    /// per distinct operand. Sentinels resolve to nothing.
    pub fn resolve(&mut self, expr: &LicenseExpression) -> Vec<LicenseId> {
        let mut out = IndexSet::new();
        for leaf in expr.leaves() {
            let id = match leaf {
                LicenseExpression::Listed(key) => self.resolve_listed(key),
                LicenseExpression::Extracted(key) => self.resolve_extracted(key),
                _ => continue,
            };
            out.insert(id);
        }
        out.into_iter().collect()
    }

    fn resolve_listed(&mut self, key: &str) -> LicenseId {
        if let Some(&id) = self.cache.get(key) {
            return id;
        }
        let upserted = self.store.find_or_create_license(key, "", key, true);
        if upserted.created {
            tracing::debug!(license = key, "Created listed license");
        }
        self.cache.insert(key.to_string(), upserted.id);
        upserted.id
    }

    fn resolve_extracted(&mut self, key: &str) -> LicenseId {
        if let Some(&id) = self.cache.get(key) {
            return id;
        }
        let text = match self.index.extracted_license(key) {
            Some(info) => info.extracted_text.as_str(),
            None => {
                tracing::warn!(license = key, "No extracted licensing info, storing without text");
                ""
            }
        };
        let upserted = self.store.find_or_create_license(key, text, key, false);
        if upserted.created {
            tracing::debug!(license = key, "Created document license");
        }
        self.cache.insert(key.to_string(), upserted.id);
        upserted.id
    }
}
