//! Snippet pass: copyrights and licenses found in snippets are added to the
//! component that owns the snippet's file.

use super::context::ImportContext;
use super::converter;
use super::{ImportProgress, ImportStage, asserted_text};
use crate::document::SpdxSnippet;
use crate::error::ConvertError;
use indexmap::IndexMap;
use std::collections::HashSet;

pub(super) fn run(ctx: &mut ImportContext<'_>, progress: &mut dyn FnMut(ImportProgress)) {
    let document = ctx.index.document();
    let mut seen = HashSet::new();
    let snippets: Vec<&SpdxSnippet> = document
        .snippets
        .iter()
        .filter(|s| seen.insert(s.spdx_id.clone()))
        .collect();
    if snippets.is_empty() {
        return;
    }

    let total = snippets.len();
    progress(ImportProgress::new(ImportStage::Snippets, 0, total));
    let mut enriched = 0usize;
    for snippet in snippets {
        match import_snippet(ctx, snippet) {
            Ok(changed) => {
                ctx.stats.snippets += 1;
                enriched += usize::from(changed);
            }
            Err(e) => {
                ctx.stats.skipped += 1;
                tracing::warn!(snippet = %snippet.spdx_id, "Skipping snippet: {}", e);
            }
        }
    }
    progress(ImportProgress::new(ImportStage::Snippets, total, total));

    tracing::info!(snippets = ctx.stats.snippets, enriched, "Snippet pass complete");
}

/// Returns whether the owning component changed.
fn import_snippet(
    ctx: &mut ImportContext<'_>,
    snippet: &SpdxSnippet,
) -> Result<bool, ConvertError> {
    let root = ctx.store.document_mut(ctx.document_root)?;
    converter::convert_snippet(root, snippet)?;

    let Some(&item) = ctx.file_to_item_cache.get(&snippet.snippet_from_file) else {
        tracing::debug!(
            snippet = %snippet.spdx_id,
            file = %snippet.snippet_from_file,
            "Snippet file has no item"
        );
        return Ok(false);
    };
    let Some(component) = ctx.store.item(item).and_then(|i| i.component) else {
        return Ok(false);
    };

    let mut new_copyright = None;
    if let Some(text) = asserted_text(snippet.copyright_text.as_deref()) {
        let present = ctx.store.component(component).is_some_and(|comp| {
            comp.copyrights
                .iter()
                .any(|&id| ctx.store.copyright(id).is_some_and(|c| c.text == text))
        });
        if !present {
            let mut statements = IndexMap::new();
            statements.insert(text.to_string(), Vec::new());
            new_copyright = ctx.store.find_or_create_copyrights(&statements).into_iter().next();
        }
    }

    let licenses = ctx.resolve_licenses(&snippet.spdx_id, snippet.license_concluded.as_deref());

    let comp = ctx.store.component_mut(component)?;
    let mut changed = false;
    if let Some(copyright) = new_copyright {
        changed |= comp.add_copyright(copyright);
    }
    for license in licenses {
        changed |= comp.add_license(license);
    }

    if changed {
        tracing::debug!(
            snippet = %snippet.spdx_id,
            component = %component,
            "Enriched component from snippet"
        );
    }
    Ok(changed)
}
