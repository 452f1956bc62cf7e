//! Relationship pass: parent links and linkage between cached items.

use super::context::ImportContext;
use super::converter;
use super::{ImportProgress, ImportStage};
use crate::document::{ElementKind, RelationshipKind, SpdxPackage, SpdxRelationship};
use crate::error::ConvertError;
use crate::model::{ItemId, Linking};

pub(super) fn run(ctx: &mut ImportContext<'_>, progress: &mut dyn FnMut(ImportProgress)) {
    let packages: Vec<&SpdxPackage> = ctx.index.packages().collect();
    let total = packages.len();
    let interval = ctx.options.progress_interval.max(1);
    progress(ImportProgress::new(ImportStage::Relationships, 0, total));

    for (i, package) in packages.into_iter().enumerate() {
        let edges: Vec<&SpdxRelationship> = ctx.index.relationships_of(&package.spdx_id).to_vec();
        for &edge in &edges {
            if let Err(e) = apply(ctx, edge) {
                ctx.stats.skipped += 1;
                tracing::warn!(source = %edge.spdx_element_id, "Skipping relationship: {}", e);
            }
        }
        tracing::debug!(package = %package.spdx_id, edges = edges.len(), "Processed relationships");

        let done = i + 1;
        if done % interval == 0 || done == total {
            progress(ImportProgress::new(ImportStage::Relationships, done, total));
        }
    }

    tracing::info!(
        relationships = ctx.stats.relationships,
        parent_links = ctx.stats.parent_links,
        "Relationship pass complete"
    );
}

/// Persist one edge and apply its effect on the inventory.
fn apply(ctx: &mut ImportContext<'_>, edge: &SpdxRelationship) -> Result<(), ConvertError> {
    let root = ctx.store.document_mut(ctx.document_root)?;
    converter::convert_relationship(root, edge)?;
    ctx.stats.relationships += 1;

    let (Some(source), Some(target)) = (
        ctx.cached_item(&edge.spdx_element_id),
        ctx.cached_item(&edge.related_spdx_element),
    ) else {
        return Ok(());
    };
    let target_is_package =
        ctx.index.element_kind(&edge.related_spdx_element) == Some(ElementKind::Package);

    let kind = RelationshipKind::parse(&edge.relationship_type);
    match kind {
        _ if kind.parents_target() && target_is_package => set_parent(ctx, target, source),
        _ if kind.parents_source() && target_is_package => set_parent(ctx, source, target),
        RelationshipKind::StaticLink => {
            ctx.store.item_mut(target)?.linking = Some(Linking::Static);
            Ok(())
        }
        RelationshipKind::DynamicLink => {
            ctx.store.item_mut(target)?.linking = Some(Linking::Dynamic);
            Ok(())
        }
        _ => Ok(()),
    }
}

fn set_parent(
    ctx: &mut ImportContext<'_>,
    child: ItemId,
    parent: ItemId,
) -> Result<(), ConvertError> {
    if child == parent {
        tracing::warn!(item = %child, "Refusing to make an item its own parent");
        return Ok(());
    }
    if ctx.store.is_ancestor(child, parent) {
        tracing::warn!(child = %child, parent = %parent, "Parent link closes a cycle");
    }

    ctx.store.item_mut(child)?.parent = Some(parent);
    ctx.stats.parent_links += 1;

    if tracing::enabled!(tracing::Level::DEBUG) {
        let name = |id| ctx.store.item(id).map(|i| i.name.as_str()).unwrap_or_default();
        tracing::debug!(parent = name(parent), child = name(child), "Linked parent");
    }
    Ok(())
}
