//! Orphan pass: a standalone item for every file no package claims.

use super::context::ImportContext;
use super::converter;
use super::{ImportProgress, ImportStage, asserted_text};
use crate::document::SpdxFile;
use crate::error::ConvertError;
use crate::model::{FileId, InventoryItem, ItemId};
use indexmap::IndexMap;

/// Component name of an orphan file without a path.
pub const UNKNOWN_FILE: &str = "Unknown File";

pub(super) fn run(ctx: &mut ImportContext<'_>, progress: &mut dyn FnMut(ImportProgress)) {
    let orphans: Vec<&SpdxFile> = ctx
        .index
        .files()
        .filter(|file| !ctx.processed_file_ids.contains(&file.spdx_id))
        .collect();
    if orphans.is_empty() {
        tracing::debug!("No orphan files");
        return;
    }

    let total = orphans.len();
    progress(ImportProgress::new(ImportStage::Orphans, 0, total));
    for file in orphans {
        match import_orphan(ctx, file) {
            Ok(_) => ctx.stats.orphans += 1,
            Err(e) => {
                ctx.stats.skipped += 1;
                tracing::warn!(file = %file.spdx_id, "Skipping orphan file: {}", e);
            }
        }
    }
    progress(ImportProgress::new(ImportStage::Orphans, total, total));

    tracing::info!(orphans = ctx.stats.orphans, "Orphan pass complete");
}

fn import_orphan<'a>(
    ctx: &mut ImportContext<'a>,
    file: &'a SpdxFile,
) -> Result<ItemId, ConvertError> {
    let root = ctx.store.document_mut(ctx.document_root)?;
    converter::convert_file(root, file)?;

    let path = match file.file_name.trim() {
        "" => UNKNOWN_FILE,
        path => path,
    };
    let component = ctx
        .store
        .find_or_create_component(path, &ctx.options.standalone_version)
        .id;

    let project = ctx.project;
    let upserted = ctx
        .store
        .upsert_item(project, &file.spdx_id, || InventoryItem::new(project, &file.spdx_id, path));
    let item = ctx.store.item_mut(upserted.id)?;
    item.name = path.to_string();
    item.size = 1;
    item.component = Some(component);

    ctx.register_file(&file.spdx_id, upserted.id);
    ctx.register_item(&file.spdx_id, upserted.id);
    ctx.processed_file_ids.insert(file.spdx_id.clone());
    if upserted.created {
        ctx.stats.items_created += 1;
    }

    let placeholders = ctx.store.find_or_create_files(project, upserted.id, [path]);
    let copyrights = match asserted_text(file.copyright_text.as_deref()) {
        Some(text) => {
            let mut statements: IndexMap<String, Vec<FileId>> = IndexMap::new();
            statements.insert(text.to_string(), placeholders.values().copied().collect());
            ctx.store.find_or_create_copyrights(&statements)
        }
        None => Vec::new(),
    };

    let licenses = ctx.resolve_licenses(&file.spdx_id, file_license(file));

    let comp = ctx.store.component_mut(component)?;
    for copyright in copyrights {
        comp.add_copyright(copyright);
    }
    for license in licenses {
        comp.add_license(license);
    }

    tracing::debug!(file = %file.spdx_id, item = %upserted.id, path, "Imported orphan file");
    Ok(upserted.id)
}

/// The concluded license of a file, or the first license found in it when
/// nothing was concluded.
fn file_license(file: &SpdxFile) -> Option<&str> {
    let concluded = file
        .license_concluded
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty());
    match concluded {
        Some(raw) if raw != "NOASSERTION" => Some(raw),
        _ => file.license_info_in_files.first().map(String::as_str),
    }
}
