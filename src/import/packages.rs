//! Package pass: one component and one inventory item per package.

use super::context::ImportContext;
use super::converter;
use super::followup::{DownloadRequest, FollowUp};
use super::license::{governing_expression, is_combined};
use super::{ImportProgress, ImportStage, asserted_text};
use crate::document::SpdxPackage;
use crate::error::ConvertError;
use crate::model::{FileId, InventoryItem, ItemId};
use indexmap::IndexMap;
use packageurl::PackageUrl;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

/// `SPDXRef-<kind>-<ecosystem>-` as written by common SBOM generators.
static GENERATOR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^SPDXRef-[^-]+-[^-]+-").expect("static regex"));

pub(super) fn run(ctx: &mut ImportContext<'_>, progress: &mut dyn FnMut(ImportProgress)) {
    let packages: Vec<&SpdxPackage> = ctx.index.packages().collect();
    let total = packages.len();
    let interval = ctx.options.progress_interval.max(1);
    progress(ImportProgress::new(ImportStage::Packages, 0, total));

    for (i, package) in packages.into_iter().enumerate() {
        match import_package(ctx, package) {
            Ok(item) => {
                ctx.stats.packages += 1;
                tracing::debug!(package = %package.spdx_id, item = %item, "Imported package");
            }
            Err(e) => {
                ctx.stats.skipped += 1;
                tracing::warn!(package = %package.spdx_id, "Skipping package: {}", e);
            }
        }

        let done = i + 1;
        if done % interval == 0 || done == total {
            progress(ImportProgress::new(ImportStage::Packages, done, total));
        }
    }

    tracing::info!(
        packages = ctx.stats.packages,
        claimed_files = ctx.processed_file_ids.len(),
        "Package pass complete"
    );
}

fn import_package<'a>(
    ctx: &mut ImportContext<'a>,
    package: &'a SpdxPackage,
) -> Result<ItemId, ConvertError> {
    let root = ctx.store.document_mut(ctx.document_root)?;
    converter::convert_package(root, package)?;

    let name = package
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(&package.spdx_id);
    let version = package.version_info.as_deref().unwrap_or("");
    let component = ctx.store.find_or_create_component(name, version).id;

    let raw_license = governing_expression(
        package.license_concluded.as_deref(),
        package.license_declared.as_deref(),
    )
    .map(str::trim);
    let licenses = ctx.resolve_licenses(&package.spdx_id, raw_license);
    let was_combined = raw_license.is_some_and(is_combined);

    let files = ctx.index.package_files(package);
    for file in &files {
        let root = ctx.store.document_mut(ctx.document_root)?;
        if let Err(e) = converter::convert_file(root, file) {
            ctx.stats.skipped += 1;
            tracing::warn!(package = %package.spdx_id, "Skipping member file: {}", e);
        }
    }

    let project = ctx.project;
    let display_name = inventory_name(&package.spdx_id, name, version, raw_license);
    let upserted = ctx.store.upsert_item(project, &package.spdx_id, || {
        InventoryItem::new(project, &package.spdx_id, &display_name)
    });
    let item = ctx.store.item_mut(upserted.id)?;
    item.name = display_name;
    item.size = files.len();
    item.component = Some(component);
    item.was_combined = was_combined;

    let placeholders = ctx.store.find_or_create_files(
        project,
        upserted.id,
        files
            .iter()
            .map(|f| f.file_name.as_str())
            .filter(|path| !path.is_empty()),
    );
    let mut statements: IndexMap<String, Vec<FileId>> = IndexMap::new();
    if let Some(text) = asserted_text(package.copyright_text.as_deref()) {
        statements.entry(text.to_string()).or_default();
    }
    for file in &files {
        let Some(text) = asserted_text(file.copyright_text.as_deref()) else {
            continue;
        };
        let linked = statements.entry(text.to_string()).or_default();
        if let Some(&placeholder) = placeholders.get(file.file_name.as_str())
            && !linked.contains(&placeholder)
        {
            linked.push(placeholder);
        }
    }
    let copyrights = ctx.store.find_or_create_copyrights(&statements);

    let purl = package_url(package);
    let download = download_location(package);
    let comp = ctx.store.component_mut(component)?;
    for license in licenses {
        comp.add_license(license);
    }
    for copyright in copyrights {
        comp.add_copyright(copyright);
    }
    if purl.is_some() {
        comp.purl = purl;
    }
    if let Some(url) = download {
        comp.details_url = Some(url.to_string());
    }

    for file in &files {
        ctx.register_file(&file.spdx_id, upserted.id);
        ctx.processed_file_ids.insert(file.spdx_id.clone());
    }
    ctx.register_item(&package.spdx_id, upserted.id);
    if upserted.created {
        ctx.stats.items_created += 1;
    }

    if ctx.options.emit_downloads
        && !version.is_empty()
        && let Some(url) = download
    {
        let base_path = ctx.store.project(project).and_then(|p| p.base_path.clone());
        ctx.follow_ups.push(FollowUp::Download(DownloadRequest {
            url: url.to_string(),
            base_path,
            version: version.to_string(),
            project,
            is_main: ctx.main_package_ids.contains(&package.spdx_id),
        }));
    }

    Ok(upserted.id)
}

/// Display name of a package's inventory item.
///
/// The element id is used when it carries a generator prefix and still
/// names the package once the prefix is gone. The version is appended
/// unless already present, followed by the raw license expression.
#[must_use]
pub fn inventory_name(spdx_id: &str, name: &str, version: &str, license: Option<&str>) -> String {
    let mut out = match GENERATOR_PREFIX.find(spdx_id) {
        Some(prefix) if spdx_id[prefix.end()..].contains(name) => {
            spdx_id[prefix.end()..].to_string()
        }
        _ => name.to_string(),
    };
    if !out.contains(version) {
        out.push(' ');
        out.push_str(version);
    }
    out.push_str(" (");
    out.push_str(license.unwrap_or("NOASSERTION"));
    out.push(')');
    out
}

/// First package-manager reference holding a valid package URL.
#[must_use]
pub fn package_url(package: &SpdxPackage) -> Option<String> {
    for external in package.external_refs.iter().filter(|r| r.is_package_manager()) {
        let locator = external.reference_locator.trim();
        if !locator.starts_with("pkg:") {
            continue;
        }
        match PackageUrl::from_str(locator) {
            Ok(_) => return Some(locator.to_string()),
            Err(e) => {
                tracing::warn!(
                    package = %package.spdx_id,
                    purl = locator,
                    "Ignoring invalid package URL: {}",
                    e
                );
            }
        }
    }
    None
}

/// The download location, unless it is a sentinel.
#[must_use]
pub fn download_location(package: &SpdxPackage) -> Option<&str> {
    asserted_text(package.download_location.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ExternalRef;

    fn purl_ref(category: &str, kind: &str, locator: &str) -> ExternalRef {
        ExternalRef {
            reference_category: category.to_string(),
            reference_type: kind.to_string(),
            reference_locator: locator.to_string(),
            comment: None,
        }
    }

    #[test]
    fn test_inventory_name_strips_generator_prefix() {
        assert_eq!(
            inventory_name("SPDXRef-Package-npm-lodash", "lodash", "4.17.21", Some("MIT")),
            "lodash 4.17.21 (MIT)"
        );
        assert_eq!(
            inventory_name("SPDXRef-Package-npm-lodash-4.17.21", "lodash", "4.17.21", Some("MIT")),
            "lodash-4.17.21 (MIT)"
        );
    }

    #[test]
    fn test_inventory_name_falls_back_to_package_name() {
        assert_eq!(inventory_name("SPDXRef-pkg1", "pkg1", "1.0", Some("MIT")), "pkg1 1.0 (MIT)");
        assert_eq!(
            inventory_name(
                "SPDXRef-Package-go-module-gopkg.in-yaml.v3",
                "gopkg.in/yaml.v3",
                "3.0.1",
                None
            ),
            "gopkg.in/yaml.v3 3.0.1 (NOASSERTION)"
        );
        assert_eq!(inventory_name("SPDXRef-proj1", "proj1", "", None), "proj1 (NOASSERTION)");
    }

    #[test]
    fn test_package_url_takes_first_valid() {
        let package = SpdxPackage {
            spdx_id: "SPDXRef-pkg7".to_string(),
            external_refs: vec![
                purl_ref("SECURITY", "cpe23Type", "cpe:2.3:a:pkg7:pkg7:0.0.1:*:*:*:*:*:*:*"),
                purl_ref("PACKAGE-MANAGER", "maven-central", "pkg7-grp:pkg7:0.0.1"),
                purl_ref("PACKAGE-MANAGER", "purl", "pkg:"),
                purl_ref("PACKAGE_MANAGER", "purl", "pkg:maven/pkg7-grp/pkg7@0.0.1"),
                purl_ref("PACKAGE_MANAGER", "purl", "pkg:maven/other/other@1"),
            ],
            ..SpdxPackage::default()
        };
        assert_eq!(
            package_url(&package).as_deref(),
            Some("pkg:maven/pkg7-grp/pkg7@0.0.1")
        );
    }

    #[test]
    fn test_download_location_sentinels() {
        let mut package = SpdxPackage::default();
        assert_eq!(download_location(&package), None);
        package.download_location = Some("NOASSERTION".to_string());
        assert_eq!(download_location(&package), None);
        package.download_location = Some("https://example.com/pkg7-sources.jar".to_string());
        assert_eq!(
            download_location(&package),
            Some("https://example.com/pkg7-sources.jar")
        );
    }
}
