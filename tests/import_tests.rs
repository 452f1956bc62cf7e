//! End-to-end import tests against fixture documents.

use spdx_inventory::import::{FollowUp, Importer, RecordingSink, SpdxWorkData, UNKNOWN_FILE};
use spdx_inventory::model::{ItemId, Linking, Project, ProjectId, STANDALONE_VERSION};
use spdx_inventory::store::{InventoryStore, JsonStore, NoOpCleaner, StoreCleaner};
use spdx_inventory::{ImportError, ImportOptions, ImportProgress, ImportStage};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(format!("{FIXTURES_DIR}/spdx/{name}")).expect("fixture exists")
}

fn setup() -> (InventoryStore, ProjectId) {
    let mut store = InventoryStore::new();
    let project = store.create_project(Project::new("firmware", None));
    (store, project)
}

fn import(
    store: &mut InventoryStore,
    work: &SpdxWorkData,
) -> (Result<spdx_inventory::ImportSummary, ImportError>, RecordingSink, Vec<ImportProgress>) {
    let cleaner = StoreCleaner::new();
    let mut sink = RecordingSink::new();
    let mut reports = Vec::new();
    let result = Importer::new(store, &cleaner, &mut sink).run(work, &mut |p| reports.push(p));
    (result, sink, reports)
}

fn item_by_spdx_id(store: &InventoryStore, project: ProjectId, spdx_id: &str) -> ItemId {
    store
        .find_item(project, spdx_id)
        .unwrap_or_else(|| panic!("item {spdx_id} missing"))
}

fn license_names(store: &InventoryStore, project: ProjectId, spdx_id: &str) -> Vec<String> {
    let item = store.item(item_by_spdx_id(store, project, spdx_id)).unwrap();
    let component = store.component(item.component.unwrap()).unwrap();
    component
        .licenses
        .iter()
        .map(|&id| store.license(id).unwrap().name.clone())
        .collect()
}

fn copyright_texts(store: &InventoryStore, project: ProjectId, spdx_id: &str) -> Vec<String> {
    let item = store.item(item_by_spdx_id(store, project, spdx_id)).unwrap();
    let component = store.component(item.component.unwrap()).unwrap();
    component
        .copyrights
        .iter()
        .map(|&id| store.copyright(id).unwrap().text.clone())
        .collect()
}

mod packages {
    use super::*;

    #[test]
    fn test_one_item_per_package_and_orphan() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        let (result, _, _) = import(&mut store, &work);
        let summary = result.unwrap();

        assert_eq!(summary.items, 6);
        assert_eq!(summary.stats.packages, 5);
        assert_eq!(summary.stats.orphans, 1);
        assert_eq!(summary.stats.skipped, 0);
        assert_eq!(summary.document_uri, "https://example.com/spdx/firmware-1");
        assert_eq!(store.items_of(project).count(), 6);
    }

    #[test]
    fn test_package_item_and_component() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        import(&mut store, &work).0.unwrap();

        let item = store.item(item_by_spdx_id(&store, project, "SPDXRef-pkg1")).unwrap();
        assert_eq!(item.name, "pkg1 1.0 (MIT)");
        assert_eq!(item.size, 1);
        assert!(!item.was_combined);
        assert!(!item.curated);

        let component = store.component(item.component.unwrap()).unwrap();
        assert_eq!(component.name, "pkg1");
        assert_eq!(component.version, "1.0");
        assert_eq!(
            component.details_url.as_deref(),
            Some("https://example.com/pkg1-1.0.tar.gz")
        );
    }

    #[test]
    fn test_declared_license_used_when_nothing_concluded() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        import(&mut store, &work).0.unwrap();

        let item = store.item(item_by_spdx_id(&store, project, "SPDXRef-proj1")).unwrap();
        assert_eq!(item.name, "proj1 2.0 (Apache-2.0)");
        assert_eq!(license_names(&store, project, "SPDXRef-proj1"), ["Apache-2.0"]);
        assert!(copyright_texts(&store, project, "SPDXRef-proj1").is_empty());
    }

    #[test]
    fn test_extracted_license_keeps_document_text() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        import(&mut store, &work).0.unwrap();

        let item = store.item(item_by_spdx_id(&store, project, "SPDXRef-pkg6")).unwrap();
        assert_eq!(item.name, "asmus 3.1 (LicenseRef-scancode-asmus)");
        let component = store.component(item.component.unwrap()).unwrap();
        assert_eq!(component.details_url, None);
        let license = store.license(component.licenses[0]).unwrap();
        assert_eq!(license.license_type, "LicenseRef-scancode-asmus");
        assert_eq!(license.text, "Permission is granted by Asmus to use this file.");
        assert!(!license.is_standard);
    }

    #[test]
    fn test_exception_sentinel_and_purl() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        import(&mut store, &work).0.unwrap();

        assert_eq!(license_names(&store, project, "SPDXRef-pkg7"), ["GPL-2.0-only"]);
        let item = store.item(item_by_spdx_id(&store, project, "SPDXRef-pkg7")).unwrap();
        let component = store.component(item.component.unwrap()).unwrap();
        assert_eq!(component.purl.as_deref(), Some("pkg:maven/pkg7-grp/pkg7@0.0.1"));
        let license = store.license(component.licenses[0]).unwrap();
        assert!(license.is_standard);
        assert!(license.text.is_empty());
    }

    #[test]
    fn test_conjunctive_expression_marks_item_combined() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        import(&mut store, &work).0.unwrap();

        let spdx_id = "SPDXRef-Package-go-module-gopkg.in-yaml.v3";
        let item = store.item(item_by_spdx_id(&store, project, spdx_id)).unwrap();
        assert!(item.was_combined);
        assert_eq!(item.name, "gopkg.in/yaml.v3 v3.0.1 (Apache-2.0 AND MIT)");
        assert_eq!(license_names(&store, project, spdx_id), ["Apache-2.0", "MIT"]);
    }

    #[test]
    fn test_shared_copyright_links_member_file() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        import(&mut store, &work).0.unwrap();

        let copyright = store.find_copyright("Copyright 2020 Jane Doe").unwrap();
        let files = &store.copyright(copyright).unwrap().files;
        assert_eq!(files.len(), 1);
        let file = store.file(files[0]).unwrap();
        assert_eq!(file.file_name, "main.c");
        assert_eq!(file.project, project);
    }
    #[test]
    fn test_deeply_nested_license_does_not_stop_import() {
        let (mut store, project) = setup();
        let nested = format!("{}MIT{}", "(".repeat(2000), ")".repeat(2000));
        let doc = serde_json::json!({
            "spdxVersion": "SPDX-2.3",
            "SPDXID": "SPDXRef-DOCUMENT",
            "name": "nested",
            "documentNamespace": "https://example.com/nested",
            "packages": [
                {"SPDXID": "SPDXRef-deep", "name": "deep", "licenseConcluded": nested},
                {
                    "SPDXID": "SPDXRef-good",
                    "name": "good",
                    "versionInfo": "1.0",
                    "licenseConcluded": "MIT"
                }
            ]
        });
        let work = SpdxWorkData::new(project, serde_json::to_vec(&doc).unwrap());

        let cleaner = NoOpCleaner;
        let mut sink = RecordingSink::new();
        let ok = Importer::new(&mut store, &cleaner, &mut sink).process(&work, &mut |_| {});

        assert!(ok);
        assert_eq!(license_names(&store, project, "SPDXRef-good"), ["MIT"]);
        let deep = store.item(item_by_spdx_id(&store, project, "SPDXRef-deep")).unwrap();
        assert!(store.component(deep.component.unwrap()).unwrap().licenses.is_empty());
    }
}

mod orphans {
    use super::*;

    #[test]
    fn test_unclaimed_file_becomes_standalone_item() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        import(&mut store, &work).0.unwrap();

        let item = store
            .item(item_by_spdx_id(&store, project, "SPDXRef-OrphanedFile1"))
            .unwrap();
        assert_eq!(item.name, "some/file");
        assert_eq!(item.size, 1);
        assert_eq!(item.parent, None);
        let component = store.component(item.component.unwrap()).unwrap();
        assert_eq!(component.name, "some/file");
        assert_eq!(component.version, STANDALONE_VERSION);
        assert_eq!(license_names(&store, project, "SPDXRef-OrphanedFile1"), ["BSD-3-Clause"]);
        assert_eq!(
            copyright_texts(&store, project, "SPDXRef-OrphanedFile1"),
            ["Copyright 2015 Orphan Author"]
        );
        assert!(store.find_item(project, "SPDXRef-File-1").is_none());
    }

    #[test]
    fn test_orphan_without_path() {
        let (mut store, project) = setup();
        let doc = br#"{
            "spdxVersion": "SPDX-2.3", "SPDXID": "SPDXRef-DOCUMENT", "name": "n",
            "documentNamespace": "https://example.com/n",
            "files": [{"SPDXID": "SPDXRef-f", "fileName": ""}]
        }"#;
        let work = SpdxWorkData::new(project, doc.to_vec());
        import(&mut store, &work).0.unwrap();
        let item = store.item(item_by_spdx_id(&store, project, "SPDXRef-f")).unwrap();
        assert_eq!(item.name, UNKNOWN_FILE);
    }
}

mod relationships {
    use super::*;

    #[test]
    fn test_parent_links() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        let summary = import(&mut store, &work).0.unwrap();

        let proj1 = item_by_spdx_id(&store, project, "SPDXRef-proj1");
        let pkg1 = item_by_spdx_id(&store, project, "SPDXRef-pkg1");
        let parent = |id: &str| store.item(item_by_spdx_id(&store, project, id)).unwrap().parent;

        assert_eq!(parent("SPDXRef-proj1"), None);
        assert_eq!(parent("SPDXRef-pkg1"), Some(proj1));
        assert_eq!(parent("SPDXRef-pkg6"), Some(proj1));
        assert_eq!(parent("SPDXRef-Package-go-module-gopkg.in-yaml.v3"), Some(proj1));
        assert_eq!(parent("SPDXRef-pkg7"), Some(pkg1));
        assert_eq!(summary.stats.parent_links, 4);
    }

    #[test]
    fn test_link_kind_set_on_target() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        import(&mut store, &work).0.unwrap();

        let pkg6 = store.item(item_by_spdx_id(&store, project, "SPDXRef-pkg6")).unwrap();
        assert_eq!(pkg6.linking, Some(Linking::Dynamic));
        let pkg1 = store.item(item_by_spdx_id(&store, project, "SPDXRef-pkg1")).unwrap();
        assert_eq!(pkg1.linking, None);
    }

    #[test]
    fn test_package_edges_mirrored() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        import(&mut store, &work).0.unwrap();

        let root = store
            .document(store.find_document("https://example.com/spdx/firmware-1").unwrap())
            .unwrap();
        assert_eq!(root.relationships.len(), 7);
        assert!(root
            .relationships
            .values()
            .any(|r| r.source_id == "SPDXRef-proj1" && r.target_id.is_none()));
        assert_eq!(root.packages.len(), 5);
        assert_eq!(root.files.len(), 2);
        assert_eq!(root.snippets.len(), 1);
        assert_eq!(root.extracted_licenses.len(), 1);
    }

    #[test]
    fn test_cycles_and_self_links() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("cycle.spdx.json"));
        let summary = import(&mut store, &work).0.unwrap();

        let a = item_by_spdx_id(&store, project, "SPDXRef-a");
        let b = item_by_spdx_id(&store, project, "SPDXRef-b");
        let c = item_by_spdx_id(&store, project, "SPDXRef-c");
        assert_eq!(store.item(b).unwrap().parent, Some(a));
        assert_eq!(store.item(a).unwrap().parent, Some(b));
        assert_eq!(store.item(c).unwrap().parent, None);
        assert_eq!(store.item(a).unwrap().linking, Some(Linking::Static));
        assert_eq!(summary.stats.parent_links, 2);
        // The unparsable license of c is skipped; c itself is imported.
        assert_eq!(summary.stats.skipped, 1);
        assert_eq!(summary.stats.packages, 3);
    }
}

mod snippets {
    use super::*;

    #[test]
    fn test_snippet_enriches_owning_component() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        let summary = import(&mut store, &work).0.unwrap();

        assert_eq!(summary.stats.snippets, 1);
        assert_eq!(
            license_names(&store, project, "SPDXRef-pkg1"),
            ["MIT", "GPL-2.0-only"]
        );
        assert_eq!(
            copyright_texts(&store, project, "SPDXRef-pkg1"),
            ["Copyright 2020 Jane Doe", "Copyright 2008-2010 John Smith"]
        );
    }
    #[test]
    fn test_snippet_copyright_already_on_component() {
        let (mut store, project) = setup();
        let doc = br#"{
            "spdxVersion": "SPDX-2.3", "SPDXID": "SPDXRef-DOCUMENT", "name": "n",
            "documentNamespace": "https://example.com/shared-copyright",
            "packages": [{
                "SPDXID": "SPDXRef-lib", "name": "lib", "versionInfo": "2.1",
                "licenseConcluded": "MIT",
                "copyrightText": "Copyright 2021 Acme Corp",
                "hasFiles": ["SPDXRef-lib-c"]
            }],
            "files": [{"SPDXID": "SPDXRef-lib-c", "fileName": "./lib.c"}],
            "snippets": [{
                "SPDXID": "SPDXRef-Snippet-lib",
                "snippetFromFile": "SPDXRef-lib-c",
                "licenseConcluded": "MIT",
                "copyrightText": "Copyright 2021 Acme Corp",
                "ranges": []
            }]
        }"#;
        let work = SpdxWorkData::new(project, doc.to_vec());
        let before = store.counts();
        let summary = import(&mut store, &work).0.unwrap();

        assert_eq!(summary.stats.snippets, 1);
        assert_eq!(
            copyright_texts(&store, project, "SPDXRef-lib"),
            ["Copyright 2021 Acme Corp"]
        );
        assert_eq!(license_names(&store, project, "SPDXRef-lib"), ["MIT"]);
        assert_eq!(store.counts().copyrights, before.copyrights + 1);
    }
}

mod runs {
    use super::*;

    #[test]
    fn test_reimport_is_idempotent() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        let first = import(&mut store, &work).0.unwrap();
        let counts = store.counts();
        let items: Vec<_> = store.items_of(project).map(|(id, i)| (id, i.parent)).collect();

        let second = import(&mut store, &work).0.unwrap();
        assert_eq!(store.counts(), counts);
        assert_eq!(
            store.items_of(project).map(|(id, i)| (id, i.parent)).collect::<Vec<_>>(),
            items
        );
        assert_eq!(first.stats.items_created, 6);
        assert_eq!(second.stats.items_created, 0);
        assert_eq!(
            license_names(&store, project, "SPDXRef-pkg1"),
            ["MIT", "GPL-2.0-only"]
        );
    }

    #[test]
    fn test_unknown_project_rejected_without_side_effects() {
        let (mut store, _) = setup();
        let before = store.counts();
        let work = SpdxWorkData::new(ProjectId::from_index(42), fixture("firmware.spdx.json"));

        let cleaner = NoOpCleaner;
        let mut sink = RecordingSink::new();
        let ok = Importer::new(&mut store, &cleaner, &mut sink).process(&work, &mut |_| {});
        assert!(!ok);
        assert_eq!(store.counts(), before);
        assert!(sink.received.is_empty());
    }

    #[test]
    fn test_malformed_document_rejected_without_side_effects() {
        let (mut store, project) = setup();
        let before = store.counts();
        for bytes in [&b"{not json"[..], br#"{"spdxVersion": "CycloneDX"}"#, b"[]"] {
            let work = SpdxWorkData::new(project, bytes.to_vec());
            let (result, sink, _) = import(&mut store, &work);
            let err = result.unwrap_err();
            assert!(err.is_rejection(), "{err}");
            assert!(matches!(err, ImportError::Deserialize { .. }));
            assert!(sink.received.is_empty());
        }
        assert_eq!(store.counts(), before);
    }

    #[test]
    fn test_stages_reported_in_order() {
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        let (_, _, reports) = import(&mut store, &work);

        let mut stages: Vec<ImportStage> = reports.iter().map(|p| p.stage).collect();
        stages.dedup();
        assert_eq!(
            stages,
            [
                ImportStage::ValidateProject,
                ImportStage::CleanPriorImport,
                ImportStage::Packages,
                ImportStage::Orphans,
                ImportStage::Relationships,
                ImportStage::Snippets,
                ImportStage::Done,
            ]
        );
        let last_packages = reports.iter().rfind(|p| p.stage == ImportStage::Packages).unwrap();
        assert_eq!((last_packages.completed, last_packages.total), (5, 5));
    }

    #[test]
    fn test_store_survives_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let file = JsonStore::new(tmp.path().join("store.json"));
        let (mut store, project) = setup();
        let work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        import(&mut store, &work).0.unwrap();
        file.save(&store).unwrap();

        let mut loaded = file.load().unwrap();
        assert_eq!(loaded.counts(), store.counts());
        import(&mut loaded, &work).0.unwrap();
        assert_eq!(loaded.counts(), store.counts());
    }
}

mod follow_ups {
    use super::*;

    #[test]
    fn test_downloads_then_answers_then_vulnerabilities() {
        let mut store = InventoryStore::new();
        let project = store.create_project(Project::new("firmware", Some("/srv/sources".into())));
        let mut work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        work.use_copyright_ai = true;
        let (result, sink, _) = import(&mut store, &work);
        let summary = result.unwrap();

        let downloads: Vec<_> = sink.downloads().collect();
        assert_eq!(downloads.len(), 2);
        assert!(downloads.iter().all(|d| !d.is_main && d.project == project));
        assert_eq!(downloads[0].url, "https://example.com/pkg1-1.0.tar.gz");
        assert_eq!(downloads[0].version, "1.0");
        assert_eq!(downloads[0].base_path.as_deref(), Some(std::path::Path::new("/srv/sources")));

        assert_eq!(sink.count("copyright-filter"), 6);
        assert_eq!(sink.count("license-matcher"), 0);
        assert_eq!(sink.count("vulnerability"), 6);
        assert_eq!(summary.follow_ups_sent, sink.received.len());
        assert_eq!(summary.follow_ups_failed, 0);

        let first_answer = sink
            .received
            .iter()
            .position(|f| matches!(f, FollowUp::CopyrightFilter { .. }))
            .unwrap();
        assert!(sink.received[..first_answer]
            .iter()
            .all(|f| matches!(f, FollowUp::Download(_))));
        assert!(matches!(sink.received.last(), Some(FollowUp::Vulnerability { .. })));
    }

    #[test]
    fn test_downloads_can_be_disabled() {
        let (mut store, project) = setup();
        let mut work = SpdxWorkData::new(project, fixture("firmware.spdx.json"));
        work.use_license_matcher = true;
        let cleaner = NoOpCleaner;
        let mut sink = RecordingSink::new();
        Importer::new(&mut store, &cleaner, &mut sink)
            .with_options(ImportOptions {
                emit_downloads: false,
                ..ImportOptions::default()
            })
            .run(&work, &mut |_| {})
            .unwrap();

        assert_eq!(sink.downloads().count(), 0);
        assert_eq!(sink.count("license-matcher"), 6);
    }
}
