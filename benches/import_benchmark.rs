//! Benchmarks for parsing and importing SPDX documents.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use spdx_inventory::import::{Importer, RecordingSink, SpdxWorkData};
use spdx_inventory::model::Project;
use spdx_inventory::parsers::SpdxJsonParser;
use spdx_inventory::store::{InventoryStore, NoOpCleaner};
use std::fmt::Write as _;
use std::hint::black_box;

/// A document with `n` packages in a chain, one member file each.
fn synthetic_document(n: usize) -> String {
    let mut packages = String::new();
    let mut files = String::new();
    let mut relationships = String::new();
    for i in 0..n {
        let sep = if i == 0 { "" } else { "," };
        let license = if i % 3 == 0 { "MIT AND Apache-2.0" } else { "BSD-3-Clause" };
        let _ = write!(
            packages,
            r#"{sep}{{"SPDXID": "SPDXRef-p{i}", "name": "pkg{i}", "versionInfo": "1.{i}",
                "licenseConcluded": "{license}", "copyrightText": "Copyright {i} Example",
                "downloadLocation": "https://example.com/pkg{i}.tgz",
                "hasFiles": ["SPDXRef-f{i}"]}}"#
        );
        let _ = write!(
            files,
            r#"{sep}{{"SPDXID": "SPDXRef-f{i}", "fileName": "./src/pkg{i}/lib.c",
                "copyrightText": "Copyright {i} Example"}}"#
        );
        if i > 0 {
            let _ = write!(
                relationships,
                r#"{}{{"spdxElementId": "SPDXRef-p{}", "relationshipType": "DEPENDS_ON",
                    "relatedSpdxElement": "SPDXRef-p{i}"}}"#,
                if i == 1 { "" } else { "," },
                i - 1
            );
        }
    }
    format!(
        r#"{{"spdxVersion": "SPDX-2.3", "SPDXID": "SPDXRef-DOCUMENT", "name": "bench",
            "documentNamespace": "https://example.com/bench", "documentDescribes": ["SPDXRef-p0"],
            "packages": [{packages}], "files": [{files}], "relationships": [{relationships}]}}"#
    )
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for n in [100, 1_000] {
        let json = synthetic_document(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &json, |b, json| {
            let parser = SpdxJsonParser::new();
            b.iter(|| black_box(parser.parse_str(json)));
        });
    }
    group.finish();
}

fn bench_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("import");
    group.sample_size(20);
    for n in [100, 1_000] {
        let bytes = synthetic_document(n).into_bytes();
        group.bench_with_input(BenchmarkId::new("fresh", n), &bytes, |b, bytes| {
            b.iter(|| {
                let mut store = InventoryStore::new();
                let project = store.create_project(Project::new("bench", None));
                let work = SpdxWorkData::new(project, bytes.clone());
                let mut sink = RecordingSink::new();
                let summary =
                    Importer::new(&mut store, &NoOpCleaner, &mut sink).run(&work, &mut |_| {});
                black_box(summary.map(|s| s.items))
            });
        });

        let mut store = InventoryStore::new();
        let project = store.create_project(Project::new("bench", None));
        let work = SpdxWorkData::new(project, bytes.clone());
        let mut sink = RecordingSink::new();
        let _ = Importer::new(&mut store, &NoOpCleaner, &mut sink).run(&work, &mut |_| {});
        group.bench_with_input(BenchmarkId::new("reimport", n), &work, |b, work| {
            b.iter(|| {
                let mut sink = RecordingSink::new();
                let summary =
                    Importer::new(&mut store, &NoOpCleaner, &mut sink).run(work, &mut |_| {});
                black_box(summary.map(|s| s.stats.items_created))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_import);
criterion_main!(benches);
