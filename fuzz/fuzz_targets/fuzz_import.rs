#![no_main]
use libfuzzer_sys::fuzz_target;
use spdx_inventory::import::{Importer, RecordingSink, SpdxWorkData};
use spdx_inventory::model::Project;
use spdx_inventory::store::{InventoryStore, NoOpCleaner};

/// Run whole imports on arbitrary input. Rejected documents must leave the
/// store untouched.
fuzz_target!(|data: &[u8]| {
    let mut store = InventoryStore::new();
    let project = store.create_project(Project::new("fuzz", None));
    let before = store.counts();
    let work = SpdxWorkData::new(project, data.to_vec());
    let mut sink = RecordingSink::new();
    if let Err(e) = Importer::new(&mut store, &NoOpCleaner, &mut sink).run(&work, &mut |_| {})
        && e.is_rejection()
    {
        assert_eq!(store.counts(), before);
    }
});
