//! Inventory command handler.
//!
//! Prints a project's items as a tree following the parent links, or as a
//! flat JSON listing with component details.

use super::{OutputTarget, open_store, write_output};
use crate::config::AppConfig;
use crate::model::{ItemId, ProjectId};
use crate::store::InventoryStore;
use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Output format of the inventory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum InventoryFormat {
    #[default]
    Tree,
    Json,
}

/// Run the inventory command.
pub fn run_inventory(
    config: &AppConfig,
    project: ProjectId,
    format: InventoryFormat,
    output_file: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let (_, store) = open_store(config)?;
    if store.project(project).is_none() {
        bail!("Project {project} does not exist");
    }
    let content = render_inventory(&store, project, format)?;
    write_output(&content, &OutputTarget::from_option(output_file), quiet)
}

#[derive(Serialize)]
struct ItemRow<'a> {
    id: ItemId,
    spdx_id: &'a str,
    name: &'a str,
    parent: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    linking: Option<String>,
    was_combined: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<ComponentRow<'a>>,
}

#[derive(Serialize)]
struct ComponentRow<'a> {
    name: &'a str,
    version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    purl: Option<&'a str>,
    licenses: Vec<&'a str>,
    copyrights: Vec<&'a str>,
}

fn component_row(store: &InventoryStore, item: ItemId) -> Option<ComponentRow<'_>> {
    let component = store.component(store.item(item)?.component?)?;
    Some(ComponentRow {
        name: &component.name,
        version: &component.version,
        purl: component.purl.as_deref(),
        licenses: component
            .licenses
            .iter()
            .filter_map(|&id| store.license(id))
            .map(|l| l.name.as_str())
            .collect(),
        copyrights: component
            .copyrights
            .iter()
            .filter_map(|&id| store.copyright(id))
            .map(|c| c.text.as_str())
            .collect(),
    })
}

/// Render a project's inventory.
pub fn render_inventory(
    store: &InventoryStore,
    project: ProjectId,
    format: InventoryFormat,
) -> Result<String> {
    match format {
        InventoryFormat::Json => {
            let rows: Vec<ItemRow<'_>> = store
                .items_of(project)
                .map(|(id, item)| ItemRow {
                    id,
                    spdx_id: &item.spdx_id,
                    name: &item.name,
                    parent: item.parent,
                    linking: item.linking.map(|l| l.to_string()),
                    was_combined: item.was_combined,
                    component: component_row(store, id),
                })
                .collect();
            Ok(serde_json::to_string_pretty(&rows)?)
        }
        InventoryFormat::Tree => Ok(render_tree(store, project)),
    }
}

fn render_tree(store: &InventoryStore, project: ProjectId) -> String {
    let items: Vec<ItemId> = store.items_of(project).map(|(id, _)| id).collect();
    let in_project: HashSet<ItemId> = items.iter().copied().collect();

    let mut children: HashMap<ItemId, Vec<ItemId>> = HashMap::new();
    let mut roots = Vec::new();
    for &id in &items {
        match store.item(id).and_then(|i| i.parent) {
            Some(parent) if in_project.contains(&parent) => {
                children.entry(parent).or_default().push(id);
            }
            _ => roots.push(id),
        }
    }

    let mut out = Vec::new();
    let mut visited = HashSet::new();
    for root in roots {
        write_node(store, &children, root, 0, &mut visited, &mut out);
    }

    // Items on a parent cycle are unreachable from any root.
    let unattached: Vec<ItemId> = items.into_iter().filter(|id| !visited.contains(id)).collect();
    if !unattached.is_empty() {
        out.push("Unattached:".to_string());
        for id in unattached {
            out.push(format!("  {}", item_line(store, id)));
        }
    }

    if out.is_empty() {
        "No items.".to_string()
    } else {
        out.join("\n")
    }
}

fn write_node(
    store: &InventoryStore,
    children: &HashMap<ItemId, Vec<ItemId>>,
    id: ItemId,
    depth: usize,
    visited: &mut HashSet<ItemId>,
    out: &mut Vec<String>,
) {
    if !visited.insert(id) {
        return;
    }
    out.push(format!("{}{}", "  ".repeat(depth), item_line(store, id)));
    for &child in children.get(&id).map(Vec::as_slice).unwrap_or_default() {
        write_node(store, children, child, depth + 1, visited, out);
    }
}

fn item_line(store: &InventoryStore, id: ItemId) -> String {
    let Some(item) = store.item(id) else {
        return format!("<missing item {id}>");
    };
    let mut line = format!("{} [{}]", item.name, item.spdx_id);
    if let Some(linking) = item.linking {
        line.push_str(&format!(" ({linking} link)"));
    }
    if let Some(component) = component_row(store, id)
        && !component.licenses.is_empty()
    {
        line.push_str(&format!(" {{{}}}", component.licenses.join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InventoryItem, Project};

    fn store_with_chain() -> (InventoryStore, ProjectId, [ItemId; 3]) {
        let mut store = InventoryStore::new();
        let project = store.create_project(Project::new("p", None));
        let a = store
            .upsert_item(project, "SPDXRef-a", || {
                InventoryItem::new(project, "SPDXRef-a", "a")
            })
            .id;
        let b = store
            .upsert_item(project, "SPDXRef-b", || {
                InventoryItem::new(project, "SPDXRef-b", "b")
            })
            .id;
        let c = store
            .upsert_item(project, "SPDXRef-c", || {
                InventoryItem::new(project, "SPDXRef-c", "c")
            })
            .id;
        store.item_mut(b).unwrap().parent = Some(a);
        (store, project, [a, b, c])
    }

    #[test]
    fn test_tree_indents_children() {
        let (store, project, _) = store_with_chain();
        let tree = render_inventory(&store, project, InventoryFormat::Tree).unwrap();
        assert_eq!(tree, "a [SPDXRef-a]\n  b [SPDXRef-b]\nc [SPDXRef-c]");
    }

    #[test]
    fn test_cycle_is_listed_as_unattached() {
        let (mut store, project, [a, b, _]) = store_with_chain();
        store.item_mut(a).unwrap().parent = Some(b);
        let tree = render_inventory(&store, project, InventoryFormat::Tree).unwrap();
        assert!(tree.starts_with("c [SPDXRef-c]\nUnattached:"));
        assert!(tree.contains("  a [SPDXRef-a]"));
        assert!(tree.contains("  b [SPDXRef-b]"));
    }

    #[test]
    fn test_json_lists_parents() {
        let (store, project, [a, _, _]) = store_with_chain();
        let json = render_inventory(&store, project, InventoryFormat::Json).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.as_array().map(Vec::len), Some(3));
        assert_eq!(rows[1]["parent"], serde_json::json!(a.index()));
    }
}
