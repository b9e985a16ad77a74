//! Serializable note-graph snapshot for graph views.

use crate::host::{DocumentStore, MetadataCache};
use crate::note::NoteTree;
use crate::reference::RefTarget;
use crate::vault::Vault;
use crate::workspace::Workspace;
use serde::Serialize;
use std::collections::HashMap;

/// One note, existing or referenced-but-missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Case-normalized `vault/path` key.
    pub id: String,
    pub label: String,
    /// False for structural placeholders and unresolved reference targets.
    pub exists: bool,
}

/// Directed reference from one node to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

fn node_key(vault: &Vault, tree: &NoteTree, id: crate::note::NoteId) -> String {
    format!("{}/{}", vault.name(), tree.get_path(id)).to_lowercase()
}

/// Build the graph across every vault in the workspace.
///
/// Every note in every tree becomes a node; every document link that
/// resolves to a note (present or not) becomes an edge. Links to
/// non-markdown files are not part of the note graph and are skipped.
pub fn build_graph_data(
    workspace: &Workspace,
    store: &dyn DocumentStore,
    cache: &dyn MetadataCache,
) -> GraphData {
    let mut data = GraphData::default();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut push_node = |data: &mut GraphData, key: String, label: String, exists: bool| {
        if let Some(&at) = index.get(&key) {
            // a placeholder may be upgraded once the real note shows up
            if exists && !data.nodes[at].exists {
                data.nodes[at].exists = true;
                data.nodes[at].label = label;
            }
            return;
        }
        index.insert(key.clone(), data.nodes.len());
        data.nodes.push(GraphNode {
            id: key,
            label,
            exists,
        });
    };

    for vault in workspace.vaults() {
        let tree = vault.tree();
        for id in tree.flatten() {
            let Some(note) = tree.get(id) else { continue };
            push_node(
                &mut data,
                node_key(vault, tree, id),
                note.title().to_string(),
                note.file().is_some(),
            );
        }
    }

    for vault in workspace.vaults() {
        let tree = vault.tree();
        for id in tree.flatten() {
            let Some(file) = tree.get(id).and_then(|note| note.file()) else {
                continue;
            };
            let Some(meta) = cache.document_meta(file) else {
                continue;
            };

            let source_key = node_key(vault, tree, id);
            let source_path = vault.note_path(&tree.get_path_original(id));
            for link in &meta.links {
                let resolved = workspace.resolve_ref(&source_path, link, store, cache);
                let Some(RefTarget::MaybeNote(target)) = resolved else {
                    continue;
                };
                let key = target.key();
                push_node(&mut data, key.clone(), target.path.clone(), false);
                data.links.push(GraphLink {
                    source: source_key.clone(),
                    target: key,
                });
            }
        }
    }

    data
}
