//! Dendron-style hierarchical note trees over Obsidian-style vaults.
//!
//! # Overview
//!
//! This crate models a workspace of vaults whose markdown documents are
//! named with dot-separated hierarchical paths (`recipe.vegetarian.pasta`),
//! enabling:
//! - Note tree construction from flat folders, with structural placeholders
//!   for missing ancestors
//! - Incremental updates from host file events (create, delete, rename,
//!   metadata change)
//! - Cross-vault reference resolution (`dendron://vault/path#anchor`)
//! - Heading, block, and range anchors with content extraction
//! - Note graph snapshots for visualization
//!
//! # Example
//!
//! ```no_run
//! use dendron_tree::{MemoryHost, VaultConfig, Workspace};
//!
//! let mut host = MemoryHost::new();
//! host.add_document("notes/recipe.vegetarian.md", "");
//!
//! let mut workspace = Workspace::new();
//! workspace.change_vaults(
//!     &[VaultConfig { name: "notes".into(), path: "notes".into() }],
//!     &host,
//!     &host,
//! );
//!
//! let vault = workspace.find_vault_by_name("notes").unwrap();
//! for id in vault.tree().flatten() {
//!     println!("{}", vault.tree().get_path(id));
//! }
//! ```

pub mod error;
pub mod graph;
pub mod host;
pub mod note;
pub mod path;
pub mod reference;
pub mod settings;
pub mod vault;
pub mod workspace;

// Re-export main types at crate root
pub use error::{Error, Result};
pub use graph::{build_graph_data, GraphData, GraphLink, GraphNode};
pub use host::{
    BlockMeta, DocumentMeta, DocumentStore, FileId, FileInfo, FileStat, FolderId, HeadingMeta,
    MemoryHost, MetadataCache,
};
pub use note::{generate_note_title, is_use_title_case, Note, NoteId, NoteMetadata, NoteTree};
pub use path::{parse_fs_path, ParsedPath};
pub use reference::{
    anchor_to_link_suffix, extract_ref_content, get_ref_content_range, parse_link_text,
    parse_ref_anchor, parse_ref_subpath, slugify_heading, MaybeNoteRef, RefAnchor, RefContent,
    RefRange, RefSubpath, RefTarget,
};
pub use settings::{DeleteMethod, Settings};
pub use vault::{front_matter_block, generate_front_matter, Vault, VaultConfig};
pub use workspace::{Workspace, REF_SCHEME};
