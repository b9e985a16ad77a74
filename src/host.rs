//! Host application boundary.
//!
//! The tree engine runs inside an editor host that owns file storage and
//! markdown metadata extraction. This module defines the two collaborator
//! traits the engine consumes ([`DocumentStore`], [`MetadataCache`]),
//! identity-stable handles for files and folders, and [`MemoryHost`], an
//! in-memory implementation used by tests and host-less embedders.
//!
//! Heading and block byte offsets are *supplied* by the host, never parsed
//! here: the engine is not a markdown parser.

use crate::error::{Error, Result};
use crate::path::parse_fs_path;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Identity-stable handle to a document owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u64);

/// Identity-stable handle to a folder owned by the host.
///
/// Vault ownership checks compare these handles, not path strings: folder
/// identities survive moves while paths may collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderId(pub u64);

/// Creation/modification times as reported by the host, epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileStat {
    pub ctime: i64,
    pub mtime: i64,
}

/// Snapshot of a host document's identity and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub id: FileId,
    /// Full host path, e.g. `"sub/foo.bar.md"`.
    pub path: String,
    /// File name with extension.
    pub name: String,
    /// File name without extension.
    pub basename: String,
    pub extension: String,
    pub parent: Option<FolderId>,
    pub stat: FileStat,
}

impl FileInfo {
    pub fn new(id: FileId, path: &str, parent: Option<FolderId>) -> Self {
        let parsed = parse_fs_path(path);
        Self {
            id,
            path: path.to_string(),
            name: parsed.name,
            basename: parsed.basename,
            extension: parsed.extension,
            parent,
            stat: FileStat::default(),
        }
    }
}

/// A heading the host parsed out of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMeta {
    pub level: u8,
    /// Display text without the `#` markers.
    pub text: String,
    /// Byte offset of the heading line's start.
    pub start: usize,
    /// Byte offset just past the heading line.
    pub end: usize,
}

/// Byte range of a named block anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMeta {
    pub start: usize,
    pub end: usize,
}

/// Parsed document structure supplied by the host's metadata cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMeta {
    /// Headings in document order.
    pub headings: Vec<HeadingMeta>,
    /// Block anchors keyed by name (without the `^` marker).
    pub blocks: HashMap<String, BlockMeta>,
    /// Raw link texts found in the document, in document order.
    pub links: Vec<String>,
}

/// File storage as exposed by the host.
pub trait DocumentStore {
    /// Folder handle at a path. Empty path addresses the host root.
    fn folder_at(&self, path: &str) -> Option<FolderId>;

    /// Direct children of a folder, non-recursive.
    fn children_of(&self, folder: FolderId) -> Vec<FileInfo>;

    fn create_folder(&mut self, path: &str) -> Result<FolderId>;

    fn create_document(&mut self, path: &str, content: &str) -> Result<FileInfo>;

    fn read_document(&self, file: FileId) -> Result<String>;
}

/// Parsed-metadata access as exposed by the host.
pub trait MetadataCache {
    /// Front matter of a document as a string-keyed map, if any.
    fn front_matter(&self, file: FileId) -> Option<serde_yaml::Mapping>;

    /// Heading/block offset table of a document, if the host has parsed it.
    fn document_meta(&self, file: FileId) -> Option<&DocumentMeta>;

    /// Resolve a link text to a concrete document, mirroring the host's own
    /// link-resolution semantics (extension-based, fuzzy-path based).
    fn resolve_link(&self, link_path: &str, source_path: &str) -> Option<FileInfo>;
}

struct MemoryDocument {
    info: FileInfo,
    content: String,
    meta: Option<DocumentMeta>,
}

/// In-memory host: documents, folders, and caller-supplied metadata.
///
/// Front matter is parsed from document content on demand; heading/block
/// offset tables are registered explicitly via [`MemoryHost::set_document_meta`]
/// since offset production belongs to a real host's markdown pipeline.
#[derive(Default)]
pub struct MemoryHost {
    next_id: u64,
    folder_by_path: BTreeMap<String, FolderId>,
    files: BTreeMap<FileId, MemoryDocument>,
    clock: i64,
}

impl MemoryHost {
    pub fn new() -> Self {
        let mut host = Self::default();
        let root = FolderId(host.alloc());
        host.folder_by_path.insert(String::new(), root);
        host
    }

    fn alloc(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn normalize(path: &str) -> &str {
        let path = path.strip_prefix('/').unwrap_or(path);
        path.strip_suffix('/').unwrap_or(path)
    }

    /// Get or create a folder, creating missing ancestors.
    pub fn add_folder(&mut self, path: &str) -> FolderId {
        let path = Self::normalize(path);
        if let Some(id) = self.folder_by_path.get(path) {
            return *id;
        }
        if let Some(idx) = path.rfind('/') {
            self.add_folder(&path[..idx]);
        }
        let id = FolderId(self.alloc());
        self.folder_by_path.insert(path.to_string(), id);
        id
    }

    /// Add a document, creating its parent folder chain as needed.
    pub fn add_document(&mut self, path: &str, content: &str) -> FileInfo {
        let path = Self::normalize(path).to_string();
        let dir = parse_fs_path(&path).dir;
        let parent = self.add_folder(&dir);
        let id = FileId(self.alloc());

        let mut info = FileInfo::new(id, &path, Some(parent));
        self.clock += 1;
        info.stat = FileStat {
            ctime: self.clock,
            mtime: self.clock,
        };

        self.files.insert(
            id,
            MemoryDocument {
                info: info.clone(),
                content: content.to_string(),
                meta: None,
            },
        );
        info
    }

    pub fn set_document_meta(&mut self, file: FileId, meta: DocumentMeta) {
        if let Some(doc) = self.files.get_mut(&file) {
            doc.meta = Some(meta);
        }
    }

    pub fn document_info(&self, file: FileId) -> Option<&FileInfo> {
        self.files.get(&file).map(|doc| &doc.info)
    }

    pub fn remove_document(&mut self, file: FileId) -> Option<FileInfo> {
        self.files.remove(&file).map(|doc| doc.info)
    }

    /// Move a document to a new path, keeping its identity.
    pub fn rename_document(&mut self, file: FileId, new_path: &str) -> Option<FileInfo> {
        let new_path = Self::normalize(new_path).to_string();
        let dir = parse_fs_path(&new_path).dir;
        let parent = self.add_folder(&dir);

        let doc = self.files.get_mut(&file)?;
        let stat = doc.info.stat;
        doc.info = FileInfo::new(file, &new_path, Some(parent));
        doc.info.stat = stat;
        Some(doc.info.clone())
    }
}

impl DocumentStore for MemoryHost {
    fn folder_at(&self, path: &str) -> Option<FolderId> {
        self.folder_by_path.get(Self::normalize(path)).copied()
    }

    fn children_of(&self, folder: FolderId) -> Vec<FileInfo> {
        self.files
            .values()
            .filter(|doc| doc.info.parent == Some(folder))
            .map(|doc| doc.info.clone())
            .collect()
    }

    fn create_folder(&mut self, path: &str) -> Result<FolderId> {
        let normalized = Self::normalize(path);
        if self.folder_by_path.contains_key(normalized) {
            return Err(Error::FolderAlreadyExists(path.to_string()));
        }
        Ok(self.add_folder(normalized))
    }

    fn create_document(&mut self, path: &str, content: &str) -> Result<FileInfo> {
        let normalized = Self::normalize(path);
        if self.files.values().any(|doc| doc.info.path == normalized) {
            return Err(Error::DocumentAlreadyExists(path.to_string()));
        }
        Ok(self.add_document(normalized, content))
    }

    fn read_document(&self, file: FileId) -> Result<String> {
        self.files
            .get(&file)
            .map(|doc| doc.content.clone())
            .ok_or_else(|| Error::DocumentNotFound(format!("{:?}", file)))
    }
}

impl MetadataCache for MemoryHost {
    fn front_matter(&self, file: FileId) -> Option<serde_yaml::Mapping> {
        let doc = self.files.get(&file)?;
        let yaml = split_front_matter(&doc.content)?;
        serde_yaml::from_str(yaml).ok()
    }

    fn document_meta(&self, file: FileId) -> Option<&DocumentMeta> {
        self.files.get(&file)?.meta.as_ref()
    }

    fn resolve_link(&self, link_path: &str, source_path: &str) -> Option<FileInfo> {
        let link = Self::normalize(link_path);
        if link.is_empty() {
            return None;
        }

        let source_dir = parse_fs_path(Self::normalize(source_path)).dir;
        let mut candidates = vec![link.to_string(), format!("{}.md", link)];
        if !source_dir.is_empty() {
            candidates.push(format!("{}/{}", source_dir, link));
            candidates.push(format!("{}/{}.md", source_dir, link));
        }

        for candidate in &candidates {
            if let Some(doc) = self.files.values().find(|doc| &doc.info.path == candidate) {
                return Some(doc.info.clone());
            }
        }

        // Fall back to a name match anywhere in the host, the way the
        // host's shortest-path link resolution finds unique basenames.
        self.files
            .values()
            .find(|doc| {
                doc.info.name.eq_ignore_ascii_case(link)
                    || doc.info.basename.eq_ignore_ascii_case(link)
            })
            .map(|doc| doc.info.clone())
    }
}

/// Extract the raw YAML between front matter fences, if present.
fn split_front_matter(content: &str) -> Option<&str> {
    let rest = content.strip_prefix("---")?;
    let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;

    let close = rest
        .find("\n---\n")
        .or_else(|| rest.find("\n---\r\n"))
        .or_else(|| rest.ends_with("\n---").then(|| rest.len() - 4))?;
    Some(&rest[..close])
}
