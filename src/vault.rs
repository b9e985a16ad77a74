//! A vault: one host folder whose markdown documents form a note tree.

use crate::error::{Error, Result};
use crate::host::{DocumentStore, FileInfo, FileStat, FolderId, MetadataCache};
use crate::note::{generate_note_title, is_use_title_case, NoteMetadata, NoteTree};
use crate::path::ParsedPath;
use serde::{Deserialize, Serialize};

const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

fn gen_note_id() -> String {
    nanoid::nanoid!(23, &ID_ALPHABET)
}

/// User-facing vault definition: a display name and a host folder path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    pub name: String,
    pub path: String,
}

/// A configured vault and its note tree.
#[derive(Debug)]
pub struct Vault {
    config: VaultConfig,
    tree: NoteTree,
    folder: Option<FolderId>,
    initialized: bool,
}

impl Vault {
    pub fn new(config: VaultConfig) -> Self {
        Self {
            config,
            tree: NoteTree::new(),
            folder: None,
            initialized: false,
        }
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn path(&self) -> &str {
        &self.config.path
    }

    pub fn tree(&self) -> &NoteTree {
        &self.tree
    }

    /// Host folder backing this vault, known once [`Vault::init`] succeeds.
    pub fn folder(&self) -> Option<FolderId> {
        self.folder
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Notes are markdown documents; everything else passes through the
    /// vault untouched.
    pub fn is_note(extension: &str) -> bool {
        extension == "md"
    }

    /// Build the note tree from the vault folder's direct children.
    ///
    /// Idempotent; a second call on an initialized vault is a no-op. Fails
    /// with [`Error::InvalidRoot`] when the configured folder does not
    /// exist in the host.
    pub fn init(&mut self, store: &dyn DocumentStore, cache: &dyn MetadataCache) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        let folder = store
            .folder_at(&self.config.path)
            .ok_or_else(|| Error::InvalidRoot(self.config.path.clone()))?;

        let mut tree = NoteTree::new();
        let mut count = 0;
        for file in store.children_of(folder) {
            if !Self::is_note(&file.extension) {
                continue;
            }
            let metadata = Self::resolve_metadata(&file, cache);
            tree.add_file(&file.basename, file.id, metadata.as_ref(), false);
            count += 1;
        }
        tree.sort();

        self.tree = tree;
        self.folder = Some(folder);
        self.initialized = true;
        log::debug!("vault {} initialized with {} notes", self.config.name, count);
        Ok(())
    }

    fn resolve_metadata(file: &FileInfo, cache: &dyn MetadataCache) -> Option<NoteMetadata> {
        let front_matter = cache.front_matter(file.id)?;
        let title = front_matter
            .get("title")
            .and_then(|value| value.as_str())
            .map(str::to_string);
        Some(NoteMetadata { title })
    }

    /// Returns whether the tree changed.
    pub fn on_file_created(&mut self, file: &FileInfo, cache: &dyn MetadataCache) -> bool {
        if !Self::is_note(&file.extension) {
            return false;
        }
        let metadata = Self::resolve_metadata(file, cache);
        self.tree
            .add_file(&file.basename, file.id, metadata.as_ref(), true);
        true
    }

    /// Returns whether the tree changed.
    pub fn on_metadata_changed(&mut self, file: &FileInfo, cache: &dyn MetadataCache) -> bool {
        if !Self::is_note(&file.extension) {
            return false;
        }
        let metadata = Self::resolve_metadata(file, cache);
        self.tree
            .update_metadata(&file.basename, metadata.as_ref())
            .is_some()
    }

    /// Returns whether the tree changed. Takes the parsed path rather than
    /// a [`FileInfo`] since the host no longer has the file at this point.
    pub fn on_file_deleted(&mut self, path: &ParsedPath) -> bool {
        if !Self::is_note(&path.extension) {
            return false;
        }
        if let Some(survivor) = self.tree.delete_by_path(&path.basename) {
            // the note remains as a structural placeholder for its children
            self.tree.sync_metadata(survivor, None);
        }
        true
    }

    /// Create the vault's backing folder in the host.
    pub fn create_root_folder(&self, store: &mut dyn DocumentStore) -> Result<FolderId> {
        store.create_folder(&self.config.path)
    }

    /// Host path of a note document with the given base name.
    pub fn note_path(&self, base_name: &str) -> String {
        let root = self.config.path.trim_matches('/');
        if root.is_empty() {
            format!("{base_name}.md")
        } else {
            format!("{root}/{base_name}.md")
        }
    }

    /// Create a new note document in the vault, optionally seeding its
    /// front matter.
    pub fn create_note(
        &self,
        base_name: &str,
        store: &mut dyn DocumentStore,
        with_front_matter: bool,
    ) -> Result<FileInfo> {
        let content = if with_front_matter {
            let mut fields = serde_yaml::Mapping::new();
            push_default_fields(&mut fields, base_name, None);
            render_front_matter(&fields)?
        } else {
            String::new()
        };
        store.create_document(&self.note_path(base_name), &content)
    }
}

fn yaml_key(key: &str) -> serde_yaml::Value {
    serde_yaml::Value::String(key.to_string())
}

fn push_default_fields(
    fields: &mut serde_yaml::Mapping,
    base_name: &str,
    stat: Option<&FileStat>,
) {
    fields.insert(yaml_key("id"), serde_yaml::Value::String(gen_note_id()));

    let last_segment = base_name.rsplit('.').next().unwrap_or(base_name);
    let title = generate_note_title(last_segment, is_use_title_case(base_name));
    fields.insert(yaml_key("title"), serde_yaml::Value::String(title));
    fields.insert(yaml_key("desc"), serde_yaml::Value::String(String::new()));

    if let Some(stat) = stat {
        fields.insert(yaml_key("created"), serde_yaml::Value::from(stat.ctime));
        fields.insert(yaml_key("updated"), serde_yaml::Value::from(stat.mtime));
    }
}

fn render_front_matter(fields: &serde_yaml::Mapping) -> Result<String> {
    let yaml = serde_yaml::to_string(fields)?;
    Ok(format!("---\n{yaml}---\n"))
}

/// Compute the front matter fields a note is missing.
///
/// Returns the full set of pairs to insert, or `None` when the existing
/// front matter already carries every expected key. The caller owns
/// writing them back into the document.
pub fn generate_front_matter(
    file: &FileInfo,
    existing: Option<&serde_yaml::Mapping>,
) -> Option<serde_yaml::Mapping> {
    let mut defaults = serde_yaml::Mapping::new();
    push_default_fields(&mut defaults, &file.basename, Some(&file.stat));

    let mut additions = serde_yaml::Mapping::new();
    for (key, value) in defaults {
        let present = existing.is_some_and(|fm| fm.get(&key).is_some());
        if !present {
            additions.insert(key, value);
        }
    }

    if additions.is_empty() {
        None
    } else {
        Some(additions)
    }
}

/// Render front matter fields as a fenced block.
pub fn front_matter_block(fields: &serde_yaml::Mapping) -> Result<String> {
    render_front_matter(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FileId, MemoryHost};
    use pretty_assertions::assert_eq;

    fn vault(name: &str, path: &str) -> Vault {
        Vault::new(VaultConfig {
            name: name.to_string(),
            path: path.to_string(),
        })
    }

    fn titles(vault: &Vault) -> Vec<String> {
        vault
            .tree()
            .flatten()
            .map(|id| vault.tree().get(id).unwrap().title().to_string())
            .collect()
    }

    #[test]
    fn init_builds_sorted_tree() {
        let mut host = MemoryHost::new();
        host.add_document("notes/zebra.md", "");
        host.add_document("notes/apple.md", "");
        host.add_document("notes/apple.pie.md", "");
        host.add_document("notes/image.png", "");
        host.add_document("elsewhere/other.md", "");

        let mut vault = vault("notes", "notes");
        vault.init(&host, &host).unwrap();

        assert!(vault.is_initialized());
        assert_eq!(vault.folder(), host.folder_at("notes"));
        assert_eq!(titles(&vault), vec!["Root", "Apple", "Pie", "Zebra"]);
    }

    #[test]
    fn init_missing_folder_is_invalid_root() {
        let host = MemoryHost::new();
        let mut vault = vault("notes", "notes");
        let err = vault.init(&host, &host).unwrap_err();
        assert!(matches!(err, Error::InvalidRoot(path) if path == "notes"));
        assert!(!vault.is_initialized());
    }

    #[test]
    fn init_is_idempotent() {
        let mut host = MemoryHost::new();
        host.add_document("notes/a.md", "");
        let mut vault = vault("notes", "notes");
        vault.init(&host, &host).unwrap();

        host.add_document("notes/b.md", "");
        vault.init(&host, &host).unwrap();
        assert_eq!(titles(&vault), vec!["Root", "A"]);
    }

    #[test]
    fn init_reads_titles_from_front_matter() {
        let mut host = MemoryHost::new();
        host.add_document("notes/abc.md", "---\ntitle: Custom\n---\n");
        let mut vault = vault("notes", "notes");
        vault.init(&host, &host).unwrap();
        assert_eq!(titles(&vault), vec!["Root", "Custom"]);
    }

    #[test]
    fn created_file_lands_sorted() {
        let mut host = MemoryHost::new();
        host.add_folder("notes");
        let mut vault = vault("notes", "notes");
        vault.init(&host, &host).unwrap();

        let zebra = host.add_document("notes/zebra.md", "");
        let apple = host.add_document("notes/apple.md", "");
        assert!(vault.on_file_created(&zebra, &host));
        assert!(vault.on_file_created(&apple, &host));
        assert_eq!(titles(&vault), vec!["Root", "Apple", "Zebra"]);
    }

    #[test]
    fn non_note_files_are_ignored() {
        let mut host = MemoryHost::new();
        host.add_folder("notes");
        let mut vault = vault("notes", "notes");
        vault.init(&host, &host).unwrap();

        let image = host.add_document("notes/image.png", "");
        assert!(!vault.on_file_created(&image, &host));
        assert!(!vault.on_metadata_changed(&image, &host));
        assert!(!vault.on_file_deleted(&crate::path::parse_fs_path("notes/image.png")));
    }

    #[test]
    fn metadata_change_updates_title() {
        let mut host = MemoryHost::new();
        let file = host.add_document("notes/abc.md", "");
        let mut vault = vault("notes", "notes");
        vault.init(&host, &host).unwrap();
        assert_eq!(titles(&vault), vec!["Root", "Abc"]);

        host.remove_document(file.id);
        let file = host.add_document("notes/abc.md", "---\ntitle: Renamed\n---\n");
        assert!(vault.on_metadata_changed(&file, &host));
        assert_eq!(titles(&vault), vec!["Root", "Renamed"]);
    }

    #[test]
    fn delete_prunes_and_resets_survivor_title() {
        let mut host = MemoryHost::new();
        host.add_document("notes/a.md", "---\ntitle: Custom A\n---\n");
        host.add_document("notes/a.b.md", "");
        let mut vault = vault("notes", "notes");
        vault.init(&host, &host).unwrap();

        assert!(vault.on_file_deleted(&crate::path::parse_fs_path("notes/a.md")));
        // "a" survives as a placeholder for "a.b" with a derived title
        assert_eq!(titles(&vault), vec!["Root", "A", "B"]);

        assert!(vault.on_file_deleted(&crate::path::parse_fs_path("notes/a.b.md")));
        assert_eq!(titles(&vault), vec!["Root"]);
    }

    #[test]
    fn create_note_paths() {
        let mut host = MemoryHost::new();
        host.add_folder("notes");

        let nested = vault("notes", "notes");
        let file = nested.create_note("pro.quo", &mut host, false).unwrap();
        assert_eq!(file.path, "notes/pro.quo.md");
        assert_eq!(host.read_document(file.id).unwrap(), "");

        let root = vault("root", "/");
        let file = root.create_note("top", &mut host, false).unwrap();
        assert_eq!(file.path, "top.md");
    }

    #[test]
    fn create_note_with_front_matter() {
        let mut host = MemoryHost::new();
        host.add_folder("notes");
        let vault = vault("notes", "notes");

        let file = vault.create_note("my.new-note", &mut host, true).unwrap();
        let content = host.read_document(file.id).unwrap();
        assert!(content.starts_with("---\n"));

        let fm = host.front_matter(file.id).unwrap();
        assert_eq!(fm.get("title").and_then(|v| v.as_str()), Some("New Note"));
        assert_eq!(fm.get("desc").and_then(|v| v.as_str()), Some(""));
        assert_eq!(
            fm.get("id").and_then(|v| v.as_str()).map(str::len),
            Some(23)
        );
    }

    #[test]
    fn create_root_folder_conflicts_when_present() {
        let mut host = MemoryHost::new();
        let vault = vault("notes", "notes");
        vault.create_root_folder(&mut host).unwrap();
        assert!(host.folder_at("notes").is_some());
        assert!(matches!(
            vault.create_root_folder(&mut host),
            Err(Error::FolderAlreadyExists(_))
        ));
    }

    #[test]
    fn front_matter_additions_skip_existing_keys() {
        let file = FileInfo::new(FileId(1), "notes/abc.md", None);

        let mut existing = serde_yaml::Mapping::new();
        existing.insert(yaml_key("id"), serde_yaml::Value::String("x".into()));
        existing.insert(yaml_key("title"), serde_yaml::Value::String("T".into()));

        let additions = generate_front_matter(&file, Some(&existing)).unwrap();
        assert!(additions.get("id").is_none());
        assert!(additions.get("title").is_none());
        assert!(additions.get("desc").is_some());
        assert!(additions.get("created").is_some());
        assert!(additions.get("updated").is_some());
    }

    #[test]
    fn front_matter_complete_yields_none() {
        let file = FileInfo::new(FileId(1), "notes/abc.md", None);
        let mut existing = serde_yaml::Mapping::new();
        for key in ["id", "title", "desc", "created", "updated"] {
            existing.insert(yaml_key(key), serde_yaml::Value::String("x".into()));
        }
        assert!(generate_front_matter(&file, Some(&existing)).is_none());
    }
}
