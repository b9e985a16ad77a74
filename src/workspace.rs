//! Multi-vault workspace: vault lifecycle, host event routing, and
//! cross-vault reference resolution.

use crate::error::Error;
use crate::host::{DocumentStore, FileInfo, FolderId, MetadataCache};
use crate::path::parse_fs_path;
use crate::reference::{parse_link_text, parse_ref_subpath, MaybeNoteRef, RefTarget};
use crate::vault::{Vault, VaultConfig};

/// URI scheme for vault-qualified references.
pub const REF_SCHEME: &str = "dendron://";

/// The set of configured vaults, resolved against one host.
#[derive(Debug, Default)]
pub struct Workspace {
    vaults: Vec<Vault>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vaults(&self) -> &[Vault] {
        &self.vaults
    }

    /// Replace the vault list, reusing already-initialized vaults whose
    /// config is unchanged, and initialize every vault.
    ///
    /// Vaults whose folder is missing stay in the workspace uninitialized;
    /// their configs and errors are returned so the caller can surface
    /// them.
    pub fn change_vaults(
        &mut self,
        configs: &[VaultConfig],
        store: &dyn DocumentStore,
        cache: &dyn MetadataCache,
    ) -> Vec<(VaultConfig, Error)> {
        let mut old: Vec<Option<Vault>> =
            std::mem::take(&mut self.vaults).into_iter().map(Some).collect();

        let mut vaults = Vec::with_capacity(configs.len());
        for config in configs {
            let reused = old.iter_mut().find_map(|slot| {
                if slot.as_ref().is_some_and(|vault| vault.config() == config) {
                    slot.take()
                } else {
                    None
                }
            });
            vaults.push(reused.unwrap_or_else(|| Vault::new(config.clone())));
        }

        let mut failures = Vec::new();
        for vault in &mut vaults {
            if let Err(err) = vault.init(store, cache) {
                log::warn!("vault {} failed to initialize: {}", vault.name(), err);
                failures.push((vault.config().clone(), err));
            }
        }

        self.vaults = vaults;
        failures
    }

    /// Vault backed by the given host folder. Folder identity, not path
    /// equality.
    pub fn find_vault_by_folder(&self, folder: FolderId) -> Option<&Vault> {
        self.vaults.iter().find(|vault| vault.folder() == Some(folder))
    }

    fn find_vault_by_folder_mut(&mut self, folder: FolderId) -> Option<&mut Vault> {
        self.vaults
            .iter_mut()
            .find(|vault| vault.folder() == Some(folder))
    }

    /// Vault backed by the folder at `path`, if both exist.
    pub fn find_vault_by_folder_path(
        &self,
        path: &str,
        store: &dyn DocumentStore,
    ) -> Option<&Vault> {
        store
            .folder_at(path)
            .and_then(|folder| self.find_vault_by_folder(folder))
    }

    /// Exact, case-sensitive name lookup.
    pub fn find_vault_by_name(&self, name: &str) -> Option<&Vault> {
        self.vaults.iter().find(|vault| vault.name() == name)
    }

    /// Route a host file-creation event to the owning vault. Returns
    /// whether any tree changed.
    pub fn on_file_created(&mut self, file: &FileInfo, cache: &dyn MetadataCache) -> bool {
        let Some(parent) = file.parent else {
            return false;
        };
        match self.find_vault_by_folder_mut(parent) {
            Some(vault) => vault.on_file_created(file, cache),
            None => false,
        }
    }

    /// Route a host metadata-change event to the owning vault.
    pub fn on_metadata_changed(&mut self, file: &FileInfo, cache: &dyn MetadataCache) -> bool {
        let Some(parent) = file.parent else {
            return false;
        };
        match self.find_vault_by_folder_mut(parent) {
            Some(vault) => vault.on_metadata_changed(file, cache),
            None => false,
        }
    }

    /// Route a host deletion event. The file is already gone, so the
    /// owning vault is found through the deleted path's parent folder.
    pub fn on_file_deleted(&mut self, path: &str, store: &dyn DocumentStore) -> bool {
        let parsed = parse_fs_path(path);
        let Some(folder) = store.folder_at(&parsed.dir) else {
            return false;
        };
        match self.find_vault_by_folder_mut(folder) {
            Some(vault) => vault.on_file_deleted(&parsed),
            None => false,
        }
    }

    /// Route a rename: the note leaves the vault owning the old path, then
    /// joins the vault owning the new one. Either side may be outside any
    /// vault.
    pub fn on_file_renamed(
        &mut self,
        old_path: &str,
        file: &FileInfo,
        store: &dyn DocumentStore,
        cache: &dyn MetadataCache,
    ) -> bool {
        let parsed = parse_fs_path(old_path);
        let mut updated = false;

        if let Some(folder) = store.folder_at(&parsed.dir) {
            if let Some(vault) = self.find_vault_by_folder_mut(folder) {
                updated = vault.on_file_deleted(&parsed);
            }
        }

        if let Some(parent) = file.parent {
            if let Some(vault) = self.find_vault_by_folder_mut(parent) {
                updated = vault.on_file_created(file, cache) || updated;
            }
        }

        updated
    }

    /// Resolve a link text from a source document to its target.
    ///
    /// Vault-qualified links (`dendron://vault/path#anchor`) always yield a
    /// maybe-note, preserving the written vault name and path even when
    /// neither exists. Plain links resolve only from inside a configured
    /// vault; within one, the host's own link resolution runs first, and a
    /// resolved non-markdown document is a [`RefTarget::File`]. Anything
    /// else becomes a maybe-note in the source document's vault.
    pub fn resolve_ref<'a>(
        &'a self,
        source_path: &str,
        link_text: &str,
        store: &dyn DocumentStore,
        cache: &dyn MetadataCache,
    ) -> Option<RefTarget<'a>> {
        if let Some(rest) = link_text.strip_prefix(REF_SCHEME) {
            let (vault_name, rest) = rest.split_once('/').unwrap_or((rest, ""));
            let (path, subpath) = parse_link_text(rest);
            let vault = self.find_vault_by_name(vault_name);
            let note = vault.and_then(|vault| vault.tree().get_by_path(path));
            return Some(RefTarget::MaybeNote(MaybeNoteRef {
                vault_name: vault_name.to_string(),
                vault,
                note,
                path: path.to_string(),
                subpath: parse_ref_subpath(subpath),
            }));
        }

        // relative form only works from inside a configured vault
        let source_dir = parse_fs_path(source_path).dir;
        let folder = store.folder_at(&source_dir)?;
        let vault = self.find_vault_by_folder(folder)?;

        let (link_path, subpath) = parse_link_text(link_text);

        // the host may resolve through case differences or aliasing
        let path = match cache.resolve_link(link_path, source_path) {
            Some(file) if !Vault::is_note(&file.extension) => {
                return Some(RefTarget::File(file));
            }
            Some(file) => file.basename,
            None => link_path.to_string(),
        };

        let note = vault.tree().get_by_path(&path);
        Some(RefTarget::MaybeNote(MaybeNoteRef {
            vault_name: vault.name().to_string(),
            vault: Some(vault),
            note,
            path,
            subpath: parse_ref_subpath(subpath),
        }))
    }
}
