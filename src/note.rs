//! Hierarchical note namespace keyed by dot-delimited path segments.
//!
//! Notes live in an index-based arena owned by [`NoteTree`]: parent and
//! children are stored as [`NoteId`] handles rather than pointers, and
//! deleted slots are recycled through a free list. Ownership is strictly
//! tree-shaped (a note has at most one parent).

use crate::error::{Error, Result};
use crate::host::FileId;
use crate::path::{is_root_path, split_name_path};

/// Handle to a note inside one [`NoteTree`].
///
/// Handles are only meaningful for the tree that produced them and may be
/// recycled after the note is pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteId(usize);

/// Front-matter-backed metadata relevant to a note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteMetadata {
    pub title: Option<String>,
}

/// A single node in the hierarchical namespace.
#[derive(Debug)]
pub struct Note {
    original_name: String,
    name: String,
    title: String,
    title_case: bool,
    file: Option<FileId>,
    parent: Option<NoteId>,
    children: Vec<NoteId>,
}

impl Note {
    fn new(original_name: &str, title_case: bool) -> Self {
        let title = generate_note_title(original_name, title_case);
        Self {
            original_name: original_name.to_string(),
            name: original_name.to_lowercase(),
            title,
            title_case,
            file: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Segment name as typed by the user, case preserved.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Lowercased segment name, the unique key among siblings.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display title, derived or overridden by metadata.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Backing document, if one maps exactly to this segment path.
    pub fn file(&self) -> Option<FileId> {
        self.file
    }

    pub fn parent(&self) -> Option<NoteId> {
        self.parent
    }

    pub fn children(&self) -> &[NoteId] {
        &self.children
    }
}

/// Whether titles generated from this basename use title case.
///
/// Decided once per file from the whole basename (all dot segments): true
/// iff the basename contains no uppercase character anywhere.
pub fn is_use_title_case(basename: &str) -> bool {
    basename.to_lowercase() == basename
}

/// Generate a display title for a note segment.
pub fn generate_note_title(original_name: &str, title_case: bool) -> String {
    if !title_case {
        return original_name.to_string();
    }
    original_name
        .split('-')
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug)]
enum Slot {
    Occupied(Note),
    Vacant,
}

/// A forest of notes rooted at a synthetic `"root"` node.
#[derive(Debug)]
pub struct NoteTree {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NoteId,
}

impl NoteTree {
    pub fn new() -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NoteId(0),
        };
        tree.root = tree.create_note("root", true);
        tree
    }

    pub fn root_id(&self) -> NoteId {
        self.root
    }

    /// Look up a note by handle. Returns `None` for recycled handles.
    pub fn get(&self, id: NoteId) -> Option<&Note> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(note)) => Some(note),
            _ => None,
        }
    }

    /// Panics on a stale handle; internal call sites hold valid ids by
    /// construction.
    fn note(&self, id: NoteId) -> &Note {
        match &self.slots[id.0] {
            Slot::Occupied(note) => note,
            Slot::Vacant => panic!("stale NoteId"),
        }
    }

    fn note_mut(&mut self, id: NoteId) -> &mut Note {
        match &mut self.slots[id.0] {
            Slot::Occupied(note) => note,
            Slot::Vacant => panic!("stale NoteId"),
        }
    }

    /// Allocate a detached note in the arena.
    pub fn create_note(&mut self, original_name: &str, title_case: bool) -> NoteId {
        let note = Note::new(original_name, title_case);
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Slot::Occupied(note);
                NoteId(index)
            }
            None => {
                self.slots.push(Slot::Occupied(note));
                NoteId(self.slots.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NoteId) {
        self.slots[id.0] = Slot::Vacant;
        self.free.push(id.0);
    }

    fn attach(&mut self, parent: NoteId, child: NoteId) {
        self.note_mut(child).parent = Some(parent);
        self.note_mut(parent).children.push(child);
    }

    /// Append `child` to `parent`'s children, in insertion order.
    pub fn append_child(&mut self, parent: NoteId, child: NoteId) -> Result<()> {
        if self.note(child).parent.is_some() {
            return Err(Error::HasParent);
        }
        self.attach(parent, child);
        Ok(())
    }

    /// Detach `child` from `parent`. The note stays in the arena.
    pub fn remove_child(&mut self, parent: NoteId, child: NoteId) {
        self.note_mut(child).parent = None;
        self.note_mut(parent).children.retain(|&c| c != child);
    }

    /// Case-insensitive exact match among direct children.
    pub fn find_child(&self, parent: NoteId, name: &str) -> Option<NoteId> {
        let lower = name.to_lowercase();
        self.note(parent)
            .children
            .iter()
            .copied()
            .find(|&child| self.note(child).name == lower)
    }

    /// Stable sort of `id`'s children by title, case-insensitive.
    pub fn sort_children(&mut self, id: NoteId, recursive: bool) {
        let mut children = self.note(id).children.clone();
        children.sort_by_cached_key(|&child| self.note(child).title.to_lowercase());
        if recursive {
            for &child in &children {
                self.sort_children(child, true);
            }
        }
        self.note_mut(id).children = children;
    }

    /// Recursively sort the whole tree by title.
    pub fn sort(&mut self) {
        self.sort_children(self.root, true);
    }

    /// Ancestor chain from the root down to `id`, inclusive.
    pub fn path_notes(&self, id: NoteId) -> Vec<NoteId> {
        let mut notes = vec![id];
        let mut current = id;
        while let Some(parent) = self.note(current).parent {
            notes.push(parent);
            current = parent;
        }
        notes.reverse();
        notes
    }

    /// Dot-joined path of ancestor names. The root contributes nothing
    /// unless it is the only component.
    pub fn get_path(&self, id: NoteId) -> String {
        self.join_path(id, |note| note.name.as_str())
    }

    /// Like [`NoteTree::get_path`] but with case preserved.
    pub fn get_path_original(&self, id: NoteId) -> String {
        self.join_path(id, |note| note.original_name.as_str())
    }

    fn join_path<'a>(&'a self, id: NoteId, key: impl Fn(&'a Note) -> &'a str) -> String {
        let notes = self.path_notes(id);
        if notes.len() == 1 {
            return key(self.note(notes[0])).to_string();
        }
        let components: Vec<&str> = notes
            .iter()
            .map(|&note_id| self.note(note_id))
            .filter(|note| !(note.parent.is_none() && note.name == "root"))
            .map(key)
            .collect();
        components.join(".")
    }

    /// Re-derive the note's title from metadata, falling back to the
    /// generated one. Must run whenever front matter changes.
    pub fn sync_metadata(&mut self, id: NoteId, metadata: Option<&NoteMetadata>) {
        let note = self.note_mut(id);
        note.title = match metadata.and_then(|meta| meta.title.clone()) {
            Some(title) => title,
            None => generate_note_title(&note.original_name, note.title_case),
        };
    }

    /// Insert a file under its dot-path, creating missing intermediate
    /// notes. A basename of exactly `"root"` targets the tree root.
    ///
    /// With `sort` set, every parent that gains a child is re-sorted
    /// immediately; otherwise callers defer to a bulk [`NoteTree::sort`].
    pub fn add_file(
        &mut self,
        basename: &str,
        file: FileId,
        metadata: Option<&NoteMetadata>,
        sort: bool,
    ) -> NoteId {
        let title_case = is_use_title_case(basename);
        let path = split_name_path(basename);
        let mut current = self.root;

        if !is_root_path(&path) {
            for segment in path {
                current = match self.find_child(current, segment) {
                    Some(existing) => existing,
                    None => {
                        let child = self.create_note(segment, title_case);
                        self.attach(current, child);
                        if sort {
                            self.sort_children(current, false);
                        }
                        child
                    }
                };
            }
        }

        self.note_mut(current).file = Some(file);
        self.sync_metadata(current, metadata);
        current
    }

    /// Walk the dot-path; `None` at the first missing segment.
    pub fn get_by_path(&self, basename: &str) -> Option<NoteId> {
        let path = split_name_path(basename);
        if is_root_path(&path) {
            return Some(self.root);
        }
        let mut current = self.root;
        for segment in path {
            current = self.find_child(current, segment)?;
        }
        Some(current)
    }

    /// Clear the note's file and garbage-collect upward: every now-empty,
    /// file-less, non-root ancestor is pruned. Returns the note's handle
    /// if it survived pruning (it still has children), `None` otherwise.
    pub fn delete_by_path(&mut self, basename: &str) -> Option<NoteId> {
        let id = self.get_by_path(basename)?;
        self.note_mut(id).file = None;

        if self.note(id).children.is_empty() {
            let mut current = id;
            loop {
                let note = self.note(current);
                if note.file.is_some() || !note.children.is_empty() {
                    break;
                }
                let Some(parent) = note.parent else {
                    break;
                };
                self.remove_child(parent, current);
                self.release(current);
                current = parent;
            }
        }

        self.get(id).map(|_| id)
    }

    /// Locate a note by path, re-sync its metadata, and re-sort its
    /// siblings (the title may have changed ordering).
    pub fn update_metadata(&mut self, basename: &str, metadata: Option<&NoteMetadata>) -> Option<NoteId> {
        let id = self.get_by_path(basename)?;
        self.sync_metadata(id, metadata);
        if let Some(parent) = self.note(id).parent {
            self.sort_children(parent, false);
        }
        Some(id)
    }

    /// Pre-order traversal, root first. Restartable: re-invoking yields the
    /// same order unless the tree mutated in between.
    pub fn flatten(&self) -> Flatten<'_> {
        Flatten {
            tree: self,
            stack: vec![self.root],
        }
    }
}

impl Default for NoteTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator over a [`NoteTree`].
pub struct Flatten<'a> {
    tree: &'a NoteTree,
    stack: Vec<NoteId>,
}

impl Iterator for Flatten<'_> {
    type Item = NoteId;

    fn next(&mut self) -> Option<NoteId> {
        let id = self.stack.pop()?;
        let children = &self.tree.note(id).children;
        self.stack.extend(children.iter().rev());
        Some(id)
    }
}
