//! Dot-delimited note paths and filesystem path parsing.

/// A filesystem path split into its components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    /// Parent directory, empty when the path has no directory component.
    pub dir: String,
    /// File name with extension.
    pub name: String,
    /// File name without extension.
    pub basename: String,
    /// Extension, empty when the name has no dot.
    pub extension: String,
}

/// Split a note basename into its ordered path segments.
///
/// A name without dots yields a single-element list.
pub fn split_name_path(basename: &str) -> Vec<&str> {
    basename.split('.').collect()
}

/// Whether the segment list addresses the tree root directly.
pub fn is_root_path(path: &[&str]) -> bool {
    path.len() == 1 && path[0] == "root"
}

/// Split a filesystem path on the last separator and the last dot.
pub fn parse_fs_path(path: &str) -> ParsedPath {
    let (dir, name) = match path.rfind(['/', '\\']) {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    };

    let (basename, extension) = match name.rfind('.') {
        Some(idx) => (&name[..idx], &name[idx + 1..]),
        None => (name, ""),
    };

    ParsedPath {
        dir: dir.to_string(),
        name: name.to_string(),
        basename: basename.to_string(),
        extension: extension.to_string(),
    }
}
