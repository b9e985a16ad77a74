//! Error types for dendron-tree.

use thiserror::Error;

/// Main error type for tree and vault operations.
///
/// Unresolved references are deliberately *not* errors: a link to a note
/// that does not exist yet is a normal steady-state outcome and is modeled
/// as data (see [`crate::reference::MaybeNoteRef`]).
#[derive(Error, Debug)]
pub enum Error {
    /// A note was appended to a parent while already attached elsewhere.
    /// This is a caller bug in tree construction, not a data problem.
    #[error("note already has a parent")]
    HasParent,

    /// The configured vault folder is missing or not a folder.
    #[error("invalid vault root: {0}")]
    InvalidRoot(String),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("document already exists: {0}")]
    DocumentAlreadyExists(String),

    #[error("folder already exists: {0}")]
    FolderAlreadyExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for dendron-tree operations.
pub type Result<T> = std::result::Result<T, Error>;
