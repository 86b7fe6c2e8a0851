use std::path::PathBuf;

use crate::git::objects::ObjectKind;

pub type Result<T> = std::result::Result<T, GitError>;

/// Errors surfaced by the object database and reference layer.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("not a git repository (or any of the parent directories): {0}")]
    NotARepo(PathBuf),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("{0} is not empty")]
    NotEmpty(PathBuf),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("unknown object kind: {0}")]
    UnknownKind(String),

    #[error("malformed object: {0}")]
    MalformedObject(String),

    #[error("object {sha} is a {actual}, not a {expected}")]
    KindMismatch {
        sha: String,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    #[error("symbolic ref chain too deep: {0}")]
    RefCycle(String),

    #[error("invalid repository configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
