use std::path::PathBuf;

use thiserror::Error;

/// Typed failure modes for tea's core components.
///
/// Command modules wrap these in `anyhow::Result` at the CLI boundary;
/// library code returns `Result<T, TeaError>` directly.
#[derive(Debug, Error)]
pub enum TeaError {
    #[error("not a tea repository (or any parent up to mount point): {0}")]
    NotARepository(PathBuf),

    #[error("malformed object {0}: {1}")]
    MalformedObject(String, &'static str),

    #[error("malformed index: {0}")]
    MalformedIndex(&'static str),

    #[error("ambiguous reference {name}: candidates are:\n{candidates}")]
    AmbiguousReference { name: String, candidates: String },

    #[error("no such reference {0}")]
    NoSuchReference(String),

    #[error("not a file, or outside the worktree: {0}")]
    NotAFile(PathBuf),

    #[error("path outside worktree: {0}")]
    OutsideWorktree(PathBuf),

    #[error("cannot remove paths not in the index: {0:?}")]
    PathNotInIndex(Vec<PathBuf>),

    #[error("unsupported tree leaf mode: {0}")]
    UnsupportedMode(String),

    #[error("unsupported repositoryformatversion {0}")]
    UnsupportedRepoVersion(i64),

    #[error("no user identity configured (set user.name and user.email)")]
    MissingIdentity,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
