//! One thin module per CLI subcommand. Business logic lives in the
//! component modules (`object`, `index`, `treesynth`, `refs`, `resolve`,
//! `checkout`, `ignore`); these just wire a parsed command to them and
//! format output.

pub mod add;
pub mod cat_file;
pub mod check_ignore;
pub mod checkout;
pub mod commit;
pub mod hash_object;
pub mod init;
pub mod log;
pub mod ls_files;
pub mod ls_tree;
pub mod rev_parse;
pub mod rm;
pub mod show_ref;
pub mod status;
pub mod tag;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::TeaError;
use crate::repo::Repository;

pub(crate) fn index_path(repo: &Repository) -> PathBuf {
    repo.teadir.join("index")
}

/// Express `path` relative to `repo`'s worktree, using `/` separators.
pub(crate) fn relative_to_worktree(repo: &Repository, path: &Path) -> Result<String> {
    let abs = std::fs::canonicalize(path)
        .with_context(|| format!("cannot resolve {}", path.display()))?;
    let worktree = std::fs::canonicalize(&repo.worktree)?;
    let rel = abs
        .strip_prefix(&worktree)
        .map_err(|_| TeaError::OutsideWorktree(abs.clone()))?;
    Ok(rel.to_string_lossy().replace('\\', "/"))
}
