//! `checkout <commit> <empty-dir>`: materialize a tree into a directory.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Result};

use crate::checkout::checkout_tree;
use crate::object::{self, ObjectKind};
use crate::repo::Repository;
use crate::resolve;

pub fn run(repo: &Repository, commit: &str, dest: &Path) -> Result<()> {
    if dest.exists() {
        if !dest.is_dir() {
            bail!("{} is not a directory", dest.display());
        }
        if fs::read_dir(dest)?.next().is_some() {
            bail!("{} is not empty", dest.display());
        }
    } else {
        fs::create_dir_all(dest)?;
    }

    let tree_sha = resolve::resolve(repo, commit, Some(ObjectKind::Tree), true)?;
    let obj = object::read(repo, &tree_sha)?.ok_or_else(|| anyhow!("missing tree object {tree_sha}"))?;
    let tree = obj.as_tree().ok_or_else(|| anyhow!("{tree_sha} is not a tree"))?;

    checkout_tree(repo, tree, dest)?;
    Ok(())
}
