//! `rm <path>+`: unstage and delete. Grounded on
//! `original_source/lib/commit.py` (`rm`).

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::commands::{index_path, relative_to_worktree};
use crate::error::TeaError;
use crate::index::Index;
use crate::repo::Repository;

pub fn run(repo: &Repository, paths: &[PathBuf]) -> Result<()> {
    let mut index = Index::read(&index_path(repo))?;

    let mut names = Vec::with_capacity(paths.len());
    for path in paths {
        names.push((path.clone(), relative_to_worktree(repo, path)?));
    }

    let missing: Vec<PathBuf> = names
        .iter()
        .filter(|(_, name)| !index.entries.iter().any(|e| &e.name == name))
        .map(|(path, _)| path.clone())
        .collect();
    if !missing.is_empty() {
        return Err(TeaError::PathNotInIndex(missing).into());
    }

    let doomed: HashSet<&str> = names.iter().map(|(_, name)| name.as_str()).collect();
    index.entries.retain(|e| !doomed.contains(e.name.as_str()));
    index.write(&index_path(repo))?;

    for (path, _) in &names {
        if path.is_file() {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}
