//! `status`: branch line, HEAD-vs-index diff, index-vs-worktree diff,
//! untracked files. Grounded on `original_source/lib/staging.py`
//! (`cmd_status_head_index`, `cmd_status_index_worktree`, `tree_to_dict`)
//! and `wrapper.py` (`cmd_status_branch`).

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Cursor;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use anyhow::{anyhow, Result};

use crate::commands::index_path;
use crate::ignore::IgnoreRules;
use crate::index::Index;
use crate::object::{self, ObjectKind};
use crate::refs;
use crate::repo::Repository;

pub fn run(repo: &Repository) -> Result<()> {
    print_branch_line(repo)?;
    let index = Index::read(&index_path(repo))?;
    print_head_index_diff(repo, &index)?;
    print_index_worktree_diff(repo, &index)?;
    Ok(())
}

fn print_branch_line(repo: &Repository) -> Result<()> {
    match refs::active_branch(repo)? {
        Some(branch) => println!("On branch {branch}"),
        None => {
            let sha = refs::resolve(repo, "HEAD")?.unwrap_or_else(|| "(no commits yet)".into());
            println!("HEAD detached at {sha}");
        }
    }
    Ok(())
}

/// Flatten a tree into `path -> blob-sha`, skipping subtree entries
/// themselves and recursing into them.
fn flatten_tree(repo: &Repository, sha: &str, prefix: &str) -> Result<HashMap<String, String>> {
    let mut out = HashMap::new();
    let obj = object::read(repo, sha)?.ok_or_else(|| anyhow!("missing tree object {sha}"))?;
    let tree = obj.as_tree().ok_or_else(|| anyhow!("{sha} is not a tree"))?;
    for leaf in &tree.leaves {
        let full = if prefix.is_empty() {
            leaf.path.clone()
        } else {
            format!("{prefix}/{}", leaf.path)
        };
        if leaf.mode.trim_start().starts_with("04") {
            out.extend(flatten_tree(repo, &leaf.sha, &full)?);
        } else {
            out.insert(full, leaf.sha.clone());
        }
    }
    Ok(out)
}

fn print_head_index_diff(repo: &Repository, index: &Index) -> Result<()> {
    println!("\nChanges to be committed:");

    let head_files = match refs::resolve(repo, "HEAD")? {
        Some(commit_sha) => {
            let obj = object::read(repo, &commit_sha)?
                .ok_or_else(|| anyhow!("missing commit object {commit_sha}"))?;
            let commit = obj.as_commit().ok_or_else(|| anyhow!("HEAD is not a commit"))?;
            let tree_sha = commit
                .get_single(b"tree")
                .map(|v| String::from_utf8_lossy(v).into_owned())
                .ok_or_else(|| anyhow!("commit missing tree"))?;
            flatten_tree(repo, &tree_sha, "")?
        }
        None => HashMap::new(),
    };

    let index_files: HashMap<&str, &str> =
        index.entries.iter().map(|e| (e.name.as_str(), e.sha.as_str())).collect();

    for (name, sha) in &index_files {
        match head_files.get(*name) {
            None => println!("  added:    {name}"),
            Some(head_sha) if head_sha != sha => println!("  modified: {name}"),
            _ => {}
        }
    }
    for name in head_files.keys() {
        if !index_files.contains_key(name.as_str()) {
            println!("  deleted:  {name}");
        }
    }
    Ok(())
}

fn print_index_worktree_diff(repo: &Repository, index: &Index) -> Result<()> {
    println!("\nChanges not staged for commit:");
    for entry in &index.entries {
        let path = repo.worktree.join(&entry.name);
        if !path.is_file() {
            println!("  deleted:  {}", entry.name);
            continue;
        }
        let meta = fs::metadata(&path)?;
        let unchanged = meta.ctime() as u32 == entry.ctime.0
            && meta.ctime_nsec() as u32 == entry.ctime.1
            && meta.mtime() as u32 == entry.mtime.0
            && meta.mtime_nsec() as u32 == entry.mtime.1
            && meta.size() as u32 == entry.fsize;
        if unchanged {
            continue;
        }
        let data = fs::read(&path)?;
        let sha = object::hash_stream(Cursor::new(data), ObjectKind::Blob, None)?;
        if sha != entry.sha {
            println!("  modified: {}", entry.name);
        }
    }

    println!("\nUntracked files:");
    let rules = IgnoreRules::read(repo, index)?;
    let tracked: HashSet<&str> = index.entries.iter().map(|e| e.name.as_str()).collect();
    walk_untracked(repo, &repo.worktree, &tracked, &rules)?;
    Ok(())
}

fn walk_untracked(
    repo: &Repository,
    dir: &Path,
    tracked: &HashSet<&str>,
    rules: &IgnoreRules,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.file_name().map(|n| n == ".tea").unwrap_or(false) {
            continue;
        }
        let rel = path
            .strip_prefix(&repo.worktree)
            .unwrap()
            .to_string_lossy()
            .replace('\\', "/");
        if rules.is_ignored(&rel) {
            continue;
        }
        if path.is_dir() {
            walk_untracked(repo, &path, tracked, rules)?;
        } else if !tracked.contains(rel.as_str()) {
            println!("  {rel}");
        }
    }
    Ok(())
}
