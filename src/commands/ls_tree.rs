//! `ls-tree [-r] <tree-ish>`: list tree leaves.

use anyhow::{anyhow, Result};

use crate::object::{self, ObjectKind};
use crate::repo::Repository;
use crate::resolve;

pub fn run(repo: &Repository, recursive: bool, tree_ish: &str) -> Result<()> {
    let sha = resolve::resolve(repo, tree_ish, Some(ObjectKind::Tree), true)?;
    visit(repo, &sha, recursive, "")
}

fn visit(repo: &Repository, sha: &str, recursive: bool, prefix: &str) -> Result<()> {
    let obj = object::read(repo, sha)?.ok_or_else(|| anyhow!("missing tree object {sha}"))?;
    let tree = obj.as_tree().ok_or_else(|| anyhow!("{sha} is not a tree"))?;

    for leaf in &tree.leaves {
        let full_path = if prefix.is_empty() {
            leaf.path.clone()
        } else {
            format!("{prefix}/{}", leaf.path)
        };
        let is_subtree = leaf.mode.trim_start().starts_with("04");

        if is_subtree && recursive {
            visit(repo, &leaf.sha, recursive, &full_path)?;
        } else {
            println!(
                "{} {} {}\t{full_path}",
                leaf.mode.trim_start(),
                kind_label(&leaf.mode),
                leaf.sha
            );
        }
    }
    Ok(())
}

fn kind_label(mode: &str) -> &'static str {
    match &mode.trim_start()[..2] {
        "04" => "tree",
        "16" => "commit",
        _ => "blob",
    }
}
