//! `show-ref`: print every ref, resolved to its hash.

use anyhow::Result;

use crate::refs::{self, RefTree};
use crate::repo::Repository;

pub fn run(repo: &Repository) -> Result<()> {
    let tree = refs::list(repo)?;
    print_tree(&tree, "refs");
    Ok(())
}

pub(crate) fn print_tree(tree: &RefTree, prefix: &str) {
    for (name, sha) in &tree.leaves {
        println!("{sha} {prefix}/{name}");
    }
    for (name, child) in &tree.children {
        print_tree(child, &format!("{prefix}/{name}"));
    }
}
