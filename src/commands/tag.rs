//! `tag [-a] [name] [object]`: list or create a tag. Grounded on spec.md
//! §4.5 directly (`refs_tags_branch.py` was filtered out of the retrieved
//! original source).

use anyhow::{anyhow, Result};

use crate::commands::show_ref::print_tree;
use crate::refs::{self, TagKind};
use crate::repo::Repository;
use crate::resolve;

pub fn run(repo: &Repository, annotate: bool, name: Option<String>, object: Option<String>) -> Result<()> {
    let Some(name) = name else {
        let tree = refs::list(repo)?;
        if let Some(tags) = tree.children.get("tags") {
            print_tree(tags, "refs/tags");
        }
        return Ok(());
    };

    let target_name = object.as_deref().unwrap_or("HEAD");
    let target_sha = resolve::resolve(repo, target_name, None, false)?;
    let obj = crate::object::read(repo, &target_sha)?
        .ok_or_else(|| anyhow!("missing object {target_sha}"))?;
    let kind = obj.kind();

    let tag_kind = if annotate { TagKind::Object } else { TagKind::Ref };
    refs::tag_create(repo, &name, &target_sha, kind, tag_kind)?;
    Ok(())
}
