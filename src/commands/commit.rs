//! `commit -m <msg>`: synthesize trees, write a commit object, advance the
//! branch (or `HEAD` directly in detached mode — spec.md §9 flags the
//! original's `HEAD` write here as a bug; this writes the commit hash).
//! Grounded on `original_source/lib/commit.py` (`commit_create`) and
//! `examples/gausk-git-rs/src/commit.rs` for the author-line timestamp
//! format.

use anyhow::Result;
use chrono::Local;

use crate::commands::index_path;
use crate::config::UserConfig;
use crate::error::TeaError;
use crate::index::Index;
use crate::kvlm::Kvlm;
use crate::object::{self, Object};
use crate::refs;
use crate::repo::Repository;
use crate::treesynth::tree_from_index;

pub fn run(repo: &Repository, message: &str) -> Result<()> {
    let index = Index::read(&index_path(repo))?;
    let tree_sha = tree_from_index(repo, &index)?;
    let parent = refs::resolve(repo, "HEAD")?;

    let identity = UserConfig::lookup().ok_or(TeaError::MissingIdentity)?;
    let stamp = author_line(&identity);

    let mut kvlm = Kvlm::new();
    kvlm.insert(&b"tree"[..], tree_sha);
    if let Some(parent_sha) = parent {
        kvlm.insert(&b"parent"[..], parent_sha);
    }
    kvlm.insert(&b"author"[..], stamp.clone());
    kvlm.insert(&b"committer"[..], stamp);
    kvlm.message = message.as_bytes().to_vec();

    let commit_sha = object::write(Some(repo), &Object::Commit(kvlm))?;

    match refs::active_branch(repo)? {
        Some(branch) => refs::write_direct(repo, &format!("refs/heads/{branch}"), &commit_sha)?,
        None => refs::write_direct(repo, "HEAD", &commit_sha)?,
    }

    println!("{commit_sha}");
    Ok(())
}

fn author_line(identity: &str) -> String {
    let now = Local::now();
    let offset = now.offset().local_minus_utc();
    let hours = offset / 3600;
    let minutes = offset.abs() % 3600 / 60;
    format!("{identity} {} {:+03}{:02}", now.timestamp(), hours, minutes)
}
