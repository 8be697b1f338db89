//! `log [commit]`: print a DOT digraph of ancestry. Grounded on
//! `original_source/lib/wrapper.py` (`log_graphviz`).

use std::collections::HashSet;

use anyhow::{anyhow, Result};

use crate::object::{self, ObjectKind};
use crate::repo::Repository;
use crate::resolve;

pub fn run(repo: &Repository, commit: Option<&str>) -> Result<()> {
    let start = resolve::resolve(repo, commit.unwrap_or("HEAD"), Some(ObjectKind::Commit), true)?;

    println!("digraph tealog {{");
    let mut seen = HashSet::new();
    visit(repo, &start, &mut seen)?;
    println!("}}");
    Ok(())
}

fn visit(repo: &Repository, sha: &str, seen: &mut HashSet<String>) -> Result<()> {
    if !seen.insert(sha.to_string()) {
        return Ok(());
    }

    let obj = object::read(repo, sha)?.ok_or_else(|| anyhow!("missing commit object {sha}"))?;
    let commit = obj.as_commit().ok_or_else(|| anyhow!("{sha} is not a commit"))?;

    let message = String::from_utf8_lossy(&commit.message);
    let first_line = message.lines().next().unwrap_or("").replace('\\', "\\\\").replace('"', "\\\"");
    let short = &sha[..sha.len().min(7)];
    println!("  c_{sha} [label=\"{short}: {first_line}\"]");

    for parent in commit.get_all(b"parent") {
        let parent = String::from_utf8_lossy(parent).into_owned();
        println!("  c_{sha} -> c_{parent}");
        visit(repo, &parent, seen)?;
    }
    Ok(())
}
