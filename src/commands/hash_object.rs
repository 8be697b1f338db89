//! `hash-object [-t kind] [-w] <path>`: compute and optionally store hash.

use std::fs::File;
use std::path::Path;

use anyhow::Result;

use crate::object::{self, ObjectKind};
use crate::repo::Repository;

pub fn run(repo: Option<&Repository>, kind: &str, write: bool, path: &Path) -> Result<()> {
    let target_kind = ObjectKind::parse(kind)?;
    let file = File::open(path)?;
    let repo = if write { repo } else { None };
    let sha = object::hash_stream(file, target_kind, repo)?;
    println!("{sha}");
    Ok(())
}
