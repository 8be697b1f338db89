//! `rev-parse [--tea-type kind] <name>`: thin wrapper over name resolution.

use anyhow::Result;

use crate::object::ObjectKind;
use crate::repo::Repository;
use crate::resolve;

pub fn run(repo: &Repository, tea_type: Option<&str>, name: &str) -> Result<()> {
    let target_kind = tea_type.map(ObjectKind::parse).transpose()?;
    let sha = resolve::resolve(repo, name, target_kind, true)?;
    println!("{sha}");
    Ok(())
}
