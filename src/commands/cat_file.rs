//! `cat-file <kind> <obj>`: write the raw serialized object to stdout.

use std::io::{stdout, Write};

use anyhow::{anyhow, Result};

use crate::object::{self, ObjectKind};
use crate::repo::Repository;
use crate::resolve;

pub fn run(repo: &Repository, kind: &str, obj_name: &str) -> Result<()> {
    let target_kind = ObjectKind::parse(kind)?;
    let sha = resolve::resolve(repo, obj_name, Some(target_kind), true)?;
    let obj = object::read(repo, &sha)?.ok_or_else(|| anyhow!("missing object {sha}"))?;
    let payload = obj.serialize_payload()?;
    stdout().write_all(&payload)?;
    Ok(())
}
