use std::path::Path;

use anyhow::Result;

use crate::repo::Repository;

pub fn run(path: &Path) -> Result<()> {
    Repository::create(path)?;
    println!("Initialized empty tea repository in {}", path.display());
    Ok(())
}
