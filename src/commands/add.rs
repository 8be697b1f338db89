//! `add <path>+`: stage files. Grounded on `original_source/lib/commit.py`
//! (`add`), generalized to real filesystem metadata via `MetadataExt`
//! (the teacher's `write_tree.rs` reads `Metadata` the same way for mode
//! bits).

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;

use anyhow::Result;

use crate::commands::{index_path, relative_to_worktree};
use crate::error::TeaError;
use crate::index::{Index, IndexEntry};
use crate::object::{self, Object};
use crate::repo::Repository;

pub fn run(repo: &Repository, paths: &[PathBuf]) -> Result<()> {
    let mut index = Index::read(&index_path(repo))?;

    for path in paths {
        if !path.is_file() {
            return Err(TeaError::NotAFile(path.clone()).into());
        }
        let name = relative_to_worktree(repo, path)?;
        let data = fs::read(path)?;
        let sha = object::write(Some(repo), &Object::Blob(data))?;
        let meta = fs::metadata(path)?;

        let entry = IndexEntry {
            ctime: (meta.ctime() as u32, meta.ctime_nsec() as u32),
            mtime: (meta.mtime() as u32, meta.mtime_nsec() as u32),
            dev: meta.dev() as u32,
            ino: meta.ino() as u32,
            mode_type: 0b1000,
            mode_perms: 0o644,
            uid: meta.uid(),
            gid: meta.gid(),
            fsize: meta.size() as u32,
            sha,
            flag_assume_valid: false,
            flag_stage: 0,
            name,
        };

        index.entries.retain(|e| e.name != entry.name);
        index.entries.push(entry);
    }

    index.entries.sort_by(|a, b| a.name.cmp(&b.name));
    index.write(&index_path(repo))?;
    Ok(())
}
