//! `ls-files [--verbose]`: list index entries. The verbose type map
//! includes `0b1010` (symlink) — spec.md §9 flags the original's omission
//! of this arm as a bug to fix, not preserve.

use anyhow::{bail, Result};

use crate::commands::index_path;
use crate::index::Index;
use crate::repo::Repository;

pub fn run(repo: &Repository, verbose: bool) -> Result<()> {
    let index = Index::read(&index_path(repo))?;

    for entry in &index.entries {
        if !verbose {
            println!("{}", entry.name);
            continue;
        }

        let type_label = match entry.mode_type {
            0b1000 => "regular file",
            0b1010 => "symlink",
            0b1110 => "git link",
            other => bail!("unsupported mode type {other:04b} in index entry {}", entry.name),
        };

        println!("{}: {type_label} with perms: {:o}", entry.name, entry.mode_perms);
        println!("  on blob: {}", entry.sha);
        println!(
            "  created: {}.{}, modified: {}.{}",
            entry.ctime.0, entry.ctime.1, entry.mtime.0, entry.mtime.1
        );
        println!("  device: {}, inode: {}", entry.dev, entry.ino);
        println!("  uid: {} gid: {}", entry.uid, entry.gid);
        println!(
            "  flags: stage={} assume_valid={}",
            entry.flag_stage, entry.flag_assume_valid
        );
    }
    Ok(())
}
