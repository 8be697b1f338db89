//! Worktree materialization (C9): recursively write a tree to an empty
//! directory. Grounded on `original_source/lib/wrapper.py`
//! (`tree_checkout`). Symlink and executable-bit handling are explicitly
//! deferred (spec.md §4.9).

use std::fs;
use std::path::Path;

use crate::error::TeaError;
use crate::object::{self, Object};
use crate::repo::Repository;
use crate::tree::Tree;

/// Materialize `tree` into `dest`, which callers must ensure is empty.
pub fn checkout_tree(repo: &Repository, tree: &Tree, dest: &Path) -> Result<(), TeaError> {
    for leaf in &tree.leaves {
        let obj = object::read(repo, &leaf.sha)?
            .ok_or_else(|| TeaError::MalformedObject(leaf.sha.clone(), "missing referenced object"))?;
        let target = dest.join(&leaf.path);

        match obj {
            Object::Tree(subtree) => {
                fs::create_dir(&target)?;
                checkout_tree(repo, &subtree, &target)?;
            }
            Object::Blob(data) => {
                fs::write(&target, data)?;
            }
            other => {
                return Err(TeaError::UnsupportedMode(format!(
                    "checkout cannot materialize a {} at {}",
                    other.kind().as_str(),
                    leaf.path
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Index, IndexEntry};
    use crate::treesynth::tree_from_index;
    use tempfile::tempdir;

    #[test]
    fn checkout_round_trips_a_simple_tree() {
        let src = tempdir().unwrap();
        let repo = Repository::create(src.path()).unwrap();
        let blob_sha = object::write(Some(&repo), &Object::Blob(b"hello\n".to_vec())).unwrap();

        let index = Index {
            version: 2,
            entries: vec![IndexEntry {
                ctime: (0, 0),
                mtime: (0, 0),
                dev: 0,
                ino: 0,
                mode_type: 0b1000,
                mode_perms: 0o644,
                uid: 0,
                gid: 0,
                fsize: 6,
                sha: blob_sha,
                flag_assume_valid: false,
                flag_stage: 0,
                name: "dir/a.txt".to_string(),
            }],
        };
        let root_sha = tree_from_index(&repo, &index).unwrap();
        let root = object::read(&repo, &root_sha).unwrap().unwrap();
        let root = root.as_tree().unwrap();

        let dest = tempdir().unwrap();
        checkout_tree(&repo, root, dest.path()).unwrap();

        let contents = fs::read(dest.path().join("dir/a.txt")).unwrap();
        assert_eq!(contents, b"hello\n");
    }
}
