//! Tree synthesis (C8): fold the flat index into a hierarchy of tree
//! objects, returning the root hash. Grounded on
//! `original_source/lib/commit.py` (`tree_from_index`).

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::error::TeaError;
use crate::index::{Index, IndexEntry};
use crate::object::{self, Object};
use crate::repo::Repository;
use crate::tree::{Tree, TreeLeaf};

#[derive(Clone, Debug)]
enum ContentItem {
    File(IndexEntry),
    Dir { name: String, sha: String },
}

fn dirname(path: &str) -> String {
    match path.rfind('/') {
        Some(i) => path[..i].to_string(),
        None => String::new(),
    }
}

fn basename(path: &str) -> String {
    match path.rfind('/') {
        Some(i) => path[i + 1..].to_string(),
        None => path.to_string(),
    }
}

/// Build a tree hierarchy from `index` and write every level (leaves
/// first) to the object store. Returns the root tree's hash.
pub fn tree_from_index(repo: &Repository, index: &Index) -> Result<String, TeaError> {
    let mut contents: HashMap<String, Vec<ContentItem>> = HashMap::new();
    contents.insert(String::new(), Vec::new());

    for entry in &index.entries {
        let dir = dirname(&entry.name);

        // Ensure every ancestor directory up to the root has a (possibly
        // empty) entry, even if it holds no files directly.
        let mut key = dir.clone();
        while !key.is_empty() {
            contents.entry(key.clone()).or_default();
            key = dirname(&key);
        }

        contents.entry(dir).or_default().push(ContentItem::File(entry.clone()));
    }

    // Directories visited longest-path-first guarantees a directory is
    // finalized strictly before its parent references it.
    let mut paths: Vec<String> = contents.keys().cloned().collect();
    paths.sort_by_key(|p| Reverse(p.len()));

    let mut root_sha = String::new();

    for path in paths {
        let items = contents.remove(&path).unwrap_or_default();

        let mut tree = Tree::default();
        for item in items {
            match item {
                ContentItem::File(entry) => {
                    let mode = format!("{:02o}{:04o}", entry.mode_type, entry.mode_perms);
                    tree.leaves.push(TreeLeaf::new(mode, basename(&entry.name), entry.sha));
                }
                ContentItem::Dir { name, sha } => {
                    tree.leaves.push(TreeLeaf::new("040000", name, sha));
                }
            }
        }

        let sha = object::write(Some(repo), &Object::Tree(tree))?;
        root_sha = sha.clone();

        let parent = dirname(&path);
        let base = basename(&path);
        contents.entry(parent).or_default().push(ContentItem::Dir { name: base, sha });
    }

    Ok(root_sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(name: &str, sha: &str) -> IndexEntry {
        IndexEntry {
            ctime: (0, 0),
            mtime: (0, 0),
            dev: 0,
            ino: 0,
            mode_type: 0b1000,
            mode_perms: 0o644,
            uid: 0,
            gid: 0,
            fsize: 0,
            sha: sha.to_string(),
            flag_assume_valid: false,
            flag_stage: 0,
            name: name.to_string(),
        }
    }

    #[test]
    fn single_file_produces_single_leaf_root_tree() {
        let dir = tempdir().unwrap();
        let repo = Repository::create(dir.path()).unwrap();
        let blob_sha = object::write(Some(&repo), &Object::Blob(b"hello\n".to_vec())).unwrap();

        let index = Index {
            version: 2,
            entries: vec![entry("a.txt", &blob_sha)],
        };
        let root = tree_from_index(&repo, &index).unwrap();
        let tree = object::read(&repo, &root).unwrap().unwrap();
        let tree = tree.as_tree().unwrap();
        assert_eq!(tree.leaves.len(), 1);
        assert_eq!(tree.leaves[0].mode, "100644");
        assert_eq!(tree.leaves[0].path, "a.txt");
        assert_eq!(tree.leaves[0].sha, blob_sha);
    }

    #[test]
    fn nested_directory_gets_its_own_subtree() {
        let dir = tempdir().unwrap();
        let repo = Repository::create(dir.path()).unwrap();
        let blob_sha = object::write(Some(&repo), &Object::Blob(b"nested\n".to_vec())).unwrap();

        let index = Index {
            version: 2,
            entries: vec![entry("src/lib.rs", &blob_sha)],
        };
        let root = tree_from_index(&repo, &index).unwrap();
        let root_tree = object::read(&repo, &root).unwrap().unwrap();
        let root_tree = root_tree.as_tree().unwrap();
        assert_eq!(root_tree.leaves.len(), 1);
        assert_eq!(root_tree.leaves[0].mode, "040000");
        assert_eq!(root_tree.leaves[0].path, "src");

        let sub = object::read(&repo, &root_tree.leaves[0].sha).unwrap().unwrap();
        let sub = sub.as_tree().unwrap();
        assert_eq!(sub.leaves[0].path, "lib.rs");
    }

    #[test]
    fn canonical_ordering_of_dir_and_dir_dash_sibling() {
        let dir = tempdir().unwrap();
        let repo = Repository::create(dir.path()).unwrap();
        let blob_sha = object::write(Some(&repo), &Object::Blob(b"x".to_vec())).unwrap();

        let index = Index {
            version: 2,
            entries: vec![entry("dir/a", &blob_sha), entry("dir-b", &blob_sha)],
        };
        let root = tree_from_index(&repo, &index).unwrap();
        let root_tree = object::read(&repo, &root).unwrap().unwrap();
        let root_tree = root_tree.as_tree().unwrap();
        assert_eq!(root_tree.leaves[0].path, "dir-b");
        assert_eq!(root_tree.leaves[1].path, "dir");
    }
}
