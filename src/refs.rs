//! Reference namespace (C5): resolve symbolic refs, enumerate refs, create
//! tags. Grounded on `original_source/lib/tea_object_function.py`
//! (`ref_resolve`) and `wrapper.py` (`show_ref`); `tag_create` follows
//! spec.md §4.5 directly since `refs_tags_branch.py` was filtered out of
//! the retrieved original source.

use std::collections::BTreeMap;
use std::fs;

use tempfile::NamedTempFile;

use crate::config::UserConfig;
use crate::error::TeaError;
use crate::kvlm::Kvlm;
use crate::object::{self, Object, ObjectKind};
use crate::repo::Repository;

/// Read `refname` (e.g. `HEAD`, `refs/heads/main`) and follow symbolic
/// indirection (`ref: <path>`) until a direct hash is found. Returns
/// `None` if any intermediate path is missing — the normal state of
/// `HEAD` on a brand new repository.
pub fn resolve(repo: &Repository, refname: &str) -> Result<Option<String>, TeaError> {
    let path = repo.teadir.join(refname);
    if !path.is_file() {
        return Ok(None);
    }
    let data = fs::read_to_string(&path)?;
    let data = data.trim_end_matches('\n');
    match data.strip_prefix("ref: ") {
        Some(target) => resolve(repo, target),
        None => Ok(Some(data.to_string())),
    }
}

/// Overwrite `refname` with `hash\n`, through a temp-file-plus-rename for
/// crash safety (spec.md §5).
pub fn write_direct(repo: &Repository, refname: &str, hash: &str) -> Result<(), TeaError> {
    let path = repo.teadir.join(refname);
    let dir = path.parent().expect("ref path has a parent");
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    fs::write(tmp.path(), format!("{hash}\n"))?;
    tmp.persist(&path).map_err(|e| TeaError::Io(e.error))?;
    Ok(())
}

/// Point `HEAD` at a branch (`ref: refs/heads/<branch>\n`).
pub fn set_head_symbolic(repo: &Repository, branch: &str) -> Result<(), TeaError> {
    let path = repo.teadir.join("HEAD");
    let mut tmp = NamedTempFile::new_in(&repo.teadir)?;
    fs::write(tmp.path(), format!("ref: refs/heads/{branch}\n"))?;
    tmp.persist(&path).map_err(|e| TeaError::Io(e.error))?;
    Ok(())
}

/// The currently checked-out branch name, or `None` if `HEAD` is detached.
pub fn active_branch(repo: &Repository) -> Result<Option<String>, TeaError> {
    let head = fs::read_to_string(repo.teadir.join("HEAD"))?;
    let head = head.trim_end_matches('\n');
    Ok(head
        .strip_prefix("ref: refs/heads/")
        .map(|b| b.to_string()))
}

/// A nested view of `refs/`, shaped like the directory tree it mirrors.
#[derive(Debug, Default)]
pub struct RefTree {
    pub leaves: BTreeMap<String, String>,
    pub children: BTreeMap<String, RefTree>,
}

/// Walk `refs/` recursively, resolving every leaf to its hash.
pub fn list(repo: &Repository) -> Result<RefTree, TeaError> {
    list_dir(repo, &repo.teadir.join("refs"), "refs")
}

fn list_dir(repo: &Repository, dir: &std::path::Path, rel: &str) -> Result<RefTree, TeaError> {
    let mut tree = RefTree::default();
    if !dir.is_dir() {
        return Ok(tree);
    }
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let rel_path = format!("{rel}/{name}");
        if entry.file_type()?.is_dir() {
            tree.children.insert(name, list_dir(repo, &entry.path(), &rel_path)?);
        } else if let Some(sha) = resolve(repo, &rel_path)? {
            tree.leaves.insert(name, sha);
        }
    }
    Ok(tree)
}

pub enum TagKind {
    /// Lightweight tag: a ref pointing directly at the target.
    Ref,
    /// Annotated tag: a tag object is written first.
    Object,
}

/// Create `refs/tags/<name>`. For `TagKind::Object`, first builds and
/// writes a tag object (`object`, `type`, `tag`, `tagger`) pointing at
/// `target`, then points the ref at that tag object instead of `target`
/// directly (spec.md §4.5).
pub fn tag_create(
    repo: &Repository,
    name: &str,
    target: &str,
    target_kind: ObjectKind,
    kind: TagKind,
) -> Result<(), TeaError> {
    let ref_target = match kind {
        TagKind::Ref => target.to_string(),
        TagKind::Object => {
            let mut kvlm = Kvlm::new();
            kvlm.insert(&b"object"[..], target.to_string());
            kvlm.insert(&b"type"[..], target_kind.as_str());
            kvlm.insert(&b"tag"[..], name.to_string());
            let identity = UserConfig::lookup().ok_or(TeaError::MissingIdentity)?;
            kvlm.insert(&b"tagger"[..], identity);
            kvlm.message = Vec::new();
            let obj = Object::Tag(kvlm);
            object::write(Some(repo), &obj)?
        }
    };
    write_direct(repo, &format!("refs/tags/{name}"), &ref_target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn resolve_missing_head_on_new_repo_is_none() {
        let dir = tempdir().unwrap();
        let repo = Repository::create(dir.path()).unwrap();
        assert!(resolve(&repo, "HEAD").unwrap().is_none());
    }

    #[test]
    fn resolve_follows_symbolic_indirection() {
        let dir = tempdir().unwrap();
        let repo = Repository::create(dir.path()).unwrap();
        write_direct(&repo, "refs/heads/main", &"a".repeat(40)).unwrap();
        assert_eq!(resolve(&repo, "HEAD").unwrap(), Some("a".repeat(40)));
    }

    #[test]
    fn active_branch_reports_main_by_default() {
        let dir = tempdir().unwrap();
        let repo = Repository::create(dir.path()).unwrap();
        assert_eq!(active_branch(&repo).unwrap(), Some("main".to_string()));
    }
}
