//! Name resolver (C6): maps a user-supplied identifier to exactly one
//! object hash, with type coercion (peel tag → commit → tree). Grounded on
//! `original_source/lib/tea_object_function.py` (`object_resolve`,
//! `object_find`).

use crate::error::TeaError;
use crate::object::{self, ObjectKind};
use crate::refs;
use crate::repo::Repository;

fn is_hex_prefix(s: &str) -> bool {
    (4..=40).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Collect every candidate hash `name` could refer to.
pub fn candidates(repo: &Repository, name: &str) -> Result<Vec<String>, TeaError> {
    let mut candidates = Vec::new();

    if name.trim().is_empty() {
        return Ok(candidates);
    }

    if name == "HEAD" {
        if let Some(sha) = refs::resolve(repo, "HEAD")? {
            candidates.push(sha);
        }
        return Ok(candidates);
    }

    if is_hex_prefix(name) {
        let name = name.to_lowercase();
        let (prefix, rest) = name.split_at(2);
        let shard_dir = repo.path_of(&["objects", prefix]);
        if shard_dir.is_dir() {
            for entry in std::fs::read_dir(&shard_dir)? {
                let entry = entry?;
                let file_name = entry.file_name().to_string_lossy().into_owned();
                if file_name.starts_with(rest) {
                    candidates.push(format!("{prefix}{file_name}"));
                }
            }
        }
    }

    if let Some(sha) = refs::resolve(repo, &format!("refs/tags/{name}"))? {
        candidates.push(sha);
    }
    if let Some(sha) = refs::resolve(repo, &format!("refs/heads/{name}"))? {
        candidates.push(sha);
    }

    Ok(candidates)
}

/// Resolve `name` to exactly one hash, optionally peeling to `target_kind`.
pub fn resolve(
    repo: &Repository,
    name: &str,
    target_kind: Option<ObjectKind>,
    follow: bool,
) -> Result<String, TeaError> {
    let mut found = candidates(repo, name)?;

    if found.is_empty() {
        return Err(TeaError::NoSuchReference(name.to_string()));
    }
    if found.len() > 1 {
        found.sort();
        return Err(TeaError::AmbiguousReference {
            name: name.to_string(),
            candidates: found.join("\n"),
        });
    }

    let sha = found.remove(0);

    let Some(target_kind) = target_kind else {
        return Ok(sha);
    };

    peel(repo, &sha, target_kind, follow)?
        .ok_or_else(|| TeaError::NoSuchReference(name.to_string()))
}

/// Walk from `sha` toward `target_kind`: tag → object, commit → tree.
/// Bounded by the object graph (acyclic by construction).
fn peel(
    repo: &Repository,
    sha: &str,
    target_kind: ObjectKind,
    follow: bool,
) -> Result<Option<String>, TeaError> {
    let mut sha = sha.to_string();
    loop {
        let obj = object::read(repo, &sha)?
            .ok_or_else(|| TeaError::NoSuchReference(sha.clone()))?;

        if obj.kind() == target_kind {
            return Ok(Some(sha));
        }

        if !follow {
            return Ok(None);
        }

        match &obj {
            crate::object::Object::Tag(kvlm) => {
                sha = kvlm
                    .get_single(b"object")
                    .map(|v| String::from_utf8_lossy(v).into_owned())
                    .ok_or_else(|| TeaError::MalformedObject(sha.clone(), "tag missing object"))?;
            }
            crate::object::Object::Commit(kvlm) if target_kind == ObjectKind::Tree => {
                sha = kvlm
                    .get_single(b"tree")
                    .map(|v| String::from_utf8_lossy(v).into_owned())
                    .ok_or_else(|| TeaError::MalformedObject(sha.clone(), "commit missing tree"))?;
            }
            _ => return Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ambiguous_short_hash_reports_all_candidates() {
        let dir = tempdir().unwrap();
        let repo = Repository::create(dir.path()).unwrap();

        // Force a prefix collision directly: two object files under the
        // same shard whose remainders both start with "cd".
        let shard = repo.path_of(&["objects", "ab"]);
        std::fs::create_dir_all(&shard).unwrap();
        std::fs::write(shard.join("cd00000000000000000000000000000000001"), b"x").unwrap();
        std::fs::write(shard.join("cd00000000000000000000000000000000002"), b"y").unwrap();

        let err = resolve(&repo, "abcd", None, true).unwrap_err();
        match err {
            TeaError::AmbiguousReference { candidates, .. } => {
                assert_eq!(candidates.lines().count(), 2);
            }
            other => panic!("expected AmbiguousReference, got {other:?}"),
        }
    }

    #[test]
    fn head_on_empty_repo_is_not_found() {
        let dir = tempdir().unwrap();
        let repo = Repository::create(dir.path()).unwrap();
        let err = resolve(&repo, "HEAD", None, true).unwrap_err();
        assert!(matches!(err, TeaError::NoSuchReference(_)));
    }
}
