//! Repository layout (C1): locating and creating the administrative
//! directory, resolving paths within it, and reading configuration.
//! Grounded on `original_source/lib/repo_functions.py`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::RepoConfig;
use crate::error::TeaError;

/// A tea repository: a worktree `W` plus its administrative directory
/// `W/.tea`.
pub struct Repository {
    pub worktree: PathBuf,
    pub teadir: PathBuf,
    pub config: RepoConfig,
}

const ADMIN_DIR: &str = ".tea";

impl Repository {
    /// Build a `Repository` handle for an existing admin directory at
    /// `worktree/.tea`, reading and validating its config.
    fn open(worktree: PathBuf) -> Result<Self, TeaError> {
        let teadir = worktree.join(ADMIN_DIR);
        let config_path = teadir.join("config");
        if !config_path.exists() {
            return Err(TeaError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Configuration file missing",
            )));
        }
        let config = RepoConfig::read(&config_path)?;
        Ok(Repository {
            worktree,
            teadir,
            config,
        })
    }

    /// Compute an absolute path under `.tea`, without creating anything.
    pub fn path_of(&self, segments: &[&str]) -> PathBuf {
        let mut path = self.teadir.clone();
        for seg in segments {
            path.push(seg);
        }
        path
    }

    /// Ensure the directory named by `segments` (relative to `.tea`)
    /// exists, creating it (and parents) if necessary.
    pub fn ensure_dir(&self, segments: &[&str]) -> Result<PathBuf, TeaError> {
        let path = self.path_of(segments);
        if path.exists() {
            if !path.is_dir() {
                return Err(TeaError::Io(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("not a directory: {}", path.display()),
                )));
            }
            return Ok(path);
        }
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Create a brand-new repository at `path`, writing the admin tree,
    /// description, HEAD, and default config.
    pub fn create(path: &Path) -> Result<Self, TeaError> {
        if path.exists() {
            if !path.is_dir() {
                return Err(TeaError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("{} is not a directory!", path.display()),
                )));
            }
            let teadir = path.join(ADMIN_DIR);
            if teadir.exists() && fs::read_dir(&teadir)?.next().is_some() {
                return Err(TeaError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("{} is not empty!", path.display()),
                )));
            }
        } else {
            fs::create_dir_all(path)?;
        }

        let worktree = path.to_path_buf();
        let teadir = worktree.join(ADMIN_DIR);

        fs::create_dir_all(teadir.join("branches"))?;
        fs::create_dir_all(teadir.join("objects"))?;
        fs::create_dir_all(teadir.join("refs/tags"))?;
        fs::create_dir_all(teadir.join("refs/heads"))?;

        fs::write(
            teadir.join("description"),
            "Unnamed repository: edit this file 'description' to name this repository.\n",
        )?;
        fs::write(teadir.join("HEAD"), "ref: refs/heads/main\n")?;

        let ini = RepoConfig::default_ini();
        RepoConfig::write_to(&ini, &teadir.join("config"))?;

        Self::open(worktree)
    }

    /// Walk upward from `start` looking for `.tea`, stopping at the
    /// filesystem root.
    pub fn find(start: &Path) -> Result<Option<Self>, TeaError> {
        let mut path = fs::canonicalize(start)?;
        loop {
            if path.join(ADMIN_DIR).is_dir() {
                return Ok(Some(Self::open(path)?));
            }
            match path.parent() {
                Some(parent) => path = parent.to_path_buf(),
                None => return Ok(None),
            }
        }
    }

    /// Like `find`, but turns a missing repository into an error.
    pub fn find_required(start: &Path) -> Result<Self, TeaError> {
        Self::find(start)?.ok_or_else(|| TeaError::NotARepository(start.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_then_find() {
        let dir = tempdir().unwrap();
        Repository::create(dir.path()).unwrap();
        let found = Repository::find(dir.path()).unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn create_refuses_nonempty_admin_dir() {
        let dir = tempdir().unwrap();
        Repository::create(dir.path()).unwrap();
        assert!(Repository::create(dir.path()).is_err());
    }

    #[test]
    fn find_stops_at_root_when_absent() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        let found = Repository::find(&nested).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn find_walks_up_through_parents() {
        let dir = tempdir().unwrap();
        Repository::create(dir.path()).unwrap();
        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        let found = Repository::find(&nested).unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn ensure_dir_creates_missing_nested_directory() {
        let dir = tempdir().unwrap();
        let repo = Repository::create(dir.path()).unwrap();
        let info = repo.ensure_dir(&["info"]).unwrap();
        assert!(info.is_dir());
        assert_eq!(info, repo.teadir.join("info"));
    }

    #[test]
    fn ensure_dir_rejects_path_that_is_a_file() {
        let dir = tempdir().unwrap();
        let repo = Repository::create(dir.path()).unwrap();
        fs::write(repo.teadir.join("description"), "x").unwrap();
        assert!(repo.ensure_dir(&["description"]).is_err());
    }
}
