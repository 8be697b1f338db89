//! Repository and user configuration, both INI-dialect (section headers in
//! brackets, `key = value`, `;`/`#` comments). Grounded on
//! `original_source/lib/repo_functions.py` (`repo_default_config`,
//! `TeaRepository.__init__`) and `commit.py` (`teaconfig_read`,
//! `teaconfig_user_get`), generalized from hand-scanned lines to a real INI
//! parser (`ini` crate) per SPEC_FULL.md §4.10.

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

use ini::Ini;

use crate::error::TeaError;

/// The `core` section of `.tea/config`.
pub struct RepoConfig {
    ini: Ini,
}

impl RepoConfig {
    /// The configuration `repo_create` writes for a brand new repository.
    pub fn default_ini() -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some("core"))
            .set("repositoryformatversion", "0")
            .set("filemode", "false")
            .set("bare", "false");
        ini
    }

    pub fn read(path: &Path) -> Result<Self, TeaError> {
        let ini = Ini::load_from_file(path)
            .map_err(|e| TeaError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        let cfg = RepoConfig { ini };
        cfg.check_version()?;
        Ok(cfg)
    }

    fn check_version(&self) -> Result<(), TeaError> {
        let version = self
            .ini
            .section(Some("core"))
            .and_then(|s| s.get("repositoryformatversion"))
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);
        if version != 0 {
            return Err(TeaError::UnsupportedRepoVersion(version));
        }
        Ok(())
    }

    pub fn write_to(ini: &Ini, path: &Path) -> Result<(), TeaError> {
        let mut file = File::create(path)?;
        ini.write_to(&mut file)?;
        Ok(())
    }
}

/// User-level `[user]` identity, looked up the way spec.md §6 describes:
/// `$XDG_CONFIG_HOME/git/config` (default `~/.config/git/config`), then
/// `~/.gitconfig`.
pub struct UserConfig;

impl UserConfig {
    /// Returns `"name <email>"`, or `None` if either half is missing.
    pub fn lookup() -> Option<String> {
        for path in Self::candidate_paths() {
            if let Ok(ini) = Ini::load_from_file(&path) {
                if let Some(section) = ini.section(Some("user")) {
                    let name = section.get("name");
                    let email = section.get("email");
                    if let (Some(name), Some(email)) = (name, email) {
                        return Some(format!("{name} <{email}>"));
                    }
                }
            }
        }
        None
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let xdg_config_home = env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::home_dir().join(".config"));

        vec![
            xdg_config_home.join("git/config"),
            Self::home_dir().join(".gitconfig"),
        ]
    }

    /// Global ignore file counterpart, `$XDG_CONFIG_HOME/git/ignore`.
    pub fn global_ignore_path() -> PathBuf {
        let xdg_config_home = env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::home_dir().join(".config"));
        xdg_config_home.join("git/ignore")
    }

    fn home_dir() -> PathBuf {
        env::var("HOME").map(PathBuf::from).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ini_has_expected_core_keys() {
        let ini = RepoConfig::default_ini();
        let section = ini.section(Some("core")).unwrap();
        assert_eq!(section.get("repositoryformatversion"), Some("0"));
        assert_eq!(section.get("filemode"), Some("false"));
        assert_eq!(section.get("bare"), Some("false"));
    }
}
