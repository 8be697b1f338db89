//! Ignore-pattern evaluation for `status`/`check-ignore`. Out of scope as
//! core engineering (spec.md §1), but required to implement those two CLI
//! commands. Grounded on `original_source/lib/staging.py`
//! (`teaignore_read`, `check_ignore*`), with the scoping fix spec.md §9
//! calls for: scoped `.teaignore` patterns are matched relative to their
//! own directory, not against the full repo-relative path.

use std::collections::HashMap;
use std::fs;

use glob::Pattern;

use crate::config::UserConfig;
use crate::error::TeaError;
use crate::index::Index;
use crate::object;
use crate::repo::Repository;

/// `(pattern, ignore_if_matched)`. `false` means the pattern is a
/// negation (`!pattern`): a later match un-ignores an earlier one.
type Rule = (String, bool);

#[derive(Debug, Default)]
pub struct IgnoreRules {
    /// `.tea/info/exclude` and the global `git/ignore`, each its own
    /// ruleset, checked in order.
    absolute: Vec<Vec<Rule>>,
    /// `.teaignore` files found in the index, keyed by their containing
    /// directory (`""` for the root).
    scoped: HashMap<String, Vec<Rule>>,
}

fn dirname(path: &str) -> String {
    match path.rfind('/') {
        Some(i) => path[..i].to_string(),
        None => String::new(),
    }
}

fn parse_single(line: &str) -> Option<Rule> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        None
    } else if let Some(rest) = line.strip_prefix('!') {
        Some((rest.to_string(), false))
    } else if let Some(rest) = line.strip_prefix('\\') {
        Some((rest.to_string(), true))
    } else {
        Some((line.to_string(), true))
    }
}

fn parse_lines(text: &str) -> Vec<Rule> {
    text.lines().filter_map(parse_single).collect()
}

impl IgnoreRules {
    pub fn read(repo: &Repository, index: &Index) -> Result<Self, TeaError> {
        let mut absolute = Vec::new();

        let exclude_path = repo.teadir.join("info/exclude");
        if exclude_path.is_file() {
            absolute.push(parse_lines(&fs::read_to_string(&exclude_path)?));
        }

        let global_path = UserConfig::global_ignore_path();
        if global_path.is_file() {
            absolute.push(parse_lines(&fs::read_to_string(&global_path)?));
        }

        let mut scoped = HashMap::new();
        for entry in &index.entries {
            if entry.name == ".teaignore" || entry.name.ends_with("/.teaignore") {
                let dir = dirname(&entry.name);
                let obj = object::read(repo, &entry.sha)?.ok_or_else(|| {
                    TeaError::MalformedObject(entry.sha.clone(), "missing .teaignore blob")
                })?;
                let data = obj
                    .as_blob()
                    .ok_or_else(|| TeaError::MalformedObject(entry.sha.clone(), ".teaignore is not a blob"))?;
                let text = String::from_utf8_lossy(data);
                scoped.insert(dir, parse_lines(&text));
            }
        }

        Ok(IgnoreRules { absolute, scoped })
    }

    /// `path` is relative to the worktree root.
    pub fn is_ignored(&self, path: &str) -> bool {
        if let Some(result) = self.check_scoped(path) {
            return result;
        }
        check_rulesets(&self.absolute, path)
    }

    fn check_scoped(&self, path: &str) -> Option<bool> {
        let mut dir = dirname(path);
        loop {
            if let Some(rules) = self.scoped.get(&dir) {
                let relative = if dir.is_empty() {
                    path
                } else {
                    path.strip_prefix(&format!("{dir}/")).unwrap_or(path)
                };
                if let Some(result) = check_ruleset(rules, relative) {
                    return Some(result);
                }
            }
            if dir.is_empty() {
                return None;
            }
            dir = dirname(&dir);
        }
    }
}

fn check_ruleset(rules: &[Rule], path: &str) -> Option<bool> {
    let mut result = None;
    for (pattern, value) in rules {
        if Pattern::new(pattern).map(|p| p.matches(path)).unwrap_or(false) {
            result = Some(*value);
        }
    }
    result
}

fn check_rulesets(rulesets: &[Vec<Rule>], path: &str) -> bool {
    for ruleset in rulesets {
        if let Some(result) = check_ruleset(ruleset, path) {
            return result;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_overrides_earlier_match_within_same_ruleset() {
        let rules = vec![("*.log".to_string(), true), ("keep.log".to_string(), false)];
        assert_eq!(check_ruleset(&rules, "keep.log"), Some(false));
        assert_eq!(check_ruleset(&rules, "drop.log"), Some(true));
    }

    #[test]
    fn scoped_patterns_match_relative_to_their_directory() {
        let mut rules = IgnoreRules::default();
        rules
            .scoped
            .insert("src".to_string(), vec![("*.tmp".to_string(), true)]);
        assert!(rules.is_ignored("src/build.tmp"));
        assert!(!rules.is_ignored("build.tmp"));
    }

    #[test]
    fn unmatched_path_is_not_ignored() {
        let rules = IgnoreRules::default();
        assert!(!rules.is_ignored("anything"));
    }
}
