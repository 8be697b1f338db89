//! Tree codec (C3): canonical parse/serialize of tree objects. Grounded on
//! `original_source/lib/trees_checkout.py` (`tree_parse_one`, `tree_parse`,
//! `tree_leaf_sort_key`, `tree_serialize`).

use crate::error::TeaError;

/// One leaf of a tree object: `(mode, path, sha)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeLeaf {
    /// ASCII octal mode, 5 or 6 digits (6 after the read-time padding
    /// described in spec.md §4.3).
    pub mode: String,
    /// A single path component (no `/`).
    pub path: String,
    /// 40-hex lowercase SHA-1.
    pub sha: String,
}

impl TreeLeaf {
    pub fn new(mode: impl Into<String>, path: impl Into<String>, sha: impl Into<String>) -> Self {
        TreeLeaf {
            mode: mode.into(),
            path: path.into(),
            sha: sha.into(),
        }
    }

    fn is_subtree(&self) -> bool {
        !self.mode.starts_with("10")
    }

    /// Git's rule: subtree entries sort as though their name ended with `/`.
    fn sort_key(&self) -> String {
        if self.is_subtree() {
            format!("{}/", self.path)
        } else {
            self.path.clone()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    pub leaves: Vec<TreeLeaf>,
}

impl Tree {
    pub fn parse(raw: &[u8]) -> Result<Self, TeaError> {
        let mut leaves = Vec::new();
        let mut pos = 0usize;
        while pos < raw.len() {
            let (next, leaf) = parse_one(raw, pos)?;
            leaves.push(leaf);
            pos = next;
        }
        Ok(Tree { leaves })
    }

    /// Sorts leaves by the canonical key (mutating), then emits the wire
    /// form `<mode-ASCII> SP <path-UTF8> 0x00 <20-byte SHA>` for each.
    pub fn serialize(&self) -> Result<Vec<u8>, TeaError> {
        let mut leaves = self.leaves.clone();
        leaves.sort_unstable_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut out = Vec::new();
        for leaf in &leaves {
            out.extend_from_slice(leaf.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(leaf.path.as_bytes());
            out.push(0);
            let sha_bytes = hex::decode(&leaf.sha)
                .map_err(|_| TeaError::MalformedObject(leaf.sha.clone(), "invalid sha hex"))?;
            if sha_bytes.len() != 20 {
                return Err(TeaError::MalformedObject(leaf.sha.clone(), "sha not 20 bytes"));
            }
            out.extend_from_slice(&sha_bytes);
        }
        Ok(out)
    }
}

fn parse_one(raw: &[u8], start: usize) -> Result<(usize, TreeLeaf), TeaError> {
    let rest = &raw[start..];
    let space = rest
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| TeaError::MalformedObject("tree".into(), "missing mode terminator"))?;

    if space != 5 && space != 6 {
        return Err(TeaError::UnsupportedMode(format!(
            "mode length {space} at offset {start}"
        )));
    }

    let mut mode = String::from_utf8_lossy(&rest[..space]).into_owned();
    if mode.len() == 5 {
        mode = format!(" {mode}");
    }

    let x = start + space;
    let nul = raw[x..]
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| TeaError::MalformedObject("tree".into(), "missing path terminator"))?;
    let y = x + nul;

    let path = std::str::from_utf8(&raw[x + 1..y])
        .map_err(|_| TeaError::MalformedObject("tree".into(), "path is not valid UTF-8"))?
        .to_string();

    if y + 21 > raw.len() {
        return Err(TeaError::MalformedObject("tree".into(), "truncated sha"));
    }
    let sha = hex::encode(&raw[y + 1..y + 21]);

    Ok((y + 21, TreeLeaf { mode, path, sha }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(mode: &str, path: &str, sha: &str) -> TreeLeaf {
        TreeLeaf::new(mode, path, sha)
    }

    #[test]
    fn round_trip_single_blob() {
        let tree = Tree {
            leaves: vec![leaf("100644", "a.txt", "0".repeat(40))],
        };
        let bytes = tree.serialize().unwrap();
        let parsed = Tree::parse(&bytes).unwrap();
        assert_eq!(parsed.leaves, tree.leaves);
    }

    #[test]
    fn canonical_ordering_dir_slash_sentinel() {
        // "dir-b" sorts before "dir/" because '-' (0x2D) < '/' (0x2F).
        let tree = Tree {
            leaves: vec![
                leaf("040000", "dir", "1".repeat(40)),
                leaf("100644", "dir-b", "2".repeat(40)),
            ],
        };
        let bytes = tree.serialize().unwrap();
        let parsed = Tree::parse(&bytes).unwrap();
        assert_eq!(parsed.leaves[0].path, "dir-b");
        assert_eq!(parsed.leaves[1].path, "dir");
    }

    #[test]
    fn five_digit_mode_padded_with_space_on_read() {
        let mut raw = Vec::new();
        raw.extend_from_slice(b"40000 d\0");
        raw.extend_from_slice(&[0u8; 20]);
        let tree = Tree::parse(&raw).unwrap();
        assert_eq!(tree.leaves[0].mode, " 40000");
    }

    #[test]
    fn rejects_bad_mode_length() {
        let mut raw = Vec::new();
        raw.extend_from_slice(b"4 d\0");
        raw.extend_from_slice(&[0u8; 20]);
        assert!(Tree::parse(&raw).is_err());
    }
}
