//! Index codec (C7): read/write the binary staging index, preserving
//! byte-exact layout including padding. Grounded on
//! `original_source/lib/staging.py` (`index_read`) and `commit.py`
//! (`index_write`).

use std::fs;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::TeaError;

const MAGIC: &[u8; 4] = b"DIRC";
const VERSION: u32 = 2;
const ENTRY_FIXED_LEN: usize = 62; // everything up to (and including) the flags field

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub ctime: (u32, u32),
    pub mtime: (u32, u32),
    pub dev: u32,
    pub ino: u32,
    pub mode_type: u16,
    pub mode_perms: u16,
    pub uid: u32,
    pub gid: u32,
    pub fsize: u32,
    pub sha: String,
    pub flag_assume_valid: bool,
    pub flag_stage: u16,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Index {
    pub version: u32,
    pub entries: Vec<IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Index {
            version: VERSION,
            entries: Vec::new(),
        }
    }

    /// New repositories have no index file; reading a missing one yields
    /// an empty index rather than an error.
    pub fn read(path: &Path) -> Result<Self, TeaError> {
        if !path.exists() {
            return Ok(Index::new());
        }
        let raw = fs::read(path)?;
        Self::parse(&raw)
    }

    fn parse(raw: &[u8]) -> Result<Self, TeaError> {
        if raw.len() < 12 {
            return Err(TeaError::MalformedIndex("file shorter than header"));
        }
        if &raw[0..4] != MAGIC {
            return Err(TeaError::MalformedIndex("bad magic"));
        }
        let version = u32::from_be_bytes(raw[4..8].try_into().unwrap());
        if version != VERSION {
            return Err(TeaError::MalformedIndex("unsupported version"));
        }
        let count = u32::from_be_bytes(raw[8..12].try_into().unwrap()) as usize;

        let content = &raw[12..];
        let mut idx = 0usize;
        let mut entries = Vec::with_capacity(count);

        for _ in 0..count {
            let field = |lo: usize, hi: usize| -> Result<[u8; 4], TeaError> {
                content
                    .get(idx + lo..idx + hi)
                    .and_then(|s| s.try_into().ok())
                    .ok_or(TeaError::MalformedIndex("truncated entry"))
            };
            let u32_at = |lo: usize, hi: usize| -> Result<u32, TeaError> {
                Ok(u32::from_be_bytes(field(lo, hi)?))
            };

            let ctime_s = u32_at(0, 4)?;
            let ctime_ns = u32_at(4, 8)?;
            let mtime_s = u32_at(8, 12)?;
            let mtime_ns = u32_at(12, 16)?;
            let dev = u32_at(16, 20)?;
            let ino = u32_at(20, 24)?;

            let unused = u16::from_be_bytes(
                content
                    .get(idx + 24..idx + 26)
                    .and_then(|s| s.try_into().ok())
                    .ok_or(TeaError::MalformedIndex("truncated entry"))?,
            );
            if unused != 0 {
                return Err(TeaError::MalformedIndex("reserved mode bits set"));
            }

            let mode = u16::from_be_bytes(
                content
                    .get(idx + 26..idx + 28)
                    .and_then(|s| s.try_into().ok())
                    .ok_or(TeaError::MalformedIndex("truncated entry"))?,
            );
            let mode_type = mode >> 12;
            if !matches!(mode_type, 0b1000 | 0b1010 | 0b1110) {
                return Err(TeaError::MalformedIndex("bad mode type"));
            }
            let mode_perms = mode & 0o777;

            let uid = u32_at(28, 32)?;
            let gid = u32_at(32, 36)?;
            let fsize = u32_at(36, 40)?;

            let sha_bytes = content
                .get(idx + 40..idx + 60)
                .ok_or(TeaError::MalformedIndex("truncated entry"))?;
            let sha = hex::encode(sha_bytes);

            let flags = u16::from_be_bytes(
                content
                    .get(idx + 60..idx + 62)
                    .and_then(|s| s.try_into().ok())
                    .ok_or(TeaError::MalformedIndex("truncated entry"))?,
            );
            let flag_assume_valid = flags & 0b1000_0000_0000_0000 != 0;
            let flag_extended = flags & 0b0100_0000_0000_0000 != 0;
            if flag_extended {
                return Err(TeaError::MalformedIndex("extended flag set"));
            }
            let flag_stage = (flags & 0b0011_0000_0000_0000) >> 12;
            let name_length = (flags & 0b0000_1111_1111_1111) as usize;

            idx += ENTRY_FIXED_LEN;

            let raw_name;
            if name_length < 0xFFF {
                if content.get(idx + name_length) != Some(&0) {
                    return Err(TeaError::MalformedIndex("name terminator not at expected position"));
                }
                raw_name = content
                    .get(idx..idx + name_length)
                    .ok_or(TeaError::MalformedIndex("truncated name"))?;
                idx += name_length + 1;
            } else {
                let nul = content[idx + 0xFFF..]
                    .iter()
                    .position(|&b| b == 0)
                    .map(|p| idx + 0xFFF + p)
                    .ok_or(TeaError::MalformedIndex("unterminated long name"))?;
                raw_name = &content[idx..nul];
                idx = nul + 1;
            }

            let name = std::str::from_utf8(raw_name)
                .map_err(|_| TeaError::MalformedIndex("name is not valid UTF-8"))?
                .to_string();

            idx = (idx + 7) / 8 * 8;

            entries.push(IndexEntry {
                ctime: (ctime_s, ctime_ns),
                mtime: (mtime_s, mtime_ns),
                dev,
                ino,
                mode_type,
                mode_perms,
                uid,
                gid,
                fsize,
                sha,
                flag_assume_valid,
                flag_stage,
                name,
            });
        }

        if entries.len() != count {
            return Err(TeaError::MalformedIndex("entry count mismatch"));
        }

        Ok(Index { version, entries })
    }

    fn serialize(&self) -> Result<Vec<u8>, TeaError> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());

        for e in &self.entries {
            let start = out.len();

            out.extend_from_slice(&e.ctime.0.to_be_bytes());
            out.extend_from_slice(&e.ctime.1.to_be_bytes());
            out.extend_from_slice(&e.mtime.0.to_be_bytes());
            out.extend_from_slice(&e.mtime.1.to_be_bytes());
            out.extend_from_slice(&e.dev.to_be_bytes());
            out.extend_from_slice(&e.ino.to_be_bytes());

            let mode = (e.mode_type << 12) | (e.mode_perms & 0o777);
            out.extend_from_slice(&mode.to_be_bytes());

            out.extend_from_slice(&e.uid.to_be_bytes());
            out.extend_from_slice(&e.gid.to_be_bytes());
            out.extend_from_slice(&e.fsize.to_be_bytes());

            let sha_bytes = hex::decode(&e.sha)
                .map_err(|_| TeaError::MalformedIndex("entry sha is not valid hex"))?;
            if sha_bytes.len() != 20 {
                return Err(TeaError::MalformedIndex("entry sha is not 20 bytes"));
            }
            out.extend_from_slice(&sha_bytes);

            let name_bytes = e.name.as_bytes();
            let name_length = name_bytes.len().min(0xFFF) as u16;
            let flags = ((e.flag_assume_valid as u16) << 15)
                | ((e.flag_stage & 0b11) << 12)
                | name_length;
            out.extend_from_slice(&flags.to_be_bytes());

            out.extend_from_slice(name_bytes);
            out.push(0);

            let written = out.len() - start;
            let padded = (written + 7) / 8 * 8;
            out.resize(out.len() + (padded - written), 0);
        }

        Ok(out)
    }

    pub fn write(&self, path: &Path) -> Result<(), TeaError> {
        let data = self.serialize()?;
        let dir = path.parent().expect("index path has a parent");
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        fs::write(tmp.path(), &data)?;
        tmp.persist(path).map_err(|e| TeaError::Io(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry(name: &str) -> IndexEntry {
        IndexEntry {
            ctime: (1, 2),
            mtime: (3, 4),
            dev: 5,
            ino: 6,
            mode_type: 0b1000,
            mode_perms: 0o644,
            uid: 1000,
            gid: 1000,
            fsize: 42,
            sha: "a".repeat(40),
            flag_assume_valid: false,
            flag_stage: 0,
            name: name.to_string(),
        }
    }

    #[test]
    fn round_trip_single_entry() {
        let index = Index {
            version: 2,
            entries: vec![sample_entry("a.txt")],
        };
        let bytes = index.serialize().unwrap();
        let back = Index::parse(&bytes).unwrap();
        assert_eq!(back, index);
    }

    #[test]
    fn entries_region_is_multiple_of_eight() {
        let index = Index {
            version: 2,
            entries: vec![sample_entry("a"), sample_entry("dir/nested/long/path/name.rs")],
        };
        let bytes = index.serialize().unwrap();
        assert_eq!((bytes.len() - 12) % 8, 0);
    }

    #[test]
    fn long_name_round_trips_with_0xfff_marker() {
        let long_name = "d/".repeat(3000) + "f";
        let index = Index {
            version: 2,
            entries: vec![sample_entry(&long_name)],
        };
        let bytes = index.serialize().unwrap();
        let back = Index::parse(&bytes).unwrap();
        assert_eq!(back.entries[0].name, long_name);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = vec![0u8; 12];
        bytes[0..4].copy_from_slice(b"NOPE");
        assert!(Index::parse(&bytes).is_err());
    }

    #[test]
    fn rejects_extended_flag() {
        let index = Index {
            version: 2,
            entries: vec![sample_entry("x")],
        };
        let mut bytes = index.serialize().unwrap();
        // Flip the extended-flag bit in the flags field of the first (only)
        // entry: offset 12 (header) + 60 (flags field start).
        let flags_off = 12 + 60;
        bytes[flags_off] |= 0b0100_0000;
        assert!(Index::parse(&bytes).is_err());
    }
}
