//! KVLM codec (C4): the line-oriented key/value+message format shared by
//! commit and tag objects. Grounded on `original_source/lib/kvlm.py`
//! (`kvlm_parse`, `kvlm_serialize`).

use crate::error::TeaError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KvlmValue {
    Single(Vec<u8>),
    List(Vec<Vec<u8>>),
}

impl KvlmValue {
    pub fn as_single(&self) -> Option<&[u8]> {
        match self {
            KvlmValue::Single(v) => Some(v),
            KvlmValue::List(_) => None,
        }
    }

    pub fn all(&self) -> Vec<&[u8]> {
        match self {
            KvlmValue::Single(v) => vec![v.as_slice()],
            KvlmValue::List(vs) => vs.iter().map(|v| v.as_slice()).collect(),
        }
    }
}

/// Key-Value List with Message. Keys may repeat (second occurrence
/// promotes the stored value to a list); insertion order is preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Kvlm {
    pairs: Vec<(Vec<u8>, KvlmValue)>,
    pub message: Vec<u8>,
}

impl Kvlm {
    pub fn new() -> Self {
        Kvlm::default()
    }

    pub fn get(&self, key: &[u8]) -> Option<&KvlmValue> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_single(&self, key: &[u8]) -> Option<&[u8]> {
        self.get(key).and_then(|v| v.as_single())
    }

    pub fn get_all(&self, key: &[u8]) -> Vec<&[u8]> {
        self.get(key).map(|v| v.all()).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Insert a value for `key`, preserving first-insertion order and
    /// promoting a repeated key's stored value to a `List`.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        let key = key.into();
        let value = value.into();
        if let Some((_, existing)) = self.pairs.iter_mut().find(|(k, _)| *k == key) {
            match existing {
                KvlmValue::Single(old) => {
                    *existing = KvlmValue::List(vec![std::mem::take(old), value]);
                }
                KvlmValue::List(values) => values.push(value),
            }
        } else {
            self.pairs.push((key, KvlmValue::Single(value)));
        }
    }

    pub fn parse(raw: &[u8]) -> Result<Self, TeaError> {
        let mut kvlm = Kvlm::new();
        let mut start = 0usize;

        loop {
            let space = find(raw, b' ', start);
            let newline = find(raw, b'\n', start);

            let reading_message = match (space, newline) {
                (None, _) => true,
                (Some(s), Some(n)) => n < s,
                (Some(_), None) => true,
            };

            if reading_message {
                let nl = newline
                    .ok_or_else(|| TeaError::MalformedObject("kvlm".into(), "missing blank line"))?;
                if nl != start {
                    return Err(TeaError::MalformedObject(
                        "kvlm".into(),
                        "expected blank line before message",
                    ));
                }
                kvlm.message = raw[start + 1..].to_vec();
                break;
            }

            let space = space.unwrap();
            let key = raw[start..space].to_vec();

            let mut end = start;
            loop {
                end = find(raw, b'\n', end + 1)
                    .ok_or_else(|| TeaError::MalformedObject("kvlm".into(), "unterminated value"))?;
                if raw.get(end + 1) != Some(&b' ') {
                    break;
                }
            }

            let value = raw[space + 1..end].to_vec();
            let value = unfold_continuations(&value);
            kvlm.insert(key, value);

            start = end + 1;
        }

        Ok(kvlm)
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, value) in &self.pairs {
            for v in value.all() {
                out.extend_from_slice(key);
                out.push(b' ');
                out.extend_from_slice(&fold_continuations(v));
                out.push(b'\n');
            }
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out.push(b'\n');
        out
    }
}

fn find(raw: &[u8], needle: u8, from: usize) -> Option<usize> {
    raw.get(from..)?.iter().position(|&b| b == needle).map(|p| p + from)
}

/// Continuation lines begin with one leading space; drop it.
fn unfold_continuations(value: &[u8]) -> Vec<u8> {
    replace(value, b"\n ", b"\n")
}

/// Escape embedded newlines so they read back as continuation lines.
fn fold_continuations(value: &[u8]) -> Vec<u8> {
    replace(value, b"\n", b"\n ")
}

fn replace(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    if from.is_empty() {
        return haystack.to_vec();
    }
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(from) {
            out.extend_from_slice(to);
            i += from.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_commit_like_message() {
        let mut kvlm = Kvlm::new();
        kvlm.insert(&b"tree"[..], "deadbeef");
        kvlm.insert(&b"parent"[..], "1111111111111111111111111111111111111111");
        kvlm.insert(&b"parent"[..], "2222222222222222222222222222222222222222");
        kvlm.insert(&b"author"[..], "A <a@example.com> 0 +0000");
        kvlm.message = b"Initial commit\n\nmulti line body\n".to_vec();

        let bytes = kvlm.serialize();
        let parsed = Kvlm::parse(&bytes).unwrap();
        assert_eq!(parsed, kvlm);
    }

    #[test]
    fn repeated_key_becomes_list_in_arrival_order() {
        let mut kvlm = Kvlm::new();
        kvlm.insert(&b"parent"[..], "aaa");
        kvlm.insert(&b"parent"[..], "bbb");
        assert_eq!(kvlm.get_all(b"parent"), vec![b"aaa".as_slice(), b"bbb".as_slice()]);
    }

    #[test]
    fn continuation_lines_are_unfolded_on_parse() {
        let raw = b"key line1\n line2\n\nmsg\n";
        let kvlm = Kvlm::parse(raw).unwrap();
        assert_eq!(kvlm.get_single(b"key"), Some(b"line1\nline2".as_slice()));
    }
}
