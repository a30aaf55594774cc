//! Ngram -> posting-list offset lookup.
//!
//! Three on-disk representations could coexist (sorted array, combined
//! ASCII/Unicode, B-tree); this crate ships exactly one canonical form
//! behind a trait so the others remain addable later without touching call
//! sites. The sorted-array form (`SortedArrayNgramIndex`) is simplest to
//! get right: a sorted `Vec` binary-searched by a 64-bit ngram key.

use crate::format::Section;

/// Lookup result: a byte range into the shard's posting section. An absent
/// ngram is represented by `None`, matching `size == 0 <=> absent` on disk.
pub trait NgramIndex {
    fn lookup(&self, ngram: u64) -> Option<Section>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Iterate all `(ngram, section)` pairs in ascending ngram order: an
    /// in-order walk of the trigram -> posting table must produce the same
    /// posting lists as a linear scan of the content.
    fn iter(&self) -> Box<dyn Iterator<Item = (u64, Section)> + '_>;
}

#[derive(Debug, Clone, Default)]
pub struct SortedArrayNgramIndex {
    /// Sorted ascending by `.0` (the ngram key).
    entries: Vec<(u64, Section)>,
}

impl SortedArrayNgramIndex {
    /// Build from an already-deduplicated set of `(ngram, section)` pairs in
    /// any order; sorts them into binary-searchable form.
    pub fn build(mut entries: Vec<(u64, Section)>) -> Self {
        entries.sort_unstable_by_key(|(ngram, _)| *ngram);
        Self { entries }
    }

    pub const ENTRY_LEN: usize = 8 + Section::ENCODED_LEN;

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
        for (ngram, section) in &self.entries {
            out.extend_from_slice(&ngram.to_be_bytes());
            out.extend_from_slice(&section.offset.to_be_bytes());
            out.extend_from_slice(&section.size.to_be_bytes());
        }
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < 4 {
            return None;
        }
        let count = u32::from_be_bytes(buf[0..4].try_into().ok()?) as usize;
        let mut entries = Vec::with_capacity(count);
        let mut pos = 4;
        for _ in 0..count {
            if buf.len() < pos + Self::ENTRY_LEN {
                return None;
            }
            let ngram = u64::from_be_bytes(buf[pos..pos + 8].try_into().ok()?);
            let offset = u64::from_be_bytes(buf[pos + 8..pos + 16].try_into().ok()?);
            let size = u64::from_be_bytes(buf[pos + 16..pos + 24].try_into().ok()?);
            entries.push((ngram, Section::new(offset, size)));
            pos += Self::ENTRY_LEN;
        }
        Some(Self { entries })
    }
}

impl NgramIndex for SortedArrayNgramIndex {
    fn lookup(&self, ngram: u64) -> Option<Section> {
        self.entries
            .binary_search_by_key(&ngram, |(n, _)| *n)
            .ok()
            .map(|i| self.entries[i].1)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (u64, Section)> + '_> {
        Box::new(self.entries.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_present_and_rejects_absent() {
        let idx = SortedArrayNgramIndex::build(vec![
            (30, Section::new(100, 10)),
            (10, Section::new(0, 20)),
            (20, Section::new(20, 30)),
        ]);
        assert_eq!(idx.lookup(10), Some(Section::new(0, 20)));
        assert_eq!(idx.lookup(20), Some(Section::new(20, 30)));
        assert_eq!(idx.lookup(30), Some(Section::new(100, 10)));
        assert_eq!(idx.lookup(15), None);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let idx = SortedArrayNgramIndex::build(vec![
            (5, Section::new(1, 2)),
            (1, Section::new(3, 4)),
        ]);
        let mut buf = Vec::new();
        idx.encode(&mut buf);
        let back = SortedArrayNgramIndex::decode(&buf).unwrap();
        assert_eq!(back.lookup(1), Some(Section::new(3, 4)));
        assert_eq!(back.lookup(5), Some(Section::new(1, 2)));
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn iter_is_ascending_by_ngram() {
        let idx = SortedArrayNgramIndex::build(vec![
            (9, Section::new(0, 1)),
            (3, Section::new(0, 1)),
            (6, Section::new(0, 1)),
        ]);
        let keys: Vec<u64> = idx.iter().map(|(n, _)| n).collect();
        assert_eq!(keys, vec![3, 6, 9]);
    }
}
