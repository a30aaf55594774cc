//! Blocked bloom filter over case-folded word fragments of length 4-10,
//! used to short-circuit whole-shard misses for long literal patterns.
//!
//! Uses a double-hashing scheme built from two independently-seeded
//! `ahash::RandomState` hashers, keyed on `u64` (a hashed word fragment)
//! rather than `u32` (a trigram), since this filter indexes fragments, not
//! trigrams.

use ahash::RandomState;
use std::hash::{BuildHasher, Hasher};

/// A space-efficient probabilistic membership structure over word
/// fragments. Used to quickly reject a shard for a long literal pattern
/// before doing any posting-list lookup.
#[derive(Clone, Debug)]
pub struct BloomFilter {
    bits: Vec<u64>,
    num_bits: usize,
    num_hashes: u8,
}

impl BloomFilter {
    /// `false_positive_rate` is clamped to `[0.0001, 0.5]`; `expected_elements`
    /// to at least 1.
    pub fn new(expected_elements: usize, false_positive_rate: f64) -> Self {
        let n = expected_elements.max(1) as f64;
        let p = false_positive_rate.clamp(0.0001, 0.5);
        let ln2_sq = std::f64::consts::LN_2 * std::f64::consts::LN_2;

        let num_bits = ((-n * p.ln()) / ln2_sq).ceil() as usize;
        let num_bits = num_bits.max(64);
        let num_words = num_bits.div_ceil(64);
        let num_bits = num_words * 64;

        let num_hashes = ((num_bits as f64 / n) * std::f64::consts::LN_2).round() as u8;
        let num_hashes = num_hashes.clamp(1, 16);

        Self {
            bits: vec![0u64; num_words],
            num_bits,
            num_hashes,
        }
    }

    /// Reconstruct a filter from its raw on-disk bit words (reader path).
    pub fn from_raw(bits: Vec<u64>, num_hashes: u8) -> Self {
        let num_bits = bits.len() * 64;
        Self {
            bits,
            num_bits,
            num_hashes,
        }
    }

    #[inline]
    pub fn insert(&mut self, item: u64) {
        let (h1, h2) = self.hash_pair(item);
        for i in 0..self.num_hashes as u64 {
            let hash = h1.wrapping_add(i.wrapping_mul(h2));
            let bit_index = (hash as usize) % self.num_bits;
            self.bits[bit_index / 64] |= 1u64 << (bit_index % 64);
        }
    }

    #[inline]
    pub fn might_contain(&self, item: u64) -> bool {
        let (h1, h2) = self.hash_pair(item);
        for i in 0..self.num_hashes as u64 {
            let hash = h1.wrapping_add(i.wrapping_mul(h2));
            let bit_index = (hash as usize) % self.num_bits;
            if self.bits[bit_index / 64] & (1u64 << (bit_index % 64)) == 0 {
                return false;
            }
        }
        true
    }

    /// Short-circuit check for a whole set of query word fragments: `false`
    /// if any single fragment is definitely absent from the shard.
    pub fn might_contain_all(&self, items: &[u64]) -> bool {
        items.iter().all(|&item| self.might_contain(item))
    }

    #[inline]
    fn hash_pair(&self, item: u64) -> (u64, u64) {
        let mut hasher1 = RandomState::with_seeds(0, 0, 0, 0).build_hasher();
        hasher1.write_u64(item);
        let h1 = hasher1.finish();

        let mut hasher2 = RandomState::with_seeds(
            0x517cc1b727220a95,
            0x9e3779b97f4a7c15,
            0xbf58476d1ce4e5b9,
            0x94d049bb133111eb,
        )
        .build_hasher();
        hasher2.write_u64(item);
        let h2 = hasher2.finish();

        (h1, h2)
    }

    pub fn bits(&self) -> &[u64] {
        &self.bits
    }

    pub fn num_hashes(&self) -> u8 {
        self.num_hashes
    }

    pub fn num_bits(&self) -> usize {
        self.num_bits
    }
}

/// A maximal run of `[A-Za-z0-9_]`.
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Hash a case-folded word fragment into the key space the bloom filter
/// indexes. Fragments are compared by their folded bytes, not their raw
/// bytes, so filter lookups agree with filter inserts regardless of case.
fn fragment_key(fragment: &[u8]) -> u64 {
    let mut hasher = RandomState::with_seeds(1, 2, 3, 4).build_hasher();
    hasher.write(fragment);
    hasher.finish()
}

/// Extract every case-folded word-fragment key of length 4-10 from `content`,
/// for insertion into a shard's bloom filter. Fragments starting with a
/// digit are excluded; fragments are taken from maximal runs of
/// `[A-Za-z0-9_]`, case-folded via simple ASCII lowercasing (word-fragment
/// folding only needs to agree with itself, unlike the trigram index which
/// must match Unicode case folding rune-for-rune).
pub fn extract_word_fragment_keys(content: &[u8]) -> Vec<u64> {
    let mut keys = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    let len = content.len();

    loop {
        let at_word_byte = i < len && is_word_byte(content[i]);
        if at_word_byte {
            i += 1;
            continue;
        }
        if i > start {
            push_fragments(&content[start..i], &mut keys);
        }
        if i >= len {
            break;
        }
        i += 1;
        start = i;
    }

    keys
}

fn push_fragments(word: &[u8], keys: &mut Vec<u64>) {
    if word.is_empty() || word[0].is_ascii_digit() {
        return;
    }
    let folded: Vec<u8> = word.iter().map(|b| b.to_ascii_lowercase()).collect();
    let n = folded.len();
    for frag_len in 4..=10usize.min(n) {
        for start in 0..=(n - frag_len) {
            keys.push(fragment_key(&folded[start..start + frag_len]));
        }
    }
}

/// Hash a query-side candidate fragment (already known to be 4-10 bytes and
/// case-folded) for a bloom lookup.
pub fn fragment_lookup_key(fragment: &str) -> u64 {
    fragment_key(fragment.to_ascii_lowercase().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup_roundtrip() {
        let mut bf = BloomFilter::new(1000, 0.01);
        for i in 0..100u64 {
            bf.insert(i);
        }
        for i in 0..100u64 {
            assert!(bf.might_contain(i));
        }
    }

    #[test]
    fn false_positive_rate_is_in_a_sane_band() {
        let n = 10_000usize;
        let mut bf = BloomFilter::new(n, 0.01);
        for i in 0..n as u64 {
            bf.insert(i);
        }
        let mut false_positives = 0;
        let sample = 50_000u64;
        for i in (n as u64 * 2)..(n as u64 * 2 + sample) {
            if bf.might_contain(i) {
                false_positives += 1;
            }
        }
        let fpr = false_positives as f64 / sample as f64;
        assert!(fpr <= 0.05, "fpr {fpr} too high");
    }

    #[test]
    fn extract_word_fragments_excludes_digit_leading_and_short_words() {
        let keys = extract_word_fragment_keys(b"123abc fn getUserById x");
        // "123abc" starts with a digit -> excluded entirely.
        // "fn" and "x" are shorter than 4 bytes -> no fragments.
        // "getUserById" (11 bytes) contributes fragments of length 4-10.
        assert!(!keys.is_empty());

        let digit_leading = extract_word_fragment_keys(b"4ever");
        assert!(digit_leading.is_empty());

        let too_short = extract_word_fragment_keys(b"fn x ab abc");
        assert!(too_short.is_empty());
    }

    #[test]
    fn fragment_extraction_is_case_insensitive() {
        let lower = extract_word_fragment_keys(b"needle");
        let upper = extract_word_fragment_keys(b"NEEDLE");
        assert_eq!(lower, upper);
    }

    #[test]
    fn might_contain_all_short_circuits_on_any_miss() {
        let mut bf = BloomFilter::new(100, 0.01);
        let present = fragment_lookup_key("needle");
        bf.insert(present);
        let absent = fragment_lookup_key("haystack");
        assert!(!bf.might_contain_all(&[present, absent]));
        assert!(bf.might_contain_all(&[present]));
    }
}
