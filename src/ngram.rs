//! Case-folded Unicode trigram packing.
//!
//! Trigrams are built from *runes*, case-folded, and packed into a 63-bit
//! integer (21 bits per rune) so non-ASCII identifiers and literals are
//! indexed correctly, rather than byte-windowed ASCII trigrams. The
//! bitset-based dedup strategy below is sized for the 21-bit-per-rune
//! keyspace and falls back to sort+dedup for small inputs.

use rustc_hash::FxHashSet;

/// A case-folded trigram of Unicode scalars, packed 21 bits per rune into a
/// single 63-bit integer. Kept as `u64` (top bit always zero) so it composes
/// cleanly with the varint/posting-list code, which works in `u64`.
pub type Ngram = u64;

const RUNE_BITS: u32 = 21;
const RUNE_MASK: u32 = (1 << RUNE_BITS) - 1;

/// Case-fold a single Unicode scalar the way this format requires: standard
/// Unicode lowercase folding, plus the two non-ASCII codepoints that fold
/// into ASCII and would otherwise be missed by a naive `to_lowercase`: the
/// Kelvin sign (U+212A) folds to `k`, and the Latin small letter long s
/// (U+017F) folds to `s`.
#[inline]
pub fn fold_case(c: char) -> char {
    match c {
        '\u{212A}' => 'k', // KELVIN SIGN -> LATIN SMALL LETTER K
        '\u{017F}' => 's', // LATIN SMALL LETTER LONG S -> LATIN SMALL LETTER S
        c => {
            // `char::to_lowercase` can yield more than one scalar for a small
            // number of codepoints (e.g. German sharp S stays as-is, but a
            // few Greek/Cyrillic letters expand). Ngram packing needs exactly
            // one rune per input rune, so we take the first folded scalar;
            // this matches how the reference corpus treats folding as a
            // scalar-for-scalar operation.
            c.to_lowercase().next().unwrap_or(c)
        }
    }
}

/// Pack three already-case-folded runes into a single [`Ngram`] key.
#[inline]
pub fn pack(r0: char, r1: char, r2: char) -> Ngram {
    let a = (r0 as u32) & RUNE_MASK;
    let b = (r1 as u32) & RUNE_MASK;
    let c = (r2 as u32) & RUNE_MASK;
    ((a as u64) << (2 * RUNE_BITS)) | ((b as u64) << RUNE_BITS) | (c as u64)
}

/// Unpack a trigram key back into its three folded runes (best-effort: a rune
/// above `RUNE_MASK` would have been truncated at pack time, which cannot
/// happen for any valid Unicode scalar since `char::MAX` fits in 21 bits).
pub fn unpack(ngram: Ngram) -> [char; 3] {
    let a = ((ngram >> (2 * RUNE_BITS)) & RUNE_MASK as u64) as u32;
    let b = ((ngram >> RUNE_BITS) & RUNE_MASK as u64) as u32;
    let c = (ngram & RUNE_MASK as u64) as u32;
    [
        char::from_u32(a).unwrap_or('\u{FFFD}'),
        char::from_u32(b).unwrap_or('\u{FFFD}'),
        char::from_u32(c).unwrap_or('\u{FFFD}'),
    ]
}

/// Case-fold a string and pack it into a trigram key, failing if it is not
/// exactly three runes long.
pub fn pack_str(literal: &str) -> Option<Ngram> {
    let mut chars = literal.chars().map(fold_case);
    let r0 = chars.next()?;
    let r1 = chars.next()?;
    let r2 = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(pack(r0, r1, r2))
}

/// Extract the set of unique case-folded trigrams present in `content`,
/// along with each trigram's rune position (the position of its first
/// rune, in runes from the start of the document) for posting-list
/// construction. Positions are not deduplicated; callers that only need
/// distinct trigrams should use [`unique_ngrams`].
pub fn extract_ngrams_with_positions(content: &str) -> Vec<(Ngram, u32)> {
    let runes: Vec<char> = content.chars().map(fold_case).collect();
    if runes.len() < 3 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(runes.len().saturating_sub(2));
    for (i, window) in runes.windows(3).enumerate() {
        out.push((pack(window[0], window[1], window[2]), i as u32));
    }
    out
}

/// Extract the set of unique case-folded trigrams present in `content`.
/// Small inputs use sort+dedup (cache-friendly); larger inputs use a hash
/// set, since a dense bitset over the 63-bit keyspace would be far too
/// large to allocate per file.
pub fn unique_ngrams(content: &str) -> Vec<Ngram> {
    let runes: Vec<char> = content.chars().map(fold_case).collect();
    if runes.len() < 3 {
        return Vec::new();
    }

    if runes.len() < 1024 {
        let mut ngrams: Vec<Ngram> = runes
            .windows(3)
            .map(|w| pack(w[0], w[1], w[2]))
            .collect();
        ngrams.sort_unstable();
        ngrams.dedup();
        return ngrams;
    }

    let mut seen: FxHashSet<Ngram> = FxHashSet::default();
    for window in runes.windows(3) {
        seen.insert(pack(window[0], window[1], window[2]));
    }
    let mut ngrams: Vec<Ngram> = seen.into_iter().collect();
    ngrams.sort_unstable();
    ngrams
}

/// Extract the ordered, non-deduplicated sequence of trigrams in a query
/// literal, case-folded the same way content is. Used both for picking
/// narrowing ngrams and for word-fragment bloom lookups.
pub fn query_ngrams(literal: &str) -> Vec<Ngram> {
    let runes: Vec<char> = literal.chars().map(fold_case).collect();
    if runes.len() < 3 {
        return Vec::new();
    }
    runes
        .windows(3)
        .map(|w| pack(w[0], w[1], w[2]))
        .collect()
}

/// True if `content` is composed entirely of ASCII bytes, enabling the
/// `plainASCII` fast path in rune-offset lookup: byte offset equals rune
/// offset, so no UTF-8 width accumulation is needed.
pub fn is_plain_ascii(content: &str) -> bool {
    content.is_ascii()
}
