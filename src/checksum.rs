//! Per-document content checksums: CRC-64 with the ISO polynomial, i.e.
//! CRC-64/XZ, using the `crc` crate's table-driven `Crc<u64>` API rather
//! than a cryptographic hash.

use crc::{Crc, CRC_64_XZ};

static CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_XZ);

/// Compute the CRC-64/XZ checksum of a document's raw content bytes.
pub fn checksum_content(content: &[u8]) -> u64 {
    CRC64.checksum(content)
}

/// Verify that `content` matches a previously recorded checksum.
pub fn verify_checksum(content: &[u8], expected: u64) -> bool {
    checksum_content(content) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_deterministic() {
        let content = b"fn main() { println!(\"hi\"); }";
        assert_eq!(checksum_content(content), checksum_content(content));
    }

    #[test]
    fn checksum_detects_corruption() {
        let original = b"needle in a haystack";
        let mutated = b"needle in a haystacl";
        assert_ne!(checksum_content(original), checksum_content(mutated));
    }

    #[test]
    fn verify_roundtrips() {
        let content = b"line one\nline two\n";
        let sum = checksum_content(content);
        assert!(verify_checksum(content, sum));
        assert!(!verify_checksum(content, sum ^ 1));
    }

    #[test]
    fn empty_content_has_a_stable_checksum() {
        assert_eq!(checksum_content(b""), checksum_content(b""));
    }
}
