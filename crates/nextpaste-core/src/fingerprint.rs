//! Content fingerprints for clipboard change detection.

use sha2::{Digest, Sha256};

/// Inputs at or above this size are sampled instead of hashed in full.
const FULL_HASH_LIMIT: usize = 128 * 1024;

/// Bytes taken from each of the head, middle and tail of a large input.
const SAMPLE_SIZE: usize = 512;

/// Compute a stable fingerprint of `data`.
///
/// Returns an empty string for empty input. Large inputs are sampled and
/// the length is appended, so two large blobs that differ only outside the
/// sampled windows and have the same length collide.
pub fn fingerprint(data: &[u8]) -> String {
    if data.is_empty() {
        return String::new();
    }

    if data.len() < FULL_HASH_LIMIT {
        return format!("{:x}", Sha256::digest(data));
    }

    let len = data.len();
    let mid = len / 2;
    let mut hasher = Sha256::new();
    hasher.update(&data[..SAMPLE_SIZE]);
    hasher.update(&data[mid..mid + SAMPLE_SIZE]);
    hasher.update(&data[len - SAMPLE_SIZE..]);
    format!("{:x}_{len}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(fingerprint(b""), "");
    }

    #[test]
    fn test_small_input_is_full_sha256() {
        assert_eq!(
            fingerprint(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_small_inputs_differ() {
        assert_ne!(fingerprint(b"hello"), fingerprint(b"hellp"));
    }

    #[test]
    fn test_large_input_is_sampled() {
        let data = vec![7u8; FULL_HASH_LIMIT + 10];
        let fp = fingerprint(&data);
        assert!(fp.ends_with(&format!("_{}", data.len())));
        assert_eq!(fp.len(), 64 + 1 + data.len().to_string().len());
    }

    #[test]
    fn test_large_input_detects_head_change() {
        let a = vec![0u8; FULL_HASH_LIMIT * 2];
        let mut b = a.clone();
        b[0] = 1;
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_large_input_detects_length_change() {
        let a = vec![0u8; FULL_HASH_LIMIT * 2];
        let b = vec![0u8; FULL_HASH_LIMIT * 2 + 1];
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}
